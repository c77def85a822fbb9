use crate::config::{DateConfig, StorageBackend};
use crate::handlers;
use crate::services::{DateRecordStore, DateStore, InMemoryDateStore, MongoDateStore, MongoDb};
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics::metrics_middleware, tracing::request_id_middleware};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: DateConfig,
    pub records: DateRecordStore,
}

impl AppState {
    pub fn new(config: DateConfig, store: Arc<dyn DateStore>) -> Self {
        Self {
            config,
            records: DateRecordStore::new(store),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    // `/` and any other unrouted GET fall through to the static landing page.
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics))
        .route("/test", get(handlers::test_page))
        .route("/submit-date", post(handlers::submit_date))
        .route("/get-date/:id", get(handlers::get_date))
        .fallback_service(static_files)
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Connects the configured backend and provisions its collection.
pub async fn connect_store(config: &DateConfig) -> Result<Arc<dyn DateStore>, AppError> {
    match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; records are lost on restart");
            Ok(Arc::new(InMemoryDateStore::new()))
        }
        StorageBackend::MongoDb => {
            let mongo = &config.mongodb;
            let db = MongoDb::connect(
                &mongo.uri,
                &mongo.database,
                mongo.username.as_deref(),
                mongo.key.as_ref(),
            )
            .await?;
            let collection = db.ensure_collection(&mongo.collection).await?;
            Ok(Arc::new(MongoDateStore::new(
                db,
                collection,
                config.storage.retry_budget(),
            )))
        }
    }
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    pub async fn build(config: DateConfig) -> Result<Self, AppError> {
        let store = connect_store(&config).await.map_err(|e| {
            tracing::error!("Failed to initialize storage: {}", e);
            e
        })?;
        Self::with_store(config, store).await
    }

    /// Builds the application around an already connected store.
    pub async fn with_store(config: DateConfig, store: Arc<dyn DateStore>) -> Result<Self, AppError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        let router = build_router(AppState::new(config, store));

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.run_with_shutdown(std::future::pending::<()>()).await
    }

    pub async fn run_with_shutdown<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!("Server is running on http://localhost:{}", self.port);
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
    }
}
