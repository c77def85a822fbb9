#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use date_service::config::{DateConfig, MongoConfig, StorageBackend, StorageConfig};
use date_service::services::InMemoryDateStore;
use date_service::startup::{build_router, AppState, Application};
use mongodb::Client;
use service_core::config::Config as CoreConfig;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub const MONGODB_URI: &str = "mongodb://localhost:27017";

pub fn test_config(backend: StorageBackend) -> DateConfig {
    DateConfig {
        common: CoreConfig { port: 0 },
        storage: StorageConfig {
            backend,
            retry_max_elapsed_ms: 500,
        },
        mongodb: MongoConfig {
            uri: std::env::var("MONGODB_URI").unwrap_or_else(|_| MONGODB_URI.to_string()),
            username: None,
            key: None,
            database: format!("date_test_{}", Uuid::new_v4().simple()),
            collection: "dates".to_string(),
        },
        static_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/static").to_string(),
    }
}

/// Router over a fresh in-memory store.
pub struct MemoryApp {
    pub router: Router,
    pub store: Arc<InMemoryDateStore>,
}

impl MemoryApp {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryDateStore::new());
        let state = AppState::new(test_config(StorageBackend::Memory), store.clone());
        Self {
            router: build_router(state),
            store,
        }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn submit(&self, form_body: &str) -> (StatusCode, String) {
        self.send(
            Request::builder()
                .method("POST")
                .uri("/submit-date")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form_body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }
}

/// Parses the JSON record out of a `Date stored successfully: {...}` body.
pub fn stored_record(body: &str) -> serde_json::Value {
    let json = body
        .strip_prefix("Date stored successfully: ")
        .unwrap_or_else(|| panic!("unexpected confirmation: {}", body));
    serde_json::from_str(json).expect("confirmation should embed JSON")
}

/// Full application on a random port backed by a throwaway MongoDB database.
pub struct TestApp {
    pub address: String,
    pub config: DateConfig,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let config = test_config(StorageBackend::MongoDb);

        let app = Application::build(config.clone())
            .await
            .expect("Failed to build test application");
        let address = format!("http://127.0.0.1:{}", app.port());

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to accept connections
        let client = reqwest::Client::new();
        for _ in 0..50 {
            if client.get(format!("{}/test", address)).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp { address, config }
    }

    pub async fn cleanup(&self) {
        if let Ok(client) = Client::with_uri_str(&self.config.mongodb.uri).await {
            let _ = client
                .database(&self.config.mongodb.database)
                .drop(None)
                .await;
        }
    }
}
