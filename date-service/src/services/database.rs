use crate::errors::StorageError;
use crate::models::DateRecord;
use crate::services::store::DateStore;
use async_trait::async_trait;
use backoff::{future::retry, ExponentialBackoff};
use mongodb::{
    bson::doc,
    error::{ErrorKind, WriteFailure, RETRYABLE_WRITE_ERROR},
    options::{ClientOptions, Credential},
    Client as MongoClient, Collection, Database,
};
use secrecy::{ExposeSecret, Secret};
use service_core::error::AppError;
use std::future::Future;
use std::time::Duration;

const NAMESPACE_EXISTS: i32 = 48;
const DUPLICATE_KEY: i32 = 11000;

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    pub async fn connect(
        uri: &str,
        database: &str,
        username: Option<&str>,
        key: Option<&Secret<String>>,
    ) -> Result<Self, AppError> {
        tracing::info!(database = %database, "Connecting to MongoDB");

        let mut options = ClientOptions::parse(uri).await.map_err(|e| {
            tracing::error!("Invalid MongoDB endpoint: {}", e);
            AppError::from(e)
        })?;
        options.app_name = Some("date-service".to_string());

        if username.is_some() || key.is_some() {
            let mut credential = Credential::default();
            credential.username = username.map(str::to_string);
            credential.password = key.map(|k| k.expose_secret().clone());
            options.credential = Some(credential);
        }

        let client = MongoClient::with_options(options).map_err(|e| {
            tracing::error!("Failed to create MongoDB client: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "MongoDB client ready");
        Ok(Self { client, db })
    }

    /// Creates the collection unless it already exists and returns a handle
    /// to it. MongoDB creates the database implicitly with its first
    /// collection. Safe to call repeatedly and from concurrent starters.
    pub async fn ensure_collection(&self, name: &str) -> Result<Collection<DateRecord>, AppError> {
        let existing = self.db.list_collection_names(None).await.map_err(|e| {
            tracing::error!("Failed to list collections in {}: {}", self.db.name(), e);
            AppError::from(e)
        })?;

        if existing.iter().any(|c| c == name) {
            tracing::debug!(collection = %name, "Collection already exists");
        } else {
            match self.db.create_collection(name, None).await {
                Ok(()) => tracing::info!(collection = %name, "Created collection"),
                Err(e) if error_code(&e) == Some(NAMESPACE_EXISTS) => {
                    tracing::debug!(collection = %name, "Collection created concurrently");
                }
                Err(e) => {
                    tracing::error!("Failed to create collection {}: {}", name, e);
                    return Err(AppError::from(e));
                }
            }
        }

        Ok(self.db.collection(name))
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

/// [`DateStore`] over a MongoDB collection. Transient failures are retried
/// with exponential backoff until `retry_budget` has elapsed.
#[derive(Clone)]
pub struct MongoDateStore {
    db: MongoDb,
    collection: Collection<DateRecord>,
    retry_budget: Duration,
}

impl MongoDateStore {
    pub fn new(db: MongoDb, collection: Collection<DateRecord>, retry_budget: Duration) -> Self {
        Self {
            db,
            collection,
            retry_budget,
        }
    }

    pub fn collection(&self) -> &Collection<DateRecord> {
        &self.collection
    }

    async fn with_retry<T, F, Fut>(&self, operation: &str, mut f: F) -> Result<T, mongodb::error::Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, mongodb::error::Error>>,
    {
        let backoff = ExponentialBackoff {
            initial_interval: Duration::from_millis(50),
            max_elapsed_time: Some(self.retry_budget),
            ..Default::default()
        };

        retry(backoff, || {
            let attempt = f();
            async move {
                attempt.await.map_err(|e| {
                    if is_transient(&e) {
                        tracing::warn!(operation, error = %e, "Transient MongoDB error, retrying");
                        backoff::Error::transient(e)
                    } else {
                        backoff::Error::permanent(e)
                    }
                })
            }
        })
        .await
    }
}

#[async_trait]
impl DateStore for MongoDateStore {
    async fn create_item(&self, record: DateRecord) -> Result<DateRecord, StorageError> {
        let mut attempts = 0u32;
        let inserted = self
            .with_retry("insert", || {
                attempts += 1;
                self.collection.insert_one(&record, None)
            })
            .await;

        match inserted {
            Ok(_) => Ok(record),
            Err(e) => {
                resolve_insert_failure(e, attempts, &record.id)?;
                Ok(record)
            }
        }
    }

    async fn read_item(
        &self,
        id: &str,
        partition_key: &str,
    ) -> Result<Option<DateRecord>, StorageError> {
        self.with_retry("find", || {
            self.collection
                .find_one(doc! { "_id": id, "partitionKey": partition_key }, None)
        })
        .await
        .map_err(|e| match e.kind.as_ref() {
            ErrorKind::BsonDeserialization(_) => StorageError::Malformed(e.to_string()),
            _ => StorageError::Database(e),
        })
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        self.db
            .health_check()
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))
    }
}

fn is_transient(err: &mongodb::error::Error) -> bool {
    err.contains_label(RETRYABLE_WRITE_ERROR)
        || matches!(
            err.kind.as_ref(),
            ErrorKind::Io(_)
                | ErrorKind::ServerSelection { .. }
                | ErrorKind::ConnectionPoolCleared { .. }
        )
}

/// Decides what a failed insert means. Ids are fresh UUIDs, so a duplicate
/// key on a later attempt is an earlier attempt of the same insert that
/// committed before its connection failed.
fn resolve_insert_failure(
    err: mongodb::error::Error,
    attempts: u32,
    id: &str,
) -> Result<(), StorageError> {
    if error_code(&err) != Some(DUPLICATE_KEY) {
        return Err(StorageError::Database(err));
    }
    if attempts > 1 {
        tracing::warn!(
            record_id = %id,
            attempts,
            "Insert already committed by an earlier attempt"
        );
        return Ok(());
    }
    Err(StorageError::Duplicate(id.to_string()))
}

fn error_code(err: &mongodb::error::Error) -> Option<i32> {
    match err.kind.as_ref() {
        ErrorKind::Command(command) => Some(command.code),
        ErrorKind::Write(WriteFailure::WriteError(write)) => Some(write.code),
        _ => None,
    }
}
