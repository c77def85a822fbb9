use crate::errors::StorageError;
use crate::models::DateRecord;
use async_trait::async_trait;

/// Document store holding [`DateRecord`]s.
#[async_trait]
pub trait DateStore: Send + Sync {
    /// Inserts a new record and returns it as persisted.
    async fn create_item(&self, record: DateRecord) -> Result<DateRecord, StorageError>;

    /// Reads a record by id within its partition. `Ok(None)` when absent.
    async fn read_item(
        &self,
        id: &str,
        partition_key: &str,
    ) -> Result<Option<DateRecord>, StorageError>;

    async fn health_check(&self) -> Result<(), StorageError>;
}
