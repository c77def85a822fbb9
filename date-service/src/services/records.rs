use crate::dates;
use crate::errors::{RecordError, StorageError};
use crate::models::DateRecord;
use crate::services::store::DateStore;
use std::sync::Arc;

/// Creates and looks up date records on top of a [`DateStore`].
#[derive(Clone)]
pub struct DateRecordStore {
    store: Arc<dyn DateStore>,
}

impl DateRecordStore {
    pub fn new(store: Arc<dyn DateStore>) -> Self {
        Self { store }
    }

    /// Validates `input` and persists a new record for it.
    ///
    /// Invalid input is rejected before anything is written.
    pub async fn create(&self, input: &str) -> Result<DateRecord, RecordError> {
        let stored_date = dates::normalize(input).inspect_err(|_| {
            metrics::counter!("date_validation_failures_total").increment(1);
        })?;

        let record = DateRecord::new(stored_date);
        let created = self
            .store
            .create_item(record)
            .await
            .inspect_err(|e| {
                metrics::counter!("date_storage_errors_total", "operation" => "create")
                    .increment(1);
                tracing::error!(error = %e, "Failed to persist date record");
            })?;

        metrics::counter!("date_records_created_total").increment(1);
        tracing::info!(
            record_id = %created.id,
            stored_date = %created.stored_date,
            "Date record stored"
        );

        Ok(created)
    }

    /// Looks a record up by id. `Ok(None)` means no such record.
    pub async fn fetch(&self, id: &str) -> Result<Option<DateRecord>, RecordError> {
        let record = self.store.read_item(id, id).await.inspect_err(|e| {
            metrics::counter!("date_storage_errors_total", "operation" => "fetch").increment(1);
            tracing::error!(record_id = %id, error = %e, "Failed to read date record");
        })?;

        if record.is_none() {
            tracing::debug!(record_id = %id, "Date record not found");
        }

        Ok(record)
    }

    pub async fn health_check(&self) -> Result<(), StorageError> {
        self.store.health_check().await
    }
}
