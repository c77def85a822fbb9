use crate::errors::StorageError;
use crate::models::DateRecord;
use crate::services::store::DateStore;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Process-local store used by the `memory` backend and in tests.
#[derive(Debug)]
pub struct InMemoryDateStore {
    records: DashMap<String, DateRecord>,
    writes: AtomicUsize,
    available: AtomicBool,
}

impl Default for InMemoryDateStore {
    fn default() -> Self {
        Self {
            records: DashMap::new(),
            writes: AtomicUsize::new(0),
            available: AtomicBool::new(true),
        }
    }
}

impl InMemoryDateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful writes since creation.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// While unavailable every operation fails with [`StorageError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::Unavailable(
                "in-memory store is offline".to_string(),
            ))
        }
    }
}

#[async_trait]
impl DateStore for InMemoryDateStore {
    async fn create_item(&self, record: DateRecord) -> Result<DateRecord, StorageError> {
        self.check_available()?;
        match self.records.entry(record.id.clone()) {
            Entry::Occupied(_) => Err(StorageError::Duplicate(record.id)),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                self.writes.fetch_add(1, Ordering::SeqCst);
                Ok(record)
            }
        }
    }

    async fn read_item(
        &self,
        id: &str,
        partition_key: &str,
    ) -> Result<Option<DateRecord>, StorageError> {
        self.check_available()?;
        Ok(self
            .records
            .get(id)
            .filter(|record| record.partition_key == partition_key)
            .map(|record| record.clone()))
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        self.check_available()
    }
}
