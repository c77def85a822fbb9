use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted date submission.
///
/// The partition key always equals `id`; reads address a record by both.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "partitionKey")]
    pub partition_key: String,
    /// Canonical UTC timestamp, see [`crate::dates::normalize`].
    #[serde(rename = "storedDate")]
    pub stored_date: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl DateRecord {
    pub fn new(stored_date: String) -> Self {
        let id = Uuid::new_v4().to_string();
        Self {
            partition_key: id.clone(),
            id,
            stored_date,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}
