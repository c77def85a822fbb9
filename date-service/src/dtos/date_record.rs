use crate::models::DateRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SubmitDateForm {
    pub date: Option<String>,
}

/// Client-facing JSON form of a record.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DateRecordResponse {
    pub id: String,
    pub partition_key: String,
    pub stored_date: String,
    pub created_at: String,
}

impl From<DateRecord> for DateRecordResponse {
    fn from(record: DateRecord) -> Self {
        Self {
            id: record.id,
            partition_key: record.partition_key,
            stored_date: record.stored_date,
            created_at: record.created_at,
        }
    }
}
