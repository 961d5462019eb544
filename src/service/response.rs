//! # Response Payloads

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::Record;

/// Body of create and update requests.
///
/// Both fields are optional on the wire so that a missing title is a
/// validation error rather than a body-parse error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl RecordInput {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            description: Some(description.into()),
        }
    }
}

/// One page of records with pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordList {
    pub records: Vec<Record>,
    pub total_pages: usize,
    pub current_page: usize,
    pub total_count: usize,
}

/// Delete confirmation; the deleted record itself is not echoed back
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteConfirmation {
    pub message: String,
    pub id: Uuid,
}

impl DeleteConfirmation {
    pub fn new(id: Uuid) -> Self {
        Self {
            message: "Record deleted successfully".to_string(),
            id,
        }
    }
}
