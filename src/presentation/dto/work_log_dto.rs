use crate::presentation::dto::Validate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkLogResponse {
    pub id: String,
    /// ISO 8601 date (`YYYY-MM-DD`).
    pub date: String,
    pub content: String,
    pub month: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddWorkLogRequest {
    pub date: String,
    pub content: String,
}

impl Validate for AddWorkLogRequest {
    fn validate(&self) -> Result<(), String> {
        if self.date.is_empty() {
            return Err("Date is required".to_string());
        }
        if self.content.trim().is_empty() {
            return Err("Content is required".to_string());
        }
        if self.content.len() > 100_000 {
            return Err("Content is too large (max 100KB)".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditWorkLogRequest {
    pub entry_id: String,
    pub content: String,
}

impl Validate for EditWorkLogRequest {
    fn validate(&self) -> Result<(), String> {
        if self.entry_id.is_empty() {
            return Err("Entry ID is required".to_string());
        }
        if self.content.len() > 100_000 {
            return Err("Content is too large (max 100KB)".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkLogFeedResponse {
    pub entries: Vec<WorkLogResponse>,
    pub groups: Vec<MonthGroupResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthGroupResponse {
    pub month: String,
    pub collapsed: bool,
    pub entry_count: usize,
}

/// Summary panel state, mirroring the request machine for the shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStateResponse {
    /// "idle" | "loading" | "success" | "error"
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub month: String,
    pub summary: String,
    pub created_at: i64,
    pub updated_at: i64,
}
