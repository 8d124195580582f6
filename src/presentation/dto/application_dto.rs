use crate::presentation::dto::Validate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    pub id: String,
    pub company_name: String,
    pub job_title: String,
    pub job_url: Option<String>,
    pub salary_range: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
    pub state: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub days_open: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveApplicationRequest {
    pub company_name: String,
    pub job_title: String,
    #[serde(default)]
    pub job_url: Option<String>,
    #[serde(default)]
    pub salary_range: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

impl Validate for SaveApplicationRequest {
    fn validate(&self) -> Result<(), String> {
        if self.company_name.trim().is_empty() {
            return Err("Company name is required".to_string());
        }
        if self.job_title.trim().is_empty() {
            return Err("Job title is required".to_string());
        }
        if self.notes.as_deref().map(str::len).unwrap_or(0) > 20_000 {
            return Err("Notes are too large (max 20KB)".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListApplicationsRequest {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

impl Validate for ListApplicationsRequest {
    fn validate(&self) -> Result<(), String> {
        if let Some(search) = &self.search {
            if search.len() > 200 {
                return Err("Search query is too long".to_string());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationLogResponse {
    pub id: String,
    pub application_id: String,
    pub process_name: String,
    pub note: String,
    pub audio_url: Option<String>,
    pub occurred_at: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLogRequest {
    pub process_name: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub audio_url: Option<String>,
    /// RFC 3339; defaults to now when omitted.
    #[serde(default)]
    pub datetime: Option<String>,
}

impl Validate for AddLogRequest {
    fn validate(&self) -> Result<(), String> {
        if self.process_name.trim().is_empty() {
            return Err("Process name is required".to_string());
        }
        if self.note.len() > 50_000 {
            return Err("Note is too large (max 50KB)".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditLogFieldRequest {
    pub log_id: String,
    pub field: String,
    pub value: Value,
}

impl Validate for EditLogFieldRequest {
    fn validate(&self) -> Result<(), String> {
        if self.log_id.is_empty() {
            return Err("Log ID is required".to_string());
        }
        if self.field.is_empty() {
            return Err("Field name is required".to_string());
        }
        if let Value::String(s) = &self.value {
            if s.len() > 50_000 {
                return Err("Value is too large (max 50KB)".to_string());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFeedResponse {
    pub logs: Vec<ApplicationLogResponse>,
    pub groups: Vec<LogGroupResponse>,
    pub has_more: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogGroupResponse {
    pub month: String,
    pub collapsed: bool,
    pub entry_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadOlderResponse {
    /// Entry to restore the scroll position to after the prepend, if any.
    pub anchor_id: Option<String>,
    pub inserted: usize,
}
