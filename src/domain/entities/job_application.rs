use crate::domain::value_objects::{ApplicationState, EntityId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One tracked job application. Edited through the detail form as a whole,
/// never through the per-field buffer, so it does not implement
/// `EditableRecord`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: EntityId,
    pub company_name: String,
    pub job_title: String,
    pub job_url: Option<String>,
    pub salary_range: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
    pub state: ApplicationState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobApplication {
    pub fn days_open(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_at).num_days().max(0)
    }
}

/// Form payload for creating or replacing an application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobApplicationDraft {
    pub company_name: String,
    pub job_title: String,
    pub job_url: Option<String>,
    pub salary_range: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
    pub state: ApplicationState,
}

impl JobApplicationDraft {
    pub fn validate(&self) -> Result<(), String> {
        if self.company_name.trim().is_empty() {
            return Err("Company name is required".to_string());
        }
        if self.job_title.trim().is_empty() {
            return Err("Job title is required".to_string());
        }
        Ok(())
    }
}

/// Search/state filter for the application list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationFilter {
    pub search: Option<String>,
    pub state: Option<ApplicationState>,
}
