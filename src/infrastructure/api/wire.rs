use crate::domain::entities::{
    ApplicationLog, JobApplication, MonthlySummary, WorkLogEntry,
};
use crate::domain::value_objects::{ApplicationState, EntityId, MonthKey};
use crate::shared::error::AppError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// 一覧系エンドポイントの共通エンベロープ。
#[derive(Debug, Deserialize)]
pub struct ListEnvelope<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: String,
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
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApplicationRecord {
    pub fn into_domain(self) -> Result<JobApplication, AppError> {
        Ok(JobApplication {
            id: parse_id(self.id)?,
            company_name: self.company_name,
            job_title: self.job_title,
            job_url: self.job_url,
            salary_range: self.salary_range,
            email: self.email,
            notes: self.notes,
            state: self
                .state
                .parse::<ApplicationState>()
                .map_err(AppError::SerializationError)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApplicationLogRecord {
    pub id: String,
    pub application_id: String,
    pub process_name: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub audio_url: Option<String>,
    pub datetime: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApplicationLogRecord {
    pub fn into_domain(self) -> Result<ApplicationLog, AppError> {
        Ok(ApplicationLog {
            id: parse_id(self.id)?,
            application_id: parse_id(self.application_id)?,
            process_name: self.process_name,
            note: self.note,
            audio_url: self.audio_url,
            occurred_at: self.datetime,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WorkLogRecord {
    pub id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkLogRecord {
    pub fn into_domain(self) -> Result<WorkLogEntry, AppError> {
        Ok(WorkLogEntry {
            id: parse_id(self.id)?,
            date: self.date,
            content: self.content,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub month: String,
    pub summary: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SummaryRecord {
    pub fn into_domain(self) -> Result<MonthlySummary, AppError> {
        Ok(MonthlySummary {
            month: MonthKey::parse(&self.month).map_err(AppError::SerializationError)?,
            summary: self.summary,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn parse_id(raw: String) -> Result<EntityId, AppError> {
    EntityId::new(raw).map_err(AppError::SerializationError)
}
