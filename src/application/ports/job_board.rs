use crate::domain::entities::{
    ApplicationLog, ApplicationLogDraft, JobApplication, JobApplicationDraft, MonthlySummary,
    WorkLogEntry, WorkLogUpsert,
};
use crate::domain::entities::job_application::ApplicationFilter;
use crate::domain::value_objects::{EntityId, FieldName, FieldValue, MonthKey};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Buffer snapshot for one entity, taken at debounce fire time. Ordered so
/// payload serialization is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityPatch {
    pub fields: BTreeMap<FieldName, FieldValue>,
}

impl EntityPatch {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn set(&mut self, name: FieldName, value: FieldValue) {
        self.fields.insert(name, value);
    }

    pub fn get(&self, name: &FieldName) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}

/// Backward-pagination cursor: "entries strictly older than this boundary".
/// The id breaks ties between entries sharing a timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedCursor {
    pub before: DateTime<Utc>,
    pub before_id: EntityId,
}

/// One page of feed entries plus the cursor for the next older page.
#[derive(Debug, Clone)]
pub struct FeedPage<E> {
    pub entries: Vec<E>,
    pub next_cursor: Option<FeedCursor>,
    pub has_more: bool,
}

impl<E> FeedPage<E> {
    pub fn exhausted(entries: Vec<E>) -> Self {
        Self {
            entries,
            next_cursor: None,
            has_more: false,
        }
    }
}

/// Persistence operations for applications and their process logs.
#[async_trait]
pub trait ApplicationGateway: Send + Sync {
    async fn list_applications(
        &self,
        filter: ApplicationFilter,
    ) -> Result<Vec<JobApplication>, AppError>;

    async fn create_application(
        &self,
        draft: JobApplicationDraft,
    ) -> Result<JobApplication, AppError>;

    async fn update_application(
        &self,
        id: &EntityId,
        draft: JobApplicationDraft,
    ) -> Result<JobApplication, AppError>;

    async fn delete_application(&self, id: &EntityId) -> Result<(), AppError>;

    /// Newest page when `cursor` is `None`, otherwise entries older than the
    /// cursor boundary. Pages come back newest-first; the feed re-sorts.
    async fn list_logs(
        &self,
        application_id: &EntityId,
        cursor: Option<FeedCursor>,
        limit: u32,
    ) -> Result<FeedPage<ApplicationLog>, AppError>;

    async fn create_log(
        &self,
        application_id: &EntityId,
        draft: ApplicationLogDraft,
    ) -> Result<ApplicationLog, AppError>;

    async fn update_log(
        &self,
        application_id: &EntityId,
        log_id: &EntityId,
        patch: EntityPatch,
    ) -> Result<ApplicationLog, AppError>;
}

/// Persistence operations for daily work logs and their monthly summaries.
#[async_trait]
pub trait WorkLogGateway: Send + Sync {
    async fn list_entries(&self) -> Result<Vec<WorkLogEntry>, AppError>;

    async fn upsert_entry(&self, upsert: WorkLogUpsert) -> Result<WorkLogEntry, AppError>;

    async fn delete_entry(&self, date: NaiveDate) -> Result<(), AppError>;

    /// `Ok(None)` when no summary exists yet (the backend's 404).
    async fn get_summary(&self, month: MonthKey) -> Result<Option<MonthlySummary>, AppError>;

    async fn generate_summary(&self, month: MonthKey) -> Result<MonthlySummary, AppError>;
}
