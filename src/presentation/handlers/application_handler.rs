use crate::application::services::ApplicationService;
use crate::domain::entities::application_log::ApplicationLog;
use crate::domain::entities::job_application::{
    ApplicationFilter, JobApplication, JobApplicationDraft,
};
use crate::domain::entities::{ApplicationLogDraft, EditableRecord};
use crate::domain::value_objects::{ApplicationState, EntityId, FieldName, FieldValue};
use crate::presentation::dto::application_dto::{
    AddLogRequest, ApplicationLogResponse, ApplicationResponse, EditLogFieldRequest,
    ListApplicationsRequest, LoadOlderResponse, LogFeedResponse, LogGroupResponse,
    SaveApplicationRequest,
};
use crate::presentation::dto::Validate;
use crate::shared::{AppError, ValidationFailureKind};
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub struct ApplicationHandler {
    service: Arc<ApplicationService>,
}

impl ApplicationHandler {
    pub fn new(service: Arc<ApplicationService>) -> Self {
        Self { service }
    }

    pub async fn list_applications(
        &self,
        request: ListApplicationsRequest,
    ) -> Result<Vec<ApplicationResponse>, AppError> {
        request
            .validate()
            .map_err(AppError::validation_mapper(ValidationFailureKind::Generic))?;

        let filter = ApplicationFilter {
            search: request.search.filter(|s| !s.trim().is_empty()),
            state: request
                .state
                .filter(|s| !s.is_empty())
                .map(|s| parse_state(&s))
                .transpose()?,
        };

        let applications = self.service.load_applications(filter).await?;
        Ok(applications.iter().map(map_application).collect())
    }

    pub async fn create_application(
        &self,
        request: SaveApplicationRequest,
    ) -> Result<ApplicationResponse, AppError> {
        request
            .validate()
            .map_err(AppError::validation_mapper(ValidationFailureKind::RequiredField))?;
        let draft = draft_from_request(request)?;
        let created = self.service.create_application(draft).await?;
        Ok(map_application(&created))
    }

    pub async fn update_application(
        &self,
        id: String,
        request: SaveApplicationRequest,
    ) -> Result<ApplicationResponse, AppError> {
        request
            .validate()
            .map_err(AppError::validation_mapper(ValidationFailureKind::RequiredField))?;
        let id = parse_entity_id(&id)?;
        let draft = draft_from_request(request)?;
        let updated = self.service.update_application(&id, draft).await?;
        Ok(map_application(&updated))
    }

    pub async fn delete_application(&self, id: String) -> Result<(), AppError> {
        let id = parse_entity_id(&id)?;
        self.service.delete_application(&id).await
    }

    pub async fn select_application(&self, id: String) -> Result<LogFeedResponse, AppError> {
        let id = parse_entity_id(&id)?;
        self.service.select_application(id).await?;
        Ok(self.log_feed())
    }

    pub async fn add_log(&self, request: AddLogRequest) -> Result<ApplicationLogResponse, AppError> {
        request
            .validate()
            .map_err(AppError::validation_mapper(ValidationFailureKind::RequiredField))?;

        let occurred_at = parse_datetime(request.datetime.as_deref())?;
        let mut draft =
            ApplicationLogDraft::new(request.process_name, request.note, occurred_at);
        draft.audio_url = request.audio_url;

        let created = self.service.add_log(draft).await?;
        Ok(map_log(&created))
    }

    /// キーストロークごとに呼ばれる編集エンドポイント。保存はデバウンス後。
    pub fn edit_log_field(&self, request: EditLogFieldRequest) -> Result<(), AppError> {
        request
            .validate()
            .map_err(AppError::validation_mapper(ValidationFailureKind::Generic))?;

        let log_id = parse_entity_id(&request.log_id)?;
        let field = FieldName::new(request.field)
            .map_err(AppError::validation_mapper(ValidationFailureKind::UnknownField))?;
        self.service
            .edit_log_field(&log_id, field, FieldValue::new(request.value))
    }

    pub async fn flush_log_edits(&self, log_id: String) -> Result<(), AppError> {
        let log_id = parse_entity_id(&log_id)?;
        self.service.flush_log_edits(&log_id).await
    }

    pub async fn load_older_logs(&self) -> Result<Option<LoadOlderResponse>, AppError> {
        let outcome = self.service.load_older_logs().await?;
        Ok(outcome.map(|outcome| LoadOlderResponse {
            anchor_id: outcome.anchor.map(|id| id.to_string()),
            inserted: outcome.inserted,
        }))
    }

    pub async fn refresh_logs(&self) -> Result<LogFeedResponse, AppError> {
        self.service.refresh_logs().await?;
        Ok(self.log_feed())
    }

    pub fn log_feed(&self) -> LogFeedResponse {
        LogFeedResponse {
            logs: self.service.rendered_logs().iter().map(map_log).collect(),
            groups: self
                .service
                .log_groups()
                .into_iter()
                .map(|(month, collapsed, entry_count)| LogGroupResponse {
                    month: month.to_string(),
                    collapsed,
                    entry_count,
                })
                .collect(),
            has_more: self.service.has_more_logs(),
        }
    }

    pub fn shutdown(&self) {
        self.service.shutdown();
    }
}

fn parse_entity_id(value: &str) -> Result<EntityId, AppError> {
    EntityId::new(value.to_string())
        .map_err(AppError::validation_mapper(ValidationFailureKind::Generic))
}

fn parse_state(value: &str) -> Result<ApplicationState, AppError> {
    value
        .parse::<ApplicationState>()
        .map_err(AppError::validation_mapper(ValidationFailureKind::UnknownState))
}

fn parse_datetime(value: Option<&str>) -> Result<DateTime<Utc>, AppError> {
    match value {
        None => Ok(Utc::now()),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                AppError::validation(
                    ValidationFailureKind::InvalidDate,
                    format!("Invalid datetime: {e}"),
                )
            }),
    }
}

fn map_application(application: &JobApplication) -> ApplicationResponse {
    ApplicationResponse {
        id: application.id.to_string(),
        company_name: application.company_name.clone(),
        job_title: application.job_title.clone(),
        job_url: application.job_url.clone(),
        salary_range: application.salary_range.clone(),
        email: application.email.clone(),
        notes: application.notes.clone(),
        state: application.state.to_string(),
        created_at: application.created_at.timestamp(),
        updated_at: application.updated_at.timestamp(),
        days_open: application.days_open(Utc::now()),
    }
}

fn map_log(log: &ApplicationLog) -> ApplicationLogResponse {
    ApplicationLogResponse {
        id: log.id.to_string(),
        application_id: log.application_id.to_string(),
        process_name: log.process_name.clone(),
        note: log.note.clone(),
        audio_url: log.audio_url.clone(),
        occurred_at: log.occurred_at.timestamp(),
        created_at: log.created_at.timestamp(),
        updated_at: log.revision().timestamp(),
    }
}

fn draft_from_request(request: SaveApplicationRequest) -> Result<JobApplicationDraft, AppError> {
    Ok(JobApplicationDraft {
        company_name: request.company_name,
        job_title: request.job_title,
        job_url: request.job_url,
        salary_range: request.salary_range,
        email: request.email,
        notes: request.notes,
        state: match request.state.as_deref() {
            Some(raw) if !raw.is_empty() => parse_state(raw)?,
            _ => ApplicationState::default(),
        },
    })
}
