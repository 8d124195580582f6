use crate::application::services::request_state::RequestState;
use crate::application::services::WorkLogService;
use crate::domain::entities::{MonthlySummary, WorkLogEntry};
use crate::domain::value_objects::{EntityId, MonthKey};
use crate::presentation::dto::work_log_dto::{
    AddWorkLogRequest, EditWorkLogRequest, MonthGroupResponse, SummaryResponse,
    SummaryStateResponse, WorkLogFeedResponse, WorkLogResponse,
};
use crate::presentation::dto::Validate;
use crate::shared::{AppError, ValidationFailureKind};
use chrono::NaiveDate;
use std::sync::Arc;

pub struct WorkLogHandler {
    service: Arc<WorkLogService>,
}

impl WorkLogHandler {
    pub fn new(service: Arc<WorkLogService>) -> Self {
        Self { service }
    }

    pub async fn load_entries(&self) -> Result<WorkLogFeedResponse, AppError> {
        self.service.load_entries().await?;
        Ok(self.feed())
    }

    pub async fn add_entry(&self, request: AddWorkLogRequest) -> Result<WorkLogResponse, AppError> {
        request
            .validate()
            .map_err(AppError::validation_mapper(ValidationFailureKind::RequiredField))?;
        let date = parse_date(&request.date)?;
        let created = self.service.add_entry(date, request.content).await?;
        Ok(map_entry(&created))
    }

    /// キーストロークごとに呼ばれる編集エンドポイント。保存はデバウンス後。
    pub fn edit_entry(&self, request: EditWorkLogRequest) -> Result<(), AppError> {
        request
            .validate()
            .map_err(AppError::validation_mapper(ValidationFailureKind::Generic))?;
        let id = EntityId::new(request.entry_id)
            .map_err(AppError::validation_mapper(ValidationFailureKind::Generic))?;
        self.service.edit_entry(&id, request.content)
    }

    pub async fn delete_entry(&self, date: String) -> Result<(), AppError> {
        let date = parse_date(&date)?;
        self.service.delete_entry(date).await
    }

    pub fn toggle_month(&self, month: String) -> Result<bool, AppError> {
        let month = parse_month(&month)?;
        Ok(self.service.toggle_month(month))
    }

    pub async fn select_month(&self, month: String) -> Result<SummaryStateResponse, AppError> {
        let month = parse_month(&month)?;
        self.service.select_month(month).await?;
        Ok(map_summary_state(self.service.summary_state(&month)))
    }

    pub async fn generate_summary(&self, month: String) -> Result<SummaryStateResponse, AppError> {
        let month = parse_month(&month)?;
        self.service.generate_summary(month).await?;
        Ok(map_summary_state(self.service.summary_state(&month)))
    }

    pub fn summary_state(&self, month: String) -> Result<SummaryStateResponse, AppError> {
        let month = parse_month(&month)?;
        Ok(map_summary_state(self.service.summary_state(&month)))
    }

    pub fn feed(&self) -> WorkLogFeedResponse {
        WorkLogFeedResponse {
            entries: self
                .service
                .rendered_entries()
                .iter()
                .map(map_entry)
                .collect(),
            groups: self
                .service
                .entry_groups()
                .into_iter()
                .map(|(month, collapsed, entry_count)| MonthGroupResponse {
                    month: month.to_string(),
                    collapsed,
                    entry_count,
                })
                .collect(),
        }
    }

    pub fn shutdown(&self) {
        self.service.shutdown();
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| {
        AppError::validation(
            ValidationFailureKind::InvalidDate,
            format!("Invalid date: {e}"),
        )
    })
}

fn parse_month(value: &str) -> Result<MonthKey, AppError> {
    MonthKey::parse(value)
        .map_err(AppError::validation_mapper(ValidationFailureKind::InvalidDate))
}

fn map_entry(entry: &WorkLogEntry) -> WorkLogResponse {
    WorkLogResponse {
        id: entry.id.to_string(),
        date: entry.date.format("%Y-%m-%d").to_string(),
        content: entry.content.clone(),
        month: MonthKey::of_date(entry.date).to_string(),
        created_at: entry.created_at.timestamp(),
        updated_at: entry.updated_at.timestamp(),
    }
}

fn map_summary(summary: &MonthlySummary) -> SummaryResponse {
    SummaryResponse {
        month: summary.month.to_string(),
        summary: summary.summary.clone(),
        created_at: summary.created_at.timestamp(),
        updated_at: summary.updated_at.timestamp(),
    }
}

fn map_summary_state(state: RequestState<MonthlySummary>) -> SummaryStateResponse {
    match state {
        RequestState::Idle => SummaryStateResponse {
            status: "idle".to_string(),
            summary: None,
            error: None,
        },
        RequestState::Loading => SummaryStateResponse {
            status: "loading".to_string(),
            summary: None,
            error: None,
        },
        RequestState::Success(summary) => SummaryStateResponse {
            status: "success".to_string(),
            summary: Some(map_summary(&summary)),
            error: None,
        },
        RequestState::Error(message) => SummaryStateResponse {
            status: "error".to_string(),
            summary: None,
            error: Some(message),
        },
    }
}
