use crate::application::ports::job_board::{
    ApplicationGateway, EntityPatch, FeedCursor, FeedPage, WorkLogGateway,
};
use crate::domain::entities::job_application::ApplicationFilter;
use crate::domain::entities::{
    ApplicationLog, ApplicationLogDraft, JobApplication, JobApplicationDraft, MonthlySummary,
    WorkLogEntry, WorkLogUpsert,
};
use crate::domain::value_objects::{EntityId, MonthKey};
use crate::shared::config::ApiConfig;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use super::wire::{
    ApplicationLogRecord, ApplicationRecord, ErrorBody, ListEnvelope, SummaryRecord, WorkLogRecord,
};

/// トランスポート層のエラー。`AppError` へ変換してコアに渡す。
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{status}: {message}")]
    Status { status: StatusCode, message: String },
}

impl From<TransportError> for AppError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Request(inner) => AppError::Network(inner.to_string()),
            TransportError::Status { status, message } => AppError::Api {
                status: status.as_u16(),
                message,
            },
        }
    }
}

/// reqwest-backed client for the tracker backend. Implements both gateway
/// ports; auth is an opaque bearer token supplied by the shell.
pub struct RestJobBoardClient {
    http: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl RestJobBoardClient {
    pub fn new(config: &ApiConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()
            .map_err(|e| AppError::ConfigurationError(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        let builder = self.http.request(method, url);
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, TransportError> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| "Request failed".to_string());
            return Err(TransportError::Status { status, message });
        }
        Ok(response.json::<T>().await?)
    }

    async fn send_empty(&self, builder: RequestBuilder) -> Result<(), TransportError> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| "Request failed".to_string());
            return Err(TransportError::Status { status, message });
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct LogCreateBody<'a> {
    process_name: &'a str,
    note: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    audio_url: Option<&'a str>,
    datetime: chrono::DateTime<chrono::Utc>,
    client_ref: uuid::Uuid,
}

#[async_trait]
impl ApplicationGateway for RestJobBoardClient {
    async fn list_applications(
        &self,
        filter: ApplicationFilter,
    ) -> Result<Vec<JobApplication>, AppError> {
        let mut builder = self.request(Method::GET, "/applications");
        if let Some(search) = &filter.search {
            builder = builder.query(&[("search", search.as_str())]);
        }
        if let Some(state) = &filter.state {
            builder = builder.query(&[("state", state.as_str())]);
        }

        let envelope: ListEnvelope<ApplicationRecord> = self.send(builder).await?;
        envelope
            .data
            .into_iter()
            .map(ApplicationRecord::into_domain)
            .collect()
    }

    async fn create_application(
        &self,
        draft: JobApplicationDraft,
    ) -> Result<JobApplication, AppError> {
        let builder = self.request(Method::POST, "/applications").json(&draft);
        let record: ApplicationRecord = self.send(builder).await?;
        record.into_domain()
    }

    async fn update_application(
        &self,
        id: &EntityId,
        draft: JobApplicationDraft,
    ) -> Result<JobApplication, AppError> {
        let builder = self
            .request(Method::PUT, &format!("/applications/{id}"))
            .json(&draft);
        let record: ApplicationRecord = self.send(builder).await?;
        record.into_domain()
    }

    async fn delete_application(&self, id: &EntityId) -> Result<(), AppError> {
        let builder = self.request(Method::DELETE, &format!("/applications/{id}"));
        Ok(self.send_empty(builder).await?)
    }

    async fn list_logs(
        &self,
        application_id: &EntityId,
        cursor: Option<FeedCursor>,
        limit: u32,
    ) -> Result<FeedPage<ApplicationLog>, AppError> {
        let mut builder = self
            .request(Method::GET, &format!("/applications/{application_id}/logs"))
            .query(&[("limit", limit.to_string())]);
        if let Some(cursor) = &cursor {
            builder = builder.query(&[
                ("before", cursor.before.to_rfc3339()),
                ("before_id", cursor.before_id.to_string()),
            ]);
        }

        let envelope: ListEnvelope<ApplicationLogRecord> = self.send(builder).await?;
        let entries = envelope
            .data
            .into_iter()
            .map(ApplicationLogRecord::into_domain)
            .collect::<Result<Vec<_>, _>>()?;

        // サーバは新しい順で返す。次ページ境界は最古エントリ。
        let next_cursor = entries
            .iter()
            .min_by_key(|log| (log.occurred_at, log.id.clone()))
            .map(|oldest| FeedCursor {
                before: oldest.occurred_at,
                before_id: oldest.id.clone(),
            });

        Ok(FeedPage {
            entries,
            next_cursor: if envelope.has_more { next_cursor } else { None },
            has_more: envelope.has_more,
        })
    }

    async fn create_log(
        &self,
        application_id: &EntityId,
        draft: ApplicationLogDraft,
    ) -> Result<ApplicationLog, AppError> {
        let body = LogCreateBody {
            process_name: &draft.process_name,
            note: &draft.note,
            audio_url: draft.audio_url.as_deref(),
            datetime: draft.occurred_at,
            client_ref: draft.local_ref,
        };
        let builder = self
            .request(Method::POST, &format!("/applications/{application_id}/logs"))
            .json(&body);
        let record: ApplicationLogRecord = self.send(builder).await?;
        record.into_domain()
    }

    async fn update_log(
        &self,
        application_id: &EntityId,
        log_id: &EntityId,
        patch: EntityPatch,
    ) -> Result<ApplicationLog, AppError> {
        let body: serde_json::Map<String, serde_json::Value> = patch
            .fields
            .iter()
            .map(|(name, value)| (name.to_string(), value.as_json().clone()))
            .collect();
        let builder = self
            .request(
                Method::PATCH,
                &format!("/applications/{application_id}/logs/{log_id}"),
            )
            .json(&body);
        let record: ApplicationLogRecord = self.send(builder).await?;
        record.into_domain()
    }
}

#[async_trait]
impl WorkLogGateway for RestJobBoardClient {
    async fn list_entries(&self) -> Result<Vec<WorkLogEntry>, AppError> {
        let builder = self.request(Method::GET, "/worklogs");
        let envelope: ListEnvelope<WorkLogRecord> = self.send(builder).await?;
        envelope
            .data
            .into_iter()
            .map(WorkLogRecord::into_domain)
            .collect()
    }

    async fn upsert_entry(&self, upsert: WorkLogUpsert) -> Result<WorkLogEntry, AppError> {
        let builder = self.request(Method::POST, "/worklogs").json(&upsert);
        let record: WorkLogRecord = self.send(builder).await?;
        record.into_domain()
    }

    async fn delete_entry(&self, date: NaiveDate) -> Result<(), AppError> {
        let builder = self.request(Method::DELETE, &format!("/worklogs/{date}"));
        Ok(self.send_empty(builder).await?)
    }

    async fn get_summary(&self, month: MonthKey) -> Result<Option<MonthlySummary>, AppError> {
        let builder = self.request(Method::GET, &format!("/worklogs/summary/{month}"));
        match self.send::<SummaryRecord>(builder).await {
            Ok(record) => Ok(Some(record.into_domain()?)),
            Err(TransportError::Status { status, .. }) if status == StatusCode::NOT_FOUND => {
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn generate_summary(&self, month: MonthKey) -> Result<MonthlySummary, AppError> {
        let builder = self.request(Method::POST, &format!("/worklogs/summary/{month}"));
        let record: SummaryRecord = self.send(builder).await?;
        record.into_domain()
    }
}
