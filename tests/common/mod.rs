#![allow(dead_code)]

pub mod mocks;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use shukatsu_lib::application::ports::job_board::{
    ApplicationGateway, EntityPatch, FeedCursor, FeedPage, WorkLogGateway,
};
use shukatsu_lib::application::ports::notifier::{Notification, NotificationKind, Notifier};
use shukatsu_lib::domain::entities::job_application::ApplicationFilter;
use shukatsu_lib::domain::entities::{
    ApplicationLog, ApplicationLogDraft, EditableRecord, JobApplication, JobApplicationDraft,
    MonthlySummary, WorkLogEntry, WorkLogUpsert,
};
use shukatsu_lib::domain::value_objects::{EntityId, MonthKey};
use shukatsu_lib::shared::error::AppError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use tokio::sync::Semaphore;

pub fn entity_id(raw: &str) -> EntityId {
    EntityId::new(raw.to_string()).expect("entity id")
}

pub fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().expect("timestamp")
}

pub fn log_at(id: &str, note: &str, occurred_at: DateTime<Utc>) -> ApplicationLog {
    ApplicationLog {
        id: entity_id(id),
        application_id: entity_id("app-1"),
        process_name: "Phone Screen".to_string(),
        note: note.to_string(),
        audio_url: None,
        occurred_at,
        created_at: occurred_at,
        updated_at: occurred_at,
    }
}

pub fn entry_on(id: &str, date: (i32, u32, u32), content: &str) -> WorkLogEntry {
    let date = NaiveDate::from_ymd_opt(date.0, date.1, date.2).expect("date");
    let created = date.and_hms_opt(18, 0, 0).expect("time").and_utc();
    WorkLogEntry {
        id: entity_id(id),
        date,
        content: content.to_string(),
        created_at: created,
        updated_at: created,
    }
}

/// Collects every toast the core fires.
#[derive(Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<Notification> {
        self.notifications.lock().expect("notifications lock").clone()
    }

    pub fn successes(&self) -> Vec<String> {
        self.all()
            .into_iter()
            .filter(|n| n.kind == NotificationKind::Success)
            .map(|n| n.message)
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.all()
            .into_iter()
            .filter(|n| n.kind == NotificationKind::Error)
            .map(|n| n.message)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications
            .lock()
            .expect("notifications lock")
            .push(notification);
    }
}

struct BoardInner {
    applications: Vec<JobApplication>,
    logs: Vec<ApplicationLog>,
    entries: Vec<WorkLogEntry>,
    summaries: HashMap<MonthKey, MonthlySummary>,
    update_log_payloads: Vec<(EntityId, EntityPatch)>,
    upsert_payloads: Vec<WorkLogUpsert>,
    revision_counter: i64,
    next_id: u64,
}

/// Hand-rolled in-memory backend for flow tests. Saves can be held on a
/// gate so in-flight races are scriptable, and single failures injectable.
pub struct InMemoryJobBoard {
    inner: Mutex<BoardInner>,
    gate: Semaphore,
    hold_updates: AtomicBool,
    fail_next_update: AtomicBool,
    updates_started: AtomicU64,
}

impl InMemoryJobBoard {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(BoardInner {
                applications: Vec::new(),
                logs: Vec::new(),
                entries: Vec::new(),
                summaries: HashMap::new(),
                update_log_payloads: Vec::new(),
                upsert_payloads: Vec::new(),
                revision_counter: 1_000,
                next_id: 1,
            }),
            gate: Semaphore::new(0),
            hold_updates: AtomicBool::new(false),
            fail_next_update: AtomicBool::new(false),
            updates_started: AtomicU64::new(0),
        }
    }

    pub fn seed_logs(&self, logs: Vec<ApplicationLog>) {
        let mut inner = self.inner.lock().expect("board lock");
        inner.logs = logs;
        // 新しい順で保持する（サーバのレスポンス順）。
        inner.logs.sort_by(|a, b| {
            b.occurred_at
                .cmp(&a.occurred_at)
                .then_with(|| b.id.cmp(&a.id))
        });
    }

    pub fn seed_entries(&self, entries: Vec<WorkLogEntry>) {
        self.inner.lock().expect("board lock").entries = entries;
    }

    pub fn seed_summary(&self, summary: MonthlySummary) {
        self.inner
            .lock()
            .expect("board lock")
            .summaries
            .insert(summary.month, summary);
    }

    pub fn set_log_note(&self, id: &EntityId, note: &str) {
        let mut inner = self.inner.lock().expect("board lock");
        inner.revision_counter += 1;
        let revision = ts(inner.revision_counter);
        if let Some(log) = inner.logs.iter_mut().find(|log| &log.id == id) {
            log.note = note.to_string();
            log.updated_at = revision;
        }
    }

    pub fn hold_updates(&self) {
        self.hold_updates.store(true, Ordering::SeqCst);
    }

    pub fn release_updates(&self) {
        self.hold_updates.store(false, Ordering::SeqCst);
        self.gate.add_permits(1_024);
    }

    pub fn fail_next_update(&self) {
        self.fail_next_update.store(true, Ordering::SeqCst);
    }

    pub fn updates_started(&self) -> u64 {
        self.updates_started.load(Ordering::SeqCst)
    }

    pub fn update_log_payloads(&self) -> Vec<(EntityId, EntityPatch)> {
        self.inner
            .lock()
            .expect("board lock")
            .update_log_payloads
            .clone()
    }

    pub fn upsert_payloads(&self) -> Vec<WorkLogUpsert> {
        self.inner.lock().expect("board lock").upsert_payloads.clone()
    }

    pub fn log(&self, id: &EntityId) -> Option<ApplicationLog> {
        self.inner
            .lock()
            .expect("board lock")
            .logs
            .iter()
            .find(|log| &log.id == id)
            .cloned()
    }

    async fn pass_gate(&self) {
        if self.hold_updates.load(Ordering::SeqCst) {
            let permit = self.gate.acquire().await.expect("gate open");
            permit.forget();
        }
    }

    fn next_revision(inner: &mut BoardInner) -> DateTime<Utc> {
        inner.revision_counter += 1;
        ts(inner.revision_counter)
    }
}

impl Default for InMemoryJobBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApplicationGateway for InMemoryJobBoard {
    async fn list_applications(
        &self,
        filter: ApplicationFilter,
    ) -> Result<Vec<JobApplication>, AppError> {
        let inner = self.inner.lock().expect("board lock");
        Ok(inner
            .applications
            .iter()
            .filter(|a| {
                filter
                    .search
                    .as_ref()
                    .map(|q| a.company_name.to_lowercase().contains(&q.to_lowercase()))
                    .unwrap_or(true)
                    && filter.state.map(|s| a.state == s).unwrap_or(true)
            })
            .cloned()
            .collect())
    }

    async fn create_application(
        &self,
        draft: JobApplicationDraft,
    ) -> Result<JobApplication, AppError> {
        let mut inner = self.inner.lock().expect("board lock");
        let revision = Self::next_revision(&mut inner);
        let id = format!("app-{}", inner.next_id);
        inner.next_id += 1;
        let application = JobApplication {
            id: entity_id(&id),
            company_name: draft.company_name,
            job_title: draft.job_title,
            job_url: draft.job_url,
            salary_range: draft.salary_range,
            email: draft.email,
            notes: draft.notes,
            state: draft.state,
            created_at: revision,
            updated_at: revision,
        };
        inner.applications.push(application.clone());
        Ok(application)
    }

    async fn update_application(
        &self,
        id: &EntityId,
        draft: JobApplicationDraft,
    ) -> Result<JobApplication, AppError> {
        let mut inner = self.inner.lock().expect("board lock");
        let revision = Self::next_revision(&mut inner);
        let application = inner
            .applications
            .iter_mut()
            .find(|a| &a.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Unknown application: {id}")))?;
        application.company_name = draft.company_name;
        application.job_title = draft.job_title;
        application.job_url = draft.job_url;
        application.salary_range = draft.salary_range;
        application.email = draft.email;
        application.notes = draft.notes;
        application.state = draft.state;
        application.updated_at = revision;
        Ok(application.clone())
    }

    async fn delete_application(&self, id: &EntityId) -> Result<(), AppError> {
        let mut inner = self.inner.lock().expect("board lock");
        inner.applications.retain(|a| &a.id != id);
        inner.logs.retain(|log| &log.application_id != id);
        Ok(())
    }

    async fn list_logs(
        &self,
        _application_id: &EntityId,
        cursor: Option<FeedCursor>,
        limit: u32,
    ) -> Result<FeedPage<ApplicationLog>, AppError> {
        let inner = self.inner.lock().expect("board lock");
        let mut older: Vec<&ApplicationLog> = inner
            .logs
            .iter()
            .filter(|log| match &cursor {
                None => true,
                Some(boundary) => {
                    log.occurred_at < boundary.before
                        || (log.occurred_at == boundary.before && log.id < boundary.before_id)
                }
            })
            .collect();
        // 新しい順。
        older.sort_by(|a, b| {
            b.occurred_at
                .cmp(&a.occurred_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let has_more = older.len() > limit as usize;
        let page: Vec<ApplicationLog> =
            older.into_iter().take(limit as usize).cloned().collect();
        let next_cursor = page.last().map(|oldest| FeedCursor {
            before: oldest.occurred_at,
            before_id: oldest.id.clone(),
        });

        Ok(FeedPage {
            entries: page,
            next_cursor: if has_more { next_cursor } else { None },
            has_more,
        })
    }

    async fn create_log(
        &self,
        application_id: &EntityId,
        draft: ApplicationLogDraft,
    ) -> Result<ApplicationLog, AppError> {
        let mut inner = self.inner.lock().expect("board lock");
        let revision = Self::next_revision(&mut inner);
        let id = format!("log-{}", inner.next_id);
        inner.next_id += 1;
        let log = ApplicationLog {
            id: entity_id(&id),
            application_id: application_id.clone(),
            process_name: draft.process_name,
            note: draft.note,
            audio_url: draft.audio_url,
            occurred_at: draft.occurred_at,
            created_at: revision,
            updated_at: revision,
        };
        inner.logs.insert(0, log.clone());
        Ok(log)
    }

    async fn update_log(
        &self,
        _application_id: &EntityId,
        log_id: &EntityId,
        patch: EntityPatch,
    ) -> Result<ApplicationLog, AppError> {
        self.updates_started.fetch_add(1, Ordering::SeqCst);
        self.pass_gate().await;

        if self.fail_next_update.swap(false, Ordering::SeqCst) {
            return Err(AppError::Network("connection reset".to_string()));
        }

        let mut inner = self.inner.lock().expect("board lock");
        let revision = Self::next_revision(&mut inner);
        inner.update_log_payloads.push((log_id.clone(), patch.clone()));
        let log = inner
            .logs
            .iter_mut()
            .find(|log| &log.id == log_id)
            .ok_or_else(|| AppError::NotFound(format!("Unknown log: {log_id}")))?;
        for (name, value) in &patch.fields {
            log.set_field(name, value)
                .map_err(|e| AppError::Api {
                    status: 422,
                    message: e,
                })?;
        }
        log.updated_at = revision;
        Ok(log.clone())
    }
}

#[async_trait]
impl WorkLogGateway for InMemoryJobBoard {
    async fn list_entries(&self) -> Result<Vec<WorkLogEntry>, AppError> {
        Ok(self.inner.lock().expect("board lock").entries.clone())
    }

    async fn upsert_entry(&self, upsert: WorkLogUpsert) -> Result<WorkLogEntry, AppError> {
        self.updates_started.fetch_add(1, Ordering::SeqCst);
        self.pass_gate().await;

        if self.fail_next_update.swap(false, Ordering::SeqCst) {
            return Err(AppError::Network("connection reset".to_string()));
        }

        let mut inner = self.inner.lock().expect("board lock");
        let revision = Self::next_revision(&mut inner);
        inner.upsert_payloads.push(upsert.clone());

        if let Some(entry) = inner.entries.iter_mut().find(|e| e.date == upsert.date) {
            if upsert.append && !entry.content.is_empty() {
                entry.content = format!("{}\n{}", entry.content, upsert.content);
            } else {
                entry.content = upsert.content;
            }
            entry.updated_at = revision;
            return Ok(entry.clone());
        }

        let id = format!("wl-{}", inner.next_id);
        inner.next_id += 1;
        let entry = WorkLogEntry {
            id: entity_id(&id),
            date: upsert.date,
            content: upsert.content,
            created_at: revision,
            updated_at: revision,
        };
        inner.entries.push(entry.clone());
        Ok(entry)
    }

    async fn delete_entry(&self, date: NaiveDate) -> Result<(), AppError> {
        let mut inner = self.inner.lock().expect("board lock");
        let before = inner.entries.len();
        inner.entries.retain(|entry| entry.date != date);
        if inner.entries.len() == before {
            return Err(AppError::Api {
                status: 404,
                message: format!("No work log for {date}"),
            });
        }
        Ok(())
    }

    async fn get_summary(&self, month: MonthKey) -> Result<Option<MonthlySummary>, AppError> {
        Ok(self
            .inner
            .lock()
            .expect("board lock")
            .summaries
            .get(&month)
            .cloned())
    }

    async fn generate_summary(&self, month: MonthKey) -> Result<MonthlySummary, AppError> {
        let mut inner = self.inner.lock().expect("board lock");
        let revision = Self::next_revision(&mut inner);
        let summary = MonthlySummary {
            month,
            summary: format!("Summary for {month}"),
            created_at: revision,
            updated_at: revision,
        };
        inner.summaries.insert(month, summary.clone());
        Ok(summary)
    }
}
