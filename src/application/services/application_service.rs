use crate::application::ports::job_board::{ApplicationGateway, EntityPatch, FeedPage};
use crate::application::ports::notifier::{Notification, Notifier};
use crate::application::services::chrono_feed::{ChronoFeed, PrependOutcome};
use crate::application::services::debounce::DebounceScheduler;
use crate::application::services::edit_buffer::EditBuffer;
use crate::application::services::reconciler;
use crate::application::services::save_coordinator::{SaveCoordinator, SavePerformer};
use crate::domain::entities::application_log::{fields as log_fields, ApplicationLog};
use crate::domain::entities::job_application::{
    ApplicationFilter, JobApplication, JobApplicationDraft,
};
use crate::domain::entities::{ApplicationLogDraft, EditableRecord};
use crate::domain::value_objects::{EntityId, FieldName, FieldValue, MonthKey};
use crate::shared::error::AppError;
use crate::shared::validation::ValidationFailureKind;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, RwLock, Weak};
use std::time::Duration;

/// Everything scoped to one selected application's log feed. Created on
/// selection, dropped wholesale when the selection changes or the service
/// shuts down — dropping cancels the scope's timers, so no save can fire
/// against a feed that is gone.
struct LogFeedScope {
    application_id: EntityId,
    buffer: Mutex<EditBuffer>,
    feed: Mutex<ChronoFeed<ApplicationLog>>,
    scheduler: DebounceScheduler,
    coordinator: SaveCoordinator,
}

/// Save step run by the coordinator: one gateway update, then reconcile the
/// response into the feed. Holds the scope weakly — a save resolving after
/// its feed was torn down is ignored, never an error.
struct LogSavePerformer {
    gateway: Arc<dyn ApplicationGateway>,
    notifier: Arc<dyn Notifier>,
    scope: Weak<LogFeedScope>,
}

#[async_trait]
impl SavePerformer for LogSavePerformer {
    async fn perform_save(&self, id: &EntityId, patch: EntityPatch) -> Result<(), AppError> {
        let Some(scope) = self.scope.upgrade() else {
            tracing::debug!(
                target: "sync::logs",
                entity_id = %id,
                "dropping save for a torn-down feed"
            );
            return Ok(());
        };

        match self
            .gateway
            .update_log(&scope.application_id, id, patch)
            .await
        {
            Ok(record) => {
                {
                    let mut buffer = scope.buffer.lock().expect("log buffer lock");
                    let merged = reconciler::merge(&record, &mut buffer);
                    scope
                        .feed
                        .lock()
                        .expect("log feed lock")
                        .upsert(merged);
                }
                self.notifier.notify(Notification::success("Log saved"));
                Ok(())
            }
            Err(err) => {
                // The edit stays in the buffer; the next keystroke or an
                // explicit retry re-commits it.
                self.notifier
                    .notify(Notification::error(err.user_message()));
                Err(err)
            }
        }
    }
}

/// Job application CRUD plus the buffered edit pipeline for the selected
/// application's process logs.
pub struct ApplicationService {
    gateway: Arc<dyn ApplicationGateway>,
    notifier: Arc<dyn Notifier>,
    debounce_delay: Duration,
    page_size: u32,
    applications: RwLock<Vec<JobApplication>>,
    scope: RwLock<Option<Arc<LogFeedScope>>>,
}

impl ApplicationService {
    pub fn new(
        gateway: Arc<dyn ApplicationGateway>,
        notifier: Arc<dyn Notifier>,
        debounce_ms: u64,
        page_size: u32,
    ) -> Self {
        Self {
            gateway,
            notifier,
            debounce_delay: Duration::from_millis(debounce_ms),
            page_size,
            applications: RwLock::new(Vec::new()),
            scope: RwLock::new(None),
        }
    }

    // --- application CRUD -------------------------------------------------

    pub async fn load_applications(
        &self,
        filter: ApplicationFilter,
    ) -> Result<Vec<JobApplication>, AppError> {
        let applications = self.gateway.list_applications(filter).await?;
        *self.applications.write().expect("applications lock") = applications.clone();
        Ok(applications)
    }

    pub fn applications(&self) -> Vec<JobApplication> {
        self.applications.read().expect("applications lock").clone()
    }

    pub async fn create_application(
        &self,
        draft: JobApplicationDraft,
    ) -> Result<JobApplication, AppError> {
        draft
            .validate()
            .map_err(AppError::validation_mapper(ValidationFailureKind::RequiredField))?;

        match self.gateway.create_application(draft).await {
            Ok(created) => {
                self.notifier
                    .notify(Notification::success("Application created"));
                self.applications
                    .write()
                    .expect("applications lock")
                    .push(created.clone());
                Ok(created)
            }
            Err(err) => {
                self.notifier
                    .notify(Notification::error(err.user_message()));
                Err(err)
            }
        }
    }

    pub async fn update_application(
        &self,
        id: &EntityId,
        draft: JobApplicationDraft,
    ) -> Result<JobApplication, AppError> {
        draft
            .validate()
            .map_err(AppError::validation_mapper(ValidationFailureKind::RequiredField))?;

        match self.gateway.update_application(id, draft).await {
            Ok(updated) => {
                self.notifier
                    .notify(Notification::success("Application updated"));
                let mut applications = self.applications.write().expect("applications lock");
                if let Some(existing) = applications.iter_mut().find(|a| &a.id == id) {
                    *existing = updated.clone();
                }
                Ok(updated)
            }
            Err(err) => {
                self.notifier
                    .notify(Notification::error(err.user_message()));
                Err(err)
            }
        }
    }

    pub async fn delete_application(&self, id: &EntityId) -> Result<(), AppError> {
        match self.gateway.delete_application(id).await {
            Ok(()) => {
                self.notifier
                    .notify(Notification::success("Application deleted"));
                self.applications
                    .write()
                    .expect("applications lock")
                    .retain(|a| &a.id != id);
                let selected = {
                    let scope = self.scope.read().expect("scope lock");
                    scope
                        .as_ref()
                        .map(|s| s.application_id == *id)
                        .unwrap_or(false)
                };
                if selected {
                    self.clear_selection();
                }
                Ok(())
            }
            Err(err) => {
                self.notifier
                    .notify(Notification::error(err.user_message()));
                Err(err)
            }
        }
    }

    // --- log feed lifecycle -----------------------------------------------

    /// Scopes a fresh feed (buffer, timers, coordinator) to `id` and loads
    /// the newest page. The previous scope, if any, is torn down: its
    /// timers are canceled and its unsaved buffer is discarded with it.
    pub async fn select_application(&self, id: EntityId) -> Result<(), AppError> {
        let gateway = Arc::clone(&self.gateway);
        let notifier = Arc::clone(&self.notifier);
        let scope = Arc::new_cyclic(|weak: &Weak<LogFeedScope>| LogFeedScope {
            application_id: id.clone(),
            buffer: Mutex::new(EditBuffer::new()),
            feed: Mutex::new(ChronoFeed::new()),
            scheduler: DebounceScheduler::new(),
            coordinator: SaveCoordinator::new(Arc::new(LogSavePerformer {
                gateway,
                notifier,
                scope: weak.clone(),
            })),
        });

        let page = self.gateway.list_logs(&id, None, self.page_size).await?;
        scope.feed.lock().expect("log feed lock").replace_all(page);

        *self.scope.write().expect("scope lock") = Some(scope);
        Ok(())
    }

    pub fn selected_application(&self) -> Option<EntityId> {
        self.scope
            .read()
            .expect("scope lock")
            .as_ref()
            .map(|scope| scope.application_id.clone())
    }

    pub fn clear_selection(&self) {
        if let Some(scope) = self.scope.write().expect("scope lock").take() {
            scope.scheduler.cancel_all();
        }
    }

    fn current_scope(&self) -> Result<Arc<LogFeedScope>, AppError> {
        self.scope
            .read()
            .expect("scope lock")
            .clone()
            .ok_or_else(|| AppError::NotFound("No application selected".to_string()))
    }

    // --- compose row ------------------------------------------------------

    pub async fn add_log(&self, draft: ApplicationLogDraft) -> Result<ApplicationLog, AppError> {
        draft
            .validate()
            .map_err(AppError::validation_mapper(ValidationFailureKind::RequiredField))?;
        let scope = self.current_scope()?;

        match self.gateway.create_log(&scope.application_id, draft).await {
            Ok(created) => {
                self.notifier.notify(Notification::success("Log added"));
                scope
                    .feed
                    .lock()
                    .expect("log feed lock")
                    .upsert(created.clone());
                Ok(created)
            }
            Err(err) => {
                self.notifier
                    .notify(Notification::error(err.user_message()));
                Err(err)
            }
        }
    }

    // --- the buffered edit path -------------------------------------------

    /// Keystroke entry point. Stores the value in the buffer and restarts
    /// the entity's debounce timer; after the quiet window the timer
    /// snapshots the buffer and commits through the coordinator.
    pub fn edit_log_field(
        &self,
        log_id: &EntityId,
        field: FieldName,
        value: FieldValue,
    ) -> Result<(), AppError> {
        let scope = self.current_scope()?;

        if !ApplicationLog::editable_fields().contains(&field.as_str()) {
            return Err(AppError::validation(
                ValidationFailureKind::UnknownField,
                format!("Unknown log field: {field}"),
            ));
        }
        if field.as_str() == log_fields::PROCESS_NAME && value.is_blank() {
            return Err(AppError::validation(
                ValidationFailureKind::RequiredField,
                "Process name is required",
            ));
        }

        let base_revision = {
            let feed = scope.feed.lock().expect("log feed lock");
            feed.get(log_id)
                .map(|record| record.revision())
                .ok_or_else(|| AppError::NotFound(format!("Unknown log: {log_id}")))?
        };

        scope
            .buffer
            .lock()
            .expect("log buffer lock")
            .set(log_id, &field, value, base_revision);

        let weak = Arc::downgrade(&scope);
        let fire_id = log_id.clone();
        scope
            .scheduler
            .touch(log_id.clone(), self.debounce_delay, move || async move {
                let Some(scope) = weak.upgrade() else {
                    return;
                };
                // Snapshot at fire time: edits that landed after scheduling
                // are part of this payload.
                let patch = scope
                    .buffer
                    .lock()
                    .expect("log buffer lock")
                    .snapshot(&fire_id);
                if let Err(err) = scope.coordinator.commit(fire_id.clone(), patch).await {
                    tracing::warn!(
                        target: "sync::logs",
                        entity_id = %fire_id,
                        error = %err,
                        "debounced save failed"
                    );
                }
            });

        Ok(())
    }

    /// Flushes an entity's pending edits immediately (explicit retry/save).
    pub async fn flush_log_edits(&self, log_id: &EntityId) -> Result<(), AppError> {
        let scope = self.current_scope()?;
        scope.scheduler.cancel(log_id);
        let patch = scope
            .buffer
            .lock()
            .expect("log buffer lock")
            .snapshot(log_id);
        scope.coordinator.commit(log_id.clone(), patch).await?;
        Ok(())
    }

    // --- feed reads & pagination ------------------------------------------

    /// Entries with pending overrides applied — what the list renders.
    pub fn rendered_logs(&self) -> Vec<ApplicationLog> {
        let Ok(scope) = self.current_scope() else {
            return Vec::new();
        };
        let mut buffer = scope.buffer.lock().expect("log buffer lock");
        let feed = scope.feed.lock().expect("log feed lock");
        feed.entries()
            .iter()
            .map(|record| reconciler::merge(record, &mut buffer))
            .collect()
    }

    pub fn log_groups(&self) -> Vec<(MonthKey, bool, usize)> {
        let Ok(scope) = self.current_scope() else {
            return Vec::new();
        };
        let feed = scope.feed.lock().expect("log feed lock");
        feed.group()
            .iter()
            .map(|group| (group.month, group.collapsed, group.entries.len()))
            .collect()
    }

    pub fn has_more_logs(&self) -> bool {
        self.current_scope()
            .map(|scope| scope.feed.lock().expect("log feed lock").has_more())
            .unwrap_or(false)
    }

    /// "Load older" for the reverse-chronological list. No-op when nothing
    /// older exists or a page is already on the wire.
    pub async fn load_older_logs(&self) -> Result<Option<PrependOutcome>, AppError> {
        let scope = self.current_scope()?;

        let cursor = {
            let mut feed = scope.feed.lock().expect("log feed lock");
            feed.begin_older_load()
        };
        let Some(cursor) = cursor else {
            return Ok(None);
        };

        match self
            .gateway
            .list_logs(&scope.application_id, Some(cursor), self.page_size)
            .await
        {
            Ok(page) => {
                let outcome = {
                    let mut buffer = scope.buffer.lock().expect("log buffer lock");
                    let merged = FeedPage {
                        entries: page
                            .entries
                            .iter()
                            .map(|record| reconciler::merge(record, &mut buffer))
                            .collect(),
                        next_cursor: page.next_cursor,
                        has_more: page.has_more,
                    };
                    scope
                        .feed
                        .lock()
                        .expect("log feed lock")
                        .apply_older_page(merged)
                };
                Ok(Some(outcome))
            }
            Err(err) => {
                scope
                    .feed
                    .lock()
                    .expect("log feed lock")
                    .abort_older_load();
                self.notifier
                    .notify(Notification::error(err.user_message()));
                Err(err)
            }
        }
    }

    /// Re-fetches the newest page and reconciles it into the feed. Unsaved
    /// keystrokes survive: every record passes through the reconciler
    /// before it replaces what the list shows.
    pub async fn refresh_logs(&self) -> Result<(), AppError> {
        let scope = self.current_scope()?;
        let page = self
            .gateway
            .list_logs(&scope.application_id, None, self.page_size)
            .await?;

        let mut buffer = scope.buffer.lock().expect("log buffer lock");
        let mut feed = scope.feed.lock().expect("log feed lock");
        for record in &page.entries {
            let merged = reconciler::merge(record, &mut buffer);
            feed.upsert(merged);
        }
        Ok(())
    }

    pub fn toggle_month(&self, month: MonthKey) -> bool {
        self.current_scope()
            .map(|scope| {
                scope
                    .feed
                    .lock()
                    .expect("log feed lock")
                    .toggle_collapse(month)
            })
            .unwrap_or(false)
    }

    /// Cancels every pending timer. Call on shutdown; unsaved edits are
    /// dropped with the scope.
    pub fn shutdown(&self) {
        self.clear_selection();
    }
}
