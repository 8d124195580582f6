use crate::application::ports::job_board::{EntityPatch, FeedPage, WorkLogGateway};
use crate::application::ports::notifier::{Notification, Notifier};
use crate::application::services::chrono_feed::ChronoFeed;
use crate::application::services::debounce::DebounceScheduler;
use crate::application::services::edit_buffer::EditBuffer;
use crate::application::services::reconciler;
use crate::application::services::request_state::{RequestState, RequestTracker};
use crate::application::services::save_coordinator::{SaveCoordinator, SavePerformer};
use crate::domain::entities::monthly_summary::MonthlySummary;
use crate::domain::entities::work_log::{fields as entry_fields, WorkLogEntry, WorkLogUpsert};
use crate::domain::entities::EditableRecord;
use crate::domain::value_objects::{EntityId, FieldName, FieldValue, MonthKey};
use crate::shared::error::AppError;
use crate::shared::validation::ValidationFailureKind;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

/// The work-log feed scope. Unlike the per-application log feed it lives
/// for the whole service lifetime; `shutdown` tears it down.
struct WorkLogScope {
    buffer: Mutex<EditBuffer>,
    feed: Mutex<ChronoFeed<WorkLogEntry>>,
    scheduler: DebounceScheduler,
    coordinator: SaveCoordinator,
}

/// Save step for debounced content edits. The backend upserts by date, so
/// the performer resolves the entry's date from the feed before calling
/// out. No success toast: the editing bubble shows its own indicator.
struct EntrySavePerformer {
    gateway: Arc<dyn WorkLogGateway>,
    notifier: Arc<dyn Notifier>,
    scope: Weak<WorkLogScope>,
}

#[async_trait]
impl SavePerformer for EntrySavePerformer {
    async fn perform_save(&self, id: &EntityId, patch: EntityPatch) -> Result<(), AppError> {
        let Some(scope) = self.scope.upgrade() else {
            tracing::debug!(
                target: "sync::worklogs",
                entity_id = %id,
                "dropping save for a torn-down feed"
            );
            return Ok(());
        };

        let date = {
            let feed = scope.feed.lock().expect("work log feed lock");
            feed.get(id)
                .map(|entry| entry.date)
                .ok_or_else(|| AppError::NotFound(format!("Unknown work log entry: {id}")))?
        };
        let content = patch
            .get(&FieldName::known(entry_fields::CONTENT))
            .and_then(|value| value.as_str().map(ToString::to_string))
            .unwrap_or_default();

        match self
            .gateway
            .upsert_entry(WorkLogUpsert {
                date,
                content,
                append: false,
            })
            .await
        {
            Ok(record) => {
                let mut buffer = scope.buffer.lock().expect("work log buffer lock");
                let merged = reconciler::merge(&record, &mut buffer);
                scope
                    .feed
                    .lock()
                    .expect("work log feed lock")
                    .upsert(merged);
                Ok(())
            }
            Err(err) => {
                self.notifier
                    .notify(Notification::error(err.user_message()));
                Err(err)
            }
        }
    }
}

/// Daily work logs: chat-style month-grouped feed, debounced content
/// edits, and the monthly-summary request machine.
pub struct WorkLogService {
    gateway: Arc<dyn WorkLogGateway>,
    notifier: Arc<dyn Notifier>,
    debounce_delay: Duration,
    scope: Arc<WorkLogScope>,
    summaries: Mutex<RequestTracker<MonthKey, MonthlySummary>>,
    selected_month: Mutex<Option<MonthKey>>,
}

impl WorkLogService {
    pub fn new(
        gateway: Arc<dyn WorkLogGateway>,
        notifier: Arc<dyn Notifier>,
        debounce_ms: u64,
    ) -> Self {
        let scope = Arc::new_cyclic(|weak: &Weak<WorkLogScope>| WorkLogScope {
            buffer: Mutex::new(EditBuffer::new()),
            feed: Mutex::new(ChronoFeed::new()),
            scheduler: DebounceScheduler::new(),
            coordinator: SaveCoordinator::new(Arc::new(EntrySavePerformer {
                gateway: Arc::clone(&gateway),
                notifier: Arc::clone(&notifier),
                scope: weak.clone(),
            })),
        });

        Self {
            gateway,
            notifier,
            debounce_delay: Duration::from_millis(debounce_ms),
            scope,
            summaries: Mutex::new(RequestTracker::new()),
            selected_month: Mutex::new(None),
        }
    }

    // --- feed -------------------------------------------------------------

    /// Loads the full entry list. The work-log panel shows everything and
    /// relies on collapse rather than pagination for old months.
    pub async fn load_entries(&self) -> Result<usize, AppError> {
        let entries = self.gateway.list_entries().await?;
        let count = entries.len();

        let mut buffer = self.scope.buffer.lock().expect("work log buffer lock");
        let merged = entries
            .iter()
            .map(|record| reconciler::merge(record, &mut buffer))
            .collect();
        self.scope
            .feed
            .lock()
            .expect("work log feed lock")
            .replace_all(FeedPage::exhausted(merged));
        Ok(count)
    }

    /// Entries with pending overrides applied, oldest first.
    pub fn rendered_entries(&self) -> Vec<WorkLogEntry> {
        let mut buffer = self.scope.buffer.lock().expect("work log buffer lock");
        let feed = self.scope.feed.lock().expect("work log feed lock");
        feed.entries()
            .iter()
            .map(|record| reconciler::merge(record, &mut buffer))
            .collect()
    }

    pub fn entry_groups(&self) -> Vec<(MonthKey, bool, usize)> {
        let feed = self.scope.feed.lock().expect("work log feed lock");
        feed.group()
            .iter()
            .map(|group| (group.month, group.collapsed, group.entries.len()))
            .collect()
    }

    pub fn toggle_month(&self, month: MonthKey) -> bool {
        self.scope
            .feed
            .lock()
            .expect("work log feed lock")
            .toggle_collapse(month)
    }

    // --- compose & delete -------------------------------------------------

    /// Compose-bar submit: appends to the date's entry, creating it when
    /// missing. Not buffered — created, not updated.
    pub async fn add_entry(&self, date: NaiveDate, content: String) -> Result<WorkLogEntry, AppError> {
        let upsert = WorkLogUpsert {
            date,
            content,
            append: true,
        };
        upsert
            .validate()
            .map_err(AppError::validation_mapper(ValidationFailureKind::RequiredField))?;

        match self.gateway.upsert_entry(upsert).await {
            Ok(created) => {
                self.notifier
                    .notify(Notification::success("Work log added"));
                self.scope
                    .feed
                    .lock()
                    .expect("work log feed lock")
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

    pub async fn delete_entry(&self, date: NaiveDate) -> Result<(), AppError> {
        match self.gateway.delete_entry(date).await {
            Ok(()) => {
                self.notifier
                    .notify(Notification::success("Work log deleted"));
                let mut feed = self.scope.feed.lock().expect("work log feed lock");
                let id = feed
                    .entries()
                    .iter()
                    .find(|entry| entry.date == date)
                    .map(|entry| entry.id.clone());
                if let Some(id) = id {
                    feed.remove(&id);
                    drop(feed);
                    self.scope
                        .buffer
                        .lock()
                        .expect("work log buffer lock")
                        .clear_entity(&id);
                    self.scope.scheduler.cancel(&id);
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

    // --- the buffered edit path -------------------------------------------

    /// Keystroke entry point for an existing entry's content.
    pub fn edit_entry(&self, id: &EntityId, content: String) -> Result<(), AppError> {
        let base_revision = {
            let feed = self.scope.feed.lock().expect("work log feed lock");
            feed.get(id)
                .map(|entry| entry.revision())
                .ok_or_else(|| AppError::NotFound(format!("Unknown work log entry: {id}")))?
        };

        let field = FieldName::known(entry_fields::CONTENT);
        self.scope
            .buffer
            .lock()
            .expect("work log buffer lock")
            .set(id, &field, FieldValue::text(content), base_revision);

        let weak = Arc::downgrade(&self.scope);
        let fire_id = id.clone();
        self.scope
            .scheduler
            .touch(id.clone(), self.debounce_delay, move || async move {
                let Some(scope) = weak.upgrade() else {
                    return;
                };
                let patch = scope
                    .buffer
                    .lock()
                    .expect("work log buffer lock")
                    .snapshot(&fire_id);
                if let Err(err) = scope.coordinator.commit(fire_id.clone(), patch).await {
                    tracing::warn!(
                        target: "sync::worklogs",
                        entity_id = %fire_id,
                        error = %err,
                        "debounced save failed"
                    );
                }
            });

        Ok(())
    }

    // --- monthly summaries ------------------------------------------------

    /// Selecting a month opens its summary panel. A summary that already
    /// exists server-side is fetched lazily; "none yet" leaves the slot
    /// Idle so the panel offers to generate one.
    pub async fn select_month(&self, month: MonthKey) -> Result<(), AppError> {
        *self.selected_month.lock().expect("selected month lock") = Some(month);

        let should_fetch = {
            let mut summaries = self.summaries.lock().expect("summaries lock");
            matches!(summaries.state(&month), RequestState::Idle) && summaries.begin(month)
        };
        if !should_fetch {
            return Ok(());
        }

        let result = self.gateway.get_summary(month).await;
        let mut summaries = self.summaries.lock().expect("summaries lock");
        match result {
            Ok(Some(summary)) => summaries.complete(&month, Ok(summary)),
            Ok(None) => summaries.reset(&month),
            Err(err) if err.is_not_found() => summaries.reset(&month),
            Err(err) => summaries.complete(&month, Err(err)),
        }
        Ok(())
    }

    pub fn selected_month(&self) -> Option<MonthKey> {
        *self.selected_month.lock().expect("selected month lock")
    }

    pub fn clear_selected_month(&self) {
        *self.selected_month.lock().expect("selected month lock") = None;
    }

    /// Triggers generation (or regeneration) of a month's summary. Returns
    /// `false` without calling out when one is already being generated.
    pub async fn generate_summary(&self, month: MonthKey) -> Result<bool, AppError> {
        {
            let mut summaries = self.summaries.lock().expect("summaries lock");
            if !summaries.begin(month) {
                tracing::debug!(
                    target: "sync::summary",
                    month = %month,
                    "generation already in flight"
                );
                return Ok(false);
            }
        }

        let result = self.gateway.generate_summary(month).await;
        let failed = result.is_err();
        self.summaries
            .lock()
            .expect("summaries lock")
            .complete(&month, result);
        Ok(!failed)
    }

    pub fn summary_state(&self, month: &MonthKey) -> RequestState<MonthlySummary> {
        self.summaries.lock().expect("summaries lock").state(month)
    }

    /// Cancels every pending timer; the feed scope dies with the service.
    pub fn shutdown(&self) {
        self.scope.scheduler.cancel_all();
    }
}
