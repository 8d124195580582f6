use crate::application::ports::job_board::EntityPatch;
use crate::domain::value_objects::EntityId;
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Executes one save attempt. Implemented by the feature service, which owns
/// the gateway call, the reconcile-on-success step and user notification —
/// the coordinator itself stays pure serialization logic.
#[async_trait]
pub trait SavePerformer: Send + Sync {
    async fn perform_save(&self, id: &EntityId, patch: EntityPatch) -> Result<(), AppError>;
}

#[derive(Default)]
struct SaveLane {
    in_flight: bool,
    queued: Option<EntityPatch>,
}

/// Outcome of a `commit` call as seen by its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// This call performed one or more saves and the last one succeeded.
    Saved,
    /// A save was already in flight; the payload was queued (replacing any
    /// previously queued payload) and will be sent when it completes.
    Queued,
}

/// Serializes persistence per entity: at most one save in flight per id.
/// A commit arriving mid-save replaces the queued payload and returns
/// immediately; when the in-flight save completes — success or failure —
/// the queued payload is sent right away. Intermediate payloads are never
/// sent, and a newer payload is never overtaken by an older one.
pub struct SaveCoordinator {
    performer: Arc<dyn SavePerformer>,
    lanes: Mutex<HashMap<EntityId, SaveLane>>,
}

impl SaveCoordinator {
    pub fn new(performer: Arc<dyn SavePerformer>) -> Self {
        Self {
            performer,
            lanes: Mutex::new(HashMap::new()),
        }
    }

    /// Failure policy: errors surface to the caller (the performer has
    /// already notified per attempt) and nothing retries automatically —
    /// the next edit or an explicit action re-commits. When a failure is
    /// followed by a queued payload the queued save still runs; the
    /// returned result is the final attempt's.
    pub async fn commit(&self, id: EntityId, patch: EntityPatch) -> Result<CommitOutcome, AppError> {
        if patch.is_empty() {
            return Ok(CommitOutcome::Saved);
        }

        {
            let mut lanes = self.lanes.lock().expect("save lane lock");
            let lane = lanes.entry(id.clone()).or_default();
            if lane.in_flight {
                lane.queued = Some(patch);
                return Ok(CommitOutcome::Queued);
            }
            lane.in_flight = true;
        }

        let mut current = patch;
        loop {
            let result = self.performer.perform_save(&id, current).await;

            let next = {
                let mut lanes = self.lanes.lock().expect("save lane lock");
                match lanes.get_mut(&id) {
                    Some(lane) => {
                        let queued = lane.queued.take();
                        if queued.is_none() {
                            lanes.remove(&id);
                        }
                        queued
                    }
                    None => None,
                }
            };

            match next {
                Some(queued) => {
                    if let Err(err) = &result {
                        tracing::warn!(
                            target: "sync::coordinator",
                            entity_id = %id,
                            error = %err,
                            "save failed; flushing queued payload"
                        );
                    }
                    current = queued;
                }
                None => return result.map(|_| CommitOutcome::Saved),
            }
        }
    }

    pub fn is_in_flight(&self, id: &EntityId) -> bool {
        self.lanes
            .lock()
            .expect("save lane lock")
            .get(id)
            .map(|lane| lane.in_flight)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{FieldName, FieldValue};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tokio::sync::Semaphore;

    fn id(raw: &str) -> EntityId {
        EntityId::new(raw.to_string()).expect("entity id")
    }

    fn patch(value: &str) -> EntityPatch {
        let mut patch = EntityPatch::default();
        patch.set(
            FieldName::new("note".to_string()).expect("field"),
            FieldValue::text(value),
        );
        patch
    }

    /// Performer that blocks each save until released, recording payloads.
    struct GatedPerformer {
        sent: Mutex<Vec<String>>,
        gate: Semaphore,
        hold: AtomicBool,
        fail_next: AtomicBool,
    }

    impl GatedPerformer {
        fn new(hold: bool) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                gate: Semaphore::new(0),
                hold: AtomicBool::new(hold),
                fail_next: AtomicBool::new(false),
            }
        }

        fn sent(&self) -> Vec<String> {
            self.sent.lock().expect("sent lock").clone()
        }

        fn release(&self) {
            self.hold.store(false, Ordering::SeqCst);
            self.gate.add_permits(64);
        }
    }

    #[async_trait]
    impl SavePerformer for GatedPerformer {
        async fn perform_save(&self, _id: &EntityId, patch: EntityPatch) -> Result<(), AppError> {
            let note = patch
                .get(&FieldName::new("note".to_string()).expect("field"))
                .and_then(|v| v.as_str().map(ToString::to_string))
                .unwrap_or_default();
            self.sent.lock().expect("sent lock").push(note);

            if self.hold.load(Ordering::SeqCst) {
                let permit = self.gate.acquire().await.expect("gate open");
                permit.forget();
            }
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(AppError::Network("connection reset".to_string()));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn commit_sends_immediately_when_idle() {
        let performer = Arc::new(GatedPerformer::new(false));
        let coordinator = SaveCoordinator::new(performer.clone());

        let outcome = coordinator
            .commit(id("e1"), patch("abc"))
            .await
            .expect("commit");

        assert_eq!(outcome, CommitOutcome::Saved);
        assert_eq!(performer.sent(), vec!["abc".to_string()]);
        assert!(!coordinator.is_in_flight(&id("e1")));
    }

    #[tokio::test]
    async fn mid_flight_commits_queue_and_flush_latest_only() {
        let performer = Arc::new(GatedPerformer::new(true));
        let coordinator = Arc::new(SaveCoordinator::new(performer.clone()));

        let first = {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move { coordinator.commit(id("e1"), patch("v1")).await })
        };
        // Let the first commit reach the performer and park on the gate.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(coordinator.is_in_flight(&id("e1")));

        // Two more commits while in flight: the first queued payload is
        // replaced by the second, so "v2" must never hit the wire.
        let outcome = coordinator
            .commit(id("e1"), patch("v2"))
            .await
            .expect("queued");
        assert_eq!(outcome, CommitOutcome::Queued);
        let outcome = coordinator
            .commit(id("e1"), patch("v3"))
            .await
            .expect("queued");
        assert_eq!(outcome, CommitOutcome::Queued);

        performer.release();
        first.await.expect("join").expect("first commit");

        assert_eq!(performer.sent(), vec!["v1".to_string(), "v3".to_string()]);
        assert!(!coordinator.is_in_flight(&id("e1")));
    }

    #[tokio::test]
    async fn failure_still_flushes_queued_payload() {
        let performer = Arc::new(GatedPerformer::new(true));
        performer.fail_next.store(true, Ordering::SeqCst);
        let coordinator = Arc::new(SaveCoordinator::new(performer.clone()));

        let first = {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move { coordinator.commit(id("e1"), patch("v1")).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        coordinator
            .commit(id("e1"), patch("v2"))
            .await
            .expect("queued");

        performer.release();
        // First attempt fails, but the queued v2 runs and succeeds; the
        // driving call reports the final attempt's result.
        let result = first.await.expect("join");
        assert!(result.is_ok());
        assert_eq!(performer.sent(), vec!["v1".to_string(), "v2".to_string()]);
    }

    #[tokio::test]
    async fn distinct_entities_do_not_serialize_against_each_other() {
        let performer = Arc::new(GatedPerformer::new(false));
        let coordinator = SaveCoordinator::new(performer.clone());

        coordinator
            .commit(id("e1"), patch("one"))
            .await
            .expect("commit e1");
        coordinator
            .commit(id("e2"), patch("two"))
            .await
            .expect("commit e2");

        assert_eq!(performer.sent().len(), 2);
    }

    #[tokio::test]
    async fn empty_patch_is_a_no_op() {
        let performer = Arc::new(GatedPerformer::new(false));
        let coordinator = SaveCoordinator::new(performer.clone());

        coordinator
            .commit(id("e1"), EntityPatch::default())
            .await
            .expect("commit");
        assert!(performer.sent().is_empty());
    }
}
