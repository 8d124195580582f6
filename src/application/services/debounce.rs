use crate::domain::value_objects::EntityId;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

struct TimerSlot {
    seq: u64,
    handle: JoinHandle<()>,
}

/// Per-key restartable timers. `touch` for a key cancels that key's live
/// timer and starts a fresh one, so rapid edits to one entity coalesce into
/// a single fire while distinct entities count down independently.
///
/// The scheduled action is a closure invoked at fire time; whatever state it
/// reads (the edit buffer snapshot) is the state at fire time, not at
/// schedule time, so an edit landing between schedule and fire is included.
pub struct DebounceScheduler {
    timers: Arc<Mutex<HashMap<EntityId, TimerSlot>>>,
    next_seq: Mutex<u64>,
}

impl DebounceScheduler {
    pub fn new() -> Self {
        Self {
            timers: Arc::new(Mutex::new(HashMap::new())),
            next_seq: Mutex::new(0),
        }
    }

    /// Restarts the timer for `key`. The previously scheduled action for the
    /// key is discarded entirely; only the latest one can ever run.
    pub fn touch<F, Fut>(&self, key: EntityId, delay: Duration, action: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let seq = {
            let mut next = self.next_seq.lock().expect("debounce seq lock");
            *next += 1;
            *next
        };

        let timers = Arc::clone(&self.timers);
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Deregister before running so a slow action does not block a
            // new touch for the same key from scheduling.
            {
                let mut timers = timers.lock().expect("debounce timer lock");
                match timers.get(&task_key) {
                    Some(slot) if slot.seq == seq => {
                        timers.remove(&task_key);
                    }
                    // A newer touch replaced this timer between the sleep
                    // and the lock; it will be aborted anyway.
                    _ => return,
                }
            }
            action().await;
        });

        let mut timers = self.timers.lock().expect("debounce timer lock");
        if let Some(previous) = timers.insert(key, TimerSlot { seq, handle }) {
            previous.handle.abort();
        }
    }

    pub fn cancel(&self, key: &EntityId) {
        let mut timers = self.timers.lock().expect("debounce timer lock");
        if let Some(slot) = timers.remove(key) {
            slot.handle.abort();
        }
    }

    /// Cancels every live timer. Required on feed teardown so no save can
    /// fire against a scope that no longer exists.
    pub fn cancel_all(&self) {
        let mut timers = self.timers.lock().expect("debounce timer lock");
        for (_, slot) in timers.drain() {
            slot.handle.abort();
        }
    }

    pub fn pending_count(&self) -> usize {
        self.timers.lock().expect("debounce timer lock").len()
    }
}

impl Default for DebounceScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DebounceScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
