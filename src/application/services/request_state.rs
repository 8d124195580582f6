use crate::shared::error::AppError;
use std::collections::HashMap;
use std::hash::Hash;

/// State of one on-demand remote computation (e.g. a monthly summary).
#[derive(Debug, Clone, PartialEq)]
pub enum RequestState<T> {
    Idle,
    Loading,
    Success(T),
    Error(String),
}

impl<T> Default for RequestState<T> {
    fn default() -> Self {
        RequestState::Idle
    }
}

impl<T> RequestState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            RequestState::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RequestState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Per-target request slots. Transitions:
/// `Idle | Success | Error → Loading` via `begin`; `Loading → Success |
/// Error` via `complete`. Re-triggering is how "regenerate" and "try again"
/// work; `begin` while already Loading is refused so two completions can
/// never race into one slot.
#[derive(Debug, Default)]
pub struct RequestTracker<K, T> {
    slots: HashMap<K, RequestState<T>>,
}

impl<K, T> RequestTracker<K, T>
where
    K: Eq + Hash + Clone + std::fmt::Display,
{
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }

    /// Targets never triggered report `Idle`.
    pub fn state(&self, key: &K) -> RequestState<T>
    where
        T: Clone,
    {
        self.slots.get(key).cloned().unwrap_or_default()
    }

    pub fn is_loading(&self, key: &K) -> bool {
        self.slots
            .get(key)
            .map(RequestState::is_loading)
            .unwrap_or(false)
    }

    /// Moves the slot to `Loading`. Returns `false` (and changes nothing)
    /// when a request for the target is already in flight.
    pub fn begin(&mut self, key: K) -> bool {
        let slot = self.slots.entry(key).or_default();
        if slot.is_loading() {
            return false;
        }
        *slot = RequestState::Loading;
        true
    }

    /// Resolves the in-flight request. The error message is stored verbatim
    /// for display. A completion arriving when the slot is not `Loading`
    /// (the target was reset or torn down meanwhile) is swallowed with a
    /// warning, never a panic.
    pub fn complete(&mut self, key: &K, result: Result<T, AppError>) {
        match self.slots.get_mut(key) {
            Some(slot) if slot.is_loading() => {
                *slot = match result {
                    Ok(value) => RequestState::Success(value),
                    Err(err) => RequestState::Error(err.user_message()),
                };
            }
            _ => {
                tracing::warn!(
                    target: "sync::request_state",
                    key = %key,
                    "dropping completion for a request that is no longer loading"
                );
            }
        }
    }

    /// Seeds a slot with an already-known result (e.g. a summary fetched on
    /// selection) without going through Loading.
    pub fn put(&mut self, key: K, value: T) {
        self.slots.insert(key, RequestState::Success(value));
    }

    pub fn reset(&mut self, key: &K) {
        self.slots.remove(key);
    }
}
