use crate::application::ports::job_board::EntityPatch;
use crate::domain::value_objects::{EntityId, FieldName, FieldValue};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// A field override the server has not confirmed yet. `base_revision` is
/// the `updated_at` of the record the editing burst started against; it is
/// fixed at the first keystroke and only released when the entry clears.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEdit {
    pub value: FieldValue,
    pub base_revision: DateTime<Utc>,
}

/// Local, unsaved overrides keyed by `(entity, field)`. Last write wins per
/// key. Pure key-value state: no timers, no network, and it never fails —
/// the view reads through it so the user's keystrokes are never reverted
/// while a save or refresh is in flight.
#[derive(Debug, Default)]
pub struct EditBuffer {
    entries: HashMap<(EntityId, FieldName), PendingEdit>,
}

impl EditBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` unconditionally. An entry that already exists keeps
    /// its original `base_revision`: the burst is still based on the record
    /// revision the user started typing against.
    pub fn set(
        &mut self,
        id: &EntityId,
        field: &FieldName,
        value: FieldValue,
        base_revision: DateTime<Utc>,
    ) {
        let key = (id.clone(), field.clone());
        match self.entries.get_mut(&key) {
            Some(pending) => pending.value = value,
            None => {
                self.entries.insert(
                    key,
                    PendingEdit {
                        value,
                        base_revision,
                    },
                );
            }
        }
    }

    pub fn get(&self, id: &EntityId, field: &FieldName) -> Option<&PendingEdit> {
        self.entries.get(&(id.clone(), field.clone()))
    }

    /// What the view renders: the pending value if present, else the last
    /// known server value.
    pub fn value_or(&self, id: &EntityId, field: &FieldName, fallback: FieldValue) -> FieldValue {
        self.get(id, field)
            .map(|pending| pending.value.clone())
            .unwrap_or(fallback)
    }

    pub fn clear(&mut self, id: &EntityId, field: &FieldName) {
        self.entries.remove(&(id.clone(), field.clone()));
    }

    pub fn clear_entity(&mut self, id: &EntityId) {
        self.entries.retain(|(entity, _), _| entity != id);
    }

    pub fn has_pending(&self, id: &EntityId) -> bool {
        self.entries.keys().any(|(entity, _)| entity == id)
    }

    /// Snapshot of every pending field of one entity, the payload a save
    /// carries. Taken at debounce fire time, never at schedule time.
    pub fn snapshot(&self, id: &EntityId) -> EntityPatch {
        let mut patch = EntityPatch::default();
        for ((entity, field), pending) in &self.entries {
            if entity == id {
                patch.set(field.clone(), pending.value.clone());
            }
        }
        patch
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
