use crate::application::services::edit_buffer::EditBuffer;
use crate::domain::entities::EditableRecord;
use crate::domain::value_objects::FieldName;

/// Merges a freshly fetched authoritative record with the pending local
/// overrides for it, so a refresh never clobbers unsaved keystrokes.
///
/// Per editable field:
/// - no pending entry → the server value stands;
/// - pending value equals the incoming server value → confirmed: the entry
///   is cleared and the server value adopted (this is how a completed save
///   round-trip releases the buffer);
/// - pending value differs → the pending value wins in the returned record
///   and the entry stays buffered. This holds even when the server revision
///   has moved past the entry's base revision: single-client,
///   last-local-edit-wins is the documented policy, and a periodic refresh
///   must never revert text the user is mid-typing.
pub fn merge<R>(server_record: &R, buffer: &mut EditBuffer) -> R
where
    R: EditableRecord + Clone,
{
    let mut merged = server_record.clone();
    let id = server_record.entity_id().clone();

    for &name in R::editable_fields() {
        let field = FieldName::known(name);
        let Some(pending) = buffer.get(&id, &field) else {
            continue;
        };
        let pending_value = pending.value.clone();
        let base_revision = pending.base_revision;

        let server_value = server_record.field(&field);
        if server_value.as_ref() == Some(&pending_value) {
            buffer.clear(&id, &field);
            continue;
        }

        if base_revision < server_record.revision() {
            tracing::debug!(
                target: "sync::reconcile",
                entity_id = %id,
                field = %field,
                "keeping pending edit over newer server revision"
            );
        }
        if let Err(err) = merged.set_field(&field, &pending_value) {
            // A buffered value the record refuses (e.g. blanked required
            // field mid-typing): render the server value but keep the
            // entry so the user's input is not lost.
            tracing::debug!(
                target: "sync::reconcile",
                entity_id = %id,
                field = %field,
                error = %err,
                "pending value not renderable; falling back to server value"
            );
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::application_log::{fields, ApplicationLog};
    use crate::domain::value_objects::{EntityId, FieldValue};
    use chrono::{DateTime, TimeZone, Utc};

    fn rev(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().expect("timestamp")
    }

    fn server_log(note: &str, updated_at: DateTime<Utc>) -> ApplicationLog {
        ApplicationLog {
            id: EntityId::new("log-1".to_string()).expect("id"),
            application_id: EntityId::new("app-1".to_string()).expect("id"),
            process_name: "Phone Screen".to_string(),
            note: note.to_string(),
            audio_url: None,
            occurred_at: rev(0),
            created_at: rev(0),
            updated_at,
        }
    }

    fn note_field() -> FieldName {
        FieldName::known(fields::NOTE)
    }

    #[test]
    fn stale_refresh_does_not_clobber_pending_edit() {
        let mut buffer = EditBuffer::new();
        let log = server_log("server value", rev(200));
        buffer.set(
            &log.id,
            &note_field(),
            FieldValue::text("typing…"),
            rev(100),
        );

        let merged = merge(&log, &mut buffer);

        assert_eq!(merged.note, "typing…");
        assert!(
            buffer.get(&log.id, &note_field()).is_some(),
            "pending entry must survive the refresh"
        );
    }

    #[test]
    fn matching_server_value_confirms_and_clears() {
        let mut buffer = EditBuffer::new();
        let log = server_log("abc", rev(200));
        buffer.set(&log.id, &note_field(), FieldValue::text("abc"), rev(100));

        let merged = merge(&log, &mut buffer);

        assert_eq!(merged.note, "abc");
        assert!(
            buffer.get(&log.id, &note_field()).is_none(),
            "confirmed entry must be removed"
        );
    }

    #[test]
    fn fields_without_pending_entries_adopt_server_values() {
        let mut buffer = EditBuffer::new();
        let log = server_log("from server", rev(200));

        let merged = merge(&log, &mut buffer);

        assert_eq!(merged.note, "from server");
        assert_eq!(merged.process_name, "Phone Screen");
        assert!(buffer.is_empty());
    }

    #[test]
    fn save_then_more_typing_keeps_the_newer_keystrokes() {
        // Save round-trip confirmed "ab", but the user typed "abc" while it
        // was in flight: the refresh carries "ab", the buffer holds "abc".
        let mut buffer = EditBuffer::new();
        let log = server_log("ab", rev(300));
        buffer.set(&log.id, &note_field(), FieldValue::text("abc"), rev(200));

        let merged = merge(&log, &mut buffer);

        assert_eq!(merged.note, "abc");
        assert!(buffer.get(&log.id, &note_field()).is_some());
    }

    #[test]
    fn unrenderable_pending_value_falls_back_but_stays_buffered() {
        // process_name blanked mid-typing: the record refuses the value, the
        // view shows the server value, the keystrokes stay buffered.
        let mut buffer = EditBuffer::new();
        let log = server_log("", rev(200));
        let name_field = FieldName::known(fields::PROCESS_NAME);
        buffer.set(&log.id, &name_field, FieldValue::text("   "), rev(100));

        let merged = merge(&log, &mut buffer);

        assert_eq!(merged.process_name, "Phone Screen");
        assert!(buffer.get(&log.id, &name_field).is_some());
    }
}
