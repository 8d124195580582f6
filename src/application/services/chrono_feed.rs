use crate::application::ports::job_board::{FeedCursor, FeedPage};
use crate::domain::value_objects::{EntityId, MonthKey};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// An entry that can live in a chronological feed.
pub trait ChronoEntry {
    fn entry_id(&self) -> &EntityId;
    /// The timestamp the feed sorts and groups by.
    fn occurred_at(&self) -> DateTime<Utc>;
}

/// One contiguous month run of the feed, in sort order.
#[derive(Debug)]
pub struct FeedGroup<'a, E> {
    pub month: MonthKey,
    pub collapsed: bool,
    pub entries: Vec<&'a E>,
}

/// Result of prepending an older page: `anchor` is the entry that was
/// topmost before the prepend, which the shell scrolls back to so the
/// viewport does not jump.
#[derive(Debug, Clone, PartialEq)]
pub struct PrependOutcome {
    pub inserted: usize,
    pub anchor: Option<EntityId>,
}

/// Chronological feed: entries ascending by timestamp (oldest at top,
/// newest at bottom, chat style), month grouping with per-group collapse,
/// and a cursor contract for loading older pages. Collapse state is pure
/// presentation and never persisted.
#[derive(Debug)]
pub struct ChronoFeed<E> {
    entries: Vec<E>,
    collapsed: HashSet<MonthKey>,
    cursor: Option<FeedCursor>,
    has_more: bool,
    loading_older: bool,
}

impl<E: ChronoEntry> ChronoFeed<E> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            collapsed: HashSet::new(),
            cursor: None,
            has_more: false,
            loading_older: false,
        }
    }

    /// Resets the feed from a freshly fetched page (the newest one).
    pub fn replace_all(&mut self, page: FeedPage<E>) {
        self.entries = page.entries;
        self.sort();
        self.cursor = page.next_cursor;
        self.has_more = page.has_more;
        self.loading_older = false;
    }

    fn sort(&mut self) {
        self.entries.sort_by(|a, b| {
            a.occurred_at()
                .cmp(&b.occurred_at())
                .then_with(|| a.entry_id().cmp(b.entry_id()))
        });
    }

    pub fn entries(&self) -> &[E] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &EntityId) -> Option<&E> {
        self.entries.iter().find(|entry| entry.entry_id() == id)
    }

    /// Inserts or replaces by id, keeping sort order.
    pub fn upsert(&mut self, entry: E) {
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|candidate| candidate.entry_id() == entry.entry_id())
        {
            *existing = entry;
        } else {
            self.entries.push(entry);
        }
        self.sort();
    }

    pub fn remove(&mut self, id: &EntityId) -> Option<E> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.entry_id() == id)?;
        Some(self.entries.remove(index))
    }

    /// Month runs in sort order; a new group starts whenever the month key
    /// changes from the previous entry. Collapsed groups still appear (the
    /// header row renders), only their entries are hidden by the caller.
    pub fn group(&self) -> Vec<FeedGroup<'_, E>> {
        let mut groups: Vec<FeedGroup<'_, E>> = Vec::new();
        for entry in &self.entries {
            let month = MonthKey::of_timestamp(entry.occurred_at());
            let boundary = groups
                .last()
                .map(|group| group.month != month)
                .unwrap_or(true);
            if boundary {
                groups.push(FeedGroup {
                    month,
                    collapsed: self.collapsed.contains(&month),
                    entries: Vec::new(),
                });
            }
            if let Some(group) = groups.last_mut() {
                group.entries.push(entry);
            }
        }
        groups
    }

    /// Returns the new collapsed state.
    pub fn toggle_collapse(&mut self, month: MonthKey) -> bool {
        if self.collapsed.remove(&month) {
            false
        } else {
            self.collapsed.insert(month);
            true
        }
    }

    pub fn is_collapsed(&self, month: &MonthKey) -> bool {
        self.collapsed.contains(month)
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading_older(&self) -> bool {
        self.loading_older
    }

    /// Gate for "load older": hands out the cursor only when more pages
    /// exist and no load is pending, atomically marking the load as pending.
    /// The guard is the state flag, not a timer — a second call while one
    /// page is on the wire is a no-op.
    pub fn begin_older_load(&mut self) -> Option<FeedCursor> {
        if !self.has_more || self.loading_older {
            return None;
        }
        let cursor = self.cursor.clone()?;
        self.loading_older = true;
        Some(cursor)
    }

    /// Prepends a fetched page, advancing the cursor exactly once. Returns
    /// the pre-prepend topmost entry so the caller can restore the scroll
    /// anchor.
    pub fn apply_older_page(&mut self, page: FeedPage<E>) -> PrependOutcome {
        let anchor = self.entries.first().map(|entry| entry.entry_id().clone());
        let inserted = page.entries.len();

        self.entries.extend(page.entries);
        self.sort();
        self.cursor = page.next_cursor;
        self.has_more = page.has_more;
        self.loading_older = false;

        PrependOutcome { inserted, anchor }
    }

    /// Clears the pending flag after a failed page fetch; the cursor is
    /// untouched so the next attempt reloads the same boundary.
    pub fn abort_older_load(&mut self) {
        self.loading_older = false;
    }
}

impl<E: ChronoEntry> Default for ChronoFeed<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl ChronoEntry for crate::domain::entities::ApplicationLog {
    fn entry_id(&self) -> &EntityId {
        &self.id
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

impl ChronoEntry for crate::domain::entities::WorkLogEntry {
    fn entry_id(&self) -> &EntityId {
        &self.id
    }

    // 日付単位のエントリは UTC 正午を代表時刻として扱う。
    fn occurred_at(&self) -> DateTime<Utc> {
        self.date
            .and_hms_opt(12, 0, 0)
            .map(|naive| naive.and_utc())
            .unwrap_or(self.created_at)
    }
}
