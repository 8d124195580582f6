use crate::domain::value_objects::MonthKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Generated monthly summary of work log entries. The generation itself is
/// a backend concern; the client only tracks the request around it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub month: MonthKey,
    pub summary: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MonthlySummary {
    pub fn was_regenerated(&self) -> bool {
        self.updated_at != self.created_at
    }
}
