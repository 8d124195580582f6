#![allow(unused_imports)]

pub mod entities;
pub mod value_objects;

pub use entities::{
    ApplicationLog, ApplicationLogDraft, EditableRecord, JobApplication, JobApplicationDraft,
    MonthlySummary, WorkLogEntry, WorkLogUpsert,
};
pub use value_objects::{ApplicationState, EntityId, FieldName, FieldValue, MonthKey};
