pub mod application_log;
pub mod editable;
pub mod job_application;
pub mod monthly_summary;
pub mod work_log;

pub use application_log::{ApplicationLog, ApplicationLogDraft};
pub use editable::EditableRecord;
pub use job_application::{ApplicationFilter, JobApplication, JobApplicationDraft};
pub use monthly_summary::MonthlySummary;
pub use work_log::{WorkLogEntry, WorkLogUpsert};
