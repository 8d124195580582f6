pub mod application_service;
pub mod chrono_feed;
pub mod debounce;
pub mod edit_buffer;
pub mod reconciler;
pub mod request_state;
pub mod save_coordinator;
pub mod work_log_service;

pub use application_service::ApplicationService;
pub use chrono_feed::{ChronoEntry, ChronoFeed, FeedGroup, PrependOutcome};
pub use debounce::DebounceScheduler;
pub use edit_buffer::{EditBuffer, PendingEdit};
pub use request_state::{RequestState, RequestTracker};
pub use save_coordinator::{CommitOutcome, SaveCoordinator, SavePerformer};
pub use work_log_service::WorkLogService;
