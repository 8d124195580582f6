pub mod job_board;
pub mod notifier;

pub use job_board::{
    ApplicationGateway, EntityPatch, FeedCursor, FeedPage, WorkLogGateway,
};
pub use notifier::{Notification, NotificationKind, Notifier};
