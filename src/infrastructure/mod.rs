pub mod api;
pub mod notification;

pub use api::RestJobBoardClient;
pub use notification::BroadcastNotifier;
