pub mod application_handler;
pub mod work_log_handler;

pub use application_handler::ApplicationHandler;
pub use work_log_handler::WorkLogHandler;
