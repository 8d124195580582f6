use crate::application::services::{ApplicationService, WorkLogService};
use crate::infrastructure::{BroadcastNotifier, RestJobBoardClient};
use crate::presentation::handlers::{ApplicationHandler, WorkLogHandler};
use crate::shared::config::AppConfig;
use std::sync::Arc;

/// アプリケーション全体の状態を管理する構造体
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub notifier: Arc<BroadcastNotifier>,
    pub application_handler: Arc<ApplicationHandler>,
    pub work_log_handler: Arc<WorkLogHandler>,
}

impl AppState {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

        let client = Arc::new(RestJobBoardClient::new(&config.api)?);
        let notifier = Arc::new(BroadcastNotifier::default());

        let application_service = Arc::new(ApplicationService::new(
            client.clone(),
            notifier.clone(),
            config.sync.debounce_ms,
            config.sync.page_size,
        ));
        let work_log_service = Arc::new(WorkLogService::new(
            client,
            notifier.clone(),
            config.sync.debounce_ms,
        ));

        Ok(Self {
            config,
            notifier,
            application_handler: Arc::new(ApplicationHandler::new(application_service)),
            work_log_handler: Arc::new(WorkLogHandler::new(work_log_service)),
        })
    }

    /// シャットダウン時に全タイマーを止める。未保存の編集は破棄される。
    pub fn shutdown(&self) {
        self.application_handler.shutdown();
        self.work_log_handler.shutdown();
    }
}
