use async_trait::async_trait;
use chrono::NaiveDate;
use mockall::mock;

use shukatsu_lib::application::ports::job_board::WorkLogGateway;
use shukatsu_lib::domain::entities::{MonthlySummary, WorkLogEntry, WorkLogUpsert};
use shukatsu_lib::domain::value_objects::MonthKey;
use shukatsu_lib::shared::error::AppError;

mock! {
    pub WorkLogGatewayPort {}

    #[async_trait]
    impl WorkLogGateway for WorkLogGatewayPort {
        async fn list_entries(&self) -> Result<Vec<WorkLogEntry>, AppError>;
        async fn upsert_entry(&self, upsert: WorkLogUpsert) -> Result<WorkLogEntry, AppError>;
        async fn delete_entry(&self, date: NaiveDate) -> Result<(), AppError>;
        async fn get_summary(&self, month: MonthKey) -> Result<Option<MonthlySummary>, AppError>;
        async fn generate_summary(&self, month: MonthKey) -> Result<MonthlySummary, AppError>;
    }
}

pub type MockWorkLogGateway = MockWorkLogGatewayPort;
