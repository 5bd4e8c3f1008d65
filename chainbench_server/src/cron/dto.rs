use serde::Serialize;
use utoipa::ToSchema;

pub const CRON_WALLET: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";
pub const CRON_ITERATIONS: u32 = 2;
pub const CRON_CONCURRENCY: u32 = 1;
pub const CRON_MIN_INTERVAL_MS: i64 = 15 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    Completed,
    Skipped,
    Failed,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSummary {
    pub status: ScenarioStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub providers: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ScenarioSummary {
    pub fn completed(run_id: Option<String>, providers: usize) -> Self {
        Self {
            status: ScenarioStatus::Completed,
            run_id,
            providers: Some(providers),
            reason: None,
        }
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            status: ScenarioStatus::Skipped,
            run_id: None,
            providers: None,
            reason: Some(reason.into()),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            status: ScenarioStatus::Failed,
            run_id: None,
            providers: None,
            reason: Some(reason.into()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CronSummary {
    pub timestamp: String,
    pub balances: ScenarioSummary,
    pub pricing: ScenarioSummary,
    pub nfts: ScenarioSummary,
}
