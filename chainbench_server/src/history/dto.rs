use chainbench_core::storage::dto::{StoredBenchmarkRun, StoredPricingRun};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_HISTORY_LIMIT: usize = 30;
pub const MAX_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    #[default]
    All,
    Balances,
    Pricing,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    #[serde(rename = "type")]
    pub kind: Option<HistoryKind>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl HistoryQuery {
    pub fn limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT)
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark_runs: Option<Vec<StoredBenchmarkRun>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark_total: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing_runs: Option<Vec<StoredPricingRun>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing_total: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "type", content = "run", rename_all = "lowercase")]
pub enum HistoryEntry {
    Balances(StoredBenchmarkRun),
    Pricing(StoredPricingRun),
}
