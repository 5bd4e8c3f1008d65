use chainbench_core::storage::dto::{CoverageTrendPoint, LatencyTrendPoint};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::history::dto::{DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TrendsQuery {
    pub limit: Option<usize>,
}

impl TrendsQuery {
    pub fn limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT)
    }
}

/// Both series run oldest to newest.
#[derive(Debug, Serialize, ToSchema)]
pub struct TrendsResponse {
    pub latency: Vec<LatencyTrendPoint>,
    pub coverage: Vec<CoverageTrendPoint>,
}
