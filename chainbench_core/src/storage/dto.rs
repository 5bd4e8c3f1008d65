use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::benchmark::dto::BenchmarkRun;
use crate::pricing::dto::PricingRun;
use crate::providers::dto::ProviderName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TriggerType {
    Manual,
    Scheduled,
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerType::Manual => write!(f, "manual"),
            TriggerType::Scheduled => write!(f, "scheduled"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredBenchmarkRun {
    #[serde(flatten)]
    pub run: BenchmarkRun,
    pub trigger_type: TriggerType,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredPricingRun {
    #[serde(flatten)]
    pub run: PricingRun,
    pub trigger_type: TriggerType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LatencySnapshot {
    pub provider: ProviderName,
    pub display_name: String,
    pub color: String,
    pub latency_avg: u64,
    pub latency_p95: u64,
    pub reliability_rate: u32,
    pub throughput_rps: f64,
    pub completeness_score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CoverageSnapshot {
    pub provider: ProviderName,
    pub display_name: String,
    pub color: String,
    pub coverage_pct: u32,
    pub avg_deviation: Option<f64>,
}

/// Per-provider latency metrics of one completed balance run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LatencyTrendPoint {
    pub id: String,
    pub timestamp: i64,
    pub providers: Vec<LatencySnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CoverageTrendPoint {
    pub id: String,
    pub timestamp: i64,
    pub providers: Vec<CoverageSnapshot>,
}
