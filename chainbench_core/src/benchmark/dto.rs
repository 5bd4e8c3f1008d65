use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use utoipa::ToSchema;

use crate::providers::dto::{ProviderName, TokenRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Completed,
    Error,
}

/// Lifecycle of one orchestrator invocation. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Pending,
    Fetching,
    Aggregating,
    Completed,
}

impl RunPhase {
    pub fn next(self) -> Self {
        match self {
            RunPhase::Pending => RunPhase::Fetching,
            RunPhase::Fetching => RunPhase::Aggregating,
            RunPhase::Aggregating | RunPhase::Completed => RunPhase::Completed,
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunPhase::Pending => write!(f, "pending"),
            RunPhase::Fetching => write!(f, "fetching"),
            RunPhase::Aggregating => write!(f, "aggregating"),
            RunPhase::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LatencyStats {
    pub avg: u64,
    pub min: u64,
    pub max: u64,
    pub p95: u64,
    pub samples: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompletenessResult {
    pub score: u32,
    pub total_fields: u32,
    pub present_fields: u32,
    pub field_breakdown: BTreeMap<String, bool>,
    pub tokens_returned: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReliabilityResult {
    pub success_rate: u32,
    pub total_requests: u32,
    pub successful_requests: u32,
    pub failed_requests: u32,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ThroughputResult {
    pub requests_per_second: f64,
    pub concurrent_requests: u32,
    pub completed_in_window: u32,
    pub window_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderBenchmarkResult {
    pub provider: ProviderName,
    pub display_name: String,
    pub color: String,
    pub latency: LatencyStats,
    pub completeness: CompletenessResult,
    pub reliability: ReliabilityResult,
    pub throughput: ThroughputResult,
    pub raw_data_sample: Vec<TokenRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkRun {
    pub id: String,
    pub timestamp: i64,
    pub wallet_address: String,
    pub chain: String,
    pub results: Vec<ProviderBenchmarkResult>,
    pub status: RunStatus,
}

impl BenchmarkRun {
    pub fn completed(wallet: &str, chain: &str, results: Vec<ProviderBenchmarkResult>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            wallet_address: wallet.to_string(),
            chain: chain.to_string(),
            results,
            status: RunStatus::Completed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NftBenchmarkResult {
    pub provider: ProviderName,
    pub display_name: String,
    pub color: String,
    pub nft_count: u64,
    pub latency_ms: u64,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NftRun {
    pub id: String,
    pub timestamp: i64,
    pub wallet_address: String,
    pub chain: String,
    pub results: Vec<NftBenchmarkResult>,
    pub status: RunStatus,
}

impl NftRun {
    pub fn completed(wallet: &str, chain: &str, results: Vec<NftBenchmarkResult>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            wallet_address: wallet.to_string(),
            chain: chain.to_string(),
            results,
            status: RunStatus::Completed,
        }
    }
}
