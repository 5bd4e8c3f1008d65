use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::benchmark::dto::RunStatus;
use crate::providers::dto::ProviderName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum TokenCategory {
    BlueChip,
    Stablecoin,
    Defi,
    LongTail,
}

impl TokenCategory {
    pub const ALL: [TokenCategory; 4] = [
        TokenCategory::BlueChip,
        TokenCategory::Stablecoin,
        TokenCategory::Defi,
        TokenCategory::LongTail,
    ];
}

/// Reference asset used as a common pricing probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingToken {
    pub address: String,
    pub symbol: String,
    pub name: String,
    pub category: TokenCategory,
    pub chain_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenPriceResult {
    pub token: PricingToken,
    #[schema(value_type = Object)]
    pub prices: BTreeMap<ProviderName, Option<f64>>,
    pub consensus_price: Option<f64>,
    #[schema(value_type = Object)]
    pub deviations: BTreeMap<ProviderName, Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    pub category: TokenCategory,
    pub covered: u32,
    pub total: u32,
    pub avg_deviation: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingBenchmarkResult {
    pub provider: ProviderName,
    pub display_name: String,
    pub color: String,
    pub tokens_covered: u32,
    pub total_tokens: u32,
    pub coverage_percent: u32,
    pub avg_deviation: Option<f64>,
    pub max_deviation: Option<f64>,
    pub latency_ms: u64,
    pub category_breakdown: Vec<CategoryBreakdown>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingOutcome {
    pub token_results: Vec<TokenPriceResult>,
    pub provider_results: Vec<PricingBenchmarkResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingRun {
    pub id: String,
    pub timestamp: i64,
    pub chain: String,
    pub token_results: Vec<TokenPriceResult>,
    pub provider_results: Vec<PricingBenchmarkResult>,
    pub status: RunStatus,
}

impl PricingRun {
    pub fn completed(chain: &str, outcome: PricingOutcome) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            chain: chain.to_string(),
            token_results: outcome.token_results,
            provider_results: outcome.provider_results,
            status: RunStatus::Completed,
        }
    }
}
