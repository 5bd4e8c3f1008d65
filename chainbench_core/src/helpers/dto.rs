use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::pricing::dto::PricingToken;
use crate::providers::dto::ProviderName;

/// A provider to include in a run, with an optional caller-supplied key.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRequest {
    pub name: ProviderName,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl ProviderRequest {
    pub fn new(name: ProviderName) -> Self {
        Self {
            name,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkRequest {
    pub wallet_address: String,
    #[serde(default)]
    pub chain: Option<String>,
    pub providers: Vec<ProviderRequest>,
    #[serde(default)]
    pub iterations: Option<u32>,
    #[serde(default)]
    pub concurrency: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingRequest {
    #[serde(default)]
    pub chain: Option<String>,
    pub providers: Vec<ProviderRequest>,
    /// Defaults to the chain's probe set.
    #[serde(default)]
    pub tokens: Option<Vec<PricingToken>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NftRequest {
    pub wallet_address: String,
    #[serde(default)]
    pub chain: Option<String>,
    pub providers: Vec<ProviderRequest>,
}
