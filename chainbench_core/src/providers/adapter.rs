use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::{collections::HashMap, env, future::Future, time::Duration};

use super::dto::{Chain, ProviderName, TokenRecord};
use super::error::ProviderError;
use super::{alchemy, codex, covalent, mobula, moralis};
use crate::pricing::dto::PricingToken;

/// Token address -> USD price. Adapters return an entry for every requested
/// token, `None` when the provider has no quote.
pub type PriceMap = HashMap<String, Option<f64>>;

/// Capability contract every provider satisfies, whatever its upstream
/// protocol.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    async fn fetch_balances(
        &self,
        provider: ProviderName,
        wallet: &str,
        chain: &Chain,
        api_key: &str,
    ) -> Result<Vec<TokenRecord>, ProviderError>;

    async fn fetch_prices(
        &self,
        provider: ProviderName,
        tokens: &[PricingToken],
        chain: &Chain,
        api_key: &str,
    ) -> Result<PriceMap, ProviderError>;

    async fn fetch_nft_count(
        &self,
        provider: ProviderName,
        _wallet: &str,
        _chain: &Chain,
        _api_key: &str,
    ) -> Result<u64, ProviderError> {
        Err(ProviderError::Unsupported {
            provider,
            capability: "NFT counts",
        })
    }

    /// Sequential upstream requests behind one balance fetch.
    fn balance_requests(&self, _provider: ProviderName) -> u32 {
        1
    }

    /// Sequential upstream request rounds behind one price batch.
    fn price_requests(&self, _provider: ProviderName, _tokens: usize) -> u32 {
        1
    }
}

/// Upstream base URLs. `{network}` in the Alchemy URL is replaced by the
/// chain's Alchemy subdomain.
#[derive(Debug, Clone)]
pub struct ProviderEndpoints {
    pub covalent: String,
    pub alchemy: String,
    pub alchemy_prices: String,
    pub moralis: String,
    pub mobula: String,
    pub codex: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            covalent: "https://api.covalenthq.com".to_string(),
            alchemy: "https://{network}.g.alchemy.com".to_string(),
            alchemy_prices: "https://api.g.alchemy.com".to_string(),
            moralis: "https://deep-index.moralis.io/api/v2.2".to_string(),
            mobula: "https://api.mobula.io/api/1".to_string(),
            codex: "https://graph.codex.io/graphql".to_string(),
        }
    }
}

impl ProviderEndpoints {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let read = |name: &str, fallback: String| env::var(name).unwrap_or(fallback);

        Self {
            covalent: read("COVALENT_BASE_URL", defaults.covalent),
            alchemy: read("ALCHEMY_BASE_URL", defaults.alchemy),
            alchemy_prices: read("ALCHEMY_PRICES_BASE_URL", defaults.alchemy_prices),
            moralis: read("MORALIS_BASE_URL", defaults.moralis),
            mobula: read("MOBULA_BASE_URL", defaults.mobula),
            codex: read("CODEX_BASE_URL", defaults.codex),
        }
    }

    /// Points every provider at one host, used against a mock server.
    pub fn single_host(base: &str) -> Self {
        Self {
            covalent: base.to_string(),
            alchemy: base.to_string(),
            alchemy_prices: base.to_string(),
            moralis: base.to_string(),
            mobula: base.to_string(),
            codex: format!("{}/graphql", base),
        }
    }
}

/// Live adapter: dispatches each capability to the provider's upstream API.
#[derive(Clone)]
pub struct HttpAdapter {
    client: Client,
    endpoints: ProviderEndpoints,
}

impl HttpAdapter {
    pub fn new(request_timeout: Duration, endpoints: ProviderEndpoints) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent("chainbench/0.1")
            .timeout(request_timeout)
            .build()?;

        Ok(Self { client, endpoints })
    }
}

#[async_trait]
impl ProviderAdapter for HttpAdapter {
    async fn fetch_balances(
        &self,
        provider: ProviderName,
        wallet: &str,
        chain: &Chain,
        api_key: &str,
    ) -> Result<Vec<TokenRecord>, ProviderError> {
        let client = &self.client;
        let endpoints = &self.endpoints;

        match provider {
            ProviderName::Covalent => {
                covalent::fetch_balances(client, &endpoints.covalent, wallet, chain, api_key).await
            }
            ProviderName::Alchemy => {
                alchemy::fetch_balances(client, &endpoints.alchemy, wallet, chain, api_key).await
            }
            ProviderName::Moralis => {
                moralis::fetch_balances(client, &endpoints.moralis, wallet, chain, api_key).await
            }
            ProviderName::Mobula => {
                mobula::fetch_balances(client, &endpoints.mobula, wallet, chain, api_key).await
            }
            ProviderName::Codex => {
                codex::fetch_balances(client, &endpoints.codex, wallet, chain, api_key).await
            }
        }
    }

    async fn fetch_prices(
        &self,
        provider: ProviderName,
        tokens: &[PricingToken],
        chain: &Chain,
        api_key: &str,
    ) -> Result<PriceMap, ProviderError> {
        let client = &self.client;
        let endpoints = &self.endpoints;

        match provider {
            ProviderName::Covalent => {
                covalent::fetch_prices(client, &endpoints.covalent, tokens, chain, api_key).await
            }
            ProviderName::Alchemy => {
                alchemy::fetch_prices(client, &endpoints.alchemy_prices, tokens, chain, api_key)
                    .await
            }
            ProviderName::Moralis => {
                moralis::fetch_prices(client, &endpoints.moralis, tokens, chain, api_key).await
            }
            ProviderName::Mobula => {
                mobula::fetch_prices(client, &endpoints.mobula, tokens, api_key).await
            }
            ProviderName::Codex => {
                codex::fetch_prices(client, &endpoints.codex, tokens, chain, api_key).await
            }
        }
    }

    async fn fetch_nft_count(
        &self,
        provider: ProviderName,
        wallet: &str,
        chain: &Chain,
        api_key: &str,
    ) -> Result<u64, ProviderError> {
        let client = &self.client;
        let endpoints = &self.endpoints;

        match provider {
            ProviderName::Covalent => {
                covalent::fetch_nft_count(client, &endpoints.covalent, wallet, chain, api_key).await
            }
            ProviderName::Alchemy => {
                alchemy::fetch_nft_count(client, &endpoints.alchemy, wallet, chain, api_key).await
            }
            ProviderName::Moralis => {
                moralis::fetch_nft_count(client, &endpoints.moralis, wallet, chain, api_key).await
            }
            ProviderName::Mobula => {
                mobula::fetch_nft_count(client, &endpoints.mobula, wallet, api_key).await
            }
            ProviderName::Codex => Err(ProviderError::Unsupported {
                provider,
                capability: "NFT counts",
            }),
        }
    }

    fn balance_requests(&self, provider: ProviderName) -> u32 {
        match provider {
            ProviderName::Alchemy => alchemy::BALANCE_REQUESTS,
            _ => 1,
        }
    }

    fn price_requests(&self, provider: ProviderName, tokens: usize) -> u32 {
        match provider {
            ProviderName::Covalent => covalent::price_rounds(tokens),
            _ => 1,
        }
    }
}

/// Time allowed for an adapter call that issues `requests` sequential
/// requests, each bounded by `per_request`.
pub fn call_budget(per_request: Duration, requests: u32) -> Duration {
    per_request * requests.max(1)
}

/// Bounds one adapter call. An expired call is a timeout failure.
pub async fn bounded<T, Fut>(
    provider: ProviderName,
    limit: Duration,
    call: Fut,
) -> Result<T, ProviderError>
where
    Fut: Future<Output = Result<T, ProviderError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(outcome) => outcome,
        Err(_) => Err(ProviderError::Timeout { provider }),
    }
}

pub(crate) async fn send_json<T: DeserializeOwned>(
    provider: ProviderName,
    request: RequestBuilder,
) -> Result<T, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| ProviderError::from_reqwest(provider, e))?;

    if !response.status().is_success() {
        return Err(ProviderError::status(provider, response.status()));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::from_reqwest(provider, e))
}

/// Reads a loosely typed JSON scalar as a string (balances arrive as either).
pub(crate) fn scalar_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn scalar_to_f64(value: &serde_json::Value) -> Option<f64> {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    };

    parsed.filter(|v| v.is_finite())
}

/// Only a positive, finite quote counts; zero reads as no quote.
pub(crate) fn usable_price(price: f64) -> Option<f64> {
    (price.is_finite() && price > 0.0).then_some(price)
}

pub(crate) fn scalar_to_u32(value: &serde_json::Value) -> Option<u32> {
    match value {
        serde_json::Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        serde_json::Value::String(s) => s.parse::<u32>().ok(),
        _ => None,
    }
}
