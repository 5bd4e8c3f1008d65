use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::adapter::{
    scalar_to_f64, scalar_to_string, scalar_to_u32, send_json, usable_price, PriceMap,
};
use super::dto::{Chain, ProviderName, TokenRecord};
use super::error::ProviderError;
use crate::pricing::dto::PricingToken;

const PROVIDER: ProviderName = ProviderName::Mobula;

#[derive(Debug, Deserialize)]
struct PortfolioResponse {
    data: Option<Portfolio>,
}

#[derive(Debug, Deserialize)]
struct Portfolio {
    #[serde(default)]
    assets: Vec<PortfolioAsset>,
}

#[derive(Debug, Deserialize)]
struct PortfolioAsset {
    token_address: Option<String>,
    #[serde(default)]
    asset: Value,
    symbol: Option<String>,
    #[serde(default)]
    decimals: Value,
    logo: Option<String>,
    #[serde(default)]
    token_balance: Value,
    #[serde(default)]
    estimated_balance: Value,
    #[serde(default)]
    price: Value,
    #[serde(default)]
    price_change_24h: Value,
    #[serde(rename = "type")]
    asset_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MultiDataResponse {
    #[serde(default)]
    data: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct NftsResponse {
    #[serde(default)]
    data: Value,
}

/// `asset` is either a plain name or a nested object carrying the metadata.
fn nested_str(asset: &Value, field: &str) -> Option<String> {
    asset
        .get(field)
        .and_then(|value| value.as_str())
        .map(str::to_string)
}

impl From<PortfolioAsset> for TokenRecord {
    fn from(item: PortfolioAsset) -> Self {
        let name = match &item.asset {
            Value::String(name) => Some(name.clone()),
            asset => nested_str(asset, "name"),
        };

        TokenRecord {
            token_address: item.token_address,
            name,
            symbol: item.symbol.or_else(|| nested_str(&item.asset, "symbol")),
            decimals: scalar_to_u32(&item.decimals),
            logo_url: item.logo.or_else(|| nested_str(&item.asset, "logo")),
            balance: scalar_to_string(&item.token_balance),
            balance_usd: scalar_to_f64(&item.estimated_balance),
            price_usd: scalar_to_f64(&item.price),
            price_24h_change: scalar_to_f64(&item.price_change_24h),
            contract_type: item.asset_type,
            is_spam: None,
            last_transfer_date: None,
        }
    }
}

pub async fn fetch_balances(
    client: &Client,
    base_url: &str,
    wallet: &str,
    chain: &Chain,
    api_key: &str,
) -> Result<Vec<TokenRecord>, ProviderError> {
    let response: PortfolioResponse = send_json(
        PROVIDER,
        client
            .get(format!("{}/wallet/portfolio", base_url))
            .query(&[("wallet", wallet), ("blockchains", chain.mobula_chain)])
            .header("Authorization", api_key),
    )
    .await?;

    let assets = response.data.map(|data| data.assets).unwrap_or_default();

    Ok(assets.into_iter().map(TokenRecord::from).collect())
}

/// Mobula resolves assets across chains by address, so the chain is not
/// part of the query.
pub async fn fetch_prices(
    client: &Client,
    base_url: &str,
    tokens: &[PricingToken],
    api_key: &str,
) -> Result<PriceMap, ProviderError> {
    let assets = tokens
        .iter()
        .map(|token| token.address.as_str())
        .collect::<Vec<_>>()
        .join(",");

    let response: MultiDataResponse = send_json(
        PROVIDER,
        client
            .get(format!("{}/market/multi-data", base_url))
            .query(&[("assets", assets.as_str())])
            .header("Authorization", api_key),
    )
    .await?;

    Ok(tokens
        .iter()
        .map(|token| {
            let price = response
                .data
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(&token.address))
                .and_then(|(_, entry)| entry.get("price"))
                .and_then(scalar_to_f64)
                .and_then(usable_price);

            (token.address.clone(), price)
        })
        .collect())
}

pub async fn fetch_nft_count(
    client: &Client,
    base_url: &str,
    wallet: &str,
    api_key: &str,
) -> Result<u64, ProviderError> {
    let response: NftsResponse = send_json(
        PROVIDER,
        client
            .get(format!("{}/wallet/nfts", base_url))
            .query(&[("wallet", wallet)])
            .header("Authorization", api_key),
    )
    .await?;

    Ok(response.data.as_array().map(|nfts| nfts.len() as u64).unwrap_or(0))
}
