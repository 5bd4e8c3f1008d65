use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::adapter::{
    scalar_to_f64, scalar_to_string, scalar_to_u32, send_json, usable_price, PriceMap,
};
use super::dto::{Chain, ProviderName, TokenRecord};
use super::error::ProviderError;
use crate::pricing::dto::PricingToken;

const PROVIDER: ProviderName = ProviderName::Moralis;

#[derive(Debug, Deserialize)]
struct Erc20Balance {
    token_address: Option<String>,
    name: Option<String>,
    symbol: Option<String>,
    #[serde(default)]
    decimals: Value,
    logo: Option<String>,
    #[serde(default)]
    balance: Value,
    #[serde(default)]
    usd_value: Value,
    #[serde(default)]
    usd_price: Value,
    #[serde(default)]
    usd_price_24hr_percent_change: Value,
    possible_spam: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenPrice {
    token_address: Option<String>,
    #[serde(default)]
    usd_price: Value,
}

#[derive(Debug, Deserialize)]
struct NftsResponse {
    total: Option<u64>,
    #[serde(default)]
    result: Vec<Value>,
}

impl From<Erc20Balance> for TokenRecord {
    fn from(item: Erc20Balance) -> Self {
        TokenRecord {
            token_address: item.token_address,
            name: item.name,
            symbol: item.symbol,
            // Moralis reports unknown precision as 0.
            decimals: scalar_to_u32(&item.decimals).filter(|decimals| *decimals > 0),
            logo_url: item.logo,
            balance: scalar_to_string(&item.balance),
            balance_usd: scalar_to_f64(&item.usd_value),
            price_usd: scalar_to_f64(&item.usd_price),
            price_24h_change: scalar_to_f64(&item.usd_price_24hr_percent_change),
            contract_type: Some("ERC-20".to_string()),
            is_spam: item.possible_spam,
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
    let items: Vec<Erc20Balance> = send_json(
        PROVIDER,
        client
            .get(format!("{}/{}/erc20", base_url, wallet))
            .query(&[("chain", chain.moralis_chain)])
            .header("accept", "application/json")
            .header("X-API-Key", api_key),
    )
    .await?;

    Ok(items.into_iter().map(TokenRecord::from).collect())
}

pub async fn fetch_prices(
    client: &Client,
    base_url: &str,
    tokens: &[PricingToken],
    chain: &Chain,
    api_key: &str,
) -> Result<PriceMap, ProviderError> {
    let body = json!({
        "tokens": tokens
            .iter()
            .map(|token| json!({ "token_address": token.address, "chain": chain.moralis_chain }))
            .collect::<Vec<_>>(),
    });

    let quotes: Vec<TokenPrice> = send_json(
        PROVIDER,
        client
            .post(format!("{}/erc20/prices", base_url))
            .header("accept", "application/json")
            .header("X-API-Key", api_key)
            .json(&body),
    )
    .await?;

    Ok(tokens
        .iter()
        .map(|token| {
            let price = quotes
                .iter()
                .find(|quote| {
                    quote
                        .token_address
                        .as_deref()
                        .is_some_and(|a| a.eq_ignore_ascii_case(&token.address))
                })
                .and_then(|quote| scalar_to_f64(&quote.usd_price))
                .and_then(usable_price);

            (token.address.clone(), price)
        })
        .collect())
}

pub async fn fetch_nft_count(
    client: &Client,
    base_url: &str,
    wallet: &str,
    chain: &Chain,
    api_key: &str,
) -> Result<u64, ProviderError> {
    let response: NftsResponse = send_json(
        PROVIDER,
        client
            .get(format!("{}/{}/nft", base_url, wallet))
            .query(&[("chain", chain.moralis_chain), ("limit", "100")])
            .header("accept", "application/json")
            .header("X-API-Key", api_key),
    )
    .await?;

    Ok(response.total.unwrap_or(response.result.len() as u64))
}
