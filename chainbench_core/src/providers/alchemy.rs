use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

use super::adapter::{scalar_to_u32, send_json, usable_price, PriceMap};
use super::dto::{Chain, ProviderName, TokenRecord};
use super::error::ProviderError;
use crate::pricing::dto::PricingToken;

const PROVIDER: ProviderName = ProviderName::Alchemy;
const MAX_TOKENS: usize = 50;
/// Balances, then one metadata batch.
pub(crate) const BALANCE_REQUESTS: u32 = 2;
const ZERO_BALANCE: &str = "0x0000000000000000000000000000000000000000000000000000000000000000";

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenBalances {
    #[serde(default)]
    token_balances: Vec<TokenBalance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenBalance {
    contract_address: String,
    token_balance: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MetadataResponse {
    id: u64,
    result: Option<TokenMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct TokenMetadata {
    name: Option<String>,
    symbol: Option<String>,
    #[serde(default)]
    decimals: Value,
    logo: Option<String>,
}

#[derive(Debug, Serialize)]
struct PriceAddress<'a> {
    network: &'a str,
    address: &'a str,
}

#[derive(Debug, Deserialize)]
struct PricesResponse {
    #[serde(default)]
    data: Vec<PriceEntry>,
}

#[derive(Debug, Deserialize)]
struct PriceEntry {
    address: Option<String>,
    #[serde(default)]
    prices: Vec<PriceValue>,
}

#[derive(Debug, Deserialize)]
struct PriceValue {
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NftsResponse {
    total_count: Option<u64>,
    #[serde(default)]
    owned_nfts: Vec<Value>,
}

fn network_url(base_url: &str, chain: &Chain) -> String {
    base_url.replace("{network}", chain.alchemy_subdomain)
}

fn is_non_zero(balance: &Option<String>) -> bool {
    match balance.as_deref() {
        Some(value) => !value.is_empty() && value != ZERO_BALANCE,
        None => false,
    }
}

/// Balances come from `alchemy_getTokenBalances`, then metadata for the
/// first non-zero holdings is resolved in one JSON-RPC batch.
pub async fn fetch_balances(
    client: &Client,
    base_url: &str,
    wallet: &str,
    chain: &Chain,
    api_key: &str,
) -> Result<Vec<TokenRecord>, ProviderError> {
    let url = format!("{}/v2/{}", network_url(base_url, chain), api_key);

    let response: RpcResponse<TokenBalances> = send_json(
        PROVIDER,
        client.post(&url).json(&json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "alchemy_getTokenBalances",
            "params": [wallet, "erc20"],
        })),
    )
    .await?;

    if let Some(error) = response.error {
        return Err(ProviderError::malformed(PROVIDER, error.message));
    }

    let held: Vec<TokenBalance> = response
        .result
        .map(|result| result.token_balances)
        .unwrap_or_default()
        .into_iter()
        .filter(|balance| is_non_zero(&balance.token_balance))
        .take(MAX_TOKENS)
        .collect();

    let mut metadata = HashMap::new();

    if !held.is_empty() {
        let batch: Vec<Value> = held
            .iter()
            .enumerate()
            .map(|(i, balance)| {
                json!({
                    "jsonrpc": "2.0",
                    "id": i,
                    "method": "alchemy_getTokenMetadata",
                    "params": [balance.contract_address],
                })
            })
            .collect();

        // Missing metadata leaves fields empty; it is not a failed call.
        match send_json::<Vec<MetadataResponse>>(PROVIDER, client.post(&url).json(&batch)).await {
            Ok(responses) => {
                for response in responses {
                    if let Some(result) = response.result {
                        metadata.insert(response.id as usize, result);
                    }
                }
            }
            Err(e) => log::warn!("Alchemy metadata batch failed: {}", e),
        }
    }

    Ok(held
        .into_iter()
        .enumerate()
        .map(|(i, balance)| {
            let meta = metadata.remove(&i).unwrap_or_default();
            TokenRecord {
                token_address: Some(balance.contract_address),
                name: meta.name,
                symbol: meta.symbol,
                decimals: scalar_to_u32(&meta.decimals),
                logo_url: meta.logo,
                balance: balance.token_balance,
                contract_type: Some("ERC-20".to_string()),
                ..TokenRecord::default()
            }
        })
        .collect())
}

pub async fn fetch_prices(
    client: &Client,
    base_url: &str,
    tokens: &[PricingToken],
    chain: &Chain,
    api_key: &str,
) -> Result<PriceMap, ProviderError> {
    let url = format!("{}/prices/v1/{}/tokens/by-address", base_url, api_key);
    let addresses: Vec<PriceAddress> = tokens
        .iter()
        .map(|token| PriceAddress {
            network: chain.alchemy_subdomain,
            address: &token.address,
        })
        .collect();

    let response: PricesResponse = send_json(
        PROVIDER,
        client
            .post(url)
            .header("accept", "application/json")
            .json(&json!({ "addresses": addresses })),
    )
    .await?;

    Ok(tokens
        .iter()
        .map(|token| {
            let price = response
                .data
                .iter()
                .find(|entry| {
                    entry
                        .address
                        .as_deref()
                        .is_some_and(|a| a.eq_ignore_ascii_case(&token.address))
                })
                .and_then(|entry| entry.prices.first())
                .and_then(|price| price.value.as_deref())
                .and_then(|value| value.parse::<f64>().ok())
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
    let url = format!(
        "{}/nft/v3/{}/getNFTsForOwner",
        network_url(base_url, chain),
        api_key
    );

    let response: NftsResponse = send_json(
        PROVIDER,
        client.get(url).query(&[
            ("owner", wallet),
            ("withMetadata", "false"),
            ("pageSize", "100"),
        ]),
    )
    .await?;

    Ok(response
        .total_count
        .unwrap_or(response.owned_nfts.len() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn eth() -> &'static Chain {
        Chain::find("eth-mainnet").unwrap()
    }

    #[tokio::test]
    async fn test_zero_balances_are_dropped_and_metadata_joined() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/key"))
            .and(body_partial_json(json!({ "method": "alchemy_getTokenBalances" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": { "tokenBalances": [
                    { "contractAddress": "0xaaa", "tokenBalance": "0x01" },
                    { "contractAddress": "0xbbb", "tokenBalance": ZERO_BALANCE },
                    { "contractAddress": "0xccc", "tokenBalance": "0x02" }
                ]}
            })))
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v2/key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "jsonrpc": "2.0", "id": 0, "result": { "name": "Alpha", "symbol": "ALP", "decimals": 18, "logo": null } },
                { "jsonrpc": "2.0", "id": 1, "result": { "name": "Gamma", "symbol": "GAM", "decimals": 6, "logo": "https://logo" } }
            ])))
            .mount(&server)
            .await;

        let client = Client::new();
        let records = fetch_balances(&client, &server.uri(), "0xwallet", eth(), "key")
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].token_address.as_deref(), Some("0xaaa"));
        assert_eq!(records[0].symbol.as_deref(), Some("ALP"));
        assert_eq!(records[1].decimals, Some(6));
        assert_eq!(records[1].logo_url.as_deref(), Some("https://logo"));
        assert_eq!(records[1].contract_type.as_deref(), Some("ERC-20"));
        assert!(records[0].price_usd.is_none());
    }

    #[tokio::test]
    async fn test_nft_count_falls_back_to_owned_length() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nft/v3/key/getNFTsForOwner"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ownedNfts": [{}, {}, {}]
            })))
            .mount(&server)
            .await;

        let client = Client::new();
        let count = fetch_nft_count(&client, &server.uri(), "0xwallet", eth(), "key")
            .await
            .unwrap();

        assert_eq!(count, 3);
    }
}
