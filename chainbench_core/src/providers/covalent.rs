use futures::future::join_all;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::adapter::{
    scalar_to_f64, scalar_to_string, scalar_to_u32, send_json, usable_price, PriceMap,
};
use super::dto::{Chain, ProviderName, TokenRecord};
use super::error::ProviderError;
use crate::pricing::dto::PricingToken;

const PROVIDER: ProviderName = ProviderName::Covalent;
const PRICE_BATCH_SIZE: usize = 5;

#[derive(Debug, Deserialize)]
struct CovalentResponse<T> {
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct ItemsData<T> {
    #[serde(default)]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct BalanceItem {
    contract_address: Option<String>,
    contract_name: Option<String>,
    contract_ticker_symbol: Option<String>,
    #[serde(default)]
    contract_decimals: Value,
    logo_url: Option<String>,
    #[serde(default)]
    balance: Value,
    #[serde(default)]
    quote: Value,
    #[serde(default)]
    quote_rate: Value,
    #[serde(default)]
    quote_rate_24h: Value,
    #[serde(rename = "type")]
    token_type: Option<String>,
    is_spam: Option<bool>,
    last_transferred_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PriceSeries {
    #[serde(default)]
    prices: Vec<PricePoint>,
}

#[derive(Debug, Deserialize)]
struct PricePoint {
    price: Option<f64>,
}

impl From<BalanceItem> for TokenRecord {
    fn from(item: BalanceItem) -> Self {
        TokenRecord {
            token_address: item.contract_address,
            name: item.contract_name,
            symbol: item.contract_ticker_symbol,
            decimals: scalar_to_u32(&item.contract_decimals),
            logo_url: item.logo_url,
            balance: scalar_to_string(&item.balance),
            balance_usd: scalar_to_f64(&item.quote),
            price_usd: scalar_to_f64(&item.quote_rate),
            price_24h_change: scalar_to_f64(&item.quote_rate_24h),
            contract_type: item.token_type,
            is_spam: item.is_spam,
            last_transfer_date: item.last_transferred_at,
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
    let url = format!(
        "{}/v1/{}/address/{}/balances_v2/",
        base_url, chain.covalent_id, wallet
    );

    let body: CovalentResponse<ItemsData<BalanceItem>> = send_json(
        PROVIDER,
        client.get(url).query(&[
            ("key", api_key),
            ("no-spam", "true"),
            ("no-nft-asset-metadata", "true"),
        ]),
    )
    .await?;

    let items = body.data.map(|data| data.items).unwrap_or_default();

    Ok(items.into_iter().map(TokenRecord::from).collect())
}

pub(crate) fn price_rounds(tokens: usize) -> u32 {
    tokens.div_ceil(PRICE_BATCH_SIZE).max(1) as u32
}

/// Covalent prices one address per request, so tokens are fetched in small
/// concurrent batches. A failed token only loses its own quote.
pub async fn fetch_prices(
    client: &Client,
    base_url: &str,
    tokens: &[PricingToken],
    chain: &Chain,
    api_key: &str,
) -> Result<PriceMap, ProviderError> {
    let mut prices = PriceMap::with_capacity(tokens.len());

    for batch in tokens.chunks(PRICE_BATCH_SIZE) {
        let quotes = join_all(batch.iter().map(|token| async move {
            let url = format!(
                "{}/v1/pricing/historical_by_addresses_v2/{}/USD/{}/",
                base_url,
                chain.covalent_id,
                token.address.to_lowercase()
            );

            let quote = send_json::<CovalentResponse<Vec<PriceSeries>>>(
                PROVIDER,
                client.get(url).query(&[("key", api_key)]),
            )
            .await;

            match quote {
                Ok(body) => body
                    .data
                    .and_then(|series| series.into_iter().next())
                    .and_then(|series| series.prices.into_iter().next())
                    .and_then(|point| point.price)
                    .and_then(usable_price),
                Err(e) => {
                    log::debug!("Covalent price lookup failed for {}: {}", token.symbol, e);
                    None
                }
            }
        }))
        .await;

        for (token, quote) in batch.iter().zip(quotes) {
            prices.insert(token.address.clone(), quote);
        }
    }

    Ok(prices)
}

pub async fn fetch_nft_count(
    client: &Client,
    base_url: &str,
    wallet: &str,
    chain: &Chain,
    api_key: &str,
) -> Result<u64, ProviderError> {
    let url = format!(
        "{}/v1/{}/address/{}/balances_nft/",
        base_url, chain.covalent_id, wallet
    );

    let body: CovalentResponse<ItemsData<Value>> = send_json(
        PROVIDER,
        client
            .get(url)
            .query(&[("key", api_key), ("no-spam", "true")]),
    )
    .await?;

    Ok(body.data.map(|data| data.items.len() as u64).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::dto::TokenCategory;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn eth() -> &'static Chain {
        Chain::find("eth-mainnet").unwrap()
    }

    fn token(address: &str, symbol: &str) -> PricingToken {
        PricingToken {
            address: address.to_string(),
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            category: TokenCategory::BlueChip,
            chain_id: "eth-mainnet".to_string(),
        }
    }

    #[tokio::test]
    async fn test_balances_are_normalized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/1/address/0xabc/balances_v2/"))
            .and(query_param("key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": { "items": [{
                    "contract_address": "0xdead",
                    "contract_name": "Wrapped Ether",
                    "contract_ticker_symbol": "WETH",
                    "contract_decimals": 18,
                    "logo_url": "https://logos/weth.png",
                    "balance": "1500000000000000000",
                    "quote": 4500.5,
                    "quote_rate": 3000.33,
                    "quote_rate_24h": 2950.0,
                    "type": "cryptocurrency",
                    "is_spam": false,
                    "last_transferred_at": "2024-01-01T00:00:00Z"
                }]}
            })))
            .mount(&server)
            .await;

        let client = Client::new();
        let records = fetch_balances(&client, &server.uri(), "0xabc", eth(), "secret")
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        let weth = &records[0];
        assert_eq!(weth.symbol.as_deref(), Some("WETH"));
        assert_eq!(weth.decimals, Some(18));
        assert_eq!(weth.balance.as_deref(), Some("1500000000000000000"));
        assert_eq!(weth.price_usd, Some(3000.33));
        assert_eq!(weth.is_spam, Some(false));
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = Client::new();
        let err = fetch_balances(&client, &server.uri(), "0xabc", eth(), "bad")
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Status { status: 401, .. }));
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn test_prices_keep_every_requested_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/pricing/historical_by_addresses_v2/1/USD/0xaaa/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{ "prices": [{ "price": 1.001 }] }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/pricing/historical_by_addresses_v2/1/USD/0xbbb/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = Client::new();
        let tokens = vec![token("0xAAA", "USDC"), token("0xBBB", "FOO")];
        let prices = fetch_prices(&client, &server.uri(), &tokens, eth(), "secret")
            .await
            .unwrap();

        assert_eq!(prices.len(), 2);
        assert_eq!(prices["0xAAA"], Some(1.001));
        assert_eq!(prices["0xBBB"], None);
    }
}
