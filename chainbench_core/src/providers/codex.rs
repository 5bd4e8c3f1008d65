use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};

use super::adapter::{
    scalar_to_f64, scalar_to_string, scalar_to_u32, send_json, usable_price, PriceMap,
};
use super::dto::{Chain, ProviderName, TokenRecord};
use super::error::ProviderError;
use crate::pricing::dto::PricingToken;

const PROVIDER: ProviderName = ProviderName::Codex;

/// Tokens probed through the `tokens` query when the wallet `balances`
/// query is unavailable on the caller's plan.
const WELL_KNOWN_TOKENS: [(u64, &[&str]); 3] = [
    (
        1,
        &[
            "0xdAC17F958D2ee523a2206206994597C13D831ec7",
            "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
            "0x6B175474E89094C44Da98b954EedeAC495271d0F",
            "0x2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599",
            "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2",
            "0x514910771AF9Ca656af840dff83E8264EcF986CA",
            "0x1f9840a85d5aF5bf1D1762F925BDADdC4201F984",
            "0x7Fc66500c84A76Ad7e9c93437bFc5Ac33E2DDaE9",
        ],
    ),
    (
        137,
        &[
            "0x3c499c542cEF5E3811e1192ce70d8cC03d5c3359",
            "0xc2132D05D31c914a87C6611C10748AEb04B58e8F",
            "0x0d500B1d8E8eF31E21C99d1Db9A6444d3ADf1270",
            "0x7ceB23fD6bC0adD59E62ac25578270cFf1b9f619",
        ],
    ),
    (
        56,
        &[
            "0x55d398326f99059fF775485246999027B3197955",
            "0x8AC76a51cc950d9822D68b83fE1Ad97B32Cd580d",
            "0xbb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c",
            "0x2170Ed0880ac9A755fd29B2688956BD959F933F8",
        ],
    ),
];

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BalancesData {
    balances: Option<BalanceItems>,
}

#[derive(Debug, Deserialize)]
struct BalanceItems {
    #[serde(default)]
    items: Vec<BalanceItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalanceItem {
    token_address: Option<String>,
    #[serde(default)]
    balance: Value,
    #[serde(default)]
    shifted_balance: Value,
    #[serde(default)]
    balance_usd: Value,
    #[serde(default)]
    token_price_usd: Value,
    token: Option<CodexToken>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CodexToken {
    address: Option<String>,
    name: Option<String>,
    symbol: Option<String>,
    #[serde(default)]
    decimals: Value,
    is_scam: Option<bool>,
    info: Option<TokenInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenInfo {
    image_small_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokensData {
    #[serde(default)]
    tokens: Vec<Option<CodexToken>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PricesData {
    #[serde(default)]
    get_token_prices: Vec<Option<TokenPrice>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenPrice {
    address: Option<String>,
    #[serde(default)]
    price_usd: Value,
}

impl From<BalanceItem> for TokenRecord {
    fn from(item: BalanceItem) -> Self {
        let token = item.token.unwrap_or_default();
        let info = token.info.unwrap_or_default();

        TokenRecord {
            token_address: item.token_address.or(token.address),
            name: token.name,
            symbol: token.symbol,
            decimals: scalar_to_u32(&token.decimals),
            logo_url: info.image_small_url,
            balance: scalar_to_string(&item.balance)
                .or_else(|| scalar_to_string(&item.shifted_balance)),
            balance_usd: scalar_to_f64(&item.balance_usd),
            price_usd: scalar_to_f64(&item.token_price_usd),
            is_spam: token.is_scam,
            ..TokenRecord::default()
        }
    }
}

impl From<CodexToken> for TokenRecord {
    fn from(token: CodexToken) -> Self {
        let info = token.info.unwrap_or_default();

        TokenRecord {
            token_address: token.address,
            name: token.name,
            symbol: token.symbol,
            decimals: scalar_to_u32(&token.decimals),
            logo_url: info.image_small_url,
            is_spam: token.is_scam,
            ..TokenRecord::default()
        }
    }
}

fn first_error(errors: &[GraphQlError]) -> String {
    errors
        .first()
        .and_then(|error| error.message.clone())
        .unwrap_or_else(|| "Unknown error".to_string())
}

async fn post_query<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    api_key: &str,
    query: String,
) -> Result<GraphQlResponse<T>, ProviderError> {
    send_json(
        PROVIDER,
        client
            .post(url)
            .header("Authorization", api_key)
            .json(&json!({ "query": query })),
    )
    .await
}

/// Tries the wallet `balances` query first and falls back to the free-plan
/// `tokens` query over well-known addresses.
pub async fn fetch_balances(
    client: &Client,
    url: &str,
    wallet: &str,
    chain: &Chain,
    api_key: &str,
) -> Result<Vec<TokenRecord>, ProviderError> {
    let network_id = chain.codex_network_id;
    let balances_query = format!(
        r#"{{
  balances(walletAddress: "{}", networks: [{}], removeScams: true, limit: 50) {{
    items {{
      tokenAddress
      balance
      shiftedBalance
      balanceUsd
      tokenPriceUsd
      token {{ address name symbol decimals isScam info {{ imageSmallUrl }} }}
    }}
  }}
}}"#,
        wallet, network_id
    );

    match post_query::<BalancesData>(client, url, api_key, balances_query).await {
        Ok(response) if response.errors.is_empty() => {
            let items = response
                .data
                .and_then(|data| data.balances)
                .map(|balances| balances.items)
                .unwrap_or_default();

            if !items.is_empty() {
                return Ok(items.into_iter().map(TokenRecord::from).collect());
            }
        }
        Ok(response) => log::debug!(
            "Codex balances query rejected, using token fallback: {}",
            first_error(&response.errors)
        ),
        Err(e) => log::debug!("Codex balances query failed, using token fallback: {}", e),
    }

    let addresses = WELL_KNOWN_TOKENS
        .iter()
        .find(|(id, _)| *id == network_id)
        .unwrap_or(&WELL_KNOWN_TOKENS[0])
        .1;
    let ids = addresses
        .iter()
        .map(|address| format!("\"{}:{}\"", address, network_id))
        .collect::<Vec<_>>()
        .join(", ");
    let tokens_query = format!(
        "{{ tokens(ids: [{}]) {{ address name symbol decimals isScam info {{ imageSmallUrl circulatingSupply }} }} }}",
        ids
    );

    let response = post_query::<TokensData>(client, url, api_key, tokens_query).await?;

    if !response.errors.is_empty() {
        return Err(ProviderError::GraphQl {
            provider: PROVIDER,
            message: first_error(&response.errors),
        });
    }

    let records: Vec<TokenRecord> = response
        .data
        .map(|data| data.tokens)
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .map(TokenRecord::from)
        .collect();

    if records.is_empty() {
        return Err(ProviderError::malformed(
            PROVIDER,
            "Codex returned no data, verify the API key",
        ));
    }

    Ok(records)
}

pub async fn fetch_prices(
    client: &Client,
    url: &str,
    tokens: &[PricingToken],
    chain: &Chain,
    api_key: &str,
) -> Result<PriceMap, ProviderError> {
    let inputs = tokens
        .iter()
        .map(|token| {
            format!(
                "{{ address: \"{}\", networkId: {} }}",
                token.address, chain.codex_network_id
            )
        })
        .collect::<Vec<_>>()
        .join(", ");
    let query = format!(
        "{{ getTokenPrices(inputs: [{}]) {{ address priceUsd }} }}",
        inputs
    );

    let response = post_query::<PricesData>(client, url, api_key, query).await?;

    if !response.errors.is_empty() {
        return Err(ProviderError::GraphQl {
            provider: PROVIDER,
            message: first_error(&response.errors),
        });
    }

    let quotes: Vec<TokenPrice> = response
        .data
        .map(|data| data.get_token_prices)
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .collect();

    Ok(tokens
        .iter()
        .map(|token| {
            let price = quotes
                .iter()
                .find(|quote| {
                    quote
                        .address
                        .as_deref()
                        .is_some_and(|a| a.eq_ignore_ascii_case(&token.address))
                })
                .and_then(|quote| scalar_to_f64(&quote.price_usd))
                .and_then(usable_price);

            (token.address.clone(), price)
        })
        .collect())
}
