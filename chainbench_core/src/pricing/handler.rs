use futures::future::join_all;
use std::time::Duration;
use tokio::time::Instant;

use super::consensus::ProviderQuotes;
use super::dto::PricingToken;
use crate::benchmark::sampler::{elapsed_ms, truncate_message};
use crate::providers::adapter::{bounded, call_budget, PriceMap, ProviderAdapter};
use crate::providers::dto::{Chain, ProviderName};

/// One batch price call per provider, all in flight together. Returns once
/// every call has settled; a failed batch yields empty quotes and its error.
/// `request_timeout` bounds a single upstream request, so adapters that make
/// several rounds get a proportionally larger budget.
pub async fn collect_quotes<A>(
    adapter: &A,
    tokens: &[PricingToken],
    chain: &Chain,
    providers: &[(ProviderName, String)],
    request_timeout: Duration,
) -> Vec<ProviderQuotes>
where
    A: ProviderAdapter + ?Sized,
{
    let fetches = providers.iter().map(|(provider, api_key)| async move {
        let limit = call_budget(request_timeout, adapter.price_requests(*provider, tokens.len()));
        let start = Instant::now();
        let outcome = bounded(
            *provider,
            limit,
            adapter.fetch_prices(*provider, tokens, chain, api_key),
        )
        .await;
        let latency_ms = elapsed_ms(start);

        match outcome {
            Ok(prices) => ProviderQuotes {
                provider: *provider,
                prices,
                latency_ms,
                error: None,
            },
            Err(e) => {
                log::warn!("Price batch failed for {}: {}", provider, e);
                ProviderQuotes {
                    provider: *provider,
                    prices: PriceMap::new(),
                    latency_ms,
                    error: Some(truncate_message(&e.to_string())),
                }
            }
        }
    });

    join_all(fetches).await
}
