use std::{future::Future, sync::Arc};

use axum::extract::{Json, State};
use chainbench_core::{
    benchmark::dto::BenchmarkRun,
    helpers::dto::ProviderRequest,
    pricing::{dto::PricingRun, tokens::pricing_tokens_for_chain},
    providers::dto::{Chain, DEFAULT_CHAIN, ProviderName},
    storage::dto::TriggerType,
};
use chrono::Utc;
use tokio::time::Instant;

use super::dto::{
    CRON_CONCURRENCY, CRON_ITERATIONS, CRON_MIN_INTERVAL_MS, CRON_WALLET, CronSummary,
    ScenarioSummary,
};
use crate::{
    error::ErrorServer,
    state::ServerState,
    util::{persist_benchmark_run, persist_pricing_run},
};

const BUDGET_EXHAUSTED: &str = "Scheduled run time budget exhausted";

/// Runs a scenario only while the shared scheduled-run deadline allows it.
async fn within_budget<F>(deadline: Instant, scenario: F) -> ScenarioSummary
where
    F: Future<Output = ScenarioSummary>,
{
    if Instant::now() >= deadline {
        return ScenarioSummary::skipped(BUDGET_EXHAUSTED);
    }

    match tokio::time::timeout_at(deadline, scenario).await {
        Ok(summary) => summary,
        Err(_) => {
            log::warn!("Scheduled scenario cut off at the run deadline");
            ScenarioSummary::failed(BUDGET_EXHAUSTED)
        }
    }
}

async fn run_balances(
    server_state: &ServerState,
    providers: &[ProviderRequest],
) -> ScenarioSummary {
    let store = server_state.store();
    let since = Utc::now().timestamp_millis() - CRON_MIN_INTERVAL_MS;

    let recent = tokio::task::spawn_blocking(move || store.has_recent_scheduled_run(since)).await;
    match recent {
        Ok(Ok(true)) => {
            log::info!("Scheduled balance run skipped, last one is under 15 minutes old");
            return ScenarioSummary::skipped("A scheduled balance run completed recently");
        }
        Ok(Ok(false)) => {}
        Ok(Err(e)) => log::warn!("Could not check recent scheduled runs: {}", e),
        Err(e) => log::warn!("Could not check recent scheduled runs: {}", e),
    }

    let results = server_state
        .benchmarker()
        .run_balance_benchmark(
            CRON_WALLET,
            DEFAULT_CHAIN,
            providers,
            CRON_ITERATIONS,
            CRON_CONCURRENCY,
        )
        .await;

    match results {
        Ok(results) => {
            let count = results.len();
            let run = BenchmarkRun::completed(CRON_WALLET, DEFAULT_CHAIN, results);
            let id = run.id.clone();
            persist_benchmark_run(server_state.store(), run, TriggerType::Scheduled);
            ScenarioSummary::completed(Some(id), count)
        }
        Err(e) => {
            log::error!("Scheduled balance run failed: {}", e);
            ScenarioSummary::failed(e.to_string())
        }
    }
}

async fn run_pricing(server_state: &ServerState, providers: &[ProviderRequest]) -> ScenarioSummary {
    let Some(chain) = Chain::find(DEFAULT_CHAIN) else {
        return ScenarioSummary::failed(format!("Unsupported chain: {}", DEFAULT_CHAIN));
    };
    let tokens = pricing_tokens_for_chain(chain);

    match server_state
        .benchmarker()
        .run_pricing_benchmark(&tokens, chain.id, providers)
        .await
    {
        Ok(outcome) => {
            let count = outcome.provider_results.len();
            let run = PricingRun::completed(chain.id, outcome);
            let id = run.id.clone();
            persist_pricing_run(server_state.store(), run, TriggerType::Scheduled);
            ScenarioSummary::completed(Some(id), count)
        }
        Err(e) => {
            log::error!("Scheduled pricing run failed: {}", e);
            ScenarioSummary::failed(e.to_string())
        }
    }
}

async fn run_nfts(server_state: &ServerState, providers: &[ProviderRequest]) -> ScenarioSummary {
    match server_state
        .benchmarker()
        .run_nft_benchmark(CRON_WALLET, DEFAULT_CHAIN, providers)
        .await
    {
        Ok(results) => ScenarioSummary::completed(None, results.len()),
        Err(e) => {
            log::error!("Scheduled NFT run failed: {}", e);
            ScenarioSummary::failed(e.to_string())
        }
    }
}

#[utoipa::path(
    get,
    path = "/cron",
    params(
        ("secret" = Option<String>, Query, description = "Shared secret, alternatively sent as the x-cron-secret header"),
    ),
    description = "Scheduled trigger: runs every scenario for providers with an operator key",
    responses(
        (status = 200, description = "Summary", body = CronSummary),
        (status = 400, description = "No API keys configured", body = ErrorServer),
        (status = 401, description = "Unauthorized", body = ErrorServer),
    )
)]
#[axum::debug_handler]
pub async fn cron(
    State(server_state): State<Arc<ServerState>>,
) -> Result<Json<CronSummary>, ErrorServer> {
    let keys = server_state.benchmarker().keys();
    let providers = ProviderName::ALL
        .iter()
        .filter(|provider| keys.configured(**provider).is_some())
        .map(|provider| ProviderRequest::new(*provider))
        .collect::<Vec<_>>();

    if providers.is_empty() {
        return Err(ErrorServer::bad_request("No API keys configured"));
    }

    log::info!("Scheduled run started for {} providers", providers.len());

    // The balance run enforces this deadline itself and keeps its partial
    // results; the later scenarios share whatever time remains.
    let deadline = Instant::now() + server_state.benchmarker().config().run_deadline;

    let balances = run_balances(&server_state, &providers).await;
    let pricing = within_budget(deadline, run_pricing(&server_state, &providers)).await;
    let nfts = within_budget(deadline, run_nfts(&server_state, &providers)).await;

    Ok(Json(CronSummary {
        timestamp: Utc::now().to_rfc3339(),
        balances,
        pricing,
        nfts,
    }))
}
