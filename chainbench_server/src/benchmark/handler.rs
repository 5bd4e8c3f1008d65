use std::sync::Arc;

use axum::extract::{Json, State};
use chainbench_core::{
    benchmark::dto::BenchmarkRun, helpers::dto::BenchmarkRequest, providers::dto::DEFAULT_CHAIN,
    storage::dto::TriggerType,
};

use crate::{error::ErrorServer, state::ServerState, util::persist_benchmark_run};

#[utoipa::path(
    post,
    path = "/benchmark",
    request_body = BenchmarkRequest,
    description = "Run the balance benchmark: sequential latency sampling, a concurrent throughput burst and completeness scoring per provider",
    responses(
        (status = 200, description = "Completed run", body = BenchmarkRun),
        (status = 400, description = "Bad Request", body = ErrorServer),
    )
)]
#[axum::debug_handler]
pub async fn benchmark(
    State(server_state): State<Arc<ServerState>>,
    Json(request): Json<BenchmarkRequest>,
) -> Result<Json<BenchmarkRun>, ErrorServer> {
    let benchmarker = server_state.benchmarker();
    let config = benchmarker.config();

    let chain = request.chain.unwrap_or(DEFAULT_CHAIN.to_string());
    let iterations = config.iterations(request.iterations);
    let concurrency = config.concurrency(request.concurrency);

    let results = benchmarker
        .run_balance_benchmark(
            &request.wallet_address,
            &chain,
            &request.providers,
            iterations,
            concurrency,
        )
        .await?;

    let run = BenchmarkRun::completed(&request.wallet_address, &chain, results);
    persist_benchmark_run(server_state.store(), run.clone(), TriggerType::Manual);

    Ok(Json(run))
}
