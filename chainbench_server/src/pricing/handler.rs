use std::sync::Arc;

use axum::extract::{Json, State};
use chainbench_core::{
    helpers::dto::PricingRequest,
    pricing::{dto::PricingRun, tokens::pricing_tokens_for_chain},
    providers::dto::{Chain, DEFAULT_CHAIN},
    storage::dto::TriggerType,
};

use crate::{error::ErrorServer, state::ServerState, util::persist_pricing_run};

#[utoipa::path(
    post,
    path = "/pricing",
    request_body = PricingRequest,
    description = "Run the pricing benchmark: one batch quote per provider against a median consensus",
    responses(
        (status = 200, description = "Completed run", body = PricingRun),
        (status = 400, description = "Bad Request", body = ErrorServer),
    )
)]
#[axum::debug_handler]
pub async fn pricing(
    State(server_state): State<Arc<ServerState>>,
    Json(request): Json<PricingRequest>,
) -> Result<Json<PricingRun>, ErrorServer> {
    let benchmarker = server_state.benchmarker();

    let chain_id = request.chain.unwrap_or(DEFAULT_CHAIN.to_string());
    let chain = Chain::find(&chain_id)
        .ok_or_else(|| ErrorServer::bad_request(format!("Unsupported chain: {}", chain_id)))?;

    if benchmarker.resolve_providers(&request.providers).is_empty() {
        return Err(ErrorServer::bad_request(
            "No valid API keys found for the selected providers",
        ));
    }

    let tokens = match request.tokens {
        Some(tokens) if !tokens.is_empty() => tokens,
        _ => pricing_tokens_for_chain(chain),
    };

    let outcome = benchmarker
        .run_pricing_benchmark(&tokens, chain.id, &request.providers)
        .await?;

    let run = PricingRun::completed(chain.id, outcome);
    persist_pricing_run(server_state.store(), run.clone(), TriggerType::Manual);

    Ok(Json(run))
}
