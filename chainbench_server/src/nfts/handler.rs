use std::sync::Arc;

use axum::extract::{Json, State};
use chainbench_core::{
    benchmark::dto::NftRun, helpers::dto::NftRequest, providers::dto::DEFAULT_CHAIN,
};

use crate::{error::ErrorServer, state::ServerState};

#[utoipa::path(
    post,
    path = "/nfts",
    request_body = NftRequest,
    description = "Time one NFT-count call per provider",
    responses(
        (status = 200, description = "Completed run", body = NftRun),
        (status = 400, description = "Bad Request", body = ErrorServer),
    )
)]
#[axum::debug_handler]
pub async fn nfts(
    State(server_state): State<Arc<ServerState>>,
    Json(request): Json<NftRequest>,
) -> Result<Json<NftRun>, ErrorServer> {
    let benchmarker = server_state.benchmarker();
    let chain = request.chain.unwrap_or(DEFAULT_CHAIN.to_string());

    if request.providers.is_empty() {
        return Err(ErrorServer::bad_request("At least one provider is required"));
    }
    if benchmarker.resolve_providers(&request.providers).is_empty() {
        return Err(ErrorServer::bad_request(
            "No valid API keys found for the selected providers",
        ));
    }

    let results = benchmarker
        .run_nft_benchmark(&request.wallet_address, &chain, &request.providers)
        .await?;

    Ok(Json(NftRun::completed(&request.wallet_address, &chain, results)))
}
