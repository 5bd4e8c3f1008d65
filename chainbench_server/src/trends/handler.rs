use std::sync::Arc;

use axum::extract::{Json, Query, State};

use super::dto::{TrendsQuery, TrendsResponse};
use crate::{error::ErrorServer, state::ServerState};

#[utoipa::path(
    get,
    path = "/trends",
    params(TrendsQuery),
    description = "Per-provider latency and price coverage across recent completed runs",
    responses(
        (status = 200, description = "Success", body = TrendsResponse),
        (status = 500, description = "Storage error", body = ErrorServer),
    )
)]
#[axum::debug_handler]
pub async fn trends(
    State(server_state): State<Arc<ServerState>>,
    Query(query): Query<TrendsQuery>,
) -> Result<Json<TrendsResponse>, ErrorServer> {
    let store = server_state.store();
    let limit = query.limit();

    let response = tokio::task::spawn_blocking(move || -> anyhow::Result<TrendsResponse> {
        Ok(TrendsResponse {
            latency: store.latency_trends(limit)?,
            coverage: store.coverage_trends(limit)?,
        })
    })
    .await
    .map_err(|e| ErrorServer::internal(e.to_string()))?
    .map_err(|e| {
        log::error!("Failed to build trends: {}", e);
        ErrorServer::internal("Failed to build trends")
    })?;

    Ok(Json(response))
}
