use std::sync::Arc;

use axum::extract::{Json, Path, Query, State};

use super::dto::{HistoryEntry, HistoryKind, HistoryQuery, HistoryResponse};
use crate::{error::ErrorServer, state::ServerState};

#[utoipa::path(
    get,
    path = "/history",
    params(HistoryQuery),
    description = "Recent stored runs, newest first",
    responses(
        (status = 200, description = "Success", body = HistoryResponse),
        (status = 500, description = "Storage error", body = ErrorServer),
    )
)]
#[axum::debug_handler]
pub async fn history(
    State(server_state): State<Arc<ServerState>>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ErrorServer> {
    let store = server_state.store();
    let kind = query.kind.unwrap_or_default();
    let limit = query.limit();
    let offset = query.offset.unwrap_or(0);

    let response = tokio::task::spawn_blocking(move || -> anyhow::Result<HistoryResponse> {
        let mut response = HistoryResponse {
            benchmark_runs: None,
            benchmark_total: None,
            pricing_runs: None,
            pricing_total: None,
        };

        if kind != HistoryKind::Pricing {
            response.benchmark_runs = Some(store.list_benchmark_runs(limit, offset)?);
            response.benchmark_total = Some(store.count_benchmark_runs()?);
        }
        if kind != HistoryKind::Balances {
            response.pricing_runs = Some(store.list_pricing_runs(limit, offset)?);
            response.pricing_total = Some(store.count_pricing_runs()?);
        }

        Ok(response)
    })
    .await
    .map_err(|e| ErrorServer::internal(e.to_string()))?
    .map_err(|e| {
        log::error!("Failed to read run history: {}", e);
        ErrorServer::internal("Failed to read run history")
    })?;

    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/history/{id}",
    params(
        ("id" = String, Path, description = "Run id"),
        HistoryQuery,
    ),
    description = "One stored run. `type` selects balances or pricing; balances when omitted",
    responses(
        (status = 200, description = "Success", body = HistoryEntry),
        (status = 404, description = "Not Found", body = ErrorServer),
    )
)]
#[axum::debug_handler]
pub async fn history_entry(
    State(server_state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryEntry>, ErrorServer> {
    let store = server_state.store();
    let kind = query.kind.unwrap_or(HistoryKind::Balances);
    let lookup_id = id.clone();

    let entry = tokio::task::spawn_blocking(move || -> anyhow::Result<Option<HistoryEntry>> {
        let entry = match kind {
            HistoryKind::Pricing => store.pricing_run(&lookup_id)?.map(HistoryEntry::Pricing),
            _ => store.benchmark_run(&lookup_id)?.map(HistoryEntry::Balances),
        };
        Ok(entry)
    })
    .await
    .map_err(|e| ErrorServer::internal(e.to_string()))?
    .map_err(|e| {
        log::error!("Failed to read run {}: {}", id, e);
        ErrorServer::internal("Failed to read run")
    })?;

    entry
        .map(Json)
        .ok_or_else(|| ErrorServer::not_found(format!("Run {} not found", id)))
}
