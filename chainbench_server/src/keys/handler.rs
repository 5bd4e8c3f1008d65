use std::{collections::BTreeMap, sync::Arc};

use axum::extract::{Json, State};
use chainbench_core::{
    keys::{dto::KeyStatus, handler::key_statuses},
    providers::dto::ProviderName,
};

use crate::state::ServerState;

#[utoipa::path(
    get,
    path = "/keys",
    description = "Which providers have an operator-configured API key, masked",
    responses(
        (status = 200, description = "Success", body = BTreeMap<String, KeyStatus>),
    )
)]
pub async fn keys(
    State(server_state): State<Arc<ServerState>>,
) -> Json<BTreeMap<ProviderName, KeyStatus>> {
    Json(key_statuses(server_state.benchmarker().keys()))
}
