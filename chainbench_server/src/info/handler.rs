use axum::Json;
use chainbench_core::providers::dto::{DEFAULT_CHAIN, ProviderName, SUPPORTED_CHAINS};

use super::dto::{ChainInfo, Info};

#[utoipa::path(
    get,
    path = "/",
    description = "Service info with the supported providers and chains",
    responses(
        (status = 200, description = "Success", body = Info),
    )
)]
pub async fn info() -> Json<Info> {
    Json(Info {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        providers: ProviderName::ALL.iter().map(|p| p.to_string()).collect(),
        chains: SUPPORTED_CHAINS
            .iter()
            .map(|chain| ChainInfo {
                id: chain.id.to_string(),
                name: chain.name.to_string(),
            })
            .collect(),
        default_chain: DEFAULT_CHAIN.to_string(),
    })
}
