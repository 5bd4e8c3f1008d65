use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KeyStatus {
    pub has_env_key: bool,
    /// Empty when no environment key is configured.
    pub masked: String,
}
