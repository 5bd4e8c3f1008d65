use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;

use crate::{error::ErrorServer, state::ServerState};

pub const CRON_SECRET_HEADER: &str = "x-cron-secret";

#[derive(Debug, Deserialize)]
pub struct CronAuthQuery {
    pub secret: Option<String>,
}

fn unauthorized() -> ErrorServer {
    ErrorServer {
        message: "Unauthorized".to_string(),
        status: 401,
    }
}

/// Gates scheduled runs behind the shared `CRON_SECRET`. Without a configured
/// secret every request is rejected.
pub async fn cron_auth(
    State(server_state): State<Arc<ServerState>>,
    req: Request,
    next: Next,
) -> Result<Response, ErrorServer> {
    let expected = server_state.cron_secret().ok_or_else(unauthorized)?;

    let provided = req
        .headers()
        .get(CRON_SECRET_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .or_else(|| {
            Query::<CronAuthQuery>::try_from_uri(req.uri())
                .ok()
                .and_then(|Query(query)| query.secret)
        });

    match provided {
        Some(secret) if secret == expected => Ok(next.run(req).await),
        _ => Err(unauthorized()),
    }
}
