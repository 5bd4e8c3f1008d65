mod benchmark;
mod cron;
mod docs;
mod error;
mod history;
mod info;
mod keys;
mod middlewares;
mod nfts;
mod pricing;
mod router;
mod state;
mod trends;
mod util;

use std::{env, sync::Arc};

use dotenvy::dotenv;
use router::router;
use state::ServerState;

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let server_domain = env::var("SERVER_DOMAIN").unwrap_or("0.0.0.0:3000".to_string());

    let state = ServerState::from_env().expect("Failed to initialize server state");
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(&server_domain).await.unwrap();
    log::info!("Listening on {}", server_domain);

    axum::serve(listener, app).await.unwrap();
}
