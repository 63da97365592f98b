use std::net::SocketAddr;

use carpool_server::planner::PlannerConfig;
use carpool_server::web::{AppState, create_router};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Default address to listen on.
const DEFAULT_ADDR: ([u8; 4], u16) = ([127, 0, 0, 1], 3000);

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();

    // Load search config, if one is given
    let config = match std::env::var("CARPOOL_CONFIG") {
        Ok(path) => match PlannerConfig::from_file(&path) {
            Ok(config) => {
                info!(%path, "Loaded planner config");
                config
            }
            Err(e) => {
                error!(%path, error = %e, "Failed to load planner config");
                std::process::exit(1);
            }
        },
        Err(_) => PlannerConfig::default(),
    };

    let addr = match std::env::var("CARPOOL_ADDR") {
        Ok(addr) => match addr.parse::<SocketAddr>() {
            Ok(addr) => addr,
            Err(e) => {
                error!(%addr, error = %e, "Invalid CARPOOL_ADDR");
                std::process::exit(1);
            }
        },
        Err(_) => SocketAddr::from(DEFAULT_ADDR),
    };

    let app = create_router(AppState::new(config));

    info!(%addr, "Carpool planner listening");
    info!("  GET  /health    - Health check");
    info!("  GET  /worker    - Worker protocol over WebSocket");
    info!("  POST /carpools  - Plan carpools in one request");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server failed");
}
