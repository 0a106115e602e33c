//! # `knowbatch-server`: Report Upload Form
//!
//! A small web front end for the report flow. `GET /` serves a form taking
//! an optional CSV file and a prompt; `POST /report` runs the same review as
//! `knowbatch report` and links the rendered files, which are then served
//! from `GET /download/{file}`.

pub mod errors;
pub mod handlers;
pub mod page;
pub mod router;
pub mod state;

use crate::{router::create_router, state::AppState};
use knowbatch::load_config;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Serves the router on an already bound listener.
pub async fn run(listener: TcpListener, app_state: AppState) -> anyhow::Result<()> {
    let app = create_router(app_state);
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Sets up logging and configuration, binds `server.port` and calls [`run`].
///
/// The config file is taken from `KNOWBATCH_CONFIG` when set.
pub async fn start() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = std::env::var("KNOWBATCH_CONFIG").ok();
    let config = load_config(config_path.as_deref())?;
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let app_state = state::build_app_state(config)?;

    let listener = TcpListener::bind(addr).await?;
    run(listener, app_state).await
}
