//! HTTP JSON API.
//!
//! | Route | |
//! |---|---|
//! | `GET /api/profiles` | search, filter, sort and paginate |
//! | `GET /api/profiles/{id}` | one profile, 404 if absent or inactive |
//! | `GET /api/professions`, `/api/states`, `/api/offices` | filter metadata |
//! | `POST /api/contact` | "request this associate" |
//! | `GET /health` | liveness |

mod handlers;
mod middleware;

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
};
pub use handlers::{ApiError, AppState};
pub use middleware::REQUEST_ID_HEADER;
use tokio::net::TcpListener;
use tracing::info;

use crate::{Roster, error::Result};

pub fn router(roster: Arc<Roster>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/profiles", get(handlers::search_profiles))
        .route("/api/profiles/{id}", get(handlers::get_profile))
        .route("/api/professions", get(handlers::professions))
        .route("/api/states", get(handlers::states))
        .route("/api/offices", get(handlers::offices))
        .route("/api/contact", post(handlers::contact))
        .layer(axum::middleware::from_fn(middleware::request_tracing))
        .with_state(roster)
}

/// Serve until Ctrl-C.
pub async fn serve(roster: Arc<Roster>, bind: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(bind).await?;
    info!(addr = %listener.local_addr()?, "Listening");
    axum::serve(listener, router(roster))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}
