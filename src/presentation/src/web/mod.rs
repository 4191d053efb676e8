//! Axum-based HTTP service for the conversational agent
//!
//! - `state` - shared services and the session registry
//! - `session` - cookie-keyed sessions, one agent per client
//! - `routes` - route table under `/api`
//! - `handlers` - request handlers organized by feature

pub mod handlers;
pub mod routes;
pub mod session;
pub mod state;

use shared::error::{Error, Result};
use state::AppState;
use std::net::SocketAddr;
use tokio::net::TcpListener;

pub struct AxumServer {
    state: AppState,
}

impl AxumServer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub async fn run(self, bind: &str) -> Result<()> {
        let addr = parse_bind_address(bind)?;
        let app = routes::create_router(self.state);

        tracing::info!("Starting Axum server on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

fn parse_bind_address(bind: &str) -> Result<SocketAddr> {
    bind.trim()
        .parse()
        .map_err(|_| Error::InvalidArguments(format!("Invalid bind address: {}", bind)))
}
