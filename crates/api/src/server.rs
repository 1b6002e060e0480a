//! Axum HTTP-Server fuer die Query-API

use std::net::SocketAddr;

use anyhow::Result;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::{routes::api_router, ApiState};

/// HTTP-Server fuer die Query-API
///
/// Die API ist oeffentlich und read-only; CORS ist darum bewusst
/// permissiv.
pub struct ApiServer {
    bind_addr: SocketAddr,
}

impl ApiServer {
    pub fn neu(bind_addr: SocketAddr) -> Self {
        Self { bind_addr }
    }

    /// Startet den HTTP-Server mit dem gegebenen State
    pub async fn starten(self, state: ApiState) -> Result<()> {
        let app = api_router()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(state);

        let listener = tokio::net::TcpListener::bind(self.bind_addr).await?;
        tracing::info!(adresse = %self.bind_addr, "Query-API gestartet");

        axum::serve(listener, app).await?;
        Ok(())
    }
}
