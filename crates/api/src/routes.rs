//! Route-Definitionen fuer die Query-API

use axum::{routing::get, Router};

use crate::{handlers, ApiState};

/// Erstellt den vollstaendigen Router der Query-API
pub fn api_router() -> Router<ApiState> {
    Router::new()
        .route("/api/online-users", get(handlers::online_users))
        .route("/api/messages", get(handlers::messages))
        .route("/health", get(handlers::health))
}
