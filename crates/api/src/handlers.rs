//! HTTP-Handler der Query-API
//!
//! Beide Endpunkte liefern Momentaufnahmen mit dem `success`-Umschlag
//! des urspruenglichen Dienstes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use plauderkasten_protocol::OnlineBenutzer;
use serde_json::json;

use crate::ApiState;

/// GET /api/online-users – aktuelle Praesenz-Momentaufnahme
///
/// Die Projektion laesst die VerbindungsId weg; nach aussen existieren
/// nur Benutzername und Farbe.
pub async fn online_users(State(state): State<ApiState>) -> impl IntoResponse {
    let users: Vec<OnlineBenutzer> = state
        .register
        .alle()
        .into_iter()
        .map(|s| OnlineBenutzer {
            username: s.username,
            color: s.farbe,
        })
        .collect();

    Json(json!({ "success": true, "users": users }))
}

/// GET /api/messages – Nachrichten-History in Einfuegereihenfolge
pub async fn messages(State(state): State<ApiState>) -> impl IntoResponse {
    Json(json!({ "success": true, "messages": state.nachrichten.alle() }))
}

/// GET /health – Health-Check-Endpunkt
pub async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "uptime_secs": state.start_zeit.elapsed().as_secs(),
        })),
    )
}
