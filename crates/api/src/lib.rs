//! plauderkasten-api – Read-only Query-API
//!
//! Stellt die beiden Snapshot-Endpunkte des Relays als HTTP bereit:
//! wer ist online, und was wurde seit dem Start geschrieben. Beides
//! sind reine Momentaufnahmen – der Broadcast-Pfad laeuft komplett
//! am HTTP vorbei.

pub mod handlers;
pub mod routes;
pub mod server;

use plauderkasten_chat::NachrichtenLog;
use plauderkasten_signaling::SitzungsRegister;
use std::time::Instant;

/// Axum-State fuer die Query-API
///
/// Haelt nur Clone-Handles auf Register und Log – kein eigener Zustand.
#[derive(Clone)]
pub struct ApiState {
    pub register: SitzungsRegister,
    pub nachrichten: NachrichtenLog,
    /// Startzeitpunkt des Servers (fuer die Uptime im Health-Check)
    pub start_zeit: Instant,
}

impl ApiState {
    pub fn neu(register: SitzungsRegister, nachrichten: NachrichtenLog, start_zeit: Instant) -> Self {
        Self {
            register,
            nachrichten,
            start_zeit,
        }
    }
}

pub use server::ApiServer;
