//! Praesenz-Handler – Anmeldung und Trennung
//!
//! Treibt das SitzungsRegister und verteilt die Praesenz-Ereignisse:
//! `user_joined`/`user_left` an alle anderen, den vollstaendigen
//! `users_online`-Snapshot an alle Verbindungen.

use plauderkasten_core::VerbindungsId;
use plauderkasten_protocol::{OnlineBenutzer, ServerEreignis};
use std::sync::Arc;

use crate::server_state::RelayZustand;

/// Verarbeitet die Praesenz-Anmeldung einer Verbindung
///
/// Erst ab jetzt taucht die Verbindung im Register auf. Fehlt die Farbe,
/// vergibt der Server die konfigurierte Standardfarbe.
pub fn handle_benutzer_online(
    verbindung: VerbindungsId,
    username: String,
    farbe: Option<String>,
    state: &Arc<RelayZustand>,
) {
    let farbe = farbe.unwrap_or_else(|| state.config.standard_farbe.clone());
    state
        .register
        .anmelden(verbindung, username.clone(), farbe);

    state
        .broadcaster
        .an_alle_ausser_senden(&verbindung, ServerEreignis::UserJoined { username });

    // Snapshot an alle – auch an den Neuen selbst
    praesenz_snapshot_senden(state);
}

/// Verarbeitet die Trennung einer Verbindung
///
/// Nur wenn eine Sitzung existierte, gehen `user_left` und ein frischer
/// Snapshot raus. Eine nie angemeldete Verbindung verschwindet lautlos.
pub fn handle_verbindung_getrennt(verbindung: VerbindungsId, state: &Arc<RelayZustand>) {
    let Some(sitzung) = state.register.abmelden(&verbindung) else {
        tracing::debug!(verbindung = %verbindung, "Trennung ohne Sitzung – kein Broadcast");
        return;
    };

    state.broadcaster.an_alle_ausser_senden(
        &verbindung,
        ServerEreignis::UserLeft {
            username: sitzung.username,
        },
    );
    praesenz_snapshot_senden(state);
}

/// Sendet den aktuellen Praesenz-Snapshot an alle Verbindungen
///
/// Die Projektion laesst die VerbindungsId bewusst weg.
fn praesenz_snapshot_senden(state: &Arc<RelayZustand>) {
    let users: Vec<OnlineBenutzer> = state
        .register
        .alle()
        .into_iter()
        .map(|s| OnlineBenutzer {
            username: s.username,
            color: s.farbe,
        })
        .collect();

    let empfaenger = state
        .broadcaster
        .an_alle_senden(ServerEreignis::UsersOnline { users });
    tracing::debug!(empfaenger, "Praesenz-Snapshot verteilt");
}
