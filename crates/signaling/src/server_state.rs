//! Gemeinsamer Server-Zustand fuer den Relay-Kern
//!
//! Haelt Register, Nachrichtenlog, Broadcaster und Anruf-Vermittlung als
//! geteilte Handles, die sicher zwischen tokio-Tasks geteilt werden
//! koennen. Saemtlicher veraenderlicher Zustand lebt hier – es gibt
//! keine ambienten Globals.

use plauderkasten_chat::NachrichtenLog;
use std::sync::Arc;
use std::time::Instant;

use crate::anruf::AnrufVermittlung;
use crate::broadcast::EventBroadcaster;
use crate::presence::SitzungsRegister;

/// Konfiguration fuer den Relay-Kern
#[derive(Debug, Clone)]
pub struct RelayKonfig {
    /// Anzeigename des Servers
    pub server_name: String,
    /// Maximale gleichzeitige Verbindungen
    pub max_clients: u32,
    /// Keepalive-Intervall in Sekunden
    pub keepalive_sek: u64,
    /// Timeout fuer stumme Verbindungen in Sekunden
    pub verbindungs_timeout_sek: u64,
    /// Anzeigefarbe wenn der Client keine mitbringt
    pub standard_farbe: String,
}

impl Default for RelayKonfig {
    fn default() -> Self {
        Self {
            server_name: "Plauderkasten".to_string(),
            max_clients: 256,
            keepalive_sek: 30,
            verbindungs_timeout_sek: 90,
            standard_farbe: "#7b9e4d".to_string(),
        }
    }
}

/// Gemeinsamer Server-Zustand (thread-safe, Arc-geteilt)
///
/// Alle Komponenten teilen ihren inneren Zustand ueber Clone-Handles.
pub struct RelayZustand {
    /// Relay-Konfiguration
    pub config: Arc<RelayKonfig>,
    /// Sitzungs-Register (wer ist online)
    pub register: SitzungsRegister,
    /// Geordnetes In-Memory-Nachrichtenlog
    pub nachrichten: NachrichtenLog,
    /// Event-Broadcaster (VerbindungsId -> Send-Queue)
    pub broadcaster: EventBroadcaster,
    /// Anruf-Vermittlung
    pub vermittlung: AnrufVermittlung,
    /// Startzeitpunkt des Servers (fuer Uptime-Berechnung)
    pub start_zeit: Instant,
}

impl RelayZustand {
    /// Erstellt einen neuen RelayZustand
    pub fn neu(config: RelayKonfig) -> Arc<Self> {
        let register = SitzungsRegister::neu();
        let broadcaster = EventBroadcaster::neu();
        let vermittlung = AnrufVermittlung::neu(register.clone(), broadcaster.clone());

        Arc::new(Self {
            config: Arc::new(config),
            register,
            nachrichten: NachrichtenLog::neu(),
            broadcaster,
            vermittlung,
            start_zeit: Instant::now(),
        })
    }

}
