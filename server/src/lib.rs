//! plauderkasten-server – Bibliotheks-Root
//!
//! Deklariert die Server-Module und verdrahtet die Subsysteme:
//! Relay-Kern (TCP) und Query-API (HTTP).

pub mod config;

use anyhow::{Context, Result};
use config::ServerConfig;
use plauderkasten_api::{ApiServer, ApiState};
use plauderkasten_signaling::{RelayKonfig, RelayServer, RelayZustand};

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet alle Server-Subsysteme und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Relay-Zustand aufbauen (Register, Log, Broadcaster, Vermittlung)
    /// 2. TCP-Listener binden und starten (Ereignis-Protokoll)
    /// 3. Query-API starten (HTTP)
    /// 4. Auf Ctrl-C / SIGTERM warten
    pub async fn starten(self) -> Result<()> {
        tracing::info!(
            server_name = %self.config.server.name,
            tcp = %self.config.tcp_bind_adresse(),
            api = %self.config.api_bind_adresse(),
            "Server startet"
        );

        let relay_konfig = RelayKonfig {
            server_name: self.config.server.name.clone(),
            max_clients: self.config.server.max_clients,
            keepalive_sek: self.config.relay.keepalive_sek,
            verbindungs_timeout_sek: self.config.relay.verbindungs_timeout_sek,
            standard_farbe: self.config.relay.standard_farbe.clone(),
        };
        let zustand = RelayZustand::neu(relay_konfig);

        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

        // TCP-Relay binden und starten
        let tcp_addr = self
            .config
            .tcp_bind_adresse()
            .parse()
            .context("Ungueltige TCP-Bind-Adresse")?;
        let relay = RelayServer::binden(std::sync::Arc::clone(&zustand), tcp_addr)
            .await
            .context("TCP-Listener konnte nicht gebunden werden")?;
        let relay_task = tokio::spawn(relay.starten(shutdown_rx.clone()));

        // Query-API starten
        let api_addr = self
            .config
            .api_bind_adresse()
            .parse()
            .context("Ungueltige API-Bind-Adresse")?;
        let api_state = ApiState::neu(
            zustand.register.clone(),
            zustand.nachrichten.clone(),
            zustand.start_zeit,
        );
        let api_task = tokio::spawn(ApiServer::neu(api_addr).starten(api_state));

        tracing::info!("Server laeuft. Warte auf Shutdown-Signal (Ctrl-C)...");
        tokio::signal::ctrl_c()
            .await
            .context("Warten auf Ctrl-C fehlgeschlagen")?;
        tracing::info!("Shutdown-Signal empfangen, Server wird beendet");

        // Relay geordnet stoppen; die API hat keinen eigenen Zustand
        let _ = shutdown_tx.send(true);
        let _ = relay_task.await;
        api_task.abort();

        Ok(())
    }
}
