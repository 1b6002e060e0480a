//! ClientVerbindung – Verwaltet eine einzelne TCP-Verbindung
//!
//! Jede TCP-Verbindung bekommt eine `ClientVerbindung` in einem eigenen
//! tokio-Task. Beim Annehmen vergibt der Transport die VerbindungsId und
//! registriert die Send-Queue im Broadcaster; ins SitzungsRegister kommt
//! die Verbindung erst mit ihrem `user_online`-Ereignis.
//!
//! ## Keepalive
//! - Server sendet alle `keepalive_sek` einen Ping
//! - Jedes eingehende Frame zaehlt als Lebenszeichen
//! - Bleibt die Verbindung laenger als `verbindungs_timeout_sek` stumm,
//!   wird sie getrennt

use futures_util::{SinkExt, StreamExt};
use plauderkasten_core::VerbindungsId;
use plauderkasten_protocol::{ClientEreignis, FrameCodec, ServerEreignis};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

use crate::dispatcher::{jetzt_ms, EreignisDispatcher, VerbindungsKontext};
use crate::server_state::RelayZustand;

/// Verarbeitet eine einzelne TCP-Verbindung
///
/// Liest Frames via `FrameCodec`, dispatcht an den `EreignisDispatcher`
/// und schreibt ausgehende Ereignisse aus der Broadcaster-Queue zurueck.
/// Laeuft in einem eigenen tokio-Task.
pub struct ClientVerbindung {
    state: Arc<RelayZustand>,
    peer_addr: SocketAddr,
}

impl ClientVerbindung {
    /// Erstellt eine neue ClientVerbindung
    pub fn neu(state: Arc<RelayZustand>, peer_addr: SocketAddr) -> Self {
        Self { state, peer_addr }
    }

    /// Startet die Verbindungs-Verarbeitungsschleife
    ///
    /// Laeuft bis die Verbindung getrennt wird, das Timeout zuschlaegt
    /// oder ein Shutdown-Signal eingeht. Raeumt beim Verlassen immer auf.
    pub async fn verarbeiten(
        self,
        stream: TcpStream,
        mut shutdown_rx: tokio::sync::watch::Receiver<bool>,
    ) {
        let peer_addr = self.peer_addr;
        let keepalive_intervall = Duration::from_secs(self.state.config.keepalive_sek);
        let timeout_dauer = Duration::from_secs(self.state.config.verbindungs_timeout_sek);

        let verbindungs_id = VerbindungsId::neu();
        tracing::info!(peer = %peer_addr, verbindung = %verbindungs_id, "Neue Verbindung");

        // Framed-Stream: dekodiert ClientEreignis, kodiert ServerEreignis
        let mut framed = Framed::new(stream, FrameCodec::<ClientEreignis>::neu());

        // Send-Queue sofort registrieren – Broadcasts adressieren
        // Verbindungen, nicht erst angemeldete Benutzer
        let mut sende_rx = self.state.broadcaster.registrieren(verbindungs_id);

        let dispatcher = EreignisDispatcher::neu(Arc::clone(&self.state));
        let ctx = VerbindungsKontext {
            verbindungs_id,
            peer_addr,
        };

        // Zeitpunkt des letzten empfangenen Frames
        let mut letzter_empfang = Instant::now();
        // Zeitpunkt des naechsten Keepalive-Pings
        let mut naechster_ping = Instant::now() + keepalive_intervall;

        loop {
            let jetzt = Instant::now();

            // Timeout-Pruefung
            if jetzt.duration_since(letzter_empfang) > timeout_dauer {
                tracing::warn!(peer = %peer_addr, verbindung = %verbindungs_id, "Verbindungs-Timeout");
                break;
            }

            // Verzoegerung bis zum naechsten Ping berechnen
            let ping_verzoegerung = if jetzt < naechster_ping {
                naechster_ping.duration_since(jetzt)
            } else {
                Duration::from_millis(1)
            };

            tokio::select! {
                // Eingehendes Ereignis vom Client
                frame = framed.next() => {
                    match frame {
                        Some(Ok(ereignis)) => {
                            letzter_empfang = Instant::now();
                            tracing::trace!(
                                peer = %peer_addr,
                                verbindung = %verbindungs_id,
                                "Ereignis empfangen"
                            );

                            if let Some(antwort) = dispatcher.dispatch(ereignis, &ctx) {
                                if let Err(e) = framed.send(antwort).await {
                                    tracing::warn!(
                                        peer = %peer_addr,
                                        fehler = %e,
                                        "Senden fehlgeschlagen"
                                    );
                                    break;
                                }
                            }
                        }
                        Some(Err(e)) => {
                            tracing::warn!(
                                peer = %peer_addr,
                                fehler = %e,
                                "Frame-Lesefehler"
                            );
                            break;
                        }
                        None => {
                            tracing::info!(peer = %peer_addr, "Verbindung vom Client getrennt");
                            break;
                        }
                    }
                }

                // Ausgehendes Ereignis aus dem Broadcaster
                Some(ausgehend) = sende_rx.recv() => {
                    if let Err(e) = framed.send(ausgehend).await {
                        tracing::warn!(
                            peer = %peer_addr,
                            fehler = %e,
                            "Broadcast-Senden fehlgeschlagen"
                        );
                        break;
                    }
                }

                // Keepalive-Ping
                _ = tokio::time::sleep(ping_verzoegerung) => {
                    if jetzt >= naechster_ping {
                        let ping = ServerEreignis::Ping { timestamp_ms: jetzt_ms() };
                        if let Err(e) = framed.send(ping).await {
                            tracing::warn!(
                                peer = %peer_addr,
                                fehler = %e,
                                "Ping-Senden fehlgeschlagen"
                            );
                            break;
                        }
                        naechster_ping = Instant::now() + keepalive_intervall;
                    }
                }

                // Shutdown-Signal
                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!(peer = %peer_addr, "Shutdown-Signal – Verbindung wird getrennt");
                        break;
                    }
                }
            }
        }

        // Cleanup beim Verbindungsende: Broadcaster-Eintrag weg,
        // Sitzung abmelden, ggf. user_left + Snapshot verteilen
        dispatcher.verbindung_getrennt(&ctx);

        tracing::info!(peer = %peer_addr, verbindung = %verbindungs_id, "Verbindungs-Task beendet");
    }
}
