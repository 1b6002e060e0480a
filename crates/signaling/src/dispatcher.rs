//! EreignisDispatcher – Routet Client-Ereignisse an die Handler
//!
//! Ein einziges `match` ueber den getaggten `ClientEreignis`-Enum.
//! Kein Zweig wartet auf die Antwort einer anderen Verbindung: jeder
//! Handler mutiert Zustand und reiht ausgehende Ereignisse nicht-
//! blockierend ein. Die Annahme eines Anrufs trifft als eigenstaendiges
//! spaeteres Ereignis ein.
//!
//! Ereignisse einer Verbindung werden in Empfangsreihenfolge
//! verarbeitet; ueber Verbindungen hinweg gibt es keine Ordnung ausser
//! der Ankunft an den einzelnen Dispatch-Punkten.

use plauderkasten_chat::NachrichtenInhalt;
use plauderkasten_core::VerbindungsId;
use plauderkasten_protocol::{ClientEreignis, ServerEreignis, SignalArt};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::handlers::{chat_handler, praesenz_handler};
use crate::server_state::RelayZustand;

/// Kontext der aktuellen Verbindung
#[derive(Debug, Clone)]
pub struct VerbindungsKontext {
    /// Vom Transport vergebene VerbindungsId
    pub verbindungs_id: VerbindungsId,
    /// Peer-Adresse fuer Logging
    pub peer_addr: SocketAddr,
}

/// Zentraler Ereignis-Dispatcher
///
/// Routet eingehende `ClientEreignis`se an Handler bzw. Vermittlung.
/// Gibt `Some(...)` zurueck wenn eine direkte Antwort an genau diese
/// Verbindung gehoert (nur Keepalive) – alles andere laeuft ueber den
/// Broadcaster.
pub struct EreignisDispatcher {
    state: Arc<RelayZustand>,
}

impl EreignisDispatcher {
    /// Erstellt einen neuen Dispatcher
    pub fn neu(state: Arc<RelayZustand>) -> Self {
        Self { state }
    }

    /// Verarbeitet ein eingehendes Client-Ereignis
    pub fn dispatch(
        &self,
        ereignis: ClientEreignis,
        ctx: &VerbindungsKontext,
    ) -> Option<ServerEreignis> {
        let verbindung = ctx.verbindungs_id;

        match ereignis {
            // ---------------------------------------------------------------
            // Praesenz
            // ---------------------------------------------------------------
            ClientEreignis::UserOnline { username, color } => {
                praesenz_handler::handle_benutzer_online(verbindung, username, color, &self.state);
                None
            }

            // ---------------------------------------------------------------
            // Chat-Nachrichten
            // ---------------------------------------------------------------
            ClientEreignis::SendMessage { sender, text } => {
                chat_handler::handle_nachricht(
                    verbindung,
                    sender,
                    NachrichtenInhalt::Text { text },
                    &self.state,
                );
                None
            }

            ClientEreignis::SendVoiceMessage {
                sender,
                voice_url,
                duration_secs,
            } => {
                chat_handler::handle_nachricht(
                    verbindung,
                    sender,
                    NachrichtenInhalt::Voice {
                        voice_url,
                        duration_secs,
                    },
                    &self.state,
                );
                None
            }

            ClientEreignis::SendFileMessage {
                sender,
                file_name,
                file_url,
                file_size,
                mime_type,
            } => {
                chat_handler::handle_nachricht(
                    verbindung,
                    sender,
                    NachrichtenInhalt::File {
                        file_name,
                        file_url,
                        file_size,
                        mime_type,
                    },
                    &self.state,
                );
                None
            }

            // ---------------------------------------------------------------
            // Anruf-Signalisierung
            // ---------------------------------------------------------------
            ClientEreignis::CallUser {
                from,
                to,
                media_type,
            } => {
                self.state
                    .vermittlung
                    .anruf_starten(verbindung, &from, &to, media_type);
                None
            }

            ClientEreignis::AcceptCall { caller } => {
                self.state.vermittlung.annehmen(verbindung, caller);
                None
            }

            ClientEreignis::RejectCall { caller } => {
                self.state.vermittlung.ablehnen(verbindung, caller);
                None
            }

            ClientEreignis::EndCall { target } => {
                self.state.vermittlung.beenden(verbindung, target);
                None
            }

            ClientEreignis::WebRtcOffer { target, payload } => {
                self.state.vermittlung.signal_weiterleiten(
                    SignalArt::Offer,
                    verbindung,
                    target,
                    payload,
                );
                None
            }

            ClientEreignis::WebRtcAnswer { target, payload } => {
                self.state.vermittlung.signal_weiterleiten(
                    SignalArt::Answer,
                    verbindung,
                    target,
                    payload,
                );
                None
            }

            ClientEreignis::WebRtcIceCandidate { target, payload } => {
                self.state.vermittlung.signal_weiterleiten(
                    SignalArt::IceCandidate,
                    verbindung,
                    target,
                    payload,
                );
                None
            }

            // ---------------------------------------------------------------
            // Keepalive
            // ---------------------------------------------------------------
            ClientEreignis::Ping { timestamp_ms } => Some(ServerEreignis::Pong {
                echo_timestamp_ms: timestamp_ms,
                server_timestamp_ms: jetzt_ms(),
            }),

            ClientEreignis::Pong { .. } => {
                // Antworten auf Server-Pings werden nur geloggt (RTT-Messung)
                tracing::trace!(verbindung = %verbindung, "Pong empfangen");
                None
            }
        }
    }

    /// Bereinigt alle Ressourcen einer Verbindung beim Trennen
    ///
    /// Der Broadcaster-Eintrag verschwindet zuerst, damit weder
    /// `user_left` noch der Snapshot die trennende Verbindung selbst
    /// erreichen koennen.
    pub fn verbindung_getrennt(&self, ctx: &VerbindungsKontext) {
        self.state.broadcaster.entfernen(&ctx.verbindungs_id);
        praesenz_handler::handle_verbindung_getrennt(ctx.verbindungs_id, &self.state);
        tracing::debug!(verbindung = %ctx.verbindungs_id, "Verbindungs-Ressourcen bereinigt");
    }
}

/// Aktuelle Wanduhr in Millisekunden seit Epoch
pub(crate) fn jetzt_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
