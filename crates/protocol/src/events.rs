//! Ereignis-Protokoll
//!
//! Alle Nachrichten die ueber die persistente Verbindung fliessen.
//! Client->Server und Server->Client sind getrennte Enums – der Server
//! muss so nie auf "unerwartete Richtung" pruefen.
//!
//! Auf dem Draht ist jedes Ereignis intern getaggt:
//!
//! ```json
//! {"event": "user_online", "username": "alice", "color": "#111111"}
//! ```

use plauderkasten_chat::ChatNachricht;
use plauderkasten_core::VerbindungsId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Hilfstypen
// ---------------------------------------------------------------------------

/// Medientyp eines Anrufs
///
/// Wird nur weitergereicht, nie interpretiert – ob der Anruf tatsaechlich
/// Video traegt entscheidet die WebRTC-Verhandlung der Clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MedienTyp {
    Audio,
    Video,
}

impl std::fmt::Display for MedienTyp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Audio => write!(f, "audio"),
            Self::Video => write!(f, "video"),
        }
    }
}

/// Art eines WebRTC-Signals (fuer Logging und Weiterleitung)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalArt {
    Offer,
    Answer,
    IceCandidate,
}

impl std::fmt::Display for SignalArt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Offer => write!(f, "offer"),
            Self::Answer => write!(f, "answer"),
            Self::IceCandidate => write!(f, "ice_candidate"),
        }
    }
}

/// Ein Online-Benutzer in der Praesenz-Uebersicht
///
/// Enthaelt bewusst keine VerbindungsId – die wird anderen Clients nur
/// im Rahmen der Anruf-Signalisierung bekannt gemacht.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnlineBenutzer {
    pub username: String,
    pub color: String,
}

// ---------------------------------------------------------------------------
// Client -> Server
// ---------------------------------------------------------------------------

/// Ereignisse die ein Client an den Server sendet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientEreignis {
    /// Praesenz-Anmeldung – ab jetzt ist die Verbindung im Register.
    /// `color` ist optional; fehlt sie, vergibt der Server die
    /// konfigurierte Standardfarbe.
    UserOnline {
        username: String,
        #[serde(default)]
        color: Option<String>,
    },

    /// Textnachricht an alle anderen Clients
    SendMessage { sender: String, text: String },

    /// Sprachnachricht – die URL stammt vom externen Upload-Dienst
    SendVoiceMessage {
        sender: String,
        voice_url: String,
        duration_secs: f64,
    },

    /// Dateinachricht – URL und Metadaten stammen vom Upload-Dienst
    SendFileMessage {
        sender: String,
        file_name: String,
        file_url: String,
        file_size: u64,
        mime_type: String,
    },

    /// Anruf starten: `to` wird genau einmal ueber das Register
    /// aufgeloest, danach laeuft alles ueber VerbindungsIds
    CallUser {
        from: String,
        to: String,
        media_type: MedienTyp,
    },

    /// Anruf annehmen – `caller` ist die VerbindungsId des Anrufers
    /// aus dem `incoming_call`-Ereignis
    AcceptCall { caller: VerbindungsId },

    /// Anruf ablehnen
    RejectCall { caller: VerbindungsId },

    /// Anruf beenden (von beiden Seiten moeglich)
    EndCall { target: VerbindungsId },

    /// WebRTC-Offer – `payload` wird unveraendert an `target` gereicht
    #[serde(rename = "webrtc_offer")]
    WebRtcOffer { target: VerbindungsId, payload: Value },

    /// WebRTC-Answer
    #[serde(rename = "webrtc_answer")]
    WebRtcAnswer { target: VerbindungsId, payload: Value },

    /// WebRTC-ICE-Kandidat
    #[serde(rename = "webrtc_ice_candidate")]
    WebRtcIceCandidate { target: VerbindungsId, payload: Value },

    /// Keepalive-Anfrage des Clients
    Ping { timestamp_ms: u64 },

    /// Antwort des Clients auf einen Server-Ping
    Pong { timestamp_ms: u64 },
}

// ---------------------------------------------------------------------------
// Server -> Client
// ---------------------------------------------------------------------------

/// Ereignisse die der Server an Clients sendet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerEreignis {
    /// Ein Benutzer ist online gegangen (geht an alle anderen)
    UserJoined { username: String },

    /// Vollstaendiger Praesenz-Snapshot (geht an alle, auch den Neuen)
    UsersOnline { users: Vec<OnlineBenutzer> },

    /// Ein Benutzer ist offline gegangen (geht an alle anderen)
    UserLeft { username: String },

    /// Neue Textnachricht (geht an alle ausser den Absender)
    NewMessage { message: ChatNachricht },

    /// Neue Sprachnachricht
    NewVoiceMessage { message: ChatNachricht },

    /// Neue Dateinachricht
    NewFileMessage { message: ChatNachricht },

    /// Eingehender Anruf – `caller` ist die VerbindungsId des Anrufers,
    /// die der Angerufene fuer alle weiteren Anruf-Ereignisse verwendet
    IncomingCall {
        from: String,
        caller: VerbindungsId,
        media_type: MedienTyp,
    },

    /// Bestaetigung an den Anrufer: der Anruf klingelt beim Ziel
    CallInitiated { to: String },

    /// Anruf konnte nicht vermittelt werden (Ziel nicht online)
    CallFailed { reason: String },

    /// Der Angerufene hat angenommen – `callee` ist seine VerbindungsId
    CallAccepted { callee: VerbindungsId },

    /// Der Angerufene hat abgelehnt
    CallRejected,

    /// Die Gegenseite hat den Anruf beendet
    CallEnded,

    /// WebRTC-Offer, unveraendert weitergereicht
    #[serde(rename = "webrtc_offer")]
    WebRtcOffer { target: VerbindungsId, payload: Value },

    /// WebRTC-Answer, unveraendert weitergereicht
    #[serde(rename = "webrtc_answer")]
    WebRtcAnswer { target: VerbindungsId, payload: Value },

    /// WebRTC-ICE-Kandidat, unveraendert weitergereicht
    #[serde(rename = "webrtc_ice_candidate")]
    WebRtcIceCandidate { target: VerbindungsId, payload: Value },

    /// Keepalive-Ping des Servers
    Ping { timestamp_ms: u64 },

    /// Antwort auf einen Client-Ping
    Pong {
        echo_timestamp_ms: u64,
        server_timestamp_ms: u64,
    },
}

impl ServerEreignis {
    /// Baut das Weiterleitungs-Ereignis fuer ein WebRTC-Signal
    ///
    /// Der Payload wird byte-fuer-byte uebernommen; nur der Ereignisname
    /// bleibt erhalten.
    pub fn signal(art: SignalArt, target: VerbindungsId, payload: Value) -> Self {
        match art {
            SignalArt::Offer => Self::WebRtcOffer { target, payload },
            SignalArt::Answer => Self::WebRtcAnswer { target, payload },
            SignalArt::IceCandidate => Self::WebRtcIceCandidate { target, payload },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
