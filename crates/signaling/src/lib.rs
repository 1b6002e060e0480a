//! plauderkasten-signaling – Verbindungs- und Vermittlungskern
//!
//! Dieser Crate implementiert das Herzstueck des Relays: wer ist online,
//! wie erreichen Nachrichten alle anderen Clients, und wie finden zwei
//! Verbindungen fuer einen Anruf zueinander.
//!
//! ## Architektur
//!
//! ```text
//! TCP Listener (RelayServer)
//!     |
//!     v
//! ClientVerbindung (pro Verbindung ein Task)
//!     |  vergibt die VerbindungsId, haelt Keepalive
//!     |
//!     v
//! EreignisDispatcher
//!     |
//!     +-- praesenz_handler  (user_online, Trennung)
//!     +-- chat_handler      (Text-, Sprach-, Dateinachrichten)
//!     +-- AnrufVermittlung  (call_user, accept/reject/end, WebRTC-Relay)
//!
//! SitzungsRegister – Wer ist online (VerbindungsId -> Sitzung)
//! NachrichtenLog   – Geordnetes In-Memory-Log aller Nachrichten
//! EventBroadcaster – Ereignisse an eine/alle/alle-ausser-einer senden
//! ```
//!
//! Der Dispatcher ist vollstaendig synchron: kein Handler wartet auf die
//! Antwort einer anderen Verbindung. Annehmen/Ablehnen eines Anrufs
//! trifft als eigenstaendiges spaeteres Ereignis ein.

pub mod anruf;
pub mod broadcast;
pub mod connection;
pub mod dispatcher;
pub mod handlers;
pub mod presence;
pub mod server_state;
pub mod tcp;

// Bequeme Re-Exporte
pub use anruf::AnrufVermittlung;
pub use broadcast::EventBroadcaster;
pub use connection::ClientVerbindung;
pub use dispatcher::{EreignisDispatcher, VerbindungsKontext};
pub use presence::{Sitzung, SitzungsRegister};
pub use server_state::{RelayKonfig, RelayZustand};
pub use tcp::RelayServer;
