//! plauderkasten-protocol – Protokoll-Definitionen
//!
//! Definiert die Ereignisse die ueber die persistente TCP-Verbindung
//! zwischen Client und Server ausgetauscht werden, sowie das Frame-
//! basierte Wire-Format (Laenge + JSON).
//!
//! ## Design
//! - Ereignis-basiert statt Request/Response: jede Richtung hat ihren
//!   eigenen getaggten Enum (`ClientEreignis`, `ServerEreignis`)
//! - JSON-Serialisierung via serde, intern getaggt als `event`
//! - WebRTC-Payloads bleiben opakes `serde_json::Value` – der Server
//!   interpretiert sie nie

pub mod events;
pub mod wire;

// Bequeme Re-Exporte
pub use events::{ClientEreignis, MedienTyp, OnlineBenutzer, ServerEreignis, SignalArt};
pub use wire::FrameCodec;
