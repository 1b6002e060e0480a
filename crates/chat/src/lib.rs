//! plauderkasten-chat – Nachrichtentypen und Nachrichtenlog
//!
//! Dieses Crate implementiert:
//! - `ChatNachricht` / `NachrichtenInhalt`: Text-, Sprach- und Datei-Nachrichten
//! - `NachrichtenLog`: geordnetes, append-only In-Memory-Log
//!
//! Nachrichten leben ausschliesslich im Prozessspeicher und gehen bei
//! einem Neustart verloren. Der Broadcast-Pfad liest das Log nie zurueck;
//! es existiert nur fuer die Query-API.

pub mod log;
pub mod types;

// Bequeme Re-Exporte
pub use log::NachrichtenLog;
pub use types::{ChatNachricht, NachrichtenInhalt, NachrichtenTyp};
