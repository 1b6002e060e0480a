//! plauderkasten-core – Gemeinsame Typen und Fehler
//!
//! Kleinster Crate des Workspace: Newtype-IDs und der zentrale
//! Fehler-Enum. Alle anderen Crates bauen darauf auf.

pub mod error;
pub mod types;

// Bequeme Re-Exporte
pub use error::{PlauderError, Result};
pub use types::VerbindungsId;
