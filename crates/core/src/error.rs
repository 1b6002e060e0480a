//! Fehlertypen fuer Plauderkasten
//!
//! Zentraler Fehler-Enum der alle moeglichen Fehlerzustaende abdeckt.
//! Untermodule koennen eigene Fehler definieren und via `#[from]`
//! konvertieren.

use thiserror::Error;

/// Globaler Result-Alias fuer Plauderkasten
pub type Result<T> = std::result::Result<T, PlauderError>;

/// Alle moeglichen Fehler im Plauderkasten-System
#[derive(Debug, Error)]
pub enum PlauderError {
    // --- Verbindung & Netzwerk ---
    #[error("Verbindung fehlgeschlagen: {0}")]
    Verbindung(String),

    #[error("Verbindung getrennt: {0}")]
    Getrennt(String),

    #[error("Zeitlimit ueberschritten: {0}")]
    Zeitlimit(String),

    // --- Protokoll ---
    #[error("Ungueltige Nachricht: {0}")]
    UngueltigeNachricht(String),

    // --- Vermittlung ---
    #[error("Benutzer nicht online: {0}")]
    BenutzerNichtOnline(String),

    #[error("Server voll: maximale Verbindungsanzahl erreicht")]
    ServerVoll,

    // --- Konfiguration ---
    #[error("Konfigurationsfehler: {0}")]
    Konfiguration(String),

    // --- Intern ---
    #[error("Interner Fehler: {0}")]
    Intern(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl PlauderError {
    /// Erstellt einen internen Fehler aus einer beliebigen Nachricht
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    /// Gibt true zurueck wenn der Fehler wiederholbar sein koennte
    pub fn ist_wiederholbar(&self) -> bool {
        matches!(
            self,
            Self::Zeitlimit(_) | Self::Verbindung(_) | Self::Getrennt(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fehler_anzeige() {
        let e = PlauderError::BenutzerNichtOnline("marina".into());
        assert_eq!(e.to_string(), "Benutzer nicht online: marina");
    }

    #[test]
    fn wiederholbar_erkennung() {
        assert!(PlauderError::Zeitlimit("test".into()).ist_wiederholbar());
        assert!(!PlauderError::ServerVoll.ist_wiederholbar());
    }
}
