//! Gemeinsame Identifikationstypen fuer Plauderkasten
//!
//! IDs verwenden das Newtype-Pattern um Verwechslungen zwischen
//! verschiedenen ID-Arten zur Compilezeit auszuschliessen.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Eindeutige Verbindungs-ID
///
/// Wird vom Transport beim Annehmen einer TCP-Verbindung vergeben und
/// bleibt fuer die Lebensdauer der Verbindung stabil. Anderen Clients
/// wird sie nur im Rahmen der Anruf-Signalisierung bekannt gemacht.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerbindungsId(pub Uuid);

impl VerbindungsId {
    /// Erstellt eine neue zufaellige VerbindungsId
    pub fn neu() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for VerbindungsId {
    fn default() -> Self {
        Self::neu()
    }
}

impl std::fmt::Display for VerbindungsId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "verbindung:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbindungs_id_eindeutig() {
        let a = VerbindungsId::neu();
        let b = VerbindungsId::neu();
        assert_ne!(a, b, "Zwei neue VerbindungsIds muessen verschieden sein");
    }

    #[test]
    fn verbindungs_id_display() {
        let id = VerbindungsId(Uuid::nil());
        assert!(id.to_string().starts_with("verbindung:"));
    }

    #[test]
    fn verbindungs_id_serde_round_trip() {
        let id = VerbindungsId::neu();
        let json = serde_json::to_string(&id).unwrap();
        let id2: VerbindungsId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, id2);
    }
}
