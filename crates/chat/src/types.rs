//! Oeffentliche Nachrichtentypen

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Nachrichtentyp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NachrichtenTyp {
    Text,
    Voice,
    File,
}

impl std::fmt::Display for NachrichtenTyp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Voice => write!(f, "voice"),
            Self::File => write!(f, "file"),
        }
    }
}

/// Typ-spezifischer Inhalt einer Nachricht
///
/// Serialisiert intern getaggt als `type`, sodass eine Nachricht auf dem
/// Draht flach als `{"type": "text", "text": "..."}` erscheint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NachrichtenInhalt {
    /// Einfache Textnachricht
    Text { text: String },
    /// Sprachnachricht – die URL stammt vom externen Upload-Dienst
    Voice {
        voice_url: String,
        duration_secs: f64,
    },
    /// Dateinachricht – URL und Metadaten stammen vom Upload-Dienst
    File {
        file_name: String,
        file_url: String,
        file_size: u64,
        mime_type: String,
    },
}

impl NachrichtenInhalt {
    /// Gibt den Nachrichtentyp des Inhalts zurueck
    pub fn typ(&self) -> NachrichtenTyp {
        match self {
            Self::Text { .. } => NachrichtenTyp::Text,
            Self::Voice { .. } => NachrichtenTyp::Voice,
            Self::File { .. } => NachrichtenTyp::File,
        }
    }
}

/// Eine Chat-Nachricht wie sie im Log liegt und auf dem Draht erscheint
///
/// `sender` ist der vom Client behauptete Benutzername, nicht die im
/// Register verifizierte Identitaet. `id` ist zeitbasiert (Millisekunden
/// seit Epoch, nie fallend) und dient der UI-Deduplikation, nicht als
/// strikte Sequenznummer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatNachricht {
    pub id: i64,
    pub sender: String,
    #[serde(flatten)]
    pub inhalt: NachrichtenInhalt,
    pub timestamp: DateTime<Utc>,
}

impl ChatNachricht {
    /// Gibt den Nachrichtentyp zurueck
    pub fn typ(&self) -> NachrichtenTyp {
        self.inhalt.typ()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inhalt_flach_serialisiert() {
        let nachricht = ChatNachricht {
            id: 1700000000000,
            sender: "alice".into(),
            inhalt: NachrichtenInhalt::Text { text: "hi".into() },
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&nachricht).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["text"], "hi");
        assert_eq!(json["sender"], "alice");
    }

    #[test]
    fn datei_inhalt_round_trip() {
        let inhalt = NachrichtenInhalt::File {
            file_name: "urlaub.jpg".into(),
            file_url: "/uploads/urlaub.jpg".into(),
            file_size: 48213,
            mime_type: "image/jpeg".into(),
        };
        let json = serde_json::to_string(&inhalt).unwrap();
        let decoded: NachrichtenInhalt = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, inhalt);
        assert_eq!(decoded.typ(), NachrichtenTyp::File);
    }

    #[test]
    fn typ_anzeige() {
        assert_eq!(NachrichtenTyp::Voice.to_string(), "voice");
    }
}
