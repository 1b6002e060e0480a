//! NachrichtenLog – geordnetes, append-only In-Memory-Log
//!
//! Haelt alle seit dem Start empfangenen Nachrichten in Einfuegereihenfolge.
//! `anhaengen` schlaegt nie fehl und validiert nichts – Groessenlimits fuer
//! Uploads sind Sache des vorgelagerten Upload-Dienstes.

use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::types::{ChatNachricht, NachrichtenInhalt};

/// Geordnetes In-Memory-Log aller Chat-Nachrichten
///
/// Thread-safe via Arc + Mutex. Clone teilt den inneren Zustand.
#[derive(Clone)]
pub struct NachrichtenLog {
    inner: Arc<Mutex<LogInnen>>,
}

struct LogInnen {
    eintraege: Vec<ChatNachricht>,
    /// Zuletzt vergebene ID – stellt sicher dass IDs nie fallen,
    /// auch wenn die Uhr innerhalb einer Millisekunde mehrfach liest
    letzte_id: i64,
}

impl NachrichtenLog {
    /// Erstellt ein neues, leeres NachrichtenLog
    pub fn neu() -> Self {
        Self {
            inner: Arc::new(Mutex::new(LogInnen {
                eintraege: Vec::new(),
                letzte_id: 0,
            })),
        }
    }

    /// Haengt eine Nachricht an und gibt die gespeicherte Kopie zurueck
    ///
    /// Stempelt Empfangszeitpunkt und zeitbasierte ID. Die Reihenfolge im
    /// Log entspricht der Ankunftsreihenfolge am Server.
    pub fn anhaengen(&self, sender: impl Into<String>, inhalt: NachrichtenInhalt) -> ChatNachricht {
        let jetzt = Utc::now();
        let mut innen = self.inner.lock();

        let id = jetzt.timestamp_millis().max(innen.letzte_id);
        innen.letzte_id = id;

        let nachricht = ChatNachricht {
            id,
            sender: sender.into(),
            inhalt,
            timestamp: jetzt,
        };
        innen.eintraege.push(nachricht.clone());

        tracing::debug!(
            id = nachricht.id,
            sender = %nachricht.sender,
            typ = %nachricht.typ(),
            "Nachricht im Log abgelegt"
        );
        nachricht
    }

    /// Gibt alle Nachrichten in Einfuegereihenfolge zurueck (Snapshot)
    pub fn alle(&self) -> Vec<ChatNachricht> {
        self.inner.lock().eintraege.clone()
    }

    /// Gibt die Anzahl der Nachrichten im Log zurueck
    pub fn anzahl(&self) -> usize {
        self.inner.lock().eintraege.len()
    }
}

impl Default for NachrichtenLog {
    fn default() -> Self {
        Self::neu()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(inhalt: &str) -> NachrichtenInhalt {
        NachrichtenInhalt::Text {
            text: inhalt.into(),
        }
    }

    #[test]
    fn anhaengen_haelt_einfuegereihenfolge() {
        let log = NachrichtenLog::neu();
        log.anhaengen("alice", text("eins"));
        log.anhaengen("bob", text("zwei"));
        log.anhaengen("alice", text("drei"));

        let alle = log.alle();
        assert_eq!(alle.len(), 3);
        let texte: Vec<_> = alle
            .iter()
            .map(|n| match &n.inhalt {
                NachrichtenInhalt::Text { text } => text.clone(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(texte, vec!["eins", "zwei", "drei"]);
    }

    #[test]
    fn ids_nie_fallend() {
        let log = NachrichtenLog::neu();
        for i in 0..50 {
            log.anhaengen("alice", text(&format!("nachricht {i}")));
        }
        let alle = log.alle();
        for fenster in alle.windows(2) {
            assert!(
                fenster[1].id >= fenster[0].id,
                "IDs muessen monoton nicht-fallend sein"
            );
        }
    }

    #[test]
    fn gespeicherte_kopie_traegt_id_und_zeitstempel() {
        let log = NachrichtenLog::neu();
        let gespeichert = log.anhaengen(
            "bob",
            NachrichtenInhalt::Voice {
                voice_url: "/uploads/gruss.ogg".into(),
                duration_secs: 3.5,
            },
        );
        assert!(gespeichert.id > 0);
        assert_eq!(gespeichert.sender, "bob");
        assert_eq!(log.anzahl(), 1);
        assert_eq!(log.alle()[0], gespeichert);
    }

    #[test]
    fn clone_teilt_inneren_state() {
        let log1 = NachrichtenLog::neu();
        let log2 = log1.clone();
        log1.anhaengen("alice", text("geteilt"));
        assert_eq!(log2.anzahl(), 1);
    }
}
