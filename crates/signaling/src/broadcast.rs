//! EventBroadcaster – Sendet Ereignisse an alle relevanten Verbindungen
//!
//! Der EventBroadcaster verwaltet die Send-Queues aller lebenden
//! Verbindungen (die Abbildung VerbindungsId -> Transport) und stellt
//! Methoden bereit, um Ereignisse gezielt oder an alle zu senden.
//!
//! ## Selektives Senden
//! - An alle Verbindungen: `an_alle_senden`
//! - An eine Verbindung: `an_verbindung_senden`
//! - An alle ausser eine: `an_alle_ausser_senden`
//!
//! Senden ist nie blockierend. Eine volle oder geschlossene Queue laesst
//! den einen Send still fallen – genau das gewuenschte Verhalten fuer
//! eine Verbindung, die sich mitten im Fan-out trennt.

use dashmap::DashMap;
use plauderkasten_core::VerbindungsId;
use plauderkasten_protocol::ServerEreignis;
use std::sync::Arc;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Konfiguration
// ---------------------------------------------------------------------------

/// Groesse der Send-Queue pro Verbindung
const SEND_QUEUE_GROESSE: usize = 64;

// ---------------------------------------------------------------------------
// VerbindungsSender
// ---------------------------------------------------------------------------

/// Handle auf die Send-Queue einer lebenden Verbindung
#[derive(Clone, Debug)]
pub struct VerbindungsSender {
    pub verbindung: VerbindungsId,
    pub tx: mpsc::Sender<ServerEreignis>,
}

impl VerbindungsSender {
    /// Reiht ein Ereignis nicht-blockierend in die Queue ein
    ///
    /// Gibt `false` zurueck wenn die Queue voll oder geschlossen ist.
    pub fn senden(&self, ereignis: ServerEreignis) -> bool {
        match self.tx.try_send(ereignis) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(verbindung = %self.verbindung, "Send-Queue voll – Ereignis verworfen");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(verbindung = %self.verbindung, "Send-Queue geschlossen (Verbindung getrennt)");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// EventBroadcaster
// ---------------------------------------------------------------------------

/// Zentraler Event-Broadcaster fuer alle lebenden Verbindungen
///
/// Thread-safe via Arc + DashMap. Clone teilt den inneren Zustand.
#[derive(Clone)]
pub struct EventBroadcaster {
    inner: Arc<EventBroadcasterInnen>,
}

struct EventBroadcasterInnen {
    /// Send-Queues, indiziert nach VerbindungsId
    verbindungen: DashMap<VerbindungsId, VerbindungsSender>,
}

impl EventBroadcaster {
    /// Erstellt einen neuen EventBroadcaster
    pub fn neu() -> Self {
        Self {
            inner: Arc::new(EventBroadcasterInnen {
                verbindungen: DashMap::new(),
            }),
        }
    }

    /// Registriert eine Verbindung und gibt ihre Empfangs-Queue zurueck
    ///
    /// Die `ClientVerbindung` liest aus dieser Queue und sendet via TCP.
    /// Die Registrierung passiert beim Annehmen der Verbindung, nicht
    /// erst bei der Praesenz-Anmeldung – Broadcasts adressieren
    /// Verbindungen, nicht angemeldete Benutzer.
    pub fn registrieren(&self, verbindung: VerbindungsId) -> mpsc::Receiver<ServerEreignis> {
        let (tx, rx) = mpsc::channel(SEND_QUEUE_GROESSE);
        let sender = VerbindungsSender { verbindung, tx };
        self.inner.verbindungen.insert(verbindung, sender);
        tracing::debug!(verbindung = %verbindung, "Verbindung im Broadcaster registriert");
        rx
    }

    /// Entfernt eine Verbindung aus dem Broadcaster
    pub fn entfernen(&self, verbindung: &VerbindungsId) {
        self.inner.verbindungen.remove(verbindung);
        tracing::debug!(verbindung = %verbindung, "Verbindung aus Broadcaster entfernt");
    }

    /// Sendet ein Ereignis an eine einzelne Verbindung
    ///
    /// Gibt `true` zurueck wenn die Verbindung gefunden und das Ereignis
    /// eingereiht wurde. Eine unbekannte (bereits getrennte) Verbindung
    /// ist ein stiller No-Op.
    pub fn an_verbindung_senden(
        &self,
        verbindung: &VerbindungsId,
        ereignis: ServerEreignis,
    ) -> bool {
        match self.inner.verbindungen.get(verbindung) {
            Some(sender) => sender.senden(ereignis),
            None => {
                tracing::debug!(verbindung = %verbindung, "Senden an unbekannte Verbindung");
                false
            }
        }
    }

    /// Sendet ein Ereignis an alle Verbindungen
    ///
    /// Gibt die Anzahl der erfolgreichen Sendungen zurueck.
    pub fn an_alle_senden(&self, ereignis: ServerEreignis) -> usize {
        let mut gesendet = 0;
        self.inner.verbindungen.iter().for_each(|eintrag| {
            if eintrag.value().senden(ereignis.clone()) {
                gesendet += 1;
            }
        });
        gesendet
    }

    /// Sendet ein Ereignis an alle Verbindungen ausser einer
    ///
    /// Der Normalfall beim Fan-out: der Ausloeser bekommt sein eigenes
    /// Ereignis nicht zurueckgespiegelt.
    pub fn an_alle_ausser_senden(
        &self,
        ausgeschlossen: &VerbindungsId,
        ereignis: ServerEreignis,
    ) -> usize {
        let mut gesendet = 0;
        self.inner.verbindungen.iter().for_each(|eintrag| {
            if eintrag.key() == ausgeschlossen {
                return;
            }
            if eintrag.value().senden(ereignis.clone()) {
                gesendet += 1;
            }
        });
        gesendet
    }

    /// Gibt die Anzahl der registrierten Verbindungen zurueck
    pub fn anzahl(&self) -> usize {
        self.inner.verbindungen.len()
    }

    /// Prueft ob eine Verbindung registriert ist
    pub fn ist_registriert(&self, verbindung: &VerbindungsId) -> bool {
        self.inner.verbindungen.contains_key(verbindung)
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::neu()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_ereignis(username: &str) -> ServerEreignis {
        ServerEreignis::UserJoined {
            username: username.into(),
        }
    }

    #[tokio::test]
    async fn registrieren_und_senden() {
        let broadcaster = EventBroadcaster::neu();
        let vid = VerbindungsId::neu();

        let mut rx = broadcaster.registrieren(vid);
        assert!(broadcaster.ist_registriert(&vid));

        assert!(broadcaster.an_verbindung_senden(&vid, test_ereignis("alice")));

        let empfangen = rx.try_recv().expect("Ereignis muss vorhanden sein");
        assert_eq!(empfangen, test_ereignis("alice"));
    }

    #[tokio::test]
    async fn senden_an_unbekannte_verbindung_ist_no_op() {
        let broadcaster = EventBroadcaster::neu();
        assert!(!broadcaster.an_verbindung_senden(&VerbindungsId::neu(), test_ereignis("x")));
    }

    #[tokio::test]
    async fn an_alle_senden() {
        let broadcaster = EventBroadcaster::neu();

        let vids: Vec<VerbindungsId> = (0..5).map(|_| VerbindungsId::neu()).collect();
        let mut receivers: Vec<_> = vids
            .iter()
            .map(|vid| broadcaster.registrieren(*vid))
            .collect();

        let gesendet = broadcaster.an_alle_senden(test_ereignis("alle"));
        assert_eq!(gesendet, 5);

        for rx in &mut receivers {
            assert!(rx.try_recv().is_ok());
        }
    }

    #[tokio::test]
    async fn an_alle_ausser_senden() {
        let broadcaster = EventBroadcaster::neu();
        let vid_a = VerbindungsId::neu();
        let vid_b = VerbindungsId::neu();
        let vid_c = VerbindungsId::neu();

        let mut rx_a = broadcaster.registrieren(vid_a);
        let mut rx_b = broadcaster.registrieren(vid_b);
        let mut rx_c = broadcaster.registrieren(vid_c);

        // A ist der Ausloeser und bekommt nichts
        let gesendet = broadcaster.an_alle_ausser_senden(&vid_a, test_ereignis("von_a"));
        assert_eq!(gesendet, 2);

        assert!(rx_a.try_recv().is_err(), "Ausloeser darf nichts empfangen");
        assert!(rx_b.try_recv().is_ok());
        assert!(rx_c.try_recv().is_ok());
    }

    #[tokio::test]
    async fn entfernte_verbindung_empfaengt_nichts_mehr() {
        let broadcaster = EventBroadcaster::neu();
        let vid = VerbindungsId::neu();

        let _rx = broadcaster.registrieren(vid);
        broadcaster.entfernen(&vid);

        assert!(!broadcaster.ist_registriert(&vid));
        assert_eq!(broadcaster.an_alle_senden(test_ereignis("x")), 0);
    }

    #[tokio::test]
    async fn volle_queue_verwirft_statt_zu_blockieren() {
        let broadcaster = EventBroadcaster::neu();
        let vid = VerbindungsId::neu();
        let _rx = broadcaster.registrieren(vid);

        // Queue bis zum Rand fuellen
        for _ in 0..SEND_QUEUE_GROESSE {
            assert!(broadcaster.an_verbindung_senden(&vid, test_ereignis("f")));
        }
        // Der naechste Send faellt still durch
        assert!(!broadcaster.an_verbindung_senden(&vid, test_ereignis("f")));
    }
}
