//! AnrufVermittlung – Anruf-Aufbau und WebRTC-Relay
//!
//! Vermittelt Anrufe zwischen genau zwei Verbindungen. Aus Sicht des
//! Anrufers durchlaeuft ein Anruf diese Zustaende:
//!
//! ```text
//! Idle --call_user(ziel)--> Klingelt     [Ziel aufloesbar & online;
//!                                         sonst -> Idle, call_failed]
//! Klingelt --accept_call--> Angenommen   [call_accepted an Anrufer]
//! Klingelt --reject_call--> Idle         [call_rejected an Anrufer]
//! Klingelt|Angenommen --end_call--> Idle [call_ended an die Gegenseite]
//! ```
//!
//! Der Server haelt dabei KEINE Anruf-Tabelle: der Benutzername wird
//! genau einmal aufgeloest (beim Start), danach adressieren die Clients
//! einander ueber die VerbindungsIds aus `incoming_call` bzw.
//! `call_accepted`. Die Vermittlung ist ein reiner Router – Politik gibt
//! es nur am Aufloesungs-Schritt. Ob zu einem `accept_call` je ein
//! `incoming_call` gehoerte, prueft niemand; das Vertrauen liegt beim
//! Client. Senden an eine bereits getrennte VerbindungsId ist ein
//! stiller No-Op.
//!
//! Ein klingelnder Anruf hat serverseitig kein Zeitlimit; die Clients
//! brechen selbst ab.

use plauderkasten_core::VerbindungsId;
use plauderkasten_protocol::{MedienTyp, ServerEreignis, SignalArt};
use serde_json::Value;

use crate::broadcast::EventBroadcaster;
use crate::presence::SitzungsRegister;

/// Grund-Text fuer einen fehlgeschlagenen Anrufaufbau
const GRUND_ZIEL_OFFLINE: &str = "target not online";

/// Vermittelt Anruf-Signalisierung zwischen zwei Verbindungen
///
/// Haelt nur Handles auf Register und Broadcaster, keinen eigenen
/// Zustand. Clone teilt die Handles.
#[derive(Clone)]
pub struct AnrufVermittlung {
    register: SitzungsRegister,
    broadcaster: EventBroadcaster,
}

impl AnrufVermittlung {
    /// Erstellt eine neue AnrufVermittlung
    pub fn neu(register: SitzungsRegister, broadcaster: EventBroadcaster) -> Self {
        Self {
            register,
            broadcaster,
        }
    }

    /// Startet einen Anruf: loest das Ziel auf und laesst es klingeln
    ///
    /// Bei Erfolg erhaelt das Ziel `incoming_call` (mit der
    /// VerbindungsId des Anrufers) und der Anrufer `call_initiated`.
    /// Ist das Ziel nicht online, erhaelt der Anrufer genau ein
    /// `call_failed` und sonst niemand irgendetwas.
    pub fn anruf_starten(
        &self,
        anrufer: VerbindungsId,
        von_username: &str,
        ziel_username: &str,
        medien: MedienTyp,
    ) {
        match self.register.nach_username(ziel_username) {
            Some(ziel) => {
                self.broadcaster.an_verbindung_senden(
                    &ziel.verbindung,
                    ServerEreignis::IncomingCall {
                        from: von_username.to_string(),
                        caller: anrufer,
                        media_type: medien,
                    },
                );
                self.broadcaster.an_verbindung_senden(
                    &anrufer,
                    ServerEreignis::CallInitiated {
                        to: ziel_username.to_string(),
                    },
                );
                tracing::info!(
                    anrufer = %anrufer,
                    von = %von_username,
                    ziel = %ziel_username,
                    medien = %medien,
                    "Anruf vermittelt – Ziel klingelt"
                );
            }
            None => {
                self.broadcaster.an_verbindung_senden(
                    &anrufer,
                    ServerEreignis::CallFailed {
                        reason: GRUND_ZIEL_OFFLINE.to_string(),
                    },
                );
                tracing::debug!(
                    anrufer = %anrufer,
                    ziel = %ziel_username,
                    "Anruf fehlgeschlagen – Ziel nicht online"
                );
            }
        }
    }

    /// Der Angerufene nimmt an: `call_accepted` geht an den Anrufer
    ///
    /// Bedingungslos – es wird nicht geprueft, ob je ein passendes
    /// `incoming_call` gesendet wurde.
    pub fn annehmen(&self, angerufener: VerbindungsId, anrufer: VerbindungsId) {
        self.broadcaster.an_verbindung_senden(
            &anrufer,
            ServerEreignis::CallAccepted {
                callee: angerufener,
            },
        );
        tracing::info!(angerufener = %angerufener, anrufer = %anrufer, "Anruf angenommen");
    }

    /// Der Angerufene lehnt ab: `call_rejected` geht an den Anrufer
    pub fn ablehnen(&self, angerufener: VerbindungsId, anrufer: VerbindungsId) {
        self.broadcaster
            .an_verbindung_senden(&anrufer, ServerEreignis::CallRejected);
        tracing::info!(angerufener = %angerufener, anrufer = %anrufer, "Anruf abgelehnt");
    }

    /// Eine Seite beendet den Anruf: `call_ended` geht an die Gegenseite
    pub fn beenden(&self, von: VerbindungsId, ziel: VerbindungsId) {
        self.broadcaster
            .an_verbindung_senden(&ziel, ServerEreignis::CallEnded);
        tracing::info!(von = %von, ziel = %ziel, "Anruf beendet");
    }

    /// Leitet ein WebRTC-Signal (Offer/Answer/ICE) unveraendert weiter
    ///
    /// Der Payload wird nie interpretiert – Struktur und Gueltigkeit
    /// sind Sache der WebRTC-Verhandlung auf den Clients.
    pub fn signal_weiterleiten(
        &self,
        art: SignalArt,
        von: VerbindungsId,
        ziel: VerbindungsId,
        payload: Value,
    ) {
        self.broadcaster
            .an_verbindung_senden(&ziel, ServerEreignis::signal(art, ziel, payload));
        tracing::trace!(art = %art, von = %von, ziel = %ziel, "WebRTC-Signal weitergeleitet");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    struct Aufbau {
        vermittlung: AnrufVermittlung,
        register: SitzungsRegister,
        broadcaster: EventBroadcaster,
    }

    fn aufbau() -> Aufbau {
        let register = SitzungsRegister::neu();
        let broadcaster = EventBroadcaster::neu();
        let vermittlung = AnrufVermittlung::neu(register.clone(), broadcaster.clone());
        Aufbau {
            vermittlung,
            register,
            broadcaster,
        }
    }

    /// Registriert eine Verbindung in Broadcaster und Register
    fn teilnehmer(
        a: &Aufbau,
        username: &str,
    ) -> (VerbindungsId, mpsc::Receiver<ServerEreignis>) {
        let vid = VerbindungsId::neu();
        let rx = a.broadcaster.registrieren(vid);
        a.register.anmelden(vid, username, "#111111");
        (vid, rx)
    }

    fn leer(rx: &mut mpsc::Receiver<ServerEreignis>) -> bool {
        rx.try_recv().is_err()
    }

    #[tokio::test]
    async fn anruf_an_online_ziel_klingelt() {
        let a = aufbau();
        let (alice, mut rx_alice) = teilnehmer(&a, "alice");
        let (_bob, mut rx_bob) = teilnehmer(&a, "bob");
        let (_carol, mut rx_carol) = teilnehmer(&a, "carol");

        a.vermittlung
            .anruf_starten(alice, "alice", "bob", MedienTyp::Video);

        let bei_bob = rx_bob.try_recv().expect("Bob muss incoming_call erhalten");
        assert_eq!(
            bei_bob,
            ServerEreignis::IncomingCall {
                from: "alice".into(),
                caller: alice,
                media_type: MedienTyp::Video,
            }
        );

        let bei_alice = rx_alice.try_recv().expect("Alice muss call_initiated erhalten");
        assert_eq!(bei_alice, ServerEreignis::CallInitiated { to: "bob".into() });

        // Niemand sonst bekommt etwas, und bob ist nur einmal dran
        assert!(leer(&mut rx_carol), "Unbeteiligte duerfen nichts empfangen");
        assert!(leer(&mut rx_bob));
        assert!(leer(&mut rx_alice));
    }

    #[tokio::test]
    async fn anruf_an_offline_ziel_schlaegt_fehl() {
        let a = aufbau();
        let (alice, mut rx_alice) = teilnehmer(&a, "alice");
        let (_bob, mut rx_bob) = teilnehmer(&a, "bob");

        a.vermittlung
            .anruf_starten(alice, "alice", "niemand", MedienTyp::Audio);

        let bei_alice = rx_alice.try_recv().expect("Alice muss call_failed erhalten");
        assert_eq!(
            bei_alice,
            ServerEreignis::CallFailed {
                reason: "target not online".into(),
            }
        );
        assert!(leer(&mut rx_alice), "Genau ein Ereignis an den Anrufer");
        assert!(leer(&mut rx_bob), "Keine Weiterleitung an Dritte");
    }

    #[tokio::test]
    async fn annehmen_erreicht_nur_den_anrufer() {
        let a = aufbau();
        let (alice, mut rx_alice) = teilnehmer(&a, "alice");
        let (bob, mut rx_bob) = teilnehmer(&a, "bob");
        let (_carol, mut rx_carol) = teilnehmer(&a, "carol");

        a.vermittlung
            .anruf_starten(alice, "alice", "bob", MedienTyp::Audio);
        let _ = rx_bob.try_recv().unwrap(); // incoming_call
        let _ = rx_alice.try_recv().unwrap(); // call_initiated

        a.vermittlung.annehmen(bob, alice);

        let bei_alice = rx_alice.try_recv().expect("Alice muss call_accepted erhalten");
        assert_eq!(bei_alice, ServerEreignis::CallAccepted { callee: bob });
        assert!(leer(&mut rx_bob));
        assert!(leer(&mut rx_carol));
    }

    #[tokio::test]
    async fn ablehnen_und_beenden() {
        let a = aufbau();
        let (alice, mut rx_alice) = teilnehmer(&a, "alice");
        let (bob, mut rx_bob) = teilnehmer(&a, "bob");

        a.vermittlung.ablehnen(bob, alice);
        assert_eq!(rx_alice.try_recv().unwrap(), ServerEreignis::CallRejected);

        a.vermittlung.beenden(alice, bob);
        assert_eq!(rx_bob.try_recv().unwrap(), ServerEreignis::CallEnded);
        assert!(leer(&mut rx_alice));
    }

    #[tokio::test]
    async fn signal_weiterleitung_ist_verbatim() {
        let a = aufbau();
        let (alice, _rx_alice) = teilnehmer(&a, "alice");
        let (bob, mut rx_bob) = teilnehmer(&a, "bob");

        let payload = serde_json::json!({
            "sdp": "v=0\r\no=- 123 2 IN IP4 0.0.0.0",
            "type": "offer"
        });
        a.vermittlung
            .signal_weiterleiten(SignalArt::Offer, alice, bob, payload.clone());

        let bei_bob = rx_bob.try_recv().expect("Bob muss das Offer erhalten");
        assert_eq!(
            bei_bob,
            ServerEreignis::WebRtcOffer {
                target: bob,
                payload,
            }
        );
    }

    #[tokio::test]
    async fn signal_an_getrennte_verbindung_ist_no_op() {
        let a = aufbau();
        let (alice, mut rx_alice) = teilnehmer(&a, "alice");
        let verschwunden = VerbindungsId::neu();

        a.vermittlung.signal_weiterleiten(
            SignalArt::IceCandidate,
            alice,
            verschwunden,
            serde_json::json!({"candidate": "udp ..."}),
        );
        a.vermittlung.beenden(alice, verschwunden);

        // Kein Fehler, keine Rueckmeldung an den Sender
        assert!(leer(&mut rx_alice));
    }
}
