//! SitzungsRegister – Verwaltet die Praesenz aller lebenden Verbindungen
//!
//! Eine `Sitzung` existiert ab dem `user_online`-Ereignis einer Verbindung
//! und verschwindet mit ihr. Das Register ist der alleinige Eigentuemer;
//! andere Komponenten halten nur die `VerbindungsId`.
//!
//! Benutzernamen sind NICHT eindeutig – zwei Verbindungen koennen
//! denselben Namen beanspruchen. `nach_username` loest die Mehrdeutigkeit
//! deterministisch auf: die zuerst registrierte Sitzung gewinnt, bis sie
//! sich trennt. Eindeutigkeit durchzusetzen ist Sache des vorgelagerten
//! Identitaets-Dienstes.

use dashmap::DashMap;
use plauderkasten_core::VerbindungsId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Sitzung
// ---------------------------------------------------------------------------

/// Praesenz-Daten einer angemeldeten Verbindung
#[derive(Debug, Clone)]
pub struct Sitzung {
    pub verbindung: VerbindungsId,
    pub username: String,
    pub farbe: String,
    /// Registrierungs-Rang: prozessweit monoton steigend. Dient als
    /// Tie-Break bei doppelten Benutzernamen und als stabile Ordnung
    /// der Praesenz-Snapshots.
    pub seq: u64,
}

// ---------------------------------------------------------------------------
// SitzungsRegister
// ---------------------------------------------------------------------------

/// Verwaltet alle angemeldeten Sitzungen
///
/// Thread-safe via Arc + DashMap. Clone teilt den inneren Zustand.
/// Keine der Operationen schlaegt fehl – Abwesenheit ist `None`.
#[derive(Clone)]
pub struct SitzungsRegister {
    inner: Arc<RegisterInnen>,
}

struct RegisterInnen {
    /// Alle angemeldeten Sitzungen, indiziert nach VerbindungsId
    sitzungen: DashMap<VerbindungsId, Sitzung>,
    /// Naechster Registrierungs-Rang
    naechste_seq: AtomicU64,
}

impl SitzungsRegister {
    /// Erstellt ein neues, leeres SitzungsRegister
    pub fn neu() -> Self {
        Self {
            inner: Arc::new(RegisterInnen {
                sitzungen: DashMap::new(),
                naechste_seq: AtomicU64::new(1),
            }),
        }
    }

    /// Meldet eine Verbindung an (oder ueberschreibt ihre Sitzung)
    ///
    /// Ein Ueberschreiben behaelt den urspruenglichen Registrierungs-Rang:
    /// wer seinen Namen oder seine Farbe wechselt, verliert seinen Platz
    /// in der Tie-Break-Ordnung nicht. Broadcasts sind Sache des Aufrufers.
    pub fn anmelden(
        &self,
        verbindung: VerbindungsId,
        username: impl Into<String>,
        farbe: impl Into<String>,
    ) {
        let username = username.into();
        let farbe = farbe.into();

        use dashmap::mapref::entry::Entry;
        match self.inner.sitzungen.entry(verbindung) {
            Entry::Occupied(mut eintrag) => {
                let seq = eintrag.get().seq;
                eintrag.insert(Sitzung {
                    verbindung,
                    username: username.clone(),
                    farbe,
                    seq,
                });
            }
            Entry::Vacant(eintrag) => {
                let seq = self.inner.naechste_seq.fetch_add(1, Ordering::Relaxed);
                eintrag.insert(Sitzung {
                    verbindung,
                    username: username.clone(),
                    farbe,
                    seq,
                });
            }
        }

        tracing::info!(verbindung = %verbindung, username = %username, "Sitzung angemeldet");
    }

    /// Meldet eine Verbindung ab und gibt die vorherige Sitzung zurueck
    ///
    /// Idempotent – eine doppelte Trennung liefert `None`.
    pub fn abmelden(&self, verbindung: &VerbindungsId) -> Option<Sitzung> {
        let sitzung = self.inner.sitzungen.remove(verbindung).map(|(_, s)| s);
        if let Some(ref s) = sitzung {
            tracing::info!(verbindung = %verbindung, username = %s.username, "Sitzung abgemeldet");
        }
        sitzung
    }

    /// Sucht die Sitzung zu einem Benutzernamen
    ///
    /// Linearer Scan. Bei mehreren Treffern gewinnt die zuerst
    /// registrierte Sitzung (kleinster Rang) – deterministisch ueber
    /// wiederholte Aufrufe hinweg, bis diese sich trennt.
    pub fn nach_username(&self, username: &str) -> Option<Sitzung> {
        self.inner
            .sitzungen
            .iter()
            .filter(|eintrag| eintrag.value().username == username)
            .min_by_key(|eintrag| eintrag.value().seq)
            .map(|eintrag| eintrag.value().clone())
    }

    /// Gibt die Sitzung einer Verbindung zurueck
    pub fn sitzung(&self, verbindung: &VerbindungsId) -> Option<Sitzung> {
        self.inner
            .sitzungen
            .get(verbindung)
            .map(|e| e.value().clone())
    }

    /// Prueft ob eine Verbindung angemeldet ist
    pub fn ist_angemeldet(&self, verbindung: &VerbindungsId) -> bool {
        self.inner.sitzungen.contains_key(verbindung)
    }

    /// Gibt alle Sitzungen zurueck, nach Registrierungs-Rang sortiert
    ///
    /// Snapshot zum Aufrufzeitpunkt. Aufrufer projizieren auf
    /// `{username, farbe}` bevor etwas den Prozess verlaesst – die
    /// VerbindungsId gehoert nicht in Praesenz-Snapshots.
    pub fn alle(&self) -> Vec<Sitzung> {
        let mut sitzungen: Vec<Sitzung> = self
            .inner
            .sitzungen
            .iter()
            .map(|e| e.value().clone())
            .collect();
        sitzungen.sort_by_key(|s| s.seq);
        sitzungen
    }

    /// Gibt die Anzahl der angemeldeten Sitzungen zurueck
    pub fn anzahl(&self) -> usize {
        self.inner.sitzungen.len()
    }
}

impl Default for SitzungsRegister {
    fn default() -> Self {
        Self::neu()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
