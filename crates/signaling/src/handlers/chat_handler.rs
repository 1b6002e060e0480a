//! Chat-Handler – Text-, Sprach- und Dateinachrichten
//!
//! Baut aus dem Client-Ereignis eine `ChatNachricht`, haengt sie ans Log
//! und verteilt sie an alle Verbindungen ausser den Absender.

use plauderkasten_chat::{NachrichtenInhalt, NachrichtenTyp};
use plauderkasten_core::VerbindungsId;
use plauderkasten_protocol::ServerEreignis;
use std::sync::Arc;

use crate::server_state::RelayZustand;

/// Verarbeitet eine eingehende Chat-Nachricht beliebigen Typs
///
/// `sender` ist der vom Client behauptete Name. Weicht er von der im
/// Register verifizierten Identitaet der Verbindung ab, wird das
/// protokolliert – aber nicht stillschweigend korrigiert: die Nachricht
/// traegt weiterhin den behaupteten Namen.
pub fn handle_nachricht(
    verbindung: VerbindungsId,
    sender: String,
    inhalt: NachrichtenInhalt,
    state: &Arc<RelayZustand>,
) {
    if let Some(sitzung) = state.register.sitzung(&verbindung) {
        if sitzung.username != sender {
            tracing::warn!(
                verbindung = %verbindung,
                behauptet = %sender,
                registriert = %sitzung.username,
                "Behaupteter Absender weicht von der registrierten Identitaet ab"
            );
        }
    }

    let nachricht = state.nachrichten.anhaengen(sender, inhalt);
    let typ = nachricht.typ();

    let ereignis = match typ {
        NachrichtenTyp::Text => ServerEreignis::NewMessage { message: nachricht },
        NachrichtenTyp::Voice => ServerEreignis::NewVoiceMessage { message: nachricht },
        NachrichtenTyp::File => ServerEreignis::NewFileMessage { message: nachricht },
    };

    let empfaenger = state
        .broadcaster
        .an_alle_ausser_senden(&verbindung, ereignis);
    tracing::debug!(
        verbindung = %verbindung,
        typ = %typ,
        empfaenger,
        "Chat-Nachricht verteilt"
    );
}
