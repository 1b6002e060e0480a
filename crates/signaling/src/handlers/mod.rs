//! Handler fuer eingehende Client-Ereignisse
//!
//! Praesenz- und Chat-Ereignisse haben eigene Handler-Module;
//! Anruf-Ereignisse gehen direkt an die `AnrufVermittlung`.

pub mod chat_handler;
pub mod praesenz_handler;
