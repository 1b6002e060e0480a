//! Wire-Format fuer TCP-Verbindungen
//!
//! Frame-basiertes Protokoll: Laenge (u32 big-endian) + JSON-Payload.
//!
//! ## Frame-Format
//!
//! ```text
//! +--------+--------+--------+--------+----...----+
//! | Laenge (u32 BE) | 4 Bytes        | Payload    |
//! +--------+--------+--------+--------+----...----+
//! ```
//!
//! Die Laenge gibt die Anzahl der Payload-Bytes an (ohne die 4
//! Laengen-Bytes). Maximale Frame-Groesse ist konfigurierbar
//! (Standard: 1 MB).
//!
//! Der Codec ist generisch ueber den Dekodier-Typ: der Server dekodiert
//! `ClientEreignis`, ein Client (oder Integrationstest) `ServerEreignis`.
//! Kodiert werden kann jeder serialisierbare Typ.

use bytes::{Buf, BufMut, BytesMut};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;
use std::marker::PhantomData;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::{Decoder, Encoder};

// ---------------------------------------------------------------------------
// Konstanten
// ---------------------------------------------------------------------------

/// Standard-maximale Frame-Groesse (1 MB)
pub const DEFAULT_MAX_FRAME_SIZE: usize = 1024 * 1024;

/// Groesse des Laengen-Felds in Bytes
pub const LENGTH_FIELD_SIZE: usize = 4;

// ---------------------------------------------------------------------------
// FrameCodec
// ---------------------------------------------------------------------------

/// tokio-util Codec fuer frame-basierte TCP-Verbindungen
///
/// `E` ist der Typ der eingehenden (dekodierten) Ereignisse.
///
/// # Beispiel
///
/// ```rust,no_run
/// use tokio_util::codec::Framed;
/// use plauderkasten_protocol::events::ClientEreignis;
/// use plauderkasten_protocol::wire::FrameCodec;
///
/// // let stream = TcpStream::connect(...).await?;
/// // let framed = Framed::new(stream, FrameCodec::<ClientEreignis>::neu());
/// ```
#[derive(Debug)]
pub struct FrameCodec<E> {
    /// Maximale erlaubte Frame-Groesse in Bytes
    max_frame_size: usize,
    _eingehend: PhantomData<E>,
}

impl<E> FrameCodec<E> {
    /// Erstellt einen neuen `FrameCodec` mit Standard-Limits
    pub fn neu() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            _eingehend: PhantomData,
        }
    }

    /// Erstellt einen `FrameCodec` mit benutzerdefinierter maximaler Groesse
    pub fn mit_max_groesse(max_frame_size: usize) -> Self {
        Self {
            max_frame_size,
            _eingehend: PhantomData,
        }
    }

    /// Gibt die konfigurierte maximale Frame-Groesse zurueck
    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }
}

impl<E> Default for FrameCodec<E> {
    fn default() -> Self {
        Self::neu()
    }
}

impl<E> Clone for FrameCodec<E> {
    fn clone(&self) -> Self {
        Self {
            max_frame_size: self.max_frame_size,
            _eingehend: PhantomData,
        }
    }
}

// ---------------------------------------------------------------------------
// Decoder-Implementierung
// ---------------------------------------------------------------------------

impl<E: DeserializeOwned> Decoder for FrameCodec<E> {
    type Item = E;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // Warte auf mindestens 4 Bytes fuer das Laengen-Feld
        if src.len() < LENGTH_FIELD_SIZE {
            return Ok(None);
        }

        // Laenge lesen (big-endian u32) ohne den Buffer zu veraendern
        let laenge = u32::from_be_bytes([src[0], src[1], src[2], src[3]]) as usize;

        // Maximale Frame-Groesse pruefen
        if laenge > self.max_frame_size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Frame zu gross: {} Bytes (Maximum: {} Bytes)",
                    laenge, self.max_frame_size
                ),
            ));
        }

        // Pruefen ob der vollstaendige Frame bereits im Buffer ist
        let gesamt = LENGTH_FIELD_SIZE + laenge;
        if src.len() < gesamt {
            src.reserve(gesamt - src.len());
            return Ok(None);
        }

        // Laengen-Feld verbrauchen, Payload extrahieren
        src.advance(LENGTH_FIELD_SIZE);
        let payload = src.split_to(laenge);

        // JSON deserialisieren
        let ereignis: E = serde_json::from_slice(&payload).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("JSON-Deserialisierung fehlgeschlagen: {}", e),
            )
        })?;

        Ok(Some(ereignis))
    }
}

// ---------------------------------------------------------------------------
// Encoder-Implementierung
// ---------------------------------------------------------------------------

impl<E, N: Serialize> Encoder<N> for FrameCodec<E> {
    type Error = io::Error;

    fn encode(&mut self, item: N, dst: &mut BytesMut) -> Result<(), Self::Error> {
        // JSON serialisieren
        let json = serde_json::to_vec(&item).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("JSON-Serialisierung fehlgeschlagen: {}", e),
            )
        })?;

        // Groesse pruefen
        if json.len() > self.max_frame_size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Nachricht zu gross: {} Bytes (Maximum: {} Bytes)",
                    json.len(),
                    self.max_frame_size
                ),
            ));
        }

        // Laengen-Feld + Payload schreiben
        dst.reserve(LENGTH_FIELD_SIZE + json.len());
        dst.put_u32(json.len() as u32);
        dst.put_slice(&json);

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Hilfsfunktionen fuer direktes async Lesen/Schreiben
// ---------------------------------------------------------------------------

/// Liest einen einzelnen Frame aus einem `AsyncRead`
///
/// # Fehler
/// - `UnexpectedEof` wenn die Verbindung vor Abschluss des Frames endet
/// - `InvalidData` bei ungueltigem JSON oder zu grossem Frame
pub async fn read_frame<R, E>(reader: &mut R, max_frame_size: usize) -> io::Result<E>
where
    R: AsyncRead + Unpin,
    E: DeserializeOwned,
{
    // Laengen-Feld lesen
    let mut laengen_buf = [0u8; LENGTH_FIELD_SIZE];
    reader.read_exact(&mut laengen_buf).await?;
    let laenge = u32::from_be_bytes(laengen_buf) as usize;

    if laenge > max_frame_size {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "Frame zu gross: {} Bytes (Maximum: {} Bytes)",
                laenge, max_frame_size
            ),
        ));
    }

    // Payload lesen
    let mut payload = vec![0u8; laenge];
    reader.read_exact(&mut payload).await?;

    serde_json::from_slice(&payload).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("JSON-Deserialisierung fehlgeschlagen: {}", e),
        )
    })
}

/// Schreibt einen einzelnen Frame in einen `AsyncWrite`
///
/// # Fehler
/// - `InvalidData` wenn die Nachricht nicht serialisierbar oder zu gross ist
/// - IO-Fehler beim Schreiben
pub async fn write_frame<W, N>(
    writer: &mut W,
    ereignis: &N,
    max_frame_size: usize,
) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
    N: Serialize,
{
    let json = serde_json::to_vec(ereignis).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("JSON-Serialisierung fehlgeschlagen: {}", e),
        )
    })?;

    if json.len() > max_frame_size {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "Nachricht zu gross: {} Bytes (Maximum: {} Bytes)",
                json.len(),
                max_frame_size
            ),
        ));
    }

    let laengen_bytes = (json.len() as u32).to_be_bytes();
    writer.write_all(&laengen_bytes).await?;
    writer.write_all(&json).await?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ClientEreignis, ServerEreignis};

    fn test_ping(timestamp_ms: u64) -> ClientEreignis {
        ClientEreignis::Ping { timestamp_ms }
    }

    #[test]
    fn encode_decode_round_trip() {
        let mut codec = FrameCodec::<ClientEreignis>::neu();
        let original = test_ping(42);

        let mut buf = BytesMut::new();
        codec.encode(original.clone(), &mut buf).unwrap();

        // Laengen-Feld pruefen
        let payload_laenge = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
        assert!(payload_laenge > 0);
        assert_eq!(buf.len(), LENGTH_FIELD_SIZE + payload_laenge);

        let decoded = codec
            .decode(&mut buf)
            .unwrap()
            .expect("Muss ein Ereignis enthalten");
        assert_eq!(decoded, original);
    }

    #[test]
    fn unvollstaendiger_frame_gibt_none() {
        let mut codec = FrameCodec::<ClientEreignis>::neu();
        let mut buf = BytesMut::new();
        codec.encode(test_ping(1), &mut buf).unwrap();

        // Nur die Haelfte der Bytes behalten
        let haelfte = buf.len() / 2;
        let mut teil = buf.split_to(haelfte);

        let result = codec.decode(&mut teil).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn zu_wenig_bytes_fuer_laengenfeld() {
        let mut codec = FrameCodec::<ClientEreignis>::neu();
        let mut buf = BytesMut::from(&[0x00, 0x00][..]);
        let result = codec.decode(&mut buf).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn ablehnung_zu_grosser_frame() {
        let mut codec = FrameCodec::<ClientEreignis>::mit_max_groesse(100);

        let mut buf = BytesMut::new();
        buf.put_u32(200);
        buf.put_slice(&[b'x'; 200]);

        let result = codec.decode(&mut buf);
        assert!(result.is_err());
    }

    #[test]
    fn ablehnung_beim_encode_zu_grosse_nachricht() {
        let mut codec = FrameCodec::<ClientEreignis>::mit_max_groesse(10);
        let mut buf = BytesMut::new();
        let result = codec.encode(test_ping(1), &mut buf);
        assert!(result.is_err());
    }

    #[test]
    fn mehrere_ereignisse_im_buffer() {
        let mut codec = FrameCodec::<ClientEreignis>::neu();
        let mut buf = BytesMut::new();

        for i in 0..3u64 {
            codec.encode(test_ping(i), &mut buf).unwrap();
        }

        for i in 0..3u64 {
            let ereignis = codec.decode(&mut buf).unwrap().expect("Ereignis erwartet");
            assert_eq!(ereignis, test_ping(i));
        }

        assert!(buf.is_empty());
    }

    #[test]
    fn beide_richtungen_auf_einem_codec() {
        // Der Server dekodiert ClientEreignis, kodiert aber ServerEreignis
        let mut codec = FrameCodec::<ClientEreignis>::neu();
        let mut buf = BytesMut::new();

        codec
            .encode(
                ServerEreignis::UserJoined {
                    username: "alice".into(),
                },
                &mut buf,
            )
            .unwrap();

        // Die Gegenseite dekodiert mit ihrem eigenen Codec
        let mut client_codec = FrameCodec::<ServerEreignis>::neu();
        let decoded = client_codec
            .decode(&mut buf)
            .unwrap()
            .expect("Ereignis erwartet");
        assert_eq!(
            decoded,
            ServerEreignis::UserJoined {
                username: "alice".into()
            }
        );
    }

    #[test]
    fn default_max_groesse() {
        let codec = FrameCodec::<ClientEreignis>::neu();
        assert_eq!(codec.max_frame_size(), DEFAULT_MAX_FRAME_SIZE);
    }

    #[tokio::test]
    async fn async_read_write_round_trip() {
        let original = test_ping(99);

        let mut buffer: Vec<u8> = Vec::new();
        write_frame(&mut buffer, &original, DEFAULT_MAX_FRAME_SIZE)
            .await
            .unwrap();

        assert!(buffer.len() > LENGTH_FIELD_SIZE);

        let mut cursor = io::Cursor::new(buffer);
        let decoded: ClientEreignis = read_frame(&mut cursor, DEFAULT_MAX_FRAME_SIZE)
            .await
            .unwrap();
        assert_eq!(decoded, original);
    }

    #[tokio::test]
    async fn async_read_ablehnung_zu_grosser_frame() {
        let mut buffer: Vec<u8> = Vec::new();
        // Laengen-Feld: 2 MB
        buffer.extend_from_slice(&(2u32 * 1024 * 1024).to_be_bytes());

        let mut cursor = io::Cursor::new(buffer);
        let result: io::Result<ClientEreignis> =
            read_frame(&mut cursor, DEFAULT_MAX_FRAME_SIZE).await;
        assert!(result.is_err());
    }
}
