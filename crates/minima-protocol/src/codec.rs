//! Codec trait and the newline-delimited text codec.
//!
//! The protocol layer doesn't care how bytes reach it. A [`Codec`] turns a
//! typed message into one framed line and back, so the server and test
//! clients share exactly one definition of the framing.

use std::fmt::Display;
use std::str::FromStr;

use crate::ProtocolError;

/// A message type that knows its own text form.
///
/// Blanket-implemented for anything with `Display` and a `FromStr` that
/// reports [`ProtocolError`].
pub trait WireMessage: Display + FromStr<Err = ProtocolError> {}

impl<T> WireMessage for T where T: Display + FromStr<Err = ProtocolError> {}

/// Encodes messages to framed bytes and decodes framed bytes to messages.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a message into one framed unit.
    fn encode<M: WireMessage>(&self, message: &M) -> Vec<u8>;

    /// Parses one framed unit back into a message.
    fn decode<M: WireMessage>(&self, data: &[u8]) -> Result<M, ProtocolError>;
}

// ---------------------------------------------------------------------------
// LineCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] for `\n`-terminated UTF-8 lines.
///
/// Decoding trims the line terminator (`\n` or `\r\n`) and tolerates the
/// quoted framing older clients wrap their commands in, either `C"..."`
/// or plain `"..."`.
///
/// ```rust
/// use minima_protocol::{ClientCommand, Codec, LineCodec, ServerMessage};
///
/// let codec = LineCodec;
/// assert_eq!(codec.encode(&ServerMessage::GameOk), b"GAME ok\n");
///
/// let cmd: ClientCommand = codec.decode(b"C\"GAME\"\r\n").unwrap();
/// assert_eq!(cmd, ClientCommand::Game);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LineCodec;

impl LineCodec {
    /// Removes the terminator and any legacy quote wrapping.
    fn unframe(line: &str) -> &str {
        let line = line.trim_end_matches(['\r', '\n']).trim();
        let inner = line.strip_prefix('C').unwrap_or(line);
        inner
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(line)
    }
}

impl Codec for LineCodec {
    fn encode<M: WireMessage>(&self, message: &M) -> Vec<u8> {
        let mut line = message.to_string().into_bytes();
        line.push(b'\n');
        line
    }

    fn decode<M: WireMessage>(&self, data: &[u8]) -> Result<M, ProtocolError> {
        let text = std::str::from_utf8(data).map_err(|_| ProtocolError::InvalidUtf8)?;
        let line = Self::unframe(text);
        if line.trim().is_empty() {
            return Err(ProtocolError::Empty);
        }
        line.parse()
    }
}
