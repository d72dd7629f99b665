//! Wire protocol for Minima.
//!
//! This crate defines the line-based language clients and the server speak:
//!
//! - **Types** ([`ClientCommand`], [`ServerMessage`], [`GameSetup`],
//!   [`RevealEntry`]) are the messages that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`LineCodec`]) frames them as lines.
//! - **Errors** ([`ProtocolError`]) describe malformed input.
//!
//! The protocol layer sits between transport (raw lines) and the session
//! and game layers. It knows nothing about connections or rosters.
//!
//! ```text
//! Transport (bytes) → Protocol (ClientCommand) → Session / Game
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, LineCodec, WireMessage};
pub use error::ProtocolError;
pub use types::{
    ClientCommand, GameSetup, Outbound, PlayerId, Recipient, RevealEntry, ServerMessage,
};
