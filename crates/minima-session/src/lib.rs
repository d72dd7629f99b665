//! Player session management for Minima.
//!
//! This crate tracks who is connected and what they are called:
//!
//! 1. **Connection tracking**: every accepted connection gets a session
//!    keyed by [`PlayerId`](minima_protocol::PlayerId), subject to a
//!    connection cap.
//! 2. **Usernames**: display names are unique among connected players.
//! 3. **Delivery**: each session owns the sending half of a bounded
//!    queue. Whoever drains the other half does the socket I/O, so callers
//!    holding a lock never wait on a slow client. A client that lets its
//!    queue fill up is reported through an overflow signal.
//!
//! ```text
//! Game layer (above)     ← decides who hears what (Outbound)
//!     ↕
//! Session layer (this)   ← names, ids, per-connection queues
//!     ↕
//! Protocol layer (below) ← PlayerId, ServerMessage
//! ```

mod error;
mod registry;

pub use error::SessionError;
pub use registry::{
    MAX_NAME_LEN, OUTBOX_CAPACITY, Outbox, PlayerRegistry, RegistryConfig, Session,
};
