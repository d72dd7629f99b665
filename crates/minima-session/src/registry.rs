//! The player registry: every connected player, their name and outbox.
//!
//! `PlayerRegistry` is not thread-safe by itself. The server keeps it
//! inside the same lock as the game session so a name change and a roster
//! update are never observed separately.

use std::collections::HashMap;
use std::sync::Arc;

use minima_protocol::{Outbound, PlayerId, ServerMessage};
use tokio::sync::Notify;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::SessionError;

/// Longest accepted username, in bytes.
pub const MAX_NAME_LEN: usize = 32;

/// Messages that may wait in one player's queue before the player is
/// treated as gone.
pub const OUTBOX_CAPACITY: usize = 256;

/// Sending half of a player's bounded outbound queue.
///
/// Sends never wait. When the queue is full the message is dropped and the
/// overflow signal fires once, so the connection's owner can close it.
#[derive(Debug, Clone)]
pub struct Outbox {
    sender: mpsc::Sender<ServerMessage>,
    overflow: Arc<Notify>,
}

impl Outbox {
    /// Creates an outbox holding up to `capacity` messages, plus the
    /// receiver a writer task drains.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ServerMessage>) {
        let (sender, receiver) = mpsc::channel(capacity);
        let outbox = Self {
            sender,
            overflow: Arc::new(Notify::new()),
        };
        (outbox, receiver)
    }

    /// Signal notified when a send finds the queue full.
    pub fn overflow_signal(&self) -> Arc<Notify> {
        Arc::clone(&self.overflow)
    }
}

/// Registry limits.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Maximum number of simultaneous sessions.
    pub max_connections: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self { max_connections: 20 }
    }
}

/// One connected player.
#[derive(Debug, Clone)]
pub struct Session {
    pub player_id: PlayerId,
    /// `None` until the first successful `USERNAME`.
    pub name: Option<String>,
    outbox: Outbox,
}

impl Session {
    /// Queues a message for this player without waiting.
    ///
    /// # Errors
    /// - `Overflow` if the queue is full. The overflow signal is notified.
    /// - `Closed` if the receiving side is gone.
    pub fn send(&self, message: ServerMessage) -> Result<(), SessionError> {
        match self.outbox.sender.try_send(message) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.outbox.overflow.notify_one();
                Err(SessionError::Overflow(self.player_id))
            }
            Err(TrySendError::Closed(_)) => Err(SessionError::Closed(self.player_id)),
        }
    }
}

/// Tracks every connected player.
///
/// ```text
/// connect() ──→ register_name() ──→ ... ──→ disconnect()
///   (id, outbox)     (unique name)             (session dropped)
/// ```
#[derive(Debug)]
pub struct PlayerRegistry {
    sessions: HashMap<PlayerId, Session>,
    config: RegistryConfig,
}

impl PlayerRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            sessions: HashMap::new(),
            config,
        }
    }

    /// Creates a session for a freshly accepted connection.
    ///
    /// # Errors
    /// - `Full` if the registry is at `max_connections`.
    /// - `AlreadyConnected` if `player_id` already has a session.
    pub fn connect(&mut self, player_id: PlayerId, outbox: Outbox) -> Result<(), SessionError> {
        if self.sessions.contains_key(&player_id) {
            return Err(SessionError::AlreadyConnected(player_id));
        }
        let max = self.config.max_connections;
        if self.is_full() {
            tracing::warn!(%player_id, max, "connection refused, registry full");
            return Err(SessionError::Full(max));
        }
        self.sessions.insert(
            player_id,
            Session {
                player_id,
                name: None,
                outbox,
            },
        );
        tracing::debug!(%player_id, connected = self.sessions.len(), "session created");
        Ok(())
    }

    /// Assigns `name` to `player_id` and returns the previous name, if any.
    ///
    /// Re-registering the name a player already holds succeeds.
    pub fn register_name(
        &mut self,
        player_id: PlayerId,
        name: &str,
    ) -> Result<Option<String>, SessionError> {
        validate_name(name)?;
        if let Some(owner) = self.find_by_name(name) {
            if owner != player_id {
                return Err(SessionError::NameTaken(name.to_string()));
            }
        }
        let session = self
            .sessions
            .get_mut(&player_id)
            .ok_or(SessionError::NotFound(player_id))?;
        let previous = session.name.replace(name.to_string());
        tracing::info!(%player_id, name, ?previous, "username registered");
        Ok(previous)
    }

    /// Drops a player's session, closing its outbound queue.
    pub fn disconnect(&mut self, player_id: PlayerId) -> Result<Session, SessionError> {
        let session = self
            .sessions
            .remove(&player_id)
            .ok_or(SessionError::NotFound(player_id))?;
        tracing::debug!(%player_id, name = ?session.name, "session removed");
        Ok(session)
    }

    pub fn get(&self, player_id: PlayerId) -> Option<&Session> {
        self.sessions.get(&player_id)
    }

    pub fn name(&self, player_id: PlayerId) -> Option<&str> {
        self.sessions.get(&player_id)?.name.as_deref()
    }

    /// Whether the player has completed `USERNAME`.
    pub fn is_registered(&self, player_id: PlayerId) -> bool {
        self.name(player_id).is_some()
    }

    pub fn find_by_name(&self, name: &str) -> Option<PlayerId> {
        self.sessions
            .values()
            .find(|s| s.name.as_deref() == Some(name))
            .map(|s| s.player_id)
    }

    /// Queues one message for one player.
    ///
    /// # Errors
    /// `NotFound` for an unknown player, otherwise as [`Session::send`].
    pub fn send(&self, player_id: PlayerId, message: ServerMessage) -> Result<(), SessionError> {
        self.sessions
            .get(&player_id)
            .ok_or(SessionError::NotFound(player_id))?
            .send(message)
    }

    /// Fans a batch of outbound messages out to their recipients, in order.
    ///
    /// Messages for departed players are dropped. Returns the players whose
    /// queue overflowed, each once.
    pub fn deliver(&self, outbound: impl IntoIterator<Item = Outbound>) -> Vec<PlayerId> {
        let mut overflowed = Vec::new();
        for Outbound { recipient, message } in outbound {
            for &player_id in recipient.ids() {
                match self.send(player_id, message.clone()) {
                    Ok(()) => {}
                    Err(SessionError::Overflow(_)) => {
                        if !overflowed.contains(&player_id) {
                            overflowed.push(player_id);
                        }
                    }
                    Err(e) => tracing::debug!(%player_id, %message, error = %e, "message dropped"),
                }
            }
        }
        overflowed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.sessions.len() >= self.config.max_connections
    }

    pub fn capacity(&self) -> usize {
        self.config.max_connections
    }

    /// Ids of every connected player.
    pub fn player_ids(&self) -> Vec<PlayerId> {
        let mut ids: Vec<_> = self.sessions.keys().copied().collect();
        ids.sort();
        ids
    }
}

impl Default for PlayerRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

/// Names are single printable tokens without the reveal separator `|`.
fn validate_name(name: &str) -> Result<(), SessionError> {
    let ok = !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && !name.contains('|')
        && !name.chars().any(|c| c.is_whitespace() || c.is_control());
    if ok {
        Ok(())
    } else {
        Err(SessionError::InvalidName(name.to_string()))
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::Receiver;

    fn pid(n: u64) -> PlayerId {
        PlayerId(n)
    }

    fn connect(reg: &mut PlayerRegistry, n: u64) -> Receiver<ServerMessage> {
        let (outbox, rx) = Outbox::channel(OUTBOX_CAPACITY);
        reg.connect(pid(n), outbox).expect("connect");
        rx
    }

    #[test]
    fn test_connect_and_len() {
        let mut reg = PlayerRegistry::default();
        let _a = connect(&mut reg, 1);
        let _b = connect(&mut reg, 2);
        assert_eq!(reg.len(), 2);
        assert!(!reg.is_registered(pid(1)));
    }

    #[test]
    fn test_connect_twice_is_rejected() {
        let mut reg = PlayerRegistry::default();
        let _a = connect(&mut reg, 1);
        let (outbox, _rx) = Outbox::channel(OUTBOX_CAPACITY);
        assert_eq!(reg.connect(pid(1), outbox), Err(SessionError::AlreadyConnected(pid(1))));
    }

    #[test]
    fn test_connect_beyond_capacity_is_full() {
        let mut reg = PlayerRegistry::new(RegistryConfig { max_connections: 1 });
        let _a = connect(&mut reg, 1);
        let (outbox, _rx) = Outbox::channel(OUTBOX_CAPACITY);
        assert_eq!(reg.connect(pid(2), outbox), Err(SessionError::Full(1)));
        assert!(reg.is_full());
    }

    #[test]
    fn test_register_name_unique() {
        let mut reg = PlayerRegistry::default();
        let _a = connect(&mut reg, 1);
        let _b = connect(&mut reg, 2);

        assert_eq!(reg.register_name(pid(1), "alice"), Ok(None));
        assert_eq!(
            reg.register_name(pid(2), "alice"),
            Err(SessionError::NameTaken("alice".into()))
        );
        assert_eq!(reg.name(pid(2)), None);
        assert_eq!(reg.find_by_name("alice"), Some(pid(1)));
    }

    #[test]
    fn test_reregistering_own_name_succeeds() {
        let mut reg = PlayerRegistry::default();
        let _a = connect(&mut reg, 1);
        reg.register_name(pid(1), "alice").unwrap();
        assert_eq!(reg.register_name(pid(1), "alice"), Ok(Some("alice".into())));
    }

    #[test]
    fn test_rename_frees_old_name() {
        let mut reg = PlayerRegistry::default();
        let _a = connect(&mut reg, 1);
        let _b = connect(&mut reg, 2);
        reg.register_name(pid(1), "alice").unwrap();
        assert_eq!(reg.register_name(pid(1), "alicia"), Ok(Some("alice".into())));
        assert_eq!(reg.register_name(pid(2), "alice"), Ok(None));
    }

    #[test]
    fn test_invalid_names() {
        let mut reg = PlayerRegistry::default();
        let _a = connect(&mut reg, 1);
        let long = "x".repeat(MAX_NAME_LEN + 1);
        for bad in ["", "a|b", "two words", long.as_str()] {
            assert!(matches!(reg.register_name(pid(1), bad), Err(SessionError::InvalidName(_))));
        }
    }

    #[test]
    fn test_register_unknown_player_not_found() {
        let mut reg = PlayerRegistry::default();
        assert_eq!(reg.register_name(pid(9), "ghost"), Err(SessionError::NotFound(pid(9))));
    }

    #[test]
    fn test_disconnect_frees_name_and_slot() {
        let mut reg = PlayerRegistry::new(RegistryConfig { max_connections: 1 });
        let _a = connect(&mut reg, 1);
        reg.register_name(pid(1), "alice").unwrap();

        let session = reg.disconnect(pid(1)).unwrap();
        assert_eq!(session.name.as_deref(), Some("alice"));
        assert!(reg.is_empty());
        assert!(matches!(reg.disconnect(pid(1)), Err(SessionError::NotFound(_))));

        let _b = connect(&mut reg, 2);
        assert_eq!(reg.register_name(pid(2), "alice"), Ok(None));
    }

    #[test]
    fn test_deliver_fans_out_in_order() {
        let mut reg = PlayerRegistry::default();
        let mut a = connect(&mut reg, 1);
        let mut b = connect(&mut reg, 2);

        reg.deliver(vec![
            Outbound::broadcast([pid(1), pid(2)], ServerMessage::Func { seed: 4 }),
            Outbound::to(pid(2), ServerMessage::GameOk),
            Outbound::to(pid(3), ServerMessage::GameOver),
        ]);

        assert_eq!(a.try_recv().unwrap(), ServerMessage::Func { seed: 4 });
        assert!(a.try_recv().is_err());
        assert_eq!(b.try_recv().unwrap(), ServerMessage::Func { seed: 4 });
        assert_eq!(b.try_recv().unwrap(), ServerMessage::GameOk);
    }

    #[test]
    fn test_send_to_closed_queue_fails() {
        let mut reg = PlayerRegistry::default();
        let rx = connect(&mut reg, 1);
        drop(rx);
        assert_eq!(reg.send(pid(1), ServerMessage::GameOk), Err(SessionError::Closed(pid(1))));
        assert_eq!(reg.send(pid(2), ServerMessage::GameOk), Err(SessionError::NotFound(pid(2))));
    }

    #[tokio::test]
    async fn test_full_queue_drops_and_signals_overflow() {
        let mut reg = PlayerRegistry::default();
        let (outbox, mut rx) = Outbox::channel(2);
        let overflow = outbox.overflow_signal();
        reg.connect(pid(1), outbox).unwrap();
        let _b = connect(&mut reg, 2);

        let batch = || Outbound::broadcast([pid(1), pid(2)], ServerMessage::GameOk);
        assert!(reg.deliver([batch(), batch()]).is_empty());
        assert_eq!(reg.deliver([batch(), batch()]), vec![pid(1)]);
        assert_eq!(
            reg.send(pid(1), ServerMessage::GameOver),
            Err(SessionError::Overflow(pid(1)))
        );

        // The stored permit resolves immediately.
        overflow.notified().await;
        let queued = std::iter::from_fn(|| rx.try_recv().ok()).count();
        assert_eq!(queued, 2);
    }
}
