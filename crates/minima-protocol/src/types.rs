//! Core protocol types for Minima's wire format.
//!
//! Every message is one line of UTF-8 text. Fields are separated by single
//! spaces and the first token is the command code. Each type here renders
//! itself with `Display` and parses itself with `FromStr`, so the wire
//! format lives in exactly one place.

use std::fmt;
use std::str::FromStr;

use minima_landscape::{Difficulty, Dimension, Domain, Point};
use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity and routing
// ---------------------------------------------------------------------------

/// Connection-scoped player identifier.
///
/// Serializes as the bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// Who should receive a server message.
///
/// Recipients are resolved when the message is produced, so a broadcast
/// still reaches the roster as it was even if the roster is cleared in the
/// same transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// One specific player.
    Player(PlayerId),
    /// An explicit list of players.
    Players(Vec<PlayerId>),
}

impl Recipient {
    /// The player ids this recipient expands to.
    pub fn ids(&self) -> &[PlayerId] {
        match self {
            Self::Player(id) => std::slice::from_ref(id),
            Self::Players(ids) => ids,
        }
    }
}

/// A server message paired with its recipients.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub recipient: Recipient,
    pub message: ServerMessage,
}

impl Outbound {
    /// Message for a single player.
    pub fn to(player: PlayerId, message: ServerMessage) -> Self {
        Self {
            recipient: Recipient::Player(player),
            message,
        }
    }

    /// Message for every listed player.
    pub fn broadcast(players: impl IntoIterator<Item = PlayerId>, message: ServerMessage) -> Self {
        Self {
            recipient: Recipient::Players(players.into_iter().collect()),
            message,
        }
    }
}

// ---------------------------------------------------------------------------
// Client → Server
// ---------------------------------------------------------------------------

/// Commands a client may send.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    /// `USERNAME <name>`
    Username(String),
    /// `GAME`
    Game,
    /// `SCORE <value> [<pos>]`
    Score { value: f64, position: Option<Point> },
}

impl fmt::Display for ClientCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Username(name) => write!(f, "USERNAME {name}"),
            Self::Game => write!(f, "GAME"),
            Self::Score { value, position: None } => write!(f, "SCORE {value}"),
            Self::Score { value, position: Some(p) } => write!(f, "SCORE {value} {p}"),
        }
    }
}

impl FromStr for ClientCommand {
    type Err = ProtocolError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = line.split_whitespace();
        let code = tokens.next().ok_or(ProtocolError::Empty)?;

        match code {
            "USERNAME" => {
                let name = tokens.next().ok_or(ProtocolError::MissingArgument("username"))?;
                Ok(Self::Username(name.to_string()))
            }
            "GAME" => Ok(Self::Game),
            "SCORE" => {
                let raw = tokens.next().ok_or(ProtocolError::MissingArgument("score"))?;
                let value = parse_finite(raw, "score")?;
                let position = tokens
                    .next()
                    .map(|p| {
                        p.parse::<Point>().map_err(|_| ProtocolError::InvalidArgument {
                            field: "position",
                            value: p.to_string(),
                        })
                    })
                    .transpose()?;
                Ok(Self::Score { value, position })
            }
            other => Err(ProtocolError::UnknownCommand(other.to_string())),
        }
    }
}

fn parse_finite(raw: &str, field: &'static str) -> Result<f64, ProtocolError> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ProtocolError::InvalidArgument {
            field,
            value: raw.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Server → Client
// ---------------------------------------------------------------------------

/// Parameters announced by `GAME start`.
///
/// Wire form: `<rounds> <dim> <difficulty> <steps> <revealRadius> (lo, hi)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameSetup {
    pub rounds: usize,
    pub dim: Dimension,
    pub difficulty: Difficulty,
    pub steps: u32,
    pub reveal_radius: f64,
    pub domain: Domain,
}

impl fmt::Display for GameSetup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {}",
            self.rounds, self.dim, self.difficulty, self.steps, self.reveal_radius, self.domain
        )
    }
}

impl FromStr for GameSetup {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |field: &'static str, value: &str| ProtocolError::InvalidArgument {
            field,
            value: value.to_string(),
        };
        // The domain contains a space, so split off the first five fields only.
        let mut fields = s.trim().splitn(6, ' ');
        let mut next = |field: &'static str| {
            fields.next().ok_or(ProtocolError::MissingArgument(field))
        };

        let rounds = next("rounds")?;
        let dim = next("dimension")?;
        let difficulty = next("difficulty")?;
        let steps = next("steps")?;
        let radius = next("reveal radius")?;
        let domain = next("domain")?;

        Ok(Self {
            rounds: rounds.parse().map_err(|_| invalid("rounds", rounds))?,
            dim: dim.parse().map_err(|_| invalid("dimension", dim))?,
            difficulty: difficulty.parse().map_err(|_| invalid("difficulty", difficulty))?,
            steps: steps.parse().map_err(|_| invalid("steps", steps))?,
            reveal_radius: parse_finite(radius, "reveal radius")?,
            domain: domain.parse().map_err(|_| invalid("domain", domain))?,
        })
    }
}

/// One player's end-of-round disclosure: `name|pos|score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealEntry {
    pub name: String,
    pub position: Point,
    pub score: f64,
}

impl fmt::Display for RevealEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{:.6}", self.name, self.position, self.score)
    }
}

impl FromStr for RevealEntry {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ProtocolError::InvalidArgument {
            field: "reveal entry",
            value: s.to_string(),
        };
        let mut parts = s.split('|');
        let (Some(name), Some(pos), Some(score), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        Ok(Self {
            name: name.to_string(),
            position: pos.parse().map_err(|_| invalid())?,
            score: score.parse().map_err(|_| invalid())?,
        })
    }
}

/// Messages the server sends.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    /// `USERNAME ok`
    UsernameOk,
    /// `USERNAME taken`
    UsernameTaken,
    /// `GAME ok`
    GameOk,
    /// `GAME unavailable`
    GameUnavailable,
    /// `GAME start <setup>`
    GameStart(GameSetup),
    /// `FUNC <seed>`
    Func { seed: u64 },
    /// `REVEAL <entry> <entry> ...`
    Reveal(Vec<RevealEntry>),
    /// `GAME over`
    GameOver,
    /// `ERROR <reason>`
    Error(String),
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UsernameOk => write!(f, "USERNAME ok"),
            Self::UsernameTaken => write!(f, "USERNAME taken"),
            Self::GameOk => write!(f, "GAME ok"),
            Self::GameUnavailable => write!(f, "GAME unavailable"),
            Self::GameStart(setup) => write!(f, "GAME start {setup}"),
            Self::Func { seed } => write!(f, "FUNC {seed}"),
            Self::Reveal(entries) => {
                write!(f, "REVEAL")?;
                for entry in entries {
                    write!(f, " {entry}")?;
                }
                Ok(())
            }
            Self::GameOver => write!(f, "GAME over"),
            Self::Error(reason) => write!(f, "ERROR {reason}"),
        }
    }
}

impl FromStr for ServerMessage {
    type Err = ProtocolError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (code, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        match (code, rest) {
            ("", _) => Err(ProtocolError::Empty),
            ("USERNAME", "ok") => Ok(Self::UsernameOk),
            ("USERNAME", "taken") => Ok(Self::UsernameTaken),
            ("GAME", "ok") => Ok(Self::GameOk),
            ("GAME", "unavailable") => Ok(Self::GameUnavailable),
            ("GAME", "over") => Ok(Self::GameOver),
            ("GAME", rest) if rest.starts_with("start ") => {
                Ok(Self::GameStart(rest["start ".len()..].parse()?))
            }
            ("FUNC", seed) => seed
                .parse()
                .map(|seed| Self::Func { seed })
                .map_err(|_| ProtocolError::InvalidArgument {
                    field: "seed",
                    value: seed.to_string(),
                }),
            ("REVEAL", rest) => rest
                .split_whitespace()
                .map(str::parse::<RevealEntry>)
                .collect::<Result<_, _>>()
                .map(Self::Reveal),
            ("ERROR", reason) => Ok(Self::Error(reason.to_string())),
            (other, _) => Err(ProtocolError::UnknownCommand(other.to_string())),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> GameSetup {
        GameSetup {
            rounds: 3,
            dim: Dimension::Two,
            difficulty: Difficulty::Hard,
            steps: 10,
            reveal_radius: 0.5,
            domain: Domain::default(),
        }
    }

    #[test]
    fn test_player_id_serializes_as_plain_number() {
        assert_eq!(serde_json::to_string(&PlayerId(42)).unwrap(), "42");
        assert_eq!(PlayerId(7).to_string(), "P-7");
    }

    #[test]
    fn test_recipient_ids() {
        assert_eq!(Recipient::Player(PlayerId(1)).ids(), &[PlayerId(1)]);
        let all = Recipient::Players(vec![PlayerId(1), PlayerId(2)]);
        assert_eq!(all.ids().len(), 2);
    }

    #[test]
    fn test_parse_username() {
        assert_eq!(
            "USERNAME alice".parse::<ClientCommand>().unwrap(),
            ClientCommand::Username("alice".into())
        );
        assert_eq!(
            "USERNAME".parse::<ClientCommand>().unwrap_err(),
            ProtocolError::MissingArgument("username")
        );
    }

    #[test]
    fn test_parse_game() {
        assert_eq!("GAME".parse::<ClientCommand>().unwrap(), ClientCommand::Game);
    }

    #[test]
    fn test_parse_score_with_and_without_position() {
        assert_eq!(
            "SCORE -1.25".parse::<ClientCommand>().unwrap(),
            ClientCommand::Score {
                value: -1.25,
                position: None,
            }
        );
        assert_eq!(
            "SCORE 0.5 1.5".parse::<ClientCommand>().unwrap(),
            ClientCommand::Score {
                value: 0.5,
                position: Some(Point::X(1.5)),
            }
        );
        assert_eq!(
            "SCORE 0.5 1.5,-2".parse::<ClientCommand>().unwrap(),
            ClientCommand::Score {
                value: 0.5,
                position: Some(Point::XY(1.5, -2.0)),
            }
        );
    }

    #[test]
    fn test_parse_score_rejects_garbage() {
        assert!(matches!(
            "SCORE abc".parse::<ClientCommand>(),
            Err(ProtocolError::InvalidArgument { field: "score", .. })
        ));
        assert!(matches!(
            "SCORE nan".parse::<ClientCommand>(),
            Err(ProtocolError::InvalidArgument { field: "score", .. })
        ));
        assert!(matches!(
            "SCORE 1 x,y".parse::<ClientCommand>(),
            Err(ProtocolError::InvalidArgument { field: "position", .. })
        ));
        assert_eq!(
            "SCORE".parse::<ClientCommand>().unwrap_err(),
            ProtocolError::MissingArgument("score")
        );
    }

    #[test]
    fn test_parse_unknown_and_empty() {
        assert_eq!(
            "FLY high".parse::<ClientCommand>().unwrap_err(),
            ProtocolError::UnknownCommand("FLY".into())
        );
        assert_eq!("   ".parse::<ClientCommand>().unwrap_err(), ProtocolError::Empty);
        // Command codes are case sensitive.
        assert!("game".parse::<ClientCommand>().is_err());
    }

    #[test]
    fn test_game_start_wire_format() {
        let msg = ServerMessage::GameStart(setup());
        assert_eq!(msg.to_string(), "GAME start 3 2 hard 10 0.5 (-6, 6)");
        assert_eq!(msg.to_string().parse::<ServerMessage>().unwrap(), msg);
    }

    #[test]
    fn test_reveal_wire_format() {
        let msg = ServerMessage::Reveal(vec![
            RevealEntry {
                name: "alice".into(),
                position: Point::X(1.5),
                score: -2.0,
            },
            RevealEntry {
                name: "bob".into(),
                position: Point::X(-3.0),
                score: 0.125,
            },
        ]);
        assert_eq!(msg.to_string(), "REVEAL alice|1.5|-2.000000 bob|-3|0.125000");
        assert_eq!(msg.to_string().parse::<ServerMessage>().unwrap(), msg);
    }

    #[test]
    fn test_simple_server_messages() {
        let cases = [
            (ServerMessage::UsernameOk, "USERNAME ok"),
            (ServerMessage::UsernameTaken, "USERNAME taken"),
            (ServerMessage::GameOk, "GAME ok"),
            (ServerMessage::GameUnavailable, "GAME unavailable"),
            (ServerMessage::GameOver, "GAME over"),
            (ServerMessage::Func { seed: 12345 }, "FUNC 12345"),
            (ServerMessage::Error("game not started".into()), "ERROR game not started"),
        ];
        for (msg, wire) in cases {
            assert_eq!(msg.to_string(), wire);
            assert_eq!(wire.parse::<ServerMessage>().unwrap(), msg);
        }
    }

    #[test]
    fn test_game_setup_rejects_bad_fields() {
        assert!("3 3 hard 10 0.5 (-6, 6)".parse::<GameSetup>().is_err());
        assert!("3 1 brutal 10 0.5 (-6, 6)".parse::<GameSetup>().is_err());
        assert!("3 1 hard 10 0.5".parse::<GameSetup>().is_err());
    }

    #[test]
    fn test_reveal_entry_needs_three_fields() {
        assert!("alice|1.0".parse::<RevealEntry>().is_err());
        assert!("alice|1.0|2.0|extra".parse::<RevealEntry>().is_err());
    }
}
