//! Error types for the protocol layer.

/// Errors that can occur while decoding a protocol line.
///
/// None of these are fatal to a connection: the handler replies with
/// `ERROR <reason>` and keeps reading.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProtocolError {
    /// The line was blank.
    #[error("empty message")]
    Empty,

    /// The bytes were not valid UTF-8.
    #[error("message is not valid UTF-8")]
    InvalidUtf8,

    /// The first token is not a known command code.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A required field is missing.
    #[error("missing {0}")]
    MissingArgument(&'static str),

    /// A field is present but malformed.
    #[error("invalid {field}: {value}")]
    InvalidArgument { field: &'static str, value: String },
}

impl ProtocolError {
    /// Short reason sent back as `ERROR <reason>`.
    pub fn wire_reason(&self) -> String {
        match self {
            Self::Empty => "empty".into(),
            Self::InvalidUtf8 => "encoding".into(),
            Self::UnknownCommand(_) => "unknown".into(),
            Self::MissingArgument(field) => format!("missing {field}"),
            Self::InvalidArgument { field, .. } => format!("invalid {field}"),
        }
    }
}
