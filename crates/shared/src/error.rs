use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("unknown side: {0}")]
    UnknownSide(String),
    #[error("unknown game: {0}")]
    UnknownGame(String),
    #[error("malformed engine reply: {0}")]
    Malformed(String),
    #[error("failed to decode engine reply: {0}")]
    Decode(#[from] serde_json::Error),
}
