use std::time::Duration;

use shared::domain::GameKind;
use thiserror::Error;

/// Any failure to obtain an interpretable reply from the engine.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("engine responded with status {status}")]
    Status { status: u16 },
    #[error("invalid engine url: {0}")]
    Url(#[from] url::ParseError),
    #[error("no reply within {0:?}")]
    Timeout(Duration),
    #[error("{0}")]
    Unavailable(String),
}

/// A session action refused locally, before anything is sent.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("a request is already in flight")]
    RequestInFlight,
    #[error("no game has been started")]
    NoActiveGame,
    #[error("the game is over")]
    GameOver,
    #[error("it is not the engine's turn")]
    NotEngineTurn,
    #[error("engine moves are disabled in two-player mode")]
    TwoPlayer,
    #[error("the engine cannot load saved {0} games")]
    LoadUnsupported(GameKind),
    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),
}
