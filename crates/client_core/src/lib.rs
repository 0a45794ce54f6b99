//! Client-side game-session controller for engine-backed board games.
//!
//! The rules and the AI live on a remote engine. This crate only tracks what
//! the engine last said, decides which clicks mean something, and forwards
//! completed selections as move requests.

pub mod controller;
pub mod error;
pub mod game;
pub mod projection;
pub mod session;
pub mod transport;

pub use controller::{ClickReport, GameController, DEFAULT_REQUEST_TIMEOUT};
pub use error::{SessionError, TransportError};
pub use game::{Chess, ConnectFour, Game, Selection};
pub use projection::{project, project_board, DisplayCell, Shade};
pub use session::{
    Applied, ClickOutcome, IgnoreReason, Mode, Outcome, Phase, Session, MOVE_FAILED_MESSAGE,
    SERVER_UNREACHABLE_MESSAGE,
};
pub use transport::{EngineRequest, GameTransport, HttpTransport, Method, RequestKind};

#[cfg(test)]
#[path = "tests/fixtures.rs"]
mod fixtures;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
