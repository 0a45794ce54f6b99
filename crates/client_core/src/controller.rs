//! Async driver: sends what the session asks for, one request at a time.

use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, warn};

use crate::{
    error::{SessionError, TransportError},
    game::Game,
    session::{Applied, ClickOutcome, IgnoreReason, Outcome, Session},
    transport::{EngineRequest, GameTransport},
};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickReport {
    Ignored(IgnoreReason),
    Selected {
        origin: usize,
    },
    Reselected {
        origin: usize,
    },
    Cancelled,
    /// A move was submitted; `engine` is set when an engine move was chained.
    Played {
        human: Outcome,
        engine: Option<Outcome>,
    },
}

pub struct GameController<G: Game, T: GameTransport> {
    session: Session<G>,
    transport: T,
    request_timeout: Duration,
}

impl<G: Game, T: GameTransport> GameController<G, T> {
    pub fn new(transport: T) -> Self {
        Self {
            session: Session::new(),
            transport,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn session(&self) -> &Session<G> {
        &self.session
    }

    pub fn set_human_side(&mut self, side: G::Side) -> Result<(), SessionError> {
        self.session.set_human_side(side)
    }

    pub fn set_two_player(&mut self, two_player: bool) -> Result<(), SessionError> {
        self.session.set_two_player(two_player)
    }

    pub async fn new_game(&mut self) -> Result<Outcome, SessionError> {
        let request = self.session.begin_new_game()?;
        Ok(self.dispatch(request).await.outcome)
    }

    pub async fn load_game(&mut self, state: Option<String>) -> Result<Outcome, SessionError> {
        let request = self.session.begin_load_game(state)?;
        Ok(self.dispatch(request).await.outcome)
    }

    pub async fn retry_ai_move(&mut self) -> Result<Outcome, SessionError> {
        let request = self.session.begin_ai_move()?;
        Ok(self.dispatch(request).await.outcome)
    }

    /// Feeds one board click through the session. A completing click submits
    /// the move and, in single-player, then requests exactly one engine move.
    pub async fn click(&mut self, index: usize) -> Result<ClickReport, SessionError> {
        let request = match self.session.click(index)? {
            ClickOutcome::Ignored(reason) => return Ok(ClickReport::Ignored(reason)),
            ClickOutcome::Selected { origin } => return Ok(ClickReport::Selected { origin }),
            ClickOutcome::Reselected { origin } => return Ok(ClickReport::Reselected { origin }),
            ClickOutcome::Cancelled => return Ok(ClickReport::Cancelled),
            ClickOutcome::Submit(request) => request,
        };

        let human = self.dispatch(request).await;
        let engine = match human.follow_up {
            Some(ai_request) => {
                let applied = self.dispatch(ai_request).await;
                if applied.follow_up.is_some() {
                    warn!("engine move asked for a further follow-up; dropping it");
                }
                Some(applied.outcome)
            }
            None => None,
        };

        Ok(ClickReport::Played {
            human: human.outcome,
            engine,
        })
    }

    async fn dispatch(&mut self, request: EngineRequest) -> Applied {
        debug!(
            request = request.kind.label(),
            path = %request.path(),
            "dispatching engine request"
        );
        let result = match timeout(self.request_timeout, self.transport.send(&request)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(self.request_timeout)),
        };
        let applied = self.session.apply_reply(result);
        debug!(
            request = request.kind.label(),
            outcome = ?applied.outcome,
            "engine reply interpreted"
        );
        applied
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
