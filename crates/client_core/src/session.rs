//! Sans-IO game session: the single source of truth for one game instance.
//!
//! A `Session` never talks to the network. Every action that needs the engine
//! hands back an [`EngineRequest`] and parks the session in [`Phase::Pending`];
//! the host sends the request and feeds the result to [`Session::apply_reply`].

use std::mem;

use serde_json::Value;
use shared::protocol::{classify_reply, Board, LoadGameRequest, ServerReply, Snapshot};
use tracing::{debug, info, warn};

use crate::{
    error::{SessionError, TransportError},
    game::{Game, Selection},
    transport::{EngineRequest, RequestKind},
};

pub const MOVE_FAILED_MESSAGE: &str = "Could not submit move; please retry.";
pub const SERVER_UNREACHABLE_MESSAGE: &str = "Could not reach the game server; please retry.";

/// Flat view of the current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Idle,
    AwaitingSelection,
    AwaitingDestination,
    Pending,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// No game loaded yet.
    Idle,
    AwaitingSelection,
    AwaitingDestination {
        origin: usize,
    },
    /// `resume` is what a transport failure restores; it is never `Pending`.
    Pending {
        request: RequestKind,
        resume: Box<Phase>,
    },
    End {
        message: String,
    },
}

impl Phase {
    pub fn mode(&self) -> Mode {
        match self {
            Self::Idle => Mode::Idle,
            Self::AwaitingSelection => Mode::AwaitingSelection,
            Self::AwaitingDestination { .. } => Mode::AwaitingDestination,
            Self::Pending { .. } => Mode::Pending,
            Self::End { .. } => Mode::End,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NoActiveGame,
    RequestInFlight,
    GameOver,
    OutsideBoard,
    NotSelectable,
}

#[derive(Debug)]
pub enum ClickOutcome {
    Ignored(IgnoreReason),
    Selected { origin: usize },
    Reselected { origin: usize },
    Cancelled,
    Submit(EngineRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    Rejected { error: String },
    Ended { message: String },
    TransportFailed,
    /// A reply arrived while nothing was in flight; the session is unchanged.
    Stale,
}

#[derive(Debug)]
pub struct Applied {
    pub outcome: Outcome,
    /// Engine move to request next. The session is already pending on it.
    pub follow_up: Option<EngineRequest>,
}

impl Applied {
    fn settled(outcome: Outcome) -> Self {
        Self {
            outcome,
            follow_up: None,
        }
    }
}

enum ClickAction {
    Ignore(IgnoreReason),
    Select,
    Reselect,
    Cancel,
    Submit(Selection),
}

pub struct Session<G: Game> {
    phase: Phase,
    board: Board,
    turn: Option<G::Side>,
    position_code: Option<String>,
    error_message: Option<String>,
    human_side: G::Side,
    /// Side the user plays in the current game; follows `human_side` when a
    /// new or loaded game is established.
    playing_side: G::Side,
    two_player: bool,
}

impl<G: Game> Default for Session<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: Game> Session<G> {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            board: Board::default(),
            turn: None,
            position_code: None,
            error_message: None,
            human_side: G::default_human_side(),
            playing_side: G::default_human_side(),
            two_player: false,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn mode(&self) -> Mode {
        self.phase.mode()
    }

    pub fn is_pending(&self) -> bool {
        self.mode() == Mode::Pending
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Option<G::Side> {
        self.turn
    }

    pub fn position_code(&self) -> Option<&str> {
        self.position_code.as_deref()
    }

    pub fn human_side(&self) -> G::Side {
        self.human_side
    }

    pub fn playing_side(&self) -> G::Side {
        self.playing_side
    }

    pub fn is_two_player(&self) -> bool {
        self.two_player
    }

    pub fn selection(&self) -> Option<usize> {
        match self.phase {
            Phase::AwaitingDestination { origin } => Some(origin),
            _ => None,
        }
    }

    /// Origin to highlight, including one whose move is still in flight.
    pub fn highlighted_origin(&self) -> Option<usize> {
        match &self.phase {
            Phase::Pending { resume, .. } => match **resume {
                Phase::AwaitingDestination { origin } => Some(origin),
                _ => None,
            },
            _ => self.selection(),
        }
    }

    pub fn status_message(&self) -> Option<&str> {
        match &self.phase {
            Phase::End { message } => Some(message),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Takes effect when the next game is started or loaded.
    pub fn set_human_side(&mut self, side: G::Side) -> Result<(), SessionError> {
        self.ensure_nothing_in_flight()?;
        self.human_side = side;
        Ok(())
    }

    pub fn set_two_player(&mut self, two_player: bool) -> Result<(), SessionError> {
        self.ensure_nothing_in_flight()?;
        self.two_player = two_player;
        Ok(())
    }

    pub fn begin_new_game(&mut self) -> Result<EngineRequest, SessionError> {
        self.ensure_nothing_in_flight()?;
        let request = EngineRequest::post(
            G::KIND,
            RequestKind::NewGame,
            &G::new_game_request(self.human_side),
        )?;
        self.enter_pending(RequestKind::NewGame);
        Ok(request)
    }

    pub fn begin_load_game(&mut self, state: Option<String>) -> Result<EngineRequest, SessionError> {
        self.ensure_nothing_in_flight()?;
        if !G::LOADABLE {
            return Err(SessionError::LoadUnsupported(G::KIND));
        }
        let request = EngineRequest::post(
            G::KIND,
            RequestKind::LoadGame,
            &LoadGameRequest { state },
        )?;
        self.enter_pending(RequestKind::LoadGame);
        Ok(request)
    }

    /// Asks the engine to move for its side outside the automatic chain,
    /// e.g. after the chained request failed.
    pub fn begin_ai_move(&mut self) -> Result<EngineRequest, SessionError> {
        match self.phase {
            Phase::Pending { .. } => return Err(SessionError::RequestInFlight),
            Phase::Idle => return Err(SessionError::NoActiveGame),
            Phase::End { .. } => return Err(SessionError::GameOver),
            Phase::AwaitingSelection | Phase::AwaitingDestination { .. } => {}
        }
        if self.two_player {
            return Err(SessionError::TwoPlayer);
        }
        if !self.engine_to_move() {
            return Err(SessionError::NotEngineTurn);
        }
        self.phase = Phase::AwaitingSelection;
        self.enter_pending(RequestKind::AiMove);
        Ok(EngineRequest::get(G::KIND, RequestKind::AiMove))
    }

    pub fn is_clickable(&self, index: usize) -> bool {
        !matches!(self.resolve_click(index), ClickAction::Ignore(_))
    }

    pub fn click(&mut self, index: usize) -> Result<ClickOutcome, SessionError> {
        let outcome = match self.resolve_click(index) {
            ClickAction::Ignore(reason) => {
                debug!(index, ?reason, "click ignored");
                ClickOutcome::Ignored(reason)
            }
            ClickAction::Select => {
                self.phase = Phase::AwaitingDestination { origin: index };
                ClickOutcome::Selected { origin: index }
            }
            ClickAction::Reselect => {
                self.phase = Phase::AwaitingDestination { origin: index };
                ClickOutcome::Reselected { origin: index }
            }
            ClickAction::Cancel => {
                self.phase = Phase::AwaitingSelection;
                ClickOutcome::Cancelled
            }
            ClickAction::Submit(selection) => {
                let body = G::serialize_move(selection);
                let request = EngineRequest::post(G::KIND, RequestKind::HumanMove, &body)?;
                debug!(game = %G::KIND, ?body, "submitting move");
                self.enter_pending(RequestKind::HumanMove);
                ClickOutcome::Submit(request)
            }
        };
        Ok(outcome)
    }

    /// Interprets the result of the request the session is pending on.
    pub fn apply_reply(&mut self, result: Result<Value, TransportError>) -> Applied {
        let (request, resume) = match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Pending { request, resume } => (request, *resume),
            other => {
                self.phase = other;
                warn!(game = %G::KIND, "engine reply arrived with no request in flight");
                return Applied::settled(Outcome::Stale);
            }
        };

        let reply = match result {
            Ok(value) => classify_reply::<G::Side>(value).map_err(|err| err.to_string()),
            Err(err) => Err(err.to_string()),
        };

        match reply {
            Ok(ServerReply::End { message, snapshot }) => {
                if let Some(snapshot) = snapshot {
                    self.replace_snapshot(snapshot);
                }
                if request.starts_game() {
                    self.playing_side = self.human_side;
                }
                info!(game = %G::KIND, request = request.label(), %message, "game over");
                self.error_message = None;
                self.phase = Phase::End {
                    message: message.clone(),
                };
                Applied::settled(Outcome::Ended { message })
            }
            Ok(ServerReply::Rejected { error }) => {
                debug!(game = %G::KIND, request = request.label(), %error, "engine rejected request");
                self.error_message = Some(error.clone());
                self.phase = match request {
                    kind if kind.starts_game() => resume,
                    _ => Phase::AwaitingSelection,
                };
                Applied::settled(Outcome::Rejected { error })
            }
            Ok(ServerReply::Accepted(snapshot)) => {
                self.replace_snapshot(snapshot);
                self.error_message = None;
                self.phase = Phase::AwaitingSelection;
                if request.starts_game() {
                    self.playing_side = self.human_side;
                    info!(game = %G::KIND, turn = ?self.turn, side = ?self.playing_side, "game ready");
                }

                // Only a human move chains into an engine move.
                let follow_up = if request == RequestKind::HumanMove && self.engine_to_move() {
                    self.enter_pending(RequestKind::AiMove);
                    Some(EngineRequest::get(G::KIND, RequestKind::AiMove))
                } else {
                    None
                };
                Applied {
                    outcome: Outcome::Accepted,
                    follow_up,
                }
            }
            Err(cause) => {
                warn!(game = %G::KIND, request = request.label(), %cause, "engine request failed");
                let message = match request {
                    RequestKind::HumanMove => MOVE_FAILED_MESSAGE,
                    RequestKind::NewGame | RequestKind::LoadGame | RequestKind::AiMove => {
                        SERVER_UNREACHABLE_MESSAGE
                    }
                };
                self.error_message = Some(message.to_string());
                self.phase = resume;
                Applied::settled(Outcome::TransportFailed)
            }
        }
    }

    fn ensure_nothing_in_flight(&self) -> Result<(), SessionError> {
        if self.is_pending() {
            Err(SessionError::RequestInFlight)
        } else {
            Ok(())
        }
    }

    fn enter_pending(&mut self, request: RequestKind) {
        let resume = mem::replace(&mut self.phase, Phase::Idle);
        self.phase = Phase::Pending {
            request,
            resume: Box::new(resume),
        };
    }

    fn engine_to_move(&self) -> bool {
        !self.two_player && self.turn.is_some_and(|turn| turn != self.playing_side)
    }

    fn can_originate(&self, index: usize) -> bool {
        self.turn
            .is_some_and(|turn| G::accepts_origin(&self.board, turn, index))
    }

    fn replace_snapshot(&mut self, snapshot: Snapshot<G::Side>) {
        self.board = snapshot.board;
        self.turn = Some(snapshot.turn);
        self.position_code = snapshot.position_code;
    }

    fn resolve_click(&self, index: usize) -> ClickAction {
        match &self.phase {
            Phase::Idle => ClickAction::Ignore(IgnoreReason::NoActiveGame),
            Phase::Pending { .. } => ClickAction::Ignore(IgnoreReason::RequestInFlight),
            Phase::End { .. } => ClickAction::Ignore(IgnoreReason::GameOver),
            _ if !G::SHAPE.contains(index) => ClickAction::Ignore(IgnoreReason::OutsideBoard),
            Phase::AwaitingDestination { origin } if *origin == index => ClickAction::Cancel,
            Phase::AwaitingDestination { .. } if self.can_originate(index) => ClickAction::Reselect,
            phase if G::is_completing_selection(phase.mode(), index) => {
                ClickAction::Submit(Selection {
                    origin: self.selection(),
                    target: index,
                })
            }
            Phase::AwaitingSelection if self.can_originate(index) => ClickAction::Select,
            _ => ClickAction::Ignore(IgnoreReason::NotSelectable),
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
