//! Per-game capabilities plugged into the generic session.

use std::{fmt, str::FromStr};

use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{BoardShape, Colour, Disc, GameKind},
    protocol::{Board, ChessMoveRequest, ConnectFourMoveRequest, NewGameRequest, Square},
};

use crate::{projection::Shade, session::Mode};

/// A completed user selection, ready to be turned into a move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub origin: Option<usize>,
    pub target: usize,
}

pub trait Game: Send + Sync + 'static {
    type Side: Copy
        + Eq
        + fmt::Debug
        + fmt::Display
        + FromStr
        + DeserializeOwned
        + Send
        + Sync
        + 'static;
    type Move: Serialize + fmt::Debug + Send + Sync;

    const KIND: GameKind;
    const SHAPE: BoardShape;
    /// Whether the engine exposes a load route for this game.
    const LOADABLE: bool = true;

    fn default_human_side() -> Self::Side;

    fn new_game_request(human_side: Self::Side) -> NewGameRequest;

    /// Side owning the occupant of a cell, if any.
    fn owner(square: &Square) -> Option<Self::Side>;

    /// Whether `click` may become the origin of a move for `turn`.
    fn accepts_origin(board: &Board, turn: Self::Side, click: usize) -> bool;

    /// Whether `click` completes a selection in `mode`. Called only after a
    /// click on the current origin has been handled as a cancel.
    fn is_completing_selection(mode: Mode, click: usize) -> bool;

    fn serialize_move(selection: Selection) -> Self::Move;

    fn shade(row: usize, col: usize) -> Shade {
        if (row + col) % 2 == 0 {
            Shade::Light
        } else {
            Shade::Dark
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Chess;

impl Game for Chess {
    type Side = Colour;
    type Move = ChessMoveRequest;

    const KIND: GameKind = GameKind::Chess;
    const SHAPE: BoardShape = BoardShape::new(8, 8);

    fn default_human_side() -> Colour {
        Colour::White
    }

    fn new_game_request(human_side: Colour) -> NewGameRequest {
        NewGameRequest {
            player: human_side.moves_first(),
        }
    }

    fn owner(square: &Square) -> Option<Colour> {
        square.piece.as_ref()?;
        square.piece_colour.as_deref()?.parse().ok()
    }

    fn accepts_origin(board: &Board, turn: Colour, click: usize) -> bool {
        board
            .square(click)
            .and_then(Self::owner)
            .is_some_and(|owner| owner == turn)
    }

    fn is_completing_selection(mode: Mode, _click: usize) -> bool {
        mode == Mode::AwaitingDestination
    }

    fn serialize_move(selection: Selection) -> ChessMoveRequest {
        ChessMoveRequest {
            start_pos: selection.origin.unwrap_or(selection.target),
            end_pos: selection.target,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectFour;

impl Game for ConnectFour {
    type Side = Disc;
    type Move = ConnectFourMoveRequest;

    const KIND: GameKind = GameKind::ConnectFour;
    const SHAPE: BoardShape = BoardShape::new(6, 7);
    const LOADABLE: bool = false;

    fn default_human_side() -> Disc {
        Disc::Red
    }

    fn new_game_request(human_side: Disc) -> NewGameRequest {
        NewGameRequest {
            player: human_side.moves_first(),
        }
    }

    // Discs carry their colour in the piece name itself.
    fn owner(square: &Square) -> Option<Disc> {
        square.piece.as_deref()?.parse().ok()
    }

    fn accepts_origin(_board: &Board, _turn: Disc, _click: usize) -> bool {
        false
    }

    fn is_completing_selection(mode: Mode, _click: usize) -> bool {
        mode == Mode::AwaitingSelection
    }

    fn serialize_move(selection: Selection) -> ConnectFourMoveRequest {
        ConnectFourMoveRequest {
            column: selection.target % Self::SHAPE.cols,
        }
    }

    fn shade(_row: usize, _col: usize) -> Shade {
        Shade::Slot
    }
}
