//! Stateless mapping from a session's board to renderable cells.

use shared::protocol::Board;

use crate::{game::Game, session::Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shade {
    Light,
    Dark,
    Slot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayCell<S> {
    /// Engine index; this is what a click on the cell reports.
    pub index: usize,
    pub row: usize,
    pub col: usize,
    pub occupant: Option<String>,
    pub owner: Option<S>,
    pub shade: Shade,
    pub selected: bool,
    pub clickable: bool,
}

pub fn project<G: Game>(session: &Session<G>) -> Vec<Vec<DisplayCell<G::Side>>> {
    project_board::<G>(session.board(), session.highlighted_origin(), |index| {
        session.is_clickable(index)
    })
}

pub fn project_board<G: Game>(
    board: &Board,
    selected: Option<usize>,
    clickable: impl Fn(usize) -> bool,
) -> Vec<Vec<DisplayCell<G::Side>>> {
    board
        .rows
        .iter()
        .enumerate()
        .map(|(row, squares)| {
            squares
                .iter()
                .enumerate()
                .map(|(col, square)| DisplayCell {
                    index: square.index,
                    row,
                    col,
                    occupant: square.piece.clone(),
                    owner: G::owner(square),
                    shade: G::shade(row, col),
                    selected: selected == Some(square.index),
                    clickable: clickable(square.index),
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/projection_tests.rs"]
mod tests;
