use std::fmt::Write as _;

use client_core::{project, Chess, ConnectFour, DisplayCell, Game, Mode, Session, Shade};
use shared::domain::{Colour, Disc};

/// Text glyphs and axis labels for a game's board.
pub trait TextBoard: Game {
    fn glyph(cell: &DisplayCell<Self::Side>) -> char;
    fn row_label(row: usize) -> String;
    fn column_footer() -> String;
}

impl TextBoard for Chess {
    fn glyph(cell: &DisplayCell<Colour>) -> char {
        let piece = cell
            .occupant
            .as_deref()
            .and_then(|piece| piece.chars().next());
        match (piece, cell.owner) {
            (Some(piece), Some(Colour::White)) => piece.to_ascii_uppercase(),
            (Some(piece), _) => piece.to_ascii_lowercase(),
            (None, _) if cell.shade == Shade::Dark => ':',
            (None, _) => '.',
        }
    }

    fn row_label(row: usize) -> String {
        match Self::SHAPE.rows.checked_sub(row) {
            Some(rank) if rank > 0 => rank.to_string(),
            _ => "?".into(),
        }
    }

    fn column_footer() -> String {
        "    a  b  c  d  e  f  g  h".into()
    }
}

impl TextBoard for ConnectFour {
    fn glyph(cell: &DisplayCell<Disc>) -> char {
        match cell.owner {
            Some(Disc::Red) => 'R',
            Some(Disc::Yellow) => 'Y',
            None => 'o',
        }
    }

    fn row_label(_row: usize) -> String {
        " ".into()
    }

    fn column_footer() -> String {
        "    1  2  3  4  5  6  7".into()
    }
}

pub fn render<G: TextBoard>(session: &Session<G>) -> String {
    let mut out = String::new();
    let grid = project(session);

    for (row, cells) in grid.iter().enumerate() {
        let _ = write!(out, "{:>2} ", G::row_label(row));
        for cell in cells {
            let glyph = G::glyph(cell);
            if cell.selected {
                let _ = write!(out, "[{glyph}]");
            } else {
                let _ = write!(out, " {glyph} ");
            }
        }
        out.push('\n');
    }
    if !grid.is_empty() {
        out.push_str(&G::column_footer());
        out.push('\n');
    }

    out.push_str(&status_lines(session));
    out
}

fn status_lines<G: Game>(session: &Session<G>) -> String {
    let mut out = String::new();
    match session.turn() {
        Some(turn) if !session.is_two_player() && turn == session.playing_side() => {
            let _ = writeln!(out, "turn: {turn} (you)");
        }
        Some(turn) => {
            let _ = writeln!(out, "turn: {turn}");
        }
        None => {
            let _ = writeln!(out, "no game loaded; type 'new'");
        }
    }
    if let Some(code) = session.position_code().filter(|code| !code.is_empty()) {
        let _ = writeln!(out, "position: {code}");
    }
    if session.mode() == Mode::Pending {
        let _ = writeln!(out, "waiting for the engine...");
    }
    if let Some(message) = session.status_message() {
        let _ = writeln!(out, "{message}");
    }
    if let Some(error) = session.error_message() {
        let _ = writeln!(out, "error: {error}");
    }
    out
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
