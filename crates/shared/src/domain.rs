use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

macro_rules! side_enum {
    ($name:ident { $first:ident => $first_wire:literal, $second:ident => $second_wire:literal }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $first,
            $second,
        }

        impl $name {
            pub fn opponent(self) -> Self {
                match self {
                    Self::$first => Self::$second,
                    Self::$second => Self::$first,
                }
            }

            /// Whether this side makes the opening move.
            pub fn moves_first(self) -> bool {
                self == Self::$first
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    Self::$first => $first_wire,
                    Self::$second => $second_wire,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ProtocolError;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                match raw.trim().to_ascii_lowercase().as_str() {
                    $first_wire => Ok(Self::$first),
                    $second_wire => Ok(Self::$second),
                    other => Err(ProtocolError::UnknownSide(other.to_string())),
                }
            }
        }
    };
}

side_enum!(Colour { White => "white", Black => "black" });
side_enum!(Disc { Red => "red", Yellow => "yellow" });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    Chess,
    ConnectFour,
}

impl GameKind {
    /// Path segment the engine mounts this game's routes under.
    pub fn route_prefix(self) -> &'static str {
        match self {
            Self::Chess => "chess",
            Self::ConnectFour => "connect4",
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chess => f.write_str("chess"),
            Self::ConnectFour => f.write_str("connect-four"),
        }
    }
}

impl FromStr for GameKind {
    type Err = ProtocolError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "chess" => Ok(Self::Chess),
            "connect4" | "connect-four" | "connect_four" => Ok(Self::ConnectFour),
            other => Err(ProtocolError::UnknownGame(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardShape {
    pub rows: usize,
    pub cols: usize,
}

impl BoardShape {
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    pub const fn cell_count(self) -> usize {
        self.rows * self.cols
    }

    pub fn contains(self, index: usize) -> bool {
        index < self.cell_count()
    }

    /// Row-major `(row, col)` of a linear cell index.
    pub fn row_col(self, index: usize) -> (usize, usize) {
        (index / self.cols, index % self.cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_side_wire_names_case_insensitively() {
        assert_eq!("White".parse::<Colour>().expect("colour"), Colour::White);
        assert_eq!(" yellow ".parse::<Disc>().expect("disc"), Disc::Yellow);
        assert!("green".parse::<Disc>().is_err());
    }

    #[test]
    fn opponent_flips_side() {
        assert_eq!(Colour::White.opponent(), Colour::Black);
        assert_eq!(Disc::Yellow.opponent(), Disc::Red);
        assert!(Disc::Red.moves_first());
        assert!(!Colour::Black.moves_first());
    }

    #[test]
    fn game_kind_accepts_route_and_display_names() {
        assert_eq!("connect4".parse::<GameKind>().expect("kind"), GameKind::ConnectFour);
        assert_eq!("connect-four".parse::<GameKind>().expect("kind"), GameKind::ConnectFour);
        assert_eq!(GameKind::Chess.route_prefix(), "chess");
    }

    #[test]
    fn board_shape_maps_linear_index() {
        let shape = BoardShape::new(6, 7);
        assert_eq!(shape.cell_count(), 42);
        assert_eq!(shape.row_col(15), (2, 1));
        assert!(!shape.contains(42));
    }
}
