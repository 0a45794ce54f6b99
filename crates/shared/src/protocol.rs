use std::collections::BTreeMap;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::ProtocolError;

/// One engine-owned cell as sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Square {
    pub rank: u8,
    pub file: u8,
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub piece: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub piece_colour: Option<String>,
}

impl Square {
    pub fn empty(rank: u8, file: u8, index: usize) -> Self {
        Self {
            rank,
            file,
            index,
            piece: None,
            piece_colour: None,
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.piece.is_some()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRows {
    List(Vec<Vec<Square>>),
    Keyed(BTreeMap<String, Vec<Square>>),
}

impl TryFrom<RawRows> for Board {
    type Error = String;

    fn try_from(raw: RawRows) -> Result<Self, Self::Error> {
        let rows = match raw {
            RawRows::List(rows) => rows,
            RawRows::Keyed(keyed) => {
                let mut numbered = keyed
                    .into_iter()
                    .map(|(key, row)| {
                        key.parse::<usize>()
                            .map(|n| (n, row))
                            .map_err(|_| format!("row key '{key}' is not a row number"))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                numbered.sort_by_key(|(n, _)| *n);
                numbered.into_iter().map(|(_, row)| row).collect()
            }
        };
        Ok(Self { rows })
    }
}

/// Full board snapshot, rows in display order (top row first).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawRows")]
pub struct Board {
    pub rows: Vec<Vec<Square>>,
}

impl Serialize for Board {
    fn serialize<Ser: serde::Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        self.rows.serialize(serializer)
    }
}

impl Board {
    pub fn new(rows: Vec<Vec<Square>>) -> Self {
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(Vec::is_empty)
    }

    pub fn squares(&self) -> impl Iterator<Item = &Square> {
        self.rows.iter().flatten()
    }

    /// Looks a cell up by the engine's own index, not its display position.
    pub fn square(&self, index: usize) -> Option<&Square> {
        self.squares().find(|sq| sq.index == index)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGameRequest {
    /// True when the human takes the side that moves first.
    pub player: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadGameRequest {
    /// Saved position; absent means "resend the engine's current game".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChessMoveRequest {
    pub start_pos: usize,
    pub end_pos: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectFourMoveRequest {
    #[serde(rename = "move")]
    pub column: usize,
}

/// Engine reply before classification; every field is optional on the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "S: DeserializeOwned"))]
pub struct RawReply<S> {
    #[serde(default, alias = "game")]
    pub board: Option<Board>,
    #[serde(default)]
    pub turn: Option<S>,
    #[serde(default, alias = "fen", alias = "mhn")]
    pub position_code: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<S> {
    pub board: Board,
    pub turn: S,
    pub position_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerReply<S> {
    End {
        message: String,
        snapshot: Option<Snapshot<S>>,
    },
    Rejected {
        error: String,
    },
    Accepted(Snapshot<S>),
}

impl<S: DeserializeOwned> RawReply<S> {
    pub fn from_value(value: serde_json::Value) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Applies the reply precedence: end, then error, then accepted.
    pub fn classify(self) -> Result<ServerReply<S>, ProtocolError> {
        let snapshot = match (self.board, self.turn) {
            (Some(board), Some(turn)) => Some(Snapshot {
                board,
                turn,
                position_code: self.position_code,
            }),
            _ => None,
        };

        if let Some(message) = self.end {
            return Ok(ServerReply::End { message, snapshot });
        }
        if let Some(error) = self.error {
            return Ok(ServerReply::Rejected { error });
        }
        snapshot
            .map(ServerReply::Accepted)
            .ok_or_else(|| ProtocolError::Malformed("reply has no board/turn, end or error".into()))
    }
}

pub fn classify_reply<S: DeserializeOwned>(
    value: serde_json::Value,
) -> Result<ServerReply<S>, ProtocolError> {
    RawReply::<S>::from_value(value)?.classify()
}
