//! Wire types exchanged with the remote rules/AI engine.

pub mod domain;
pub mod error;
pub mod protocol;
