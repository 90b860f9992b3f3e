//! The game server as seen by the client core.
//!
//! A `GameServer` bundles the external collaborators: snapshot fetch, the
//! two turn queries, and order submission. The wire format lives behind the
//! trait; implementations map whatever they speak onto these calls.

use thiserror::Error;

use crate::board::hex::Coord;
use crate::board::unit::UnitType;
use crate::order::command::{Command, OrderResult};
use crate::protocol::data::GameData;

pub type GameId = u32;

/// Failures talking to the server.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The request may succeed if repeated (dropped connection, timeout).
    #[error("transient transport failure: {0}")]
    Transient(String),

    /// The response could not be used.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl TransportError {
    pub fn is_transient(&self) -> bool {
        matches!(self, TransportError::Transient(_))
    }
}

pub trait GameServer {
    /// Fetches the full state of a game.
    fn fetch_game(&mut self, game: GameId) -> Result<GameData, TransportError>;

    /// Cells the unit of `unit_type` standing at `at` can move to this turn.
    fn movement_options(
        &mut self,
        game: GameId,
        at: Coord,
        unit_type: UnitType,
    ) -> Result<Vec<Coord>, TransportError>;

    /// Cells holding enemies the unit at `at` could attack if it stood on
    /// `origin`.
    fn attack_options(
        &mut self,
        game: GameId,
        at: Coord,
        origin: Coord,
        unit_type: UnitType,
    ) -> Result<Vec<Coord>, TransportError>;

    /// Submits one command. Not idempotent.
    fn submit(&mut self, game: GameId, command: &Command) -> Result<OrderResult, TransportError>;
}
