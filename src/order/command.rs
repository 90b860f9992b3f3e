//! Commands sent to the game server and the results it reports.

use std::fmt;

use crate::board::hex::Coord;
use crate::board::unit::UnitType;
use crate::protocol::notation::format_command;

/// A composed order for one unit: up to one move, one attack, and one
/// capture, applied by the server in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnitCommand {
    /// Where the unit stands when the order is given.
    pub at: Coord,
    pub move_to: Option<Coord>,
    pub attack: Option<Coord>,
    pub capture: bool,
}

impl UnitCommand {
    pub fn new(at: Coord) -> Self {
        UnitCommand {
            at,
            move_to: None,
            attack: None,
            capture: false,
        }
    }

    /// Whether no sub-order was selected.
    pub fn is_empty(&self) -> bool {
        self.move_to.is_none() && self.attack.is_none() && !self.capture
    }

    /// The cell the unit ends up on if the order succeeds.
    pub fn final_coord(&self) -> Coord {
        self.move_to.unwrap_or(self.at)
    }
}

/// Anything the client can ask the server to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Unit(UnitCommand),
    Repair { at: Coord },
    Build { at: Coord, unit_type: UnitType },
    EndTurn,
}

impl Command {
    /// The cell of the unit (or base) the command addresses.
    pub fn subject(&self) -> Option<Coord> {
        match self {
            Command::Unit(c) => Some(c.at),
            Command::Repair { at } | Command::Build { at, .. } => Some(*at),
            Command::EndTurn => None,
        }
    }
}

impl From<UnitCommand> for Command {
    fn from(c: UnitCommand) -> Self {
        Command::Unit(c)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_command(self))
    }
}

/// Combat deltas the server reports for an attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatReport {
    pub target: Coord,
    /// Hit points the attacker lost.
    pub damage_received: i32,
    /// Hit points the defender lost.
    pub damage_inflicted: i32,
    /// The attacker's hit points after combat.
    pub remaining_quantity: i32,
}

/// The server's answer to a submitted command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderResult {
    pub success: bool,
    /// The acting unit cannot take further orders this turn.
    pub finished: bool,
    pub combat: Option<CombatReport>,
    /// Server-supplied reason when `success` is false.
    pub error: Option<String>,
    /// The raw response, kept for diagnostics.
    pub raw: String,
}

impl OrderResult {
    /// An accepted order with no combat.
    pub fn accepted(finished: bool) -> Self {
        OrderResult {
            success: true,
            finished,
            ..OrderResult::default()
        }
    }

    pub fn rejected(reason: &str) -> Self {
        OrderResult {
            success: false,
            error: Some(reason.to_string()),
            ..OrderResult::default()
        }
    }

    pub fn with_combat(mut self, report: CombatReport) -> Self {
        self.combat = Some(report);
        self
    }

    /// The rejection reason, falling back to the raw response.
    pub fn reason(&self) -> String {
        match &self.error {
            Some(e) => e.clone(),
            None if self.raw.is_empty() => "no acknowledgement".to_string(),
            None => self.raw.clone(),
        }
    }
}
