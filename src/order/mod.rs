//! Orders: composed commands, the composer, and order errors.

pub mod command;
pub mod composer;
pub mod error;

pub use command::{Command, CombatReport, OrderResult, UnitCommand};
pub use composer::{compose_move, MoveOptions, OrderPlan, RouteUnavailable, TurnQueries};
pub use error::OrderError;
