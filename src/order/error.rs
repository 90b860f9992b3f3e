//! Errors raised while composing or executing orders.

use thiserror::Error;

use super::command::Command;
use crate::board::hex::Coord;
use crate::board::state::SnapshotError;
use crate::board::terrain::ConfigurationError;
use crate::board::unit::UnitType;
use crate::sync::server::TransportError;
use crate::sync::session::SyncError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderError {
    /// The server declined the command.
    #[error("order `{command}` rejected: {reason}")]
    Rejected { command: Command, reason: String },

    /// The transport failed during submission; the server may or may not
    /// have applied the command.
    #[error("order `{command}` has unknown outcome: {source}")]
    AmbiguousMutation {
        command: Command,
        #[source]
        source: TransportError,
    },

    /// A turn query (movement or attack options) failed.
    #[error("turn query failed: {0}")]
    Query(#[source] SyncError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("{credits} credits cannot pay for {unit_type} ({cost})")]
    InsufficientCredits {
        unit_type: UnitType,
        credits: u32,
        cost: u32,
    },

    #[error("cannot build at ({0})")]
    NotBuildable(Coord),

    /// The command was accepted, but its combat report names a cell with
    /// no known defender. The move is already applied; refresh to recover.
    #[error("order `{command}` accepted but combat reported at ({target}) has no known unit")]
    UnknownCombatTarget { command: Command, target: Coord },

    /// The command was accepted but the follow-up refresh failed, so the
    /// snapshot is stale.
    #[error("order `{command}` accepted but refresh failed: {source}")]
    RefreshAfterOrder {
        command: Command,
        #[source]
        source: SyncError,
    },
}

impl OrderError {
    /// Whether the run should stop: a configuration mismatch, or a mutation
    /// whose outcome is unknown. Everything else is local to one order.
    pub fn is_fatal(&self) -> bool {
        match self {
            OrderError::Configuration(_) | OrderError::AmbiguousMutation { .. } => true,
            OrderError::Snapshot(e) => matches!(e, SnapshotError::Configuration(_)),
            OrderError::Query(e) | OrderError::RefreshAfterOrder { source: e, .. } => {
                e.is_configuration()
            }
            _ => false,
        }
    }
}
