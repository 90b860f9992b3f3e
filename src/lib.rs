//! Hexmarshal client core.
//!
//! Exposes the board model, routing, order composition, protocol data, and
//! the sync session for turn-based hex strategy games played against a
//! remote server.

pub mod board;
pub mod config;
pub mod order;
pub mod protocol;
pub mod route;
pub mod sync;
