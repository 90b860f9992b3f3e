//! Keeping the client's snapshot in step with the game server.

pub mod retry;
pub mod server;
pub mod session;

pub use retry::with_retry;
pub use server::{GameId, GameServer, TransportError};
pub use session::{OrderOutcome, Session, SyncError};
