//! Session state machine and the snapshots it publishes.

pub mod session;
pub mod snapshot;

pub use session::{GameSession, Mode, Phase};
pub use snapshot::SessionSnapshot;
