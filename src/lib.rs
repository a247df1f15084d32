//! Lane-based rhythm matching engine.
//!
//! Notes fall down nine lanes toward a baseline. Holding a lane's key while
//! its note is near the baseline locks in a score tier. In capture mode the
//! same presses are recorded into a new beat map instead.

pub mod database;
pub mod error;
pub mod input;
pub mod logic;
pub mod models;
pub mod render;
pub mod state;
pub mod system;

pub use error::{EngineError, Result};
pub use logic::GameLoop;
pub use state::{GameSession, Mode, Phase, SessionSnapshot};
