//! Key bindings, queued input events and per-lane held state.

pub mod bindings;
pub mod events;
pub mod tracker;

pub use bindings::KeyMap;
pub use events::EngineEvent;
pub use tracker::{LaneInputTracker, LaneState};
