//! Drawing contract and frame composition.

pub mod frame;
pub mod surface;

pub use surface::{CommandRecorder, DrawCommand, DrawSurface};
