pub mod constants;
pub mod hit_window;
pub mod note;
pub mod playfield;

pub use constants::*;
pub use hit_window::TierTable;
pub use note::{BeatMap, Note, NoteStore};
pub use playfield::Playfield;
