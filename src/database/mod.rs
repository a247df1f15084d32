//! Beat-map persistence and asset loading.

pub mod beatmap_storage;
pub mod loader;

pub use beatmap_storage::{BeatMapArchive, beat_map_hash};
pub use loader::{AssetLoader, FileLoader};
