//! Asset resolution for sessions.

use super::beatmap_storage::load_archive_from_path;
use crate::error::{EngineError, Result};
use crate::models::engine::BeatMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Resolves opaque asset locations into beat maps and song durations.
pub trait AssetLoader {
    fn fetch_beat_map(&self, location: &str) -> Result<BeatMap>;

    /// Length of the song at `location`, in seconds.
    fn probe_duration(&self, location: &str) -> Result<f64>;
}

/// Loads assets from the local filesystem.
///
/// Beat maps are JSON, or `.bm` archives. Song durations come from a sidecar
/// `<song>.duration` text file next to the song unless an override is set.
#[derive(Debug, Clone, Default)]
pub struct FileLoader {
    root: PathBuf,
    duration_override: Option<f64>,
}

impl FileLoader {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            duration_override: None,
        }
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration_override = Some(seconds);
        self
    }

    fn resolve(&self, location: &str) -> PathBuf {
        let path = Path::new(location);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl AssetLoader for FileLoader {
    fn fetch_beat_map(&self, location: &str) -> Result<BeatMap> {
        let path = self.resolve(location);
        if !path.exists() {
            return Err(EngineError::AssetNotFound(path));
        }

        let map = match path.extension().and_then(|e| e.to_str()) {
            Some("bm") => load_archive_from_path(&path)?,
            _ => BeatMap::load(&path)?,
        };
        log::info!("STORAGE: Fetched {} notes from {:?}", map.len(), path);
        Ok(map)
    }

    fn probe_duration(&self, location: &str) -> Result<f64> {
        if let Some(seconds) = self.duration_override {
            return Ok(seconds);
        }

        let mut sidecar = self.resolve(location).into_os_string();
        sidecar.push(".duration");
        let sidecar = PathBuf::from(sidecar);
        if !sidecar.exists() {
            return Err(EngineError::AssetNotFound(sidecar));
        }

        let text = fs::read_to_string(&sidecar)?;
        text.trim()
            .parse::<f64>()
            .map_err(|e| EngineError::InvalidDuration {
                location: location.to_string(),
                message: e.to_string(),
            })
    }
}
