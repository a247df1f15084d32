//! User settings persisted as TOML.

use crate::error::Result;
use crate::input::bindings::KeyMap;
use crate::models::engine::constants::DEFAULT_LANE_SYMBOLS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const SETTINGS_FILE: &str = "settings.toml";

/// How far notes fall on each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FallMode {
    /// One base unit per tick, whatever the frame rate.
    Fixed,
    /// Base unit scaled by the frame delta against a 60 Hz reference.
    #[default]
    FrameScaled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub screen_width: f64,
    pub screen_height: f64,
    /// Simulation steps per second for the blocking loop.
    pub target_fps: u32,
    pub fall_mode: FallMode,
    /// Accepted symbols per lane, primary symbol first.
    pub keybinds: Vec<Vec<String>>,
    /// Where captured beat maps are written.
    pub beatmap_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            screen_width: 1280.0,
            screen_height: 720.0,
            target_fps: 60,
            fall_mode: FallMode::FrameScaled,
            keybinds: DEFAULT_LANE_SYMBOLS
                .iter()
                .map(|s| vec![s.to_string()])
                .collect(),
            beatmap_dir: PathBuf::from("data/beatmaps"),
        }
    }
}

impl Settings {
    /// Loads `settings.toml`, falling back to defaults when it is absent.
    pub fn load() -> Result<Self> {
        Self::load_from(SETTINGS_FILE)
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("SETTINGS: {:?} not found, using defaults", path);
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let settings: Self = toml::from_str(&content)?;
        Ok(settings)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(SETTINGS_FILE)
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Builds the lane lookup from the configured keybinds.
    pub fn key_map(&self) -> Result<KeyMap> {
        KeyMap::with_aliases(&self.keybinds)
    }
}
