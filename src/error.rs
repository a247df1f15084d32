//! Crate-wide error type.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid beat map JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid settings file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to write settings: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    #[error("Serialization error: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("Deserialization error: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("Note {index} uses unknown lane {lane:?}")]
    InvalidLane { index: usize, lane: String },

    #[error("Note {index} has a non-finite time")]
    InvalidTime { index: usize },

    #[error("Note {index} reaches the baseline before it spawns")]
    TargetBeforeSpawn { index: usize },

    #[error("Invalid key map: {0}")]
    InvalidKeyMap(String),

    #[error("Asset not found: {}", .0.display())]
    AssetNotFound(PathBuf),

    #[error("Invalid duration probe for {location}: {message}")]
    InvalidDuration { location: String, message: String },
}

pub type Result<T> = std::result::Result<T, EngineError>;
