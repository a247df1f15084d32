//! Beat-map archive storage with Zstd compression.
//!
//! Archives live in `{root}/{hash}.bm`, where `hash` is the md5 of the beat
//! map's JSON form. Notes are serialized with `bincode` before compression.

use crate::error::{EngineError, Result};
use crate::models::engine::BeatMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use zstd::stream::{decode_all, encode_all};

/// Default directory for archives.
pub const ARCHIVE_DIR: &str = "data/bm";

const COMPRESSION_LEVEL: i32 = 19;

/// Content hash used as the archive key.
pub fn beat_map_hash(map: &BeatMap) -> Result<String> {
    let json = map.to_json()?;
    Ok(format!("{:x}", md5::compute(json.as_bytes())))
}

#[derive(Debug, Clone)]
pub struct BeatMapArchive {
    root: PathBuf,
}

impl BeatMapArchive {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn archive_path(&self, hash: &str) -> PathBuf {
        self.root.join(format!("{}.bm", hash))
    }

    /// Compresses and writes a beat map. Returns its hash.
    pub fn save_archive(&self, map: &BeatMap) -> Result<String> {
        fs::create_dir_all(&self.root)?;

        let hash = beat_map_hash(map)?;
        let path = self.archive_path(&hash);

        let binary = bincode::serde::encode_to_vec(map, bincode::config::standard())?;
        let compressed = encode_all(&binary[..], COMPRESSION_LEVEL)?;

        let mut file = File::create(&path)?;
        file.write_all(&compressed)?;

        log::info!(
            "STORAGE: Archived {} notes to {:?} ({} bytes)",
            map.len(),
            path,
            compressed.len()
        );
        Ok(hash)
    }

    pub fn load_archive(&self, hash: &str) -> Result<BeatMap> {
        let path = self.archive_path(hash);
        if !path.exists() {
            return Err(EngineError::AssetNotFound(path));
        }
        load_archive_from_path(&path)
    }

    pub fn delete_archive(&self, hash: &str) -> Result<()> {
        let path = self.archive_path(hash);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    pub fn archive_exists(&self, hash: &str) -> bool {
        self.archive_path(hash).exists()
    }
}

impl Default for BeatMapArchive {
    fn default() -> Self {
        Self::new(ARCHIVE_DIR)
    }
}

/// Reads an archive from an explicit path.
pub fn load_archive_from_path(path: &Path) -> Result<BeatMap> {
    let file = File::open(path)?;
    let binary = decode_all(file)?;
    let (map, _len): (BeatMap, usize) =
        bincode::serde::decode_from_slice(&binary, bincode::config::standard())?;
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::engine::Note;
    use tempfile::tempdir;

    fn sample() -> BeatMap {
        BeatMap::new(vec![
            Note::new("a", 0, 8.4, 10.0),
            Note::new("j", 5, 9.0, 10.6),
        ])
    }

    #[test]
    fn save_load_delete() {
        let dir = tempdir().unwrap();
        let archive = BeatMapArchive::new(dir.path());
        let map = sample();

        let hash = archive.save_archive(&map).unwrap();
        assert!(archive.archive_exists(&hash));

        // Lane indices are runtime state and are not archived.
        let loaded = archive.load_archive(&hash).unwrap();
        assert_eq!(loaded.to_json().unwrap(), map.to_json().unwrap());
        assert_eq!(beat_map_hash(&loaded).unwrap(), hash);

        archive.delete_archive(&hash).unwrap();
        assert!(!archive.archive_exists(&hash));
    }

    #[test]
    fn hash_tracks_content() {
        let a = beat_map_hash(&sample()).unwrap();
        assert_eq!(a, beat_map_hash(&sample()).unwrap());

        let mut other = sample();
        other.notes[0].target_time = 11.0;
        assert_ne!(a, beat_map_hash(&other).unwrap());
    }

    #[test]
    fn missing_archive_is_not_found() {
        let dir = tempdir().unwrap();
        let archive = BeatMapArchive::new(dir.path());
        assert!(matches!(
            archive.load_archive("deadbeef"),
            Err(EngineError::AssetNotFound(_))
        ));
    }
}
