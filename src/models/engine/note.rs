//! Notes, beat maps and the per-round note store.

use crate::error::{EngineError, Result};
use crate::models::engine::constants::DEFAULT_LANE_SYMBOLS;
use crate::models::stats::Tier;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::Path;

/// A single scheduled note.
///
/// Serialized with the beat-map field names (`lane`, `score`, `x`, `y`,
/// `spawnTime`, `targetTime`). The short legacy keys (`c`, `s`, `t1`, `t2`)
/// are accepted when reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Key symbol of the lane this note falls in.
    #[serde(alias = "c")]
    pub lane: String,
    /// 0 while unjudged, then the locked tier value.
    #[serde(default, alias = "s")]
    pub score: u8,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    /// Audio time at which the note starts falling (seconds).
    #[serde(alias = "t1")]
    pub spawn_time: f64,
    /// Audio time at which the note should cross the baseline (seconds).
    #[serde(alias = "t2")]
    pub target_time: f64,
    /// Resolved lane index, filled in when the note enters a store.
    #[serde(skip)]
    pub lane_index: usize,
}

impl Note {
    pub fn new(lane: &str, lane_index: usize, spawn_time: f64, target_time: f64) -> Self {
        Self {
            lane: lane.to_string(),
            score: 0,
            x: 0.0,
            y: 0.0,
            spawn_time,
            target_time,
            lane_index,
        }
    }

    pub fn is_judged(&self) -> bool {
        self.score != 0
    }

    /// Stores a tier on an unjudged note. Returns `false` if already judged.
    pub fn lock(&mut self, tier: Tier) -> bool {
        if self.is_judged() {
            return false;
        }
        self.score = tier.points();
        true
    }

    /// Clears runtime state for a new round.
    pub fn reset(&mut self) {
        self.score = 0;
        self.y = 0.0;
    }
}

/// Lane index for a beat-map lane symbol, ignoring case.
///
/// Beat maps name lanes by the stock symbols whatever the player's keybinds
/// are, so maps stay playable after rebinding.
pub fn lane_index_of(symbol: &str) -> Option<usize> {
    let symbol = symbol.to_lowercase();
    DEFAULT_LANE_SYMBOLS.iter().position(|s| *s == symbol)
}

/// Beat-map symbol for a lane index.
pub fn lane_symbol(lane: usize) -> Option<&'static str> {
    DEFAULT_LANE_SYMBOLS.get(lane).copied()
}

/// An ordered note sequence, as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BeatMap {
    pub notes: Vec<Note>,
}

impl BeatMap {
    pub fn new(notes: Vec<Note>) -> Self {
        Self { notes }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(EngineError::AssetNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Time of the last target, used to size simulated playback.
    pub fn last_target_time(&self) -> f64 {
        self.notes
            .iter()
            .map(|n| n.target_time)
            .fold(0.0, f64::max)
    }
}

/// The notes of the current round plus the judging cursor.
///
/// Everything before `cursor` is finished: either judged or fallen past the
/// bottom of the field. The cursor only moves forward until the next reset.
#[derive(Debug, Clone, Default)]
pub struct NoteStore {
    notes: Vec<Note>,
    cursor: usize,
}

impl NoteStore {
    /// Validates a beat map and builds a store.
    ///
    /// Unknown lanes, non-finite times and targets before spawns are
    /// rejected. Out-of-order notes are re-sorted by (spawn, target). Runtime
    /// fields start from zero.
    pub fn load(beat_map: BeatMap, spacing: f64) -> Result<Self> {
        let mut notes = beat_map.notes;

        for (index, note) in notes.iter_mut().enumerate() {
            let Some(lane_index) = lane_index_of(&note.lane) else {
                return Err(EngineError::InvalidLane {
                    index,
                    lane: note.lane.clone(),
                });
            };
            if !note.spawn_time.is_finite() || !note.target_time.is_finite() {
                return Err(EngineError::InvalidTime { index });
            }
            if note.target_time < note.spawn_time {
                return Err(EngineError::TargetBeforeSpawn { index });
            }
            note.lane_index = lane_index;
            note.reset();
        }

        let order = |a: &Note, b: &Note| {
            a.spawn_time
                .total_cmp(&b.spawn_time)
                .then(a.target_time.total_cmp(&b.target_time))
        };
        let sorted = notes.windows(2).all(|pair| order(&pair[0], &pair[1]).is_le());
        if !sorted {
            log::warn!("ENGINE: Beat map out of order, sorting {} notes", notes.len());
            notes.sort_by(order);
        }

        let mut store = Self { notes, cursor: 0 };
        store.layout(spacing);
        Ok(store)
    }

    /// Recomputes every note's `x` from its lane.
    pub fn layout(&mut self, spacing: f64) {
        for note in &mut self.notes {
            note.x = note.lane_index as f64 * spacing;
        }
    }

    /// Clears scores and positions and rewinds the cursor.
    pub fn reset(&mut self) {
        self.cursor = 0;
        for note in &mut self.notes {
            note.reset();
        }
    }

    /// Moves the cursor past finished notes at the head of the sequence.
    ///
    /// Returns how many of them were never judged (silent skips).
    pub fn advance_cursor(&mut self, screen_height: f64) -> usize {
        let mut skipped = 0;
        while let Some(note) = self.notes.get(self.cursor) {
            if note.is_judged() {
                self.cursor += 1;
            } else if note.y > screen_height {
                skipped += 1;
                self.cursor += 1;
            } else {
                break;
            }
        }
        skipped
    }

    /// Unjudged notes at or after the cursor within `radius` of the baseline.
    pub fn notes_in_window(
        &self,
        baseline: f64,
        radius: f64,
    ) -> impl Iterator<Item = (usize, &Note)> + '_ {
        self.notes
            .iter()
            .enumerate()
            .skip(self.cursor)
            .filter(move |(_, n)| !n.is_judged() && (n.y - baseline).abs() <= radius)
    }

    /// Indices from the cursor whose spawn time has been reached.
    pub fn active_range(&self, audio_time: f64) -> Range<usize> {
        let start = self.cursor;
        let len = self.notes[start..]
            .iter()
            .take_while(|n| n.spawn_time <= audio_time)
            .count();
        start..start + len
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub(crate) fn notes_mut(&mut self) -> &mut [Note] {
        &mut self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// True once every note is behind the cursor.
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.notes.len()
    }
}
