//! Beat-map capture from live play.

use crate::models::engine::constants::LEAD_TIME_S;
use crate::models::engine::{BeatMap, Note};

/// Builds notes from fresh lane presses while the track plays.
///
/// Every press becomes a note whose target is the press time and whose spawn
/// is one lead time earlier, so replaying the result drops each note onto the
/// baseline at the moment it was originally hit.
#[derive(Debug, Clone, Default)]
pub struct CaptureRecorder {
    buffer: Vec<Note>,
}

impl CaptureRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a note for a press on `lane` at `audio_time`.
    pub fn record(&mut self, lane: usize, symbol: &str, x: f64, audio_time: f64) -> &Note {
        let mut note = Note::new(symbol, lane, audio_time - LEAD_TIME_S, audio_time);
        note.x = x;
        self.buffer.push(note);
        &self.buffer[self.buffer.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn notes(&self) -> &[Note] {
        &self.buffer
    }

    /// Hands the captured notes over as a beat map and empties the buffer.
    pub fn finish(&mut self) -> BeatMap {
        BeatMap::new(std::mem::take(&mut self.buffer))
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
