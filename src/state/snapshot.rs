//! Read-only views of a session for the presentation layer.

use super::session::{Mode, Phase};
use crate::models::stats::HitStats;

/// Immutable capture of session state after a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub mode: Mode,
    /// Countdown digits, or the final score after a stop.
    pub message: String,
    /// Label of the most recent judgement until it is cleared.
    pub hit_label: Option<String>,
    pub total_score: u32,
    pub hit_stats: HitStats,
    pub accuracy: f64,
    /// Judging cursor position.
    pub cursor: usize,
    pub note_count: usize,
    /// Per-lane held state.
    pub lanes_held: Vec<bool>,
    pub audio_time: f64,
    /// Fall unit used on the last running tick.
    pub unit: f64,
    /// Notes captured so far in capture mode.
    pub captured_notes: usize,
}
