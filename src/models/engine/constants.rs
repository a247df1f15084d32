//! Fixed gameplay constants shared by the engine, layout and session.

/// Number of playable lanes.
pub const NUM_LANES: usize = 9;

/// Default key symbol for each lane, left to right.
pub const DEFAULT_LANE_SYMBOLS: [&str; NUM_LANES] = ["a", "s", "d", "f", " ", "j", "k", "l", ";"];

/// Seconds between a note starting to fall and reaching the baseline.
pub const LEAD_TIME_S: f64 = 1.6;

/// Countdown steps (one per second) before playback starts.
pub const COUNTDOWN_STEPS: u32 = 3;

/// Half-height of the judging window, in fall units.
pub const JUDGE_WINDOW_UNITS: f64 = 20.0;

/// Delay before the transient hit label is cleared after a key release.
pub const LABEL_CLEAR_DELAY_S: f64 = 0.7;

/// Songs longer than this are refused.
pub const MAX_SONG_DURATION_S: f64 = 3600.0;

/// How long a receptor stays filled after a press.
pub const RECEPTOR_FLASH_S: f64 = 0.12;

/// Distance from the bottom of the field to the judging baseline.
pub const BASELINE_OFFSET: f64 = 100.0;

/// Fraction of the screen the playfield covers on each axis.
pub const FIELD_SCALE: f64 = 0.80;

/// Screen width divided by this gives the receptor radius.
pub const RADIUS_SCALE: f64 = 50.0;

/// Screen width divided by this gives the lane spacing.
pub const SPACING_SCALE: f64 = 12.0;

/// Lane spacing divided by this gives the left margin.
pub const OFFSET_SCALE: f64 = 1.5;

/// Falling notes are drawn this much smaller than receptors.
pub const NOTE_RADIUS_SHRINK: f64 = 4.0;

/// Frame duration the fall unit is calibrated against.
pub const REFERENCE_FRAME_S: f64 = 1.0 / 60.0;

/// Bounds applied to the frame-scaled fall factor.
pub const MIN_FRAME_SCALE: f64 = 0.25;
pub const MAX_FRAME_SCALE: f64 = 4.0;
