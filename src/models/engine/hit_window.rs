//! Distance-based judging thresholds.
//!
//! Judging compares a note's vertical position against the baseline. Every
//! threshold is a multiple of the current fall unit, so the window scales with
//! the playfield and the frame step.

use super::constants::JUDGE_WINDOW_UNITS;
use crate::models::stats::Tier;

/// Tier thresholds and display labels.
#[derive(Debug, Clone, PartialEq)]
pub struct TierTable {
    pub perfect_units: f64,
    pub great_units: f64,
    pub ok_units: f64,
    pub poor_units: f64,
    /// Anything beyond `poor_units` but inside this radius is a Miss.
    pub window_units: f64,
    labels: [String; 5],
}

impl TierTable {
    /// The stock table: {1, 5, 10, 15} units inside a 20 unit window.
    pub fn new() -> Self {
        Self {
            perfect_units: 1.0,
            great_units: 5.0,
            ok_units: 10.0,
            poor_units: 15.0,
            window_units: JUDGE_WINDOW_UNITS,
            labels: [
                "Miss".to_string(),
                "Poor".to_string(),
                "Ok".to_string(),
                "Great".to_string(),
                "Perfect".to_string(),
            ],
        }
    }

    pub fn label(&self, tier: Tier) -> &str {
        &self.labels[tier.points() as usize - 1]
    }

    /// Half-height of the judging window for a given unit.
    pub fn window_radius(&self, unit: f64) -> f64 {
        self.window_units * unit
    }

    /// Classifies a signed distance `d = y - baseline`.
    ///
    /// Returns `None` when the note is outside the judging window.
    pub fn judge(&self, distance: f64, unit: f64) -> Option<Tier> {
        let abs = distance.abs();

        if abs > self.window_radius(unit) {
            return None;
        }

        let tier = if abs <= self.perfect_units * unit {
            Tier::Perfect
        } else if abs <= self.great_units * unit {
            Tier::Great
        } else if abs <= self.ok_units * unit {
            Tier::Ok
        } else if abs <= self.poor_units * unit {
            Tier::Poor
        } else {
            Tier::Miss
        };
        Some(tier)
    }
}

impl Default for TierTable {
    fn default() -> Self {
        Self::new()
    }
}
