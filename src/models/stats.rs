//! Accuracy tiers and hit statistics.
//!
//! A judged note receives one of five tiers. Notes that fall through the
//! judging window untouched are counted separately as skips and never score.

use serde::{Deserialize, Serialize};

/// Accuracy tier from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    Miss = 1,
    Poor = 2,
    Ok = 3,
    Great = 4,
    Perfect = 5,
}

impl Tier {
    /// All tiers, best first.
    pub const ALL: [Tier; 5] = [Tier::Perfect, Tier::Great, Tier::Ok, Tier::Poor, Tier::Miss];

    /// Points added to the total (and the value stored on the note).
    pub fn points(self) -> u8 {
        self as u8
    }

    /// Inverse of [`Tier::points`].
    pub fn from_points(points: u8) -> Option<Self> {
        match points {
            1 => Some(Tier::Miss),
            2 => Some(Tier::Poor),
            3 => Some(Tier::Ok),
            4 => Some(Tier::Great),
            5 => Some(Tier::Perfect),
            _ => None,
        }
    }
}

/// Accumulated statistics for one round.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HitStats {
    pub perfect: u32,
    pub great: u32,
    pub ok: u32,
    pub poor: u32,
    pub miss: u32,
    /// Notes that left the playfield without ever being judged.
    pub skipped: u32,
}

impl HitStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, tier: Tier) {
        match tier {
            Tier::Perfect => self.perfect += 1,
            Tier::Great => self.great += 1,
            Tier::Ok => self.ok += 1,
            Tier::Poor => self.poor += 1,
            Tier::Miss => self.miss += 1,
        }
    }

    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    pub fn judged(&self) -> u32 {
        self.perfect + self.great + self.ok + self.poor + self.miss
    }

    /// Accuracy percentage (0-100).
    ///
    /// Every tier is worth its points out of a maximum of five; skipped notes
    /// count as zero.
    pub fn calculate_accuracy(&self) -> f64 {
        let total = (self.judged() + self.skipped) as f64;
        if total == 0.0 {
            return 0.0;
        }

        let points = self.perfect as f64 * 5.0
            + self.great as f64 * 4.0
            + self.ok as f64 * 3.0
            + self.poor as f64 * 2.0
            + self.miss as f64;

        (points / (total * 5.0)) * 100.0
    }
}
