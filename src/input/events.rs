//! Events queued between the outside world and the simulation tick.

/// Anything that can happen between two ticks.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A key went down. `at` is wall-clock seconds.
    KeyDown { symbol: String, at: f64 },
    /// A key went up.
    KeyUp { symbol: String, at: f64 },
    /// Playback reached the end of the track.
    TrackEnded,
    /// The user asked to stop the round.
    StopRequested,
}

impl EngineEvent {
    pub fn key_down(symbol: impl Into<String>, at: f64) -> Self {
        Self::KeyDown {
            symbol: symbol.into(),
            at,
        }
    }

    pub fn key_up(symbol: impl Into<String>, at: f64) -> Self {
        Self::KeyUp {
            symbol: symbol.into(),
            at,
        }
    }
}
