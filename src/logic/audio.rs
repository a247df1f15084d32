//! Playback transport seen by the simulation.
//!
//! The engine never owns audio output. It reads the transport position every
//! tick and issues play/pause/rewind on round boundaries.

use super::clock::TimeProvider;

/// Minimal control surface of an audio player.
pub trait AudioTransport {
    /// Current playback position in seconds.
    fn position(&self) -> f64;
    fn is_playing(&self) -> bool;
    /// True once playback has run to the end of the track.
    fn has_ended(&self) -> bool;
    fn play(&mut self);
    fn pause(&mut self);
    /// Moves the position back to zero.
    fn rewind(&mut self);
    /// Track length in seconds.
    fn duration(&self) -> f64;
}

/// Wall-clock driven stand-in for an audio device.
#[derive(Debug, Clone)]
pub struct SimulatedTransport<P: TimeProvider> {
    time: P,
    duration: f64,
    /// Position when playback was last paused or rewound.
    paused_at: f64,
    /// Wall time at which playback last resumed.
    resumed_at: Option<f64>,
}

impl<P: TimeProvider> SimulatedTransport<P> {
    pub fn new(time: P, duration: f64) -> Self {
        Self {
            time,
            duration: duration.max(0.0),
            paused_at: 0.0,
            resumed_at: None,
        }
    }

    fn raw_position(&self) -> f64 {
        match self.resumed_at {
            Some(start) => self.paused_at + (self.time.now() - start).max(0.0),
            None => self.paused_at,
        }
    }
}

impl<P: TimeProvider> AudioTransport for SimulatedTransport<P> {
    fn position(&self) -> f64 {
        self.raw_position().min(self.duration)
    }

    fn is_playing(&self) -> bool {
        self.resumed_at.is_some() && self.raw_position() < self.duration
    }

    fn has_ended(&self) -> bool {
        self.resumed_at.is_some() && self.raw_position() >= self.duration
    }

    fn play(&mut self) {
        if self.resumed_at.is_none() {
            self.resumed_at = Some(self.time.now());
        }
    }

    fn pause(&mut self) {
        self.paused_at = self.position();
        self.resumed_at = None;
    }

    fn rewind(&mut self) {
        self.paused_at = 0.0;
        if self.resumed_at.is_some() {
            self.resumed_at = Some(self.time.now());
        }
    }

    fn duration(&self) -> f64 {
        self.duration
    }
}
