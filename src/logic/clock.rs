//! Time sources and the per-tick timeline clock.

use super::audio::AudioTransport;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Abstraction over wall-clock time.
/// Implementations: SystemTimeProvider (production), ManualTime (testing).
pub trait TimeProvider {
    /// Seconds since an arbitrary epoch.
    fn now(&self) -> f64;
}

/// Wall-clock time from `std::time::Instant`.
#[derive(Debug, Clone)]
pub struct SystemTimeProvider {
    start: Instant,
}

impl SystemTimeProvider {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemTimeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeProvider for SystemTimeProvider {
    fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Manually advanced time for deterministic runs. Clones share one clock.
#[derive(Debug, Clone, Default)]
pub struct ManualTime {
    bits: Arc<AtomicU64>,
}

impl ManualTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, seconds: f64) {
        self.bits.store(seconds.to_bits(), Ordering::Relaxed);
    }

    pub fn advance(&self, seconds: f64) {
        self.set(self.now() + seconds);
    }
}

impl TimeProvider for ManualTime {
    fn now(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

/// What one tick sees of time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Wall-clock seconds at the start of the tick.
    pub now: f64,
    /// Wall-clock seconds since the previous tick (0 on the first one).
    pub frame_delta: f64,
    /// Playback position; authoritative for note timing.
    pub audio_time: f64,
    /// Whether playback is currently advancing.
    pub playing: bool,
}

/// Reads the transport position and measures frame deltas. Never blocks.
#[derive(Debug, Clone)]
pub struct TimelineClock<P: TimeProvider> {
    time: P,
    prev: Option<f64>,
}

impl<P: TimeProvider> TimelineClock<P> {
    pub fn new(time: P) -> Self {
        Self { time, prev: None }
    }

    /// Forgets the previous frame so the next delta starts from zero.
    pub fn reset(&mut self) {
        self.prev = None;
    }

    pub fn now(&self) -> f64 {
        self.time.now()
    }

    pub fn tick(&mut self, transport: &dyn AudioTransport) -> Tick {
        let now = self.time.now();
        let frame_delta = self.prev.map_or(0.0, |prev| (now - prev).max(0.0));
        self.prev = Some(now);

        Tick {
            now,
            frame_delta,
            audio_time: transport.position(),
            playing: transport.is_playing(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::audio::SimulatedTransport;

    #[test]
    fn manual_time_is_shared_between_clones() {
        let time = ManualTime::new();
        let other = time.clone();
        time.advance(1.5);
        assert_eq!(other.now(), 1.5);
    }

    #[test]
    fn frame_delta_measures_wall_time() {
        let time = ManualTime::new();
        let transport = SimulatedTransport::new(time.clone(), 10.0);
        let mut clock = TimelineClock::new(time.clone());

        let first = clock.tick(&transport);
        assert_eq!(first.frame_delta, 0.0);

        time.advance(0.25);
        let second = clock.tick(&transport);
        assert_eq!(second.frame_delta, 0.25);
        assert_eq!(second.now, 0.25);
    }

    #[test]
    fn audio_time_comes_from_transport() {
        let time = ManualTime::new();
        let mut transport = SimulatedTransport::new(time.clone(), 10.0);
        let mut clock = TimelineClock::new(time.clone());

        transport.play();
        time.advance(2.0);
        let tick = clock.tick(&transport);
        assert_eq!(tick.audio_time, 2.0);
        assert!(tick.playing);
    }

    #[test]
    fn system_time_is_monotonic() {
        let time = SystemTimeProvider::new();
        let a = time.now();
        let b = time.now();
        assert!(b >= a);
    }
}
