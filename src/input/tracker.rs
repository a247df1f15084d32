//! Per-lane held state fed by key events.

use super::bindings::KeyMap;
use crate::logic::scheduler::DeferredTimers;
use crate::models::engine::constants::LABEL_CLEAR_DELAY_S;

/// Runtime state of one lane.
#[derive(Debug, Clone, PartialEq)]
pub struct LaneState {
    /// Symbols bound to this lane, primary first.
    pub symbols: Vec<String>,
    /// Horizontal offset relative to the left margin.
    pub x: f64,
    /// Wall-clock seconds of the last fresh press.
    pub held_since: f64,
    /// Audio time of the last fresh press.
    pub held_at_track_time: f64,
    pub held: bool,
}

impl LaneState {
    fn new(symbol: &str) -> Self {
        Self {
            symbols: vec![symbol.to_string()],
            x: 0.0,
            held_since: 0.0,
            held_at_track_time: 0.0,
            held: false,
        }
    }
}

/// Tracks which lanes are held and when they were pressed.
///
/// Only the simulation tick mutates this; input callbacks go through the
/// event bus.
#[derive(Debug, Clone)]
pub struct LaneInputTracker {
    keys: KeyMap,
    lanes: Vec<LaneState>,
    label_clears: DeferredTimers,
}

impl LaneInputTracker {
    pub fn new(keys: KeyMap) -> Self {
        let lanes = keys.symbols().iter().map(|s| LaneState::new(s)).collect();
        Self {
            keys,
            lanes,
            label_clears: DeferredTimers::new(),
        }
    }

    /// Recomputes lane positions for a new spacing.
    pub fn layout(&mut self, spacing: f64) {
        for (i, lane) in self.lanes.iter_mut().enumerate() {
            lane.x = i as f64 * spacing;
        }
    }

    /// Handles a key press.
    ///
    /// Returns the lane index for a fresh press. Unknown symbols and repeats
    /// on an already held lane return `None` and change nothing.
    pub fn on_down(&mut self, symbol: &str, now: f64, audio_time: f64) -> Option<usize> {
        let Some(lane) = self.keys.lane_of(symbol) else {
            log::trace!("INPUT: Ignoring unbound symbol {:?}", symbol);
            return None;
        };
        let state = &mut self.lanes[lane];
        if state.held {
            return None;
        }

        state.held = true;
        state.held_since = now;
        state.held_at_track_time = audio_time;
        Some(lane)
    }

    /// Handles a key release and schedules the hit label to clear.
    pub fn on_up(&mut self, symbol: &str, now: f64) -> Option<usize> {
        let lane = self.keys.lane_of(symbol)?;
        self.lanes[lane].held = false;
        self.label_clears.schedule(now + LABEL_CLEAR_DELAY_S);
        Some(lane)
    }

    /// Fires due label clears. Returns `true` if at least one fired.
    pub fn take_due_label_clear(&mut self, now: f64) -> bool {
        self.label_clears.fire_due(now) > 0
    }

    pub fn pending_label_clears(&self) -> usize {
        self.label_clears.pending()
    }

    /// Releases every lane, zeroes timestamps and drops pending timers.
    pub fn reset(&mut self) {
        for lane in &mut self.lanes {
            lane.held = false;
            lane.held_since = 0.0;
            lane.held_at_track_time = 0.0;
        }
        self.label_clears.cancel_all();
    }

    pub fn is_held(&self, lane: usize) -> bool {
        self.lanes.get(lane).is_some_and(|l| l.held)
    }

    pub fn held_mask(&self) -> Vec<bool> {
        self.lanes.iter().map(|l| l.held).collect()
    }

    pub fn lanes(&self) -> &[LaneState] {
        &self.lanes
    }

    pub fn keys(&self) -> &KeyMap {
        &self.keys
    }
}
