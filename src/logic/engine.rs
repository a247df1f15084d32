//! Collision and scoring for replay mode.
//!
//! Each step moves active notes down by one fall unit and judges, for every
//! held lane, the earliest unjudged note inside the judging window. A note
//! that drops out of the window untouched is never scored; it is simply
//! passed by the cursor once it leaves the field.

use crate::input::tracker::LaneInputTracker;
use crate::models::engine::constants::{
    MAX_FRAME_SCALE, MIN_FRAME_SCALE, NUM_LANES, REFERENCE_FRAME_S,
};
use crate::models::engine::{NoteStore, Playfield, TierTable};
use crate::models::settings::FallMode;
use crate::models::stats::Tier;

/// One locked-in judgement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Judgement {
    pub note_index: usize,
    pub lane: usize,
    pub tier: Tier,
    /// Signed distance from the baseline at judging time.
    pub distance: f64,
}

/// Result of one engine step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepOutcome {
    pub judgements: Vec<Judgement>,
    /// Notes passed by the cursor without a judgement.
    pub skipped: usize,
}

impl StepOutcome {
    pub fn points(&self) -> u32 {
        self.judgements.iter().map(|j| j.tier.points() as u32).sum()
    }
}

/// Per-tick fall displacement.
pub fn fall_unit(base_unit: f64, frame_delta: f64, mode: FallMode) -> f64 {
    match mode {
        FallMode::Fixed => base_unit,
        FallMode::FrameScaled => {
            let scale = (frame_delta / REFERENCE_FRAME_S).clamp(MIN_FRAME_SCALE, MAX_FRAME_SCALE);
            base_unit * scale
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    tiers: TierTable,
}

impl ScoringEngine {
    pub fn new(tiers: TierTable) -> Self {
        Self { tiers }
    }

    pub fn tiers(&self) -> &TierTable {
        &self.tiers
    }

    /// Runs one simulation step over the active notes.
    pub fn step(
        &self,
        store: &mut NoteStore,
        lanes: &LaneInputTracker,
        audio_time: f64,
        field: &Playfield,
        unit: f64,
    ) -> StepOutcome {
        let mut outcome = StepOutcome {
            skipped: store.advance_cursor(field.height),
            ..StepOutcome::default()
        };

        let baseline = field.baseline();
        let range = store.active_range(audio_time);
        let mut lane_done = [false; NUM_LANES];
        let notes = store.notes_mut();

        for index in range {
            let note = &mut notes[index];
            if note.is_judged() || note.y > field.height {
                continue;
            }

            let lane = note.lane_index;
            if lanes.is_held(lane) && !lane_done[lane] {
                let distance = note.y - baseline;
                if let Some(tier) = self.tiers.judge(distance, unit) {
                    note.lock(tier);
                    lane_done[lane] = true;
                    log::debug!(
                        "ENGINE: Lane {} judged {:?} at d={:.2} (unit {:.2})",
                        lane,
                        tier,
                        distance,
                        unit
                    );
                    outcome.judgements.push(Judgement {
                        note_index: index,
                        lane,
                        tier,
                        distance,
                    });
                    continue;
                }
            }

            note.y += unit;
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::bindings::KeyMap;
    use crate::models::engine::{BeatMap, Note};
    use proptest::prelude::*;

    /// A field whose baseline sits at 500.
    fn field() -> Playfield {
        Playfield {
            width: 1000.0,
            height: 600.0,
            spacing: 100.0,
            offset: 66.0,
            radius: 20.0,
        }
    }

    fn store_with(lanes: &[&str]) -> NoteStore {
        let notes = lanes.iter().map(|l| Note::new(l, 0, 0.0, 1.6)).collect();
        NoteStore::load(BeatMap::new(notes), 100.0).unwrap()
    }

    fn pressed(symbols: &[&str]) -> LaneInputTracker {
        let mut tracker = LaneInputTracker::new(KeyMap::default());
        for s in symbols {
            tracker.on_down(s, 0.0, 0.0);
        }
        tracker
    }

    #[test]
    fn near_baseline_is_perfect() {
        let engine = ScoringEngine::default();
        let mut store = store_with(&["a"]);
        store.notes_mut()[0].y = 498.0;

        let outcome = engine.step(&mut store, &pressed(&["a"]), 1.0, &field(), 4.0);

        assert_eq!(outcome.judgements.len(), 1);
        assert_eq!(outcome.judgements[0].tier, Tier::Perfect);
        assert_eq!(outcome.points(), 5);
        assert_eq!(engine.tiers().label(Tier::Perfect), "Perfect");
        assert_eq!(store.notes()[0].score, 5);
    }

    #[test]
    fn twenty_above_with_unit_four_is_great() {
        let engine = ScoringEngine::default();
        let mut store = store_with(&["a"]);
        store.notes_mut()[0].y = 480.0;

        let outcome = engine.step(&mut store, &pressed(&["a"]), 1.0, &field(), 4.0);

        assert_eq!(outcome.judgements[0].tier, Tier::Great);
        assert_eq!(outcome.points(), 4);
    }

    #[test]
    fn outside_window_is_left_alone_then_skipped() {
        let engine = ScoringEngine::default();
        let mut store = store_with(&["a"]);
        store.notes_mut()[0].y = 400.0;
        let held = pressed(&["a"]);

        let outcome = engine.step(&mut store, &held, 1.0, &field(), 4.0);
        assert!(outcome.judgements.is_empty());
        assert_eq!(store.notes()[0].score, 0);
        assert_eq!(store.notes()[0].y, 404.0);

        // Released: the note falls through the window and off the field.
        let released = pressed(&[]);
        let mut skipped = 0;
        for _ in 0..100 {
            skipped += engine.step(&mut store, &released, 1.0, &field(), 4.0).skipped;
        }
        assert_eq!(skipped, 1);
        assert_eq!(store.notes()[0].score, 0);
        assert!(store.is_exhausted());
    }

    #[test]
    fn held_without_note_does_nothing() {
        let engine = ScoringEngine::default();
        let mut store = store_with(&["s"]);
        store.notes_mut()[0].y = 498.0;

        let outcome = engine.step(&mut store, &pressed(&["a"]), 1.0, &field(), 4.0);
        assert!(outcome.judgements.is_empty());
        assert_eq!(store.notes()[0].y, 502.0);
    }

    #[test]
    fn only_earliest_note_per_lane_is_judged() {
        let engine = ScoringEngine::default();
        let mut store = store_with(&["a", "a"]);
        store.notes_mut()[0].y = 495.0;
        store.notes_mut()[1].y = 470.0;

        let outcome = engine.step(&mut store, &pressed(&["a"]), 1.0, &field(), 4.0);
        assert_eq!(outcome.judgements.len(), 1);
        assert_eq!(outcome.judgements[0].note_index, 0);
        assert_eq!(store.notes()[1].score, 0);
        assert_eq!(store.notes()[1].y, 474.0);
    }

    #[test]
    fn unspawned_notes_stay_put() {
        let engine = ScoringEngine::default();
        let notes = vec![Note::new("a", 0, 5.0, 6.6)];
        let mut store = NoteStore::load(BeatMap::new(notes), 100.0).unwrap();

        engine.step(&mut store, &pressed(&[]), 1.0, &field(), 4.0);
        assert_eq!(store.notes()[0].y, 0.0);
    }

    #[test]
    fn judged_notes_stay_frozen() {
        let engine = ScoringEngine::default();
        let mut store = store_with(&["a", "s"]);
        store.notes_mut()[0].y = 500.0;
        store.notes_mut()[1].y = 100.0;
        let held = pressed(&["a"]);

        engine.step(&mut store, &held, 1.0, &field(), 4.0);
        let y = store.notes()[0].y;
        engine.step(&mut store, &held, 1.0, &field(), 4.0);
        assert_eq!(store.notes()[0].y, y);
        assert_eq!(store.notes()[0].score, 5);
    }

    #[test]
    fn fall_unit_scales_with_frame_time() {
        assert_eq!(fall_unit(4.0, 0.5, FallMode::Fixed), 4.0);
        assert!((fall_unit(4.0, 1.0 / 30.0, FallMode::FrameScaled) - 8.0).abs() < 1e-9);
        assert_eq!(fall_unit(4.0, 0.0, FallMode::FrameScaled), 1.0);
        assert_eq!(fall_unit(4.0, 10.0, FallMode::FrameScaled), 16.0);
    }

    proptest! {
        #[test]
        fn scores_are_write_once_and_cursor_monotonic(
            starts in proptest::collection::vec(0.0f64..600.0, 1..12),
            presses in proptest::collection::vec(any::<bool>(), 40),
        ) {
            let engine = ScoringEngine::default();
            let symbols = ["a", "s", "d"];
            let notes = starts
                .iter()
                .enumerate()
                .map(|(i, _)| Note::new(symbols[i % 3], 0, 0.0, 1.6))
                .collect();
            let mut store =
                NoteStore::load(BeatMap::new(notes), 100.0).unwrap();
            for (note, y) in store.notes_mut().iter_mut().zip(&starts) {
                note.y = *y;
            }

            let mut locked: Vec<u8> = vec![0; store.len()];
            let mut last_cursor = 0;
            let mut tracker = LaneInputTracker::new(KeyMap::default());

            for (frame, press) in presses.iter().enumerate() {
                let symbol = symbols[frame % 3];
                if *press {
                    tracker.on_down(symbol, 0.0, 0.0);
                } else {
                    tracker.on_up(symbol, 0.0);
                }
                let before: Vec<f64> = store.notes().iter().map(|n| n.y).collect();
                engine.step(&mut store, &tracker, 1.0, &field(), 4.0);

                prop_assert!(store.cursor() >= last_cursor);
                last_cursor = store.cursor();

                for (i, note) in store.notes().iter().enumerate() {
                    if locked[i] != 0 {
                        prop_assert_eq!(note.score, locked[i]);
                    } else {
                        locked[i] = note.score;
                    }
                    if note.score == 0 {
                        prop_assert!(note.y >= before[i]);
                    }
                }
            }
        }
    }
}
