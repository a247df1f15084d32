//! Bot input that hits every note dead on the baseline.
//!
//! Autoplay watches the note store after each tick and presses a lane when
//! its next note will be judged inside the top tier on the following tick.
//! Presses are released one tick later so consecutive notes in the same lane
//! each get a fresh press.

use crate::input::bindings::KeyMap;
use crate::input::events::EngineEvent;
use crate::models::engine::constants::NUM_LANES;
use crate::models::engine::{NoteStore, Playfield, TierTable};

pub struct Autoplay {
    keys: KeyMap,
    tiers: TierTable,
    held: [bool; NUM_LANES],
    presses: usize,
}

impl Autoplay {
    pub fn new(keys: KeyMap) -> Self {
        Self {
            keys,
            tiers: TierTable::new(),
            held: [false; NUM_LANES],
            presses: 0,
        }
    }

    /// Events to deliver before the next tick.
    ///
    /// `unit` is the fall unit of the tick that just ran. Releases come first
    /// so a lane can be pressed again in the same batch.
    pub fn plan(
        &mut self,
        store: &NoteStore,
        field: &Playfield,
        audio_time: f64,
        unit: f64,
        now: f64,
    ) -> Vec<EngineEvent> {
        let mut events = Vec::new();

        for lane in 0..NUM_LANES {
            if self.held[lane] {
                self.held[lane] = false;
                if let Some(symbol) = self.keys.symbol(lane) {
                    events.push(EngineEvent::key_up(symbol, now));
                }
            }
        }

        if unit <= 0.0 {
            return events;
        }

        let reach = self.tiers.perfect_units * unit;
        let baseline = field.baseline();
        let mut due = [false; NUM_LANES];

        let active = store.active_range(audio_time);
        for (index, note) in store.notes_in_window(baseline, reach) {
            if active.contains(&index) {
                due[note.lane_index] = true;
            }
        }

        for (lane, &press) in due.iter().enumerate() {
            if !press {
                continue;
            }
            if let Some(symbol) = self.keys.symbol(lane) {
                events.push(EngineEvent::key_down(symbol, now));
                self.held[lane] = true;
                self.presses += 1;
            }
        }

        events
    }

    /// Presses issued so far.
    pub fn presses(&self) -> usize {
        self.presses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::engine::{BeatMap, Note};

    fn field() -> Playfield {
        Playfield {
            width: 1000.0,
            height: 600.0,
            spacing: 100.0,
            offset: 66.0,
            radius: 20.0,
        }
    }

    fn store() -> NoteStore {
        let notes = vec![Note::new("k", 0, 0.0, 1.6), Note::new("k", 0, 0.0, 1.6)];
        NoteStore::load(BeatMap::new(notes), 100.0).unwrap()
    }

    #[test]
    fn presses_when_note_reaches_baseline() {
        let mut bot = Autoplay::new(KeyMap::default());
        let mut store = store();

        store.notes_mut()[0].y = 480.0;
        assert!(bot.plan(&store, &field(), 1.0, 4.0, 0.0).is_empty());

        store.notes_mut()[0].y = 497.0;
        let events = bot.plan(&store, &field(), 1.0, 4.0, 0.0);
        assert_eq!(events, vec![EngineEvent::key_down("k", 0.0)]);

        // Released on the next plan.
        store.notes_mut()[0].y = 200.0;
        let events = bot.plan(&store, &field(), 1.0, 4.0, 0.1);
        assert_eq!(events, vec![EngineEvent::key_up("k", 0.1)]);
        assert_eq!(bot.presses(), 1);
    }

    #[test]
    fn stacked_notes_press_once_per_tick() {
        let mut bot = Autoplay::new(KeyMap::default());
        let mut store = store();
        store.notes_mut()[0].y = 500.0;
        store.notes_mut()[1].y = 501.0;

        let events = bot.plan(&store, &field(), 1.0, 4.0, 0.0);
        assert_eq!(events.len(), 1);
    }
}
