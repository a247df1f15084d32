//! Per-tick drawing of receptors and falling notes.

use super::surface::{DrawSurface, colors};
use crate::input::tracker::LaneInputTracker;
use crate::models::engine::constants::RECEPTOR_FLASH_S;
use crate::models::engine::{NoteStore, Playfield};

/// Text shown inside a receptor for its key symbol.
pub fn receptor_label(symbol: &str) -> &str {
    if symbol == " " { "'  '" } else { symbol }
}

/// Draws one outlined receptor per lane, filled while held or just pressed.
pub fn draw_receptors(
    surface: &mut dyn DrawSurface,
    field: &Playfield,
    lanes: &LaneInputTracker,
    now: f64,
) {
    let y = field.baseline();
    for lane in lanes.lanes() {
        let x = lane.x + field.offset;
        let flashing = lane.held_since > 0.0 && now - lane.held_since < RECEPTOR_FLASH_S;
        if lane.held || flashing {
            surface.draw_circle(x, y, field.radius, colors::PINK, true, None);
        }
        let label = lane.symbols.first().map(|s| receptor_label(s));
        surface.draw_circle(x, y, field.radius, colors::PINK, false, label);
    }
}

/// Draws every spawned, unjudged note still on the field.
pub fn draw_notes(
    surface: &mut dyn DrawSurface,
    field: &Playfield,
    store: &NoteStore,
    audio_time: f64,
) {
    let radius = field.note_radius();
    for index in store.active_range(audio_time) {
        let note = &store.notes()[index];
        if note.is_judged() || note.y > field.height {
            continue;
        }
        surface.draw_circle(note.x + field.offset, note.y, radius, colors::PINK, false, None);
    }
}
