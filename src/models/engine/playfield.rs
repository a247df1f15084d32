//! Playfield geometry derived from the screen size.

use super::constants::{
    BASELINE_OFFSET, FIELD_SCALE, NOTE_RADIUS_SHRINK, OFFSET_SCALE, RADIUS_SCALE, SPACING_SCALE,
};

/// Logical playfield dimensions and lane layout.
///
/// All judging math uses these logical coordinates. Lane `i` sits at
/// `i * spacing` from the left margin and the judging baseline is a fixed
/// distance above the bottom edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Playfield {
    pub width: f64,
    pub height: f64,
    /// Horizontal distance between adjacent lanes.
    pub spacing: f64,
    /// Left margin added to every lane position when drawing.
    pub offset: f64,
    /// Receptor radius.
    pub radius: f64,
}

impl Playfield {
    /// Lays the field out for a screen, scaled the way the canvas is.
    pub fn from_screen(screen_width: f64, screen_height: f64) -> Self {
        let spacing = screen_width / SPACING_SCALE;
        Self {
            width: screen_width * FIELD_SCALE,
            height: screen_height * FIELD_SCALE,
            spacing,
            offset: spacing / OFFSET_SCALE,
            radius: screen_width / RADIUS_SCALE,
        }
    }

    /// Vertical position of the judging line.
    pub fn baseline(&self) -> f64 {
        self.height - BASELINE_OFFSET
    }

    /// Fall distance per reference frame: the baseline is reached in 100 steps.
    pub fn base_unit(&self) -> f64 {
        ((self.height - BASELINE_OFFSET) / BASELINE_OFFSET).max(0.0)
    }

    pub fn note_radius(&self) -> f64 {
        (self.radius - NOTE_RADIUS_SHRINK).max(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_follows_screen_width() {
        let field = Playfield::from_screen(1200.0, 1000.0);
        assert_eq!(field.spacing, 100.0);
        assert!((field.offset - 100.0 / 1.5).abs() < 1e-9);
        assert_eq!(field.radius, 24.0);
        assert_eq!(field.width, 960.0);
        assert_eq!(field.height, 800.0);
    }

    #[test]
    fn baseline_and_unit_come_from_height() {
        let field = Playfield::from_screen(1200.0, 1000.0);
        assert_eq!(field.baseline(), 700.0);
        assert_eq!(field.base_unit(), 7.0);
    }
}
