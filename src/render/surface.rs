//! Draw-primitive contract consumed by the presentation layer.

/// RGBA color.
pub type Color = [f32; 4];

pub mod colors {
    use super::Color;

    pub const PINK: Color = [1.0, 0.41, 0.71, 1.0];
}

/// Something the core can draw circles on. Write-only.
pub trait DrawSurface {
    fn clear(&mut self, width: f64, height: f64);

    fn draw_circle(
        &mut self,
        x: f64,
        y: f64,
        radius: f64,
        color: Color,
        filled: bool,
        label: Option<&str>,
    );
}

/// A recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear {
        width: f64,
        height: f64,
    },
    Circle {
        x: f64,
        y: f64,
        radius: f64,
        color: Color,
        filled: bool,
        label: Option<String>,
    },
}

/// Surface that stores every call, for headless runs and tests.
#[derive(Debug, Clone, Default)]
pub struct CommandRecorder {
    pub commands: Vec<DrawCommand>,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls since the most recent clear.
    pub fn last_frame(&self) -> &[DrawCommand] {
        let start = self
            .commands
            .iter()
            .rposition(|c| matches!(c, DrawCommand::Clear { .. }))
            .unwrap_or(0);
        &self.commands[start..]
    }

    pub fn circles(&self) -> impl Iterator<Item = &DrawCommand> {
        self.last_frame()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
    }
}

impl DrawSurface for CommandRecorder {
    fn clear(&mut self, width: f64, height: f64) {
        // Keep only one frame around; headless runs would otherwise grow forever.
        self.commands.clear();
        self.commands.push(DrawCommand::Clear { width, height });
    }

    fn draw_circle(
        &mut self,
        x: f64,
        y: f64,
        radius: f64,
        color: Color,
        filled: bool,
        label: Option<&str>,
    ) {
        self.commands.push(DrawCommand::Circle {
            x,
            y,
            radius,
            color,
            filled,
            label: label.map(str::to_string),
        });
    }
}
