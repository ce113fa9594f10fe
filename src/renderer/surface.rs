//! Immediate-mode drawing surface
//!
//! The minimal set of primitives every effect needs. Browser canvases, the GPU
//! disc batcher and the headless recorder all implement it.

use glam::Vec2;

use crate::sim::Rgba;

pub trait DrawSurface {
    /// Surface size in CSS pixels
    fn size(&self) -> Vec2;

    /// Wipe the whole surface. `None` leaves it fully transparent.
    fn clear(&mut self, background: Option<Rgba>);

    fn fill_disc(&mut self, center: Vec2, radius: f32, color: Rgba);

    fn stroke_ring(&mut self, center: Vec2, radius: f32, width: f32, color: Rgba);

    fn stroke_polyline(&mut self, points: &[Vec2], width: f32, color: Rgba);

    /// Flush the frame (no-op for surfaces that draw eagerly)
    fn present(&mut self) {}

    /// Resize to a layout size in CSS pixels
    fn set_size(&mut self, _width: u32, _height: u32) {}
}

/// One recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Option<Rgba>),
    Disc {
        center: Vec2,
        radius: f32,
        color: Rgba,
    },
    Ring {
        center: Vec2,
        radius: f32,
        width: f32,
        color: Rgba,
    },
    Polyline {
        points: Vec<Vec2>,
        width: f32,
        color: Rgba,
    },
    Present,
}

/// Surface that records draw calls instead of rasterizing them
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    size: Vec2,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            commands: Vec::new(),
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.size = Vec2::new(width, height);
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drain the recorded commands
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Commands since the most recent clear
    pub fn last_frame(&self) -> &[DrawCommand] {
        let start = self
            .commands
            .iter()
            .rposition(|c| matches!(c, DrawCommand::Clear(_)))
            .unwrap_or(0);
        &self.commands[start..]
    }

    pub fn disc_count(&self) -> usize {
        self.last_frame()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Disc { .. }))
            .count()
    }
}

impl DrawSurface for RecordingSurface {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn clear(&mut self, background: Option<Rgba>) {
        self.commands.push(DrawCommand::Clear(background));
    }

    fn fill_disc(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.commands.push(DrawCommand::Disc {
            center,
            radius,
            color,
        });
    }

    fn stroke_ring(&mut self, center: Vec2, radius: f32, width: f32, color: Rgba) {
        self.commands.push(DrawCommand::Ring {
            center,
            radius,
            width,
            color,
        });
    }

    fn stroke_polyline(&mut self, points: &[Vec2], width: f32, color: Rgba) {
        self.commands.push(DrawCommand::Polyline {
            points: points.to_vec(),
            width,
            color,
        });
    }

    fn present(&mut self) {
        self.commands.push(DrawCommand::Present);
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.resize(width as f32, height as f32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_frame_starts_at_clear() {
        let mut surface = RecordingSurface::new(10.0, 10.0);
        surface.clear(None);
        surface.fill_disc(Vec2::ZERO, 1.0, Rgba::WHITE);
        surface.clear(Some(Rgba::BLACK));
        surface.fill_disc(Vec2::ONE, 2.0, Rgba::WHITE);
        surface.fill_disc(Vec2::ONE, 3.0, Rgba::WHITE);
        assert_eq!(surface.last_frame()[0], DrawCommand::Clear(Some(Rgba::BLACK)));
        assert_eq!(surface.disc_count(), 2);
        assert_eq!(surface.take().len(), 5);
        assert!(surface.commands().is_empty());
    }
}
