//! Immediate-mode particle renderer
//!
//! Each frame fully clears the surface (opaque color or transparent) and then
//! draws one shape per live particle. The clear is never a translucent fade, so
//! nothing from the previous frame ever bleeds through.

use serde::{Deserialize, Serialize};

use super::surface::DrawSurface;
use crate::sim::{Particle, ParticleSystem, PressureField, Rgba};

/// How a particle is drawn
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ParticleStyle {
    /// Filled disc
    #[default]
    Disc,
    /// Outline only (ripples)
    Ring { width: f32 },
    /// Translucent fill with a brighter rim
    Bubble { fill: f32, rim: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImmediateRenderer {
    pub style: ParticleStyle,
    /// `None` clears to transparent
    pub background: Option<Rgba>,
    /// Draw pressure imprints as faint rings
    pub show_imprints: bool,
}

impl Default for ImmediateRenderer {
    fn default() -> Self {
        Self {
            style: ParticleStyle::Disc,
            background: None,
            show_imprints: false,
        }
    }
}

impl ImmediateRenderer {
    pub fn new(style: ParticleStyle, background: Option<Rgba>) -> Self {
        Self {
            style,
            background,
            show_imprints: false,
        }
    }

    /// Clear, draw every live particle, present. Returns shapes drawn.
    pub fn render<S: DrawSurface + ?Sized>(&self, surface: &mut S, system: &ParticleSystem) -> usize {
        self.begin(surface);
        let drawn = self.draw_particles(surface, system.live_particles());
        if self.show_imprints {
            self.draw_imprints(surface, system.pressure());
        }
        surface.present();
        drawn
    }

    /// Start a frame
    pub fn begin<S: DrawSurface + ?Sized>(&self, surface: &mut S) {
        surface.clear(self.background);
    }

    /// Draw particles in collection order (later spawns on top)
    pub fn draw_particles<S: DrawSurface + ?Sized>(&self, surface: &mut S, particles: &[Particle]) -> usize {
        let mut drawn = 0;
        for particle in particles {
            let alpha = particle.color.a * particle.opacity;
            let radius = particle.radius();
            if alpha <= 0.0 || radius <= 0.0 {
                continue;
            }
            let color = particle.color.with_alpha(alpha);
            match self.style {
                ParticleStyle::Disc => surface.fill_disc(particle.pos, radius, color),
                ParticleStyle::Ring { width } => surface.stroke_ring(particle.pos, radius, width, color),
                ParticleStyle::Bubble { fill, rim } => {
                    surface.fill_disc(particle.pos, radius, color.with_alpha(alpha * fill));
                    surface.stroke_ring(particle.pos, radius, rim, color);
                }
            }
            drawn += 1;
        }
        drawn
    }

    pub fn draw_imprints<S: DrawSurface + ?Sized>(&self, surface: &mut S, field: &PressureField) {
        for imprint in field.imprints() {
            let color = Rgba::WHITE.with_alpha(0.15 * imprint.life);
            surface.stroke_ring(imprint.pos, imprint.radius, 1.0, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::surface::{DrawCommand, RecordingSurface};
    use crate::sim::{Fade, PressureConfig, SpawnParams};
    use glam::Vec2;

    fn system_with(n: usize) -> ParticleSystem {
        let mut system = ParticleSystem::new(5);
        for i in 0..n {
            system.spawn(SpawnParams {
                pos: Vec2::new(i as f32 * 10.0, 5.0),
                lifetime: 1.0,
                fade: Fade::Linear,
                ..Default::default()
            });
        }
        system
    }

    #[test]
    fn test_clears_before_drawing_every_frame() {
        let renderer = ImmediateRenderer::new(ParticleStyle::Disc, Some(Rgba::BLACK));
        let mut surface = RecordingSurface::new(100.0, 100.0);
        let mut system = system_with(3);
        for _ in 0..3 {
            system.tick(0.1);
            let before = surface.commands().len();
            renderer.render(&mut surface, &system);
            assert_eq!(
                surface.commands()[before],
                DrawCommand::Clear(Some(Rgba::BLACK))
            );
            assert_eq!(surface.disc_count(), 3);
        }
        assert_eq!(surface.commands().last(), Some(&DrawCommand::Present));
    }

    #[test]
    fn test_alpha_follows_fade() {
        let renderer = ImmediateRenderer::default();
        let mut surface = RecordingSurface::new(100.0, 100.0);
        let mut system = system_with(1);
        system.tick(0.5);
        renderer.render(&mut surface, &system);
        let alpha = surface.last_frame().iter().find_map(|c| match c {
            DrawCommand::Disc { color, .. } => Some(color.a),
            _ => None,
        });
        let alpha = alpha.expect("one disc");
        assert!((alpha - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_invisible_particles_skipped() {
        let mut system = ParticleSystem::new(1);
        system.spawn(SpawnParams {
            opacity: 0.0,
            ..Default::default()
        });
        let mut surface = RecordingSurface::new(10.0, 10.0);
        assert_eq!(ImmediateRenderer::default().render(&mut surface, &system), 0);
    }

    #[test]
    fn test_ring_style_and_imprint_overlay() {
        let mut renderer = ImmediateRenderer::new(ParticleStyle::Ring { width: 2.0 }, None);
        renderer.show_imprints = true;
        let mut system = system_with(2).with_pressure(PressureField::new(PressureConfig::default()));
        system.input_mut().pointer_move(Vec2::new(50.0, 50.0));
        system.tick(0.02);
        let mut surface = RecordingSurface::new(100.0, 100.0);
        renderer.render(&mut surface, &system);
        let rings = surface
            .last_frame()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Ring { .. }))
            .count();
        assert_eq!(rings, 3);
        assert_eq!(surface.disc_count(), 0);
    }
}
