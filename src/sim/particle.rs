//! Particle types and spawn parameters
//!
//! A particle's force coefficients and visual parameters are fixed at spawn;
//! only position, velocity, age, stage and the derived opacity/scale change.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::force::ForceParams;
use crate::{ease_in_cubic, lerp, velocity_to_heading};

/// Stable particle handle, unique among live particles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticleId(pub u32);

/// Motion phase of a particle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Stage {
    /// Initial outward burst: drag decays the launch speed
    #[default]
    Explode,
    /// Steered motion along an oscillating heading
    Swim,
}

/// Linear RGBA color, components in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// From a 0xRRGGBB literal with the given alpha
    pub fn from_hex(hex: u32, a: f32) -> Self {
        let r = ((hex >> 16) & 0xff) as f32 / 255.0;
        let g = ((hex >> 8) & 0xff) as f32 / 255.0;
        let b = (hex & 0xff) as f32 / 255.0;
        Self { r, g, b, a }
    }

    /// From HSL (hue in degrees, saturation/lightness in [0, 1])
    pub fn from_hsla(h: f32, s: f32, l: f32, a: f32) -> Self {
        let h = h.rem_euclid(360.0) / 360.0;
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        let channel = |mut t: f32| {
            t = t.rem_euclid(1.0);
            if t < 1.0 / 6.0 {
                p + (q - p) * 6.0 * t
            } else if t < 0.5 {
                q
            } else if t < 2.0 / 3.0 {
                p + (q - p) * (2.0 / 3.0 - t) * 6.0
            } else {
                p
            }
        };
        Self {
            r: channel(h + 1.0 / 3.0),
            g: channel(h),
            b: channel(h - 1.0 / 3.0),
            a,
        }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Color channels quantized to bytes, alpha dropped
    pub fn to_rgb8(&self) -> [u8; 3] {
        let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [byte(self.r), byte(self.g), byte(self.b)]
    }

    /// CSS `rgba()` string for canvas/DOM backends
    pub fn to_css(&self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("rgba({}, {}, {}, {:.3})", r, g, b, self.a.clamp(0.0, 1.0))
    }

    /// Write an opaque CSS `rgb()` string into `out`, replacing its contents.
    /// Reuses the buffer's allocation.
    pub fn write_css_rgb(&self, out: &mut String) {
        use std::fmt::Write;
        let [r, g, b] = self.to_rgb8();
        out.clear();
        let _ = write!(out, "rgb({}, {}, {})", r, g, b);
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Opacity curve over normalized age `u = age / lifetime`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Fade {
    /// Constant opacity for the whole life
    #[default]
    None,
    /// `1 - u`
    Linear,
    /// Holds full opacity until `start`, then `1 - v³` over the remainder
    EaseIn { start: f32 },
}

impl Fade {
    /// Opacity multiplier for normalized age `u`
    pub fn opacity(&self, u: f32) -> f32 {
        let u = u.clamp(0.0, 1.0);
        match *self {
            Fade::None => 1.0,
            Fade::Linear => 1.0 - u,
            Fade::EaseIn { start } => {
                let span = (1.0 - start).max(f32::EPSILON);
                let v = ((u - start) / span).clamp(0.0, 1.0);
                1.0 - ease_in_cubic(v)
            }
        }
    }

    pub fn fades(&self) -> bool {
        !matches!(self, Fade::None)
    }
}

/// Everything needed to create one particle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnParams {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    /// Size change per second (expanding ripples)
    pub growth: f32,
    pub lifetime: f32,
    pub color: Rgba,
    /// Opacity at birth, multiplied by the fade curve
    pub opacity: f32,
    pub fade: Fade,
    /// Scale at birth and at death, interpolated by normalized age
    pub scale: (f32, f32),
    /// Oscillation frequency (rad/s) and phase for swirl/turn terms
    pub freq: f32,
    pub phase: f32,
    pub stage: Stage,
    pub forces: ForceParams,
}

impl Default for SpawnParams {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            size: 4.0,
            growth: 0.0,
            lifetime: 1.0,
            color: Rgba::WHITE,
            opacity: 1.0,
            fade: Fade::None,
            scale: (1.0, 1.0),
            freq: 0.0,
            phase: 0.0,
            stage: Stage::Explode,
            forces: ForceParams::default(),
        }
    }
}

/// A live simulated particle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub id: ParticleId,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Spawn position, the rest point for home springs
    pub home: Vec2,
    pub age: f32,
    pub lifetime: f32,
    pub stage: Stage,
    /// Heading used while swimming (radians)
    pub heading: f32,
    /// Cruise speed while swimming; the velocity is rebuilt from it each step
    pub speed: f32,
    pub size: f32,
    pub growth: f32,
    pub color: Rgba,
    pub base_opacity: f32,
    pub fade: Fade,
    pub scale_curve: (f32, f32),
    pub freq: f32,
    pub phase: f32,
    pub forces: ForceParams,
    /// Derived each tick from age
    pub opacity: f32,
    /// Derived each tick from age
    pub scale: f32,
}

impl Particle {
    pub(crate) fn from_params(id: ParticleId, params: &SpawnParams, lifetime: f32) -> Self {
        let (heading, speed) = velocity_to_heading(params.vel);
        let mut particle = Self {
            id,
            pos: params.pos,
            vel: params.vel,
            home: params.pos,
            age: 0.0,
            lifetime,
            stage: params.stage,
            heading,
            speed,
            size: params.size.max(0.0),
            growth: params.growth,
            color: params.color,
            base_opacity: params.opacity.clamp(0.0, 1.0),
            fade: params.fade,
            scale_curve: params.scale,
            freq: params.freq,
            phase: params.phase,
            forces: params.forces,
            opacity: 0.0,
            scale: 1.0,
        };
        particle.refresh_visuals();
        particle
    }

    /// Normalized age in [0, 1]
    pub fn age_ratio(&self) -> f32 {
        if self.lifetime <= 0.0 {
            1.0
        } else {
            (self.age / self.lifetime).min(1.0)
        }
    }

    /// Recompute opacity and scale from the current age
    pub fn refresh_visuals(&mut self) {
        let u = self.age_ratio();
        self.opacity = self.base_opacity * self.fade.opacity(u);
        self.scale = lerp(self.scale_curve.0, self.scale_curve.1, u);
    }

    /// Current drawn radius (size grows with age, then scaled)
    pub fn radius(&self) -> f32 {
        ((self.size + self.growth * self.age) * self.scale * 0.5).max(0.0)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        self.pos.distance_squared(point) <= self.radius() * self.radius()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade_curves_reach_zero() {
        assert_eq!(Fade::Linear.opacity(1.0), 0.0);
        assert!(Fade::EaseIn { start: 0.3 }.opacity(1.0) <= 1e-6);
        assert_eq!(Fade::EaseIn { start: 0.3 }.opacity(0.2), 1.0);
        assert_eq!(Fade::None.opacity(1.0), 1.0);
    }

    #[test]
    fn test_hsla_primaries() {
        let red = Rgba::from_hsla(0.0, 1.0, 0.5, 1.0);
        assert!((red.r - 1.0).abs() < 1e-5 && red.g.abs() < 1e-5 && red.b.abs() < 1e-5);
        let blue = Rgba::from_hsla(240.0, 1.0, 0.5, 1.0);
        assert!(blue.r.abs() < 1e-5 && blue.g.abs() < 1e-5 && (blue.b - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_hex_and_css() {
        let c = Rgba::from_hex(0x76c6c6, 0.8);
        assert_eq!(c.to_css(), "rgba(118, 198, 198, 0.800)");
    }

    #[test]
    fn test_css_rgb_reuses_buffer() {
        let mut css = String::with_capacity(32);
        let capacity = css.capacity();
        Rgba::from_hex(0x76c6c6, 0.8).write_css_rgb(&mut css);
        assert_eq!(css, "rgb(118, 198, 198)");
        Rgba::WHITE.with_alpha(0.1).write_css_rgb(&mut css);
        assert_eq!(css, "rgb(255, 255, 255)");
        assert_eq!(css.capacity(), capacity);
        assert_eq!(Rgba::new(2.0, -1.0, 0.5, 1.0).to_rgb8(), [255, 0, 128]);
    }

    #[test]
    fn test_radius_grows_and_scales() {
        let params = SpawnParams {
            size: 10.0,
            growth: 60.0,
            scale: (2.0, 2.0),
            ..Default::default()
        };
        let mut p = Particle::from_params(ParticleId(1), &params, 1.0);
        assert_eq!(p.radius(), 10.0);
        p.age = 0.5;
        p.refresh_visuals();
        assert_eq!(p.radius(), 40.0);
        assert!(p.contains(Vec2::new(39.0, 0.0)));
        assert!(!p.contains(Vec2::new(41.0, 0.0)));
    }
}
