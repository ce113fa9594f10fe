//! Fidget FX - particle engine for decorative browser effects
//!
//! Core modules:
//! - `sim`: Particle simulation (forces, lifecycle, spawning, pressure field)
//! - `driver`: Repaint-callback animation loop with clamped timestep
//! - `renderer`: Immediate-mode surfaces and retained-node rendering
//! - `effects`: Preset effects built from the shared engine
//! - `platform`: Browser/native platform abstraction
//! - `settings`: Persisted quality and accessibility preferences
//! - `mount`: Binding effects to browser canvases (wasm only)

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod driver;
pub mod effects;
pub mod error;
#[cfg(target_arch = "wasm32")]
pub mod mount;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use driver::{AnimationDriver, FrameClock, ManualScheduler, Scheduler};
pub use effects::{Effect, Preset};
pub use error::FxError;
#[cfg(target_arch = "wasm32")]
pub use mount::{MountedEffect, mount, mount_dom, mount_gpu};
pub use settings::{QualityPreset, Settings};
pub use sim::{ParticleId, ParticleSystem, SpawnParams};

use glam::Vec2;

/// Engine configuration constants
pub mod consts {
    /// Largest timestep the driver hands to a tick (seconds)
    pub const MAX_DT: f32 = 0.05;
    /// Nominal frame interval used for the first frame and per-frame decay rates
    pub const REFERENCE_DT: f32 = 1.0 / 60.0;

    /// Lifetimes below this are clamped up at spawn
    pub const MIN_LIFETIME: f32 = 0.001;
    /// Lifetime for ambient particles that only leave via reset or popping
    pub const ENDLESS_LIFETIME: f32 = f32::MAX;

    /// Default distance beyond the viewport before a particle is culled
    pub const CULL_MARGIN: f32 = 20.0;
    /// Default particle cap per system
    pub const DEFAULT_CAPACITY: usize = 2048;

    /// Pressure field defaults
    pub const IMPRINT_CAP: usize = 48;
    pub const IMPRINT_SAMPLES: usize = 8;
    pub const IMPRINT_MIN_INTERVAL: f32 = 0.018;
    pub const IMPRINT_THRESHOLD: f32 = 0.05;
    pub const IMPRINT_MIN_RADIUS: f32 = 8.0;
}

/// Hermite smoothstep of `x` between `edge0` and `edge1`, clamped to [0, 1]
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let span = edge1 - edge0;
    if span.abs() <= f32::EPSILON {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / span).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let inv = 1.0 - t;
    1.0 - inv * inv * inv
}

#[inline]
pub fn ease_in_cubic(t: f32) -> f32 {
    t * t * t
}

/// Convert heading (radians) and speed to a velocity vector
#[inline]
pub fn heading_to_velocity(heading: f32, speed: f32) -> Vec2 {
    Vec2::new(speed * heading.cos(), speed * heading.sin())
}

/// Convert a velocity vector to (heading, speed)
#[inline]
pub fn velocity_to_heading(vel: Vec2) -> (f32, f32) {
    (vel.y.atan2(vel.x), vel.length())
}

/// Replace non-finite components with zero
#[inline]
pub fn finite_or_zero(v: Vec2) -> Vec2 {
    Vec2::new(
        if v.x.is_finite() { v.x } else { 0.0 },
        if v.y.is_finite() { v.y } else { 0.0 },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothstep_edges() {
        assert_eq!(smoothstep(10.0, 20.0, 5.0), 0.0);
        assert_eq!(smoothstep(10.0, 20.0, 25.0), 1.0);
        assert!((smoothstep(10.0, 20.0, 15.0) - 0.5).abs() < 1e-6);
        // Degenerate range acts as a step
        assert_eq!(smoothstep(3.0, 3.0, 2.0), 0.0);
        assert_eq!(smoothstep(3.0, 3.0, 4.0), 1.0);
    }

    #[test]
    fn test_easing_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert_eq!(ease_in_cubic(0.0), 0.0);
        assert_eq!(ease_in_cubic(1.0), 1.0);
    }

    #[test]
    fn test_heading_roundtrip() {
        let vel = heading_to_velocity(0.7, 42.0);
        let (heading, speed) = velocity_to_heading(vel);
        assert!((heading - 0.7).abs() < 1e-5);
        assert!((speed - 42.0).abs() < 1e-4);
    }

    #[test]
    fn test_finite_or_zero() {
        let v = finite_or_zero(Vec2::new(f32::NAN, f32::INFINITY));
        assert_eq!(v, Vec2::ZERO);
        assert_eq!(finite_or_zero(Vec2::new(1.0, -2.0)), Vec2::new(1.0, -2.0));
    }
}
