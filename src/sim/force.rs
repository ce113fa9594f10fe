//! Force model
//!
//! Pure functions computing per-particle accelerations (units/s²) and
//! velocity factors. None of these touch the particle collection; the system
//! sums them and integrates.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::input::InputState;
use crate::{ease_out_cubic, lerp, smoothstep};

/// Velocity decay model
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Drag {
    #[default]
    None,
    /// `v *= 1 - k·dt` (floored at zero)
    Linear(f32),
    /// `v *= exp(-k·dt)`
    Exponential(f32),
}

impl Drag {
    /// Multiplier applied to velocity for a step of `dt`
    pub fn factor(&self, dt: f32) -> f32 {
        match *self {
            Drag::None => 1.0,
            Drag::Linear(k) => (1.0 - k * dt).max(0.0),
            Drag::Exponential(k) => (-k * dt).exp(),
        }
    }
}

/// Vertical acceleration model (+y is down the screen)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Gravity {
    Constant(f32),
    /// Eased from `start` to `end` over the particle's life (ease-out cubic)
    Eased { start: f32, end: f32 },
}

impl Default for Gravity {
    fn default() -> Self {
        Gravity::Constant(0.0)
    }
}

impl Gravity {
    /// Acceleration for normalized age `u`
    pub fn accel(&self, u: f32) -> f32 {
        match *self {
            Gravity::Constant(g) => g,
            Gravity::Eased { start, end } => lerp(start, end, ease_out_cubic(u.clamp(0.0, 1.0))),
        }
    }
}

/// Oscillating lateral push plus a steady breeze
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Swirl {
    /// Peak acceleration along each axis
    pub amplitude: Vec2,
    /// Constant acceleration
    pub breeze: Vec2,
}

/// Heading oscillation for the swim stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Radians per second at peak of the oscillation
    pub turn_rate: f32,
    /// Speed set when the particle starts swimming
    pub swim_speed: f32,
    /// Decay of the cruise speed while swimming
    pub swim_drag: Drag,
    /// Age at which the explode stage hands over to swimming
    pub swim_after: f32,
}

/// Attraction toward the pointer with a smooth falloff
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerPull {
    /// Spring constant while hovering (1/s²)
    pub k_hover: f32,
    /// Spring constant while pressed (1/s²)
    pub k_down: f32,
    /// Full strength inside this radius
    pub inner: f32,
    /// No force beyond this radius
    pub outer: f32,
    /// Magnitude cap (units/s²)
    pub max_accel: f32,
}

/// Per-particle force coefficients, fixed at spawn
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ForceParams {
    pub gravity: Gravity,
    pub drag: Drag,
    pub swirl: Option<Swirl>,
    pub turn: Option<Turn>,
    pub pointer: Option<PointerPull>,
    /// Spring constant pulling back to the spawn point (1/s²)
    pub home_k: f32,
    /// Peak random acceleration per axis (units/s²)
    pub jitter: f32,
    /// Scale applied to the device tilt vector (units/s² per unit tilt)
    pub tilt: f32,
    /// Scale applied to the pressure field force
    pub pressure: f32,
    /// Speed clamp (units/s)
    pub max_speed: Option<f32>,
}

/// Swirl acceleration at `age` for a particle with the given oscillator
#[inline]
pub fn swirl_accel(swirl: &Swirl, age: f32, freq: f32, phase: f32) -> Vec2 {
    swirl.amplitude * (freq * age + phase).sin() + swirl.breeze
}

/// Heading after one step of oscillatory turning
#[inline]
pub fn turn_heading(turn: &Turn, heading: f32, age: f32, freq: f32, phase: f32, dt: f32) -> f32 {
    heading + (age * freq + phase).sin() * turn.turn_rate * dt
}

/// Cruise speed after one swim step of `dt`
#[inline]
pub fn swim_speed(turn: &Turn, speed: f32, dt: f32) -> f32 {
    speed * turn.swim_drag.factor(dt)
}

/// Falloff weight for pointer attraction: 1 inside `inner`, 0 beyond `outer`
#[inline]
pub fn pointer_weight(pull: &PointerPull, dist: f32) -> f32 {
    if dist >= pull.outer {
        return 0.0;
    }
    1.0 - smoothstep(pull.inner, pull.outer, dist)
}

/// Spring pull toward the pointer, zero when the pointer is inactive
pub fn pointer_accel(pull: &PointerPull, pos: Vec2, input: &InputState) -> Vec2 {
    if !input.active {
        return Vec2::ZERO;
    }
    let delta = input.pointer - pos;
    let dist = delta.length();
    let weight = pointer_weight(pull, dist);
    if weight <= 0.0 {
        return Vec2::ZERO;
    }
    let k = if input.down { pull.k_down } else { pull.k_hover };
    (delta * k * weight).clamp_length_max(pull.max_accel)
}

/// Spring pull back toward the rest point
#[inline]
pub fn home_accel(k: f32, pos: Vec2, home: Vec2) -> Vec2 {
    (home - pos) * k
}

/// Clamp a velocity to a maximum speed
#[inline]
pub fn clamp_speed(vel: Vec2, max_speed: Option<f32>) -> Vec2 {
    match max_speed {
        Some(max) => vel.clamp_length_max(max.max(0.0)),
        None => vel,
    }
}
