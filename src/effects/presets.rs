//! Spawn parameter factories for each effect
//!
//! Every effect is a configuration of the same engine; these functions hold
//! the per-effect constants (ranges are sampled from the system's RNG).

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::slime::SlimeTuning;
use crate::consts::ENDLESS_LIFETIME;
use crate::heading_to_velocity;
use crate::sim::{
    BurstShot, BurstSpawner, Drag, Fade, ForceParams, Gravity, Rgba, SpawnParams, Swirl, Turn,
};

/// Uniform sample in `[lo, hi)`
fn range(rng: &mut Pcg32, lo: f32, hi: f32) -> f32 {
    lo + rng.random::<f32>() * (hi - lo)
}

// ============================================================================
// POP CONFETTI (bubble bursts)
// ============================================================================

pub fn pop_burst() -> BurstSpawner {
    BurstSpawner::default()
}

/// Short-lived flake thrown outward when a bubble pops; floats up and fades
pub fn pop_flake(rng: &mut Pcg32, shot: BurstShot) -> SpawnParams {
    let size = range(rng, 2.0, 5.5);
    let hue = range(rng, 180.0, 260.0);
    SpawnParams {
        pos: shot.origin,
        vel: shot.vel,
        size,
        lifetime: range(rng, 0.20, 0.38),
        color: Rgba::from_hsla(hue, 0.9, 0.85, 0.95),
        fade: Fade::EaseIn { start: 0.3 },
        scale: (1.2, 0.9),
        freq: range(rng, 8.0, 13.0),
        phase: range(rng, 0.0, TAU),
        forces: ForceParams {
            gravity: Gravity::Eased {
                start: -120.0,
                end: -30.0,
            },
            drag: Drag::Exponential(range(rng, 2.1, 2.9)),
            swirl: Some(Swirl {
                amplitude: Vec2::new(26.0, 0.0),
                breeze: Vec2::new(10.0, 0.0),
            }),
            ..Default::default()
        },
        ..Default::default()
    }
}

// ============================================================================
// CONFETTI (celebration cone)
// ============================================================================

pub const CONFETTI_COLORS: [u32; 4] = [0x00E5FF, 0x6C3BFF, 0xFF00FF, 0xFFFFFF];
/// Full width of the launch cone (radians)
const CONFETTI_SPREAD: f32 = 80.0 * std::f32::consts::PI / 180.0;

pub fn confetti_burst() -> BurstSpawner {
    BurstSpawner {
        base_count: 150.0,
        count_per_size: 0.0,
        min_count: 20,
        max_count: 200,
        base_speed: 1680.0,
        speed_jitter: 0.0,
        speed_per_size: 0.0,
        speed_spread: (0.5, 1.5),
    }
}

/// Paper flake launched upward in a cone; drag caps the fall speed so it flutters
pub fn confetti_flake(rng: &mut Pcg32, shot: BurstShot) -> SpawnParams {
    let heading = -std::f32::consts::FRAC_PI_2 + (rng.random::<f32>() - 0.5) * CONFETTI_SPREAD;
    let color = CONFETTI_COLORS[rng.random_range(0..CONFETTI_COLORS.len())];
    SpawnParams {
        pos: shot.origin,
        vel: heading_to_velocity(heading, shot.vel.length()),
        size: range(rng, 7.0, 11.0),
        lifetime: range(rng, 3.2, 3.7),
        color: Rgba::from_hex(color, 1.0),
        fade: Fade::Linear,
        freq: range(rng, 4.0, 8.0),
        phase: range(rng, 0.0, TAU),
        forces: ForceParams {
            gravity: Gravity::Constant(600.0),
            drag: Drag::Exponential(6.3),
            swirl: Some(Swirl {
                amplitude: Vec2::new(40.0, 0.0),
                breeze: Vec2::ZERO,
            }),
            tilt: 30.0,
            ..Default::default()
        },
        ..Default::default()
    }
}

// ============================================================================
// FLYING-FISH SPARKS
// ============================================================================

pub fn fish_burst() -> BurstSpawner {
    BurstSpawner {
        base_count: 36.0,
        count_per_size: 0.25,
        min_count: 10,
        max_count: 90,
        base_speed: 540.0,
        speed_jitter: 0.0,
        speed_per_size: 0.0,
        speed_spread: (1.0, 1.3),
    }
}

/// Spark that explodes outward (biased upward), then swims along a wavering heading
pub fn fish_spark(rng: &mut Pcg32, shot: BurstShot) -> SpawnParams {
    let degrees = if rng.random::<f32>() < 0.6 {
        range(rng, 240.0, 340.0)
    } else {
        range(rng, 0.0, 360.0)
    };
    let heading = degrees.to_radians();
    let offset = range(rng, 12.0, 30.0);
    let breeze = Vec2::new(
        range(rng, -30.0, 30.0) * range(rng, 0.5, 1.2),
        range(rng, -10.0, 10.0) * 0.4,
    );

    SpawnParams {
        pos: shot.origin + heading_to_velocity(heading, offset),
        vel: heading_to_velocity(heading, shot.vel.length()),
        size: range(rng, 1.8, 3.0) * 1.1,
        lifetime: range(rng, 0.7, 1.05),
        opacity: 0.95,
        fade: Fade::Linear,
        freq: range(rng, 8.0, 15.0),
        phase: range(rng, 0.0, TAU),
        forces: ForceParams {
            gravity: Gravity::Constant(range(rng, 120.0, 170.0)),
            drag: Drag::Linear(range(rng, 0.25, 0.4)),
            swirl: Some(Swirl {
                amplitude: Vec2::ZERO,
                breeze,
            }),
            turn: Some(Turn {
                turn_rate: range(rng, 3.2, 6.2),
                swim_speed: range(rng, 180.0, 300.0),
                swim_drag: Drag::Linear(range(rng, 0.38, 0.63)),
                swim_after: range(rng, 0.12, 0.24),
            }),
            tilt: 40.0,
            ..Default::default()
        },
        ..Default::default()
    }
}

// ============================================================================
// CELEBRATION (release burst)
// ============================================================================

/// Target size that maps to a burst scale of 1
pub const CELEBRATION_BASE_SIZE: f32 = 100.0;
/// Base size on narrow surfaces, where targets are drawn smaller
pub const CELEBRATION_BASE_SIZE_NARROW: f32 = 72.0;
const NARROW_WIDTH: f32 = 640.0;
pub const CELEBRATION_MIN_SCALE: f32 = 0.8;
pub const CELEBRATION_MAX_SCALE: f32 = 1.6;
/// Downward pull of the confetti ring; with the flake drag this settles at a
/// steady flutter speed
const RING_GRAVITY: f32 = 1080.0;
const ACCENT_GRAVITY: f32 = 1090.0;

pub fn celebration_base_size(surface_width: f32) -> f32 {
    if surface_width < NARROW_WIDTH {
        CELEBRATION_BASE_SIZE_NARROW
    } else {
        CELEBRATION_BASE_SIZE
    }
}

/// Burst scale for a target `size_hint` across on a surface `surface_width` wide
pub fn celebration_scale(size_hint: f32, surface_width: f32) -> f32 {
    let hint = if size_hint.is_finite() { size_hint.max(0.0) } else { 0.0 };
    (hint / celebration_base_size(surface_width)).clamp(CELEBRATION_MIN_SCALE, CELEBRATION_MAX_SCALE)
}

/// Particle counts for the layers of one release burst
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CelebrationCounts {
    /// Main confetti ring
    pub confetti: usize,
    /// Larger accent flakes mixed into the ring
    pub accents: usize,
    pub fish: usize,
}

impl CelebrationCounts {
    pub fn for_scale(scale: f32) -> Self {
        let count = |per_scale: f32, floor: usize| ((per_scale * scale).round() as usize).max(floor);
        Self {
            confetti: count(120.0, 60),
            accents: count(14.0, 8),
            fish: count(52.0, 28),
        }
    }

    /// Every layer multiplied by a quality factor
    pub fn scaled(self, factor: f32) -> Self {
        let factor = if factor.is_finite() { factor.max(0.0) } else { 0.0 };
        let scale = |n: usize| (n as f32 * factor).round() as usize;
        Self {
            confetti: scale(self.confetti),
            accents: scale(self.accents),
            fish: scale(self.fish),
        }
    }

    pub fn total(&self) -> usize {
        self.confetti + self.accents + self.fish
    }
}

/// Radial burst of exactly `count` particles
pub fn fixed_burst(count: usize, base_speed: f32, speed_spread: (f32, f32)) -> BurstSpawner {
    BurstSpawner {
        base_count: count as f32,
        count_per_size: 0.0,
        min_count: count,
        max_count: count,
        base_speed,
        speed_jitter: 0.0,
        speed_per_size: 0.0,
        speed_spread,
    }
}

/// Launch speed of the confetti ring (units/s)
pub fn celebration_speed(scale: f32) -> f32 {
    (18.0 + 3.0 * (scale - 1.0)) * 60.0
}

/// Paper flake thrown out in every direction; `scalar` sizes the flake
fn ring_flake(rng: &mut Pcg32, shot: BurstShot, scalar: f32, gravity: f32) -> SpawnParams {
    let color = CONFETTI_COLORS[rng.random_range(0..CONFETTI_COLORS.len())];
    SpawnParams {
        pos: shot.origin,
        vel: shot.vel,
        size: range(rng, 6.0, 9.0) * scalar,
        lifetime: range(rng, 3.6, 4.0),
        color: Rgba::from_hex(color, 1.0),
        fade: Fade::Linear,
        freq: range(rng, 4.0, 8.0),
        phase: range(rng, 0.0, TAU),
        forces: ForceParams {
            gravity: Gravity::Constant(gravity),
            drag: Drag::Exponential(6.3),
            swirl: Some(Swirl {
                amplitude: Vec2::new(40.0, 0.0),
                breeze: Vec2::ZERO,
            }),
            tilt: 30.0,
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn celebration_flake(rng: &mut Pcg32, shot: BurstShot, scale: f32) -> SpawnParams {
    ring_flake(rng, shot, 0.9 + 0.3 * scale, RING_GRAVITY)
}

pub fn celebration_accent(rng: &mut Pcg32, shot: BurstShot, scale: f32) -> SpawnParams {
    ring_flake(rng, shot, (0.9 + 0.3 * scale) * 1.2, ACCENT_GRAVITY)
}

// ============================================================================
// FLOATING BUBBLES
// ============================================================================

pub const FLOATING_INITIAL: usize = 20;
pub const FLOATING_INTERVAL: f32 = 2.0;
pub const FLOATING_CAP: usize = 60;

/// Slow-drifting bubble that lives until popped
pub fn floating_bubble(rng: &mut Pcg32, pos: Vec2) -> SpawnParams {
    let drift = 12.0;
    SpawnParams {
        pos,
        vel: Vec2::new(range(rng, -drift, drift), range(rng, -drift, drift)),
        size: range(rng, 30.0, 80.0),
        lifetime: ENDLESS_LIFETIME,
        color: Rgba::from_hsla(range(rng, 185.0, 215.0), 0.8, 0.85, 0.9),
        ..Default::default()
    }
}

// ============================================================================
// DRIPS
// ============================================================================

pub const DRIP_INTERVAL: f32 = 0.1;
pub const DRIP_BATCH: usize = 5;
const RIPPLE_COLOR: u32 = 0xADD8E6;
/// Ripple radius growth (units/s) as diameter growth
const RIPPLE_GROWTH: f32 = 2.0 * 60.0;
/// Opacity lost per second
const RIPPLE_FADE_RATE: f32 = 0.6;

fn ripple(pos: Vec2, radius: f32, opacity: f32) -> SpawnParams {
    SpawnParams {
        pos,
        size: radius * 2.0,
        growth: RIPPLE_GROWTH,
        lifetime: opacity / RIPPLE_FADE_RATE,
        color: Rgba::from_hex(RIPPLE_COLOR, 1.0),
        opacity,
        fade: Fade::Linear,
        ..Default::default()
    }
}

/// Small ambient drip
pub fn drip_ripple(_rng: &mut Pcg32, pos: Vec2) -> SpawnParams {
    ripple(pos, 1.0, 0.5)
}

/// Large ripple from a click
pub fn splash_ripple(pos: Vec2) -> SpawnParams {
    ripple(pos, 10.0, 0.8)
}

// ============================================================================
// OCEAN SPRAY
// ============================================================================

pub const OCEAN_COLORS: [u32; 4] = [0x76C6C6, 0x00416A, 0xADD8E6, 0xFFFFFF];
pub const OCEAN_BACKGROUND: u32 = 0x2E7F98;

/// Spray flicking up and down around the wave line as it fades
pub fn ocean_spray(rng: &mut Pcg32, pos: Vec2) -> SpawnParams {
    let color = OCEAN_COLORS[rng.random_range(0..OCEAN_COLORS.len())];
    SpawnParams {
        pos,
        size: 3.0,
        lifetime: 50.0 / 60.0,
        color: Rgba::from_hex(color, 1.0),
        fade: Fade::Linear,
        freq: range(rng, 12.0, 24.0),
        phase: range(rng, 0.0, TAU),
        forces: ForceParams {
            drag: Drag::Exponential(3.08),
            swirl: Some(Swirl {
                amplitude: Vec2::new(0.0, range(rng, 600.0, 1200.0)),
                breeze: Vec2::ZERO,
            }),
            home_k: 40.0,
            ..Default::default()
        },
        ..Default::default()
    }
}

// ============================================================================
// SLIME FIELD
// ============================================================================

/// Bubble anchored at its spawn point, pulled by the pointer and pushed by imprints
pub fn slime_bubble(rng: &mut Pcg32, size: Vec2, tuning: &SlimeTuning) -> SpawnParams {
    let diameter = range(rng, tuning.min_size, tuning.max_size);
    let r = diameter * 0.5;
    let pos = Vec2::new(
        r + rng.random::<f32>() * (size.x - diameter).max(0.0),
        r + rng.random::<f32>() * (size.y - diameter).max(0.0),
    );
    SpawnParams {
        pos,
        size: diameter,
        lifetime: ENDLESS_LIFETIME,
        color: Rgba::from_hsla(range(rng, 95.0, 140.0), 0.75, 0.6, 0.85),
        forces: tuning.forces(),
        ..Default::default()
    }
}
