//! Spawn policies
//!
//! Periodic spawners emit fixed batches on a wall-clock interval; burst
//! spawners emit a one-shot ring of particles whose count and speed scale with
//! the size of whatever triggered them. Both draw from the system's RNG and
//! only touch the system through `spawn`.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::particle::SpawnParams;
use super::system::ParticleSystem;
use crate::heading_to_velocity;

/// Most intervals a periodic spawner will catch up on in one update
pub const MAX_CATCH_UP: u32 = 4;

/// Where periodic particles appear
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpawnOrigin {
    /// Uniformly inside the bounds
    Anywhere,
    /// Just outside a random edge, `pad` units beyond it
    OffScreen { pad: f32 },
    /// A fixed point
    Point(Vec2),
}

impl SpawnOrigin {
    /// Sample a position for a surface of the given size
    pub fn sample(&self, rng: &mut Pcg32, size: Vec2) -> Vec2 {
        match *self {
            SpawnOrigin::Anywhere => Vec2::new(
                rng.random::<f32>() * size.x,
                rng.random::<f32>() * size.y,
            ),
            SpawnOrigin::OffScreen { pad } => {
                let along = rng.random::<f32>();
                match rng.random_range(0..4u8) {
                    0 => Vec2::new(along * size.x, -pad),
                    1 => Vec2::new(size.x + pad, along * size.y),
                    2 => Vec2::new(along * size.x, size.y + pad),
                    _ => Vec2::new(-pad, along * size.y),
                }
            }
            SpawnOrigin::Point(p) => p,
        }
    }
}

/// Emits `batch` particles every `interval` seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodicSpawner {
    pub interval: f32,
    pub batch: usize,
    pub origin: SpawnOrigin,
    elapsed: f32,
}

impl PeriodicSpawner {
    pub fn new(interval: f32, batch: usize, origin: SpawnOrigin) -> Self {
        Self {
            interval: interval.max(0.001),
            batch,
            origin,
            elapsed: 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }

    /// Advance the timer and spawn any due batches. `make` turns an origin into
    /// spawn parameters. Returns the number of particles spawned.
    pub fn update<F>(&mut self, dt: f32, system: &mut ParticleSystem, mut make: F) -> usize
    where
        F: FnMut(&mut Pcg32, Vec2) -> SpawnParams,
    {
        if !(dt > 0.0 && dt.is_finite()) {
            return 0;
        }
        self.elapsed += dt;

        let mut spawned = 0;
        let mut fired = 0;
        while self.elapsed >= self.interval && fired < MAX_CATCH_UP {
            self.elapsed -= self.interval;
            fired += 1;
            spawned += self.spawn_batch(system, &mut make);
        }
        // Drop backlog beyond the catch-up limit
        if self.elapsed >= self.interval {
            self.elapsed %= self.interval;
        }
        spawned
    }

    /// Spawn one batch immediately
    pub fn spawn_batch<F>(&self, system: &mut ParticleSystem, make: &mut F) -> usize
    where
        F: FnMut(&mut Pcg32, Vec2) -> SpawnParams,
    {
        let size = system.bounds().map(|b| b.size()).unwrap_or(Vec2::ZERO);
        for _ in 0..self.batch {
            let rng = system.rng_mut();
            let pos = self.origin.sample(rng, size);
            let params = make(rng, pos);
            system.spawn(params);
        }
        self.batch
    }
}

/// One particle of a burst, handed to the burst's parameter factory
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurstShot {
    pub origin: Vec2,
    pub vel: Vec2,
    pub index: usize,
    pub count: usize,
}

/// One-shot radial burst whose count and speed scale with a size hint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BurstSpawner {
    pub base_count: f32,
    pub count_per_size: f32,
    pub min_count: usize,
    pub max_count: usize,
    pub base_speed: f32,
    /// Random extra speed added to the whole burst
    pub speed_jitter: f32,
    pub speed_per_size: f32,
    /// Per-particle multiplier range applied to the burst speed
    pub speed_spread: (f32, f32),
}

impl Default for BurstSpawner {
    fn default() -> Self {
        Self {
            base_count: 18.0,
            count_per_size: 0.14,
            min_count: 8,
            max_count: 64,
            base_speed: 240.0,
            speed_jitter: 180.0,
            speed_per_size: 1.4,
            speed_spread: (0.82, 1.18),
        }
    }
}

impl BurstSpawner {
    /// Particle count for a size hint; non-decreasing and clamped to the floor/ceiling
    pub fn count_for(&self, size_hint: f32) -> usize {
        let size = sanitize_size(size_hint);
        let raw = (self.base_count + self.count_per_size * size).round().max(0.0) as usize;
        raw.clamp(self.min_count, self.max_count.max(self.min_count))
    }

    /// Copy with every count scaled by `factor` (quality settings)
    pub fn scaled(&self, factor: f32) -> Self {
        let factor = if factor.is_finite() { factor.max(0.0) } else { 0.0 };
        let min_count = (self.min_count as f32 * factor).round() as usize;
        Self {
            base_count: self.base_count * factor,
            count_per_size: self.count_per_size * factor,
            min_count,
            max_count: ((self.max_count as f32 * factor).round() as usize).max(min_count),
            ..*self
        }
    }

    /// Burst speed before per-particle spread, without the random term
    pub fn min_speed_for(&self, size_hint: f32) -> f32 {
        self.base_speed + self.speed_per_size * sanitize_size(size_hint)
    }

    /// Emit a burst at `origin`. Returns the number of particles spawned.
    pub fn spawn<F>(
        &self,
        system: &mut ParticleSystem,
        origin: Vec2,
        size_hint: f32,
        mut make: F,
    ) -> usize
    where
        F: FnMut(&mut Pcg32, BurstShot) -> SpawnParams,
    {
        let count = self.count_for(size_hint);
        let (lo, hi) = self.speed_spread;
        let speed_base = {
            let rng = system.rng_mut();
            self.min_speed_for(size_hint) + rng.random::<f32>() * self.speed_jitter
        };

        for index in 0..count {
            let rng = system.rng_mut();
            let angle = rng.random::<f32>() * std::f32::consts::TAU;
            let spread = lo + rng.random::<f32>() * (hi - lo);
            let shot = BurstShot {
                origin,
                vel: heading_to_velocity(angle, speed_base * spread),
                index,
                count,
            };
            let params = make(rng, shot);
            system.spawn(params);
        }

        log::debug!(
            "burst of {} at ({:.0}, {:.0}), speed {:.0}",
            count,
            origin.x,
            origin.y,
            speed_base
        );
        count
    }
}

fn sanitize_size(size_hint: f32) -> f32 {
    if size_hint.is_finite() {
        size_hint.max(0.0)
    } else {
        0.0
    }
}
