//! Particle system
//!
//! Owns the live particle collection and advances it one variable timestep at
//! a time. The caller (the animation driver) is responsible for clamping `dt`.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::field::PressureField;
use super::force::{self, ForceParams};
use super::input::InputState;
use super::particle::{Particle, ParticleId, SpawnParams, Stage};
use crate::consts::*;
use crate::{finite_or_zero, heading_to_velocity, velocity_to_heading};

/// What happens when a particle leaves the surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EdgePolicy {
    /// Remove once farther than `margin` outside the bounds
    Cull { margin: f32 },
    /// Reappear at the opposite edge
    Wrap,
    /// Clamp inside and reflect velocity scaled by `restitution`
    Bounce { restitution: f32 },
}

impl Default for EdgePolicy {
    fn default() -> Self {
        EdgePolicy::Cull {
            margin: CULL_MARGIN,
        }
    }
}

/// Surface rectangle anchored at the origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
    pub edge: EdgePolicy,
}

impl Bounds {
    pub fn new(width: f32, height: f32, edge: EdgePolicy) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
            edge,
        }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// Live particle collection plus the shared per-instance state it reads
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    next_id: u32,
    spawned_total: u64,
    capacity: usize,
    bounds: Option<Bounds>,
    input: InputState,
    pressure: PressureField,
    rng: Pcg32,
}

impl ParticleSystem {
    /// Create an empty system with the given RNG seed
    pub fn new(seed: u64) -> Self {
        Self::with_capacity(seed, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(seed: u64, capacity: usize) -> Self {
        Self {
            particles: Vec::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            next_id: 1,
            spawned_total: 0,
            capacity: capacity.max(1),
            bounds: None,
            input: InputState::default(),
            pressure: PressureField::disabled(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_pressure(mut self, pressure: PressureField) -> Self {
        self.pressure = pressure;
        self
    }

    pub fn set_bounds(&mut self, bounds: Option<Bounds>) {
        self.bounds = bounds;
    }

    pub fn bounds(&self) -> Option<&Bounds> {
        self.bounds.as_ref()
    }

    /// Update the surface size, keeping the edge policy
    pub fn resize(&mut self, width: f32, height: f32) {
        let edge = self.bounds.map(|b| b.edge).unwrap_or_default();
        self.bounds = Some(Bounds::new(width, height, edge));
    }

    /// Change the particle cap; excess oldest particles are dropped
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        if self.particles.len() > self.capacity {
            let excess = self.particles.len() - self.capacity;
            self.particles.drain(..excess);
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn pressure(&self) -> &PressureField {
        &self.pressure
    }

    pub fn rng_mut(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    /// Allocate a new particle ID
    fn next_particle_id(&mut self) -> ParticleId {
        let id = ParticleId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }

    /// Append one particle. Lifetime is clamped to a positive minimum; when the
    /// system is full the oldest particle is evicted.
    pub fn spawn(&mut self, params: SpawnParams) -> ParticleId {
        let lifetime = if params.lifetime.is_finite() {
            params.lifetime.max(MIN_LIFETIME)
        } else {
            MIN_LIFETIME
        };
        let params = SpawnParams {
            pos: finite_or_zero(params.pos),
            vel: finite_or_zero(params.vel),
            ..params
        };

        if self.particles.len() >= self.capacity {
            self.particles.remove(0);
        }

        let id = self.next_particle_id();
        self.particles.push(Particle::from_params(id, &params, lifetime));
        self.spawned_total += 1;
        id
    }

    /// Live particles as of the last tick
    pub fn live_particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Total particles ever spawned into this system
    pub fn spawned_total(&self) -> u64 {
        self.spawned_total
    }

    /// Remove a specific particle, returning it
    pub fn pop(&mut self, id: ParticleId) -> Option<Particle> {
        let idx = self.particles.iter().position(|p| p.id == id)?;
        Some(self.particles.remove(idx))
    }

    /// Top-most (most recently spawned) particle whose disc contains `point`
    pub fn hit_test(&self, point: Vec2) -> Option<ParticleId> {
        self.particles
            .iter()
            .rev()
            .find(|p| p.contains(point))
            .map(|p| p.id)
    }

    /// Drop every particle and imprint
    pub fn clear(&mut self) {
        self.particles.clear();
        self.pressure.clear();
    }

    /// Advance the simulation by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        if !(dt > 0.0 && dt.is_finite()) {
            return;
        }

        let input = self.input;
        self.pressure.advance(dt, &input);

        let bounds = self.bounds;
        let pressure = &self.pressure;
        let rng = &mut self.rng;

        for particle in self.particles.iter_mut() {
            let jitter = if particle.forces.jitter > 0.0 {
                let j = particle.forces.jitter;
                Vec2::new(rng.random_range(-j..=j), rng.random_range(-j..=j))
            } else {
                Vec2::ZERO
            };
            step_particle(particle, dt, &input, pressure, jitter);
            if let Some(bounds) = bounds {
                apply_edges(particle, &bounds);
            }
        }

        // Tombstone-and-compact: survivors keep their relative order
        self.particles.retain(|p| {
            let expired = p.age >= p.lifetime;
            let outside = match bounds {
                Some(Bounds {
                    width,
                    height,
                    edge: EdgePolicy::Cull { margin },
                }) => {
                    p.pos.x < -margin
                        || p.pos.y < -margin
                        || p.pos.x > width + margin
                        || p.pos.y > height + margin
                }
                _ => false,
            };
            !expired && !outside
        });
    }
}

/// Integrate one particle over `dt`
fn step_particle(
    particle: &mut Particle,
    dt: f32,
    input: &InputState,
    pressure: &PressureField,
    jitter: Vec2,
) {
    let forces: ForceParams = particle.forces;
    let u = particle.age_ratio();

    // Stage selection: swimming starts at the cruise speed
    if let Some(turn) = forces.turn {
        if particle.stage == Stage::Explode && particle.age >= turn.swim_after {
            particle.stage = Stage::Swim;
            particle.heading = velocity_to_heading(particle.vel).0;
            particle.speed = turn.swim_speed;
        }
    }

    // Launch drag only acts while exploding; swimming has its own
    if particle.stage == Stage::Explode {
        particle.vel *= forces.drag.factor(dt);
    }

    // Swim: steer along an oscillating heading at a decaying cruise speed.
    // Accelerations only bend the current step.
    if particle.stage == Stage::Swim {
        if let Some(turn) = forces.turn {
            particle.speed = force::swim_speed(&turn, particle.speed, dt);
            particle.heading = force::turn_heading(
                &turn,
                particle.heading,
                particle.age,
                particle.freq,
                particle.phase,
                dt,
            );
            particle.vel = heading_to_velocity(particle.heading, particle.speed);
        }
    }

    // Accelerations
    let mut accel = Vec2::new(0.0, forces.gravity.accel(u));
    if let Some(swirl) = forces.swirl {
        accel += force::swirl_accel(&swirl, particle.age, particle.freq, particle.phase);
    }
    if forces.tilt != 0.0 {
        accel += input.tilt * forces.tilt;
    }
    if let Some(pull) = forces.pointer {
        accel += force::pointer_accel(&pull, particle.pos, input);
    }
    if forces.home_k != 0.0 {
        accel += force::home_accel(forces.home_k, particle.pos, particle.home);
    }
    if forces.pressure != 0.0 && !pressure.is_empty() {
        accel += pressure.accel_at(particle.pos) * forces.pressure;
    }
    accel += jitter;
    let accel = finite_or_zero(accel);

    // Integrate (exact for constant acceleration)
    particle.pos += particle.vel * dt + 0.5 * accel * dt * dt;
    particle.vel += accel * dt;
    particle.vel = force::clamp_speed(particle.vel, forces.max_speed);

    particle.pos = finite_or_zero(particle.pos);
    particle.vel = finite_or_zero(particle.vel);

    // Age and derived visuals
    particle.age = (particle.age + dt).min(particle.lifetime);
    particle.refresh_visuals();
}

fn apply_edges(particle: &mut Particle, bounds: &Bounds) {
    match bounds.edge {
        EdgePolicy::Cull { .. } => {}
        EdgePolicy::Wrap => {
            if bounds.width > 0.0 {
                if particle.pos.x < 0.0 {
                    particle.pos.x = bounds.width;
                } else if particle.pos.x > bounds.width {
                    particle.pos.x = 0.0;
                }
            }
            if bounds.height > 0.0 {
                if particle.pos.y < 0.0 {
                    particle.pos.y = bounds.height;
                } else if particle.pos.y > bounds.height {
                    particle.pos.y = 0.0;
                }
            }
        }
        EdgePolicy::Bounce { restitution } => {
            // Keep the whole disc inside; a disc wider than the surface sits centred
            let radius = particle.radius();
            let rx = radius.min(bounds.width * 0.5);
            let ry = radius.min(bounds.height * 0.5);
            if particle.pos.x < rx {
                particle.pos.x = rx;
                particle.vel.x = particle.vel.x.abs() * restitution;
            } else if particle.pos.x > bounds.width - rx {
                particle.pos.x = bounds.width - rx;
                particle.vel.x = -particle.vel.x.abs() * restitution;
            }
            if particle.pos.y < ry {
                particle.pos.y = ry;
                particle.vel.y = particle.vel.y.abs() * restitution;
            } else if particle.pos.y > bounds.height - ry {
                particle.pos.y = bounds.height - ry;
                particle.vel.y = -particle.vel.y.abs() * restitution;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::force::{Drag, Gravity, Turn};
    use crate::sim::particle::Fade;

    fn falling(pos: Vec2, vel: Vec2, gravity: f32, lifetime: f32) -> SpawnParams {
        SpawnParams {
            pos,
            vel,
            lifetime,
            forces: ForceParams {
                gravity: Gravity::Constant(gravity),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_kinematic_scenario() {
        let mut system = ParticleSystem::new(1);
        let id = system.spawn(falling(
            Vec2::new(100.0, 100.0),
            Vec2::new(0.0, -50.0),
            100.0,
            1.0,
        ));

        for _ in 0..9 {
            system.tick(0.1);
        }
        let p = system.get(id).expect("alive at 0.9 s");
        assert!((p.age - 0.9).abs() < 1e-4);
        let expected = 100.0 - 50.0 * 0.9 + 0.5 * 100.0 * 0.9 * 0.9;
        assert!((p.pos.y - expected).abs() < 1e-2, "y = {}", p.pos.y);
        assert!((p.pos.x - 100.0).abs() < 1e-6);

        system.tick(0.1);
        assert!(system.get(id).is_none());
        assert!(system.is_empty());
    }

    #[test]
    fn test_ids_unique_and_stable_across_removal() {
        let mut system = ParticleSystem::new(7);
        let short = system.spawn(SpawnParams {
            lifetime: 0.05,
            ..Default::default()
        });
        let long = system.spawn(SpawnParams {
            lifetime: 5.0,
            ..Default::default()
        });
        assert_ne!(short, long);
        system.tick(0.1);
        assert!(system.get(short).is_none());
        assert_eq!(system.get(long).map(|p| p.id), Some(long));
        let newer = system.spawn(SpawnParams::default());
        assert_ne!(newer, long);
        assert_ne!(newer, short);
    }

    #[test]
    fn test_lifetime_clamped_positive() {
        let mut system = ParticleSystem::new(1);
        let id = system.spawn(SpawnParams {
            lifetime: -3.0,
            ..Default::default()
        });
        assert_eq!(system.get(id).map(|p| p.lifetime), Some(MIN_LIFETIME));
    }

    #[test]
    fn test_cull_beyond_margin() {
        let mut system = ParticleSystem::new(1).with_bounds(Bounds::new(
            100.0,
            100.0,
            EdgePolicy::Cull { margin: 20.0 },
        ));
        let inside = system.spawn(SpawnParams {
            pos: Vec2::new(115.0, 50.0),
            lifetime: 10.0,
            ..Default::default()
        });
        let outside = system.spawn(SpawnParams {
            pos: Vec2::new(125.0, 50.0),
            lifetime: 10.0,
            ..Default::default()
        });
        system.tick(0.016);
        assert!(system.get(inside).is_some());
        assert!(system.get(outside).is_none());
    }

    #[test]
    fn test_wrap_and_bounce_stay_inside() {
        let mut wrap = ParticleSystem::new(1).with_bounds(Bounds::new(100.0, 100.0, EdgePolicy::Wrap));
        let id = wrap.spawn(SpawnParams {
            pos: Vec2::new(99.0, 50.0),
            vel: Vec2::new(100.0, 0.0),
            lifetime: 10.0,
            ..Default::default()
        });
        wrap.tick(0.05);
        assert_eq!(wrap.get(id).map(|p| p.pos.x), Some(0.0));

        let mut bounce = ParticleSystem::new(1).with_bounds(Bounds::new(
            100.0,
            100.0,
            EdgePolicy::Bounce { restitution: 0.4 },
        ));
        let id = bounce.spawn(SpawnParams {
            pos: Vec2::new(1.0, 50.0),
            vel: Vec2::new(-100.0, 0.0),
            size: 10.0,
            lifetime: 10.0,
            ..Default::default()
        });
        bounce.tick(0.05);
        let p = bounce.get(id).expect("bounced");
        assert_eq!(p.pos.x, 5.0);
        assert!((p.vel.x - 40.0).abs() < 1e-3);

        // The far edge keeps the disc flush with the surface, not a diameter short
        let id = bounce.spawn(SpawnParams {
            pos: Vec2::new(94.0, 50.0),
            vel: Vec2::new(100.0, 0.0),
            size: 10.0,
            lifetime: 10.0,
            ..Default::default()
        });
        bounce.tick(0.05);
        let p = bounce.get(id).expect("bounced");
        assert_eq!(p.pos.x, 95.0);
        assert!(p.vel.x < 0.0);
    }

    #[test]
    fn test_explode_then_swim() {
        let mut system = ParticleSystem::new(1);
        let id = system.spawn(SpawnParams {
            vel: Vec2::new(300.0, 0.0),
            lifetime: 3.0,
            freq: 4.0,
            forces: ForceParams {
                drag: Drag::Exponential(3.0),
                turn: Some(Turn {
                    turn_rate: 2.0,
                    swim_speed: 60.0,
                    swim_drag: Drag::Linear(0.5),
                    swim_after: 0.25,
                }),
                ..Default::default()
            },
            ..Default::default()
        });
        system.tick(0.1);
        assert_eq!(system.get(id).map(|p| p.stage), Some(Stage::Explode));
        for _ in 0..3 {
            system.tick(0.1);
        }
        let p = system.get(id).expect("swimming");
        assert_eq!(p.stage, Stage::Swim);
        // Snapped to cruise speed, then one step of swim drag
        assert!((p.vel.length() - 57.0).abs() < 0.5, "speed {}", p.vel.length());

        // Swim drag keeps slowing the cruise speed
        for _ in 0..10 {
            system.tick(0.05);
        }
        let p = system.get(id).expect("swimming");
        let expected = 57.0 * (1.0 - 0.5 * 0.05f32).powi(10);
        assert!((p.vel.length() - expected).abs() < 0.5, "speed {}", p.vel.length());
    }

    #[test]
    fn test_alive_until_age_reaches_lifetime() {
        let mut system = ParticleSystem::new(1);
        let id = system.spawn(SpawnParams {
            lifetime: 1.0,
            ..Default::default()
        });
        system.tick(1.0 - 5.0e-5);
        let p = system.get(id).expect("alive just before its lifetime");
        assert!(p.age < p.lifetime);
        system.tick(5.0e-5);
        assert!(system.get(id).is_none());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut system = ParticleSystem::with_capacity(1, 3);
        let first = system.spawn(SpawnParams::default());
        for _ in 0..3 {
            system.spawn(SpawnParams::default());
        }
        assert_eq!(system.len(), 3);
        assert!(system.get(first).is_none());
        assert_eq!(system.spawned_total(), 4);
    }

    #[test]
    fn test_hit_test_and_pop() {
        let mut system = ParticleSystem::new(1);
        let id = system.spawn(SpawnParams {
            pos: Vec2::new(50.0, 50.0),
            size: 40.0,
            lifetime: 10.0,
            ..Default::default()
        });
        assert_eq!(system.hit_test(Vec2::new(60.0, 55.0)), Some(id));
        assert_eq!(system.hit_test(Vec2::new(0.0, 0.0)), None);
        let popped = system.pop(id).expect("popped");
        assert_eq!(popped.pos, Vec2::new(50.0, 50.0));
        assert!(system.is_empty());
    }

    #[test]
    fn test_fade_complete_at_death() {
        let mut system = ParticleSystem::new(1);
        let id = system.spawn(SpawnParams {
            lifetime: 1.0,
            fade: Fade::Linear,
            ..Default::default()
        });
        for _ in 0..19 {
            system.tick(0.05);
        }
        let p = system.get(id).expect("still alive");
        assert!(p.opacity < 0.06);
    }

    #[test]
    fn test_non_positive_dt_is_ignored() {
        let mut system = ParticleSystem::new(1);
        let id = system.spawn(SpawnParams::default());
        system.tick(0.0);
        system.tick(-1.0);
        system.tick(f32::NAN);
        assert_eq!(system.get(id).map(|p| p.age), Some(0.0));
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut system = ParticleSystem::new(1);
        for _ in 0..10 {
            system.spawn(SpawnParams::default());
        }
        system.clear();
        assert!(system.is_empty());
        assert!(system.pressure().is_empty());
    }
}
