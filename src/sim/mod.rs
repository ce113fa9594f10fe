//! Particle simulation module
//!
//! All simulation logic lives here. This module has no rendering or platform
//! dependencies:
//! - Variable timestep, clamped by the caller
//! - Seeded RNG per system instance
//! - Particles are independent; update order never affects the outcome

pub mod field;
pub mod force;
pub mod input;
pub mod particle;
pub mod spawn;
pub mod system;

pub use field::{Imprint, PressureConfig, PressureField};
pub use force::{Drag, ForceParams, Gravity, PointerPull, Swirl, Turn};
pub use input::InputState;
pub use particle::{Fade, Particle, ParticleId, Rgba, SpawnParams, Stage};
pub use spawn::{BurstShot, BurstSpawner, PeriodicSpawner, SpawnOrigin};
pub use system::{Bounds, EdgePolicy, ParticleSystem};
