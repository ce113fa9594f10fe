//! Slime bubble field tuning
//!
//! Coefficients are authored per animation step; a step advances
//! `time_scale` units and there are 60 of them per second. The `*_per_s`
//! helpers convert to the engine's seconds-based units.

use serde::{Deserialize, Serialize};

use crate::sim::{Drag, ForceParams, PointerPull, PressureConfig};

const STEPS_PER_SECOND: f32 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlimeTuning {
    pub bubble_count: usize,
    pub min_size: f32,
    pub max_size: f32,
    pub time_scale: f32,
    pub home_k: f32,
    pub pointer_k_idle: f32,
    pub pointer_k_down: f32,
    /// Velocity multiplier per unit of time
    pub damping: f32,
    pub jitter: f32,
    /// Pointer reach
    pub radius: f32,
    /// Pointer pull is strongest inside this distance
    pub min_gap: f32,
    pub max_speed: f32,
    pub restitution: f32,
    pub pressure: PressureConfig,
}

impl Default for SlimeTuning {
    fn default() -> Self {
        Self {
            bubble_count: 240,
            min_size: 5.0,
            max_size: 15.0,
            time_scale: 0.45,
            home_k: 0.002,
            pointer_k_idle: 0.008,
            pointer_k_down: 0.02,
            damping: 0.96,
            jitter: 0.0006,
            radius: 180.0,
            min_gap: 70.0,
            max_speed: 0.7,
            restitution: 0.4,
            pressure: PressureConfig::default(),
        }
    }
}

impl SlimeTuning {
    /// Tuning adjusted for touch devices and reduced-motion users
    pub fn for_environment(coarse_pointer: bool, reduced_motion: bool) -> Self {
        let mut tuning = Self::default();
        if coarse_pointer {
            tuning.time_scale = 0.40;
            tuning.radius = 220.0;
            tuning.min_gap = 90.0;
            tuning.max_speed = 0.6;
        }
        if reduced_motion {
            tuning.time_scale *= 0.6;
            tuning.max_speed *= 0.7;
            tuning.jitter *= 0.5;
        }
        tuning
    }

    /// Simulation time units per second
    pub fn rate(&self) -> f32 {
        STEPS_PER_SECOND * self.time_scale
    }

    /// Multiplier turning per-unit² accelerations into per-second²
    pub fn accel_scale(&self) -> f32 {
        self.rate() * self.rate()
    }

    pub fn max_speed_per_s(&self) -> f32 {
        self.max_speed * self.rate()
    }

    /// Force parameters shared by every slime bubble
    pub fn forces(&self) -> ForceParams {
        let accel = self.accel_scale();
        ForceParams {
            drag: Drag::Exponential(-self.damping.max(f32::MIN_POSITIVE).ln() * self.rate()),
            pointer: Some(PointerPull {
                k_hover: self.pointer_k_idle * accel,
                k_down: self.pointer_k_down * accel,
                inner: self.min_gap,
                outer: self.radius,
                max_accel: self.max_speed_per_s() * self.rate(),
            }),
            home_k: self.home_k * accel,
            jitter: self.jitter * accel,
            pressure: accel,
            max_speed: Some(self.max_speed_per_s()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_adjustments() {
        let base = SlimeTuning::for_environment(false, false);
        assert_eq!(base, SlimeTuning::default());

        let coarse = SlimeTuning::for_environment(true, false);
        assert_eq!(coarse.radius, 220.0);
        assert_eq!(coarse.min_gap, 90.0);

        let calm = SlimeTuning::for_environment(false, true);
        assert!((calm.time_scale - 0.27).abs() < 1e-6);
        assert!((calm.max_speed - 0.49).abs() < 1e-6);
        assert!((calm.jitter - 0.0003).abs() < 1e-9);
    }

    #[test]
    fn test_unit_conversion() {
        let tuning = SlimeTuning::default();
        assert!((tuning.rate() - 27.0).abs() < 1e-4);
        assert!((tuning.max_speed_per_s() - 18.9).abs() < 1e-3);
        let forces = tuning.forces();
        // 0.96 per unit at 27 units/s
        let factor = forces.drag.factor(1.0);
        assert!((factor - 0.96f32.powf(27.0)).abs() < 1e-4);
        assert_eq!(forces.max_speed, Some(tuning.max_speed_per_s()));
    }
}
