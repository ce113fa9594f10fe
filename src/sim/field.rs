//! Pointer pressure field
//!
//! Pointer movement deposits decaying imprints at a bounded rate. Each imprint
//! pushes nearby particles with a Gaussian profile and fades geometrically.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::input::InputState;
use crate::consts::*;

/// A single decaying point of pressure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Imprint {
    pub pos: Vec2,
    pub radius: f32,
    /// 1 at deposit, decays toward 0
    pub life: f32,
}

/// Field tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PressureConfig {
    /// Maximum simultaneous imprints (oldest evicted first)
    pub cap: usize,
    /// Most recent imprints evaluated per particle
    pub samples: usize,
    /// Minimum seconds between deposits
    pub min_interval: f32,
    pub hover_radius: f32,
    pub down_radius: f32,
    /// `life` multiplier per reference frame
    pub decay: f32,
    /// `radius` multiplier per reference frame
    pub shrink: f32,
    /// Imprints below this life are removed
    pub threshold: f32,
    /// Force constant; positive pushes particles away from the imprint
    pub strength: f32,
    /// Gaussian sigma as a fraction of the radius
    pub sigma_scale: f32,
}

impl Default for PressureConfig {
    fn default() -> Self {
        Self {
            cap: IMPRINT_CAP,
            samples: IMPRINT_SAMPLES,
            min_interval: IMPRINT_MIN_INTERVAL,
            hover_radius: 90.0,
            down_radius: 140.0,
            decay: 0.92,
            shrink: 0.998,
            threshold: IMPRINT_THRESHOLD,
            strength: 0.045,
            sigma_scale: 0.6,
        }
    }
}

/// Bounded FIFO of decaying imprints
#[derive(Debug, Clone)]
pub struct PressureField {
    pub config: PressureConfig,
    imprints: VecDeque<Imprint>,
    /// Seconds since the last deposit
    since_deposit: f32,
    enabled: bool,
}

impl Default for PressureField {
    fn default() -> Self {
        Self::disabled()
    }
}

impl PressureField {
    pub fn new(config: PressureConfig) -> Self {
        Self {
            imprints: VecDeque::with_capacity(config.cap),
            config,
            since_deposit: f32::INFINITY,
            enabled: true,
        }
    }

    /// A field that never deposits
    pub fn disabled() -> Self {
        Self {
            config: PressureConfig::default(),
            imprints: VecDeque::new(),
            since_deposit: f32::INFINITY,
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn imprints(&self) -> impl Iterator<Item = &Imprint> {
        self.imprints.iter()
    }

    pub fn len(&self) -> usize {
        self.imprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.imprints.is_empty()
    }

    pub fn clear(&mut self) {
        self.imprints.clear();
        self.since_deposit = f32::INFINITY;
    }

    /// Push an imprint, evicting the oldest past the cap
    pub fn deposit(&mut self, pos: Vec2, radius: f32) {
        if self.config.cap == 0 || !pos.is_finite() {
            return;
        }
        while self.imprints.len() >= self.config.cap {
            self.imprints.pop_front();
        }
        self.imprints.push_back(Imprint {
            pos,
            radius,
            life: 1.0,
        });
    }

    /// Advance one tick: deposit from the pointer (rate-limited), then decay and cull
    pub fn advance(&mut self, dt: f32, input: &InputState) {
        if !self.enabled {
            return;
        }

        self.since_deposit += dt;
        if input.active && self.since_deposit >= self.config.min_interval {
            let radius = if input.down {
                self.config.down_radius
            } else {
                self.config.hover_radius
            };
            self.deposit(input.pointer, radius);
            self.since_deposit = 0.0;
        }

        // Per-frame rates rescaled so decay is independent of the frame rate
        let frames = dt / REFERENCE_DT;
        let decay = self.config.decay.powf(frames);
        let shrink = self.config.shrink.powf(frames);
        for imprint in self.imprints.iter_mut() {
            imprint.life *= decay;
            imprint.radius *= shrink;
        }
        let threshold = self.config.threshold;
        self.imprints.retain(|p| p.life >= threshold);
    }

    /// Acceleration at `pos` from the most recent imprints
    pub fn accel_at(&self, pos: Vec2) -> Vec2 {
        let mut accel = Vec2::ZERO;
        for imprint in self.imprints.iter().rev().take(self.config.samples) {
            let delta = pos - imprint.pos;
            let sigma = imprint.radius.max(IMPRINT_MIN_RADIUS) * self.config.sigma_scale;
            let inv_sigma2 = 1.0 / (sigma * sigma);
            let g = (-delta.length_squared() * 0.5 * inv_sigma2).exp();
            let k = self.config.strength * imprint.life * g * inv_sigma2;
            accel += delta * k;
        }
        accel
    }
}
