//! Ocean wave bands
//!
//! Horizontal sine bands that roll continuously and swell when the pointer
//! passes near them. Swelling bands throw spray particles into the system.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::REFERENCE_DT;

pub const WAVE_COUNT: usize = 15;
/// Pointer distance (vertical) that agitates a band
pub const AGITATE_DISTANCE: f32 = 50.0;
/// Spray particles thrown per agitation
pub const SPRAY_PER_AGITATION: usize = 10;
/// Fraction of the swell released per reference frame
const SETTLE_RATE: f32 = 0.1;
/// Horizontal step between polyline samples
const SAMPLE_STEP: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveBand {
    pub y_offset: f32,
    pub amplitude: f32,
    pub rest_amplitude: f32,
    /// Radians per unit x
    pub frequency: f32,
    pub phase: f32,
    /// Radians per second
    pub speed: f32,
}

impl WaveBand {
    pub fn random(rng: &mut Pcg32, height: f32) -> Self {
        Self {
            y_offset: rng.random::<f32>() * height,
            amplitude: 15.0 + rng.random::<f32>() * 20.0,
            rest_amplitude: 15.0 + rng.random::<f32>() * 20.0,
            frequency: 0.02 + rng.random::<f32>() * 0.03,
            phase: rng.random::<f32>() * std::f32::consts::TAU,
            speed: (0.02 + rng.random::<f32>() * 0.03) / REFERENCE_DT,
        }
    }

    /// Surface height at `x`
    pub fn y_at(&self, x: f32) -> f32 {
        self.y_offset + (x * self.frequency + self.phase).sin() * self.amplitude
    }

    /// Roll the phase and settle the amplitude back toward rest
    pub fn advance(&mut self, dt: f32) {
        self.phase = (self.phase + self.speed * dt).rem_euclid(std::f32::consts::TAU);
        let keep = (1.0 - SETTLE_RATE).powf(dt / REFERENCE_DT);
        self.amplitude = self.rest_amplitude + (self.amplitude - self.rest_amplitude) * keep;
    }

    pub fn near(&self, y: f32) -> bool {
        (self.y_offset - y).abs() < AGITATE_DISTANCE
    }

    /// Double the swell
    pub fn agitate(&mut self) {
        self.amplitude = self.rest_amplitude * 2.0;
    }

    /// Sample the band across `width` into `out` (cleared first)
    pub fn sample_into(&self, width: f32, out: &mut Vec<Vec2>) {
        out.clear();
        let steps = (width / SAMPLE_STEP).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let x = (i as f32 * SAMPLE_STEP).min(width);
            out.push(Vec2::new(x, self.y_at(x)));
        }
    }
}

pub fn random_bands(rng: &mut Pcg32, height: f32) -> Vec<WaveBand> {
    (0..WAVE_COUNT).map(|_| WaveBand::random(rng, height)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_agitated_band_settles_back() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut band = WaveBand::random(&mut rng, 600.0);
        band.agitate();
        assert!((band.amplitude - band.rest_amplitude * 2.0).abs() < 1e-5);
        for _ in 0..120 {
            band.advance(REFERENCE_DT);
        }
        assert!((band.amplitude - band.rest_amplitude).abs() < 1e-3);
    }

    #[test]
    fn test_bands_within_height() {
        let mut rng = Pcg32::seed_from_u64(1);
        let bands = random_bands(&mut rng, 400.0);
        assert_eq!(bands.len(), WAVE_COUNT);
        for band in &bands {
            assert!((0.0..=400.0).contains(&band.y_offset));
            assert!((15.0..=35.0).contains(&band.amplitude));
        }
    }

    #[test]
    fn test_sampling_spans_width() {
        let band = WaveBand {
            y_offset: 100.0,
            amplitude: 0.0,
            rest_amplitude: 0.0,
            frequency: 0.03,
            phase: 0.0,
            speed: 1.0,
        };
        let mut points = Vec::new();
        band.sample_into(10.0, &mut points);
        assert_eq!(points.first(), Some(&Vec2::new(0.0, 100.0)));
        assert_eq!(points.last(), Some(&Vec2::new(10.0, 100.0)));
        assert!(band.near(140.0));
        assert!(!band.near(151.0));
    }
}
