//! Effect settings and preferences
//!
//! Persisted in LocalStorage as JSON. Quality scales particle caps and burst
//! sizes; the accessibility flags soften the slime field.

use serde::{Deserialize, Serialize};

use crate::effects::SlimeTuning;
use crate::error::Result;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum live particles per system for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 400,
            QualityPreset::Medium => 1200,
            QualityPreset::High => 3000,
        }
    }

    /// Burst count multiplier (1.0 = full)
    pub fn burst_scale(&self) -> f32 {
        match self {
            QualityPreset::Low => 0.5,
            QualityPreset::Medium => 0.8,
            QualityPreset::High => 1.0,
        }
    }

    /// Ambient population multiplier (slime bubbles, floating bubbles)
    pub fn population_scale(&self) -> f32 {
        match self {
            QualityPreset::Low => 0.6,
            QualityPreset::Medium => 1.0,
            QualityPreset::High => 1.0,
        }
    }
}

/// User preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Effects ===
    /// Burst particles on clicks/pops
    pub particles: bool,
    /// Draw pressure imprints under the slime field
    pub show_imprints: bool,

    // === Audio ===
    /// Pop sounds
    pub sound: bool,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,

    // === Accessibility ===
    /// Slower, calmer motion
    pub reduced_motion: bool,
    /// Touch-first device (wider pointer reach)
    pub coarse_pointer: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            particles: true,
            show_imprints: false,
            sound: true,
            sfx_volume: 0.8,
            reduced_motion: false,
            coarse_pointer: false,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Apply a quality preset; Low also drops the imprint overlay
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;
        if preset == QualityPreset::Low {
            self.show_imprints = false;
        }
    }

    /// Effective particle cap per system
    pub fn max_particles(&self) -> usize {
        self.quality.max_particles()
    }

    /// Effective burst count multiplier (0 when bursts are off)
    pub fn burst_scale(&self) -> f32 {
        if self.particles {
            self.quality.burst_scale()
        } else {
            0.0
        }
    }

    /// Effective sound volume (0 when muted)
    pub fn effective_volume(&self) -> f32 {
        if self.sound {
            self.sfx_volume.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Slime tuning for the current accessibility flags
    pub fn slime_tuning(&self) -> SlimeTuning {
        SlimeTuning::for_environment(self.coarse_pointer, self.reduced_motion)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// LocalStorage key
    pub const STORAGE_KEY: &'static str = "fidget_fx_settings";

    /// Load settings from LocalStorage, falling back to defaults
    pub fn load() -> Self {
        if let Some(json) = crate::platform::storage_get(Self::STORAGE_KEY) {
            match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring stored settings: {e}"),
            }
        }
        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (no-op natively)
    pub fn save(&self) {
        match self.to_json() {
            Ok(json) => {
                if crate::platform::storage_set(Self::STORAGE_KEY, &json) {
                    log::info!("Settings saved");
                }
            }
            Err(e) => log::warn!("Failed to serialize settings: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_roundtrip() {
        let mut settings = Settings::from_preset(QualityPreset::High);
        settings.reduced_motion = true;
        settings.sfx_volume = 0.25;
        let json = settings.to_json().expect("serialize");
        assert_eq!(Settings::from_json(&json).expect("parse"), settings);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings = Settings::from_json(r#"{"quality":"Low"}"#).expect("parse");
        assert_eq!(settings.quality, QualityPreset::Low);
        assert!(settings.particles);
        assert!(Settings::from_json("not json").is_err());
    }

    #[test]
    fn test_preset_caps_increase_with_quality() {
        assert!(QualityPreset::Low.max_particles() < QualityPreset::Medium.max_particles());
        assert!(QualityPreset::Medium.max_particles() < QualityPreset::High.max_particles());
        assert_eq!(QualityPreset::parse("MED"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::parse("ultra"), None);
    }

    #[test]
    fn test_low_preset_drops_imprint_overlay() {
        let mut settings = Settings::from_preset(QualityPreset::High);
        settings.show_imprints = true;
        settings.apply_preset(QualityPreset::Medium);
        assert!(settings.show_imprints);
        settings.apply_preset(QualityPreset::Low);
        assert_eq!(settings.quality, QualityPreset::Low);
        assert!(!settings.show_imprints);
        assert_eq!(settings.burst_scale(), 0.5);
    }

    #[test]
    fn test_switches_zero_out_scales() {
        let mut settings = Settings::default();
        settings.particles = false;
        settings.sound = false;
        assert_eq!(settings.burst_scale(), 0.0);
        assert_eq!(settings.effective_volume(), 0.0);
    }

    #[test]
    fn test_native_storage_is_inert() {
        Settings::default().save();
        assert_eq!(Settings::load(), Settings::default());
    }
}
