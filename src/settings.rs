//! Game settings and preferences
//!
//! Persisted separately from game saves in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::platform::storage;
use crate::sim::RunOptions;

/// Latency calibration limit (either direction)
pub const MAX_INPUT_OFFSET_MS: f64 = 200.0;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    /// Maximum particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 64,
            QualityPreset::Medium => 256,
            QualityPreset::High => 512,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Screen shake on impacts
    pub screen_shake: bool,
    /// Particle effects (hit bursts, debris, data)
    pub particles: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Beat clicks while rhythm mode is on
    pub metronome: bool,

    // === Gameplay ===
    /// Latency calibration added to rhythm inputs (ms)
    pub input_offset_ms: f64,
    /// Show the tutorial on new runs
    pub tutorial_enabled: bool,

    // === Accessibility ===
    /// Reduced motion (no shake)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            screen_shake: true,
            particles: true,

            master_volume: 0.8,
            sfx_volume: 1.0,
            metronome: true,

            input_offset_ms: 0.0,
            tutorial_enabled: true,

            reduced_motion: false,
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

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Set the latency calibration, clamped to the supported range
    pub fn set_input_offset(&mut self, ms: f64) {
        self.input_offset_ms = ms.clamp(-MAX_INPUT_OFFSET_MS, MAX_INPUT_OFFSET_MS);
    }

    /// Clamp values that may come from an older or hand-edited store
    pub fn sanitize(&mut self) {
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        self.set_input_offset(self.input_offset_ms);
    }

    /// Parse settings sent by the host page, clamped to valid ranges
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    /// Options for a new run
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            tutorial: self.tutorial_enabled,
            input_offset_ms: self.input_offset_ms,
            ..RunOptions::default()
        }
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "barcode_settings";

    /// Load settings from LocalStorage (defaults when absent or unreadable)
    pub fn load() -> Self {
        match storage::load_json::<Settings>(Self::STORAGE_KEY) {
            Ok(mut settings) => {
                settings.sanitize();
                log::info!("Loaded settings from LocalStorage");
                settings
            }
            Err(crate::persistence::PersistError::Missing) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Settings unreadable ({}), using defaults", e);
                Self::default()
            }
        }
    }

    /// Save settings to LocalStorage
    pub fn save(&self) {
        match storage::save_json(Self::STORAGE_KEY, self) {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Failed to save settings: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particle_caps() {
        assert_eq!(Settings::from_preset(QualityPreset::Low).max_particles(), 64);
        assert_eq!(Settings::default().max_particles(), 256);
        assert_eq!(Settings::from_preset(QualityPreset::High).max_particles(), 512);

        let settings = Settings {
            particles: false,
            ..Settings::default()
        };
        assert_eq!(settings.max_particles(), 0);
    }

    #[test]
    fn test_reduced_motion_disables_shake() {
        let mut settings = Settings::default();
        assert!(settings.effective_screen_shake());
        settings.reduced_motion = true;
        assert!(!settings.effective_screen_shake());
    }

    #[test]
    fn test_offset_clamped() {
        let mut settings = Settings::default();
        settings.set_input_offset(-350.0);
        assert_eq!(settings.input_offset_ms, -MAX_INPUT_OFFSET_MS);
        settings.set_input_offset(35.0);
        assert_eq!(settings.run_options().input_offset_ms, 35.0);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"quality":"High","master_volume":3.0}"#).unwrap();
        assert_eq!(settings.quality, QualityPreset::High);
        assert!(settings.metronome);

        let mut settings = settings;
        settings.sanitize();
        assert_eq!(settings.master_volume, 1.0);
    }

    #[test]
    fn test_from_json_sanitizes() {
        let settings =
            Settings::from_json(r#"{"input_offset_ms":900.0,"sfx_volume":-1.0,"metronome":false}"#).unwrap();
        assert_eq!(settings.input_offset_ms, MAX_INPUT_OFFSET_MS);
        assert_eq!(settings.sfx_volume, 0.0);
        assert!(!settings.metronome);
        assert_eq!(settings.quality, QualityPreset::Medium);

        assert!(Settings::from_json("not json").is_err());
    }

    #[test]
    fn test_run_options_follow_tutorial_flag() {
        let settings = Settings {
            tutorial_enabled: false,
            ..Settings::default()
        };
        let options = settings.run_options();
        assert!(!options.tutorial);
        assert!(!options.skip_intro);
    }
}
