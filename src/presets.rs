//! Transform parameters and the named voice presets.
//!
//! A preset is nothing more than a fixed `(pitch shift, speed factor)` pair
//! with a label. Pitch shift is measured in equal-tempered semitones
//! (12 semitones = one octave = a 2x frequency ratio); speed is a positive
//! multiplier on playback rate. The two are deliberately coupled into one
//! resampling rate downstream — see [`TransformParams::combined_rate`].

use serde::{Deserialize, Serialize};

/// Supported pitch-shift range in semitones (UI contract).
pub const PITCH_SEMITONES_RANGE: (f64, f64) = (-12.0, 12.0);
/// Supported speed-factor range (UI contract).
pub const SPEED_FACTOR_RANGE: (f64, f64) = (0.7, 1.3);

/// Pitch/speed parameters for one transform invocation.
///
/// The pipeline is defined for any finite values; the ranges above are a
/// product requirement enforced by callers, not by the transform itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformParams {
    /// Signed pitch shift in semitones; 0 leaves pitch unchanged.
    pub pitch_semitones: f64,
    /// Playback-rate multiplier; 1.0 leaves duration unchanged.
    pub speed_factor: f64,
}

impl TransformParams {
    /// Creates a parameter pair.
    pub const fn new(pitch_semitones: f64, speed_factor: f64) -> Self {
        Self {
            pitch_semitones,
            speed_factor,
        }
    }

    /// Frequency ratio for the pitch shift: `2^(semitones / 12)`.
    pub fn pitch_ratio(&self) -> f64 {
        (self.pitch_semitones / 12.0).exp2()
    }

    /// The single resampling rate the render step uses:
    /// `speed_factor * pitch_ratio()`.
    ///
    /// Pitch and tempo are entangled through this one rate; only the speed
    /// factor sets the output window length.
    pub fn combined_rate(&self) -> f64 {
        self.speed_factor * self.pitch_ratio()
    }

    /// Returns the parameters clamped to the supported UI ranges.
    pub fn clamped(&self) -> Self {
        Self {
            pitch_semitones: self
                .pitch_semitones
                .clamp(PITCH_SEMITONES_RANGE.0, PITCH_SEMITONES_RANGE.1),
            speed_factor: self
                .speed_factor
                .clamp(SPEED_FACTOR_RANGE.0, SPEED_FACTOR_RANGE.1),
        }
    }

    /// Label used for filenames and message metadata: the matching preset's
    /// name, or `"custom"` when either parameter was hand-adjusted.
    pub fn label(&self) -> &'static str {
        VoicePreset::NAMED
            .iter()
            .find(|preset| preset.params() == *self)
            .map_or("custom", |preset| preset.label())
    }
}

impl Default for TransformParams {
    fn default() -> Self {
        VoicePreset::Original.params()
    }
}

/// The six predefined one-click voice presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VoicePreset {
    /// No change: (0, 1.0).
    Original,
    /// (-4, 0.95)
    DeepMale,
    /// (-2, 1.0)
    Male,
    /// (4, 1.05)
    Female,
    /// (6, 1.1)
    HighFemale,
    /// (-1, 0.9)
    Robotic,
}

impl VoicePreset {
    /// All named presets, in UI order.
    pub const NAMED: [VoicePreset; 6] = [
        VoicePreset::Original,
        VoicePreset::DeepMale,
        VoicePreset::Male,
        VoicePreset::Female,
        VoicePreset::HighFemale,
        VoicePreset::Robotic,
    ];

    /// The fixed parameter pair this preset stands for.
    pub const fn params(&self) -> TransformParams {
        match self {
            VoicePreset::Original => TransformParams::new(0.0, 1.0),
            VoicePreset::DeepMale => TransformParams::new(-4.0, 0.95),
            VoicePreset::Male => TransformParams::new(-2.0, 1.0),
            VoicePreset::Female => TransformParams::new(4.0, 1.05),
            VoicePreset::HighFemale => TransformParams::new(6.0, 1.1),
            VoicePreset::Robotic => TransformParams::new(-1.0, 0.9),
        }
    }

    /// Kebab-case label, as used in upload metadata.
    pub const fn label(&self) -> &'static str {
        match self {
            VoicePreset::Original => "original",
            VoicePreset::DeepMale => "deep-male",
            VoicePreset::Male => "male",
            VoicePreset::Female => "female",
            VoicePreset::HighFemale => "high-female",
            VoicePreset::Robotic => "robotic",
        }
    }

    /// Resolves a label back to a preset; unknown labels (including
    /// `"custom"`) return `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::NAMED.iter().copied().find(|p| p.label() == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_table_is_exact() {
        assert_eq!(VoicePreset::Original.params(), TransformParams::new(0.0, 1.0));
        assert_eq!(VoicePreset::DeepMale.params(), TransformParams::new(-4.0, 0.95));
        assert_eq!(VoicePreset::Male.params(), TransformParams::new(-2.0, 1.0));
        assert_eq!(VoicePreset::Female.params(), TransformParams::new(4.0, 1.05));
        assert_eq!(VoicePreset::HighFemale.params(), TransformParams::new(6.0, 1.1));
        assert_eq!(VoicePreset::Robotic.params(), TransformParams::new(-1.0, 0.9));
    }

    #[test]
    fn pitch_ratio_follows_equal_temperament() {
        let octave_up = TransformParams::new(12.0, 1.0);
        let octave_down = TransformParams::new(-12.0, 1.0);
        assert!((octave_up.pitch_ratio() - 2.0).abs() < 1e-12);
        assert!((octave_down.pitch_ratio() - 0.5).abs() < 1e-12);
        assert_eq!(TransformParams::new(0.0, 1.0).pitch_ratio(), 1.0);
    }

    #[test]
    fn combined_rate_couples_pitch_and_speed() {
        let params = TransformParams::new(12.0, 0.9);
        assert!((params.combined_rate() - 1.8).abs() < 1e-12);
    }

    #[test]
    fn labels_round_trip_and_custom_falls_through() {
        for preset in VoicePreset::NAMED {
            assert_eq!(VoicePreset::from_label(preset.label()), Some(preset));
            assert_eq!(preset.params().label(), preset.label());
        }
        assert_eq!(VoicePreset::from_label("custom"), None);
        assert_eq!(TransformParams::new(1.5, 1.0).label(), "custom");
    }

    #[test]
    fn clamped_enforces_the_ui_ranges() {
        let wild = TransformParams::new(40.0, 0.1);
        let clamped = wild.clamped();
        assert_eq!(clamped.pitch_semitones, 12.0);
        assert_eq!(clamped.speed_factor, 0.7);

        let in_range = TransformParams::new(-3.0, 1.2);
        assert_eq!(in_range.clamped(), in_range);
    }

    #[test]
    fn preset_serde_uses_kebab_case_labels() {
        let json = serde_json::to_string(&VoicePreset::HighFemale).unwrap();
        assert_eq!(json, "\"high-female\"");
        let back: VoicePreset = serde_json::from_str(&json).unwrap();
        assert_eq!(back, VoicePreset::HighFemale);
    }
}
