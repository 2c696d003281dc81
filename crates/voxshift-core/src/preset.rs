//! Voice effect presets

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VoxError};

/// The fixed set of voice effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectKind {
    Robot,
    Deep,
    Chipmunk,
    Female,
    Male,
    Echo,
}

impl EffectKind {
    pub const ALL: [EffectKind; 6] = [
        Self::Robot,
        Self::Deep,
        Self::Chipmunk,
        Self::Female,
        Self::Male,
        Self::Echo,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Robot => "robot",
            Self::Deep => "deep",
            Self::Chipmunk => "chipmunk",
            Self::Female => "female",
            Self::Male => "male",
            Self::Echo => "echo",
        }
    }

    /// Name with the first letter upper-cased, as shown to users
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Robot => "Robot",
            Self::Deep => "Deep",
            Self::Chipmunk => "Chipmunk",
            Self::Female => "Female",
            Self::Male => "Male",
            Self::Echo => "Echo",
        }
    }

    pub fn preset(self) -> EffectPreset {
        let (pitch_factor, speed_factor, echo_mix, distortion) = match self {
            Self::Robot => (0.5, 0.8, 0.3, 0.7),
            Self::Deep => (0.3, 0.9, 0.1, 0.2),
            Self::Chipmunk => (2.0, 1.2, 0.0, 0.1),
            Self::Female => (1.3, 1.0, 0.1, 0.0),
            Self::Male => (0.7, 0.95, 0.1, 0.1),
            Self::Echo => (1.0, 1.0, 0.8, 0.0),
        };
        EffectPreset { pitch_factor, speed_factor, echo_mix, distortion }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EffectKind {
    type Err = VoxError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| VoxError::UnknownPreset(s.to_string()))
    }
}

/// Parameters for one effect application
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectPreset {
    /// Multiplier from output index to source index
    pub pitch_factor: f64,
    /// Output length is `input / speed_factor`
    pub speed_factor: f64,
    /// Gain of the single 300 ms echo tap
    pub echo_mix: f64,
    /// Carried for parity with the preset table; no code path applies it
    pub distortion: f64,
}

impl EffectPreset {
    /// Look up one of the six built-in presets by its lower-case name
    pub fn by_name(name: &str) -> Result<Self> {
        name.parse::<EffectKind>().map(EffectKind::preset)
    }

    pub fn custom(pitch_factor: f64, speed_factor: f64, echo_mix: f64, distortion: f64) -> Result<Self> {
        let preset = Self { pitch_factor, speed_factor, echo_mix, distortion };
        preset.validate()?;
        Ok(preset)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.pitch_factor.is_finite() && self.pitch_factor > 0.0) {
            return Err(VoxError::InvalidInput(format!("pitch factor {} must be positive", self.pitch_factor)));
        }
        if !(self.speed_factor.is_finite() && self.speed_factor > 0.0) {
            return Err(VoxError::InvalidInput(format!("speed factor {} must be positive", self.speed_factor)));
        }
        if !(0.0..=1.0).contains(&self.echo_mix) {
            return Err(VoxError::InvalidInput(format!("echo mix {} outside 0..=1", self.echo_mix)));
        }
        if !(0.0..=1.0).contains(&self.distortion) {
            return Err(VoxError::InvalidInput(format!("distortion {} outside 0..=1", self.distortion)));
        }
        Ok(())
    }
}
