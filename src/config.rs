//! Engine configuration, loadable from YAML

use serde::Deserialize;

use crate::error::{GroveError, Result};
use crate::growth::GrowthParams;
use crate::interaction::PlacementRules;
use crate::music::Oscillator;

/// Parameters for note generation and arpeggio timing
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MusicParams {
    /// Frequency a branch of length 1.0 would sound at
    pub base_frequency: f32,
    /// Seconds between arpeggios once a tree is fully grown
    pub arpeggio_period: f64,
    /// Seconds between consecutive notes of one arpeggio
    pub step_delay: f64,
    /// Envelope attack handed to each node voice (seconds)
    pub attack: f32,
    pub default_scale: String,
    pub default_oscillator: Oscillator,
}

impl Default for MusicParams {
    fn default() -> Self {
        Self {
            base_frequency: 400.0,
            arpeggio_period: 10.0,
            step_delay: 0.2,
            attack: 0.5,
            default_scale: "diatonic".to_string(),
            default_oscillator: Oscillator::Pulse,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GroveConfig {
    pub growth: GrowthParams,
    pub music: MusicParams,
    pub placement: PlacementRules,
}

impl GroveConfig {
    /// Parse from YAML string; omitted fields keep their defaults
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: GroveConfig = serde_yaml::from_str(yaml)
            .map_err(|e| GroveError::Config(format!("YAML parse error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let growth = &self.growth;
        if growth.max_height == 0 {
            return Err(GroveError::Config("max_height must be at least 1".to_string()));
        }
        if !(growth.trunk_growth_rate > 0.0) || !(growth.branch_growth_rate > 0.0) {
            return Err(GroveError::Config("growth rates must be positive".to_string()));
        }
        if !(growth.min_length > 0.0) {
            return Err(GroveError::Config("min_length must be positive".to_string()));
        }
        if !(growth.resonance_decay >= 0.0) {
            return Err(GroveError::Config("resonance_decay cannot be negative".to_string()));
        }

        let music = &self.music;
        if !(music.base_frequency > 0.0 && music.base_frequency.is_finite()) {
            return Err(GroveError::Config("base_frequency must be a positive number".to_string()));
        }
        if !(music.arpeggio_period > 0.0 && music.arpeggio_period.is_finite()) {
            return Err(GroveError::Config("arpeggio_period must be positive".to_string()));
        }
        if !(music.step_delay >= 0.0 && music.step_delay.is_finite()) {
            return Err(GroveError::Config("step_delay cannot be negative".to_string()));
        }

        if !(self.placement.min_viewer_distance >= 0.0) {
            return Err(GroveError::Config("min_viewer_distance cannot be negative".to_string()));
        }
        Ok(())
    }
}
