//! Trace configuration
//!
//! Every tunable the tracer reads lives here and is passed into each pass
//! explicitly. Missing JSON fields fall back to the defaults in `consts`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{LightboxError, Result};
use crate::optics::material::{Media, OpticalMaterial};

/// Parameters for one trace pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    // === Budgets ===
    /// Total distance a ray lineage may travel
    pub max_distance: f32,
    /// Reflect/refract events per ray
    pub max_bounces: u32,
    /// Loop iterations per traced ray
    pub max_steps: u32,
    /// Look-ahead segment length
    pub probe_length: f32,

    // === Self-intersection guards ===
    pub emission_guard: f32,
    pub spawn_guard: f32,

    // === Energy floors ===
    /// Reflected/transmitted branches at or below this are dropped
    pub branch_floor: f32,
    /// Sensors ignore rays whose effective intensity is below this
    pub sensor_floor: f32,

    // === Materials ===
    /// Red-band index of the dielectric; other bands follow the dispersion curve
    pub dielectric_base_index: f32,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            max_distance: MAX_RAY_DISTANCE,
            max_bounces: MAX_BOUNCES,
            max_steps: MAX_TRACE_STEPS,
            probe_length: PROBE_LENGTH,

            emission_guard: EMISSION_GUARD,
            spawn_guard: SPAWN_GUARD,

            branch_floor: BRANCH_FLOOR,
            sensor_floor: SENSOR_FLOOR,

            dielectric_base_index: DIELECTRIC_BASE_INDEX,
        }
    }
}

impl TraceConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a config file, falling back to defaults when it is missing or bad
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path)
            .map_err(LightboxError::from)
            .and_then(|json| Self::from_json(&json))
        {
            Ok(config) => {
                log::info!("Loaded trace config from {}", path.display());
                config
            }
            Err(err) => {
                log::warn!("Using default trace config ({}: {err})", path.display());
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the tracer cannot work with
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [("max_distance", self.max_distance), ("probe_length", self.probe_length)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(LightboxError::NonPositive(field, value));
            }
        }
        OpticalMaterial::dielectric(self.dielectric_base_index)?;
        Ok(())
    }

    /// Ambient/dielectric pair for a trace pass
    pub fn media(&self) -> Result<Media> {
        Media::new(self.dielectric_base_index)
    }

    /// Apply a slider value for the dielectric base index (clamped to the
    /// customization range)
    pub fn set_dielectric_base(&mut self, base: f32) {
        self.dielectric_base_index = OpticalMaterial::clamp_base(base);
    }
}
