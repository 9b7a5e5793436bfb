//! Engine configuration
//!
//! Engine-wide knobs only. Mechanic tunables (radii, distances, action ids)
//! belong to each component instance and live in the encounter definition.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::arena::MIN_SAMPLE_STEP;
use crate::serde_defaults::{default_safe_spot_step, default_true};

const APP_NAME: &str = "waymark";
const CONFIG_NAME: &str = "engine";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Grid spacing used when checking that a zone leaves a safe spot
    #[serde(default = "default_safe_spot_step")]
    pub safe_spot_step: f32,

    /// Drop zones that cover every sampled in-bounds point
    #[serde(default = "default_true")]
    pub drop_unsafe_zones: bool,

    /// Report zones past their deadline (flagged expired) instead of hiding them
    #[serde(default = "default_true")]
    pub report_expired_zones: bool,

    /// Log the first time a component references an actor that left the world
    #[serde(default = "default_true")]
    pub warn_missing_actors: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            safe_spot_step: default_safe_spot_step(),
            drop_unsafe_zones: true,
            report_expired_zones: true,
            warn_missing_actors: true,
        }
    }
}

/// Errors during configuration persistence
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration")]
    Load(#[source] confy::ConfyError),

    #[error("failed to save configuration")]
    Save(#[source] confy::ConfyError),

    #[error("safe spot step must be at least 0.25, got {0}")]
    InvalidStep(f32),
}

// ─────────────────────────────────────────────────────────────────────────────
// EngineConfig Extensions
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for EngineConfig persistence
pub trait EngineConfigExt: Sized {
    /// Load the stored config, falling back to defaults when missing or unreadable
    fn load() -> Self;
    fn try_load() -> Result<Self, ConfigError>;
    fn save(&self) -> Result<(), ConfigError>;
    fn validate(&self) -> Result<(), ConfigError>;
}

impl EngineConfigExt for EngineConfig {
    fn load() -> Self {
        match Self::try_load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Using default engine config");
                Self::default()
            }
        }
    }

    fn try_load() -> Result<Self, ConfigError> {
        let config: Self = confy::load(APP_NAME, CONFIG_NAME).map_err(ConfigError::Load)?;
        config.validate()?;
        Ok(config)
    }

    fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, CONFIG_NAME, self).map_err(ConfigError::Save)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.safe_spot_step.is_finite() && self.safe_spot_step >= MIN_SAMPLE_STEP {
            Ok(())
        } else {
            Err(ConfigError::InvalidStep(self.safe_spot_step))
        }
    }
}
