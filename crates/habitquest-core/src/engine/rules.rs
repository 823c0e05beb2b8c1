//! Tunable scoring rules.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Numeric rules for multiplier growth and decay.
///
/// Stored under `[rules]` in `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rules {
    /// Multiplier gain for a standard or overtime completion.
    #[serde(default = "default_step")]
    pub multiplier_step: f64,
    /// Multiplier loss for a failure.
    #[serde(default = "default_penalty")]
    pub fail_penalty: f64,
    #[serde(default = "default_min")]
    pub min_multiplier: f64,
    #[serde(default = "default_max")]
    pub max_multiplier: f64,
    /// How far back the global streak walk looks.
    #[serde(default = "default_lookback")]
    pub global_streak_lookback_days: u32,
}

fn default_step() -> f64 {
    0.2
}
fn default_penalty() -> f64 {
    0.4
}
fn default_min() -> f64 {
    0.2
}
fn default_max() -> f64 {
    10.0
}
fn default_lookback() -> u32 {
    365
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            multiplier_step: default_step(),
            fail_penalty: default_penalty(),
            min_multiplier: default_min(),
            max_multiplier: default_max(),
            global_streak_lookback_days: default_lookback(),
        }
    }
}

impl Rules {
    /// Reject rule sets that would break the multiplier bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| ConfigError::InvalidValue {
            key: format!("rules.{key}"),
            message: message.to_string(),
        };
        if !(self.multiplier_step.is_finite() && self.multiplier_step > 0.0) {
            return Err(invalid("multiplier_step", "must be a positive number"));
        }
        if !(self.fail_penalty.is_finite() && self.fail_penalty > 0.0) {
            return Err(invalid("fail_penalty", "must be a positive number"));
        }
        if !(self.min_multiplier.is_finite() && self.min_multiplier > 0.0) {
            return Err(invalid("min_multiplier", "must be a positive number"));
        }
        if !(self.min_multiplier <= super::BASE_MULTIPLIER && super::BASE_MULTIPLIER <= self.max_multiplier) {
            return Err(invalid(
                "max_multiplier",
                "min_multiplier <= 1.0 <= max_multiplier must hold",
            ));
        }
        Ok(())
    }

    /// Clamp to the configured bounds, keeping one decimal place.
    ///
    /// Never panics; with unvalidated bounds the upper one wins.
    pub fn clamp_multiplier(&self, value: f64) -> f64 {
        round1(value).max(self.min_multiplier).min(self.max_multiplier)
    }
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
