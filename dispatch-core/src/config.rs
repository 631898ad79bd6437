//! Typed, validated runtime configuration.
//!
//! Loaded from a TOML file and/or `DISPATCH_*` environment overrides via the
//! `config` crate; every field has a default so a bare `DispatchConfig::default()`
//! is already a runnable configuration. [`DispatchConfig::validate`] is the
//! single gate construction must pass through before the rest of the crate
//! trusts these values — a violation is fatal (`ConfigurationError`), never
//! recovered mid-run.

use crate::error::DispatchError;
use guarantee_predictor::PredictorConfig;
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct DispatchConfig {
    #[serde(default = "default_batch_window_minutes")]
    pub batch_window_minutes: u64,
    #[serde(default = "default_agent_speed_kmph")]
    pub agent_speed_kmph: f64,
    #[serde(default = "default_prep_time_minutes")]
    pub prep_time_minutes: f64,
    #[serde(default = "default_pay_per_hour")]
    pub pay_per_hour: f64,
    #[serde(default = "default_min_wage")]
    pub min_wage: f64,
    #[serde(default = "default_initial_omega")]
    pub initial_omega: f64,
    #[serde(default = "default_omega_min")]
    pub omega_min: f64,
    #[serde(default = "default_omega_max")]
    pub omega_max: f64,
    #[serde(default = "default_omega_smoothing_alpha")]
    pub omega_smoothing_alpha: f64,
    #[serde(default = "default_omega_history_cap")]
    pub omega_history_cap: usize,
    #[serde(default)]
    pub carry_forward_pending: bool,
}

fn default_batch_window_minutes() -> u64 {
    3
}
fn default_agent_speed_kmph() -> f64 {
    25.0
}
fn default_prep_time_minutes() -> f64 {
    8.0
}
fn default_pay_per_hour() -> f64 {
    100.0
}
fn default_min_wage() -> f64 {
    80.0
}
fn default_initial_omega() -> f64 {
    0.25
}
fn default_omega_min() -> f64 {
    0.05
}
fn default_omega_max() -> f64 {
    0.9
}
fn default_omega_smoothing_alpha() -> f64 {
    0.2
}
fn default_omega_history_cap() -> usize {
    50
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            batch_window_minutes: default_batch_window_minutes(),
            agent_speed_kmph: default_agent_speed_kmph(),
            prep_time_minutes: default_prep_time_minutes(),
            pay_per_hour: default_pay_per_hour(),
            min_wage: default_min_wage(),
            initial_omega: default_initial_omega(),
            omega_min: default_omega_min(),
            omega_max: default_omega_max(),
            omega_smoothing_alpha: default_omega_smoothing_alpha(),
            omega_history_cap: default_omega_history_cap(),
            carry_forward_pending: false,
        }
    }
}

impl DispatchConfig {
    /// Loads configuration from an optional TOML file, layered under
    /// `DISPATCH_*` environment variables, then validates it. Every field
    /// has a `#[serde(default = ...)]`, so a missing file or unset
    /// environment produces the same values as [`DispatchConfig::default`].
    pub fn load(path: Option<&str>) -> Result<Self, DispatchError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        builder = builder.add_source(config::Environment::with_prefix("DISPATCH"));
        let raw: DispatchConfig = builder.build()?.try_deserialize()?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn validate(&self) -> Result<(), DispatchError> {
        if self.batch_window_minutes == 0 {
            return Err(DispatchError::ConfigurationError(
                "batch_window_minutes must be > 0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.omega_min)
            || !(0.0..=1.0).contains(&self.omega_max)
            || !(self.omega_min <= self.initial_omega && self.initial_omega <= self.omega_max)
        {
            return Err(DispatchError::ConfigurationError(format!(
                "omega bounds out of order: omega_min={}, initial_omega={}, omega_max={}",
                self.omega_min, self.initial_omega, self.omega_max
            )));
        }
        if !(0.0..=1.0).contains(&self.omega_smoothing_alpha) {
            return Err(DispatchError::ConfigurationError(
                "omega_smoothing_alpha must be in [0, 1]".into(),
            ));
        }
        if self.omega_history_cap == 0 {
            return Err(DispatchError::ConfigurationError(
                "omega_history_cap must be > 0".into(),
            ));
        }
        if self.agent_speed_kmph <= 0.0 {
            return Err(DispatchError::ConfigurationError(
                "agent_speed_kmph must be > 0".into(),
            ));
        }
        if self.pay_per_hour < 0.0 || self.min_wage < 0.0 {
            return Err(DispatchError::ConfigurationError(
                "pay_per_hour and min_wage must be non-negative".into(),
            ));
        }
        Ok(())
    }

    pub fn predictor_config(&self) -> PredictorConfig {
        PredictorConfig {
            initial_omega: self.initial_omega,
            omega_min: self.omega_min,
            omega_max: self.omega_max,
            smoothing_alpha: self.omega_smoothing_alpha,
            history_cap: self.omega_history_cap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(DispatchConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_batch_window() {
        let cfg = DispatchConfig {
            batch_window_minutes: 0,
            ..DispatchConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_inverted_omega_bounds() {
        let cfg = DispatchConfig {
            omega_min: 0.9,
            omega_max: 0.05,
            ..DispatchConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_speed() {
        let cfg = DispatchConfig {
            agent_speed_kmph: 0.0,
            ..DispatchConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn loads_with_no_file_present_using_pure_defaults() {
        let cfg = DispatchConfig::load(Some("/nonexistent/path/does-not-exist.toml")).unwrap();
        assert_eq!(cfg.batch_window_minutes, 3);
    }
}
