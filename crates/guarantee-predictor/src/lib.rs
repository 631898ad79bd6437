//! Smoothed estimator of omega, the platform-wide work/active ratio.
//!
//! The predictor is a pure function of the (total_work, total_active)
//! aggregates it has observed: construction takes no I/O, `update` only
//! mutates in-memory state, and `predict` is a cheap read.

#![forbid(unsafe_code)]

use std::collections::VecDeque;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PredictorConfigError {
    #[error("omega_min ({omega_min}) must be <= initial_omega ({initial_omega}) <= omega_max ({omega_max})")]
    BoundsOutOfOrder {
        omega_min: f64,
        initial_omega: f64,
        omega_max: f64,
    },
    #[error("omega_smoothing_alpha must be in [0, 1], got {0}")]
    AlphaOutOfRange(f64),
    #[error("omega_history_cap must be > 0")]
    ZeroHistoryCap,
}

/// Construction parameters for [`GuaranteePredictor`].
#[derive(Clone, Copy, Debug)]
pub struct PredictorConfig {
    pub initial_omega: f64,
    pub omega_min: f64,
    pub omega_max: f64,
    pub smoothing_alpha: f64,
    pub history_cap: usize,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            initial_omega: 0.25,
            omega_min: 0.05,
            omega_max: 0.9,
            smoothing_alpha: 0.2,
            history_cap: 50,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GuaranteePredictor {
    omega: f64,
    omega_min: f64,
    omega_max: f64,
    smoothing_alpha: f64,
    history_cap: usize,
    history: VecDeque<(f64, f64)>,
}

impl GuaranteePredictor {
    pub fn new(config: PredictorConfig) -> Result<Self, PredictorConfigError> {
        if !(config.omega_min <= config.initial_omega && config.initial_omega <= config.omega_max)
        {
            return Err(PredictorConfigError::BoundsOutOfOrder {
                omega_min: config.omega_min,
                initial_omega: config.initial_omega,
                omega_max: config.omega_max,
            });
        }
        if !(0.0..=1.0).contains(&config.smoothing_alpha) {
            return Err(PredictorConfigError::AlphaOutOfRange(config.smoothing_alpha));
        }
        if config.history_cap == 0 {
            return Err(PredictorConfigError::ZeroHistoryCap);
        }
        Ok(Self {
            omega: config.initial_omega,
            omega_min: config.omega_min,
            omega_max: config.omega_max,
            smoothing_alpha: config.smoothing_alpha,
            history_cap: config.history_cap,
            history: VecDeque::with_capacity(config.history_cap),
        })
    }

    /// Current estimate of omega. Always in `[omega_min, omega_max]`.
    pub fn predict(&self) -> f64 {
        self.omega
    }

    /// Record a new (total_work, total_active) observation and re-fit omega.
    ///
    /// A window with no available couriers (nothing observed) should not
    /// call this at all, per the batch processor's early-exit rule; an
    /// observation with `total_active == 0` is still appended but
    /// contributes no ratio (division by zero is excluded from the mean).
    pub fn update(&mut self, total_work: f64, total_active: f64) {
        self.history.push_back((total_work, total_active));
        while self.history.len() > self.history_cap {
            self.history.pop_front();
        }
        if let Some(avg_ratio) = self.average_ratio() {
            self.omega = (1.0 - self.smoothing_alpha) * self.omega + self.smoothing_alpha * avg_ratio;
        }
        self.omega = self.omega.clamp(self.omega_min, self.omega_max);
    }

    fn average_ratio(&self) -> Option<f64> {
        let ratios: Vec<f64> = self
            .history
            .iter()
            .filter(|&&(_, active)| active > 0.0)
            .map(|&(work, active)| work / active)
            .collect();
        if ratios.is_empty() {
            None
        } else {
            Some(ratios.iter().sum::<f64>() / ratios.len() as f64)
        }
    }

    /// Number of (work, active) observations currently retained.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}
