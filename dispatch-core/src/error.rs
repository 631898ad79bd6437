//! Error taxonomy for the dispatch core.
//!
//! `PreconditionFailure` and `AssignmentDegenerate` describe in-domain
//! conditions the caller is expected to handle (lifecycle calls surface the
//! former as `(false, reason)` rather than `Err`, per `order_executor`).
//! `ConcurrencyConflict` and `RepositoryUnavailable` are propagated as
//! errors because they represent either a detected race or an infrastructure
//! fault, never a normal precondition miss. `ConfigurationError` is fatal and
//! only ever produced at startup.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("precondition failed: {0}")]
    PreconditionFailure(String),

    #[error("concurrent write conflict on {entity} {id}")]
    ConcurrencyConflict { entity: &'static str, id: String },

    #[error("assignment degenerate: no feasible cost cell for {0} order(s)")]
    AssignmentDegenerate(usize),

    #[error("repository unavailable: {0}")]
    RepositoryUnavailable(String),

    #[error("invalid configuration: {0}")]
    ConfigurationError(String),
}

impl From<guarantee_predictor::PredictorConfigError> for DispatchError {
    fn from(e: guarantee_predictor::PredictorConfigError) -> Self {
        DispatchError::ConfigurationError(e.to_string())
    }
}

impl From<config::ConfigError> for DispatchError {
    fn from(e: config::ConfigError) -> Self {
        DispatchError::ConfigurationError(e.to_string())
    }
}
