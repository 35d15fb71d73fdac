//! Error types for the tidemark core.

use thiserror::Error;

/// Broad class of an [`EngineError`], used by hosts to decide how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Invalid configuration; the component keeps its last valid state.
    Config,
    /// A request was rejected before any state change.
    Validation,
    /// The component was used after it was torn down.
    Lifecycle,
    /// Writing an artifact (snapshot, report) failed.
    Io,
}

/// Errors produced by the background engine, the overlay controller and their hosts.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A particle count below zero was requested.
    #[error("invalid particle count {0}: count must be >= 0")]
    NegativeCount(i64),

    /// A geometry mode name did not match any known layout.
    #[error("unknown geometry mode: {0}")]
    UnknownMode(String),

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A configuration value was present but unusable.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParam { name: String, reason: String },

    /// The source rectangle of an overlay transition had no area.
    #[error("degenerate rect: width {width} and height {height} must both be positive")]
    DegenerateRect { width: f64, height: f64 },

    /// The operation is not allowed in the controller's current state.
    #[error("cannot {op} while overlay is {state}")]
    InvalidTransition { op: &'static str, state: String },

    /// The engine was destroyed before this call.
    #[error("{0} called on a destroyed engine")]
    Destroyed(&'static str),

    /// Filesystem or encoding failure while writing output.
    #[error("i/o error: {0}")]
    Io(String),
}

impl EngineError {
    /// Returns the category this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            EngineError::NegativeCount(_)
            | EngineError::UnknownMode(_)
            | EngineError::InvalidColor(_)
            | EngineError::InvalidParam { .. } => ErrorCategory::Config,
            EngineError::DegenerateRect { .. } | EngineError::InvalidTransition { .. } => {
                ErrorCategory::Validation
            }
            EngineError::Destroyed(_) => ErrorCategory::Lifecycle,
            EngineError::Io(_) => ErrorCategory::Io,
        }
    }
}
