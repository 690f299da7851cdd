//! Error types.
//!
//! Two families are kept apart: [`ConfigError`] means the inputs handed to
//! `init()` are bad, [`ProtocolError`] means the caller drove the state
//! machine out of order. Numerical degeneracies never surface here; they
//! are clamped where they arise.

use thiserror::Error;

use crate::asa::AnnealState;

/// Invalid bounds, starting point or configuration, detected at `init()`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("search space has no dimensions")]
    EmptySpace,

    #[error("starting point has {point} parameters but {bounds} bounds were given")]
    DimensionMismatch { point: usize, bounds: usize },

    #[error("bounds for parameter {index} are degenerate: lo {lo} must be below hi {hi}")]
    DegenerateBounds { index: usize, lo: f64, hi: f64 },

    #[error("bounds for parameter {index} are not finite")]
    NonFiniteBounds { index: usize },

    #[error("starting value {value} of parameter {index} lies outside [{lo}, {hi}]")]
    StartOutOfBounds {
        index: usize,
        value: f64,
        lo: f64,
        hi: f64,
    },

    #[error("starting point or its objective value is not finite")]
    NonFiniteStart,

    #[error("invalid {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Caller misuse of the `init()` / `supply_*()` / `step()` protocol.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProtocolError {
    #[error("init() has not been called")]
    NotInitialised,

    #[error("init() has already been called")]
    AlreadyInitialised,

    #[error("a previous init() failed; the annealer cannot be used")]
    Unusable,

    #[error("the annealer has stopped; no further steps are accepted")]
    AlreadyStopped,

    #[error("step() called before the candidate objective was supplied")]
    MissingCandidateObjective,

    #[error("step() called before the objective of sample {index} was supplied")]
    MissingSampleObjective { index: usize },

    #[error("no objective value of this kind is requested in state {state:?}")]
    UnexpectedSupply { state: AnnealState },

    #[error("sample index {index} is out of range for a batch of {len}")]
    SampleIndexOutOfRange { index: usize, len: usize },

    #[error("expected {expected} sample objectives, got {got}")]
    SampleCountMismatch { expected: usize, got: usize },

    #[error("objective value {value} is not finite")]
    NonFiniteObjective { value: f64 },
}

/// Any error raised by the annealer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AsaError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolError),
}

impl AsaError {
    /// True for errors caused by bad inputs rather than caller misuse.
    pub fn is_config(&self) -> bool {
        matches!(self, AsaError::Config(_))
    }

    /// True for errors caused by driving the state machine out of order.
    pub fn is_protocol(&self) -> bool {
        matches!(self, AsaError::Protocol(_))
    }
}
