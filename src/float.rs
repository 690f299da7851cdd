//! Floating-point precision used by the annealer.

use num_traits::Float;

/// Scalar type for parameters, costs and temperatures.
///
/// The annealer is generic over precision so that callers hosting
/// single-precision data (GPU buffers, grids) can run it without
/// conversion. Built-in implementations exist for `f64` and `f32`.
pub trait AsaFloat: Float + Send + Sync + std::fmt::Debug + std::fmt::Display + 'static {
    /// Converts an `f64` constant or configuration value to this type.
    fn cast(v: f64) -> Self;

    /// Converts the value to `f64` for logging and reporting.
    fn into_f64(self) -> f64;

    /// Smallest temperature or sensitivity the annealer will use.
    ///
    /// Values that would fall below this are clamped to it.
    fn floor_epsilon() -> Self {
        Self::epsilon()
    }
}

impl AsaFloat for f64 {
    fn cast(v: f64) -> Self {
        v
    }

    fn into_f64(self) -> f64 {
        self
    }
}

impl AsaFloat for f32 {
    fn cast(v: f64) -> Self {
        v as f32
    }

    fn into_f64(self) -> f64 {
        self as f64
    }
}
