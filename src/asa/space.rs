//! Bounded parameter space.

use crate::error::ConfigError;
use crate::float::AsaFloat;

/// Closed interval `[lo, hi]` for one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds<F> {
    pub lo: F,
    pub hi: F,
}

impl<F: AsaFloat> Bounds<F> {
    pub fn new(lo: F, hi: F) -> Self {
        Self { lo, hi }
    }

    /// Width of the interval.
    pub fn range(&self) -> F {
        self.hi - self.lo
    }

    pub fn contains(&self, v: F) -> bool {
        v >= self.lo && v <= self.hi
    }

    /// Maps `v` back into the interval.
    ///
    /// A value past a bound is mirrored across it once; anything still
    /// outside (overshoot of more than one range, or rounding) is clamped.
    pub fn reflect(&self, v: F) -> F {
        let mirrored = if v > self.hi {
            self.hi - (v - self.hi)
        } else if v < self.lo {
            self.lo + (self.lo - v)
        } else {
            v
        };
        mirrored.max(self.lo).min(self.hi)
    }
}

impl<F: AsaFloat> From<(F, F)> for Bounds<F> {
    fn from((lo, hi): (F, F)) -> Self {
        Self { lo, hi }
    }
}

/// The search domain: one [`Bounds`] per parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpace<F> {
    bounds: Vec<Bounds<F>>,
    half_ranges: Vec<F>,
}

impl<F: AsaFloat> ParameterSpace<F> {
    /// Creates a space. Nothing is checked until [`validate`](Self::validate).
    pub fn new<B: Into<Bounds<F>>>(bounds: impl IntoIterator<Item = B>) -> Self {
        let bounds: Vec<Bounds<F>> = bounds.into_iter().map(Into::into).collect();
        let two = F::cast(2.0);
        let half_ranges = bounds.iter().map(|b| b.range() / two).collect();
        Self {
            bounds,
            half_ranges,
        }
    }

    /// Number of parameters.
    pub fn dims(&self) -> usize {
        self.bounds.len()
    }

    pub fn bounds(&self) -> &[Bounds<F>] {
        &self.bounds
    }

    pub fn range(&self, d: usize) -> F {
        self.bounds[d].range()
    }

    pub fn half_range(&self, d: usize) -> F {
        self.half_ranges[d]
    }

    pub fn contains(&self, point: &[F]) -> bool {
        point.len() == self.dims()
            && point
                .iter()
                .zip(&self.bounds)
                .all(|(&v, b)| b.contains(v))
    }

    /// Reflects parameter `d` of a value into its bounds.
    pub fn reflect(&self, d: usize, v: F) -> F {
        self.bounds[d].reflect(v)
    }

    /// Checks the bounds, and `point` against them.
    pub fn validate(&self, point: &[F]) -> Result<(), ConfigError> {
        if self.bounds.is_empty() {
            return Err(ConfigError::EmptySpace);
        }
        if point.len() != self.bounds.len() {
            return Err(ConfigError::DimensionMismatch {
                point: point.len(),
                bounds: self.bounds.len(),
            });
        }
        for (index, b) in self.bounds.iter().enumerate() {
            if !b.lo.is_finite() || !b.hi.is_finite() {
                return Err(ConfigError::NonFiniteBounds { index });
            }
            if b.lo >= b.hi {
                return Err(ConfigError::DegenerateBounds {
                    index,
                    lo: b.lo.into_f64(),
                    hi: b.hi.into_f64(),
                });
            }
        }
        if point.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::NonFiniteStart);
        }
        for (index, (&value, b)) in point.iter().zip(&self.bounds).enumerate() {
            if !b.contains(value) {
                return Err(ConfigError::StartOutOfBounds {
                    index,
                    value: value.into_f64(),
                    lo: b.lo.into_f64(),
                    hi: b.hi.into_f64(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> ParameterSpace<f64> {
        ParameterSpace::new([(-1.0, 1.0), (0.0, 4.0)])
    }

    #[test]
    fn test_ranges() {
        let space = unit_square();
        assert_eq!(space.dims(), 2);
        assert_eq!(space.range(1), 4.0);
        assert_eq!(space.half_range(0), 1.0);
        assert_eq!(space.half_range(1), 2.0);
    }

    #[test]
    fn test_reflect() {
        let b = Bounds::new(0.0f64, 1.0);
        assert!((b.reflect(1.25) - 0.75).abs() < 1e-12);
        assert!((b.reflect(-0.1) - 0.1).abs() < 1e-12);
        assert_eq!(b.reflect(0.5), 0.5);
        // More than a full range past the bound: mirrored then clamped.
        assert_eq!(b.reflect(3.0), 0.0);
        assert_eq!(b.reflect(-3.0), 1.0);
    }

    #[test]
    fn test_validate_ok() {
        assert!(unit_square().validate(&[0.0, 2.0]).is_ok());
        assert!(unit_square().validate(&[1.0, 0.0]).is_ok());
    }

    #[test]
    fn test_validate_degenerate() {
        let space = ParameterSpace::<f64>::new([(-1.0, 1.0), (2.0, 2.0)]);
        assert_eq!(
            space.validate(&[0.0, 2.0]),
            Err(ConfigError::DegenerateBounds {
                index: 1,
                lo: 2.0,
                hi: 2.0
            })
        );
        let space = ParameterSpace::<f64>::new([(1.0, -1.0)]);
        assert!(matches!(
            space.validate(&[0.0]),
            Err(ConfigError::DegenerateBounds { index: 0, .. })
        ));
    }

    #[test]
    fn test_validate_dimension_mismatch() {
        assert_eq!(
            unit_square().validate(&[0.0]),
            Err(ConfigError::DimensionMismatch {
                point: 1,
                bounds: 2
            })
        );
    }

    #[test]
    fn test_validate_empty_and_non_finite() {
        let empty: ParameterSpace<f64> = ParameterSpace::new(Vec::<(f64, f64)>::new());
        assert_eq!(empty.validate(&[]), Err(ConfigError::EmptySpace));

        let space = ParameterSpace::<f64>::new([(f64::NEG_INFINITY, 1.0)]);
        assert_eq!(
            space.validate(&[0.0]),
            Err(ConfigError::NonFiniteBounds { index: 0 })
        );

        assert_eq!(
            unit_square().validate(&[f64::NAN, 1.0]),
            Err(ConfigError::NonFiniteStart)
        );
    }

    #[test]
    fn test_validate_start_outside() {
        assert!(matches!(
            unit_square().validate(&[0.0, 5.0]),
            Err(ConfigError::StartOutOfBounds { index: 1, .. })
        ));
    }
}
