//! Objective trait for the closed-loop driver.

use crate::float::AsaFloat;

/// A cost function over a bounded real parameter vector.
///
/// Only [`AsaRunner`](super::AsaRunner) needs this trait; callers stepping
/// [`Anneal`](super::Anneal) by hand evaluate costs however they like.
/// Any `Fn(&[F]) -> F + Sync` closure implements it.
///
/// # Minimization
///
/// Lower is better. For maximization, negate the cost.
///
/// # Examples
///
/// ```ignore
/// struct Grid { values: Vec<f64>, width: usize, cell: f64 }
///
/// impl AsaObjective<f64> for Grid {
///     fn cost(&self, params: &[f64]) -> f64 {
///         let col = (params[0] / self.cell) as usize;
///         let row = (params[1] / self.cell) as usize;
///         self.values[row * self.width + col]
///     }
/// }
/// ```
pub trait AsaObjective<F: AsaFloat>: Sync {
    /// Computes the cost at `params`. Must return a finite value.
    fn cost(&self, params: &[F]) -> F;
}

impl<F, T> AsaObjective<F> for T
where
    F: AsaFloat,
    T: Fn(&[F]) -> F + Sync,
{
    fn cost(&self, params: &[F]) -> F {
        self(params)
    }
}
