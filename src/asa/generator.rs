//! Candidate generation.
//!
//! ASA draws each parameter's step from a heavy-tailed distribution whose
//! width shrinks with the generating temperature. For a unit draw `u`,
//!
//! ```text
//! y = sign(u - 1/2) * T * ((1 + 1/T)^|2u - 1| - 1),   y in [-1, 1]
//! ```
//!
//! and the step is `y` times the parameter's half-range. Points landing
//! outside the bounds are reflected back in, so generation never fails.

use rand::Rng;

use super::space::ParameterSpace;
use crate::float::AsaFloat;

/// The ASA generating function for a unit draw `u` at temperature `t`.
///
/// Returns a value in `[-1, 1]`. `u = 0.5` maps to zero; `|2u - 1|` is
/// clamped to 1 so draws on or past the ends of the unit interval stay
/// finite.
pub fn generating_step<F: AsaFloat>(u: F, t: F) -> F {
    let half = F::cast(0.5);
    let t = t.max(F::floor_epsilon());
    let centred = u - half;
    if centred == F::zero() {
        return F::zero();
    }
    let a = (F::cast(2.0) * centred).abs().min(F::one());
    let magnitude = (t * ((F::one() + F::one() / t).powf(a) - F::one())).min(F::one());
    if centred < F::zero() {
        -magnitude
    } else {
        magnitude
    }
}

/// Draws a candidate around `x` using per-parameter `temperatures`.
///
/// Consumes exactly one uniform draw per parameter.
pub fn generate<F: AsaFloat, R: Rng>(
    x: &[F],
    temperatures: &[F],
    space: &ParameterSpace<F>,
    rng: &mut R,
) -> Vec<F> {
    x.iter()
        .zip(temperatures)
        .enumerate()
        .map(|(d, (&xd, &t))| {
            let u = F::cast(rng.random::<f64>());
            let step = generating_step(u, t) * space.half_range(d);
            space.reflect(d, xd + step)
        })
        .collect()
}
