//! Metropolis acceptance.

use rand::Rng;

use crate::float::AsaFloat;

/// Outcome of one acceptance test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Decision {
    /// Candidate cost was no worse than the current cost.
    Improved,
    /// Candidate was worse but accepted by the Metropolis draw.
    WorseAccepted,
    /// Candidate was worse and rejected.
    WorseRejected,
}

impl Decision {
    pub fn accepted(self) -> bool {
        !matches!(self, Decision::WorseRejected)
    }
}

/// Probability of accepting a move that raises the cost by `delta` at
/// cost temperature `t`.
pub fn acceptance_probability<F: AsaFloat>(delta: F, t: F) -> F {
    if delta <= F::zero() {
        return F::one();
    }
    (-delta / t.max(F::floor_epsilon())).exp()
}

/// Metropolis test of `f_cand` against `f_x`.
///
/// Always consumes exactly one uniform draw, whether or not it is needed,
/// so the random stream stays aligned across runs.
pub fn metropolis<F: AsaFloat, R: Rng>(f_x: F, f_cand: F, t_cost: F, rng: &mut R) -> Decision {
    let u = F::cast(rng.random::<f64>());
    if f_cand <= f_x {
        Decision::Improved
    } else if u < acceptance_probability(f_cand - f_x, t_cost) {
        Decision::WorseAccepted
    } else {
        Decision::WorseRejected
    }
}
