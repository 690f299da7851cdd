//! Reannealing: sensitivity probes and schedule rescaling.
//!
//! At each reannealing event the annealer publishes a batch of probe
//! points, each offset from the current point along a single axis. From
//! the returned costs it estimates a range-normalized finite-difference
//! sensitivity per axis and moves every axis' annealing-time index so
//! that its generating temperature scales with `s_max / s_d`:
//!
//! ```text
//! T'_d = clamp(T_d * s_max / s_d, floor, T_0d)
//! k'_d = (ln(T_0d / T'_d) / c)^D
//! ```
//!
//! The most sensitive axis keeps its temperature while flatter axes are
//! reheated, never past their starting temperature.

use tracing::debug;

use super::schedule::TemperatureSchedule;
use super::space::ParameterSpace;
use crate::float::AsaFloat;

/// One probe: which axis was moved, and by how much.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probe<F> {
    pub axis: usize,
    pub offset: F,
}

/// Plans probe batches and turns their costs into sensitivities.
#[derive(Debug, Clone)]
pub struct SensitivityEstimator<F> {
    /// Last estimate per axis; `None` until the axis has been probed.
    sensitivities: Vec<Option<F>>,
    /// Position in the axis rotation where the next batch starts.
    cursor: usize,
    probes: Vec<Probe<F>>,
}

impl<F: AsaFloat> SensitivityEstimator<F> {
    pub fn new(dims: usize) -> Self {
        Self {
            sensitivities: vec![None; dims],
            cursor: 0,
            probes: Vec::new(),
        }
    }

    pub fn sensitivities(&self) -> &[Option<F>] {
        &self.sensitivities
    }

    /// Probes of the batch currently awaiting costs.
    pub fn probes(&self) -> &[Probe<F>] {
        &self.probes
    }

    /// Builds `samples` probe points around `x`.
    ///
    /// Probe `i` moves axis `(cursor + i) mod D` by `delta_param` of its
    /// range. The sign alternates on each full pass over the axes and is
    /// flipped when the offset would leave the bounds. The cursor advances
    /// by `samples`, so batches smaller than `D` cover every axis over
    /// successive events.
    pub fn plan(
        &mut self,
        x: &[F],
        space: &ParameterSpace<F>,
        samples: usize,
        delta_param: F,
    ) -> Vec<Vec<F>> {
        let dims = space.dims();
        self.probes.clear();
        let mut batch = Vec::with_capacity(samples);
        for i in 0..samples {
            let slot = self.cursor + i;
            let axis = slot % dims;
            let b = space.bounds()[axis];
            let mut offset = delta_param * b.range();
            if (slot / dims) % 2 == 1 {
                offset = -offset;
            }
            if !b.contains(x[axis] + offset) {
                offset = -offset;
            }
            let mut point = x.to_vec();
            point[axis] = b.reflect(x[axis] + offset);
            self.probes.push(Probe {
                axis,
                offset: point[axis] - x[axis],
            });
            batch.push(point);
        }
        self.cursor = (self.cursor + samples) % (2 * dims);
        batch
    }

    /// Updates the sensitivity of every probed axis from the batch costs.
    ///
    /// `f_set[i]` must be the cost of probe `i`. Axes not probed in this
    /// batch keep their previous estimate.
    pub fn absorb(&mut self, f_x: F, f_set: &[F], space: &ParameterSpace<F>) {
        let dims = space.dims();
        let mut sums = vec![F::zero(); dims];
        let mut counts = vec![0usize; dims];
        for (probe, &f) in self.probes.iter().zip(f_set) {
            if probe.offset == F::zero() {
                continue;
            }
            let slope = (f - f_x).abs() / probe.offset.abs();
            sums[probe.axis] = sums[probe.axis] + slope * space.range(probe.axis);
            counts[probe.axis] += 1;
        }
        for (d, (&sum, &count)) in sums.iter().zip(&counts).enumerate() {
            if count > 0 {
                self.sensitivities[d] = Some(sum / F::cast(count as f64));
            }
        }
        self.probes.clear();
    }

    /// Moves `k_gen` so each known axis' temperature scales with
    /// `s_max / s_d`. Returns the number of axes rescaled.
    ///
    /// Nothing is rescaled while every known sensitivity is below the
    /// floor (a locally flat objective carries no scale information).
    pub fn rescale(&self, schedule: &TemperatureSchedule<F>, k_gen: &mut [F]) -> usize {
        let s_max = self
            .sensitivities
            .iter()
            .flatten()
            .fold(F::zero(), |acc, &s| acc.max(s));
        if s_max <= F::floor_epsilon() {
            debug!("reanneal skipped: objective locally flat");
            return 0;
        }
        let s_floor = (s_max * F::floor_epsilon()).max(F::min_positive_value());
        let mut rescaled = 0;
        for (d, s) in self.sensitivities.iter().enumerate() {
            let Some(s) = *s else { continue };
            let t = schedule.generating_temperature(d, k_gen[d]);
            let t_new = (t * (s_max / s.max(s_floor)))
                .min(schedule.initial_generating_temperature(d))
                .max(F::floor_epsilon());
            k_gen[d] = schedule.generating_index(d, t_new);
            rescaled += 1;
        }
        rescaled
    }
}

/// Mean absolute cost change across a probe batch.
///
/// Used as the energy scale when the cost temperature is reheated.
pub fn cost_spread<F: AsaFloat>(f_x: F, f_set: &[F]) -> F {
    if f_set.is_empty() {
        return F::zero();
    }
    let total = f_set
        .iter()
        .fold(F::zero(), |acc, &f| acc + (f - f_x).abs());
    total / F::cast(f_set.len() as f64)
}
