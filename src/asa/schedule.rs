//! ASA temperature schedules.
//!
//! Both the cost temperature and the per-parameter generating temperatures
//! follow Ingber's exponential-in-root law
//!
//! ```text
//! T(k) = T_0 * exp(-c * k^(1/D))
//! ```
//!
//! with `D` the dimensionality. The rate is derived from the configured
//! ratio and time scale: `c = -ln(ratio) * scale^(-1/D)`, so the
//! generating temperature reaches `T_0 * ratio` at annealing time
//! `scale`. The cost schedule runs `cost_parameter_scale_ratio` times
//! faster. All temperatures are clamped to [`AsaFloat::floor_epsilon`].
//!
//! # References
//!
//! - Ingber (1989), "Very fast simulated re-annealing"
//! - Ingber (1996), "Adaptive simulated annealing (ASA): Lessons learned"

use super::config::AsaConfig;
use crate::float::AsaFloat;

/// Maps annealing-time indices to temperatures and back.
#[derive(Debug, Clone)]
pub struct TemperatureSchedule<F> {
    dims: usize,
    inv_dims: F,
    /// Generating temperature at index zero, per parameter.
    t_gen_0: Vec<F>,
    /// Generating temperature reached at `k = temperature_anneal_scale`.
    t_gen_final: Vec<F>,
    c_gen: F,
    t_cost_0: F,
    c_cost: F,
}

impl<F: AsaFloat> TemperatureSchedule<F> {
    /// Builds the schedule for `dims` parameters.
    ///
    /// `initial_cost` is the objective at the starting point; its
    /// magnitude seeds the cost temperature.
    pub fn new(config: &AsaConfig, dims: usize, initial_cost: F) -> Self {
        let d = F::cast(dims as f64);
        let ratio = F::cast(config.temperature_ratio_scale);
        let m = -ratio.ln();
        let n = F::cast(config.temperature_anneal_scale).ln();
        let c_gen = m * (-n / d).exp();
        let c_cost = c_gen * F::cast(config.cost_parameter_scale_ratio);

        let t_gen_0 = vec![F::one(); dims];
        let t_gen_final = t_gen_0.iter().map(|&t| t * ratio).collect();

        let t_cost_0 = if initial_cost.abs() > F::floor_epsilon() {
            initial_cost.abs()
        } else {
            F::one()
        };

        Self {
            dims,
            inv_dims: F::one() / d,
            t_gen_0,
            t_gen_final,
            c_gen,
            t_cost_0,
            c_cost,
        }
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    pub fn initial_generating_temperature(&self, d: usize) -> F {
        self.t_gen_0[d]
    }

    pub fn final_generating_temperature(&self, d: usize) -> F {
        self.t_gen_final[d]
    }

    pub fn initial_cost_temperature(&self) -> F {
        self.t_cost_0
    }

    /// Generating rate constant `c`.
    pub fn generating_rate(&self) -> F {
        self.c_gen
    }

    /// Cost rate constant.
    pub fn cost_rate(&self) -> F {
        self.c_cost
    }

    /// Generating temperature of parameter `d` at annealing time `k`.
    pub fn generating_temperature(&self, d: usize, k: F) -> F {
        self.temperature(self.t_gen_0[d], self.c_gen, k)
    }

    /// Cost temperature at annealing time `k`.
    pub fn cost_temperature(&self, k: F) -> F {
        self.temperature(self.t_cost_0, self.c_cost, k)
    }

    /// Annealing time at which parameter `d` has temperature `t`.
    ///
    /// Temperatures at or above the initial value map to zero.
    pub fn generating_index(&self, d: usize, t: F) -> F {
        self.index(self.t_gen_0[d], self.c_gen, t)
    }

    /// Annealing time at which the cost temperature equals `t`.
    pub fn cost_index(&self, t: F) -> F {
        self.index(self.t_cost_0, self.c_cost, t)
    }

    fn temperature(&self, t0: F, c: F, k: F) -> F {
        let k = k.max(F::zero());
        (t0 * (-c * k.powf(self.inv_dims)).exp()).max(F::floor_epsilon())
    }

    fn index(&self, t0: F, c: F, t: F) -> F {
        let t = t.max(F::floor_epsilon());
        if t >= t0 {
            return F::zero();
        }
        ((t0 / t).ln() / c).powi(self.dims as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn schedule(dims: usize) -> TemperatureSchedule<f64> {
        TemperatureSchedule::new(&AsaConfig::default(), dims, 0.405)
    }

    #[test]
    fn test_initial_values() {
        let s = schedule(2);
        assert_eq!(s.generating_temperature(0, 0.0), 1.0);
        assert!((s.cost_temperature(0.0) - 0.405).abs() < 1e-15);
        assert!((s.final_generating_temperature(1) - 1e-4).abs() < 1e-18);
    }

    #[test]
    fn test_reaches_final_at_anneal_scale() {
        let s = schedule(2);
        let t = s.generating_temperature(0, 200.0);
        assert!((t - 1e-4).abs() < 1e-12, "got {t}");
    }

    #[test]
    fn test_cost_schedule_is_faster() {
        let s = schedule(3);
        assert!((s.cost_rate() / s.generating_rate() - 1.5).abs() < 1e-12);
        let k = 50.0;
        let gen_ratio = s.generating_temperature(0, k) / s.initial_generating_temperature(0);
        let cost_ratio = s.cost_temperature(k) / s.initial_cost_temperature();
        assert!(cost_ratio < gen_ratio);
    }

    #[test]
    fn test_zero_initial_cost_seeds_unit_temperature() {
        let s: TemperatureSchedule<f64> = TemperatureSchedule::new(&AsaConfig::default(), 2, 0.0);
        assert_eq!(s.initial_cost_temperature(), 1.0);
        let s: TemperatureSchedule<f64> = TemperatureSchedule::new(&AsaConfig::default(), 2, -7.0);
        assert_eq!(s.initial_cost_temperature(), 7.0);
    }

    #[test]
    fn test_floor_clamp_on_underflow() {
        let s = schedule(1);
        let t = s.generating_temperature(0, 1e12);
        assert_eq!(t, f64::EPSILON);
        assert_eq!(s.cost_temperature(f64::MAX), f64::EPSILON);
    }

    #[test]
    fn test_index_inverts_temperature() {
        let s = schedule(2);
        for k in [0.0, 1.0, 17.0, 250.0] {
            let t = s.generating_temperature(1, k);
            assert!((s.generating_index(1, t) - k).abs() < 1e-6 * (1.0 + k));
            let t = s.cost_temperature(k);
            assert!((s.cost_index(t) - k).abs() < 1e-6 * (1.0 + k));
        }
    }

    #[test]
    fn test_index_never_negative() {
        let s = schedule(2);
        assert_eq!(s.generating_index(0, 5.0), 0.0);
        assert_eq!(s.cost_index(10.0), 0.0);
    }

    #[test]
    fn test_single_precision() {
        let s: TemperatureSchedule<f32> = TemperatureSchedule::new(&AsaConfig::default(), 2, 0.5);
        let t = s.generating_temperature(0, 1e9);
        assert!(t > 0.0);
        assert_eq!(t, f32::EPSILON);
    }

    proptest! {
        #[test]
        fn prop_temperatures_positive_and_non_increasing(
            dims in 1usize..8,
            ratio in 1e-8f64..0.5,
            scale in 1.0f64..1e4,
            cost_ratio in 0.1f64..10.0,
            k in 0.0f64..1e6,
            dk in 0.0f64..1e3,
        ) {
            let config = AsaConfig::default()
                .with_temperature_ratio_scale(ratio)
                .with_temperature_anneal_scale(scale)
                .with_cost_parameter_scale_ratio(cost_ratio);
            let s: TemperatureSchedule<f64> = TemperatureSchedule::new(&config, dims, 3.0);
            for d in 0..dims {
                let a = s.generating_temperature(d, k);
                let b = s.generating_temperature(d, k + dk);
                prop_assert!(a > 0.0 && b > 0.0);
                prop_assert!(b <= a);
            }
            let a = s.cost_temperature(k);
            let b = s.cost_temperature(k + dk);
            prop_assert!(a > 0.0 && b > 0.0);
            prop_assert!(b <= a);
        }
    }
}
