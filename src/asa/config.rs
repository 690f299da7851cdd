//! ASA configuration.

use crate::error::ConfigError;

/// Configuration for Adaptive Simulated Annealing.
///
/// Captured by value at construction and immutable once `init()` has
/// run. All fields have defaults; the builder methods override them.
///
/// # Examples
///
/// ```
/// use u_asa::asa::AsaConfig;
///
/// let config = AsaConfig::default()
///     .with_temperature_ratio_scale(1e-5)
///     .with_reanneal_after_steps(50)
///     .with_partials_samples(6);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AsaConfig {
    /// Ratio of final to initial temperature, in (0, 1).
    pub temperature_ratio_scale: f64,

    /// Annealing time at which the generating temperature reaches
    /// `initial * temperature_ratio_scale`. Must be positive.
    pub temperature_anneal_scale: f64,

    /// Cost schedule rate relative to the generating schedule rate.
    pub cost_parameter_scale_ratio: f64,

    /// When fewer than this fraction of the candidates generated in a
    /// reannealing period were accepted, the cost temperature is reheated.
    pub acc_gen_reanneal_ratio: f64,

    /// Number of probe points evaluated per reannealing event.
    pub partials_samples: usize,

    /// Number of consecutive reannealing periods without improvement of
    /// the best cost after which the run stops.
    pub f_x_best_repeat_max: usize,

    /// Steps per reannealing period.
    pub reanneal_after_steps: usize,

    /// Probe offset as a fraction of each parameter's range, in (0, 0.5].
    pub delta_param: f64,

    /// Improvements of the best cost smaller than this do not reset the
    /// repeat counter.
    pub cost_precision: f64,

    /// Whether sensitivity probes are requested at period boundaries.
    pub enable_reanneal: bool,

    /// Stop once every generating temperature is below its final value.
    pub exit_at_final_temperature: bool,

    /// Hard step budget. 0 = no limit.
    pub max_steps: usize,

    /// Random seed for reproducibility. Read by `AsaRunner`; callers
    /// stepping `Anneal` themselves inject their own rng.
    pub seed: Option<u64>,
}

impl Default for AsaConfig {
    fn default() -> Self {
        Self {
            temperature_ratio_scale: 1e-4,
            temperature_anneal_scale: 200.0,
            cost_parameter_scale_ratio: 1.5,
            acc_gen_reanneal_ratio: 0.3,
            partials_samples: 4,
            f_x_best_repeat_max: 15,
            reanneal_after_steps: 100,
            delta_param: 0.01,
            cost_precision: 1e-6,
            enable_reanneal: true,
            exit_at_final_temperature: false,
            max_steps: 0,
            seed: None,
        }
    }
}

impl AsaConfig {
    pub fn with_temperature_ratio_scale(mut self, r: f64) -> Self {
        self.temperature_ratio_scale = r;
        self
    }

    pub fn with_temperature_anneal_scale(mut self, s: f64) -> Self {
        self.temperature_anneal_scale = s;
        self
    }

    pub fn with_cost_parameter_scale_ratio(mut self, r: f64) -> Self {
        self.cost_parameter_scale_ratio = r;
        self
    }

    pub fn with_acc_gen_reanneal_ratio(mut self, r: f64) -> Self {
        self.acc_gen_reanneal_ratio = r;
        self
    }

    pub fn with_partials_samples(mut self, n: usize) -> Self {
        self.partials_samples = n;
        self
    }

    pub fn with_f_x_best_repeat_max(mut self, n: usize) -> Self {
        self.f_x_best_repeat_max = n;
        self
    }

    pub fn with_reanneal_after_steps(mut self, n: usize) -> Self {
        self.reanneal_after_steps = n;
        self
    }

    pub fn with_delta_param(mut self, d: f64) -> Self {
        self.delta_param = d;
        self
    }

    pub fn with_cost_precision(mut self, p: f64) -> Self {
        self.cost_precision = p;
        self
    }

    pub fn with_reanneal(mut self, enabled: bool) -> Self {
        self.enable_reanneal = enabled;
        self
    }

    pub fn with_exit_at_final_temperature(mut self, exit: bool) -> Self {
        self.exit_at_final_temperature = exit;
        self
    }

    pub fn with_max_steps(mut self, n: usize) -> Self {
        self.max_steps = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let r = self.temperature_ratio_scale;
        if !(r > 0.0 && r < 1.0) {
            return Err(invalid(
                "temperature_ratio_scale",
                format!("must be in (0, 1), got {r}"),
            ));
        }
        let s = self.temperature_anneal_scale;
        if !(s.is_finite() && s > 0.0) {
            return Err(invalid(
                "temperature_anneal_scale",
                format!("must be positive, got {s}"),
            ));
        }
        let c = self.cost_parameter_scale_ratio;
        if !(c.is_finite() && c > 0.0) {
            return Err(invalid(
                "cost_parameter_scale_ratio",
                format!("must be positive, got {c}"),
            ));
        }
        let a = self.acc_gen_reanneal_ratio;
        if !(0.0..=1.0).contains(&a) {
            return Err(invalid(
                "acc_gen_reanneal_ratio",
                format!("must be in [0, 1], got {a}"),
            ));
        }
        if self.partials_samples == 0 {
            return Err(invalid("partials_samples", "must be at least 1".into()));
        }
        if self.f_x_best_repeat_max == 0 {
            return Err(invalid("f_x_best_repeat_max", "must be at least 1".into()));
        }
        if self.reanneal_after_steps == 0 {
            return Err(invalid("reanneal_after_steps", "must be at least 1".into()));
        }
        let d = self.delta_param;
        if !(d > 0.0 && d <= 0.5) {
            return Err(invalid(
                "delta_param",
                format!("must be in (0, 0.5], got {d}"),
            ));
        }
        let p = self.cost_precision;
        if !(p.is_finite() && p >= 0.0) {
            return Err(invalid(
                "cost_precision",
                format!("must be non-negative, got {p}"),
            ));
        }
        Ok(())
    }
}

fn invalid(name: &'static str, reason: String) -> ConfigError {
    ConfigError::InvalidParameter { name, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AsaConfig::default();
        assert!((config.temperature_ratio_scale - 1e-4).abs() < 1e-15);
        assert!((config.temperature_anneal_scale - 200.0).abs() < 1e-10);
        assert!((config.cost_parameter_scale_ratio - 1.5).abs() < 1e-10);
        assert!((config.acc_gen_reanneal_ratio - 0.3).abs() < 1e-10);
        assert_eq!(config.partials_samples, 4);
        assert_eq!(config.f_x_best_repeat_max, 15);
        assert_eq!(config.reanneal_after_steps, 100);
        assert!(config.enable_reanneal);
        assert_eq!(config.max_steps, 0);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_with_seed() {
        let config = AsaConfig::default().with_seed(42);
        assert_eq!(config.seed, Some(42));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_ok() {
        assert!(AsaConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_bad_ratio() {
        for r in [0.0, 1.0, -0.5, f64::NAN] {
            let config = AsaConfig::default().with_temperature_ratio_scale(r);
            assert!(config.validate().is_err(), "ratio {r} accepted");
        }
    }

    #[test]
    fn test_validate_zero_samples() {
        let err = AsaConfig::default()
            .with_partials_samples(0)
            .validate()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidParameter {
                name: "partials_samples",
                reason: "must be at least 1".into(),
            }
        );
    }

    #[test]
    fn test_validate_zero_counts() {
        assert!(AsaConfig::default()
            .with_f_x_best_repeat_max(0)
            .validate()
            .is_err());
        assert!(AsaConfig::default()
            .with_reanneal_after_steps(0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_bad_delta() {
        assert!(AsaConfig::default().with_delta_param(0.0).validate().is_err());
        assert!(AsaConfig::default().with_delta_param(0.6).validate().is_err());
        assert!(AsaConfig::default().with_delta_param(0.5).validate().is_ok());
    }

    #[test]
    fn test_validate_bad_acc_gen_ratio() {
        let config = AsaConfig::default().with_acc_gen_reanneal_ratio(1.5);
        assert!(config.validate().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_partial_json_fills_defaults() {
        let config: AsaConfig =
            serde_json::from_str(r#"{ "partials_samples": 8, "reanneal_after_steps": 50 }"#)
                .unwrap();
        assert_eq!(config.partials_samples, 8);
        assert_eq!(config.reanneal_after_steps, 50);
        assert_eq!(config.f_x_best_repeat_max, 15);
        assert!(config.validate().is_ok());
    }
}
