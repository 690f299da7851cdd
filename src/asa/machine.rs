//! The caller-stepped annealing state machine.

use std::cmp::Ordering;

use rand::Rng;
use tracing::{debug, info, trace, warn};

use super::acceptance;
use super::config::AsaConfig;
use super::generator;
use super::reanneal::{self, SensitivityEstimator};
use super::schedule::TemperatureSchedule;
use super::space::{Bounds, ParameterSpace};
use super::stats::AnnealStats;
use crate::error::{AsaError, ConfigError, ProtocolError};
use crate::float::AsaFloat;

/// Where the annealer is in its protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnnealState {
    /// Constructed; waiting for the starting cost via `init()`.
    Uninitialised,
    /// One candidate cost is requested.
    NeedToCompute,
    /// A batch of probe costs is requested for reannealing.
    NeedToComputeSet,
    /// Terminal. The caller must stop driving the loop.
    ReadyToStop,
    /// `init()` failed. Terminal.
    Unusable,
}

/// Why the annealer stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopReason {
    /// The best cost did not improve for `f_x_best_repeat_max` periods.
    BestRepeated,
    /// `max_steps` was reached.
    StepBudget,
    /// Every generating temperature fell below its final value.
    FinalTemperature,
}

/// The evaluation the annealer is waiting for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Request<'a, F> {
    /// Evaluate the starting point and pass the cost to `init()`.
    Initial(&'a [F]),
    /// Evaluate `x_cand` and pass the cost to `supply_candidate()`.
    Candidate(&'a [F]),
    /// Evaluate every probe point and pass the costs to `supply_samples()`.
    /// The evaluations are independent and may run in parallel.
    Batch(&'a [Vec<F>]),
    /// Nothing more to evaluate.
    Done,
}

/// Summary of a run, available at any time and final once stopped.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnealReport<F> {
    pub x_best: Vec<F>,
    pub f_x_best: F,
    pub steps: usize,
    pub num_improved: usize,
    pub num_worse: usize,
    pub num_worse_accepted: usize,
    pub num_reanneals: usize,
    pub stop_reason: Option<StopReason>,
}

impl<F> AnnealReport<F> {
    /// Fraction of worse candidates that were accepted.
    pub fn acceptance_rate(&self) -> Option<f64> {
        (self.num_worse > 0).then(|| self.num_worse_accepted as f64 / self.num_worse as f64)
    }
}

/// Adaptive Simulated Annealing as a caller-stepped state machine.
///
/// The annealer never evaluates the objective itself. Each cycle the
/// caller reads the pending [`Request`], supplies the requested cost(s)
/// and calls [`step`](Self::step), until the state is
/// [`AnnealState::ReadyToStop`].
///
/// # Examples
///
/// ```
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
/// use u_asa::asa::{Anneal, AnnealState, AsaConfig, Request};
///
/// let bowl = |p: &[f64]| p[0] * p[0] + p[1] * p[1];
///
/// let mut anneal = Anneal::new(
///     vec![0.45_f64, 0.45],
///     [(-1.0, 1.0), (-1.0, 1.0)],
///     AsaConfig::default(),
///     StdRng::seed_from_u64(42),
/// );
/// anneal.init(bowl(anneal.x())).unwrap();
///
/// while anneal.state() != AnnealState::ReadyToStop {
///     match anneal.request() {
///         Request::Candidate(x) => {
///             let f = bowl(x);
///             anneal.supply_candidate(f).unwrap();
///         }
///         Request::Batch(set) => {
///             let costs: Vec<f64> = set.iter().map(|p| bowl(p)).collect();
///             anneal.supply_samples(&costs).unwrap();
///         }
///         _ => unreachable!(),
///     }
///     anneal.step().unwrap();
/// }
///
/// assert!(anneal.f_x_best() < 1e-3);
/// ```
#[derive(Debug, Clone)]
pub struct Anneal<F, R> {
    config: AsaConfig,
    space: ParameterSpace<F>,
    rng: R,
    state: AnnealState,
    stop_reason: Option<StopReason>,
    schedule: TemperatureSchedule<F>,
    estimator: SensitivityEstimator<F>,
    stats: AnnealStats,

    x: Vec<F>,
    f_x: F,
    x_cand: Vec<F>,
    f_x_cand: Option<F>,
    x_best: Vec<F>,
    f_x_best: F,
    x_set: Vec<Vec<F>>,
    f_x_set: Vec<Option<F>>,

    k_cost: F,
    k_gen: Vec<F>,
    t_cost: F,
    t_gen: Vec<F>,
}

impl<F: AsaFloat, R: Rng> Anneal<F, R> {
    /// Creates an annealer at starting point `x` with one bound per
    /// parameter. Nothing is validated until [`init`](Self::init).
    pub fn new<B: Into<Bounds<F>>>(
        x: Vec<F>,
        bounds: impl IntoIterator<Item = B>,
        config: AsaConfig,
        rng: R,
    ) -> Self {
        Self::with_space(x, ParameterSpace::new(bounds), config, rng)
    }

    /// Like [`new`](Self::new), with a prebuilt [`ParameterSpace`].
    pub fn with_space(x: Vec<F>, space: ParameterSpace<F>, config: AsaConfig, rng: R) -> Self {
        let dims = space.dims();
        let schedule = TemperatureSchedule::new(&config, dims.max(1), F::one());
        Self {
            estimator: SensitivityEstimator::new(dims),
            stats: AnnealStats::default(),
            state: AnnealState::Uninitialised,
            stop_reason: None,
            x_cand: x.clone(),
            x_best: x.clone(),
            x,
            f_x: F::zero(),
            f_x_cand: None,
            f_x_best: F::zero(),
            x_set: Vec::new(),
            f_x_set: Vec::new(),
            k_cost: F::zero(),
            k_gen: vec![F::zero(); dims],
            t_cost: schedule.initial_cost_temperature(),
            t_gen: (0..dims)
                .map(|d| schedule.initial_generating_temperature(d))
                .collect(),
            schedule,
            config,
            space,
            rng,
        }
    }

    /// Validates the inputs and starts the run from cost `f_x` of the
    /// starting point.
    ///
    /// On a configuration error nothing but the state changes: the
    /// annealer becomes [`AnnealState::Unusable`] and rejects every later
    /// call.
    pub fn init(&mut self, f_x: F) -> Result<(), AsaError> {
        match self.state {
            AnnealState::Uninitialised => {}
            AnnealState::Unusable => return Err(ProtocolError::Unusable.into()),
            _ => return Err(ProtocolError::AlreadyInitialised.into()),
        }
        if let Err(e) = self.validate(f_x) {
            warn!(error = %e, "annealer rejected its configuration");
            self.state = AnnealState::Unusable;
            return Err(e.into());
        }

        let dims = self.space.dims();
        self.schedule = TemperatureSchedule::new(&self.config, dims, f_x);
        self.estimator = SensitivityEstimator::new(dims);
        self.stats = AnnealStats::default();
        self.f_x = f_x;
        self.x_best = self.x.clone();
        self.f_x_best = f_x;
        self.k_cost = F::zero();
        self.k_gen = vec![F::zero(); dims];
        self.refresh_temperatures();

        debug!(
            dims,
            f_x = f_x.into_f64(),
            t_cost_0 = self.t_cost.into_f64(),
            c_gen = self.schedule.generating_rate().into_f64(),
            "annealer initialised"
        );
        self.request_candidate();
        Ok(())
    }

    fn validate(&self, f_x: F) -> Result<(), ConfigError> {
        self.config.validate()?;
        self.space.validate(&self.x)?;
        if !f_x.is_finite() {
            return Err(ConfigError::NonFiniteStart);
        }
        Ok(())
    }

    /// Supplies the cost of `x_cand`.
    pub fn supply_candidate(&mut self, f: F) -> Result<(), AsaError> {
        self.expect_state(AnnealState::NeedToCompute)?;
        self.f_x_cand = Some(finite(f)?);
        Ok(())
    }

    /// Supplies the cost of probe `index` of `x_set`.
    pub fn supply_sample(&mut self, index: usize, f: F) -> Result<(), AsaError> {
        self.expect_state(AnnealState::NeedToComputeSet)?;
        let len = self.f_x_set.len();
        let slot = self
            .f_x_set
            .get_mut(index)
            .ok_or(ProtocolError::SampleIndexOutOfRange { index, len })?;
        *slot = Some(finite(f)?);
        Ok(())
    }

    /// Supplies the costs of every probe of `x_set`, in order.
    pub fn supply_samples(&mut self, costs: &[F]) -> Result<(), AsaError> {
        self.expect_state(AnnealState::NeedToComputeSet)?;
        if costs.len() != self.x_set.len() {
            return Err(ProtocolError::SampleCountMismatch {
                expected: self.x_set.len(),
                got: costs.len(),
            }
            .into());
        }
        for &f in costs {
            finite(f)?;
        }
        self.f_x_set = costs.iter().map(|&f| Some(f)).collect();
        Ok(())
    }

    /// Advances the annealer by one transition.
    ///
    /// The cost(s) requested by the current state must have been supplied.
    /// Returns the new state.
    pub fn step(&mut self) -> Result<AnnealState, AsaError> {
        match self.state {
            AnnealState::NeedToCompute => self.step_candidate()?,
            AnnealState::NeedToComputeSet => self.step_batch()?,
            state => return Err(state_error(state).into()),
        }
        Ok(self.state)
    }

    fn step_candidate(&mut self) -> Result<(), AsaError> {
        let f_cand = self
            .f_x_cand
            .take()
            .ok_or(ProtocolError::MissingCandidateObjective)?;

        let decision = acceptance::metropolis(self.f_x, f_cand, self.t_cost, &mut self.rng);
        self.stats.record(decision);
        trace!(
            step = self.stats.steps,
            ?decision,
            f_x = self.f_x.into_f64(),
            f_cand = f_cand.into_f64(),
            t_cost = self.t_cost.into_f64(),
            "candidate judged"
        );
        if decision.accepted() {
            self.x.copy_from_slice(&self.x_cand);
            self.f_x = f_cand;
        }
        if f_cand < self.f_x_best {
            self.note_best(f_cand);
            self.x_best.copy_from_slice(&self.x_cand);
        }

        self.k_cost = self.k_cost + F::one();
        for k in &mut self.k_gen {
            *k = *k + F::one();
        }
        self.refresh_temperatures();

        let period_closed = self
            .stats
            .steps
            .is_multiple_of(self.config.reanneal_after_steps);
        if period_closed {
            self.stats.close_period();
        }
        if self.check_stop() {
            return Ok(());
        }
        if period_closed && self.config.enable_reanneal {
            self.request_batch();
        } else {
            self.request_candidate();
        }
        Ok(())
    }

    fn step_batch(&mut self) -> Result<(), AsaError> {
        let mut costs = Vec::with_capacity(self.f_x_set.len());
        for (index, f) in self.f_x_set.iter().enumerate() {
            costs.push(f.ok_or(ProtocolError::MissingSampleObjective { index })?);
        }

        self.estimator.absorb(self.f_x, &costs, &self.space);
        let rescaled = self.estimator.rescale(&self.schedule, &mut self.k_gen);
        self.reanneal_cost(&costs);

        let lowest = costs
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(Ordering::Equal));
        if let Some((i, &f)) = lowest {
            if f < self.f_x_best {
                self.note_best(f);
                self.x_best.copy_from_slice(&self.x_set[i]);
            }
        }

        self.stats.record_reanneal();
        self.refresh_temperatures();
        debug!(
            reanneal = self.stats.num_reanneals,
            rescaled,
            f_x_best = self.f_x_best.into_f64(),
            t_cost = self.t_cost.into_f64(),
            "reannealed"
        );

        self.x_set.clear();
        self.f_x_set.clear();
        if !self.check_stop() {
            self.request_candidate();
        }
        Ok(())
    }

    /// Reheats the cost temperature to the probe cost spread when too few
    /// candidates were accepted during the closing period.
    fn reanneal_cost(&mut self, costs: &[F]) {
        let Some(ratio) = self.stats.period_acceptance_ratio() else {
            return;
        };
        if ratio >= self.config.acc_gen_reanneal_ratio {
            return;
        }
        let t_now = self.schedule.cost_temperature(self.k_cost);
        let t_new = reanneal::cost_spread(self.f_x, costs)
            .max(t_now)
            .min(self.schedule.initial_cost_temperature());
        if t_new > t_now {
            self.k_cost = self.schedule.cost_index(t_new);
            debug!(
                ratio,
                t_from = t_now.into_f64(),
                t_to = t_new.into_f64(),
                "cost temperature reannealed"
            );
        }
    }

    fn note_best(&mut self, f: F) {
        let precision = F::cast(self.config.cost_precision);
        if f < self.f_x_best - precision {
            self.stats.record_best_improvement();
        }
        self.f_x_best = f;
    }

    fn refresh_temperatures(&mut self) {
        self.t_cost = self.schedule.cost_temperature(self.k_cost);
        for (d, t) in self.t_gen.iter_mut().enumerate() {
            *t = self.schedule.generating_temperature(d, self.k_gen[d]);
        }
    }

    fn request_candidate(&mut self) {
        self.x_cand = generator::generate(&self.x, &self.t_gen, &self.space, &mut self.rng);
        self.f_x_cand = None;
        self.state = AnnealState::NeedToCompute;
    }

    fn request_batch(&mut self) {
        let delta = F::cast(self.config.delta_param);
        self.x_set = self.estimator.plan(
            &self.x,
            &self.space,
            self.config.partials_samples,
            delta,
        );
        self.f_x_set = vec![None; self.x_set.len()];
        self.state = AnnealState::NeedToComputeSet;
    }

    /// Moves to `ReadyToStop` if any stopping condition holds.
    fn check_stop(&mut self) -> bool {
        let reason = if self.stats.f_x_best_repeat_count >= self.config.f_x_best_repeat_max {
            Some(StopReason::BestRepeated)
        } else if self.config.max_steps > 0 && self.stats.steps >= self.config.max_steps {
            Some(StopReason::StepBudget)
        } else if self.config.exit_at_final_temperature
            && self
                .t_gen
                .iter()
                .enumerate()
                .all(|(d, &t)| t <= self.schedule.final_generating_temperature(d))
        {
            Some(StopReason::FinalTemperature)
        } else {
            None
        };
        let Some(reason) = reason else {
            return false;
        };
        self.state = AnnealState::ReadyToStop;
        self.stop_reason = Some(reason);
        self.x_set.clear();
        self.f_x_set.clear();
        info!(
            ?reason,
            steps = self.stats.steps,
            f_x_best = self.f_x_best.into_f64(),
            reanneals = self.stats.num_reanneals,
            "annealing finished"
        );
        true
    }

    fn expect_state(&self, wanted: AnnealState) -> Result<(), ProtocolError> {
        if self.state == wanted {
            Ok(())
        } else {
            Err(state_error(self.state))
        }
    }
}

impl<F: AsaFloat, R> Anneal<F, R> {
    pub fn state(&self) -> AnnealState {
        self.state
    }

    /// The evaluation currently awaited.
    pub fn request(&self) -> Request<'_, F> {
        match self.state {
            AnnealState::Uninitialised => Request::Initial(&self.x),
            AnnealState::NeedToCompute => Request::Candidate(&self.x_cand),
            AnnealState::NeedToComputeSet => Request::Batch(&self.x_set),
            AnnealState::ReadyToStop | AnnealState::Unusable => Request::Done,
        }
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    pub fn config(&self) -> &AsaConfig {
        &self.config
    }

    pub fn space(&self) -> &ParameterSpace<F> {
        &self.space
    }

    pub fn schedule(&self) -> &TemperatureSchedule<F> {
        &self.schedule
    }

    pub fn dims(&self) -> usize {
        self.space.dims()
    }

    /// Current (last accepted) point.
    pub fn x(&self) -> &[F] {
        &self.x
    }

    pub fn f_x(&self) -> F {
        self.f_x
    }

    pub fn x_cand(&self) -> &[F] {
        &self.x_cand
    }

    pub fn f_x_cand(&self) -> Option<F> {
        self.f_x_cand
    }

    pub fn x_best(&self) -> &[F] {
        &self.x_best
    }

    pub fn f_x_best(&self) -> F {
        self.f_x_best
    }

    /// Probe points awaiting costs; empty outside `NeedToComputeSet`.
    pub fn x_set(&self) -> &[Vec<F>] {
        &self.x_set
    }

    pub fn f_x_set(&self) -> &[Option<F>] {
        &self.f_x_set
    }

    pub fn cost_temperature(&self) -> F {
        self.t_cost
    }

    pub fn generating_temperatures(&self) -> &[F] {
        &self.t_gen
    }

    pub fn cost_index(&self) -> F {
        self.k_cost
    }

    pub fn generating_indices(&self) -> &[F] {
        &self.k_gen
    }

    /// Latest per-parameter sensitivity estimates.
    pub fn sensitivities(&self) -> &[Option<F>] {
        self.estimator.sensitivities()
    }

    pub fn stats(&self) -> &AnnealStats {
        &self.stats
    }

    pub fn report(&self) -> AnnealReport<F> {
        AnnealReport {
            x_best: self.x_best.clone(),
            f_x_best: self.f_x_best,
            steps: self.stats.steps,
            num_improved: self.stats.num_improved,
            num_worse: self.stats.num_worse,
            num_worse_accepted: self.stats.num_worse_accepted,
            num_reanneals: self.stats.num_reanneals,
            stop_reason: self.stop_reason,
        }
    }
}

fn finite<F: AsaFloat>(f: F) -> Result<F, ProtocolError> {
    if f.is_finite() {
        Ok(f)
    } else {
        Err(ProtocolError::NonFiniteObjective {
            value: f.into_f64(),
        })
    }
}

fn state_error(state: AnnealState) -> ProtocolError {
    match state {
        AnnealState::Uninitialised => ProtocolError::NotInitialised,
        AnnealState::Unusable => ProtocolError::Unusable,
        AnnealState::ReadyToStop => ProtocolError::AlreadyStopped,
        state => ProtocolError::UnexpectedSupply { state },
    }
}
