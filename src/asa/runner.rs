//! Closed-loop ASA driver.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use super::config::AsaConfig;
use super::machine::{Anneal, AnnealReport, AnnealState, Request};
use super::space::Bounds;
use super::types::AsaObjective;
use crate::error::AsaError;
use crate::float::AsaFloat;

/// Result of an [`AsaRunner`] run.
#[derive(Debug, Clone)]
pub struct AsaResult<F> {
    /// Final report of the annealer.
    pub report: AnnealReport<F>,

    /// Total objective evaluations, including the starting point and probes.
    pub evaluations: usize,

    /// Whether cancelled externally.
    pub cancelled: bool,

    /// Best cost at the start and at the end of every reannealing period.
    pub cost_history: Vec<F>,
}

/// Drives an [`Anneal`] against an [`AsaObjective`] until it stops.
pub struct AsaRunner;

impl AsaRunner {
    /// Runs ASA from `x0` within `bounds`.
    pub fn run<F, O, B>(
        objective: &O,
        x0: Vec<F>,
        bounds: impl IntoIterator<Item = B>,
        config: &AsaConfig,
    ) -> Result<AsaResult<F>, AsaError>
    where
        F: AsaFloat,
        O: AsaObjective<F>,
        B: Into<Bounds<F>>,
    {
        Self::run_with_cancel(objective, x0, bounds, config, None)
    }

    /// Runs ASA with an optional cancellation token.
    ///
    /// Probe batches are evaluated in parallel when the `parallel` feature
    /// is enabled.
    pub fn run_with_cancel<F, O, B>(
        objective: &O,
        x0: Vec<F>,
        bounds: impl IntoIterator<Item = B>,
        config: &AsaConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<AsaResult<F>, AsaError>
    where
        F: AsaFloat,
        O: AsaObjective<F>,
        B: Into<Bounds<F>>,
    {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };
        let mut anneal = Anneal::new(x0, bounds, config.clone(), rng);

        let f_x0 = objective.cost(anneal.x());
        anneal.init(f_x0)?;
        let mut evaluations = 1usize;
        let mut cost_history = vec![anneal.f_x_best()];
        let mut cancelled = false;

        while anneal.state() != AnnealState::ReadyToStop {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }

            match anneal.request() {
                Request::Candidate(x) => {
                    let f = objective.cost(x);
                    evaluations += 1;
                    anneal.supply_candidate(f)?;
                }
                Request::Batch(set) => {
                    let costs = evaluate_batch(objective, set);
                    evaluations += costs.len();
                    cost_history.push(anneal.f_x_best());
                    anneal.supply_samples(&costs)?;
                }
                Request::Initial(_) | Request::Done => break,
            }
            anneal.step()?;
        }

        if cost_history
            .last()
            .is_none_or(|&last| last != anneal.f_x_best())
        {
            cost_history.push(anneal.f_x_best());
        }

        debug!(evaluations, cancelled, "runner finished");
        Ok(AsaResult {
            report: anneal.report(),
            evaluations,
            cancelled,
            cost_history,
        })
    }
}

#[cfg(feature = "parallel")]
fn evaluate_batch<F: AsaFloat, O: AsaObjective<F>>(objective: &O, set: &[Vec<F>]) -> Vec<F> {
    use rayon::prelude::*;
    set.par_iter().map(|p| objective.cost(p)).collect()
}

#[cfg(not(feature = "parallel"))]
fn evaluate_batch<F: AsaFloat, O: AsaObjective<F>>(objective: &O, set: &[Vec<F>]) -> Vec<F> {
    set.iter().map(|p| objective.cost(p)).collect()
}
