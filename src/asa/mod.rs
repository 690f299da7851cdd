//! Adaptive Simulated Annealing (ASA).
//!
//! Minimizes a cost function over a bounded box of real parameters. Each
//! parameter has its own generating temperature that follows the root-law
//! schedule `T(k) = T_0 * exp(-c * k^(1/D))`. Candidates are drawn from a
//! heavy-tailed distribution whose width shrinks with that temperature.
//! Periodically the annealer probes the cost around the current point,
//! estimates how sensitive the cost is to each parameter, and reheats the
//! flat directions so all parameters keep exploring at comparable cost
//! scales.
//!
//! The core is [`Anneal`], a state machine that never calls the objective:
//! the caller evaluates whatever the annealer requests, which keeps
//! expensive, external, or batched evaluation under caller control.
//! [`AsaRunner`] wraps it in a closed loop for plain closures.
//!
//! # References
//!
//! - Ingber (1989), "Very Fast Simulated Re-Annealing"
//! - Ingber (1993), "Simulated Annealing: Practice versus Theory"
//! - Ingber (1996), "Adaptive Simulated Annealing (ASA): Lessons Learned"

mod acceptance;
mod config;
mod generator;
mod machine;
mod reanneal;
mod runner;
mod schedule;
mod space;
mod stats;
mod types;

pub use acceptance::{acceptance_probability, metropolis, Decision};
pub use config::AsaConfig;
pub use generator::{generate, generating_step};
pub use machine::{Anneal, AnnealReport, AnnealState, Request, StopReason};
pub use reanneal::{cost_spread, Probe, SensitivityEstimator};
pub use runner::{AsaResult, AsaRunner};
pub use schedule::TemperatureSchedule;
pub use space::{Bounds, ParameterSpace};
pub use stats::AnnealStats;
pub use types::AsaObjective;
