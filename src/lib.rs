//! Adaptive Simulated Annealing for bounded real-valued parameters.
//!
//! Provides an ASA optimizer in two layers:
//!
//! - **[`asa::Anneal`]**: A caller-stepped state machine. The caller
//!   evaluates the cost of each requested point (or batch of probe points)
//!   and drives the loop, so evaluation can be remote, batched, or parallel.
//! - **[`asa::AsaRunner`]**: A closed-loop driver for plain cost closures,
//!   with cancellation and optional parallel probe evaluation.
//!
//! Precision is generic over [`float::AsaFloat`] (`f64` and `f32`).
//!
//! # Features
//!
//! - `parallel`: evaluates reannealing probe batches on the rayon pool.
//! - `serde`: (de)serialization of configuration, statistics and reports.

pub mod asa;
pub mod error;
pub mod float;

pub use asa::{Anneal, AnnealState, AsaConfig, AsaRunner, Request};
pub use error::{AsaError, ConfigError, ProtocolError};
pub use float::AsaFloat;
