//! Calibration module for fitting outcome weights to observed run totals.
//!
//! A genetic algorithm searches the nine-gene [`OutcomeWeights`] space for
//! the vector whose simulated runs-per-game distribution best matches a
//! target distribution.
//!
//! # Overview
//!
//! The calibration system consists of:
//!
//! - **Fitness** (`fitness`): Monte Carlo evaluation scored against the target
//! - **Genome Operations** (`genome`): Random generation, crossover, and mutation
//! - **Search** (`search`): Tournament-selection GA with elitism
//!
//! # Example
//!
//! ```rust,no_run
//! use diamond_sim::schema::{CalibrationConfig, Roster, TargetDistribution};
//! use diamond_sim::compute::calibration::CalibrationEngine;
//!
//! let config = CalibrationConfig {
//!     target: TargetDistribution::from_runs(&[3, 5, 2, 7, 4, 0, 6]),
//!     ..Default::default()
//! };
//!
//! let mut engine = CalibrationEngine::new(config, Roster::example()).unwrap();
//! let result = engine.evolve_with_callback(|progress| {
//!     println!("Generation {}: best fitness = {:.3}",
//!         progress.generation, progress.best_fitness);
//! });
//!
//! println!("Best weights: {:?}", result.best_weights);
//! ```
//!
//! [`OutcomeWeights`]: crate::schema::OutcomeWeights

mod fitness;
mod genome;
mod search;

pub use fitness::{Evaluation, FitnessEvaluator, distribution_score, histogram_distance};
pub use genome::{WeightRng, preset_weights, weight_distance};
pub use search::{CalibrationEngine, Candidate};
