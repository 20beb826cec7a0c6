//! Diamond Sim - Monte Carlo baseball simulation with weight calibration.
//!
//! This crate simulates the offensive half of baseball games plate
//! appearance by plate appearance, aggregates run totals over many games,
//! and fits the outcome model's weights to an observed run distribution
//! with a genetic algorithm.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Roster, simulation, and calibration configuration types
//! - `compute`: Game engine (pitcher rotation, outcome model, box scores,
//!   Monte Carlo aggregation) and the `calibration` search
//!
//! # Example
//!
//! ```rust,no_run
//! use diamond_sim::{
//!     compute::GameSimulator,
//!     schema::{Roster, SimulationConfig},
//! };
//!
//! let config = SimulationConfig {
//!     random_seed: Some(42),
//!     ..Default::default()
//! };
//!
//! let mut simulator = GameSimulator::new(Roster::example(), &config).unwrap();
//! let summary = simulator.monte_carlo_game_simulation(1000, 9).unwrap();
//!
//! println!("Mean runs per game: {:.2} (std {:.2})", summary.mean, summary.std_dev);
//! for (name, rates) in simulator.player_statistics() {
//!     println!("{name}: AVG {:.3}", rates.batting_average);
//! }
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::{GameSimulator, MonteCarloSummary, SimulationError};
pub use schema::{Roster, SimulationConfig};
