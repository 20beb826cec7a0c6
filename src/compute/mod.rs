//! Compute module - Stochastic game simulation and weight calibration.

mod box_score;
mod game;
mod monte_carlo;
mod outcome;
mod rotation;

pub mod calibration;

pub use box_score::*;
pub use game::*;
pub use monte_carlo::*;
pub use outcome::*;
pub use rotation::*;

use crate::schema::ConfigError;

/// Error type for game simulation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error("Pitcher pool exhausted: no eligible pitcher for inning {inning}")]
    NoEligiblePitcher { inning: u32 },
    #[error("Number of simulations must be positive")]
    NoSimulations,
    #[error("Invalid simulation configuration: {0}")]
    Config(#[from] ConfigError),
}
