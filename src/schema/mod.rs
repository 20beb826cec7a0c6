//! Schema module - Roster, configuration and calibration types.

mod calibration;
mod config;
mod roster;

pub use calibration::*;
pub use config::*;
pub use roster::*;
