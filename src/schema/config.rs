//! Configuration types for game simulation parameters.

use serde::{Deserialize, Serialize};

use super::Roster;

/// Number of tunable genes in [`OutcomeWeights`].
pub const WEIGHT_COUNT: usize = 9;

fn default_innings() -> u32 {
    9
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Innings per game.
    #[serde(default = "default_innings")]
    pub innings: u32,
    /// Probability caps for the outcome model.
    #[serde(default)]
    pub limits: ProbabilityLimits,
    /// Outcome model weights.
    #[serde(default)]
    pub weights: OutcomeWeights,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            innings: default_innings(),
            limits: ProbabilityLimits::default(),
            weights: OutcomeWeights::default(),
            random_seed: None,
        }
    }
}

/// Upper bounds applied to the raw at-bat probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityLimits {
    /// Cap on the pitcher-adjusted on-base probability.
    pub max_on_base: f64,
    /// Cap on the strikeout probability.
    pub max_strikeout: f64,
    /// Cap on the walk probability.
    pub max_walk: f64,
}

impl Default for ProbabilityLimits {
    fn default() -> Self {
        Self {
            max_on_base: 0.6,
            max_strikeout: 0.4,
            max_walk: 0.15,
        }
    }
}

/// Tunable weights of the outcome model.
///
/// The gene order used by [`OutcomeWeights::to_genes`] is the field order
/// below: five pitcher-performance weights followed by four batter weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeWeights {
    /// Numerator of the ERA factor (league-average ERA gives ~1.0).
    pub era_weight: f64,
    /// Numerator of the WHIP factor.
    pub whip_weight: f64,
    /// Divisor of the strikeout factor.
    pub k_divisor: f64,
    /// Exponent applied to remaining stamina.
    pub stamina_exponent: f64,
    /// Pressure factor before late-inning and run penalties.
    pub pressure_base: f64,
    /// Scales the batter's on-base percentage.
    pub obp_weight: f64,
    /// Scales the share of on-base events that are hits.
    pub avg_weight: f64,
    /// Scales the extra-base factor derived from SLG/AVG.
    pub slg_weight: f64,
    /// Hit multiplier in clutch situations.
    pub clutch_factor: f64,
}

impl Default for OutcomeWeights {
    fn default() -> Self {
        Self {
            era_weight: 4.0,
            whip_weight: 1.3,
            k_divisor: 9.0,
            stamina_exponent: 1.5,
            pressure_base: 1.0,
            obp_weight: 1.0,
            avg_weight: 1.0,
            slg_weight: 1.0,
            clutch_factor: 1.1,
        }
    }
}

impl OutcomeWeights {
    /// Flatten into the gene array searched by the calibrator.
    pub fn to_genes(&self) -> [f64; WEIGHT_COUNT] {
        [
            self.era_weight,
            self.whip_weight,
            self.k_divisor,
            self.stamina_exponent,
            self.pressure_base,
            self.obp_weight,
            self.avg_weight,
            self.slg_weight,
            self.clutch_factor,
        ]
    }

    /// Rebuild weights from a gene array.
    pub fn from_genes(genes: &[f64; WEIGHT_COUNT]) -> Self {
        Self {
            era_weight: genes[0],
            whip_weight: genes[1],
            k_divisor: genes[2],
            stamina_exponent: genes[3],
            pressure_base: genes[4],
            obp_weight: genes[5],
            avg_weight: genes[6],
            slg_weight: genes[7],
            clutch_factor: genes[8],
        }
    }

    /// Gene names in array order.
    pub fn gene_names() -> [&'static str; WEIGHT_COUNT] {
        [
            "era_weight",
            "whip_weight",
            "k_divisor",
            "stamina_exponent",
            "pressure_base",
            "obp_weight",
            "avg_weight",
            "slg_weight",
            "clutch_factor",
        ]
    }
}

impl SimulationConfig {
    /// Validate configuration parameters against a roster.
    pub fn validate(&self, roster: &Roster) -> Result<(), ConfigError> {
        if self.innings == 0 {
            return Err(ConfigError::InvalidInnings);
        }
        if roster.batters.is_empty() {
            return Err(ConfigError::EmptyLineup);
        }
        if roster.pitchers.is_empty() {
            return Err(ConfigError::EmptyBullpen);
        }
        for batter in &roster.batters {
            let rates = [batter.avg, batter.obp];
            if rates.iter().any(|r| !(0.0..=1.0).contains(r)) || !(batter.slg >= 0.0) {
                return Err(ConfigError::InvalidBatter(batter.name.clone()));
            }
        }
        for pitcher in &roster.pitchers {
            if !(pitcher.era >= 0.0) || !(pitcher.whip >= 0.0) || !(pitcher.k_per_9 >= 0.0) {
                return Err(ConfigError::InvalidPitcher(pitcher.name.clone()));
            }
            if !(pitcher.stamina_capacity > 0.0) {
                return Err(ConfigError::InvalidStaminaCapacity(pitcher.name.clone()));
            }
        }
        let limits = [
            self.limits.max_on_base,
            self.limits.max_strikeout,
            self.limits.max_walk,
        ];
        if limits.iter().any(|l| !(0.0..=1.0).contains(l)) {
            return Err(ConfigError::InvalidLimits);
        }
        if self.weights.to_genes().iter().any(|w| !w.is_finite()) {
            return Err(ConfigError::InvalidWeights);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Innings per game must be non-zero")]
    InvalidInnings,
    #[error("Lineup must contain at least one batter")]
    EmptyLineup,
    #[error("Bullpen must contain at least one pitcher")]
    EmptyBullpen,
    #[error("Batter {0} has rate statistics outside [0, 1]")]
    InvalidBatter(String),
    #[error("Pitcher {0} has negative or non-finite statistics")]
    InvalidPitcher(String),
    #[error("Pitcher {0} must have positive stamina capacity")]
    InvalidStaminaCapacity(String),
    #[error("Probability limits must lie in [0, 1]")]
    InvalidLimits,
    #[error("Outcome weights must be finite")]
    InvalidWeights,
}
