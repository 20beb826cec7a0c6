//! Calibration configuration types for fitting outcome weights.
//!
//! This module provides types for configuring the genetic search that tunes
//! [`OutcomeWeights`] until simulated run distributions match an observed
//! target.

use serde::{Deserialize, Serialize};

use super::{ConfigError, OutcomeWeights, ProbabilityLimits, WEIGHT_COUNT};

/// Top-level configuration for weight calibration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Observed run distribution to match.
    pub target: TargetDistribution,
    /// Genetic algorithm operators.
    #[serde(default)]
    pub algorithm: GeneticAlgorithmConfig,
    /// Population and generation settings.
    #[serde(default)]
    pub population: PopulationConfig,
    /// Evaluation settings (games per candidate, etc.).
    #[serde(default)]
    pub evaluation: EvaluationConfig,
    /// Per-gene search bounds.
    #[serde(default)]
    pub bounds: WeightBounds,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            target: TargetDistribution::default(),
            algorithm: GeneticAlgorithmConfig::default(),
            population: PopulationConfig::default(),
            evaluation: EvaluationConfig::default(),
            bounds: WeightBounds::default(),
            random_seed: None,
        }
    }
}

/// Observed runs-per-game distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetDistribution {
    /// Mean runs per game.
    pub mean: f64,
    /// Standard deviation of runs per game.
    pub std_dev: f64,
    /// Optional game counts indexed by runs scored (index 0 = shutouts).
    #[serde(default)]
    pub histogram: Option<Vec<f64>>,
}

impl Default for TargetDistribution {
    fn default() -> Self {
        // Roughly a modern MLB season.
        Self {
            mean: 4.5,
            std_dev: 3.1,
            histogram: None,
        }
    }
}

impl TargetDistribution {
    /// Build a target from an observed runs-per-game log.
    pub fn from_runs(runs: &[u32]) -> Self {
        if runs.is_empty() {
            return Self {
                mean: 0.0,
                std_dev: 0.0,
                histogram: None,
            };
        }
        let n = runs.len() as f64;
        let mean = runs.iter().map(|&r| r as f64).sum::<f64>() / n;
        let variance = runs.iter().map(|&r| (r as f64 - mean).powi(2)).sum::<f64>() / n;

        let max = runs.iter().copied().max().unwrap_or(0) as usize;
        let mut histogram = vec![0.0; max + 1];
        for &r in runs {
            histogram[r as usize] += 1.0;
        }

        Self {
            mean,
            std_dev: variance.sqrt(),
            histogram: Some(histogram),
        }
    }

    /// Whether the histogram can be compared against simulated games.
    pub fn has_histogram(&self) -> bool {
        self.histogram
            .as_ref()
            .is_some_and(|h| h.iter().sum::<f64>() > 0.0)
    }
}

/// Genetic Algorithm configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneticAlgorithmConfig {
    /// Tournament size for parent selection.
    #[serde(default = "default_tournament_size")]
    pub tournament_size: usize,
    /// Probability that a parent pair exchanges genes (0.0-1.0).
    #[serde(default = "default_crossover_rate")]
    pub crossover_rate: f64,
    /// Probability of blending one gene of the first child (0.0-1.0).
    #[serde(default = "default_interpolation_rate")]
    pub interpolation_rate: f64,
    /// Mutation probability per gene (0.0-1.0).
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
    /// Probability a mutation is a local jitter rather than a resample.
    #[serde(default = "default_local_mutation_rate")]
    pub local_mutation_rate: f64,
    /// Jitter standard deviation as a fraction of the gene range.
    #[serde(default = "default_mutation_strength")]
    pub mutation_strength: f64,
    /// Elitism: number of best individuals to preserve unchanged.
    #[serde(default = "default_elitism")]
    pub elitism: usize,
}

impl Default for GeneticAlgorithmConfig {
    fn default() -> Self {
        Self {
            tournament_size: default_tournament_size(),
            crossover_rate: default_crossover_rate(),
            interpolation_rate: default_interpolation_rate(),
            mutation_rate: default_mutation_rate(),
            local_mutation_rate: default_local_mutation_rate(),
            mutation_strength: default_mutation_strength(),
            elitism: default_elitism(),
        }
    }
}

fn default_tournament_size() -> usize {
    3
}
fn default_crossover_rate() -> f64 {
    0.7
}
fn default_interpolation_rate() -> f64 {
    0.3
}
fn default_mutation_rate() -> f64 {
    0.15
}
fn default_local_mutation_rate() -> f64 {
    0.8
}
fn default_mutation_strength() -> f64 {
    0.1
}
fn default_elitism() -> usize {
    2
}

/// Population configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Individuals per generation.
    #[serde(default = "default_population_size")]
    pub size: usize,
    /// Maximum number of generations.
    #[serde(default = "default_max_generations")]
    pub max_generations: usize,
    /// Stop as soon as the best fitness exceeds this value.
    #[serde(default = "default_early_stop_fitness")]
    pub early_stop_fitness: f64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            size: default_population_size(),
            max_generations: default_max_generations(),
            early_stop_fitness: default_early_stop_fitness(),
        }
    }
}

fn default_population_size() -> usize {
    20
}
fn default_max_generations() -> usize {
    30
}
fn default_early_stop_fitness() -> f64 {
    0.95
}

/// Evaluation settings for each candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Monte Carlo games simulated per candidate.
    #[serde(default = "default_games")]
    pub games: usize,
    /// Innings per simulated game.
    #[serde(default = "default_innings")]
    pub innings: u32,
    /// Probability caps used by every candidate's outcome model.
    #[serde(default)]
    pub limits: ProbabilityLimits,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            games: default_games(),
            innings: default_innings(),
            limits: ProbabilityLimits::default(),
        }
    }
}

fn default_games() -> usize {
    100
}
fn default_innings() -> u32 {
    9
}

/// Search bounds for each weight gene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightBounds {
    pub era_weight: (f64, f64),
    pub whip_weight: (f64, f64),
    pub k_divisor: (f64, f64),
    pub stamina_exponent: (f64, f64),
    pub pressure_base: (f64, f64),
    pub obp_weight: (f64, f64),
    pub avg_weight: (f64, f64),
    pub slg_weight: (f64, f64),
    pub clutch_factor: (f64, f64),
}

impl Default for WeightBounds {
    fn default() -> Self {
        Self {
            era_weight: (1.0, 10.0),
            whip_weight: (0.5, 3.0),
            k_divisor: (5.0, 15.0),
            stamina_exponent: (1.0, 3.0),
            pressure_base: (0.5, 1.5),
            obp_weight: (0.5, 2.0),
            avg_weight: (0.5, 2.0),
            slg_weight: (0.5, 2.0),
            clutch_factor: (1.0, 1.5),
        }
    }
}

impl WeightBounds {
    /// Bounds in gene order.
    pub fn as_array(&self) -> [(f64, f64); WEIGHT_COUNT] {
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

    /// Clamp every gene of `weights` into bounds.
    pub fn clamp(&self, weights: &OutcomeWeights) -> OutcomeWeights {
        let bounds = self.as_array();
        let mut genes = weights.to_genes();
        for (gene, (lo, hi)) in genes.iter_mut().zip(bounds) {
            *gene = gene.clamp(lo, hi);
        }
        OutcomeWeights::from_genes(&genes)
    }

    /// Whether every gene of `weights` lies within bounds.
    pub fn contains(&self, weights: &OutcomeWeights) -> bool {
        weights
            .to_genes()
            .iter()
            .zip(self.as_array())
            .all(|(g, (lo, hi))| *g >= lo && *g <= hi)
    }
}

// ============================================================================
// Progress and Result Types
// ============================================================================

/// Progress update emitted after every evaluated generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationProgress {
    /// Current generation number.
    pub generation: usize,
    /// Total generations planned.
    pub total_generations: usize,
    /// Best fitness seen so far.
    pub best_fitness: f64,
    /// Average fitness of current population.
    pub avg_fitness: f64,
    /// Best fitness this generation.
    pub generation_best: f64,
    /// Current best candidate.
    pub best_candidate: Option<CandidateSnapshot>,
    /// Statistics history for plotting.
    pub history: CalibrationHistory,
}

/// Snapshot of an evaluated candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSnapshot {
    /// Unique identifier.
    pub id: u64,
    /// Fitness score.
    pub fitness: f64,
    /// Candidate weights.
    pub weights: OutcomeWeights,
    /// Simulated mean runs per game.
    pub simulated_mean: f64,
    /// Simulated standard deviation of runs per game.
    pub simulated_std_dev: f64,
    /// Generation this candidate was created.
    pub generation: usize,
    /// Parent IDs (for genealogy).
    pub parents: Vec<u64>,
}

/// Calibration history for plotting.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CalibrationHistory {
    /// Global best fitness after each generation (non-decreasing).
    pub best_fitness: Vec<f64>,
    /// Best fitness within each generation.
    pub generation_best: Vec<f64>,
    /// Average fitness per generation.
    pub avg_fitness: Vec<f64>,
    /// Standard deviation of fitness per generation.
    pub fitness_std: Vec<f64>,
    /// Mean pairwise gene distance per generation.
    pub diversity: Vec<f64>,
}

/// Final result of a calibration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationResult {
    /// Best weights found across all generations.
    pub best_weights: OutcomeWeights,
    /// Fitness of `best_weights`.
    pub best_fitness: f64,
    /// Best candidate with its simulated moments.
    pub best: CandidateSnapshot,
    /// Statistics from the run.
    pub stats: CalibrationStats,
    /// Full history for analysis.
    pub history: CalibrationHistory,
}

/// Statistics from a calibration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationStats {
    /// Generations bred after the initial population.
    pub generations: usize,
    /// Total candidate evaluations performed.
    pub total_evaluations: u64,
    /// Evaluations aborted by an exhausted bullpen.
    pub failed_evaluations: u64,
    /// Time taken (in seconds).
    pub elapsed_seconds: f64,
    /// Reason for stopping.
    pub stop_reason: StopReason,
}

/// Reason calibration stopped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum StopReason {
    /// Reached maximum generations.
    MaxGenerations,
    /// Best fitness exceeded the early-stop threshold.
    TargetReached,
}

// ============================================================================
// Validation
// ============================================================================

/// Calibration configuration validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalibrationConfigError {
    #[error("Population size must be at least 2")]
    PopulationTooSmall,
    #[error("Generation budget must be positive")]
    NoGenerations,
    #[error("Evaluation must simulate at least one game of at least one inning")]
    InvalidEvaluation,
    #[error("Elitism ({elitism}) must be smaller than the population ({size})")]
    TooManyElites { elitism: usize, size: usize },
    #[error("Tournament size must be positive")]
    InvalidTournament,
    #[error("Invalid rate: {0}")]
    InvalidRate(String),
    #[error("Invalid parameter bounds: {0}")]
    InvalidBounds(String),
    #[error("Invalid target distribution: {0}")]
    InvalidTarget(String),
    #[error("Roster validation failed: {0}")]
    RosterError(#[from] ConfigError),
}

impl CalibrationConfig {
    /// Validate calibration configuration.
    pub fn validate(&self) -> Result<(), CalibrationConfigError> {
        if self.population.size < 2 {
            return Err(CalibrationConfigError::PopulationTooSmall);
        }
        if self.population.max_generations == 0 {
            return Err(CalibrationConfigError::NoGenerations);
        }
        if self.evaluation.games == 0 || self.evaluation.innings == 0 {
            return Err(CalibrationConfigError::InvalidEvaluation);
        }
        if self.algorithm.elitism >= self.population.size {
            return Err(CalibrationConfigError::TooManyElites {
                elitism: self.algorithm.elitism,
                size: self.population.size,
            });
        }
        if self.algorithm.tournament_size == 0 {
            return Err(CalibrationConfigError::InvalidTournament);
        }

        let rates = [
            ("crossover_rate", self.algorithm.crossover_rate),
            ("interpolation_rate", self.algorithm.interpolation_rate),
            ("mutation_rate", self.algorithm.mutation_rate),
            ("local_mutation_rate", self.algorithm.local_mutation_rate),
        ];
        for (name, rate) in rates {
            if !(0.0..=1.0).contains(&rate) {
                return Err(CalibrationConfigError::InvalidRate(format!(
                    "{} ({}) must lie in [0, 1]",
                    name, rate
                )));
            }
        }

        for (name, (lo, hi)) in OutcomeWeights::gene_names()
            .iter()
            .zip(self.bounds.as_array())
        {
            if !(lo <= hi) {
                return Err(CalibrationConfigError::InvalidBounds(format!(
                    "{} min ({}) > max ({})",
                    name, lo, hi
                )));
            }
        }

        if !(self.target.mean >= 0.0) || !(self.target.std_dev >= 0.0) {
            return Err(CalibrationConfigError::InvalidTarget(
                "mean and std_dev must be non-negative".to_string(),
            ));
        }
        if let Some(histogram) = &self.target.histogram
            && histogram.iter().any(|c| !(*c >= 0.0))
        {
            return Err(CalibrationConfigError::InvalidTarget(
                "histogram counts must be non-negative".to_string(),
            ));
        }

        Ok(())
    }
}
