//! Fitness scoring of weight candidates against an observed run distribution.

use crate::compute::{GameSimulator, MonteCarloSummary, SimulationError};
use crate::schema::{EvaluationConfig, OutcomeWeights, Roster, SimulationConfig, TargetDistribution};

/// Share of the basic score carried by the mean difference.
const MEAN_WEIGHT: f64 = 0.7;
/// Share of the basic score carried by the standard deviation difference.
const STD_WEIGHT: f64 = 0.3;
/// Share of the combined score carried by the moment match when a
/// histogram is available.
const BASIC_BLEND: f64 = 0.7;

/// Evaluates a candidate weight vector and returns its fitness.
pub struct FitnessEvaluator {
    roster: Roster,
    eval_config: EvaluationConfig,
    target: TargetDistribution,
}

/// Outcome of evaluating a single candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// Combined score in (0, 1].
    pub fitness: f64,
    /// Simulated mean runs per game.
    pub mean: f64,
    /// Simulated standard deviation of runs per game.
    pub std_dev: f64,
}

impl FitnessEvaluator {
    /// Create a new fitness evaluator.
    pub fn new(roster: Roster, eval_config: EvaluationConfig, target: TargetDistribution) -> Self {
        Self {
            roster,
            eval_config,
            target,
        }
    }

    pub fn target(&self) -> &TargetDistribution {
        &self.target
    }

    /// Simulate `games` games under `weights` and score the run distribution.
    ///
    /// Every evaluation owns a fresh simulator seeded with `seed`, so the
    /// result depends only on the weights and the seed.
    pub fn evaluate(
        &self,
        weights: &OutcomeWeights,
        seed: u64,
    ) -> Result<Evaluation, SimulationError> {
        let config = SimulationConfig {
            innings: self.eval_config.innings,
            limits: self.eval_config.limits,
            weights: *weights,
            random_seed: Some(seed),
        };
        let mut simulator = GameSimulator::new(self.roster.clone(), &config)?;
        let summary =
            simulator.monte_carlo_game_simulation(self.eval_config.games, self.eval_config.innings)?;

        Ok(Evaluation {
            fitness: distribution_score(&summary, &self.target),
            mean: summary.mean,
            std_dev: summary.std_dev,
        })
    }
}

/// Similarity between a simulated batch and the target distribution.
pub fn distribution_score(summary: &MonteCarloSummary, target: &TargetDistribution) -> f64 {
    let mean_diff = (summary.mean - target.mean).abs();
    let std_diff = (summary.std_dev - target.std_dev).abs();
    let basic = 1.0 / (1.0 + MEAN_WEIGHT * mean_diff + STD_WEIGHT * std_diff);

    match &target.histogram {
        Some(histogram) if target.has_histogram() => {
            let histogram_score = 1.0 / (1.0 + histogram_distance(summary, histogram));
            BASIC_BLEND * basic + (1.0 - BASIC_BLEND) * histogram_score
        }
        _ => basic,
    }
}

/// L1 distance between normalized run frequencies, aligned by run count.
///
/// `target[r]` holds the (unnormalized) number of games with `r` runs.
pub fn histogram_distance(summary: &MonteCarloSummary, target: &[f64]) -> f64 {
    let total: f64 = target.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }

    let span = target
        .len()
        .max(if summary.games() > 0 {
            summary.max as usize + 1
        } else {
            0
        });

    (0..span)
        .map(|runs| {
            let observed = target.get(runs).copied().unwrap_or(0.0) / total;
            let simulated = summary.frequency(runs as u32);
            (simulated - observed).abs()
        })
        .sum()
}
