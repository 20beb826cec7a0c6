//! Monte Carlo aggregation of simulated games.

use serde::{Deserialize, Serialize};

use super::{GameSimulator, SimulationError};

/// Distribution of runs per game over a batch of simulated games.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloSummary {
    /// Runs scored in each game, in simulation order.
    pub runs: Vec<u32>,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub max: u32,
    pub min: u32,
    /// `histogram[i]` counts games with exactly `bins[i]` runs.
    pub histogram: Vec<usize>,
    /// Integer bin edges `min..=max + 1`.
    pub bins: Vec<u32>,
}

impl MonteCarloSummary {
    /// Summarize a runs-per-game sequence.
    pub fn from_runs(runs: Vec<u32>) -> Self {
        if runs.is_empty() {
            return Self {
                runs,
                mean: 0.0,
                std_dev: 0.0,
                max: 0,
                min: 0,
                histogram: Vec::new(),
                bins: Vec::new(),
            };
        }

        let n = runs.len() as f64;
        let mean = runs.iter().map(|&r| r as f64).sum::<f64>() / n;
        let variance = runs.iter().map(|&r| (r as f64 - mean).powi(2)).sum::<f64>() / n;
        let min = runs.iter().copied().min().unwrap_or(0);
        let max = runs.iter().copied().max().unwrap_or(0);

        let mut histogram = vec![0usize; (max - min + 1) as usize];
        for &r in &runs {
            histogram[(r - min) as usize] += 1;
        }
        let bins = (min..=max + 1).collect();

        Self {
            runs,
            mean,
            std_dev: variance.sqrt(),
            max,
            min,
            histogram,
            bins,
        }
    }

    /// Number of simulated games.
    pub fn games(&self) -> usize {
        self.runs.len()
    }

    /// Games that ended with exactly `runs` runs.
    pub fn count(&self, runs: u32) -> usize {
        if runs < self.min || runs > self.max || self.histogram.is_empty() {
            0
        } else {
            self.histogram[(runs - self.min) as usize]
        }
    }

    /// Share of games that ended with exactly `runs` runs.
    pub fn frequency(&self, runs: u32) -> f64 {
        if self.runs.is_empty() {
            0.0
        } else {
            self.count(runs) as f64 / self.runs.len() as f64
        }
    }
}

impl GameSimulator {
    /// Play `num_simulations` games of `innings` innings and summarize them.
    ///
    /// Every game resets per-game state but shares this simulator's box
    /// scores. The first aborted game stops the batch and its error is
    /// returned.
    pub fn monte_carlo_game_simulation(
        &mut self,
        num_simulations: usize,
        innings: u32,
    ) -> Result<MonteCarloSummary, SimulationError> {
        if num_simulations == 0 {
            return Err(SimulationError::NoSimulations);
        }

        let mut runs = Vec::with_capacity(num_simulations);
        for _ in 0..num_simulations {
            runs.push(self.simulate_game(innings)?);
        }

        let summary = MonteCarloSummary::from_runs(runs);
        log::debug!(
            "monte carlo: {} games, mean {:.3}, std {:.3}, range {}..={}",
            num_simulations,
            summary.mean,
            summary.std_dev,
            summary.min,
            summary.max
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Pitcher, PitcherRole, Roster, SimulationConfig};

    fn simulator(seed: u64) -> GameSimulator {
        let config = SimulationConfig {
            random_seed: Some(seed),
            ..Default::default()
        };
        GameSimulator::new(Roster::example(), &config).unwrap()
    }

    #[test]
    fn test_summary_from_runs() {
        let summary = MonteCarloSummary::from_runs(vec![3, 1, 4, 1, 5]);
        assert!((summary.mean - 2.8).abs() < 1e-12);
        assert_eq!(summary.min, 1);
        assert_eq!(summary.max, 5);
        assert_eq!(summary.bins, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(summary.histogram, vec![2, 0, 1, 1, 1]);
        assert_eq!(summary.count(1), 2);
        assert_eq!(summary.count(0), 0);
        assert_eq!(summary.count(9), 0);
        assert!((summary.frequency(1) - 0.4).abs() < 1e-12);

        let variance = [0.04, 3.24, 1.44, 3.24, 4.84].iter().sum::<f64>() / 5.0;
        assert!((summary.std_dev - variance.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_histogram_sums_to_simulations() {
        let mut sim = simulator(17);
        let summary = sim.monte_carlo_game_simulation(200, 9).unwrap();

        assert_eq!(summary.games(), 200);
        assert_eq!(summary.histogram.iter().sum::<usize>(), 200);
        assert_eq!(summary.bins[0], summary.min);
        assert_eq!(summary.bins.len(), summary.histogram.len() + 1);
        assert_eq!(summary.min, *summary.runs.iter().min().unwrap());
        assert!(summary.mean > 0.0);
        assert_eq!(sim.games_played(), 200);
    }

    #[test]
    fn test_zero_simulations_rejected() {
        let mut sim = simulator(1);
        assert_eq!(
            sim.monte_carlo_game_simulation(0, 9),
            Err(SimulationError::NoSimulations)
        );
    }

    #[test]
    fn test_aborted_game_stops_batch() {
        let roster = Roster {
            batters: Roster::example().batters,
            pitchers: vec![Pitcher::new(
                "Only Arm",
                4.0,
                1.3,
                9.0,
                PitcherRole::Starter,
                3.0,
            )],
        };
        let config = SimulationConfig {
            random_seed: Some(3),
            ..Default::default()
        };
        let mut sim = GameSimulator::new(roster, &config).unwrap();
        assert!(matches!(
            sim.monte_carlo_game_simulation(10, 9),
            Err(SimulationError::NoEligiblePitcher { .. })
        ));
    }
}
