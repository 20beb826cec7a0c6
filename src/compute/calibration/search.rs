//! Genetic search over outcome weights.

use std::cmp::Ordering;

#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

use crate::schema::{
    CalibrationConfig, CalibrationConfigError, CalibrationHistory, CalibrationProgress,
    CalibrationResult, CalibrationStats, CandidateSnapshot, OutcomeWeights, Roster,
    SimulationConfig, StopReason,
};

use super::fitness::FitnessEvaluator;
use super::genome::{WeightRng, preset_weights, weight_distance};

/// A candidate individual in the population.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Unique identifier.
    pub id: u64,
    /// The weight vector.
    pub weights: OutcomeWeights,
    /// Fitness score.
    pub fitness: f64,
    /// Simulated mean runs per game.
    pub simulated_mean: f64,
    /// Simulated standard deviation of runs per game.
    pub simulated_std_dev: f64,
    /// Seed for this candidate's Monte Carlo batch.
    pub eval_seed: u64,
    /// Whether the candidate has been scored.
    pub evaluated: bool,
    /// Whether its evaluation was aborted.
    pub failed: bool,
    /// Generation created.
    pub generation: usize,
    /// Parent IDs.
    pub parents: Vec<u64>,
}

impl Candidate {
    fn new(id: u64, weights: OutcomeWeights, eval_seed: u64, generation: usize) -> Self {
        Self {
            id,
            weights,
            fitness: 0.0,
            simulated_mean: 0.0,
            simulated_std_dev: 0.0,
            eval_seed,
            evaluated: false,
            failed: false,
            generation,
            parents: Vec::new(),
        }
    }

    /// Convert to snapshot for serialization.
    pub fn to_snapshot(&self) -> CandidateSnapshot {
        CandidateSnapshot {
            id: self.id,
            fitness: self.fitness,
            weights: self.weights,
            simulated_mean: self.simulated_mean,
            simulated_std_dev: self.simulated_std_dev,
            generation: self.generation,
            parents: self.parents.clone(),
        }
    }
}

fn by_fitness_desc(a: &Candidate, b: &Candidate) -> Ordering {
    b.fitness.total_cmp(&a.fitness)
}

/// Calibration engine that runs the genetic search.
pub struct CalibrationEngine {
    config: CalibrationConfig,
    rng: WeightRng,
    evaluator: FitnessEvaluator,
    population: Vec<Candidate>,
    best: Option<Candidate>,
    history: CalibrationHistory,
    generation: usize,
    next_id: u64,
    total_evaluations: u64,
    failed_evaluations: u64,
}

impl CalibrationEngine {
    /// Create a new calibration engine for `roster`.
    pub fn new(config: CalibrationConfig, roster: Roster) -> Result<Self, CalibrationConfigError> {
        config.validate()?;
        SimulationConfig {
            innings: config.evaluation.innings,
            limits: config.evaluation.limits,
            ..Default::default()
        }
        .validate(&roster)?;

        let rng = match config.random_seed {
            Some(seed) => WeightRng::new(seed),
            None => WeightRng::random(),
        };
        let evaluator = FitnessEvaluator::new(
            roster,
            config.evaluation.clone(),
            config.target.clone(),
        );

        Ok(Self {
            config,
            rng,
            evaluator,
            population: Vec::new(),
            best: None,
            history: CalibrationHistory::default(),
            generation: 0,
            next_id: 0,
            total_evaluations: 0,
            failed_evaluations: 0,
        })
    }

    pub fn population(&self) -> &[Candidate] {
        &self.population
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Best candidate seen in any generation.
    pub fn best(&self) -> Option<&Candidate> {
        self.best.as_ref()
    }

    fn spawn(&mut self, weights: OutcomeWeights, parents: Vec<u64>) -> Candidate {
        let id = self.next_id;
        self.next_id += 1;
        let seed = self.rng.next_seed();
        Candidate {
            parents,
            ..Candidate::new(id, weights, seed, self.generation)
        }
    }

    /// Initialize the population with the presets followed by random vectors.
    pub fn initialize(&mut self) {
        self.population.clear();
        self.best = None;
        self.history = CalibrationHistory::default();
        self.generation = 0;
        self.total_evaluations = 0;
        self.failed_evaluations = 0;

        let size = self.config.population.size;
        let bounds = self.config.bounds.clone();
        for weights in preset_weights().into_iter().take(size) {
            let candidate = self.spawn(bounds.clamp(&weights), Vec::new());
            self.population.push(candidate);
        }
        while self.population.len() < size {
            let weights = self.rng.random_weights(&bounds);
            let candidate = self.spawn(weights, Vec::new());
            self.population.push(candidate);
        }
    }

    /// Evaluate every candidate that has not been scored yet.
    #[cfg(not(target_arch = "wasm32"))]
    fn evaluate_population(&mut self) {
        let evaluator = &self.evaluator;

        // Parallel evaluation
        self.population
            .par_iter_mut()
            .filter(|candidate| !candidate.evaluated)
            .for_each(|candidate| score_candidate(evaluator, candidate));

        self.tally_evaluations();
    }

    #[cfg(target_arch = "wasm32")]
    fn evaluate_population(&mut self) {
        let evaluator = &self.evaluator;

        // Sequential evaluation for WASM
        for candidate in self.population.iter_mut().filter(|c| !c.evaluated) {
            score_candidate(evaluator, candidate);
        }

        self.tally_evaluations();
    }

    /// Count candidates scored during this generation.
    fn tally_evaluations(&mut self) {
        for candidate in &self.population {
            if candidate.generation == self.generation && candidate.evaluated {
                self.total_evaluations += 1;
                if candidate.failed {
                    self.failed_evaluations += 1;
                }
            }
        }
    }

    /// Sort the evaluated population and append its statistics to history.
    fn record_generation(&mut self) {
        self.population.sort_by(by_fitness_desc);

        if let Some(leader) = self.population.first()
            && self
                .best
                .as_ref()
                .is_none_or(|best| leader.fitness > best.fitness)
        {
            self.best = Some(leader.clone());
        }

        let n = self.population.len() as f64;
        let gen_best = self.population.first().map_or(0.0, |c| c.fitness);
        let avg_fitness = self.population.iter().map(|c| c.fitness).sum::<f64>() / n;
        let variance = self
            .population
            .iter()
            .map(|c| (c.fitness - avg_fitness).powi(2))
            .sum::<f64>()
            / n;
        let best_fitness = self.best.as_ref().map_or(0.0, |c| c.fitness);

        self.history.best_fitness.push(best_fitness);
        self.history.generation_best.push(gen_best);
        self.history.avg_fitness.push(avg_fitness);
        self.history.fitness_std.push(variance.sqrt());

        let diversity = self.compute_diversity();
        self.history.diversity.push(diversity);

        log::info!(
            "generation {}: best {:.4}, generation best {:.4}, avg {:.4}, diversity {:.3}",
            self.generation,
            best_fitness,
            gen_best,
            avg_fitness,
            diversity
        );
    }

    /// Breed the next generation from the sorted, evaluated population.
    fn step_generation(&mut self) {
        let ga_config = self.config.algorithm.clone();
        let bounds = self.config.bounds.clone();
        let size = self.config.population.size;

        self.generation += 1;

        // Elites keep their scores and are not re-evaluated.
        let mut next_gen: Vec<Candidate> = self
            .population
            .iter()
            .take(ga_config.elitism.min(self.population.len()))
            .cloned()
            .collect();

        while next_gen.len() < size {
            let (idx1, idx2) = self.select_parents();
            let parent1 = self.population[idx1].weights;
            let parent2 = self.population[idx2].weights;
            let parents = vec![self.population[idx1].id, self.population[idx2].id];

            let (mut child1, mut child2) = self.rng.crossover(&parent1, &parent2, &ga_config);
            self.rng.mutate(&mut child1, &ga_config, &bounds);
            self.rng.mutate(&mut child2, &ga_config, &bounds);

            let first = self.spawn(child1, parents.clone());
            next_gen.push(first);
            let second = self.spawn(child2, parents);
            next_gen.push(second);
        }
        next_gen.truncate(size);

        self.population = next_gen;
    }

    /// Tournament selection of a parent index.
    fn select_index(&mut self) -> usize {
        let mut best_idx = 0;
        let mut best_fitness = f64::NEG_INFINITY;
        for _ in 0..self.config.algorithm.tournament_size {
            let idx = self.rng.index(self.population.len());
            if self.population[idx].fitness > best_fitness {
                best_fitness = self.population[idx].fitness;
                best_idx = idx;
            }
        }
        best_idx
    }

    /// Two tournament winners, redrawing the second once if it repeats the first.
    fn select_parents(&mut self) -> (usize, usize) {
        let first = self.select_index();
        let mut second = self.select_index();
        if second == first && self.population.len() > 1 {
            second = self.select_index();
            if second == first {
                second = (first + 1 + self.rng.index(self.population.len() - 1))
                    % self.population.len();
            }
        }
        (first, second)
    }

    /// Mean pairwise weight distance across the population.
    fn compute_diversity(&self) -> f64 {
        if self.population.len() < 2 {
            return 0.0;
        }

        let bounds = &self.config.bounds;
        let mut total_distance = 0.0;
        let mut count = 0;

        for i in 0..self.population.len() {
            for j in (i + 1)..self.population.len() {
                total_distance += weight_distance(
                    &self.population[i].weights,
                    &self.population[j].weights,
                    bounds,
                );
                count += 1;
            }
        }

        total_distance / count as f64
    }

    /// Get current progress.
    pub fn progress(&self) -> CalibrationProgress {
        let avg_fitness = if self.population.is_empty() {
            0.0
        } else {
            self.population.iter().map(|c| c.fitness).sum::<f64>() / self.population.len() as f64
        };

        let generation_best = self
            .population
            .iter()
            .map(|c| c.fitness)
            .fold(0.0, f64::max);

        CalibrationProgress {
            generation: self.generation,
            total_generations: self.config.population.max_generations,
            best_fitness: self.best.as_ref().map_or(0.0, |c| c.fitness),
            avg_fitness,
            generation_best,
            best_candidate: self.best.as_ref().map(Candidate::to_snapshot),
            history: self.history.clone(),
        }
    }

    /// Check if calibration should stop.
    fn should_stop(&self) -> Option<StopReason> {
        if let Some(best) = &self.best
            && best.fitness > self.config.population.early_stop_fitness
        {
            return Some(StopReason::TargetReached);
        }

        if self.generation >= self.config.population.max_generations {
            return Some(StopReason::MaxGenerations);
        }

        None
    }

    /// Run calibration with progress callback.
    pub fn evolve_with_callback<F>(&mut self, callback: F) -> CalibrationResult
    where
        F: Fn(&CalibrationProgress),
    {
        let start_time = std::time::Instant::now();

        self.initialize();
        self.evaluate_population();
        self.record_generation();
        callback(&self.progress());

        let stop_reason = loop {
            if let Some(reason) = self.should_stop() {
                break reason;
            }

            self.step_generation();
            self.evaluate_population();
            self.record_generation();
            callback(&self.progress());
        };

        let elapsed = start_time.elapsed().as_secs_f64();

        // A recorded generation always sets a best candidate.
        let best = self
            .best
            .clone()
            .or_else(|| self.population.first().cloned())
            .unwrap_or_else(|| Candidate::new(0, OutcomeWeights::default(), 0, 0));

        log::info!(
            "calibration finished after {} generations ({:?}): best fitness {:.4}",
            self.generation,
            stop_reason,
            best.fitness
        );

        CalibrationResult {
            best_weights: best.weights,
            best_fitness: best.fitness,
            best: best.to_snapshot(),
            stats: CalibrationStats {
                generations: self.generation,
                total_evaluations: self.total_evaluations,
                failed_evaluations: self.failed_evaluations,
                elapsed_seconds: elapsed,
                stop_reason,
            },
            history: self.history.clone(),
        }
    }

    /// Run calibration (blocking).
    pub fn evolve(&mut self) -> CalibrationResult {
        self.evolve_with_callback(|_| {})
    }
}

/// Score one candidate, recording an aborted evaluation as zero fitness.
fn score_candidate(evaluator: &FitnessEvaluator, candidate: &mut Candidate) {
    match evaluator.evaluate(&candidate.weights, candidate.eval_seed) {
        Ok(evaluation) => {
            candidate.fitness = evaluation.fitness;
            candidate.simulated_mean = evaluation.mean;
            candidate.simulated_std_dev = evaluation.std_dev;
            candidate.failed = false;
        }
        Err(e) => {
            log::warn!("candidate {} evaluation failed: {}", candidate.id, e);
            candidate.fitness = 0.0;
            candidate.failed = true;
        }
    }
    candidate.evaluated = true;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{
        ConfigError, EvaluationConfig, GeneticAlgorithmConfig, Pitcher, PitcherRole,
        PopulationConfig,
    };

    fn small_config(seed: u64) -> CalibrationConfig {
        CalibrationConfig {
            population: PopulationConfig {
                size: 6,
                max_generations: 3,
                early_stop_fitness: 2.0,
            },
            evaluation: EvaluationConfig {
                games: 10,
                ..Default::default()
            },
            random_seed: Some(seed),
            ..Default::default()
        }
    }

    #[test]
    fn test_engine_creation() {
        let mut engine = CalibrationEngine::new(small_config(1), Roster::example()).unwrap();
        engine.initialize();

        assert_eq!(engine.population().len(), 6);
        assert_eq!(engine.population()[0].weights, OutcomeWeights::default());
        assert!(engine.population().iter().all(|c| !c.evaluated));
    }

    #[test]
    fn test_population_size_preserved() {
        // Odd size exercises truncation of the last offspring pair.
        let config = CalibrationConfig {
            population: PopulationConfig {
                size: 5,
                max_generations: 2,
                early_stop_fitness: 2.0,
            },
            algorithm: GeneticAlgorithmConfig {
                elitism: 2,
                ..Default::default()
            },
            ..small_config(2)
        };
        let mut engine = CalibrationEngine::new(config, Roster::example()).unwrap();
        engine.evolve_with_callback(|progress| {
            assert!(progress.generation <= 2);
        });
        assert_eq!(engine.population().len(), 5);
    }

    #[test]
    fn test_calibration_run() {
        let mut engine = CalibrationEngine::new(small_config(3), Roster::example()).unwrap();
        let result = engine.evolve();

        assert_eq!(result.stats.generations, 3);
        assert_eq!(result.stats.stop_reason, StopReason::MaxGenerations);
        assert_eq!(result.history.best_fitness.len(), 4);
        assert!(result.best_fitness > 0.0 && result.best_fitness <= 1.0);
        assert_eq!(result.best_weights, result.best.weights);
        assert!(result.stats.total_evaluations >= 6);
        assert_eq!(result.stats.failed_evaluations, 0);

        // Global best never decreases.
        for pair in result.history.best_fitness.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
        for (best, gen_best) in result
            .history
            .best_fitness
            .iter()
            .zip(&result.history.generation_best)
        {
            assert!(best >= gen_best);
        }
    }

    #[test]
    fn test_early_stop() {
        let config = CalibrationConfig {
            population: PopulationConfig {
                size: 4,
                max_generations: 50,
                early_stop_fitness: 0.0,
            },
            ..small_config(4)
        };
        let mut engine = CalibrationEngine::new(config, Roster::example()).unwrap();
        let result = engine.evolve();

        assert_eq!(result.stats.stop_reason, StopReason::TargetReached);
        assert_eq!(result.stats.generations, 0);
    }

    #[test]
    fn test_same_seed_same_result() {
        let a = CalibrationEngine::new(small_config(5), Roster::example())
            .unwrap()
            .evolve();
        let b = CalibrationEngine::new(small_config(5), Roster::example())
            .unwrap()
            .evolve();

        assert_eq!(a.best_weights, b.best_weights);
        assert_eq!(a.best_fitness, b.best_fitness);
        assert_eq!(a.history.avg_fitness, b.history.avg_fitness);
    }

    #[test]
    fn test_parents_are_distinct_under_dominant_leader() {
        let config = CalibrationConfig {
            algorithm: GeneticAlgorithmConfig {
                tournament_size: 6,
                ..Default::default()
            },
            ..small_config(8)
        };
        let mut engine = CalibrationEngine::new(config, Roster::example()).unwrap();
        engine.initialize();
        for (i, candidate) in engine.population.iter_mut().enumerate() {
            candidate.fitness = if i == 0 { 1.0 } else { 0.0 };
        }

        let mut leader_picks = 0;
        for _ in 0..500 {
            let (first, second) = engine.select_parents();
            assert_ne!(first, second);
            assert!(second < engine.population.len());
            if first == 0 {
                leader_picks += 1;
            }
        }
        // The leader wins most tournaments, so the redraw fallback is exercised.
        assert!(leader_picks > 250);
    }

    #[test]
    fn test_empty_bullpen_rejected() {
        let roster = Roster {
            batters: Roster::example().batters,
            pitchers: Vec::new(),
        };
        assert!(matches!(
            CalibrationEngine::new(small_config(6), roster),
            Err(CalibrationConfigError::RosterError(ConfigError::EmptyBullpen))
        ));
    }

    #[test]
    fn test_failed_evaluations_score_zero() {
        let roster = Roster {
            batters: Roster::example().batters,
            pitchers: vec![Pitcher::new(
                "Only Arm",
                4.0,
                1.3,
                9.0,
                PitcherRole::Starter,
                1.0,
            )],
        };
        let config = CalibrationConfig {
            population: PopulationConfig {
                size: 3,
                max_generations: 1,
                early_stop_fitness: 2.0,
            },
            algorithm: GeneticAlgorithmConfig {
                elitism: 1,
                ..Default::default()
            },
            ..small_config(7)
        };
        let mut engine = CalibrationEngine::new(config, roster).unwrap();
        let result = engine.evolve();

        assert_eq!(result.best_fitness, 0.0);
        assert_eq!(result.stats.failed_evaluations, result.stats.total_evaluations);
        assert!(engine.population().iter().all(|c| c.failed));
    }
}
