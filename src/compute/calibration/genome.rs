//! Weight-vector manipulation utilities for the calibrator.
//!
//! Provides random generation, crossover, and mutation operations.

use rand::prelude::*;

use crate::schema::{GeneticAlgorithmConfig, OutcomeWeights, WEIGHT_COUNT, WeightBounds};

/// Random number generator wrapper for weight operations.
pub struct WeightRng {
    rng: StdRng,
}

impl WeightRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create with random seed.
    pub fn random() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Generate random weights uniformly within bounds.
    pub fn random_weights(&mut self, bounds: &WeightBounds) -> OutcomeWeights {
        let mut genes = [0.0; WEIGHT_COUNT];
        for (gene, range) in genes.iter_mut().zip(bounds.as_array()) {
            *gene = self.uniform(range);
        }
        OutcomeWeights::from_genes(&genes)
    }

    /// Uniform random in bounds.
    fn uniform(&mut self, bounds: (f64, f64)) -> f64 {
        if bounds.1 > bounds.0 {
            self.rng.gen_range(bounds.0..=bounds.1)
        } else {
            bounds.0
        }
    }

    /// Gaussian jitter scaled to the width of `bounds`.
    pub fn gaussian_mutate(&mut self, value: f64, strength: f64, bounds: (f64, f64)) -> f64 {
        let noise: f64 = self.rng.sample(rand_distr::StandardNormal);
        let mutated = value + noise * strength * (bounds.1 - bounds.0);
        mutated.clamp(bounds.0, bounds.1)
    }

    /// Produce two children from two parents.
    ///
    /// With probability `crossover_rate` genes are exchanged uniformly; with
    /// probability `interpolation_rate` one random gene of the first child is
    /// then blended between the parents.
    pub fn crossover(
        &mut self,
        parent1: &OutcomeWeights,
        parent2: &OutcomeWeights,
        config: &GeneticAlgorithmConfig,
    ) -> (OutcomeWeights, OutcomeWeights) {
        let p1 = parent1.to_genes();
        let p2 = parent2.to_genes();
        let mut c1 = p1;
        let mut c2 = p2;

        if self.rng.r#gen::<f64>() < config.crossover_rate {
            for i in 0..WEIGHT_COUNT {
                if self.rng.gen_bool(0.5) {
                    c1[i] = p2[i];
                    c2[i] = p1[i];
                }
            }

            if self.rng.r#gen::<f64>() < config.interpolation_rate {
                let i = self.rng.gen_range(0..WEIGHT_COUNT);
                let t = self.rng.r#gen::<f64>();
                c1[i] = blend(p1[i], p2[i], t);
            }
        }

        (
            OutcomeWeights::from_genes(&c1),
            OutcomeWeights::from_genes(&c2),
        )
    }

    /// Mutate weights in place.
    ///
    /// Each gene mutates independently with probability `mutation_rate`:
    /// usually a local Gaussian jitter, otherwise a fresh uniform draw.
    pub fn mutate(
        &mut self,
        weights: &mut OutcomeWeights,
        config: &GeneticAlgorithmConfig,
        bounds: &WeightBounds,
    ) {
        let mut genes = weights.to_genes();
        for (gene, range) in genes.iter_mut().zip(bounds.as_array()) {
            if self.rng.r#gen::<f64>() >= config.mutation_rate {
                continue;
            }
            *gene = if self.rng.r#gen::<f64>() < config.local_mutation_rate {
                self.gaussian_mutate(*gene, config.mutation_strength, range)
            } else {
                self.uniform(range)
            };
        }
        *weights = OutcomeWeights::from_genes(&genes);
    }

    /// Random index in `0..len`.
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    /// Generate next u64 for seeding child RNGs.
    pub fn next_seed(&mut self) -> u64 {
        self.rng.r#gen()
    }
}

/// Linear blend between two values.
fn blend(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

/// Hand-chosen starting points placed in every initial population.
pub fn preset_weights() -> Vec<OutcomeWeights> {
    vec![
        OutcomeWeights::default(),
        // High-contact offense against average pitching.
        OutcomeWeights {
            era_weight: 3.5,
            whip_weight: 1.1,
            k_divisor: 11.0,
            stamina_exponent: 1.2,
            pressure_base: 0.9,
            obp_weight: 1.2,
            avg_weight: 1.1,
            slg_weight: 1.0,
            clutch_factor: 1.15,
        },
        // Pitcher-dominant environment.
        OutcomeWeights {
            era_weight: 5.5,
            whip_weight: 1.6,
            k_divisor: 7.0,
            stamina_exponent: 2.0,
            pressure_base: 1.1,
            obp_weight: 0.9,
            avg_weight: 0.9,
            slg_weight: 1.1,
            clutch_factor: 1.05,
        },
    ]
}

/// Mean per-gene distance between two weight vectors, each gene normalized
/// by the width of its bounds.
pub fn weight_distance(w1: &OutcomeWeights, w2: &OutcomeWeights, bounds: &WeightBounds) -> f64 {
    let total: f64 = w1
        .to_genes()
        .iter()
        .zip(w2.to_genes())
        .zip(bounds.as_array())
        .map(|((a, b), (lo, hi))| {
            let width = hi - lo;
            if width > 0.0 {
                (a - b).abs() / width
            } else {
                0.0
            }
        })
        .sum();
    total / WEIGHT_COUNT as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_weights_within_bounds() {
        let mut rng = WeightRng::new(42);
        let bounds = WeightBounds::default();
        for _ in 0..100 {
            assert!(bounds.contains(&rng.random_weights(&bounds)));
        }
    }

    #[test]
    fn test_presets_within_default_bounds() {
        let bounds = WeightBounds::default();
        for preset in preset_weights() {
            assert!(bounds.contains(&preset));
        }
    }

    #[test]
    fn test_crossover_exchanges_genes() {
        let mut rng = WeightRng::new(42);
        let bounds = WeightBounds::default();
        let config = GeneticAlgorithmConfig {
            crossover_rate: 1.0,
            interpolation_rate: 0.0,
            ..Default::default()
        };

        let p1 = rng.random_weights(&bounds);
        let p2 = rng.random_weights(&bounds);
        let (c1, c2) = rng.crossover(&p1, &p2, &config);

        // Without interpolation each gene position holds both parent values.
        let (g1, g2) = (c1.to_genes(), c2.to_genes());
        let (q1, q2) = (p1.to_genes(), p2.to_genes());
        for i in 0..WEIGHT_COUNT {
            let mut child = [g1[i], g2[i]];
            let mut parent = [q1[i], q2[i]];
            child.sort_by(f64::total_cmp);
            parent.sort_by(f64::total_cmp);
            assert_eq!(child, parent);
        }
    }

    #[test]
    fn test_no_crossover_copies_parents() {
        let mut rng = WeightRng::new(7);
        let bounds = WeightBounds::default();
        let config = GeneticAlgorithmConfig {
            crossover_rate: 0.0,
            ..Default::default()
        };

        let p1 = rng.random_weights(&bounds);
        let p2 = rng.random_weights(&bounds);
        assert_eq!(rng.crossover(&p1, &p2, &config), (p1, p2));
    }

    #[test]
    fn test_interpolated_gene_between_parents() {
        let mut rng = WeightRng::new(3);
        let bounds = WeightBounds::default();
        let config = GeneticAlgorithmConfig {
            crossover_rate: 1.0,
            interpolation_rate: 1.0,
            ..Default::default()
        };

        for _ in 0..20 {
            let p1 = rng.random_weights(&bounds);
            let p2 = rng.random_weights(&bounds);
            let (c1, _) = rng.crossover(&p1, &p2, &config);
            for ((c, a), b) in c1.to_genes().iter().zip(p1.to_genes()).zip(p2.to_genes()) {
                assert!(*c >= a.min(b) - 1e-12 && *c <= a.max(b) + 1e-12);
            }
        }
    }

    #[test]
    fn test_mutation_stays_in_bounds() {
        let mut rng = WeightRng::new(42);
        let bounds = WeightBounds::default();
        let config = GeneticAlgorithmConfig {
            mutation_rate: 1.0,
            mutation_strength: 2.0,
            ..Default::default()
        };

        let mut weights = OutcomeWeights::default();
        for _ in 0..50 {
            rng.mutate(&mut weights, &config, &bounds);
            assert!(bounds.contains(&weights));
        }
        assert_ne!(weights, OutcomeWeights::default());
    }

    #[test]
    fn test_zero_rate_mutation_is_identity() {
        let mut rng = WeightRng::new(1);
        let config = GeneticAlgorithmConfig {
            mutation_rate: 0.0,
            ..Default::default()
        };
        let mut weights = OutcomeWeights::default();
        rng.mutate(&mut weights, &config, &WeightBounds::default());
        assert_eq!(weights, OutcomeWeights::default());
    }

    #[test]
    fn test_weight_distance() {
        let bounds = WeightBounds::default();
        let a = OutcomeWeights::default();
        assert!(weight_distance(&a, &a, &bounds).abs() < 1e-12);

        let b = OutcomeWeights {
            era_weight: a.era_weight + 9.0,
            ..a
        };
        assert!((weight_distance(&a, &b, &bounds) - 1.0 / WEIGHT_COUNT as f64).abs() < 1e-12);
    }
}
