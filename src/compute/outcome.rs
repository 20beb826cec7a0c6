//! At-bat outcome model.
//!
//! Turns a batter's rate statistics and the current pitcher's effectiveness
//! into a probability distribution over plate-appearance results, then samples
//! from it. The same model serves the baseline simulator and calibration
//! candidates; only the [`OutcomeWeights`] differ.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::schema::{Batter, OutcomeWeights, Pitcher, ProbabilityLimits};

/// Innings completed in a game after which pressure and clutch kick in.
pub const LATE_INNINGS: u32 = 6;

/// Runs allowed in a game after which pressure and clutch kick in.
pub const PRESSURE_RUNS: u32 = 3;

/// Floor keeping the pitcher factor positive.
pub const MIN_PITCHER_FACTOR: f64 = 0.1;

/// Share of hits that are doubles.
pub const DOUBLE_PROBABILITY: f64 = 0.10;

/// Share of hits that are triples.
pub const TRIPLE_PROBABILITY: f64 = 0.03;

/// Result of a single plate appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AtBatOutcome {
    Strikeout,
    Out,
    Walk,
    Single,
    Double,
    Triple,
    HomeRun,
}

impl AtBatOutcome {
    /// Whether the outcome records an out.
    #[inline]
    pub fn is_out(self) -> bool {
        matches!(self, Self::Strikeout | Self::Out)
    }

    /// Whether the outcome is a base hit.
    #[inline]
    pub fn is_hit(self) -> bool {
        matches!(
            self,
            Self::Single | Self::Double | Self::Triple | Self::HomeRun
        )
    }

    /// Whether the outcome is a double, triple or home run.
    #[inline]
    pub fn is_extra_base_hit(self) -> bool {
        matches!(self, Self::Double | Self::Triple | Self::HomeRun)
    }
}

/// Game situation the pitcher is working in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PitchingContext {
    /// Innings completed so far this game.
    pub innings_this_game: u32,
    /// Runs allowed so far this game.
    pub runs_allowed: u32,
}

impl PitchingContext {
    /// Late innings or a pitcher in trouble.
    #[inline]
    pub fn is_clutch(&self) -> bool {
        self.innings_this_game >= LATE_INNINGS || self.runs_allowed > PRESSURE_RUNS
    }
}

/// Probability of each plate-appearance category. Sums to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeProbabilities {
    pub strikeout: f64,
    pub walk: f64,
    pub hit: f64,
    /// Balls in play turned into outs (the remainder).
    pub out: f64,
}

impl OutcomeProbabilities {
    /// Total probability of recording an out.
    #[inline]
    pub fn out_total(&self) -> f64 {
        self.strikeout + self.out
    }

    #[inline]
    pub fn total(&self) -> f64 {
        self.strikeout + self.walk + self.hit + self.out
    }

    fn normalized(self) -> Self {
        let total = self.total();
        if total > 0.0 && total.is_finite() {
            Self {
                strikeout: self.strikeout / total,
                walk: self.walk / total,
                hit: self.hit / total,
                out: self.out / total,
            }
        } else {
            Self {
                strikeout: 0.0,
                walk: 0.0,
                hit: 0.0,
                out: 1.0,
            }
        }
    }
}

/// Split of hits by number of bases. Sums to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitDistribution {
    pub single: f64,
    pub double: f64,
    pub triple: f64,
    pub home_run: f64,
}

/// Weighted at-bat outcome model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutcomeModel {
    weights: OutcomeWeights,
    limits: ProbabilityLimits,
}

impl Default for OutcomeModel {
    fn default() -> Self {
        Self::new(OutcomeWeights::default(), ProbabilityLimits::default())
    }
}

impl OutcomeModel {
    pub fn new(weights: OutcomeWeights, limits: ProbabilityLimits) -> Self {
        Self { weights, limits }
    }

    pub fn weights(&self) -> &OutcomeWeights {
        &self.weights
    }

    pub fn limits(&self) -> &ProbabilityLimits {
        &self.limits
    }

    /// Pitcher effectiveness: values above 1 suppress offense.
    ///
    /// Product of the ERA, WHIP, strikeout, stamina and pressure factors,
    /// floored at [`MIN_PITCHER_FACTOR`] and kept finite. Zero ERA or WHIP
    /// contribute a neutral 1.0.
    pub fn pitcher_factor(&self, pitcher: &Pitcher, context: &PitchingContext) -> f64 {
        let w = &self.weights;

        let era_factor = if pitcher.era > 0.0 {
            w.era_weight / pitcher.era
        } else {
            1.0
        };
        let whip_factor = if pitcher.whip > 0.0 {
            w.whip_weight / pitcher.whip
        } else {
            1.0
        };
        let k_factor = if w.k_divisor > 0.0 {
            pitcher.k_per_9.max(0.0) / w.k_divisor
        } else {
            1.0
        };
        let stamina_factor = pitcher
            .current_stamina
            .clamp(0.0, 1.0)
            .powf(w.stamina_exponent);

        let mut pressure = w.pressure_base;
        if context.innings_this_game >= LATE_INNINGS {
            pressure *= 0.9;
        }
        if context.runs_allowed > PRESSURE_RUNS {
            pressure *= 0.85;
        }

        let factor = era_factor * whip_factor * k_factor * stamina_factor * pressure;
        if factor.is_nan() {
            return 1.0;
        }
        factor.clamp(MIN_PITCHER_FACTOR, f64::MAX)
    }

    /// Outcome probabilities for `batter` against `pitcher`.
    ///
    /// `pitcher_factor` is normally the value of [`Self::pitcher_factor`]
    /// computed at the start of the inning.
    pub fn probabilities(
        &self,
        batter: &Batter,
        pitcher: &Pitcher,
        pitcher_factor: f64,
        context: &PitchingContext,
    ) -> OutcomeProbabilities {
        let w = &self.weights;
        let limits = &self.limits;
        let factor = pitcher_factor.max(MIN_PITCHER_FACTOR);

        let on_base = (batter.obp * w.obp_weight / factor)
            .min(limits.max_on_base)
            .max(0.0);
        let strikeout = (pitcher.k_per_9 / 27.0 * factor)
            .min(limits.max_strikeout)
            .max(0.0);
        let walk = ((pitcher.whip - 1.0) * 0.15)
            .min(limits.max_walk)
            .max(0.0);

        // Walk plus hit never exceeds the on-base cap, so outs keep at
        // least `1 - max_on_base` of the mass before the clutch boost.
        let contact = (on_base * w.avg_weight.max(0.0)).min(limits.max_on_base);
        let mut hit = (contact - walk).max(0.0);
        let out = (1.0 - strikeout - walk - hit).max(0.0);
        if context.is_clutch() {
            hit *= w.clutch_factor.max(0.0);
        }

        OutcomeProbabilities {
            strikeout,
            walk,
            hit,
            out,
        }
        .normalized()
    }

    /// How a hit by `batter` splits into singles, doubles, triples and homers.
    pub fn hit_distribution(&self, batter: &Batter) -> HitDistribution {
        let mut extra_base_factor = if batter.avg > 0.0 {
            batter.slg / batter.avg * self.weights.slg_weight
        } else {
            1.0
        };
        if !(extra_base_factor.is_finite() && extra_base_factor > 0.0) {
            extra_base_factor = 1.0;
        }

        let single = (1.0 / extra_base_factor).clamp(0.6, 0.85);
        HitDistribution {
            single,
            double: DOUBLE_PROBABILITY,
            triple: TRIPLE_PROBABILITY,
            home_run: (1.0 - single - DOUBLE_PROBABILITY - TRIPLE_PROBABILITY).max(0.0),
        }
    }

    /// Sample one plate appearance.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        batter: &Batter,
        pitcher: &Pitcher,
        pitcher_factor: f64,
        context: &PitchingContext,
        rng: &mut R,
    ) -> AtBatOutcome {
        let probs = self.probabilities(batter, pitcher, pitcher_factor, context);
        let roll: f64 = rng.r#gen();

        let mut threshold = probs.strikeout;
        if roll < threshold {
            return AtBatOutcome::Strikeout;
        }
        threshold += probs.out;
        if roll < threshold {
            return AtBatOutcome::Out;
        }
        threshold += probs.walk;
        if roll < threshold {
            return AtBatOutcome::Walk;
        }
        threshold += probs.hit;
        if roll < threshold {
            return self.sample_hit(batter, rng);
        }

        // Rounding left a sliver past every threshold.
        AtBatOutcome::Out
    }

    /// Sample the type of a hit.
    pub fn sample_hit<R: Rng + ?Sized>(&self, batter: &Batter, rng: &mut R) -> AtBatOutcome {
        let dist = self.hit_distribution(batter);
        let roll: f64 = rng.r#gen();

        if roll < dist.single {
            AtBatOutcome::Single
        } else if roll < dist.single + dist.double {
            AtBatOutcome::Double
        } else if roll < dist.single + dist.double + dist.triple {
            AtBatOutcome::Triple
        } else {
            AtBatOutcome::HomeRun
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PitcherRole;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn reference_batter() -> Batter {
        Batter::new("Reference", 0.3, 0.6, 0.5)
    }

    fn reference_pitcher() -> Pitcher {
        Pitcher::new("Reference", 4.0, 1.3, 9.0, PitcherRole::Starter, 6.0)
    }

    fn assert_valid(probs: &OutcomeProbabilities) {
        for p in [probs.strikeout, probs.walk, probs.hit, probs.out] {
            assert!((0.0..=1.0).contains(&p), "probability {} out of range", p);
        }
        assert!((probs.total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_reference_probabilities() {
        let model = OutcomeModel::default();
        let pitcher = reference_pitcher();
        let context = PitchingContext::default();

        let factor = model.pitcher_factor(&pitcher, &context);
        assert!((factor - 1.0).abs() < 1e-12);

        let probs = model.probabilities(&reference_batter(), &pitcher, factor, &context);
        assert_valid(&probs);
        assert!((probs.strikeout - 1.0 / 3.0).abs() < 1e-9);
        assert!((probs.walk - 0.045).abs() < 1e-9);
        assert!((probs.hit - 0.455).abs() < 1e-9);
        assert!((probs.out - (1.0 - 1.0 / 3.0 - 0.5)).abs() < 1e-9);
    }

    #[test]
    fn test_reference_sampling_is_reproducible() {
        let model = OutcomeModel::default();
        let batter = reference_batter();
        let pitcher = reference_pitcher();
        let context = PitchingContext::default();

        let run = |seed: u64| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..50)
                .map(|_| model.sample(&batter, &pitcher, 1.0, &context, &mut rng))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn test_degenerate_stats_use_fallbacks() {
        let model = OutcomeModel::default();
        let batter = Batter::new("Zero", 0.0, 0.0, 0.0);
        let pitcher = Pitcher::new("Zero", 0.0, 0.0, 0.0, PitcherRole::Closer, 1.0);
        let context = PitchingContext::default();

        let factor = model.pitcher_factor(&pitcher, &context);
        assert!(factor.is_finite() && factor > 0.0);

        let probs = model.probabilities(&batter, &pitcher, factor, &context);
        assert_valid(&probs);
        assert_eq!(probs.out, 1.0);

        let dist = model.hit_distribution(&batter);
        assert!((dist.single - 0.85).abs() < 1e-12);
    }

    #[test]
    fn test_fatigue_weakens_pitcher() {
        let model = OutcomeModel::default();
        let mut pitcher = reference_pitcher();
        let context = PitchingContext::default();

        let fresh = model.pitcher_factor(&pitcher, &context);
        pitcher.current_stamina = 0.5;
        let tired = model.pitcher_factor(&pitcher, &context);
        assert!(tired < fresh);

        let pressured = model.pitcher_factor(
            &reference_pitcher(),
            &PitchingContext {
                innings_this_game: 6,
                runs_allowed: 4,
            },
        );
        assert!((pressured - 0.9 * 0.85).abs() < 1e-12);
    }

    #[test]
    fn test_clutch_boost_is_renormalized() {
        let model = OutcomeModel::new(
            OutcomeWeights {
                clutch_factor: 1.4,
                ..Default::default()
            },
            ProbabilityLimits::default(),
        );
        let clutch = model.probabilities(
            &reference_batter(),
            &reference_pitcher(),
            1.0,
            &PitchingContext {
                innings_this_game: 7,
                runs_allowed: 0,
            },
        );
        assert_valid(&clutch);

        // Out is the calm remainder; only hit is boosted before renormalizing.
        let strikeout = 1.0 / 3.0;
        let out = 1.0 - strikeout - 0.045 - 0.455;
        let hit = 0.455 * 1.4;
        let total = strikeout + 0.045 + hit + out;
        assert!((clutch.strikeout - strikeout / total).abs() < 1e-9);
        assert!((clutch.walk - 0.045 / total).abs() < 1e-9);
        assert!((clutch.hit - hit / total).abs() < 1e-9);
        assert!((clutch.out - out / total).abs() < 1e-9);
        assert!((clutch.hit - 0.5389).abs() < 1e-4);
        assert!((clutch.out - 0.1410).abs() < 1e-4);
    }

    #[test]
    fn test_contact_weight_respects_on_base_cap() {
        let model = OutcomeModel::new(
            OutcomeWeights {
                avg_weight: 2.0,
                ..Default::default()
            },
            ProbabilityLimits::default(),
        );
        let batter = Batter::new("Patient", 0.3, 0.5, 0.45);
        let pitcher = Pitcher::new("Soft", 6.0, 1.0, 0.0, PitcherRole::MiddleRelief, 2.0);
        let context = PitchingContext::default();

        let factor = model.pitcher_factor(&pitcher, &context);
        assert!((factor - MIN_PITCHER_FACTOR).abs() < 1e-12);

        let probs = model.probabilities(&batter, &pitcher, factor, &context);
        assert_valid(&probs);
        assert!((probs.hit - 0.6).abs() < 1e-9);
        assert!((probs.out_total() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_dominant_pitcher_factor_is_not_capped() {
        let model = OutcomeModel::new(
            OutcomeWeights {
                era_weight: 10.0,
                whip_weight: 3.0,
                ..Default::default()
            },
            ProbabilityLimits::default(),
        );
        let ace = Pitcher::new("Ace", 1.0, 0.5, 18.0, PitcherRole::Starter, 6.0);
        // 10 * 6 * 2 = 120
        let factor = model.pitcher_factor(&ace, &PitchingContext::default());
        assert!((factor - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_hit_distribution() {
        let model = OutcomeModel::default();
        let dist = model.hit_distribution(&reference_batter());
        assert!((dist.single - 0.6).abs() < 1e-12);
        assert!((dist.home_run - 0.27).abs() < 1e-12);
        let total = dist.single + dist.double + dist.triple + dist.home_run;
        assert!((total - 1.0).abs() < 1e-12);

        let slap_hitter = Batter::new("Slap", 0.300, 0.330, 0.340);
        assert!((model.hit_distribution(&slap_hitter).single - 0.85).abs() < 1e-12);
    }

    #[test]
    fn test_outcome_classification() {
        assert!(AtBatOutcome::Strikeout.is_out());
        assert!(!AtBatOutcome::Walk.is_out());
        assert!(!AtBatOutcome::Walk.is_hit());
        assert!(AtBatOutcome::Single.is_hit());
        assert!(!AtBatOutcome::Single.is_extra_base_hit());
        assert!(AtBatOutcome::HomeRun.is_extra_base_hit());
    }
}
