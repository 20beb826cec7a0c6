//! Pitcher rotation - chooses who throws each inning.

use rand::Rng;
use rand_distr::{Distribution, WeightedIndex};

use crate::schema::{Pitcher, PitcherRole};

use super::SimulationError;

/// Inning from which an available closer is always used.
pub const CLOSER_INNING: u32 = 8;

/// Runs allowed above which better-ERA arms are favored.
pub const BLOWOUT_RUNS: u32 = 5;

/// Pick the pitcher for `inning`, returning an index into `pitchers`.
///
/// Only pitchers with stamina above the eligibility threshold are considered.
/// Inning 1 goes to the first eligible starter and innings from
/// [`CLOSER_INNING`] on go to the first eligible closer; otherwise the pitcher
/// is drawn with probability proportional to [`selection_weight`].
pub fn select_pitcher<R: Rng + ?Sized>(
    pitchers: &[Pitcher],
    inning: u32,
    runs_allowed: u32,
    rng: &mut R,
) -> Result<usize, SimulationError> {
    let eligible: Vec<usize> = pitchers
        .iter()
        .enumerate()
        .filter(|(_, p)| p.can_pitch())
        .map(|(i, _)| i)
        .collect();

    if eligible.is_empty() {
        return Err(SimulationError::NoEligiblePitcher { inning });
    }

    let first_with_role = |role: PitcherRole| {
        eligible
            .iter()
            .copied()
            .find(|&i| pitchers[i].role == role)
    };

    if inning == 1
        && let Some(idx) = first_with_role(PitcherRole::Starter)
    {
        return Ok(idx);
    }
    if inning >= CLOSER_INNING
        && let Some(idx) = first_with_role(PitcherRole::Closer)
    {
        return Ok(idx);
    }

    let weights: Vec<f64> = eligible
        .iter()
        .map(|&i| selection_weight(&pitchers[i], inning, runs_allowed))
        .collect();

    let idx = match WeightedIndex::new(&weights) {
        Ok(dist) => eligible[dist.sample(rng)],
        // Degenerate weights: fall back to a uniform draw.
        Err(_) => eligible[rng.gen_range(0..eligible.len())],
    };
    Ok(idx)
}

/// Unnormalized selection weight of an eligible pitcher.
pub fn selection_weight(pitcher: &Pitcher, inning: u32, runs_allowed: u32) -> f64 {
    let mut weight = role_affinity(pitcher.role, inning);

    if runs_allowed > BLOWOUT_RUNS {
        weight *= if pitcher.era > 0.0 {
            5.0 / pitcher.era
        } else {
            2.0
        };
    }

    weight
}

/// Multiplier expressing how well a role fits an inning.
pub fn role_affinity(role: PitcherRole, inning: u32) -> f64 {
    match role {
        PitcherRole::Starter => {
            if inning <= 5 {
                2.0
            } else {
                0.5
            }
        }
        PitcherRole::MiddleRelief => {
            if (6..=7).contains(&inning) {
                1.5
            } else {
                1.0
            }
        }
        PitcherRole::Setup => {
            if (7..=8).contains(&inning) {
                2.0
            } else {
                1.0
            }
        }
        PitcherRole::Closer => {
            if inning >= CLOSER_INNING {
                3.0
            } else {
                0.3
            }
        }
    }
}
