//! Cumulative box-score accumulators and the rate statistics derived from them.

use serde::{Deserialize, Serialize};

use super::AtBatOutcome;

/// Counting statistics for one batter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatterBoxScore {
    pub at_bats: u32,
    pub hits: u32,
    pub extra_base_hits: u32,
    pub rbis: u32,
    pub strikeouts: u32,
    pub walks: u32,
    pub runs_scored: u32,
    /// Plate appearances that began with at least one runner on base.
    pub runners_on_base: u32,
    pub hits_with_runners_on: u32,
}

impl BatterBoxScore {
    /// Record a plate appearance by this batter.
    pub fn record(&mut self, outcome: AtBatOutcome, runs_batted_in: u32, runners_on: bool) {
        match outcome {
            AtBatOutcome::Walk => self.walks += 1,
            _ => self.at_bats += 1,
        }
        if outcome == AtBatOutcome::Strikeout {
            self.strikeouts += 1;
        }
        if outcome.is_hit() {
            self.hits += 1;
            if outcome.is_extra_base_hit() {
                self.extra_base_hits += 1;
            }
            if runners_on {
                self.hits_with_runners_on += 1;
            }
        }
        if runners_on {
            self.runners_on_base += 1;
        }
        self.rbis += runs_batted_in;
    }

    #[inline]
    pub fn plate_appearances(&self) -> u32 {
        self.at_bats + self.walks
    }

    /// Derived rates over `games` games.
    pub fn rates(&self, games: u32) -> BattingRates {
        let pa = self.plate_appearances();
        BattingRates {
            batting_average: ratio(self.hits, self.at_bats),
            extra_base_pct: ratio(self.extra_base_hits, self.hits),
            rbi_per_game: ratio(self.rbis, games),
            strikeout_rate: ratio(self.strikeouts, pa),
            walk_rate: ratio(self.walks, pa),
            clutch_hit_rate: ratio(self.hits_with_runners_on, self.runners_on_base),
        }
    }
}

/// Counting statistics for one pitcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitcherBoxScore {
    pub innings_pitched: u32,
    pub earned_runs: u32,
    pub hits_allowed: u32,
    pub walks_allowed: u32,
    pub strikeouts: u32,
    /// Batters faced with at least one runner on base.
    pub runners_on_base_faced: u32,
    pub runs_with_runners_on: u32,
    pub wins: u32,
    pub losses: u32,
}

impl PitcherBoxScore {
    /// Record a plate appearance against this pitcher.
    pub fn record(&mut self, outcome: AtBatOutcome, runs: u32, runners_on: bool) {
        match outcome {
            AtBatOutcome::Strikeout => self.strikeouts += 1,
            AtBatOutcome::Walk => self.walks_allowed += 1,
            o if o.is_hit() => self.hits_allowed += 1,
            _ => {}
        }
        if runners_on {
            self.runners_on_base_faced += 1;
            self.runs_with_runners_on += runs;
        }
        self.earned_runs += runs;
    }

    /// Derived rates.
    pub fn rates(&self) -> PitchingRates {
        let ip = self.innings_pitched as f64;
        let per_inning = |count: u32| {
            if ip > 0.0 {
                count as f64 / ip
            } else {
                0.0
            }
        };
        PitchingRates {
            era: 9.0 * per_inning(self.earned_runs),
            whip: per_inning(self.hits_allowed + self.walks_allowed),
            k_per_9: 9.0 * per_inning(self.strikeouts),
            innings_pitched: self.innings_pitched,
            wins: self.wins,
            losses: self.losses,
        }
    }
}

/// Rate statistics reported per batter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BattingRates {
    pub batting_average: f64,
    pub extra_base_pct: f64,
    pub rbi_per_game: f64,
    pub strikeout_rate: f64,
    pub walk_rate: f64,
    pub clutch_hit_rate: f64,
}

/// Rate statistics reported per pitcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PitchingRates {
    pub era: f64,
    pub whip: f64,
    pub k_per_9: f64,
    pub innings_pitched: u32,
    pub wins: u32,
    pub losses: u32,
}

fn ratio(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batter_record() {
        let mut score = BatterBoxScore::default();
        score.record(AtBatOutcome::Double, 1, true);
        score.record(AtBatOutcome::Walk, 0, false);
        score.record(AtBatOutcome::Strikeout, 0, true);
        score.record(AtBatOutcome::Single, 0, false);

        assert_eq!(score.at_bats, 3);
        assert_eq!(score.walks, 1);
        assert_eq!(score.hits, 2);
        assert_eq!(score.extra_base_hits, 1);
        assert_eq!(score.strikeouts, 1);
        assert_eq!(score.rbis, 1);
        assert_eq!(score.runners_on_base, 2);
        assert_eq!(score.hits_with_runners_on, 1);

        let rates = score.rates(2);
        assert!((rates.batting_average - 2.0 / 3.0).abs() < 1e-12);
        assert!((rates.extra_base_pct - 0.5).abs() < 1e-12);
        assert!((rates.rbi_per_game - 0.5).abs() < 1e-12);
        assert!((rates.strikeout_rate - 0.25).abs() < 1e-12);
        assert!((rates.walk_rate - 0.25).abs() < 1e-12);
        assert!((rates.clutch_hit_rate - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_empty_rates_are_zero() {
        assert_eq!(BatterBoxScore::default().rates(0), BattingRates::default());
        assert_eq!(PitcherBoxScore::default().rates(), PitchingRates::default());
    }

    #[test]
    fn test_pitcher_rates() {
        let mut score = PitcherBoxScore {
            innings_pitched: 3,
            ..Default::default()
        };
        score.record(AtBatOutcome::HomeRun, 2, true);
        score.record(AtBatOutcome::Walk, 0, false);
        score.record(AtBatOutcome::Strikeout, 0, false);

        assert_eq!(score.runners_on_base_faced, 1);
        assert_eq!(score.runs_with_runners_on, 2);

        let rates = score.rates();
        assert!((rates.era - 6.0).abs() < 1e-12);
        assert!((rates.whip - 2.0 / 3.0).abs() < 1e-12);
        assert!((rates.k_per_9 - 3.0).abs() < 1e-12);
    }
}
