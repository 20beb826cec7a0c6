//! Game simulator - Inning and game state machine.
//!
//! Drives outs, bases and runs one plate appearance at a time, asking the
//! rotation for a pitcher each inning and the outcome model for each result.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::schema::{Batter, Pitcher, Roster, SimulationConfig};

use super::{
    AtBatOutcome, BatterBoxScore, BattingRates, OutcomeModel, PitcherBoxScore, PitchingContext,
    PitchingRates, SimulationError, select_pitcher,
};

/// Outs that end a half-inning.
pub const OUTS_PER_INNING: u32 = 3;

/// Phase of the game state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// No game in progress.
    #[default]
    BetweenGames,
    /// Choosing the pitcher for a new inning.
    InningStart,
    /// Plate appearances until three outs.
    AtBat,
    /// Applying fatigue and per-game totals.
    InningEnd,
    /// Crediting the decision.
    GameEnd,
}

/// Base occupancy: `[first, second, third]`, each slot holding the lineup
/// index of the runner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bases {
    pub occupants: [Option<usize>; 3],
}

impl Bases {
    /// Number of runners on base.
    pub fn runners(&self) -> usize {
        self.occupants.iter().filter(|o| o.is_some()).count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.occupants.iter().all(Option::is_none)
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.occupants.iter().all(Option::is_some)
    }

    pub fn clear(&mut self) {
        self.occupants = [None; 3];
    }

    /// Apply `outcome` by `batter`, returning the lineup indices of every
    /// runner who scored (the batter included on a home run).
    pub fn advance(&mut self, outcome: AtBatOutcome, batter: usize) -> Vec<usize> {
        let [first, second, third] = self.occupants;
        let mut scored = Vec::new();

        match outcome {
            AtBatOutcome::Strikeout | AtBatOutcome::Out => {}
            AtBatOutcome::Walk => {
                // Only forced runners move.
                if let Some(r1) = first {
                    if let Some(r2) = second {
                        scored.extend(third);
                        self.occupants[2] = Some(r2);
                    }
                    self.occupants[1] = Some(r1);
                }
                self.occupants[0] = Some(batter);
            }
            AtBatOutcome::Single => {
                scored.extend(third);
                self.occupants = [Some(batter), first, second];
            }
            AtBatOutcome::Double => {
                scored.extend(third);
                scored.extend(second);
                self.occupants = [None, Some(batter), first];
            }
            AtBatOutcome::Triple => {
                scored.extend(third);
                scored.extend(second);
                scored.extend(first);
                self.occupants = [None, None, Some(batter)];
            }
            AtBatOutcome::HomeRun => {
                scored.extend(third);
                scored.extend(second);
                scored.extend(first);
                scored.push(batter);
                self.clear();
            }
        }

        scored
    }
}

/// Per-game state, rebuilt at the start of every game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameState {
    pub outs: u32,
    pub bases: Bases,
    /// Runs scored in the current half-inning.
    pub inning_runs: u32,
    /// Runs allowed over completed innings this game.
    pub runs_allowed: u32,
    /// Innings completed this game.
    pub innings_completed: u32,
    /// Pitcher of the current (or last) inning.
    pub current_pitcher: Option<usize>,
}

/// Stochastic baseball game simulator.
///
/// Box scores and the batting-order cursor live as long as the simulator and
/// carry over from game to game; everything in [`GameState`] is reset when a
/// game begins.
pub struct GameSimulator {
    batters: Vec<Batter>,
    pitchers: Vec<Pitcher>,
    model: OutcomeModel,
    innings: u32,
    rng: StdRng,
    state: GameState,
    phase: GamePhase,
    batting_cursor: usize,
    plate_appearances: u64,
    games_played: u32,
    batter_stats: Vec<BatterBoxScore>,
    pitcher_stats: Vec<PitcherBoxScore>,
}

impl GameSimulator {
    /// Create a simulator for `roster`, validating it against `config`.
    pub fn new(roster: Roster, config: &SimulationConfig) -> Result<Self, SimulationError> {
        config.validate(&roster)?;

        let seed = config.random_seed.unwrap_or_else(rand::random);
        let Roster { batters, pitchers } = roster;
        let batter_stats = vec![BatterBoxScore::default(); batters.len()];
        let pitcher_stats = vec![PitcherBoxScore::default(); pitchers.len()];

        Ok(Self {
            batters,
            pitchers,
            model: OutcomeModel::new(config.weights, config.limits),
            innings: config.innings,
            rng: StdRng::seed_from_u64(seed),
            state: GameState::default(),
            phase: GamePhase::BetweenGames,
            batting_cursor: 0,
            plate_appearances: 0,
            games_played: 0,
            batter_stats,
            pitcher_stats,
        })
    }

    /// Innings per game from the configuration.
    pub fn innings(&self) -> u32 {
        self.innings
    }

    pub fn model(&self) -> &OutcomeModel {
        &self.model
    }

    pub fn batters(&self) -> &[Batter] {
        &self.batters
    }

    pub fn pitchers(&self) -> &[Pitcher] {
        &self.pitchers
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Lineup index of the next batter due up.
    pub fn batting_cursor(&self) -> usize {
        self.batting_cursor
    }

    /// Plate appearances over the simulator's lifetime.
    pub fn plate_appearances(&self) -> u64 {
        self.plate_appearances
    }

    /// Games completed over the simulator's lifetime.
    pub fn games_played(&self) -> u32 {
        self.games_played
    }

    pub fn batter_box_scores(&self) -> &[BatterBoxScore] {
        &self.batter_stats
    }

    pub fn pitcher_box_scores(&self) -> &[PitcherBoxScore] {
        &self.pitcher_stats
    }

    /// Start a new game: rest every pitcher and clear per-game counters.
    ///
    /// Box scores and the batting-order cursor are left untouched.
    pub fn begin_game(&mut self) {
        for pitcher in &mut self.pitchers {
            pitcher.rest();
        }
        self.state = GameState::default();
        self.phase = GamePhase::InningStart;
    }

    /// Play one half-inning and return the runs scored in it.
    pub fn simulate_inning(&mut self, inning: u32) -> Result<u32, SimulationError> {
        self.phase = GamePhase::InningStart;

        let context = PitchingContext {
            innings_this_game: self.state.innings_completed,
            runs_allowed: self.state.runs_allowed,
        };
        let pitcher_idx = select_pitcher(
            &self.pitchers,
            inning,
            self.state.runs_allowed,
            &mut self.rng,
        )
        .inspect_err(|_| self.phase = GamePhase::BetweenGames)?;

        self.state.current_pitcher = Some(pitcher_idx);
        let factor = self
            .model
            .pitcher_factor(&self.pitchers[pitcher_idx], &context);

        self.state.outs = 0;
        self.state.bases.clear();
        self.state.inning_runs = 0;

        self.phase = GamePhase::AtBat;
        while self.state.outs < OUTS_PER_INNING {
            self.play_at_bat(pitcher_idx, factor, &context);
        }

        self.phase = GamePhase::InningEnd;
        self.pitchers[pitcher_idx].tire(1.0);
        self.pitcher_stats[pitcher_idx].innings_pitched += 1;

        let runs = self.state.inning_runs;
        self.state.runs_allowed += runs;
        self.state.innings_completed += 1;

        log::trace!(
            "inning {}: {} allowed {} runs",
            inning,
            self.pitchers[pitcher_idx].name,
            runs
        );

        Ok(runs)
    }

    /// Play one plate appearance against `pitcher_idx`.
    fn play_at_bat(&mut self, pitcher_idx: usize, factor: f64, context: &PitchingContext) {
        let batter_idx = self.batting_cursor;
        self.batting_cursor = (self.batting_cursor + 1) % self.batters.len();
        self.plate_appearances += 1;

        let runners_on = !self.state.bases.is_empty();
        let outcome = self.model.sample(
            &self.batters[batter_idx],
            &self.pitchers[pitcher_idx],
            factor,
            context,
            &mut self.rng,
        );

        let scored = self.state.bases.advance(outcome, batter_idx);
        let runs = scored.len() as u32;
        if outcome.is_out() {
            self.state.outs += 1;
        }
        self.state.inning_runs += runs;

        self.batter_stats[batter_idx].record(outcome, runs, runners_on);
        for runner in scored {
            self.batter_stats[runner].runs_scored += 1;
        }
        self.pitcher_stats[pitcher_idx].record(outcome, runs, runners_on);
    }

    /// Play a full game of `innings` innings and return the runs scored.
    ///
    /// An exhausted pitching staff aborts the game with
    /// [`SimulationError::NoEligiblePitcher`].
    pub fn simulate_game(&mut self, innings: u32) -> Result<u32, SimulationError> {
        if innings == 0 {
            return Err(crate::schema::ConfigError::InvalidInnings.into());
        }

        self.begin_game();

        let mut total_runs = 0;
        for inning in 1..=innings {
            total_runs += self.simulate_inning(inning).inspect_err(|e| {
                log::warn!("game {} aborted: {}", self.games_played + 1, e);
            })?;
        }

        self.phase = GamePhase::GameEnd;
        if let Some(last) = self.state.current_pitcher {
            let decision = &mut self.pitcher_stats[last];
            if total_runs > self.state.runs_allowed {
                decision.wins += 1;
            } else {
                decision.losses += 1;
            }
        }
        self.games_played += 1;

        log::debug!(
            "game {} final: {} runs in {} innings",
            self.games_played,
            total_runs,
            innings
        );

        Ok(total_runs)
    }

    /// Rate statistics for every batter, keyed by name.
    pub fn player_statistics(&self) -> BTreeMap<String, BattingRates> {
        self.batters
            .iter()
            .zip(&self.batter_stats)
            .map(|(b, s)| (b.name.clone(), s.rates(self.games_played)))
            .collect()
    }

    /// Rate statistics for every pitcher, keyed by name.
    pub fn pitcher_statistics(&self) -> BTreeMap<String, PitchingRates> {
        self.pitchers
            .iter()
            .zip(&self.pitcher_stats)
            .map(|(p, s)| (p.name.clone(), s.rates()))
            .collect()
    }
}
