//! Roster types: batters, pitchers and the lineup/bullpen they form.

use serde::{Deserialize, Serialize};

/// Stamina fraction at or below which a pitcher can no longer be used.
pub const MIN_PITCHING_STAMINA: f64 = 0.2;

fn full_stamina() -> f64 {
    1.0
}

/// Offensive profile of a single batter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batter {
    /// Player name (used as the statistics key).
    pub name: String,
    /// Batting average (0.0-1.0).
    pub avg: f64,
    /// Slugging percentage (may exceed 1.0).
    pub slg: f64,
    /// On-base percentage (0.0-1.0).
    pub obp: f64,
}

impl Batter {
    pub fn new(name: impl Into<String>, avg: f64, slg: f64, obp: f64) -> Self {
        Self {
            name: name.into(),
            avg,
            slg,
            obp,
        }
    }
}

/// Bullpen role of a pitcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PitcherRole {
    Starter,
    MiddleRelief,
    Setup,
    Closer,
}

/// Pitcher profile plus in-game fatigue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pitcher {
    /// Player name (used as the statistics key).
    pub name: String,
    /// Earned run average.
    pub era: f64,
    /// Walks plus hits per inning pitched.
    pub whip: f64,
    /// Strikeouts per nine innings.
    pub k_per_9: f64,
    /// Bullpen role.
    pub role: PitcherRole,
    /// Innings the pitcher can throw from full stamina.
    pub stamina_capacity: f64,
    /// Remaining stamina as a fraction of capacity (0.0-1.0).
    #[serde(skip, default = "full_stamina")]
    pub current_stamina: f64,
}

impl Pitcher {
    pub fn new(
        name: impl Into<String>,
        era: f64,
        whip: f64,
        k_per_9: f64,
        role: PitcherRole,
        stamina_capacity: f64,
    ) -> Self {
        Self {
            name: name.into(),
            era,
            whip,
            k_per_9,
            role,
            stamina_capacity,
            current_stamina: 1.0,
        }
    }

    /// Whether the pitcher has enough stamina left to take the mound.
    #[inline]
    pub fn can_pitch(&self) -> bool {
        self.current_stamina > MIN_PITCHING_STAMINA
    }

    /// Restore full stamina. Safe to call repeatedly.
    pub fn rest(&mut self) {
        self.current_stamina = 1.0;
    }

    /// Drain the stamina spent on `innings` innings of work.
    pub fn tire(&mut self, innings: f64) {
        let used = innings / self.stamina_capacity;
        self.current_stamina = (self.current_stamina - used).max(0.0);
    }
}

/// Lineup and pitching staff supplied to a simulator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    /// Batting order.
    pub batters: Vec<Batter>,
    /// Pitching staff in rotation order.
    pub pitchers: Vec<Pitcher>,
}

impl Roster {
    /// Small sample roster used by the CLI example and tests.
    pub fn example() -> Self {
        let batters = vec![
            Batter::new("Leadoff", 0.285, 0.410, 0.360),
            Batter::new("Contact", 0.300, 0.445, 0.370),
            Batter::new("Slugger", 0.275, 0.560, 0.365),
            Batter::new("Cleanup", 0.265, 0.520, 0.345),
            Batter::new("Gap Hitter", 0.270, 0.470, 0.335),
            Batter::new("Veteran", 0.255, 0.420, 0.325),
            Batter::new("Catcher", 0.235, 0.380, 0.300),
            Batter::new("Shortstop", 0.245, 0.360, 0.310),
            Batter::new("Rookie", 0.230, 0.350, 0.295),
        ];
        let pitchers = vec![
            Pitcher::new("Ace", 3.10, 1.08, 9.8, PitcherRole::Starter, 6.5),
            Pitcher::new("Number Two", 3.85, 1.22, 8.4, PitcherRole::Starter, 6.0),
            Pitcher::new("Long Man", 4.40, 1.35, 7.1, PitcherRole::MiddleRelief, 3.0),
            Pitcher::new("Lefty Specialist", 3.95, 1.28, 9.0, PitcherRole::MiddleRelief, 2.0),
            Pitcher::new("Setup Arm", 3.20, 1.15, 10.5, PitcherRole::Setup, 1.5),
            Pitcher::new("Closer", 2.60, 1.02, 11.8, PitcherRole::Closer, 1.5),
        ];
        Self { batters, pitchers }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_is_idempotent() {
        let mut pitcher = Pitcher::new("Test", 4.0, 1.3, 9.0, PitcherRole::Starter, 6.0);
        pitcher.tire(3.0);
        assert!(pitcher.current_stamina < 1.0);

        pitcher.rest();
        assert_eq!(pitcher.current_stamina, 1.0);
        pitcher.rest();
        assert_eq!(pitcher.current_stamina, 1.0);
    }

    #[test]
    fn test_single_inning_capacity_drains_fully() {
        let mut pitcher = Pitcher::new("Opener", 4.0, 1.3, 9.0, PitcherRole::MiddleRelief, 1.0);
        assert!(pitcher.can_pitch());

        pitcher.tire(1.0);
        assert_eq!(pitcher.current_stamina, 0.0);
        assert!(!pitcher.can_pitch());
    }

    #[test]
    fn test_stamina_never_negative() {
        let mut pitcher = Pitcher::new("Opener", 4.0, 1.3, 9.0, PitcherRole::Closer, 0.5);
        pitcher.tire(1.0);
        pitcher.tire(1.0);
        assert_eq!(pitcher.current_stamina, 0.0);
    }

    #[test]
    fn test_eligibility_threshold_is_exclusive() {
        let mut pitcher = Pitcher::new("Edge", 4.0, 1.3, 9.0, PitcherRole::Setup, 1.0);
        pitcher.current_stamina = MIN_PITCHING_STAMINA;
        assert!(!pitcher.can_pitch());
        pitcher.current_stamina = MIN_PITCHING_STAMINA + 1e-9;
        assert!(pitcher.can_pitch());
    }

    #[test]
    fn test_pitcher_deserializes_with_full_stamina() {
        let json = r#"{
            "name": "Ace",
            "era": 3.1,
            "whip": 1.1,
            "k_per_9": 9.5,
            "role": "middle_relief",
            "stamina_capacity": 2.0
        }"#;
        let pitcher: Pitcher = serde_json::from_str(json).unwrap();
        assert_eq!(pitcher.role, PitcherRole::MiddleRelief);
        assert_eq!(pitcher.current_stamina, 1.0);
    }
}
