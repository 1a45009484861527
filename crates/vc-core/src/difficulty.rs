use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Game difficulty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
}

/// Numeric knobs derived from a [`Difficulty`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    /// Fund size before upgrades.
    pub starting_cash: Decimal,
    /// Per-company, per-turn chance of drawing a market event from the pool.
    pub event_frequency: f64,
    /// Half-width of the monthly random walk.
    pub volatility: f64,
    /// Turns in a standard game.
    pub max_turns: u32,
    /// Chance that a company gets one scheduled crisis.
    pub crisis_chance: f64,
}

impl Difficulty {
    pub fn profile(self) -> DifficultyProfile {
        let (cash, event_frequency, volatility, crisis_chance) = match self {
            Difficulty::Easy => (750_000, 0.20, 0.03, 0.10),
            Difficulty::Medium => (500_000, 0.30, 0.05, 0.20),
            Difficulty::Hard => (400_000, 0.40, 0.07, 0.30),
            Difficulty::Expert => (300_000, 0.50, 0.10, 0.40),
        };
        DifficultyProfile {
            starting_cash: Decimal::new(cash, 0),
            event_frequency,
            volatility,
            max_turns: 60,
            crisis_chance,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Expert => "Expert",
        };
        f.write_str(s)
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            "expert" => Ok(Difficulty::Expert),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}
