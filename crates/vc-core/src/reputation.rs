use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::difficulty::Difficulty;

/// Cross-game reputation, stored by the caller and handed back at setup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VCReputation {
    pub player_name: String,
    /// Returns-driven sub-score in [0,100].
    pub performance_score: f64,
    /// Founder-relationship sub-score in [0,100].
    pub founder_score: f64,
    /// Market-presence sub-score in [0,100].
    pub market_score: f64,
    pub total_games_played: u32,
    pub successful_exits: u32,
    /// Rolling average ROI, percent.
    pub avg_roi_last5: f64,
    /// Accumulated market points.
    pub market_points: f64,
    /// Consecutive games finished at the top of the leaderboard.
    pub win_streak: u32,
}

impl VCReputation {
    /// A player with no history.
    pub fn new(player_name: impl Into<String>) -> Self {
        Self {
            player_name: player_name.into(),
            performance_score: 50.0,
            founder_score: 50.0,
            market_score: 50.0,
            total_games_played: 0,
            successful_exits: 0,
            avg_roi_last5: 0.0,
            market_points: 0.0,
            win_streak: 0,
        }
    }
}

/// Deal-flow quality tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReputationTier {
    Tier1,
    Tier2,
    Tier3,
}

/// Display level for a reputation score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReputationLevel {
    Legendary,
    Elite,
    Established,
    Rising,
    Emerging,
}

/// One finished game, as handed to the storage collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub player_name: String,
    pub firm_name: String,
    pub final_net_worth: Decimal,
    pub roi: f64,
    pub successful_exits: u32,
    pub turns_played: u32,
    pub difficulty: Difficulty,
    pub recorded_at: DateTime<Utc>,
}
