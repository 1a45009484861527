//! Cross-game reputation arithmetic and deal-flow tiering.

use serde::{Deserialize, Serialize};
use vc_core::{ReputationLevel, ReputationTier, VCReputation};

/// Weighted blend: 40% performance, 30% founder, 30% market.
pub fn aggregate(r: &VCReputation) -> f64 {
    0.4 * r.performance_score + 0.3 * r.founder_score + 0.3 * r.market_score
}

pub fn tier(r: &VCReputation) -> ReputationTier {
    let a = aggregate(r);
    if a >= 70.0 {
        ReputationTier::Tier1
    } else if a >= 40.0 {
        ReputationTier::Tier2
    } else {
        ReputationTier::Tier3
    }
}

pub fn level(r: &VCReputation) -> ReputationLevel {
    match aggregate(r) {
        a if a >= 90.0 => ReputationLevel::Legendary,
        a if a >= 80.0 => ReputationLevel::Elite,
        a if a >= 70.0 => ReputationLevel::Established,
        a if a >= 50.0 => ReputationLevel::Rising,
        _ => ReputationLevel::Emerging,
    }
}

/// Performance sub-score from average ROI (percent) and exit rate.
pub fn performance_score(avg_roi: f64, successful_exits: u32, total_games: u32) -> f64 {
    if total_games == 0 {
        return 50.0;
    }
    let roi_score = if avg_roi > 0.0 {
        40.0 + (avg_roi / 2.5).min(40.0)
    } else {
        (40.0 + avg_roi / 2.0).max(0.0)
    };
    let exit_rate = successful_exits as f64 / total_games as f64;
    (roi_score + exit_rate * 20.0).min(100.0)
}

/// Market sub-score from accumulated points and the current win streak.
pub fn market_score(points: f64, win_streak: u32) -> f64 {
    let base = 30.0 + (points.max(0.0) / 25.0).min(40.0);
    let streak = (win_streak as f64 * 7.5).min(30.0);
    (base + streak).min(100.0)
}

/// Outcome of one finished game, as fed into the reputation update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameOutcome {
    /// ROI in percent.
    pub roi: f64,
    pub successful_exits: u32,
    /// Mean founder relationship across the final portfolio, if any positions remained.
    pub avg_relationship: Option<f64>,
    /// Player finished first on the leaderboard.
    pub won: bool,
}

/// Fold one game into a reputation record.
pub fn update_after_game(current: &VCReputation, outcome: &GameOutcome) -> VCReputation {
    let games = current.total_games_played;
    let avg_roi = if games == 0 {
        outcome.roi
    } else if games < 5 {
        let w = 1.0 / (games as f64 + 1.0);
        current.avg_roi_last5 * (1.0 - w) + outcome.roi * w
    } else {
        current.avg_roi_last5 * 0.8 + outcome.roi * 0.2
    };
    let founder_score = match outcome.avg_relationship {
        Some(avg) if games == 0 => avg,
        Some(avg) => current.founder_score * 0.7 + avg * 0.3,
        None => current.founder_score,
    };
    let win_streak = if outcome.won { current.win_streak + 1 } else { 0 };
    let market_points = current.market_points
        + outcome.successful_exits as f64 * 50.0
        + if outcome.roi > 0.0 { 25.0 } else { 0.0 };
    let successful_exits = current.successful_exits + outcome.successful_exits;
    let total_games_played = games + 1;

    VCReputation {
        player_name: current.player_name.clone(),
        performance_score: performance_score(avg_roi, successful_exits.min(total_games_played), total_games_played),
        founder_score,
        market_score: market_score(market_points, win_streak),
        total_games_played,
        successful_exits,
        avg_roi_last5: avg_roi,
        market_points,
        win_streak,
    }
}

/// Points added to a new founder relationship, by aggregate reputation.
pub fn founder_trust_bonus(r: &VCReputation) -> f64 {
    match aggregate(r) {
        a if a >= 80.0 => 10.0,
        a if a >= 70.0 => 8.0,
        a if a >= 60.0 => 5.0,
        a if a >= 50.0 => 3.0,
        _ => 0.0,
    }
}

/// Deal-quality bonus from strong founder relationships.
pub fn founder_referral_bonus(founder_score: f64) -> f64 {
    if founder_score >= 80.0 {
        0.10
    } else if founder_score >= 70.0 {
        0.05
    } else {
        0.0
    }
}
