//! Leaderboard, final score and the end-of-game records handed to storage.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use vc_core::money::{floor_zero, percent_of, scale};
use vc_core::{CompanyTable, Portfolio, ScoreRecord, VCReputation};
use vc_econ::reputation::update_after_game;
use vc_econ::GameOutcome;

use crate::state::GameState;

/// General partner's share of profit above the hurdle.
pub const CARRY_RATE: f64 = 0.20;

/// Profit on committed capital that must be returned before carry applies.
pub const HURDLE_RATE: f64 = 0.40;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub firm: String,
    pub net_worth: Decimal,
    /// Percent return on fund plus reserve.
    pub roi: f64,
    pub is_player: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinalScore {
    /// Net worth after carried interest.
    pub net_worth: Decimal,
    pub roi: f64,
    pub successful_exits: u32,
    /// Carried interest deducted from the gross net worth.
    pub carry: Decimal,
}

/// Carry owed on `net_worth` given `committed` capital.
pub fn carried_interest_on(net_worth: Decimal, committed: Decimal) -> Decimal {
    let hurdle = committed + scale(committed, HURDLE_RATE);
    scale(floor_zero(net_worth - hurdle), CARRY_RATE)
}

fn marked_net_worth(portfolio: &Portfolio, companies: &CompanyTable) -> Decimal {
    floor_zero(portfolio.cash) + portfolio.follow_on_reserve + portfolio.holdings_value(companies)
}

impl GameState {
    /// Player and AI funds, richest first.
    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        let committed = self.committed_capital();
        let player_worth = marked_net_worth(&self.portfolio, &self.companies);
        let mut board = vec![LeaderboardEntry {
            name: self.player_name.clone(),
            firm: self.firm_name.clone(),
            net_worth: player_worth,
            roi: percent_of(player_worth - committed, committed),
            is_player: true,
        }];
        for fund in self.ai_funds.iter() {
            let committed = fund.portfolio.fund_size + self.initial_reserve;
            let worth = marked_net_worth(&fund.portfolio, &self.companies);
            board.push(LeaderboardEntry {
                name: fund.config.name.clone(),
                firm: fund.config.firm.clone(),
                net_worth: worth,
                roi: percent_of(worth - committed, committed),
                is_player: false,
            });
        }
        board.sort_by(|a, b| b.net_worth.cmp(&a.net_worth));
        board
    }

    pub fn carried_interest(&self) -> Decimal {
        carried_interest_on(marked_net_worth(&self.portfolio, &self.companies), self.committed_capital())
    }

    /// Net worth after carry, ROI on committed capital, and successful exits.
    ///
    /// Exits count profitable realized exits plus live holdings marked at five times entry or
    /// better.
    pub fn final_score(&self) -> FinalScore {
        let committed = self.committed_capital();
        let gross = marked_net_worth(&self.portfolio, &self.companies);
        let carry = carried_interest_on(gross, committed);
        let net_worth = gross - carry;
        let realized = self.portfolio.exits.iter().filter(|e| e.is_profitable()).count() as u32;
        FinalScore {
            net_worth,
            roi: percent_of(net_worth - committed, committed),
            successful_exits: realized + self.paper_exits(),
            carry,
        }
    }

    /// The score row for the storage collaborator.
    pub fn score_record(&self, recorded_at: DateTime<Utc>) -> ScoreRecord {
        let score = self.final_score();
        ScoreRecord {
            player_name: self.player_name.clone(),
            firm_name: self.firm_name.clone(),
            final_net_worth: score.net_worth,
            roi: score.roi,
            successful_exits: score.successful_exits,
            turns_played: self.portfolio.turn.saturating_sub(1).min(self.portfolio.max_turns),
            difficulty: self.difficulty,
            recorded_at,
        }
    }

    /// Whether the player sits at the top of the leaderboard.
    pub fn player_leads(&self) -> bool {
        self.leaderboard().first().map_or(false, |e| e.is_player)
    }

    /// The player's reputation with this game folded in.
    pub fn updated_reputation(&self) -> VCReputation {
        let score = self.final_score();
        let relationships: Vec<f64> = self
            .portfolio
            .investments
            .iter()
            .map(|i| i.relationship_score)
            .collect();
        let avg_relationship = if relationships.is_empty() {
            None
        } else {
            Some(relationships.iter().sum::<f64>() / relationships.len() as f64)
        };
        let outcome = GameOutcome {
            roi: score.roi,
            successful_exits: score.successful_exits,
            avg_relationship,
            won: self.player_leads(),
        };
        let updated = update_after_game(&self.reputation, &outcome);
        info!(
            player = %self.player_name,
            roi = outcome.roi,
            exits = outcome.successful_exits,
            won = outcome.won,
            games = updated.total_games_played,
            "reputation updated"
        );
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use vc_core::money::usd;

    #[test]
    fn carry_applies_above_hurdle_only() {
        assert_eq!(carried_interest_on(usd(2_000_000), usd(1_000_000)), usd(120_000));
        assert_eq!(carried_interest_on(usd(1_300_000), usd(1_000_000)), Decimal::ZERO);
        assert_eq!(carried_interest_on(usd(400_000), usd(1_000_000)), Decimal::ZERO);
    }

    proptest! {
        #[test]
        fn carry_never_exceeds_a_fifth_of_gains(worth in 0i64..50_000_000, committed in 1i64..5_000_000) {
            let carry = carried_interest_on(usd(worth), usd(committed));
            prop_assert!(carry >= Decimal::ZERO);
            prop_assert!(carry <= scale(floor_zero(usd(worth) - usd(committed)), CARRY_RATE) + Decimal::ONE);
        }
    }
}
