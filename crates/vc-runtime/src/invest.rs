//! First cheques and follow-on participation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use vc_core::money::{format_usd, scale};
use vc_core::{
    term_sheet_options, CompanyId, HolderId, Investment, InvestmentTerms, RoundKey, TermsKind,
    Upgrade,
};
use vc_econ::reputation::founder_trust_bonus;
use vc_econ::{entry_equity, follow_on_bounds, follow_on_equity};

use crate::error::{FollowOnError, InvestError};
use crate::founders::{founder_name, initial_relationship};
use crate::scheduler::DueEvents;
use crate::state::GameState;

/// A non-down round closing this turn in a company the player holds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FollowOnOpportunity {
    pub company: CompanyId,
    pub company_name: String,
    pub round_name: String,
    pub round: RoundKey,
    pub pre_money: Decimal,
    pub post_money: Decimal,
    pub raise: Decimal,
    pub min_amount: Decimal,
    pub max_amount: Decimal,
    /// Player equity before the round.
    pub current_equity: f64,
}

impl GameState {
    /// Largest stake a single holder may take at entry, as a fraction.
    pub(crate) fn max_stake_fraction(&self) -> f64 {
        if self.upgrades.has(Upgrade::SuperProRata) {
            self.config.super_pro_rata_fraction
        } else {
            self.config.max_stake_fraction
        }
    }

    /// Term-sheet variants for a cheque of `amount` into the startup at `index`.
    pub fn term_options(&self, index: usize, amount: Decimal) -> Result<Vec<InvestmentTerms>, InvestError> {
        let company = self
            .companies
            .get(CompanyId(index as u32))
            .filter(|_| index < self.companies.len())
            .ok_or(InvestError::InvalidIndex(index))?;
        Ok(term_sheet_options(
            amount,
            company.valuation(),
            self.config.board_seat_threshold,
            &self.upgrades,
        ))
    }

    /// Invest with standard preferred terms.
    pub fn make_investment(&mut self, index: usize, amount: Decimal) -> Result<(), InvestError> {
        let terms = InvestmentTerms::preferred(amount, self.config.board_seat_threshold, &self.upgrades);
        self.make_investment_with_terms(index, amount, terms)
    }

    /// Open a position in the startup at roster `index`.
    pub fn make_investment_with_terms(
        &mut self,
        index: usize,
        amount: Decimal,
        terms: InvestmentTerms,
    ) -> Result<(), InvestError> {
        let min = self.config.min_investment;
        if amount <= Decimal::ZERO {
            return Err(InvestError::BelowMinimum(min));
        }
        if amount > self.portfolio.cash {
            return Err(InvestError::InsufficientFunds {
                available: self.portfolio.cash,
                requested: amount,
            });
        }
        if index >= self.companies.len() {
            return Err(InvestError::InvalidIndex(index));
        }
        let id = CompanyId(index as u32);
        let max_fraction = self.max_stake_fraction();
        let seed_bonus = self.upgrades.has(Upgrade::SeedAccelerator)
            && self.portfolio.investments.is_empty()
            && self.portfolio.exits.is_empty();
        if terms.kind == TermsKind::PreferredTwoX && !self.upgrades.has(Upgrade::LiquidationPreference2x) {
            return Err(InvestError::TermsUnavailable);
        }

        let company = self
            .companies
            .get_mut(id)
            .ok_or(InvestError::InvalidIndex(index))?;
        if !company.is_active() {
            return Err(InvestError::CompanyUnavailable(company.name().to_string()));
        }
        if self.portfolio.holds(id) {
            return Err(InvestError::AlreadyInvested(company.name().to_string()));
        }
        if amount < min {
            return Err(InvestError::BelowMinimum(min));
        }
        let max = scale(company.valuation(), max_fraction);
        if amount > max {
            return Err(InvestError::AboveMaximum(max));
        }

        let equity = entry_equity(amount, company.valuation(), &terms, max_fraction * 100.0, seed_bonus)?;
        company.cap_table.add_stake(HolderId::Player, equity)?;

        let turn = self.portfolio.turn;
        let relationship = (initial_relationship(&mut self.rng, &terms, company.diligence.is_some(), amount)
            + founder_trust_bonus(&self.reputation))
        .min(100.0);
        let investment = Investment {
            company: id,
            company_name: company.name().to_string(),
            category: company.startup.category.clone(),
            amount_invested: amount,
            initial_equity: equity,
            entry_valuation: company.valuation(),
            entry_turn: turn,
            terms,
            founder_name: founder_name(&mut self.rng),
            relationship_score: relationship,
            last_interaction: turn,
            months_held: 0,
            follow_on_round: None,
            negative_news_sent: false,
        };
        info!(
            company = %investment.company_name,
            amount = %format_usd(amount),
            equity,
            terms = %investment.terms.kind,
            board_seat = investment.terms.board_seat,
            "investment made"
        );
        self.portfolio.cash -= amount;
        self.portfolio.investments.push(investment);
        self.portfolio.refresh_net_worth(&self.companies);
        self.gate.invalidate();
        Ok(())
    }

    /// Non-down rounds closing this turn in companies the player holds and has not yet decided
    /// on. Rounds the player cannot afford the minimum for are not offered, and neither are
    /// rounds in a company whose board vote is still open: that vote settles the price first.
    pub fn follow_on_opportunities(&self) -> Vec<FollowOnOpportunity> {
        let turn = self.portfolio.turn;
        let capacity = self.portfolio.follow_on_capacity();
        let mut out: Vec<FollowOnOpportunity> = Vec::new();
        for round in self.events.rounds_due(turn) {
            if round.down_round
                || self.follow_on_decisions.contains(&round.company)
                || out.iter().any(|o| o.company == round.company)
                || self.board_votes.iter().any(|v| v.company == round.company)
            {
                continue;
            }
            let Some(inv) = self.portfolio.find(round.company) else {
                continue;
            };
            let Some(company) = self.companies.get(round.company).filter(|c| c.is_active()) else {
                continue;
            };
            let pre_money = company.valuation();
            let bounds = follow_on_bounds(pre_money, round.raise, capacity, self.config.min_investment);
            if bounds.max < bounds.min {
                continue;
            }
            out.push(FollowOnOpportunity {
                company: round.company,
                company_name: inv.company_name.clone(),
                round_name: round.name(),
                round: round.key(),
                pre_money,
                post_money: pre_money + round.raise,
                raise: round.raise,
                min_amount: bounds.min,
                max_amount: bounds.max,
                current_equity: company.cap_table.equity_of(HolderId::Player),
            });
        }
        out
    }

    fn opportunity_for(&self, company: CompanyId) -> Result<FollowOnOpportunity, FollowOnError> {
        if self.follow_on_decisions.contains(&company) {
            return Err(FollowOnError::AlreadyDecided(company));
        }
        self.follow_on_opportunities()
            .into_iter()
            .find(|o| o.company == company)
            .ok_or(FollowOnError::NoOpportunity(company))
    }

    /// Commit `amount` into the round closing this turn at `company`.
    ///
    /// All capital invested so far converts at the round's price; the position is then excluded
    /// from that round's dilution.
    pub fn make_follow_on_investment(&mut self, company: CompanyId, amount: Decimal) -> Result<(), FollowOnError> {
        let opp = self.opportunity_for(company)?;
        if amount < opp.min_amount {
            return Err(FollowOnError::BelowMinimum(opp.min_amount));
        }
        let capacity = self.portfolio.follow_on_capacity();
        if amount > capacity {
            return Err(FollowOnError::InsufficientFunds {
                available: capacity,
                requested: amount,
            });
        }
        if amount > opp.max_amount {
            return Err(FollowOnError::AboveMaximum(opp.max_amount));
        }
        let Some(inv) = self.portfolio.find(company) else {
            return Err(FollowOnError::NoOpportunity(company));
        };
        let total = inv.amount_invested + amount;
        let equity = follow_on_equity(total, &inv.terms, opp.pre_money, opp.raise);
        if let Some(state) = self.companies.get_mut(company) {
            state.cap_table.set_equity(HolderId::Player, equity)?;
        }

        self.portfolio.draw_cash_then_reserve(amount);
        let turn = self.portfolio.turn;
        if let Some(inv) = self.portfolio.find_mut(company) {
            inv.amount_invested = total;
            inv.follow_on_round = Some(opp.round);
            inv.last_interaction = turn;
        }
        info!(
            company = %opp.company_name,
            round = %opp.round_name,
            amount = %format_usd(amount),
            before = opp.current_equity,
            after = equity,
            "follow-on committed"
        );
        self.follow_on_decisions.insert(company);
        self.gate.decided(self.pending_follow_ons(), self.board_votes.len());
        Ok(())
    }

    /// Pass on the round closing this turn at `company`; the position will be diluted.
    pub fn decline_follow_on(&mut self, company: CompanyId) -> Result<(), FollowOnError> {
        let opp = self.opportunity_for(company)?;
        info!(company = %opp.company_name, round = %opp.round_name, "follow-on declined");
        self.follow_on_decisions.insert(company);
        self.gate.decided(self.pending_follow_ons(), self.board_votes.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{GameSetup, RosterSource};
    use vc_core::money::usd;
    use vc_core::{Difficulty, EngineConfig, FundingRoundEvent, RoundStage, ScheduledEvent, Startup};

    fn game(upgrades: &[&str]) -> GameState {
        let roster = vec![
            Startup::new("Ledgerly", "FinTech", usd(1_000_000), 0.4, 0.7),
            Startup::new("Orbital", "SpaceTech", usd(500_000), 0.8, 0.9),
        ];
        let config = EngineConfig {
            ai_funds: vec![],
            ..EngineConfig::default()
        };
        GameState::new_game(
            GameSetup::new("Ada", Difficulty::Easy, RosterSource::Fixed(roster))
                .with_config(config)
                .with_upgrades(upgrades.iter().copied())
                .without_scheduled_events(),
        )
    }

    #[test]
    fn bounds_are_inclusive() {
        let mut g = game(&[]);
        assert_eq!(g.make_investment(0, usd(200_000)), Ok(()));
        assert_eq!(g.make_investment(1, usd(10_000)), Ok(()));
        assert_eq!(g.player_equity(CompanyId(0)), 20.0);
        assert_eq!(g.player_equity(CompanyId(1)), 2.0);
    }

    #[test]
    fn rejects_in_order() {
        let mut g = game(&[]);
        assert_eq!(g.make_investment(0, Decimal::ZERO), Err(InvestError::BelowMinimum(usd(10_000))));
        assert!(matches!(
            g.make_investment(0, usd(10_000_000)),
            Err(InvestError::InsufficientFunds { .. })
        ));
        assert_eq!(g.make_investment(9, usd(50_000)), Err(InvestError::InvalidIndex(9)));
        assert_eq!(g.make_investment(0, usd(9_999)), Err(InvestError::BelowMinimum(usd(10_000))));
        assert_eq!(g.make_investment(0, usd(200_001)), Err(InvestError::AboveMaximum(usd(200_000))));
        g.make_investment(0, usd(50_000)).unwrap();
        assert_eq!(
            g.make_investment(0, usd(50_000)),
            Err(InvestError::AlreadyInvested("Ledgerly".into()))
        );
        assert_eq!(g.portfolio().cash, usd(700_000));
    }

    #[test]
    fn two_x_preference_needs_upgrade() {
        let mut g = game(&[]);
        let terms = InvestmentTerms {
            kind: TermsKind::PreferredTwoX,
            ..InvestmentTerms::common()
        };
        assert_eq!(
            g.make_investment_with_terms(0, usd(50_000), terms),
            Err(InvestError::TermsUnavailable)
        );
        assert_eq!(g.term_options(0, usd(50_000)).unwrap().len(), 4);
        assert_eq!(game(&["liquidation_preference_2x"]).term_options(0, usd(50_000)).unwrap().len(), 5);
    }

    #[test]
    fn super_pro_rata_lifts_the_cap() {
        let mut g = game(&["super_pro_rata"]);
        assert_eq!(g.make_investment(0, usd(500_000)), Ok(()));
        assert_eq!(g.player_equity(CompanyId(0)), 50.0);
    }

    #[test]
    fn follow_on_sets_equity_at_round_price() {
        let mut g = game(&[]);
        g.make_investment(0, usd(100_000)).unwrap();
        g.schedule_event(ScheduledEvent::Round(FundingRoundEvent {
            company: CompanyId(0),
            stage: RoundStage::Seed,
            turn: 1,
            raise: usd(1_000_000),
            down_round: false,
        }));
        let opps = g.follow_on_opportunities();
        assert_eq!(opps.len(), 1);
        assert_eq!(opps[0].max_amount, usd(200_000));
        assert!(matches!(
            g.make_follow_on_investment(CompanyId(0), usd(200_001)),
            Err(FollowOnError::AboveMaximum(_))
        ));
        g.make_follow_on_investment(CompanyId(0), usd(100_000)).unwrap();
        assert!((g.player_equity(CompanyId(0)) - 10.0).abs() < 1e-9);
        assert!(g.follow_on_opportunities().is_empty());
        assert_eq!(
            g.decline_follow_on(CompanyId(0)),
            Err(FollowOnError::AlreadyDecided(CompanyId(0)))
        );
    }
}
