//! Operational support the player buys for portfolio companies.

use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;
use vc_core::money::{scale, usd};
use vc_core::{CompanyId, HolderId};

use crate::error::ValueAddError;
use crate::report::{LogCategory, TurnReport};
use crate::state::GameState;

/// Minimum equity for actions that do not require a board seat, unless the holder has one.
pub const MIN_EQUITY_PCT: f64 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueAddKind {
    Recruiting,
    Sales,
    Technical,
    BoardLeadership,
    Marketing,
}

impl ValueAddKind {
    pub const ALL: [ValueAddKind; 5] = [
        ValueAddKind::Recruiting,
        ValueAddKind::Sales,
        ValueAddKind::Technical,
        ValueAddKind::BoardLeadership,
        ValueAddKind::Marketing,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ValueAddKind::Recruiting => "recruiting",
            ValueAddKind::Sales => "sales",
            ValueAddKind::Technical => "technical",
            ValueAddKind::BoardLeadership => "board_leadership",
            ValueAddKind::Marketing => "marketing",
        }
    }

    pub fn profile(self) -> ValueAddProfile {
        let (cost, relationship, boost, risk_reduction, duration, requires_board_seat) = match self {
            ValueAddKind::Recruiting => (20_000, (5.0, 10.0), (0.02, 0.05), 0.0, 3, false),
            ValueAddKind::Sales => (15_000, (3.0, 8.0), (0.01, 0.04), 0.0, 2, false),
            ValueAddKind::Technical => (25_000, (5.0, 12.0), (0.03, 0.07), 0.05, 4, false),
            ValueAddKind::BoardLeadership => (10_000, (4.0, 10.0), (0.0, 0.0), 0.0, 1, true),
            ValueAddKind::Marketing => (15_000, (5.0, 10.0), (0.02, 0.04), 0.0, 3, false),
        };
        ValueAddProfile {
            cost: usd(cost),
            relationship,
            boost,
            risk_reduction,
            duration,
            requires_board_seat,
        }
    }
}

impl fmt::Display for ValueAddKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueAddKind::Recruiting => "Recruiting Support",
            ValueAddKind::Sales => "Sales Introductions",
            ValueAddKind::Technical => "Technical Advisory",
            ValueAddKind::BoardLeadership => "Board Leadership",
            ValueAddKind::Marketing => "Marketing Guidance",
        };
        f.write_str(s)
    }
}

impl FromStr for ValueAddKind {
    type Err = ValueAddError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ValueAddKind::ALL
            .into_iter()
            .find(|k| k.id() == s)
            .ok_or_else(|| ValueAddError::UnknownAction(s.to_string()))
    }
}

/// Cost and effect ranges of one action type.
#[derive(Clone, Debug, PartialEq)]
pub struct ValueAddProfile {
    pub cost: Decimal,
    /// Relationship gain range.
    pub relationship: (f64, f64),
    /// Total valuation boost range, spread over `duration` turns.
    pub boost: (f64, f64),
    /// One-off risk score reduction.
    pub risk_reduction: f64,
    pub duration: u32,
    pub requires_board_seat: bool,
}

/// An action whose effects are still playing out.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveValueAdd {
    pub company: CompanyId,
    pub kind: ValueAddKind,
    pub applied_turn: u32,
    pub valuation_boost: f64,
    pub risk_reduction: f64,
    pub duration: u32,
}

/// What an action did immediately.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValueAddReceipt {
    pub kind: ValueAddKind,
    pub cost: Decimal,
    pub relationship_gain: f64,
    /// Total boost to be applied over the coming turns.
    pub valuation_boost: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueAddLedger {
    active: Vec<ActiveValueAdd>,
    helped_this_turn: Vec<CompanyId>,
    total_spent: Decimal,
}

impl ValueAddLedger {
    pub fn active(&self) -> &[ActiveValueAdd] {
        &self.active
    }

    pub fn actions_this_turn(&self) -> usize {
        self.helped_this_turn.len()
    }

    pub fn total_spent(&self) -> Decimal {
        self.total_spent
    }

    pub(crate) fn new_turn(&mut self) {
        self.helped_this_turn.clear();
    }
}

impl GameState {
    /// Spend cash on `action_id` for `company`.
    pub fn provide_value_add(&mut self, company: CompanyId, action_id: &str) -> Result<ValueAddReceipt, ValueAddError> {
        let kind: ValueAddKind = action_id.parse()?;
        let profile = kind.profile();
        let (equity, active) = self
            .companies
            .get(company)
            .map(|c| (c.cap_table.equity_of(HolderId::Player), c.is_active()))
            .unwrap_or((0.0, false));
        let turn = self.portfolio.turn;
        let cash = self.portfolio.cash;
        let limit = self.config.value_add_per_turn;
        let ledger = &mut self.value_add;

        let inv = self
            .portfolio
            .find_mut(company)
            .ok_or(ValueAddError::NotInvested(company))?;
        if !active {
            return Err(ValueAddError::CompanyInactive(inv.company_name.clone()));
        }
        if ledger.helped_this_turn.contains(&company) {
            return Err(ValueAddError::AlreadyHelpedThisTurn(inv.company_name.clone()));
        }
        if profile.requires_board_seat && !inv.has_board_seat() {
            return Err(ValueAddError::RequiresBoardSeat);
        }
        if !profile.requires_board_seat && !inv.has_board_seat() && equity < MIN_EQUITY_PCT {
            return Err(ValueAddError::InsufficientEquity {
                have: equity,
                need: MIN_EQUITY_PCT,
            });
        }
        if cash < profile.cost {
            return Err(ValueAddError::InsufficientFunds {
                available: cash,
                requested: profile.cost,
            });
        }
        if ledger.helped_this_turn.len() >= limit {
            return Err(ValueAddError::MaxActionsReached(limit));
        }

        let (lo, hi) = profile.relationship;
        let relationship_gain = self.rng.gen_range(lo..=hi);
        let valuation_boost = match profile.boost {
            (lo, hi) if hi > 0.0 => self.rng.gen_range(lo..=hi),
            _ => 0.0,
        };
        inv.adjust_relationship(relationship_gain);
        inv.last_interaction = turn;
        info!(company = %inv.company_name, action = %kind, relationship_gain, valuation_boost, "value-add provided");

        self.portfolio.cash -= profile.cost;
        ledger.helped_this_turn.push(company);
        ledger.total_spent += profile.cost;
        if valuation_boost > 0.0 || profile.risk_reduction > 0.0 {
            ledger.active.push(ActiveValueAdd {
                company,
                kind,
                applied_turn: turn,
                valuation_boost,
                risk_reduction: profile.risk_reduction,
                duration: profile.duration,
            });
        }
        Ok(ValueAddReceipt {
            kind,
            cost: profile.cost,
            relationship_gain,
            valuation_boost,
        })
    }

    /// Apply this turn's share of every live action, then prune finished ones.
    pub(crate) fn apply_value_add_effects(&mut self, report: &mut TurnReport) {
        let turn = self.portfolio.turn;
        self.value_add
            .active
            .retain(|a| turn.saturating_sub(a.applied_turn) < a.duration);
        for action in self.value_add.active.iter() {
            let Some(company) = self.companies.get_mut(action.company).filter(|c| c.is_active()) else {
                continue;
            };
            let since = turn.saturating_sub(action.applied_turn);
            if action.valuation_boost > 0.0 {
                let per_turn = action.valuation_boost / action.duration as f64;
                let boosted = scale(company.valuation(), 1.0 + per_turn);
                company.set_valuation(boosted);
                if since == 0 {
                    report.push(
                        LogCategory::ValueAdd,
                        Some(company.name()),
                        format!(
                            "Your {} for {} is showing results (+{:.1}% valuation)",
                            action.kind,
                            company.name(),
                            per_turn * 100.0
                        ),
                    );
                }
            }
            if action.risk_reduction > 0.0 && since == 0 {
                company.startup.risk_score = (company.startup.risk_score - action.risk_reduction).max(0.1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{GameSetup, RosterSource};
    use vc_core::{Difficulty, EngineConfig, InvestmentTerms, Startup};

    #[test]
    fn parses_ids() {
        for k in ValueAddKind::ALL {
            assert_eq!(k.id().parse::<ValueAddKind>(), Ok(k));
        }
        assert_eq!(
            "lobbying".parse::<ValueAddKind>(),
            Err(ValueAddError::UnknownAction("lobbying".into()))
        );
    }

    #[test]
    fn only_board_leadership_needs_a_seat() {
        for k in ValueAddKind::ALL {
            assert_eq!(k.profile().requires_board_seat, k == ValueAddKind::BoardLeadership);
        }
        assert_eq!(ValueAddKind::Technical.profile().duration, 4);
    }

    fn game() -> GameState {
        let roster = vec![
            Startup::new("Ledgerly", "FinTech", usd(1_000_000), 0.4, 0.7),
            Startup::new("Orbital", "SpaceTech", usd(2_000_000), 0.7, 0.8),
            Startup::new("Sprout", "AgTech", usd(800_000), 0.5, 0.5),
            Startup::new("Quanta", "SaaS", usd(1_000_000), 0.5, 0.6),
        ];
        let config = EngineConfig {
            ai_funds: vec![],
            ..EngineConfig::default()
        };
        GameState::new_game(
            GameSetup::new("Ada", Difficulty::Easy, RosterSource::Fixed(roster))
                .with_config(config)
                .with_seed(17)
                .without_scheduled_events(),
        )
    }

    #[test]
    fn eligibility_and_turn_limits_are_enforced() {
        let mut g = game();
        g.make_investment(0, usd(100_000)).unwrap();
        g.make_investment(2, usd(60_000)).unwrap();
        g.make_investment_with_terms(1, usd(10_000), InvestmentTerms::common()).unwrap();
        g.make_investment(3, usd(100_000)).unwrap();

        assert_eq!(
            g.provide_value_add(CompanyId(9), "sales"),
            Err(ValueAddError::NotInvested(CompanyId(9)))
        );
        assert!(matches!(
            g.provide_value_add(CompanyId(1), "sales"),
            Err(ValueAddError::InsufficientEquity { .. })
        ));
        assert_eq!(
            g.provide_value_add(CompanyId(2), "board_leadership"),
            Err(ValueAddError::RequiresBoardSeat)
        );

        g.provide_value_add(CompanyId(0), "recruiting").unwrap();
        assert_eq!(
            g.provide_value_add(CompanyId(0), "sales"),
            Err(ValueAddError::AlreadyHelpedThisTurn("Ledgerly".into()))
        );
        g.provide_value_add(CompanyId(2), "marketing").unwrap();
        assert_eq!(
            g.provide_value_add(CompanyId(3), "sales"),
            Err(ValueAddError::MaxActionsReached(2))
        );
        assert_eq!(g.value_add.actions_this_turn(), 2);
        assert_eq!(g.value_add.total_spent(), usd(35_000));

        g.value_add.new_turn();
        if let Some(c) = g.companies.get_mut(CompanyId(3)) {
            c.set_valuation(Decimal::ZERO);
        }
        assert_eq!(
            g.provide_value_add(CompanyId(3), "sales"),
            Err(ValueAddError::CompanyInactive("Quanta".into()))
        );
    }

    #[test]
    fn boost_is_spread_and_risk_cut_once() {
        let mut g = game();
        g.make_investment(0, usd(100_000)).unwrap();
        let receipt = g.provide_value_add(CompanyId(0), "technical").unwrap();
        assert!((0.03..=0.07).contains(&receipt.valuation_boost));
        let per_turn = receipt.valuation_boost / 4.0;

        for step in 0..4 {
            let before = g.companies.valuation_of(CompanyId(0));
            let mut report = TurnReport::new(g.portfolio.turn);
            g.apply_value_add_effects(&mut report);
            assert_eq!(g.companies.valuation_of(CompanyId(0)), scale(before, 1.0 + per_turn));
            let risk = g.companies.get(CompanyId(0)).map(|c| c.startup.risk_score);
            assert!((risk.unwrap_or_default() - 0.35).abs() < 1e-9, "step {step}");
            assert_eq!(report.of(LogCategory::ValueAdd).count(), usize::from(step == 0));
            g.portfolio.turn += 1;
        }

        let before = g.companies.valuation_of(CompanyId(0));
        g.apply_value_add_effects(&mut TurnReport::new(g.portfolio.turn));
        assert_eq!(g.companies.valuation_of(CompanyId(0)), before);
        assert!(g.value_add.active().is_empty());
    }
}
