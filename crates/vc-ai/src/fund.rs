use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use vc_core::money::scale;
use vc_core::{AiFundConfig, CompanyId, CompanyTable, HolderId, Portfolio};

use crate::strategy;

/// A competing fund: a portfolio driven by heuristics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AiFund {
    pub config: AiFundConfig,
    pub portfolio: Portfolio,
}

impl AiFund {
    pub fn new(index: u8, config: AiFundConfig, fund_size: Decimal, reserve: Decimal, max_turns: u32) -> Self {
        Self {
            config,
            portfolio: Portfolio::new(HolderId::Fund(index), fund_size, reserve, max_turns),
        }
    }

    pub fn holder(&self) -> HolderId {
        self.portfolio.holder
    }
}

/// A cheque an AI fund intends to write on turn 1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Allocation {
    pub company: CompanyId,
    pub amount: Decimal,
}

/// Pick 3–6 companies the fund's strategy accepts, within its risk ceiling, and size each cheque as
/// `available / remaining_slots`, capped at `max_stake` of valuation. Cheques at or below
/// `min_cheque` are skipped.
pub fn plan_initial_allocations<R: Rng>(
    rng: &mut R,
    fund: &AiFund,
    companies: &CompanyTable,
    min_cheque: Decimal,
    max_stake: f64,
) -> Vec<Allocation> {
    let target: usize = rng.gen_range(3..=6);
    let mut candidates: Vec<CompanyId> = companies.ids().collect();
    candidates.shuffle(rng);

    let mut available = fund.portfolio.cash;
    let mut plan = Vec::with_capacity(target);
    for id in candidates {
        if plan.len() >= target {
            break;
        }
        let Some(company) = companies.get(id) else {
            continue;
        };
        if !company.is_active()
            || company.startup.risk_score > fund.config.risk_ceiling()
            || !strategy::accepts(fund.config.strategy, &company.startup)
        {
            continue;
        }
        let remaining = Decimal::from((target - plan.len()) as u64);
        let amount = (available / remaining)
            .min(scale(company.valuation(), max_stake))
            .floor();
        if amount <= min_cheque {
            continue;
        }
        available -= amount;
        plan.push(Allocation { company: id, amount });
    }
    debug!(fund = %fund.config.firm, picks = plan.len(), target, "planned initial allocations");
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use vc_core::money::usd;
    use vc_core::{Startup, StrategyKind};

    fn table() -> CompanyTable {
        let roster = (0..12)
            .map(|i| Startup::new(format!("Co{i}"), "SaaS", usd(1_000_000), 0.5, 0.8))
            .collect();
        CompanyTable::from_roster(roster)
    }

    fn fund(strategy: StrategyKind) -> AiFund {
        fund_with_tolerance(strategy, 0.5)
    }

    fn fund_with_tolerance(strategy: StrategyKind, risk_tolerance: f64) -> AiFund {
        let cfg = AiFundConfig {
            name: "Test".into(),
            firm: "Test Capital".into(),
            strategy,
            risk_tolerance,
        };
        AiFund::new(0, cfg, usd(500_000), usd(100_000), 60)
    }

    #[test]
    fn allocations_respect_caps_and_budget() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let f = fund(StrategyKind::Aggressive);
        let plan = plan_initial_allocations(&mut rng, &f, &table(), usd(10_000), 0.20);
        assert!((3..=6).contains(&plan.len()));
        let total: Decimal = plan.iter().map(|a| a.amount).sum();
        assert!(total <= usd(500_000));
        assert!(plan.iter().all(|a| a.amount <= usd(200_000) && a.amount > usd(10_000)));
    }

    #[test]
    fn risk_tolerance_caps_deal_risk() {
        let risky = CompanyTable::from_roster(
            (0..8)
                .map(|i| Startup::new(format!("Risky{i}"), "SaaS", usd(1_000_000), 0.85, 0.8))
                .collect(),
        );
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let timid = fund_with_tolerance(StrategyKind::Aggressive, 0.2);
        assert!(plan_initial_allocations(&mut rng, &timid, &risky, usd(10_000), 0.20).is_empty());

        let bold = fund_with_tolerance(StrategyKind::Aggressive, 0.8);
        assert!(!plan_initial_allocations(&mut rng, &bold, &risky, usd(10_000), 0.20).is_empty());
    }

    #[test]
    fn nothing_matches_nothing_planned() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let f = fund(StrategyKind::Health);
        assert!(plan_initial_allocations(&mut rng, &f, &table(), usd(10_000), 0.20).is_empty());
    }
}
