use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::ids::HolderId;

/// Tolerance for float accumulation when checking the 100% ceiling.
pub const OWNERSHIP_EPSILON: f64 = 1e-6;

/// Errors raised by ownership ledger updates.
#[derive(Debug, Error, PartialEq)]
pub enum CapTableError {
    /// Percent outside [0,100] or not finite.
    #[error("invalid equity percent: {0}")]
    InvalidPercent(f64),
    /// Adding the stake would push tracked ownership above 100%.
    #[error("cap table oversubscribed: requested {requested:.2}% but only {available:.2}% remains")]
    Oversubscribed { requested: f64, available: f64 },
}

/// A priced round recorded against a company.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FundingRound {
    /// Turn the round closed on.
    pub turn: u32,
    /// Display name, e.g. "Series A" or "Series B (Down)".
    pub name: String,
    /// Pre-money valuation.
    pub pre_money: Decimal,
    /// New capital raised.
    pub raise: Decimal,
    /// Post-money valuation (pre + raise).
    pub post_money: Decimal,
    /// Whether the round was priced below the prior valuation.
    pub down_round: bool,
}

/// Ownership ledger for one company: tracked holders and closed rounds.
///
/// Only the player and AI funds are tracked; founders and outside investors make up the
/// unallocated remainder.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CapTable {
    ownership: BTreeMap<HolderId, f64>,
    rounds: Vec<FundingRound>,
}

impl CapTable {
    pub fn equity_of(&self, holder: HolderId) -> f64 {
        self.ownership.get(&holder).copied().unwrap_or(0.0)
    }

    pub fn holds(&self, holder: HolderId) -> bool {
        self.ownership.contains_key(&holder)
    }

    pub fn holders(&self) -> impl Iterator<Item = (HolderId, f64)> + '_ {
        self.ownership.iter().map(|(h, p)| (*h, *p))
    }

    pub fn total_allocated(&self) -> f64 {
        self.ownership.values().sum()
    }

    pub fn rounds(&self) -> &[FundingRound] {
        &self.rounds
    }

    /// Give `holder` a new stake of `pct` percent.
    pub fn add_stake(&mut self, holder: HolderId, pct: f64) -> Result<(), CapTableError> {
        let current = self.equity_of(holder);
        self.set_equity(holder, current + pct)
    }

    /// Overwrite `holder`'s stake, keeping the ledger at or below 100%.
    pub fn set_equity(&mut self, holder: HolderId, pct: f64) -> Result<(), CapTableError> {
        if !pct.is_finite() || !(0.0..=100.0 + OWNERSHIP_EPSILON).contains(&pct) {
            return Err(CapTableError::InvalidPercent(pct));
        }
        let others = self.total_allocated() - self.equity_of(holder);
        let available = (100.0 - others).max(0.0);
        if pct > available + OWNERSHIP_EPSILON {
            return Err(CapTableError::Oversubscribed {
                requested: pct,
                available,
            });
        }
        self.ownership.insert(holder, pct.min(available));
        Ok(())
    }

    pub fn remove_holder(&mut self, holder: HolderId) -> Option<f64> {
        self.ownership.remove(&holder)
    }

    /// Multiply every holder's stake by `factor`, skipping `excluded`.
    ///
    /// Factors are clamped to [0,1]: issuing new equity can only shrink existing stakes.
    pub fn rescale(&mut self, factor: f64, excluded: &BTreeSet<HolderId>) {
        let factor = if factor.is_finite() {
            factor.clamp(0.0, 1.0)
        } else {
            0.0
        };
        for (holder, pct) in self.ownership.iter_mut() {
            if !excluded.contains(holder) {
                *pct *= factor;
            }
        }
    }

    pub fn record_round(&mut self, round: FundingRound) {
        self.rounds.push(round);
    }

    pub fn clear(&mut self) {
        self.ownership.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rejects_oversubscription() {
        let mut t = CapTable::default();
        t.add_stake(HolderId::Player, 60.0).unwrap();
        let err = t.add_stake(HolderId::Fund(0), 50.0).unwrap_err();
        assert!(matches!(err, CapTableError::Oversubscribed { .. }));
        t.add_stake(HolderId::Fund(0), 40.0).unwrap();
        assert!((t.total_allocated() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn rescale_skips_excluded_holders() {
        let mut t = CapTable::default();
        t.add_stake(HolderId::Player, 10.0).unwrap();
        t.add_stake(HolderId::Fund(1), 20.0).unwrap();
        let excluded = BTreeSet::from([HolderId::Fund(1)]);
        t.rescale(0.5, &excluded);
        assert_eq!(t.equity_of(HolderId::Player), 5.0);
        assert_eq!(t.equity_of(HolderId::Fund(1)), 20.0);
    }

    proptest! {
        #[test]
        fn ownership_never_exceeds_hundred(stakes in proptest::collection::vec((0u8..4, 0.0f64..60.0), 1..20)) {
            let mut t = CapTable::default();
            for (h, pct) in stakes {
                let _ = t.add_stake(HolderId::Fund(h), pct);
                prop_assert!(t.total_allocated() <= 100.0 + OWNERSHIP_EPSILON);
            }
        }
    }
}
