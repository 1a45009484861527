//! The only code path allowed to touch valuation and ownership while a round closes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;
use vc_core::money::ratio;
use vc_core::{CompanyState, FundingRound, HolderId};

/// Price of a round about to close.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundPricing {
    /// Display name, e.g. "Series A".
    pub name: String,
    /// Turn the round closes on.
    pub turn: u32,
    /// Pre-money valuation. Below the current valuation for down rounds.
    pub pre_money: Decimal,
    /// New capital.
    pub raise: Decimal,
    pub down_round: bool,
}

impl RoundPricing {
    pub fn post_money(&self) -> Decimal {
        self.pre_money + self.raise
    }
}

/// Result of one rescaling pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dilution {
    pub old_post_money: Decimal,
    pub new_post_money: Decimal,
    /// Multiplier applied to every rescaled holder.
    pub factor: f64,
}

/// Rescale every holder's equity by `old / new` post-money, skipping `excluded`, and move the
/// company to `new_post_money`.
///
/// A non-positive new post-money leaves the company untouched.
pub fn apply_dilution(
    company: &mut CompanyState,
    new_post_money: Decimal,
    excluded: &BTreeSet<HolderId>,
) -> Dilution {
    let old_post_money = company.valuation();
    if new_post_money <= Decimal::ZERO {
        return Dilution {
            old_post_money,
            new_post_money: old_post_money,
            factor: 1.0,
        };
    }
    let factor = ratio(old_post_money, new_post_money).min(1.0);
    company.cap_table.rescale(factor, excluded);
    company.set_valuation(new_post_money);
    debug!(company = company.name(), factor, "diluted cap table");
    Dilution {
        old_post_money,
        new_post_money,
        factor,
    }
}

/// Close a priced round: reprice to pre-money, dilute everyone not excluded, record the round.
pub fn close_round(
    company: &mut CompanyState,
    pricing: &RoundPricing,
    excluded: &BTreeSet<HolderId>,
) -> Dilution {
    company.set_valuation(pricing.pre_money);
    let dilution = apply_dilution(company, pricing.post_money(), excluded);
    company.cap_table.record_round(FundingRound {
        turn: pricing.turn,
        name: pricing.name.clone(),
        pre_money: pricing.pre_money,
        raise: pricing.raise,
        post_money: pricing.post_money(),
        down_round: pricing.down_round,
    });
    dilution
}
