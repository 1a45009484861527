//! Term sheets and the menu of variants offered for a given cheque.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::{scale, usd};
use crate::upgrades::{Upgrade, UpgradeSet};

/// Instrument family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TermsKind {
    Preferred,
    Safe,
    SafeCapped,
    Common,
    PreferredTwoX,
}

impl fmt::Display for TermsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TermsKind::Preferred => "Preferred Stock",
            TermsKind::Safe => "SAFE",
            TermsKind::SafeCapped => "SAFE (Capped)",
            TermsKind::Common => "Common Stock",
            TermsKind::PreferredTwoX => "Preferred 2x Liquidation",
        };
        f.write_str(s)
    }
}

/// Rights attached to one investment. Fixed once the investment is made.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InvestmentTerms {
    /// Instrument family.
    pub kind: TermsKind,
    /// Right to invest in later rounds.
    pub pro_rata: bool,
    /// Access to monthly financials.
    pub info_rights: bool,
    /// Seat on the board.
    pub board_seat: bool,
    /// Weight of this holder's board vote.
    pub vote_multiplier: u32,
    /// Liquidation preference as a multiple of invested capital.
    pub liquidation_preference: f64,
    /// Anti-dilution protection.
    pub anti_dilution: bool,
    /// Conversion discount for SAFEs, as a fraction.
    pub conversion_discount: f64,
    /// Valuation cap for capped SAFEs.
    pub valuation_cap: Option<Decimal>,
}

impl InvestmentTerms {
    /// Plain common stock: no rights.
    pub fn common() -> Self {
        Self {
            kind: TermsKind::Common,
            pro_rata: false,
            info_rights: false,
            board_seat: false,
            vote_multiplier: 1,
            liquidation_preference: 0.0,
            anti_dilution: false,
            conversion_discount: 0.0,
            valuation_cap: None,
        }
    }

    /// Standard preferred stock; a board seat comes with cheques at or above `board_threshold`.
    pub fn preferred(amount: Decimal, board_threshold: Decimal, upgrades: &UpgradeSet) -> Self {
        Self {
            kind: TermsKind::Preferred,
            pro_rata: true,
            info_rights: true,
            board_seat: amount >= board_threshold,
            vote_multiplier: if upgrades.has(Upgrade::DoubleBoardSeat) { 2 } else { 1 },
            liquidation_preference: 1.0,
            anti_dilution: true,
            ..Self::common()
        }
    }

    /// Effective board vote weight; never below one.
    pub fn vote_weight(&self) -> u32 {
        self.vote_multiplier.max(1)
    }

    /// Discount applied to equity at investment time (plain SAFEs only).
    pub fn upfront_discount(&self) -> f64 {
        match self.kind {
            TermsKind::Safe => self.conversion_discount,
            _ => 0.0,
        }
    }
}

/// Term-sheet variants available for a cheque of `amount` into a company at `valuation`.
pub fn term_sheet_options(
    amount: Decimal,
    valuation: Decimal,
    board_threshold: Decimal,
    upgrades: &UpgradeSet,
) -> Vec<InvestmentTerms> {
    let discount = if upgrades.has(Upgrade::EnhancedSafeDiscount) {
        0.25
    } else {
        0.20
    };
    let preferred = InvestmentTerms::preferred(amount, board_threshold, upgrades);
    let safe = InvestmentTerms {
        kind: TermsKind::Safe,
        pro_rata: true,
        conversion_discount: discount,
        ..InvestmentTerms::common()
    };
    let capped = InvestmentTerms {
        kind: TermsKind::SafeCapped,
        pro_rata: true,
        valuation_cap: Some(scale(valuation, 0.65).max(usd(500_000))),
        ..InvestmentTerms::common()
    };
    let mut options = vec![preferred.clone(), safe, capped, InvestmentTerms::common()];
    if upgrades.has(Upgrade::LiquidationPreference2x) {
        options.push(InvestmentTerms {
            kind: TermsKind::PreferredTwoX,
            liquidation_preference: 2.0,
            ..preferred
        });
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_seat_requires_threshold() {
        let none = UpgradeSet::default();
        let small = InvestmentTerms::preferred(usd(99_999), usd(100_000), &none);
        let big = InvestmentTerms::preferred(usd(100_000), usd(100_000), &none);
        assert!(!small.board_seat);
        assert!(big.board_seat);
        assert_eq!(big.vote_weight(), 1);
    }

    #[test]
    fn upgrades_unlock_variants() {
        let ups: UpgradeSet = [
            Upgrade::LiquidationPreference2x,
            Upgrade::EnhancedSafeDiscount,
            Upgrade::DoubleBoardSeat,
        ]
        .into_iter()
        .collect();
        let opts = term_sheet_options(usd(150_000), usd(1_000_000), usd(100_000), &ups);
        assert_eq!(opts.len(), 5);
        assert_eq!(opts[0].vote_weight(), 2);
        assert_eq!(opts[1].conversion_discount, 0.25);
        assert_eq!(opts[2].valuation_cap, Some(usd(650_000)));
        assert_eq!(opts[4].kind, TermsKind::PreferredTwoX);
        assert_eq!(opts[4].liquidation_preference, 2.0);
    }

    #[test]
    fn safe_cap_has_floor() {
        let opts = term_sheet_options(usd(20_000), usd(300_000), usd(100_000), &UpgradeSet::default());
        assert_eq!(opts.len(), 4);
        assert_eq!(opts[2].valuation_cap, Some(usd(500_000)));
    }
}
