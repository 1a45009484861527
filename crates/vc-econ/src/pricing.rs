//! Pricing of entries, follow-ons, exits and per-turn drift.

use rand::Rng;
use rust_decimal::Decimal;
use vc_core::money::{percent_of, scale};
use vc_core::{Financials, InvestmentTerms, TermsKind};

use crate::EconError;

/// Equity received for a first cheque.
///
/// `cap_pct` is the ceiling before bonuses; the seed-accelerator bonus lifts both the equity
/// and the ceiling by 25%, and a plain SAFE lifts both by its discount.
pub fn entry_equity(
    amount: Decimal,
    valuation: Decimal,
    terms: &InvestmentTerms,
    cap_pct: f64,
    seed_bonus: bool,
) -> Result<f64, EconError> {
    if valuation <= Decimal::ZERO {
        return Err(EconError::InvalidValuation);
    }
    let mut equity = percent_of(amount, valuation);
    let mut cap = cap_pct;
    if seed_bonus {
        equity *= 1.25;
        cap *= 1.25;
    }
    let discount = terms.upfront_discount();
    if discount > 0.0 {
        equity *= 1.0 + discount;
        cap *= 1.0 + discount;
    }
    let equity = equity.min(cap);
    if !equity.is_finite() {
        return Err(EconError::NonFinite);
    }
    Ok(equity)
}

/// Allowed follow-on cheque range for a round.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FollowOnBounds {
    pub min: Decimal,
    pub max: Decimal,
}

/// Min is the configured floor; max is the smallest of 20% of pre-money, available capital and
/// half the round.
pub fn follow_on_bounds(
    pre_money: Decimal,
    raise: Decimal,
    capacity: Decimal,
    min_cheque: Decimal,
) -> FollowOnBounds {
    let max = scale(pre_money, 0.20)
        .min(capacity)
        .min(scale(raise, 0.5))
        .max(Decimal::ZERO);
    FollowOnBounds {
        min: min_cheque,
        max,
    }
}

/// Equity after a follow-on into a round priced at `pre_money` raising `raise`.
///
/// All capital committed so far converts at the round's post-money; a capped SAFE converts at
/// `cap + raise` when the cap is below pre-money. SAFE discounts enlarge the effective amount.
pub fn follow_on_equity(
    total_invested: Decimal,
    terms: &InvestmentTerms,
    pre_money: Decimal,
    raise: Decimal,
) -> f64 {
    let effective = if terms.conversion_discount > 0.0 {
        scale(total_invested, 1.0 + terms.conversion_discount)
    } else {
        total_invested
    };
    let conversion = match (terms.kind, terms.valuation_cap) {
        (TermsKind::SafeCapped, Some(cap)) if pre_money > cap => cap + raise,
        _ => pre_money + raise,
    };
    percent_of(effective, conversion).clamp(0.0, 100.0)
}

/// Acquisition price for a company.
///
/// Annualized EBITDA times the multiple; unprofitable firms are priced on annual revenue at
/// 30% of the multiple. The offer never falls below half the current valuation.
pub fn acquisition_offer(financials: &Financials, valuation: Decimal, multiple: f64) -> Decimal {
    let annual_ebitda = financials.net_income() * Decimal::from(12);
    let offer = if annual_ebitda > Decimal::ZERO {
        scale(annual_ebitda, multiple)
    } else {
        scale(financials.monthly_revenue * Decimal::from(12), multiple * 0.3)
    };
    offer.max(scale(valuation, 0.5))
}

/// Fraction of mark-to-market a secondary buyer offers, in [0.70, 0.90].
///
/// Strong performers (>2× entry) draw 85%, gainers 80%, everything else the 70% floor.
pub fn secondary_offer_fraction(current_value: Decimal, initial_value: Decimal, buyer_adjustment: f64) -> f64 {
    let base = if initial_value <= Decimal::ZERO {
        0.70
    } else if current_value > initial_value * Decimal::TWO {
        0.85
    } else if current_value > initial_value {
        0.80
    } else {
        0.70
    };
    (base + buyer_adjustment).clamp(0.70, 0.90)
}

/// One month of random walk: a multiplier in [1-volatility, 1+volatility].
pub fn random_walk_factor<R: Rng>(rng: &mut R, volatility: f64) -> f64 {
    if !(volatility > 0.0 && volatility.is_finite()) {
        return 1.0;
    }
    1.0 + rng.gen_range(-volatility..=volatility)
}

/// Advance one month of operating financials.
///
/// Revenue grows at the company's rate ±20%; costs grow at 60% of the realised rate. The rate
/// itself drifts up for profitable firms and down otherwise, staying in [-0.15, 0.30].
pub fn advance_financials<R: Rng>(rng: &mut R, fin: &mut Financials) {
    let variance: f64 = rng.gen_range(-0.2..=0.2);
    let growth = fin.revenue_growth_rate * (1.0 + variance);
    fin.grow(growth, growth * 0.6);
    let drift = if fin.is_profitable() { 1.02 } else { 0.98 };
    fin.revenue_growth_rate = (fin.revenue_growth_rate * drift).clamp(-0.15, 0.30);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use vc_core::money::usd;
    use vc_core::UpgradeSet;

    fn safe(discount: f64) -> InvestmentTerms {
        InvestmentTerms {
            kind: TermsKind::Safe,
            conversion_discount: discount,
            ..InvestmentTerms::common()
        }
    }

    #[test]
    fn common_entry_is_proportional() {
        let e = entry_equity(usd(50_000), usd(1_000_000), &InvestmentTerms::common(), 20.0, false).unwrap();
        assert_eq!(e, 5.0);
    }

    #[test]
    fn safe_discount_and_seed_bonus_stack_under_cap() {
        let e = entry_equity(usd(100_000), usd(1_000_000), &safe(0.2), 20.0, true).unwrap();
        assert!((e - 15.0).abs() < 1e-9);
        let capped = entry_equity(usd(200_000), usd(1_000_000), &safe(0.2), 20.0, true).unwrap();
        assert!((capped - 30.0).abs() < 1e-9);
    }

    #[test]
    fn entry_rejects_zero_valuation() {
        assert_eq!(
            entry_equity(usd(1), Decimal::ZERO, &InvestmentTerms::common(), 20.0, false),
            Err(EconError::InvalidValuation)
        );
    }

    #[test]
    fn follow_on_bounds_take_the_tightest_limit() {
        let b = follow_on_bounds(usd(2_000_000), usd(3_000_000), usd(1_000_000), usd(10_000));
        assert_eq!(b.max, usd(400_000));
        let b = follow_on_bounds(usd(2_000_000), usd(300_000), usd(1_000_000), usd(10_000));
        assert_eq!(b.max, usd(150_000));
        let b = follow_on_bounds(usd(2_000_000), usd(3_000_000), usd(50_000), usd(10_000));
        assert_eq!(b.max, usd(50_000));
    }

    #[test]
    fn follow_on_converts_at_post_money_or_cap() {
        let common = InvestmentTerms::common();
        let e = follow_on_equity(usd(200_000), &common, usd(1_000_000), usd(1_000_000));
        assert!((e - 10.0).abs() < 1e-9);
        let capped = vc_core::term_sheet_options(usd(50_000), usd(1_000_000), usd(100_000), &UpgradeSet::default())
            .remove(2);
        // cap 650k < pre 2M: converts at 650k + 1M
        let e = follow_on_equity(usd(165_000), &capped, usd(2_000_000), usd(1_000_000));
        assert!((e - 10.0).abs() < 1e-9);
    }

    #[test]
    fn acquisition_falls_back_to_revenue_and_floor() {
        let profitable = Financials {
            monthly_revenue: usd(100_000),
            monthly_costs: usd(50_000),
            revenue_growth_rate: 0.05,
        };
        assert_eq!(acquisition_offer(&profitable, usd(1_000_000), 4.0), usd(2_400_000));
        let burning = Financials {
            monthly_revenue: usd(100_000),
            monthly_costs: usd(200_000),
            revenue_growth_rate: 0.05,
        };
        assert_eq!(acquisition_offer(&burning, usd(1_000_000), 5.0), usd(1_800_000));
        assert_eq!(acquisition_offer(&Financials::default(), usd(1_000_000), 5.0), usd(500_000));
    }

    #[test]
    fn secondary_fraction_tracks_performance() {
        assert_eq!(secondary_offer_fraction(usd(300), usd(100), 0.0), 0.85);
        assert_eq!(secondary_offer_fraction(usd(150), usd(100), 0.0), 0.80);
        assert_eq!(secondary_offer_fraction(usd(50), usd(100), -0.03), 0.70);
        assert_eq!(secondary_offer_fraction(usd(300), usd(100), 0.05), 0.90);
    }

    #[test]
    fn random_walk_is_seeded_and_bounded() {
        let mut a = ChaCha8Rng::seed_from_u64(7);
        let mut b = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..100 {
            let fa = random_walk_factor(&mut a, 0.05);
            assert_eq!(fa, random_walk_factor(&mut b, 0.05));
            assert!((0.95..=1.05).contains(&fa));
        }
    }

    #[test]
    fn financial_growth_rate_stays_bounded() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut fin = Financials {
            monthly_revenue: usd(10_000),
            monthly_costs: usd(50_000),
            revenue_growth_rate: 0.29,
        };
        for _ in 0..240 {
            advance_financials(&mut rng, &mut fin);
            assert!((-0.15..=0.30).contains(&fin.revenue_growth_rate));
            assert!(fin.monthly_revenue >= Decimal::ZERO);
        }
    }
}
