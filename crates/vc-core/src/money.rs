//! Whole-dollar money helpers on top of `Decimal`.
//!
//! Every helper clamps instead of failing: a non-finite factor or a zero divisor yields zero, so
//! a turn never stalls on arithmetic.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

/// Whole dollars.
pub fn usd(amount: i64) -> Decimal {
    Decimal::new(amount, 0)
}

/// `amount * factor`, rounded to whole dollars. Non-finite factors yield zero.
pub fn scale(amount: Decimal, factor: f64) -> Decimal {
    if !factor.is_finite() {
        return Decimal::ZERO;
    }
    Decimal::from_f64(factor)
        .and_then(|f| amount.checked_mul(f))
        .map(|v| v.round_dp(0))
        .unwrap_or(Decimal::ZERO)
}

/// `num / den` as a float; zero when the divisor is not positive.
pub fn ratio(num: Decimal, den: Decimal) -> f64 {
    if den <= Decimal::ZERO {
        return 0.0;
    }
    num.checked_div(den)
        .and_then(|r| r.to_f64())
        .unwrap_or(0.0)
}

/// Percentage of `base` represented by `amount` (e.g. 50k of 1M is 5.0).
pub fn percent_of(amount: Decimal, base: Decimal) -> f64 {
    match amount.checked_mul(Decimal::ONE_HUNDRED) {
        Some(scaled) => ratio(scaled, base),
        None => 0.0,
    }
}

/// Dollar value of `pct` percent of `base`.
pub fn stake_value(pct: f64, base: Decimal) -> Decimal {
    scale(base, pct / 100.0)
}

pub fn floor_zero(amount: Decimal) -> Decimal {
    amount.max(Decimal::ZERO)
}

/// Lossy float view, for scoring and logs.
pub fn to_f64(amount: Decimal) -> f64 {
    amount.to_f64().unwrap_or(0.0)
}

/// Human-readable dollars: `$1.25M`, `$450k`, `$900`.
pub fn format_usd(amount: Decimal) -> String {
    let v = to_f64(amount);
    let sign = if v < 0.0 { "-" } else { "" };
    let a = v.abs();
    if a >= 1_000_000.0 {
        format!("{sign}${:.2}M", a / 1_000_000.0)
    } else if a >= 1_000.0 {
        format!("{sign}${:.0}k", a / 1_000.0)
    } else {
        format!("{sign}${a:.0}")
    }
}
