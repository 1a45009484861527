//! Risk and growth scores derived from raw catalog metrics.

use rust_decimal::Decimal;
use vc_core::StartupMetrics;

/// Risk in [0.5, 1]: heavy burn and thin sales push it up. Lean burn or strong sales offset
/// the other factor but never take the score below the medium floor.
pub fn risk_score(m: &StartupMetrics) -> f64 {
    let mut risk: f64 = 0.5;
    risk += match m.gross_burn_k {
        b if b > 40 => 0.4,
        b if b > 20 => 0.3,
        b if b > 10 => 0.2,
        b if b <= 3 => -0.1,
        _ => 0.0,
    };
    risk += match m.monthly_sales {
        s if s < 5 => 0.4,
        s if s < 20 => 0.3,
        s if s < 50 => 0.2,
        s if s > 300 => -0.1,
        _ => 0.0,
    };
    risk.clamp(0.5, 1.0)
}

/// Growth potential in [0, 1] from margin, valuation and activation.
pub fn growth_potential(m: &StartupMetrics, valuation: Decimal) -> f64 {
    let mut growth: f64 = 0.5;
    growth += match m.margin_percent {
        p if p > 80 => 0.3,
        p if p > 60 => 0.25,
        p if p > 40 => 0.2,
        p if p > 25 => 0.1,
        _ => 0.0,
    };
    let millions = valuation / Decimal::from(1_000_000);
    growth += if millions > Decimal::from(100) {
        0.2
    } else if millions > Decimal::from(50) {
        0.15
    } else if millions > Decimal::from(30) {
        0.1
    } else {
        0.0
    };
    growth += match m.monthly_activation_rate {
        a if a > 150 => 0.15,
        a if a > 100 => 0.1,
        _ => 0.0,
    };
    growth.clamp(0.0, 1.0)
}
