//! Screening predicates for the twelve AI investing styles.

use vc_core::{Startup, StrategyKind};

const FINTECH: &[&str] = &["FinTech", "Financial", "InsurTech", "Crypto", "Blockchain"];
const HEALTH: &[&str] = &["HealthTech", "BioTech", "MedTech", "Healthcare"];
const CLIMATE: &[&str] = &["CleanTech", "GreenTech", "AgriTech", "Energy", "Climate"];
const DEEP_TECH: &[&str] = &["AI/ML", "AI", "Robotics", "Hardware", "IoT", "SpaceTech", "DeepTech"];
const SAAS: &[&str] = &["SaaS", "CloudTech", "Cybersecurity", "Security", "DevTools", "Enterprise"];
const CONSUMER: &[&str] = &["Gaming", "EdTech", "E-commerce", "Consumer", "Marketing", "Advertising", "Social"];

fn in_sector(s: &Startup, sectors: &[&str]) -> bool {
    sectors.iter().any(|c| c.eq_ignore_ascii_case(&s.category))
}

/// Whether a fund of this style would write a cheque into `s`.
///
/// Sector specialists still pass on the riskiest deals in their sector.
pub fn accepts(kind: StrategyKind, s: &Startup) -> bool {
    let (risk, growth) = (s.risk_score, s.growth_potential);
    match kind {
        StrategyKind::Conservative => risk <= 0.65 && growth >= 0.55,
        StrategyKind::Aggressive => growth >= 0.7 || (risk >= 0.7 && growth >= 0.6),
        StrategyKind::Balanced => growth >= 0.5 && risk <= 0.75,
        StrategyKind::Contrarian => risk >= 0.75 && growth >= 0.3,
        StrategyKind::Momentum => growth >= 0.75,
        StrategyKind::Value => s.valuation <= rust_decimal::Decimal::new(600_000, 0) && risk <= 0.8,
        StrategyKind::Fintech => in_sector(s, FINTECH) && risk <= 0.9,
        StrategyKind::Health => in_sector(s, HEALTH) && risk <= 0.9,
        StrategyKind::Climate => in_sector(s, CLIMATE) && risk <= 0.9,
        StrategyKind::DeepTech => in_sector(s, DEEP_TECH) && risk <= 0.9,
        StrategyKind::Saas => in_sector(s, SAAS) && risk <= 0.9,
        StrategyKind::Consumer => in_sector(s, CONSUMER) && risk <= 0.9,
    }
}

/// How far above or below the base secondary price this style bids.
pub fn secondary_bid_adjustment(kind: StrategyKind) -> f64 {
    match kind {
        StrategyKind::Aggressive | StrategyKind::Momentum => 0.05,
        StrategyKind::Conservative | StrategyKind::Value => -0.03,
        _ => 0.0,
    }
}

pub fn label(kind: StrategyKind) -> &'static str {
    match kind {
        StrategyKind::Conservative => "Conservative",
        StrategyKind::Aggressive => "Aggressive",
        StrategyKind::Balanced => "Balanced",
        StrategyKind::Contrarian => "Contrarian",
        StrategyKind::Momentum => "Momentum",
        StrategyKind::Value => "Value",
        StrategyKind::Fintech => "FinTech Specialist",
        StrategyKind::Health => "Healthcare Specialist",
        StrategyKind::Climate => "Climate Specialist",
        StrategyKind::DeepTech => "Deep Tech Specialist",
        StrategyKind::Saas => "SaaS Specialist",
        StrategyKind::Consumer => "Consumer Specialist",
    }
}
