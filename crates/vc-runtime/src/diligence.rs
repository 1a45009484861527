//! Pre-investment due diligence.

use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use vc_core::{CompanyId, DiligenceLevel, Startup};

use crate::error::DiligenceError;
use crate::state::GameState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FindingKind {
    RedFlag,
    GreenFlag,
    Neutral,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FindingArea {
    Founder,
    Financial,
    Tech,
    Legal,
    Market,
    Summary,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub area: FindingArea,
    pub description: String,
    /// Change to growth potential.
    pub growth_impact: f64,
    /// Change to risk score.
    pub risk_impact: f64,
}

impl Finding {
    fn new(kind: FindingKind, area: FindingArea, description: impl Into<String>, growth_impact: f64, risk_impact: f64) -> Self {
        Self {
            kind,
            area,
            description: description.into(),
            growth_impact,
            risk_impact,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiligenceReport {
    pub company: CompanyId,
    pub level: DiligenceLevel,
    pub cost: Decimal,
    pub findings: Vec<Finding>,
}

impl DiligenceReport {
    pub fn red_flags(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.kind == FindingKind::RedFlag && f.area != FindingArea::Summary)
            .count()
    }

    /// Three or more red flags with at least one serious risk increase.
    pub fn recommends_passing(&self) -> bool {
        self.red_flags() >= 3
            && self
                .findings
                .iter()
                .any(|f| f.kind == FindingKind::RedFlag && f.risk_impact >= 0.07)
    }
}

/// One check: `(red below, green above)` thresholds on a uniform roll. A missing neutral
/// finding means nothing is reported in the middle band.
struct Check {
    area: FindingArea,
    red: (f64, &'static str, f64, f64),
    green: (f64, &'static str, f64, f64),
    neutral: Option<&'static str>,
}

const STANDARD_CHECKS: &[Check] = &[
    Check {
        area: FindingArea::Founder,
        red: (0.15, "Previous startup failure not disclosed; co-founder conflict rumors", -0.10, 0.05),
        green: (0.85, "Founder has a successful exit and strong industry reputation", 0.08, -0.03),
        neutral: Some("Founder has a solid background with relevant industry experience"),
    },
    Check {
        area: FindingArea::Financial,
        red: (0.20, "Burn rate higher than disclosed; runway concerns", -0.08, 0.04),
        green: (0.75, "Unit economics better than expected; clear path to profitability", 0.10, -0.02),
        neutral: None,
    },
];

const DEEP_CHECKS: &[Check] = &[
    Check {
        area: FindingArea::Tech,
        red: (0.18, "Significant technical debt; scalability concerns", -0.12, 0.06),
        green: (0.80, "Strong technical architecture; defensible IP", 0.12, -0.05),
        neutral: Some("Technology stack is solid with normal technical debt"),
    },
    Check {
        area: FindingArea::Legal,
        red: (0.12, "Pending litigation; IP ownership disputes", -0.15, 0.08),
        green: (0.88, "Clean cap table; all IP properly assigned", 0.05, -0.02),
        neutral: None,
    },
    Check {
        area: FindingArea::Market,
        red: (0.15, "Strong competitor just raised a large round", -0.10, 0.05),
        green: (0.82, "Excellent market timing; strong product-market fit signals", 0.10, -0.04),
        neutral: None,
    },
];

fn run_check<R: Rng>(rng: &mut R, check: &Check) -> Option<Finding> {
    let roll: f64 = rng.gen();
    let (red_at, red_desc, red_growth, red_risk) = check.red;
    let (green_at, green_desc, green_growth, green_risk) = check.green;
    if roll < red_at {
        Some(Finding::new(FindingKind::RedFlag, check.area, red_desc, red_growth, red_risk))
    } else if roll > green_at {
        Some(Finding::new(FindingKind::GreenFlag, check.area, green_desc, green_growth, green_risk))
    } else {
        check
            .neutral
            .map(|d| Finding::new(FindingKind::Neutral, check.area, d, 0.0, 0.0))
    }
}

/// Roll findings for `startup` at `level`, closing with an overall assessment.
pub fn investigate<R: Rng>(rng: &mut R, startup: &Startup, level: DiligenceLevel) -> Vec<Finding> {
    let mut findings = Vec::new();
    if level == DiligenceLevel::Quick {
        findings.push(Finding::new(
            FindingKind::Neutral,
            FindingArea::Financial,
            format!(
                "Risk score {:.1}/1.0, growth potential {:.1}/1.0",
                startup.risk_score, startup.growth_potential
            ),
            0.0,
            0.0,
        ));
    }
    if level >= DiligenceLevel::Standard {
        findings.extend(STANDARD_CHECKS.iter().filter_map(|c| run_check(rng, c)));
    }
    if level == DiligenceLevel::Deep {
        findings.extend(DEEP_CHECKS.iter().filter_map(|c| run_check(rng, c)));
    }

    let red = findings.iter().filter(|f| f.kind == FindingKind::RedFlag).count();
    let green = findings.iter().filter(|f| f.kind == FindingKind::GreenFlag).count();
    let (kind, description) = if red > green + 1 {
        (FindingKind::RedFlag, "Overall: significant concerns, elevated risk")
    } else if green > red + 1 {
        (FindingKind::GreenFlag, "Overall: strong opportunity, better than expected")
    } else {
        (FindingKind::Neutral, "Overall: mixed signals, normal startup risk profile")
    };
    findings.push(Finding::new(kind, FindingArea::Summary, description, 0.0, 0.0));
    findings
}

/// Fold findings into the startup's scores; risk stays in [0.1, 0.9], growth in [0.1, 1.0].
///
/// A finding's outlook shift lands on growth potential; the listed valuation is left alone.
pub fn apply_findings(startup: &mut Startup, findings: &[Finding]) {
    for f in findings {
        startup.risk_score = (startup.risk_score + f.risk_impact).clamp(0.1, 0.9);
        startup.growth_potential = (startup.growth_potential + f.growth_impact).clamp(0.1, 1.0);
    }
}

impl GameState {
    /// Pay for diligence on the startup at roster `index`. Once per company per game.
    pub fn perform_due_diligence(&mut self, index: usize, level: DiligenceLevel) -> Result<DiligenceReport, DiligenceError> {
        if index >= self.companies.len() {
            return Err(DiligenceError::InvalidIndex(index));
        }
        let id = CompanyId(index as u32);
        let cost = level.cost();
        let cash = self.portfolio.cash;
        let company = self
            .companies
            .get_mut(id)
            .ok_or(DiligenceError::InvalidIndex(index))?;
        if company.diligence.is_some() {
            return Err(DiligenceError::AlreadyPerformed(company.name().to_string()));
        }
        if cash < cost {
            return Err(DiligenceError::InsufficientFunds {
                available: cash,
                requested: cost,
            });
        }
        let findings = investigate(&mut self.rng, &company.startup, level);
        apply_findings(&mut company.startup, &findings);
        company.diligence = Some(level);
        self.portfolio.cash -= cost;
        let report = DiligenceReport {
            company: id,
            level,
            cost,
            findings,
        };
        info!(company = %company.name(), ?level, red_flags = report.red_flags(), "due diligence performed");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use vc_core::money::usd;

    fn startup() -> Startup {
        Startup::new("Ledgerly", "FinTech", usd(1_000_000), 0.5, 0.5)
    }

    #[test]
    fn quick_reports_scores_and_summary() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let f = investigate(&mut rng, &startup(), DiligenceLevel::Quick);
        assert_eq!(f.len(), 2);
        assert_eq!(f[1].area, FindingArea::Summary);
    }

    #[test]
    fn legal_red_flag_shifts_scores_not_valuation() {
        let mut s = startup();
        let f = Finding::new(FindingKind::RedFlag, FindingArea::Legal, "Pending litigation", -0.15, 0.08);
        apply_findings(&mut s, &[f]);
        assert!((s.risk_score - 0.58).abs() < 1e-9);
        assert!((s.growth_potential - 0.35).abs() < 1e-9);
        assert_eq!(s.valuation, usd(1_000_000));
    }

    proptest! {
        #[test]
        fn findings_keep_scores_in_bounds(seed in 0u64..500) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut s = startup();
            let f = investigate(&mut rng, &s, DiligenceLevel::Deep);
            prop_assert!(f.len() >= 3);
            apply_findings(&mut s, &f);
            prop_assert!((0.1..=0.9).contains(&s.risk_score));
            prop_assert!((0.1..=1.0).contains(&s.growth_potential));
            prop_assert_eq!(s.valuation, usd(1_000_000));
        }
    }
}
