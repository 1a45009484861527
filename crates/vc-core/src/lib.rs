#![deny(warnings)]

//! Core domain models and invariants for the venture portfolio simulation.
//!
//! This crate defines the serializable types shared by every layer of the engine: companies
//! and their cap tables, positions and portfolios, term sheets, scheduled events, upgrades and
//! cross-game reputation. Companies live in an arena ([`CompanyTable`]) addressed by
//! [`CompanyId`]; portfolios only ever hold ids.

pub mod cap_table;
pub mod company;
pub mod config;
pub mod difficulty;
pub mod events;
pub mod ids;
pub mod investment;
pub mod money;
pub mod reputation;
pub mod startup;
pub mod terms;
pub mod upgrades;

pub use cap_table::{CapTable, CapTableError, FundingRound, OWNERSHIP_EPSILON};
pub use company::{CompanyState, CompanyStatus, CompanyTable, DiligenceLevel};
pub use config::{AiFundConfig, EngineConfig, StrategyKind};
pub use difficulty::{Difficulty, DifficultyProfile};
pub use events::{
    AcquisitionEvent, CrisisEvent, CrisisKind, DueDiligence, FundingRoundEvent, RoundKey,
    RoundStage, ScheduledEvent, Severity,
};
pub use ids::{CompanyId, HolderId};
pub use investment::{ExitKind, ExitRecord, Investment, Portfolio};
pub use reputation::{ReputationLevel, ReputationTier, ScoreRecord, VCReputation};
pub use startup::{Financials, Startup, StartupMetrics};
pub use terms::{term_sheet_options, InvestmentTerms, TermsKind};
pub use upgrades::{Upgrade, UpgradeSet};

use rust_decimal::Decimal;
use std::collections::BTreeSet;
use thiserror::Error;

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Score outside [0,1].
    #[error("score out of range for {0}")]
    ScoreRange(String),
    /// Negative valuation.
    #[error("negative valuation for {0}")]
    NegativeValuation(String),
    /// Two roster entries share a name.
    #[error("duplicate startup name: {0}")]
    DuplicateName(String),
    /// Tracked ownership above 100%.
    #[error("ownership over 100% in {0}")]
    Oversubscribed(String),
    /// A portfolio holds two positions in one company.
    #[error("duplicate position in {0}")]
    DuplicatePosition(CompanyId),
    /// A position points at a company outside the table.
    #[error("unknown company {0}")]
    UnknownCompany(CompanyId),
    /// Negative cash or reserve.
    #[error("negative balance")]
    NegativeBalance,
}

fn in_unit(x: f64) -> bool {
    x.is_finite() && (0.0..=1.0).contains(&x)
}

/// Validate a single startup profile.
pub fn validate_startup(s: &Startup) -> Result<(), ValidationError> {
    if !in_unit(s.risk_score) || !in_unit(s.growth_potential) {
        return Err(ValidationError::ScoreRange(s.name.clone()));
    }
    if s.valuation < Decimal::ZERO {
        return Err(ValidationError::NegativeValuation(s.name.clone()));
    }
    Ok(())
}

/// Validate a roster: each startup valid and names unique.
pub fn validate_roster(roster: &[Startup]) -> Result<(), ValidationError> {
    let mut names = BTreeSet::new();
    for s in roster {
        validate_startup(s)?;
        if !names.insert(s.name.as_str()) {
            return Err(ValidationError::DuplicateName(s.name.clone()));
        }
    }
    Ok(())
}

/// Validate that every company's tracked ownership stays within 100%.
pub fn validate_companies(companies: &CompanyTable) -> Result<(), ValidationError> {
    for c in companies.iter() {
        if c.cap_table.total_allocated() > 100.0 + OWNERSHIP_EPSILON {
            return Err(ValidationError::Oversubscribed(c.name().to_string()));
        }
        if c.valuation() < Decimal::ZERO {
            return Err(ValidationError::NegativeValuation(c.name().to_string()));
        }
    }
    Ok(())
}

/// Validate a portfolio against the company table.
pub fn validate_portfolio(p: &Portfolio, companies: &CompanyTable) -> Result<(), ValidationError> {
    if p.cash < Decimal::ZERO || p.follow_on_reserve < Decimal::ZERO {
        return Err(ValidationError::NegativeBalance);
    }
    let mut seen = BTreeSet::new();
    for inv in &p.investments {
        if companies.get(inv.company).is_none() {
            return Err(ValidationError::UnknownCompany(inv.company));
        }
        if !seen.insert(inv.company) {
            return Err(ValidationError::DuplicatePosition(inv.company));
        }
    }
    Ok(())
}
