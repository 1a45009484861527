//! Events pre-scheduled at game start and consumed on their turn.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::CompanyId;

/// Stage of a priced round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundStage {
    Seed,
    SeriesA,
    SeriesB,
    SeriesC,
    /// Alternative financing after a rejected down round.
    Bridge,
}

impl fmt::Display for RoundStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RoundStage::Seed => "Seed",
            RoundStage::SeriesA => "Series A",
            RoundStage::SeriesB => "Series B",
            RoundStage::SeriesC => "Series C",
            RoundStage::Bridge => "Bridge",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FundingRoundEvent {
    pub company: CompanyId,
    pub stage: RoundStage,
    pub turn: u32,
    /// New capital raised.
    pub raise: Decimal,
    /// Priced below the prior valuation; pre-money is sampled when the round fires.
    pub down_round: bool,
}

/// Identifies one round of one company.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundKey {
    pub company: CompanyId,
    pub stage: RoundStage,
    pub turn: u32,
    pub down_round: bool,
}

impl FundingRoundEvent {
    pub fn key(&self) -> RoundKey {
        RoundKey {
            company: self.company,
            stage: self.stage,
            turn: self.turn,
            down_round: self.down_round,
        }
    }

    /// Display name, e.g. "Series B (Down)".
    pub fn name(&self) -> String {
        if self.down_round {
            format!("{} (Down)", self.stage)
        } else {
            self.stage.to_string()
        }
    }
}

/// Due-diligence outcome attached to an acquisition offer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DueDiligence {
    Normal,
    /// Diligence uncovered problems; the deal falls through.
    Bad,
    /// Diligence went well; the multiple is boosted.
    Good,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionEvent {
    pub company: CompanyId,
    pub turn: u32,
    /// EBITDA multiple after the diligence adjustment.
    pub offer_multiple: f64,
    pub due_diligence: DueDiligence,
}

/// Kind of company crisis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrisisKind {
    CofounderSplit,
    Scandal,
    Lawsuit,
    PivotFail,
    Fraud,
    DataBreach,
    KeyHireQuit,
    RegulatoryIssue,
    CompetitorAttack,
    ProductFailure,
}

impl CrisisKind {
    pub const ALL: [CrisisKind; 10] = [
        CrisisKind::CofounderSplit,
        CrisisKind::Scandal,
        CrisisKind::Lawsuit,
        CrisisKind::PivotFail,
        CrisisKind::Fraud,
        CrisisKind::DataBreach,
        CrisisKind::KeyHireQuit,
        CrisisKind::RegulatoryIssue,
        CrisisKind::CompetitorAttack,
        CrisisKind::ProductFailure,
    ];

    /// Headline for the outcome log.
    pub fn headline(self, severity: Severity) -> &'static str {
        match (self, severity) {
            (CrisisKind::CofounderSplit, Severity::Severe) => "co-founders fell out and the CEO resigned",
            (CrisisKind::CofounderSplit, _) => "a co-founder left after an equity dispute",
            (CrisisKind::Scandal, Severity::Severe) => "executive scandal made national headlines",
            (CrisisKind::Scandal, _) => "a PR controversy is hurting the brand",
            (CrisisKind::Lawsuit, Severity::Severe) => "hit with a major patent lawsuit",
            (CrisisKind::Lawsuit, _) => "facing litigation from a former partner",
            (CrisisKind::PivotFail, _) => "a product pivot failed to find traction",
            (CrisisKind::Fraud, Severity::Severe) => "accounting irregularities discovered",
            (CrisisKind::Fraud, _) => "revenue figures were overstated",
            (CrisisKind::DataBreach, Severity::Severe) => "customer data leaked in a major breach",
            (CrisisKind::DataBreach, _) => "a security incident exposed internal systems",
            (CrisisKind::KeyHireQuit, _) => "a key executive quit",
            (CrisisKind::RegulatoryIssue, _) => "regulators opened an investigation",
            (CrisisKind::CompetitorAttack, _) => "a well-funded competitor launched a clone",
            (CrisisKind::ProductFailure, _) => "a flagship product launch failed",
        }
    }
}

/// Crisis severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Minor,
    Moderate,
    Severe,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CrisisEvent {
    pub company: CompanyId,
    pub turn: u32,
    pub kind: CrisisKind,
    pub severity: Severity,
    /// Valuation multiplier applied when the crisis hits.
    pub impact: f64,
}

/// Any pre-scheduled event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ScheduledEvent {
    Round(FundingRoundEvent),
    Acquisition(AcquisitionEvent),
    Crisis(CrisisEvent),
}

impl ScheduledEvent {
    pub fn turn(&self) -> u32 {
        match self {
            ScheduledEvent::Round(e) => e.turn,
            ScheduledEvent::Acquisition(e) => e.turn,
            ScheduledEvent::Crisis(e) => e.turn,
        }
    }

    pub fn company(&self) -> CompanyId {
        match self {
            ScheduledEvent::Round(e) => e.company,
            ScheduledEvent::Acquisition(e) => e.company,
            ScheduledEvent::Crisis(e) => e.company,
        }
    }
}
