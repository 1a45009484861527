use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cap_table::CapTable;
use crate::ids::CompanyId;
use crate::startup::Startup;

/// Lifecycle of a company on the roster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompanyStatus {
    Active,
    /// Bought out; no further events apply.
    Acquired,
    /// Valuation hit zero.
    Failed,
}

/// Depth of a due-diligence review.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DiligenceLevel {
    Quick,
    Standard,
    Deep,
}

impl DiligenceLevel {
    /// Review cost in whole dollars.
    pub fn cost(self) -> Decimal {
        match self {
            DiligenceLevel::Quick => Decimal::new(5_000, 0),
            DiligenceLevel::Standard => Decimal::new(15_000, 0),
            DiligenceLevel::Deep => Decimal::new(30_000, 0),
        }
    }
}

/// Shared per-company record: the live startup profile plus its cap table.
///
/// `startup.valuation` is the company's current valuation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompanyState {
    /// Stable table index.
    pub id: CompanyId,
    /// Live profile; valuation, scores and financials drift over the game.
    pub startup: Startup,
    /// Ownership ledger and round history.
    pub cap_table: CapTable,
    /// Lifecycle status.
    pub status: CompanyStatus,
    /// Deepest due diligence the player has performed, if any.
    pub diligence: Option<DiligenceLevel>,
}

impl CompanyState {
    pub fn new(id: CompanyId, startup: Startup) -> Self {
        Self {
            id,
            startup,
            cap_table: CapTable::default(),
            status: CompanyStatus::Active,
            diligence: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.startup.name
    }

    pub fn valuation(&self) -> Decimal {
        self.startup.valuation
    }

    pub fn is_active(&self) -> bool {
        self.status == CompanyStatus::Active
    }

    /// Set the valuation, floored at zero; a company reaching zero is marked failed.
    pub fn set_valuation(&mut self, valuation: Decimal) {
        self.startup.valuation = valuation.max(Decimal::ZERO);
        if self.startup.valuation.is_zero() && self.status == CompanyStatus::Active {
            self.status = CompanyStatus::Failed;
        }
    }
}

/// Arena of companies addressed by [`CompanyId`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyTable {
    companies: Vec<CompanyState>,
}

impl CompanyTable {
    /// Build a table from a roster; ids follow roster order.
    pub fn from_roster(roster: Vec<Startup>) -> Self {
        let companies = roster
            .into_iter()
            .enumerate()
            .map(|(i, s)| CompanyState::new(CompanyId(i as u32), s))
            .collect();
        Self { companies }
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }

    pub fn get(&self, id: CompanyId) -> Option<&CompanyState> {
        self.companies.get(id.index())
    }

    pub fn get_mut(&mut self, id: CompanyId) -> Option<&mut CompanyState> {
        self.companies.get_mut(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompanyState> {
        self.companies.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut CompanyState> {
        self.companies.iter_mut()
    }

    pub fn ids(&self) -> impl Iterator<Item = CompanyId> + '_ {
        self.companies.iter().map(|c| c.id)
    }

    pub fn valuation_of(&self, id: CompanyId) -> Decimal {
        self.get(id).map(|c| c.valuation()).unwrap_or(Decimal::ZERO)
    }
}
