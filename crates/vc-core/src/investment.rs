use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::company::CompanyTable;
use crate::events::RoundKey;
use crate::ids::{CompanyId, HolderId};
use crate::money::{floor_zero, stake_value};
use crate::terms::InvestmentTerms;

/// One holder's position in one company.
///
/// Current equity lives in the company's cap table, not here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Investment {
    /// Company the position is in.
    pub company: CompanyId,
    /// Company name at the time of investment, for display.
    pub company_name: String,
    /// Sector label.
    pub category: String,
    /// Cumulative capital committed, including follow-ons.
    pub amount_invested: Decimal,
    /// Equity percent received at entry.
    pub initial_equity: f64,
    /// Company valuation at entry.
    pub entry_valuation: Decimal,
    /// Turn the position was opened.
    pub entry_turn: u32,
    /// Rights attached to the position.
    pub terms: InvestmentTerms,
    /// Founder's name.
    pub founder_name: String,
    /// Founder relationship in [0,100].
    pub relationship_score: f64,
    /// Last turn the holder interacted with the founders.
    pub last_interaction: u32,
    /// Months the position has been held.
    pub months_held: u32,
    /// Round the latest follow-on went into; that round skips this position when diluting.
    pub follow_on_round: Option<RoundKey>,
    /// Negative-news notice already emitted.
    pub negative_news_sent: bool,
}

impl Investment {
    pub fn has_board_seat(&self) -> bool {
        self.terms.board_seat
    }

    /// Apply a relationship change, clamped to [0,100].
    pub fn adjust_relationship(&mut self, delta: f64) {
        self.relationship_score = (self.relationship_score + delta).clamp(0.0, 100.0);
    }
}

/// How a position was closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitKind {
    Acquisition,
    SecondarySale,
}

/// A realized exit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExitRecord {
    pub company: CompanyId,
    pub company_name: String,
    pub kind: ExitKind,
    pub turn: u32,
    pub invested: Decimal,
    pub proceeds: Decimal,
}

impl ExitRecord {
    pub fn is_profitable(&self) -> bool {
        self.proceeds > self.invested
    }
}

/// A fund's book: cash, reserve and positions. Owned exclusively by its holder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    /// Whose book this is.
    pub holder: HolderId,
    /// Deployable cash.
    pub cash: Decimal,
    /// Committed fund size, the basis for fees.
    pub fund_size: Decimal,
    /// Capital held back for follow-on rounds.
    pub follow_on_reserve: Decimal,
    /// Open positions, at most one per company.
    pub investments: Vec<Investment>,
    /// Cash + reserve + marked value of positions, as of the last recompute.
    pub net_worth: Decimal,
    /// Current turn, starting at 1.
    pub turn: u32,
    /// Last playable turn.
    pub max_turns: u32,
    /// Annual management fee rate.
    pub annual_fee_rate: f64,
    /// Fees charged so far.
    pub fees_paid: Decimal,
    /// Closed positions.
    pub exits: Vec<ExitRecord>,
}

impl Portfolio {
    pub fn new(holder: HolderId, fund_size: Decimal, follow_on_reserve: Decimal, max_turns: u32) -> Self {
        Self {
            holder,
            cash: fund_size,
            fund_size,
            follow_on_reserve,
            investments: Vec::new(),
            net_worth: fund_size + follow_on_reserve,
            turn: 1,
            max_turns,
            annual_fee_rate: 0.02,
            fees_paid: Decimal::ZERO,
            exits: Vec::new(),
        }
    }

    pub fn find(&self, company: CompanyId) -> Option<&Investment> {
        self.investments.iter().find(|i| i.company == company)
    }

    pub fn find_mut(&mut self, company: CompanyId) -> Option<&mut Investment> {
        self.investments.iter_mut().find(|i| i.company == company)
    }

    pub fn holds(&self, company: CompanyId) -> bool {
        self.find(company).is_some()
    }

    /// Remove and return the position in `company`.
    pub fn take(&mut self, company: CompanyId) -> Option<Investment> {
        let idx = self.investments.iter().position(|i| i.company == company)?;
        Some(self.investments.remove(idx))
    }

    /// Capital available for follow-ons: cash plus reserve.
    pub fn follow_on_capacity(&self) -> Decimal {
        self.cash + self.follow_on_reserve
    }

    /// Marked value of open positions against the company table.
    pub fn holdings_value(&self, companies: &CompanyTable) -> Decimal {
        self.investments
            .iter()
            .filter_map(|inv| companies.get(inv.company))
            .map(|c| stake_value(c.cap_table.equity_of(self.holder), c.valuation()))
            .sum()
    }

    /// Recompute and store net worth.
    pub fn refresh_net_worth(&mut self, companies: &CompanyTable) -> Decimal {
        self.net_worth = floor_zero(self.cash) + self.follow_on_reserve + self.holdings_value(companies);
        self.net_worth
    }

    pub fn total_invested(&self) -> Decimal {
        self.investments.iter().map(|i| i.amount_invested).sum()
    }

    /// Charge `amount` against cash first, then the follow-on reserve.
    ///
    /// Callers check capacity first; the reserve is floored at zero.
    pub fn draw_cash_then_reserve(&mut self, amount: Decimal) {
        let from_cash = amount.min(self.cash.max(Decimal::ZERO));
        self.cash -= from_cash;
        let rest = amount - from_cash;
        self.follow_on_reserve = floor_zero(self.follow_on_reserve - rest);
    }
}
