use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::{scale, usd};

/// Raw operating metrics as published in the startup catalog.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StartupMetrics {
    /// Gross burn in thousands of dollars per month.
    pub gross_burn_k: i64,
    /// Monthly activation rate (percent, may exceed 100 for viral products).
    pub monthly_activation_rate: i64,
    /// Monthly active website visitors.
    pub monthly_visitors: i64,
    /// Units sold per month.
    pub monthly_sales: i64,
    /// Unit cost in dollars.
    pub unit_cost: i64,
    /// Unit sale price in dollars.
    pub sale_price: i64,
    /// Gross margin per unit, percent.
    pub margin_percent: i64,
}

/// Monthly operating financials, advanced once per turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Financials {
    /// Revenue for the current month.
    pub monthly_revenue: Decimal,
    /// Operating costs for the current month.
    pub monthly_costs: Decimal,
    /// Month-over-month revenue growth rate.
    pub revenue_growth_rate: f64,
}

impl Default for Financials {
    fn default() -> Self {
        Self {
            monthly_revenue: Decimal::ZERO,
            monthly_costs: Decimal::ZERO,
            revenue_growth_rate: 0.05,
        }
    }
}

impl Financials {
    /// Seed financials from catalog metrics: revenue = sales × price, costs = burn × $1000.
    pub fn from_metrics(m: &StartupMetrics) -> Self {
        Self {
            monthly_revenue: usd(m.monthly_sales.saturating_mul(m.sale_price).max(0)),
            monthly_costs: usd(m.gross_burn_k.saturating_mul(1_000).max(0)),
            ..Self::default()
        }
    }

    pub fn net_income(&self) -> Decimal {
        self.monthly_revenue - self.monthly_costs
    }

    pub fn is_profitable(&self) -> bool {
        self.net_income() > Decimal::ZERO
    }

    /// Grow revenue by `growth` and costs by `cost_growth`, both fractional.
    pub fn grow(&mut self, growth: f64, cost_growth: f64) {
        self.monthly_revenue = scale(self.monthly_revenue, 1.0 + growth).max(Decimal::ZERO);
        self.monthly_costs = scale(self.monthly_costs, 1.0 + cost_growth).max(Decimal::ZERO);
    }
}

/// An investable company as listed on the deal-flow roster.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Startup {
    /// Company name, unique within a roster.
    pub name: String,
    /// One-line pitch.
    pub description: String,
    /// Sector label, e.g. "FinTech".
    pub category: String,
    /// Current valuation. A company at zero has failed.
    pub valuation: Decimal,
    /// Risk score in [0,1]; higher is riskier.
    pub risk_score: f64,
    /// Growth potential in [0,1].
    pub growth_potential: f64,
    /// Raw catalog metrics.
    pub metrics: StartupMetrics,
    /// Operating financials.
    pub financials: Financials,
}

impl Startup {
    /// A startup with explicit scores and no operating history.
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        valuation: Decimal,
        risk_score: f64,
        growth_potential: f64,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            category: category.into(),
            valuation,
            risk_score,
            growth_potential,
            metrics: StartupMetrics::default(),
            financials: Financials::default(),
        }
    }

    pub fn has_failed(&self) -> bool {
        self.valuation <= Decimal::ZERO
    }
}
