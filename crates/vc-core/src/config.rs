use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Investing style of an AI fund.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Conservative,
    Aggressive,
    Balanced,
    Contrarian,
    Momentum,
    Value,
    Fintech,
    Health,
    Climate,
    DeepTech,
    Saas,
    Consumer,
}

/// Identity and style of one AI fund.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AiFundConfig {
    pub name: String,
    pub firm: String,
    pub strategy: StrategyKind,
    /// Appetite for risk in [0,1]; sets the riskiest deal the fund will back.
    pub risk_tolerance: f64,
}

impl AiFundConfig {
    pub fn new(name: &str, firm: &str, strategy: StrategyKind, risk_tolerance: f64) -> Self {
        Self {
            name: name.into(),
            firm: firm.into(),
            strategy,
            risk_tolerance,
        }
    }

    /// Highest startup risk score this fund will back: 0.6 at zero tolerance, 1.0 at full.
    pub fn risk_ceiling(&self) -> f64 {
        0.6 + 0.4 * self.risk_tolerance.clamp(0.0, 1.0)
    }
}

/// Engine tunables. Every field has a default, so partial YAML files are fine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Smallest accepted cheque.
    pub min_investment: Decimal,
    /// Largest stake as a fraction of valuation.
    pub max_stake_fraction: f64,
    /// Largest stake with the super pro-rata upgrade.
    pub super_pro_rata_fraction: f64,
    /// Preferred cheques at or above this get a board seat.
    pub board_seat_threshold: Decimal,
    /// Companies on the roster before upgrades.
    pub roster_size: usize,
    /// Competing AI funds.
    pub ai_funds: Vec<AiFundConfig>,
    /// Per-holding, per-turn chance of a secondary offer.
    pub secondary_offer_chance: f64,
    /// Turns an offer stays open.
    pub secondary_offer_lifetime: u32,
    /// Value-add actions allowed per turn.
    pub value_add_per_turn: usize,
    /// Per-turn chance of a founder relationship event.
    pub relationship_event_chance: f64,
    /// Annual management fee rate.
    pub management_fee_rate: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_investment: Decimal::new(10_000, 0),
            max_stake_fraction: 0.20,
            super_pro_rata_fraction: 0.50,
            board_seat_threshold: Decimal::new(100_000, 0),
            roster_size: 15,
            ai_funds: vec![
                AiFundConfig::new("CARL", "Sterling & Cooper", StrategyKind::Conservative, 0.3),
                AiFundConfig::new("Sarah Chen", "Accel Partners", StrategyKind::Aggressive, 0.8),
                AiFundConfig::new("Marcus Williams", "Sequoia Capital", StrategyKind::Balanced, 0.5),
            ],
            secondary_offer_chance: 0.10,
            secondary_offer_lifetime: 3,
            value_add_per_turn: 2,
            relationship_event_chance: 0.10,
            management_fee_rate: 0.02,
        }
    }
}
