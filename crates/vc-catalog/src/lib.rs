#![deny(warnings)]

//! Catalog loading for the simulation: startups, market events and engine configuration.
//!
//! Catalog files are a fixed external contract. Missing or malformed files degrade to an empty
//! catalog with a warning; only [`load_config`] and the `*_from_path` loaders report errors.

pub mod deal_flow;

pub use deal_flow::{draw_roster, RosterPolicy, SlotQuality};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};
use vc_core::money::usd;
use vc_core::{EngineConfig, Financials, Startup, StartupMetrics};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("io error: {0}")]
    Io(String),
    #[error("invalid catalog: {0}")]
    Parse(String),
    #[error("invalid config: {0}")]
    Config(String),
}

impl From<std::io::Error> for CatalogError {
    fn from(e: std::io::Error) -> Self {
        CatalogError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Parse(e.to_string())
    }
}

impl From<serde_yaml::Error> for CatalogError {
    fn from(e: serde_yaml::Error) -> Self {
        CatalogError::Config(e.to_string())
    }
}

/// Raw startup record as stored on disk. Key names are part of the file contract.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StartupRecord {
    pub name: String,
    pub description: String,
    pub category: String,
    /// Dollars, or millions when under 1,000.
    pub valuation: i64,
    #[serde(rename = "grossburnrate")]
    pub gross_burn_rate: i64,
    #[serde(rename = "Monthly Activation Rate")]
    pub monthly_activation_rate: i64,
    #[serde(rename = "Monthly Active Visitors")]
    pub monthly_visitors: i64,
    #[serde(rename = "Monthly Sales")]
    pub monthly_sales: i64,
    #[serde(rename = "Cost")]
    pub cost: i64,
    #[serde(rename = "Sale Price")]
    pub sale_price: i64,
    #[serde(rename = "Percent Margin Per Unit")]
    pub percent_margin: i64,
}

/// Valuations below this are taken to be in millions.
const RAW_UNIT_THRESHOLD: i64 = 1_000;

impl StartupRecord {
    pub fn valuation_usd(&self) -> Decimal {
        if self.valuation > 0 && self.valuation < RAW_UNIT_THRESHOLD {
            usd(self.valuation) * usd(1_000_000)
        } else {
            usd(self.valuation.max(0))
        }
    }

    /// Convert into a startup, deriving scores and financials from the raw metrics.
    pub fn into_startup(self) -> Startup {
        let valuation = self.valuation_usd();
        let metrics = StartupMetrics {
            gross_burn_k: self.gross_burn_rate,
            monthly_activation_rate: self.monthly_activation_rate,
            monthly_visitors: self.monthly_visitors,
            monthly_sales: self.monthly_sales,
            unit_cost: self.cost,
            sale_price: self.sale_price,
            margin_percent: self.percent_margin,
        };
        Startup {
            risk_score: vc_econ::risk_score(&metrics),
            growth_potential: vc_econ::growth_potential(&metrics, valuation),
            financials: Financials::from_metrics(&metrics),
            name: self.name,
            description: self.description,
            category: self.category,
            valuation,
            metrics,
        }
    }
}

/// Startup templates available for roster generation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StartupCatalog {
    pub startups: Vec<Startup>,
}

impl StartupCatalog {
    pub fn from_startups(startups: Vec<Startup>) -> Self {
        Self { startups }
    }

    /// Parse a JSON array of [`StartupRecord`]s. Unnamed records are dropped.
    pub fn from_json_str(text: &str) -> Result<Self, CatalogError> {
        let records: Vec<StartupRecord> = serde_json::from_str(text)?;
        let startups = records
            .into_iter()
            .filter(|r| !r.name.trim().is_empty())
            .map(StartupRecord::into_startup)
            .collect();
        Ok(Self { startups })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Load a catalog, degrading to an empty one on any error.
    pub fn load_or_empty<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::from_path(path) {
            Ok(c) => {
                info!(path = %path.display(), startups = c.len(), "loaded startup catalog");
                c
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "startup catalog unavailable");
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.startups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.startups.is_empty()
    }
}

/// A market event applied during per-turn drift.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketEvent {
    pub event: String,
    /// Valuation multiplier (1.5 = +50%, 0.8 = -20%).
    pub change: f64,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EventFile {
    Flat(Vec<MarketEvent>),
    Nested(Vec<Vec<MarketEvent>>),
}

/// The pool market events are drawn from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventPool {
    pub events: Vec<MarketEvent>,
}

impl EventPool {
    /// Accepts a flat array or the legacy array-of-arrays layout (first group wins).
    /// Events with a non-finite or negative multiplier are dropped.
    pub fn from_json_str(text: &str) -> Result<Self, CatalogError> {
        let events = match serde_json::from_str::<EventFile>(text)? {
            EventFile::Flat(v) => v,
            EventFile::Nested(groups) => groups.into_iter().next().unwrap_or_default(),
        };
        let events = events
            .into_iter()
            .filter(|e| e.change.is_finite() && e.change >= 0.0)
            .collect();
        Ok(Self { events })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn load_or_empty<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::from_path(path) {
            Ok(p) => {
                info!(path = %path.display(), events = p.events.len(), "loaded event pool");
                p
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "event pool unavailable");
                Self::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Parse engine configuration from YAML; absent keys keep their defaults.
pub fn parse_config(text: &str) -> Result<EngineConfig, CatalogError> {
    let cfg: EngineConfig = serde_yaml::from_str(text)?;
    if !(0.0..=1.0).contains(&cfg.max_stake_fraction) || cfg.min_investment < Decimal::ZERO {
        return Err(CatalogError::Config("stake limits out of range".into()));
    }
    Ok(cfg)
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, CatalogError> {
    let text = fs::read_to_string(path)?;
    parse_config(&text)
}
