#![deny(warnings)]

//! Economic models for the venture portfolio simulation.
//!
//! This crate provides validated, mostly pure helpers for:
//! - Dilution of cap tables when rounds close ([`dilution`])
//! - Entry, follow-on, acquisition and secondary pricing ([`pricing`])
//! - Risk and growth scores derived from catalog metrics ([`scoring`])
//! - Cross-game reputation and deal-flow tiering ([`reputation`])

pub mod dilution;
pub mod pricing;
pub mod reputation;
pub mod scoring;

pub use dilution::{apply_dilution, close_round, Dilution, RoundPricing};
pub use pricing::{
    acquisition_offer, advance_financials, entry_equity, follow_on_bounds, follow_on_equity,
    random_walk_factor, secondary_offer_fraction, FollowOnBounds,
};
pub use reputation::GameOutcome;
pub use scoring::{growth_potential, risk_score};

use thiserror::Error;

/// Errors produced by economic helpers.
#[derive(Debug, Error, PartialEq)]
pub enum EconError {
    /// Valuations used as divisors must be strictly positive.
    #[error("valuation must be positive")]
    InvalidValuation,
    /// Numeric conversion to or from floating point failed.
    #[error("non-finite numeric conversion")]
    NonFinite,
}
