#![deny(warnings)]

//! Heuristic AI funds.
//!
//! AI funds screen the roster with one of twelve strategies, deploy capital on the first turn,
//! and otherwise ride the same company trajectories as the player. Their board votes are
//! synthesized rather than cast by discrete holders.

pub mod board;
pub mod fund;
pub mod strategy;

pub use board::{accept_probability, synthesize_votes, GovernanceQuestion};
pub use fund::{plan_initial_allocations, AiFund, Allocation};
