#![deny(warnings)]

//! Turn engine for the venture portfolio simulation.
//!
//! [`GameState`] owns one game: the company arena, the player's portfolio, the AI funds, the
//! event queue and the seeded random stream. Every boundary operation is a method on it:
//! - investing, follow-ons and term options ([`invest`])
//! - board votes on acquisitions and down rounds ([`board`])
//! - secondary offers ([`secondary`]), value-add ([`value_add`]) and due diligence ([`diligence`])
//! - turn processing ([`turn`]) behind an explicit gate ([`gate`])
//! - leaderboard, final score and reputation update ([`scoring`])
//!
//! The engine produces plain values for storage and never touches it.

pub mod board;
pub mod diligence;
pub mod error;
pub mod founders;
pub mod gate;
pub mod invest;
pub mod report;
pub mod scheduler;
pub mod scoring;
pub mod secondary;
pub mod state;
pub mod turn;
pub mod value_add;

pub use board::{BoardDecision, BoardVote, VoteChoice, VoteResolution};
pub use diligence::{DiligenceReport, Finding, FindingArea, FindingKind};
pub use error::{
    BoardVoteError, DiligenceError, FollowOnError, InvestError, SecondaryError, TurnError,
    ValueAddError,
};
pub use gate::{TurnGate, TurnPhase};
pub use invest::FollowOnOpportunity;
pub use report::{LogCategory, LogEntry, TurnReport};
pub use scheduler::{schedule_all, DueEvents, EventQueue};
pub use scoring::{FinalScore, LeaderboardEntry};
pub use secondary::{recommend, Recommendation, SecondaryMarket, SecondaryOffer};
pub use state::{GameSetup, GameState, RosterSource};
pub use value_add::{ActiveValueAdd, ValueAddKind, ValueAddReceipt};
