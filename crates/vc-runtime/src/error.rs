//! Typed failures for every boundary operation.

use rust_decimal::Decimal;
use thiserror::Error;
use vc_core::{CapTableError, CompanyId};
use vc_econ::EconError;

#[derive(Debug, Error, PartialEq)]
pub enum InvestError {
    #[error("insufficient funds: have {available}, need {requested}")]
    InsufficientFunds { available: Decimal, requested: Decimal },
    #[error("invalid startup index {0}")]
    InvalidIndex(usize),
    #[error("minimum investment is ${0}")]
    BelowMinimum(Decimal),
    #[error("maximum investment is ${0}")]
    AboveMaximum(Decimal),
    #[error("already invested in {0}")]
    AlreadyInvested(String),
    #[error("{0} is no longer raising")]
    CompanyUnavailable(String),
    #[error("these terms require an upgrade")]
    TermsUnavailable,
    #[error(transparent)]
    CapTable(#[from] CapTableError),
    #[error(transparent)]
    Econ(#[from] EconError),
}

#[derive(Debug, Error, PartialEq)]
pub enum FollowOnError {
    #[error("no follow-on opportunity for company {0} this turn")]
    NoOpportunity(CompanyId),
    #[error("follow-on for company {0} already decided")]
    AlreadyDecided(CompanyId),
    #[error("minimum follow-on is ${0}")]
    BelowMinimum(Decimal),
    #[error("maximum follow-on is ${0}")]
    AboveMaximum(Decimal),
    #[error("insufficient funds: have {available}, need {requested}")]
    InsufficientFunds { available: Decimal, requested: Decimal },
    #[error(transparent)]
    CapTable(#[from] CapTableError),
}

#[derive(Debug, Error, PartialEq)]
pub enum BoardVoteError {
    #[error("invalid vote index {0}")]
    InvalidIndex(usize),
    #[error("you do not hold a board seat at {0}")]
    NoBoardSeat(String),
    #[error("invalid choice {0:?}; expected accept or reject")]
    InvalidChoice(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum SecondaryError {
    #[error("invalid offer index {0}")]
    InvalidIndex(usize),
    #[error("offer has expired")]
    Expired,
}

#[derive(Debug, Error, PartialEq)]
pub enum ValueAddError {
    #[error("you are not invested in company {0}")]
    NotInvested(CompanyId),
    #[error("{0} is no longer operating")]
    CompanyInactive(String),
    #[error("already helped {0} this turn")]
    AlreadyHelpedThisTurn(String),
    #[error("this action requires a board seat")]
    RequiresBoardSeat,
    #[error("need {need:.1}% equity, have {have:.1}%")]
    InsufficientEquity { have: f64, need: f64 },
    #[error("insufficient funds: have {available}, need {requested}")]
    InsufficientFunds { available: Decimal, requested: Decimal },
    #[error("at most {0} value-add actions per turn")]
    MaxActionsReached(usize),
    #[error("unknown value-add action {0:?}")]
    UnknownAction(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum DiligenceError {
    #[error("invalid startup index {0}")]
    InvalidIndex(usize),
    #[error("due diligence already performed on {0}")]
    AlreadyPerformed(String),
    #[error("insufficient funds: have {available}, need {requested}")]
    InsufficientFunds { available: Decimal, requested: Decimal },
}

#[derive(Debug, Error, PartialEq)]
pub enum TurnError {
    #[error("{0} follow-on decision(s) outstanding")]
    FollowOnsPending(usize),
    #[error("{0} board vote(s) outstanding")]
    BoardVotesPending(usize),
    #[error("the game is over")]
    GameOver,
}
