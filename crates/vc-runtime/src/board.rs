//! Board governance over acquisitions and down rounds.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::info;
use vc_ai::{synthesize_votes, GovernanceQuestion};
use vc_core::money::{format_usd, stake_value};
use vc_core::{CompanyId, FundingRoundEvent, HolderId};

use crate::error::BoardVoteError;
use crate::report::{LogCategory, LogEntry, TurnReport};
use crate::state::GameState;

/// What the board is deciding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BoardDecision {
    Acquisition { offer: Decimal, multiple: f64 },
    DownRound { round: FundingRoundEvent, pre_money: Decimal },
}

/// A decision waiting on the player's board vote.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardVote {
    pub company: CompanyId,
    pub company_name: String,
    pub turn: u32,
    pub title: String,
    pub decision: BoardDecision,
    pub option_a: String,
    pub option_b: String,
    pub consequence_a: String,
    pub consequence_b: String,
}

impl BoardVote {
    pub(crate) fn acquisition(company: CompanyId, name: &str, turn: u32, offer: Decimal, multiple: f64, payout: Decimal) -> Self {
        Self {
            company,
            company_name: name.to_string(),
            turn,
            title: format!("Acquisition Offer: {}", format_usd(offer)),
            decision: BoardDecision::Acquisition { offer, multiple },
            option_a: "Accept".into(),
            option_b: "Reject".into(),
            consequence_a: format!("Acquisition proceeds. You receive {}.", format_usd(payout)),
            consequence_b: "Acquisition rejected. Company continues operating independently.".into(),
        }
    }

    pub(crate) fn down_round(name: &str, round: FundingRoundEvent, pre_money: Decimal) -> Self {
        Self {
            company: round.company,
            company_name: name.to_string(),
            turn: round.turn,
            title: format!(
                "Down Round: {} at {} pre-money",
                format_usd(round.raise),
                format_usd(pre_money)
            ),
            option_a: "Approve".into(),
            option_b: "Reject".into(),
            consequence_a: format!(
                "Down round approved. Company raises {} at reduced valuation.",
                format_usd(round.raise)
            ),
            consequence_b: "Down round rejected. Company will seek bridge financing.".into(),
            decision: BoardDecision::DownRound { round, pre_money },
        }
    }

    fn question(&self, valuation: Decimal) -> GovernanceQuestion {
        match self.decision {
            BoardDecision::Acquisition { offer, .. } => GovernanceQuestion::Acquisition { offer, valuation },
            BoardDecision::DownRound { .. } => GovernanceQuestion::DownRound,
        }
    }
}

/// The player's side of a vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoteChoice {
    Accept,
    Reject,
}

impl FromStr for VoteChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "accept" | "approve" | "yes" | "1" => Ok(VoteChoice::Accept),
            "b" | "reject" | "disapprove" | "no" | "2" => Ok(VoteChoice::Reject),
            other => Err(other.to_string()),
        }
    }
}

/// Result of a resolved vote.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VoteResolution {
    pub text: String,
    pub passed: bool,
    pub votes_for: u32,
    pub votes_against: u32,
    /// What executing the outcome did.
    pub log: Vec<LogEntry>,
}

/// Weighted tally. Ties reject.
pub fn tally(player: Option<(VoteChoice, u32)>, ai_votes: &[bool]) -> (u32, u32) {
    let ai_for = ai_votes.iter().filter(|v| **v).count() as u32;
    let mut votes_for = ai_for;
    let mut votes_against = ai_votes.len() as u32 - ai_for;
    match player {
        Some((VoteChoice::Accept, w)) => votes_for += w,
        Some((VoteChoice::Reject, w)) => votes_against += w,
        None => {}
    }
    (votes_for, votes_against)
}

impl GameState {
    /// Cast the player's vote on pending vote `index` and execute the outcome.
    ///
    /// Other board members' votes are synthesized from the game's random stream.
    pub fn process_board_vote(&mut self, index: usize, choice: &str) -> Result<VoteResolution, BoardVoteError> {
        let vote = self
            .board_votes
            .get(index)
            .ok_or(BoardVoteError::InvalidIndex(index))?;
        let weight = match self.portfolio.find(vote.company) {
            Some(inv) if inv.has_board_seat() => inv.terms.vote_weight(),
            _ => return Err(BoardVoteError::NoBoardSeat(vote.company_name.clone())),
        };
        let choice: VoteChoice = choice.parse().map_err(BoardVoteError::InvalidChoice)?;

        let vote = self.board_votes.remove(index);
        let valuation = self.companies.valuation_of(vote.company);
        let ai_votes = synthesize_votes(&mut self.rng, vote.question(valuation));
        let (votes_for, votes_against) = tally(Some((choice, weight)), &ai_votes);
        let passed = votes_for > votes_against;
        let total = votes_for + votes_against;
        let mut text = format!(
            "Board Vote: {votes_for}/{total} voted for {}, {votes_against}/{total} voted for {}. ",
            vote.option_a, vote.option_b
        );
        text.push_str(if passed { &vote.consequence_a } else { &vote.consequence_b });
        info!(company = %vote.company_name, ?choice, votes_for, votes_against, passed, "board vote resolved");

        let mut report = TurnReport::new(self.portfolio.turn);
        report.push(LogCategory::BoardVote, Some(&vote.company_name), text.clone());
        self.execute_vote(vote, passed, &mut report);
        self.refresh_net_worths();
        self.gate.decided(self.pending_follow_ons(), self.board_votes.len());
        Ok(VoteResolution {
            text,
            passed,
            votes_for,
            votes_against,
            log: report.entries,
        })
    }

    /// Put a decision to a board the player does not sit on. Returns whether it passed.
    pub(crate) fn resolve_without_player(&mut self, vote: &BoardVote, report: &mut TurnReport) -> bool {
        let valuation = self.companies.valuation_of(vote.company);
        let ai_votes = synthesize_votes(&mut self.rng, vote.question(valuation));
        let (votes_for, votes_against) = tally(None, &ai_votes);
        let passed = votes_for > votes_against;
        if self.portfolio.holds(vote.company) {
            report.push(
                LogCategory::BoardVote,
                Some(&vote.company_name),
                format!(
                    "{}: board voted {votes_for}-{votes_against} to {}",
                    vote.title,
                    if passed { "approve" } else { "reject" }
                ),
            );
        }
        passed
    }

    pub(crate) fn execute_vote(&mut self, vote: BoardVote, passed: bool, report: &mut TurnReport) {
        match vote.decision {
            BoardDecision::Acquisition { offer, .. } if passed => {
                self.execute_acquisition(vote.company, offer, report);
            }
            BoardDecision::Acquisition { .. } => {
                if self.portfolio.holds(vote.company) {
                    report.push(
                        LogCategory::Acquisition,
                        Some(&vote.company_name),
                        format!("{} acquisition rejected by the board; company continues operating", vote.company_name),
                    );
                }
            }
            BoardDecision::DownRound { round, pre_money } if passed => {
                self.close_down_round(&round, pre_money, report);
            }
            BoardDecision::DownRound { round, .. } => {
                self.schedule_bridge(&round, report);
            }
        }
    }

    /// Settle outstanding votes on `company` once the player no longer sits on its board.
    pub(crate) fn settle_orphaned_votes(&mut self, company: CompanyId, report: &mut TurnReport) {
        let (orphaned, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.board_votes)
            .into_iter()
            .partition(|v| v.company == company);
        self.board_votes = kept;
        for vote in orphaned {
            let passed = self.resolve_without_player(&vote, report);
            self.execute_vote(vote, passed, report);
        }
    }

    /// Payout the player would receive if an acquisition at `offer` closed now.
    pub(crate) fn player_payout(&self, company: CompanyId, offer: Decimal) -> Decimal {
        self.companies
            .get(company)
            .map(|c| stake_value(c.cap_table.equity_of(HolderId::Player), offer))
            .unwrap_or(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_choices() {
        for s in ["a", "Accept", " approve ", "YES", "1"] {
            assert_eq!(s.parse::<VoteChoice>(), Ok(VoteChoice::Accept));
        }
        for s in ["b", "reject", "Disapprove", "no", "2"] {
            assert_eq!(s.parse::<VoteChoice>(), Ok(VoteChoice::Reject));
        }
        assert!("maybe".parse::<VoteChoice>().is_err());
    }

    #[test]
    fn ties_reject() {
        assert_eq!(tally(None, &[true, false]), (1, 1));
        assert_eq!(tally(Some((VoteChoice::Accept, 2)), &[false, false, true]), (3, 2));
        assert_eq!(tally(Some((VoteChoice::Reject, 1)), &[true, true]), (2, 1));
    }
}
