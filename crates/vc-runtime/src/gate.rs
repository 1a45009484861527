//! Blocking gate in front of `process_turn`.

use serde::{Deserialize, Serialize};

use crate::error::TurnError;

/// Where the current turn stands with respect to outstanding decisions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Turn open; nothing evaluated since the last change.
    Idle,
    /// Follow-on opportunities need an invest or decline decision.
    AwaitingFollowOns,
    /// Board votes need the player's vote.
    AwaitingBoardVotes,
    /// All decisions made; the turn may advance.
    Ready,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnGate {
    phase: TurnPhase,
}

impl Default for TurnGate {
    fn default() -> Self {
        Self {
            phase: TurnPhase::Idle,
        }
    }
}

impl TurnGate {
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    fn settle(&mut self, follow_ons: usize, votes: usize) {
        self.phase = if follow_ons > 0 {
            TurnPhase::AwaitingFollowOns
        } else if votes > 0 {
            TurnPhase::AwaitingBoardVotes
        } else {
            TurnPhase::Ready
        };
    }

    /// Check outstanding decisions before advancing. Follow-ons block ahead of votes.
    pub fn evaluate(&mut self, follow_ons: usize, votes: usize) -> Result<(), TurnError> {
        self.settle(follow_ons, votes);
        match self.phase {
            TurnPhase::AwaitingFollowOns => Err(TurnError::FollowOnsPending(follow_ons)),
            TurnPhase::AwaitingBoardVotes => Err(TurnError::BoardVotesPending(votes)),
            _ => Ok(()),
        }
    }

    /// A follow-on or vote was decided.
    pub fn decided(&mut self, follow_ons: usize, votes: usize) {
        if self.phase != TurnPhase::Idle || follow_ons + votes == 0 {
            self.settle(follow_ons, votes);
        }
    }

    /// State changed in a way that may create new obligations.
    pub fn invalidate(&mut self) {
        if self.phase == TurnPhase::Ready {
            self.phase = TurnPhase::Idle;
        }
    }

    /// A turn finished processing; votes it raised must be resolved first.
    pub fn turn_finished(&mut self, votes: usize) {
        self.phase = if votes > 0 {
            TurnPhase::AwaitingBoardVotes
        } else {
            TurnPhase::Idle
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follow_ons_block_before_votes() {
        let mut g = TurnGate::default();
        assert_eq!(g.evaluate(2, 1), Err(TurnError::FollowOnsPending(2)));
        assert_eq!(g.phase(), TurnPhase::AwaitingFollowOns);
        g.decided(0, 1);
        assert_eq!(g.phase(), TurnPhase::AwaitingBoardVotes);
        g.decided(0, 0);
        assert_eq!(g.phase(), TurnPhase::Ready);
        assert_eq!(g.evaluate(0, 0), Ok(()));
    }

    #[test]
    fn finished_turn_with_votes_awaits_them() {
        let mut g = TurnGate::default();
        g.turn_finished(1);
        assert_eq!(g.phase(), TurnPhase::AwaitingBoardVotes);
        g.turn_finished(0);
        assert_eq!(g.phase(), TurnPhase::Idle);
        g.invalidate();
        assert_eq!(g.phase(), TurnPhase::Idle);
    }
}
