//! Synthesized board members for governance votes.

use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What the board is asked to approve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum GovernanceQuestion {
    Acquisition { offer: Decimal, valuation: Decimal },
    DownRound,
}

/// Probability that one synthesized member votes to accept.
pub fn accept_probability(q: GovernanceQuestion) -> f64 {
    match q {
        GovernanceQuestion::Acquisition { offer, valuation } if offer >= valuation => 0.7,
        GovernanceQuestion::Acquisition { .. } => 0.5,
        GovernanceQuestion::DownRound => 0.3,
    }
}

/// Two or three members each vote accept (`true`) or reject.
pub fn synthesize_votes<R: Rng>(rng: &mut R, q: GovernanceQuestion) -> Vec<bool> {
    let members = rng.gen_range(2..=3);
    let p = accept_probability(q);
    (0..members).map(|_| rng.gen_bool(p)).collect()
}
