//! Founder identities and relationship dynamics.

use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;
use vc_core::{InvestmentTerms, TermsKind};

const FIRST_NAMES: &[&str] = &[
    "Mark", "Jeff", "Larry", "Sergey", "Reed", "Brian", "Drew", "Patrick", "Daniel", "Kevin",
    "Aaron", "Peter", "Marc", "Reid", "Andrew", "Chris", "Ryan", "Tony", "Garrett", "Sara",
    "Whitney", "Jessica", "Emily", "Julia", "Anne", "Katrina", "Diane", "Sheryl", "Susan",
    "Leila", "Reshma", "Melanie", "Stacy", "Aileen", "Megan",
];

const LAST_NAMES: &[&str] = &[
    "Chesky", "Houston", "Collison", "Systrom", "Chen", "Hoffman", "Mason", "Dixon", "Kim",
    "Lin", "Patel", "Gupta", "Lee", "Wang", "Kumar", "Singh", "Shah", "Nguyen", "Garcia",
    "Lopez", "Martinez", "Brown", "Johnson", "Williams", "Taylor", "Anderson", "Thomas",
    "Jackson", "Harris", "Thompson", "Robinson", "Clark", "Lewis", "Walker",
];

pub fn founder_name<R: Rng>(rng: &mut R) -> String {
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or("Alex");
    let last = LAST_NAMES.choose(rng).copied().unwrap_or("Morgan");
    format!("{first} {last}")
}

/// Starting relationship for a new position, in [40, 85] before reputation bonuses.
///
/// Founder-friendly instruments, prior diligence and larger cheques all help.
pub fn initial_relationship<R: Rng>(
    rng: &mut R,
    terms: &InvestmentTerms,
    diligenced: bool,
    amount: Decimal,
) -> f64 {
    let mut score = 50.0 + rng.gen_range(0..=20) as f64;
    score += match terms.kind {
        TermsKind::Common => 10.0,
        TermsKind::Safe | TermsKind::SafeCapped => 5.0,
        TermsKind::PreferredTwoX => -5.0,
        TermsKind::Preferred => 0.0,
    };
    if diligenced {
        score += 8.0;
    }
    if amount >= Decimal::new(100_000, 0) {
        score += 5.0;
    } else if amount >= Decimal::new(50_000, 0) {
        score += 3.0;
    }
    score.clamp(40.0, 85.0)
}

/// A founder interaction rolled during a turn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RelationshipEvent {
    pub description: &'static str,
    pub change: f64,
}

const EVENTS: &[RelationshipEvent] = &[
    RelationshipEvent { description: "thanked you for your strategic advice", change: 5.0 },
    RelationshipEvent { description: "mentioned your firm favorably in a podcast interview", change: 3.0 },
    RelationshipEvent { description: "implemented your suggestion with great results", change: 7.0 },
    RelationshipEvent { description: "invited you to a company milestone celebration", change: 4.0 },
    RelationshipEvent { description: "publicly credited your firm for their success", change: 6.0 },
    RelationshipEvent { description: "is frustrated by a lack of engagement from your firm", change: -5.0 },
    RelationshipEvent { description: "disagreed strongly with a board direction you supported", change: -4.0 },
    RelationshipEvent { description: "feels micromanaged by board demands", change: -6.0 },
    RelationshipEvent { description: "heard criticism of your firm from other founders", change: -3.0 },
    RelationshipEvent { description: "asked for help with a strategic decision", change: 0.0 },
    RelationshipEvent { description: "wants advice on hiring a key executive", change: 0.0 },
];

pub fn roll_relationship_event<R: Rng>(rng: &mut R) -> RelationshipEvent {
    EVENTS[rng.gen_range(0..EVENTS.len())]
}
