//! Reputation-weighted roster generation.
//!
//! Every roster slot is rolled as a hot, standard or struggling deal according to the player's
//! reputation tier. Hot and struggling slots re-roll the startup's attributes; standard slots
//! only pull outliers back into the balanced band. Nothing is ever hidden from the roster.

use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::debug;
use vc_core::money::scale;
use vc_core::{ReputationTier, Startup, VCReputation};
use vc_econ::reputation::{founder_referral_bonus, tier};

use crate::StartupCatalog;

/// Quality of one roster slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotQuality {
    Hot,
    Standard,
    Struggling,
}

/// (hot, standard) slot probabilities; the rest are struggling.
fn slot_odds(t: ReputationTier) -> (f64, f64) {
    match t {
        ReputationTier::Tier1 => (0.25, 0.60),
        ReputationTier::Tier2 => (0.05, 0.75),
        ReputationTier::Tier3 => (0.0, 0.40),
    }
}

/// How a roster is drawn from the catalog.
#[derive(Clone, Debug, PartialEq)]
pub struct RosterPolicy {
    /// Slots to fill.
    pub size: usize,
    /// Re-roll listing valuations uniformly in this range (pre-seed pricing).
    pub valuation_range: Option<(Decimal, Decimal)>,
}

impl RosterPolicy {
    pub fn pre_seed(size: usize) -> Self {
        Self {
            size,
            valuation_range: Some((Decimal::new(250_000, 0), Decimal::new(1_000_000, 0))),
        }
    }
}

pub fn roll_slot<R: Rng>(rng: &mut R, t: ReputationTier) -> SlotQuality {
    let (hot, standard) = slot_odds(t);
    let roll: f64 = rng.gen();
    if roll < hot {
        SlotQuality::Hot
    } else if roll < hot + standard {
        SlotQuality::Standard
    } else {
        SlotQuality::Struggling
    }
}

/// Re-roll a startup's attributes for its slot quality.
pub fn adjust_for_slot<R: Rng>(rng: &mut R, s: &mut Startup, q: SlotQuality) {
    match q {
        SlotQuality::Hot => {
            if s.risk_score > 0.4 {
                s.risk_score = rng.gen_range(0.2..=0.4);
            }
            if s.growth_potential < 0.7 {
                s.growth_potential = rng.gen_range(0.7..=0.9);
            }
            s.valuation = scale(s.valuation, rng.gen_range(1.1..=1.3));
        }
        SlotQuality::Standard => {
            if s.risk_score < 0.4 {
                s.risk_score = rng.gen_range(0.4..=0.5);
            } else if s.risk_score > 0.6 {
                s.risk_score = rng.gen_range(0.5..=0.6);
            }
            if s.growth_potential < 0.5 {
                s.growth_potential = rng.gen_range(0.5..=0.6);
            } else if s.growth_potential > 0.7 {
                s.growth_potential = rng.gen_range(0.6..=0.7);
            }
        }
        SlotQuality::Struggling => {
            if s.risk_score < 0.6 {
                s.risk_score = rng.gen_range(0.6..=0.8);
            }
            if s.growth_potential > 0.5 {
                s.growth_potential = rng.gen_range(0.3..=0.5);
            }
            s.valuation = scale(s.valuation, rng.gen_range(0.7..=0.9));
        }
    }
}

/// Draw a roster: shuffle the catalog, take `policy.size` entries, re-price, then tier.
///
/// Strong founder relationships shade non-struggling deals toward lower risk and higher growth.
pub fn draw_roster<R: Rng>(
    rng: &mut R,
    catalog: &StartupCatalog,
    reputation: &VCReputation,
    policy: &RosterPolicy,
) -> Vec<Startup> {
    let mut pool = catalog.startups.clone();
    pool.shuffle(rng);
    pool.truncate(policy.size);

    let t = tier(reputation);
    let referral = founder_referral_bonus(reputation.founder_score);
    for s in pool.iter_mut() {
        if let Some((lo, hi)) = policy.valuation_range {
            if lo <= hi {
                let span = (hi - lo).trunc().to_i64().unwrap_or(0);
                s.valuation = lo + Decimal::from(rng.gen_range(0..=span));
            }
        }
        let q = roll_slot(rng, t);
        adjust_for_slot(rng, s, q);
        if referral > 0.0 && q != SlotQuality::Struggling {
            s.risk_score = (s.risk_score - referral / 2.0).max(0.1);
            s.growth_potential = (s.growth_potential + referral).min(1.0);
        }
    }
    debug!(tier = ?t, slots = pool.len(), "drew roster");
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use vc_core::money::usd;

    fn catalog(n: usize) -> StartupCatalog {
        StartupCatalog::from_startups(
            (0..n)
                .map(|i| Startup::new(format!("S{i}"), "SaaS", usd(5_000_000), 0.5, 0.6))
                .collect(),
        )
    }

    fn rep(score: f64) -> VCReputation {
        VCReputation {
            performance_score: score,
            founder_score: score,
            market_score: score,
            ..VCReputation::new("p")
        }
    }

    #[test]
    fn roster_is_truncated_and_repriced() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let roster = draw_roster(&mut rng, &catalog(30), &rep(50.0), &RosterPolicy::pre_seed(15));
        assert_eq!(roster.len(), 15);
        // re-priced into [250k, 1M] then tier-scaled by at most 0.7..1.3
        assert!(roster.iter().all(|s| s.valuation >= usd(175_000) && s.valuation <= usd(1_300_000)));
    }

    #[test]
    fn small_catalog_yields_smaller_roster() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let roster = draw_roster(&mut rng, &catalog(4), &rep(50.0), &RosterPolicy::pre_seed(15));
        assert_eq!(roster.len(), 4);
    }

    #[test]
    fn tier3_never_rolls_hot_slots() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..500 {
            assert_ne!(roll_slot(&mut rng, ReputationTier::Tier3), SlotQuality::Hot);
        }
    }

    #[test]
    fn hot_slot_adjustments_stay_in_band() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut s = Startup::new("S", "SaaS", usd(1_000_000), 0.9, 0.1);
        adjust_for_slot(&mut rng, &mut s, SlotQuality::Hot);
        assert!((0.2..=0.4).contains(&s.risk_score));
        assert!((0.7..=0.9).contains(&s.growth_potential));
        assert!(s.valuation >= usd(1_100_000) && s.valuation <= usd(1_300_000));
    }

    #[test]
    fn standard_slot_pulls_outliers_into_balanced_band() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for (risk, growth) in [(0.1, 0.95), (0.95, 0.1), (0.5, 0.6)] {
            let mut s = Startup::new("S", "SaaS", usd(1_000_000), risk, growth);
            adjust_for_slot(&mut rng, &mut s, SlotQuality::Standard);
            assert!((0.4..=0.6).contains(&s.risk_score), "risk {}", s.risk_score);
            assert!((0.5..=0.7).contains(&s.growth_potential), "growth {}", s.growth_potential);
            assert_eq!(s.valuation, usd(1_000_000));
        }

        let mut s = Startup::new("S", "SaaS", usd(1_000_000), 0.45, 0.65);
        adjust_for_slot(&mut rng, &mut s, SlotQuality::Standard);
        assert_eq!((s.risk_score, s.growth_potential), (0.45, 0.65));
    }
}
