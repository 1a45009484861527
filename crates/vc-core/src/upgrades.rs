use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// Permanent unlocks a player brings into a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Upgrade {
    FundBooster,
    ManagementFeeReduction,
    FollowOnReserveBoost,
    SpeedMode,
    EnduranceMode,
    AngelInvestor,
    EarlyAccess,
    FounderNetwork,
    DoubleBoardSeat,
    EnhancedSafeDiscount,
    #[serde(rename = "liquidation_preference_2x")]
    LiquidationPreference2x,
    SuperProRata,
    SeedAccelerator,
    PortfolioInsurance,
    FeeWaiver,
}

impl Upgrade {
    pub const ALL: [Upgrade; 15] = [
        Upgrade::FundBooster,
        Upgrade::ManagementFeeReduction,
        Upgrade::FollowOnReserveBoost,
        Upgrade::SpeedMode,
        Upgrade::EnduranceMode,
        Upgrade::AngelInvestor,
        Upgrade::EarlyAccess,
        Upgrade::FounderNetwork,
        Upgrade::DoubleBoardSeat,
        Upgrade::EnhancedSafeDiscount,
        Upgrade::LiquidationPreference2x,
        Upgrade::SuperProRata,
        Upgrade::SeedAccelerator,
        Upgrade::PortfolioInsurance,
        Upgrade::FeeWaiver,
    ];

    /// Stable string id used by profiles and save files.
    pub fn id(self) -> &'static str {
        match self {
            Upgrade::FundBooster => "fund_booster",
            Upgrade::ManagementFeeReduction => "management_fee_reduction",
            Upgrade::FollowOnReserveBoost => "follow_on_reserve_boost",
            Upgrade::SpeedMode => "speed_mode",
            Upgrade::EnduranceMode => "endurance_mode",
            Upgrade::AngelInvestor => "angel_investor",
            Upgrade::EarlyAccess => "early_access",
            Upgrade::FounderNetwork => "founder_network",
            Upgrade::DoubleBoardSeat => "double_board_seat",
            Upgrade::EnhancedSafeDiscount => "enhanced_safe_discount",
            Upgrade::LiquidationPreference2x => "liquidation_preference_2x",
            Upgrade::SuperProRata => "super_pro_rata",
            Upgrade::SeedAccelerator => "seed_accelerator",
            Upgrade::PortfolioInsurance => "portfolio_insurance",
            Upgrade::FeeWaiver => "fee_waiver",
        }
    }
}

impl FromStr for Upgrade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Upgrade::ALL
            .into_iter()
            .find(|u| u.id() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// The resolved set of upgrades active for one game.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeSet(BTreeSet<Upgrade>);

impl UpgradeSet {
    /// Resolve string ids once. Unknown ids are returned alongside the set.
    pub fn resolve<I, S>(ids: I) -> (Self, Vec<String>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        let mut unknown = Vec::new();
        for id in ids {
            match id.as_ref().parse::<Upgrade>() {
                Ok(u) => {
                    set.insert(u);
                }
                Err(bad) => unknown.push(bad),
            }
        }
        (Self(set), unknown)
    }

    pub fn has(&self, upgrade: Upgrade) -> bool {
        self.0.contains(&upgrade)
    }

    pub fn insert(&mut self, upgrade: Upgrade) {
        self.0.insert(upgrade);
    }

    pub fn iter(&self) -> impl Iterator<Item = Upgrade> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Upgrade> for UpgradeSet {
    fn from_iter<T: IntoIterator<Item = Upgrade>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
