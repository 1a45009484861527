use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable index of a company in the game's company table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CompanyId(pub u32);

impl CompanyId {
    /// Position of the company in the backing table.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A party that can hold equity in a company.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HolderId {
    /// The human-controlled fund.
    Player,
    /// An AI fund, by position in the game's AI roster.
    Fund(u8),
}

impl HolderId {
    pub fn is_player(self) -> bool {
        matches!(self, HolderId::Player)
    }
}

impl fmt::Display for HolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HolderId::Player => write!(f, "player"),
            HolderId::Fund(i) => write!(f, "fund-{i}"),
        }
    }
}
