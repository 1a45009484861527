use serde::{Deserialize, Serialize};
use tracing::debug;

/// What an outcome-log entry is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogCategory {
    Fees,
    Round,
    DownRound,
    Crisis,
    Acquisition,
    Market,
    ValueAdd,
    News,
    Founder,
    BoardVote,
    Secondary,
    AiFund,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub turn: u32,
    pub category: LogCategory,
    pub company: Option<String>,
    pub message: String,
}

/// Everything that happened during one processed turn, in order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnReport {
    /// The turn that was processed.
    pub turn: u32,
    pub entries: Vec<LogEntry>,
}

impl TurnReport {
    pub fn new(turn: u32) -> Self {
        Self {
            turn,
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, category: LogCategory, company: Option<&str>, message: impl Into<String>) {
        let message = message.into();
        debug!(turn = self.turn, ?category, company, %message, "outcome");
        self.entries.push(LogEntry {
            turn: self.turn,
            category,
            company: company.map(str::to_string),
            message,
        });
    }

    pub fn of(&self, category: LogCategory) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(move |e| e.category == category)
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.message.as_str())
    }
}
