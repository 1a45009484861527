//! Pre-generated, turn-indexed event queues.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;
use vc_core::money::usd;
use vc_core::{
    AcquisitionEvent, CompanyId, CompanyTable, CrisisEvent, CrisisKind, Difficulty, DueDiligence,
    FundingRoundEvent, RoundStage, ScheduledEvent, Severity,
};

/// Query for events due on a turn. Callers never depend on the storage layout.
pub trait DueEvents {
    fn due(&self, turn: u32) -> Vec<ScheduledEvent>;

    fn rounds_due(&self, turn: u32) -> Vec<FundingRoundEvent> {
        self.due(turn)
            .into_iter()
            .filter_map(|e| match e {
                ScheduledEvent::Round(r) => Some(r),
                _ => None,
            })
            .collect()
    }
}

/// Flat list of scheduled events, scanned linearly.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventQueue {
    events: Vec<ScheduledEvent>,
}

impl EventQueue {
    pub fn push(&mut self, event: ScheduledEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduledEvent> {
        self.events.iter()
    }
}

impl DueEvents for EventQueue {
    fn due(&self, turn: u32) -> Vec<ScheduledEvent> {
        self.events.iter().filter(|e| e.turn() == turn).cloned().collect()
    }
}

fn round<R: Rng>(rng: &mut R, company: CompanyId, stage: RoundStage, turns: (u32, u32), raise: (i64, i64)) -> FundingRoundEvent {
    FundingRoundEvent {
        company,
        stage,
        turn: rng.gen_range(turns.0..=turns.1),
        raise: usd(rng.gen_range(raise.0..=raise.1)),
        down_round: false,
    }
}

fn crisis_severity<R: Rng>(rng: &mut R, difficulty: Difficulty) -> (Severity, f64) {
    let roll: f64 = rng.gen();
    match difficulty {
        Difficulty::Hard | Difficulty::Expert if roll < 0.25 => (Severity::Severe, 0.40),
        Difficulty::Hard | Difficulty::Expert if roll < 0.55 => (Severity::Moderate, 0.65),
        Difficulty::Medium if roll < 0.15 => (Severity::Severe, 0.50),
        Difficulty::Medium if roll < 0.40 => (Severity::Moderate, 0.70),
        Difficulty::Easy if roll < 0.10 => (Severity::Moderate, 0.75),
        _ => (Severity::Minor, 0.85),
    }
}

/// Independently schedule every event one company may see. Events at or past `max_turns` are
/// dropped.
pub fn schedule_company<R: Rng>(
    rng: &mut R,
    company: CompanyId,
    difficulty: Difficulty,
    max_turns: u32,
) -> Vec<ScheduledEvent> {
    let mut out = vec![
        ScheduledEvent::Round(round(rng, company, RoundStage::Seed, (3, 9), (2_000_000, 5_000_000))),
        ScheduledEvent::Round(round(rng, company, RoundStage::SeriesA, (12, 24), (10_000_000, 20_000_000))),
        ScheduledEvent::Round(round(rng, company, RoundStage::SeriesB, (30, 48), (30_000_000, 50_000_000))),
    ];
    if rng.gen_bool(0.3) {
        out.push(ScheduledEvent::Round(round(rng, company, RoundStage::SeriesC, (48, 60), (50_000_000, 100_000_000))));
    }
    if rng.gen_bool(0.2) {
        let stage = if rng.gen_bool(0.5) {
            RoundStage::SeriesA
        } else {
            RoundStage::SeriesB
        };
        let mut down = round(rng, company, stage, (20, 49), (5_000_000, 20_000_000));
        down.down_round = true;
        out.push(ScheduledEvent::Round(down));
    }
    if rng.gen_bool(0.4) {
        let turn = rng.gen_range(24..=60);
        let mut multiple = rng.gen_range(3.0..=6.0);
        let roll: f64 = rng.gen();
        let due_diligence = if roll < 0.15 {
            multiple *= 0.6;
            DueDiligence::Bad
        } else if roll < 0.30 {
            multiple *= 1.2;
            DueDiligence::Good
        } else {
            DueDiligence::Normal
        };
        out.push(ScheduledEvent::Acquisition(AcquisitionEvent {
            company,
            turn,
            offer_multiple: multiple,
            due_diligence,
        }));
    }
    if rng.gen_bool(difficulty.profile().crisis_chance) {
        let turn = rng.gen_range(6..=55);
        let kind = CrisisKind::ALL[rng.gen_range(0..CrisisKind::ALL.len())];
        let (severity, impact) = crisis_severity(rng, difficulty);
        out.push(ScheduledEvent::Crisis(CrisisEvent {
            company,
            turn,
            kind,
            severity,
            impact,
        }));
    }
    out.retain(|e| e.turn() < max_turns);
    out
}

/// Schedule the whole roster at game start.
pub fn schedule_all<R: Rng>(rng: &mut R, companies: &CompanyTable, difficulty: Difficulty, max_turns: u32) -> EventQueue {
    let mut queue = EventQueue::default();
    for id in companies.ids() {
        for e in schedule_company(rng, id, difficulty, max_turns) {
            queue.push(e);
        }
    }
    debug!(events = queue.len(), "scheduled events");
    queue
}
