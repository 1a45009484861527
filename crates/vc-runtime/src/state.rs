//! Game construction and the owned game state.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use tracing::{info, warn};
use vc_ai::AiFund;
use vc_catalog::deal_flow::{draw_roster, RosterPolicy};
use vc_catalog::{EventPool, StartupCatalog};
use vc_core::money::{scale, usd};
use vc_core::{
    validate_roster, CompanyId, CompanyTable, Difficulty, DifficultyProfile, EngineConfig,
    HolderId, Portfolio, ScheduledEvent, Startup, Upgrade, UpgradeSet, VCReputation,
};

use crate::board::BoardVote;
use crate::gate::{TurnGate, TurnPhase};
use crate::scheduler::{schedule_all, EventQueue};
use crate::secondary::SecondaryMarket;
use crate::value_add::ValueAddLedger;

/// Where the roster comes from.
#[derive(Clone, Debug)]
pub enum RosterSource {
    /// Use these startups as-is, in order.
    Fixed(Vec<Startup>),
    /// Draw a reputation-weighted, pre-seed priced roster from a catalog.
    Catalog(StartupCatalog),
}

/// Everything needed to start a game.
#[derive(Clone, Debug)]
pub struct GameSetup {
    pub player_name: String,
    /// Defaults to one derived from the player's name.
    pub firm_name: Option<String>,
    pub difficulty: Difficulty,
    /// Upgrade ids; unknown ids are ignored with a warning.
    pub upgrades: Vec<String>,
    pub reputation: Option<VCReputation>,
    pub roster: RosterSource,
    pub event_pool: EventPool,
    pub config: EngineConfig,
    /// Seeds every random draw in the game.
    pub seed: u64,
    /// Pre-schedule rounds, acquisitions and crises for every company.
    pub schedule_events: bool,
}

impl GameSetup {
    pub fn new(player_name: impl Into<String>, difficulty: Difficulty, roster: RosterSource) -> Self {
        Self {
            player_name: player_name.into(),
            firm_name: None,
            difficulty,
            upgrades: Vec::new(),
            reputation: None,
            roster,
            event_pool: EventPool::default(),
            config: EngineConfig::default(),
            seed: 0,
            schedule_events: true,
        }
    }

    pub fn with_firm(mut self, firm: impl Into<String>) -> Self {
        self.firm_name = Some(firm.into());
        self
    }

    pub fn with_upgrades<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.upgrades = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_reputation(mut self, reputation: VCReputation) -> Self {
        self.reputation = Some(reputation);
        self
    }

    pub fn with_event_pool(mut self, pool: EventPool) -> Self {
        self.event_pool = pool;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Start with an empty event queue; events can be injected with
    /// [`GameState::schedule_event`].
    pub fn without_scheduled_events(mut self) -> Self {
        self.schedule_events = false;
        self
    }
}

fn default_firm_name(player: &str) -> String {
    match player.split_whitespace().last() {
        Some(last) => format!("{last} Ventures"),
        None => "Independent Ventures".to_string(),
    }
}

/// Reserve held back for follow-ons: $100k plus $50k per expected follow-on slot.
fn follow_on_reserve(roster_size: usize, upgrades: &UpgradeSet) -> Decimal {
    let slots = (roster_size as f64 * 0.6 * 2.0).floor() as i64;
    let mut reserve = usd(100_000) + usd(50_000) * Decimal::from(slots);
    if upgrades.has(Upgrade::FollowOnReserveBoost) {
        reserve += usd(200_000);
    }
    reserve
}

fn turn_limit(profile: &DifficultyProfile, upgrades: &UpgradeSet) -> u32 {
    if upgrades.has(Upgrade::SpeedMode) {
        30
    } else if upgrades.has(Upgrade::EnduranceMode) {
        120
    } else {
        profile.max_turns
    }
}

/// The whole game, owned in one place. Every mutation goes through a method.
#[derive(Clone, Debug)]
pub struct GameState {
    pub(crate) player_name: String,
    pub(crate) firm_name: String,
    pub(crate) difficulty: Difficulty,
    pub(crate) profile: DifficultyProfile,
    pub(crate) upgrades: UpgradeSet,
    pub(crate) config: EngineConfig,
    pub(crate) reputation: VCReputation,
    pub(crate) companies: CompanyTable,
    pub(crate) portfolio: Portfolio,
    pub(crate) ai_funds: Vec<AiFund>,
    pub(crate) events: EventQueue,
    pub(crate) event_pool: EventPool,
    pub(crate) board_votes: Vec<BoardVote>,
    pub(crate) secondary: SecondaryMarket,
    pub(crate) value_add: ValueAddLedger,
    pub(crate) follow_on_decisions: BTreeSet<CompanyId>,
    pub(crate) gate: TurnGate,
    pub(crate) insurance_used: Option<CompanyId>,
    pub(crate) ai_deployed: bool,
    pub(crate) initial_reserve: Decimal,
    pub(crate) rng: ChaCha8Rng,
}

impl GameState {
    pub fn new_game(setup: GameSetup) -> Self {
        let GameSetup {
            player_name,
            firm_name,
            difficulty,
            upgrades,
            reputation,
            roster,
            event_pool,
            config,
            seed,
            schedule_events,
        } = setup;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let (upgrades, unknown) = UpgradeSet::resolve(upgrades);
        for id in unknown {
            warn!(upgrade = %id, "ignoring unknown upgrade");
        }
        let reputation = reputation.unwrap_or_else(|| VCReputation::new(player_name.clone()));
        let profile = difficulty.profile();
        let max_turns = turn_limit(&profile, &upgrades);

        let roster = match roster {
            RosterSource::Fixed(startups) => startups,
            RosterSource::Catalog(catalog) => {
                let mut size = config.roster_size;
                if upgrades.has(Upgrade::EarlyAccess) {
                    size += 2;
                }
                if upgrades.has(Upgrade::FounderNetwork) {
                    size += 1;
                }
                draw_roster(&mut rng, &catalog, &reputation, &RosterPolicy::pre_seed(size))
            }
        };
        if let Err(e) = validate_roster(&roster) {
            warn!(error = %e, "roster failed validation");
        }

        let mut fund_size = profile.starting_cash;
        if upgrades.has(Upgrade::FundBooster) {
            fund_size = scale(fund_size, 1.1);
        }
        if upgrades.has(Upgrade::AngelInvestor) {
            fund_size += usd(100_000);
        }
        let reserve = follow_on_reserve(roster.len(), &upgrades);
        let mut fee_rate = config.management_fee_rate;
        if upgrades.has(Upgrade::ManagementFeeReduction) {
            fee_rate *= 0.75;
        }

        let mut portfolio = Portfolio::new(HolderId::Player, fund_size, reserve, max_turns);
        portfolio.annual_fee_rate = fee_rate;

        let ai_funds = config
            .ai_funds
            .iter()
            .enumerate()
            .filter_map(|(i, cfg)| {
                let Ok(index) = u8::try_from(i) else {
                    warn!(firm = %cfg.firm, "AI fund roster is full; fund ignored");
                    return None;
                };
                let mut fund = AiFund::new(index, cfg.clone(), profile.starting_cash, reserve, max_turns);
                fund.portfolio.annual_fee_rate = config.management_fee_rate;
                Some(fund)
            })
            .collect::<Vec<_>>();

        let companies = CompanyTable::from_roster(roster);
        let events = if schedule_events {
            schedule_all(&mut rng, &companies, difficulty, max_turns)
        } else {
            EventQueue::default()
        };

        let firm_name = firm_name.unwrap_or_else(|| default_firm_name(&player_name));
        info!(
            player = %player_name,
            firm = %firm_name,
            %difficulty,
            companies = companies.len(),
            funds = ai_funds.len(),
            %fund_size,
            %reserve,
            max_turns,
            "new game"
        );

        Self {
            player_name,
            firm_name,
            difficulty,
            profile,
            upgrades,
            config,
            reputation,
            companies,
            portfolio,
            ai_funds,
            events,
            event_pool,
            board_votes: Vec::new(),
            secondary: SecondaryMarket::default(),
            value_add: ValueAddLedger::default(),
            follow_on_decisions: BTreeSet::new(),
            gate: TurnGate::default(),
            insurance_used: None,
            ai_deployed: false,
            initial_reserve: reserve,
            rng,
        }
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn firm_name(&self) -> &str {
        &self.firm_name
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn upgrades(&self) -> &UpgradeSet {
        &self.upgrades
    }

    pub fn reputation(&self) -> &VCReputation {
        &self.reputation
    }

    pub fn companies(&self) -> &CompanyTable {
        &self.companies
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn ai_funds(&self) -> &[AiFund] {
        &self.ai_funds
    }

    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    pub fn board_votes(&self) -> &[BoardVote] {
        &self.board_votes
    }

    pub fn secondary_offers(&self) -> &SecondaryMarket {
        &self.secondary
    }

    pub fn turn(&self) -> u32 {
        self.portfolio.turn
    }

    pub fn max_turns(&self) -> u32 {
        self.portfolio.max_turns
    }

    pub fn phase(&self) -> TurnPhase {
        self.gate.phase()
    }

    pub fn is_game_over(&self) -> bool {
        self.portfolio.turn > self.portfolio.max_turns
    }

    /// Capital committed at game start: fund plus follow-on reserve.
    pub fn committed_capital(&self) -> Decimal {
        self.portfolio.fund_size + self.initial_reserve
    }

    /// The player's current equity percent in `company`.
    pub fn player_equity(&self, company: CompanyId) -> f64 {
        self.companies
            .get(company)
            .map(|c| c.cap_table.equity_of(HolderId::Player))
            .unwrap_or(0.0)
    }

    /// Add an event to the queue. Events for past turns never fire.
    pub fn schedule_event(&mut self, event: ScheduledEvent) {
        self.events.push(event);
        self.gate.invalidate();
    }

    pub(crate) fn refresh_net_worths(&mut self) {
        self.portfolio.refresh_net_worth(&self.companies);
        for fund in self.ai_funds.iter_mut() {
            fund.portfolio.refresh_net_worth(&self.companies);
        }
    }

    pub(crate) fn pending_follow_ons(&self) -> usize {
        self.follow_on_opportunities().len()
    }

    /// Whether any holder with a board seat at `company` must weigh in, and whether the player
    /// is one of them.
    pub(crate) fn board_presence(&self, company: CompanyId) -> (bool, bool) {
        let player = self
            .portfolio
            .find(company)
            .map_or(false, |i| i.has_board_seat());
        let ai = self.ai_funds.iter().any(|f| {
            f.portfolio
                .find(company)
                .map_or(false, |i| i.has_board_seat())
        });
        (player, ai)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(n: usize) -> Vec<Startup> {
        (0..n)
            .map(|i| Startup::new(format!("Co{i}"), "SaaS", usd(1_000_000), 0.5, 0.5))
            .collect()
    }

    #[test]
    fn reserve_scales_with_roster() {
        let none = UpgradeSet::default();
        assert_eq!(follow_on_reserve(15, &none), usd(100_000) + usd(50_000) * Decimal::from(18));
        let (boost, _) = UpgradeSet::resolve(["follow_on_reserve_boost"]);
        assert_eq!(follow_on_reserve(0, &boost), usd(300_000));
    }

    #[test]
    fn upgrades_shape_the_fund() {
        let setup = GameSetup::new("Ada Lovelace", Difficulty::Medium, RosterSource::Fixed(roster(3)))
            .with_upgrades(["fund_booster", "angel_investor", "speed_mode", "bogus"]);
        let game = GameState::new_game(setup);
        assert_eq!(game.portfolio().cash, usd(650_000));
        assert_eq!(game.max_turns(), 30);
        assert_eq!(game.firm_name(), "Lovelace Ventures");
        assert_eq!(game.turn(), 1);
        assert!(!game.is_game_over());
    }

    #[test]
    fn catalog_roster_honours_size_upgrades() {
        let catalog = StartupCatalog::from_startups(roster(30));
        let setup = GameSetup::new("Ada", Difficulty::Easy, RosterSource::Catalog(catalog))
            .with_upgrades(["early_access", "founder_network"]);
        let game = GameState::new_game(setup);
        assert_eq!(game.companies().len(), 18);
        assert_eq!(game.ai_funds().len(), 3);
    }

    #[test]
    fn oversized_ai_roster_is_capped_at_holder_ids() {
        let funds = (0..300)
            .map(|i| vc_core::AiFundConfig::new(&format!("Fund {i}"), "Crowd Capital", vc_core::StrategyKind::Balanced, 0.5))
            .collect();
        let config = vc_core::EngineConfig {
            ai_funds: funds,
            ..vc_core::EngineConfig::default()
        };
        let game = GameState::new_game(
            GameSetup::new("Ada", Difficulty::Easy, RosterSource::Fixed(roster(3))).with_config(config),
        );
        assert_eq!(game.ai_funds().len(), 256);
        assert_eq!(game.ai_funds()[255].holder(), HolderId::Fund(255));
    }
}
