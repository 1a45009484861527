//! One atomic turn: every scheduled and stochastic effect, in a fixed order.

use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use tracing::{debug, info};
use vc_ai::plan_initial_allocations;
use vc_core::money::{format_usd, percent_of, ratio, scale, stake_value};
use vc_core::{
    AcquisitionEvent, CompanyId, CrisisEvent, DueDiligence, ExitKind, ExitRecord,
    FundingRoundEvent, HolderId, Investment, InvestmentTerms, Portfolio, RoundStage,
    ScheduledEvent, Upgrade, UpgradeSet, CompanyStatus,
};
use vc_econ::reputation::founder_trust_bonus;
use vc_econ::{acquisition_offer, advance_financials, close_round, entry_equity, random_walk_factor, RoundPricing};

use crate::board::BoardVote;
use crate::error::TurnError;
use crate::founders::{founder_name, initial_relationship, roll_relationship_event};
use crate::report::{LogCategory, TurnReport};
use crate::scheduler::DueEvents;
use crate::state::GameState;

/// Turns after a rejected down round before the bridge round closes.
pub const BRIDGE_DELAY: u32 = 3;

/// Fee-waiver upgrade covers the first year.
const FEE_WAIVER_TURNS: u32 = 12;

/// Live holdings marked at this multiple of entry valuation count as successful exits.
pub const PAPER_EXIT_MULTIPLE: i64 = 5;

fn negative_news_reason(category: &str, roll: usize) -> &'static str {
    let reasons: &[&'static str] = match category {
        "FinTech" | "Financial" => &[
            "Regulatory scrutiny increased compliance costs",
            "Competition from established banks intensified",
            "Market saturation slowed customer acquisition",
        ],
        "BioTech" | "HealthTech" | "MedTech" => &[
            "Clinical trial delays extended the timeline to market",
            "Regulatory approval took longer than expected",
            "A competitor launched a similar product first",
        ],
        "CleanTech" | "GreenTech" | "Energy" => &[
            "Policy changes reduced government incentives",
            "Raw material costs increased unexpectedly",
            "Market adoption was slower than projected",
        ],
        "EdTech" => &[
            "School budget cuts reduced institutional sales",
            "User retention came in below expectations",
        ],
        "Robotics" | "Hardware" | "IoT" => &[
            "Supply chain disruptions delayed production",
            "Manufacturing costs exceeded estimates",
        ],
        "Security" | "Cybersecurity" => &[
            "A high-profile breach damaged the company's reputation",
            "Enterprise sales cycles lengthened",
        ],
        _ => &[
            "Customer acquisition costs rose faster than revenue",
            "Key hires took longer than planned",
            "A larger competitor entered the market",
        ],
    };
    reasons[roll % reasons.len()]
}

/// Turn a bridge round closes after a down round due on `round_turn` is rejected while the game
/// stands at `current_turn`.
pub fn bridge_turn(round_turn: u32, current_turn: u32) -> u32 {
    (round_turn + BRIDGE_DELAY).max(current_turn + 1)
}

impl GameState {
    /// Advance the game by one turn.
    ///
    /// Refuses while follow-on decisions or board votes are outstanding, and once the game is
    /// over. Returns everything that happened, in order.
    pub fn process_turn(&mut self) -> Result<TurnReport, TurnError> {
        if self.is_game_over() {
            return Err(TurnError::GameOver);
        }
        let follow_ons = self.pending_follow_ons();
        self.gate.evaluate(follow_ons, self.board_votes.len())?;

        let turn = self.portfolio.turn;
        let mut report = TurnReport::new(turn);
        if !self.ai_deployed {
            self.deploy_ai_funds(&mut report);
        }
        self.charge_management_fees(&mut report);
        self.process_funding_rounds(turn, &mut report);
        self.process_crises(turn, &mut report);
        self.process_acquisitions(turn, &mut report);
        self.apply_market_drift(&mut report);
        self.apply_value_add_effects(&mut report);
        self.check_negative_news(&mut report);
        self.founder_relationship_events(&mut report);
        self.age_holdings();
        self.secondary_market_pass(&mut report);

        self.portfolio.turn += 1;
        for fund in self.ai_funds.iter_mut() {
            fund.portfolio.turn += 1;
        }
        self.follow_on_decisions.clear();
        self.value_add.new_turn();
        self.refresh_net_worths();
        self.gate.turn_finished(self.board_votes.len());
        info!(
            turn,
            entries = report.entries.len(),
            net_worth = %format_usd(self.portfolio.net_worth),
            pending_votes = self.board_votes.len(),
            "turn processed"
        );
        Ok(report)
    }

    /// Turn-1 deployment for every AI fund.
    fn deploy_ai_funds(&mut self, report: &mut TurnReport) {
        self.ai_deployed = true;
        let min = self.config.min_investment;
        let max_stake = self.config.max_stake_fraction;
        let threshold = self.config.board_seat_threshold;
        let turn = self.portfolio.turn;
        for idx in 0..self.ai_funds.len() {
            let plan = plan_initial_allocations(&mut self.rng, &self.ai_funds[idx], &self.companies, min, max_stake);
            let holder = self.ai_funds[idx].holder();
            let mut placed = 0;
            for alloc in plan {
                let Some(company) = self.companies.get_mut(alloc.company) else {
                    continue;
                };
                let terms = InvestmentTerms::preferred(alloc.amount, threshold, &UpgradeSet::default());
                let Ok(equity) = entry_equity(alloc.amount, company.valuation(), &terms, max_stake * 100.0, false) else {
                    continue;
                };
                if company.cap_table.add_stake(holder, equity).is_err() {
                    debug!(company = company.name(), %holder, "no room on cap table");
                    continue;
                }
                let relationship = initial_relationship(&mut self.rng, &terms, false, alloc.amount);
                let investment = Investment {
                    company: alloc.company,
                    company_name: company.name().to_string(),
                    category: company.startup.category.clone(),
                    amount_invested: alloc.amount,
                    initial_equity: equity,
                    entry_valuation: company.valuation(),
                    entry_turn: turn,
                    terms,
                    founder_name: founder_name(&mut self.rng),
                    relationship_score: relationship,
                    last_interaction: turn,
                    months_held: 0,
                    follow_on_round: None,
                    negative_news_sent: false,
                };
                let fund = &mut self.ai_funds[idx];
                fund.portfolio.cash -= alloc.amount;
                fund.portfolio.investments.push(investment);
                placed += 1;
            }
            let fund = &self.ai_funds[idx];
            report.push(
                LogCategory::AiFund,
                None,
                format!(
                    "{} ({}) invested in {placed} companies",
                    fund.config.name, fund.config.firm
                ),
            );
        }
    }

    fn charge_fee(portfolio: &mut Portfolio) -> Decimal {
        let fee = scale(portfolio.fund_size, portfolio.annual_fee_rate / 12.0);
        if fee <= Decimal::ZERO || portfolio.cash < fee {
            return Decimal::ZERO;
        }
        portfolio.cash -= fee;
        portfolio.fees_paid += fee;
        fee
    }

    fn charge_management_fees(&mut self, report: &mut TurnReport) {
        let turn = self.portfolio.turn;
        let waived = self.upgrades.has(Upgrade::FeeWaiver) && turn <= FEE_WAIVER_TURNS;
        if !waived {
            let fee = Self::charge_fee(&mut self.portfolio);
            if fee > Decimal::ZERO && turn % 12 == 0 {
                report.push(
                    LogCategory::Fees,
                    None,
                    format!(
                        "Management fees this year: {} (total {})",
                        format_usd(fee * Decimal::from(12)),
                        format_usd(self.portfolio.fees_paid)
                    ),
                );
            }
        }
        for fund in self.ai_funds.iter_mut() {
            Self::charge_fee(&mut fund.portfolio);
        }
    }

    fn process_funding_rounds(&mut self, turn: u32, report: &mut TurnReport) {
        for round in self.events.rounds_due(turn) {
            let Some(company) = self.companies.get(round.company).filter(|c| c.is_active()) else {
                continue;
            };
            if !round.down_round {
                let pre_money = company.valuation();
                self.close_priced_round(&round, pre_money, report);
                continue;
            }
            let factor = self.rng.gen_range(0.6..=0.9);
            let pre_money = scale(company.valuation(), factor);
            let name = company.name().to_string();
            let vote = BoardVote::down_round(&name, round.clone(), pre_money);
            match self.board_presence(round.company) {
                (true, _) => {
                    report.push(
                        LogCategory::BoardVote,
                        Some(&name),
                        format!("{name} proposes a down round. Board vote required: {}", vote.title),
                    );
                    self.board_votes.push(vote);
                }
                (false, true) => {
                    let passed = self.resolve_without_player(&vote, report);
                    self.execute_vote(vote, passed, report);
                }
                (false, false) => self.close_down_round(&round, pre_money, report),
            }
        }
    }

    /// Holders skipped by this round's dilution pass, and whether insurance was spent on it.
    fn dilution_exclusions(&mut self, round: &FundingRoundEvent) -> (BTreeSet<HolderId>, bool) {
        let mut excluded = BTreeSet::new();
        let mut insured = false;
        if let Some(inv) = self.portfolio.find(round.company) {
            if inv.follow_on_round == Some(round.key()) {
                excluded.insert(HolderId::Player);
            } else if round.down_round
                && self.upgrades.has(Upgrade::PortfolioInsurance)
                && self.insurance_used.is_none()
            {
                self.insurance_used = Some(round.company);
                excluded.insert(HolderId::Player);
                insured = true;
            }
        }
        (excluded, insured)
    }

    /// Close a round at `pre_money` through the dilution engine.
    pub(crate) fn close_priced_round(&mut self, round: &FundingRoundEvent, pre_money: Decimal, report: &mut TurnReport) {
        let (excluded, insured) = self.dilution_exclusions(round);
        let Some(company) = self.companies.get_mut(round.company) else {
            return;
        };
        let before = company.cap_table.equity_of(HolderId::Player);
        let pricing = RoundPricing {
            name: round.name(),
            turn: round.turn,
            pre_money,
            raise: round.raise,
            down_round: round.down_round,
        };
        let dilution = close_round(company, &pricing, &excluded);
        let after = company.cap_table.equity_of(HolderId::Player);
        let name = company.name().to_string();
        if let Some(inv) = self.portfolio.find_mut(round.company) {
            if inv.follow_on_round == Some(round.key()) {
                inv.follow_on_round = None;
            }
            let category = if round.down_round {
                LogCategory::DownRound
            } else {
                LogCategory::Round
            };
            let mut msg = format!(
                "{name} raised {} in a {} at {} pre-money. Your equity: {before:.2}% -> {after:.2}%",
                format_usd(round.raise),
                pricing.name,
                format_usd(pre_money)
            );
            if insured {
                msg.push_str(" (protected by portfolio insurance)");
            }
            report.push(category, Some(&name), msg);
        }
        debug!(company = %name, factor = dilution.factor, post_money = %dilution.new_post_money, "round closed");
    }

    pub(crate) fn close_down_round(&mut self, round: &FundingRoundEvent, pre_money: Decimal, report: &mut TurnReport) {
        self.close_priced_round(round, pre_money, report);
    }

    /// A rejected down round becomes a smaller bridge round `BRIDGE_DELAY` turns after the
    /// round was due, whoever resolved the vote. A turn already past is bumped to the next one.
    pub(crate) fn schedule_bridge(&mut self, round: &FundingRoundEvent, report: &mut TurnReport) {
        let turn = bridge_turn(round.turn, self.portfolio.turn);
        let name = self
            .companies
            .get(round.company)
            .map(|c| c.name().to_string())
            .unwrap_or_default();
        if turn > self.portfolio.max_turns {
            return;
        }
        let bridge = FundingRoundEvent {
            company: round.company,
            stage: RoundStage::Bridge,
            turn,
            raise: (round.raise / Decimal::TWO).floor(),
            down_round: false,
        };
        if self.portfolio.holds(round.company) {
            report.push(
                LogCategory::DownRound,
                Some(&name),
                format!(
                    "Down round for {name} rejected; the company will seek {} in bridge financing on turn {turn}",
                    format_usd(bridge.raise)
                ),
            );
        }
        self.events.push(ScheduledEvent::Round(bridge));
    }

    fn process_crises(&mut self, turn: u32, report: &mut TurnReport) {
        let crises: Vec<CrisisEvent> = self
            .events
            .due(turn)
            .into_iter()
            .filter_map(|e| match e {
                ScheduledEvent::Crisis(c) => Some(c),
                _ => None,
            })
            .collect();
        for crisis in crises {
            let Some(company) = self.companies.get_mut(crisis.company).filter(|c| c.is_active()) else {
                continue;
            };
            let before = company.valuation();
            company.set_valuation(scale(before, crisis.impact));
            let after = company.valuation();
            if self.portfolio.holds(crisis.company) {
                report.push(
                    LogCategory::Crisis,
                    Some(company.name()),
                    format!(
                        "{}: {} ({:?}). Valuation {} -> {}",
                        company.name(),
                        crisis.kind.headline(crisis.severity),
                        crisis.severity,
                        format_usd(before),
                        format_usd(after)
                    ),
                );
            }
        }
    }

    fn process_acquisitions(&mut self, turn: u32, report: &mut TurnReport) {
        let offers: Vec<AcquisitionEvent> = self
            .events
            .due(turn)
            .into_iter()
            .filter_map(|e| match e {
                ScheduledEvent::Acquisition(a) => Some(a),
                _ => None,
            })
            .collect();
        for event in offers {
            let Some(company) = self.companies.get(event.company).filter(|c| c.is_active()) else {
                continue;
            };
            let name = company.name().to_string();
            let offer = acquisition_offer(&company.startup.financials, company.valuation(), event.offer_multiple);
            if event.due_diligence == DueDiligence::Bad {
                if self.portfolio.holds(event.company) {
                    report.push(
                        LogCategory::Acquisition,
                        Some(&name),
                        format!("Acquisition of {name} fell through: the buyer's due diligence found problems"),
                    );
                }
                continue;
            }
            let payout = self.player_payout(event.company, offer);
            let vote = BoardVote::acquisition(event.company, &name, turn, offer, event.offer_multiple, payout);
            match self.board_presence(event.company) {
                (true, _) => {
                    report.push(
                        LogCategory::BoardVote,
                        Some(&name),
                        format!("{name} received an acquisition offer. Board vote required: {}", vote.title),
                    );
                    self.board_votes.push(vote);
                }
                (false, true) => {
                    let passed = self.resolve_without_player(&vote, report);
                    self.execute_vote(vote, passed, report);
                }
                (false, false) => self.execute_acquisition(event.company, offer, report),
            }
        }
    }

    fn settle_exit(portfolio: &mut Portfolio, company: CompanyId, equity: f64, offer: Decimal, turn: u32) -> Option<ExitRecord> {
        let inv = portfolio.take(company)?;
        let proceeds = stake_value(equity, offer);
        portfolio.cash += proceeds;
        let record = ExitRecord {
            company,
            company_name: inv.company_name,
            kind: ExitKind::Acquisition,
            turn,
            invested: inv.amount_invested,
            proceeds,
        };
        portfolio.exits.push(record.clone());
        Some(record)
    }

    /// Pay every holder `equity × offer` and retire the company.
    pub(crate) fn execute_acquisition(&mut self, company: CompanyId, offer: Decimal, report: &mut TurnReport) {
        let turn = self.portfolio.turn;
        let Some(state) = self.companies.get_mut(company) else {
            return;
        };
        let name = state.name().to_string();
        let player_equity = state.cap_table.equity_of(HolderId::Player);
        if let Some(exit) = Self::settle_exit(&mut self.portfolio, company, player_equity, offer, turn) {
            let multiple = ratio(exit.proceeds, exit.invested);
            report.push(
                LogCategory::Acquisition,
                Some(&name),
                format!(
                    "{name} acquired for {}! Your {player_equity:.2}% = {} ({multiple:.1}x return)",
                    format_usd(offer),
                    format_usd(exit.proceeds)
                ),
            );
        }
        for fund in self.ai_funds.iter_mut() {
            let equity = state.cap_table.equity_of(fund.holder());
            Self::settle_exit(&mut fund.portfolio, company, equity, offer, turn);
        }
        state.cap_table.clear();
        state.set_valuation(offer);
        state.status = CompanyStatus::Acquired;
        info!(company = %name, offer = %format_usd(offer), "company acquired");

        self.secondary.remove_company(company);
        self.board_votes.retain(|v| v.company != company);
    }

    /// Random walk or a pooled market event, once per company, plus a month of financials.
    fn apply_market_drift(&mut self, report: &mut TurnReport) {
        let frequency = self.profile.event_frequency;
        let volatility = self.profile.volatility;
        for company in self.companies.iter_mut().filter(|c| c.is_active()) {
            let held = self.portfolio.holds(company.id);
            let before = company.valuation();
            let pooled = if self.rng.gen::<f64>() < frequency {
                self.event_pool.events.choose(&mut self.rng)
            } else {
                None
            };
            let factor = match pooled {
                Some(event) => {
                    if held {
                        report.push(
                            LogCategory::Market,
                            Some(company.name()),
                            format!("{}: {} ({:+.0}%)", company.name(), event.event, (event.change - 1.0) * 100.0),
                        );
                    }
                    event.change
                }
                None => random_walk_factor(&mut self.rng, volatility),
            };
            company.set_valuation(scale(before, factor));
            advance_financials(&mut self.rng, &mut company.startup.financials);
            if !held {
                continue;
            }
            if !company.is_active() {
                report.push(
                    LogCategory::Market,
                    Some(company.name()),
                    format!("{} has failed and shut down", company.name()),
                );
            } else if before > Decimal::ZERO {
                let change = percent_of(company.valuation() - before, before);
                if change.abs() > 15.0 {
                    report.push(
                        LogCategory::Market,
                        Some(company.name()),
                        format!(
                            "{}: valuation {:+.1}% to {} (revenue {}/mo)",
                            company.name(),
                            change,
                            format_usd(company.valuation()),
                            format_usd(company.startup.financials.monthly_revenue)
                        ),
                    );
                }
            }
        }
    }

    fn check_negative_news(&mut self, report: &mut TurnReport) {
        for inv in self.portfolio.investments.iter_mut() {
            if inv.negative_news_sent {
                continue;
            }
            let valuation = self.companies.valuation_of(inv.company);
            if valuation >= inv.entry_valuation {
                continue;
            }
            inv.negative_news_sent = true;
            let reason = negative_news_reason(&inv.category, self.rng.gen_range(0..usize::MAX));
            report.push(
                LogCategory::News,
                Some(&inv.company_name),
                format!(
                    "{} is now valued below your entry ({} vs {}): {reason}",
                    inv.company_name,
                    format_usd(valuation),
                    format_usd(inv.entry_valuation)
                ),
            );
        }
    }

    fn founder_relationship_events(&mut self, report: &mut TurnReport) {
        if self.portfolio.investments.is_empty() || self.rng.gen::<f64>() >= self.config.relationship_event_chance {
            return;
        }
        let idx = self.rng.gen_range(0..self.portfolio.investments.len());
        let event = roll_relationship_event(&mut self.rng);
        let inv = &mut self.portfolio.investments[idx];
        inv.adjust_relationship(event.change);
        report.push(
            LogCategory::Founder,
            Some(&inv.company_name),
            format!(
                "{} ({}) {} [relationship {:.0}]",
                inv.founder_name, inv.company_name, event.description, inv.relationship_score
            ),
        );
    }

    fn age_holdings(&mut self) {
        let books = std::iter::once(&mut self.portfolio).chain(self.ai_funds.iter_mut().map(|f| &mut f.portfolio));
        for book in books {
            for inv in book.investments.iter_mut() {
                inv.months_held += 1;
                inv.follow_on_round = None;
            }
        }
    }

    /// Relationship bonus new founders extend to this player.
    pub fn founder_trust_bonus(&self) -> f64 {
        founder_trust_bonus(&self.reputation)
    }

    /// Live positions marked at or above five times their entry valuation.
    pub(crate) fn paper_exits(&self) -> u32 {
        self.portfolio
            .investments
            .iter()
            .filter(|inv| {
                self.companies.valuation_of(inv.company) >= inv.entry_valuation * Decimal::from(PAPER_EXIT_MULTIPLE)
            })
            .count() as u32
    }
}
