use rust_decimal::Decimal;
use vc_catalog::StartupCatalog;
use vc_core::money::{percent_of, usd};
use vc_core::{
    AcquisitionEvent, CompanyId, CrisisEvent, CrisisKind, Difficulty, DueDiligence, EngineConfig,
    FundingRoundEvent, InvestmentTerms, RoundStage, ScheduledEvent, Severity, Startup,
};
use vc_runtime::{
    FollowOnError, GameSetup, GameState, LogCategory, RosterSource, TurnError, TurnPhase,
};

fn roster() -> Vec<Startup> {
    vec![
        Startup::new("Ledgerly", "FinTech", usd(1_000_000), 0.4, 0.7),
        Startup::new("Orbital", "SpaceTech", usd(2_000_000), 0.7, 0.8),
        Startup::new("Sprout", "AgTech", usd(800_000), 0.5, 0.5),
    ]
}

fn quiet_config() -> EngineConfig {
    EngineConfig {
        ai_funds: vec![],
        management_fee_rate: 0.0,
        ..EngineConfig::default()
    }
}

/// No AI funds, no fees, no pre-scheduled events.
fn solo_game(difficulty: Difficulty, seed: u64) -> GameState {
    GameState::new_game(
        GameSetup::new("Ada Lovelace", difficulty, RosterSource::Fixed(roster()))
            .with_config(quiet_config())
            .with_seed(seed)
            .without_scheduled_events(),
    )
}

fn round_now(company: u32, raise: i64) -> ScheduledEvent {
    ScheduledEvent::Round(FundingRoundEvent {
        company: CompanyId(company),
        stage: RoundStage::Seed,
        turn: 1,
        raise: usd(raise),
        down_round: false,
    })
}

fn down_round_at(company: u32, turn: u32, raise: i64) -> ScheduledEvent {
    ScheduledEvent::Round(FundingRoundEvent {
        company: CompanyId(company),
        stage: RoundStage::Seed,
        turn,
        raise: usd(raise),
        down_round: true,
    })
}

fn acquisition_now(company: u32, due_diligence: DueDiligence) -> ScheduledEvent {
    ScheduledEvent::Acquisition(AcquisitionEvent {
        company: CompanyId(company),
        turn: 1,
        offer_multiple: 4.0,
        due_diligence,
    })
}

/// Accept every vote and decline every follow-on, then advance.
fn auto_play_turn(game: &mut GameState) -> Result<(), TurnError> {
    while !game.board_votes().is_empty() {
        game.process_board_vote(0, "accept").unwrap();
    }
    for opp in game.follow_on_opportunities() {
        game.decline_follow_on(opp.company).unwrap();
    }
    game.process_turn().map(|_| ())
}

#[test]
fn common_stock_entry_takes_plain_percentage() {
    let mut game = solo_game(Difficulty::Medium, 1);
    game.make_investment_with_terms(0, usd(50_000), InvestmentTerms::common())
        .unwrap();
    assert_eq!(game.portfolio().cash, usd(450_000));
    assert_eq!(game.player_equity(CompanyId(0)), 5.0);
}

#[test]
fn declined_round_halves_ten_percent_stake() {
    let mut game = solo_game(Difficulty::Easy, 2);
    game.make_investment(0, usd(100_000)).unwrap();
    game.schedule_event(round_now(0, 1_000_000));

    assert_eq!(game.process_turn(), Err(TurnError::FollowOnsPending(1)));
    assert_eq!(game.phase(), TurnPhase::AwaitingFollowOns);
    game.decline_follow_on(CompanyId(0)).unwrap();
    assert_eq!(game.phase(), TurnPhase::Ready);

    let report = game.process_turn().unwrap();
    assert!((game.player_equity(CompanyId(0)) - 5.0).abs() < 1e-9);
    assert_eq!(report.of(LogCategory::Round).count(), 1);
}

#[test]
fn follow_on_is_not_diluted_by_its_own_round() {
    let mut game = solo_game(Difficulty::Easy, 3);
    game.make_investment(0, usd(100_000)).unwrap();
    game.schedule_event(round_now(0, 1_000_000));
    game.make_follow_on_investment(CompanyId(0), usd(100_000))
        .unwrap();
    assert!((game.player_equity(CompanyId(0)) - 10.0).abs() < 1e-9);

    game.process_turn().unwrap();
    assert!((game.player_equity(CompanyId(0)) - 10.0).abs() < 1e-9);
    assert_eq!(game.portfolio().investments[0].amount_invested, usd(200_000));
}

#[test]
fn follow_on_after_pending_down_round_is_diluted_once() {
    let mut game = solo_game(Difficulty::Easy, 11);
    game.make_investment(0, usd(100_000)).unwrap();
    game.schedule_event(down_round_at(0, 1, 400_000));
    game.schedule_event(ScheduledEvent::Round(FundingRoundEvent {
        company: CompanyId(0),
        stage: RoundStage::SeriesA,
        turn: 2,
        raise: usd(1_000_000),
        down_round: false,
    }));

    game.process_turn().unwrap();
    assert_eq!(game.board_votes().len(), 1);
    // the open vote still moves the price, so the next round waits for it
    assert!(game.follow_on_opportunities().is_empty());
    assert_eq!(
        game.make_follow_on_investment(CompanyId(0), usd(10_000)),
        Err(FollowOnError::NoOpportunity(CompanyId(0)))
    );

    game.process_board_vote(0, "accept").unwrap();
    assert_eq!(game.phase(), TurnPhase::AwaitingFollowOns);
    let opp = game.follow_on_opportunities().remove(0);
    assert_eq!(opp.pre_money, game.companies().valuation_of(CompanyId(0)));

    game.make_follow_on_investment(CompanyId(0), usd(10_000))
        .unwrap();
    let committed = game.player_equity(CompanyId(0));
    assert!((committed - percent_of(usd(110_000), opp.post_money)).abs() < 1e-9);

    game.process_turn().unwrap();
    assert!((game.player_equity(CompanyId(0)) - committed).abs() < 1e-9);
}

#[test]
fn rejected_down_round_bridges_three_turns_after_the_round() {
    let rejected = (0..64u64).find_map(|seed| {
        let mut game = solo_game(Difficulty::Easy, seed);
        game.make_investment(0, usd(100_000)).unwrap();
        game.schedule_event(down_round_at(0, 1, 400_000));
        game.process_turn().unwrap();
        let resolution = game.process_board_vote(0, "reject").unwrap();
        (!resolution.passed).then_some(game)
    });
    let game = rejected.expect("some seed rejects the down round");

    let bridges: Vec<FundingRoundEvent> = game
        .events()
        .iter()
        .filter_map(|e| match e {
            ScheduledEvent::Round(r) if r.stage == RoundStage::Bridge => Some(r.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(bridges.len(), 1);
    assert_eq!(bridges[0].turn, 4);
    assert_eq!(bridges[0].raise, usd(200_000));
    assert!(!bridges[0].down_round);
}

#[test]
fn portfolio_insurance_covers_one_down_round() {
    let mut game = GameState::new_game(
        GameSetup::new("Ada Lovelace", Difficulty::Easy, RosterSource::Fixed(roster()))
            .with_config(quiet_config())
            .with_upgrades(["portfolio_insurance"])
            .with_seed(12)
            .without_scheduled_events(),
    );
    game.make_investment(0, usd(50_000)).unwrap();
    game.schedule_event(down_round_at(0, 1, 300_000));
    game.schedule_event(down_round_at(0, 2, 300_000));
    let entry = game.player_equity(CompanyId(0));

    let report = game.process_turn().unwrap();
    assert!((game.player_equity(CompanyId(0)) - entry).abs() < 1e-9);
    assert!(report
        .of(LogCategory::DownRound)
        .any(|e| e.message.contains("protected by portfolio insurance")));

    let report = game.process_turn().unwrap();
    assert!(game.player_equity(CompanyId(0)) < entry);
    assert!(report
        .of(LogCategory::DownRound)
        .all(|e| !e.message.contains("portfolio insurance")));
}

#[test]
fn negative_news_is_sent_once_per_holding() {
    let mut game = solo_game(Difficulty::Easy, 13);
    game.make_investment(0, usd(50_000)).unwrap();
    game.schedule_event(ScheduledEvent::Crisis(CrisisEvent {
        company: CompanyId(0),
        turn: 1,
        kind: CrisisKind::Lawsuit,
        severity: Severity::Moderate,
        impact: 0.5,
    }));

    let report = game.process_turn().unwrap();
    assert_eq!(report.of(LogCategory::Crisis).count(), 1);
    assert_eq!(report.of(LogCategory::News).count(), 1);
    let report = game.process_turn().unwrap();
    assert_eq!(report.of(LogCategory::News).count(), 0);
}

#[test]
fn failed_diligence_acquisition_pays_nothing() {
    let mut game = solo_game(Difficulty::Easy, 4);
    game.make_investment(0, usd(100_000)).unwrap();
    game.schedule_event(acquisition_now(0, DueDiligence::Bad));
    let cash = game.portfolio().cash;

    let report = game.process_turn().unwrap();
    assert_eq!(game.portfolio().cash, cash);
    assert!(game.portfolio().holds(CompanyId(0)));
    assert!(game.board_votes().is_empty());
    assert!(game.portfolio().exits.is_empty());
    assert_eq!(report.of(LogCategory::Acquisition).count(), 1);
}

#[test]
fn entry_bounds_are_inclusive_and_exact() {
    let mut game = solo_game(Difficulty::Easy, 5);
    assert!(game.make_investment(2, usd(160_001)).is_err());
    assert!(game.make_investment(2, usd(9_999)).is_err());
    game.make_investment(2, usd(160_000)).unwrap();
    assert_eq!(game.player_equity(CompanyId(2)), 20.0);
    game.make_investment(1, usd(10_000)).unwrap();
    assert_eq!(game.player_equity(CompanyId(1)), 0.5);
}

#[test]
fn board_votes_block_the_turn_until_resolved() {
    let mut game = solo_game(Difficulty::Easy, 6);
    game.make_investment(0, usd(100_000)).unwrap();
    game.schedule_event(acquisition_now(0, DueDiligence::Good));

    game.process_turn().unwrap();
    assert_eq!(game.board_votes().len(), 1);
    assert_eq!(game.phase(), TurnPhase::AwaitingBoardVotes);
    assert_eq!(game.process_turn(), Err(TurnError::BoardVotesPending(1)));

    let resolution = game.process_board_vote(0, "accept").unwrap();
    // two or three other directors plus the player
    assert!((3..=4).contains(&(resolution.votes_for + resolution.votes_against)));
    assert!(game.board_votes().is_empty());
    assert_eq!(game.phase(), TurnPhase::Ready);
    assert!(game.process_turn().is_ok());
}

#[test]
fn vote_outcomes_are_reproducible_by_seed() {
    let play = |seed| {
        let mut game = solo_game(Difficulty::Hard, seed);
        game.make_investment(0, usd(100_000)).unwrap();
        game.schedule_event(acquisition_now(0, DueDiligence::Normal));
        game.process_turn().unwrap();
        let resolution = game.process_board_vote(0, "reject").unwrap();
        (resolution, game.portfolio().cash)
    };
    assert_eq!(play(42), play(42));
    assert_eq!(play(7), play(7));
}

#[test]
fn vote_on_missing_seat_or_index_is_refused() {
    let mut game = solo_game(Difficulty::Easy, 8);
    assert!(game.process_board_vote(0, "accept").is_err());
    game.make_investment(0, usd(100_000)).unwrap();
    game.schedule_event(acquisition_now(0, DueDiligence::Good));
    game.process_turn().unwrap();
    assert!(game.process_board_vote(0, "perhaps").is_err());
    assert_eq!(game.board_votes().len(), 1);
}

#[test]
fn secondary_offers_expire_after_three_passes() {
    let config = EngineConfig {
        secondary_offer_chance: 1.0,
        management_fee_rate: 0.0,
        ..EngineConfig::default()
    };
    let mut game = GameState::new_game(
        GameSetup::new("Ada", Difficulty::Easy, RosterSource::Fixed(roster()))
            .with_config(config)
            .with_seed(9)
            .without_scheduled_events(),
    );
    game.make_investment(0, usd(50_000)).unwrap();

    let mut offered_on = None;
    for _ in 0..12 {
        auto_play_turn(&mut game).unwrap();
        if !game.secondary_offers().is_empty() {
            offered_on = Some(game.turn());
            break;
        }
    }
    assert!(offered_on.is_some(), "no offer after a year of holding");
    assert_eq!(game.secondary_offers().offers()[0].expires_in, 3);

    game.process_turn().unwrap();
    assert_eq!(game.secondary_offers().offers()[0].expires_in, 2);
    game.process_turn().unwrap();
    assert_eq!(game.secondary_offers().offers()[0].expires_in, 1);
    let report = game.process_turn().unwrap();
    assert!(report
        .of(LogCategory::Secondary)
        .any(|e| e.message.contains("has expired")));
}

#[test]
fn accepting_a_secondary_offer_books_the_exit() {
    let config = EngineConfig {
        secondary_offer_chance: 1.0,
        management_fee_rate: 0.0,
        ..EngineConfig::default()
    };
    let mut game = GameState::new_game(
        GameSetup::new("Ada", Difficulty::Easy, RosterSource::Fixed(roster()))
            .with_config(config)
            .with_seed(10)
            .without_scheduled_events(),
    );
    game.make_investment(1, usd(50_000)).unwrap();
    while game.secondary_offers().is_empty() && !game.is_game_over() {
        auto_play_turn(&mut game).unwrap();
    }
    let cash = game.portfolio().cash;
    let offer = game.accept_secondary_offer(0).unwrap();
    assert_eq!(game.portfolio().cash, cash + offer.offer_amount);
    assert!(!game.portfolio().holds(CompanyId(1)));
    assert_eq!(game.player_equity(CompanyId(1)), 0.0);
    assert_eq!(game.portfolio().exits.len(), 1);
}

#[test]
fn game_ends_after_the_last_turn() {
    let mut game = GameState::new_game(
        GameSetup::new("Ada", Difficulty::Medium, RosterSource::Fixed(roster()))
            .with_config(quiet_config())
            .with_upgrades(["speed_mode"])
            .without_scheduled_events(),
    );
    for _ in 0..30 {
        game.process_turn().unwrap();
    }
    assert!(game.is_game_over());
    assert_eq!(game.process_turn(), Err(TurnError::GameOver));
    assert_eq!(game.score_record(chrono::Utc::now()).turns_played, 30);
}

#[test]
fn untouched_fund_scores_zero() {
    let game = solo_game(Difficulty::Medium, 11);
    let score = game.final_score();
    assert_eq!(score.net_worth, game.committed_capital());
    assert_eq!(score.roi, 0.0);
    assert_eq!(score.carry, Decimal::ZERO);
    assert_eq!(score.successful_exits, 0);
}

#[test]
fn full_game_with_catalog_and_rivals() {
    let startups = (0..30)
        .map(|i| {
            Startup::new(
                format!("Startup {i}"),
                ["FinTech", "SaaS", "BioTech"][i % 3],
                usd(1_000_000 + 100_000 * i as i64),
                0.3 + 0.02 * (i % 10) as f64,
                0.5 + 0.03 * (i % 10) as f64,
            )
        })
        .collect();
    let mut game = GameState::new_game(
        GameSetup::new("Ada Lovelace", Difficulty::Medium, RosterSource::Catalog(StartupCatalog::from_startups(startups)))
            .with_seed(2024),
    );
    assert_eq!(game.companies().len(), 15);
    for i in 0..4 {
        let _ = game.make_investment(i, usd(50_000));
    }
    while !game.is_game_over() {
        auto_play_turn(&mut game).unwrap();
    }
    assert_eq!(game.turn(), 61);

    let board = game.leaderboard();
    assert_eq!(board.len(), 4);
    assert!(board.windows(2).all(|w| w[0].net_worth >= w[1].net_worth));
    assert_eq!(board.iter().filter(|e| e.is_player).count(), 1);

    let score = game.final_score();
    assert!(score.roi.is_finite());
    assert!(score.net_worth >= Decimal::ZERO);
    let rep = game.updated_reputation();
    assert_eq!(rep.total_games_played, 1);
    assert!((0.0..=100.0).contains(&rep.market_score));
}
