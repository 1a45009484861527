#![deny(warnings)]

//! Headless auto-play driver: builds a game from the asset files, plays it to the end with a
//! simple policy and prints the final standings.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::EnvFilter;
use vc_catalog::{load_config, EventPool, StartupCatalog};
use vc_core::money::{format_usd, scale, usd};
use vc_core::{CompanyId, Difficulty, DiligenceLevel, EngineConfig};
use vc_runtime::{
    recommend, BoardDecision, GameSetup, GameState, Recommendation, RosterSource, ValueAddKind,
};

/// Positions opened on the first turn.
const OPENING_POSITIONS: usize = 5;

struct Args {
    difficulty: Difficulty,
    seed: u64,
    assets: PathBuf,
    player: String,
    upgrades: Vec<String>,
    log_turns: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        difficulty: Difficulty::Medium,
        seed: 42,
        assets: PathBuf::from("assets"),
        player: "Auto Player".to_string(),
        upgrades: Vec::new(),
        log_turns: false,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--difficulty" => {
                if let Some(d) = it.next() {
                    args.difficulty = d.parse().map_err(anyhow::Error::msg)?;
                }
            }
            "--seed" => args.seed = it.next().and_then(|s| s.parse().ok()).unwrap_or(args.seed),
            "--assets" => {
                if let Some(p) = it.next() {
                    args.assets = PathBuf::from(p);
                }
            }
            "--player" => {
                if let Some(p) = it.next() {
                    args.player = p;
                }
            }
            "--upgrades" => {
                args.upgrades = it
                    .next()
                    .map(|s| {
                        s.split(',')
                            .map(|u| u.trim().to_string())
                            .filter(|u| !u.is_empty())
                            .collect()
                    })
                    .unwrap_or_default();
            }
            "--log-turns" => args.log_turns = true,
            _ => {}
        }
    }
    Ok(args)
}

fn build_game(args: &Args) -> Result<GameState> {
    let config = match load_config(args.assets.join("config.yaml")) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(error = %e, "config unavailable, using defaults");
            EngineConfig::default()
        }
    };
    let catalog = StartupCatalog::load_or_empty(args.assets.join("startups.json"));
    anyhow::ensure!(!catalog.is_empty(), "no startups found under {}", args.assets.display());
    let pool = EventPool::load_or_empty(args.assets.join("events.json"));

    let setup = GameSetup::new(args.player.clone(), args.difficulty, RosterSource::Catalog(catalog))
        .with_config(config)
        .with_event_pool(pool)
        .with_upgrades(args.upgrades.iter().cloned())
        .with_seed(args.seed);
    Ok(GameState::new_game(setup))
}

/// Diligence the most promising startups and back those that come out clean.
fn open_positions(game: &mut GameState) {
    let mut ranked: Vec<(CompanyId, f64)> = game
        .companies()
        .iter()
        .filter(|c| c.is_active())
        .map(|c| (c.id, c.startup.growth_potential - c.startup.risk_score))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let min = game.config().min_investment;
    let max_stake = game.config().max_stake_fraction;
    let mut opened = 0;
    for (id, _) in ranked {
        if opened >= OPENING_POSITIONS {
            break;
        }
        let index = id.index();
        match game.perform_due_diligence(index, DiligenceLevel::Standard) {
            Ok(report) if report.recommends_passing() => {
                info!(company = %id, red_flags = report.red_flags(), "passing after diligence");
                continue;
            }
            Ok(_) => {}
            Err(e) => debug!(company = %id, error = %e, "diligence skipped"),
        }
        let valuation = game.companies().valuation_of(id);
        let cheque = scale(valuation, max_stake).min(usd(75_000));
        if cheque < min {
            continue;
        }
        match game.make_investment(index, cheque) {
            Ok(()) => opened += 1,
            Err(e) => warn!(company = %id, error = %e, "investment rejected"),
        }
    }
}

/// Take every affordable follow-on in positions of 5% or more; decline the rest.
fn decide_follow_ons(game: &mut GameState) -> Result<()> {
    for opp in game.follow_on_opportunities() {
        let capacity = game.portfolio().follow_on_capacity();
        if opp.current_equity >= 5.0
            && opp.min_amount <= capacity
            && game.make_follow_on_investment(opp.company, opp.min_amount).is_ok()
        {
            continue;
        }
        game.decline_follow_on(opp.company)
            .with_context(|| format!("declining follow-on in {}", opp.company_name))?;
    }
    Ok(())
}

/// Sell acquisitions above water, refuse down rounds.
fn cast_votes(game: &mut GameState) -> Result<()> {
    while let Some(vote) = game.board_votes().first().cloned() {
        let choice = match vote.decision {
            BoardDecision::Acquisition { multiple, .. } if multiple >= 1.0 => "accept",
            BoardDecision::Acquisition { .. } => "reject",
            BoardDecision::DownRound { .. } => "reject",
        };
        let resolution = game
            .process_board_vote(0, choice)
            .with_context(|| format!("voting on {}", vote.title))?;
        println!("  [vote] {}: {}", vote.company_name, resolution.text);
    }
    Ok(())
}

fn review_secondary_offers(game: &mut GameState) -> Result<()> {
    let sell: Vec<usize> = game
        .secondary_offers()
        .offers()
        .iter()
        .enumerate()
        .filter_map(|(i, offer)| {
            let inv = game.portfolio().find(offer.company)?;
            let valuation = game.companies().valuation_of(offer.company);
            match recommend(offer, inv, valuation) {
                (Recommendation::Sell, reason) => {
                    info!(company = %offer.company_name, reason, "taking secondary offer");
                    Some(i)
                }
                (Recommendation::Hold, _) => None,
            }
        })
        .collect();
    for i in sell.into_iter().rev() {
        let offer = game.accept_secondary_offer(i)?;
        println!(
            "  [secondary] sold {} to {} for {}",
            offer.company_name,
            offer.buyer_firm,
            format_usd(offer.offer_amount)
        );
    }
    Ok(())
}

/// One recruiting push per turn for the largest position, while cash is comfortable.
fn lend_a_hand(game: &mut GameState) {
    if game.portfolio().cash < usd(250_000) {
        return;
    }
    let target = game
        .portfolio()
        .investments
        .iter()
        .map(|inv| (inv.company, game.player_equity(inv.company)))
        .max_by(|a, b| a.1.total_cmp(&b.1));
    if let Some((company, _)) = target {
        if let Err(e) = game.provide_value_add(company, ValueAddKind::Recruiting.id()) {
            debug!(%company, error = %e, "value-add skipped");
        }
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let args = parse_args()?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        git = env!("GIT_SHA"),
        built = env!("BUILD_DATE"),
        difficulty = %args.difficulty,
        seed = args.seed,
        "starting auto-play"
    );

    let mut game = build_game(&args)?;
    println!(
        "{} of {} | {} | fund {} | {} turns | {} startups",
        game.player_name(),
        game.firm_name(),
        game.difficulty(),
        format_usd(game.portfolio().fund_size),
        game.max_turns(),
        game.companies().len()
    );

    open_positions(&mut game);
    while !game.is_game_over() {
        cast_votes(&mut game)?;
        decide_follow_ons(&mut game)?;
        review_secondary_offers(&mut game)?;
        lend_a_hand(&mut game);
        let report = game.process_turn()?;
        if args.log_turns {
            for entry in report.entries.iter() {
                println!("  [turn {}] {}", entry.turn, entry.message);
            }
        }
    }

    println!("\nLeaderboard");
    for (rank, entry) in game.leaderboard().iter().enumerate() {
        println!(
            "{:>2}. {:<18} {:<20} {:>10} {:>+8.1}%{}",
            rank + 1,
            entry.name,
            entry.firm,
            format_usd(entry.net_worth),
            entry.roi,
            if entry.is_player { "  <- you" } else { "" }
        );
    }

    let score = game.final_score();
    println!(
        "\nFinal net worth {} (carry {}) | ROI {:+.1}% | successful exits {}",
        format_usd(score.net_worth),
        format_usd(score.carry),
        score.roi,
        score.successful_exits
    );

    let record = game.score_record(chrono::Utc::now());
    println!("{}", serde_json::to_string_pretty(&record)?);
    let reputation = game.updated_reputation();
    println!("{}", serde_json::to_string_pretty(&reputation)?);
    Ok(())
}
