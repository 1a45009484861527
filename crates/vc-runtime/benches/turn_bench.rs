use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use vc_catalog::StartupCatalog;
use vc_core::money::usd;
use vc_core::{Difficulty, Startup};
use vc_runtime::{GameSetup, GameState, RosterSource};

fn catalog() -> StartupCatalog {
    let startups = (0..40)
        .map(|i| {
            Startup::new(
                format!("Startup {i}"),
                ["FinTech", "SaaS", "CleanTech", "HealthTech"][i % 4],
                usd(750_000 + 50_000 * i as i64),
                0.3 + 0.05 * (i % 8) as f64,
                0.4 + 0.07 * (i % 8) as f64,
            )
        })
        .collect();
    StartupCatalog::from_startups(startups)
}

fn new_game(seed: u64) -> GameState {
    let mut game = GameState::new_game(
        GameSetup::new("Bench Player", Difficulty::Medium, RosterSource::Catalog(catalog())).with_seed(seed),
    );
    for i in 0..5 {
        let _ = game.make_investment(i, usd(100_000));
    }
    game
}

fn play_out(mut game: GameState) -> GameState {
    while !game.is_game_over() {
        while !game.board_votes().is_empty() {
            if game.process_board_vote(0, "accept").is_err() {
                break;
            }
        }
        for opp in game.follow_on_opportunities() {
            let _ = game.make_follow_on_investment(opp.company, opp.min_amount);
        }
        for opp in game.follow_on_opportunities() {
            let _ = game.decline_follow_on(opp.company);
        }
        if game.process_turn().is_err() {
            break;
        }
    }
    game
}

fn bench_full_game(c: &mut Criterion) {
    c.bench_function("full_game_60_turns", |b| {
        b.iter_batched(|| new_game(42), play_out, BatchSize::SmallInput)
    });
    c.bench_function("single_turn", |b| {
        b.iter_batched(
            || new_game(7),
            |mut game| {
                let _ = game.process_turn();
                game
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_full_game);
criterion_main!(benches);
