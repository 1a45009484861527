use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use vc_ai::{plan_initial_allocations, synthesize_votes, AiFund, GovernanceQuestion};
use vc_core::money::usd;
use vc_core::{AiFundConfig, CompanyTable, Startup, StrategyKind};

fn table(n: usize) -> CompanyTable {
    let roster = (0..n)
        .map(|i| {
            Startup::new(
                format!("Co{i}"),
                ["SaaS", "FinTech", "BioTech"][i % 3],
                usd(1_000_000 + 25_000 * i as i64),
                0.2 + 0.06 * (i % 10) as f64,
                0.3 + 0.07 * (i % 10) as f64,
            )
        })
        .collect();
    CompanyTable::from_roster(roster)
}

fn bench_allocations(c: &mut Criterion) {
    let companies = table(18);
    let fund = AiFund::new(
        0,
        AiFundConfig::new("Bench", "Bench Capital", StrategyKind::Balanced, 0.5),
        usd(500_000),
        usd(100_000),
        60,
    );
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    c.bench_function("plan_initial_allocations_18", |b| {
        b.iter(|| plan_initial_allocations(&mut rng, black_box(&fund), black_box(&companies), usd(10_000), 0.20))
    });
    c.bench_function("synthesize_votes", |b| {
        b.iter(|| synthesize_votes(&mut rng, black_box(GovernanceQuestion::DownRound)))
    });
}

criterion_group!(benches, bench_allocations);
criterion_main!(benches);
