use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use leagues_terminal::filter::{FilterCriteria, SportSetMemo, apply_filter, derive_sport_set};
use leagues_terminal::league_fetch::parse_leagues_json;
use leagues_terminal::state::{League, LeagueList};

const SPORTS: [&str; 8] = [
    "Soccer",
    "Basketball",
    "Ice Hockey",
    "Motorsport",
    "American Football",
    "Baseball",
    "Rugby",
    "Tennis",
];

fn synthetic_leagues(n: usize) -> Vec<League> {
    (0..n)
        .map(|i| League {
            id: (4000 + i).to_string(),
            name: format!("Synthetic Premier League {i}"),
            sport: SPORTS[i % SPORTS.len()].to_string(),
            alternate_name: format!("SPL{i}"),
        })
        .collect()
}

fn leagues_json(n: usize) -> String {
    let rows: Vec<String> = synthetic_leagues(n)
        .iter()
        .map(|l| {
            format!(
                r#"{{"idLeague":"{}","strLeague":"{}","strSport":"{}","strLeagueAlternate":"{}"}}"#,
                l.id, l.name, l.sport, l.alternate_name
            )
        })
        .collect();
    format!(r#"{{"leagues":[{}]}}"#, rows.join(","))
}

fn bench_leagues_parse(c: &mut Criterion) {
    let raw = leagues_json(5_000);
    c.bench_function("leagues_parse", |b| {
        b.iter(|| {
            let leagues = parse_leagues_json(black_box(&raw)).expect("valid json");
            black_box(leagues.len());
        })
    });
}

fn bench_sport_set(c: &mut Criterion) {
    let leagues = synthetic_leagues(5_000);
    c.bench_function("derive_sport_set", |b| {
        b.iter(|| black_box(derive_sport_set(black_box(&leagues))))
    });
}

fn bench_sport_set_memo(c: &mut Criterion) {
    let list: LeagueList = Arc::new(synthetic_leagues(5_000));
    let mut memo = SportSetMemo::new();
    c.bench_function("sport_set_memo_hit", |b| {
        b.iter(|| black_box(memo.sync(black_box(&list)).len()))
    });
}

fn bench_filter(c: &mut Criterion) {
    let leagues = synthetic_leagues(5_000);
    let by_name = FilterCriteria::new("premier league 42", None);
    let both = FilterCriteria::new("premier", Some("Basketball"));
    c.bench_function("filter_by_name", |b| {
        b.iter(|| black_box(apply_filter(black_box(&leagues), &by_name).len()))
    });
    c.bench_function("filter_by_name_and_sport", |b| {
        b.iter(|| black_box(apply_filter(black_box(&leagues), &both).len()))
    });
}

criterion_group!(
    perf,
    bench_leagues_parse,
    bench_sport_set,
    bench_sport_set_memo,
    bench_filter
);
criterion_main!(perf);
