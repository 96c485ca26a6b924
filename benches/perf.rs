use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};

use ladder_digest::fake_provider::FakeProvider;
use ladder_digest::model::{PlayerHistory, PlayerProfile};
use ladder_digest::orchestrator::{extract_facts, score_facts};
use ladder_digest::provider::StatsProvider;
use ladder_digest::selection::{SelectionParams, select_top_facts};

fn anchor() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
}

fn sample_players(n: usize, matches: usize) -> Vec<(PlayerProfile, PlayerHistory)> {
    let fake = FakeProvider::new(anchor()).with_matches_per_player(matches);
    (0..n)
        .map(|i| {
            let profile = fake
                .search_player(&format!("Player{i}#{}", 1000 + i))
                .unwrap()
                .unwrap();
            let history = fake.player_history(profile.members.character.id).unwrap();
            (profile, history)
        })
        .collect()
}

fn bench_extraction(c: &mut Criterion) {
    let players = sample_players(1, 200);
    let (profile, history) = &players[0];
    let cutoff = anchor() - TimeDelta::days(30);
    c.bench_function("extract_facts_200_matches", |b| {
        b.iter(|| black_box(extract_facts(profile, history, cutoff)))
    });
}

fn bench_scoring(c: &mut Criterion) {
    let players = sample_players(20, 60);
    let cutoff = anchor() - TimeDelta::days(30);
    let facts: Vec<_> = players
        .iter()
        .flat_map(|(p, h)| extract_facts(p, h, cutoff))
        .collect();
    c.bench_function("score_facts_20_players", |b| {
        b.iter(|| black_box(score_facts(facts.clone())))
    });
}

fn bench_selection(c: &mut Criterion) {
    let players = sample_players(40, 60);
    let cutoff = anchor() - TimeDelta::days(30);
    let scored = score_facts(
        players
            .iter()
            .flat_map(|(p, h)| extract_facts(p, h, cutoff))
            .collect(),
    );
    let params = SelectionParams::default();
    c.bench_function("select_top_facts_40_players", |b| {
        b.iter(|| black_box(select_top_facts(scored.clone(), &params)))
    });
}

criterion_group!(benches, bench_extraction, bench_scoring, bench_selection);
criterion_main!(benches);
