use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use opus_checkers::move_generator::MoveGenerator;
use opus_checkers::parallel_search::ParallelSearchEngine;
use opus_checkers::{Board, GameState, Player, SearchConfig, SearchEngine};

#[derive(Clone, Copy)]
struct BenchCase {
    name: &'static str,
    seed: u64,
    plies: usize,
}

const CASES: &[BenchCase] = &[
    BenchCase { name: "opening", seed: 0, plies: 0 },
    BenchCase { name: "early", seed: 3, plies: 8 },
    BenchCase { name: "middle", seed: 5, plies: 20 },
];

fn bench_perft(c: &mut Criterion) {
    let generator = MoveGenerator::default();
    let mut group = c.benchmark_group("perft");
    group.measurement_time(Duration::from_secs(5));

    for depth in 1..=6u32 {
        let mut board = Board::new();
        let nodes = generator.perft(&mut board, Player::Player1, depth);
        group.throughput(Throughput::Elements(nodes));
        group.bench_with_input(BenchmarkId::new("startpos", depth), &depth, |b, &depth| {
            let mut board = Board::new();
            b.iter(|| black_box(generator.perft(&mut board, Player::Player1, depth)));
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.sample_size(20);

    for case in CASES {
        let game = GameState::random_playout(case.seed, case.plies, true);
        for depth in [3u32, 5] {
            group.bench_with_input(BenchmarkId::new(case.name, depth), &depth, |b, &depth| {
                let mut engine = SearchEngine::new(SearchConfig::default());
                b.iter(|| black_box(engine.search(black_box(&game), depth)));
            });
        }
    }

    group.finish();
}

fn bench_parallel_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel_search");
    group.sample_size(10);

    let game = GameState::random_playout(5, 20, true);
    for threads in [1usize, 2, 4] {
        group.bench_with_input(BenchmarkId::new("depth6", threads), &threads, |b, &threads| {
            let mut engine = ParallelSearchEngine::new(SearchConfig::default(), threads);
            b.iter(|| black_box(engine.search(&game, 6)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_perft, bench_search, bench_parallel_search);
criterion_main!(benches);
