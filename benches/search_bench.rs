use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use duel_chess::{EngineConfig, MoveGenerator, Position, SearchEngine};

struct BenchCase {
    name: &'static str,
    fen: &'static str,
}

const CASES: &[BenchCase] = &[
    BenchCase {
        name: "startpos",
        fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    },
    BenchCase {
        name: "kiwipete",
        fen: "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    },
    BenchCase {
        name: "position_3",
        fen: "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    },
];

fn bench_perft(c: &mut Criterion) {
    let generator = MoveGenerator::new();
    let mut group = c.benchmark_group("perft");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(5));

    for case in CASES {
        let position = Position::from_fen(case.fen).expect("valid benchmark FEN");
        let depth = 3;
        group.throughput(Throughput::Elements(generator.perft(&position, depth)));
        group.bench_with_input(BenchmarkId::new(case.name, depth), &position, |b, pos| {
            b.iter(|| generator.perft(black_box(pos), depth))
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.sample_size(10);

    for case in CASES {
        let position = Position::from_fen(case.fen).expect("valid benchmark FEN");
        let moves = MoveGenerator::new().legal_moves(&position);
        for depth in [2u32, 3] {
            let config = EngineConfig {
                depth,
                seed: Some(1),
                verify_unmake: false,
                ..EngineConfig::default()
            };
            group.bench_with_input(BenchmarkId::new(case.name, depth), &position, |b, pos| {
                let mut engine = SearchEngine::new(config.clone());
                b.iter(|| engine.choose_move(black_box(pos), &moves).expect("search succeeds"))
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_perft, bench_search);
criterion_main!(benches);
