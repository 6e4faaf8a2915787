//! Search behaviour on concrete positions.

use duel_chess::evaluation::{evaluate, mate_score};
use duel_chess::{EngineConfig, GameStatus, MoveGenerator, Position, SearchEngine, Strategy};

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

fn engine(depth: u32, seed: u64) -> SearchEngine {
    SearchEngine::new(EngineConfig {
        depth,
        seed: Some(seed),
        verify_unmake: true,
        ..EngineConfig::default()
    })
}

fn search(fen: &str, depth: u32, seed: u64) -> duel_chess::SearchResult {
    let position = Position::from_fen(fen).unwrap();
    let moves = MoveGenerator::new().legal_moves(&position);
    engine(depth, seed).choose_move(&position, &moves).unwrap()
}

#[test]
fn depth_one_score_is_static_eval_of_chosen_child() {
    let position = Position::startpos();
    let moves = MoveGenerator::new().legal_moves(&position);
    assert_eq!(moves.len(), 20);

    let result = engine(1, 3).choose_move(&position, &moves).unwrap();
    let best = result.best_move.unwrap();
    assert!(moves.contains(&best));

    let mut child = position.clone();
    child.apply(&best).unwrap();
    assert_eq!(result.score, evaluate(&child));

    let max = moves
        .iter()
        .map(|mv| {
            let mut child = position.clone();
            child.apply(mv).unwrap();
            evaluate(&child)
        })
        .max()
        .unwrap();
    assert_eq!(result.score, max);
}

#[test]
fn finds_back_rank_mate() {
    for depth in 2..=3 {
        let result = search("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1", depth, 1);
        assert_eq!(result.best_move.unwrap().to_uci(), "a1a8");
        assert_eq!(result.score, mate_score(depth - 1));
    }
}

#[test]
fn finds_back_rank_mate_for_black() {
    let result = search("r5k1/8/8/8/8/8/5PPP/6K1 b - - 0 1", 2, 1);
    assert_eq!(result.best_move.unwrap().to_uci(), "a8a1");
    assert_eq!(result.score, mate_score(1));
}

#[test]
fn prefers_quicker_mate() {
    // Qb8 mates at once; slower mates score lower
    let result = search("7k/8/6K1/8/8/8/8/1Q6 w - - 0 1", 3, 7);
    assert_eq!(result.best_move.unwrap().to_uci(), "b1b8");
    assert_eq!(result.score, mate_score(2));
}

#[test]
fn captures_hanging_queen() {
    for depth in 1..=3 {
        let result = search("4k3/8/8/3q4/8/8/3R4/4K3 w - - 0 1", depth, 2);
        assert_eq!(result.best_move.unwrap().to_uci(), "d2d5", "depth {}", depth);
    }
}

#[test]
fn stalemate_yields_no_move() {
    let position = Position::from_fen("k7/8/1Q6/8/8/8/8/1K6 b - - 0 1").unwrap();
    let generator = MoveGenerator::new();
    let moves = generator.legal_moves(&position);
    assert!(moves.is_empty());
    assert_eq!(generator.game_status(&position, &moves), GameStatus::Stalemate);

    let result = engine(3, 1).choose_move(&position, &moves).unwrap();
    assert_eq!(result.best_move, None);
    assert_eq!(result.score, 0);
}

#[test]
fn pruning_never_changes_the_decision() {
    let fens = [
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        KIWIPETE,
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5Q2/PPPP1PPP/RNB1K1NR w KQkq - 4 4",
    ];
    for fen in fens {
        let position = Position::from_fen(fen).unwrap();
        let moves = MoveGenerator::new().legal_moves(&position);
        for depth in 1..=3 {
            let pruned = engine(depth, 99).choose_move(&position, &moves).unwrap();
            let mut minimax = SearchEngine::new(EngineConfig {
                depth,
                seed: Some(99),
                pruning: false,
                ..EngineConfig::default()
            });
            let full = minimax.choose_move(&position, &moves).unwrap();

            assert_eq!(pruned.best_move, full.best_move, "{} depth {}", fen, depth);
            assert_eq!(pruned.score, full.score, "{} depth {}", fen, depth);
            assert!(pruned.nodes <= full.nodes);
        }
    }
}

#[test]
fn pruning_visits_fewer_nodes() {
    let position = Position::from_fen(KIWIPETE).unwrap();
    let moves = MoveGenerator::new().legal_moves(&position);
    let pruned = engine(3, 5).choose_move(&position, &moves).unwrap();
    let full = SearchEngine::new(EngineConfig {
        depth: 3,
        seed: Some(5),
        pruning: false,
        ..EngineConfig::default()
    })
    .choose_move(&position, &moves)
    .unwrap();
    assert!(pruned.nodes < full.nodes);
}

#[test]
fn seeded_search_is_deterministic() {
    let a = search(KIWIPETE, 2, 42);
    let b = search(KIWIPETE, 2, 42);
    assert_eq!(a, b);
}

#[test]
fn random_strategy_varies_with_seed() {
    let position = Position::startpos();
    let moves = MoveGenerator::new().legal_moves(&position);
    let mut chosen = std::collections::HashSet::new();
    for seed in 0..20 {
        let mut engine = SearchEngine::new(EngineConfig {
            strategy: Strategy::Random,
            seed: Some(seed),
            ..EngineConfig::default()
        });
        let mv = engine.choose_move(&position, &moves).unwrap().best_move.unwrap();
        assert!(moves.contains(&mv));
        chosen.insert(mv);
    }
    assert!(chosen.len() > 1);
}

#[test]
fn deadline_returns_a_fully_evaluated_move() {
    let position = Position::startpos();
    let moves = MoveGenerator::new().legal_moves(&position);
    let mut engine = SearchEngine::new(EngineConfig {
        depth: 4,
        seed: Some(8),
        move_time_ms: Some(1),
        ..EngineConfig::default()
    });
    let result = engine.choose_move(&position, &moves).unwrap();
    assert!(result.stopped);
    assert!(moves.contains(&result.best_move.unwrap()));
}

#[test]
fn search_leaves_position_untouched() {
    let position = Position::from_fen(KIWIPETE).unwrap();
    let snapshot = position.clone();
    let moves = MoveGenerator::new().legal_moves(&position);
    engine(3, 4).choose_move(&position, &moves).unwrap();
    assert_eq!(position, snapshot);
}
