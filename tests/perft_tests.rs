use outpost::board::Board;
use outpost::moves::execute::{generate_legal, make_move, unmake_move};
use outpost::moves::magic::loader::magic_tables;
use outpost::moves::perft::{PerftCounters, perft, perft_divide, perft_with_breakdown};
use outpost::moves::types::MoveList;
use std::str::FromStr;

const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
const KIWI_FEN: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
// Promotion-heavy middlegame, both sides one move from queening.
const PROMOTION_FEN: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";

fn board_from(fen: &str) -> Board {
    let mut b = Board::new();
    b.keep_repetitions = false;
    b.set_fen(fen).expect("valid test FEN");
    b
}

fn run_depth(fen: &str, depth: u32, expected_nodes: u64) {
    use std::time::Instant;
    let tables = magic_tables();
    let mut board = board_from(fen);

    let start = Instant::now();
    let nodes = perft(&mut board, tables, depth);
    let secs = start.elapsed().as_secs_f64().max(1e-9);
    println!(
        "d{depth}: nodes={nodes} time={secs:.3}s nps={}",
        (nodes as f64 / secs) as u64
    );

    assert_eq!(
        nodes, expected_nodes,
        "perft mismatch at depth {depth} for {fen}"
    );
}

#[test]
fn perft_startpos_d1() {
    run_depth("startpos", 1, 20);
}

#[test]
fn perft_startpos_d2() {
    run_depth("startpos", 2, 400);
}

#[test]
fn perft_startpos_d3() {
    run_depth("startpos", 3, 8_902);
}

#[test]
fn perft_startpos_d4() {
    run_depth("startpos", 4, 197_281);
}

#[test]
fn perft_startpos_d5() {
    run_depth("startpos", 5, 4_865_609);
}

#[test]
#[ignore] // heavy; opt in with --ignored
fn perft_startpos_d6() {
    run_depth("startpos", 6, 119_060_324);
}

#[test]
fn perft_promotion_position_d4() {
    run_depth(PROMOTION_FEN, 4, 2_103_487);
}

#[test]
fn perft_empty_board_has_no_moves() {
    run_depth("8/8/8/8/8/8/8/8 w - - 0 1", 1, 0);
}

#[test]
fn kingless_boards_count_and_classify_without_panicking() {
    // A lone knight: two moves at depth 1, and Black has no reply at all.
    run_depth("8/8/8/8/8/8/8/N7 w - - 0 1", 1, 2);
    run_depth("8/8/8/8/8/8/8/N7 w - - 0 1", 2, 0);

    let out = breakdown("8/8/8/8/8/8/8/N7 w - - 0 1", 1);
    assert_eq!(out.nodes, 2);
    assert_eq!(out.checks, 0);
    assert_eq!(out.checkmates, 0);
}

#[test]
fn perft_depth_zero_is_one_node() {
    run_depth("startpos", 0, 1);
}

/// Kiwipete: d1 = 48, d2 = 2,039, d3 = 97,862, d4 = 4,085,603.
#[test]
fn perft_kiwipete() {
    for (depth, expected) in [(1, 48u64), (2, 2_039), (3, 97_862), (4, 4_085_603)] {
        run_depth(KIWI_FEN, depth, expected);
    }
}

#[test]
fn perft_position_3() {
    for (depth, expected) in [(1, 14u64), (2, 191), (3, 2_812), (4, 43_238), (5, 674_624)] {
        run_depth(POSITION_3, depth, expected);
    }
}

#[test]
fn perft_one_equals_legal_move_count() {
    let tables = magic_tables();
    for fen in ["startpos", KIWI_FEN, POSITION_3, PROMOTION_FEN] {
        let mut board = board_from(fen);
        let mut legal = MoveList::new();
        let mut scratch = MoveList::new();
        generate_legal(&mut board, tables, &mut legal, &mut scratch);
        assert_eq!(perft(&mut board, tables, 1), legal.len() as u64, "{fen}");
    }
}

#[test]
fn divide_sums_to_perft_and_is_stable() {
    let tables = magic_tables();
    for (fen, depth) in [("startpos", 3u32), (KIWI_FEN, 2), (POSITION_3, 3)] {
        let mut board = board_from(fen);
        let rows = perft_divide(&mut board, tables, depth);
        let again = perft_divide(&mut board, tables, depth);
        assert_eq!(rows, again, "divide must be deterministic for {fen}");

        let total: u64 = rows.iter().map(|(_, n)| n).sum();
        assert_eq!(total, perft(&mut board, tables, depth), "{fen}");
    }
}

#[test]
fn divide_startpos_d2_rows() {
    let tables = magic_tables();
    let mut board = board_from("startpos");
    let rows = perft_divide(&mut board, tables, 2);
    assert_eq!(rows.len(), 20);
    // Every first move leaves Black the same twenty replies.
    assert!(rows.iter().all(|&(_, n)| n == 20));
}

fn breakdown(fen: &str, depth: u32) -> PerftCounters {
    let tables = magic_tables();
    let mut board = board_from(fen);
    let mut out = PerftCounters::zero();
    perft_with_breakdown(&mut board, tables, depth, &mut out);
    out
}

#[test]
fn stats_startpos_d3() {
    let out = breakdown(START_FEN, 3);
    assert_eq!(out.nodes, 8_902);
    assert_eq!(out.captures, 34);
    assert_eq!(out.ep_captures, 0);
    assert_eq!(out.castles, 0);
    assert_eq!(out.promotions, 0);
    assert_eq!(out.checks, 12);
    assert_eq!(out.discovery_checks, 0);
    assert_eq!(out.double_checks, 0);
    assert_eq!(out.checkmates, 0);
}

#[test]
fn stats_startpos_d4() {
    let out = breakdown(START_FEN, 4);
    assert_eq!(out.nodes, 197_281);
    assert_eq!(out.captures, 1_576);
    assert_eq!(out.checks, 469);
    assert_eq!(out.checkmates, 8);
}

#[test]
fn stats_kiwipete_d2() {
    let out = breakdown(KIWI_FEN, 2);
    assert_eq!(out.nodes, 2_039);
    assert_eq!(out.captures, 351);
    assert_eq!(out.ep_captures, 1);
    assert_eq!(out.castles, 91);
    assert_eq!(out.promotions, 0);
    assert_eq!(out.checks, 3);
    assert_eq!(out.checkmates, 0);
}

#[test]
fn stats_kiwipete_d3() {
    let out = breakdown(KIWI_FEN, 3);
    assert_eq!(out.nodes, 97_862);
    assert_eq!(out.captures, 17_102);
    assert_eq!(out.ep_captures, 45);
    assert_eq!(out.castles, 3_162);
    assert_eq!(out.checks, 993);
    assert_eq!(out.checkmates, 1);
}

#[test]
fn stats_position_3_d4_classifies_discoveries() {
    let out = breakdown(POSITION_3, 4);
    assert_eq!(out.nodes, 43_238);
    assert_eq!(out.captures, 3_348);
    assert_eq!(out.ep_captures, 123);
    assert_eq!(out.castles, 0);
    assert_eq!(out.promotions, 0);
    assert_eq!(out.checks, 1_680);
    assert_eq!(out.discovery_checks, 106);
    assert_eq!(out.double_checks, 0);
    assert_eq!(out.checkmates, 17);
}

#[test]
fn stats_position_3_d5_counts_double_checks() {
    let out = breakdown(POSITION_3, 5);
    assert_eq!(out.nodes, 674_624);
    assert_eq!(out.captures, 52_051);
    assert_eq!(out.ep_captures, 1_165);
    assert_eq!(out.checks, 52_950);
    assert_eq!(out.discovery_checks, 1_292);
    assert_eq!(out.double_checks, 3);
    assert_eq!(out.checkmates, 0);
}

#[test]
fn stats_leave_repetition_toggle_as_found() {
    let tables = magic_tables();
    let mut board = Board::new();
    assert!(board.keep_repetitions);
    let mut out = PerftCounters::zero();
    perft_with_breakdown(&mut board, tables, 2, &mut out);
    assert!(board.keep_repetitions, "toggle must be restored after stats");
    assert_eq!(out.nodes, 400);
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

#[test]
fn random_walks_keep_hash_parity() {
    let tables = magic_tables();
    let fens = [
        START_FEN,
        KIWI_FEN,
        POSITION_3,
        "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1",
        "4k3/P7/8/8/8/8/8/4K3 w - - 0 1",
    ];
    for &seed0 in &[1u64, 2, 3, 42, 99] {
        for fen in fens {
            let mut board = board_from(fen);
            let mut seed = seed0;
            for _ply in 0..200 {
                assert_eq!(board.zobrist, board.compute_zobrist_full());

                let mut moves = MoveList::new();
                let mut scratch = MoveList::new();
                generate_legal(&mut board, tables, &mut moves, &mut scratch);
                if moves.is_empty() {
                    break;
                }

                seed = splitmix64(seed);
                let mv = moves[(seed as usize) % moves.len()];

                let undo = make_move(&mut board, mv);
                assert_eq!(board.zobrist, board.compute_zobrist_full());
                unmake_move(&mut board, mv, undo);
                assert_eq!(board.zobrist, board.compute_zobrist_full());

                // walk one ply deeper
                make_move(&mut board, mv);
            }
            board.validate().expect("board stayed consistent");
        }
    }
}

#[test]
fn perft_accepts_board_parsed_via_fromstr() {
    let tables = magic_tables();
    let mut board = Board::from_str(START_FEN).unwrap();
    board.keep_repetitions = false;
    assert_eq!(perft(&mut board, tables, 2), 400);
}
