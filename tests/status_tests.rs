use outpost::board::Board;
use outpost::moves::execute::{make_move, parse_uci_move};
use outpost::moves::magic::loader::magic_tables;
use outpost::status::{GameStatus, position_status};
use std::str::FromStr;

fn board(fen: &str) -> Board {
    Board::from_str(fen).expect("valid test FEN")
}

fn play(b: &mut Board, uci: &str) {
    let mv = parse_uci_move(b, magic_tables(), uci).unwrap_or_else(|e| panic!("{uci}: {e}"));
    make_move(b, mv);
}

#[test]
fn fresh_game_is_in_play() {
    let mut b = Board::new();
    assert_eq!(position_status(&mut b, magic_tables()), GameStatus::InPlay);
}

#[test]
fn kingless_study_board_is_classified_not_panicked() {
    // No king for either side: the knight still has moves, nothing checks.
    let mut b = board("8/8/8/8/8/8/8/N7 w - - 0 1");
    assert_eq!(position_status(&mut b, magic_tables()), GameStatus::InPlay);
}

#[test]
fn fools_mate_is_checkmate() {
    let mut b = Board::new();
    for uci in ["f2f3", "e7e5", "g2g4", "d8h4"] {
        play(&mut b, uci);
    }
    assert_eq!(position_status(&mut b, magic_tables()), GameStatus::Checkmate);
}

#[test]
fn back_rank_mate_is_checkmate() {
    let mut b = board("6k1/5ppp/8/8/8/8/8/K3R3 w - - 0 1");
    play(&mut b, "e1e8");
    assert_eq!(position_status(&mut b, magic_tables()), GameStatus::Checkmate);
}

#[test]
fn cornered_king_with_no_moves_is_stalemate() {
    let mut b = board("k7/8/1Q6/8/8/8/8/4K3 b - - 0 1");
    assert_eq!(position_status(&mut b, magic_tables()), GameStatus::Stalemate);
}

#[test]
fn shuffling_kings_reach_threefold() {
    let mut b = board("4k3/8/8/8/8/8/8/4K3 w - - 0 1");
    for _ in 0..2 {
        for uci in ["e1d1", "e8d8", "d1e1", "d8e8"] {
            play(&mut b, uci);
        }
    }
    assert_eq!(
        position_status(&mut b, magic_tables()),
        GameStatus::DrawThreefold
    );
}

#[test]
fn hundred_reversible_plies_claim_the_fifty_move_draw() {
    let mut b = board("4k3/8/8/8/8/8/8/4K3 w - - 99 80");
    play(&mut b, "e1d1");
    assert_eq!(b.halfmove_clock, 100);
    assert_eq!(
        position_status(&mut b, magic_tables()),
        GameStatus::DrawFiftyMove
    );
}
