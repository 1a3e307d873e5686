use crate::board::Board;
use crate::moves::execute::generate_legal;
use crate::moves::magic::MagicTables;
use crate::moves::square_control::in_check;
use crate::moves::types::MoveList;

/// Game-level classification layered on top of the core. Generation never
/// adjudicates draws itself; this is the collaborator view of the clocks and
/// repetition state the board maintains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InPlay,
    DrawThreefold,
    DrawFiftyMove,
    Stalemate,
    Checkmate,
}

pub fn is_draw_by_threefold(board: &Board) -> bool {
    board.is_threefold()
}

pub fn is_draw_by_fifty_move(board: &Board) -> bool {
    board.halfmove_clock >= 100
}

/// Status of the current position. Claimable draws take priority over
/// move-based outcomes, mirroring how a host would adjudicate.
pub fn position_status(board: &mut Board, tables: &MagicTables) -> GameStatus {
    if is_draw_by_threefold(board) {
        return GameStatus::DrawThreefold;
    }
    if is_draw_by_fifty_move(board) {
        return GameStatus::DrawFiftyMove;
    }

    let mut legal = MoveList::new();
    let mut scratch = MoveList::new();
    generate_legal(board, tables, &mut legal, &mut scratch);
    if legal.is_empty() {
        if in_check(board, board.side_to_move, tables) {
            GameStatus::Checkmate
        } else {
            GameStatus::Stalemate
        }
    } else {
        GameStatus::InPlay
    }
}
