use crate::board::castle_bits::*;
use crate::board::error::MoveParseError;
use crate::board::{Board, Color, Piece};
use crate::hash::zobrist::zobrist_keys;
use crate::moves::magic::MagicTables;
use crate::moves::movegen::generate_pseudo_legal;
use crate::moves::square_control::{in_check, is_legal_castling};
use crate::moves::types::{Move, MoveBuffer, MoveKind, MoveList, NullUndo, Undo};
use crate::square::{Square, parse_square};

/// Rook relocation for a castling move, keyed by the king's landing square.
#[inline(always)]
pub(crate) fn rook_castle_squares(king_to: Square) -> (Square, Square) {
    match king_to.index() {
        6 => (Square::from_index(7), Square::from_index(5)), // White O-O
        2 => (Square::from_index(0), Square::from_index(3)), // White O-O-O
        62 => (Square::from_index(63), Square::from_index(61)), // Black O-O
        58 => (Square::from_index(56), Square::from_index(59)), // Black O-O-O
        _ => unreachable!("not a castling destination"),
    }
}

/// Which right dies when a rook leaves (or is captured on) a corner square.
#[inline(always)]
fn rights_lost_on_corner(sq: Square) -> CastleBits {
    match sq.index() {
        0 => CASTLE_WQ,  // a1
        7 => CASTLE_WK,  // h1
        56 => CASTLE_BQ, // a8
        63 => CASTLE_BK, // h8
        _ => 0,
    }
}

/// Apply `mv` to `board`. The returned undo record (also pushed on the
/// board's own stack) is the only way to reverse it. Every observable field
/// changes exactly as the move demands; the Zobrist key is maintained
/// incrementally, piece keys via `place`/`clear`, the rest here.
pub fn make_move(board: &mut Board, mv: Move) -> Undo {
    let keys = zobrist_keys();
    let color = board.side_to_move;
    debug_assert_eq!(mv.mover.color(), color, "move for the wrong side");

    let from = mv.from.to_dense();
    let to = mv.to.to_dense();

    // Where the captured piece actually sits: behind `to` for en passant.
    let captured_sq88 = if mv.kind == MoveKind::EnPassant {
        match color {
            Color::White => mv.to.offset(-16),
            Color::Black => mv.to.offset(16),
        }
    } else {
        mv.to
    };
    let captured = board.piece_at(captured_sq88);
    debug_assert_eq!(captured, mv.captured, "move record disagrees with board");

    let undo = Undo {
        captured,
        captured_sq: captured_sq88,
        castling_rights: board.castling_rights,
        ep_file: board.ep_file,
        halfmove_clock: board.halfmove_clock,
        zobrist: board.zobrist,
        hash_history_len: board.hash_history.len(),
    };

    // En passant leaves the key before anything else changes.
    if let Some(file) = board.ep_file.take() {
        board.zobrist ^= keys.ep_file[file as usize];
    }

    if !captured.is_empty() {
        board.clear(captured_sq88.to_dense());
    }

    board.clear(from);
    if mv.is_promotion() {
        board.place(mv.promotion, to);
    } else {
        board.place(mv.mover, to);
    }

    if mv.is_castling() {
        let (rook_from, rook_to) = rook_castle_squares(to);
        let rook = board.clear(rook_from);
        debug_assert_eq!(rook, Piece::rook(color));
        board.place(rook, rook_to);
    }

    // Castling rights are monotonic: compute everything this move clears and
    // apply it once, keyed into the hash by the whole rights nibble.
    let mut lost: CastleBits = 0;
    if mv.mover.is_king() {
        lost |= match color {
            Color::White => CASTLE_WK | CASTLE_WQ,
            Color::Black => CASTLE_BK | CASTLE_BQ,
        };
    }
    if mv.mover.is_rook() {
        lost |= rights_lost_on_corner(from);
    }
    if captured.is_rook() {
        lost |= rights_lost_on_corner(captured_sq88.to_dense());
    }
    let old_rights = board.castling_rights;
    let new_rights = old_rights & !lost;
    if new_rights != old_rights {
        board.zobrist ^= keys.castling[old_rights as usize] ^ keys.castling[new_rights as usize];
        board.castling_rights = new_rights;
    }

    if mv.kind == MoveKind::DoublePush {
        let file = mv.to.file();
        board.ep_file = Some(file);
        board.zobrist ^= keys.ep_file[file as usize];
    }

    if mv.is_irreversible() {
        board.halfmove_clock = 0;
    } else {
        board.halfmove_clock += 1;
    }

    board.move_history.push(mv);
    board.undo_history.push(undo);

    board.side_to_move = color.opposite();
    board.zobrist ^= keys.side_to_move;
    if board.side_to_move == Color::White {
        board.fullmove_number += 1;
    }

    if board.keep_repetitions {
        board.hash_history.push(board.zobrist);
    }

    #[cfg(all(debug_assertions, feature = "paranoid_hash"))]
    board.assert_hash();

    undo
}

/// Reverse `mv` using its undo record. Afterwards every field byte-equals
/// its pre-make value; a Zobrist mismatch here means the core corrupted
/// itself and is treated as fatal in debug builds.
pub fn unmake_move(board: &mut Board, mv: Move, undo: Undo) {
    let popped_mv = board.move_history.pop();
    let popped_undo = board.undo_history.pop();
    debug_assert_eq!(popped_mv, Some(mv), "unmake out of LIFO order");
    debug_assert_eq!(popped_undo, Some(undo), "unmake with a stale undo record");

    let color = mv.mover.color();
    let from = mv.from.to_dense();
    let to = mv.to.to_dense();

    board.side_to_move = color;
    if color == Color::Black {
        board.fullmove_number -= 1;
    }

    if mv.is_castling() {
        let (rook_from, rook_to) = rook_castle_squares(to);
        let rook = board.clear(rook_to);
        board.place(rook, rook_from);
    }

    board.clear(to);
    board.place(mv.mover, from);

    if !undo.captured.is_empty() {
        board.place(undo.captured, undo.captured_sq.to_dense());
    }

    board.castling_rights = undo.castling_rights;
    board.ep_file = undo.ep_file;
    board.halfmove_clock = undo.halfmove_clock;

    board.hash_history.truncate(undo.hash_history_len);

    // The piece-key XORs from clear/place cancel out; the snapshot closes
    // the side/castling/ep terms.
    board.zobrist = undo.zobrist;

    #[cfg(all(debug_assertions, feature = "paranoid_hash"))]
    board.assert_hash();
}

/// Flip the side to move without moving: clears en passant, toggles the two
/// affected hash terms, and touches none of the history stacks.
pub fn make_null_move(board: &mut Board) -> NullUndo {
    let keys = zobrist_keys();
    let undo = NullUndo {
        ep_file: board.ep_file,
        zobrist: board.zobrist,
    };

    if let Some(file) = board.ep_file.take() {
        board.zobrist ^= keys.ep_file[file as usize];
    }

    board.side_to_move = board.side_to_move.opposite();
    board.zobrist ^= keys.side_to_move;

    undo
}

pub fn unmake_null_move(board: &mut Board, undo: NullUndo) {
    board.side_to_move = board.side_to_move.opposite();
    board.ep_file = undo.ep_file;
    board.zobrist = undo.zobrist;
}

/// A pseudo-legal move is legal iff it does not leave the mover's king
/// attacked; castling additionally may not start in or pass through check.
pub fn is_legal_move(board: &mut Board, mv: Move, tables: &MagicTables) -> bool {
    if mv.is_castling() && !is_legal_castling(board, mv, tables) {
        return false;
    }
    let mover = board.side_to_move;
    let undo = make_move(board, mv);
    let illegal = in_check(board, mover, tables);
    unmake_move(board, mv, undo);
    !illegal
}

/// Fill `moves` with the legal moves of the side to move. `scratch` holds
/// the pseudo-legal superset; both buffers are caller-owned and reused.
pub fn generate_legal(
    board: &mut Board,
    tables: &MagicTables,
    moves: &mut impl MoveBuffer,
    scratch: &mut impl MoveBuffer,
) {
    generate_pseudo_legal(board, tables, scratch);
    moves.clear();

    for i in 0..scratch.len() {
        let mv = scratch[i];
        if is_legal_move(board, mv, tables) {
            moves.push(mv);
        }
    }
}

/// Resolve UCI move text (`e2e4`, `a7a8q`) against the legal moves of the
/// current position.
pub fn parse_uci_move(
    board: &mut Board,
    tables: &MagicTables,
    text: &str,
) -> Result<Move, MoveParseError> {
    let bytes = text.as_bytes();
    if bytes.len() < 4 || bytes.len() > 5 {
        return Err(MoveParseError::BadLength { len: bytes.len() });
    }
    let from = parse_square(&bytes[0..2])?;
    let to = parse_square(&bytes[2..4])?;
    let promotion = match bytes.get(4) {
        Some(&glyph) => Some(
            Piece::promotion_from_char(glyph as char, board.side_to_move).ok_or(
                MoveParseError::BadPromotion {
                    glyph: glyph as char,
                },
            )?,
        ),
        None => None,
    };

    let mut moves = MoveList::new();
    let mut scratch = MoveList::new();
    generate_legal(board, tables, &mut moves, &mut scratch);

    for &mv in moves.iter() {
        if mv.from != from.to_0x88() || mv.to != to.to_0x88() {
            continue;
        }
        let matches_promo = match promotion {
            Some(p) => mv.promotion == p,
            None => !mv.is_promotion(),
        };
        if matches_promo {
            return Ok(mv);
        }
    }

    Err(MoveParseError::IllegalMove {
        text: text.to_string(),
    })
}
