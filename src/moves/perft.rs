use crate::bitboard::BitboardExt;
use crate::board::Board;
use crate::moves::between::between;
use crate::moves::execute::{generate_legal, make_move, rook_castle_squares, unmake_move};
use crate::moves::magic::MagicTables;
use crate::moves::square_control::attacker_breakdown;
use crate::moves::types::{Move, MoveList};
use crate::square::Square;
use tracing::{debug, instrument};

const MAX_PERFT_DEPTH: u32 = 20;

/// One reusable buffer per ply, plus slack for the leaf-reply probe.
type PlyBuffers = [MoveList; (MAX_PERFT_DEPTH + 2) as usize];

fn new_buffers() -> PlyBuffers {
    std::array::from_fn(|_| MoveList::new())
}

/// Classified node counts for a statistics run. Move-shape tallies count the
/// moves made at the final ply; check classes are evaluated on the resulting
/// positions; mates only at leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PerftCounters {
    pub nodes: u64,
    pub captures: u64,
    pub ep_captures: u64,
    pub castles: u64,
    pub promotions: u64,
    pub checks: u64,
    pub discovery_checks: u64,
    pub double_checks: u64,
    pub checkmates: u64,
}

impl PerftCounters {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn add(&mut self, other: &PerftCounters) {
        self.nodes += other.nodes;
        self.captures += other.captures;
        self.ep_captures += other.ep_captures;
        self.castles += other.castles;
        self.promotions += other.promotions;
        self.checks += other.checks;
        self.discovery_checks += other.discovery_checks;
        self.double_checks += other.double_checks;
        self.checkmates += other.checkmates;
    }
}

fn check_depth(depth: u32) {
    assert!(
        depth <= MAX_PERFT_DEPTH,
        "depth {depth} exceeds MAX_PERFT_DEPTH {MAX_PERFT_DEPTH}"
    );
}

fn perft_recursive(
    board: &mut Board,
    tables: &MagicTables,
    depth: u32,
    ply: usize,
    legal: &mut PlyBuffers,
    scratch: &mut PlyBuffers,
) -> u64 {
    if depth == 0 {
        return 1;
    }

    {
        let (moves, pseudo) = (&mut legal[ply], &mut scratch[ply]);
        generate_legal(board, tables, moves, pseudo);
    }

    let move_count = legal[ply].len();
    let mut nodes = 0;

    for i in 0..move_count {
        let mv = legal[ply][i];
        let undo = make_move(board, mv);
        nodes += perft_recursive(board, tables, depth - 1, ply + 1, legal, scratch);
        unmake_move(board, mv, undo);
    }

    nodes
}

/// Exhaustive legal leaf count at `depth`. `perft(_, 1)` equals the number
/// of legal moves; `perft(_, 0)` is 1 by convention.
#[instrument(skip(board, tables), fields(depth))]
pub fn perft(board: &mut Board, tables: &MagicTables, depth: u32) -> u64 {
    check_depth(depth);
    let mut legal = new_buffers();
    let mut scratch = new_buffers();
    perft_recursive(board, tables, depth, 0, &mut legal, &mut scratch)
}

/// Per-root-move node counts. The rows sum to `perft(board, depth)` and come
/// out in generation order, which is deterministic for a given position.
#[instrument(skip(board, tables), fields(depth))]
pub fn perft_divide(board: &mut Board, tables: &MagicTables, depth: u32) -> Vec<(Move, u64)> {
    check_depth(depth);
    let mut legal = new_buffers();
    let mut scratch = new_buffers();

    {
        let (moves, pseudo) = (&mut legal[0], &mut scratch[0]);
        generate_legal(board, tables, moves, pseudo);
    }
    debug!(depth, roots = legal[0].len(), "divide: root legal moves");

    let move_count = legal[0].len();
    let mut rows = Vec::with_capacity(move_count);

    for i in 0..move_count {
        let mv = legal[0][i];
        let undo = make_move(board, mv);
        let nodes = if depth <= 1 {
            1
        } else {
            perft_recursive(board, tables, depth - 1, 1, &mut legal, &mut scratch)
        };
        unmake_move(board, mv, undo);
        debug!(%mv, nodes, "divide: root child total");
        rows.push((mv, nodes));
    }

    rows
}

fn classify_leaf_move(
    board: &mut Board,
    tables: &MagicTables,
    mv: Move,
    ply: usize,
    out: &mut PerftCounters,
    legal: &mut PlyBuffers,
    scratch: &mut PlyBuffers,
) {
    out.nodes += 1;
    if mv.is_capture() {
        out.captures += 1;
        if mv.is_en_passant() {
            out.ep_captures += 1;
        }
    }
    if mv.is_castling() {
        out.castles += 1;
    }
    if mv.is_promotion() {
        out.promotions += 1;
    }

    let undo = make_move(board, mv);

    // A defender without a king (bare study boards) cannot be in check.
    let defender = board.side_to_move;
    let Some(king) = board.try_king_square(defender) else {
        unmake_move(board, mv, undo);
        return;
    };
    let breakdown = attacker_breakdown(board, king, defender.opposite(), tables);

    if !breakdown.is_empty() {
        out.checks += 1;

        let attackers = breakdown.union();
        if breakdown.count() >= 2 {
            out.double_checks += 1;
        } else {
            // Single attacker. A discovered check comes from a piece that
            // did not just arrive: not the landing square, not the castled
            // rook, and on a ray that does not pass through the landing
            // square.
            let mut direct = mv.to.to_dense().bit();
            if mv.is_castling() {
                let (_, rook_to) = rook_castle_squares(mv.to.to_dense());
                direct |= rook_to.bit();
            }
            let attacker_sq = Square::from_index(attackers.lsb());
            if attackers & direct == 0 && between(attacker_sq, king) & direct == 0 {
                out.discovery_checks += 1;
            }
        }

        // Mates are only counted at leaves, and only checks can be mates.
        {
            let (moves, pseudo) = (&mut legal[ply + 1], &mut scratch[ply + 1]);
            generate_legal(board, tables, moves, pseudo);
        }
        if legal[ply + 1].is_empty() {
            out.checkmates += 1;
        }
    }

    unmake_move(board, mv, undo);
}

fn stats_recursive(
    board: &mut Board,
    tables: &MagicTables,
    depth: u32,
    ply: usize,
    out: &mut PerftCounters,
    legal: &mut PlyBuffers,
    scratch: &mut PlyBuffers,
) {
    if depth == 0 {
        out.nodes += 1;
        return;
    }

    {
        let (moves, pseudo) = (&mut legal[ply], &mut scratch[ply]);
        generate_legal(board, tables, moves, pseudo);
    }

    let move_count = legal[ply].len();
    for i in 0..move_count {
        let mv = legal[ply][i];
        if depth == 1 {
            classify_leaf_move(board, tables, mv, ply, out, legal, scratch);
        } else {
            let undo = make_move(board, mv);
            stats_recursive(board, tables, depth - 1, ply + 1, out, legal, scratch);
            unmake_move(board, mv, undo);
        }
    }
}

/// Count nodes at `depth` with the full statistical breakdown. Repetition
/// tracking is switched off for the duration; perft never consults it and
/// its maintenance is not free.
#[instrument(skip(board, tables, out), fields(depth))]
pub fn perft_with_breakdown(
    board: &mut Board,
    tables: &MagicTables,
    depth: u32,
    out: &mut PerftCounters,
) {
    check_depth(depth);
    let keep = board.keep_repetitions;
    board.keep_repetitions = false;

    let mut legal = new_buffers();
    let mut scratch = new_buffers();
    stats_recursive(board, tables, depth, 0, out, &mut legal, &mut scratch);

    board.keep_repetitions = keep;
}
