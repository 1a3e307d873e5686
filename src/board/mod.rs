mod fen;
mod fen_tables;

pub mod castle_bits;
pub mod error;

pub use castle_bits::*;

use crate::bitboard::BitboardExt;
use crate::hash::zobrist::zobrist_keys;
use crate::moves::types::{Move, Undo};
use crate::square::{Sq88, Square};
use crate::utils::pop_lsb;
use std::fmt;
use std::str::FromStr;

/// Which side is to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Color {
    White,
    Black,
}

impl Color {
    #[inline(always)]
    pub const fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    #[inline(always)]
    pub const fn is_white(self) -> bool {
        matches!(self, Color::White)
    }
}

impl std::ops::Not for Color {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.opposite()
    }
}

/// A colored piece, or the empty-square sentinel. The first twelve
/// discriminants are the packed index used by bitboards and Zobrist keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Piece {
    WhitePawn = 0,
    WhiteKnight = 1,
    WhiteBishop = 2,
    WhiteRook = 3,
    WhiteQueen = 4,
    WhiteKing = 5,
    BlackPawn = 6,
    BlackKnight = 7,
    BlackBishop = 8,
    BlackRook = 9,
    BlackQueen = 10,
    BlackKing = 11,
    Empty = 12,
}

impl Piece {
    pub const COUNT: usize = 12;

    #[inline(always)]
    pub const fn is_empty(self) -> bool {
        matches!(self, Piece::Empty)
    }

    /// Packed index 0..11. Not defined for `Empty`.
    #[inline(always)]
    pub const fn index(self) -> usize {
        debug_assert!(!self.is_empty());
        self as usize
    }

    #[inline(always)]
    pub const fn from_index(index: usize) -> Piece {
        debug_assert!(index < Piece::COUNT);
        match index {
            0 => Piece::WhitePawn,
            1 => Piece::WhiteKnight,
            2 => Piece::WhiteBishop,
            3 => Piece::WhiteRook,
            4 => Piece::WhiteQueen,
            5 => Piece::WhiteKing,
            6 => Piece::BlackPawn,
            7 => Piece::BlackKnight,
            8 => Piece::BlackBishop,
            9 => Piece::BlackRook,
            10 => Piece::BlackQueen,
            _ => Piece::BlackKing,
        }
    }

    #[inline(always)]
    pub const fn is_white(self) -> bool {
        (self as usize) < 6
    }

    /// Color of a non-empty piece.
    #[inline(always)]
    pub const fn color(self) -> Color {
        debug_assert!(!self.is_empty());
        if self.is_white() { Color::White } else { Color::Black }
    }

    #[inline(always)]
    pub const fn pawn(color: Color) -> Piece {
        match color {
            Color::White => Piece::WhitePawn,
            Color::Black => Piece::BlackPawn,
        }
    }

    #[inline(always)]
    pub const fn knight(color: Color) -> Piece {
        match color {
            Color::White => Piece::WhiteKnight,
            Color::Black => Piece::BlackKnight,
        }
    }

    #[inline(always)]
    pub const fn bishop(color: Color) -> Piece {
        match color {
            Color::White => Piece::WhiteBishop,
            Color::Black => Piece::BlackBishop,
        }
    }

    #[inline(always)]
    pub const fn rook(color: Color) -> Piece {
        match color {
            Color::White => Piece::WhiteRook,
            Color::Black => Piece::BlackRook,
        }
    }

    #[inline(always)]
    pub const fn queen(color: Color) -> Piece {
        match color {
            Color::White => Piece::WhiteQueen,
            Color::Black => Piece::BlackQueen,
        }
    }

    #[inline(always)]
    pub const fn king(color: Color) -> Piece {
        match color {
            Color::White => Piece::WhiteKing,
            Color::Black => Piece::BlackKing,
        }
    }

    #[inline(always)]
    pub const fn is_pawn(self) -> bool {
        matches!(self, Piece::WhitePawn | Piece::BlackPawn)
    }

    #[inline(always)]
    pub const fn is_knight(self) -> bool {
        matches!(self, Piece::WhiteKnight | Piece::BlackKnight)
    }

    #[inline(always)]
    pub const fn is_bishop(self) -> bool {
        matches!(self, Piece::WhiteBishop | Piece::BlackBishop)
    }

    #[inline(always)]
    pub const fn is_rook(self) -> bool {
        matches!(self, Piece::WhiteRook | Piece::BlackRook)
    }

    #[inline(always)]
    pub const fn is_queen(self) -> bool {
        matches!(self, Piece::WhiteQueen | Piece::BlackQueen)
    }

    #[inline(always)]
    pub const fn is_king(self) -> bool {
        matches!(self, Piece::WhiteKing | Piece::BlackKing)
    }

    /// Lowercase promotion glyph for UCI text. Only queen/rook/bishop/knight
    /// pieces have one.
    pub fn promo_char(self) -> char {
        debug_assert!(self.is_queen() || self.is_rook() || self.is_bishop() || self.is_knight());
        match self {
            Piece::WhiteQueen | Piece::BlackQueen => 'q',
            Piece::WhiteRook | Piece::BlackRook => 'r',
            Piece::WhiteBishop | Piece::BlackBishop => 'b',
            _ => 'n',
        }
    }

    /// Decode a UCI promotion glyph for the given color.
    pub fn promotion_from_char(glyph: char, color: Color) -> Option<Piece> {
        match glyph {
            'q' => Some(Piece::queen(color)),
            'r' => Some(Piece::rook(color)),
            'b' => Some(Piece::bishop(color)),
            'n' => Some(Piece::knight(color)),
            _ => None,
        }
    }
}

/// Capacity reserved for the history stacks so make/unmake never grows them
/// on the hot path at sane search/perft depths.
const HISTORY_RESERVE: usize = 512;

/// The authoritative position: a 0x88 mailbox for O(1) square lookups plus
/// one bitboard per colored piece for set-wise generation, kept in lock step
/// by routing every mutation through `place`/`clear`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Piece at each 0x88 square; `Empty` everywhere off the board.
    pub mailbox: [Piece; 128],
    /// One bitboard per colored piece, indexed by `Piece::index`.
    pub piece_bb: [u64; 12],
    pub occ_white: u64,
    pub occ_black: u64,
    pub occ_all: u64,
    pub side_to_move: Color,
    /// Bitmask over `castle_bits`.
    pub castling_rights: CastleBits,
    /// File 0..7, set iff the previous ply was a pawn double push.
    pub ep_file: Option<u8>,
    /// Plies since the last capture or pawn move.
    pub halfmove_clock: u32,
    /// Starts at 1, increments after Black's move.
    pub fullmove_number: u32,
    /// Incrementally maintained Zobrist key.
    pub zobrist: u64,
    /// Moves played on this board, in order.
    pub move_history: Vec<Move>,
    /// Parallel stack of undo snapshots.
    pub undo_history: Vec<Undo>,
    /// Zobrist keys of every position seen, including the current one.
    pub hash_history: Vec<u64>,
    /// Set false to skip hash-history maintenance (perft runs).
    pub keep_repetitions: bool,
}

impl Board {
    /// An empty board: no pieces, White to move, no rights.
    pub fn new_empty() -> Self {
        let mut b = Board {
            mailbox: [Piece::Empty; 128],
            piece_bb: [0; 12],
            occ_white: 0,
            occ_black: 0,
            occ_all: 0,
            side_to_move: Color::White,
            castling_rights: 0,
            ep_file: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            zobrist: 0,
            move_history: Vec::with_capacity(HISTORY_RESERVE),
            undo_history: Vec::with_capacity(HISTORY_RESERVE),
            hash_history: Vec::with_capacity(HISTORY_RESERVE),
            keep_repetitions: true,
        };
        b.refresh_zobrist();
        b.reset_histories();
        b
    }

    /// The standard starting position.
    pub fn new() -> Self {
        let mut b = Board::new_empty();
        let back_rank = [
            Piece::WhiteRook,
            Piece::WhiteKnight,
            Piece::WhiteBishop,
            Piece::WhiteQueen,
            Piece::WhiteKing,
            Piece::WhiteBishop,
            Piece::WhiteKnight,
            Piece::WhiteRook,
        ];
        for (file, &piece) in back_rank.iter().enumerate() {
            let file = file as u8;
            b.place(piece, Square::from_file_rank(file, 0));
            b.place(Piece::WhitePawn, Square::from_file_rank(file, 1));
            b.place(Piece::BlackPawn, Square::from_file_rank(file, 6));
            // Mirror the back rank; pawn/knight/etc. offsets are symmetric.
            b.place(Piece::from_index(piece.index() + 6), Square::from_file_rank(file, 7));
        }
        b.castling_rights = CASTLE_ALL;
        b.refresh_zobrist();
        b.reset_histories();
        b
    }

    /// Drop all history and reseed the repetition stack with the current key.
    pub(crate) fn reset_histories(&mut self) {
        self.move_history.clear();
        self.undo_history.clear();
        self.hash_history.clear();
        if self.keep_repetitions {
            self.hash_history.push(self.zobrist);
        }
    }

    /// Put `piece` on an empty square, updating mailbox, bitboards,
    /// occupancies and the Zobrist key together. Histories are not touched.
    #[inline(always)]
    pub fn place(&mut self, piece: Piece, sq: Square) {
        debug_assert!(!piece.is_empty());
        let s88 = sq.to_0x88().raw() as usize;
        debug_assert!(self.mailbox[s88].is_empty(), "place onto occupied {sq}");
        let bit = sq.bit();
        self.mailbox[s88] = piece;
        self.piece_bb[piece.index()] |= bit;
        if piece.is_white() {
            self.occ_white |= bit;
        } else {
            self.occ_black |= bit;
        }
        self.occ_all |= bit;
        self.zobrist ^= zobrist_keys().piece[piece.index()][sq.index() as usize];
    }

    /// Remove and return whatever sits on `sq` (possibly `Empty`).
    #[inline(always)]
    pub fn clear(&mut self, sq: Square) -> Piece {
        let s88 = sq.to_0x88().raw() as usize;
        let piece = self.mailbox[s88];
        if piece.is_empty() {
            return piece;
        }
        let bit = sq.bit();
        self.mailbox[s88] = Piece::Empty;
        self.piece_bb[piece.index()] &= !bit;
        if piece.is_white() {
            self.occ_white &= !bit;
        } else {
            self.occ_black &= !bit;
        }
        self.occ_all &= !bit;
        self.zobrist ^= zobrist_keys().piece[piece.index()][sq.index() as usize];
        piece
    }

    #[inline(always)]
    pub fn bb(&self, piece: Piece) -> u64 {
        self.piece_bb[piece.index()]
    }

    #[inline(always)]
    pub fn occupancy(&self, color: Color) -> u64 {
        match color {
            Color::White => self.occ_white,
            Color::Black => self.occ_black,
        }
    }

    #[inline(always)]
    pub fn opponent_occupancy(&self, color: Color) -> u64 {
        self.occupancy(color.opposite())
    }

    /// Bitboard of all pieces (both colors).
    #[inline(always)]
    pub fn occupied(&self) -> u64 {
        self.occ_all
    }

    /// Piece on a 0x88 square. Must be an on-board square.
    #[inline(always)]
    pub fn piece_at(&self, sq: Sq88) -> Piece {
        debug_assert!(!sq.is_off_board());
        self.mailbox[sq.raw() as usize]
    }

    /// Piece on a dense square.
    #[inline(always)]
    pub fn piece_on(&self, sq: Square) -> Piece {
        self.mailbox[sq.to_0x88().raw() as usize]
    }

    #[inline(always)]
    pub fn has_castling(&self, flag: CastleBits) -> bool {
        self.castling_rights & flag != 0
    }

    #[inline(always)]
    pub fn has_kingside_castle(&self, color: Color) -> bool {
        match color {
            Color::White => self.has_castling(CASTLE_WK),
            Color::Black => self.has_castling(CASTLE_BK),
        }
    }

    #[inline(always)]
    pub fn has_queenside_castle(&self, color: Color) -> bool {
        match color {
            Color::White => self.has_castling(CASTLE_WQ),
            Color::Black => self.has_castling(CASTLE_BQ),
        }
    }

    /// The en-passant target square implied by `ep_file`, if any. The rank
    /// follows from whose double push it records.
    #[inline(always)]
    pub fn ep_square(&self) -> Option<Square> {
        self.ep_file.map(|file| {
            let rank = match self.side_to_move {
                Color::White => 5, // Black just double-pushed
                Color::Black => 2, // White just double-pushed
            };
            Square::from_file_rank(file, rank)
        })
    }

    /// Square of the king of `color`, or `None` on bare study boards that
    /// have no king for that side.
    #[inline(always)]
    pub fn try_king_square(&self, color: Color) -> Option<Square> {
        let king_bb = self.bb(Piece::king(color));
        if king_bb == 0 {
            None
        } else {
            Some(Square::from_index(king_bb.lsb()))
        }
    }

    /// Square of the king of `color`. Callers that have already ruled out a
    /// bare board use this; a missing king here means the core corrupted its
    /// own state, so it aborts.
    #[inline(always)]
    pub fn king_square(&self, color: Color) -> Square {
        match self.try_king_square(color) {
            Some(sq) => sq,
            None => panic!("king missing for {:?}\nFEN: {}", color, self.to_fen()),
        }
    }

    /// Recompute from current state and store into `self.zobrist`.
    #[inline]
    pub fn refresh_zobrist(&mut self) {
        self.zobrist = self.compute_zobrist_full();
    }

    /// Full recompute from scratch. Must match the incremental key at every
    /// observable state; `assert_hash` checks exactly that.
    pub fn compute_zobrist_full(&self) -> u64 {
        let keys = zobrist_keys();
        let mut hash: u64 = 0;

        for piece_idx in 0..Piece::COUNT {
            let mut bb = self.piece_bb[piece_idx];
            while bb != 0 {
                let sq = pop_lsb(&mut bb);
                hash ^= keys.piece[piece_idx][sq as usize];
            }
        }

        if self.side_to_move == Color::Black {
            hash ^= keys.side_to_move;
        }

        hash ^= keys.castling[(self.castling_rights & 0xF) as usize];

        if let Some(file) = self.ep_file {
            hash ^= keys.ep_file[file as usize];
        }

        hash
    }

    #[cfg(any(debug_assertions, test))]
    #[inline]
    pub fn assert_hash(&self) {
        let full = self.compute_zobrist_full();
        debug_assert_eq!(
            self.zobrist, full,
            "Zobrist parity mismatch: stored={:#018x}, full={:#018x}",
            self.zobrist, full
        );
    }

    /// Occurrences of the current position among the keys recorded since the
    /// last irreversible ply. The halfmove clock bounds the scan window, so
    /// positions on the far side of a capture or pawn move never match.
    pub fn repetition_count(&self) -> u32 {
        if self.hash_history.is_empty() {
            return 1;
        }
        let current = self.zobrist;
        let window = (self.halfmove_clock as usize + 1).min(self.hash_history.len());
        let start = self.hash_history.len() - window;
        let count = self.hash_history[start..]
            .iter()
            .filter(|&&k| k == current)
            .count() as u32;
        count.max(1)
    }

    /// True iff the current position occurred before within the window.
    pub fn is_repetition(&self) -> bool {
        self.repetition_count() >= 2
    }

    /// True iff `repetition_count() >= 3`.
    pub fn is_threefold(&self) -> bool {
        self.repetition_count() >= 3
    }

    /// Cross-check mailbox, bitboards and occupancies against each other.
    /// Any disagreement is a bug in the core, not a recoverable condition.
    pub fn validate(&self) -> Result<(), String> {
        let mut seen: u64 = 0;
        for piece_idx in 0..Piece::COUNT {
            let bb = self.piece_bb[piece_idx];
            if seen & bb != 0 {
                return Err(format!(
                    "piece bitboard {piece_idx} overlaps another piece"
                ));
            }
            seen |= bb;
        }

        let mut white: u64 = 0;
        let mut black: u64 = 0;
        for piece_idx in 0..Piece::COUNT {
            if Piece::from_index(piece_idx).is_white() {
                white |= self.piece_bb[piece_idx];
            } else {
                black |= self.piece_bb[piece_idx];
            }
        }
        if white != self.occ_white || black != self.occ_black {
            return Err("occupancies disagree with piece bitboards".into());
        }
        if self.occ_all != (self.occ_white | self.occ_black) {
            return Err("occ_all disagrees with color occupancies".into());
        }
        if self.occ_white & self.occ_black != 0 {
            return Err("color occupancies overlap".into());
        }

        for i in 0..64u8 {
            let sq = Square::from_index(i);
            let on_board = self.piece_on(sq);
            let in_bb = (0..Piece::COUNT)
                .find(|&p| self.piece_bb[p] & sq.bit() != 0)
                .map(Piece::from_index)
                .unwrap_or(Piece::Empty);
            if on_board != in_bb {
                return Err(format!(
                    "mailbox/bitboard disagreement on {sq}: {on_board:?} vs {in_bb:?}"
                ));
            }
        }

        for i in 0..128usize {
            if i & 0x88 != 0 && !self.mailbox[i].is_empty() {
                return Err(format!("piece stored on off-board 0x88 index {i:#x}"));
            }
        }

        Ok(())
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new_empty()
    }
}

impl FromStr for Board {
    type Err = error::FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut board = Board::new_empty();
        board.set_fen(s)?;
        Ok(board)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}
