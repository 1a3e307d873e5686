use crate::board::Color;
use crate::board::Piece;
use crate::board::error::BufferOverflow;
use crate::square::Sq88;
use arrayvec::ArrayVec;
use std::fmt;
use std::ops::{Deref, DerefMut};

/// Upper bound on pseudo-legal moves in any reachable position is ~218;
/// the buffer contract demands at least 256, we size a little above it.
pub const MOVE_LIST_CAPACITY: usize = 320;

/// The default caller-owned move buffer: fixed capacity, no heap.
pub type MoveList = ArrayVec<Move, MOVE_LIST_CAPACITY>;

/// Caller-owned move sink the generator writes into. `push` treats overflow
/// of a fixed buffer as a fatal sizing bug; `try_push` surfaces it instead
/// for callers that insist on undersized buffers.
pub trait MoveBuffer: Deref<Target = [Move]> + DerefMut {
    fn push(&mut self, mv: Move);
    fn try_push(&mut self, mv: Move) -> Result<(), BufferOverflow>;
    fn clear(&mut self);
}

impl MoveBuffer for Vec<Move> {
    fn push(&mut self, mv: Move) {
        Vec::push(self, mv);
    }
    fn try_push(&mut self, mv: Move) -> Result<(), BufferOverflow> {
        Vec::push(self, mv);
        Ok(())
    }
    fn clear(&mut self) {
        Vec::clear(self);
    }
}

impl<const N: usize> MoveBuffer for ArrayVec<Move, N> {
    fn push(&mut self, mv: Move) {
        ArrayVec::push(self, mv);
    }
    fn try_push(&mut self, mv: Move) -> Result<(), BufferOverflow> {
        ArrayVec::try_push(self, mv).map_err(|_| BufferOverflow { capacity: N })
    }
    fn clear(&mut self) {
        ArrayVec::clear(self);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    Quiet,
    DoublePush,
    Capture,
    EnPassant,
    CastleKing,
    CastleQueen,
    Promotion,
    PromotionCapture,
}

/// A move as a self-contained value record: 0x88 endpoints, the mover, what
/// it captured (or `Empty`), what it promotes to (or `Empty`), and the kind
/// tag. Holds no references, so it stays valid across board mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Sq88,
    pub to: Sq88,
    pub mover: Piece,
    pub captured: Piece,
    pub promotion: Piece,
    pub kind: MoveKind,
}

impl Move {
    /// Filler for preallocated tables; never a playable move.
    pub(crate) const NULL: Move = Move {
        from: Sq88::from_raw(0),
        to: Sq88::from_raw(0),
        mover: Piece::Empty,
        captured: Piece::Empty,
        promotion: Piece::Empty,
        kind: MoveKind::Quiet,
    };

    pub fn quiet(from: Sq88, to: Sq88, mover: Piece) -> Move {
        debug_assert!(!mover.is_empty());
        Move {
            from,
            to,
            mover,
            captured: Piece::Empty,
            promotion: Piece::Empty,
            kind: MoveKind::Quiet,
        }
    }

    pub fn double_push(from: Sq88, to: Sq88, mover: Piece) -> Move {
        debug_assert!(mover.is_pawn());
        Move {
            from,
            to,
            mover,
            captured: Piece::Empty,
            promotion: Piece::Empty,
            kind: MoveKind::DoublePush,
        }
    }

    pub fn capture(from: Sq88, to: Sq88, mover: Piece, captured: Piece) -> Move {
        debug_assert!(!captured.is_empty() && captured.color() != mover.color());
        Move {
            from,
            to,
            mover,
            captured,
            promotion: Piece::Empty,
            kind: MoveKind::Capture,
        }
    }

    /// The captured pawn sits behind `to`; `captured` records it anyway so a
    /// move stays a self-contained record.
    pub fn en_passant(from: Sq88, to: Sq88, color: Color) -> Move {
        Move {
            from,
            to,
            mover: Piece::pawn(color),
            captured: Piece::pawn(color.opposite()),
            promotion: Piece::Empty,
            kind: MoveKind::EnPassant,
        }
    }

    pub fn castle_king(color: Color) -> Move {
        let (from, to) = match color {
            Color::White => (Sq88::from_raw(0x04), Sq88::from_raw(0x06)),
            Color::Black => (Sq88::from_raw(0x74), Sq88::from_raw(0x76)),
        };
        Move {
            from,
            to,
            mover: Piece::king(color),
            captured: Piece::Empty,
            promotion: Piece::Empty,
            kind: MoveKind::CastleKing,
        }
    }

    pub fn castle_queen(color: Color) -> Move {
        let (from, to) = match color {
            Color::White => (Sq88::from_raw(0x04), Sq88::from_raw(0x02)),
            Color::Black => (Sq88::from_raw(0x74), Sq88::from_raw(0x72)),
        };
        Move {
            from,
            to,
            mover: Piece::king(color),
            captured: Piece::Empty,
            promotion: Piece::Empty,
            kind: MoveKind::CastleQueen,
        }
    }

    pub fn promotion(from: Sq88, to: Sq88, color: Color, promotion: Piece) -> Move {
        debug_assert!(!promotion.is_pawn() && !promotion.is_king() && !promotion.is_empty());
        debug_assert!(promotion.color() == color);
        Move {
            from,
            to,
            mover: Piece::pawn(color),
            captured: Piece::Empty,
            promotion,
            kind: MoveKind::Promotion,
        }
    }

    pub fn promotion_capture(
        from: Sq88,
        to: Sq88,
        color: Color,
        promotion: Piece,
        captured: Piece,
    ) -> Move {
        debug_assert!(!promotion.is_pawn() && !promotion.is_king() && !promotion.is_empty());
        debug_assert!(promotion.color() == color);
        debug_assert!(!captured.is_empty() && captured.color() != color);
        Move {
            from,
            to,
            mover: Piece::pawn(color),
            captured,
            promotion,
            kind: MoveKind::PromotionCapture,
        }
    }

    #[inline(always)]
    pub fn is_capture(&self) -> bool {
        !self.captured.is_empty()
    }

    #[inline(always)]
    pub fn is_en_passant(&self) -> bool {
        self.kind == MoveKind::EnPassant
    }

    #[inline(always)]
    pub fn is_castling(&self) -> bool {
        matches!(self.kind, MoveKind::CastleKing | MoveKind::CastleQueen)
    }

    #[inline(always)]
    pub fn is_promotion(&self) -> bool {
        matches!(self.kind, MoveKind::Promotion | MoveKind::PromotionCapture)
    }

    #[inline(always)]
    pub fn is_double_push(&self) -> bool {
        self.kind == MoveKind::DoublePush
    }

    #[inline(always)]
    pub fn is_quiet(&self) -> bool {
        self.kind == MoveKind::Quiet
    }

    /// Any move that resets the halfmove clock also makes earlier positions
    /// unrepeatable.
    #[inline(always)]
    pub fn is_irreversible(&self) -> bool {
        self.mover.is_pawn() || self.is_capture()
    }

    pub fn to_uci(&self) -> String {
        let mut s = String::with_capacity(5);
        s.push_str(self.from.to_dense().name());
        s.push_str(self.to.to_dense().name());
        if self.is_promotion() {
            s.push(self.promotion.promo_char());
        }
        s
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uci())?;
        if f.alternate() {
            match self.kind {
                MoveKind::CastleKing | MoveKind::CastleQueen => f.write_str(" (castle)")?,
                MoveKind::EnPassant => f.write_str(" (ep)")?,
                _ if self.is_capture() => f.write_str(" (x)")?,
                _ => {}
            }
        }
        Ok(())
    }
}

/// Everything `unmake_move` needs to restore the pre-move state exactly.
/// Produced by `make_move`, consumed by `unmake_move`, opaque to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Undo {
    /// What was captured and where (the square differs from `to` only for
    /// en passant).
    pub(crate) captured: Piece,
    pub(crate) captured_sq: Sq88,
    pub(crate) castling_rights: u8,
    pub(crate) ep_file: Option<u8>,
    pub(crate) halfmove_clock: u32,
    pub(crate) zobrist: u64,
    /// Length to truncate `hash_history` back to.
    pub(crate) hash_history_len: usize,
}

/// Snapshot for a null move: only side, en passant and the key change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NullUndo {
    pub(crate) ep_file: Option<u8>,
    pub(crate) zobrist: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::square::Square;
    use std::str::FromStr;

    fn s88(name: &str) -> Sq88 {
        Square::from_str(name).unwrap().to_0x88()
    }

    #[test]
    fn uci_text_includes_promotion_glyph() {
        let mv = Move::promotion(s88("a7"), s88("a8"), Color::White, Piece::WhiteQueen);
        assert_eq!(mv.to_uci(), "a7a8q");
        let mv = Move::quiet(s88("e2"), s88("e4"), Piece::WhitePawn);
        assert_eq!(mv.to_uci(), "e2e4");
    }

    #[test]
    fn castle_constructors_use_standard_squares() {
        assert_eq!(Move::castle_king(Color::White).to_uci(), "e1g1");
        assert_eq!(Move::castle_queen(Color::White).to_uci(), "e1c1");
        assert_eq!(Move::castle_king(Color::Black).to_uci(), "e8g8");
        assert_eq!(Move::castle_queen(Color::Black).to_uci(), "e8c8");
    }

    #[test]
    fn en_passant_records_the_captured_pawn() {
        let mv = Move::en_passant(s88("e5"), s88("d6"), Color::White);
        assert!(mv.is_capture());
        assert_eq!(mv.captured, Piece::BlackPawn);
        assert!(mv.is_irreversible());
    }

    #[test]
    fn fixed_buffer_overflow_is_surfaced() {
        let mut buf: ArrayVec<Move, 2> = ArrayVec::new();
        let mv = Move::quiet(s88("e2"), s88("e3"), Piece::WhitePawn);
        assert!(MoveBuffer::try_push(&mut buf, mv).is_ok());
        assert!(MoveBuffer::try_push(&mut buf, mv).is_ok());
        let err = MoveBuffer::try_push(&mut buf, mv).unwrap_err();
        assert_eq!(err.capacity, 2);
    }
}
