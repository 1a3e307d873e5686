use thiserror::Error;

/// FEN rejection reasons. The board is left untouched when any of these fire.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("FEN must have at least 4 fields, found {found}")]
    TooFewFields { found: usize },
    #[error("invalid piece character '{glyph}' in FEN placement")]
    InvalidPiece { glyph: char },
    #[error("rank {rank} does not describe exactly 8 files")]
    BadRankWidth { rank: usize },
    #[error("FEN placement must describe 8 ranks, found {found}")]
    BadRankCount { found: usize },
    #[error("invalid side to move '{found}', expected 'w' or 'b'")]
    InvalidSideToMove { found: String },
    #[error("invalid castling field '{found}'")]
    InvalidCastling { found: String },
    #[error("invalid en passant field '{found}'")]
    InvalidEnPassant { found: String },
    #[error("invalid clock field '{found}'")]
    InvalidClock { found: String },
    #[error("more than one {0:?} king on the board")]
    TooManyKings(crate::board::Color),
}

/// Algebraic square text that is not `[a-h][1-8]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SquareParseError {
    #[error("square text must be 2 characters, found {len}")]
    BadLength { len: usize },
    #[error("'{file}{rank}' is not a board square")]
    BadCoordinates { file: char, rank: char },
}

/// UCI move text that does not name a legal move in the current position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveParseError {
    #[error("move text must be 4-5 characters, found {len}")]
    BadLength { len: usize },
    #[error(transparent)]
    BadSquare(#[from] SquareParseError),
    #[error("invalid promotion character '{glyph}'")]
    BadPromotion { glyph: char },
    #[error("'{text}' is not a legal move here")]
    IllegalMove { text: String },
}

/// A caller-owned move buffer ran out of room. Buffers sized to the
/// documented minimum of 256 never raise this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("move buffer overflow at capacity {capacity}")]
pub struct BufferOverflow {
    pub capacity: usize,
}
