use super::error::FenError;
use super::fen_tables::{CHAR_TO_PIECE, PIECE_TO_CHAR};
use super::{Board, CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ, Color, Piece};
use crate::square::{Square, parse_square};

/// Sentinel accepted everywhere a FEN is: the standard initial position.
pub const STARTPOS: &str = "startpos";

impl Board {
    /// Replace this board with the position described by `fen`, atomically:
    /// on any parse error the board is left exactly as it was. The
    /// `startpos` sentinel is accepted. `keep_repetitions` survives the
    /// replacement; all histories are reset.
    pub fn set_fen(&mut self, fen: &str) -> Result<(), FenError> {
        let fen = fen.trim();
        let mut next = if fen == STARTPOS {
            Board::new()
        } else {
            Board::parse_fen(fen)?
        };
        next.keep_repetitions = self.keep_repetitions;
        next.reset_histories();
        *self = next;
        Ok(())
    }

    fn parse_fen(fen: &str) -> Result<Board, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(FenError::TooFewFields {
                found: fields.len(),
            });
        }

        let mut board = Board::new_empty();

        // 1) Piece placement, ranks 8 down to 1.
        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::BadRankCount { found: ranks.len() });
        }
        for (row, rank_text) in ranks.iter().enumerate() {
            let rank = 7 - row as u8;
            let mut file = 0u8;
            for glyph in rank_text.chars() {
                if let Some(skip) = glyph.to_digit(10) {
                    if skip == 0 || skip > 8 {
                        return Err(FenError::InvalidPiece { glyph });
                    }
                    file += skip as u8;
                } else {
                    let idx = glyph as usize;
                    let piece = if idx < 128 { CHAR_TO_PIECE[idx] } else { None };
                    let piece = piece.ok_or(FenError::InvalidPiece { glyph })?;
                    if file > 7 {
                        return Err(FenError::BadRankWidth { rank: row });
                    }
                    board.place(piece, Square::from_file_rank(file, rank));
                    file += 1;
                }
            }
            if file != 8 {
                return Err(FenError::BadRankWidth { rank: row });
            }
        }

        // More than one king per side is structurally broken. Kingless study
        // boards are allowed; they simply have no legal moves that matter.
        if board.bb(Piece::WhiteKing).count_ones() > 1 {
            return Err(FenError::TooManyKings(Color::White));
        }
        if board.bb(Piece::BlackKing).count_ones() > 1 {
            return Err(FenError::TooManyKings(Color::Black));
        }

        // 2) Side to move.
        board.side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(FenError::InvalidSideToMove {
                    found: other.to_string(),
                });
            }
        };

        // 3) Castling rights.
        if fields[2] != "-" {
            for glyph in fields[2].chars() {
                let bit = match glyph {
                    'K' => CASTLE_WK,
                    'Q' => CASTLE_WQ,
                    'k' => CASTLE_BK,
                    'q' => CASTLE_BQ,
                    _ => {
                        return Err(FenError::InvalidCastling {
                            found: fields[2].to_string(),
                        });
                    }
                };
                board.castling_rights |= bit;
            }
        }

        // Rights that disagree with the placement are dropped rather than
        // left to corrupt a later castling make.
        if board.piece_on(Square::from_index(4)) != Piece::WhiteKing {
            board.castling_rights &= !(CASTLE_WK | CASTLE_WQ);
        }
        if board.piece_on(Square::from_index(0)) != Piece::WhiteRook {
            board.castling_rights &= !CASTLE_WQ;
        }
        if board.piece_on(Square::from_index(7)) != Piece::WhiteRook {
            board.castling_rights &= !CASTLE_WK;
        }
        if board.piece_on(Square::from_index(60)) != Piece::BlackKing {
            board.castling_rights &= !(CASTLE_BK | CASTLE_BQ);
        }
        if board.piece_on(Square::from_index(56)) != Piece::BlackRook {
            board.castling_rights &= !CASTLE_BQ;
        }
        if board.piece_on(Square::from_index(63)) != Piece::BlackRook {
            board.castling_rights &= !CASTLE_BK;
        }

        // 4) En passant target.
        if fields[3] != "-" {
            let sq = parse_square(fields[3].as_bytes()).map_err(|_| FenError::InvalidEnPassant {
                found: fields[3].to_string(),
            })?;
            let expected_rank = match board.side_to_move {
                Color::White => 5,
                Color::Black => 2,
            };
            if sq.rank() != expected_rank {
                return Err(FenError::InvalidEnPassant {
                    found: fields[3].to_string(),
                });
            }
            board.ep_file = Some(sq.file());
        }

        // 5/6) Clocks, optional for lenient inputs.
        board.halfmove_clock = match fields.get(4) {
            Some(text) => text.parse().map_err(|_| FenError::InvalidClock {
                found: text.to_string(),
            })?,
            None => 0,
        };
        board.fullmove_number = match fields.get(5) {
            Some(text) => match text.parse() {
                Ok(n) if n >= 1 => n,
                _ => {
                    return Err(FenError::InvalidClock {
                        found: text.to_string(),
                    });
                }
            },
            None => 1,
        };

        board.refresh_zobrist();
        Ok(board)
    }

    /// Render the position as a six-field FEN string.
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(90);

        for rank in (0..8u8).rev() {
            let mut empties = 0;
            for file in 0..8u8 {
                let piece = self.piece_on(Square::from_file_rank(file, rank));
                if piece.is_empty() {
                    empties += 1;
                } else {
                    if empties > 0 {
                        fen.push(char::from_digit(empties, 10).unwrap());
                        empties = 0;
                    }
                    fen.push(PIECE_TO_CHAR[piece.index()]);
                }
            }
            if empties > 0 {
                fen.push(char::from_digit(empties, 10).unwrap());
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(if self.side_to_move.is_white() { 'w' } else { 'b' });

        fen.push(' ');
        if self.castling_rights == 0 {
            fen.push('-');
        } else {
            if self.has_castling(CASTLE_WK) {
                fen.push('K');
            }
            if self.has_castling(CASTLE_WQ) {
                fen.push('Q');
            }
            if self.has_castling(CASTLE_BK) {
                fen.push('k');
            }
            if self.has_castling(CASTLE_BQ) {
                fen.push('q');
            }
        }

        fen.push(' ');
        match self.ep_square() {
            Some(sq) => fen.push_str(sq.name()),
            None => fen.push('-'),
        }

        fen.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove_number));
        fen
    }
}
