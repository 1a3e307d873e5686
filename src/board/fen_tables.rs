// O(1) FEN glyph <-> piece maps.

use super::Piece;

pub(super) const CHAR_TO_PIECE: [Option<Piece>; 128] = {
    let mut table: [Option<Piece>; 128] = [None; 128];

    // Uppercase = White
    table['P' as usize] = Some(Piece::WhitePawn);
    table['N' as usize] = Some(Piece::WhiteKnight);
    table['B' as usize] = Some(Piece::WhiteBishop);
    table['R' as usize] = Some(Piece::WhiteRook);
    table['Q' as usize] = Some(Piece::WhiteQueen);
    table['K' as usize] = Some(Piece::WhiteKing);

    // Lowercase = Black
    table['p' as usize] = Some(Piece::BlackPawn);
    table['n' as usize] = Some(Piece::BlackKnight);
    table['b' as usize] = Some(Piece::BlackBishop);
    table['r' as usize] = Some(Piece::BlackRook);
    table['q' as usize] = Some(Piece::BlackQueen);
    table['k' as usize] = Some(Piece::BlackKing);

    table
};

pub(super) const PIECE_TO_CHAR: [char; 12] = {
    let mut t = ['\0'; 12];
    t[Piece::WhitePawn as usize] = 'P';
    t[Piece::WhiteKnight as usize] = 'N';
    t[Piece::WhiteBishop as usize] = 'B';
    t[Piece::WhiteRook as usize] = 'R';
    t[Piece::WhiteQueen as usize] = 'Q';
    t[Piece::WhiteKing as usize] = 'K';
    t[Piece::BlackPawn as usize] = 'p';
    t[Piece::BlackKnight as usize] = 'n';
    t[Piece::BlackBishop as usize] = 'b';
    t[Piece::BlackRook as usize] = 'r';
    t[Piece::BlackQueen as usize] = 'q';
    t[Piece::BlackKing as usize] = 'k';
    t
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyphs_round_trip() {
        const GLYPHS: [char; 12] = ['P', 'N', 'B', 'R', 'Q', 'K', 'p', 'n', 'b', 'r', 'q', 'k'];
        for &g in &GLYPHS {
            let piece = CHAR_TO_PIECE[g as usize].expect("glyph missing from CHAR_TO_PIECE");
            assert_eq!(PIECE_TO_CHAR[piece.index()], g, "piece->char mismatch for {g}");
        }
    }
}
