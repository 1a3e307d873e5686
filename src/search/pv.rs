use crate::moves::types::Move;

/// Maximum search depth the PV table supports.
pub const MAX_PLY: usize = 64;

/// Triangular principal-variation store. Row `p` holds the line the search
/// currently believes best from ply `p`; `update` splices the child row in
/// behind the chosen move, copying it so a later child update cannot mutate
/// a line the parent already claimed.
///
/// Rows shrink with depth (row `p` can hold at most `MAX_PLY - p` moves), so
/// the backing store is a triangle, not a square.
pub struct PvTable {
    rows: Box<[Move]>,
    lengths: [usize; MAX_PLY],
}

impl PvTable {
    pub fn new() -> Self {
        PvTable {
            rows: vec![Move::NULL; MAX_PLY * (MAX_PLY + 1) / 2].into_boxed_slice(),
            lengths: [0; MAX_PLY],
        }
    }

    /// Offset of row `ply` in the triangular backing store.
    #[inline(always)]
    fn row_start(ply: usize) -> usize {
        debug_assert!(ply < MAX_PLY);
        ply * MAX_PLY - ply * ply.saturating_sub(1) / 2
    }

    #[inline(always)]
    fn row_capacity(ply: usize) -> usize {
        MAX_PLY - ply
    }

    /// Called on entering a node: the line from here starts out empty.
    pub fn init_ply(&mut self, ply: usize) {
        self.lengths[ply] = 0;
    }

    /// Install `mv` as the head of row `ply` and copy row `ply + 1` behind
    /// it. Repeated calls at the same ply overwrite the previous line.
    pub fn update(&mut self, ply: usize, mv: Move) {
        debug_assert!(ply < MAX_PLY);
        let child_len = if ply + 1 < MAX_PLY {
            self.lengths[ply + 1].min(Self::row_capacity(ply) - 1)
        } else {
            0
        };

        let dst = Self::row_start(ply);
        self.rows[dst] = mv;
        if child_len > 0 {
            let src = Self::row_start(ply + 1);
            self.rows.copy_within(src..src + child_len, dst + 1);
        }
        self.lengths[ply] = child_len + 1;
    }

    /// The line of row `ply` as currently stored.
    pub fn line(&self, ply: usize) -> &[Move] {
        let start = Self::row_start(ply);
        &self.rows[start..start + self.lengths[ply]]
    }

    /// The principal variation recovered from the root row.
    pub fn root_pv(&self) -> &[Move] {
        self.line(0)
    }

    /// Wipe the table; the root PV becomes empty.
    pub fn clear(&mut self) {
        self.lengths = [0; MAX_PLY];
    }
}

impl Default for PvTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Color, Piece};
    use crate::square::Square;
    use std::str::FromStr;

    fn mv(from: &str, to: &str) -> Move {
        Move::quiet(
            Square::from_str(from).unwrap().to_0x88(),
            Square::from_str(to).unwrap().to_0x88(),
            Piece::king(Color::White),
        )
    }

    #[test]
    fn rows_tile_the_triangle_without_overlap() {
        for ply in 0..MAX_PLY - 1 {
            assert_eq!(
                PvTable::row_start(ply) + PvTable::row_capacity(ply),
                PvTable::row_start(ply + 1),
                "row {ply} does not abut row {}",
                ply + 1
            );
        }
        assert_eq!(
            PvTable::row_start(MAX_PLY - 1) + PvTable::row_capacity(MAX_PLY - 1),
            MAX_PLY * (MAX_PLY + 1) / 2
        );
    }

    #[test]
    fn update_splices_the_child_row() {
        let mut pv = PvTable::new();
        let (m1, m2, m3) = (mv("e1", "e2"), mv("e8", "e7"), mv("e2", "e3"));

        // Backed out of a depth-3 search: leaf first, root last.
        pv.init_ply(2);
        pv.update(2, m3);
        pv.update(1, m2);
        pv.update(0, m1);

        assert_eq!(pv.root_pv(), &[m1, m2, m3]);
    }

    #[test]
    fn later_update_overwrites_the_row() {
        let mut pv = PvTable::new();
        let (m1, m2) = (mv("e1", "e2"), mv("e1", "d1"));

        pv.init_ply(1);
        pv.update(0, m1);
        assert_eq!(pv.root_pv(), &[m1]);
        pv.update(0, m2);
        assert_eq!(pv.root_pv(), &[m2]);
    }

    #[test]
    fn parent_splices_the_latest_child_line() {
        let mut pv = PvTable::new();
        let (a, b, best) = (mv("a2", "a3"), mv("b2", "b3"), mv("h2", "h3"));

        pv.init_ply(1);
        pv.update(1, a);
        pv.update(1, b); // child improves its line
        pv.update(0, best);

        assert_eq!(pv.root_pv(), &[best, b]);
    }

    #[test]
    fn init_ply_empties_a_row_and_clear_empties_everything() {
        let mut pv = PvTable::new();
        pv.update(3, mv("c2", "c3"));
        assert_eq!(pv.line(3).len(), 1);
        pv.init_ply(3);
        assert!(pv.line(3).is_empty());

        pv.update(0, mv("d2", "d3"));
        pv.clear();
        assert!(pv.root_pv().is_empty());
    }

    #[test]
    fn deepest_row_holds_one_move() {
        let mut pv = PvTable::new();
        pv.update(MAX_PLY - 1, mv("g1", "g2"));
        assert_eq!(pv.line(MAX_PLY - 1), &[mv("g1", "g2")]);
    }
}
