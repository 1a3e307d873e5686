use once_cell::sync::OnceCell;
use rand::{RngCore, SeedableRng, rngs::StdRng};

/// Fixed seed: every process derives the identical key set, so hashes can be
/// compared across runs and the parity tests are stable.
const ZOBRIST_SEED: u64 = 0x9E37_79B9_AAAC_5C87;

pub struct ZobristKeys {
    /// `[piece_index 0..11][dense square]`
    pub piece: [[u64; 64]; 12],
    /// XORed in when Black is to move.
    pub side_to_move: u64,
    /// Keyed by the whole 4-bit rights nibble, one key per mask value.
    pub castling: [u64; 16],
    /// a..h => 0..7; XORed in iff `ep_file` is set.
    pub ep_file: [u64; 8],
}

/// Process-wide keys, generated once on first use.
pub fn zobrist_keys() -> &'static ZobristKeys {
    static KEYS: OnceCell<ZobristKeys> = OnceCell::new();
    KEYS.get_or_init(|| generate_keys(StdRng::seed_from_u64(ZOBRIST_SEED)))
}

fn generate_keys(mut rng: StdRng) -> ZobristKeys {
    #[inline]
    fn non_zero(rng: &mut StdRng) -> u64 {
        // zero keys would be XOR no-ops and degrade the hash
        let mut v = rng.next_u64();
        while v == 0 {
            v = rng.next_u64();
        }
        v
    }

    let mut keys = ZobristKeys {
        piece: [[0u64; 64]; 12],
        side_to_move: 0,
        castling: [0u64; 16],
        ep_file: [0u64; 8],
    };

    for piece in 0..12 {
        for sq in 0..64 {
            keys.piece[piece][sq] = non_zero(&mut rng);
        }
    }

    for mask in 0..16 {
        keys.castling[mask] = non_zero(&mut rng);
    }

    for file in 0..8 {
        keys.ep_file[file] = non_zero(&mut rng);
    }

    keys.side_to_move = non_zero(&mut rng);

    keys
}
