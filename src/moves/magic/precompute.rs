use super::attacks::{get_bishop_attack_bitboards, get_rook_attack_bitboards};
use super::search::find_magic_number_for_square;
use super::structs::{BishopMagicTables, MagicEntry, MagicTables, RookMagicTables};
use rand::{RngCore, SeedableRng, rngs::StdRng};

/// Fixed seed for the magic search: the same process always builds the same
/// tables, which keeps table snapshots and test runs comparable.
pub const MAGIC_SEED: u64 = 0xD6E8_FEB8_6659_FD93;

/// Rook relevant-occupancy mask: the rays from `square` with the board edge
/// of each ray dropped (a blocker on the edge changes nothing).
pub fn rook_relevant_mask(square: usize) -> u64 {
    let rank = square / 8;
    let file = square % 8;
    let mut mask = 0u64;
    for r in rank + 1..7 {
        mask |= 1 << (r * 8 + file);
    }
    for r in 1..rank {
        mask |= 1 << (r * 8 + file);
    }
    for f in file + 1..7 {
        mask |= 1 << (rank * 8 + f);
    }
    for f in 1..file {
        mask |= 1 << (rank * 8 + f);
    }
    mask
}

/// Bishop relevant-occupancy mask, edges dropped on every diagonal.
pub fn bishop_relevant_mask(square: usize) -> u64 {
    let rank = (square / 8) as i32;
    let file = (square % 8) as i32;
    let mut mask = 0u64;
    for (dr, df) in [(1, 1), (1, -1), (-1, 1), (-1, -1)] {
        let mut r = rank + dr;
        let mut f = file + df;
        while (1..7).contains(&r) && (1..7).contains(&f) {
            mask |= 1 << (r * 8 + f);
            r += dr;
            f += df;
        }
    }
    mask
}

/// Every subset of `mask`, via the carry-rippler trick. The empty subset is
/// included, so the result has `2^popcount(mask)` entries.
pub fn enumerate_blocker_subsets(mask: u64) -> Vec<u64> {
    let mut subsets = Vec::with_capacity(1 << mask.count_ones());
    let mut subset: u64 = 0;
    loop {
        subsets.push(subset);
        subset = subset.wrapping_sub(mask) & mask;
        if subset == 0 {
            break;
        }
    }
    subsets
}

fn build_entry<R: RngCore>(
    square: usize,
    mask: u64,
    blockers: Vec<u64>,
    attacks: Vec<u64>,
    rng: &mut R,
) -> Result<MagicEntry, String> {
    let shift = 64 - mask.count_ones();
    let magic = find_magic_number_for_square(&blockers, &attacks, shift, rng)
        .map_err(|e| format!("square {square}: {e}"))?;

    let mut table = vec![0u64; 1 << mask.count_ones()].into_boxed_slice();
    for (&blocker, &attack) in blockers.iter().zip(&attacks) {
        let index = (blocker.wrapping_mul(magic) >> shift) as usize;
        table[index] = attack;
    }

    Ok(MagicEntry {
        magic,
        shift,
        mask,
        table,
    })
}

/// Build both magic tables from scratch with a deterministic search.
pub fn generate_magic_tables(seed: u64) -> Result<MagicTables, String> {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut rook_entries = Vec::with_capacity(64);
    for square in 0..64 {
        let mask = rook_relevant_mask(square);
        let blockers = enumerate_blocker_subsets(mask);
        let attacks = get_rook_attack_bitboards(square, &blockers);
        rook_entries.push(build_entry(square, mask, blockers, attacks, &mut rng)?);
    }

    let mut bishop_entries = Vec::with_capacity(64);
    for square in 0..64 {
        let mask = bishop_relevant_mask(square);
        let blockers = enumerate_blocker_subsets(mask);
        let attacks = get_bishop_attack_bitboards(square, &blockers);
        bishop_entries.push(build_entry(square, mask, blockers, attacks, &mut rng)?);
    }

    Ok(MagicTables {
        rook: RookMagicTables {
            entries: rook_entries,
        },
        bishop: BishopMagicTables {
            entries: bishop_entries,
        },
    })
}
