use rand::RngCore;

/// AND-ing three random words keeps the candidate sparse, which is what
/// makes collisions in the magic index rare.
#[inline(always)]
pub fn random_sparse_u64<R: RngCore>(rng: &mut R) -> u64 {
    rng.next_u64() & rng.next_u64() & rng.next_u64()
}

/// A candidate is valid when every blocker set maps to an index that only
/// ever carries one attack mask. Benign collisions (same attacks) are fine.
pub fn is_magic_candidate_valid(blockers: &[u64], attacks: &[u64], magic: u64, shift: u32) -> bool {
    // The index space a `shift`-bit hash can reach.
    let size = 1usize << (64 - shift);
    let mut table = vec![0u64; size];
    let mut used = vec![false; size];
    check_candidate(blockers, attacks, magic, shift, &mut table, &mut used, true)
}

/// Epoch-free inner check against caller-provided scratch. `reset` clears the
/// scratch up front; the search loop instead re-fills it every attempt.
fn check_candidate(
    blockers: &[u64],
    attacks: &[u64],
    magic: u64,
    shift: u32,
    table: &mut [u64],
    used: &mut [bool],
    reset: bool,
) -> bool {
    if reset {
        used.fill(false);
    }
    for (&blocker, &attack) in blockers.iter().zip(attacks) {
        let index = (blocker.wrapping_mul(magic) >> shift) as usize;
        if !used[index] {
            used[index] = true;
            table[index] = attack;
        } else if table[index] != attack {
            return false;
        }
    }
    true
}

pub fn find_magic_number_for_square<R: RngCore>(
    blockers: &[u64],
    attacks: &[u64],
    shift: u32,
    rng: &mut R,
) -> Result<u64, String> {
    // Index space is exactly 2^popcount(mask) == blockers.len().
    let mut table = vec![0u64; blockers.len()];
    let mut used = vec![false; blockers.len()];

    for _attempt in 0..1_000_000 {
        let magic = random_sparse_u64(rng);
        used.fill(false);
        if check_candidate(blockers, attacks, magic, shift, &mut table, &mut used, false) {
            return Ok(magic);
        }
    }
    Err("failed to find a valid magic number after 1,000,000 attempts".to_string())
}
