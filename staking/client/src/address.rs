//! Program address derivation

use {
    crate::error::StakingClientError,
    solana_program::{
        hash::hashv,
        pubkey::{Pubkey, MAX_SEEDS, MAX_SEED_LEN},
    },
};

const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Hash `seeds`, `bump`, and `program_id` into a candidate address without
/// checking whether it is a valid program address.
pub fn create_program_address_unchecked(seeds: &[&[u8]], bump: u8, program_id: &Pubkey) -> Pubkey {
    let bump_seed = [bump];
    let mut parts = Vec::with_capacity(seeds.len() + 3);
    parts.extend_from_slice(seeds);
    parts.push(&bump_seed[..]);
    parts.push(program_id.as_ref());
    parts.push(PDA_MARKER);

    Pubkey::new_from_array(hashv(&parts).to_bytes())
}

/// A program address must not have a corresponding private key.
pub fn is_off_curve(address: &Pubkey) -> bool {
    !address.is_on_curve()
}

/// Search bumps from `u8::MAX` downward and return the first candidate that
/// `is_valid` accepts.
///
/// Every caller that recomputes an address must use this order, since a
/// different bump yields a different address.
pub fn find_program_address_with<F>(
    seeds: &[&[u8]],
    program_id: &Pubkey,
    is_valid: F,
) -> Result<(Pubkey, u8), StakingClientError>
where
    F: Fn(&Pubkey) -> bool,
{
    // the bump occupies one seed slot
    if seeds.len() >= MAX_SEEDS || seeds.iter().any(|seed| seed.len() > MAX_SEED_LEN) {
        return Err(StakingClientError::InvalidSeeds);
    }

    for bump in (0..=u8::MAX).rev() {
        let candidate = create_program_address_unchecked(seeds, bump, program_id);
        if is_valid(&candidate) {
            return Ok((candidate, bump));
        }
    }

    Err(StakingClientError::DerivationExhausted)
}

/// Find the canonical program address and bump for `seeds`.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), StakingClientError> {
    find_program_address_with(seeds, program_id, is_off_curve)
}
