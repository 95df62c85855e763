#![deny(missing_docs)]

//! A client for the FLWR staking program

pub mod address;
pub mod client;
pub mod config;
pub mod error;
pub mod instruction;
pub mod rpc;
pub mod state;

// export current sdk types for downstream users building with a different sdk version
pub use solana_program;
use {crate::error::StakingClientError, solana_program::pubkey::Pubkey};

solana_program::declare_id!("A1EGu7N7gYReZNd4Q5EXKvCLdm1QsVwkfRguvY7VQhqa");

/// The FLWR token mint, which is also the mint of the reward vault.
pub mod reward_mint {
    solana_program::declare_id!("RRDQEkUVF2rfWUxn2PLKxktLvvF28dgvU1guW6D6yGm");
}

const GLOBAL_AUTHORITY_SEED: &[u8] = b"global-authority";
const USER_POOL_SEED: &str = "user-pool";

/// Base units per whole FLWR token.
pub const DECIMAL: u64 = 100;

/// Find the global authority address, which holds the `GlobalPool` record and
/// owns the reward vault.
pub fn find_global_authority_address(
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), StakingClientError> {
    address::find_program_address(&[GLOBAL_AUTHORITY_SEED], program_id)
}

/// Get the per-owner user pool address. The account is created with seed, so
/// no bump is involved.
pub fn get_user_pool_address(
    owner: &Pubkey,
    program_id: &Pubkey,
) -> Result<Pubkey, StakingClientError> {
    Ok(Pubkey::create_with_seed(owner, USER_POOL_SEED, program_id)?)
}

/// Find the associated token address of `owner` for `mint`.
pub fn find_associated_token_address(
    owner: &Pubkey,
    mint: &Pubkey,
    token_program_id: &Pubkey,
    associated_token_program_id: &Pubkey,
) -> Result<(Pubkey, u8), StakingClientError> {
    address::find_program_address(
        &[owner.as_ref(), token_program_id.as_ref(), mint.as_ref()],
        associated_token_program_id,
    )
}

#[allow(missing_docs)]
/// Internal constants confined to a suggestively named submodule for use in tests.
pub mod test_variable {
    pub const GLOBAL_AUTHORITY_SEED: &[u8] = super::GLOBAL_AUTHORITY_SEED;
    pub const USER_POOL_SEED: &str = super::USER_POOL_SEED;
}
