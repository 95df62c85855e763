//! Staking operations
//!
//! Each operation runs to completion before returning: derive addresses,
//! submit one transaction, wait for it to be confirmed. `stake` creates the
//! owner's user pool first when it does not exist yet.

use {
    crate::{
        config::StakingConfig,
        error::StakingClientError,
        instruction,
        rpc::StakingRpc,
        state::{GlobalPool, UserPool, USER_POOL_SIZE},
    },
    log::{debug, info, warn},
    solana_program::{instruction::Instruction, pubkey::Pubkey},
    solana_sdk::{account::Account, commitment_config::CommitmentConfig, signature::Signature},
};

/// How the user pool came to exist before a stake.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bootstrap {
    /// It already existed.
    Existing,
    /// This call created it.
    Created(Signature),
    /// Creation failed, but another caller created it in the meantime.
    CreatedConcurrently,
}

/// Associated token accounts to create before a token transfer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AssociatedTokenAccounts {
    /// Create instructions for the accounts that do not exist yet
    pub instructions: Vec<Instruction>,
    /// Owner's associated token account for each requested mint, in order
    pub destination_accounts: Vec<Pubkey>,
}

fn has_data(account: Option<&Account>) -> bool {
    account.map_or(false, |account| !account.data.is_empty())
}

async fn send_and_confirm<R: StakingRpc>(
    rpc: &R,
    instructions: &[Instruction],
) -> Result<Signature, StakingClientError> {
    let signature = rpc.submit(instructions).await?;
    rpc.confirm(&signature, CommitmentConfig::confirmed()).await?;
    Ok(signature)
}

/// Create the global pool, recording `admin` as its administrator.
pub async fn initialize<R: StakingRpc>(
    rpc: &R,
    config: &StakingConfig,
    admin: &Pubkey,
) -> Result<Signature, StakingClientError> {
    let signature = send_and_confirm(rpc, &[instruction::initialize(config, admin)]).await?;
    info!("initialized global pool {}: {signature}", config.global_authority);
    Ok(signature)
}

/// Create the user pool of `owner`, funded to be rent exempt, and record its
/// owner. Fails if the account already exists.
pub async fn initialize_user_pool<R: StakingRpc>(
    rpc: &R,
    config: &StakingConfig,
    owner: &Pubkey,
) -> Result<Signature, StakingClientError> {
    let user_pool = config.user_pool_address(owner)?;
    let lamports = rpc
        .get_minimum_balance_for_rent_exemption(USER_POOL_SIZE)
        .await?;

    let instructions = instruction::create_user_pool(config, owner, &user_pool, lamports);
    let signature = send_and_confirm(rpc, &instructions).await?;
    info!("created user pool {user_pool} for {owner}: {signature}");
    Ok(signature)
}

async fn user_pool_exists<R: StakingRpc>(
    rpc: &R,
    user_pool: &Pubkey,
) -> Result<bool, StakingClientError> {
    Ok(has_data(rpc.get_account(user_pool).await?.as_ref()))
}

/// Make sure the user pool of `owner` exists, creating it if needed.
///
/// A failed creation is followed by one more lookup: if the pool exists by
/// then, another caller created it and the outcome is the same. Otherwise the
/// error is `BootstrapFailed`.
pub async fn ensure_user_pool<R: StakingRpc>(
    rpc: &R,
    config: &StakingConfig,
    owner: &Pubkey,
) -> Result<Bootstrap, StakingClientError> {
    let user_pool = config.user_pool_address(owner)?;
    if user_pool_exists(rpc, &user_pool).await? {
        debug!("user pool {user_pool} exists");
        return Ok(Bootstrap::Existing);
    }

    let error = match initialize_user_pool(rpc, config, owner).await {
        Ok(signature) => return Ok(Bootstrap::Created(signature)),
        Err(error) => error,
    };

    match user_pool_exists(rpc, &user_pool).await {
        Ok(true) => {
            warn!("user pool {user_pool} was created concurrently: {error}");
            Ok(Bootstrap::CreatedConcurrently)
        }
        Ok(false) => Err(StakingClientError::BootstrapFailed {
            user_pool,
            source: Box::new(error),
        }),
        Err(recheck) => {
            warn!("could not re-check user pool {user_pool}: {recheck}");
            Err(StakingClientError::BootstrapFailed {
                user_pool,
                source: Box::new(error),
            })
        }
    }
}

/// Stake `amount` FLWR base units for `period` months, creating the user
/// pool of `owner` first if it does not exist.
pub async fn stake<R: StakingRpc>(
    rpc: &R,
    config: &StakingConfig,
    owner: &Pubkey,
    amount: u64,
    period: u8,
) -> Result<Signature, StakingClientError> {
    let user_pool = config.user_pool_address(owner)?;
    let user_token_account = config.user_token_account(owner)?;

    ensure_user_pool(rpc, config, owner).await?;

    let signature = send_and_confirm(
        rpc,
        &[instruction::stake_flwr(
            config,
            owner,
            &user_pool,
            &user_token_account,
            amount,
            period,
        )],
    )
    .await?;
    info!("staked {amount} for {period} months from {owner}: {signature}");
    Ok(signature)
}

/// Settle every stake entry of `owner`, paying out rewards or taking penalties
/// as the program decides.
pub async fn unstake<R: StakingRpc>(
    rpc: &R,
    config: &StakingConfig,
    owner: &Pubkey,
) -> Result<Signature, StakingClientError> {
    let user_pool = config.user_pool_address(owner)?;
    let user_token_account = config.user_token_account(owner)?;

    let signature = send_and_confirm(
        rpc,
        &[instruction::unstake_flwr(
            config,
            owner,
            &user_pool,
            &user_token_account,
        )],
    )
    .await?;
    info!("unstaked for {owner}: {signature}");
    Ok(signature)
}

/// Withdraw `amount` from the reward vault to the token account of `admin`.
pub async fn withdraw<R: StakingRpc>(
    rpc: &R,
    config: &StakingConfig,
    admin: &Pubkey,
    amount: u64,
) -> Result<Signature, StakingClientError> {
    let admin_token_account = config.user_token_account(admin)?;

    let signature = send_and_confirm(
        rpc,
        &[instruction::withdraw(config, admin, &admin_token_account, amount)],
    )
    .await?;
    info!("withdrew {amount} to {admin_token_account}: {signature}");
    Ok(signature)
}

/// Read the global pool. `Ok(None)` if it has not been initialized.
pub async fn get_global_state<R: StakingRpc>(
    rpc: &R,
    config: &StakingConfig,
) -> Result<Option<GlobalPool>, StakingClientError> {
    match rpc.get_account(&config.global_authority).await? {
        Some(account) if !account.data.is_empty() => GlobalPool::unpack(&account.data).map(Some),
        _ => Ok(None),
    }
}

/// Read the user pool of `owner`. `Ok(None)` if it has not been created.
pub async fn get_user_pool_state<R: StakingRpc>(
    rpc: &R,
    config: &StakingConfig,
    owner: &Pubkey,
) -> Result<Option<UserPool>, StakingClientError> {
    let user_pool = config.user_pool_address(owner)?;
    debug!("user pool of {owner}: {user_pool}");

    match rpc.get_account(&user_pool).await? {
        Some(account) if !account.data.is_empty() => UserPool::unpack(&account.data).map(Some),
        _ => Ok(None),
    }
}

/// For every mint, find the associated token account of `owner` and, when
/// `wallet` is someone else, of `wallet` too. Returns create instructions,
/// paid by `wallet` and addressed to the configured associated token
/// program, for the ones that do not exist.
pub async fn associated_token_accounts_to_create<R: StakingRpc>(
    rpc: &R,
    config: &StakingConfig,
    wallet: &Pubkey,
    owner: &Pubkey,
    mints: &[Pubkey],
) -> Result<AssociatedTokenAccounts, StakingClientError> {
    let mut accounts = AssociatedTokenAccounts::default();

    for mint in mints {
        let destination = config.associated_token_address(owner, mint)?;
        if rpc.get_account(&destination).await?.is_none() {
            accounts
                .instructions
                .push(instruction::create_associated_token_account(
                    config,
                    wallet,
                    &destination,
                    owner,
                    mint,
                ));
        }
        accounts.destination_accounts.push(destination);

        if wallet != owner {
            let wallet_account = config.associated_token_address(wallet, mint)?;
            if rpc.get_account(&wallet_account).await?.is_none() {
                accounts
                    .instructions
                    .push(instruction::create_associated_token_account(
                        config,
                        wallet,
                        &wallet_account,
                        wallet,
                        mint,
                    ));
            }
        }
    }

    Ok(accounts)
}
