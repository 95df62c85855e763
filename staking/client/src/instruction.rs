//! Instruction types

use {
    crate::{config::StakingConfig, error::StakingClientError, state::USER_POOL_SIZE},
    borsh::{BorshDeserialize, BorshSerialize},
    solana_program::{
        hash::hash,
        instruction::{AccountMeta, Instruction},
        pubkey::Pubkey,
        system_instruction, system_program, sysvar,
    },
    spl_associated_token_account::instruction::AssociatedTokenAccountInstruction,
    strum_macros::{EnumIter, IntoStaticStr},
};

/// Length of the Anchor method discriminator prefix.
pub const METHOD_DISCRIMINATOR_LEN: usize = 8;

/// Arguments of `initialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct InitializeArgs {
    /// Bump of the global authority address
    pub global_bump: u8,
}

/// Arguments of `stake_flwr`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct StakeFlwrArgs {
    /// Bump of the global authority address
    pub global_bump: u8,
    /// Amount of FLWR base units to stake
    pub amount: u64,
    /// Lock period in months
    pub period: u8,
}

/// Arguments of `unstake_flwr`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct UnstakeFlwrArgs {
    /// Bump of the global authority address
    pub global_bump: u8,
}

/// Arguments of `withdraw`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct WithdrawArgs {
    /// Bump of the global authority address
    pub global_bump: u8,
    /// Amount of FLWR base units to withdraw
    pub amount: u64,
}

/// An account an instruction takes, as the program declares it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccountSpec {
    /// Name in the interface definition
    pub name: &'static str,
    /// Whether the account is writable
    pub is_mut: bool,
    /// Whether the account signs
    pub is_signer: bool,
}

const fn account(name: &'static str, is_mut: bool, is_signer: bool) -> AccountSpec {
    AccountSpec {
        name,
        is_mut,
        is_signer,
    }
}

const INITIALIZE_ACCOUNTS: &[AccountSpec] = &[
    account("admin", true, true),
    account("globalAuthority", true, false),
    account("systemProgram", false, false),
    account("rent", false, false),
];
const INITIALIZE_USER_POOL_ACCOUNTS: &[AccountSpec] = &[
    account("owner", true, true),
    account("userPool", true, false),
];
const STAKE_ACCOUNTS: &[AccountSpec] = &[
    account("owner", true, true),
    account("globalAuthority", true, false),
    account("userPool", true, false),
    account("rewardVault", true, false),
    account("userTokenAccount", true, false),
    account("tokenProgram", false, false),
];
const WITHDRAW_ACCOUNTS: &[AccountSpec] = &[
    account("owner", true, true),
    account("globalAuthority", true, false),
    account("rewardVault", true, false),
    account("userTokenAccount", true, false),
    account("tokenProgram", false, false),
];

/// Instructions supported by the staking program.
///
/// Each serializes as the Anchor method discriminator followed by the borsh
/// encoding of its arguments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum StakingInstruction {
    ///   Create the global pool and record the administrator.
    ///
    ///   0. `[s, w]` Administrator, pays for the global pool
    ///   1. `[w]` Global authority
    ///   2. `[]` System program
    ///   3. `[]` Rent sysvar
    Initialize(InitializeArgs),

    ///   Record the owner of a freshly created, zeroed user pool account.
    ///
    ///   0. `[s, w]` Owner
    ///   1. `[w]` User pool
    InitializeUserPool,

    ///   Move tokens into the reward vault and append a stake entry.
    ///
    ///   0. `[s, w]` Owner
    ///   1. `[w]` Global authority
    ///   2. `[w]` User pool
    ///   3. `[w]` Reward vault
    ///   4. `[w]` Owner token account
    ///   5. `[]` Token program
    StakeFlwr(StakeFlwrArgs),

    ///   Settle every stake entry of the owner and pay out from the reward vault.
    ///
    ///   0. `[s, w]` Owner
    ///   1. `[w]` Global authority
    ///   2. `[w]` User pool
    ///   3. `[w]` Reward vault
    ///   4. `[w]` Owner token account
    ///   5. `[]` Token program
    UnstakeFlwr(UnstakeFlwrArgs),

    ///   Withdraw from the reward vault. Administrator only.
    ///
    ///   0. `[s, w]` Administrator
    ///   1. `[w]` Global authority
    ///   2. `[w]` Reward vault
    ///   3. `[w]` Administrator token account
    ///   4. `[]` Token program
    Withdraw(WithdrawArgs),
}
impl StakingInstruction {
    /// Method name as declared by the program.
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Method name as it appears in the interface definition.
    pub fn idl_name(&self) -> &'static str {
        match self {
            StakingInstruction::Initialize(_) => "initialize",
            StakingInstruction::InitializeUserPool => "initializeUserPool",
            StakingInstruction::StakeFlwr(_) => "stakeFlwr",
            StakingInstruction::UnstakeFlwr(_) => "unstakeFlwr",
            StakingInstruction::Withdraw(_) => "withdraw",
        }
    }

    /// Accounts the builder for this instruction passes, in order.
    pub fn accounts(&self) -> &'static [AccountSpec] {
        match self {
            StakingInstruction::Initialize(_) => INITIALIZE_ACCOUNTS,
            StakingInstruction::InitializeUserPool => INITIALIZE_USER_POOL_ACCOUNTS,
            StakingInstruction::StakeFlwr(_) | StakingInstruction::UnstakeFlwr(_) => STAKE_ACCOUNTS,
            StakingInstruction::Withdraw(_) => WITHDRAW_ACCOUNTS,
        }
    }

    /// Argument names and borsh types, in encoding order.
    pub fn args(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            StakingInstruction::Initialize(_) | StakingInstruction::UnstakeFlwr(_) => {
                &[("globalBump", "u8")]
            }
            StakingInstruction::InitializeUserPool => &[],
            StakingInstruction::StakeFlwr(_) => {
                &[("globalBump", "u8"), ("amount", "u64"), ("period", "u8")]
            }
            StakingInstruction::Withdraw(_) => &[("globalBump", "u8"), ("amount", "u64")],
        }
    }

    /// Anchor method discriminator: the first 8 bytes of `sha256("global:<name>")`.
    pub fn discriminator(&self) -> [u8; METHOD_DISCRIMINATOR_LEN] {
        method_discriminator(self.name())
    }

    /// Serialize as instruction data.
    pub fn data(&self) -> Vec<u8> {
        let mut data = self.discriminator().to_vec();
        let args = match self {
            StakingInstruction::Initialize(args) => args.try_to_vec(),
            StakingInstruction::InitializeUserPool => Ok(vec![]),
            StakingInstruction::StakeFlwr(args) => args.try_to_vec(),
            StakingInstruction::UnstakeFlwr(args) => args.try_to_vec(),
            StakingInstruction::Withdraw(args) => args.try_to_vec(),
        };
        data.extend(args.unwrap());
        data
    }

    /// Deserialize instruction data.
    pub fn unpack(data: &[u8]) -> Result<Self, StakingClientError> {
        if data.len() < METHOD_DISCRIMINATOR_LEN {
            return Err(StakingClientError::InvalidInstructionData);
        }
        let (discriminator, rest) = data.split_at(METHOD_DISCRIMINATOR_LEN);

        let instruction = match discriminator {
            d if d == method_discriminator("initialize") => {
                StakingInstruction::Initialize(decode_args(rest)?)
            }
            d if d == method_discriminator("initialize_user_pool") => {
                StakingInstruction::InitializeUserPool
            }
            d if d == method_discriminator("stake_flwr") => {
                StakingInstruction::StakeFlwr(decode_args(rest)?)
            }
            d if d == method_discriminator("unstake_flwr") => {
                StakingInstruction::UnstakeFlwr(decode_args(rest)?)
            }
            d if d == method_discriminator("withdraw") => {
                StakingInstruction::Withdraw(decode_args(rest)?)
            }
            _ => return Err(StakingClientError::InvalidInstructionData),
        };
        Ok(instruction)
    }
}

fn decode_args<T: BorshDeserialize>(data: &[u8]) -> Result<T, StakingClientError> {
    T::try_from_slice(data).map_err(|_| StakingClientError::InvalidInstructionData)
}

/// Anchor method discriminator for `name`.
pub fn method_discriminator(name: &str) -> [u8; METHOD_DISCRIMINATOR_LEN] {
    let mut discriminator = [0; METHOD_DISCRIMINATOR_LEN];
    discriminator.copy_from_slice(
        &hash(format!("global:{name}").as_bytes()).to_bytes()[..METHOD_DISCRIMINATOR_LEN],
    );
    discriminator
}

/// Creates an `Initialize` instruction.
pub fn initialize(config: &StakingConfig, admin: &Pubkey) -> Instruction {
    let data = StakingInstruction::Initialize(InitializeArgs {
        global_bump: config.global_bump,
    })
    .data();

    let accounts = vec![
        AccountMeta::new(*admin, true),
        AccountMeta::new(config.global_authority, false),
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new_readonly(sysvar::rent::id(), false),
    ];

    Instruction {
        program_id: config.program_id,
        accounts,
        data,
    }
}

/// Creates all necessary instructions to create and initialize a user pool.
/// `lamports` should be the rent-exempt minimum for `USER_POOL_SIZE` bytes.
pub fn create_user_pool(
    config: &StakingConfig,
    owner: &Pubkey,
    user_pool: &Pubkey,
    lamports: u64,
) -> Vec<Instruction> {
    vec![
        system_instruction::create_account_with_seed(
            owner,
            user_pool,
            owner,
            config.user_pool_seed(),
            lamports,
            USER_POOL_SIZE as u64,
            &config.program_id,
        ),
        initialize_user_pool(config, owner, user_pool),
    ]
}

/// Creates an `InitializeUserPool` instruction.
pub fn initialize_user_pool(config: &StakingConfig, owner: &Pubkey, user_pool: &Pubkey) -> Instruction {
    let data = StakingInstruction::InitializeUserPool.data();
    let accounts = vec![
        AccountMeta::new(*owner, true),
        AccountMeta::new(*user_pool, false),
    ];

    Instruction {
        program_id: config.program_id,
        accounts,
        data,
    }
}

/// Creates a `StakeFlwr` instruction.
pub fn stake_flwr(
    config: &StakingConfig,
    owner: &Pubkey,
    user_pool: &Pubkey,
    user_token_account: &Pubkey,
    amount: u64,
    period: u8,
) -> Instruction {
    let data = StakingInstruction::StakeFlwr(StakeFlwrArgs {
        global_bump: config.global_bump,
        amount,
        period,
    })
    .data();

    let accounts = vec![
        AccountMeta::new(*owner, true),
        AccountMeta::new(config.global_authority, false),
        AccountMeta::new(*user_pool, false),
        AccountMeta::new(config.reward_vault, false),
        AccountMeta::new(*user_token_account, false),
        AccountMeta::new_readonly(config.token_program_id, false),
    ];

    Instruction {
        program_id: config.program_id,
        accounts,
        data,
    }
}

/// Creates an `UnstakeFlwr` instruction.
pub fn unstake_flwr(
    config: &StakingConfig,
    owner: &Pubkey,
    user_pool: &Pubkey,
    user_token_account: &Pubkey,
) -> Instruction {
    let data = StakingInstruction::UnstakeFlwr(UnstakeFlwrArgs {
        global_bump: config.global_bump,
    })
    .data();

    let accounts = vec![
        AccountMeta::new(*owner, true),
        AccountMeta::new(config.global_authority, false),
        AccountMeta::new(*user_pool, false),
        AccountMeta::new(config.reward_vault, false),
        AccountMeta::new(*user_token_account, false),
        AccountMeta::new_readonly(config.token_program_id, false),
    ];

    Instruction {
        program_id: config.program_id,
        accounts,
        data,
    }
}

/// Creates a `Withdraw` instruction.
pub fn withdraw(
    config: &StakingConfig,
    admin: &Pubkey,
    admin_token_account: &Pubkey,
    amount: u64,
) -> Instruction {
    let data = StakingInstruction::Withdraw(WithdrawArgs {
        global_bump: config.global_bump,
        amount,
    })
    .data();

    let accounts = vec![
        AccountMeta::new(*admin, true),
        AccountMeta::new(config.global_authority, false),
        AccountMeta::new(config.reward_vault, false),
        AccountMeta::new(*admin_token_account, false),
        AccountMeta::new_readonly(config.token_program_id, false),
    ];

    Instruction {
        program_id: config.program_id,
        accounts,
        data,
    }
}

/// Creates an instruction creating the associated token account `address`
/// of `wallet` for `mint`, under the configured associated token program.
pub fn create_associated_token_account(
    config: &StakingConfig,
    funding: &Pubkey,
    address: &Pubkey,
    wallet: &Pubkey,
    mint: &Pubkey,
) -> Instruction {
    let data = AssociatedTokenAccountInstruction::Create
        .try_to_vec()
        .unwrap();

    let accounts = vec![
        AccountMeta::new(*funding, true),
        AccountMeta::new(*address, false),
        AccountMeta::new_readonly(*wallet, false),
        AccountMeta::new_readonly(*mint, false),
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new_readonly(config.token_program_id, false),
    ];

    Instruction {
        program_id: config.associated_token_program_id,
        accounts,
        data,
    }
}
