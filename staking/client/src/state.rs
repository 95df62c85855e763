//! Account layouts of the staking program

use {
    crate::error::StakingClientError,
    borsh::{BorshDeserialize, BorshSerialize},
    bytemuck::{Pod, Zeroable},
    solana_program::{hash::hash, pubkey::Pubkey},
};

/// Length of the Anchor account discriminator prefix.
pub const DISCRIMINATOR_LEN: usize = 8;

/// Maximum number of stake entries a user pool can hold.
pub const USER_POOL_MAX_ITEMS: usize = 50;

/// Size of a user pool account. Fixed when the account is created.
pub const USER_POOL_SIZE: usize = 1248;

const _: () = assert!(DISCRIMINATOR_LEN + std::mem::size_of::<UserPoolData>() == USER_POOL_SIZE);

/// Anchor account discriminator: the first 8 bytes of `sha256("account:<name>")`.
pub fn account_discriminator(name: &str) -> [u8; DISCRIMINATOR_LEN] {
    let mut discriminator = [0; DISCRIMINATOR_LEN];
    discriminator.copy_from_slice(&hash(format!("account:{name}").as_bytes()).to_bytes()[..8]);
    discriminator
}

fn check_discriminator(name: &str, data: &[u8], min_len: usize) -> Result<(), StakingClientError> {
    if data.len() < min_len {
        return Err(StakingClientError::AccountDataTooSmall {
            expected: min_len,
            actual: data.len(),
        });
    }
    if data[..DISCRIMINATOR_LEN] != account_discriminator(name) {
        return Err(StakingClientError::InvalidDiscriminator);
    }
    Ok(())
}

/// Singleton record at the global authority address.
#[derive(Clone, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct GlobalPool {
    /// Administrator allowed to withdraw from the reward vault
    pub admin: Pubkey,
    /// Number of owners with an active stake
    pub count: u64,
    /// Total amount staked across all user pools
    pub staked_amount: u64,
}
impl GlobalPool {
    /// Account type name, as declared by the program.
    pub const NAME: &'static str = "GlobalPool";
    /// Serialized size including the discriminator.
    pub const LEN: usize = DISCRIMINATOR_LEN + 32 + 8 + 8;

    /// Decode a `GlobalPool` from raw account data.
    pub fn unpack(data: &[u8]) -> Result<Self, StakingClientError> {
        check_discriminator(Self::NAME, data, Self::LEN)?;
        Self::deserialize(&mut &data[DISCRIMINATOR_LEN..])
            .map_err(|e| StakingClientError::InvalidAccountData(e.to_string()))
    }

    /// Encode as raw account data.
    pub fn pack(&self) -> Result<Vec<u8>, StakingClientError> {
        let mut data = Vec::with_capacity(Self::LEN);
        data.extend_from_slice(&account_discriminator(Self::NAME));
        self.serialize(&mut data)?;
        Ok(data)
    }
}

/// One stake, as recorded by `stake_flwr`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct StakeEntry {
    /// Amount of FLWR base units staked
    pub amount: u64,
    /// Unix timestamp of the stake
    pub stake_time: i64,
    /// Lock duration in seconds
    pub lock_time: i64,
}

// zero-copy layout of a user pool after its discriminator
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct UserPoolData {
    owner: Pubkey,
    item_count: u64,
    items: [StakeEntry; USER_POOL_MAX_ITEMS],
}

/// Per-owner record of stake entries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserPool {
    /// Owner of the pool
    pub owner: Pubkey,
    /// Active stake entries, in the order they were made
    pub items: Vec<StakeEntry>,
}
impl UserPool {
    /// Account type name, as declared by the program.
    pub const NAME: &'static str = "UserPool";

    /// Create an empty pool for `owner`.
    pub fn new(owner: Pubkey) -> Self {
        Self {
            owner,
            items: vec![],
        }
    }

    /// Number of active stake entries.
    pub fn item_count(&self) -> u64 {
        self.items.len() as u64
    }

    /// Append a stake entry, failing when the pool is full.
    pub fn push(&mut self, item: StakeEntry) -> Result<(), StakingClientError> {
        if self.items.len() >= USER_POOL_MAX_ITEMS {
            return Err(StakingClientError::UserPoolCapacityExceeded(
                self.items.len() + 1,
            ));
        }
        self.items.push(item);
        Ok(())
    }

    /// Decode a `UserPool` from raw account data.
    pub fn unpack(data: &[u8]) -> Result<Self, StakingClientError> {
        check_discriminator(Self::NAME, data, USER_POOL_SIZE)?;
        let raw: UserPoolData = bytemuck::pod_read_unaligned(&data[DISCRIMINATOR_LEN..USER_POOL_SIZE]);

        let item_count = usize::try_from(raw.item_count)
            .ok()
            .filter(|count| *count <= USER_POOL_MAX_ITEMS)
            .ok_or_else(|| {
                StakingClientError::InvalidAccountData(format!(
                    "item count {} exceeds capacity",
                    raw.item_count
                ))
            })?;

        Ok(Self {
            owner: raw.owner,
            items: raw.items[..item_count].to_vec(),
        })
    }

    /// Encode as raw account data of exactly `USER_POOL_SIZE` bytes.
    pub fn pack(&self) -> Result<Vec<u8>, StakingClientError> {
        if self.items.len() > USER_POOL_MAX_ITEMS {
            return Err(StakingClientError::UserPoolCapacityExceeded(
                self.items.len(),
            ));
        }

        let mut raw = UserPoolData::zeroed();
        raw.owner = self.owner;
        raw.item_count = self.item_count();
        raw.items[..self.items.len()].copy_from_slice(&self.items);

        let mut data = Vec::with_capacity(USER_POOL_SIZE);
        data.extend_from_slice(&account_discriminator(Self::NAME));
        data.extend_from_slice(bytemuck::bytes_of(&raw));
        Ok(data)
    }
}

/// Lock periods understood by the program. Any other month count is locked
/// for four months on chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockPeriod {
    /// Four months
    FourMonths,
    /// Six months
    SixMonths,
    /// One year
    TwelveMonths,
}
impl LockPeriod {
    /// Month count passed to `stake_flwr`.
    pub fn months(self) -> u8 {
        match self {
            LockPeriod::FourMonths => 4,
            LockPeriod::SixMonths => 6,
            LockPeriod::TwelveMonths => 12,
        }
    }

    /// The period the program applies for a raw month count.
    pub fn from_months(months: u8) -> Self {
        match months {
            6 => LockPeriod::SixMonths,
            12 => LockPeriod::TwelveMonths,
            _ => LockPeriod::FourMonths,
        }
    }
}
