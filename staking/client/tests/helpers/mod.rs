#![allow(dead_code)]

use {
    flwr_staking_client::{
        config::StakingConfig,
        error::StakingClientError,
        instruction::{StakeFlwrArgs, StakingInstruction},
        rpc::StakingRpc,
        state::{GlobalPool, StakeEntry, UserPool},
    },
    solana_client::client_error::{ClientError, ClientErrorKind},
    solana_program::{
        instruction::Instruction, pubkey::Pubkey, system_instruction::SystemInstruction,
        system_program,
    },
    solana_sdk::{
        account::Account, commitment_config::CommitmentConfig, signature::Signature,
    },
    std::{
        collections::{HashMap, HashSet},
        sync::Mutex,
    },
};

pub const TEST_STAKE_AMOUNT: u64 = 1_000;
pub const RENT_EXEMPT_USER_POOL: u64 = 9_577_920;
pub const TOKEN_ACCOUNT_LEN: usize = 165;
pub const START_TIME: i64 = 1_700_000_000;

// the deployed program uses one minute per month
pub const MONTH: i64 = 60;

pub const CREATE_ACCOUNT_WITH_SEED: &str = "create_account_with_seed";
pub const CREATE_ASSOCIATED_TOKEN_ACCOUNT: &str = "create_associated_token_account";

pub fn lock_time(period: u8) -> i64 {
    match period {
        6 => 6 * MONTH,
        12 => 12 * MONTH,
        _ => 4 * MONTH,
    }
}

fn rejected_error(message: impl Into<String>) -> StakingClientError {
    ClientError::from(ClientErrorKind::Custom(message.into())).into()
}

fn load_user_pool(
    accounts: &HashMap<Pubkey, Account>,
    address: &Pubkey,
) -> Result<UserPool, StakingClientError> {
    accounts
        .get(address)
        .ok_or_else(|| rejected_error("AccountNotInitialized: user_pool"))
        .and_then(|account| UserPool::unpack(&account.data))
}

fn store(accounts: &mut HashMap<Pubkey, Account>, address: Pubkey, data: Vec<u8>) {
    if let Some(account) = accounts.get_mut(&address) {
        account.data = data;
    }
}

#[derive(Default)]
struct Ledger {
    accounts: HashMap<Pubkey, Account>,
    transactions: Vec<Vec<Instruction>>,
    landed: HashMap<Signature, bool>,
    now: i64,
}

/// A `StakingRpc` that applies the staking program's account effects in memory.
pub struct TestLedger {
    payer: Pubkey,
    config: StakingConfig,
    ledger: Mutex<Ledger>,
    // transactions holding one of these never land
    dropped: Mutex<HashSet<&'static str>>,
    // transactions holding one of these fail at submit and leave no trace
    rejected: Mutex<HashSet<&'static str>>,
    // owner whose user pool another caller creates right before ours
    racing_owner: Mutex<Option<Pubkey>>,
}
impl TestLedger {
    pub fn new(config: &StakingConfig, payer: Pubkey) -> Self {
        Self {
            payer,
            config: config.clone(),
            ledger: Mutex::new(Ledger {
                now: START_TIME,
                ..Ledger::default()
            }),
            dropped: Mutex::new(HashSet::new()),
            rejected: Mutex::new(HashSet::new()),
            racing_owner: Mutex::new(None),
        }
    }

    /// Every later transaction containing `name` is accepted but never confirms.
    pub fn drop_transactions_with(&self, name: &'static str) {
        self.dropped.lock().unwrap().insert(name);
    }

    /// Every later transaction containing `name` is refused by the node, as
    /// when the payer cannot cover it. Nothing is recorded.
    pub fn reject_transactions_with(&self, name: &'static str) {
        self.rejected.lock().unwrap().insert(name);
    }

    /// The next user pool creation for `owner` loses a race to another caller.
    pub fn race_user_pool_creation(&self, owner: Pubkey) {
        *self.racing_owner.lock().unwrap() = Some(owner);
    }

    pub fn set_account(&self, address: Pubkey, account: Account) {
        self.ledger.lock().unwrap().accounts.insert(address, account);
    }

    pub fn account(&self, address: &Pubkey) -> Option<Account> {
        self.ledger.lock().unwrap().accounts.get(address).cloned()
    }

    pub fn transactions(&self) -> Vec<Vec<Instruction>> {
        self.ledger.lock().unwrap().transactions.clone()
    }

    /// How many submitted instructions, landed or not, were `name`.
    pub fn submitted(&self, name: &str) -> usize {
        self.transactions()
            .iter()
            .flatten()
            .filter(|instruction| self.name_of(instruction) == name)
            .count()
    }

    pub fn name_of(&self, instruction: &Instruction) -> &'static str {
        if instruction.program_id == system_program::id() {
            return match bincode::deserialize(&instruction.data) {
                Ok(SystemInstruction::CreateAccountWithSeed { .. }) => CREATE_ACCOUNT_WITH_SEED,
                _ => "system",
            };
        }
        if instruction.program_id == self.config.associated_token_program_id {
            return CREATE_ASSOCIATED_TOKEN_ACCOUNT;
        }
        StakingInstruction::unpack(&instruction.data)
            .map(|i| i.name())
            .unwrap_or("unknown")
    }

    fn user_pool_account(&self, owner: &Pubkey) -> Account {
        Account {
            lamports: RENT_EXEMPT_USER_POOL,
            data: UserPool::new(*owner).pack().unwrap(),
            owner: self.config.program_id,
            executable: false,
            rent_epoch: 0,
        }
    }

    fn load_global(
        &self,
        accounts: &HashMap<Pubkey, Account>,
    ) -> Result<GlobalPool, StakingClientError> {
        accounts
            .get(&self.config.global_authority)
            .ok_or_else(|| rejected_error("AccountNotInitialized: global_authority"))
            .and_then(|account| GlobalPool::unpack(&account.data))
    }

    fn process(
        &self,
        accounts: &mut HashMap<Pubkey, Account>,
        instruction: &Instruction,
        now: i64,
    ) -> Result<(), StakingClientError> {
        let key = |index: usize| instruction.accounts[index].pubkey;

        if instruction.program_id == system_program::id() {
            let Ok(SystemInstruction::CreateAccountWithSeed {
                base,
                seed,
                lamports,
                space,
                owner,
            }) = bincode::deserialize(&instruction.data)
            else {
                return Err(rejected_error("unsupported system instruction"));
            };
            let address = key(1);
            if Pubkey::create_with_seed(&base, &seed, &owner)? != address {
                return Err(rejected_error("create: address does not match base/seed"));
            }
            if accounts.contains_key(&address) {
                return Err(rejected_error(format!(
                    "Create Account: account Address {{ address: {address}, base: Some({base}) }} already in use"
                )));
            }
            accounts.insert(
                address,
                Account {
                    lamports,
                    data: vec![0; space as usize],
                    owner,
                    executable: false,
                    rent_epoch: 0,
                },
            );
            return Ok(());
        }

        if instruction.program_id == self.config.associated_token_program_id {
            accounts.entry(key(1)).or_insert_with(|| Account {
                lamports: 1,
                data: vec![0; TOKEN_ACCOUNT_LEN],
                owner: self.config.token_program_id,
                executable: false,
                rent_epoch: 0,
            });
            return Ok(());
        }

        if instruction.program_id != self.config.program_id {
            return Err(rejected_error("unknown program"));
        }

        match StakingInstruction::unpack(&instruction.data)? {
            StakingInstruction::Initialize(_) => {
                accounts.entry(key(1)).or_insert_with(|| Account {
                    lamports: 1,
                    data: GlobalPool {
                        admin: key(0),
                        ..GlobalPool::default()
                    }
                    .pack()
                    .unwrap(),
                    owner: self.config.program_id,
                    executable: false,
                    rent_epoch: 0,
                });
            }
            StakingInstruction::InitializeUserPool => {
                let account = accounts
                    .get(&key(1))
                    .ok_or_else(|| rejected_error("AccountNotInitialized: user_pool"))?;
                if account.owner != self.config.program_id || account.data.iter().any(|b| *b != 0)
                {
                    return Err(rejected_error("AccountDiscriminatorAlreadySet"));
                }
                let data = UserPool::new(key(0)).pack()?;
                store(accounts, key(1), data);
            }
            StakingInstruction::StakeFlwr(StakeFlwrArgs { amount, period, .. }) => {
                let mut global = self.load_global(accounts)?;
                let mut user_pool = load_user_pool(accounts, &key(2))?;
                user_pool.push(StakeEntry {
                    amount,
                    stake_time: now,
                    lock_time: lock_time(period),
                })?;

                global.staked_amount += amount;
                if user_pool.item_count() == 1 {
                    global.count += 1;
                }
                store(accounts, key(2), user_pool.pack()?);
                store(accounts, key(1), global.pack()?);
            }
            StakingInstruction::UnstakeFlwr(_) => {
                let mut global = self.load_global(accounts)?;
                let mut user_pool = load_user_pool(accounts, &key(2))?;
                if user_pool.owner != key(0) {
                    return Err(rejected_error("InvalidOwner"));
                }
                let staked: u64 = user_pool.items.iter().map(|item| item.amount).sum();
                user_pool.items.clear();

                global.count = global.count.saturating_sub(1);
                global.staked_amount = global.staked_amount.saturating_sub(staked);
                store(accounts, key(2), user_pool.pack()?);
                store(accounts, key(1), global.pack()?);
            }
            StakingInstruction::Withdraw(_) => {
                if self.load_global(accounts)?.admin != key(0) {
                    return Err(rejected_error("InvalidGlobalPool"));
                }
            }
        }
        Ok(())
    }
}

impl StakingRpc for TestLedger {
    fn payer(&self) -> Pubkey {
        self.payer
    }

    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, StakingClientError> {
        Ok(self.account(address))
    }

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        _data_len: usize,
    ) -> Result<u64, StakingClientError> {
        Ok(RENT_EXEMPT_USER_POOL)
    }

    async fn submit(&self, instructions: &[Instruction]) -> Result<Signature, StakingClientError> {
        let signature = Signature::new_unique();
        let names: Vec<&str> = instructions.iter().map(|i| self.name_of(i)).collect();

        let rejected = self.rejected.lock().unwrap();
        if let Some(name) = rejected.iter().find(|name| names.contains(*name)) {
            return Err(rejected_error(format!(
                "Transaction simulation failed: insufficient lamports for {name}"
            )));
        }

        let mut ledger = self.ledger.lock().unwrap();
        ledger.transactions.push(instructions.to_vec());

        if names.contains(&CREATE_ACCOUNT_WITH_SEED) {
            if let Some(owner) = self.racing_owner.lock().unwrap().take() {
                let address = self.config.user_pool_address(&owner)?;
                ledger.accounts.insert(address, self.user_pool_account(&owner));
            }
        }

        let dropped = self.dropped.lock().unwrap();
        if dropped.iter().any(|name| names.contains(name)) {
            ledger.landed.insert(signature, false);
            return Ok(signature);
        }

        // preflight: nothing changes unless every instruction succeeds
        let now = ledger.now;
        let mut accounts = ledger.accounts.clone();
        for instruction in instructions {
            self.process(&mut accounts, instruction, now)?;
        }
        ledger.accounts = accounts;
        ledger.landed.insert(signature, true);
        ledger.now += 1;
        Ok(signature)
    }

    async fn confirm(
        &self,
        signature: &Signature,
        _commitment: CommitmentConfig,
    ) -> Result<(), StakingClientError> {
        match self.ledger.lock().unwrap().landed.get(signature) {
            Some(true) => Ok(()),
            _ => Err(StakingClientError::TransactionUnconfirmed(*signature)),
        }
    }
}

/// Addresses shared by the integration tests.
pub struct StakingAccounts {
    pub config: StakingConfig,
    pub admin: Pubkey,
    pub alice: Pubkey,
    pub bob: Pubkey,
}
impl StakingAccounts {
    /// A ledger paid for by `payer`, with the global pool initialized.
    pub async fn ledger(&self, payer: Pubkey) -> TestLedger {
        let ledger = TestLedger::new(&self.config, payer);
        flwr_staking_client::client::initialize(&ledger, &self.config, &self.admin)
            .await
            .unwrap();
        ledger
    }
}
impl Default for StakingAccounts {
    fn default() -> Self {
        Self {
            config: StakingConfig::new(
                flwr_staking_client::id(),
                flwr_staking_client::reward_mint::id(),
            )
            .unwrap(),
            admin: Pubkey::new_unique(),
            alice: Pubkey::new_unique(),
            bob: Pubkey::new_unique(),
        }
    }
}
