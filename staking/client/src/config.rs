//! Client configuration and the program interface definition

use {
    crate::{
        error::StakingClientError, find_associated_token_address, find_global_authority_address,
        get_user_pool_address, instruction::StakingInstruction, state, USER_POOL_SEED,
    },
    log::debug,
    serde::Deserialize,
    serde_json::Value,
    solana_program::pubkey::Pubkey,
    std::{fs, path::Path, str::FromStr},
    strum::IntoEnumIterator,
};

/// Addresses every operation needs. Resolved once at startup and read-only
/// afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StakingConfig {
    /// Staking program
    pub program_id: Pubkey,
    /// FLWR mint
    pub reward_mint: Pubkey,
    /// Token program owning FLWR token accounts
    pub token_program_id: Pubkey,
    /// Associated token account program
    pub associated_token_program_id: Pubkey,
    /// Global authority, which holds the `GlobalPool` record
    pub global_authority: Pubkey,
    /// Bump of the global authority
    pub global_bump: u8,
    /// Associated token account of the global authority for the reward mint
    pub reward_vault: Pubkey,
}
impl StakingConfig {
    /// Resolve addresses for `program_id` with the SPL token program.
    pub fn new(program_id: Pubkey, reward_mint: Pubkey) -> Result<Self, StakingClientError> {
        Self::with_token_program(
            program_id,
            reward_mint,
            spl_token::id(),
            spl_associated_token_account::id(),
        )
    }

    /// Resolve addresses for `program_id` with explicit token programs.
    pub fn with_token_program(
        program_id: Pubkey,
        reward_mint: Pubkey,
        token_program_id: Pubkey,
        associated_token_program_id: Pubkey,
    ) -> Result<Self, StakingClientError> {
        let (global_authority, global_bump) = find_global_authority_address(&program_id)?;
        let (reward_vault, _) = find_associated_token_address(
            &global_authority,
            &reward_mint,
            &token_program_id,
            &associated_token_program_id,
        )?;

        Ok(Self {
            program_id,
            reward_mint,
            token_program_id,
            associated_token_program_id,
            global_authority,
            global_bump,
            reward_vault,
        })
    }

    /// Resolve addresses for the program described by `idl`.
    pub fn from_idl(idl: &Idl, reward_mint: Pubkey) -> Result<Self, StakingClientError> {
        idl.validate()?;
        Self::new(idl.program_id()?, reward_mint)
    }

    /// Seed of every user pool account.
    pub fn user_pool_seed(&self) -> &'static str {
        USER_POOL_SEED
    }

    /// User pool address of `owner`.
    pub fn user_pool_address(&self, owner: &Pubkey) -> Result<Pubkey, StakingClientError> {
        get_user_pool_address(owner, &self.program_id)
    }

    /// Associated token account of `owner` for `mint`.
    pub fn associated_token_address(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
    ) -> Result<Pubkey, StakingClientError> {
        find_associated_token_address(
            owner,
            mint,
            &self.token_program_id,
            &self.associated_token_program_id,
        )
        .map(|(address, _)| address)
    }

    /// FLWR token account of `owner`.
    pub fn user_token_account(&self, owner: &Pubkey) -> Result<Pubkey, StakingClientError> {
        self.associated_token_address(owner, &self.reward_mint)
    }
}

/// The subset of an Anchor IDL document the client relies on.
#[derive(Clone, Debug, Deserialize)]
pub struct Idl {
    /// Program name
    pub name: String,
    /// Declared instructions
    pub instructions: Vec<IdlInstruction>,
    /// Declared account types
    #[serde(default)]
    pub accounts: Vec<IdlItem>,
    /// Deployment metadata
    #[serde(default)]
    pub metadata: Option<IdlMetadata>,
}

/// A declared instruction: its accounts and arguments, in order.
#[derive(Clone, Debug, Deserialize)]
pub struct IdlInstruction {
    /// Method name, camelCase
    pub name: String,
    /// Accounts the instruction takes
    #[serde(default)]
    pub accounts: Vec<IdlAccount>,
    /// Arguments, in encoding order
    #[serde(default)]
    pub args: Vec<IdlField>,
}

/// An account of a declared instruction.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdlAccount {
    /// Account name
    pub name: String,
    /// Whether the account is writable
    pub is_mut: bool,
    /// Whether the account signs
    pub is_signer: bool,
}

/// A named, typed argument.
#[derive(Clone, Debug, Deserialize)]
pub struct IdlField {
    /// Argument name
    pub name: String,
    /// Type, either a primitive name or a nested type description
    #[serde(rename = "type")]
    pub ty: Value,
}

/// A named IDL entry.
#[derive(Clone, Debug, Deserialize)]
pub struct IdlItem {
    /// Name as it appears in the document
    pub name: String,
}

/// IDL deployment metadata.
#[derive(Clone, Debug, Deserialize)]
pub struct IdlMetadata {
    /// Base58 program address
    pub address: String,
}

fn invalid(message: String) -> StakingClientError {
    StakingClientError::InvalidIdl(message)
}

impl IdlInstruction {
    // the builder for `instruction` must pass exactly the declared accounts and arguments
    fn check(&self, instruction: &StakingInstruction) -> Result<(), StakingClientError> {
        let accounts = instruction.accounts();
        if self.accounts.len() != accounts.len() {
            return Err(invalid(format!(
                "{} declares {} accounts, the client passes {}",
                self.name,
                self.accounts.len(),
                accounts.len()
            )));
        }
        for (index, (declared, passed)) in self.accounts.iter().zip(accounts).enumerate() {
            if declared.name != passed.name
                || declared.is_mut != passed.is_mut
                || declared.is_signer != passed.is_signer
            {
                return Err(invalid(format!(
                    "{} account {index} is declared as {} (mut: {}, signer: {}), the client passes {} (mut: {}, signer: {})",
                    self.name,
                    declared.name,
                    declared.is_mut,
                    declared.is_signer,
                    passed.name,
                    passed.is_mut,
                    passed.is_signer
                )));
            }
        }

        let args = instruction.args();
        let declared: Vec<(&str, Option<&str>)> = self
            .args
            .iter()
            .map(|arg| (arg.name.as_str(), arg.ty.as_str()))
            .collect();
        let encoded: Vec<(&str, Option<&str>)> =
            args.iter().map(|(name, ty)| (*name, Some(*ty))).collect();
        if declared != encoded {
            return Err(invalid(format!(
                "{} declares arguments {declared:?}, the client encodes {encoded:?}",
                self.name
            )));
        }
        Ok(())
    }
}

impl Idl {
    /// Load an IDL document from disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StakingClientError> {
        let path = path.as_ref();
        debug!("loading interface definition {}", path.display());
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Load `file_name` from the first of `dirs` that contains it.
    pub fn from_search_path<I, P>(file_name: &str, dirs: I) -> Result<Self, StakingClientError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut searched = vec![];
        for dir in dirs {
            let path = dir.as_ref().join(file_name);
            if path.is_file() {
                return Self::from_file(path);
            }
            searched.push(path.display().to_string());
        }
        Err(invalid(format!(
            "{file_name} not found, searched {}",
            searched.join(", ")
        )))
    }

    /// Parse an IDL document.
    pub fn from_json(json: &str) -> Result<Self, StakingClientError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Address the program is deployed at.
    pub fn program_id(&self) -> Result<Pubkey, StakingClientError> {
        let metadata = self
            .metadata
            .as_ref()
            .ok_or_else(|| invalid("missing metadata.address".into()))?;
        Pubkey::from_str(&metadata.address)
            .map_err(|e| invalid(format!("bad program address {}: {e}", metadata.address)))
    }

    /// Check that every instruction the client builds is declared with the
    /// same accounts and arguments, and that both account types are declared.
    pub fn validate(&self) -> Result<(), StakingClientError> {
        for instruction in StakingInstruction::iter() {
            let name = instruction.idl_name();
            self.instructions
                .iter()
                .find(|item| item.name == name)
                .ok_or_else(|| invalid(format!("instruction {name} is not declared")))?
                .check(&instruction)?;
        }
        for name in [state::GlobalPool::NAME, state::UserPool::NAME] {
            if !self.accounts.iter().any(|item| item.name == name) {
                return Err(invalid(format!("account {name} is not declared")));
            }
        }
        Ok(())
    }
}
