//! Error types

use {
    solana_client::client_error::ClientError,
    solana_program::pubkey::{Pubkey, PubkeyError},
    solana_sdk::{signature::Signature, transaction::TransactionError},
    thiserror::Error,
};

/// Errors that may be returned by the staking client.
#[derive(Debug, Error)]
pub enum StakingClientError {
    // derivation
    /// No bump produced a valid program address.
    /// (This stands in for a failure that should never be reached in practice.)
    #[error("DerivationExhausted")]
    DerivationExhausted,
    /// Too many seeds, or a seed longer than the runtime allows.
    #[error("InvalidSeeds")]
    InvalidSeeds,
    /// Address-with-seed derivation rejected its inputs.
    #[error("InvalidSeed: {0}")]
    InvalidSeed(#[from] PubkeyError),

    // bootstrap
    /// The user pool could not be created and does not exist.
    #[error("BootstrapFailed: user pool {user_pool} was not created: {source}")]
    BootstrapFailed {
        /// Address of the user pool that was being created
        user_pool: Pubkey,
        /// Why the creation transaction did not land
        source: Box<StakingClientError>,
    },

    // transport
    /// The RPC node rejected a request or could not be reached.
    #[error("RpcFailure: {0}")]
    RpcFailure(Box<ClientError>),
    /// A submitted transaction was executed and failed.
    #[error("TransactionFailed: {signature}: {error}")]
    TransactionFailed {
        /// Signature of the failed transaction
        signature: Signature,
        /// Error reported by the runtime
        error: TransactionError,
    },
    /// A submitted transaction never reached the requested commitment.
    #[error("TransactionUnconfirmed: {0}")]
    TransactionUnconfirmed(Signature),

    // account data
    /// Account data is shorter than the record it should hold.
    #[error("AccountDataTooSmall: expected {expected} bytes, found {actual}")]
    AccountDataTooSmall {
        /// Minimum length of the record
        expected: usize,
        /// Length of the account data
        actual: usize,
    },
    /// Account data does not start with the expected discriminator.
    #[error("InvalidDiscriminator")]
    InvalidDiscriminator,
    /// Account data could not be decoded.
    #[error("InvalidAccountData: {0}")]
    InvalidAccountData(String),
    /// A user pool holds at most a fixed number of stake entries.
    #[error("UserPoolCapacityExceeded: {0} entries")]
    UserPoolCapacityExceeded(usize),
    /// Instruction data does not match any staking instruction.
    #[error("InvalidInstructionData")]
    InvalidInstructionData,

    // interface definition
    /// The interface definition document is missing something the client needs.
    #[error("InvalidIdl: {0}")]
    InvalidIdl(String),
    /// Reading the interface definition document failed.
    #[error("Io: {0}")]
    Io(#[from] std::io::Error),
    /// Parsing the interface definition document failed.
    #[error("Json: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ClientError> for StakingClientError {
    fn from(e: ClientError) -> Self {
        StakingClientError::RpcFailure(Box::new(e))
    }
}
