//! The RPC seam between the client and a cluster

use {
    crate::error::StakingClientError,
    log::debug,
    solana_client::nonblocking::rpc_client::RpcClient,
    solana_program::{instruction::Instruction, pubkey::Pubkey},
    solana_sdk::{
        account::Account,
        commitment_config::CommitmentConfig,
        signature::{Keypair, Signature, Signer},
        transaction::Transaction,
    },
};

/// What the staking operations need from a cluster.
///
/// Transactions are signed and paid for by `payer`. No method retries; any
/// timeout policy belongs to the implementation.
#[allow(async_fn_in_trait)]
pub trait StakingRpc {
    /// Fee payer and signer of every submitted transaction.
    fn payer(&self) -> Pubkey;

    /// Look up an account. `Ok(None)` means the account does not exist.
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, StakingClientError>;

    /// Minimum balance for an account of `data_len` bytes to be rent exempt.
    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, StakingClientError>;

    /// Sign and submit a transaction made of `instructions`.
    async fn submit(&self, instructions: &[Instruction]) -> Result<Signature, StakingClientError>;

    /// Wait until `signature` reaches `commitment`, failing if the transaction
    /// failed or never lands.
    async fn confirm(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<(), StakingClientError>;
}

/// `StakingRpc` over a JSON RPC node.
pub struct RpcStakingClient {
    rpc_client: RpcClient,
    payer: Keypair,
}
impl RpcStakingClient {
    /// Wrap `rpc_client`, signing with `payer`.
    pub fn new(rpc_client: RpcClient, payer: Keypair) -> Self {
        Self { rpc_client, payer }
    }

    /// The underlying RPC client.
    pub fn rpc_client(&self) -> &RpcClient {
        &self.rpc_client
    }
}

impl StakingRpc for RpcStakingClient {
    fn payer(&self) -> Pubkey {
        self.payer.pubkey()
    }

    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, StakingClientError> {
        Ok(self
            .rpc_client
            .get_account_with_commitment(address, self.rpc_client.commitment())
            .await?
            .value)
    }

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, StakingClientError> {
        Ok(self
            .rpc_client
            .get_minimum_balance_for_rent_exemption(data_len)
            .await?)
    }

    async fn submit(&self, instructions: &[Instruction]) -> Result<Signature, StakingClientError> {
        let blockhash = self.rpc_client.get_latest_blockhash().await?;
        let transaction = Transaction::new_signed_with_payer(
            instructions,
            Some(&self.payer.pubkey()),
            &[&self.payer],
            blockhash,
        );
        let signature = self.rpc_client.send_transaction(&transaction).await?;
        debug!("submitted {signature}");
        Ok(signature)
    }

    async fn confirm(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<(), StakingClientError> {
        self.rpc_client
            .poll_for_signature_with_commitment(signature, commitment)
            .await?;

        match self
            .rpc_client
            .get_signature_status_with_commitment(signature, commitment)
            .await?
        {
            Some(Ok(())) => Ok(()),
            Some(Err(error)) => Err(StakingClientError::TransactionFailed {
                signature: *signature,
                error,
            }),
            None => Err(StakingClientError::TransactionUnconfirmed(*signature)),
        }
    }
}
