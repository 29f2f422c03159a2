//! Ledger access for the faucet

pub mod token;

use crate::error::{LedgerError, LedgerResult};
use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::Transaction,
};
use tracing::{debug, info};

/// Operations the disbursement handler needs from the ledger
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Whether `account` exists and is owned by `token_program`.
    async fn token_account_exists(
        &self,
        account: &Pubkey,
        token_program: &Pubkey,
    ) -> LedgerResult<bool>;

    /// Signs `instructions` as one transaction paid by `signer`, submits it and
    /// waits for confirmation.
    async fn submit(&self, instructions: &[Instruction], signer: &Keypair)
        -> LedgerResult<Signature>;
}

/// Solana JSON-RPC ledger client
pub struct SolanaLedger {
    client: RpcClient,
    commitment: CommitmentConfig,
}

impl SolanaLedger {
    /// Creates a client reading at `confirmed` commitment. No request is made
    /// until the first call.
    pub fn new(rpc_url: String) -> Self {
        let commitment = CommitmentConfig::confirmed();
        Self {
            client: RpcClient::new_with_commitment(rpc_url, commitment),
            commitment,
        }
    }

    pub fn url(&self) -> String {
        self.client.url()
    }
}

#[async_trait]
impl Ledger for SolanaLedger {
    async fn token_account_exists(
        &self,
        account: &Pubkey,
        token_program: &Pubkey,
    ) -> LedgerResult<bool> {
        let response = self
            .client
            .get_account_with_commitment(account, self.commitment)
            .await
            .map_err(|e| LedgerError::AccountLookupFailed(e.to_string()))?;

        let exists = response
            .value
            .map_or(false, |acc| acc.owner == *token_program);
        debug!("Token account {} exists: {}", account, exists);
        Ok(exists)
    }

    async fn submit(
        &self,
        instructions: &[Instruction],
        signer: &Keypair,
    ) -> LedgerResult<Signature> {
        let recent_blockhash = self
            .client
            .get_latest_blockhash()
            .await
            .map_err(|e| LedgerError::SubmissionFailed(e.to_string()))?;

        let transaction = Transaction::new_signed_with_payer(
            instructions,
            Some(&signer.pubkey()),
            &[signer],
            recent_blockhash,
        );

        let signature = self
            .client
            .send_and_confirm_transaction(&transaction)
            .await
            .map_err(|e| LedgerError::SubmissionFailed(e.to_string()))?;

        info!("Transaction confirmed: {}", signature);
        Ok(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_client_keeps_url() {
        let ledger = SolanaLedger::new("http://127.0.0.1:8899".to_string());
        assert_eq!(ledger.url(), "http://127.0.0.1:8899");
        assert_eq!(ledger.commitment, CommitmentConfig::confirmed());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_lookup_failure() {
        // Nothing listens on the discard port
        let ledger = SolanaLedger::new("http://127.0.0.1:9".to_string());
        let result = ledger
            .token_account_exists(&Pubkey::new_unique(), &token::TOKEN_2022_PROGRAM_ID)
            .await;
        assert!(matches!(result, Err(LedgerError::AccountLookupFailed(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_submission_failure() {
        let ledger = SolanaLedger::new("http://127.0.0.1:9".to_string());
        let result = ledger.submit(&[], &Keypair::new()).await;
        assert!(matches!(result, Err(LedgerError::SubmissionFailed(_))));
    }
}
