//! Faucet service core logic

use super::address::parse_recipient;
use super::captcha::{RecaptchaVerifier, Verifier};
use super::config::FaucetConfig;
use super::error::{FaucetError, FaucetResult};
use super::ledger::token::{self, TokenProgram};
use super::ledger::{Ledger, SolanaLedger};
use serde::{Deserialize, Deserializer, Serialize};
use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Base units sent per request: 100 whole tokens at 9 decimals.
pub const DISBURSE_AMOUNT: u64 = 100 * 1_000_000_000;

/// Disbursement request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisburseRequest {
    #[serde(default, deserialize_with = "address_or_empty")]
    pub address: String,
    #[serde(default)]
    pub recaptcha_token: Option<String>,
}

/// Non-string addresses become empty and fail validation as `InvalidAddress`.
fn address_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(address) => address,
        _ => String::new(),
    })
}

/// Successful disbursement
#[derive(Debug, Clone, Serialize)]
pub struct Disbursement {
    pub success: bool,
    pub signature: String,
}

/// Faucet status, safe to publish
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaucetStatus {
    pub configured: bool,
    pub faucet_address: Option<String>,
    pub token_mint: Option<String>,
    pub token_program: String,
    pub amount: u64,
    pub decimals: u8,
    pub recaptcha_site_key: Option<String>,
}

/// Faucet service
pub struct FaucetService {
    ledger: Arc<dyn Ledger>,
    verifier: Arc<dyn Verifier>,
    signer: Option<Keypair>,
    mint: Option<Pubkey>,
    token_program: TokenProgram,
    decimals: u8,
    recaptcha_site_key: Option<String>,
}

impl FaucetService {
    /// Create the faucet service from configuration, talking to Solana and
    /// reCAPTCHA over the network.
    pub fn new(config: &FaucetConfig) -> anyhow::Result<Self> {
        let ledger = Arc::new(SolanaLedger::new(config.rpc_url.clone()));
        let verifier = Arc::new(RecaptchaVerifier::new(
            config.recaptcha_secret.clone(),
            config.recaptcha_verify_url.clone(),
        ));
        if !verifier.is_configured() {
            warn!("RECAPTCHA_SECRET_KEY is not set; every request will fail verification");
        }
        Self::with_backends(config, ledger, verifier)
    }

    /// Create the faucet service with explicit ledger and verifier backends.
    pub fn with_backends(
        config: &FaucetConfig,
        ledger: Arc<dyn Ledger>,
        verifier: Arc<dyn Verifier>,
    ) -> anyhow::Result<Self> {
        let signer = config.faucet_keypair()?;
        let mint = config.token_mint_pubkey()?;

        match (&signer, &mint) {
            (Some(signer), Some(mint)) => {
                info!("Faucet address: {}", signer.pubkey());
                info!("Token mint: {} ({})", mint, config.token_program);
            }
            _ => error!("Faucet signing key or token mint is not set; disbursements are disabled"),
        }

        Ok(Self {
            ledger,
            verifier,
            signer,
            mint,
            token_program: config.token_program,
            decimals: config.token_decimals,
            recaptcha_site_key: config.recaptcha_site_key.clone(),
        })
    }

    /// Send the fixed token amount to the requested address.
    pub async fn disburse(
        &self,
        request: &DisburseRequest,
        remote_ip: Option<IpAddr>,
    ) -> FaucetResult<Disbursement> {
        // 1. Bot check token must be present
        let token = request
            .recaptcha_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(FaucetError::MissingToken)?;

        // 2. Bot check
        if !self.verifier.verify(token, remote_ip).await {
            warn!("Verification failed for address {}", request.address);
            return Err(FaucetError::VerificationFailed);
        }

        // 3. Address
        let recipient = parse_recipient(&request.address).ok_or(FaucetError::InvalidAddress)?;

        // 4. Server-side configuration
        let (Some(signer), Some(mint)) = (self.signer.as_ref(), self.mint.as_ref()) else {
            error!("Disbursement requested but the faucet is not configured");
            return Err(FaucetError::NotConfigured);
        };

        // 5-8. Accounts and instructions
        let program_id = self.token_program.id();
        let recipient_account = token::associated_token_address(&recipient, mint, &program_id);
        debug!("Recipient token account: {}", recipient_account);

        let recipient_exists = match self
            .ledger
            .token_account_exists(&recipient_account, &program_id)
            .await
        {
            Ok(exists) => exists,
            Err(e) => {
                warn!("{}; creating {}", e, recipient_account);
                false
            }
        };

        let instructions = disbursement_instructions(
            &signer.pubkey(),
            &recipient,
            mint,
            &program_id,
            self.decimals,
            recipient_exists,
        );

        // 9-10. Sign, submit, confirm
        let signature = self
            .ledger
            .submit(&instructions, signer)
            .await
            .map_err(|e| {
                error!("Error sending transaction to {}: {}", recipient, e);
                FaucetError::from(e)
            })?;

        info!(
            "Sent {} base units to {}, signature {}",
            DISBURSE_AMOUNT, recipient, signature
        );

        Ok(Disbursement {
            success: true,
            signature: signature.to_string(),
        })
    }

    /// Run the bot check on its own.
    pub async fn verify_token(&self, token: &str, remote_ip: Option<IpAddr>) -> bool {
        self.verifier.verify(token, remote_ip).await
    }

    /// Get faucet status
    pub fn status(&self) -> FaucetStatus {
        FaucetStatus {
            configured: self.signer.is_some() && self.mint.is_some(),
            faucet_address: self.signer.as_ref().map(|s| s.pubkey().to_string()),
            token_mint: self.mint.map(|m| m.to_string()),
            token_program: self.token_program.to_string(),
            amount: DISBURSE_AMOUNT,
            decimals: self.decimals,
            recaptcha_site_key: self.recaptcha_site_key.clone(),
        }
    }
}

/// Instructions moving [`DISBURSE_AMOUNT`] from the faucet to `recipient`.
///
/// The recipient's associated token account is created first, in the same
/// transaction, when it does not exist yet.
pub fn disbursement_instructions(
    faucet: &Pubkey,
    recipient: &Pubkey,
    mint: &Pubkey,
    token_program: &Pubkey,
    decimals: u8,
    recipient_exists: bool,
) -> Vec<Instruction> {
    let source = token::associated_token_address(faucet, mint, token_program);
    let destination = token::associated_token_address(recipient, mint, token_program);

    let mut instructions = Vec::with_capacity(2);
    if !recipient_exists {
        instructions.push(token::create_associated_token_account(
            faucet,
            recipient,
            mint,
            token_program,
        ));
    }
    instructions.push(token::transfer_checked(
        token_program,
        &source,
        mint,
        &destination,
        faucet,
        DISBURSE_AMOUNT,
        decimals,
    ));
    instructions
}
