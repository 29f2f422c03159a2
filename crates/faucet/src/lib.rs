//! SPL token faucet service
//!
//! Sends a fixed amount of a pre-minted token to any Solana wallet that passes
//! a reCAPTCHA check:
//! - reCAPTCHA verification
//! - Wallet address validation
//! - Associated token account creation on first use
//! - `TransferChecked` out of the faucet's own token account

pub mod address;
pub mod api;
pub mod captcha;
pub mod config;
pub mod error;
pub mod ledger;
pub mod service;

pub use captcha::{RecaptchaVerifier, Verifier};
pub use config::FaucetConfig;
pub use error::{FaucetError, FaucetResult, LedgerError, LedgerResult};
pub use ledger::{Ledger, SolanaLedger};
pub use service::{DisburseRequest, Disbursement, FaucetService, FaucetStatus, DISBURSE_AMOUNT};
