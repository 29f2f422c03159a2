//! Faucet configuration

use crate::captcha::DEFAULT_VERIFY_URL;
use crate::ledger::token::TokenProgram;
use ::config::{Config, File};
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use solana_sdk::{pubkey::Pubkey, signature::Keypair};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";

/// Faucet service configuration
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct FaucetConfig {
    /// Server address
    pub server_addr: String,

    /// Solana JSON-RPC endpoint
    pub rpc_url: String,

    /// Faucet secret key, base-58 encoded 64-byte keypair
    pub faucet_private_key: Option<String>,

    /// Mint of the token being handed out
    pub token_mint: Option<String>,

    /// Program owning the mint
    pub token_program: TokenProgram,

    /// Decimals of the mint
    pub token_decimals: u8,

    /// reCAPTCHA secret key
    pub recaptcha_secret: Option<String>,

    /// reCAPTCHA site key, handed to the browser
    pub recaptcha_site_key: Option<String>,

    /// reCAPTCHA siteverify endpoint
    pub recaptcha_verify_url: String,

    /// Enable CORS
    pub cors_enabled: bool,
}

impl Default for FaucetConfig {
    fn default() -> Self {
        Self {
            server_addr: "0.0.0.0:3000".to_string(),
            rpc_url: DEFAULT_RPC_URL.to_string(),
            faucet_private_key: None,
            token_mint: None,
            token_program: TokenProgram::Token2022,
            token_decimals: 9,
            recaptcha_secret: None,
            recaptcha_site_key: None,
            recaptcha_verify_url: DEFAULT_VERIFY_URL.to_string(),
            cors_enabled: true,
        }
    }
}

impl fmt::Debug for FaucetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FaucetConfig")
            .field("server_addr", &self.server_addr)
            .field("rpc_url", &self.rpc_url)
            .field(
                "faucet_private_key",
                &self.faucet_private_key.as_ref().map(|_| "<redacted>"),
            )
            .field("token_mint", &self.token_mint)
            .field("token_program", &self.token_program)
            .field("token_decimals", &self.token_decimals)
            .field(
                "recaptcha_secret",
                &self.recaptcha_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("recaptcha_site_key", &self.recaptcha_site_key)
            .field("recaptcha_verify_url", &self.recaptcha_verify_url)
            .field("cors_enabled", &self.cors_enabled)
            .finish()
    }
}

impl FaucetConfig {
    /// Defaults, then the optional config file, then environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load from a TOML, YAML or JSON file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let path_str = path.to_str().context("Invalid config path")?;

        let settings = Config::builder()
            .add_source(File::with_name(path_str))
            .build()
            .context("Failed to build configuration")?;

        settings
            .try_deserialize::<Self>()
            .context("Failed to deserialize configuration")
    }

    /// Overrides fields with the variables `lookup` knows about.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("FAUCET_SERVER_ADDR") {
            self.server_addr = addr;
        }

        if let Some(rpc_url) = lookup("SOLANA_RPC_URL") {
            self.rpc_url = rpc_url;
        }

        if let Some(key) = lookup("SOLANA_FAUCET_PK") {
            self.faucet_private_key = Some(key);
        }

        if let Some(mint) = lookup("SOLANA_TOKEN_MINT") {
            self.token_mint = Some(mint);
        }

        if let Some(program) = lookup("SOLANA_TOKEN_PROGRAM") {
            self.token_program = program.parse().map_err(|e: String| anyhow!(e))?;
        }

        if let Some(decimals) = lookup("SOLANA_TOKEN_DECIMALS") {
            self.token_decimals = decimals
                .parse()
                .with_context(|| format!("Invalid SOLANA_TOKEN_DECIMALS: {}", decimals))?;
        }

        if let Some(secret) = lookup("RECAPTCHA_SECRET_KEY") {
            self.recaptcha_secret = Some(secret);
        }

        if let Some(site_key) = lookup("RECAPTCHA_SITE_KEY") {
            self.recaptcha_site_key = Some(site_key);
        }

        if let Some(url) = lookup("RECAPTCHA_VERIFY_URL") {
            self.recaptcha_verify_url = url;
        }

        if let Some(enabled) = lookup("FAUCET_CORS_ENABLED") {
            self.cors_enabled = enabled.to_lowercase() == "true";
        }

        Ok(())
    }

    /// Decodes the faucet keypair. `None` when no key is configured.
    pub fn faucet_keypair(&self) -> Result<Option<Keypair>> {
        let Some(encoded) = non_empty(&self.faucet_private_key) else {
            return Ok(None);
        };

        let bytes = bs58::decode(encoded.trim())
            .into_vec()
            .context("Faucet private key is not valid base-58")?;
        let keypair = Keypair::from_bytes(&bytes)
            .map_err(|_| anyhow!("Faucet private key is not a 64-byte ed25519 keypair"))?;

        Ok(Some(keypair))
    }

    /// Parses the token mint. `None` when no mint is configured.
    pub fn token_mint_pubkey(&self) -> Result<Option<Pubkey>> {
        non_empty(&self.token_mint)
            .map(|mint| {
                Pubkey::from_str(mint.trim())
                    .with_context(|| format!("Invalid token mint: {}", mint))
            })
            .transpose()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}
