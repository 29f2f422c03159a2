//! Token program instructions used by the faucet.
//!
//! Only the two instructions a disbursement needs are encoded here: creating
//! the recipient's associated token account and a `TransferChecked` out of the
//! faucet's own account. Both layouts are shared by the legacy SPL Token
//! program and Token-2022.

use serde::{Deserialize, Serialize};
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey,
    pubkey::Pubkey,
    system_program,
};
use std::fmt;
use std::str::FromStr;

pub const TOKEN_PROGRAM_ID: Pubkey = pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");
pub const TOKEN_2022_PROGRAM_ID: Pubkey = pubkey!("TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb");
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey =
    pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

/// `AssociatedTokenAccountInstruction::Create`
const CREATE_ASSOCIATED_ACCOUNT: u8 = 0;
/// `TokenInstruction::TransferChecked`
const TRANSFER_CHECKED: u8 = 12;

/// Which token program owns the faucet's mint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenProgram {
    /// Legacy SPL Token program
    #[serde(alias = "spl-token")]
    Token,
    #[default]
    #[serde(rename = "token-2022", alias = "token2022")]
    Token2022,
}

impl TokenProgram {
    pub fn id(&self) -> Pubkey {
        match self {
            TokenProgram::Token => TOKEN_PROGRAM_ID,
            TokenProgram::Token2022 => TOKEN_2022_PROGRAM_ID,
        }
    }
}

impl fmt::Display for TokenProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenProgram::Token => write!(f, "token"),
            TokenProgram::Token2022 => write!(f, "token-2022"),
        }
    }
}

impl FromStr for TokenProgram {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "token" | "spl-token" => Ok(TokenProgram::Token),
            "token-2022" | "token2022" => Ok(TokenProgram::Token2022),
            other => Err(format!("Unknown token program: {}", other)),
        }
    }
}

/// Derives the associated token account of `owner` for `mint`.
pub fn associated_token_address(owner: &Pubkey, mint: &Pubkey, token_program: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[owner.as_ref(), token_program.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
    .0
}

/// Creates the associated token account of `owner` for `mint`, funded by `payer`.
pub fn create_associated_token_account(
    payer: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
    token_program: &Pubkey,
) -> Instruction {
    let associated_account = associated_token_address(owner, mint, token_program);

    Instruction::new_with_bytes(
        ASSOCIATED_TOKEN_PROGRAM_ID,
        &[CREATE_ASSOCIATED_ACCOUNT],
        vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new(associated_account, false),
            AccountMeta::new_readonly(*owner, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new_readonly(system_program::id(), false),
            AccountMeta::new_readonly(*token_program, false),
        ],
    )
}

/// Moves `amount` base units from `source` to `destination`.
///
/// The program rejects the transfer unless `decimals` matches the mint.
pub fn transfer_checked(
    token_program: &Pubkey,
    source: &Pubkey,
    mint: &Pubkey,
    destination: &Pubkey,
    authority: &Pubkey,
    amount: u64,
    decimals: u8,
) -> Instruction {
    let mut data = Vec::with_capacity(10);
    data.push(TRANSFER_CHECKED);
    data.extend_from_slice(&amount.to_le_bytes());
    data.push(decimals);

    Instruction::new_with_bytes(
        *token_program,
        &data,
        vec![
            AccountMeta::new(*source, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new(*destination, false),
            AccountMeta::new_readonly(*authority, true),
        ],
    )
}

/// Decoded `TransferChecked` payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferCheckedData {
    pub amount: u64,
    pub decimals: u8,
}

impl TransferCheckedData {
    pub fn unpack(input: &[u8]) -> Option<Self> {
        let (&tag, rest) = input.split_first()?;
        if tag != TRANSFER_CHECKED || rest.len() != 9 {
            return None;
        }
        let amount = u64::from_le_bytes(rest[..8].try_into().ok()?);
        Some(Self {
            amount,
            decimals: rest[8],
        })
    }
}

/// Whether `instruction` creates an associated token account
pub fn is_create_associated_account(instruction: &Instruction) -> bool {
    instruction.program_id == ASSOCIATED_TOKEN_PROGRAM_ID
        && instruction.data.first() == Some(&CREATE_ASSOCIATED_ACCOUNT)
}
