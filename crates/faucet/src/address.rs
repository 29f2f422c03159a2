//! Recipient address validation

use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

/// Shortest base-58 rendering of a 32-byte public key.
pub const MIN_ADDRESS_LEN: usize = 32;
/// Longest base-58 rendering of a 32-byte public key.
pub const MAX_ADDRESS_LEN: usize = 44;

fn is_base58_char(c: char) -> bool {
    matches!(c, '1'..='9' | 'A'..='H' | 'J'..='N' | 'P'..='Z' | 'a'..='k' | 'm'..='z')
}

/// Checks the shape of a Solana address: 32 to 44 base-58 characters.
pub fn is_valid_address(address: &str) -> bool {
    (MIN_ADDRESS_LEN..=MAX_ADDRESS_LEN).contains(&address.len())
        && address.chars().all(is_base58_char)
}

/// Parses a recipient wallet address.
///
/// Returns `None` unless the address passes [`is_valid_address`], decodes to
/// exactly 32 bytes and is an ed25519 point. Off-curve keys belong to program
/// derived accounts, which cannot own an associated token account.
pub fn parse_recipient(address: &str) -> Option<Pubkey> {
    if !is_valid_address(address) {
        return None;
    }
    let pubkey = Pubkey::from_str(address).ok()?;
    pubkey.is_on_curve().then_some(pubkey)
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::signature::{Keypair, Signer};

    #[test]
    fn test_accepts_wallet_addresses() {
        let wallet = Keypair::new().pubkey().to_string();
        assert!(is_valid_address(&wallet));
        assert!(is_valid_address("11111111111111111111111111111111"));
        assert!(is_valid_address("TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb"));
    }

    #[test]
    fn test_rejects_excluded_characters() {
        for bad in ['0', 'O', 'I', 'l'] {
            let address = format!("{}{}", bad, "1".repeat(40));
            assert!(!is_valid_address(&address), "accepted {}", address);
        }
        assert!(!is_valid_address("not-a-valid-address!"));
    }

    #[test]
    fn test_length_bounds() {
        assert!(!is_valid_address(""));
        assert!(!is_valid_address(&"2".repeat(31)));
        assert!(is_valid_address(&"2".repeat(32)));
        assert!(is_valid_address(&"2".repeat(44)));
        assert!(!is_valid_address(&"2".repeat(45)));
    }

    #[test]
    fn test_rejects_non_ascii() {
        let address = format!("{}é", "2".repeat(40));
        assert!(!is_valid_address(&address));
    }

    #[test]
    fn test_parse_recipient() {
        let wallet = Keypair::new().pubkey();
        assert_eq!(parse_recipient(&wallet.to_string()), Some(wallet));

        // 44 characters of 'z' overflow 32 bytes
        assert!(parse_recipient(&"z".repeat(44)).is_none());
        assert!(parse_recipient("not-a-valid-address!").is_none());
    }

    #[test]
    fn test_parse_recipient_rejects_off_curve_owner() {
        let (pda, _) = Pubkey::find_program_address(&[b"faucet"], &Pubkey::new_unique());
        assert!(is_valid_address(&pda.to_string()));
        assert!(parse_recipient(&pda.to_string()).is_none());
    }
}
