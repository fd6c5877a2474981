//! Login challenge construction.
//!
//! A challenge is the exact text a wallet signs to prove key ownership:
//! domain, address, statement, nonce, chain id, and validity window. The
//! server keeps the full text so verification recovers over the same
//! bytes it issued.

use crate::error::AppError;
use crate::models::StoredChallenge;
use base64::{engine::general_purpose, Engine as _};
use rand::Rng;

/// Statement shown in the wallet's signing prompt. Signing proves key
/// ownership only; it never triggers a transaction.
const STATEMENT: &str = "Signing proves you control this wallet. \
This request will not trigger a blockchain transaction or cost any gas fees.";

/// Generate a cryptographically random challenge nonce.
///
/// Returns a base64-encoded string (44 characters) from 32 random bytes.
pub fn generate_challenge_nonce() -> String {
    let mut rng = rand::rng();
    let mut bytes = [0u8; 32];
    rng.fill(&mut bytes);
    general_purpose::STANDARD.encode(bytes)
}

/// Validate a wallet address and normalize it to lowercase hex.
///
/// Accepts `0x` + 40 hex chars in any case; everything downstream
/// (storage keys, JWT claims, comparisons) uses the lowercase form.
pub fn normalize_wallet_address(address: &str) -> Result<String, AppError> {
    let hex_part = address
        .strip_prefix("0x")
        .ok_or_else(|| AppError::BadRequest("Address must start with 0x".to_string()))?;

    if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AppError::BadRequest(
            "Address must be 0x followed by 40 hex characters".to_string(),
        ));
    }

    Ok(address.to_lowercase())
}

/// Build a challenge for a wallet on one chain.
///
/// `now` is the issuance time in unix seconds; the expiry window bounds
/// replay risk and is enforced both by the storage TTL and by an explicit
/// check at verification time.
pub fn build_challenge(
    address: &str,
    chain_id: u64,
    domain: &str,
    ttl_secs: u64,
    now: u64,
) -> StoredChallenge {
    let nonce = generate_challenge_nonce();
    let expires_at = now + ttl_secs;

    let message = format!(
        "{domain} wants you to sign in with your Ethereum account:\n\
         {address}\n\
         \n\
         {STATEMENT}\n\
         \n\
         URI: https://{domain}\n\
         Version: 1\n\
         Chain ID: {chain_id}\n\
         Nonce: {nonce}\n\
         Issued At: {now}\n\
         Expiration Time: {expires_at}"
    );

    StoredChallenge {
        wallet_address: address.to_string(),
        chain_id,
        nonce,
        message,
        issued_at: now,
        expires_at,
        domain: domain.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose;

    #[test]
    fn test_generate_challenge_nonce() {
        let nonce = generate_challenge_nonce();

        // Base64 of 32 bytes is 44 characters (with padding)
        assert_eq!(nonce.len(), 44);

        // Verify it decodes to the full 256 bits of entropy
        let decoded = general_purpose::STANDARD.decode(&nonce).unwrap();
        assert_eq!(decoded.len(), 32);
    }

    #[test]
    fn test_nonces_are_unique() {
        let nonce1 = generate_challenge_nonce();
        let nonce2 = generate_challenge_nonce();
        assert_ne!(nonce1, nonce2);
    }

    #[test]
    fn test_normalize_wallet_address() {
        let addr = normalize_wallet_address("0x71C7656EC7ab88b098defB751B7401B5f6d8976F").unwrap();
        assert_eq!(addr, "0x71c7656ec7ab88b098defb751b7401b5f6d8976f");
    }

    #[test]
    fn test_invalid_addresses_rejected() {
        for bad in [
            "",
            "0x",
            "71c7656ec7ab88b098defb751b7401b5f6d8976f", // missing prefix
            "0x71c7656ec7ab88b098defb751b7401b5f6d8976",  // 39 chars
            "0x71c7656ec7ab88b098defb751b7401b5f6d8976fa", // 41 chars
            "0xg1c7656ec7ab88b098defb751b7401b5f6d8976f", // non-hex
        ] {
            assert!(
                normalize_wallet_address(bad).is_err(),
                "expected rejection: {bad}"
            );
        }
    }

    #[test]
    fn test_challenge_message_binds_all_fields() {
        let addr = "0x71c7656ec7ab88b098defb751b7401b5f6d8976f";
        let c = build_challenge(addr, 11155111, "rooms.example", 300, 1_700_000_000);

        assert_eq!(c.wallet_address, addr);
        assert_eq!(c.chain_id, 11155111);
        assert_eq!(c.issued_at, 1_700_000_000);
        assert_eq!(c.expires_at, 1_700_000_300);

        assert!(c.message.contains("rooms.example"));
        assert!(c.message.contains(addr));
        assert!(c.message.contains("Chain ID: 11155111"));
        assert!(c.message.contains(&c.nonce));
        assert!(c.message.contains("Expiration Time: 1700000300"));
    }

    #[test]
    fn test_reissued_challenges_differ() {
        let addr = "0x71c7656ec7ab88b098defb751b7401b5f6d8976f";
        let a = build_challenge(addr, 1, "rooms.example", 300, 1_700_000_000);
        let b = build_challenge(addr, 1, "rooms.example", 300, 1_700_000_000);
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.message, b.message);
    }
}
