//! EIP-191 signature recovery.
//!
//! Wallets sign personal messages prefixed with
//! `"\x19Ethereum Signed Message:\n" + len(message)`. Recovery yields the
//! signer's secp256k1 public key; the address is the last 20 bytes of
//! keccak256 of the uncompressed key.

use crate::error::AppError;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use sha3::{Digest, Keccak256};

/// Keccak-256 digest of the EIP-191 prefixed message.
pub fn eip191_digest(message: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(b"\x19Ethereum Signed Message:\n");
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message);
    hasher.finalize().into()
}

/// Derive the lowercase `0x...` address from a recovered public key.
fn address_from_key(key: &VerifyingKey) -> String {
    let point = key.to_encoded_point(false);
    // Skip the 0x04 uncompressed-point tag byte
    let hash: [u8; 32] = Keccak256::digest(&point.as_bytes()[1..]).into();
    format!("0x{}", hex::encode(&hash[12..]))
}

/// Recover the signer address of an EIP-191 personal message.
///
/// # Arguments
/// * `message` - The exact message bytes that were signed (unprefixed)
/// * `signature_hex` - 65-byte `r||s||v` signature, hex, optional 0x prefix
///
/// # Returns
/// * `Ok(address)` - lowercase `0x...` address of the signer
/// * `Err(AppError::BadRequest)` - signature hex malformed or wrong length
/// * `Err(AppError::SignatureInvalid)` - recovery failed
pub fn recover_signer(message: &[u8], signature_hex: &str) -> Result<String, AppError> {
    let sig_hex = signature_hex.strip_prefix("0x").unwrap_or(signature_hex);
    let sig_bytes = hex::decode(sig_hex)
        .map_err(|e| AppError::BadRequest(format!("Invalid signature hex: {}", e)))?;

    if sig_bytes.len() != 65 {
        return Err(AppError::BadRequest(format!(
            "Invalid signature length: expected 65 bytes, got {}",
            sig_bytes.len()
        )));
    }

    let signature =
        Signature::from_slice(&sig_bytes[..64]).map_err(|_| AppError::SignatureInvalid)?;

    // Wallets emit v as 27/28 (legacy) or 0/1
    let v = sig_bytes[64];
    let recovery_byte = if v >= 27 { v - 27 } else { v };
    let recovery_id = RecoveryId::from_byte(recovery_byte).ok_or(AppError::SignatureInvalid)?;

    let digest = eip191_digest(message);
    let key = VerifyingKey::recover_from_prehash(&digest, &signature, recovery_id)
        .map_err(|_| AppError::SignatureInvalid)?;

    Ok(address_from_key(&key))
}
