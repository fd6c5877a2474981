//! Resource-scoped confidentiality layer for message payloads.
//!
//! Messages are encoded before they are written to storage and decoded
//! when served to an authorized member, keyed per chatroom so a payload
//! lifted from one room's list is garbage under another room's key.
//!
//! **This is a placeholder, not real encryption.** The XOR keystream
//! provides no ciphertext integrity and no forward secrecy; anyone who
//! knows the chatroom id can derive the key. It exists to fix the
//! encode/decode seam in the message path. Swapping in an authenticated
//! encryption scheme means writing another [`MessageCipher`] impl; no
//! caller changes.

use sha3::{Digest, Keccak256};

/// A derivation key tied to a specific chatroom or meeting.
#[derive(Clone)]
pub struct ScopeKey([u8; 32]);

impl ScopeKey {
    /// Derive the scope key for a resource id.
    pub fn for_resource(resource_id: &str) -> Self {
        let mut hasher = Keccak256::new();
        hasher.update(b"roomgate-scope:");
        hasher.update(resource_id.as_bytes());
        Self(hasher.finalize().into())
    }

    fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// Encode/decode seam for message payloads.
pub trait MessageCipher: Send + Sync {
    fn encode(&self, plaintext: &[u8], key: &ScopeKey) -> Vec<u8>;
    fn decode(&self, ciphertext: &[u8], key: &ScopeKey) -> Vec<u8>;
}

/// Byte-wise XOR against the scope key repeated to message length.
/// Symmetric: encode and decode are the same operation.
pub struct XorCipher;

impl XorCipher {
    fn keystream_apply(data: &[u8], key: &ScopeKey) -> Vec<u8> {
        let key_bytes = key.as_bytes();
        data.iter()
            .enumerate()
            .map(|(i, b)| b ^ key_bytes[i % key_bytes.len()])
            .collect()
    }
}

impl MessageCipher for XorCipher {
    fn encode(&self, plaintext: &[u8], key: &ScopeKey) -> Vec<u8> {
        Self::keystream_apply(plaintext, key)
    }

    fn decode(&self, ciphertext: &[u8], key: &ScopeKey) -> Vec<u8> {
        Self::keystream_apply(ciphertext, key)
    }
}
