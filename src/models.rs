//! Request and response models for the API.
//!
//! All models use serde for serialization/deserialization.
//! Storage models represent Redis data structures.

use serde::{Deserialize, Serialize};

// ============================================================================
// Auth Models
// ============================================================================

/// Request for a login challenge.
#[derive(Debug, Deserialize)]
pub struct ChallengeRequest {
    /// Wallet address, `0x` + 40 hex chars.
    pub address: String,
    /// Chain the challenge is scoped to (e.g. 11155111 for Sepolia).
    pub chain_id: u64,
}

/// Response containing the challenge message for wallet-side signing.
#[derive(Debug, Serialize)]
pub struct ChallengeResponse {
    /// Exact text the wallet must sign.
    pub message: String,
    pub nonce: String, // base64
    pub expires_at: u64,
}

/// Request to complete login with a signed challenge.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub address: String,
    /// 65-byte r||s||v signature, hex (with or without 0x prefix).
    pub signature: String,
    /// Nonce of the challenge that was signed. Identifies which issuance
    /// the signature belongs to; a nonce that no longer matches the live
    /// challenge is rejected without consuming anything.
    pub nonce: String,
}

/// Response after the session probe.
#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub logged_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

// ============================================================================
// Chatroom Models
// ============================================================================

/// Request to create a chatroom.
#[derive(Debug, Deserialize)]
pub struct CreateChatroomRequest {
    pub name: String,
    pub purpose: String,
}

/// Chatroom as returned to clients.
#[derive(Debug, Serialize)]
pub struct ChatroomInfo {
    pub id: String,
    pub creator_id: String,
    pub name: String,
    pub purpose: String,
    pub is_active: bool,
    pub created_at: u64,
}

/// Request to post a message into a chatroom.
#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    pub message: String,
}

/// Pagination for message listing.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    #[serde(default)]
    pub offset: usize,
    pub limit: Option<usize>,
}

/// A decoded message as returned to chatroom members.
#[derive(Debug, Serialize)]
pub struct MessageInfo {
    pub sender_id: String,
    pub message: String,
    pub sent_at: u64,
}

// ============================================================================
// Meeting Models
// ============================================================================

/// Request to create a meeting.
#[derive(Debug, Deserialize)]
pub struct CreateMeetingRequest {
    pub title: String,
    /// Identifier of the external video session the meeting wraps.
    pub session_id: String,
    #[serde(default)]
    pub token_gated: bool,
    pub token_address: Option<String>,
    pub token_standard: Option<String>,
}

/// Meeting as returned to clients.
#[derive(Debug, Serialize)]
pub struct MeetingInfo {
    pub id: String,
    pub host_id: String,
    pub title: String,
    pub session_id: String,
    pub token_gated: bool,
    pub token_address: Option<String>,
    pub token_standard: Option<String>,
    pub is_active: bool,
    pub participants: Vec<String>,
    pub created_at: u64,
}

// ============================================================================
// Storage Models
// ============================================================================

/// User data as stored in Redis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredUser {
    pub id: String,
    /// Lowercase `0x...` address; unique per user.
    pub wallet_address: String,
    pub display_name: String,
    pub created_at: u64,
}

/// Challenge data as stored in Redis. Single-use; at most one per wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChallenge {
    pub wallet_address: String,
    pub chain_id: u64,
    pub nonce: String, // base64
    /// Exact bytes the wallet signs, kept so verification recovers over
    /// the same message that was issued.
    pub message: String,
    pub issued_at: u64,
    pub expires_at: u64,
    pub domain: String,
}

/// Chatroom data as stored in Redis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChatroom {
    pub id: String,
    pub creator_id: String,
    pub name: String,
    pub purpose: String,
    pub is_active: bool,
    pub created_at: u64,
}

/// Meeting data as stored in Redis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMeeting {
    pub id: String,
    pub host_id: String,
    pub title: String,
    pub session_id: String,
    pub token_gated: bool,
    pub token_address: Option<String>,
    pub token_standard: Option<String>,
    pub is_active: bool,
    pub created_at: u64,
}

/// Message as stored in a chatroom's message list. Payload is ciphertext
/// from the confidentiality layer, base64-encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    pub sender_id: String,
    pub ciphertext: String, // base64
    pub sent_at: u64,
}

impl StoredChatroom {
    pub fn to_info(&self) -> ChatroomInfo {
        ChatroomInfo {
            id: self.id.clone(),
            creator_id: self.creator_id.clone(),
            name: self.name.clone(),
            purpose: self.purpose.clone(),
            is_active: self.is_active,
            created_at: self.created_at,
        }
    }
}

impl StoredMeeting {
    pub fn to_info(&self, participants: Vec<String>) -> MeetingInfo {
        MeetingInfo {
            id: self.id.clone(),
            host_id: self.host_id.clone(),
            title: self.title.clone(),
            session_id: self.session_id.clone(),
            token_gated: self.token_gated,
            token_address: self.token_address.clone(),
            token_standard: self.token_standard.clone(),
            is_active: self.is_active,
            participants,
            created_at: self.created_at,
        }
    }
}
