//! Authentication layer: wallet challenge issuance, EIP-191 signature
//! recovery, and stateless session tokens.

pub mod challenge;
pub mod middleware;
pub mod session;
pub mod verify;

pub use challenge::{build_challenge, generate_challenge_nonce, normalize_wallet_address};
pub use middleware::{check_rate_limit, AppState, AuthSession};
pub use session::{issue_session_token, validate_session_token};
pub use verify::recover_signer;
