//! Identity registry: wallet address -> application user record.
//!
//! Users are created lazily on first successful login and never deleted
//! here. Uniqueness is enforced by the storage layer's SET NX on the
//! wallet index, not by application-level locking: when two first logins
//! race, one claim wins and the loser falls back to reading the winner's
//! record.

use crate::error::AppError;
use crate::models::StoredUser;
use crate::storage;
use redis::AsyncCommands;
use std::time::{SystemTime, UNIX_EPOCH};

/// Default display name: truncated wallet address, e.g. `0x71c7...976f`.
fn default_display_name(wallet_address: &str) -> String {
    if wallet_address.len() == 42 {
        format!(
            "{}...{}",
            &wallet_address[..6],
            &wallet_address[wallet_address.len() - 4..]
        )
    } else {
        wallet_address.to_string()
    }
}

/// Resolve the user for a wallet address, creating one on first login.
///
/// Idempotent: concurrent calls for the same wallet yield exactly one
/// user record. Never returns a partial record; a lost creation race
/// cleans up its own write before re-reading.
pub async fn resolve_or_create<C>(con: &mut C, wallet_address: &str) -> Result<StoredUser, AppError>
where
    C: AsyncCommands,
{
    if let Some(user) = storage::user::get_user_by_wallet(con, wallet_address).await? {
        return Ok(user);
    }

    let user = StoredUser {
        id: nanoid::nanoid!(12),
        wallet_address: wallet_address.to_string(),
        display_name: default_display_name(wallet_address),
        created_at: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs(),
    };

    // Record first, then claim the index: a visible index entry must
    // always point at a complete record.
    storage::user::store_user(con, &user).await?;
    let claimed = storage::user::claim_wallet_index(con, wallet_address, &user.id).await?;

    if claimed {
        tracing::info!(
            action = "user_created",
            user_id = %user.id,
            wallet = %user.wallet_address,
            "New user registered on first login"
        );
        return Ok(user);
    }

    // Lost the race: drop our orphan record and read the winner's.
    storage::user::delete_user_record(con, &user.id).await?;
    storage::user::get_user_by_wallet(con, wallet_address)
        .await?
        .ok_or_else(|| {
            AppError::Dependency("User record missing after concurrent creation".to_string())
        })
}
