//! User Redis operations.
//!
//! Redis key patterns:
//! - `user:{nanoid}` — individual user data (JSON)
//! - `wallet:{address}` — wallet lookup to user_id (STRING)
//!
//! The wallet index is the uniqueness constraint: it is only ever written
//! with SET NX, so exactly one user id can claim a wallet address. User
//! records are permanent; this layer never expires or deletes users on
//! its own (the only deletion is the registry cleaning up a record that
//! lost a creation race).

use crate::models::StoredUser;
use redis::AsyncCommands;

fn user_key(id: &str) -> String {
    format!("user:{}", id)
}

fn wallet_key(address: &str) -> String {
    format!("wallet:{}", address)
}

/// Store a user record (no TTL; users are permanent).
pub async fn store_user<C>(con: &mut C, user: &StoredUser) -> Result<(), redis::RedisError>
where
    C: AsyncCommands,
{
    let json = super::to_json(user)?;
    con.set::<_, _, ()>(&user_key(&user.id), json).await?;
    Ok(())
}

/// Claim the wallet index for a user id with SET NX.
///
/// Returns true if this call won the claim, false if another user id
/// already holds the wallet address.
pub async fn claim_wallet_index<C>(
    con: &mut C,
    wallet_address: &str,
    user_id: &str,
) -> Result<bool, redis::RedisError>
where
    C: AsyncCommands,
{
    let claimed: bool = con.set_nx(&wallet_key(wallet_address), user_id).await?;
    Ok(claimed)
}

/// Get a user by ID.
pub async fn get_user<C>(con: &mut C, id: &str) -> Result<Option<StoredUser>, redis::RedisError>
where
    C: AsyncCommands,
{
    let json: Option<String> = con.get(&user_key(id)).await?;

    match json {
        Some(data) => Ok(Some(super::from_json(&data)?)),
        None => Ok(None),
    }
}

/// Get a user by wallet address.
///
/// Performs a two-step lookup: wallet -> user_id -> user data.
pub async fn get_user_by_wallet<C>(
    con: &mut C,
    wallet_address: &str,
) -> Result<Option<StoredUser>, redis::RedisError>
where
    C: AsyncCommands,
{
    let user_id: Option<String> = con.get(&wallet_key(wallet_address)).await?;

    match user_id {
        Some(id) => get_user(con, &id).await,
        None => Ok(None),
    }
}

/// Delete a user record only (not the wallet index).
///
/// Used by the registry to clean up a record that lost a creation race;
/// the race loser never owned the index.
pub async fn delete_user_record<C>(con: &mut C, id: &str) -> Result<(), redis::RedisError>
where
    C: AsyncCommands,
{
    con.del::<_, ()>(&user_key(id)).await?;
    Ok(())
}
