//! Challenge Redis operations.
//!
//! Redis key pattern: `challenge:{wallet}` — challenge data (JSON).
//!
//! A wallet holds at most one outstanding challenge. `SET ... EX` on a
//! fixed per-wallet key gives the atomic replace-if-exists: re-issuing
//! overwrites the prior challenge in one write, so whichever of two
//! concurrent issuances lands last is the only one live. Consumption is
//! an atomic Lua compare-and-delete keyed on the nonce: the challenge is
//! destroyed only when the caller presents the nonce of the live
//! issuance, so a login over a replaced challenge finds nothing and
//! leaves the live one intact.
//!
//! The raw JSON buffer read back from Redis is wrapped in `Zeroizing`,
//! clearing that copy after deserialization; the deserialized struct
//! itself lives only as long as the login pipeline.

use crate::models::StoredChallenge;
use redis::AsyncCommands;
use zeroize::Zeroizing;

fn challenge_key(wallet_address: &str) -> String {
    format!("challenge:{}", wallet_address)
}

/// Store a challenge, replacing any outstanding one for this wallet.
///
/// TTL enforces expiry server-side even if the client never completes
/// the login.
pub async fn store_challenge<C>(
    con: &mut C,
    challenge: &StoredChallenge,
    ttl_secs: u64,
) -> Result<(), redis::RedisError>
where
    C: AsyncCommands,
{
    let key = challenge_key(&challenge.wallet_address);
    let json = super::to_json(challenge)?;

    con.set_ex::<_, _, ()>(&key, json, ttl_secs).await?;
    Ok(())
}

/// Consume the wallet's challenge if `nonce` matches the live issuance.
///
/// Atomic Lua compare-and-delete: two concurrent login attempts consume
/// the challenge at most once, and a stale nonce (from a challenge that
/// was since replaced) returns `None` without deleting anything.
pub async fn consume_challenge<C>(
    con: &mut C,
    wallet_address: &str,
    nonce: &str,
) -> Result<Option<StoredChallenge>, redis::RedisError>
where
    C: AsyncCommands,
{
    let key = challenge_key(wallet_address);

    let script = redis::Script::new(
        r"
        local val = redis.call('GET', KEYS[1])
        if not val then
            return false
        end
        if cjson.decode(val)['nonce'] ~= ARGV[1] then
            return false
        end
        redis.call('DEL', KEYS[1])
        return val
        ",
    );

    let json: Option<String> = script.key(&key).arg(nonce).invoke_async(con).await?;

    match json {
        Some(data) => {
            // The raw JSON copy is cleared when this binding drops
            let zeroizing_data = Zeroizing::new(data);
            let challenge = super::from_json(&zeroizing_data)?;
            Ok(Some(challenge))
        }
        None => Ok(None),
    }
}
