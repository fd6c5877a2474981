//! Meeting Redis operations.
//!
//! Redis key patterns:
//! - `meeting:{id}` — meeting data (JSON)
//! - `meeting_participants:{id}` — participant user ids (SET)

use crate::models::StoredMeeting;
use redis::AsyncCommands;

fn meeting_key(id: &str) -> String {
    format!("meeting:{}", id)
}

fn participants_key(id: &str) -> String {
    format!("meeting_participants:{}", id)
}

/// Store a meeting record.
pub async fn store_meeting<C>(con: &mut C, meeting: &StoredMeeting) -> Result<(), redis::RedisError>
where
    C: AsyncCommands,
{
    let json = super::to_json(meeting)?;
    con.set::<_, _, ()>(&meeting_key(&meeting.id), json).await?;
    Ok(())
}

/// Get a meeting by id.
pub async fn get_meeting<C>(
    con: &mut C,
    id: &str,
) -> Result<Option<StoredMeeting>, redis::RedisError>
where
    C: AsyncCommands,
{
    let json: Option<String> = con.get(&meeting_key(id)).await?;

    match json {
        Some(data) => Ok(Some(super::from_json(&data)?)),
        None => Ok(None),
    }
}

/// Mark a meeting as closed (one-way, mirrors chatrooms).
pub async fn set_meeting_inactive<C>(con: &mut C, id: &str) -> Result<(), redis::RedisError>
where
    C: AsyncCommands,
{
    if let Some(mut meeting) = get_meeting(con, id).await? {
        meeting.is_active = false;
        store_meeting(con, &meeting).await?;
    }
    Ok(())
}

/// Add a participant. The participant list only grows through this
/// operation; SADD makes repeated joins idempotent.
pub async fn add_participant<C>(
    con: &mut C,
    meeting_id: &str,
    user_id: &str,
) -> Result<bool, redis::RedisError>
where
    C: AsyncCommands,
{
    let added: i32 = con.sadd(&participants_key(meeting_id), user_id).await?;
    Ok(added > 0)
}

/// Get all participant user ids.
pub async fn get_participants<C>(
    con: &mut C,
    meeting_id: &str,
) -> Result<Vec<String>, redis::RedisError>
where
    C: AsyncCommands,
{
    let participants: Vec<String> = con.smembers(&participants_key(meeting_id)).await?;
    Ok(participants)
}
