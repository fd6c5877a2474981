//! Chatroom Redis operations.
//!
//! Redis key patterns:
//! - `chatroom:{id}` — chatroom data (JSON)
//! - `chatroom_members:{id}` — member user ids (SET)
//! - `chatroom_messages:{id}` — messages in send order (LIST of JSON)

use crate::models::{StoredChatroom, StoredMessage};
use redis::AsyncCommands;

fn chatroom_key(id: &str) -> String {
    format!("chatroom:{}", id)
}

fn members_key(id: &str) -> String {
    format!("chatroom_members:{}", id)
}

fn messages_key(id: &str) -> String {
    format!("chatroom_messages:{}", id)
}

/// Store a chatroom record.
pub async fn store_chatroom<C>(con: &mut C, room: &StoredChatroom) -> Result<(), redis::RedisError>
where
    C: AsyncCommands,
{
    let json = super::to_json(room)?;
    con.set::<_, _, ()>(&chatroom_key(&room.id), json).await?;
    Ok(())
}

/// Get a chatroom by id.
pub async fn get_chatroom<C>(
    con: &mut C,
    id: &str,
) -> Result<Option<StoredChatroom>, redis::RedisError>
where
    C: AsyncCommands,
{
    let json: Option<String> = con.get(&chatroom_key(id)).await?;

    match json {
        Some(data) => Ok(Some(super::from_json(&data)?)),
        None => Ok(None),
    }
}

/// Mark a chatroom as closed. The transition is one-way; there is no
/// corresponding reactivation.
pub async fn set_chatroom_inactive<C>(con: &mut C, id: &str) -> Result<(), redis::RedisError>
where
    C: AsyncCommands,
{
    if let Some(mut room) = get_chatroom(con, id).await? {
        room.is_active = false;
        store_chatroom(con, &room).await?;
    }
    Ok(())
}

/// Add a user to the chatroom's member set.
///
/// Returns true if the user was newly added, false if they were already
/// a member (SADD semantics make re-joins idempotent).
pub async fn add_member<C>(
    con: &mut C,
    room_id: &str,
    user_id: &str,
) -> Result<bool, redis::RedisError>
where
    C: AsyncCommands,
{
    let added: i32 = con.sadd(&members_key(room_id), user_id).await?;
    Ok(added > 0)
}

/// Check membership.
pub async fn is_member<C>(
    con: &mut C,
    room_id: &str,
    user_id: &str,
) -> Result<bool, redis::RedisError>
where
    C: AsyncCommands,
{
    let member: bool = con.sismember(&members_key(room_id), user_id).await?;
    Ok(member)
}

/// Append a message to the chatroom's list.
pub async fn append_message<C>(
    con: &mut C,
    room_id: &str,
    message: &StoredMessage,
) -> Result<(), redis::RedisError>
where
    C: AsyncCommands,
{
    let json = super::to_json(message)?;
    con.rpush::<_, _, ()>(&messages_key(room_id), json).await?;
    Ok(())
}

/// Get messages in send order, paginated.
pub async fn get_messages<C>(
    con: &mut C,
    room_id: &str,
    offset: usize,
    limit: usize,
) -> Result<Vec<StoredMessage>, redis::RedisError>
where
    C: AsyncCommands,
{
    if limit == 0 {
        return Ok(Vec::new());
    }

    let start = offset as isize;
    let stop = (offset + limit - 1) as isize;
    let rows: Vec<String> = con.lrange(&messages_key(room_id), start, stop).await?;

    let mut messages = Vec::with_capacity(rows.len());
    for row in rows {
        messages.push(super::from_json(&row)?);
    }
    Ok(messages)
}

/// List all chatrooms.
pub async fn list_chatrooms<C>(con: &mut C) -> Result<Vec<StoredChatroom>, redis::RedisError>
where
    C: AsyncCommands,
{
    let mut rooms = Vec::new();
    let keys = super::scan_keys(con, "chatroom:*").await?;

    for key in keys {
        let json: Option<String> = con.get(&key).await?;
        if let Some(data) = json {
            rooms.push(super::from_json(&data)?);
        }
    }

    Ok(rooms)
}
