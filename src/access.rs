//! Authorization decisions for chatroom and meeting lifecycle operations.
//!
//! Every decision here is a pure function of the authenticated identity
//! and a resource snapshot; no storage access, no global state. Handlers
//! fetch the snapshot, call in, and translate denials to responses.
//!
//! Room state machine: `Active -> Closed`, one way, creator only. Joining
//! requires the room to exist and be active; not-found and inactive are
//! distinguished for observability but both deny.

use crate::error::AppError;
use crate::models::{StoredChatroom, StoredMeeting};

/// Why a close request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDenial {
    NotFound,
    NotCreator,
}

/// Why a join request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinDenial {
    NotFound,
    Inactive,
}

/// Can `requester_id` close this chatroom? Only the creator may, and only
/// while it still exists. Closing an already-closed room is a no-op the
/// caller may allow; the creator check happens regardless.
pub fn can_close_chatroom(
    room: Option<&StoredChatroom>,
    requester_id: &str,
) -> Result<(), CloseDenial> {
    let room = room.ok_or(CloseDenial::NotFound)?;
    if room.creator_id != requester_id {
        return Err(CloseDenial::NotCreator);
    }
    Ok(())
}

/// Can anyone join this chatroom? Allowed iff it exists and is active.
/// Identity does not matter: a closed room denies everyone, including
/// its creator.
pub fn can_join_chatroom(room: Option<&StoredChatroom>) -> Result<(), JoinDenial> {
    let room = room.ok_or(JoinDenial::NotFound)?;
    if !room.is_active {
        return Err(JoinDenial::Inactive);
    }
    Ok(())
}

/// Meetings follow the same creator-only pattern, keyed on `host_id`.
pub fn can_close_meeting(
    meeting: Option<&StoredMeeting>,
    requester_id: &str,
) -> Result<(), CloseDenial> {
    let meeting = meeting.ok_or(CloseDenial::NotFound)?;
    if meeting.host_id != requester_id {
        return Err(CloseDenial::NotCreator);
    }
    Ok(())
}

/// Participant lists only grow through joins on an active meeting.
pub fn can_join_meeting(meeting: Option<&StoredMeeting>) -> Result<(), JoinDenial> {
    let meeting = meeting.ok_or(JoinDenial::NotFound)?;
    if !meeting.is_active {
        return Err(JoinDenial::Inactive);
    }
    Ok(())
}

impl CloseDenial {
    pub fn into_app_error(self, resource: &str) -> AppError {
        match self {
            CloseDenial::NotFound => AppError::NotFound(format!("{} not found", resource)),
            CloseDenial::NotCreator => AppError::Forbidden(format!(
                "Only the creator can close this {}",
                resource.to_lowercase()
            )),
        }
    }
}

impl JoinDenial {
    pub fn into_app_error(self, resource: &str) -> AppError {
        match self {
            JoinDenial::NotFound => AppError::NotFound(format!("{} not found", resource)),
            JoinDenial::Inactive => AppError::Forbidden(format!(
                "{} is inactive or closed",
                resource
            )),
        }
    }
}
