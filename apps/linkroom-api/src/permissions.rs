use crate::rooms::RoomError;
use crate::store::{RoomStore, StoreError};

/// The authenticated identity a request acts as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i64,
    pub is_super_admin: bool,
}

impl Principal {
    pub fn user(user_id: i64) -> Self {
        Self {
            user_id,
            is_super_admin: false,
        }
    }

    pub fn super_admin(user_id: i64) -> Self {
        Self {
            user_id,
            is_super_admin: true,
        }
    }
}

/// Access decision for one room: super-admins always pass, everybody else
/// needs a grant.
pub fn resolve(principal: &Principal, grant_exists: bool) -> bool {
    principal.is_super_admin || grant_exists
}

/// Check whether `principal` may manage `room_id`. Only consults the grant
/// table for non-super-admins.
pub async fn authorized(
    store: &dyn RoomStore,
    room_id: i64,
    principal: &Principal,
) -> Result<bool, StoreError> {
    if principal.is_super_admin {
        return Ok(true);
    }

    let grant_exists = store.has_grant(room_id, principal.user_id).await?;
    Ok(resolve(principal, grant_exists))
}

pub async fn require_room_access(
    store: &dyn RoomStore,
    room_id: i64,
    principal: &Principal,
) -> Result<(), RoomError> {
    if authorized(store, room_id, principal).await? {
        Ok(())
    } else {
        Err(RoomError::Forbidden(
            "You do not have permission to manage this room",
        ))
    }
}

/// Granting and revoking room access is reserved for super-admins.
pub fn require_super_admin(principal: &Principal) -> Result<(), RoomError> {
    if principal.is_super_admin {
        Ok(())
    } else {
        Err(RoomError::Forbidden(
            "Only a super-admin can manage permissions",
        ))
    }
}
