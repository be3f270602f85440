/// Ownership guard for mutating operations
///
/// A resource may be changed only by the user that owns it. The check is a
/// plain id comparison; anonymous callers never own anything.
use uuid::Uuid;

use super::Principal;
use crate::domain::{Comment, Playlist, Tweet, Video};
use crate::error::AppError;
use crate::metrics;

pub trait Owned {
    fn owner_id(&self) -> Uuid;
    fn resource_name(&self) -> &'static str;
}

impl Owned for Video {
    fn owner_id(&self) -> Uuid {
        self.owner
    }

    fn resource_name(&self) -> &'static str {
        "video"
    }
}

impl Owned for Comment {
    fn owner_id(&self) -> Uuid {
        self.owner
    }

    fn resource_name(&self) -> &'static str {
        "comment"
    }
}

impl Owned for Tweet {
    fn owner_id(&self) -> Uuid {
        self.owner
    }

    fn resource_name(&self) -> &'static str {
        "tweet"
    }
}

impl Owned for Playlist {
    fn owner_id(&self) -> Uuid {
        self.owner
    }

    fn resource_name(&self) -> &'static str {
        "playlist"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed,
    Denied(&'static str),
}

pub fn authorize<R: Owned + ?Sized>(resource: &R, principal: Principal) -> Access {
    match principal.id() {
        None => Access::Denied("authentication required"),
        Some(id) if id == resource.owner_id() => Access::Allowed,
        Some(_) => Access::Denied("caller is not the owner"),
    }
}

/// `Forbidden` unless the principal owns the resource
pub fn require_owner<R: Owned + ?Sized>(resource: &R, principal: Principal) -> Result<(), AppError> {
    match authorize(resource, principal) {
        Access::Allowed => Ok(()),
        Access::Denied(reason) => {
            let name = resource.resource_name();
            metrics::record_ownership_denied(name);
            tracing::info!(
                resource = name,
                owner = %resource.owner_id(),
                caller = ?principal.id(),
                reason,
                "Ownership check denied"
            );
            Err(AppError::forbidden(format!(
                "You are not allowed to modify this {name}"
            )))
        }
    }
}
