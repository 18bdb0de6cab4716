//! Admin hierarchy rules.
//!
//! Every account carries an optional `created_by_id`. Accounts without one are
//! root accounts and are exempt from the creator restrictions below. The rules
//! are pure so handlers can load both users and ask for a decision.

use uuid::Uuid;

use crate::error::AppError;
use crate::models::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The target is the admin that created the actor.
    TargetIsCreator,
    /// A non-root actor targeted a user it did not create.
    NotCreatedByActor,
    /// Only root admins manage application settings.
    NotRootAdmin,
}

impl DenyReason {
    pub fn message(&self) -> &'static str {
        match self {
            DenyReason::TargetIsCreator => "You cannot modify the admin who created your account",
            DenyReason::NotCreatedByActor => "You can only modify users you created",
            DenyReason::NotRootAdmin => "Only the root admin can change application settings",
        }
    }
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Convert a denial into a 403.
    pub fn into_result(self) -> Result<(), AppError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(AppError::Forbidden(reason.message().to_string())),
        }
    }
}

/// Whether `actor` may update or soft-delete `target`.
///
/// Only the actor's direct creator is protected; admins further up the
/// creation chain are reachable through rule 2 alone.
pub fn can_modify(actor: &User, target: &User) -> Decision {
    if actor.created_by_id == Some(target.id) {
        return Decision::Deny(DenyReason::TargetIsCreator);
    }

    if !actor.is_root() && target.created_by_id != Some(actor.id) {
        return Decision::Deny(DenyReason::NotCreatedByActor);
    }

    Decision::Allow
}

/// Which active users an admin sees in the user listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingScope {
    /// Root: everyone but themselves.
    AllExcept(Uuid),
    /// Sub-admin: only accounts they created.
    CreatedBy(Uuid),
}

pub fn listing_scope(actor: &User) -> ListingScope {
    if actor.is_root() {
        ListingScope::AllExcept(actor.id)
    } else {
        ListingScope::CreatedBy(actor.id)
    }
}

impl ListingScope {
    /// In-memory form of the listing filter.
    pub fn includes(&self, user: &User) -> bool {
        match *self {
            ListingScope::AllExcept(id) => user.id != id,
            ListingScope::CreatedBy(id) => user.created_by_id == Some(id),
        }
    }
}

pub fn can_manage_settings(actor: &User) -> Decision {
    if actor.is_admin() && actor.is_root() {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::NotRootAdmin)
    }
}
