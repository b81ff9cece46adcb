//! Ownership rules for mutating ads and selections.
//!
//! Callers resolve the target entity first, so a missing entity is reported
//! as not found before any permission is checked.

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::models::UserRole;

/// An ad may be changed by its author, a moderator or an admin.
pub fn can_modify_ad(actor: &AuthenticatedUser, author_id: i64) -> bool {
    actor.id == author_id || matches!(actor.role, UserRole::Moderator | UserRole::Admin)
}

/// A selection may be changed by its owner or an admin. Moderators get no
/// extra rights here.
pub fn can_modify_selection(actor: &AuthenticatedUser, owner_id: i64) -> bool {
    actor.id == owner_id || actor.role == UserRole::Admin
}

/// Turn a failed check into an authorization error
pub fn authorize(allowed: bool, actor: &AuthenticatedUser, action: &str) -> Result<()> {
    if allowed {
        return Ok(());
    }
    tracing::warn!(user_id = actor.id, role = %actor.role, action, "Permission denied");
    Err(AppError::Forbidden(format!(
        "You do not have permission to {}",
        action
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(id: i64, role: UserRole) -> AuthenticatedUser {
        AuthenticatedUser {
            id,
            external_id: format!("ext-{}", id),
            username: format!("user{}", id),
            role,
            location: None,
        }
    }

    #[test]
    fn test_author_can_always_modify_own_ad() {
        for role in [UserRole::Member, UserRole::Moderator, UserRole::Admin] {
            assert!(can_modify_ad(&actor(1, role), 1));
        }
    }

    #[test]
    fn test_ad_non_owner_rules() {
        assert!(!can_modify_ad(&actor(2, UserRole::Member), 1));
        assert!(can_modify_ad(&actor(2, UserRole::Moderator), 1));
        assert!(can_modify_ad(&actor(2, UserRole::Admin), 1));
    }

    #[test]
    fn test_selection_rules_exclude_moderators() {
        assert!(can_modify_selection(&actor(1, UserRole::Member), 1));
        assert!(!can_modify_selection(&actor(2, UserRole::Member), 1));
        assert!(!can_modify_selection(&actor(2, UserRole::Moderator), 1));
        assert!(can_modify_selection(&actor(2, UserRole::Admin), 1));
    }

    #[test]
    fn test_authorize_maps_denial_to_forbidden() {
        let member = actor(2, UserRole::Member);
        assert!(authorize(true, &member, "update this ad").is_ok());
        assert!(matches!(
            authorize(false, &member, "update this ad"),
            Err(AppError::Forbidden(msg)) if msg.contains("update this ad")
        ));
    }
}
