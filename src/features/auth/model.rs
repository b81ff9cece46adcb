use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::users::models::{User, UserRole};

/// The acting user, resolved from a validated bearer token and synced into
/// the local `users` mirror.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Local user id (what ads and selections reference)
    pub id: i64,
    /// Subject identifier issued by the auth provider
    pub external_id: String,
    pub username: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl From<User> for AuthenticatedUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            external_id: u.external_id,
            username: u.username,
            role: u.role,
            location: u.location,
        }
    }
}

/// Identity claims extracted from a validated token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenIdentity {
    pub external_id: String,
    pub username: String,
    pub location: Option<String>,
    pub role: UserRole,
}
