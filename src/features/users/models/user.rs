use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;

use crate::shared::constants::{ROLE_ADMIN, ROLE_MEMBER, ROLE_MODERATOR};

/// User role enum matching the `user_role` database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Member,
    Moderator,
    Admin,
}

impl UserRole {
    /// Resolve the effective role from the role names carried by a token.
    /// The highest privilege wins; unknown names are ignored.
    pub fn from_claims(roles: &[String]) -> Self {
        if roles.iter().any(|r| r == ROLE_ADMIN) {
            UserRole::Admin
        } else if roles.iter().any(|r| r == ROLE_MODERATOR) {
            UserRole::Moderator
        } else {
            UserRole::Member
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Member => write!(f, "{}", ROLE_MEMBER),
            UserRole::Moderator => write!(f, "{}", ROLE_MODERATOR),
            UserRole::Admin => write!(f, "{}", ROLE_ADMIN),
        }
    }
}

/// Local mirror of a user owned by the external auth provider
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub external_id: String,
    pub username: String,
    pub role: UserRole,
    /// Location name joined from `locations`
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
