use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::models::UserRole;

/// Response DTO for the acting user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponseDto {
    pub id: i64,
    pub username: String,
    pub role: UserRole,
    pub location: Option<String>,
}

impl From<AuthenticatedUser> for UserResponseDto {
    fn from(u: AuthenticatedUser) -> Self {
        Self {
            id: u.id,
            username: u.username,
            role: u.role,
            location: u.location,
        }
    }
}
