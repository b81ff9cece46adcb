use sqlx::PgPool;

use crate::core::error::{map_db_error, Result};
use crate::features::auth::model::TokenIdentity;
use crate::features::users::models::User;

/// Keeps the local `users` mirror in step with the external auth provider
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upsert the user described by a validated token and return the local row.
    ///
    /// Username, role and location always follow the latest token.
    pub async fn sync(&self, identity: &TokenIdentity) -> Result<User> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let location_id: Option<i64> = match identity.location.as_deref() {
            Some(name) => Some(
                sqlx::query_scalar(
                    r#"
                    INSERT INTO locations (name)
                    VALUES ($1)
                    ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
                    RETURNING id
                    "#,
                )
                .bind(name)
                .fetch_one(&mut *tx)
                .await
                .map_err(map_db_error)?,
            ),
            None => None,
        };

        let user = sqlx::query_as::<_, User>(
            r#"
            WITH upserted AS (
                INSERT INTO users (external_id, username, role, location_id)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (external_id) DO UPDATE
                SET username = EXCLUDED.username,
                    role = EXCLUDED.role,
                    location_id = EXCLUDED.location_id,
                    updated_at = NOW()
                RETURNING id, external_id, username, role, location_id, created_at, updated_at
            )
            SELECT u.id, u.external_id, u.username, u.role, l.name AS location,
                   u.created_at, u.updated_at
            FROM upserted u
            LEFT JOIN locations l ON l.id = u.location_id
            "#,
        )
        .bind(&identity.external_id)
        .bind(&identity.username)
        .bind(identity.role)
        .bind(location_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        tracing::debug!(
            "User synced: id={}, external_id={}, role={}",
            user.id,
            user.external_id,
            user.role
        );

        Ok(user)
    }
}
