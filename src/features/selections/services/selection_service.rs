use std::collections::HashSet;

use sqlx::{PgPool, Postgres, Transaction};

use crate::core::error::{map_db_error, AppError, Result};
use crate::features::ads::dtos::AdListDto;
use crate::features::ads::models::{Ad, AD_COLUMNS, AD_JOINS};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::policy::{authorize, can_modify_selection};
use crate::features::selections::dtos::{
    CreateSelectionDto, SelectionDetailDto, SelectionListDto, UpdateSelectionDto,
};
use crate::features::selections::models::Selection;
use crate::shared::types::PaginationQuery;

const SELECTION_SELECT: &str = r#"
    SELECT s.id, s.name, s.owner_id, u.username AS owner_username,
           (SELECT COUNT(*) FROM selection_items si WHERE si.selection_id = s.id) AS item_count,
           s.created_at, s.updated_at
    FROM selections s
    JOIN users u ON u.id = s.owner_id
"#;

/// Service for selection operations
pub struct SelectionService {
    pool: PgPool,
}

impl SelectionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, pagination: &PaginationQuery) -> Result<(Vec<SelectionListDto>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM selections")
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let selections = sqlx::query_as::<_, Selection>(&format!(
            "{} ORDER BY s.id LIMIT $1 OFFSET $2",
            SELECTION_SELECT
        ))
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list selections: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((selections.into_iter().map(|s| s.into()).collect(), total))
    }

    pub async fn get(&self, id: i64) -> Result<SelectionDetailDto> {
        let selection = self.find(id).await?;

        let items = sqlx::query_as::<_, Ad>(&format!(
            r#"
            SELECT {}
            FROM selection_items si
            JOIN ads a ON a.id = si.ad_id
            {}
            WHERE si.selection_id = $1
            ORDER BY si.position
            "#,
            AD_COLUMNS, AD_JOINS
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(SelectionDetailDto::new(
            selection,
            items.into_iter().map(AdListDto::from).collect(),
        ))
    }

    pub async fn create(
        &self,
        actor: &AuthenticatedUser,
        dto: CreateSelectionDto,
    ) -> Result<SelectionDetailDto> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO selections (name, owner_id) VALUES ($1, $2) RETURNING id",
        )
        .bind(&dto.name)
        .bind(actor.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        replace_items(&mut tx, id, &dto.items).await?;
        tx.commit().await.map_err(map_db_error)?;

        tracing::info!(
            "Selection created: id={}, owner_id={}, items={}",
            id,
            actor.id,
            dto.items.len()
        );

        self.get(id).await
    }

    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        id: i64,
        dto: UpdateSelectionDto,
    ) -> Result<SelectionDetailDto> {
        let owner_id = self.owner_id(id).await?;
        authorize(
            can_modify_selection(actor, owner_id),
            actor,
            "update this selection",
        )?;

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let result = sqlx::query(
            "UPDATE selections SET name = COALESCE($1, name), updated_at = NOW() WHERE id = $2",
        )
        .bind(&dto.name)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }

        if let Some(items) = &dto.items {
            replace_items(&mut tx, id, items).await?;
        }
        tx.commit().await.map_err(map_db_error)?;

        tracing::info!("Selection updated: id={}, by user_id={}", id, actor.id);

        self.get(id).await
    }

    pub async fn delete(&self, actor: &AuthenticatedUser, id: i64) -> Result<()> {
        let owner_id = self.owner_id(id).await?;
        authorize(
            can_modify_selection(actor, owner_id),
            actor,
            "delete this selection",
        )?;

        let result = sqlx::query("DELETE FROM selections WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }

        tracing::info!("Selection deleted: id={}, by user_id={}", id, actor.id);
        Ok(())
    }

    async fn find(&self, id: i64) -> Result<Selection> {
        sqlx::query_as::<_, Selection>(&format!("{} WHERE s.id = $1", SELECTION_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| not_found(id))
    }

    async fn owner_id(&self, id: i64) -> Result<i64> {
        sqlx::query_scalar("SELECT owner_id FROM selections WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| not_found(id))
    }
}

/// Replace the ads of a selection, keeping the given order
async fn replace_items(
    tx: &mut Transaction<'_, Postgres>,
    selection_id: i64,
    items: &[i64],
) -> Result<()> {
    let items = dedup_preserving_order(items);

    if !items.is_empty() {
        let existing: Vec<i64> = sqlx::query_scalar("SELECT id FROM ads WHERE id = ANY($1)")
            .bind(&items)
            .fetch_all(&mut **tx)
            .await
            .map_err(AppError::Database)?;

        let missing = missing_ids(&items, &existing);
        if !missing.is_empty() {
            return Err(AppError::field(
                "items",
                format!("unknown ad ids: {}", join_ids(&missing)),
            ));
        }
    }

    sqlx::query("DELETE FROM selection_items WHERE selection_id = $1")
        .bind(selection_id)
        .execute(&mut **tx)
        .await
        .map_err(AppError::Database)?;

    if items.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO selection_items (selection_id, ad_id, position)
        SELECT $1, t.ad_id, (t.ord - 1)::INT
        FROM UNNEST($2::BIGINT[]) WITH ORDINALITY AS t(ad_id, ord)
        "#,
    )
    .bind(selection_id)
    .bind(&items)
    .execute(&mut **tx)
    .await
    .map_err(map_db_error)?;

    Ok(())
}

fn dedup_preserving_order(items: &[i64]) -> Vec<i64> {
    let mut seen = HashSet::new();
    items.iter().copied().filter(|id| seen.insert(*id)).collect()
}

fn missing_ids(requested: &[i64], existing: &[i64]) -> Vec<i64> {
    let existing: HashSet<i64> = existing.iter().copied().collect();
    requested
        .iter()
        .copied()
        .filter(|id| !existing.contains(id))
        .collect()
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Selection {} not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::users::models::UserRole;
    use crate::shared::test_helpers::{seed_ad, seed_category, seed_user};

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        assert_eq!(dedup_preserving_order(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
        assert!(dedup_preserving_order(&[]).is_empty());
    }

    #[test]
    fn test_missing_ids_in_request_order() {
        assert_eq!(missing_ids(&[5, 1, 9, 2], &[1, 2]), vec![5, 9]);
        assert!(missing_ids(&[1, 2], &[2, 1]).is_empty());
        assert_eq!(join_ids(&[5, 9]), "5, 9");
    }

    fn create_dto(name: &str, items: Vec<i64>) -> CreateSelectionDto {
        CreateSelectionDto {
            name: name.to_string(),
            items,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_items_keep_request_order_and_ad_details(pool: PgPool) {
        let owner = seed_user(&pool, UserRole::Member, Some("Moscow")).await;
        let electronics = seed_category(&pool, "Electronics", "electro").await;
        let mouse = seed_ad(&pool, &owner, "Wireless Mouse X1", 25, Some(electronics)).await;
        let kettle = seed_ad(&pool, &owner, "Cheap kettle", 5, None).await;
        let service = SelectionService::new(pool);

        let selection = service
            .create(&owner, create_dto("Для дачи", vec![kettle, mouse, kettle]))
            .await
            .unwrap();

        let ids: Vec<i64> = selection.items.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![kettle, mouse]);
        assert_eq!(selection.owner.id, owner.id);
        assert_eq!(selection.items[1].category.as_deref(), Some("Electronics"));
        assert_eq!(selection.items[1].location.as_deref(), Some("Moscow"));

        let (listed, total) = service.list(&PaginationQuery::default()).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(listed[0].item_count, 2);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_unknown_items_reject_the_whole_create(pool: PgPool) {
        let owner = seed_user(&pool, UserRole::Member, None).await;
        let kettle = seed_ad(&pool, &owner, "Cheap kettle", 5, None).await;
        let service = SelectionService::new(pool);

        match service
            .create(&owner, create_dto("Для дачи", vec![kettle, 9001, 9002]))
            .await
        {
            Err(AppError::Validation(messages)) => {
                assert_eq!(messages, vec!["items: unknown ad ids: 9001, 9002"]);
            }
            other => panic!("unexpected result: {:?}", other.map(|s| s.id)),
        }

        let (_, total) = service.list(&PaginationQuery::default()).await.unwrap();
        assert_eq!(total, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_only_owner_or_admin_may_update(pool: PgPool) {
        let owner = seed_user(&pool, UserRole::Member, None).await;
        let moderator = seed_user(&pool, UserRole::Moderator, None).await;
        let admin = seed_user(&pool, UserRole::Admin, None).await;
        let kettle = seed_ad(&pool, &owner, "Cheap kettle", 5, None).await;
        let service = SelectionService::new(pool);
        let created = service
            .create(&owner, create_dto("Для дачи", vec![kettle]))
            .await
            .unwrap();

        let rename = |name: &str| UpdateSelectionDto {
            name: Some(name.to_string()),
            items: None,
        };

        let denied = service.update(&moderator, created.id, rename("Чужая")).await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));
        assert_eq!(service.get(created.id).await.unwrap().name, "Для дачи");

        let renamed = service
            .update(&admin, created.id, rename("Для дома"))
            .await
            .unwrap();
        assert_eq!(renamed.name, "Для дома");
        assert_eq!(renamed.items.len(), 1);

        let missing = service.update(&moderator, created.id + 1000, rename("x")).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }
}
