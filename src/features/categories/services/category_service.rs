use sqlx::PgPool;

use crate::core::error::{map_db_error, AppError, Result};
use crate::features::categories::dtos::{
    CategoryResponseDto, CreateCategoryDto, UpdateCategoryDto,
};
use crate::features::categories::models::Category;

const CATEGORY_COLUMNS: &str = "id, name, slug, created_at, updated_at";

/// Service for category operations
pub struct CategoryService {
    pool: PgPool,
}

impl CategoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all categories ordered by name
    pub async fn list(&self) -> Result<Vec<CategoryResponseDto>> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM categories ORDER BY name, id",
            CATEGORY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list categories: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(categories.into_iter().map(|c| c.into()).collect())
    }

    pub async fn get(&self, id: i64) -> Result<CategoryResponseDto> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM categories WHERE id = $1",
            CATEGORY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        category
            .map(|c| c.into())
            .ok_or_else(|| not_found(id))
    }

    pub async fn create(&self, dto: CreateCategoryDto) -> Result<CategoryResponseDto> {
        let slug = dto.slug_or_generated();

        let category = sqlx::query_as::<_, Category>(&format!(
            "INSERT INTO categories (name, slug) VALUES ($1, $2) RETURNING {}",
            CATEGORY_COLUMNS
        ))
        .bind(&dto.name)
        .bind(&slug)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        tracing::info!("Category created: id={}, slug={}", category.id, category.slug);

        Ok(category.into())
    }

    pub async fn update(&self, id: i64, dto: UpdateCategoryDto) -> Result<CategoryResponseDto> {
        let category = sqlx::query_as::<_, Category>(&format!(
            r#"
            UPDATE categories
            SET name = COALESCE($1, name),
                slug = COALESCE($2, slug),
                updated_at = NOW()
            WHERE id = $3
            RETURNING {}
            "#,
            CATEGORY_COLUMNS
        ))
        .bind(dto.name)
        .bind(dto.slug)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| not_found(id))?;

        tracing::info!("Category updated: id={}", category.id);

        Ok(category.into())
    }

    /// Delete a category. Ads referencing it keep existing with no category.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }

        tracing::info!("Category deleted: id={}", id);
        Ok(())
    }
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Category {} not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::users::models::UserRole;
    use crate::shared::test_helpers::{seed_ad, seed_category, seed_user};

    fn create_dto(name: &str, slug: Option<&str>) -> CreateCategoryDto {
        CreateCategoryDto {
            name: name.to_string(),
            slug: slug.map(str::to_string),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_generates_slug_and_lists_by_name(pool: PgPool) {
        let service = CategoryService::new(pool);

        let tools = service.create(create_dto("Tools", None)).await.unwrap();
        service.create(create_dto("Books", Some("books"))).await.unwrap();

        assert!(tools.slug.starts_with('c'));
        let names: Vec<String> = service.list().await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Books", "Tools"]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_duplicate_name_is_a_validation_error(pool: PgPool) {
        let service = CategoryService::new(pool);
        service.create(create_dto("Books", Some("books"))).await.unwrap();

        match service.create(create_dto("Books", Some("books-2"))).await {
            Err(AppError::Validation(messages)) => {
                assert_eq!(messages, vec!["name: a record with this value already exists"]);
            }
            other => panic!("unexpected result: {:?}", other.map(|c| c.id)),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_update_keeps_absent_fields(pool: PgPool) {
        let service = CategoryService::new(pool);
        let created = service.create(create_dto("Books", Some("books"))).await.unwrap();

        let updated = service
            .update(
                created.id,
                UpdateCategoryDto {
                    name: Some("Used books".to_string()),
                    slug: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Used books");
        assert_eq!(updated.slug, "books");

        let missing = service
            .update(
                created.id + 1000,
                UpdateCategoryDto {
                    name: None,
                    slug: None,
                },
            )
            .await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_delete_detaches_ads(pool: PgPool) {
        let author = seed_user(&pool, UserRole::Member, None).await;
        let books = seed_category(&pool, "Books", "books").await;
        let ad_id = seed_ad(&pool, &author, "War and Peace", 10, Some(books)).await;
        let service = CategoryService::new(pool.clone());

        service.delete(books).await.unwrap();

        let category_id: Option<i64> =
            sqlx::query_scalar("SELECT category_id FROM ads WHERE id = $1")
                .bind(ad_id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(category_id, None);
        assert!(matches!(service.get(books).await, Err(AppError::NotFound(_))));
        assert!(matches!(service.delete(books).await, Err(AppError::NotFound(_))));
    }
}
