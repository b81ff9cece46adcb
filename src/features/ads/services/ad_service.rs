use std::sync::Arc;

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::core::error::{map_db_error, AppError, Result};
use crate::features::ads::dtos::{AdDetailDto, AdListDto, CreateAdDto, UpdateAdDto};
use crate::features::ads::models::{Ad, AdOwnership, AD_COLUMNS, AD_JOINS};
use crate::features::ads::services::AdFilter;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::policy::{authorize, can_modify_ad};
use crate::modules::storage::MinIOClient;
use crate::shared::types::PaginationQuery;

fn ad_select() -> String {
    format!("SELECT {} FROM ads a {}", AD_COLUMNS, AD_JOINS)
}

/// Service for ad operations
pub struct AdService {
    pool: PgPool,
    storage: Arc<MinIOClient>,
}

impl AdService {
    pub fn new(pool: PgPool, storage: Arc<MinIOClient>) -> Self {
        Self { pool, storage }
    }

    /// List ads matching `filter`, most expensive first, with the total count
    pub async fn list(
        &self,
        filter: &AdFilter,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<AdListDto>, i64)> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM ads a {}", AD_JOINS));
        filter.push_where(&mut count_qb);
        let total: i64 = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count ads: {:?}", e);
                AppError::Database(e)
            })?;

        let mut qb = QueryBuilder::<Postgres>::new(ad_select());
        filter.push_where(&mut qb);
        qb.push(" ORDER BY a.price DESC, a.id ASC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let ads = qb
            .build_query_as::<Ad>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list ads: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((ads.into_iter().map(|a| a.into()).collect(), total))
    }

    pub async fn get(&self, id: i64) -> Result<AdDetailDto> {
        self.find(id).await.map(|ad| ad.into())
    }

    pub async fn create(&self, actor: &AuthenticatedUser, dto: CreateAdDto) -> Result<AdDetailDto> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO ads (name, author_id, price, description, is_published, category_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&dto.name)
        .bind(actor.id)
        .bind(dto.price)
        .bind(&dto.description)
        .bind(dto.is_published)
        .bind(dto.category_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        tracing::info!("Ad created: id={}, author_id={}", id, actor.id);

        self.get(id).await
    }

    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        id: i64,
        dto: UpdateAdDto,
    ) -> Result<AdDetailDto> {
        let ownership = self.ownership(id).await?;
        authorize(
            can_modify_ad(actor, ownership.author_id),
            actor,
            "update this ad",
        )?;

        let result = sqlx::query(
            r#"
            UPDATE ads
            SET name = COALESCE($1, name),
                price = COALESCE($2, price),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                is_published = COALESCE($5, is_published),
                category_id = CASE WHEN $6 THEN $7 ELSE category_id END,
                updated_at = NOW()
            WHERE id = $8
            "#,
        )
        .bind(dto.name)
        .bind(dto.price)
        .bind(dto.description.is_some())
        .bind(dto.description.flatten())
        .bind(dto.is_published)
        .bind(dto.category_id.is_some())
        .bind(dto.category_id.flatten())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }

        tracing::info!("Ad updated: id={}, by user_id={}", id, actor.id);

        self.get(id).await
    }

    pub async fn delete(&self, actor: &AuthenticatedUser, id: i64) -> Result<()> {
        let ownership = self.ownership(id).await?;
        authorize(
            can_modify_ad(actor, ownership.author_id),
            actor,
            "delete this ad",
        )?;

        let result = sqlx::query("DELETE FROM ads WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }

        tracing::info!("Ad deleted: id={}, by user_id={}", id, actor.id);

        if let Some(image) = ownership.image {
            self.remove_image(&image).await;
        }

        Ok(())
    }

    /// Resolve the ad and check that `actor` may replace its image.
    ///
    /// Called before the upload is read so that a missing ad or a foreign
    /// one is reported ahead of any problem with the file itself.
    pub async fn authorize_image(&self, actor: &AuthenticatedUser, id: i64) -> Result<AdOwnership> {
        let ownership = self.ownership(id).await?;
        authorize(
            can_modify_ad(actor, ownership.author_id),
            actor,
            "change the image of this ad",
        )?;
        Ok(ownership)
    }

    /// Store a new image for the ad and point `ads.image` at its public URL.
    /// The previous image object, if any, is removed afterwards.
    pub async fn set_image(
        &self,
        actor: &AuthenticatedUser,
        id: i64,
        data: &[u8],
        content_type: &str,
        extension: &str,
    ) -> Result<AdDetailDto> {
        let ownership = self.authorize_image(actor, id).await?;

        let key = self.storage.ad_image_key(id, extension);
        let url = self.storage.upload(&key, data, content_type).await?;

        let result = sqlx::query("UPDATE ads SET image = $1, updated_at = NOW() WHERE id = $2")
            .bind(&url)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            self.remove_image(&url).await;
            return Err(not_found(id));
        }

        tracing::info!(
            "Ad image uploaded: id={}, key={}, size={}",
            id,
            key,
            data.len()
        );

        if let Some(previous) = ownership.image {
            self.remove_image(&previous).await;
        }

        self.get(id).await
    }

    async fn find(&self, id: i64) -> Result<Ad> {
        sqlx::query_as::<_, Ad>(&format!("{} WHERE a.id = $1", ad_select()))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| not_found(id))
    }

    async fn ownership(&self, id: i64) -> Result<AdOwnership> {
        sqlx::query_as::<_, AdOwnership>("SELECT author_id, image FROM ads WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| not_found(id))
    }

    /// Best-effort removal of a stored image; failures are only logged
    async fn remove_image(&self, url: &str) {
        let Some(key) = self.storage.key_from_url(url) else {
            return;
        };
        if let Err(e) = self.storage.delete(&key).await {
            tracing::warn!("Failed to remove ad image '{}': {}", key, e);
        }
    }
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Ad {} not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::users::models::UserRole;
    use crate::shared::test_helpers::{seed_ad, seed_category, seed_user, test_storage};

    fn service(pool: &PgPool) -> AdService {
        AdService::new(pool.clone(), test_storage())
    }

    fn names(ads: &[AdListDto]) -> Vec<&str> {
        ads.iter().map(|a| a.name.as_str()).collect()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_list_orders_by_price_with_id_breaking_ties(pool: PgPool) {
        let author = seed_user(&pool, UserRole::Member, None).await;
        let cheap = seed_ad(&pool, &author, "Cheap kettle", 5, None).await;
        let first_tie = seed_ad(&pool, &author, "Old bicycle A", 40, None).await;
        let second_tie = seed_ad(&pool, &author, "Old bicycle B", 40, None).await;
        let dear = seed_ad(&pool, &author, "Gaming laptop", 900, None).await;

        let (ads, total) = service(&pool)
            .list(&AdFilter::default(), &PaginationQuery::default())
            .await
            .unwrap();

        assert_eq!(total, 4);
        let ids: Vec<i64> = ads.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![dear, first_tie, second_tie, cheap]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_list_price_bounds_are_inclusive(pool: PgPool) {
        let author = seed_user(&pool, UserRole::Member, None).await;
        seed_ad(&pool, &author, "Below the range", 19, None).await;
        seed_ad(&pool, &author, "Lower edge item", 20, None).await;
        seed_ad(&pool, &author, "Upper edge item", 30, None).await;
        seed_ad(&pool, &author, "Above the range", 31, None).await;

        let filter = AdFilter {
            price_from: Some(20),
            price_to: Some(30),
            ..AdFilter::default()
        };
        let (ads, total) = service(&pool)
            .list(&filter, &PaginationQuery::default())
            .await
            .unwrap();

        assert_eq!(total, 2);
        assert_eq!(names(&ads), vec!["Upper edge item", "Lower edge item"]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_list_matches_any_requested_category(pool: PgPool) {
        let author = seed_user(&pool, UserRole::Member, None).await;
        let books = seed_category(&pool, "Books", "books").await;
        let tools = seed_category(&pool, "Tools", "tools").await;
        let toys = seed_category(&pool, "Toys", "toys-1").await;
        seed_ad(&pool, &author, "War and Peace", 10, Some(books)).await;
        seed_ad(&pool, &author, "Cordless drill", 70, Some(tools)).await;
        seed_ad(&pool, &author, "Wooden train set", 15, Some(toys)).await;
        seed_ad(&pool, &author, "Uncategorised", 1, None).await;

        let filter = AdFilter {
            categories: vec![books, tools],
            ..AdFilter::default()
        };
        let (ads, total) = service(&pool)
            .list(&filter, &PaginationQuery::default())
            .await
            .unwrap();

        assert_eq!(total, 2);
        assert_eq!(names(&ads), vec!["Cordless drill", "War and Peace"]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_list_text_and_location_ignore_case(pool: PgPool) {
        let moscow = seed_user(&pool, UserRole::Member, Some("Moscow")).await;
        let kazan = seed_user(&pool, UserRole::Member, Some("Kazan")).await;
        seed_ad(&pool, &moscow, "Blue Shirt large", 12, None).await;
        seed_ad(&pool, &kazan, "blue shirt small", 11, None).await;
        seed_ad(&pool, &moscow, "Red scarf winter", 9, None).await;

        let by_text = AdFilter {
            text: Some("BLUE SHIRT".to_string()),
            ..AdFilter::default()
        };
        let (ads, _) = service(&pool)
            .list(&by_text, &PaginationQuery::default())
            .await
            .unwrap();
        assert_eq!(names(&ads), vec!["Blue Shirt large", "blue shirt small"]);

        let by_both = AdFilter {
            text: Some("shirt".to_string()),
            location: Some("mOSc".to_string()),
            ..AdFilter::default()
        };
        let (ads, total) = service(&pool)
            .list(&by_both, &PaginationQuery::default())
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(names(&ads), vec!["Blue Shirt large"]);
        assert_eq!(ads[0].location.as_deref(), Some("Moscow"));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_created_ad_is_found_by_price_range(pool: PgPool) {
        let author = seed_user(&pool, UserRole::Member, None).await;
        let electronics = seed_category(&pool, "Electronics", "electro").await;
        let service = service(&pool);

        let created = service
            .create(
                &author,
                CreateAdDto {
                    name: "Wireless Mouse X1".to_string(),
                    price: 25,
                    description: None,
                    is_published: true,
                    category_id: Some(electronics),
                },
            )
            .await
            .unwrap();
        assert_eq!(created.author.id, author.id);
        assert_eq!(created.category.as_ref().map(|c| c.name.as_str()), Some("Electronics"));

        let in_range = AdFilter {
            price_from: Some(20),
            price_to: Some(30),
            ..AdFilter::default()
        };
        let (ads, _) = service
            .list(&in_range, &PaginationQuery::default())
            .await
            .unwrap();
        assert_eq!(names(&ads), vec!["Wireless Mouse X1"]);

        let above = AdFilter {
            price_from: Some(30),
            ..AdFilter::default()
        };
        let (ads, total) = service.list(&above, &PaginationQuery::default()).await.unwrap();
        assert_eq!(total, 0);
        assert!(ads.is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_page_far_past_the_end_is_empty(pool: PgPool) {
        let author = seed_user(&pool, UserRole::Member, None).await;
        seed_ad(&pool, &author, "Only ad listed", 10, None).await;

        let pagination = PaginationQuery {
            page: i64::MAX,
            page_size: 100,
        };
        let (ads, total) = service(&pool)
            .list(&AdFilter::default(), &pagination)
            .await
            .unwrap();

        assert_eq!(total, 1);
        assert!(ads.is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_stranger_cannot_update_and_ad_is_unchanged(pool: PgPool) {
        let author = seed_user(&pool, UserRole::Member, None).await;
        let stranger = seed_user(&pool, UserRole::Member, None).await;
        let id = seed_ad(&pool, &author, "Wireless Mouse X1", 25, None).await;
        let service = service(&pool);

        let result = service
            .update(
                &stranger,
                id,
                UpdateAdDto {
                    price: Some(1),
                    ..UpdateAdDto::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let ad = service.get(id).await.unwrap();
        assert_eq!(ad.price, 25);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_moderator_may_update_foreign_ad(pool: PgPool) {
        let author = seed_user(&pool, UserRole::Member, None).await;
        let moderator = seed_user(&pool, UserRole::Moderator, None).await;
        let id = seed_ad(&pool, &author, "Wireless Mouse X1", 25, None).await;

        let ad = service(&pool)
            .update(
                &moderator,
                id,
                UpdateAdDto {
                    price: Some(30),
                    ..UpdateAdDto::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(ad.price, 30);
        assert_eq!(ad.name, "Wireless Mouse X1");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_missing_ad_is_not_found_rather_than_forbidden(pool: PgPool) {
        let stranger = seed_user(&pool, UserRole::Member, None).await;
        let service = service(&pool);

        let update = service
            .update(&stranger, 424242, UpdateAdDto::default())
            .await;
        assert!(matches!(update, Err(AppError::NotFound(_))));

        let delete = service.delete(&stranger, 424242).await;
        assert!(matches!(delete, Err(AppError::NotFound(_))));

        let image = service.authorize_image(&stranger, 424242).await;
        assert!(matches!(image, Err(AppError::NotFound(_))));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_duplicate_ad_name_is_a_validation_error(pool: PgPool) {
        let author = seed_user(&pool, UserRole::Member, None).await;
        seed_ad(&pool, &author, "Wireless Mouse X1", 25, None).await;

        let result = service(&pool)
            .create(
                &author,
                CreateAdDto {
                    name: "Wireless Mouse X1".to_string(),
                    price: 20,
                    description: None,
                    is_published: false,
                    category_id: None,
                },
            )
            .await;

        match result {
            Err(AppError::Validation(messages)) => {
                assert_eq!(messages, vec!["name: a record with this value already exists"]);
            }
            other => panic!("unexpected result: {:?}", other.map(|a| a.id)),
        }
    }
}
