use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::ads::dtos::MAX_IMAGE_SIZE;
use crate::features::ads::handlers;
use crate::features::ads::services::AdService;

/// Create routes for the ads feature
pub fn routes(service: Arc<AdService>) -> Router {
    Router::new()
        .route("/api/ads", get(handlers::list_ads).post(handlers::create_ad))
        .route(
            "/api/ads/{id}",
            get(handlers::get_ad)
                .patch(handlers::update_ad)
                .delete(handlers::delete_ad),
        )
        .route(
            "/api/ads/{id}/image",
            // Room for the multipart envelope on top of the image itself
            post(handlers::upload_ad_image).layer(DefaultBodyLimit::max(MAX_IMAGE_SIZE + 64 * 1024)),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::AuthenticatedUser;
    use crate::features::users::models::UserRole;
    use crate::shared::test_helpers::{
        create_user, lazy_pool, seed_ad, seed_user, test_storage, with_user,
    };
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use serde_json::json;
    use sqlx::PgPool;

    fn router() -> Router {
        routes(Arc::new(AdService::new(lazy_pool(), test_storage())))
    }

    fn member_server() -> TestServer {
        TestServer::new(with_user(router(), create_user(5, UserRole::Member))).unwrap()
    }

    #[tokio::test]
    async fn test_list_rejects_non_numeric_price() {
        let server = TestServer::new(router()).unwrap();

        let response = server.get("/api/ads?price_from=abc").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "validation_error");
        assert_eq!(body["errors"], json!(["price_from: must be an integer"]));
    }

    #[tokio::test]
    async fn test_list_rejects_non_numeric_category() {
        let server = TestServer::new(router()).unwrap();

        let response = server.get("/api/ads?cat=1&cat=books").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["errors"], json!(["cat: must be an integer"]));
    }

    #[tokio::test]
    async fn test_anonymous_requests_need_authentication() {
        let server = TestServer::new(router()).unwrap();

        server
            .get("/api/ads/1")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .post("/api/ads")
            .json(&json!({ "name": "Wireless Mouse X1", "price": 25 }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .patch("/api/ads/1")
            .json(&json!({ "price": 30 }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .delete("/api/ads/1")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .post("/api/ads/1/image")
            .multipart(MultipartForm::new().add_text("note", "x"))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_rejects_short_name() {
        let server = member_server();

        let response = server
            .post("/api/ads")
            .json(&json!({ "name": "Too short", "price": 25 }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["errors"], json!(["name: Name must be 10-50 characters"]));
    }

    #[tokio::test]
    async fn test_create_reports_every_invalid_field() {
        let server = member_server();

        let response = server
            .post("/api/ads")
            .json(&json!({ "name": "Short", "price": -5 }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(
            body["errors"],
            json!([
                "name: Name must be 10-50 characters",
                "price: Price must not be negative"
            ])
        );
    }

    #[tokio::test]
    async fn test_update_rejects_negative_price() {
        let server = member_server();

        let response = server
            .patch("/api/ads/1")
            .json(&json!({ "price": -1 }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_a_validation_error() {
        let server = member_server();

        let response = server.get("/api/ads/abc").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "validation_error");
        assert_eq!(body["errors"], json!(["id: must be a valid i64"]));
    }

    fn text_part() -> Part {
        Part::bytes(b"plain text".to_vec())
            .file_name("notes.txt")
            .mime_type("text/plain")
    }

    fn seeded_server(pool: PgPool, actor: AuthenticatedUser) -> TestServer {
        let app = routes(Arc::new(AdService::new(pool, test_storage())));
        TestServer::new(with_user(app, actor)).unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_image_upload_requires_image_field(pool: PgPool) {
        let author = seed_user(&pool, UserRole::Member, None).await;
        let ad_id = seed_ad(&pool, &author, "Wireless Mouse X1", 25, None).await;
        let server = seeded_server(pool, author);

        let response = server
            .post(&format!("/api/ads/{}/image", ad_id))
            .multipart(MultipartForm::new().add_text("note", "no file here"))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["errors"], json!(["image: is required"]));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_image_upload_rejects_unsupported_type(pool: PgPool) {
        let author = seed_user(&pool, UserRole::Member, None).await;
        let ad_id = seed_ad(&pool, &author, "Wireless Mouse X1", 25, None).await;
        let server = seeded_server(pool, author);

        let response = server
            .post(&format!("/api/ads/{}/image", ad_id))
            .multipart(MultipartForm::new().add_part("image", text_part()))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "validation_error");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_image_upload_to_missing_ad_is_not_found_before_file_checks(pool: PgPool) {
        let author = seed_user(&pool, UserRole::Member, None).await;
        let server = seeded_server(pool, author);

        let response = server
            .post("/api/ads/999999/image")
            .multipart(MultipartForm::new().add_part("image", text_part()))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "not_found");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_image_upload_by_stranger_is_forbidden_before_file_checks(pool: PgPool) {
        let author = seed_user(&pool, UserRole::Member, None).await;
        let stranger = seed_user(&pool, UserRole::Member, None).await;
        let ad_id = seed_ad(&pool, &author, "Wireless Mouse X1", 25, None).await;
        let server = seeded_server(pool.clone(), stranger);

        let response = server
            .post(&format!("/api/ads/{}/image", ad_id))
            .multipart(MultipartForm::new().add_text("note", "no file here"))
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "authorization_error");

        let image: Option<String> = sqlx::query_scalar("SELECT image FROM ads WHERE id = $1")
            .bind(ad_id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(image, None);
    }
}
