use axum::{
    extract::{Multipart, RawQuery, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::debug;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppPath};
use crate::features::ads::dtos::{
    image_extension, AdDetailDto, AdListDto, AdListQuery, CreateAdDto, UpdateAdDto,
    UploadAdImageDto, MAX_IMAGE_SIZE,
};
use crate::features::ads::services::AdService;
use crate::features::auth::model::AuthenticatedUser;
use crate::shared::types::{ApiResponse, Meta};

/// List ads, most expensive first
///
/// All filters are optional and combine with AND. `cat` may be repeated.
#[utoipa::path(
    get,
    path = "/api/ads",
    params(
        ("cat" = Option<Vec<i64>>, Query, description = "Category id; repeat to match any of several"),
        ("text" = Option<String>, Query, description = "Case-insensitive substring of the ad name"),
        ("location" = Option<String>, Query, description = "Case-insensitive substring of the author's location"),
        ("price_from" = Option<i64>, Query, description = "Inclusive lower price bound"),
        ("price_to" = Option<i64>, Query, description = "Inclusive upper price bound"),
        ("page" = Option<i64>, Query, description = "Page number (default 1)"),
        ("page_size" = Option<i64>, Query, description = "Items per page (default 10, max 100)")
    ),
    responses(
        (status = 200, description = "Matching ads", body = ApiResponse<Vec<AdListDto>>),
        (status = 400, description = "Non-numeric filter value")
    ),
    tag = "ads"
)]
pub async fn list_ads(
    State(service): State<Arc<AdService>>,
    RawQuery(query): RawQuery,
) -> Result<Json<ApiResponse<Vec<AdListDto>>>> {
    let query = AdListQuery::parse(query.as_deref())?;

    let (ads, total) = service.list(&query.filter, &query.pagination()).await?;
    Ok(Json(ApiResponse::success(
        Some(ads),
        None,
        Some(Meta { total }),
    )))
}

/// Get ad details
#[utoipa::path(
    get,
    path = "/api/ads/{id}",
    params(
        ("id" = i64, Path, description = "Ad id")
    ),
    responses(
        (status = 200, description = "Ad found", body = ApiResponse<AdDetailDto>),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Ad not found")
    ),
    tag = "ads",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_ad(
    _user: AuthenticatedUser,
    State(service): State<Arc<AdService>>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<ApiResponse<AdDetailDto>>> {
    let ad = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(ad), None, None)))
}

/// Create an ad authored by the acting user
#[utoipa::path(
    post,
    path = "/api/ads",
    request_body = CreateAdDto,
    responses(
        (status = 201, description = "Ad created", body = ApiResponse<AdDetailDto>),
        (status = 400, description = "Validation error, duplicate name or unknown category"),
        (status = 401, description = "Authentication required")
    ),
    tag = "ads",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_ad(
    user: AuthenticatedUser,
    State(service): State<Arc<AdService>>,
    AppJson(dto): AppJson<CreateAdDto>,
) -> Result<(StatusCode, Json<ApiResponse<AdDetailDto>>)> {
    dto.validate()?;

    let ad = service.create(&user, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(ad), None, None)),
    ))
}

/// Update an ad (author, moderator or admin)
#[utoipa::path(
    patch,
    path = "/api/ads/{id}",
    params(
        ("id" = i64, Path, description = "Ad id")
    ),
    request_body = UpdateAdDto,
    responses(
        (status = 200, description = "Ad updated", body = ApiResponse<AdDetailDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not the author, a moderator or an admin"),
        (status = 404, description = "Ad not found")
    ),
    tag = "ads",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_ad(
    user: AuthenticatedUser,
    State(service): State<Arc<AdService>>,
    AppPath(id): AppPath<i64>,
    AppJson(dto): AppJson<UpdateAdDto>,
) -> Result<Json<ApiResponse<AdDetailDto>>> {
    dto.validate()?;

    let ad = service.update(&user, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(ad), None, None)))
}

/// Delete an ad (author, moderator or admin)
#[utoipa::path(
    delete,
    path = "/api/ads/{id}",
    params(
        ("id" = i64, Path, description = "Ad id")
    ),
    responses(
        (status = 204, description = "Ad deleted"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not the author, a moderator or an admin"),
        (status = 404, description = "Ad not found")
    ),
    tag = "ads",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_ad(
    user: AuthenticatedUser,
    State(service): State<Arc<AdService>>,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode> {
    service.delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Upload the ad image
///
/// Accepts multipart/form-data with an `image` file field. Replaces any
/// previous image.
#[utoipa::path(
    post,
    path = "/api/ads/{id}/image",
    params(
        ("id" = i64, Path, description = "Ad id")
    ),
    request_body(
        content = UploadAdImageDto,
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 200, description = "Image stored", body = ApiResponse<AdDetailDto>),
        (status = 400, description = "Missing, oversized or unsupported image"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not the author, a moderator or an admin"),
        (status = 404, description = "Ad not found"),
        (status = 502, description = "Storage unavailable")
    ),
    tag = "ads",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_ad_image(
    user: AuthenticatedUser,
    State(service): State<Arc<AdService>>,
    AppPath(id): AppPath<i64>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<AdDetailDto>>> {
    service.authorize_image(&user, id).await?;

    let mut image: Option<(Vec<u8>, String)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        if field.name() != Some("image") {
            debug!("Ignoring unknown field: {:?}", field.name());
            continue;
        }

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field.bytes().await.map_err(|e| {
            debug!("Failed to read image bytes: {}", e);
            AppError::BadRequest(format!("Failed to read image data: {}", e))
        })?;

        image = Some((data.to_vec(), content_type));
    }

    let (data, content_type) = image.ok_or_else(|| AppError::field("image", "is required"))?;

    if data.is_empty() {
        return Err(AppError::field("image", "must not be empty"));
    }
    if data.len() > MAX_IMAGE_SIZE {
        return Err(AppError::field(
            "image",
            format!("must be at most {} MB", MAX_IMAGE_SIZE / 1024 / 1024),
        ));
    }
    let extension = image_extension(&content_type).ok_or_else(|| {
        AppError::field(
            "image",
            format!("unsupported content type '{}'", content_type),
        )
    })?;

    let ad = service
        .set_image(&user, id, &data, &content_type, extension)
        .await?;
    Ok(Json(ApiResponse::success(Some(ad), None, None)))
}
