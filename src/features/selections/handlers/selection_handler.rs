use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppPath, AppQuery};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::selections::dtos::{
    CreateSelectionDto, SelectionDetailDto, SelectionListDto, UpdateSelectionDto,
};
use crate::features::selections::services::SelectionService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// List selections
#[utoipa::path(
    get,
    path = "/api/selections",
    params(PaginationQuery),
    responses(
        (status = 200, description = "List of selections", body = ApiResponse<Vec<SelectionListDto>>),
    ),
    tag = "selections"
)]
pub async fn list_selections(
    State(service): State<Arc<SelectionService>>,
    AppQuery(pagination): AppQuery<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<SelectionListDto>>>> {
    let (selections, total) = service.list(&pagination).await?;
    Ok(Json(ApiResponse::success(
        Some(selections),
        None,
        Some(Meta { total }),
    )))
}

/// Get a selection with its ads
#[utoipa::path(
    get,
    path = "/api/selections/{id}",
    params(
        ("id" = i64, Path, description = "Selection id")
    ),
    responses(
        (status = 200, description = "Selection found", body = ApiResponse<SelectionDetailDto>),
        (status = 404, description = "Selection not found")
    ),
    tag = "selections"
)]
pub async fn get_selection(
    State(service): State<Arc<SelectionService>>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<ApiResponse<SelectionDetailDto>>> {
    let selection = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(selection), None, None)))
}

/// Create a selection owned by the acting user
#[utoipa::path(
    post,
    path = "/api/selections",
    request_body = CreateSelectionDto,
    responses(
        (status = 201, description = "Selection created", body = ApiResponse<SelectionDetailDto>),
        (status = 400, description = "Validation error, duplicate name or unknown ads"),
        (status = 401, description = "Authentication required")
    ),
    tag = "selections",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_selection(
    user: AuthenticatedUser,
    State(service): State<Arc<SelectionService>>,
    AppJson(dto): AppJson<CreateSelectionDto>,
) -> Result<(StatusCode, Json<ApiResponse<SelectionDetailDto>>)> {
    dto.validate()?;

    let selection = service.create(&user, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(selection), None, None)),
    ))
}

/// Update a selection (owner or admin)
#[utoipa::path(
    patch,
    path = "/api/selections/{id}",
    params(
        ("id" = i64, Path, description = "Selection id")
    ),
    request_body = UpdateSelectionDto,
    responses(
        (status = 200, description = "Selection updated", body = ApiResponse<SelectionDetailDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not the owner or an admin"),
        (status = 404, description = "Selection not found")
    ),
    tag = "selections",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_selection(
    user: AuthenticatedUser,
    State(service): State<Arc<SelectionService>>,
    AppPath(id): AppPath<i64>,
    AppJson(dto): AppJson<UpdateSelectionDto>,
) -> Result<Json<ApiResponse<SelectionDetailDto>>> {
    dto.validate()?;

    let selection = service.update(&user, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(selection), None, None)))
}

/// Delete a selection (owner or admin)
#[utoipa::path(
    delete,
    path = "/api/selections/{id}",
    params(
        ("id" = i64, Path, description = "Selection id")
    ),
    responses(
        (status = 204, description = "Selection deleted"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not the owner or an admin"),
        (status = 404, description = "Selection not found")
    ),
    tag = "selections",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_selection(
    user: AuthenticatedUser,
    State(service): State<Arc<SelectionService>>,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode> {
    service.delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
