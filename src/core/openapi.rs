use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::ads::{dtos as ads_dtos, handlers as ads_handlers};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::selections::{dtos as selections_dtos, handlers as selections_handlers};
use crate::features::users::{dtos as users_dtos, handlers as users_handlers, models::UserRole};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Users
        users_handlers::get_me,
        // Categories
        categories_handlers::list_categories,
        categories_handlers::get_category,
        categories_handlers::create_category,
        categories_handlers::update_category,
        categories_handlers::delete_category,
        // Ads
        ads_handlers::list_ads,
        ads_handlers::get_ad,
        ads_handlers::create_ad,
        ads_handlers::update_ad,
        ads_handlers::delete_ad,
        ads_handlers::upload_ad_image,
        // Selections
        selections_handlers::list_selections,
        selections_handlers::get_selection,
        selections_handlers::create_selection,
        selections_handlers::update_selection,
        selections_handlers::delete_selection,
    ),
    components(
        schemas(
            Meta,
            UserRole,
            AuthenticatedUser,
            users_dtos::UserResponseDto,
            categories_dtos::CategoryResponseDto,
            categories_dtos::CreateCategoryDto,
            categories_dtos::UpdateCategoryDto,
            ads_dtos::AdListDto,
            ads_dtos::AdDetailDto,
            ads_dtos::AdAuthorDto,
            ads_dtos::AdCategoryDto,
            ads_dtos::CreateAdDto,
            ads_dtos::UpdateAdDto,
            ads_dtos::UploadAdImageDto,
            selections_dtos::SelectionListDto,
            selections_dtos::SelectionDetailDto,
            selections_dtos::SelectionOwnerDto,
            selections_dtos::CreateSelectionDto,
            selections_dtos::UpdateSelectionDto,
            ApiResponse<users_dtos::UserResponseDto>,
            ApiResponse<categories_dtos::CategoryResponseDto>,
            ApiResponse<Vec<categories_dtos::CategoryResponseDto>>,
            ApiResponse<ads_dtos::AdDetailDto>,
            ApiResponse<Vec<ads_dtos::AdListDto>>,
            ApiResponse<selections_dtos::SelectionDetailDto>,
            ApiResponse<Vec<selections_dtos::SelectionListDto>>,
        )
    ),
    tags(
        (name = "users", description = "The acting user"),
        (name = "categories", description = "Ad categories (mutations are admin only)"),
        (name = "ads", description = "Classified ads with filtering and image upload"),
        (name = "selections", description = "Curated collections of ads"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Classifieds API",
        version = "0.1.0",
        description = "API documentation for the classifieds backend",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
