use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::categories::models::Category;
use crate::shared::validation::SLUG_REGEX;

/// Response DTO for category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponseDto {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

impl From<Category> for CategoryResponseDto {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            slug: c.slug,
        }
    }
}

/// Request DTO for creating a category
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryDto {
    #[validate(length(min = 1, max = 60, message = "Name must be 1-60 characters"))]
    pub name: String,

    /// Generated when omitted
    #[validate(
        length(min = 5, max = 10, message = "Slug must be 5-10 characters"),
        regex(path = *SLUG_REGEX, message = "Slug must be lowercase letters, digits and single hyphens")
    )]
    pub slug: Option<String>,
}

impl CreateCategoryDto {
    /// The slug to store: the supplied one, or `c` + 8 hex chars
    pub fn slug_or_generated(&self) -> String {
        self.slug.clone().unwrap_or_else(generate_slug)
    }
}

/// Request DTO for updating a category; absent fields are left untouched
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryDto {
    #[validate(length(min = 1, max = 60, message = "Name must be 1-60 characters"))]
    pub name: Option<String>,

    #[validate(
        length(min = 5, max = 10, message = "Slug must be 5-10 characters"),
        regex(path = *SLUG_REGEX, message = "Slug must be lowercase letters, digits and single hyphens")
    )]
    pub slug: Option<String>,
}

fn generate_slug() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("c{}", &hex[..8])
}
