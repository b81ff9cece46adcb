use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::ads::models::Ad;
use crate::shared::types::nullable;

/// Maximum accepted image size (5 MiB)
pub const MAX_IMAGE_SIZE: usize = 5 * 1024 * 1024;

/// Image MIME types accepted for ads, with the extension stored objects get
pub const ALLOWED_IMAGE_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
];

/// File extension for an accepted image MIME type
pub fn image_extension(content_type: &str) -> Option<&'static str> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    ALLOWED_IMAGE_TYPES
        .iter()
        .find(|(mime, _)| *mime == essence)
        .map(|(_, ext)| *ext)
}

/// Ad summary used in listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdListDto {
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub is_published: bool,
    pub image: Option<String>,
    pub author_id: i64,
    /// Author username
    pub author: String,
    /// Author location name
    pub location: Option<String>,
    pub category_id: Option<i64>,
    /// Category name
    pub category: Option<String>,
}

impl From<Ad> for AdListDto {
    fn from(ad: Ad) -> Self {
        Self {
            id: ad.id,
            name: ad.name,
            price: ad.price,
            is_published: ad.is_published,
            image: ad.image,
            author_id: ad.author_id,
            author: ad.author_username,
            location: ad.author_location,
            category_id: ad.category_id,
            category: ad.category_name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdAuthorDto {
    pub id: i64,
    pub username: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdCategoryDto {
    pub id: i64,
    pub name: String,
}

/// Full ad representation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdDetailDto {
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub description: Option<String>,
    pub is_published: bool,
    /// Public URL of the ad image
    pub image: Option<String>,
    pub author: AdAuthorDto,
    pub category: Option<AdCategoryDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Ad> for AdDetailDto {
    fn from(ad: Ad) -> Self {
        let category = match (ad.category_id, ad.category_name) {
            (Some(id), Some(name)) => Some(AdCategoryDto { id, name }),
            _ => None,
        };

        Self {
            id: ad.id,
            name: ad.name,
            price: ad.price,
            description: ad.description,
            is_published: ad.is_published,
            image: ad.image,
            author: AdAuthorDto {
                id: ad.author_id,
                username: ad.author_username,
                location: ad.author_location,
            },
            category,
            created_at: ad.created_at,
            updated_at: ad.updated_at,
        }
    }
}

/// Request DTO for creating an ad; the author is the acting user
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAdDto {
    #[validate(length(min = 10, max = 50, message = "Name must be 10-50 characters"))]
    #[schema(example = "Wireless Mouse X1")]
    pub name: String,

    #[validate(range(min = 0, message = "Price must not be negative"))]
    pub price: i64,

    pub description: Option<String>,

    #[serde(default)]
    pub is_published: bool,

    pub category_id: Option<i64>,
}

/// Partial update of an ad.
///
/// `description` and `category_id` accept `null` to clear the value;
/// omitted fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAdDto {
    #[validate(length(min = 10, max = 50, message = "Name must be 10-50 characters"))]
    pub name: Option<String>,

    #[validate(range(min = 0, message = "Price must not be negative"))]
    pub price: Option<i64>,

    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,

    pub is_published: Option<bool>,

    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<i64>)]
    pub category_id: Option<Option<i64>>,
}

/// Multipart body of the image upload, for OpenAPI documentation only
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadAdImageDto {
    /// JPEG, PNG, GIF or WebP, at most 5 MiB
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub image: String,
}
