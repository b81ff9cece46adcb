use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::ads::dtos::AdListDto;
use crate::features::selections::models::Selection;

/// Selection summary used in listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SelectionListDto {
    pub id: i64,
    pub name: String,
    pub owner_id: i64,
    /// Owner username
    pub owner: String,
    /// Number of ads in the selection
    pub item_count: i64,
}

impl From<Selection> for SelectionListDto {
    fn from(s: Selection) -> Self {
        Self {
            id: s.id,
            name: s.name,
            owner_id: s.owner_id,
            owner: s.owner_username,
            item_count: s.item_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SelectionOwnerDto {
    pub id: i64,
    pub username: String,
}

/// Selection with its ads in insertion order
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SelectionDetailDto {
    pub id: i64,
    pub name: String,
    pub owner: SelectionOwnerDto,
    pub items: Vec<AdListDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SelectionDetailDto {
    pub fn new(selection: Selection, items: Vec<AdListDto>) -> Self {
        Self {
            id: selection.id,
            name: selection.name,
            owner: SelectionOwnerDto {
                id: selection.owner_id,
                username: selection.owner_username,
            },
            items,
            created_at: selection.created_at,
            updated_at: selection.updated_at,
        }
    }
}

/// Request DTO for creating a selection owned by the acting user
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateSelectionDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    #[schema(example = "Для дачи")]
    pub name: String,

    /// Ad ids, kept in the given order
    #[serde(default)]
    pub items: Vec<i64>,
}

/// Request DTO for updating a selection; `items` replaces the whole set
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateSelectionDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    pub items: Option<Vec<i64>>,
}
