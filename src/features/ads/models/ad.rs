use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Columns decoded into [`Ad`], selected from `ads a` joined via [`AD_JOINS`]
pub const AD_COLUMNS: &str = r#"
    a.id, a.name, a.author_id, u.username AS author_username,
    l.name AS author_location, a.price, a.description, a.is_published,
    a.image, a.category_id, c.name AS category_name,
    a.created_at, a.updated_at
"#;

/// Joins from `ads a` to the author, the author's location and the category
pub const AD_JOINS: &str = r#"
    JOIN users u ON u.id = a.author_id
    LEFT JOIN locations l ON l.id = u.location_id
    LEFT JOIN categories c ON c.id = a.category_id
"#;

/// An ad row joined with its author, the author's location and its category
#[derive(Debug, Clone, FromRow)]
pub struct Ad {
    pub id: i64,
    pub name: String,
    pub author_id: i64,
    pub author_username: String,
    pub author_location: Option<String>,
    pub price: i64,
    pub description: Option<String>,
    pub is_published: bool,
    pub image: Option<String>,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The columns needed to authorize a mutation
#[derive(Debug, Clone, FromRow)]
pub struct AdOwnership {
    pub author_id: i64,
    pub image: Option<String>,
}
