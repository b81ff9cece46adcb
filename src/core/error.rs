use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::shared::types::ApiResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Field-level validation failure; each entry reads `field: message`
    #[error("Validation error: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl AppError {
    /// Validation failure for a single field
    pub fn field(field: &str, message: impl std::fmt::Display) -> Self {
        AppError::Validation(vec![format!("{}: {}", field, message)])
    }

    /// Stable machine-readable code carried in the error envelope
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => "validation_error",
            AppError::NotFound(_) => "not_found",
            AppError::Auth(_) | AppError::Unauthorized(_) => "authentication_error",
            AppError::Forbidden(_) => "authorization_error",
            AppError::Storage(_) => "storage_error",
            AppError::Database(_) | AppError::Internal(_) => "internal_error",
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages = Vec::new();
        collect_validation_messages(None, &errors, &mut messages);
        messages.sort();
        AppError::Validation(messages)
    }
}

fn collect_validation_messages(
    prefix: Option<&str>,
    errors: &ValidationErrors,
    out: &mut Vec<String>,
) {
    for (field, kind) in errors.errors() {
        let path = match prefix {
            Some(p) => format!("{}.{}", p, field),
            None => field.to_string(),
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for err in field_errors {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    out.push(format!("{}: {}", path, message));
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                collect_validation_messages(Some(&path), nested, out);
            }
            ValidationErrorsKind::List(items) => {
                for (idx, nested) in items {
                    collect_validation_messages(Some(&format!("{}[{}]", path, idx)), nested, out);
                }
            }
        }
    }
}

/// Translate constraint violations the handlers did not catch up front into
/// validation errors naming the offending field.
///
/// Constraint names follow Postgres defaults (`<table>_<column>_key`,
/// `<table>_<column>_fkey`, `<table>_<column>_check`), so the column is
/// recovered by stripping the table name and suffix.
pub fn map_db_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        let constraint = db_err.constraint().unwrap_or_default();
        let field = field_from_constraint(constraint, db_err.table());

        match db_err.code().as_deref() {
            Some("23505") => {
                return AppError::field(&field, "a record with this value already exists");
            }
            Some("23503") => {
                return AppError::field(&field, "referenced record does not exist");
            }
            Some("23514") => {
                return AppError::field(&field, "value violates a constraint");
            }
            // string_data_right_truncation carries no constraint or column
            Some("22001") => {
                return AppError::field(&field, "value is too long");
            }
            _ => {}
        }
    }

    AppError::Database(e)
}

fn field_from_constraint(constraint: &str, table: Option<&str>) -> String {
    let mut name = constraint;
    if let Some(table) = table {
        name = name
            .strip_prefix(table)
            .and_then(|rest| rest.strip_prefix('_'))
            .unwrap_or(name);
    }
    for suffix in ["_length_check", "_check", "_fkey", "_key", "_pkey"] {
        if let Some(stripped) = name.strip_suffix(suffix) {
            name = stripped;
            break;
        }
    }
    if name.is_empty() {
        "non_field_errors".to_string()
    } else {
        name.to_string()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, message, errors) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                    None,
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::Validation(messages) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                Some(messages),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
            AppError::Auth(msg) | AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, msg, None)
            }
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {}", msg);
                (StatusCode::BAD_GATEWAY, msg, None)
            }
        };

        let body = Json(ApiResponse::<()>::error(code, Some(message), errors));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 10, message = "too short"))]
        name: String,
        #[validate(range(min = 0))]
        price: i64,
    }

    #[test]
    fn test_validation_errors_name_each_field() {
        let sample = Sample {
            name: "short".to_string(),
            price: -1,
        };
        let err: AppError = sample.validate().unwrap_err().into();

        match err {
            AppError::Validation(messages) => {
                assert_eq!(messages, vec!["name: too short", "price: range"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_field_from_constraint() {
        assert_eq!(field_from_constraint("categories_name_key", Some("categories")), "name");
        assert_eq!(field_from_constraint("ads_category_id_fkey", Some("ads")), "category_id");
        assert_eq!(field_from_constraint("ads_name_length_check", Some("ads")), "name");
        assert_eq!(field_from_constraint("ads_price_check", None), "ads_price");
        assert_eq!(field_from_constraint("", None), "non_field_errors");
    }

    #[test]
    fn test_error_codes_are_distinct_per_category() {
        assert_eq!(AppError::field("name", "x").code(), "validation_error");
        assert_eq!(AppError::NotFound("x".into()).code(), "not_found");
        assert_eq!(AppError::Unauthorized("x".into()).code(), "authentication_error");
        assert_eq!(AppError::Forbidden("x".into()).code(), "authorization_error");
    }

    #[test]
    fn test_into_response_status() {
        assert_eq!(
            AppError::field("price_from", "must be an integer")
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Forbidden("no".into()).into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::NotFound("no".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Unauthorized("no".into()).into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_overlong_value_maps_to_validation(pool: sqlx::PgPool) {
        let err = sqlx::query("INSERT INTO locations (name) VALUES ($1)")
            .bind("x".repeat(101))
            .execute(&pool)
            .await
            .unwrap_err();

        match map_db_error(err) {
            AppError::Validation(messages) => {
                assert_eq!(messages, vec!["non_field_errors: value is too long"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_unique_violation_names_column(pool: sqlx::PgPool) {
        sqlx::query("INSERT INTO categories (name, slug) VALUES ('Books', 'books')")
            .execute(&pool)
            .await
            .unwrap();

        let err = sqlx::query("INSERT INTO categories (name, slug) VALUES ('Books', 'books-2')")
            .execute(&pool)
            .await
            .unwrap_err();

        let mapped = map_db_error(err);
        assert_eq!(mapped.code(), "validation_error");
        match mapped {
            AppError::Validation(messages) => {
                assert_eq!(messages, vec!["name: a record with this value already exists"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
