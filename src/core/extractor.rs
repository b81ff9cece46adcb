use axum::{
    body::Body,
    extract::{
        path::ErrorKind,
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts, Path, Query, RawPathParams, Request,
    },
    http::request::Parts,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;

/// JSON body extractor whose rejections use the error envelope.
///
/// Body fields that fail to deserialize are reported as `field: message`
/// entries; malformed JSON stays a plain bad request.
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppJsonRejection;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(value) => Ok(Self(value.0)),
            Err(rejection) => Err(AppJsonRejection(rejection)),
        }
    }
}

pub struct AppJsonRejection(JsonRejection);

impl From<AppJsonRejection> for AppError {
    fn from(rejection: AppJsonRejection) -> Self {
        match rejection.0 {
            JsonRejection::JsonDataError(err) => {
                let (field, message) = split_field_error(&err.body_text());
                AppError::field(&field, message)
            }
            JsonRejection::JsonSyntaxError(err) => AppError::BadRequest(format!(
                "Invalid JSON syntax: {}",
                detail(&err.body_text())
            )),
            JsonRejection::MissingJsonContentType(err) => AppError::BadRequest(err.body_text()),
            _ => AppError::BadRequest("Failed to parse JSON body".to_string()),
        }
    }
}

impl IntoResponse for AppJsonRejection {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

/// Path extractor reporting unparseable segments as validation errors
/// naming the route parameter.
pub struct AppPath<T>(pub T);

impl<T, S> FromRequestParts<S> for AppPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(value) => Ok(Self(value.0)),
            Err(rejection) => {
                let names: Vec<String> = RawPathParams::from_request_parts(parts, state)
                    .await
                    .map(|params| params.iter().map(|(key, _)| key.to_string()).collect())
                    .unwrap_or_default();
                Err(path_error(rejection, &names))
            }
        }
    }
}

fn path_error(rejection: PathRejection, names: &[String]) -> AppError {
    let kind = match rejection {
        PathRejection::FailedToDeserializePathParams(err) => err.into_kind(),
        PathRejection::MissingPathParams(err) => return AppError::Internal(err.body_text()),
        other => return AppError::BadRequest(other.body_text()),
    };

    match kind {
        ErrorKind::ParseErrorAtKey { key, expected_type, .. } => {
            AppError::field(&key, format!("must be a valid {}", expected_type))
        }
        ErrorKind::ParseErrorAtIndex { index, expected_type, .. } => {
            let field = names.get(index).map(String::as_str).unwrap_or("path");
            AppError::field(field, format!("must be a valid {}", expected_type))
        }
        ErrorKind::ParseError { expected_type, .. } => {
            let field = match names {
                [only] => only.as_str(),
                _ => "path",
            };
            AppError::field(field, format!("must be a valid {}", expected_type))
        }
        ErrorKind::InvalidUtf8InPathParam { key } => AppError::field(&key, "must be valid UTF-8"),
        ErrorKind::DeserializeError { key, message, .. } => AppError::field(&key, message),
        other @ (ErrorKind::UnsupportedType { .. } | ErrorKind::WrongNumberOfParameters { .. }) => {
            AppError::Internal(other.to_string())
        }
        other => AppError::BadRequest(format!("Invalid URL: {}", other)),
    }
}

/// Query string extractor reporting bad parameters as validation errors.
pub struct AppQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for AppQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(value) => Ok(Self(value.0)),
            Err(QueryRejection::FailedToDeserializeQueryString(err)) => {
                let (field, message) = split_field_error(&err.body_text());
                Err(AppError::field(&field, message))
            }
            Err(other) => Err(AppError::BadRequest(other.body_text())),
        }
    }
}

/// Drop the rejection's fixed preamble, keeping the serde message.
fn detail(body: &str) -> &str {
    body.split_once(": ").map(|(_, rest)| rest).unwrap_or(body)
}

/// Split a rejection body such as
/// `Failed to deserialize query string: page: invalid digit found in string`
/// into the offending field and its message.
fn split_field_error(body: &str) -> (String, String) {
    let rest = detail(body);
    let rest = match rest.find(" at line ") {
        Some(idx) => &rest[..idx],
        None => rest,
    };

    if let Some(name) = rest
        .strip_prefix("missing field `")
        .and_then(|tail| tail.split_once('`'))
        .map(|(name, _)| name)
    {
        return (name.to_string(), "this field is required".to_string());
    }

    if let Some((path, message)) = rest.split_once(": ") {
        if !path.is_empty() && !path.contains(char::is_whitespace) {
            return (path.to_string(), message.to_string());
        }
    }

    ("non_field_errors".to_string(), rest.to_string())
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}
