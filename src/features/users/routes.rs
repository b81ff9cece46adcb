use axum::{routing::get, Router};

use crate::features::users::handlers;

pub fn routes() -> Router {
    Router::new().route("/api/users/me", get(handlers::get_me))
}
