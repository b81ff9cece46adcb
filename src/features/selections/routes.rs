use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::selections::handlers;
use crate::features::selections::services::SelectionService;

/// Create routes for the selections feature
pub fn routes(service: Arc<SelectionService>) -> Router {
    Router::new()
        .route(
            "/api/selections",
            get(handlers::list_selections).post(handlers::create_selection),
        )
        .route(
            "/api/selections/{id}",
            get(handlers::get_selection)
                .patch(handlers::update_selection)
                .delete(handlers::delete_selection),
        )
        .with_state(service)
}
