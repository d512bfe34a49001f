//! Student CRUD routes.

use crate::handlers::{create, delete as delete_handler, read, update};
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};

pub fn student_routes(state: AppState) -> Router {
    Router::new()
        .route("/student/create", post(create))
        .route("/student/:id", get(read).put(update).delete(delete_handler))
        .with_state(state)
}
