pub mod forms;

use axum::routing::post;
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        .route("/api/parse", post(forms::parse))
        .route("/api/test", post(forms::test))
        .route("/api/submit", post(forms::submit))
}
