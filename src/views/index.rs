use askama::Template;
use axum::extract::State;
use axum::response::{Html, IntoResponse};

use crate::state::SharedState;
use crate::submission::{DEFAULT_COUNT, DEFAULT_DELAY_MAX_SECS, DEFAULT_DELAY_MIN_SECS};

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    max_count: u32,
    default_count: u32,
    default_delay_min: f64,
    default_delay_max: f64,
}

pub async fn index(State(state): State<SharedState>) -> impl IntoResponse {
    let template = IndexTemplate {
        max_count: state.config.max_count,
        default_count: DEFAULT_COUNT,
        default_delay_min: DEFAULT_DELAY_MIN_SECS,
        default_delay_max: DEFAULT_DELAY_MAX_SECS,
    };
    Html(template.render().unwrap_or_default())
}
