pub mod cli;
pub mod config;
pub mod error;
pub mod form;
pub mod http;
pub mod routes;
pub mod state;
pub mod submission;
pub mod views;

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::Error;
use crate::form::FormFetcher;
use crate::state::{AppState, FormRegistry, SharedState};
use crate::submission::HttpSubmitter;

pub fn build_app(config: Config) -> Result<Router, Error> {
    let client = http::build_client(config.http_timeout)?;

    let state: SharedState = Arc::new(AppState {
        fetcher: FormFetcher::new(client.clone()),
        submitter: Arc::new(HttpSubmitter::new(client)),
        forms: FormRegistry::new(),
        config,
    });

    let app = Router::new()
        .merge(routes::api_routes())
        .merge(views::view_routes())
        .route("/health", axum::routing::get(health))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state);

    Ok(app)
}

async fn health() -> &'static str {
    "ok"
}
