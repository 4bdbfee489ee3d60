use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures_util::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::AppError;
use crate::form::{Form, FormUrls};
use crate::state::SharedState;
use crate::submission::client::{confirmation_message, is_confirmed};
use crate::submission::{
    self, runner, AnswerSelection, Payload, RunSettings, DEFAULT_COUNT, DEFAULT_DELAY_MAX_SECS,
    DEFAULT_DELAY_MIN_SECS,
};

#[derive(Deserialize)]
pub struct ParseRequest {
    #[serde(default)]
    pub url: String,
}

#[derive(Deserialize)]
pub struct TestRequest {
    pub form_id: String,
    #[serde(default)]
    pub answers: AnswerSelection,
}

#[derive(Serialize)]
pub struct TestResponse {
    pub http_status: u16,
    pub success: bool,
    pub confirmed: bool,
    pub confirm_message: Option<String>,
    pub payload: Payload,
}

#[derive(Deserialize)]
pub struct SubmitRequest {
    pub form_id: String,
    #[serde(default)]
    pub answers: AnswerSelection,
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default = "default_delay_min")]
    pub delay_min: f64,
    #[serde(default = "default_delay_max")]
    pub delay_max: f64,
}

fn default_count() -> u32 {
    DEFAULT_COUNT
}

fn default_delay_min() -> f64 {
    DEFAULT_DELAY_MIN_SECS
}

fn default_delay_max() -> f64 {
    DEFAULT_DELAY_MAX_SECS
}

pub async fn parse(
    State(state): State<SharedState>,
    Json(req): Json<ParseRequest>,
) -> Result<Json<Form>, AppError> {
    let url = req.url.trim();
    if url.is_empty() {
        return Err(AppError::BadRequest("URL is required".to_string()));
    }
    FormUrls::parse(url).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let form = state.fetcher.fetch(url).await?;
    let form = state.forms.insert(form);

    Ok(Json(form.as_ref().clone()))
}

/// Submit once and report whether the upstream page confirmed it.
pub async fn test(
    State(state): State<SharedState>,
    Json(req): Json<TestRequest>,
) -> Result<Json<TestResponse>, AppError> {
    let form = loaded_form(&state, &req.form_id)?;
    let payload = submission::build(&form, &req.answers)?;

    let resp = state.submitter.submit(&form.submit_url, &payload).await?;

    let confirmed = is_confirmed(&resp.body);
    tracing::info!(
        "Test submission to {} returned HTTP {} (confirmed={confirmed})",
        form.submit_url,
        resp.status
    );

    Ok(Json(TestResponse {
        http_status: resp.status,
        success: resp.is_success(),
        confirmed,
        confirm_message: confirmation_message(&resp.body),
        payload,
    }))
}

/// Start a bulk run and stream one event per attempt, then a final summary.
///
/// Settings and answers are checked before the stream opens, so a bad request
/// never reaches the form.
pub async fn submit(
    State(state): State<SharedState>,
    Json(req): Json<SubmitRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let settings = RunSettings::new(req.count, req.delay_min, req.delay_max)?
        .with_max_count(state.config.max_count)?;
    let form = loaded_form(&state, &req.form_id)?;
    let payload = submission::build(&form, &req.answers)?;

    let run_id = Uuid::now_v7();
    let submitter = state.submitter.clone();
    let submit_url = form.submit_url.clone();
    let (tx, rx) = mpsc::unbounded_channel::<serde_json::Value>();

    tracing::info!(%run_id, "Starting run of {} submission(s) to {submit_url}", settings.count);

    tokio::spawn(async move {
        let total = settings.count;
        let mut succeeded = 0u32;
        let mut failed = 0u32;
        let progress = tx.clone();

        let summary = runner::run(
            submitter.as_ref(),
            &submit_url,
            &payload,
            &settings,
            |result| {
                if result.is_success() {
                    succeeded += 1;
                } else {
                    failed += 1;
                }
                let _ = progress.send(json!({
                    "run_id": run_id,
                    "attempt": result.attempt,
                    "total": total,
                    "outcome": result.outcome,
                    "http_status": result.http_status,
                    "confirmed": result.confirmed,
                    "error": result.error,
                    "succeeded": succeeded,
                    "failed": failed,
                }));
            },
        )
        .await;

        tracing::info!(
            %run_id,
            "Run finished: {}/{} succeeded, {} confirmed",
            summary.succeeded,
            summary.total,
            summary.confirmed
        );

        let _ = tx.send(json!({
            "done": true,
            "run_id": run_id,
            "succeeded": summary.succeeded,
            "failed": summary.failed,
            "confirmed": summary.confirmed,
            "total": summary.total,
        }));
    });

    let events = stream::unfold(rx, |mut rx| async move {
        let event = rx.recv().await?;
        Some((Ok(Event::default().data(event.to_string())), rx))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

fn loaded_form(state: &SharedState, form_id: &str) -> Result<Arc<Form>, AppError> {
    state.forms.get(form_id).ok_or_else(|| {
        AppError::NotFound(format!("Form {form_id} is not loaded; parse it first"))
    })
}
