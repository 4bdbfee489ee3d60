#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use reqwest::Client;
use serde_json::Value;

use formrunner::config::Config;
use formrunner::form::{FieldKind, Form, FormField};

pub const FORM_ID: &str = "1FAIpQLSfake";
pub const VIEWFORM_HTML: &str = include_str!("../fixtures/viewform.html");
pub const ALL_TYPES_HTML: &str = include_str!("../fixtures/all_types.html");
pub const FALLBACK_HTML: &str = include_str!("../fixtures/fallback.html");
pub const CONFIRMATION_HTML: &str = include_str!("../fixtures/confirmation.html");

/// In-process stand-in for the upstream form host.
///
/// `GET /forms/d/e/{id}/viewform` serves the fixture page (`signin` redirects
/// to a login page, `missing` answers 404) and `POST .../formResponse` records
/// the decoded body. Attempts listed in `fail_attempts` (1-based) get a 500.
#[derive(Clone)]
pub struct FakeUpstream {
    pub addr: SocketAddr,
    inner: Arc<UpstreamState>,
}

struct UpstreamState {
    page: &'static str,
    fail_attempts: Vec<usize>,
    page_views: AtomicUsize,
    posts: Mutex<Vec<Vec<(String, String)>>>,
}

impl FakeUpstream {
    pub fn form_url(&self, form_id: &str) -> String {
        format!("http://{}/forms/d/e/{form_id}/viewform?usp=sf_link", self.addr)
    }

    pub fn submit_url(&self) -> String {
        format!("http://{}/forms/d/e/{FORM_ID}/formResponse", self.addr)
    }

    pub fn page_views(&self) -> usize {
        self.inner.page_views.load(Ordering::SeqCst)
    }

    pub fn posts(&self) -> Vec<Vec<(String, String)>> {
        self.inner.posts.lock().unwrap().clone()
    }
}

pub async fn spawn_upstream() -> FakeUpstream {
    spawn_upstream_with(VIEWFORM_HTML, &[]).await
}

pub async fn spawn_upstream_with(page: &'static str, fail_attempts: &[usize]) -> FakeUpstream {
    let inner = Arc::new(UpstreamState {
        page,
        fail_attempts: fail_attempts.to_vec(),
        page_views: AtomicUsize::new(0),
        posts: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .route("/forms/d/e/{id}/viewform", get(viewform))
        .route(
            "/forms/d/e/{id}/formResponse",
            axum::routing::post(form_response),
        )
        .route("/ServiceLogin", get(|| async { Html("<html>Sign in</html>") }))
        .with_state(inner.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind upstream");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Upstream failed");
    });

    FakeUpstream { addr, inner }
}

async fn viewform(State(state): State<Arc<UpstreamState>>, Path(id): Path<String>) -> Response {
    state.page_views.fetch_add(1, Ordering::SeqCst);
    match id.as_str() {
        "signin" => Redirect::temporary("/ServiceLogin?continue=form").into_response(),
        "missing" => (StatusCode::NOT_FOUND, "Not Found").into_response(),
        _ => Html(state.page).into_response(),
    }
}

async fn form_response(State(state): State<Arc<UpstreamState>>, body: Bytes) -> Response {
    let pairs: Vec<(String, String)> = form_urlencoded::parse(&body)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let attempt = {
        let mut posts = state.posts.lock().unwrap();
        posts.push(pairs);
        posts.len()
    };

    if state.fail_attempts.contains(&attempt) {
        (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong").into_response()
    } else {
        Html(CONFIRMATION_HTML).into_response()
    }
}

/// A running web UI bound to a random port.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(Value::Null);
        (body, status)
    }

    /// POST and collect every `data:` event of an SSE response.
    pub async fn post_events(&self, path: &str, body: &Value) -> (Vec<Value>, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        let events = text
            .lines()
            .filter_map(|line| line.strip_prefix("data:"))
            .filter_map(|data| serde_json::from_str(data.trim()).ok())
            .collect();
        (events, status)
    }
}

pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        log_level: "warn".to_string(),
        http_timeout: Duration::from_secs(5),
        max_count: 100,
    }
}

pub async fn spawn_app() -> TestApp {
    let app = formrunner::build_app(test_config()).expect("Failed to build app");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp { addr, client }
}

/// Single-choice A/B (required), multi-choice X/Y, free text.
pub fn three_field_form(submit_url: &str) -> Form {
    let mut hidden_fields = BTreeMap::new();
    hidden_fields.insert("entry.1002_sentinel".to_string(), String::new());
    hidden_fields.insert("fbzx".to_string(), "-4242424242".to_string());
    hidden_fields.insert("fvv".to_string(), "1".to_string());
    hidden_fields.insert("pageHistory".to_string(), "0".to_string());

    Form {
        form_id: FORM_ID.to_string(),
        title: Some("Test Form".to_string()),
        view_url: submit_url.replace("formResponse", "viewform"),
        submit_url: submit_url.to_string(),
        fields: vec![
            FormField {
                id: "entry.1001".to_string(),
                label: "Favourite letter".to_string(),
                kind: FieldKind::SingleChoice,
                required: true,
                options: vec!["A".to_string(), "B".to_string()],
            },
            FormField {
                id: "entry.1002".to_string(),
                label: "Toppings".to_string(),
                kind: FieldKind::MultiChoice,
                required: false,
                options: vec!["X".to_string(), "Y".to_string()],
            },
            FormField {
                id: "entry.1003".to_string(),
                label: "Anything else?".to_string(),
                kind: FieldKind::Text,
                required: false,
                options: vec![],
            },
        ],
        hidden_fields,
    }
}

pub fn expected_pairs() -> Vec<(String, String)> {
    [
        ("entry.1002_sentinel", ""),
        ("fbzx", "-4242424242"),
        ("fvv", "1"),
        ("pageHistory", "0"),
        ("entry.1001", "A"),
        ("entry.1002", "X"),
        ("entry.1002", "Y"),
        ("entry.1003", "hello"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}
