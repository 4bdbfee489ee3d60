use std::sync::LazyLock;

use async_trait::async_trait;
use scraper::{Html, Selector};

use super::builder::Payload;
use crate::error::Error;

/// Markers of a page that actually recorded the response.
pub const CONFIRM_INDICATORS: [&str; 3] = [
    "freebirdFormviewerViewResponseConfirmationMessage",
    "Your response has been recorded",
    "Thanks for your response",
];

static CONFIRMATION: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".freebirdFormviewerViewResponseConfirmationMessage").unwrap()
});

#[derive(Debug, Clone)]
pub struct SubmitResponse {
    pub status: u16,
    pub body: String,
}

impl SubmitResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Submitter: Send + Sync {
    /// Issue exactly one POST. Transport failures come back as `Error::Submission`.
    async fn submit(&self, url: &str, payload: &Payload) -> Result<SubmitResponse, Error>;
}

pub struct HttpSubmitter {
    client: reqwest::Client,
}

impl HttpSubmitter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Submitter for HttpSubmitter {
    async fn submit(&self, url: &str, payload: &Payload) -> Result<SubmitResponse, Error> {
        let resp = self
            .client
            .post(url)
            .form(payload.pairs())
            .send()
            .await
            .map_err(|e| Error::Submission(format!("Request failed: {e}")))?;

        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();

        Ok(SubmitResponse { status, body })
    }
}

pub fn is_confirmed(html: &str) -> bool {
    CONFIRM_INDICATORS.iter().any(|marker| html.contains(marker))
}

/// Text of the confirmation element, if the response page has one.
pub fn confirmation_message(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&CONFIRMATION)
        .next()
        .map(|el| {
            el.text()
                .flat_map(str::split_whitespace)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|text| !text.is_empty())
}
