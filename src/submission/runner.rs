use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::builder::Payload;
use super::client::{is_confirmed, Submitter};
use super::pacing::RunSettings;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failed,
}

/// Outcome of one POST.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionResult {
    pub attempt: u32,
    pub outcome: Outcome,
    pub http_status: Option<u16>,
    pub confirmed: bool,
    pub error: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl SubmissionResult {
    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub total: u32,
    pub succeeded: u32,
    pub failed: u32,
    pub confirmed: u32,
    /// Pauses taken between consecutive submissions, in order.
    #[serde(skip)]
    pub pauses: Vec<Duration>,
}

/// Make one submission and classify it. Never fails: errors end up in the result.
pub async fn submit_once(
    submitter: &dyn Submitter,
    url: &str,
    payload: &Payload,
    attempt: u32,
) -> SubmissionResult {
    match submitter.submit(url, payload).await {
        Ok(resp) => SubmissionResult {
            attempt,
            outcome: if resp.is_success() {
                Outcome::Success
            } else {
                Outcome::Failed
            },
            http_status: Some(resp.status),
            confirmed: is_confirmed(&resp.body),
            error: None,
            submitted_at: Utc::now(),
        },
        Err(e) => SubmissionResult {
            attempt,
            outcome: Outcome::Failed,
            http_status: None,
            confirmed: false,
            error: Some(e.to_string()),
            submitted_at: Utc::now(),
        },
    }
}

/// Submit `payload` exactly `settings.count` times, one after another, with a
/// random pause from `settings.delays` between consecutive attempts.
///
/// Failed attempts are reported through `on_result` like any other and do not
/// stop the run.
pub async fn run<F>(
    submitter: &dyn Submitter,
    url: &str,
    payload: &Payload,
    settings: &RunSettings,
    mut on_result: F,
) -> RunSummary
where
    F: FnMut(&SubmissionResult) + Send,
{
    let mut summary = RunSummary {
        total: settings.count,
        ..Default::default()
    };

    for attempt in 1..=settings.count {
        let result = submit_once(submitter, url, payload, attempt).await;

        match result.outcome {
            Outcome::Success => {
                summary.succeeded += 1;
                tracing::debug!(
                    "Submission {attempt}/{} accepted (HTTP {:?}, confirmed={})",
                    settings.count,
                    result.http_status,
                    result.confirmed
                );
            }
            Outcome::Failed => {
                summary.failed += 1;
                match (&result.error, result.http_status) {
                    (Some(err), _) => {
                        tracing::warn!("Submission {attempt}/{} failed: {err}", settings.count)
                    }
                    (None, status) => tracing::warn!(
                        "Submission {attempt}/{} rejected (HTTP {status:?})",
                        settings.count
                    ),
                }
            }
        }
        if result.confirmed {
            summary.confirmed += 1;
        }

        on_result(&result);

        if attempt < settings.count {
            let pause = {
                let mut rng = rand::rng();
                settings.delays.sample(&mut rng)
            };
            summary.pauses.push(pause);
            if !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
        }
    }

    summary
}
