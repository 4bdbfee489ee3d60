pub mod prompt;

use std::io::{BufRead, Write};
use std::time::Duration;

use clap::Parser;

use crate::config::DEFAULT_TIMEOUT_SECS;
use crate::error::Error;
use crate::form::FormFetcher;
use crate::http;
use crate::submission::{
    self, runner, HttpSubmitter, RunSettings, RunSummary, SubmissionResult, DEFAULT_COUNT,
    DEFAULT_DELAY_MAX_SECS, DEFAULT_DELAY_MIN_SECS,
};

pub use prompt::{parse_answer_flags, prompt_answers};

#[derive(Debug, Parser)]
#[command(
    name = "formrunner",
    version,
    about = "Fetch a public form, choose answers and submit them repeatedly"
)]
pub struct Args {
    /// Form URL (any link under /forms/d/e/<id>/)
    #[arg(long)]
    pub url: String,

    /// Number of submissions
    #[arg(long, default_value_t = DEFAULT_COUNT)]
    pub count: u32,

    /// Minimum pause between submissions, in seconds
    #[arg(long, default_value_t = DEFAULT_DELAY_MIN_SECS, allow_negative_numbers = true)]
    pub delay_min: f64,

    /// Maximum pause between submissions, in seconds
    #[arg(long, default_value_t = DEFAULT_DELAY_MAX_SECS, allow_negative_numbers = true)]
    pub delay_max: f64,

    /// Answer as ID=VALUE; repeat for several fields or several options. Skips the prompts.
    #[arg(long = "answer", value_name = "ID=VALUE")]
    pub answers: Vec<String>,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,
}

/// Fetch, choose, build, then run the submission loop, writing progress to `output`.
///
/// Settings are validated before anything touches the network.
pub async fn run<R, W>(args: &Args, input: &mut R, output: &mut W) -> Result<RunSummary, Error>
where
    R: BufRead,
    W: Write + Send,
{
    let settings = RunSettings::new(args.count, args.delay_min, args.delay_max)?;
    let client = http::build_client(Duration::from_secs(args.timeout))?;

    writeln!(output, "Fetching form: {}", args.url).map_err(write_err)?;
    let form = FormFetcher::new(client.clone()).fetch(&args.url).await?;

    if let Some(title) = &form.title {
        writeln!(output, "{title}").map_err(write_err)?;
    }
    writeln!(output, "Found {} question(s)", form.fields.len()).map_err(write_err)?;

    let answers = if args.answers.is_empty() {
        prompt_answers(&form.fields, input, output)?
    } else {
        parse_answer_flags(&args.answers)?
    };
    let payload = submission::build(&form, &answers)?;

    writeln!(
        output,
        "\nSubmitting {} time(s) to: {}",
        settings.count, form.submit_url
    )
    .map_err(write_err)?;
    writeln!(
        output,
        "Delay: {}-{}s between requests\n",
        args.delay_min, args.delay_max
    )
    .map_err(write_err)?;

    let submitter = HttpSubmitter::new(client);
    let count = settings.count;
    let summary = runner::run(&submitter, &form.submit_url, &payload, &settings, |result| {
        // The loop keeps going even if stdout is gone.
        if let Err(e) = writeln!(output, "{}", progress_line(result, count)) {
            tracing::warn!("Failed to write progress: {e}");
        }
    })
    .await;

    writeln!(
        output,
        "\nDone. {}/{} submitted successfully ({} confirmed).",
        summary.succeeded, summary.total, summary.confirmed
    )
    .map_err(write_err)?;

    Ok(summary)
}

pub fn progress_line(result: &SubmissionResult, total: u32) -> String {
    let prefix = format!("[{}/{total}]", result.attempt);
    match (&result.error, result.http_status) {
        (Some(err), _) => format!("{prefix} Error: {err}"),
        (None, Some(status)) if result.is_success() => {
            format!("{prefix} Submitted successfully (HTTP {status})")
        }
        (None, Some(status)) => format!("{prefix} Failed (HTTP {status})"),
        (None, None) => format!("{prefix} Failed"),
    }
}

fn write_err(e: std::io::Error) -> Error {
    Error::Config(format!("Failed to write output: {e}"))
}
