use reqwest::Url;

use super::{parser, Form, FormUrls};
use crate::error::Error;

pub struct FormFetcher {
    client: reqwest::Client,
}

impl FormFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Download and parse a form. A single attempt; failures go straight to the caller.
    pub async fn fetch(&self, url: &str) -> Result<Form, Error> {
        let urls = FormUrls::parse(url)?;

        tracing::info!("Fetching form {}", urls.view_url);

        let resp = self
            .client
            .get(&urls.view_url)
            .send()
            .await
            .map_err(|e| Error::Fetch(format!("Failed to reach {}: {e}", urls.view_url)))?;

        if requires_sign_in(resp.url()) {
            return Err(Error::Fetch(
                "The form requires sign-in, which is not supported".to_string(),
            ));
        }

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Fetch(format!(
                "Form page returned HTTP {}",
                status.as_u16()
            )));
        }

        let html = resp
            .text()
            .await
            .map_err(|e| Error::Fetch(format!("Failed to read form page: {e}")))?;

        let form = parser::parse_page(&html, &urls)?;

        tracing::info!(
            "Parsed form {} ({} field(s), {} hidden)",
            form.form_id,
            form.fields.len(),
            form.hidden_fields.len()
        );

        Ok(form)
    }
}

fn requires_sign_in(url: &Url) -> bool {
    url.host_str() == Some("accounts.google.com") || url.path().contains("ServiceLogin")
}
