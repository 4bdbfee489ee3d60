use reqwest::Url;

use crate::error::Error;

/// The two endpoints derived from a public form link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormUrls {
    pub form_id: String,
    pub view_url: String,
    pub submit_url: String,
}

impl FormUrls {
    /// Normalize any `/forms/d/e/<id>/...` link to its `viewform` and
    /// `formResponse` endpoints. Query and fragment are dropped.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let url = Url::parse(raw.trim())
            .map_err(|e| Error::Fetch(format!("Invalid form URL '{raw}': {e}")))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Fetch(format!(
                "Unsupported URL scheme '{}'",
                url.scheme()
            )));
        }

        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        let form_id = match segments.as_slice() {
            ["forms", "d", "e", id, ..] => id.to_string(),
            _ => {
                return Err(Error::Fetch(
                    "Could not find a form ID in the URL (expected /forms/d/e/<id>/...)".to_string(),
                ));
            }
        };

        let origin = url.origin().ascii_serialization();
        let base = format!("{origin}/forms/d/e/{form_id}");

        Ok(FormUrls {
            view_url: format!("{base}/viewform"),
            submit_url: format!("{base}/formResponse"),
            form_id,
        })
    }
}
