use std::time::Duration;

use crate::error::Error;

pub const USER_AGENT: &str = concat!("formrunner/", env!("CARGO_PKG_VERSION"));

/// Shared client for both the page fetch and the response POSTs.
///
/// A zero timeout is a config error.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, Error> {
    if timeout.is_zero() {
        return Err(Error::Config("HTTP timeout must be at least 1 second".to_string()));
    }

    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))
}
