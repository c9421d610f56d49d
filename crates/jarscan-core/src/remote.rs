//! Remote locations: opening a forward-only byte stream over HTTP.

use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::{Client, Response};

use crate::config::ScanConfig;
use crate::error::ScanError;

fn client(config: &ScanConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(config.connect_timeout())
        // Archives can be large; only the connect phase is bounded.
        .timeout(None::<Duration>)
        .build()
}

/// Connect to `url` and return the response body as a stream.
///
/// Non-success status codes are reported as errors before any byte is read.
pub(crate) fn open(url: &Url, config: &ScanConfig) -> Result<Response, ScanError> {
    let to_error = |source| ScanError::Remote {
        location: url.to_string(),
        source,
    };
    let response = client(config)
        .and_then(|c| c.get(url.clone()).send())
        .and_then(Response::error_for_status)
        .map_err(to_error)?;
    tracing::debug!(
        "Connected to {url} ({} bytes announced)",
        response
            .content_length()
            .map_or_else(|| "unknown".to_string(), |n| n.to_string())
    );
    Ok(response)
}

/// Best-effort reachability check: can a connection be established at all?
pub(crate) fn probe(url: &Url, config: &ScanConfig) -> bool {
    match client(config).and_then(|c| c.head(url.clone()).send()) {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!("Probe of {url} failed: {e}");
            false
        }
    }
}
