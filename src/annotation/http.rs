use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::time::Duration;
use tracing::trace;

use crate::error::LookupError;

/// Blocking client with a per-request timeout
pub fn build_client(timeout: Duration) -> Result<Client, LookupError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| LookupError::Transport(format!("Failed to create HTTP client: {}", e)))
}

/// GET `url` and decode the body as JSON. Non-2xx statuses are errors.
pub fn get_json(client: &Client, url: &str) -> Result<Value, LookupError> {
    trace!("GET {}", url);
    let response = client.get(url).header(ACCEPT, "application/json").send()?;

    let status = response.status();
    if !status.is_success() {
        return Err(LookupError::Status(status.as_u16()));
    }

    let body = response.text()?;
    Ok(serde_json::from_str(&body)?)
}
