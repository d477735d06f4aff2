//! Shared HTTP client construction and bearer authorization.

use std::time::Duration;

use reqwest::Client;

use crate::error::Result;

const USER_AGENT: &str = concat!("azspeak/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client used for the trial page, voice list and synthesis calls
pub fn build(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .pool_idle_timeout(Some(Duration::from_secs(5)))
        .tcp_nodelay(true)
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// `Authorization` header value for a bearer credential
pub fn bearer(credential: &str) -> String {
    format!("Bearer {credential}")
}
