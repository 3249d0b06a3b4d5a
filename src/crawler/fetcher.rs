//! Plain HTTP fetching
//!
//! First stage of the dual fetch strategy: a lightweight GET through a
//! shared client. The strategy selector decides afterwards whether the
//! response is good enough or the page needs a rendered fetch.

use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Connect timeout for every request
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Read timeout for the first attempt
const READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Read timeout for the single retry after a timeout
const RETRY_READ_TIMEOUT: Duration = Duration::from_secs(60);

/// A plain HTTP response, body included only for HTML content
#[derive(Debug, Clone)]
pub struct PlainResponse {
    pub status: u16,
    pub content_type: String,
    pub body: String,
}

/// Classified plain-fetch failure
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Builds the shared HTTP client used for page fetches and link checks
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(READ_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .gzip(true)
        .brotli(true)
        .danger_accept_invalid_certs(true)
        .build()
}

/// Fetches a page over plain HTTP
///
/// Redirects are followed by the client. A read timeout gets exactly one
/// retry with a longer per-request timeout before the failure is reported.
/// Non-HTML responses return with an empty body; the status and
/// content-type still matter to the strategy selector.
pub async fn fetch_page(client: &Client, url: &str) -> Result<PlainResponse, FetchError> {
    match send(client, url, READ_TIMEOUT).await {
        Ok(response) => Ok(response),
        Err(FetchError::Timeout) => {
            tracing::debug!("Read timeout for {}, retrying with longer timeout", url);
            send(client, url, RETRY_READ_TIMEOUT).await
        }
        Err(e) => Err(e),
    }
}

async fn send(client: &Client, url: &str, timeout: Duration) -> Result<PlainResponse, FetchError> {
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(classify_error)?;

    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let body = if content_type.to_lowercase().contains("text/html") || content_type.is_empty() {
        response.text().await.map_err(classify_error)?
    } else {
        // Non-HTML resources are not worth downloading
        String::new()
    };

    Ok(PlainResponse {
        status,
        content_type,
        body,
    })
}

fn classify_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else if error.is_connect() {
        FetchError::Connect(error.to_string())
    } else {
        FetchError::Transport(error.to_string())
    }
}
