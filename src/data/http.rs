//! Blocking HTTP transport and the categorized fetch errors.
//!
//! The `Transport` trait is the seam between the fetch pipeline and the network,
//! so tests can substitute canned responses.

use std::time::Duration;

use reqwest::blocking::Client;
use thiserror::Error;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("sa-indicators/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error {status} from {url}")]
    Http { status: u16, url: String },

    #[error("connection error: {0}")]
    Connection(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("unexpected response format: {0}")]
    UnexpectedFormat(String),

    #[error("missing API key: set {var} in the environment (.env)")]
    MissingApiKey { var: String },

    #[error("failed to write '{path}': {message}")]
    Io { path: String, message: String },

    #[error("request failed: {0}")]
    Other(String),
}

impl FetchError {
    /// Short category label for summaries.
    pub fn category(&self) -> &'static str {
        match self {
            FetchError::Http { .. } => "http",
            FetchError::Connection(_) => "connection",
            FetchError::Timeout(_) => "timeout",
            FetchError::MalformedResponse(_) => "malformed",
            FetchError::UnexpectedFormat(_) => "format",
            FetchError::MissingApiKey { .. } => "config",
            FetchError::Io { .. } => "io",
            FetchError::Other(_) => "other",
        }
    }
}

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A single blocking GET.
pub trait Transport {
    fn get(&self, url: &str) -> Result<HttpResponse, FetchError>;
}

/// `reqwest::blocking` transport with a fixed timeout.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Other(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        let resp = self.client.get(url).send().map_err(classify)?;
        let status = resp.status().as_u16();
        let body = resp.text().map_err(classify)?;
        Ok(HttpResponse { status, body })
    }
}

fn classify(err: reqwest::Error) -> FetchError {
    let (timeout, connect, body) = (err.is_timeout(), err.is_connect(), err.is_decode() || err.is_body());
    // reqwest embeds the full URL (including the API key) in its messages.
    let message = err.without_url().to_string();
    if timeout {
        FetchError::Timeout(message)
    } else if connect {
        FetchError::Connection(message)
    } else if body {
        FetchError::MalformedResponse(message)
    } else {
        FetchError::Other(message)
    }
}
