//! The network seam of the mint client.
//!
//! [`Transport`] is the one operation the client needs from HTTP: an
//! authenticated plain-text POST. [`HttpTransport`] is the production
//! implementation (blocking reqwest with an explicit timeout); tests swap in
//! a recording stub so no test ever consumes a real identifier.

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request to {0} timed out")]
    Timeout(String),
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait Transport {
    /// POST a UTF-8 plain-text `body` to `url` with the given `Authorization`
    /// header value. Any completed exchange is `Ok`, whatever its status.
    fn post_text(
        &self,
        url: &str,
        authorization: &str,
        body: &str,
    ) -> Result<TransportResponse, TransportError>;
}

/// Blocking reqwest transport.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = client_builder(timeout).build()?;
        Ok(Self { client })
    }
}

fn client_builder(timeout: Duration) -> reqwest::blocking::ClientBuilder {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
}

impl Transport for HttpTransport {
    fn post_text(
        &self,
        url: &str,
        authorization: &str,
        body: &str,
    ) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "text/plain; charset=UTF-8")
            .header(ACCEPT, "text/plain")
            .header(AUTHORIZATION, authorization)
            .body(body.to_string())
            .send()
            .map_err(|e| classify(url, e))?;
        let status = response.status().as_u16();
        let body = response.text().map_err(|e| classify(url, e))?;
        Ok(TransportResponse { status, body })
    }
}

fn classify(url: &str, error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(url.to_string())
    } else if error.is_connect() {
        TransportError::Connection(error.to_string())
    } else {
        TransportError::Http(error)
    }
}
