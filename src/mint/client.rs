//! The identifier-minting client.
//!
//! One [`MintClient::mint`] call is one POST to `{base}/shoulder/{shoulder}`.
//! Every successful call permanently consumes an identifier from the shoulder,
//! so the client never retries: a failure is returned to the caller, and a
//! success must be persisted by the caller before anything else happens.

use super::request::MintRequest;
use super::transport::{Transport, TransportError};
use super::Ark;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt;
use thiserror::Error;

/// Response prefix that marks a successful mint.
pub const SUCCESS_MARKER: &str = "success:";

#[derive(Error, Debug)]
pub enum MintError {
    #[error("mint request has no target URL")]
    MissingTarget,
    #[error("network failure: {0}")]
    Network(#[from] TransportError),
    #[error("authority rejected the request (status {status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Basic-auth credentials for the minting service.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// `Basic <base64(username:password)>`
    pub fn authorization(&self) -> String {
        let token = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {token}")
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Where and as whom to mint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintEndpoint {
    pub base_url: String,
    pub shoulder: String,
    pub credentials: Credentials,
}

impl MintEndpoint {
    pub fn shoulder_url(&self) -> String {
        format!("{}/shoulder/{}", self.base_url, self.shoulder)
    }
}

pub struct MintClient<T: Transport> {
    endpoint: MintEndpoint,
    transport: T,
}

impl<T: Transport> MintClient<T> {
    pub fn new(endpoint: MintEndpoint, transport: T) -> Self {
        Self {
            endpoint,
            transport,
        }
    }

    pub fn endpoint(&self) -> &MintEndpoint {
        &self.endpoint
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mint one identifier for `request`.
    ///
    /// Not retryable: calling again after a success that was not persisted
    /// leaks an identifier.
    pub fn mint(&self, request: &MintRequest) -> Result<Ark, MintError> {
        if request.target.trim().is_empty() {
            return Err(MintError::MissingTarget);
        }
        let url = self.endpoint.shoulder_url();
        let payload = request.to_anvl();
        tracing::debug!(%url, payload = %payload.to_body(), "minting identifier");

        let response = self.transport.post_text(
            &url,
            &self.endpoint.credentials.authorization(),
            &payload.to_body(),
        )?;
        let result = parse_response(response.status, &response.body);
        match &result {
            Ok(ark) => tracing::info!(%ark, target = %request.target, "minted identifier"),
            Err(e) => tracing::warn!(error = %e, target = %request.target, "mint rejected"),
        }
        result
    }
}

/// Interpret a minting service response.
///
/// Success requires a 2xx status and a body starting with `success:`; the
/// identifier is the remainder, trimmed. Anything else is a rejection that
/// carries the raw body.
pub fn parse_response(status: u16, body: &str) -> Result<Ark, MintError> {
    let rejected = || MintError::Rejected {
        status,
        body: body.to_string(),
    };
    if !(200..300).contains(&status) {
        return Err(rejected());
    }
    let rest = body.strip_prefix(SUCCESS_MARKER).ok_or_else(rejected)?;
    let id = rest.trim();
    if id.is_empty() {
        return Err(rejected());
    }
    Ok(Ark::new(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mint::anvl::AnvlRecord;
    use crate::test_helpers::{StubTransport, endpoint};

    fn request() -> MintRequest {
        MintRequest {
            target: "https://digital.example.edu/collection/mc-001".into(),
            what: Some("Family Album".into()),
            who: Some("Jane Doe".into()),
            where_: None,
        }
    }

    #[test]
    fn parse_success_trims_identifier() {
        let ark = parse_response(201, "success: ark:/87293/d3abc123").unwrap();
        assert_eq!(ark.as_str(), "ark:/87293/d3abc123");

        let ark = parse_response(200, "success:ark:/87293/d3abc123  \n").unwrap();
        assert_eq!(ark.as_str(), "ark:/87293/d3abc123");
    }

    #[test]
    fn parse_keeps_whole_trimmed_remainder() {
        let ark = parse_response(201, "success: ark:/87293/d3abc123 | ark:/87293/d3abc123x\n").unwrap();
        assert_eq!(ark.as_str(), "ark:/87293/d3abc123 | ark:/87293/d3abc123x");
    }

    #[test]
    fn parse_error_body_is_rejection() {
        let err = parse_response(200, "error: bad request").unwrap_err();
        assert!(matches!(
            err,
            MintError::Rejected { status: 200, ref body } if body == "error: bad request"
        ));
    }

    #[test]
    fn parse_non_2xx_is_rejection_even_with_marker() {
        let err = parse_response(400, "success: ark:/1/2").unwrap_err();
        assert!(matches!(err, MintError::Rejected { status: 400, .. }));
    }

    #[test]
    fn parse_empty_identifier_is_rejection() {
        assert!(parse_response(201, "success:   ").is_err());
    }

    #[test]
    fn authorization_is_basic_base64() {
        let creds = Credentials::new("user", "pass");
        assert_eq!(creds.authorization(), "Basic dXNlcjpwYXNz");
    }

    #[test]
    fn debug_redacts_password() {
        let creds = Credentials::new("user", "hunter2");
        let shown = format!("{creds:?}");
        assert!(shown.contains("user"));
        assert!(!shown.contains("hunter2"));
    }

    #[test]
    fn mint_posts_once_to_shoulder_url() {
        let client = MintClient::new(
            endpoint(),
            StubTransport::always(201, "success: ark:/87293/d3abc123"),
        );
        let ark = client.mint(&request()).unwrap();
        assert_eq!(ark.as_str(), "ark:/87293/d3abc123");

        let calls = client.transport().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].url, "https://ezid.example.org/shoulder/ark:/99999/fk4");
        assert_eq!(calls[0].authorization, "Basic dXNlcjpwYXNz");
        let payload = AnvlRecord::parse(&calls[0].body);
        assert_eq!(
            payload.keys(),
            vec!["_target", "_profile", "erc.what", "erc.who"]
        );
        assert_eq!(payload.get("_profile"), Some("erc"));
    }

    #[test]
    fn mint_without_target_makes_no_call() {
        let client = MintClient::new(endpoint(), StubTransport::always(201, "success: x"));
        let mut req = request();
        req.target = "  ".into();
        assert!(matches!(client.mint(&req), Err(MintError::MissingTarget)));
        assert!(client.transport().calls().is_empty());
    }

    #[test]
    fn mint_surfaces_network_failure() {
        let client = MintClient::new(endpoint(), StubTransport::failing("connection reset"));
        let err = client.mint(&request()).unwrap_err();
        assert!(matches!(err, MintError::Network(TransportError::Connection(_))));
    }

    #[test]
    fn mint_surfaces_rejection_body() {
        let client = MintClient::new(endpoint(), StubTransport::always(400, "error: bad request"));
        let err = client.mint(&request()).unwrap_err();
        assert!(err.to_string().contains("error: bad request"));
    }
}
