//! Shared test utilities for the album-ark test suite.
//!
//! Provides a recording [`StubTransport`] so mint tests never reach a real
//! minting service, a [`StaticLookup`] for subject labels, and fixture
//! builders for metadata, configuration and documents.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let client = MintClient::new(endpoint(), StubTransport::always(201, "success: ark:/99999/fk4x"));
//! let ark = client.mint(&request).unwrap();
//! assert_eq!(client.transport().calls().len(), 1);
//! ```

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Mutex;

use crate::config::ArchiveConfig;
use crate::document::Document;
use crate::metadata::MetadataRecord;
use crate::mint::{Credentials, MintEndpoint, Transport, TransportError, TransportResponse};
use crate::subjects::{LookupError, SubjectLookup};

// =========================================================================
// Transport stub
// =========================================================================

/// A POST the stub received.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPost {
    pub url: String,
    pub authorization: String,
    pub body: String,
}

/// Scripted reply: `Ok((status, body))` or `Err(connection error message)`.
pub type ScriptedReply = Result<(u16, &'static str), &'static str>;

/// Transport that records every call and replays scripted responses.
///
/// Uses Mutex (not RefCell) to match the `&self` receiver of [`Transport`].
#[derive(Default)]
pub struct StubTransport {
    script: Mutex<VecDeque<ScriptedReply>>,
    fallback: Option<ScriptedReply>,
    calls: Mutex<Vec<RecordedPost>>,
}

impl StubTransport {
    /// Answer every call with the same status and body.
    pub fn always(status: u16, body: &'static str) -> Self {
        Self {
            fallback: Some(Ok((status, body))),
            ..Self::default()
        }
    }

    /// Fail every call at the connection level.
    pub fn failing(message: &'static str) -> Self {
        Self {
            fallback: Some(Err(message)),
            ..Self::default()
        }
    }

    /// Answer calls with `replies` in order; calls beyond the script fail.
    pub fn scripted(replies: Vec<ScriptedReply>) -> Self {
        Self {
            script: Mutex::new(replies.into()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<RecordedPost> {
        self.calls.lock().unwrap().clone()
    }
}

impl Transport for StubTransport {
    fn post_text(
        &self,
        url: &str,
        authorization: &str,
        body: &str,
    ) -> Result<TransportResponse, TransportError> {
        self.calls.lock().unwrap().push(RecordedPost {
            url: url.to_string(),
            authorization: authorization.to_string(),
            body: body.to_string(),
        });
        let reply = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .or(self.fallback)
            .unwrap_or(Err("stub script exhausted"));
        match reply {
            Ok((status, body)) => Ok(TransportResponse::new(status, body)),
            Err(message) => Err(TransportError::Connection(message.to_string())),
        }
    }
}

// =========================================================================
// Subject lookup stub
// =========================================================================

/// Lookup backed by a fixed id → label map. Unknown ids fail.
/// Every call is counted, hits and misses alike.
pub struct StaticLookup {
    labels: HashMap<String, String>,
    calls: Mutex<usize>,
}

impl StaticLookup {
    pub fn new<const N: usize>(pairs: [(&str, &str); N]) -> Self {
        Self {
            labels: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl SubjectLookup for StaticLookup {
    fn label(&self, subject_id: &str) -> Result<String, LookupError> {
        *self.calls.lock().unwrap() += 1;
        self.labels
            .get(subject_id)
            .cloned()
            .ok_or_else(|| LookupError::NoLabel(subject_id.to_string()))
    }
}

// =========================================================================
// Fixtures
// =========================================================================

/// Endpoint with credentials `user:pass` (`Basic dXNlcjpwYXNz`).
pub fn endpoint() -> MintEndpoint {
    MintEndpoint {
        base_url: "https://ezid.example.org".to_string(),
        shoulder: "ark:/99999/fk4".to_string(),
        credentials: Credentials::new("user", "pass"),
    }
}

pub fn archive_config() -> ArchiveConfig {
    ArchiveConfig {
        publisher: "Test Library, Special Collections".to_string(),
        publisher_id: "http://id.loc.gov/authorities/names/n00000000".to_string(),
        license: "http://rightsstatements.org/vocab/InC-NC/1.0/".to_string(),
        sd_date_published: "2025".to_string(),
        placeholder_ark: "ark:/99999/fk4placeholder".to_string(),
    }
}

/// Metadata row for collection `MC-001` with two subject ids.
pub fn sample_record() -> MetadataRecord {
    MetadataRecord::from_pairs([
        ("collection_id", "MC-001"),
        ("title", "Family Album"),
        ("description", "Photographs of a farming family"),
        ("creator", "Jane Doe"),
        ("date_range", "1920-1935"),
        ("fast_id_1", "http://id.worldcat.org/fast/1"),
        ("fast_id_2", "http://id.worldcat.org/fast/2"),
    ])
}

/// Wrap a JSON object literal. Panics on non-objects.
pub fn document(value: serde_json::Value) -> Document {
    Document::from_value(value).expect("test document must be a JSON object")
}

/// Write a JSON value as pretty-printed text.
pub fn write_json(path: &Path, value: &serde_json::Value) {
    std::fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}
