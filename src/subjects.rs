//! Subject-heading label lookup.
//!
//! Subjects are stored as authority URIs (`http://id.worldcat.org/fast/1204155`).
//! Human-readable labels are optional enrichment: [`describe`](crate::describe)
//! writes them into the label service, and the mint workflow uses them for
//! `erc.who` when a document carries ids but no names.
//!
//! Lookup never decides correctness. [`resolve_label`] falls back to the id
//! itself on any failure, so an offline run produces the same documents with
//! less readable labels.

use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("lookup returned status {0}")]
    Status(u16),
    #[error("no label field in response for {0}")]
    NoLabel(String),
    #[error("cannot derive a lookup key from {0}")]
    BadId(String),
}

/// A source of display labels for subject-authority ids.
pub trait SubjectLookup {
    fn label(&self, subject_id: &str) -> Result<String, LookupError>;
}

/// Label lookup against the FAST JSON service.
pub struct FastLookup {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl FastLookup {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LookupError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// `{base}/{number}.json`, where `number` is the id's last path segment.
    pub fn url_for(&self, subject_id: &str) -> Result<String, LookupError> {
        let number = subject_id
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| LookupError::BadId(subject_id.to_string()))?;
        Ok(format!("{}/{number}.json", self.base_url))
    }
}

impl SubjectLookup for FastLookup {
    fn label(&self, subject_id: &str) -> Result<String, LookupError> {
        let url = self.url_for(subject_id)?;
        tracing::debug!(%url, "looking up subject label");
        let response = self.client.get(&url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }
        let body: Value = response.json()?;
        label_from_response(&body).ok_or_else(|| LookupError::NoLabel(subject_id.to_string()))
    }
}

/// First non-blank string among `preferredLabel`, `label`, `name`.
pub fn label_from_response(body: &Value) -> Option<String> {
    ["preferredLabel", "label", "name"]
        .iter()
        .filter_map(|key| body.get(key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(String::from)
}

/// Resolve a label, falling back to the id on any failure.
///
/// Returns the label and whether it came from the lookup.
pub fn resolve_label(lookup: &dyn SubjectLookup, subject_id: &str) -> (String, bool) {
    match lookup.label(subject_id) {
        Ok(label) => (label, true),
        Err(e) => {
            tracing::warn!(subject = subject_id, error = %e, "subject label lookup failed, using id");
            (subject_id.to_string(), false)
        }
    }
}
