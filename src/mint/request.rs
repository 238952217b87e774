//! Mint requests: which descriptor fields go into the ANVL payload.

use super::Level;
use super::anvl::AnvlRecord;
use crate::document::Document;
use crate::subjects::{SubjectLookup, resolve_label};

/// Collection-level requests carry at most this many subject names.
pub const COLLECTION_SUBJECT_LIMIT: usize = 3;

const SUBJECT_SEPARATOR: &str = "; ";

/// Transient metadata for one mint call. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintRequest {
    /// URL the new identifier resolves to. Required.
    pub target: String,
    /// `erc.what`: the title.
    pub what: Option<String>,
    /// `erc.who`: creator or joined subject names.
    pub who: Option<String>,
    /// `erc.where`: subject names, collection level only, when `who` is the creator.
    pub where_: Option<String>,
}

impl MintRequest {
    /// Build the request for a document.
    ///
    /// Subject entries without a `schema:name` are labelled through `lookup`
    /// when one is given (falling back to the id), and skipped otherwise.
    pub fn from_document(
        doc: &Document,
        level: Level,
        target: impl Into<String>,
        lookup: Option<&dyn SubjectLookup>,
    ) -> Self {
        let creator = doc.creator().map(String::from);

        let (who, where_) = match level {
            Level::Collection => {
                let limited = join(&subject_names(doc, lookup, COLLECTION_SUBJECT_LIMIT));
                match creator {
                    Some(creator) => (Some(creator), limited),
                    None => (limited, None),
                }
            }
            Level::Item | Level::Page => {
                (join(&subject_names(doc, lookup, usize::MAX)).or(creator), None)
            }
        };

        Self {
            target: target.into(),
            what: doc.name().map(String::from),
            who,
            where_,
        }
    }

    /// The outbound payload: `_target`, `_profile`, then whichever of
    /// `erc.what`, `erc.who`, `erc.where` are present, in that order.
    pub fn to_anvl(&self) -> AnvlRecord {
        let mut record = AnvlRecord::new();
        record.push("_target", &self.target);
        record.push("_profile", "erc");
        if let Some(what) = &self.what {
            record.push("erc.what", what);
        }
        if let Some(who) = &self.who {
            record.push("erc.who", who);
        }
        if let Some(where_) = &self.where_ {
            record.push("erc.where", where_);
        }
        record
    }
}

/// Up to `limit` subject names. Lookups run lazily, so no label past the
/// limit is ever fetched.
fn subject_names(doc: &Document, lookup: Option<&dyn SubjectLookup>, limit: usize) -> Vec<String> {
    doc.subjects()
        .into_iter()
        .filter_map(|subject| match (subject.name, subject.id, lookup) {
            (Some(name), _, _) => Some(name),
            (None, Some(id), Some(lookup)) => Some(resolve_label(lookup, &id).0),
            _ => None,
        })
        .take(limit)
        .collect()
}

fn join(names: &[String]) -> Option<String> {
    if names.is_empty() {
        None
    } else {
        Some(names.join(SUBJECT_SEPARATOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{StaticLookup, document};
    use serde_json::json;

    fn twelve_subjects() -> serde_json::Value {
        (1..=12)
            .map(|i| json!({"@id": format!("fast/{i}"), "schema:name": format!("Subject {i}")}))
            .collect()
    }

    #[test]
    fn payload_lines_in_fixed_order() {
        let doc = document(json!({
            "schema:name": "Test",
            "schema:about": [{"schema:name": "History"}]
        }));
        let request = MintRequest::from_document(&doc, Level::Item, "https://t/x", None);
        assert_eq!(
            request.to_anvl().to_body(),
            "_target: https://t/x\n_profile: erc\nerc.what: Test\nerc.who: History"
        );
    }

    #[test]
    fn absent_fields_are_omitted() {
        let doc = document(json!({"schema:name": "  "}));
        let request = MintRequest::from_document(&doc, Level::Page, "https://t/x", None);
        assert_eq!(request.to_anvl().keys(), vec!["_target", "_profile"]);
    }

    #[test]
    fn collection_truncates_subjects_to_three() {
        let doc = document(json!({"schema:name": "C", "schema:about": twelve_subjects()}));
        let request = MintRequest::from_document(&doc, Level::Collection, "https://t/c", None);
        assert_eq!(
            request.who.as_deref(),
            Some("Subject 1; Subject 2; Subject 3")
        );
        assert_eq!(request.where_, None);
    }

    #[test]
    fn collection_with_creator_moves_subjects_to_where() {
        let doc = document(json!({
            "schema:name": "C",
            "schema:creator": "Jane Doe",
            "schema:about": twelve_subjects()
        }));
        let request = MintRequest::from_document(&doc, Level::Collection, "https://t/c", None);
        assert_eq!(request.who.as_deref(), Some("Jane Doe"));
        assert_eq!(
            request.where_.as_deref(),
            Some("Subject 1; Subject 2; Subject 3")
        );
        assert_eq!(
            request.to_anvl().keys(),
            vec!["_target", "_profile", "erc.what", "erc.who", "erc.where"]
        );
    }

    #[test]
    fn item_joins_all_subjects() {
        let doc = document(json!({
            "schema:creator": "Jane Doe",
            "schema:about": twelve_subjects()
        }));
        let request = MintRequest::from_document(&doc, Level::Item, "https://t/i", None);
        let who = request.who.unwrap();
        assert_eq!(who.split("; ").count(), 12);
        assert!(who.ends_with("Subject 12"));
    }

    #[test]
    fn item_falls_back_to_creator() {
        let doc = document(json!({"schema:creator": "Jane Doe"}));
        let request = MintRequest::from_document(&doc, Level::Item, "https://t/i", None);
        assert_eq!(request.who.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn unnamed_subjects_use_lookup_when_given() {
        let doc = document(json!({"schema:about": [
            {"@id": "fast/1"},
            {"@id": "fast/2"},
            {"@id": "fast/3", "schema:name": "Named"}
        ]}));
        let without = MintRequest::from_document(&doc, Level::Item, "t", None);
        assert_eq!(without.who.as_deref(), Some("Named"));

        let lookup = StaticLookup::new([("fast/1", "Agriculture")]);
        let with = MintRequest::from_document(&doc, Level::Item, "t", Some(&lookup));
        assert_eq!(with.who.as_deref(), Some("Agriculture; fast/2; Named"));
    }

    #[test]
    fn collection_looks_up_only_the_limit() {
        let unnamed: serde_json::Value = (1..=12)
            .map(|i| json!({"@id": format!("fast/{i}")}))
            .collect();
        let doc = document(json!({"schema:about": unnamed}));
        let lookup = StaticLookup::new([("fast/1", "Agriculture")]);

        let request = MintRequest::from_document(&doc, Level::Collection, "t", Some(&lookup));
        assert_eq!(request.who.as_deref(), Some("Agriculture; fast/2; fast/3"));
        assert_eq!(lookup.calls(), 3);
    }
}
