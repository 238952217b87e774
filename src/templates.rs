//! Fixed-shape JSON-LD templates for every descriptor in a package.
//!
//! All functions here are pure: metadata and archive constants in, a
//! [`Document`] (or, for labels, a JSON array) out. Writing them to disk is
//! the job of [`describe`](crate::describe) and [`scaffold`](crate::scaffold).

use crate::config::ArchiveConfig;
use crate::document::Document;
use crate::metadata::MetadataRecord;
use serde_json::{Value, json};

const XSD_GYEAR: &str = "http://www.w3.org/2001/XMLSchema#gYear";
const ARCHIVAL_GROUP: &str = "http://fedora.info/definitions/v4/repository#ArchivalGroup";

/// Fallback `schema:position` for files that do not follow `<id>_<pos>.<ext>`.
pub const DEFAULT_POSITION: &str = "0001";

/// A subject heading with its resolved display label.
///
/// `resolved` is false when the label is just the id (lookup skipped or failed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectLabel {
    pub id: String,
    pub label: String,
    pub resolved: bool,
}

/// The JSON-LD context shared by all package documents.
pub fn context() -> Value {
    json!({
        "ldp": "http://www.w3.org/ns/ldp#",
        "schema": "http://schema.org/",
        "fedora": "http://fedora.info/definitions/v4/repository#",
        "webac": "http://fedora.info/definitions/v4/webac#",
        "acl": "http://www.w3.org/ns/auth/acl#",
        "ucdlib": "http://digital.ucdavis.edu/schema#",
        "ebucore": "http://www.ebu.ch/metadata/ontologies/ebucore/ebucore#"
    })
}

fn object(value: Value) -> Document {
    Document::from_value(value).unwrap_or_default()
}

fn gyear(value: &str) -> Value {
    json!({ "@type": XSD_GYEAR, "@value": value })
}

fn about(subjects: &[SubjectLabel]) -> Value {
    subjects
        .iter()
        .map(|s| {
            if s.resolved {
                json!({ "@id": s.id, "schema:name": s.label })
            } else {
                json!({ "@id": s.id })
            }
        })
        .collect()
}

/// The collection-level descriptor (`collection/<id>.jsonld.json`).
pub fn collection_document(
    record: &MetadataRecord,
    collection_id: &str,
    subjects: &[SubjectLabel],
    archive: &ArchiveConfig,
) -> Document {
    let mut doc = object(json!({
        "@context": context(),
        "@id": "",
        "@type": ["schema:Collection", ARCHIVAL_GROUP],
        "ucdlib:hasLabel": { "@id": "@base:/labels" },
        "schema:name": record.title(),
        "schema:description": record.description(),
        "schema:creator": record.creator(),
        "schema:datePublished": gyear(record.date_range()),
        "schema:identifier": [collection_id, archive.placeholder_ark],
        "schema:image": {
            "@id": format!(
                "info:fedora/item/{}/media/images/{collection_id}_0001.tif",
                archive.placeholder_ark
            )
        },
        "schema:license": { "@id": archive.license },
        "schema:publisher": [archive.publisher, { "@id": archive.publisher_id }],
        "schema:sdDatePublished": gyear(&archive.sd_date_published),
        "schema:sdLicense": { "@id": archive.license },
        "schema:sdPublisher": archive.publisher
    }));
    if !subjects.is_empty() {
        doc.insert("schema:about", about(subjects));
    }
    doc
}

/// The item-level descriptor (`items/<id>.jsonld.json`) for the album itself.
pub fn item_document(
    record: &MetadataRecord,
    collection_id: &str,
    subjects: &[SubjectLabel],
    archive: &ArchiveConfig,
) -> Document {
    let mut doc = object(json!({
        "@context": context(),
        "@id": "",
        "@type": ["schema:CreativeWork", "schema:Book", ARCHIVAL_GROUP],
        "schema:associatedMedia": [{ "@id": "@base:/media/images" }],
        "schema:creator": record.creator(),
        "schema:datePublished": gyear(record.date_range()),
        "schema:identifier": [collection_id, archive.placeholder_ark],
        "schema:image": { "@id": format!("@base:/media/images/{collection_id}_0001.tif") },
        "schema:license": { "@id": archive.license },
        "schema:name": record.title(),
        "schema:publisher": record.creator(),
        "schema:sdDatePublished": gyear(&archive.sd_date_published),
        "schema:sdLicense": { "@id": archive.license },
        "schema:sdPublisher": archive.publisher
    }));
    if !subjects.is_empty() {
        doc.insert("schema:about", about(subjects));
    }
    doc
}

/// The label-service document: a service node followed by one label per subject.
pub fn labels_document(subjects: &[SubjectLabel]) -> Value {
    let service = json!({
        "@id": "",
        "@context": { "ucdlib": "http://digital.ucdavis.edu/schema#" },
        "@type": ["ucdlib:LabelService", "ucdlib:Service"]
    });
    let labels = subjects
        .iter()
        .map(|s| json!({ "@id": s.id, "http://schema.org/name": s.label }));
    Value::Array(std::iter::once(service).chain(labels).collect())
}

/// Page position from a file name: `MC-001_0007.tif` → `0007`.
pub fn page_position(filename: &str) -> &str {
    if !filename.contains('.') {
        return DEFAULT_POSITION;
    }
    filename
        .split('_')
        .nth(1)
        .and_then(|segment| segment.split('.').next())
        .unwrap_or(DEFAULT_POSITION)
}

/// Descriptor for one scanned page image.
pub fn page_document(filename: &str) -> Document {
    object(json!({
        "@context": context(),
        "@id": "",
        "@type": ["schema:ImageObject", "schema:MediaObject", "schema:CreativeWork"],
        "schema:position": page_position(filename),
        "ebucore:filename": filename,
        "ebucore:hasMimeType": "image/tiff"
    }))
}

/// Descriptor for a PDF rendition of the album.
pub fn pdf_document(filename: &str) -> Document {
    object(json!({
        "@context": context(),
        "@id": "",
        "@type": ["schema:ImageObject", "schema:CreativeWork", "schema:MediaObject"],
        "schema:associatedMedia": { "@id": "@base:../images" },
        "ebucore:filename": filename,
        "ebucore:hasMimeType": "application/pdf"
    }))
}

/// `items/<id>/media.jsonld.json`: links media back to the item.
pub fn media_container() -> Document {
    object(json!({
        "@context": context(),
        "@id": "",
        "@type": ["ldp:DirectContainer"],
        "ldp:hasMemberRelation": { "@id": "schema:associatedMedia" },
        "ldp:isMemberOfRelation": { "@id": "schema:encodesCreativeWork" },
        "ldp:membershipResource": { "@id": "@base:.." }
    }))
}

/// `items/<id>/media/images.jsonld.json`: the ordered page list.
pub fn image_list_container() -> Document {
    object(json!({
        "@context": context(),
        "@id": "",
        "@type": ["ucdlib:ImageList", "ldp:DirectContainer", "schema:MediaObject"],
        "schema:name": "Image List",
        "ldp:hasMemberRelation": { "@id": "schema:hasPart" },
        "ldp:isMemberOfRelation": { "@id": "schema:partOf" },
        "ldp:membershipResource": { "@id": "" }
    }))
}
