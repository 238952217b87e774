//! Stage 2: write the descriptor documents for a scaffolded package.
//!
//! Produces, from the metadata row and the media already in place:
//!
//! - the collection descriptor and its label service
//! - the item descriptor
//! - one page descriptor per TIFF in the images directory
//! - one descriptor per PDF in the media directory
//!
//! Subject labels are resolved once per subject id. With no lookup (or when a
//! lookup fails) the id doubles as its label.
//!
//! Re-running over a package that was already minted keeps each document's
//! existing `schema:identifier` when it differs from the template's, and
//! reports it as a warning: those identifiers are consumed and their only
//! record is the document.

use crate::config::ArchiveConfig;
use crate::document::{Document, DocumentError, IDENTIFIER, write_atomic};
use crate::layout::{PackageLayout, document_path_for, files_with_extension};
use crate::metadata::MetadataRecord;
use crate::subjects::{SubjectLookup, resolve_label};
use crate::templates::{self, SubjectLabel};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DescribeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),
}

#[derive(Debug, Default)]
pub struct DescribeReport {
    pub collection: PathBuf,
    pub labels: PathBuf,
    pub item: PathBuf,
    pub pages: Vec<PathBuf>,
    pub pdfs: Vec<PathBuf>,
    pub subjects: Vec<SubjectLabel>,
    pub warnings: Vec<String>,
}

/// Resolve display labels for the record's subject ids.
pub fn subject_labels(
    record: &MetadataRecord,
    lookup: Option<&dyn SubjectLookup>,
) -> Vec<SubjectLabel> {
    record
        .subject_ids()
        .into_iter()
        .map(|id| match lookup {
            Some(lookup) => {
                let (label, resolved) = resolve_label(lookup, &id);
                SubjectLabel { id, label, resolved }
            }
            None => SubjectLabel {
                label: id.clone(),
                id,
                resolved: false,
            },
        })
        .collect()
}

pub fn describe(
    layout: &PackageLayout,
    record: &MetadataRecord,
    archive: &ArchiveConfig,
    lookup: Option<&dyn SubjectLookup>,
) -> Result<DescribeReport, DescribeError> {
    let id = layout.collection_id();
    let subjects = subject_labels(record, lookup);
    let mut report = DescribeReport::default();

    fs::create_dir_all(layout.collection_dir())?;
    let collection = layout.collection_document();
    report.write_document(
        &collection,
        templates::collection_document(record, id, &subjects, archive),
    )?;
    report.collection = collection;

    report.labels = layout.labels_document();
    write_atomic(&report.labels, &templates::labels_document(&subjects))?;

    fs::create_dir_all(layout.item_dir())?;
    let item = layout.item_document();
    report.write_document(&item, templates::item_document(record, id, &subjects, archive))?;
    report.item = item;

    let images_dir = layout.images_dir();
    if images_dir.is_dir() {
        let tiffs = files_with_extension(&images_dir, "tif");
        if tiffs.is_empty() {
            report.warn(format!("no TIFF files found in {}", images_dir.display()));
        }
        for tiff in tiffs {
            let path = document_path_for(&tiff);
            report.write_document(&path, templates::page_document(&file_name(&tiff)))?;
            report.pages.push(path);
        }
    } else {
        report.warn(format!("images directory {} not found", images_dir.display()));
    }

    for pdf in files_with_extension(&layout.media_dir(), "pdf") {
        let path = document_path_for(&pdf);
        report.write_document(&path, templates::pdf_document(&file_name(&pdf)))?;
        report.pdfs.push(path);
    }

    tracing::info!(
        collection = id,
        pages = report.pages.len(),
        pdfs = report.pdfs.len(),
        subjects = subjects.len(),
        "descriptor documents written"
    );
    report.subjects = subjects;
    Ok(report)
}

impl DescribeReport {
    fn warn(&mut self, warning: String) {
        tracing::warn!("{warning}");
        self.warnings.push(warning);
    }

    /// Write a freshly templated document, carrying over an identifier list
    /// that differs from the template's.
    fn write_document(&mut self, path: &Path, mut doc: Document) -> Result<(), DescribeError> {
        if let Ok(existing) = Document::load(path) {
            if let Some(minted) = existing.identifier() {
                if doc.identifier() != Some(minted) {
                    self.warn(format!(
                        "kept existing identifier {minted} in {}",
                        path.display()
                    ));
                    doc.insert(IDENTIFIER, minted.clone());
                }
            }
        }
        write_atomic(path, &doc)?;
        Ok(())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
