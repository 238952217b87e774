//! Stage 1: build the package directory tree.
//!
//! Creates the collection and item directories, copies page scans (`*.tif`)
//! and PDF renditions out of the source folder, and writes the two container
//! documents that link media to the item. Source files are copied, never
//! moved, so the source folder stays usable for a re-run.
//!
//! A missing source folder, or one without TIFFs or PDFs, is reported as a
//! warning: the tree and containers are still created so `describe` can run.

use crate::document::{DocumentError, write_atomic};
use crate::layout::{PackageLayout, files_with_extension};
use crate::templates;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScaffoldError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),
}

/// What the scaffold stage did, for CLI output.
#[derive(Debug, Default)]
pub struct ScaffoldReport {
    pub directories: Vec<PathBuf>,
    pub images: Vec<PathBuf>,
    pub pdfs: Vec<PathBuf>,
    pub documents: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

pub fn scaffold(layout: &PackageLayout, source_dir: &Path) -> Result<ScaffoldReport, ScaffoldError> {
    let mut report = ScaffoldReport::default();

    for dir in [layout.collection_dir(), layout.images_dir()] {
        fs::create_dir_all(&dir)?;
        tracing::debug!(dir = %dir.display(), "created directory");
        report.directories.push(dir);
    }

    copy_media(layout, source_dir, &mut report)?;

    for (path, doc) in [
        (layout.media_container(), templates::media_container()),
        (layout.image_list_container(), templates::image_list_container()),
    ] {
        write_atomic(&path, &doc)?;
        report.documents.push(path);
    }

    tracing::info!(
        collection = layout.collection_id(),
        images = report.images.len(),
        pdfs = report.pdfs.len(),
        "scaffold complete"
    );
    Ok(report)
}

fn copy_media(
    layout: &PackageLayout,
    source_dir: &Path,
    report: &mut ScaffoldReport,
) -> Result<(), ScaffoldError> {
    if !source_dir.is_dir() {
        let warning = format!("source directory {} not found", source_dir.display());
        tracing::warn!("{warning}");
        report.warnings.push(warning);
        return Ok(());
    }

    let tiffs = files_with_extension(source_dir, "tif");
    let pdfs = files_with_extension(source_dir, "pdf");
    if tiffs.is_empty() && pdfs.is_empty() {
        let warning = format!("no TIFF or PDF files found in {}", source_dir.display());
        tracing::warn!("{warning}");
        report.warnings.push(warning);
        return Ok(());
    }

    let images_dir = layout.images_dir();
    for tiff in tiffs {
        report.images.push(copy_into(&tiff, &images_dir)?);
    }
    let media_dir = layout.media_dir();
    for pdf in pdfs {
        report.pdfs.push(copy_into(&pdf, &media_dir)?);
    }
    Ok(())
}

fn copy_into(file: &Path, dir: &Path) -> Result<PathBuf, ScaffoldError> {
    let target = match file.file_name() {
        Some(name) => dir.join(name),
        None => dir.to_path_buf(),
    };
    fs::copy(file, &target).map_err(|source| ScaffoldError::Copy {
        from: file.to_path_buf(),
        to: target.clone(),
        source,
    })?;
    tracing::debug!(from = %file.display(), to = %target.display(), "copied media");
    Ok(target)
}
