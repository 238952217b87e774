//! Stage 3: mint identifiers and write them back into descriptor documents.
//!
//! For one document the workflow is:
//!
//! ```text
//! load document → build request → mint → apply → write temp file → rename
//! ```
//!
//! Nothing on disk changes until the mint has succeeded, and the write-back is
//! a single atomic rename, so a failed mint leaves the document byte-for-byte
//! as it was and a crash never leaves a half-written file.
//!
//! ## Failure classes
//!
//! | Error | Single document | Batch |
//! |---|---|---|
//! | [`UpdateError::MissingInput`] | fails | skipped, batch continues |
//! | [`UpdateError::Network`] | fails | skipped, batch continues |
//! | [`UpdateError::Rejected`] | fails | skipped, batch continues |
//! | [`UpdateError::Persistence`] | fails | **batch aborts** |
//!
//! A persistence failure happens after an identifier was consumed, so the
//! minted ARK is carried in the error and logged at error level for manual
//! recovery. Nothing is retried automatically.

use crate::config::expand_target;
use crate::document::{Document, DocumentError, write_atomic};
use crate::layout::{PackageLayout, document_stem};
use crate::mint::{self, Ark, Level, MintClient, MintError, MintRequest, Transport, TransportError};
use crate::subjects::SubjectLookup;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("missing input {path}: {reason}")]
    MissingInput { path: PathBuf, reason: String },
    #[error("network failure minting for {path}: {source}")]
    Network {
        path: PathBuf,
        #[source]
        source: TransportError,
    },
    #[error("authority rejected {path} (status {status}): {body}")]
    Rejected {
        path: PathBuf,
        status: u16,
        body: String,
    },
    #[error("minted {ark} but could not write {path}: {source}; record this ARK manually")]
    Persistence {
        path: PathBuf,
        ark: Ark,
        #[source]
        source: DocumentError,
    },
}

impl UpdateError {
    /// Persistence failures leak an identifier and must stop a batch.
    pub fn is_fatal(&self) -> bool {
        matches!(self, UpdateError::Persistence { .. })
    }

    pub fn path(&self) -> &PathBuf {
        match self {
            UpdateError::MissingInput { path, .. }
            | UpdateError::Network { path, .. }
            | UpdateError::Rejected { path, .. }
            | UpdateError::Persistence { path, .. } => path,
        }
    }

    fn from_mint(path: PathBuf, error: MintError) -> Self {
        match error {
            MintError::MissingTarget => UpdateError::MissingInput {
                path,
                reason: "no target URL".to_string(),
            },
            MintError::Network(source) => UpdateError::Network { path, source },
            MintError::Rejected { status, body } => UpdateError::Rejected { path, status, body },
        }
    }
}

/// One document to mint for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentJob {
    pub path: PathBuf,
    pub level: Level,
    /// Human-readable key kept next to the ARK (collections only).
    pub human_key: String,
    /// Key substituted into the target URL pattern.
    pub target_key: String,
}

impl DocumentJob {
    pub fn collection(layout: &PackageLayout) -> Self {
        Self {
            path: layout.collection_document(),
            level: Level::Collection,
            human_key: layout.collection_id().to_string(),
            target_key: layout.collection_id().to_lowercase(),
        }
    }

    pub fn item(layout: &PackageLayout) -> Self {
        let path = layout.item_document();
        Self {
            target_key: document_stem(&path),
            human_key: layout.collection_id().to_string(),
            level: Level::Item,
            path,
        }
    }

    pub fn page(path: PathBuf) -> Self {
        let stem = document_stem(&path);
        Self {
            path,
            level: Level::Page,
            human_key: stem.clone(),
            target_key: stem,
        }
    }

    /// Jobs for every page document in the package, in file-name order.
    pub fn pages(layout: &PackageLayout) -> Vec<Self> {
        layout.page_documents().into_iter().map(Self::page).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Minted { path: PathBuf, ark: Ark },
    /// Dry run: the request that would have been sent.
    DryRun { path: PathBuf, request: MintRequest },
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<UpdateOutcome>,
    pub failed: Vec<UpdateError>,
}

impl BatchReport {
    pub fn failed_paths(&self) -> Vec<&PathBuf> {
        self.failed.iter().map(UpdateError::path).collect()
    }

    pub fn minted(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, UpdateOutcome::Minted { .. }))
            .count()
    }
}

/// A batch stopped by a fatal error, with what it did before stopping.
#[derive(Error, Debug)]
#[error("batch aborted: {source}")]
pub struct BatchAborted {
    pub report: BatchReport,
    #[source]
    pub source: UpdateError,
}

/// Knobs for a workflow run.
#[derive(Debug, Clone)]
pub struct UpdateOptions {
    /// URL pattern containing `{key}`.
    pub target_pattern: String,
    /// Build and report requests without calling the service or writing files.
    pub dry_run: bool,
    /// Minimum pause between consecutive mint attempts.
    pub pause: Duration,
}

pub struct Workflow<'a, T: Transport> {
    client: &'a MintClient<T>,
    lookup: Option<&'a dyn SubjectLookup>,
    options: UpdateOptions,
}

impl<'a, T: Transport> Workflow<'a, T> {
    pub fn new(client: &'a MintClient<T>, options: UpdateOptions) -> Self {
        Self {
            client,
            lookup: None,
            options,
        }
    }

    /// Label subjects that have an id but no name through `lookup`.
    pub fn with_lookup(mut self, lookup: &'a dyn SubjectLookup) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Load the document and build its mint request.
    pub fn prepare(&self, job: &DocumentJob) -> Result<(Document, MintRequest), UpdateError> {
        if !job.path.is_file() {
            return Err(UpdateError::MissingInput {
                path: job.path.clone(),
                reason: "file not found".to_string(),
            });
        }
        let document = Document::load(&job.path).map_err(|e| UpdateError::MissingInput {
            path: job.path.clone(),
            reason: e.to_string(),
        })?;
        let target = expand_target(&self.options.target_pattern, &job.target_key);
        // Dry runs make no remote calls, label lookups included.
        let lookup = if self.options.dry_run { None } else { self.lookup };
        let request = MintRequest::from_document(&document, job.level, target, lookup);
        Ok((document, request))
    }

    /// Mint for one document and persist the result.
    pub fn update_one(&self, job: &DocumentJob) -> Result<UpdateOutcome, UpdateError> {
        let (document, request) = self.prepare(job)?;
        tracing::info!(
            path = %job.path.display(),
            level = %job.level,
            current = ?document.identifier(),
            "preparing mint"
        );

        if self.options.dry_run {
            return Ok(UpdateOutcome::DryRun {
                path: job.path.clone(),
                request,
            });
        }

        let ark = self
            .client
            .mint(&request)
            .map_err(|e| UpdateError::from_mint(job.path.clone(), e))?;

        let updated = mint::apply(&document, job.level, &job.human_key, &ark);
        if let Err(source) = write_atomic(&job.path, &updated) {
            tracing::error!(
                %ark,
                path = %job.path.display(),
                error = %source,
                "minted identifier could not be written back"
            );
            return Err(UpdateError::Persistence {
                path: job.path.clone(),
                ark,
                source,
            });
        }

        tracing::info!(%ark, path = %job.path.display(), "document updated");
        Ok(UpdateOutcome::Minted {
            path: job.path.clone(),
            ark,
        })
    }

    /// Process jobs in order, one at a time.
    ///
    /// Recoverable failures are collected and the batch moves on; a
    /// persistence failure aborts the batch. The error keeps the partial
    /// report so identifiers minted before the abort are not lost.
    pub fn update_many(&self, jobs: &[DocumentJob]) -> Result<BatchReport, BatchAborted> {
        let mut report = BatchReport::default();
        for (i, job) in jobs.iter().enumerate() {
            if i > 0 && !self.options.dry_run && !self.options.pause.is_zero() {
                std::thread::sleep(self.options.pause);
            }
            match self.update_one(job) {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(source) if source.is_fatal() => return Err(BatchAborted { report, source }),
                Err(e) => {
                    tracing::error!(error = %e, "skipping document");
                    report.failed.push(e);
                }
            }
        }
        Ok(report)
    }
}
