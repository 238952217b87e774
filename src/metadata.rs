//! Collection metadata from `metadata.csv`.
//!
//! The whole package is driven by a single CSV row. The header names the
//! fields; only the first data row is read, later rows are ignored.
//!
//! ## Recognized columns
//!
//! | Column | Used for |
//! |---|---|
//! | `collection_id` | Required. Directory names, file names, identifier list |
//! | `title` | `schema:name` |
//! | `description` | `schema:description` (collection only) |
//! | `creator` | `schema:creator` |
//! | `date_range` | `schema:datePublished` |
//! | `fast_id_1` .. `fast_id_12` | `schema:about` subject headings |
//!
//! Values are kept verbatim; every accessor trims surrounding whitespace so
//! spreadsheet padding never leaks into paths or documents.

use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("metadata file has a header but no data row")]
    Empty,
    #[error("required field '{0}' is missing or empty")]
    MissingField(&'static str),
}

/// Highest `fast_id_N` column consulted.
pub const MAX_SUBJECTS: usize = 12;

/// One row of collection metadata: field name → raw value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataRecord {
    fields: BTreeMap<String, String>,
}

impl MetadataRecord {
    /// Read the first data row of a CSV file.
    pub fn from_csv_path(path: &Path) -> Result<Self, MetadataError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Read the first data row from any CSV source.
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, MetadataError> {
        let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = csv_reader.headers()?.clone();
        let row = csv_reader
            .records()
            .next()
            .ok_or(MetadataError::Empty)??;

        let fields = headers
            .iter()
            .zip(row.iter())
            .map(|(k, v)| (k.trim().to_string(), v.to_string()))
            .collect();
        Ok(Self { fields })
    }

    /// Build a record from explicit pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Trimmed value of a field, or `""` when the column is absent.
    pub fn get(&self, field: &str) -> &str {
        self.fields.get(field).map(|v| v.trim()).unwrap_or("")
    }

    /// The collection identifier. Required by every stage.
    pub fn collection_id(&self) -> Result<&str, MetadataError> {
        match self.get("collection_id") {
            "" => Err(MetadataError::MissingField("collection_id")),
            id => Ok(id),
        }
    }

    pub fn title(&self) -> &str {
        self.get("title")
    }

    pub fn description(&self) -> &str {
        self.get("description")
    }

    pub fn creator(&self) -> &str {
        self.get("creator")
    }

    pub fn date_range(&self) -> &str {
        self.get("date_range")
    }

    /// Subject-authority ids from `fast_id_1` through `fast_id_12`, in
    /// column order, skipping empty cells.
    pub fn subject_ids(&self) -> Vec<String> {
        (1..=MAX_SUBJECTS)
            .map(|i| self.get(&format!("fast_id_{i}")))
            .filter(|id| !id.is_empty())
            .map(String::from)
            .collect()
    }
}
