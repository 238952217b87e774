//! Persistent identifier (ARK) minting.
//!
//! The module is split into:
//! - **ANVL**: the `key: value` line format of the minting protocol
//! - **Request**: which descriptor fields go into a mint request
//! - **Transport**: [`Transport`] trait + blocking [`HttpTransport`]
//! - **Client**: [`MintClient`], response parsing, credentials
//!
//! [`apply`] is the pure half of the write-back: it puts a new identifier
//! into a document. Loading, minting and persisting in the right order is the
//! job of [`update`](crate::update).

pub mod anvl;
pub mod client;
pub mod request;
pub mod transport;

pub use client::{Credentials, MintClient, MintEndpoint, MintError, parse_response};
pub use request::MintRequest;
pub use transport::{HttpTransport, Transport, TransportError, TransportResponse};

use crate::document::Document;
use std::fmt;

/// Which kind of descriptor an identifier is minted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Collection,
    Item,
    Page,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Collection => "collection",
            Level::Item => "item",
            Level::Page => "page",
        })
    }
}

/// A minted Archival Resource Key, e.g. `ark:/87293/d3abc123`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ark(String);

impl Ark {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Put `ark` into the document's identifier list.
///
/// Collections keep their human-readable key: `[key, ark]`. Items and pages
/// get the ARK alone: `[ark]`. Every other predicate is left as it was.
pub fn apply(document: &Document, level: Level, human_key: &str, ark: &Ark) -> Document {
    match level {
        Level::Collection => document.with_identifier([human_key, ark.as_str()]),
        Level::Item | Level::Page => document.with_identifier([ark.as_str()]),
    }
}
