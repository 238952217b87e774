//! # Album Ark
//!
//! Packages a digitized photo album for a digital-collections repository and
//! mints persistent identifiers (ARKs) for its descriptor documents.
//!
//! # Architecture: Three-Stage Pipeline
//!
//! ```text
//! 1. Scaffold   source/ + metadata.csv  →  package directories, media, containers
//! 2. Describe   metadata.csv + media    →  JSON-LD descriptors (placeholder ARKs)
//! 3. Mint       descriptors             →  descriptors carrying real ARKs
//! ```
//!
//! Stages communicate only through the files in the package, so each can be
//! re-run on its own and every intermediate state is inspectable JSON.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`metadata`] | Reads the collection's metadata row from CSV |
//! | [`layout`] | Where every file of a package lives |
//! | [`scaffold`] | Stage 1: directories, media copies, container documents |
//! | [`templates`] | Pure JSON-LD builders for every descriptor kind |
//! | [`subjects`] | Subject-heading label lookup (FAST) |
//! | [`describe`] | Stage 2: writes descriptors from metadata and media |
//! | [`document`] | Loading descriptors and writing them atomically |
//! | [`mint`] | ARK minting: ANVL, requests, transport, client, write-back |
//! | [`update`] | Stage 3: load → mint → apply → persist, single and batch |
//! | [`config`] | Layered config (env over `album-ark.toml` over defaults) |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Minting Is Not Idempotent
//!
//! Every successful mint permanently consumes an identifier. The client never
//! retries, dry runs never contact the service, and a freshly minted ARK is
//! written back with a temp-file-and-rename before anything else happens. If
//! that write fails the ARK is reported so it can be recorded by hand.
//!
//! ## Transport Behind a Trait
//!
//! [`mint::Transport`] is the only place HTTP happens during minting. The CLI
//! uses [`mint::HttpTransport`]; tests use a recording stub, so the whole mint
//! workflow is exercised without network access.
//!
//! ## Key Order Is Preserved
//!
//! Descriptors are edited in place by curators. Documents keep their key order
//! on load and save (`serde_json` with `preserve_order`) so a mint changes only
//! the identifier lines in a diff.

pub mod config;
pub mod describe;
pub mod document;
pub mod layout;
pub mod metadata;
pub mod mint;
pub mod output;
pub mod scaffold;
pub mod subjects;
pub mod templates;
pub mod update;

#[cfg(test)]
pub(crate) mod test_helpers;
