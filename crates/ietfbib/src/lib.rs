//! Bibliographic metadata resolver for IETF documents.
//!
//! `ietfbib` resolves free-text citations of IETF documents (RFCs,
//! Internet-Drafts, and the BCP/FYI/STD sub-series) into normalized
//! bibliographic records, and renders those records as bibdata XML, YAML, or
//! BibXML for downstream citation tooling.
//!
//! # Pipeline
//!
//! A lookup flows through a fixed sequence of stages:
//!
//! 1. [`reference`]: classify the citation text into a document family and a
//!    canonical token (`"RFC 8341"` → family `Rfc`, token `8341`).
//! 2. [`index`]: resolve the canonical lookup key against a versioned,
//!    locally cached index snapshot to find the document's data file.
//! 3. [`client`]: fetch the data file over HTTP.
//! 4. [`bibxml`] / [`rfc_index`] / YAML: extract the bytes into an
//!    [`item::IetfBibliographicItem`], whichever format the corpus serves.
//! 5. [`render`]: serialize the record back out in the requested format.
//!
//! # Getting started
//!
//! ```no_run
//! use ietfbib::bibliography::IetfBibliography;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!   let bib = IetfBibliography::with_defaults();
//!
//!   // Resolve a citation. Unrecognized or unregistered references resolve
//!   // to `None`, never to an error.
//!   if let Some(item) = bib.get("RFC 8341").await? {
//!     println!("{}", item.to_yaml()?);
//!   }
//!   Ok(())
//! }
//! ```
//!
//! # Module organization
//!
//! - [`reference`]: citation-text normalization into canonical references
//! - [`index`]: remote index snapshots, local caching, key lookup
//! - [`client`]: the page-fetcher boundary and its HTTP implementation
//! - [`item`]: the bibliographic record and its IETF extension block
//! - [`names`]: person-name and organization-name heuristics
//! - [`bibxml`], [`rfc_index`]: format-specific extractors
//! - [`render`]: XML / YAML / BibXML serializers
//! - [`bibliography`]: the high-level resolution API
//! - [`data_fetcher`]: batch corpus export
//!
//! # Design notes
//!
//! The index cache and the page fetcher are injected into the resolver at
//! construction time, so tests substitute stub fetchers without any global
//! state. Extraction and rendering are pure functions over one record; the
//! only suspension points are network fetches.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::{
  collections::HashMap,
  fmt::{self, Display},
  path::{Path, PathBuf},
  str::FromStr,
  sync::Arc,
};

use async_trait::async_trait;
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub mod bibliography;
pub mod bibxml;
pub mod client;
pub mod data_fetcher;
pub mod error;
pub mod index;
pub mod item;
pub mod names;
pub mod reference;
pub mod render;
pub mod rfc_index;
mod xml;

use crate::{client::*, error::*, item::*};

/// Common traits and types for ergonomic imports.
///
/// # Usage
///
/// ```no_run
/// use ietfbib::{bibliography::IetfBibliography, prelude::*};
///
/// async fn example() -> Result<(), IetfBibError> {
///   let bib = IetfBibliography::with_defaults();
///   let item = bib.search("BCP 47").await?;
///   Ok(())
/// }
/// ```
pub mod prelude {
  pub use crate::{
    client::PageFetcher, error::IetfBibError, item::IetfBibliographicItem, render::OutputFormat,
  };
}
