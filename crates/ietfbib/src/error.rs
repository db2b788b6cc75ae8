//! Error types for the ietfbib library.
//!
//! The public resolution API exposes a deliberately small error surface:
//! network failures, non-200 responses, and required-fetch misses are all
//! translated into [`IetfBibError::Request`] carrying the original reference
//! text, so callers never have to match on transport-specific error types.
//! Unrecognized references and index misses are not errors at all; the
//! lookup API returns `Ok(None)` for those.
//!
//! # Examples
//!
//! ```
//! use ietfbib::error::IetfBibError;
//!
//! let err = IetfBibError::Request { reference: "RFC 8341".to_string() };
//! assert_eq!(err.to_string(), "No document found for `RFC 8341` reference");
//! ```

use quick_xml::events::attributes::AttrError;
use thiserror::Error;

/// Error type alias used for the [`ietfbib`](crate) crate.
pub type Result<T> = core::result::Result<T, IetfBibError>;

/// Errors that can occur while resolving and rendering IETF references.
#[derive(Error, Debug)]
pub enum IetfBibError {
  /// A document that should exist could not be fetched.
  ///
  /// Raised for any network/transport failure, any non-200 response, and for
  /// index-snapshot fetch failures. Always carries the reference text (or
  /// URL) that was being resolved, never the underlying transport error, so
  /// there is exactly one error surface for "the remote side failed".
  #[error("No document found for `{reference}` reference")]
  Request {
    /// The reference text or URL that was being resolved.
    reference: String,
  },

  /// A source document is missing required fields (no `doc-id`, no `title`,
  /// no recognizable root element).
  ///
  /// Batch contexts log this and skip the document; single-lookup contexts
  /// convert it into an empty result.
  #[error("malformed source: {0}")]
  MalformedSource(String),

  /// A network request failed at the transport level.
  ///
  /// Internal layers use this variant; the resolution API translates it into
  /// [`IetfBibError::Request`] before surfacing.
  #[error(transparent)]
  Network(#[from] reqwest::Error),

  /// A file system operation failed (index cache reads/writes, batch output).
  #[error(transparent)]
  Io(#[from] std::io::Error),

  /// YAML (de)serialization failed.
  #[error(transparent)]
  Yaml(#[from] serde_yaml::Error),

  /// An index snapshot archive could not be decompressed.
  #[error(transparent)]
  Zip(#[from] zip::result::ZipError),

  /// XML reading or writing failed at the syntax level.
  #[error("malformed XML: {0}")]
  Xml(#[from] quick_xml::Error),
}

impl From<AttrError> for IetfBibError {
  fn from(err: AttrError) -> Self { IetfBibError::MalformedSource(err.to_string()) }
}

impl IetfBibError {
  /// Translates any lower-level failure into the uniform [`Request`] error
  /// for the given reference text.
  ///
  /// [`Request`]: IetfBibError::Request
  pub fn for_reference(self, reference: &str) -> Self {
    match self {
      err @ IetfBibError::MalformedSource(_) => err,
      _ => IetfBibError::Request { reference: reference.to_string() },
    }
  }
}
