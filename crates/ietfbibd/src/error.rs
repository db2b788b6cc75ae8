//! Error type for the ietfbib CLI.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = core::result::Result<T, IetfBibdError>;

/// Errors surfaced to the CLI user.
#[derive(Error, Debug)]
pub enum IetfBibdError {
  /// Failure bubbled up from the resolver library.
  #[error(transparent)]
  IetfBib(#[from] ietfbib::error::IetfBibError),

  /// A reference resolved to nothing.
  #[error("no document found for `{0}`")]
  NotFound(String),
}
