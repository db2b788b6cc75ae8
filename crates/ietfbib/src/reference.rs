//! Citation-text normalization into canonical references.
//!
//! This module is the entry point of the resolution pipeline: pure
//! string/regex logic that classifies a free-text citation into a document
//! family and a canonical token, with no I/O involved.
//!
//! Recognized lexical forms (after stripping an optional leading `"IETF "`):
//!
//! - `"RFC 8341"`, `"RFC8341"` for the RFC family
//! - `"BCP 47"`, `"FYI 2"`, `"STD 3"` for the sub-series families
//! - `"I-D.draft-abarth-cake-02"`, `"I-D draft-abarth-cake"` for Internet-Drafts
//!
//! Anything else is not an error: [`CanonicalReference::parse`] returns
//! `None` and the high-level lookup reports "not found".
//!
//! # Examples
//!
//! ```
//! use ietfbib::reference::{CanonicalReference, DocFamily};
//!
//! let cref = CanonicalReference::parse("IETF RFC 8341").unwrap();
//! assert_eq!(cref.family, DocFamily::Rfc);
//! assert_eq!(cref.lookup_key(), "RFC.8341");
//!
//! let draft = CanonicalReference::parse("I-D.draft-abarth-cake-02").unwrap();
//! assert_eq!(draft.token, "draft-abarth-cake");
//! assert_eq!(draft.version.as_deref(), Some("02"));
//! ```

use super::*;
use crate::index::IndexFamily;

lazy_static! {
  /// RFC and sub-series references: prefix, optional space, decimal number.
  static ref RFC_FAMILY: Regex = Regex::new(r"^(RFC|BCP|FYI|STD)\s?(\d+)$").unwrap();
  /// Internet-Draft references: `I-D.` or `I-D ` followed by the draft name.
  static ref DRAFT: Regex = Regex::new(r"^I-D[.\s](\S+)$").unwrap();
  /// A trailing 2-digit draft revision, e.g. `-02`.
  static ref DRAFT_VERSION: Regex = Regex::new(r"-(\d{2})$").unwrap();
}

/// Document family of a recognized citation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocFamily {
  /// A published RFC.
  Rfc,
  /// Best Current Practice sub-series.
  Bcp,
  /// For Your Information sub-series.
  Fyi,
  /// Internet Standard sub-series.
  Std,
  /// A versioned, pre-publication Internet-Draft.
  InternetDraft,
}

impl DocFamily {
  /// The remote index backing this family: `RFC` for RFCs, `RSS` for the
  /// sub-series, `IDS` for Internet-Drafts.
  pub fn index_family(&self) -> IndexFamily {
    match self {
      DocFamily::Rfc => IndexFamily::Rfc,
      DocFamily::Bcp | DocFamily::Fyi | DocFamily::Std => IndexFamily::Rss,
      DocFamily::InternetDraft => IndexFamily::Ids,
    }
  }

  /// The uppercase series prefix (`RFC`, `BCP`, ...). Empty for drafts,
  /// which carry the full draft name in their token.
  pub fn prefix(&self) -> &'static str {
    match self {
      DocFamily::Rfc => "RFC",
      DocFamily::Bcp => "BCP",
      DocFamily::Fyi => "FYI",
      DocFamily::Std => "STD",
      DocFamily::InternetDraft => "",
    }
  }
}

/// A classified citation: family, canonical token, and (for Internet-Drafts)
/// an extracted 2-digit revision.
///
/// Invariants: the token of an RFC-family reference is the decimal number as
/// written; an Internet-Draft token is the lowercase draft name with any
/// trailing `-NN` revision stripped into `version`. Zero-padding of numeric
/// tokens happens only inside the index key normalization
/// ([`crate::index::Index::normalize_key`]), never here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalReference {
  /// Document family the citation belongs to.
  pub family:  DocFamily,
  /// Canonical token: decimal number for RFC-family, draft name for drafts.
  pub token:   String,
  /// Extracted 2-digit revision of an Internet-Draft, if present.
  pub version: Option<String>,
}

impl CanonicalReference {
  /// Classifies a free-text citation.
  ///
  /// Returns `None` for any unrecognized family prefix; unsupported
  /// references are a "not found" condition, not an error.
  pub fn parse(text: &str) -> Option<Self> {
    let reference = text.strip_prefix("IETF ").unwrap_or(text).trim();

    if let Some(cap) = RFC_FAMILY.captures(reference) {
      let family = match &cap[1] {
        "RFC" => DocFamily::Rfc,
        "BCP" => DocFamily::Bcp,
        "FYI" => DocFamily::Fyi,
        _ => DocFamily::Std,
      };
      return Some(Self { family, token: cap[2].to_string(), version: None });
    }

    let cap = DRAFT.captures(reference)?;
    let mut token = cap[1].to_lowercase();
    let version = DRAFT_VERSION.captures(&token).map(|v| v[1].to_string());
    if let Some(ver) = &version {
      token.truncate(token.len() - ver.len() - 1);
    }
    Some(Self { family: DocFamily::InternetDraft, token, version })
  }

  /// The canonical lookup key used to query the family's index snapshot:
  /// `RFC.8341`, `BCP.47`, or the bare draft name for Internet-Drafts.
  pub fn lookup_key(&self) -> String {
    match self.family {
      DocFamily::InternetDraft => self.token.clone(),
      _ => format!("{}.{}", self.family.prefix(), self.token),
    }
  }

  /// The publication identifier as it appears in document identifiers:
  /// `RFC 8341`, `BCP 47`, or `draft-abarth-cake-02` (revision re-applied).
  pub fn pub_id(&self) -> String {
    match self.family {
      DocFamily::InternetDraft => match &self.version {
        Some(ver) => format!("{}-{}", self.token, ver),
        None => self.token.clone(),
      },
      _ => format!("{} {}", self.family.prefix(), self.token),
    }
  }
}

impl Display for CanonicalReference {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.family {
      DocFamily::InternetDraft => write!(f, "I-D.{}", self.pub_id()),
      _ => write!(f, "{}", self.pub_id()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn classifies_rfc_forms() {
    for text in ["RFC 8341", "RFC8341", "IETF RFC 8341"] {
      let cref = CanonicalReference::parse(text).unwrap();
      assert_eq!(cref.family, DocFamily::Rfc);
      assert_eq!(cref.lookup_key(), "RFC.8341", "from {text}");
      assert_eq!(cref.pub_id(), "RFC 8341");
    }
  }

  #[test]
  fn classifies_subseries() {
    let bcp = CanonicalReference::parse("BCP 47").unwrap();
    assert_eq!(bcp.family, DocFamily::Bcp);
    assert_eq!(bcp.lookup_key(), "BCP.47");

    assert_eq!(CanonicalReference::parse("FYI 2").unwrap().family, DocFamily::Fyi);
    assert_eq!(CanonicalReference::parse("STD 3").unwrap().family, DocFamily::Std);
  }

  #[test]
  fn extracts_draft_version() {
    let cref = CanonicalReference::parse("I-D.draft-abarth-cake-02").unwrap();
    assert_eq!(cref.family, DocFamily::InternetDraft);
    assert_eq!(cref.token, "draft-abarth-cake");
    assert_eq!(cref.version.as_deref(), Some("02"));
    assert_eq!(cref.lookup_key(), "draft-abarth-cake");
    assert_eq!(cref.pub_id(), "draft-abarth-cake-02");
  }

  #[test]
  fn draft_without_version() {
    let cref = CanonicalReference::parse("I-D draft-ietf-calext-eventpub-extensions").unwrap();
    assert_eq!(cref.token, "draft-ietf-calext-eventpub-extensions");
    assert_eq!(cref.version, None);
  }

  #[test]
  fn unrecognized_prefix_is_none() {
    assert_eq!(CanonicalReference::parse("CN 8341"), None);
    assert_eq!(CanonicalReference::parse("ISO 9000"), None);
    assert_eq!(CanonicalReference::parse(""), None);
  }

  #[test]
  fn normalization_is_idempotent() {
    for text in ["RFC 8341", "BCP 47", "I-D.draft-abarth-cake-02", "STD 3"] {
      let first = CanonicalReference::parse(text).unwrap();
      let again = CanonicalReference::parse(&first.to_string()).unwrap();
      assert_eq!(first, again, "round-trip of {text}");
    }
  }

  #[test]
  fn token_is_never_padded_at_parse_time() {
    // Padding is an index concern; the canonical token keeps the digits as
    // written so it can never be padded twice.
    let cref = CanonicalReference::parse("BCP 47").unwrap();
    assert_eq!(cref.token, "47");
    let cref = CanonicalReference::parse("RFC 0139").unwrap();
    assert_eq!(cref.token, "0139");
  }
}
