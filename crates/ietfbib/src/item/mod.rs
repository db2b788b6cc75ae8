//! The normalized bibliographic record and its IETF extension block.
//!
//! [`IetfBibliographicItem`] is the single output type of all three format
//! extractors and the single input type of all serializers. It combines the
//! generic bibliographic containers ([`types`]) with the IETF-specific
//! extension block [`Ext`] (`doctype`, `stream`, editorial group,
//! structured identifier).
//!
//! Records are immutable once built; the only post-construction mutation is
//! resolving a lazy relation stub, which happens in the resolver, not here.
//!
//! # Hash round-trip
//!
//! [`IetfBibliographicItem::to_hash`] and
//! [`IetfBibliographicItem::from_hash`] round-trip the record through a YAML
//! mapping whose keys mirror the field names; the extension block lives
//! under an `ext` key and round-trips losslessly. Legacy snapshots that
//! stored `doctype`/`stream`/`editorialgroup` at the top level are lifted
//! into `ext` on load.
//!
//! # Examples
//!
//! ```
//! use ietfbib::item::IetfBibliographicItem;
//!
//! let item = IetfBibliographicItem::from_yaml(
//!   "doctype: rfc\ndocid:\n- type: IETF\n  id: BCP 47\n  primary: true\n",
//! )
//! .unwrap();
//! assert_eq!(item.ext.doctype.as_deref(), Some("rfc"));
//! assert_eq!(item.primary_docid().unwrap().id, "BCP 47");
//! ```

use std::sync::OnceLock;

use super::*;

mod types;

pub use types::*;

/// Valid document types of the IETF flavor.
pub const DOCTYPES: [&str; 2] = ["rfc", "internet-draft"];

/// Known document streams (originating bodies).
pub const STREAMS: [&str; 6] = ["IAB", "IETF", "Independent", "IRTF", "Legacy", "Editorial"];

/// Version tag of the extension-block schema, rendered as the
/// `schema-version` attribute of top-level `ext` elements.
const EXT_SCHEMA_VERSION: &str = "1.0.3";

/// A bibliographic record for one IETF document.
///
/// Invariants maintained by the extractors:
/// - every extracted record carries at least one `IETF`-typed identifier;
/// - at most one identifier is marked `primary`;
/// - `fetched` is set at resolution time, and omitted for relation-only
///   stubs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IetfBibliographicItem {
  /// Record type, `standard` for everything the IETF corpus serves.
  #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
  pub item_type:    Option<String>,
  /// Date the record was resolved from the corpus.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub fetched:      Option<NaiveDate>,
  /// Document identifiers; exactly one is primary.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub docid:        Vec<DocumentIdentifier>,
  /// Document number, e.g. `RFC0139` for RFC index entries.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub docnumber:    Option<String>,
  /// Titles; RFC metadata carries one `main` title.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub title:        Vec<TypedTitle>,
  /// Formatted reference text for relation-only records.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub formattedref: Option<String>,
  /// Typed links: landing page plus per-format downloads.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub link:         Vec<TypedUri>,
  /// Bibliographic dates.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub date:         Vec<BibliographicDate>,
  /// Contributors: authors/editors plus synthesized publisher entries.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub contributor:  Vec<Contributor>,
  /// Abstracts.
  #[serde(rename = "abstract", default, skip_serializing_if = "Vec::is_empty")]
  pub abstracts:    Vec<FormattedString>,
  /// Ordered free-text keywords.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub keyword:      Vec<String>,
  /// Content languages.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub language:     Vec<String>,
  /// Content scripts.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub script:       Vec<String>,
  /// Publication status.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status:       Option<DocumentStatus>,
  /// Series memberships.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub series:       Vec<Series>,
  /// Relations to other documents, lazy by default.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub relation:     Vec<Relation>,
  /// IETF extension block.
  #[serde(default, skip_serializing_if = "Ext::is_empty")]
  pub ext:          Ext,
}

/// The IETF extension block of a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ext {
  /// Document type: `rfc` or `internet-draft`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub doctype:              Option<String>,
  /// Document subtype passthrough.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub subdoctype:           Option<String>,
  /// Originating body.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub stream:               Option<String>,
  /// Working groups the document belongs to.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub editorialgroup:       Vec<WorkGroup>,
  /// Passthrough structured identifier.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub structuredidentifier: Option<StructuredIdentifier>,
}

impl Ext {
  /// Whether the block carries no data and can be omitted from output.
  pub fn is_empty(&self) -> bool {
    self.doctype.is_none()
      && self.subdoctype.is_none()
      && self.stream.is_none()
      && self.editorialgroup.is_empty()
      && self.structuredidentifier.is_none()
  }

  /// Sets the document type, logging a warning for values outside
  /// [`DOCTYPES`]. The invalid value is retained; validation never fails a
  /// record.
  pub fn set_doctype(&mut self, doctype: impl Into<String>) {
    let doctype = doctype.into();
    if !DOCTYPES.contains(&doctype.as_str()) {
      warn!("invalid doctype: `{doctype}`");
    }
    self.doctype = Some(doctype);
  }

  /// Sets the stream, logging a warning for values outside [`STREAMS`]. The
  /// value is retained either way.
  pub fn set_stream(&mut self, stream: impl Into<String>) {
    let stream = stream.into();
    if !STREAMS.contains(&stream.as_str()) {
      warn!("unknown stream: `{stream}`");
    }
    self.stream = Some(stream);
  }
}

impl IetfBibliographicItem {
  /// The primary document identifier, falling back to the first one.
  pub fn primary_docid(&self) -> Option<&DocumentIdentifier> {
    self.docid.iter().find(|docid| docid.primary).or_else(|| self.docid.first())
  }

  /// The document identifier of the given type.
  pub fn docid_of_type(&self, id_type: &str) -> Option<&DocumentIdentifier> {
    self.docid.iter().find(|docid| docid.id_type == id_type)
  }

  /// Schema version of the extension block, computed once per process.
  pub fn ext_schema() -> &'static str {
    static SCHEMA: OnceLock<String> = OnceLock::new();
    SCHEMA.get_or_init(|| format!("v{EXT_SCHEMA_VERSION}"))
  }

  /// Stamps the resolution date. Callers skip this for relation members,
  /// which by contract carry no `fetched` date.
  pub fn stamp_fetched(&mut self) { self.fetched = Some(chrono::Local::now().date_naive()); }

  /// Serializes the record to a YAML mapping.
  pub fn to_hash(&self) -> Result<serde_yaml::Value> { Ok(serde_yaml::to_value(self)?) }

  /// Rebuilds a record from a YAML mapping, lifting legacy top-level
  /// extension keys into `ext` and re-validating `doctype`/`stream`.
  pub fn from_hash(mut hash: serde_yaml::Value) -> Result<Self> {
    lift_legacy_ext(&mut hash);
    let item: Self = serde_yaml::from_value(hash)?;
    if let Some(doctype) = &item.ext.doctype {
      if !DOCTYPES.contains(&doctype.as_str()) {
        warn!("invalid doctype: `{doctype}`");
      }
    }
    if let Some(stream) = &item.ext.stream {
      if !STREAMS.contains(&stream.as_str()) {
        warn!("unknown stream: `{stream}`");
      }
    }
    Ok(item)
  }

  /// Serializes the record to YAML text.
  pub fn to_yaml(&self) -> Result<String> { Ok(serde_yaml::to_string(self)?) }

  /// Deserializes a record from YAML text (the snapshot fast path).
  pub fn from_yaml(yaml: &str) -> Result<Self> {
    Self::from_hash(serde_yaml::from_str(yaml)?)
  }

  /// Renders the record as a bibdata XML document.
  pub fn to_xml(&self) -> Result<String> { crate::render::xml::render(self, false) }

  /// Renders the record as a BibXML `<reference>` document.
  pub fn to_bibxml(&self) -> Result<String> { crate::render::bibxml::render(self) }
}

/// Moves legacy top-level `doctype`/`subdoctype`/`stream`/`editorialgroup`/
/// `structuredidentifier` keys under `ext`. Keys already under `ext` win.
fn lift_legacy_ext(hash: &mut serde_yaml::Value) {
  let serde_yaml::Value::Mapping(map) = hash else { return };
  let legacy = ["doctype", "subdoctype", "stream", "editorialgroup", "structuredidentifier"];

  let mut lifted = serde_yaml::Mapping::new();
  for key in legacy {
    let key = serde_yaml::Value::String(key.to_string());
    if let Some(value) = map.remove(&key) {
      lifted.insert(key, value);
    }
  }
  if lifted.is_empty() {
    return;
  }

  let ext = map
    .entry(serde_yaml::Value::String("ext".to_string()))
    .or_insert_with(|| serde_yaml::Value::Mapping(serde_yaml::Mapping::new()));
  if let serde_yaml::Value::Mapping(ext) = ext {
    for (key, value) in lifted {
      ext.entry(key).or_insert(value);
    }
  }
}

#[cfg(test)]
mod tests {
  use tracing_test::traced_test;

  use super::*;

  fn sample_item() -> IetfBibliographicItem {
    let mut item = IetfBibliographicItem {
      item_type: Some("standard".to_string()),
      docid: vec![
        DocumentIdentifier::ietf_primary("RFC 139"),
        DocumentIdentifier::new("DOI", "10.17487/RFC1139"),
      ],
      docnumber: Some("RFC0139".to_string()),
      title: vec![TypedTitle::main("Echo function for ISO 8473")],
      date: vec![BibliographicDate::published("1990-01")],
      keyword: vec!["IPv6".to_string()],
      language: vec!["en".to_string()],
      script: vec!["Latn".to_string()],
      status: Some(DocumentStatus { stage: "PROPOSED STANDARD".to_string() }),
      relation: vec![Relation::stub(RelationType::ObsoletedBy, "RFC1574")],
      ..Default::default()
    };
    item.ext.set_doctype("rfc");
    item.ext.set_stream("IETF");
    item.ext.editorialgroup.push(WorkGroup { name: "osigen".to_string() });
    item.ext.structuredidentifier =
      Some(StructuredIdentifier { docnumber: Some("RFC0139".to_string()), ..Default::default() });
    item
  }

  #[test]
  fn ext_hash_round_trip_is_lossless() {
    let item = sample_item();
    let hash = item.to_hash().unwrap();
    let back = IetfBibliographicItem::from_hash(hash).unwrap();
    assert_eq!(back, item);
    assert_eq!(back.ext.doctype.as_deref(), Some("rfc"));
    assert_eq!(back.ext.stream.as_deref(), Some("IETF"));
    assert_eq!(back.ext.editorialgroup[0].name, "osigen");
    assert_eq!(back.ext.structuredidentifier.unwrap().docnumber.as_deref(), Some("RFC0139"));
  }

  #[test]
  fn legacy_top_level_ext_keys_are_lifted() {
    let item = IetfBibliographicItem::from_yaml(
      "doctype: rfc\nstream: IAB\ndocid:\n- type: IETF\n  id: RFC 8\n  primary: true\n",
    )
    .unwrap();
    assert_eq!(item.ext.doctype.as_deref(), Some("rfc"));
    assert_eq!(item.ext.stream.as_deref(), Some("IAB"));
  }

  #[traced_test]
  #[test]
  fn invalid_doctype_warns_but_is_retained() {
    let mut ext = Ext::default();
    ext.set_doctype("memo");
    assert_eq!(ext.doctype.as_deref(), Some("memo"));
    assert!(logs_contain("invalid doctype: `memo`"));
  }

  #[traced_test]
  #[test]
  fn unknown_stream_warns_but_is_retained() {
    let mut ext = Ext::default();
    ext.set_stream("Backchannel");
    assert_eq!(ext.stream.as_deref(), Some("Backchannel"));
    assert!(logs_contain("unknown stream: `Backchannel`"));
  }

  #[test]
  fn primary_docid_falls_back_to_first() {
    let item = IetfBibliographicItem {
      docid: vec![DocumentIdentifier::new("DOI", "10.17487/RFC1139")],
      ..Default::default()
    };
    assert_eq!(item.primary_docid().unwrap().id_type, "DOI");
    assert_eq!(sample_item().primary_docid().unwrap().id, "RFC 139");
  }

  #[test]
  fn relation_stubs_carry_no_fetched_date() {
    let item = sample_item();
    let RelationTarget::Stub(stub) = &item.relation[0].bibitem else {
      panic!("expected a stub relation target");
    };
    assert_eq!(stub.formattedref, "RFC1574");
    // Stubs round-trip without ever acquiring a fetched date.
    let back = IetfBibliographicItem::from_hash(item.to_hash().unwrap()).unwrap();
    let RelationTarget::Stub(stub) = &back.relation[0].bibitem else {
      panic!("expected a stub relation target");
    };
    assert_eq!(stub.docid[0].id, "RFC1574");
  }
}
