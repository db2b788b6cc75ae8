//! Component types of the bibliographic record.
//!
//! These are the generic containers the IETF pipeline exercises: typed
//! identifiers, titles, links, dates, contributors, series memberships, and
//! document relations. Serde derives mirror the YAML hash schema exactly
//! (snake_case keys matching the field names), so the YAML snapshot
//! extractor and the YAML serializer are the same code path.

use super::*;

/// `false` predicate for serde skips.
fn is_false(value: &bool) -> bool { !value }

/// A typed document identifier (`IETF`, `DOI`, `Internet-Draft`, `IANA`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentIdentifier {
  /// Identifier type.
  #[serde(rename = "type")]
  pub id_type: String,
  /// Identifier value, e.g. `RFC 8341`.
  pub id:      String,
  /// Optional scope, e.g. `anchor` for anchor-form identifiers.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub scope:   Option<String>,
  /// Whether this is the primary identifier. At most one per record.
  #[serde(default, skip_serializing_if = "is_false")]
  pub primary: bool,
}

impl DocumentIdentifier {
  /// Primary `IETF` identifier.
  pub fn ietf_primary(id: impl Into<String>) -> Self {
    Self { id_type: "IETF".to_string(), id: id.into(), scope: None, primary: true }
  }

  /// Non-primary identifier of the given type.
  pub fn new(id_type: impl Into<String>, id: impl Into<String>) -> Self {
    Self { id_type: id_type.into(), id: id.into(), scope: None, primary: false }
  }
}

/// A typed title string. RFC metadata only carries `main` titles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedTitle {
  /// Title type, normally `main`.
  #[serde(rename = "type")]
  pub title_type: String,
  /// Title text.
  pub content:    String,
}

impl TypedTitle {
  /// Main title.
  pub fn main(content: impl Into<String>) -> Self {
    Self { title_type: "main".to_string(), content: content.into() }
  }
}

/// A typed link (`src`, or a download format such as `txt`/`html`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedUri {
  /// Link type.
  #[serde(rename = "type")]
  pub uri_type: String,
  /// Link target.
  pub content:  String,
}

impl TypedUri {
  /// Source link to the document's landing page.
  pub fn src(content: impl Into<String>) -> Self {
    Self { uri_type: "src".to_string(), content: content.into() }
  }
}

/// A bibliographic date with the precision the source provided (`YYYY`,
/// `YYYY-MM`, or `YYYY-MM-DD`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibliographicDate {
  /// Date type, normally `published`.
  #[serde(rename = "type")]
  pub date_type: String,
  /// The date value at source precision.
  pub on:        String,
}

impl BibliographicDate {
  /// Publication date.
  pub fn published(on: impl Into<String>) -> Self {
    Self { date_type: "published".to_string(), on: on.into() }
  }

  /// The date as a calendar day. Missing day and month default to `1`.
  pub fn as_date(&self) -> Option<NaiveDate> {
    let mut parts = self.on.splitn(3, '-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next().and_then(|m| m.parse().ok()).unwrap_or(1);
    let day: u32 = parts.next().and_then(|d| d.parse().ok()).unwrap_or(1);
    NaiveDate::from_ymd_opt(year, month, day)
  }
}

/// English month names, index 0 = January. Used to map the month names the
/// RFC index and BibXML carry into numeric dates and back.
pub(crate) const MONTH_NAMES: [&str; 12] = [
  "January",
  "February",
  "March",
  "April",
  "May",
  "June",
  "July",
  "August",
  "September",
  "October",
  "November",
  "December",
];

/// Month number (1-12) for a month name or a numeric month string.
pub(crate) fn month_number(month: &str) -> Option<u32> {
  if let Ok(number) = month.parse::<u32>() {
    return (1..=12).contains(&number).then_some(number);
  }
  MONTH_NAMES.iter().position(|name| name.eq_ignore_ascii_case(month)).map(|i| i as u32 + 1)
}

/// Month name for a month number (1-12).
pub(crate) fn month_name(number: u32) -> Option<&'static str> {
  MONTH_NAMES.get(number.checked_sub(1)? as usize).copied()
}

/// A formatted text block (abstracts), carrying its markup format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedString {
  /// Content, possibly with embedded markup per `format`.
  pub content:  String,
  /// Content language.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub language: Option<String>,
  /// Content script.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub script:   Option<String>,
  /// MIME-ish format tag, e.g. `text/html`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub format:   Option<String>,
}

impl FormattedString {
  /// English/Latin HTML content, the form RFC abstracts are stored in.
  pub fn html(content: impl Into<String>) -> Self {
    Self {
      content:  content.into(),
      language: Some("en".to_string()),
      script:   Some("Latn".to_string()),
      format:   Some("text/html".to_string()),
    }
  }
}

/// A contributor role (`author`, `editor`, `publisher`, `authorizer`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
  /// Role type.
  #[serde(rename = "type")]
  pub role_type: String,
}

impl Role {
  /// Role of the given type.
  pub fn new(role_type: impl Into<String>) -> Self { Self { role_type: role_type.into() } }
}

/// A person's name, split the way IETF author strings split: an optional
/// spelled-out forename, dot-delimited initials, and a surname that may
/// carry lowercase particles (`van`, `de`, `Le`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName {
  /// The full name as written in the source.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub completename: Option<String>,
  /// Individual forenames/initials.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub forename:     Vec<Forename>,
  /// Initials as written, e.g. `J.-L.`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub initials:     Option<String>,
  /// Family name including particles.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub surname:      Option<String>,
}

/// One forename entry: either a spelled-out name or a single initial.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forename {
  /// Spelled-out forename.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub content: Option<String>,
  /// Single-letter initial.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub initial: Option<String>,
}

/// A person contributor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
  /// The person's name.
  pub name: PersonName,
}

/// An organization contributor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
  /// Organization name.
  pub name:         String,
  /// Well-known abbreviation, when one exists.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub abbreviation: Option<String>,
}

impl Organization {
  /// Organization with no abbreviation.
  pub fn new(name: impl Into<String>) -> Self {
    let name = name.into();
    if name.is_empty() {
      warn!("organization has an empty name");
    }
    Self { name, abbreviation: None }
  }

  /// Organization with an abbreviation.
  pub fn with_abbreviation(name: impl Into<String>, abbreviation: impl Into<String>) -> Self {
    Self { name: name.into(), abbreviation: Some(abbreviation.into()) }
  }
}

/// The entity behind a contribution: a person or an organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity {
  /// An individual author/editor.
  Person(Person),
  /// A corporate author, publisher, or authorizing body.
  Organization(Organization),
}

impl Entity {
  /// Whether this entity is an organization with exactly the given name.
  pub fn is_organization_named(&self, name: &str) -> bool {
    matches!(self, Entity::Organization(org) if org.name == name)
  }
}

/// A contribution: an entity plus its roles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "ContributorRepr", try_from = "ContributorRepr")]
pub struct Contributor {
  /// The contributing entity.
  pub entity: Entity,
  /// Roles the entity holds for this document.
  pub role:   Vec<Role>,
}

impl Contributor {
  /// Person contributor with one role.
  pub fn person(person: Person, role_type: &str) -> Self {
    Self { entity: Entity::Person(person), role: vec![Role::new(role_type)] }
  }

  /// Organization contributor with one role.
  pub fn organization(org: Organization, role_type: &str) -> Self {
    Self { entity: Entity::Organization(org), role: vec![Role::new(role_type)] }
  }
}

/// Serialized shape of a contributor: the entity under a `person` or
/// `organization` key, alongside its roles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributorRepr {
  /// Person entity, when the contributor is a person.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  person:       Option<Person>,
  /// Organization entity, when the contributor is an organization.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  organization: Option<Organization>,
  /// Contribution roles.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  role:         Vec<Role>,
}

impl From<Contributor> for ContributorRepr {
  fn from(contributor: Contributor) -> Self {
    let (person, organization) = match contributor.entity {
      Entity::Person(person) => (Some(person), None),
      Entity::Organization(org) => (None, Some(org)),
    };
    Self { person, organization, role: contributor.role }
  }
}

impl TryFrom<ContributorRepr> for Contributor {
  type Error = String;

  fn try_from(repr: ContributorRepr) -> std::result::Result<Self, Self::Error> {
    let entity = match (repr.person, repr.organization) {
      (Some(person), None) => Entity::Person(person),
      (None, Some(org)) => Entity::Organization(org),
      _ => return Err("contributor needs exactly one of `person` or `organization`".to_string()),
    };
    Ok(Self { entity, role: repr.role })
  }
}

/// Publication status of a document, e.g. `PROPOSED STANDARD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStatus {
  /// Status stage as the source states it.
  pub stage: String,
}

/// A series membership (`RFC 139`, `BCP 26`, a `stream` series).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
  /// Series type; absent for plain series, `stream` for stream series.
  #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
  pub series_type: Option<String>,
  /// Series title, e.g. `RFC`.
  pub title:       String,
  /// Number within the series, leading zeros stripped.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub number:      Option<String>,
}

/// Relationship between two documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationType {
  /// This document updates the target.
  Updates,
  /// This document is updated by the target.
  UpdatedBy,
  /// This document obsoletes the target.
  Obsoletes,
  /// This document is obsoleted by the target.
  ObsoletedBy,
  /// The target is a member of this (sub-series) document.
  Includes,
  /// The target was merged into this document.
  Merges,
}

impl Display for RelationType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      RelationType::Updates => "updates",
      RelationType::UpdatedBy => "updatedBy",
      RelationType::Obsoletes => "obsoletes",
      RelationType::ObsoletedBy => "obsoletedBy",
      RelationType::Includes => "includes",
      RelationType::Merges => "merges",
    };
    write!(f, "{name}")
  }
}

/// A relation to another document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
  /// Relation type.
  #[serde(rename = "type")]
  pub rel_type: RelationType,
  /// The related document, usually a lazy stub.
  pub bibitem:  RelationTarget,
}

impl Relation {
  /// Relation to a stub target carrying only a formatted reference and its
  /// identifier.
  pub fn stub(rel_type: RelationType, formattedref: &str) -> Self {
    let stub = RelationStub {
      formattedref: formattedref.to_string(),
      docid:        vec![DocumentIdentifier::ietf_primary(formattedref)],
    };
    Self { rel_type, bibitem: RelationTarget::Stub(stub) }
  }
}

/// A minimal, unresolved relation target: enough to cite, not enough to
/// describe. Resolution is explicit and lazy (see
/// [`crate::bibliography::IetfBibliography::resolve_relation`]), which keeps
/// mutually referencing documents from turning a lookup into a fetch cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationStub {
  /// Formatted reference text, e.g. `RFC1574`.
  pub formattedref: String,
  /// Identifiers of the target document.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub docid:        Vec<DocumentIdentifier>,
}

/// Target of a [`Relation`]: either an unresolved stub or a full record.
#[derive(Debug, Clone, PartialEq)]
pub enum RelationTarget {
  /// Unresolved reference to another record.
  Stub(RelationStub),
  /// Fully resolved record, e.g. a sub-series member parsed in place.
  Resolved(Box<IetfBibliographicItem>),
}

impl RelationTarget {
  /// Identifiers of the target, resolved or not.
  pub fn docid(&self) -> &[DocumentIdentifier] {
    match self {
      RelationTarget::Stub(stub) => &stub.docid,
      RelationTarget::Resolved(item) => &item.docid,
    }
  }

  /// Formatted reference text of the target, when one is present.
  pub fn formattedref(&self) -> Option<&str> {
    match self {
      RelationTarget::Stub(stub) => Some(&stub.formattedref),
      RelationTarget::Resolved(item) => item.formattedref.as_deref(),
    }
  }

  /// Classifies a deserialized record: relation targets without any
  /// descriptive content stay stubs.
  pub(crate) fn from_item(item: IetfBibliographicItem) -> Self {
    match (&item.formattedref, item.title.is_empty()) {
      (Some(formattedref), true) => RelationTarget::Stub(RelationStub {
        formattedref: formattedref.clone(),
        docid:        item.docid,
      }),
      _ => RelationTarget::Resolved(Box::new(item)),
    }
  }
}

impl Serialize for RelationTarget {
  fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    match self {
      RelationTarget::Stub(stub) => stub.serialize(serializer),
      RelationTarget::Resolved(item) => item.serialize(serializer),
    }
  }
}

impl<'de> Deserialize<'de> for RelationTarget {
  fn deserialize<D: serde::Deserializer<'de>>(
    deserializer: D,
  ) -> std::result::Result<Self, D::Error> {
    IetfBibliographicItem::deserialize(deserializer).map(RelationTarget::from_item)
  }
}

/// A working group in the document's editorial group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkGroup {
  /// Working-group name (acronym in the RFC index).
  pub name: String,
}

/// Passthrough structured identifier carried in the extension block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredIdentifier {
  /// Identifier flavor.
  #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
  pub id_type:   Option<String>,
  /// Document number within the scheme.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub docnumber: Option<String>,
  /// Issuing agencies.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub agency:    Vec<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn month_lookup_both_ways() {
    assert_eq!(month_number("January"), Some(1));
    assert_eq!(month_number("december"), Some(12));
    assert_eq!(month_number("3"), Some(3));
    assert_eq!(month_number("Smarch"), None);
    assert_eq!(month_number("13"), None);
    assert_eq!(month_name(3), Some("March"));
    assert_eq!(month_name(0), None);
  }

  #[test]
  fn date_precision_defaults() {
    let date = BibliographicDate::published("1990-01");
    assert_eq!(date.as_date(), NaiveDate::from_ymd_opt(1990, 1, 1));
    let date = BibliographicDate::published("2018-03-19");
    assert_eq!(date.as_date(), NaiveDate::from_ymd_opt(2018, 3, 19));
    let date = BibliographicDate::published("2018");
    assert_eq!(date.as_date(), NaiveDate::from_ymd_opt(2018, 1, 1));
  }

  #[test]
  fn contributor_yaml_shape() {
    let contributor =
      Contributor::organization(Organization::with_abbreviation("Internet Architecture Board", "IAB"), "author");
    let yaml = serde_yaml::to_string(&contributor).unwrap();
    assert!(yaml.contains("organization:"), "got: {yaml}");
    let back: Contributor = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(back, contributor);
  }

  #[test]
  fn relation_target_stays_stub_through_yaml() {
    let relation = Relation::stub(RelationType::ObsoletedBy, "RFC1574");
    let yaml = serde_yaml::to_string(&relation).unwrap();
    let back: Relation = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(back, relation);
    assert!(matches!(back.bibitem, RelationTarget::Stub(_)));
  }
}
