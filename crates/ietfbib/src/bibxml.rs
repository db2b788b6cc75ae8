//! Extractor for BibXML `<reference>` and `<referencegroup>` documents.
//!
//! BibXML is the per-document format the corpus serves for Internet-Drafts
//! and for RFCs resolved through the per-document lookup. A `<reference>`
//! carries the front matter (title, authors, date, abstract, keywords),
//! series memberships, and typed download links; a `<referencegroup>`
//! aggregates the references of a sub-series.
//!
//! When a historical draft revision was requested, the revision suffix in
//! download targets and in the Internet-Draft identifier is rewritten to the
//! requested `-NN` before being recorded.

use super::*;
use crate::{names, xml::Element};

lazy_static! {
  /// Series-prefixed anchors, e.g. `RFC8341` or `BCP47`.
  static ref ANCHOR_ID: Regex = Regex::new(r"^(RFC|BCP|FYI|STD)\s?0*(\d+)$").unwrap();
  /// A 2-digit draft revision suffix, optionally before a file extension.
  static ref TARGET_VERSION: Regex = Regex::new(r"-\d{2}(?P<ext>\.\w+)?$").unwrap();
}

/// Parses a BibXML document into a record.
///
/// `version` is the requested historical draft revision, substituted into
/// revision-bearing targets. `is_relation` marks records parsed as members
/// of another record; they never receive a `fetched` date.
///
/// # Errors
///
/// Returns [`IetfBibError::MalformedSource`] when the document root is
/// neither `reference` nor `referencegroup`, or lacks an anchor.
pub fn parse(xml: &str, version: Option<&str>, is_relation: bool) -> Result<IetfBibliographicItem> {
  let root = Element::parse(xml)?;
  let mut item = match root.name.as_str() {
    "reference" => parse_reference(&root, version),
    "referencegroup" => parse_group(&root),
    other => Err(IetfBibError::MalformedSource(format!("unexpected root element `{other}`"))),
  }?;
  if !is_relation {
    item.stamp_fetched();
  }
  Ok(item)
}

/// Classifies a publication identifier into its docid type.
fn pubid_type(id: &str) -> &'static str {
  if ANCHOR_ID.is_match(id) || id.starts_with("RFC ") {
    "RFC"
  } else if id.starts_with("draft-") {
    "Internet-Draft"
  } else {
    "IETF"
  }
}

/// Parses one `<reference>` element.
fn parse_reference(root: &Element, version: Option<&str>) -> Result<IetfBibliographicItem> {
  let anchor = root
    .attr("anchor")
    .ok_or_else(|| IetfBibError::MalformedSource("reference without anchor".to_string()))?;
  let pub_id = anchor_pub_id(anchor);

  let mut item = IetfBibliographicItem {
    item_type: Some("standard".to_string()),
    docid: vec![DocumentIdentifier::ietf_primary(pub_id)],
    title: root.text_at("front/title").map(TypedTitle::main).into_iter().collect(),
    contributor: parse_contributors(root),
    date: parse_date(root).into_iter().collect(),
    abstracts: parse_abstract(root),
    keyword: root.all("front/keyword").iter().map(|kw| kw.text()).collect(),
    language: vec!["en".to_string()],
    script: vec!["Latn".to_string()],
    link: root.attr("target").map(TypedUri::src).into_iter().collect(),
    ..Default::default()
  };

  parse_series_info(root, version, &mut item);
  parse_formats(root, version, &mut item);

  let is_draft =
    anchor.starts_with("I-D") || item.docid_of_type("Internet-Draft").is_some();
  item.ext.set_doctype(if is_draft { "internet-draft" } else { "rfc" });
  Ok(item)
}

/// Parses one `<referencegroup>` element: the group's own identity plus one
/// `includes` relation per member reference.
fn parse_group(root: &Element) -> Result<IetfBibliographicItem> {
  let anchor = root
    .attr("anchor")
    .ok_or_else(|| IetfBibError::MalformedSource("referencegroup without anchor".to_string()))?;

  let mut relation = Vec::new();
  for member in root.children_named("reference") {
    let target = parse_reference(member, None)?;
    relation.push(Relation {
      rel_type: RelationType::Includes,
      bibitem:  RelationTarget::Resolved(Box::new(target)),
    });
  }

  let mut item = IetfBibliographicItem {
    item_type: Some("standard".to_string()),
    docid: vec![DocumentIdentifier::ietf_primary(anchor_pub_id(anchor))],
    formattedref: Some(anchor.to_string()),
    language: vec!["en".to_string()],
    script: vec!["Latn".to_string()],
    link: root.attr("target").map(TypedUri::src).into_iter().collect(),
    relation,
    ..Default::default()
  };
  item.ext.set_doctype("rfc");
  Ok(item)
}

/// `RFC8341` → `RFC 8341`; anchors outside the RFC families pass through.
fn anchor_pub_id(anchor: &str) -> String {
  match ANCHOR_ID.captures(anchor) {
    Some(cap) => format!("{} {}", &cap[1], &cap[2]),
    None => anchor.to_string(),
  }
}

/// Front-matter authors behind the IETF publisher organization.
fn parse_contributors(root: &Element) -> Vec<Contributor> {
  let mut contributors = vec![Contributor::organization(
    Organization::with_abbreviation("Internet Engineering Task Force", "IETF"),
    "publisher",
  )];

  for author in root.all("front/author") {
    let fullname = author.attr("fullname").filter(|name| !name.is_empty() && *name != "None");
    // Explicit surname/initials attributes win; bare full names go through
    // the organization table before the person heuristic.
    let entity = match (author.attr("surname"), fullname) {
      (Some(_), _) | (None, None) => {
        match names::person_from_parts(fullname, author.attr("surname"), author.attr("initials")) {
          Some(person) => Entity::Person(person),
          None => continue,
        }
      },
      (None, Some(name)) => names::contributor_entity(name),
    };
    let role = match author.attr("role") {
      Some("editor") => "editor",
      _ => "author",
    };
    contributors.push(Contributor { entity, role: vec![Role::new(role)] });
  }
  contributors
}

/// `front/date` attributes at whatever precision the source provides.
fn parse_date(root: &Element) -> Option<BibliographicDate> {
  let date = root.at("front/date")?;
  let year = date.attr("year")?;
  let mut on = year.to_string();
  if let Some(month) = date.attr("month").and_then(month_number) {
    on.push_str(&format!("-{month:02}"));
    if let Some(day) = date.attr("day") {
      on.push_str(&format!("-{:02}", day.parse::<u32>().unwrap_or(1)));
    }
  }
  Some(BibliographicDate::published(on))
}

/// Abstract paragraphs (`<t>` in BibXML) re-wrapped as HTML.
fn parse_abstract(root: &Element) -> Vec<FormattedString> {
  root
    .all("front/abstract")
    .iter()
    .map(|abstract_el| {
      let paragraphs = abstract_el.children_named("t");
      let content = if paragraphs.is_empty() {
        format!("<p>{}</p>", abstract_el.text())
      } else {
        paragraphs.iter().map(|p| format!("<p>{}</p>", p.text())).collect()
      };
      FormattedString::html(content)
    })
    .collect()
}

/// Dispatches `seriesInfo` entries: DOI entries become identifiers, `stream`
/// and `status` attributes feed the extension block, everything else is a
/// series membership.
fn parse_series_info(root: &Element, version: Option<&str>, item: &mut IetfBibliographicItem) {
  let mut infos = root.all("seriesInfo");
  infos.extend(root.all("front/seriesInfo"));

  for info in infos {
    if let Some(stream) = info.attr("stream") {
      item.ext.set_stream(stream);
    }
    if let Some(status) = info.attr("status") {
      item.status = Some(DocumentStatus { stage: status.to_string() });
    }
    let (Some(name), Some(value)) = (info.attr("name"), info.attr("value")) else { continue };

    match name {
      "DOI" => item.docid.push(DocumentIdentifier::new("DOI", value)),
      "Internet-Draft" => {
        let value = apply_version(value, version);
        item.docid.push(DocumentIdentifier::new("Internet-Draft", value.clone()));
        item.series.push(Series {
          series_type: None,
          title:       name.to_string(),
          number:      Some(value),
        });
      },
      _ => {
        if pubid_type(&format!("{name} {value}")) == "RFC" {
          item.docid.push(DocumentIdentifier::new("RFC", format!("{name} {value}")));
        }
        item.series.push(Series {
          series_type: None,
          title:       name.to_string(),
          number:      Some(value.to_string()),
        });
      },
    }
  }
}

/// `format` elements as typed download links, with the requested draft
/// revision substituted into each target.
fn parse_formats(root: &Element, version: Option<&str>, item: &mut IetfBibliographicItem) {
  for format in root.children_named("format") {
    let Some(target) = format.attr("target") else { continue };
    let uri_type = format.attr("type").map(str::to_lowercase).unwrap_or_else(|| "src".to_string());
    item.link.push(TypedUri { uri_type, content: apply_version(target, version) });
  }
}

/// Rewrites a trailing `-NN` revision segment to the requested revision.
fn apply_version(target: &str, version: Option<&str>) -> String {
  match version {
    Some(ver) => TARGET_VERSION.replace(target, format!("-{ver}$ext")).into_owned(),
    None => target.to_string(),
  }
}
