//! Extractors for the RFC master index (`rfc-index.xml`).
//!
//! Two entry shapes share the index: full `rfc-entry` elements describing
//! published RFCs, and the skeletal `bcp-entry`/`fyi-entry`/`std-entry`
//! elements describing sub-series groupings, which carry nothing beyond the
//! RFC numbers they aggregate. Both extract into
//! [`IetfBibliographicItem`]s.

use super::*;
use crate::{names, xml::Element};

lazy_static! {
  /// Series prefix and number of an `is-also` identifier, e.g. `BCP0026`.
  static ref SERIES_ID: Regex = Regex::new(r"^(?P<name>\D+)0*(?P<num>\d+)$").unwrap();
  /// Trailing decimal number of a document code.
  static ref TRAILING_NUM: Regex = Regex::new(r"0*(\d+)$").unwrap();
}

/// Parses one `rfc-entry` element into a full record.
///
/// # Errors
///
/// Returns [`IetfBibError::MalformedSource`] when the entry is missing its
/// `doc-id` or `title`; batch callers log and skip such entries.
pub fn parse_entry(doc: &Element) -> Result<IetfBibliographicItem> {
  let code = doc
    .text_at("doc-id")
    .ok_or_else(|| IetfBibError::MalformedSource("rfc-entry without doc-id".to_string()))?;
  let title = doc
    .text_at("title")
    .ok_or_else(|| IetfBibError::MalformedSource(format!("{code} has no title")))?;
  let docnum = short_number(&code);

  let mut item = IetfBibliographicItem {
    item_type: Some("standard".to_string()),
    docid: parse_docid(doc, &docnum),
    docnumber: Some(code),
    title: vec![TypedTitle::main(title)],
    link: vec![TypedUri::src(format!("https://www.rfc-editor.org/info/rfc{docnum}"))],
    date: parse_date(doc),
    contributor: parse_contributors(doc),
    abstracts: parse_abstract(doc),
    keyword: doc.all("keywords/kw").iter().map(|kw| kw.text()).collect(),
    language: vec!["en".to_string()],
    script: vec!["Latn".to_string()],
    status: doc.text_at("current-status").map(|stage| DocumentStatus { stage }),
    series: parse_series(doc, &docnum),
    relation: parse_relations(doc),
    ..Default::default()
  };

  item.ext.set_doctype("rfc");
  if let Some(stream) = doc.text_at("stream") {
    item.ext.set_stream(stream);
  }
  item.ext.editorialgroup = parse_editorialgroup(doc);
  Ok(item)
}

/// Parses one `bcp-entry`/`fyi-entry`/`std-entry` element.
///
/// Entries without a `doc-id` or without any `is-also` member carry no
/// citable content and are skipped (`None`).
pub fn parse_subseries(doc: &Element) -> Option<IetfBibliographicItem> {
  let doc_id = doc.text_at("doc-id")?;
  let members: Vec<String> = doc.all("is-also/doc-id").iter().map(|el| el.text()).collect();
  if members.is_empty() {
    return None;
  }

  let name = doc.name.split('-').next().unwrap_or_default().to_string();
  let shortnum = short_number(&doc_id);
  let pub_id = format!("{} {}", name.to_uppercase(), shortnum);
  let anchor = format!("{}{}", name.to_uppercase(), shortnum);

  let mut anchor_docid = DocumentIdentifier::new("IETF", anchor.clone());
  anchor_docid.scope = Some("anchor".to_string());

  Some(IetfBibliographicItem {
    item_type: Some("standard".to_string()),
    docid: vec![DocumentIdentifier::ietf_primary(pub_id), anchor_docid],
    docnumber: Some(doc_id),
    formattedref: Some(anchor),
    link: vec![TypedUri::src(format!("https://www.rfc-editor.org/info/{name}{shortnum}"))],
    language: vec!["en".to_string()],
    script: vec!["Latn".to_string()],
    relation: members
      .iter()
      .map(|member| Relation::stub(RelationType::Includes, member))
      .collect(),
    ..Default::default()
  })
}

/// Trailing number of a document code, leading zeros stripped:
/// `RFC0139` → `139`.
fn short_number(code: &str) -> String {
  TRAILING_NUM.captures(code).map(|cap| cap[1].to_string()).unwrap_or_default()
}

/// Primary `RFC N` identifier plus the DOI when the entry carries one.
fn parse_docid(doc: &Element, docnum: &str) -> Vec<DocumentIdentifier> {
  let mut ids = vec![DocumentIdentifier::ietf_primary(format!("RFC {docnum}"))];
  if let Some(doi) = doc.text_at("doi") {
    ids.push(DocumentIdentifier::new("DOI", doi));
  }
  ids
}

/// Publication dates at `YYYY-MM` precision; the index stores month names.
fn parse_date(doc: &Element) -> Vec<BibliographicDate> {
  doc
    .all("date")
    .iter()
    .filter_map(|date| {
      let year = date.text_at("year")?;
      let month = month_number(&date.text_at("month")?)?;
      Some(BibliographicDate::published(format!("{year}-{month:02}")))
    })
    .collect()
}

/// Authors (dispatched through the organization table and the person-name
/// heuristic) plus the fixed publisher/authorizer organizations.
fn parse_contributors(doc: &Element) -> Vec<Contributor> {
  let mut contributors: Vec<Contributor> = doc
    .all("author")
    .iter()
    .filter_map(|author| {
      let name = author.text_at("name")?;
      let role = author.text_at("title").map(|t| t.to_lowercase());
      Some(Contributor {
        entity: names::contributor_entity(&name),
        role:   vec![Role::new(role.as_deref().unwrap_or("author"))],
      })
    })
    .collect();

  contributors.push(Contributor::organization(Organization::new("RFC Publisher"), "publisher"));
  contributors.push(Contributor::organization(Organization::new("RFC Series"), "authorizer"));
  contributors
}

/// Abstract paragraphs re-wrapped as HTML.
fn parse_abstract(doc: &Element) -> Vec<FormattedString> {
  doc
    .all("abstract")
    .iter()
    .map(|abstract_el| {
      let content: String = abstract_el
        .children_named("p")
        .iter()
        .map(|p| format!("<p>{}</p>", p.text()))
        .collect();
      FormattedString::html(content)
    })
    .collect()
}

/// Sub-series memberships, the RFC series itself, and the stream series.
fn parse_series(doc: &Element, docnum: &str) -> Vec<Series> {
  let mut series: Vec<Series> = doc
    .all("is-also/doc-id")
    .iter()
    .filter_map(|member| {
      let member_text = member.text();
      let cap = SERIES_ID.captures(&member_text)?;
      Some(Series {
        series_type: None,
        title:       cap["name"].to_string(),
        number:      Some(cap["num"].to_string()),
      })
    })
    .collect();

  series.push(Series {
    series_type: None,
    title:       "RFC".to_string(),
    number:      Some(docnum.to_string()),
  });

  series.extend(doc.all("stream").iter().map(|stream| Series {
    series_type: Some("stream".to_string()),
    title:       stream.text(),
    number:      None,
  }));
  series
}

/// `updates` and `obsoleted-by` cross-references as lazy relation stubs.
fn parse_relations(doc: &Element) -> Vec<Relation> {
  let mut relations: Vec<Relation> = doc
    .all("obsoleted-by/doc-id")
    .iter()
    .map(|target| Relation::stub(RelationType::ObsoletedBy, &target.text()))
    .collect();
  relations.extend(
    doc
      .all("updates/doc-id")
      .iter()
      .map(|target| Relation::stub(RelationType::Updates, &target.text())),
  );
  relations
}

/// Working groups; the index uses a literal placeholder for RFCs published
/// outside any group.
fn parse_editorialgroup(doc: &Element) -> Vec<WorkGroup> {
  doc
    .all("wg_acronym")
    .iter()
    .map(|wg| wg.text())
    .filter(|acronym| acronym != "NON WORKING GROUP")
    .map(|name| WorkGroup { name })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  const RFC_ENTRY: &str = r#"
    <rfc-entry xmlns="http://www.rfc-editor.org/rfc-index">
      <doc-id>RFC0139</doc-id>
      <title>Echo function for ISO 8473</title>
      <author><name>R.A. Hagens</name></author>
      <date><month>January</month><year>1990</year></date>
      <keywords><kw>IPv6</kw><kw>OSI</kw><kw>echo</kw><kw>ping</kw></keywords>
      <abstract><p>This memo defines an echo function for the connection-less
        network layer protocol.</p></abstract>
      <obsoleted-by><doc-id>RFC1574</doc-id></obsoleted-by>
      <updates><doc-id>RFC0112</doc-id></updates>
      <is-also><doc-id>BCP0026</doc-id></is-also>
      <current-status>PROPOSED STANDARD</current-status>
      <stream>Legacy</stream>
      <doi>10.17487/RFC0139</doi>
      <wg_acronym>osigen</wg_acronym>
    </rfc-entry>"#;

  fn entry() -> IetfBibliographicItem {
    parse_entry(&Element::parse(RFC_ENTRY).unwrap()).unwrap()
  }

  #[test]
  fn extracts_identity() {
    let item = entry();
    assert_eq!(item.docnumber.as_deref(), Some("RFC0139"));
    assert_eq!(item.primary_docid().unwrap().id, "RFC 139");
    assert_eq!(item.docid_of_type("DOI").unwrap().id, "10.17487/RFC0139");
    assert_eq!(item.title[0].content, "Echo function for ISO 8473");
    assert_eq!(item.link[0].content, "https://www.rfc-editor.org/info/rfc139");
    assert_eq!(item.ext.doctype.as_deref(), Some("rfc"));
  }

  #[test]
  fn extracts_month_name_dates() {
    assert_eq!(entry().date[0].on, "1990-01");
  }

  #[test]
  fn dispatches_authors_and_appends_publishers() {
    let item = entry();
    assert_eq!(item.contributor.len(), 3);
    let Entity::Person(person) = &item.contributor[0].entity else {
      panic!("expected a person author");
    };
    assert_eq!(person.name.completename.as_deref(), Some("R.A. Hagens"));
    assert_eq!(person.name.surname.as_deref(), Some("Hagens"));
    assert_eq!(item.contributor[0].role[0].role_type, "author");

    assert!(item.contributor[1].entity.is_organization_named("RFC Publisher"));
    assert_eq!(item.contributor[1].role[0].role_type, "publisher");
    assert!(item.contributor[2].entity.is_organization_named("RFC Series"));
    assert_eq!(item.contributor[2].role[0].role_type, "authorizer");
  }

  #[test]
  fn organization_author_stays_organization() {
    let xml = r#"<rfc-entry><doc-id>RFC0008</doc-id><title>T</title>
      <author><name>IAB</name></author></rfc-entry>"#;
    let item = parse_entry(&Element::parse(xml).unwrap()).unwrap();
    let Entity::Organization(org) = &item.contributor[0].entity else {
      panic!("expected an organization author");
    };
    assert_eq!(org.name, "Internet Architecture Board");
  }

  #[test]
  fn builds_series_and_stream() {
    let item = entry();
    assert_eq!(item.series.len(), 3);
    assert_eq!(item.series[0].title, "BCP");
    assert_eq!(item.series[0].number.as_deref(), Some("26"));
    assert_eq!(item.series[1].title, "RFC");
    assert_eq!(item.series[1].number.as_deref(), Some("139"));
    assert_eq!(item.series[2].series_type.as_deref(), Some("stream"));
    assert_eq!(item.series[2].title, "Legacy");
    assert_eq!(item.ext.stream.as_deref(), Some("Legacy"));
  }

  #[test]
  fn cross_references_become_stubs() {
    let item = entry();
    assert_eq!(item.relation.len(), 2);
    assert_eq!(item.relation[0].rel_type, RelationType::ObsoletedBy);
    assert_eq!(item.relation[0].bibitem.formattedref(), Some("RFC1574"));
    assert_eq!(item.relation[0].bibitem.docid()[0].id, "RFC1574");
    assert!(item.relation[0].bibitem.docid()[0].primary);
    assert_eq!(item.relation[1].rel_type, RelationType::Updates);
    assert_eq!(item.relation[1].bibitem.formattedref(), Some("RFC0112"));
  }

  #[test]
  fn abstract_keywords_status() {
    let item = entry();
    assert_eq!(item.keyword, ["IPv6", "OSI", "echo", "ping"]);
    assert!(item.abstracts[0].content.starts_with("<p>This memo defines an echo function"));
    assert_eq!(item.abstracts[0].format.as_deref(), Some("text/html"));
    assert_eq!(item.status.as_ref().unwrap().stage, "PROPOSED STANDARD");
    assert_eq!(item.ext.editorialgroup[0].name, "osigen");
  }

  #[test]
  fn non_working_group_is_dropped() {
    let xml = r#"<rfc-entry><doc-id>RFC0009</doc-id><title>T</title>
      <wg_acronym>NON WORKING GROUP</wg_acronym></rfc-entry>"#;
    let item = parse_entry(&Element::parse(xml).unwrap()).unwrap();
    assert!(item.ext.editorialgroup.is_empty());
  }

  #[test]
  fn missing_doc_id_is_malformed() {
    let xml = "<rfc-entry><title>T</title></rfc-entry>";
    assert!(matches!(
      parse_entry(&Element::parse(xml).unwrap()),
      Err(IetfBibError::MalformedSource(_))
    ));
  }

  #[test]
  fn subseries_entry_extracts_members() {
    let xml = r#"
      <bcp-entry xmlns="http://www.rfc-editor.org/rfc-index">
        <doc-id>BCP0047</doc-id>
        <is-also><doc-id>RFC4646</doc-id><doc-id>RFC4647</doc-id></is-also>
      </bcp-entry>"#;
    let item = parse_subseries(&Element::parse(xml).unwrap()).unwrap();
    assert_eq!(item.primary_docid().unwrap().id, "BCP 47");
    assert_eq!(item.docid[1].scope.as_deref(), Some("anchor"));
    assert_eq!(item.docid[1].id, "BCP47");
    assert_eq!(item.formattedref.as_deref(), Some("BCP47"));
    assert_eq!(item.link[0].content, "https://www.rfc-editor.org/info/bcp47");
    assert_eq!(item.relation.len(), 2);
    assert_eq!(item.relation[0].rel_type, RelationType::Includes);
    assert_eq!(item.relation[0].bibitem.formattedref(), Some("RFC4646"));
  }

  #[test]
  fn subseries_without_members_is_skipped() {
    let xml = "<fyi-entry><doc-id>FYI0001</doc-id></fyi-entry>";
    assert!(parse_subseries(&Element::parse(xml).unwrap()).is_none());
  }
}
