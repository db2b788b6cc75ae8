//! BibXML renderer.
//!
//! Renders a record as a BibXML `<reference>` (or `<referencegroup>` for
//! records with `includes` relations), applying the two IETF-specific
//! overrides of the generic rendering rules:
//!
//! - the `<date>` element is suppressed entirely when any document
//!   identifier has type `IANA`, since IANA-sourced records carry no
//!   reliable publication date;
//! - the `<author>` element of an organization named exactly
//!   `"RFC Publisher"` is suppressed, since that role is implicit in the
//!   RFC series for BibXML consumers.

use quick_xml::{
  events::{BytesEnd, BytesStart, BytesText, Event},
  Writer,
};

use super::*;

/// XML writer over an in-memory buffer.
type XmlWriter = Writer<Vec<u8>>;

/// Renders a record as a BibXML document, keywords omitted.
pub fn render(item: &IetfBibliographicItem) -> Result<String> {
  render_opts(item, false)
}

/// Renders a record as a BibXML document, optionally with keywords.
pub fn render_opts(item: &IetfBibliographicItem, include_keywords: bool) -> Result<String> {
  let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
  if item.relation.iter().any(|rel| rel.rel_type == RelationType::Includes) {
    render_group(&mut writer, item, include_keywords)?;
  } else {
    render_reference(&mut writer, item, include_keywords)?;
  }
  let bytes = writer.into_inner();
  Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// `<referencegroup>` wrapping the resolved member references.
fn render_group(
  writer: &mut XmlWriter,
  item: &IetfBibliographicItem,
  include_keywords: bool,
) -> Result<()> {
  let anchor = anchor(item);
  let mut element = BytesStart::new("referencegroup");
  element.push_attribute(("anchor", anchor.as_str()));
  if let Some(target) = src_link(item) {
    element.push_attribute(("target", target));
  }
  writer.write_event(Event::Start(element))?;

  for relation in &item.relation {
    if relation.rel_type != RelationType::Includes {
      continue;
    }
    if let RelationTarget::Resolved(member) = &relation.bibitem {
      render_reference(writer, member, include_keywords)?;
    }
  }
  writer.write_event(Event::End(BytesEnd::new("referencegroup")))?;
  Ok(())
}

/// One `<reference>` element.
fn render_reference(
  writer: &mut XmlWriter,
  item: &IetfBibliographicItem,
  include_keywords: bool,
) -> Result<()> {
  let anchor = anchor(item);
  let mut element = BytesStart::new("reference");
  element.push_attribute(("anchor", anchor.as_str()));
  if let Some(target) = src_link(item) {
    element.push_attribute(("target", target));
  }
  writer.write_event(Event::Start(element))?;

  writer.write_event(Event::Start(BytesStart::new("front")))?;
  for title in &item.title {
    text_element(writer, "title", &[], &title.content)?;
  }
  render_authors(writer, item)?;
  render_date(writer, item)?;
  render_abstract(writer, item)?;
  if include_keywords {
    for keyword in &item.keyword {
      text_element(writer, "keyword", &[], keyword)?;
    }
  }
  writer.write_event(Event::End(BytesEnd::new("front")))?;

  render_series_info(writer, item)?;
  for link in &item.link {
    if link.uri_type == "src" {
      continue;
    }
    let mut format = BytesStart::new("format");
    format.push_attribute(("type", link.uri_type.to_uppercase().as_str()));
    format.push_attribute(("target", link.content.as_str()));
    writer.write_event(Event::Empty(format))?;
  }

  writer.write_event(Event::End(BytesEnd::new("reference")))?;
  Ok(())
}

/// Reference anchor: the anchor-scoped identifier when present, otherwise
/// the primary identifier with its internal space removed.
fn anchor(item: &IetfBibliographicItem) -> String {
  if let Some(docid) = item.docid.iter().find(|docid| docid.scope.as_deref() == Some("anchor")) {
    return docid.id.clone();
  }
  match item.primary_docid() {
    Some(docid) => docid.id.replace(' ', ""),
    None => String::new(),
  }
}

/// The record's landing-page link.
fn src_link(item: &IetfBibliographicItem) -> Option<&str> {
  item.link.iter().find(|link| link.uri_type == "src").map(|link| link.content.as_str())
}

/// Authors, minus the suppressed "RFC Publisher" organization.
fn render_authors(writer: &mut XmlWriter, item: &IetfBibliographicItem) -> Result<()> {
  for contributor in &item.contributor {
    if contributor.entity.is_organization_named("RFC Publisher") {
      continue;
    }

    let mut author = BytesStart::new("author");
    if contributor.role.iter().any(|role| role.role_type == "editor") {
      author.push_attribute(("role", "editor"));
    }
    match &contributor.entity {
      Entity::Person(person) => {
        if let Some(completename) = &person.name.completename {
          author.push_attribute(("fullname", completename.as_str()));
        }
        if let Some(initials) = &person.name.initials {
          author.push_attribute(("initials", initials.as_str()));
        }
        if let Some(surname) = &person.name.surname {
          author.push_attribute(("surname", surname.as_str()));
        }
        writer.write_event(Event::Empty(author))?;
      },
      Entity::Organization(org) => {
        writer.write_event(Event::Start(author))?;
        let mut organization = BytesStart::new("organization");
        if let Some(abbreviation) = &org.abbreviation {
          organization.push_attribute(("abbrev", abbreviation.as_str()));
        }
        writer.write_event(Event::Start(organization))?;
        writer.write_event(Event::Text(BytesText::new(&org.name)))?;
        writer.write_event(Event::End(BytesEnd::new("organization")))?;
        writer.write_event(Event::End(BytesEnd::new("author")))?;
      },
    }
  }
  Ok(())
}

/// The publication date, suppressed entirely for IANA-identified records.
fn render_date(writer: &mut XmlWriter, item: &IetfBibliographicItem) -> Result<()> {
  if item.docid.iter().any(|docid| docid.id_type == "IANA") {
    return Ok(());
  }
  let Some(date) = item.date.iter().find(|date| date.date_type == "published") else {
    return Ok(());
  };

  let mut parts = date.on.splitn(3, '-');
  let year = parts.next().unwrap_or_default().to_string();
  let month = parts.next().and_then(|m| m.parse::<u32>().ok()).and_then(month_name);
  let day = parts.next();

  let mut element = BytesStart::new("date");
  element.push_attribute(("year", year.as_str()));
  if let Some(month) = month {
    element.push_attribute(("month", month));
  }
  if let Some(day) = day {
    element.push_attribute(("day", day.trim_start_matches('0')));
  }
  writer.write_event(Event::Empty(element))?;
  Ok(())
}

/// The abstract, re-split into `<t>` paragraphs.
fn render_abstract(writer: &mut XmlWriter, item: &IetfBibliographicItem) -> Result<()> {
  let Some(abstract_text) = item.abstracts.first() else { return Ok(()) };
  writer.write_event(Event::Start(BytesStart::new("abstract")))?;
  for paragraph in paragraphs(&abstract_text.content) {
    text_element(writer, "t", &[], &paragraph)?;
  }
  writer.write_event(Event::End(BytesEnd::new("abstract")))?;
  Ok(())
}

/// Splits stored `<p>`-wrapped HTML back into plain paragraphs.
fn paragraphs(content: &str) -> Vec<String> {
  let split: Vec<String> = content
    .split("<p>")
    .filter_map(|part| {
      let text = part.trim_end_matches("</p>").trim();
      (!text.is_empty()).then(|| text.to_string())
    })
    .collect();
  if split.is_empty() && !content.trim().is_empty() {
    vec![content.trim().to_string()]
  } else {
    split
  }
}

/// `seriesInfo` entries derived from the series-bearing identifiers.
fn render_series_info(writer: &mut XmlWriter, item: &IetfBibliographicItem) -> Result<()> {
  for docid in &item.docid {
    let (name, value) = match docid.id_type.as_str() {
      "DOI" => ("DOI".to_string(), docid.id.clone()),
      "Internet-Draft" => ("Internet-Draft".to_string(), docid.id.clone()),
      "RFC" | "IETF" => match docid.id.split_once(' ') {
        Some((name, value)) => (name.to_string(), value.to_string()),
        None => continue,
      },
      _ => continue,
    };
    let mut element = BytesStart::new("seriesInfo");
    element.push_attribute(("name", name.as_str()));
    element.push_attribute(("value", value.as_str()));
    writer.write_event(Event::Empty(element))?;
  }
  Ok(())
}

/// Writes `<name attrs>text</name>` with escaped text content.
fn text_element(
  writer: &mut XmlWriter,
  name: &str,
  attrs: &[(&str, &str)],
  text: &str,
) -> Result<()> {
  let mut element = BytesStart::new(name);
  for (key, value) in attrs {
    element.push_attribute((*key, *value));
  }
  writer.write_event(Event::Start(element))?;
  writer.write_event(Event::Text(BytesText::new(text)))?;
  writer.write_event(Event::End(BytesEnd::new(name)))?;
  Ok(())
}
