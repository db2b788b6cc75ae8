//! Bibdata XML renderer.
//!
//! Renders a record as a `<bibdata>` document, or as an embedded `<bibitem>`
//! for relation targets. The IETF extension block renders last as `<ext>`
//! with a `schema-version` attribute, omitted on embedded records, which
//! also drop the `fetched` date.

use quick_xml::{
  events::{BytesEnd, BytesStart, BytesText, Event},
  Writer,
};

use super::*;

/// XML writer over an in-memory buffer.
type XmlWriter = Writer<Vec<u8>>;

/// Renders a record as bibdata XML (top-level) or a bibitem (embedded).
pub fn render(item: &IetfBibliographicItem, embedded: bool) -> Result<String> {
  let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
  render_into(&mut writer, item, embedded)?;
  let bytes = writer.into_inner();
  Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Writes one record into an existing writer.
fn render_into(writer: &mut XmlWriter, item: &IetfBibliographicItem, embedded: bool) -> Result<()> {
  let root = if embedded { "bibitem" } else { "bibdata" };
  start(writer, root, &[])?;

  if !embedded {
    if let Some(fetched) = &item.fetched {
      text_element(writer, "fetched", &[], &fetched.to_string())?;
    }
  }
  for title in &item.title {
    text_element(
      writer,
      "title",
      &[("type", &title.title_type), ("format", "text/plain")],
      &title.content,
    )?;
  }
  if let Some(formattedref) = &item.formattedref {
    text_element(writer, "formattedref", &[("format", "text/plain")], formattedref)?;
  }
  for link in &item.link {
    text_element(writer, "uri", &[("type", &link.uri_type)], &link.content)?;
  }
  for docid in &item.docid {
    render_docid(writer, docid)?;
  }
  if let Some(docnumber) = &item.docnumber {
    text_element(writer, "docnumber", &[], docnumber)?;
  }
  for date in &item.date {
    start(writer, "date", &[("type", &date.date_type)])?;
    text_element(writer, "on", &[], &date.on)?;
    end(writer, "date")?;
  }
  for contributor in &item.contributor {
    render_contributor(writer, contributor)?;
  }
  for language in &item.language {
    text_element(writer, "language", &[], language)?;
  }
  for script in &item.script {
    text_element(writer, "script", &[], script)?;
  }
  for abstract_text in &item.abstracts {
    render_abstract(writer, abstract_text)?;
  }
  if let Some(status) = &item.status {
    start(writer, "status", &[])?;
    text_element(writer, "stage", &[], &status.stage)?;
    end(writer, "status")?;
  }
  for relation in &item.relation {
    render_relation(writer, relation)?;
  }
  for series in &item.series {
    render_series(writer, series)?;
  }
  for keyword in &item.keyword {
    text_element(writer, "keyword", &[], keyword)?;
  }
  render_ext(writer, item, embedded)?;

  end(writer, root)
}

/// `<docidentifier>` with its type/scope/primary attributes.
fn render_docid(writer: &mut XmlWriter, docid: &DocumentIdentifier) -> Result<()> {
  let mut attrs: Vec<(&str, &str)> = vec![("type", &docid.id_type)];
  if let Some(scope) = &docid.scope {
    attrs.push(("scope", scope));
  }
  if docid.primary {
    attrs.push(("primary", "true"));
  }
  text_element(writer, "docidentifier", &attrs, &docid.id)
}

/// `<contributor>` with roles and the person/organization entity.
fn render_contributor(writer: &mut XmlWriter, contributor: &Contributor) -> Result<()> {
  start(writer, "contributor", &[])?;
  for role in &contributor.role {
    empty(writer, "role", &[("type", &role.role_type)])?;
  }
  match &contributor.entity {
    Entity::Organization(org) => render_organization(writer, org)?,
    Entity::Person(person) => render_person(writer, person)?,
  }
  end(writer, "contributor")
}

/// `<organization>` with its name and optional abbreviation.
fn render_organization(writer: &mut XmlWriter, org: &Organization) -> Result<()> {
  start(writer, "organization", &[])?;
  text_element(writer, "name", &[], &org.name)?;
  if let Some(abbreviation) = &org.abbreviation {
    text_element(writer, "abbreviation", &[], abbreviation)?;
  }
  end(writer, "organization")
}

/// `<person>` with either the complete name or its parsed parts.
fn render_person(writer: &mut XmlWriter, person: &Person) -> Result<()> {
  start(writer, "person", &[])?;
  start(writer, "name", &[])?;
  if let Some(completename) = &person.name.completename {
    text_element(writer, "completename", &[], completename)?;
  } else {
    for forename in &person.name.forename {
      match (&forename.content, &forename.initial) {
        (Some(content), _) => text_element(writer, "forename", &[], content)?,
        (None, Some(initial)) => empty(writer, "forename", &[("initial", initial)])?,
        (None, None) => (),
      }
    }
    if let Some(initials) = &person.name.initials {
      text_element(writer, "initials", &[], initials)?;
    }
    if let Some(surname) = &person.name.surname {
      text_element(writer, "surname", &[], surname)?;
    }
  }
  end(writer, "name")?;
  end(writer, "person")
}

/// `<abstract>`; HTML-formatted content is written through unescaped.
fn render_abstract(writer: &mut XmlWriter, abstract_text: &FormattedString) -> Result<()> {
  let mut attrs: Vec<(&str, &str)> = Vec::new();
  if let Some(format) = &abstract_text.format {
    attrs.push(("format", format));
  }
  if let Some(language) = &abstract_text.language {
    attrs.push(("language", language));
  }
  if let Some(script) = &abstract_text.script {
    attrs.push(("script", script));
  }
  start(writer, "abstract", &attrs)?;
  writer.write_event(Event::Text(BytesText::from_escaped(abstract_text.content.as_str())))?;
  end(writer, "abstract")
}

/// `<relation>` with its target as an embedded bibitem.
fn render_relation(writer: &mut XmlWriter, relation: &Relation) -> Result<()> {
  start(writer, "relation", &[("type", &relation.rel_type.to_string())])?;
  match &relation.bibitem {
    RelationTarget::Resolved(target) => render_into(writer, target, true)?,
    RelationTarget::Stub(stub) => {
      start(writer, "bibitem", &[])?;
      text_element(writer, "formattedref", &[("format", "text/plain")], &stub.formattedref)?;
      for docid in &stub.docid {
        render_docid(writer, docid)?;
      }
      end(writer, "bibitem")?;
    },
  }
  end(writer, "relation")
}

/// `<series>` with its typed title and number.
fn render_series(writer: &mut XmlWriter, series: &Series) -> Result<()> {
  let mut attrs: Vec<(&str, &str)> = Vec::new();
  if let Some(series_type) = &series.series_type {
    attrs.push(("type", series_type));
  }
  start(writer, "series", &attrs)?;
  text_element(writer, "title", &[("format", "text/plain")], &series.title)?;
  if let Some(number) = &series.number {
    text_element(writer, "number", &[], number)?;
  }
  end(writer, "series")
}

/// The `<ext>` block; top-level records carry the schema version attribute.
fn render_ext(writer: &mut XmlWriter, item: &IetfBibliographicItem, embedded: bool) -> Result<()> {
  let ext = &item.ext;
  if ext.is_empty() {
    return Ok(());
  }

  let schema = IetfBibliographicItem::ext_schema();
  let attrs: Vec<(&str, &str)> =
    if embedded { Vec::new() } else { vec![("schema-version", schema)] };
  start(writer, "ext", &attrs)?;

  if let Some(doctype) = &ext.doctype {
    text_element(writer, "doctype", &[], doctype)?;
  }
  if let Some(subdoctype) = &ext.subdoctype {
    text_element(writer, "subdoctype", &[], subdoctype)?;
  }
  if !ext.editorialgroup.is_empty() {
    start(writer, "editorialgroup", &[])?;
    for group in &ext.editorialgroup {
      start(writer, "committee", &[])?;
      text_element(writer, "name", &[], &group.name)?;
      end(writer, "committee")?;
    }
    end(writer, "editorialgroup")?;
  }
  if let Some(stream) = &ext.stream {
    text_element(writer, "stream", &[], stream)?;
  }
  if let Some(structured) = &ext.structuredidentifier {
    let mut attrs: Vec<(&str, &str)> = Vec::new();
    if let Some(id_type) = &structured.id_type {
      attrs.push(("type", id_type));
    }
    start(writer, "structuredidentifier", &attrs)?;
    for agency in &structured.agency {
      text_element(writer, "agency", &[], agency)?;
    }
    if let Some(docnumber) = &structured.docnumber {
      text_element(writer, "docnumber", &[], docnumber)?;
    }
    end(writer, "structuredidentifier")?;
  }
  end(writer, "ext")
}

/// Writes an opening tag with attributes.
fn start(writer: &mut XmlWriter, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
  let mut element = BytesStart::new(name);
  for (key, value) in attrs {
    element.push_attribute((*key, *value));
  }
  writer.write_event(Event::Start(element))?;
  Ok(())
}

/// Writes a self-closing tag with attributes.
fn empty(writer: &mut XmlWriter, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
  let mut element = BytesStart::new(name);
  for (key, value) in attrs {
    element.push_attribute((*key, *value));
  }
  writer.write_event(Event::Empty(element))?;
  Ok(())
}

/// Writes a closing tag.
fn end(writer: &mut XmlWriter, name: &str) -> Result<()> {
  writer.write_event(Event::End(BytesEnd::new(name)))?;
  Ok(())
}

/// Writes `<name attrs>text</name>` with escaped text content.
fn text_element(
  writer: &mut XmlWriter,
  name: &str,
  attrs: &[(&str, &str)],
  text: &str,
) -> Result<()> {
  start(writer, name, attrs)?;
  writer.write_event(Event::Text(BytesText::new(text)))?;
  end(writer, name)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn item() -> IetfBibliographicItem {
    let mut item = IetfBibliographicItem {
      docid: vec![DocumentIdentifier::ietf_primary("RFC 139")],
      docnumber: Some("RFC0139".to_string()),
      title: vec![TypedTitle::main("Echo function for ISO 8473")],
      date: vec![BibliographicDate::published("1990-01")],
      relation: vec![Relation::stub(RelationType::ObsoletedBy, "RFC1574")],
      ..Default::default()
    };
    item.ext.set_doctype("rfc");
    item.ext.set_stream("Legacy");
    item
  }

  #[test]
  fn bibdata_document_shape() {
    let xml = render(&item(), false).unwrap();
    assert!(xml.starts_with("<bibdata>"), "got: {xml}");
    assert!(xml.contains(r#"<docidentifier type="IETF" primary="true">RFC 139</docidentifier>"#));
    assert!(xml.contains("<on>1990-01</on>"));
    assert!(xml.contains("<doctype>rfc</doctype>"));
    assert!(xml.contains("<stream>Legacy</stream>"));
    assert!(xml.ends_with("</bibdata>"));
  }

  #[test]
  fn schema_version_only_on_top_level_ext() {
    let top = render(&item(), false).unwrap();
    let schema = IetfBibliographicItem::ext_schema();
    assert!(top.contains(&format!(r#"<ext schema-version="{schema}">"#)));

    let embedded = render(&item(), true).unwrap();
    assert!(embedded.starts_with("<bibitem>"));
    assert!(embedded.contains("<ext>"));
    assert!(!embedded.contains("schema-version"));
  }

  #[test]
  fn stub_relations_render_as_bibitems() {
    let xml = render(&item(), false).unwrap();
    assert!(xml.contains(r#"<relation type="obsoletedBy">"#));
    assert!(xml.contains(r#"<formattedref format="text/plain">RFC1574</formattedref>"#));
  }

  #[test]
  fn text_content_is_escaped_but_abstract_markup_is_not() {
    let mut subject = item();
    subject.title = vec![TypedTitle::main("Profile for <use> & abuse")];
    subject.abstracts = vec![FormattedString::html("<p>Already &amp; marked up.</p>")];
    let xml = render(&subject, false).unwrap();
    assert!(xml.contains("Profile for &lt;use&gt; &amp; abuse"));
    assert!(xml.contains("<p>Already &amp; marked up.</p>"));
  }
}
