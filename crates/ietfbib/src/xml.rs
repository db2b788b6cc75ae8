//! Minimal element tree over `quick-xml` events.
//!
//! The extractors navigate source markup the way the upstream formats are
//! documented: by element path. Building a small owned tree keeps the
//! field-mapping code declarative instead of scattering state through an
//! event loop. Namespace prefixes are stripped on read; the RFC index and
//! BibXML corpora use namespaces inconsistently and all lookups here are by
//! local name.

use quick_xml::{events::Event, Reader};

use super::*;

/// An owned XML element: local name, attributes, and child nodes.
#[derive(Debug, Clone, Default)]
pub struct Element {
  /// Local (namespace-stripped) element name.
  pub name: String,
  /// Attribute name/value pairs in document order.
  attrs:    Vec<(String, String)>,
  /// Child nodes in document order.
  children: Vec<Node>,
}

/// A child of an [`Element`].
#[derive(Debug, Clone)]
enum Node {
  /// Nested element.
  Element(Element),
  /// Text or CDATA content.
  Text(String),
}

impl Element {
  /// Parses a document and returns its root element.
  ///
  /// # Errors
  ///
  /// Returns [`IetfBibError::MalformedSource`] when the document has no root
  /// element, and [`IetfBibError::Xml`] on syntax errors.
  pub fn parse(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    loop {
      match reader.read_event()? {
        Event::Start(start) => {
          stack.push(element_from_start(&start)?);
        },
        Event::Empty(start) => {
          let element = element_from_start(&start)?;
          match stack.last_mut() {
            Some(parent) => parent.children.push(Node::Element(element)),
            None => return Ok(element),
          }
        },
        Event::Text(text) => {
          let content = text.unescape()?.into_owned();
          if let (Some(parent), false) = (stack.last_mut(), content.is_empty()) {
            parent.children.push(Node::Text(content));
          }
        },
        Event::CData(data) => {
          let content = String::from_utf8_lossy(&data).into_owned();
          if let Some(parent) = stack.last_mut() {
            parent.children.push(Node::Text(content));
          }
        },
        Event::End(_) => {
          let Some(element) = stack.pop() else {
            return Err(IetfBibError::MalformedSource("unmatched closing tag".to_string()));
          };
          match stack.last_mut() {
            Some(parent) => parent.children.push(Node::Element(element)),
            None => return Ok(element),
          }
        },
        Event::Eof =>
          return Err(IetfBibError::MalformedSource("no root element in document".to_string())),
        _ => (),
      }
    }
  }

  /// Attribute value by local name.
  pub fn attr(&self, name: &str) -> Option<&str> {
    self.attrs.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
  }

  /// Child elements with the given local name, in document order.
  pub fn children_named(&self, name: &str) -> Vec<&Element> {
    self
      .children
      .iter()
      .filter_map(|node| match node {
        Node::Element(el) if el.name == name => Some(el),
        _ => None,
      })
      .collect()
  }

  /// First element at a `/`-separated path, e.g. `"front/title"`.
  pub fn at(&self, path: &str) -> Option<&Element> { self.all(path).into_iter().next() }

  /// All elements at a `/`-separated path, in document order.
  pub fn all(&self, path: &str) -> Vec<&Element> {
    let mut current = vec![self];
    for segment in path.split('/') {
      current = current.into_iter().flat_map(|el| el.children_named(segment)).collect();
    }
    current
  }

  /// Text content of the first element at a path, trimmed.
  pub fn text_at(&self, path: &str) -> Option<String> {
    self.at(path).map(Element::text).filter(|text| !text.is_empty())
  }

  /// Concatenated descendant text, whitespace-normalized at the joints.
  pub fn text(&self) -> String {
    let mut parts = Vec::new();
    self.collect_text(&mut parts);
    parts.join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
  }

  /// Depth-first text collection.
  fn collect_text(&self, parts: &mut Vec<String>) {
    for node in &self.children {
      match node {
        Node::Text(text) => parts.push(text.clone()),
        Node::Element(el) => el.collect_text(parts),
      }
    }
  }
}

/// Builds an [`Element`] shell from a start tag, stripping namespace
/// prefixes from the element and attribute names.
fn element_from_start(start: &quick_xml::events::BytesStart<'_>) -> Result<Element> {
  let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
  let mut attrs = Vec::new();
  for attr in start.attributes() {
    let attr = attr?;
    let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
    let value = attr.unescape_value()?.into_owned();
    attrs.push((key, value));
  }
  Ok(Element { name, attrs, children: Vec::new() })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_nested_elements() {
    let root = Element::parse(
      r#"<reference anchor="RFC1234"><front><title>A &amp; B</title></front></reference>"#,
    )
    .unwrap();
    assert_eq!(root.name, "reference");
    assert_eq!(root.attr("anchor"), Some("RFC1234"));
    assert_eq!(root.text_at("front/title").as_deref(), Some("A & B"));
  }

  #[test]
  fn strips_namespace_prefixes() {
    let root = Element::parse(
      r#"<idx:rfc-index xmlns:idx="http://example.com"><idx:rfc-entry/></idx:rfc-index>"#,
    )
    .unwrap();
    assert_eq!(root.name, "rfc-index");
    assert_eq!(root.all("rfc-entry").len(), 1);
  }

  #[test]
  fn empty_document_is_malformed() {
    assert!(matches!(Element::parse(""), Err(IetfBibError::MalformedSource(_))));
  }
}
