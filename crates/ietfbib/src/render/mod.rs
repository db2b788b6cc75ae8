//! Serializers: bibdata XML, YAML, and BibXML.
//!
//! Output formats form a closed dispatch: adding a format means adding a
//! variant here and its renderer module, not string-matching at call sites.

use super::*;

pub mod bibxml;
pub mod xml;

/// The supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
  /// Bibdata XML.
  Xml,
  /// YAML mapping mirroring the record's field names.
  Yaml,
  /// BibXML `<reference>` document.
  BibXml,
}

impl OutputFormat {
  /// Renders one record in this format.
  pub fn render(&self, item: &IetfBibliographicItem) -> Result<String> {
    match self {
      OutputFormat::Xml => item.to_xml(),
      OutputFormat::Yaml => item.to_yaml(),
      OutputFormat::BibXml => item.to_bibxml(),
    }
  }

  /// File extension of documents rendered in this format.
  pub fn extension(&self) -> &'static str {
    match self {
      OutputFormat::Xml | OutputFormat::BibXml => "xml",
      OutputFormat::Yaml => "yaml",
    }
  }
}

impl FromStr for OutputFormat {
  type Err = IetfBibError;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "xml" => Ok(OutputFormat::Xml),
      "yaml" => Ok(OutputFormat::Yaml),
      "bibxml" => Ok(OutputFormat::BibXml),
      other => Err(IetfBibError::MalformedSource(format!("unknown output format `{other}`"))),
    }
  }
}

impl Display for OutputFormat {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      OutputFormat::Xml => write!(f, "xml"),
      OutputFormat::Yaml => write!(f, "yaml"),
      OutputFormat::BibXml => write!(f, "bibxml"),
    }
  }
}
