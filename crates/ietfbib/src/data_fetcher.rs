//! Batch corpus export.
//!
//! [`DataFetcher`] iterates a document source (the RFC master index for
//! published RFCs and sub-series, or a local BibXML mirror for
//! Internet-Drafts) and writes one rendered file per resolved document into
//! an output directory, plus an `index-v1.yaml` mapping lookup keys to the
//! written files.
//!
//! A batch never aborts on a single bad entry: malformed documents are
//! logged and skipped, and duplicate output paths are warned about and
//! overwritten. Writes to a given destination are sequential within a run.

use super::*;
use crate::{
  bibxml,
  index::IndexEntry,
  render::OutputFormat,
  rfc_index,
  xml::Element,
};

/// URL of the RFC master index.
const RFC_INDEX_URL: &str = "https://www.rfc-editor.org/rfc-index.xml";

lazy_static! {
  /// Characters replaced by `_` in output file names.
  static ref FILENAME_CHARS: Regex = Regex::new(r"[\s,:/]+").unwrap();
}

/// The document sources a batch run can export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
  /// `bcp-entry`/`fyi-entry`/`std-entry` elements of the master index.
  RfcSubseries,
  /// A local mirror of per-draft BibXML files.
  InternetDrafts,
  /// `rfc-entry` elements of the master index.
  RfcEntries,
}

impl FromStr for DataSource {
  type Err = IetfBibError;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "ietf-rfcsubseries" => Ok(DataSource::RfcSubseries),
      "ietf-internet-drafts" => Ok(DataSource::InternetDrafts),
      "ietf-rfc-entries" => Ok(DataSource::RfcEntries),
      other => Err(IetfBibError::MalformedSource(format!("unknown source `{other}`"))),
    }
  }
}

impl Display for DataSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DataSource::RfcSubseries => write!(f, "ietf-rfcsubseries"),
      DataSource::InternetDrafts => write!(f, "ietf-internet-drafts"),
      DataSource::RfcEntries => write!(f, "ietf-rfc-entries"),
    }
  }
}

/// One batch export run.
pub struct DataFetcher {
  /// Source being exported.
  source:     DataSource,
  /// Output directory.
  output:     PathBuf,
  /// Rendering format for the written files.
  format:     OutputFormat,
  /// Network boundary for the master index fetch.
  fetcher:    Arc<dyn PageFetcher>,
  /// Directory holding the local Internet-Draft BibXML mirror.
  drafts_dir: PathBuf,
  /// Output paths written so far, for collision detection.
  files:      Vec<PathBuf>,
  /// Index entries accumulated for `index-v1.yaml`.
  entries:    Vec<IndexEntry>,
}

impl DataFetcher {
  /// Batch run over the HTTP fetcher.
  pub fn new(source: DataSource, output: impl Into<PathBuf>, format: OutputFormat) -> Self {
    Self::with_fetcher(source, output, format, Arc::new(HttpFetcher::new()))
  }

  /// Batch run over an explicit fetcher (stubbed in tests).
  pub fn with_fetcher(
    source: DataSource,
    output: impl Into<PathBuf>,
    format: OutputFormat,
    fetcher: Arc<dyn PageFetcher>,
  ) -> Self {
    Self {
      source,
      output: output.into(),
      format,
      fetcher,
      drafts_dir: PathBuf::from("bibxml-ids"),
      files: Vec::new(),
      entries: Vec::new(),
    }
  }

  /// Overrides the local Internet-Draft mirror directory.
  pub fn with_drafts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.drafts_dir = dir.into();
    self
  }

  /// Runs the export: one file per resolved document, then the index file.
  ///
  /// # Errors
  ///
  /// Fails only on environment-level problems (unreachable master index,
  /// unwritable output directory). Per-document failures are logged and
  /// skipped.
  pub async fn fetch(mut self) -> Result<()> {
    info!("fetching {} into {}", self.source, self.output.display());
    std::fs::create_dir_all(&self.output)?;

    match self.source {
      DataSource::RfcSubseries => self.fetch_subseries().await?,
      DataSource::RfcEntries => self.fetch_rfc_entries().await?,
      DataSource::InternetDrafts => self.fetch_internet_drafts()?,
    }

    self.write_index()?;
    info!("done: {} documents", self.files.len());
    Ok(())
  }

  /// Exports the sub-series groupings of the master index.
  async fn fetch_subseries(&mut self) -> Result<()> {
    let index = self.master_index().await?;
    for name in ["bcp-entry", "fyi-entry", "std-entry"] {
      let entries: Vec<IetfBibliographicItem> =
        index.all(name).into_iter().filter_map(rfc_index::parse_subseries).collect();
      for item in entries {
        self.save_doc(&item)?;
      }
    }
    Ok(())
  }

  /// Exports the full RFC entries of the master index.
  async fn fetch_rfc_entries(&mut self) -> Result<()> {
    let index = self.master_index().await?;
    let items: Vec<IetfBibliographicItem> = index
      .all("rfc-entry")
      .into_iter()
      .filter_map(|entry| match rfc_index::parse_entry(entry) {
        Ok(item) => Some(item),
        Err(err) => {
          warn!("skipping rfc-entry: {err}");
          None
        },
      })
      .collect();
    for item in items {
      self.save_doc(&item)?;
    }
    Ok(())
  }

  /// Exports a local directory of per-draft BibXML files.
  fn fetch_internet_drafts(&mut self) -> Result<()> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(&self.drafts_dir)?
      .filter_map(|entry| entry.ok())
      .map(|entry| entry.path())
      .filter(|path| path.extension().is_some_and(|ext| ext == "xml"))
      .collect();
    paths.sort();

    for path in paths {
      let xml = std::fs::read_to_string(&path)?;
      match bibxml::parse(&xml, None, false) {
        Ok(item) => self.save_doc(&item)?,
        Err(err) => warn!("skipping {}: {err}", path.display()),
      }
    }
    Ok(())
  }

  /// Fetches and parses the RFC master index.
  async fn master_index(&self) -> Result<Element> {
    let page = self
      .fetcher
      .get(RFC_INDEX_URL)
      .await
      .map_err(|err| err.for_reference(RFC_INDEX_URL))?;
    let body = page
      .ok_body()
      .ok_or_else(|| IetfBibError::Request { reference: RFC_INDEX_URL.to_string() })?;
    Element::parse(&String::from_utf8_lossy(&body))
  }

  /// Renders one record and writes it, warning on file-name collisions.
  fn save_doc(&mut self, item: &IetfBibliographicItem) -> Result<()> {
    let content = self.format.render(item)?;
    let file = self.file_name(item);
    if self.files.contains(&file) {
      warn!(
        "File {} already exists. Document: {}",
        file.display(),
        item.docnumber.as_deref().unwrap_or_default()
      );
    } else {
      self.files.push(file.clone());
      self.entries.push(IndexEntry {
        key:  self.index_key(item),
        file: file.file_name().unwrap_or_default().to_string_lossy().into_owned(),
      });
    }
    std::fs::write(&file, content)?;
    Ok(())
  }

  /// Lookup key of a record, matching the resolver's canonical keys.
  fn index_key(&self, item: &IetfBibliographicItem) -> String {
    if self.source == DataSource::InternetDrafts {
      if let Some(docid) = item.docid_of_type("Internet-Draft") {
        return docid.id.to_lowercase();
      }
    }
    item.primary_docid().map(|docid| docid.id.replace(' ', ".")).unwrap_or_default()
  }

  /// Output path of a record: drafts keep their lowercase draft name,
  /// everything else gets its uppercase identifier, unsafe characters
  /// replaced with `_`.
  fn file_name(&self, item: &IetfBibliographicItem) -> PathBuf {
    let id = match self.source {
      DataSource::InternetDrafts => item
        .docid_of_type("Internet-Draft")
        .map(|docid| docid.id.to_lowercase())
        .or_else(|| item.docnumber.clone())
        .unwrap_or_default(),
      _ => item
        .docnumber
        .clone()
        .or_else(|| item.primary_docid().map(|docid| docid.id.clone()))
        .unwrap_or_default()
        .to_uppercase(),
    };
    let name = FILENAME_CHARS.replace_all(&id, "_");
    self.output.join(format!("{name}.{}", self.format.extension()))
  }

  /// Atomically writes the accumulated index entries.
  fn write_index(&self) -> Result<()> {
    let path = self.output.join("index-v1.yaml");
    let temp = path.with_extension("yaml.tmp");
    std::fs::write(&temp, serde_yaml::to_string(&self.entries)?)?;
    std::fs::rename(&temp, &path)?;
    Ok(())
  }
}
