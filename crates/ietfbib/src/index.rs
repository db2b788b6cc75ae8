//! Remote index snapshots: fetch, cache, and key lookup.
//!
//! Each document family is backed by a versioned index snapshot, a zip
//! archive containing an `index-v1.yaml` mapping canonical lookup keys to
//! data-file paths, hosted alongside the document corpus. The snapshot is
//! fetched once per process, decompressed, parsed, and cached to local disk
//! so later runs skip the fetch until an explicit [`IndexCache::refresh`].
//!
//! Lookups are idempotent: the same key normalization is applied to snapshot
//! keys at load time and to query keys at search time, so `RFC.8341` and a
//! snapshot entry stored as `RFC.08341` can never drift apart. A missing key
//! is an empty result, never an error.

use std::io::Read;

use tokio::sync::Mutex;

use super::*;

/// Root of the hosted document corpora, one repository per index family.
const DATA_ROOT: &str = "https://raw.githubusercontent.com/relaton/relaton-data-";

/// File name of the versioned index inside each snapshot archive.
const INDEX_FILE: &str = "index-v1.yaml";

lazy_static! {
  /// `FAMILY.NUMBER` lookup keys, e.g. `RFC.8341`.
  static ref FAMILY_KEY: Regex = Regex::new(r"^([A-Z]+)\.0*(\d+)$").unwrap();
}

/// A document family's remote index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexFamily {
  /// Published RFCs.
  Rfc,
  /// The BCP/FYI/STD sub-series.
  Rss,
  /// Internet-Drafts.
  Ids,
}

impl IndexFamily {
  /// Corpus repository name for this family.
  fn repository(&self) -> &'static str {
    match self {
      IndexFamily::Rfc => "rfcs",
      IndexFamily::Rss => "rfcsubseries",
      IndexFamily::Ids => "ids",
    }
  }

  /// URL of the zipped index snapshot.
  pub fn snapshot_url(&self) -> String {
    format!("{DATA_ROOT}{}/main/index-v1.zip", self.repository())
  }

  /// Base URL that entry file paths are relative to.
  pub fn base_url(&self) -> String { format!("{DATA_ROOT}{}/main/", self.repository()) }

  /// Local cache file name for the decompressed index.
  fn cache_file(&self) -> &'static str {
    match self {
      IndexFamily::Rfc => "rfc-index-v1.yaml",
      IndexFamily::Rss => "rss-index-v1.yaml",
      IndexFamily::Ids => "ids-index-v1.yaml",
    }
  }
}

impl Display for IndexFamily {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      IndexFamily::Rfc => write!(f, "RFC"),
      IndexFamily::Rss => write!(f, "RSS"),
      IndexFamily::Ids => write!(f, "IDS"),
    }
  }
}

/// One index row: a normalized lookup key and the corpus-relative path of
/// the document's data file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
  /// Canonical lookup key, e.g. `RFC.8341` or `draft-abarth-cake`.
  pub key:  String,
  /// Data file path relative to the family's base URL.
  pub file: String,
}

/// An in-memory index for one family.
#[derive(Debug)]
pub struct Index {
  /// Family this index serves.
  pub family: IndexFamily,
  /// Entries in snapshot order.
  entries:    Vec<IndexEntry>,
  /// Normalized key → position of the first entry with that key. Ties are
  /// broken by snapshot order, which keeps lookups deterministic.
  by_key:     HashMap<String, usize>,
}

impl Index {
  /// Builds an index over parsed snapshot entries, normalizing keys once at
  /// load time.
  fn new(family: IndexFamily, entries: Vec<IndexEntry>) -> Self {
    let mut by_key = HashMap::with_capacity(entries.len());
    for (position, entry) in entries.iter().enumerate() {
      by_key.entry(Self::normalize_key(&entry.key)).or_insert(position);
    }
    Self { family, entries, by_key }
  }

  /// Number of entries.
  pub fn len(&self) -> usize { self.entries.len() }

  /// Whether the index has no entries.
  pub fn is_empty(&self) -> bool { self.entries.is_empty() }

  /// Exact-match lookup after normalization. A missing key is `None`, not
  /// an error.
  pub fn search(&self, key: &str) -> Option<&IndexEntry> {
    self.by_key.get(&Self::normalize_key(key)).map(|&position| &self.entries[position])
  }

  /// Canonicalizes a lookup key.
  ///
  /// `FAMILY.NUMBER` keys get their number zero-padded to 4 digits; draft
  /// names are lowercased. The padding strips existing leading zeros first,
  /// so normalizing an already-normalized key is a no-op and double padding
  /// cannot occur.
  pub fn normalize_key(key: &str) -> String {
    let key = key.trim();
    match FAMILY_KEY.captures(key) {
      Some(cap) => format!("{}.{:0>4}", &cap[1], &cap[2]),
      None => key.to_lowercase(),
    }
  }
}

/// Local, shared cache of per-family indices.
///
/// The cache directory is injected at construction (tests point it at a temp
/// directory); in-memory indices are memoized per family for the life of the
/// process. Disk writes go to a temp path followed by a rename, so
/// concurrent readers never observe a partial snapshot.
#[derive(Debug)]
pub struct IndexCache {
  /// Directory holding the decompressed per-family index files.
  dir:    PathBuf,
  /// Memoized in-memory indices.
  loaded: Mutex<HashMap<IndexFamily, Arc<Index>>>,
}

impl IndexCache {
  /// Cache rooted at the given directory.
  pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into(), loaded: Mutex::default() } }

  /// Cache rooted at the platform cache directory
  /// (`~/.cache/ietfbib` on Linux).
  pub fn with_default_dir() -> Self {
    Self::new(dirs::cache_dir().unwrap_or_else(|| PathBuf::from(".")).join("ietfbib"))
  }

  /// Returns the family's index, loading it from disk or fetching the
  /// remote snapshot on first use.
  ///
  /// # Errors
  ///
  /// Returns [`IetfBibError::Request`] when the snapshot fetch fails, a
  /// retryable condition for the caller.
  pub async fn find_or_create(
    &self,
    family: IndexFamily,
    fetcher: &dyn PageFetcher,
  ) -> Result<Arc<Index>> {
    let mut loaded = self.loaded.lock().await;
    if let Some(index) = loaded.get(&family) {
      return Ok(Arc::clone(index));
    }

    let path = self.dir.join(family.cache_file());
    let yaml = match std::fs::read_to_string(&path) {
      Ok(yaml) => yaml,
      Err(_) => self.fetch_snapshot(family, fetcher).await?,
    };
    let entries: Vec<IndexEntry> = serde_yaml::from_str(&yaml)?;

    let index = Arc::new(Index::new(family, entries));
    loaded.insert(family, Arc::clone(&index));
    Ok(index)
  }

  /// Discards the memoized and on-disk copy of the family's index and
  /// re-fetches the snapshot.
  pub async fn refresh(
    &self,
    family: IndexFamily,
    fetcher: &dyn PageFetcher,
  ) -> Result<Arc<Index>> {
    self.loaded.lock().await.remove(&family);
    let _ = std::fs::remove_file(self.dir.join(family.cache_file()));
    self.find_or_create(family, fetcher).await
  }

  /// Fetches, decompresses, and caches the family's index snapshot.
  async fn fetch_snapshot(&self, family: IndexFamily, fetcher: &dyn PageFetcher) -> Result<String> {
    let url = family.snapshot_url();
    let page = fetcher.get(&url).await.map_err(|err| err.for_reference(&url))?;
    let body = page.ok_body().ok_or_else(|| IetfBibError::Request { reference: url.clone() })?;
    let yaml = unzip_index(&body)?;
    self.store(family, &yaml)?;
    Ok(yaml)
  }

  /// Atomically writes the decompressed index to its cache file.
  fn store(&self, family: IndexFamily, yaml: &str) -> Result<()> {
    std::fs::create_dir_all(&self.dir)?;
    let path = self.dir.join(family.cache_file());
    let temp = path.with_extension("yaml.tmp");
    std::fs::write(&temp, yaml)?;
    std::fs::rename(&temp, &path)?;
    debug!("cached {family} index at {}", path.display());
    Ok(())
  }
}

/// Extracts the index YAML from a snapshot zip archive. Falls back to the
/// first archive member when the expected name is absent.
fn unzip_index(body: &[u8]) -> Result<String> {
  let mut archive = zip::ZipArchive::new(std::io::Cursor::new(body))?;
  let has_index = archive.file_names().any(|name| name == INDEX_FILE);
  let mut file = if has_index { archive.by_name(INDEX_FILE)? } else { archive.by_index(0)? };
  let mut yaml = String::new();
  file.read_to_string(&mut yaml)?;
  Ok(yaml)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn key_normalization_pads_once() {
    assert_eq!(Index::normalize_key("RFC.8341"), "RFC.8341");
    assert_eq!(Index::normalize_key("BCP.47"), "BCP.0047");
    assert_eq!(Index::normalize_key("BCP.0047"), "BCP.0047");
    // Normalizing twice never pads twice.
    assert_eq!(Index::normalize_key(&Index::normalize_key("RFC.139")), "RFC.0139");
    assert_eq!(Index::normalize_key("draft-Abarth-Cake"), "draft-abarth-cake");
  }

  #[test]
  fn search_normalizes_both_sides() {
    let index = Index::new(
      IndexFamily::Rss,
      vec![
        IndexEntry { key: "BCP.47".to_string(), file: "data/BCP47.yaml".to_string() },
        IndexEntry { key: "STD.0003".to_string(), file: "data/STD3.yaml".to_string() },
      ],
    );
    assert_eq!(index.search("BCP.0047").unwrap().file, "data/BCP47.yaml");
    assert_eq!(index.search("BCP.47").unwrap().file, "data/BCP47.yaml");
    assert_eq!(index.search("STD.3").unwrap().file, "data/STD3.yaml");
    assert_eq!(index.search("BCP.48"), None);
  }

  #[test]
  fn duplicate_keys_resolve_deterministically() {
    let index = Index::new(
      IndexFamily::Rfc,
      vec![
        IndexEntry { key: "RFC.1".to_string(), file: "data/RFC1-a.yaml".to_string() },
        IndexEntry { key: "RFC.0001".to_string(), file: "data/RFC1-b.yaml".to_string() },
      ],
    );
    assert_eq!(index.search("RFC.1").unwrap().file, "data/RFC1-a.yaml");
  }
}
