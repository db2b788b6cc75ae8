//! The high-level resolution API.
//!
//! [`IetfBibliography`] wires the pipeline together: normalize the citation,
//! look the canonical key up in the family's index, fetch the data file, and
//! extract it into a record. The index cache and the page fetcher are
//! injected at construction so tests run against stubs.
//!
//! # Error policy
//!
//! The lenient profile is the only one: an unrecognized family prefix or an
//! unregistered key resolves to `Ok(None)` with a logged diagnostic, never
//! an error. [`IetfBibError::Request`] is reserved for confirmed-family
//! references whose fetch actually failed: the index hit said the document
//! exists, so a failed or non-200 fetch is a hard error carrying the
//! original reference text.
//!
//! # Examples
//!
//! ```no_run
//! use ietfbib::bibliography::IetfBibliography;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let bib = IetfBibliography::with_defaults();
//! if let Some(item) = bib.get("BCP 47").await? {
//!   println!("{}", item.to_xml()?);
//! }
//! # Ok(())
//! # }
//! ```

use super::*;
use crate::{
  bibxml,
  index::IndexCache,
  reference::CanonicalReference,
};

/// Resolves citation text into bibliographic records.
pub struct IetfBibliography {
  /// Per-family index snapshots, cached on disk and in memory.
  cache:   IndexCache,
  /// Network boundary; stubbed out in tests.
  fetcher: Arc<dyn PageFetcher>,
}

impl IetfBibliography {
  /// Resolver over an explicit cache and fetcher.
  pub fn new(cache: IndexCache, fetcher: Arc<dyn PageFetcher>) -> Self {
    Self { cache, fetcher }
  }

  /// Resolver over the platform cache directory and the HTTP fetcher.
  pub fn with_defaults() -> Self {
    Self::new(IndexCache::with_default_dir(), Arc::new(HttpFetcher::new()))
  }

  /// Access to the index cache, e.g. for an explicit
  /// [`refresh`](IndexCache::refresh).
  pub fn cache(&self) -> &IndexCache { &self.cache }

  /// Resolves a citation, returning `Ok(None)` when the reference is
  /// unrecognized, unregistered, or malformed at the source.
  ///
  /// # Errors
  ///
  /// Returns [`IetfBibError::Request`] when a confirmed-family fetch fails.
  pub async fn search(&self, text: &str) -> Result<Option<IetfBibliographicItem>> {
    let Some(reference) = CanonicalReference::parse(text) else {
      debug!("unrecognized reference: `{text}`");
      return Ok(None);
    };
    match self.resolve(&reference).await {
      Ok(item) => Ok(item),
      Err(IetfBibError::MalformedSource(message)) => {
        warn!("skipping `{text}`: {message}");
        Ok(None)
      },
      Err(err) => Err(err.for_reference(text)),
    }
  }

  /// [`search`](Self::search) with user-facing diagnostics, mirroring the
  /// lookup surface citation tooling drives.
  pub async fn get(&self, text: &str) -> Result<Option<IetfBibliographicItem>> {
    info!("({text}) Fetching from Relaton repository ...");
    let result = self.search(text).await?;
    match &result {
      Some(item) => {
        let id = item.primary_docid().map(|docid| docid.id.as_str()).unwrap_or_default();
        info!("({text}) Found: `{id}`");
      },
      None => info!("({text}) Not found."),
    }
    Ok(result)
  }

  /// Explicitly resolves a lazy relation target into a full record.
  ///
  /// Already-resolved targets are returned as-is; stubs go through the
  /// normal lookup. Resolution is never recursive: the returned record's
  /// own relations stay lazy, which keeps mutually referencing documents
  /// (A obsoletes B, B updates A) from fetching each other endlessly.
  pub async fn resolve_relation(
    &self,
    target: &RelationTarget,
  ) -> Result<Option<IetfBibliographicItem>> {
    match target {
      RelationTarget::Resolved(item) => Ok(Some((**item).clone())),
      RelationTarget::Stub(stub) => {
        let text = stub
          .docid
          .first()
          .map(|docid| docid.id.clone())
          .unwrap_or_else(|| stub.formattedref.clone());
        self.search(&text).await
      },
    }
  }

  /// Index lookup plus fetch plus extraction for a recognized reference.
  async fn resolve(
    &self,
    reference: &CanonicalReference,
  ) -> Result<Option<IetfBibliographicItem>> {
    let family = reference.family.index_family();
    let index = self.cache.find_or_create(family, self.fetcher.as_ref()).await?;

    let Some(entry) = index.search(&reference.lookup_key()) else {
      debug!("no index entry for `{}`", reference.lookup_key());
      return Ok(None);
    };

    let url = format!("{}{}", family.base_url(), entry.file);
    let page = self.fetcher.get(&url).await?;
    let Some(body) = page.ok_body() else {
      return Err(IetfBibError::Request { reference: reference.to_string() });
    };
    let body = String::from_utf8_lossy(&body);

    let item = if entry.file.ends_with(".yaml") || entry.file.ends_with(".yml") {
      let mut item = IetfBibliographicItem::from_yaml(&body)
        .map_err(|err| IetfBibError::MalformedSource(err.to_string()))?;
      item.stamp_fetched();
      item
    } else {
      bibxml::parse(&body, reference.version.as_deref(), false)?
    };
    Ok(Some(item))
  }
}
