//! End-to-end resolution workflows against stub fetchers.
//!
//! These tests drive the full pipeline (normalize, index lookup, fetch,
//! extract, render) with canned index snapshots and document bodies, so
//! they exercise exactly what a live lookup does minus the network.

use std::{collections::HashMap, io::Write, sync::Arc};

use async_trait::async_trait;
use ietfbib::{
  bibliography::IetfBibliography,
  client::{Page, PageFetcher},
  error::{IetfBibError, Result},
  index::{IndexCache, IndexFamily},
  item::RelationTarget,
};
use tempfile::TempDir;

/// Fetcher serving canned bodies by URL; everything else is a 404.
#[derive(Default)]
struct StubFetcher {
  pages: HashMap<String, Vec<u8>>,
}

impl StubFetcher {
  fn with_page(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
    self.pages.insert(url.into(), body.into());
    self
  }
}

#[async_trait]
impl PageFetcher for StubFetcher {
  async fn get(&self, url: &str) -> Result<Page> {
    match self.pages.get(url) {
      Some(body) => Ok(Page { status: 200, body: body.clone() }),
      None => Ok(Page { status: 404, body: Vec::new() }),
    }
  }
}

/// Fetcher that reaches a closed local port, producing a genuine transport
/// error.
struct BrokenFetcher;

#[async_trait]
impl PageFetcher for BrokenFetcher {
  async fn get(&self, _url: &str) -> Result<Page> {
    let err = reqwest::get("http://127.0.0.1:9/unreachable").await.expect_err("port 9 is closed");
    Err(IetfBibError::Network(err))
  }
}

/// Zips an index YAML the way the hosted snapshots are packaged.
fn snapshot_zip(yaml: &str) -> Vec<u8> {
  let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
  writer
    .start_file("index-v1.yaml", zip::write::SimpleFileOptions::default())
    .expect("start zip entry");
  writer.write_all(yaml.as_bytes()).expect("write zip entry");
  writer.finish().expect("finish zip").into_inner()
}

/// Resolver over a temp cache directory and the given fetcher.
fn bibliography(cache_dir: &TempDir, fetcher: impl PageFetcher + 'static) -> IetfBibliography {
  IetfBibliography::new(IndexCache::new(cache_dir.path()), Arc::new(fetcher))
}

const BCP47_YAML: &str = "doctype: rfc\ndocid:\n- type: IETF\n  id: BCP 47\n  primary: true\n";

#[tokio::test]
async fn bcp47_resolves_end_to_end() {
  let cache = TempDir::new().unwrap();
  let rss = IndexFamily::Rss;
  let fetcher = StubFetcher::default()
    .with_page(rss.snapshot_url(), snapshot_zip("- key: BCP.47\n  file: data/bcp47.yaml\n"))
    .with_page(format!("{}data/bcp47.yaml", rss.base_url()), BCP47_YAML);

  let bib = bibliography(&cache, fetcher);
  let item = bib.get("BCP 47").await.unwrap().expect("BCP 47 resolves");

  assert_eq!(item.primary_docid().unwrap().id, "BCP 47");
  assert_eq!(item.ext.doctype.as_deref(), Some("rfc"));
  assert!(item.fetched.is_some(), "resolved records are stamped");

  let xml = item.to_xml().unwrap();
  assert!(xml.contains(r#"<docidentifier type="IETF" primary="true">BCP 47</docidentifier>"#));
  assert!(xml.contains("<doctype>rfc</doctype>"), "got: {xml}");
  assert!(xml.contains("<ext schema-version="));
}

#[tokio::test]
async fn unregistered_key_is_not_fatal() {
  let cache = TempDir::new().unwrap();
  let rss = IndexFamily::Rss;
  let fetcher = StubFetcher::default()
    .with_page(rss.snapshot_url(), snapshot_zip("- key: BCP.47\n  file: data/bcp47.yaml\n"));

  let bib = bibliography(&cache, fetcher);
  assert!(bib.search("BCP 48").await.unwrap().is_none());
}

#[tokio::test]
async fn unrecognized_family_is_not_fatal() {
  let cache = TempDir::new().unwrap();
  let bib = bibliography(&cache, StubFetcher::default());
  // No fetch happens at all; the stub would 404 the snapshot otherwise.
  assert!(bib.search("CN 8341").await.unwrap().is_none());
  assert!(bib.search("ISO 9000").await.unwrap().is_none());
}

#[tokio::test]
async fn draft_revision_is_applied_to_links() {
  let cache = TempDir::new().unwrap();
  let ids = IndexFamily::Ids;
  let reference_xml = r#"
    <reference anchor="I-D.abarth-cake">
      <front>
        <title>Simple HTTP State Management Mechanism</title>
        <author initials="A." surname="Barth" fullname="Adam Barth"/>
        <date month="March" year="2010"/>
      </front>
      <seriesInfo name="Internet-Draft" value="draft-abarth-cake-00"/>
      <format type="TXT" target="https://www.ietf.org/archive/id/draft-abarth-cake-00.txt"/>
    </reference>"#;
  let fetcher = StubFetcher::default()
    .with_page(
      ids.snapshot_url(),
      snapshot_zip("- key: draft-abarth-cake\n  file: data/draft-abarth-cake.xml\n"),
    )
    .with_page(format!("{}data/draft-abarth-cake.xml", ids.base_url()), reference_xml);

  let bib = bibliography(&cache, fetcher);
  let item = bib.get("I-D.draft-abarth-cake-02").await.unwrap().expect("draft resolves");

  assert_eq!(item.docid_of_type("Internet-Draft").unwrap().id, "draft-abarth-cake-02");
  let txt = item.link.iter().find(|link| link.uri_type == "txt").unwrap();
  assert_eq!(txt.content, "https://www.ietf.org/archive/id/draft-abarth-cake-02.txt");
}

#[tokio::test]
async fn confirmed_hit_with_missing_document_is_a_request_error() {
  let cache = TempDir::new().unwrap();
  let rfc = IndexFamily::Rfc;
  // The index says RFC 8341 exists, but the document fetch 404s.
  let fetcher = StubFetcher::default()
    .with_page(rfc.snapshot_url(), snapshot_zip("- key: RFC.8341\n  file: data/RFC8341.yaml\n"));

  let bib = bibliography(&cache, fetcher);
  let err = bib.search("RFC 8341").await.expect_err("a confirmed hit must fetch");
  match err {
    IetfBibError::Request { reference } => assert_eq!(reference, "RFC 8341"),
    other => panic!("expected a request error, got {other:?}"),
  }
}

#[tokio::test]
async fn transport_errors_translate_to_request_errors() {
  let cache = TempDir::new().unwrap();
  // Seed the decompressed index so only the document fetch hits the network.
  std::fs::write(
    cache.path().join("rfc-index-v1.yaml"),
    "- key: RFC.8341\n  file: data/RFC8341.yaml\n",
  )
  .unwrap();

  let bib = bibliography(&cache, BrokenFetcher);
  let err = bib.search("RFC 8341").await.expect_err("transport failure surfaces");
  match err {
    IetfBibError::Request { reference } => assert_eq!(reference, "RFC 8341"),
    other => panic!("transport errors must not leak, got {other:?}"),
  }
}

#[tokio::test]
async fn snapshot_is_cached_across_resolvers() {
  let cache = TempDir::new().unwrap();
  let rss = IndexFamily::Rss;
  let fetcher = StubFetcher::default()
    .with_page(rss.snapshot_url(), snapshot_zip("- key: BCP.47\n  file: data/bcp47.yaml\n"))
    .with_page(format!("{}data/bcp47.yaml", rss.base_url()), BCP47_YAML);
  let bib = bibliography(&cache, fetcher);
  assert!(bib.get("BCP 47").await.unwrap().is_some());

  // A second resolver over the same cache dir never fetches the snapshot:
  // its stub only serves the document.
  let fetcher =
    StubFetcher::default().with_page(format!("{}data/bcp47.yaml", rss.base_url()), BCP47_YAML);
  let bib = bibliography(&cache, fetcher);
  assert!(bib.get("BCP 47").await.unwrap().is_some());
}

#[tokio::test]
async fn refresh_refetches_the_snapshot() {
  let cache = TempDir::new().unwrap();
  std::fs::write(cache.path().join("rss-index-v1.yaml"), "- key: BCP.1\n  file: stale.yaml\n")
    .unwrap();

  let rss = IndexFamily::Rss;
  let fetcher = StubFetcher::default()
    .with_page(rss.snapshot_url(), snapshot_zip("- key: BCP.47\n  file: data/bcp47.yaml\n"));
  let cache_client = IndexCache::new(cache.path());
  let index = cache_client.refresh(rss, &fetcher).await.unwrap();

  assert!(index.search("BCP.1").is_none(), "stale entries are gone");
  assert!(index.search("BCP.47").is_some());
}

#[tokio::test]
async fn relation_stubs_resolve_explicitly() {
  let cache = TempDir::new().unwrap();
  let rfc = IndexFamily::Rfc;
  let rfc1574_yaml = "docid:\n- type: IETF\n  id: RFC 1574\n  primary: true\ntitle:\n- type: main\n  content: Essential Tools\n";
  let fetcher = StubFetcher::default()
    .with_page(rfc.snapshot_url(), snapshot_zip("- key: RFC.1574\n  file: data/RFC1574.yaml\n"))
    .with_page(format!("{}data/RFC1574.yaml", rfc.base_url()), rfc1574_yaml);
  let bib = bibliography(&cache, fetcher);

  let stub = ietfbib::item::Relation::stub(ietfbib::item::RelationType::ObsoletedBy, "RFC1574");
  let resolved = bib.resolve_relation(&stub.bibitem).await.unwrap().expect("stub resolves");
  assert_eq!(resolved.title[0].content, "Essential Tools");

  // Already-resolved targets come back without any fetch.
  let target = RelationTarget::Resolved(Box::new(resolved.clone()));
  let again = bib.resolve_relation(&target).await.unwrap().unwrap();
  assert_eq!(again, resolved);
}
