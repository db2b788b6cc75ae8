//! The page-fetcher boundary between the resolution pipeline and the network.
//!
//! Everything the pipeline knows about HTTP lives behind the [`PageFetcher`]
//! trait: a `GET` that yields a status code and a body. The production
//! implementation is [`HttpFetcher`]; tests inject stub fetchers serving
//! canned bodies.
//!
//! Only a 200 response is success. Transport-level failures (timeout,
//! connection reset, DNS, protocol errors) surface from this layer as
//! [`IetfBibError::Network`] and are translated by the resolution layer into
//! the uniform [`IetfBibError::Request`] carrying the reference text, so no
//! transport-specific error type ever leaks through the lookup API.

use std::time::Duration;

use super::*;

/// Bounded timeout applied to every fetch. One attempt per fetch, no retry;
/// callers wrap with their own retry policy if they need one.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// An HTTP response reduced to what the pipeline consumes.
#[derive(Debug, Clone)]
pub struct Page {
  /// HTTP status code.
  pub status: u16,
  /// Raw response body.
  pub body:   Vec<u8>,
}

impl Page {
  /// The body, but only for a 200 response; any other status is "document
  /// not found".
  pub fn ok_body(self) -> Option<Vec<u8>> { (self.status == 200).then_some(self.body) }
}

/// Performs the actual network GET for index snapshots and document files.
///
/// Implementations must be cheap to share; the resolver holds one behind an
/// [`Arc`] and issues sequential requests through it.
#[async_trait]
pub trait PageFetcher: Send + Sync {
  /// Fetches a URL, returning the status code and body.
  ///
  /// # Errors
  ///
  /// Returns [`IetfBibError::Network`] for transport-level failures. Non-200
  /// statuses are NOT errors at this layer; they are returned in [`Page`] so
  /// the caller decides whether a miss is fatal.
  async fn get(&self, url: &str) -> Result<Page>;
}

/// Production [`PageFetcher`] backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
  /// Shared connection pool.
  client: reqwest::Client,
}

impl HttpFetcher {
  /// Creates a fetcher with the bounded default timeout.
  pub fn new() -> Self {
    let client = reqwest::Client::builder()
      .timeout(FETCH_TIMEOUT)
      .build()
      .expect("default TLS backend is available");
    Self { client }
  }
}

impl Default for HttpFetcher {
  fn default() -> Self { Self::new() }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
  async fn get(&self, url: &str) -> Result<Page> {
    debug!("fetching: {url}");
    let response = self.client.get(url).send().await?;
    let status = response.status().as_u16();
    let body = response.bytes().await?.to_vec();
    Ok(Page { status, body })
  }
}
