//! Page fetching and the sequential batch runner.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use prodsift_config::ScrapeConfig;

use crate::extract::extract_fields;
use crate::input::read_urls;
use crate::normalize::normalize;
use crate::record::{FetchError, FetchOutcome, ProductRecord, ScrapeBatch};

// ── PageSource ───────────────────────────────────────────────────────────────

/// The fetch seam: anything that can turn a URL into an HTML body.  The
/// batch runner only talks to this trait, so tests can swap the network out.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// HTTP implementation: plain GET with a fixed per-request timeout.
pub struct HttpPageSource {
    client: reqwest::Client,
}

impl HttpPageSource {
    pub fn new(config: &ScrapeConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|err| FetchError::Parse(err.to_string()))
    }
}

// ── Scraper ──────────────────────────────────────────────────────────────────

/// Drives the whole pipeline: read the URL column, then fetch, extract, and
/// normalize one record per row, strictly in input order.
pub struct Scraper {
    source: Box<dyn PageSource>,
    url_column: String,
}

impl Scraper {
    pub fn new(config: &ScrapeConfig) -> anyhow::Result<Self> {
        Ok(Self {
            source: Box::new(HttpPageSource::new(config)?),
            url_column: config.url_column.clone(),
        })
    }

    /// Build a scraper over an arbitrary page source.  Used by tests; also
    /// the hook for replaying saved pages.
    pub fn with_source(source: Box<dyn PageSource>, url_column: impl Into<String>) -> Self {
        Self {
            source,
            url_column: url_column.into(),
        }
    }

    /// Run the pipeline over every URL in the input file.
    ///
    /// An unreadable input (missing file, wrong format, no URL column)
    /// yields an empty batch rather than an error.  Per-record failures are
    /// recorded in the batch outcomes and never stop the run, so the output
    /// length always equals the input row count.
    pub async fn run(&self, input: &Path) -> ScrapeBatch {
        let urls = match read_urls(input, &self.url_column) {
            Ok(urls) => urls,
            Err(err) => {
                warn!(?err, input = %input.display(), "could not read url column; yielding empty batch");
                return ScrapeBatch::default();
            }
        };

        info!(rows = urls.len(), input = %input.display(), "starting scrape batch");

        let mut batch = ScrapeBatch::default();
        for (index, url) in urls.iter().enumerate() {
            // One fetch at a time, awaited to completion before the next.
            let (record, outcome) = self.scrape_one(index, url).await;
            batch.records.push(record);
            batch.outcomes.push(outcome);
        }

        info!(
            total = batch.len(),
            failed = batch.failed_count(),
            "scrape batch complete"
        );
        batch
    }

    async fn scrape_one(&self, index: usize, url: &str) -> (ProductRecord, FetchOutcome) {
        let mut record = ProductRecord::new(index, url);

        let outcome = match self.source.fetch(url).await {
            Ok(body) => {
                record.apply(extract_fields(&body));
                debug!(product_id = index, url, missing = ?record.missing_fields(), "fetched");
                FetchOutcome::Fetched
            }
            Err(err) => {
                warn!(product_id = index, url, %err, "fetch failed; keeping blank fields");
                FetchOutcome::FetchFailed(err)
            }
        };

        // Normalization always runs, even over a blank record.
        normalize(&mut record);
        (record, outcome)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Stock;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    /// In-memory page source: a URL either maps to a body or to an error.
    struct FakeSource {
        pages: HashMap<String, Result<String, FetchError>>,
    }

    #[async_trait]
    impl PageSource for FakeSource {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.pages
                .get(url)
                .cloned()
                .unwrap_or_else(|| Err(FetchError::Transport("unknown url".to_string())))
        }
    }

    fn product_page(title: &str) -> String {
        format!(
            r#"<html><body>
              <h1>{title}</h1>
              <p class="price_color">Â£51.77</p>
              <div id="product_description"></div>
              <p>About {title}.</p>
              <table>
                <tr><th>Product Type</th><td>Books</td></tr>
                <tr><th>Availability</th><td>In stock (12 available)</td></tr>
                <tr><th>Number of reviews</th><td>7</td></tr>
              </table>
            </body></html>"#
        )
    }

    fn write_input(dir: &TempDir, urls: &[&str]) -> std::path::PathBuf {
        let path = dir.path().join("urls.csv");
        let mut contents = String::from("book_urls\n");
        for url in urls {
            contents.push_str(url);
            contents.push('\n');
        }
        fs::write(&path, contents).unwrap();
        path
    }

    fn scraper_with(pages: HashMap<String, Result<String, FetchError>>) -> Scraper {
        Scraper::with_source(Box::new(FakeSource { pages }), "book_urls")
    }

    #[tokio::test]
    async fn batch_produces_one_record_per_row_in_order() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, &["http://shop.test/a", "http://shop.test/b"]);

        let pages = HashMap::from([
            ("http://shop.test/a".to_string(), Ok(product_page("Alpha"))),
            ("http://shop.test/b".to_string(), Ok(product_page("Beta"))),
        ]);

        let batch = scraper_with(pages).run(&input).await;
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.records[0].product_id, 0);
        assert_eq!(batch.records[1].product_id, 1);
        assert_eq!(batch.records[0].title.as_deref(), Some("Alpha"));
        assert_eq!(batch.records[1].title.as_deref(), Some("Beta"));
    }

    #[tokio::test]
    async fn fetched_records_are_normalized() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, &["http://shop.test/a"]);
        let pages = HashMap::from([("http://shop.test/a".to_string(), Ok(product_page("Alpha")))]);

        let batch = scraper_with(pages).run(&input).await;
        let record = &batch.records[0];
        assert_eq!(record.price.as_deref(), Some("51.77"));
        assert_eq!(record.stock, Some(Stock::Count(12)));
        assert!(record.is_complete());
    }

    #[tokio::test]
    async fn failed_fetch_keeps_blank_fields_and_batch_continues() {
        let dir = TempDir::new().unwrap();
        let input = write_input(
            &dir,
            &["http://shop.test/down", "http://shop.test/after"],
        );

        let pages = HashMap::from([
            (
                "http://shop.test/down".to_string(),
                Err(FetchError::Http(500)),
            ),
            ("http://shop.test/after".to_string(), Ok(product_page("After"))),
        ]);

        let batch = scraper_with(pages).run(&input).await;
        assert_eq!(batch.len(), 2);

        let failed = &batch.records[0];
        assert!(failed.title.is_none());
        assert!(failed.price.is_none());
        assert!(failed.description.is_none());
        assert!(failed.product_type.is_none());
        assert!(failed.stock.is_none());
        assert!(failed.review_count.is_none());
        assert_eq!(
            batch.outcomes[0],
            FetchOutcome::FetchFailed(FetchError::Http(500))
        );

        // The next URL was still processed.
        assert_eq!(batch.records[1].title.as_deref(), Some("After"));
        assert!(batch.outcomes[1].is_ok());
        assert_eq!(batch.failed_count(), 1);
    }

    #[tokio::test]
    async fn transport_error_is_recorded_like_a_timeout() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, &["http://shop.test/slow"]);
        let pages = HashMap::from([(
            "http://shop.test/slow".to_string(),
            Err(FetchError::Transport("operation timed out".to_string())),
        )]);

        let batch = scraper_with(pages).run(&input).await;
        assert_eq!(batch.len(), 1);
        assert!(!batch.outcomes[0].is_ok());
        assert!(batch.records[0].title.is_none());
    }

    #[tokio::test]
    async fn unreadable_input_yields_empty_batch() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.xlsx");

        let batch = scraper_with(HashMap::new()).run(&missing).await;
        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn input_without_url_column_yields_empty_batch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wrong.csv");
        fs::write(&path, "links\nhttp://shop.test/a\n").unwrap();

        let batch = scraper_with(HashMap::new()).run(&path).await;
        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn page_missing_elements_yields_partial_record() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, &["http://shop.test/sparse"]);
        let pages = HashMap::from([(
            "http://shop.test/sparse".to_string(),
            Ok("<html><h1>Sparse</h1></html>".to_string()),
        )]);

        let batch = scraper_with(pages).run(&input).await;
        let record = &batch.records[0];
        assert_eq!(record.title.as_deref(), Some("Sparse"));
        assert!(record.price.is_none());
        assert!(!record.is_complete());
        // Extraction succeeded even though most fields are absent.
        assert!(batch.outcomes[0].is_ok());
    }
}
