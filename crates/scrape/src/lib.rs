//! The scrape pipeline: read a URL column, fetch each product page, extract
//! structured fields, and normalize them into [`ProductRecord`]s.

mod extract;
mod fetch;
mod input;
mod normalize;
mod record;

pub use extract::{ExtractedFields, extract_fields};
pub use fetch::{HttpPageSource, PageSource, Scraper};
pub use input::read_urls;
pub use normalize::{clean_price, normalize};
pub use record::{FetchError, FetchOutcome, ProductRecord, ScrapeBatch, Stock};
