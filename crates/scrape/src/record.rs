use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::extract::ExtractedFields;

// ── Stock ────────────────────────────────────────────────────────────────────

/// Availability after normalization: the parenthesized unit count when the
/// raw text carried one, otherwise the raw availability text unchanged.
///
/// Serializes untagged, so a record's stock cell is a JSON number or string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Stock {
    Count(u32),
    Text(String),
}

impl std::fmt::Display for Stock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

// ── ProductRecord ────────────────────────────────────────────────────────────

/// One processed result for a single input URL.
///
/// `product_id` is the zero-based input row index, assigned at creation and
/// never mutated.  Every fetched field starts `None`; `None` after the run
/// means "not found or fetch failed".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    pub product_id: usize,
    pub url: String,
    pub title: Option<String>,
    pub price: Option<String>,
    pub description: Option<String>,
    pub product_type: Option<String>,
    pub stock: Option<Stock>,
    /// Kept as the raw string; never coerced to an integer.
    pub review_count: Option<String>,
}

impl ProductRecord {
    pub fn new(product_id: usize, url: impl Into<String>) -> Self {
        Self {
            product_id,
            url: url.into(),
            title: None,
            price: None,
            description: None,
            product_type: None,
            stock: None,
            review_count: None,
        }
    }

    /// Fill the fetched fields from one extraction pass.  The raw
    /// availability text lands as [`Stock::Text`] until normalization.
    pub fn apply(&mut self, fields: ExtractedFields) {
        self.title = fields.title;
        self.price = fields.price;
        self.description = fields.description;
        self.product_type = fields.product_type;
        self.stock = fields.availability.map(Stock::Text);
        self.review_count = fields.review_count;
    }

    /// A record is complete when every fetched/normalized field is populated.
    /// `product_id` and `url` are always present by construction.
    pub fn is_complete(&self) -> bool {
        self.title.is_some()
            && self.price.is_some()
            && self.description.is_some()
            && self.product_type.is_some()
            && self.stock.is_some()
            && self.review_count.is_some()
    }

    /// Names of the unpopulated fields, for logging.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.title.is_none() {
            missing.push("title");
        }
        if self.price.is_none() {
            missing.push("price");
        }
        if self.description.is_none() {
            missing.push("description");
        }
        if self.product_type.is_none() {
            missing.push("product_type");
        }
        if self.stock.is_none() {
            missing.push("stock");
        }
        if self.review_count.is_none() {
            missing.push("review_count");
        }
        missing
    }
}

// ── Fetch outcomes ───────────────────────────────────────────────────────────

/// Why a record's fetch produced no fields.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("http status {0}")]
    Http(u16),
    #[error("transport: {0}")]
    Transport(String),
    #[error("body decode: {0}")]
    Parse(String),
}

/// Per-record result of the fetch+extract step.  Failures are kept alongside
/// the record so the batch can count them instead of swallowing them; the
/// record itself still continues through normalization with blank fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Fetched,
    FetchFailed(FetchError),
}

impl FetchOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Fetched)
    }
}

// ── ScrapeBatch ──────────────────────────────────────────────────────────────

/// The ordered output of one pipeline run: records in input order, with the
/// fetch outcome for each at the same index.
#[derive(Debug, Clone, Default)]
pub struct ScrapeBatch {
    pub records: Vec<ProductRecord>,
    pub outcomes: Vec<FetchOutcome>,
}

impl ScrapeBatch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by its `product_id`.  Ids are the contiguous range
    /// `0..len`, so this is an index check, but the lookup scans to stay
    /// correct if callers ever filter the batch.
    pub fn record_by_id(&self, product_id: usize) -> Option<&ProductRecord> {
        self.records.iter().find(|r| r.product_id == product_id)
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_ok()).count()
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
