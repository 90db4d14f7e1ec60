//! Structural field extraction from one product page.
//!
//! The extractor depends on the page shape, not full-text search: an `h1`
//! for the title, a `price_color`-classed element for the price, a
//! `#product_description` marker whose following `p` sibling holds the
//! description, and label/value table rows for the remaining fields.

use scraper::{Html, Selector};

/// Raw fields pulled from one document, pre-normalization.  Absent elements
/// yield `None`; extraction itself never fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub title: Option<String>,
    pub price: Option<String>,
    pub description: Option<String>,
    pub product_type: Option<String>,
    pub availability: Option<String>,
    pub review_count: Option<String>,
}

pub fn extract_fields(html: &str) -> ExtractedFields {
    let doc = Html::parse_document(html);

    let h1_sel = Selector::parse("h1").unwrap();
    let price_sel = Selector::parse(".price_color").unwrap();
    let desc_marker_sel = Selector::parse("#product_description + p").unwrap();
    let row_sel = Selector::parse("tr").unwrap();
    let th_sel = Selector::parse("th").unwrap();
    let td_sel = Selector::parse("td").unwrap();

    let mut fields = ExtractedFields {
        title: doc.select(&h1_sel).next().map(|el| element_text(&el)),
        price: doc.select(&price_sel).next().map(|el| element_text(&el)),
        description: doc.select(&desc_marker_sel).next().map(|el| element_text(&el)),
        ..Default::default()
    };

    // Label/value rows: first `th` is the label, first `td` the value.
    for row in doc.select(&row_sel) {
        let Some(label) = row.select(&th_sel).next() else {
            continue;
        };
        let Some(value) = row.select(&td_sel).next() else {
            continue;
        };
        let label = element_text(&label);
        let value = element_text(&value);
        match label.as_str() {
            "Product Type" => fields.product_type = Some(value),
            "Availability" => fields.availability = Some(value),
            "Number of reviews" => fields.review_count = Some(value),
            _ => {}
        }
    }

    fields
}

fn element_text(el: &scraper::ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

// ── Tests ────────────────────────────────────────────────────────────────────
