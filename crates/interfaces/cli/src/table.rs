//! Plain-text rendering of the record table, in the dashboard's column order.

use prodsift_scrape::ProductRecord;

const HEADERS: [&str; 7] = [
    "productID",
    "Title",
    "Price",
    "Description",
    "Product Type",
    "Stock",
    "Number of reviews",
];

/// Long cells (descriptions, mostly) are cut to keep rows on one line.
const MAX_CELL_WIDTH: usize = 40;

pub fn render(records: &[ProductRecord]) -> String {
    let rows: Vec<[String; 7]> = records.iter().map(row_cells).collect();

    let mut widths: [usize; 7] = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    render_row(&mut out, &HEADERS.map(str::to_string), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    render_row(&mut out, &rule, &widths);
    for row in &rows {
        render_row(&mut out, row.as_slice(), &widths);
    }
    out.pop(); // trailing newline
    out
}

fn row_cells(record: &ProductRecord) -> [String; 7] {
    [
        record.product_id.to_string(),
        cell(record.title.as_deref()),
        cell(record.price.as_deref()),
        cell(record.description.as_deref()),
        cell(record.product_type.as_deref()),
        record
            .stock
            .as_ref()
            .map(|s| truncate(&s.to_string()))
            .unwrap_or_else(|| "-".to_string()),
        cell(record.review_count.as_deref()),
    ]
}

/// Blank fields render as a dash so incomplete records stand out.
fn cell(value: Option<&str>) -> String {
    match value {
        Some(v) => truncate(v),
        None => "-".to_string(),
    }
}

fn truncate(value: &str) -> String {
    if value.chars().count() <= MAX_CELL_WIDTH {
        return value.to_string();
    }
    let cut: String = value.chars().take(MAX_CELL_WIDTH - 1).collect();
    format!("{cut}…")
}

fn render_row(out: &mut String, cells: &[String], widths: &[usize; 7]) {
    for (i, (cell, width)) in cells.iter().zip(widths.iter()).enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        out.push_str(cell);
        for _ in cell.chars().count()..*width {
            out.push(' ');
        }
    }
    // No trailing padding matters; rows end at the last cell.
    while out.ends_with(' ') {
        out.pop();
    }
    out.push('\n');
}

// ── Tests ────────────────────────────────────────────────────────────────────
