//! URL-column input reading.
//!
//! The input is a spreadsheet (xlsx/xls/ods) or a csv/tsv file whose header
//! row contains a column literally named after `url_column` (`book_urls` by
//! default); every non-empty cell below it is one URL.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use calamine::{Reader, open_workbook_auto};

/// Read the URL column from `path`.  Errors here (unreadable file, missing
/// column) are mapped to an empty batch by the caller; they never abort a
/// run.
pub fn read_urls(path: &Path, url_column: &str) -> Result<Vec<String>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => read_urls_delimited(path, url_column, b','),
        "tsv" => read_urls_delimited(path, url_column, b'\t'),
        _ => read_urls_workbook(path, url_column),
    }
}

fn read_urls_workbook(path: &Path, url_column: &str) -> Result<Vec<String>> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("failed to open workbook {}", path.display()))?;

    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| anyhow!("workbook has no sheets"))?;
    let range = workbook
        .worksheet_range(&sheet)
        .with_context(|| format!("failed to read sheet {sheet:?}"))?;

    let mut rows = range.rows();
    let header = rows.next().ok_or_else(|| anyhow!("sheet {sheet:?} is empty"))?;
    let column = header
        .iter()
        .position(|cell| cell.to_string().trim() == url_column)
        .ok_or_else(|| anyhow!("input has no {url_column:?} column"))?;

    let mut urls = Vec::new();
    for row in rows {
        if let Some(cell) = row.get(column) {
            let value = cell.to_string().trim().to_string();
            if !value.is_empty() {
                urls.push(value);
            }
        }
    }
    Ok(urls)
}

fn read_urls_delimited(path: &Path, url_column: &str, delimiter: u8) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let headers = reader.headers()?.clone();
    let column = headers
        .iter()
        .position(|h| h.trim() == url_column)
        .ok_or_else(|| anyhow!("input has no {url_column:?} column"))?;

    let mut urls = Vec::new();
    for result in reader.records() {
        let record = result?;
        if let Some(value) = record.get(column) {
            let value = value.trim();
            if !value.is_empty() {
                urls.push(value.to_string());
            }
        }
    }
    Ok(urls)
}

// ── Tests ────────────────────────────────────────────────────────────────────
