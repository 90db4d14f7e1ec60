//! Post-extraction cleanup of the stock and price fields.

use std::sync::OnceLock;

use regex::Regex;

use crate::record::{ProductRecord, Stock};

/// Parenthesized unit count inside the availability text,
/// e.g. `"In stock (12 available)"`.
fn stock_count_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\((\d+)\savailable\)").unwrap())
}

/// Rewrite the stock and price fields in place.  Each field's cleanup is
/// independent: a miss on one never blocks the other, and a field that
/// doesn't match its pattern is left untouched.
pub fn normalize(record: &mut ProductRecord) {
    let counted = match &record.stock {
        Some(Stock::Text(raw)) => stock_count_re()
            .captures(raw)
            .and_then(|caps| caps[1].parse::<u32>().ok()),
        _ => None,
    };
    if let Some(count) = counted {
        record.stock = Some(Stock::Count(count));
    }

    if let Some(price) = &record.price {
        record.price = Some(clean_price(price));
    }
}

/// Strip the mis-encoded `Â` artifact and the `£` symbol, then trim.
/// No currency conversion happens; the value stays a string.
pub fn clean_price(raw: &str) -> String {
    raw.replace('Â', "").replace('£', "").trim().to_string()
}

// ── Tests ────────────────────────────────────────────────────────────────────
