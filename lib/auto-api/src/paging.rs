//! Cursor helpers for the listing and change-feed responses.
//!
//! Both endpoints describe where to continue in a `meta` object:
//! `meta.next_page` for offers and `meta.next_change_id` for changes.
//! Numbers and numeric strings are accepted; anything else means there is
//! nothing more to fetch.

use serde_json::Value;

/// Page to request after this offers response, if any.
#[must_use]
pub fn next_page(response: &Value) -> Option<u32> {
    response
        .pointer("/meta/next_page")
        .and_then(as_i64)
        .and_then(|page| u32::try_from(page).ok())
        .filter(|page| *page > 0)
}

/// `change_id` to request after this changes response, if any.
#[must_use]
pub fn next_change_id(response: &Value) -> Option<i64> {
    response.pointer("/meta/next_change_id").and_then(as_i64)
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
