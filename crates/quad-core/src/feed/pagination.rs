//! Cursor pagination assembly.
//!
//! Callers fetch `limit + 1` rows newest first, strictly older than the
//! cursor, and hand them here. The extra row is a look-ahead that decides
//! `has_more`; it is never returned. `next_cursor` is the `created_at` of
//! the last row on the page and stays set even on the final page, so
//! `has_more` is the stop signal, not the cursor.

/// Page size applied when the caller does not ask for one.
pub const DEFAULT_PAGE_LIMIT: u64 = 30;

/// Largest page size a caller may request.
pub const MAX_PAGE_LIMIT: u64 = 100;

/// One page of a descending time-ordered walk.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

/// Normalizes a requested page size. Absent or zero falls back to the
/// default; oversized requests are capped.
pub fn clamp_limit(requested: Option<u64>) -> u64 {
    match requested {
        None | Some(0) => DEFAULT_PAGE_LIMIT,
        Some(n) => n.min(MAX_PAGE_LIMIT),
    }
}

/// Assembles a page from a `limit + 1` fetch. `cursor_of` extracts a row's
/// `created_at`, which becomes the next request's exclusive upper bound.
pub fn paginate<T, F>(mut rows: Vec<T>, limit: u64, cursor_of: F) -> Page<T>
where
    F: Fn(&T) -> i64,
{
    let limit = limit as usize;
    let has_more = rows.len() > limit;
    rows.truncate(limit);
    let next_cursor = rows.last().map(|row| cursor_of(row).to_string());

    Page {
        items: rows,
        next_cursor,
        has_more,
    }
}
