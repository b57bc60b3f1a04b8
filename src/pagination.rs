//! Limit/offset pagination with resource-specific extra links.
//!
//! The envelope is `{count, next_url, previous_url, <extra>, results}`. The
//! extra links are computed from the list's own ancestor path, so they are
//! present even for an empty page.

use serde::{Deserialize, Serialize};

// ---

/// Raw `?limit=&offset=` query. Unparsable values fall back to defaults.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    limit: Option<String>,
    offset: Option<String>,
}

/// Resolved window into an ordered collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl PageParams {
    pub fn resolve(&self, default_limit: u32) -> Page {
        // ---
        let limit = self
            .limit
            .as_deref()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(i64::from(default_limit));
        let offset = self
            .offset
            .as_deref()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|v| *v >= 0)
            .unwrap_or(0);
        Page { limit, offset }
    }
}

impl Page {
    /// Link to the following page, if any rows remain after this one.
    pub fn next_url(&self, list_url: &str, count: i64) -> Option<String> {
        let next = self.offset.checked_add(self.limit).filter(|next| *next < count)?;
        Some(format!("{list_url}?limit={}&offset={next}", self.limit))
    }

    /// Link to the preceding page; omits `offset` when it would be zero.
    pub fn previous_url(&self, list_url: &str) -> Option<String> {
        if self.offset <= 0 {
            return None;
        }
        if self.offset - self.limit <= 0 {
            return Some(format!("{list_url}?limit={}", self.limit));
        }
        Some(format!(
            "{list_url}?limit={}&offset={}",
            self.limit,
            self.offset - self.limit
        ))
    }
}

/// Paginated list response.
#[derive(Debug, Serialize)]
pub struct Paginated<T, E> {
    pub count: i64,
    pub next_url: Option<String>,
    pub previous_url: Option<String>,
    #[serde(flatten)]
    pub extra: E,
    pub results: Vec<T>,
}

impl<T, E> Paginated<T, E> {
    pub fn new(page: Page, list_url: &str, count: i64, extra: E, results: Vec<T>) -> Self {
        Self {
            count,
            next_url: page.next_url(list_url, count),
            previous_url: page.previous_url(list_url),
            extra,
            results,
        }
    }
}

/// Extra links of the temperature list.
#[derive(Debug, Serialize)]
pub struct TemperatureLinks {
    pub latest_temperature_url: String,
    pub chart_url: String,
}

/// Extra links of the meta entry list.
#[derive(Debug, Serialize)]
pub struct MetaEntryLinks {
    pub latest_entry_url: String,
}
