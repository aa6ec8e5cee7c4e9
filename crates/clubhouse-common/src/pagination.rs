//! Page/limit/sort handling shared by every list endpoint.

use serde::{Deserialize, Serialize};

/// Sort direction accepted in query strings (`asc` / `desc`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Raw pagination options as they arrive from the client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageOptions {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_order: Option<SortOrder>,
}

/// Resolved 1-indexed page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
    pub limit: u32,
    pub sort_order: SortOrder,
}

impl PageWindow {
    /// Resolve client options against the configured default and maximum page size.
    pub fn resolve(options: &PageOptions, default_limit: u32, max_limit: u32) -> Self {
        let page = options.page.filter(|p| *p > 0).unwrap_or(1);
        let limit = options
            .limit
            .filter(|l| *l > 0)
            .unwrap_or(default_limit)
            .min(max_limit);
        Self {
            page,
            limit,
            sort_order: options.sort_order.unwrap_or_default(),
        }
    }

    /// Rows to skip before this page.
    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }

    pub fn meta(&self, total: i64) -> PageMeta {
        let total_pages = if total <= 0 {
            0
        } else {
            (total + self.limit as i64 - 1) / self.limit as i64
        };
        PageMeta {
            page: self.page,
            limit: self.limit,
            total,
            total_pages,
        }
    }
}

impl Default for PageWindow {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            sort_order: SortOrder::Desc,
        }
    }
}

/// Pagination metadata returned next to every page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

/// A page of results plus its metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub meta: PageMeta,
    pub data: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn new(window: &PageWindow, total: i64, data: Vec<T>) -> Self {
        Self {
            meta: window.meta(total),
            data,
        }
    }
}

/// Wrap a free-text term for a case-insensitive `ILIKE` substring match.
///
/// `%`, `_` and `\` in the term are escaped so they match literally.
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Blank search terms behave as if no term was given.
pub fn search_term(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim).filter(|t| !t.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults() {
        let w = PageWindow::resolve(&PageOptions::default(), 10, 100);
        assert_eq!(w.page, 1);
        assert_eq!(w.limit, 10);
        assert_eq!(w.sort_order, SortOrder::Desc);
        assert_eq!(w.offset(), 0);
    }

    #[test]
    fn test_resolve_clamps_limit_and_zero_page() {
        let opts = PageOptions {
            page: Some(0),
            limit: Some(500),
            sort_order: Some(SortOrder::Asc),
        };
        let w = PageWindow::resolve(&opts, 10, 100);
        assert_eq!(w.page, 1);
        assert_eq!(w.limit, 100);
        assert_eq!(w.sort_order, SortOrder::Asc);
    }

    #[test]
    fn test_offset_and_meta() {
        let opts = PageOptions {
            page: Some(3),
            limit: Some(20),
            sort_order: None,
        };
        let w = PageWindow::resolve(&opts, 10, 100);
        assert_eq!(w.offset(), 40);

        let meta = w.meta(41);
        assert_eq!(meta.total_pages, 3);
        assert_eq!(w.meta(0).total_pages, 0);
        assert_eq!(w.meta(40).total_pages, 2);
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("ali"), "%ali%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_search_term_ignores_blank() {
        assert_eq!(search_term(Some("   ")), None);
        assert_eq!(search_term(Some(" S1 ")), Some("S1".to_string()));
        assert_eq!(search_term(None), None);
    }
}
