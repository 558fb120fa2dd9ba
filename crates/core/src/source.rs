// ABOUTME: The Source trait every site plugin implements, plus its static SourceInfo.
// ABOUTME: Capabilities a site lacks fall back to defaults returning an Unsupported error.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SourceError};
use crate::filter::Filter;
use crate::models::{Chapter, Page, SeriesDetail, SeriesPage};

/// Search queries with this prefix name a series directly by slug (deep links).
pub const SLUG_SEARCH_PREFIX: &str = "slug:";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub id: String,
    pub name: String,
    pub base_url: String,
    pub lang: String,
    pub supports_latest: bool,
}

/// A site plugin. Every operation performs its own requests and returns a fully assembled record.
pub trait Source: Send + Sync {
    fn info(&self) -> SourceInfo;

    /// Most-viewed series, 1-based `page`.
    fn popular(&self, page: u32) -> Result<SeriesPage>;

    fn latest(&self, _page: u32) -> Result<SeriesPage> {
        Err(SourceError::unsupported("latest"))
    }

    fn search(&self, _page: u32, _query: &str, _filters: &[Filter]) -> Result<SeriesPage> {
        Err(SourceError::unsupported("search"))
    }

    /// Filters accepted by [`search`](Self::search).
    fn filters(&self) -> Vec<Filter> {
        Vec::new()
    }

    /// `url` is the relative series URL from a [`SeriesSummary`](crate::SeriesSummary).
    fn series_detail(&self, url: &str) -> Result<SeriesDetail>;

    fn chapters(&self, url: &str) -> Result<Vec<Chapter>>;

    fn pages(&self, url: &str) -> Result<Vec<Page>>;
}

/// The slug named by a `slug:` query, if any.
pub fn slug_query(query: &str) -> Option<&str> {
    query
        .trim()
        .strip_prefix(SLUG_SEARCH_PREFIX)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Minimal;

    impl Source for Minimal {
        fn info(&self) -> SourceInfo {
            SourceInfo {
                id: "minimal".into(),
                name: "Minimal".into(),
                base_url: "https://min.test".into(),
                lang: "tr".into(),
                supports_latest: false,
            }
        }
        fn popular(&self, _page: u32) -> Result<SeriesPage> {
            Ok(SeriesPage::default())
        }
        fn series_detail(&self, url: &str) -> Result<SeriesDetail> {
            Err(SourceError::not_found(url, "detail", "series"))
        }
        fn chapters(&self, _url: &str) -> Result<Vec<Chapter>> {
            Ok(Vec::new())
        }
        fn pages(&self, _url: &str) -> Result<Vec<Page>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn defaults_are_unsupported() {
        let src = Minimal;
        assert!(src.latest(1).unwrap_err().is_unsupported());
        assert!(src.search(1, "x", &[]).unwrap_err().is_unsupported());
        assert!(src.filters().is_empty());
    }

    #[test]
    fn slug_queries() {
        assert_eq!(slug_query("slug:one-piece"), Some("one-piece"));
        assert_eq!(slug_query("  slug: x "), Some("x"));
        assert_eq!(slug_query("slug:"), None);
        assert_eq!(slug_query("one piece"), None);
    }
}
