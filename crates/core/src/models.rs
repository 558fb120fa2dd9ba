// ABOUTME: Output records produced by sources: SeriesSummary, SeriesDetail, Chapter, Page and listing pages.
// ABOUTME: Records are built in one step; series URLs are always stored origin-relative.

use serde::{Deserialize, Serialize};

use crate::text::fold_case;
use crate::urls::relative_path;

/// Publication status of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeriesStatus {
    Ongoing,
    Completed,
    Hiatus,
    Cancelled,
    #[default]
    Unknown,
}

impl SeriesStatus {
    /// Map free text to a status using `(keyword, status)` rules, first match wins.
    /// Matching is case-insensitive substring search, Turkish dotted/dotless i included.
    pub fn from_keywords(text: &str, rules: &[(&str, SeriesStatus)]) -> SeriesStatus {
        let folded = fold_case(text);
        rules
            .iter()
            .find(|(keyword, _)| folded.contains(&fold_case(keyword)))
            .map(|(_, status)| *status)
            .unwrap_or(SeriesStatus::Unknown)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub url: String,
    pub title: String,
    pub thumbnail_url: Option<String>,
}

impl SeriesSummary {
    pub fn new(url: &str, title: impl Into<String>, thumbnail_url: Option<String>) -> Self {
        Self {
            url: relative_path(url),
            title: title.into(),
            thumbnail_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesDetail {
    #[serde(flatten)]
    pub summary: SeriesSummary,
    pub description: Option<String>,
    /// Ordered, without duplicates.
    pub genres: Vec<String>,
    pub author: Option<String>,
    pub artist: Option<String>,
    pub status: SeriesStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub url: String,
    pub name: String,
    /// -1.0 when the number could not be parsed.
    pub number: f32,
    /// Epoch milliseconds, 0 when unknown.
    pub uploaded_at: i64,
    pub locked: bool,
}

impl Chapter {
    pub fn new(url: &str, name: impl Into<String>, number: f32, uploaded_at: i64) -> Self {
        Self {
            url: relative_path(url),
            name: name.into(),
            number,
            uploaded_at,
            locked: false,
        }
    }

    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub index: usize,
    pub image_url: String,
}

/// One page of a listing or search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SeriesPage {
    pub series: Vec<SeriesSummary>,
    pub has_next: bool,
}

impl SeriesPage {
    pub fn new(series: Vec<SeriesSummary>, has_next: bool) -> Self {
        Self { series, has_next }
    }

    pub fn single(series: SeriesSummary) -> Self {
        Self::new(vec![series], false)
    }
}

/// Transient pagination cursor reported by listing APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u32,
}

impl Pagination {
    /// True while `page * limit` has not reached `total`.
    pub fn has_next(&self) -> bool {
        u64::from(self.page) * u64::from(self.limit) < u64::from(self.total)
    }
}

/// Deduplicate genre names preserving first-seen order.
pub fn ordered_genres<I, S>(genres: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for g in genres {
        let g = crate::text::normalize_whitespace(g.as_ref());
        if !g.is_empty() && !out.contains(&g) {
            out.push(g);
        }
    }
    out
}
