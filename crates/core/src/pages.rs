// ABOUTME: Turns candidate image URLs into a contiguous, de-duplicated Page list.
// ABOUTME: Candidates with position hints are stable-sorted first; strategies are tried whole, never merged.

use url::Url;

use crate::models::Page;
use crate::urls::resolve_url;

/// An image URL found by one extraction strategy, with an optional position hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCandidate {
    pub position: Option<i64>,
    pub url: String,
}

impl PageCandidate {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            position: None,
            url: url.into(),
        }
    }

    pub fn at(position: i64, url: impl Into<String>) -> Self {
        Self {
            position: Some(position),
            url: url.into(),
        }
    }
}

/// Order, resolve and de-duplicate candidates, then index them from 0.
///
/// When any candidate carries a position hint the list is stable-sorted by it:
/// equal hints keep first-seen order and unhinted candidates follow the hinted
/// ones. Unresolvable URLs are dropped.
pub fn collect(mut candidates: Vec<PageCandidate>, base: Option<&Url>) -> Vec<Page> {
    if candidates.iter().any(|c| c.position.is_some()) {
        candidates.sort_by_key(|c| (c.position.is_none(), c.position.unwrap_or_default()));
    }
    let mut seen: Vec<String> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if let Some(url) = resolve_url(&candidate.url, base) {
            if !seen.contains(&url) {
                seen.push(url);
            }
        }
    }
    seen.into_iter()
        .enumerate()
        .map(|(index, image_url)| Page { index, image_url })
        .collect()
}

/// Run page strategies in order and return the first non-empty result.
pub fn first_non_empty<S, I>(source: &S, base: Option<&Url>, strategies: I) -> Vec<Page>
where
    S: ?Sized,
    I: IntoIterator<Item = (&'static str, fn(&S) -> Vec<PageCandidate>)>,
{
    for (name, strategy) in strategies {
        let pages = collect(strategy(source), base);
        if !pages.is_empty() {
            log::trace!("pages resolved by {} ({} images)", name, pages.len());
            return pages;
        }
        log::debug!("page strategy {} found nothing", name);
    }
    Vec::new()
}
