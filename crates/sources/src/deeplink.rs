// ABOUTME: Turns a site link (series page, legacy series.php, chapter page) into a `slug:` search query.
// ABOUTME: Pure URL parsing; the host hands the query to the matching source's search.

use serde::Serialize;
use url::Url;

use scanlate_core::SLUG_SEARCH_PREFIX;

/// Path prefixes under which the second segment is a series slug.
const SERIES_PREFIXES: &[&str] = &["seriler", "series", "manga"];

/// Known hosts and the source id serving them.
const HOSTS: &[(&str, &str)] = &[
    ("sadscans.net", "sadscans"),
    ("alucardscans.com", "alucardscans"),
    ("merlintoon.com", "merlintoon"),
    ("merlinscans.com", "merlinscans"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeepLink {
    /// Source id when the link's host is recognized.
    pub source: Option<String>,
    pub slug: String,
    /// `slug:<slug>`, ready for `Source::search`.
    pub query: String,
}

/// Resolve `link` to a series slug query. Relative links are accepted.
pub fn resolve(link: &str) -> Option<DeepLink> {
    let base = Url::parse("https://localhost/").ok();
    let url = Url::options().base_url(base.as_ref()).parse(link.trim()).ok()?;
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    let slug = match segments.as_slice() {
        ["series.php"] => url
            .query_pairs()
            .find(|(k, _)| k == "slug")
            .map(|(_, v)| v.into_owned()),
        [prefix, slug, ..] if SERIES_PREFIXES.contains(prefix) => Some(slug.to_string()),
        _ => None,
    }
    .filter(|s| !s.trim().is_empty())?;

    let host = url.host_str().unwrap_or_default();
    let host = host.strip_prefix("www.").unwrap_or(host);
    let source = HOSTS
        .iter()
        .find(|(h, _)| *h == host)
        .map(|(_, id)| id.to_string());
    log::debug!("deep link {} -> {:?} slug {}", link, source, slug);

    Some(DeepLink {
        source,
        query: format!("{}{}", SLUG_SEARCH_PREFIX, slug),
        slug,
    })
}
