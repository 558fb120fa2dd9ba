// ABOUTME: URL helpers: absolute resolution, origin-relative paths, slugs and resize-suffix stripping.
// ABOUTME: Every series/chapter URL stored in a record passes through relative_path.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// WordPress-style thumbnail suffix, e.g. `Cover-450x600.webp`. Repeated suffixes collapse at once.
static RESIZE_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:-\d+x\d+)+(\.[A-Za-z0-9]+)((?:[?#].*)?)$").expect("valid resize regex")
});

/// Resolve `raw` against `base`. Protocol-relative URLs get `https:`.
pub fn resolve_url(raw: &str, base: Option<&Url>) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with("data:") || raw.starts_with("javascript:") {
        return None;
    }
    if let Some(rest) = raw.strip_prefix("//") {
        return Some(format!("https://{}", rest));
    }
    if let Ok(abs) = Url::parse(raw) {
        return Some(abs.to_string());
    }
    base.and_then(|b| b.join(raw).ok()).map(|u| u.to_string())
}

/// Join a site base (`https://host`) with a path or pass through an absolute URL.
pub fn absolute(base_url: &str, path: &str) -> String {
    let path = path.trim();
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    if let Some(rest) = path.strip_prefix("//") {
        return format!("https://{}", rest);
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Reduce a URL to its origin-relative form (`/path?query#fragment`).
pub fn relative_path(url: &str) -> String {
    let url = url.trim();
    if let Ok(parsed) = Url::parse(url) {
        if parsed.has_host() {
            let mut out = parsed.path().to_string();
            if let Some(q) = parsed.query() {
                out.push('?');
                out.push_str(q);
            }
            if let Some(f) = parsed.fragment() {
                out.push('#');
                out.push_str(f);
            }
            return out;
        }
    }
    if let Some(rest) = url.strip_prefix("//") {
        // protocol-relative: drop the host part
        return match rest.find('/') {
            Some(i) => rest[i..].to_string(),
            None => "/".to_string(),
        };
    }
    if url.starts_with('/') {
        url.to_string()
    } else {
        format!("/{}", url)
    }
}

/// Last non-empty path segment, ignoring query and fragment.
pub fn last_path_segment(url: &str) -> Option<String> {
    let path = relative_path(url);
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/')
        .filter(|s| !s.is_empty())
        .next_back()
        .map(|s| s.to_string())
}

/// Remove `-WxH` resize suffixes before the file extension. Idempotent.
pub fn strip_resize_suffix(url: &str) -> String {
    RESIZE_SUFFIX.replace(url, "$1$2").into_owned()
}
