// ABOUTME: HtmlDocument wraps a parsed page with its URL so selections can resolve absolute links.
// ABOUTME: Element helpers normalize text and treat blank attributes as absent.

use once_cell::unsync::OnceCell;
use scraper::{ElementRef, Html};
use url::Url;

use crate::script::ScriptScanner;
use crate::selectors::get_or_compile;
use crate::text::{non_blank, normalize_whitespace};
use crate::urls::resolve_url;

/// A parsed HTML response.
pub struct HtmlDocument {
    html: Html,
    source: String,
    base: Option<Url>,
    scanner: OnceCell<ScriptScanner>,
}

impl HtmlDocument {
    /// Parse a full document fetched from `url`.
    pub fn parse(body: &str, url: &str) -> Self {
        Self {
            html: Html::parse_document(body),
            source: body.to_string(),
            base: Url::parse(url).ok(),
            scanner: OnceCell::new(),
        }
    }

    /// Parse an HTML fragment (e.g. markup embedded in a JSON API response).
    pub fn fragment(body: &str, url: &str) -> Self {
        Self {
            html: Html::parse_fragment(body),
            source: body.to_string(),
            base: Url::parse(url).ok(),
            scanner: OnceCell::new(),
        }
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    /// The unparsed markup.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn base(&self) -> Option<&Url> {
        self.base.as_ref()
    }

    /// All elements matching `css`, in document order. Invalid selectors match nothing.
    pub fn select(&self, css: &str) -> Vec<ElementRef<'_>> {
        match get_or_compile(css) {
            Some(sel) => self.html.select(&sel).collect(),
            None => Vec::new(),
        }
    }

    pub fn exists(&self, css: &str) -> bool {
        !self.select(css).is_empty()
    }

    /// First non-empty normalized text among the matches.
    pub fn text(&self, css: &str) -> Option<String> {
        self.select(css)
            .iter()
            .map(element_text)
            .find(|t| !t.is_empty())
    }

    /// Normalized text of every match, empties skipped.
    pub fn texts(&self, css: &str) -> Vec<String> {
        self.select(css)
            .iter()
            .map(element_text)
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// First non-blank value of `attr` among the matches.
    pub fn attr(&self, css: &str, attr: &str) -> Option<String> {
        self.select(css)
            .iter()
            .find_map(|el| element_attr(el, attr))
    }

    /// Like [`attr`](Self::attr) but resolved against the document URL.
    pub fn abs_attr(&self, css: &str, attr: &str) -> Option<String> {
        self.attr(css, attr).and_then(|v| self.abs_url(&v))
    }

    /// `content` of `meta[property=key]` or `meta[name=key]`.
    pub fn meta(&self, key: &str) -> Option<String> {
        self.attr(&format!("meta[property='{key}'], meta[name='{key}']"), "content")
    }

    pub fn abs_url(&self, raw: &str) -> Option<String> {
        resolve_url(raw, self.base.as_ref())
    }

    /// Absolute URL from the first of `attrs` an image element carries (`src`, `data-src`, ...).
    pub fn image_url(&self, img: &ElementRef<'_>, attrs: &[&str]) -> Option<String> {
        attrs
            .iter()
            .find_map(|a| element_attr(img, a))
            .and_then(|raw| self.abs_url(&raw))
    }

    /// Text of every `<script>` element, in document order.
    pub fn scripts(&self) -> Vec<String> {
        self.select("script")
            .iter()
            .map(|s| s.text().collect::<String>())
            .filter(|s| !s.trim().is_empty())
            .collect()
    }

    /// Scanner over all inline scripts, built on first use.
    pub fn script_scanner(&self) -> &ScriptScanner {
        self.scanner.get_or_init(|| ScriptScanner::new(self.scripts()))
    }
}

/// Whitespace-normalized text content of an element.
pub fn element_text(el: &ElementRef<'_>) -> String {
    normalize_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

/// Raw text lines of an element (text nodes, trimmed, empties dropped).
pub fn element_lines(el: &ElementRef<'_>) -> Vec<String> {
    el.text().filter_map(non_blank).collect()
}

/// Trimmed attribute value; blank counts as absent.
pub fn element_attr(el: &ElementRef<'_>, attr: &str) -> Option<String> {
    el.value().attr(attr).and_then(non_blank)
}

/// Descendants of `el` matching `css`.
pub fn select_in<'a>(el: &ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match get_or_compile(css) {
        Some(sel) => el.select(&sel).collect(),
        None => Vec::new(),
    }
}

/// First non-empty text of a descendant matching `css`.
pub fn text_in(el: &ElementRef<'_>, css: &str) -> Option<String> {
    select_in(el, css)
        .iter()
        .map(element_text)
        .find(|t| !t.is_empty())
}

/// First non-blank attribute of a descendant matching `css`.
pub fn attr_in(el: &ElementRef<'_>, css: &str, attr: &str) -> Option<String> {
    select_in(el, css)
        .iter()
        .find_map(|e| element_attr(e, attr))
}
