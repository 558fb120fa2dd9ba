// ABOUTME: Field extraction: Locator describes where a value lives, FallbackChain tries strategies in order.
// ABOUTME: Decode failures are logged and treated as absence so one bad field never fails a record.

//! Field extraction and fallback chains.
//!
//! A [`Locator`] names one place a value may live in a response: CSS text,
//! an attribute, a meta tag, a JSON pointer inside embedded JSON, or a key in
//! the page's hydration scripts. [`extract`] locates the raw string and runs
//! a decoder over it.
//!
//! A [`FallbackChain`] is an ordered list of named strategies for one logical
//! field. [`FallbackChain::resolve`] runs them in order and stops at the first
//! one that yields a value; later strategies are never evaluated.

use serde_json::Value;

use crate::document::HtmlDocument;
use crate::error::DecodeError;
use crate::text::{decode_entities, non_blank};

/// Where to look for a raw field value.
#[derive(Debug, Clone, Copy)]
pub enum Locator<'a> {
    /// Normalized text of the first non-empty match.
    Text(&'a str),
    /// Attribute of the first match carrying it.
    Attr(&'a str, &'a str),
    /// Attribute resolved to an absolute URL.
    AbsUrl(&'a str, &'a str),
    /// `<meta property|name=...>` content.
    Meta(&'a str),
    /// JSON pointer into the page's `application/ld+json` blocks.
    JsonLd(&'a str),
    /// JSON stored in an element attribute (entity-encoded) or its text, then a JSON pointer.
    EmbeddedJson {
        css: &'a str,
        attr: Option<&'a str>,
        pointer: &'a str,
    },
    /// `"key":"value"` inside inline scripts.
    Script(&'a str),
    /// JSON pointer into a decoded JSON value.
    Pointer(&'a str),
}

/// Something a [`Locator`] can be applied to.
pub trait Locate {
    /// `Ok(None)` when nothing is there, `Err` when something is there but malformed.
    fn locate(&self, locator: &Locator<'_>) -> Result<Option<String>, DecodeError>;
}

impl Locate for HtmlDocument {
    fn locate(&self, locator: &Locator<'_>) -> Result<Option<String>, DecodeError> {
        match *locator {
            Locator::Text(css) => Ok(self.text(css)),
            Locator::Attr(css, attr) => Ok(self.attr(css, attr)),
            Locator::AbsUrl(css, attr) => match self.attr(css, attr) {
                Some(raw) => self.abs_url(&raw).map(Some).ok_or(DecodeError::Url(raw)),
                None => Ok(None),
            },
            Locator::Meta(key) => Ok(self.meta(key)),
            Locator::JsonLd(pointer) => self.json_ld(pointer),
            Locator::EmbeddedJson { css, attr, pointer } => {
                let raw = match attr {
                    Some(attr) => self.attr(css, attr).map(|v| decode_entities(&v)),
                    None => self
                        .select(css)
                        .first()
                        .map(|el| el.text().collect::<String>()),
                };
                match raw.and_then(non_blank) {
                    Some(raw) => {
                        let value: Value = serde_json::from_str(&raw)
                            .map_err(|e| DecodeError::Json(e.to_string()))?;
                        Ok(value_at(&value, pointer))
                    }
                    None => Ok(None),
                }
            }
            Locator::Script(key) => Ok(self.script_scanner().scan(key)),
            Locator::Pointer(_) => Ok(None),
        }
    }
}

impl HtmlDocument {
    fn json_ld(&self, pointer: &str) -> Result<Option<String>, DecodeError> {
        let mut malformed = None;
        for block in self.select("script[type='application/ld+json']") {
            let text = block.text().collect::<String>();
            match serde_json::from_str::<Value>(&text) {
                Ok(value) => {
                    if let Some(found) = json_ld_candidates(&value)
                        .into_iter()
                        .find_map(|v| value_at(v, pointer))
                    {
                        return Ok(Some(found));
                    }
                }
                Err(e) => malformed = Some(DecodeError::Json(e.to_string())),
            }
        }
        match malformed {
            Some(err) => Err(err),
            None => Ok(None),
        }
    }
}

/// The root, its array items, and any `@graph` members.
fn json_ld_candidates(value: &Value) -> Vec<&Value> {
    let mut out = vec![value];
    if let Some(items) = value.as_array() {
        out.extend(items.iter());
    }
    if let Some(graph) = value.get("@graph").and_then(Value::as_array) {
        out.extend(graph.iter());
    }
    out
}

impl Locate for Value {
    fn locate(&self, locator: &Locator<'_>) -> Result<Option<String>, DecodeError> {
        match *locator {
            Locator::Pointer(pointer) => Ok(value_at(self, pointer)),
            _ => Ok(None),
        }
    }
}

/// Strings come back trimmed, scalars as their JSON text, containers as JSON. Null and blank are absent.
pub fn value_at(value: &Value, pointer: &str) -> Option<String> {
    match value.pointer(pointer)? {
        Value::Null => None,
        Value::String(s) => non_blank(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Locate one value and decode it. Decode failures are logged and become `None`.
pub fn extract<S, T, D>(source: &S, locator: &Locator<'_>, decode: D) -> Option<T>
where
    S: Locate + ?Sized,
    D: Fn(String) -> Result<T, DecodeError>,
{
    match source.locate(locator).and_then(|raw| raw.map(decode).transpose()) {
        Ok(value) => value,
        Err(err) => {
            log::debug!("discarding {:?}: {}", locator, err);
            None
        }
    }
}

type Strategy<'s, S, T> = Box<dyn Fn(&S) -> Result<Option<T>, DecodeError> + 's>;

/// Ordered extraction strategies for one field.
pub struct FallbackChain<'s, S: ?Sized, T> {
    field: &'static str,
    strategies: Vec<(&'static str, Strategy<'s, S, T>)>,
}

impl<'s, S: ?Sized, T> FallbackChain<'s, S, T> {
    pub fn new(field: &'static str) -> Self {
        Self {
            field,
            strategies: Vec::new(),
        }
    }

    /// Append a strategy that may fail to decode.
    pub fn attempt<F>(mut self, name: &'static str, f: F) -> Self
    where
        F: Fn(&S) -> Result<Option<T>, DecodeError> + 's,
    {
        self.strategies.push((name, Box::new(f)));
        self
    }

    /// Append an infallible strategy.
    pub fn then<F>(self, name: &'static str, f: F) -> Self
    where
        F: Fn(&S) -> Option<T> + 's,
    {
        self.attempt(name, move |s| Ok(f(s)))
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Run strategies in order; the first `Some` wins.
    pub fn resolve(&self, source: &S) -> Option<T> {
        for (name, strategy) in &self.strategies {
            match strategy(source) {
                Ok(Some(value)) => {
                    log::trace!("{}: resolved by {}", self.field, name);
                    return Some(value);
                }
                Ok(None) => {}
                Err(err) => log::debug!("{}: {} failed to decode: {}", self.field, name, err),
            }
        }
        log::trace!("{}: no strategy matched", self.field);
        None
    }
}

impl<'s, S, T> FallbackChain<'s, S, T>
where
    S: Locate + ?Sized,
    T: 's,
{
    /// Append a locator + decoder strategy.
    pub fn locate<D>(self, name: &'static str, locator: Locator<'s>, decode: D) -> Self
    where
        D: Fn(String) -> Result<T, DecodeError> + 's,
    {
        self.attempt(name, move |s| {
            s.locate(&locator)
                .and_then(|raw| raw.map(&decode).transpose())
        })
    }
}
