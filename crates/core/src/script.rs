// ABOUTME: Scans inline script and hydration blobs for values serialized as "key":"value" pairs.
// ABOUTME: All script text goes through unescape_script once before any pattern is applied.

//! Script-data scanning.
//!
//! Client-hydration payloads are usually JSON that has been re-escaped into
//! a JavaScript string literal, so a plain `"author":"Jane"` shows up as
//! `\"author\":\"Jane\"` and paths as `\/uploads\/` or `\u002Fuploads`.
//! [`unescape_script`] undoes exactly those three escapes; everything else
//! (pattern search, JSON string decoding of the captured value) runs on the
//! normalized buffer.
//!
//! Only the first occurrence of a key is returned. A page whose scripts
//! mention the key for an unrelated object before the wanted one yields the
//! unrelated value; callers that need more control use [`ScriptScanner::capture`]
//! with a site-specific regex.

use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use regex::{CaptureMatches, Regex};

static KEY_PATTERNS: Lazy<RwLock<HashMap<String, Regex>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Replace `\"` with `"` and `\/`, `\u002F`, `\u002f` with `/`.
pub fn unescape_script(raw: &str) -> String {
    raw.replace("\\\"", "\"")
        .replace("\\/", "/")
        .replace("\\u002F", "/")
        .replace("\\u002f", "/")
}

/// Decode leftover JSON string escapes (`\u00e7`, `\n`) when the value is a valid JSON string body.
pub fn decode_json_escapes(value: &str) -> String {
    if !value.contains('\\') {
        return value.to_string();
    }
    serde_json::from_str::<String>(&format!("\"{}\"", value)).unwrap_or_else(|_| value.to_string())
}

fn key_pattern(key: &str) -> Option<Regex> {
    {
        let cache = KEY_PATTERNS.read().unwrap_or_else(|e| e.into_inner());
        if let Some(re) = cache.get(key) {
            return Some(re.clone());
        }
    }
    let re = Regex::new(&format!(r#""{}"\s*:\s*"([^"]*)""#, regex::escape(key))).ok()?;
    let mut cache = KEY_PATTERNS.write().unwrap_or_else(|e| e.into_inner());
    cache.insert(key.to_string(), re.clone());
    Some(re)
}

/// A normalized buffer of script text.
#[derive(Debug, Clone, Default)]
pub struct ScriptScanner {
    buffer: String,
}

impl ScriptScanner {
    /// Concatenate script bodies (newline separated) and normalize them.
    pub fn new<I, S>(scripts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = scripts
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect::<Vec<_>>()
            .join("\n");
        Self::from_raw(&joined)
    }

    /// Normalize arbitrary text, e.g. a whole HTML page.
    pub fn from_raw(text: &str) -> Self {
        Self {
            buffer: unescape_script(text),
        }
    }

    /// Value of the first `"key":"value"` occurrence. Blank values count as absent.
    pub fn scan(&self, key: &str) -> Option<String> {
        let re = key_pattern(key)?;
        let caps = re.captures(&self.buffer)?;
        let value = decode_json_escapes(caps.get(1)?.as_str());
        let value = value.trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }

    /// First capture group of the first match of `re`.
    pub fn capture(&self, re: &Regex) -> Option<String> {
        re.captures(&self.buffer)
            .and_then(|c| c.get(1))
            .map(|m| decode_json_escapes(m.as_str()))
    }

    /// Every match of `re`, in buffer order.
    pub fn captures_iter<'a>(&'a self, re: &'a Regex) -> CaptureMatches<'a, 'a> {
        re.captures_iter(&self.buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unescapes_quotes_and_slashes() {
        assert_eq!(
            unescape_script(r#"{\"src\":\"\/api\/uploads/a.webp\"}"#),
            r#"{"src":"/api/uploads/a.webp"}"#
        );
    }

    #[test]
    fn scans_escaped_hydration_payload() {
        let scanner = ScriptScanner::new([
            "self.__next_f.push([1,\"{\\\"title\\\":\\\"X\\\",\\\"author\\\":\\\"Jane Doe\\\"}\"])",
        ]);
        assert_eq!(scanner.scan("author").as_deref(), Some("Jane Doe"));
        assert_eq!(scanner.scan("artist"), None);
    }

    #[test]
    fn first_match_wins() {
        let scanner = ScriptScanner::new([r#"{"status":"Devam"}"#, r#"{"status":"Bitti"}"#]);
        assert_eq!(scanner.scan("status").as_deref(), Some("Devam"));
    }

    #[test]
    fn decodes_unicode_escapes_in_values() {
        let scanner = ScriptScanner::new([r#"{"author":"G\u00fcl"}"#]);
        assert_eq!(scanner.scan("author").as_deref(), Some("Gül"));
    }

    #[test]
    fn key_is_matched_literally() {
        let scanner = ScriptScanner::new([r#"{"a.b":"dot","axb":"x"}"#]);
        assert_eq!(scanner.scan("a.b").as_deref(), Some("dot"));
    }

    #[test]
    fn capture_with_custom_regex() {
        let re = Regex::new(r#""thumb"\s*:\s*"(thumb_[^"]+)""#).expect("regex");
        let scanner = ScriptScanner::new([r#"{"thumb":"cover.png"},{"thumb":"thumb_9.webp"}"#]);
        assert_eq!(scanner.capture(&re).as_deref(), Some("thumb_9.webp"));
        assert_eq!(scanner.captures_iter(&re).count(), 1);
    }
}
