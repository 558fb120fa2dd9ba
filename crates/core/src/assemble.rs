// ABOUTME: Post-processing applied while assembling records: titles, numbers, descriptions, credits.
// ABOUTME: Pure string functions shared by every source.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::text::normalize_whitespace;

static LABELLED_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:bölüm|bolum|chapter|ch\.?|episode|ep\.?)\s*(\d+(?:[.,]\d+)?)")
        .expect("valid chapter number regex")
});

static ANY_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:[.,]\d+)?)").expect("valid number regex"));

/// Trim a series-prefixed chapter title to the chapter label.
///
/// `"Seri Adı - Bölüm 5"` becomes `"Bölüm 5"`; a bare `"12"` becomes `"Bölüm 12"`.
pub fn clean_chapter_title(raw: &str) -> String {
    let raw = normalize_whitespace(raw);
    let tail = match raw.rfind(['-', '–']) {
        Some(i) => {
            let after = raw[i..].chars().skip(1).collect::<String>();
            let after = after.trim();
            if after.is_empty() {
                raw.as_str()
            } else {
                return finish_title(after);
            }
        }
        None => raw.as_str(),
    };
    finish_title(tail)
}

fn finish_title(title: &str) -> String {
    let title = title.trim();
    if !title.is_empty() && title.chars().all(|c| c.is_ascii_digit()) {
        format!("Bölüm {}", title)
    } else {
        title.to_string()
    }
}

/// Chapter number from a name like "Bölüm 12.5", else the first number, else -1.
pub fn parse_chapter_number(name: &str) -> f32 {
    LABELLED_NUMBER
        .captures(name)
        .or_else(|| ANY_NUMBER.captures(name))
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().replace(',', ".").parse::<f32>().ok())
        .unwrap_or(-1.0)
}

/// `12.0` prints as `"12"`, `12.5` as `"12.5"`.
pub fn format_chapter_number(number: f64) -> String {
    if number.fract() == 0.0 && number.is_finite() {
        format!("{}", number as i64)
    } else {
        format!("{}", number)
    }
}

/// Remove a leading boilerplate sentence matched by any of `patterns`.
///
/// Returns None when what remains is `min_len` characters or shorter.
pub fn strip_boilerplate(text: &str, patterns: &[&Regex], min_len: usize) -> Option<String> {
    let mut out = text.trim().to_string();
    for re in patterns {
        out = re.replace(&out, "").trim().to_string();
    }
    (out.chars().count() > min_len).then_some(out)
}

/// Split a comma-separated credit into (author, artist); artist defaults to the author.
pub fn split_credits(raw: &str) -> (Option<String>, Option<String>) {
    let mut parts = raw
        .split(',')
        .map(normalize_whitespace)
        .filter(|s| !s.is_empty());
    let author = parts.next();
    let artist = parts.next().or_else(|| author.clone());
    (author, artist)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn trims_series_prefix() {
        assert_eq!(clean_chapter_title("Seri Adı - Bölüm 5"), "Bölüm 5");
        assert_eq!(clean_chapter_title("Uzun–Ad – Bölüm 7"), "Bölüm 7");
        assert_eq!(clean_chapter_title("  12 "), "Bölüm 12");
        assert_eq!(clean_chapter_title("Seri - 13"), "Bölüm 13");
        assert_eq!(clean_chapter_title("Final Bölümü"), "Final Bölümü");
        assert_eq!(clean_chapter_title("Trailing -"), "Trailing -");
    }

    #[test]
    fn chapter_numbers() {
        assert_eq!(parse_chapter_number("Bölüm 12.5"), 12.5);
        assert_eq!(parse_chapter_number("Sezon 2 Bölüm 30"), 30.0);
        assert_eq!(parse_chapter_number("Chapter 4,5"), 4.5);
        assert_eq!(parse_chapter_number("Ekstra 3"), 3.0);
        assert_eq!(parse_chapter_number("Özel"), -1.0);
    }

    #[test]
    fn number_formatting() {
        assert_eq!(format_chapter_number(12.0), "12");
        assert_eq!(format_chapter_number(12.5), "12.5");
    }

    #[test]
    fn strips_boilerplate_and_rejects_short() {
        let re = Regex::new(r"^.*?üzerinden oku\.\s*").expect("regex");
        assert_eq!(
            strip_boilerplate("Seri Sadscans üzerinden oku. Gerçek bir açıklama.", &[&re], 10)
                .as_deref(),
            Some("Gerçek bir açıklama.")
        );
        assert_eq!(strip_boilerplate("X üzerinden oku. Kısa", &[&re], 10), None);
    }

    #[test]
    fn credits() {
        assert_eq!(
            split_credits("Jane Doe"),
            (Some("Jane Doe".into()), Some("Jane Doe".into()))
        );
        assert_eq!(
            split_credits("A , B, C"),
            (Some("A".into()), Some("B".into()))
        );
        assert_eq!(split_credits(" , "), (None, None));
    }
}
