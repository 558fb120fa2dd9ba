// ABOUTME: Sadscans (sadscans.net): HTML listings, tRPC search and chapter APIs, hydration-data page lists.
// ABOUTME: Detail fields fall back from DOM to meta tags, ld+json and finally Next.js script data.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use scanlate_core::assemble::{format_chapter_number, split_credits, strip_boilerplate};
use scanlate_core::date::iso_millis;
use scanlate_core::document::{element_lines, element_text, select_in, text_in};
use scanlate_core::models::ordered_genres;
use scanlate_core::pages::{first_non_empty, PageCandidate};
use scanlate_core::paginate::paginate;
use scanlate_core::source::slug_query;
use scanlate_core::urls::last_path_segment;
use scanlate_core::{
    decode, extract, Chapter, ChapterAccumulator, ChapterBatch, FallbackChain, Filter,
    HtmlDocument, HttpClient, Locator, Options, Page, Result, SeriesDetail, SeriesPage,
    SeriesStatus, SeriesSummary, Source, SourceClient, SourceError, SourceInfo,
};

pub const BASE_URL: &str = "https://sadscans.net";

const POPULAR_CARDS: &str = "a.block.series-card, a[href^='/seriler/']";
const LATEST_CARDS: &str = "div.grid > div.relative";
const SERIES_LINK: &str = "a[href^='/seriler/']";
const METADATA_ROWS: &str = "div.flex.items-center.gap-2";
const GENRE_LINKS: &str = "a[href*='/tur/'], a[href*='/genre/']";
const READER_IMAGES: &str = "img[src*='/images/'], img[src*='/uploads/']";
const CHAPTERS_PER_PAGE: u32 = 20;

const STATUS_RULES: &[(&str, SeriesStatus)] = &[
    ("Devam", SeriesStatus::Ongoing),
    ("Tamamlandı", SeriesStatus::Completed),
    ("Bitti", SeriesStatus::Completed),
];

static PAGE_SRC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""page"\s*:\s*(\d+)\s*,\s*"src"\s*:\s*"([^"]+(?:\.avif|\.jpg|\.jpeg|\.png|\.webp|\.pdf))""#)
        .expect("valid page regex")
});

static DIRECT_UPLOAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(/api/uploads/[^"\\,\s]+(?:\.avif|\.jpg|\.jpeg|\.png|\.webp|\.pdf))"#)
        .expect("valid upload regex")
});

static COVER_THUMB: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""thumb"\s*:\s*"(thumb_[^"]+)""#).expect("valid thumb regex"));

static SERIES_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""id"\s*:\s*"([A-Za-z0-9_-]+)""#).expect("valid id regex"));

static READ_ON_SITE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^.*?üzerinden oku\.\s*").expect("valid boilerplate regex"));

static READ_IN_TURKISH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^.*?türkçe oku\.\s*").expect("valid boilerplate regex"));

/// First batch entry's payload, with or without the superjson `json` wrapper.
fn trpc_payload<T: DeserializeOwned + 'static>(batch: &Value) -> Option<T> {
    FallbackChain::<Value, T>::new("trpc payload")
        .locate("superjson", Locator::Pointer("/0/result/data/json"), decode::typed)
        .locate("plain", Locator::Pointer("/0/result/data"), decode::typed)
        .resolve(batch)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SeriesInfo {
    name: String,
    sef: String,
    thumb: String,
    href: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChapterData {
    chapters: Vec<ChapterInfo>,
    pagination: Option<ChapterPagination>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChapterInfo {
    chap_id: String,
    name: String,
    no: Option<f64>,
    href: Option<String>,
    date: String,
}

#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ChapterPagination {
    total_pages: u32,
}

impl Default for ChapterPagination {
    fn default() -> Self {
        Self { total_pages: 1 }
    }
}

/// Sadscans source.
#[derive(Debug, Clone)]
pub struct Sadscans {
    client: SourceClient,
}

impl Sadscans {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self::with_options(http, Options::default())
    }

    pub fn with_options(http: Arc<dyn HttpClient>, opts: Options) -> Self {
        Self {
            client: SourceClient::new(http, BASE_URL, opts).with_referer(),
        }
    }

    fn trpc_url(&self, procedure: &str, input: serde_json::Value, op: &str) -> Result<String> {
        let endpoint = self.client.url(&format!("/api/trpc/{}", procedure));
        let batched = json!({ "0": { "json": input } }).to_string();
        Url::parse_with_params(&endpoint, &[("batch", "1"), ("input", batched.as_str())])
            .map(|u| u.to_string())
            .map_err(|e| SourceError::invalid_url(endpoint, op, Some(e.into())))
    }

    fn card_image(doc: &HtmlDocument, card: &ElementRef<'_>, keep: fn(&str) -> bool) -> Option<String> {
        select_in(card, "img")
            .iter()
            .filter_map(|img| doc.image_url(img, &["src", "data-src"]))
            .find(|src| keep(src))
    }

    fn popular_card(doc: &HtmlDocument, card: &ElementRef<'_>) -> Option<SeriesSummary> {
        let is_series_card = card.value().classes().any(|c| c == "series-card");
        if !is_series_card && select_in(card, "img").is_empty() {
            return None;
        }
        let href = doc.abs_url(card.value().attr("href")?)?;
        let title = text_in(card, "h3")
            .or_else(|| text_in(card, "span.font-semibold, span.font-bold"))
            .or_else(|| element_lines(card).into_iter().next())
            .unwrap_or_default();
        let thumb = Self::card_image(doc, card, |src| {
            !src.contains("/images/") || !src.contains("thumb_")
        });
        Some(SeriesSummary::new(&href, title, thumb))
    }

    fn latest_card(doc: &HtmlDocument, card: &ElementRef<'_>) -> Option<SeriesSummary> {
        let link = select_in(card, SERIES_LINK).into_iter().next()?;
        let href = link.value().attr("href")?;
        let title = text_in(&link, "h3")
            .or_else(|| text_in(card, "a[href^='/seriler/'] h3"))
            .unwrap_or_default();
        let thumb = Self::card_image(doc, card, |src| {
            src.contains("thumb_") && !src.contains("/images/")
        });
        Some(SeriesSummary::new(href, title, thumb))
    }

    /// Last `<span>` of the metadata row whose text mentions `label`.
    fn metadata_value(doc: &HtmlDocument, label: &str) -> Option<String> {
        let label = label.to_lowercase();
        doc.select(METADATA_ROWS)
            .into_iter()
            .find(|row| element_text(row).to_lowercase().contains(&label))
            .and_then(|row| select_in(&row, "span").last().map(element_text))
            .filter(|v| !v.is_empty())
    }

    fn script_cover(&self, doc: &HtmlDocument) -> Option<String> {
        let scanner = doc.script_scanner();
        let thumb = scanner.capture(&COVER_THUMB)?;
        let id = scanner.capture(&SERIES_ID)?;
        Some(
            self.client
                .url(&format!("/api/uploads/assets/series/{}/{}", id, thumb)),
        )
    }

    fn parse_detail(&self, doc: &HtmlDocument, url: &str) -> SeriesDetail {
        let title = FallbackChain::<HtmlDocument, String>::new("title")
            .locate("heading", Locator::Text("h1"), decode::text)
            .locate("og:title", Locator::Meta("og:title"), decode::text)
            .resolve(doc)
            .unwrap_or_default();

        let thumbnail = FallbackChain::<HtmlDocument, String>::new("thumbnail")
            .locate(
                "cover-frame",
                Locator::AbsUrl("div.relative.rounded-xl img", "src"),
                decode::text,
            )
            .then("series-image", |d| {
                d.select("img")
                    .iter()
                    .filter_map(|img| d.image_url(img, &["src"]))
                    .find(|src| {
                        !src.contains("/images/")
                            && !src.contains("banner")
                            && (src.contains("/assets/series/") || src.contains("/seriler/"))
                    })
            })
            .then("script-thumb", |d| self.script_cover(d))
            .resolve(doc);

        let clean = |raw: String| strip_boilerplate(&raw, &[&READ_ON_SITE, &READ_IN_TURKISH], 10);
        let description = FallbackChain::<HtmlDocument, String>::new("description")
            .then("og:description", |d| d.meta("og:description").and_then(clean))
            .then("meta-description", |d| d.meta("description").and_then(clean))
            .then("ld+json", |d| {
                extract(d, &Locator::JsonLd("/description"), decode::text)
                    .filter(|s| s.chars().count() > 10)
            })
            .resolve(doc);

        let credits = FallbackChain::<HtmlDocument, String>::new("author")
            .then("metadata-row", |d| {
                Self::metadata_value(d, "yazar").filter(|v| !v.contains("Yazar"))
            })
            .locate("script", Locator::Script("author"), decode::entity_text)
            .resolve(doc)
            .filter(|v| !v.contains("Yazar"));
        let (author, artist) = match credits {
            Some(raw) => split_credits(&raw),
            None => (None, None),
        };

        let status = FallbackChain::<HtmlDocument, String>::new("status")
            .then("metadata-row", |d| Self::metadata_value(d, "durum"))
            .locate("script", Locator::Script("status"), decode::entity_text)
            .resolve(doc)
            .map(|s| SeriesStatus::from_keywords(&s, STATUS_RULES))
            .unwrap_or_default();

        SeriesDetail {
            summary: SeriesSummary::new(url, title, thumbnail),
            description,
            genres: ordered_genres(doc.texts(GENRE_LINKS)),
            author,
            artist,
            status,
        }
    }

    fn chapter_from(&self, slug: &str, info: ChapterInfo) -> Chapter {
        let number = format_chapter_number(info.no.unwrap_or(0.0));
        let url = info
            .href
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| format!("/reader/{}/{}-bolum/{}", slug, number, info.chap_id));
        let name = if info.name.trim().is_empty() {
            format!("{}. Bölüm", number)
        } else {
            format!("{}. Bölüm - {}", number, info.name.trim())
        };
        let parsed = info.no.map_or(-1.0, |n| n as f32);
        Chapter::new(&url, name, parsed, iso_millis(&info.date))
    }

    fn hydration_pages(doc: &HtmlDocument) -> Vec<PageCandidate> {
        doc.script_scanner()
            .captures_iter(&PAGE_SRC)
            .filter_map(|c| {
                let url = c.get(2)?.as_str();
                if !(url.contains("/api/uploads/") || url.contains("/images/")) {
                    return None;
                }
                let position = c.get(1)?.as_str().parse().ok()?;
                Some(PageCandidate::at(position, url))
            })
            .collect()
    }

    fn direct_upload_pages(doc: &HtmlDocument) -> Vec<PageCandidate> {
        doc.script_scanner()
            .captures_iter(&DIRECT_UPLOAD)
            .filter_map(|c| c.get(1).map(|m| PageCandidate::new(m.as_str())))
            .collect()
    }

    fn dom_pages(doc: &HtmlDocument) -> Vec<PageCandidate> {
        doc.select(READER_IMAGES)
            .iter()
            .filter_map(|img| img.value().attr("src"))
            .map(PageCandidate::new)
            .collect()
    }
}

impl Source for Sadscans {
    fn info(&self) -> SourceInfo {
        SourceInfo {
            id: "sadscans".into(),
            name: "Sadscans".into(),
            base_url: self.client.base_url().to_string(),
            lang: "tr".into(),
            supports_latest: true,
        }
    }

    fn popular(&self, _page: u32) -> Result<SeriesPage> {
        let doc = self.client.document("/seriler", "popular")?;
        let series = doc
            .select(POPULAR_CARDS)
            .iter()
            .filter_map(|card| Self::popular_card(&doc, card))
            .collect();
        Ok(SeriesPage::new(series, false))
    }

    fn latest(&self, _page: u32) -> Result<SeriesPage> {
        let doc = self.client.document("/", "latest")?;
        let series = doc
            .select(LATEST_CARDS)
            .iter()
            .filter_map(|card| Self::latest_card(&doc, card))
            .collect();
        Ok(SeriesPage::new(series, false))
    }

    fn search(&self, _page: u32, query: &str, _filters: &[Filter]) -> Result<SeriesPage> {
        if let Some(slug) = slug_query(query) {
            let detail = self.series_detail(&format!("/seriler/{}", slug))?;
            return Ok(SeriesPage::single(detail.summary));
        }
        let url = self.trpc_url("srs.getSeries", json!({ "search": query.trim() }), "search")?;
        let batch: Value = self.client.json(&url, "search")?;
        let series = trpc_payload::<Vec<SeriesInfo>>(&batch)
            .unwrap_or_default()
            .into_iter()
            .map(|s| {
                let url = s
                    .href
                    .filter(|h| !h.trim().is_empty())
                    .unwrap_or_else(|| format!("/seriler/{}", s.sef));
                let thumb = (!s.thumb.trim().is_empty()).then(|| self.client.url(&s.thumb));
                SeriesSummary::new(&url, s.name.trim(), thumb)
            })
            .collect();
        Ok(SeriesPage::new(series, false))
    }

    fn series_detail(&self, url: &str) -> Result<SeriesDetail> {
        let doc = self.client.document(url, "detail")?;
        Ok(self.parse_detail(&doc, url))
    }

    fn chapters(&self, url: &str) -> Result<Vec<Chapter>> {
        let Some(slug) = last_path_segment(url) else {
            log::debug!("no series slug in {:?}", url);
            return Ok(Vec::new());
        };
        let max_pages = self.client.options().max_chapter_pages;
        Ok(paginate(ChapterAccumulator::new(), 1, max_pages, |page| {
            let input = json!({ "sef": slug.as_str(), "page": page, "limit": CHAPTERS_PER_PAGE });
            let api = self.trpc_url("srsDtl.getSeriesData", input, "chapters")?;
            let batch: Value = self.client.json(&api, "chapters")?;
            let data = trpc_payload::<ChapterData>(&batch).unwrap_or_default();
            Ok(ChapterBatch {
                total_pages: Some(data.pagination.unwrap_or_default().total_pages),
                chapters: data
                    .chapters
                    .into_iter()
                    .map(|c| self.chapter_from(&slug, c))
                    .collect(),
                has_next: None,
            })
        }))
    }

    fn pages(&self, url: &str) -> Result<Vec<Page>> {
        let doc = self.client.document(url, "pages")?;
        let strategies: [(&'static str, fn(&HtmlDocument) -> Vec<PageCandidate>); 3] = [
            ("hydration", Self::hydration_pages),
            ("direct-uploads", Self::direct_upload_pages),
            ("reader-images", Self::dom_pages),
        ];
        Ok(first_non_empty(&doc, doc.base(), strategies))
    }
}
