// ABOUTME: AlucardScans (alucardscans.com): REST JSON listings and chapters, structured-data detail pages.
// ABOUTME: Chapter lists need the series id, found by searching the slug; page images come from hydration data.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use url::Url;

use scanlate_core::assemble::parse_chapter_number;
use scanlate_core::date::iso_millis;
use scanlate_core::document::{attr_in, text_in};
use scanlate_core::models::ordered_genres;
use scanlate_core::pages::{first_non_empty, PageCandidate};
use scanlate_core::source::slug_query;
use scanlate_core::urls::last_path_segment;
use scanlate_core::{
    decode, Chapter, FallbackChain, Filter, HtmlDocument, HttpClient, Locator, Options, Page,
    Pagination, Result, ScriptScanner, SeriesDetail, SeriesPage, SeriesStatus, SeriesSummary,
    Source, SourceClient, SourceError, SourceInfo,
};

pub const BASE_URL: &str = "https://alucardscans.com";

const PAGE_SIZE: u32 = 24;
const SLUG_LOOKUP_LIMIT: u32 = 100;
const DEFAULT_PUBLISHER: &str = "Alucard Scans";
const LATEST_CARDS: &str = "section[aria-labelledby='latest-updates-heading'] div.group";
const STRUCTURED_DATA: &str = "meta[name=structured-data]";

const STATUS_RULES: &[(&str, SeriesStatus)] = &[
    ("Ongoing", SeriesStatus::Ongoing),
    ("Current", SeriesStatus::Ongoing),
    ("Completed", SeriesStatus::Completed),
];

static UPLOAD_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""url"\s*:\s*"(/uploads/[^"]+)""#).expect("valid upload regex"));

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SeriesList {
    series: Vec<SeriesItem>,
    pagination: Pagination,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SeriesItem {
    #[serde(rename = "_id")]
    id: Option<String>,
    title: String,
    slug: String,
    cover_image: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ChapterItem {
    title: Option<String>,
    number: Option<String>,
    slug: String,
    created_at: Option<String>,
}

/// A pointer into the entity-encoded JSON of `meta[name=structured-data]`.
fn data(pointer: &str) -> Locator<'_> {
    Locator::EmbeddedJson {
        css: STRUCTURED_DATA,
        attr: Some("content"),
        pointer,
    }
}

/// AlucardScans source.
#[derive(Debug, Clone)]
pub struct AlucardScans {
    client: SourceClient,
}

impl AlucardScans {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self::with_options(http, Options::default())
    }

    pub fn with_options(http: Arc<dyn HttpClient>, opts: Options) -> Self {
        Self {
            client: SourceClient::new(http, BASE_URL, opts),
        }
    }

    fn series_url(&self, params: &[(&str, String)], op: &str) -> Result<String> {
        let endpoint = self.client.url("/api/series");
        Url::parse_with_params(&endpoint, params)
            .map(|u| u.to_string())
            .map_err(|e| SourceError::invalid_url(endpoint, op, Some(e.into())))
    }

    fn series_list(&self, params: &[(&str, String)], op: &str) -> Result<SeriesPage> {
        let url = self.series_url(params, op)?;
        let list: SeriesList = self.client.json(&url, op)?;
        let series = list
            .series
            .into_iter()
            .map(|item| self.summary(item))
            .collect();
        Ok(SeriesPage::new(series, list.pagination.has_next()))
    }

    fn summary(&self, item: SeriesItem) -> SeriesSummary {
        let thumb = (!item.cover_image.trim().is_empty()).then(|| self.client.url(&item.cover_image));
        SeriesSummary::new(&format!("/manga/{}", item.slug), item.title, thumb)
    }

    fn parse_detail(doc: &HtmlDocument, url: &str) -> SeriesDetail {
        let title = FallbackChain::<HtmlDocument, String>::new("title")
            .locate("structured-data", data("/name"), decode::text)
            .locate("heading", Locator::Text("h1"), decode::text)
            .locate("og:title", Locator::Meta("og:title"), decode::text)
            .resolve(doc)
            .unwrap_or_default();

        let description = FallbackChain::<HtmlDocument, String>::new("description")
            .locate("structured-data", data("/description"), decode::text)
            .locate("meta-description", Locator::Meta("description"), decode::text)
            .resolve(doc);

        let thumbnail = FallbackChain::<HtmlDocument, String>::new("thumbnail")
            .locate("structured-data", data("/image"), decode::text)
            .then("og:image", |d| d.meta("og:image").and_then(|u| d.abs_url(&u)))
            .resolve(doc);

        let genres = FallbackChain::<HtmlDocument, Vec<String>>::new("genres")
            .locate("structured-data", data("/genre"), decode::string_list)
            .resolve(doc)
            .unwrap_or_default();

        let author = FallbackChain::<HtmlDocument, String>::new("author")
            .locate("publisher", data("/publisher/name"), decode::text)
            .then("default", |_| Some(DEFAULT_PUBLISHER.to_string()))
            .resolve(doc);

        let status = FallbackChain::<HtmlDocument, String>::new("status")
            .locate("structured-data", data("/status"), decode::text)
            .resolve(doc)
            .map(|s| SeriesStatus::from_keywords(&s, STATUS_RULES))
            .unwrap_or_default();

        SeriesDetail {
            summary: SeriesSummary::new(url, title, thumbnail),
            description,
            genres: ordered_genres(genres),
            artist: author.clone(),
            author,
            status,
        }
    }

    /// The API id of the series whose slug is exactly `slug`.
    fn series_id(&self, slug: &str) -> Result<String> {
        let params = [
            ("search", slug.to_string()),
            ("limit", SLUG_LOOKUP_LIMIT.to_string()),
        ];
        let url = self.series_url(&params, "chapters")?;
        let list: SeriesList = self.client.json(&url, "chapters")?;
        list.series
            .into_iter()
            .find(|s| s.slug == slug)
            .and_then(|s| s.id)
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| SourceError::not_found(url, "chapters", &format!("series id for {}", slug)))
    }

    fn chapter_from(series_slug: &str, item: ChapterItem) -> Chapter {
        let number = item.number.as_deref().map(str::trim).unwrap_or_default();
        let url = if item.slug.trim().is_empty() {
            format!("/{}-bolum-{}", series_slug, number)
        } else {
            format!("/{}", item.slug.trim())
        };
        let name = match item.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            Some(title) => format!("Bölüm {}: {}", number, title),
            None => format!("Bölüm {}", number),
        };
        let parsed = number.replace(',', ".").parse::<f32>().unwrap_or_else(|_| parse_chapter_number(number));
        let uploaded_at = item.created_at.as_deref().map(iso_millis).unwrap_or(0);
        Chapter::new(&url, name, parsed, uploaded_at)
    }

    fn hydration_pages(doc: &HtmlDocument) -> Vec<PageCandidate> {
        ScriptScanner::from_raw(doc.source())
            .captures_iter(&UPLOAD_URL)
            .filter_map(|c| c.get(1).map(|m| PageCandidate::new(m.as_str())))
            .collect()
    }

    fn dom_pages(doc: &HtmlDocument) -> Vec<PageCandidate> {
        doc.select("img[src*='/uploads/']")
            .iter()
            .filter_map(|img| img.value().attr("src"))
            .map(PageCandidate::new)
            .collect()
    }
}

impl Source for AlucardScans {
    fn info(&self) -> SourceInfo {
        SourceInfo {
            id: "alucardscans".into(),
            name: "Alucard Scans".into(),
            base_url: self.client.base_url().to_string(),
            lang: "tr".into(),
            supports_latest: true,
        }
    }

    fn popular(&self, page: u32) -> Result<SeriesPage> {
        let params = [
            ("page", page.to_string()),
            ("limit", PAGE_SIZE.to_string()),
            ("sort", "views".to_string()),
            ("order", "desc".to_string()),
            ("timeRange", "all".to_string()),
            ("calculateTotalViews", "true".to_string()),
        ];
        self.series_list(&params, "popular")
    }

    /// The home page widget is the only correctly ordered feed; it has no pagination.
    fn latest(&self, _page: u32) -> Result<SeriesPage> {
        let doc = self.client.document("/", "latest")?;
        let series = doc
            .select(LATEST_CARDS)
            .iter()
            .filter_map(|card| {
                let href = attr_in(card, "a[href*='/manga/']", "href")?;
                let thumb = attr_in(card, "img", "src").and_then(|src| doc.abs_url(&src))?;
                let title = text_in(card, "h3").unwrap_or_default();
                Some(SeriesSummary::new(&href, title, Some(thumb)))
            })
            .collect();
        Ok(SeriesPage::new(series, false))
    }

    fn search(&self, page: u32, query: &str, _filters: &[Filter]) -> Result<SeriesPage> {
        let term = slug_query(query).unwrap_or(query).trim();
        let params = [
            ("page", page.to_string()),
            ("limit", PAGE_SIZE.to_string()),
            ("search", term.to_string()),
            ("sort", "views".to_string()),
            ("order", "desc".to_string()),
        ];
        self.series_list(&params, "search")
    }

    fn series_detail(&self, url: &str) -> Result<SeriesDetail> {
        let doc = self.client.document(url, "detail")?;
        Ok(Self::parse_detail(&doc, url))
    }

    fn chapters(&self, url: &str) -> Result<Vec<Chapter>> {
        let slug = last_path_segment(url)
            .ok_or_else(|| SourceError::not_found(url, "chapters", "series slug"))?;
        let id = self.series_id(&slug)?;
        let items: Vec<ChapterItem> = self
            .client
            .json(&format!("/api/series/{}/chapters", id), "chapters")?;
        Ok(items
            .into_iter()
            .map(|item| Self::chapter_from(&slug, item))
            .collect())
    }

    fn pages(&self, url: &str) -> Result<Vec<Page>> {
        let doc = self.client.document(url, "pages")?;
        let strategies: [(&'static str, fn(&HtmlDocument) -> Vec<PageCandidate>); 2] = [
            ("hydration", Self::hydration_pages),
            ("upload-images", Self::dom_pages),
        ];
        Ok(first_non_empty(&doc, doc.base(), strategies))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn chapter_names_and_urls() {
        let titled = ChapterItem {
            title: Some("Uyanış".into()),
            number: Some("12".into()),
            slug: "kara-kilic-bolum-12".into(),
            created_at: Some("2024-05-01T10:00:00.000Z".into()),
        };
        let chapter = AlucardScans::chapter_from("kara-kilic", titled);
        assert_eq!(chapter.url, "/kara-kilic-bolum-12");
        assert_eq!(chapter.name, "Bölüm 12: Uyanış");
        assert_eq!(chapter.number, 12.0);
        assert_eq!(chapter.uploaded_at, 1_714_557_600_000);

        let bare = ChapterItem {
            number: Some("3.5".into()),
            ..ChapterItem::default()
        };
        let chapter = AlucardScans::chapter_from("kara-kilic", bare);
        assert_eq!(chapter.url, "/kara-kilic-bolum-3.5");
        assert_eq!(chapter.name, "Bölüm 3.5");
        assert_eq!(chapter.number, 3.5);
        assert_eq!(chapter.uploaded_at, 0);
    }

    #[test]
    fn missing_number_is_negative_one() {
        let chapter = AlucardScans::chapter_from("x", ChapterItem::default());
        assert_eq!(chapter.number, -1.0);
    }
}
