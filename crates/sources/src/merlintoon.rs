// ABOUTME: MerlinToon (merlintoon.com): WordPress theme with JSON ranking/search endpoints and DOM detail pages.
// ABOUTME: Chapter items carry lock icons and Turkish relative dates; locked readers raise a Locked error.

use std::sync::Arc;

use scraper::ElementRef;
use serde::Deserialize;
use url::Url;

use scanlate_core::assemble::{clean_chapter_title, parse_chapter_number};
use scanlate_core::date::{resolve_date_millis, TURKISH};
use scanlate_core::document::{element_attr, element_text, select_in, text_in};
use scanlate_core::models::ordered_genres;
use scanlate_core::pages::{collect, PageCandidate};
use scanlate_core::source::slug_query;
use scanlate_core::text::strip_html;
use scanlate_core::urls::strip_resize_suffix;
use scanlate_core::{
    Chapter, Filter, HtmlDocument, HttpClient, Options, Page, Result, SeriesDetail, SeriesPage,
    SeriesStatus, SeriesSummary, Source, SourceClient, SourceError, SourceInfo,
};

pub const BASE_URL: &str = "https://merlintoon.com";

const UNKNOWN_TITLE: &str = "Bilinmeyen";
const CARD: &str = "div.uk-panel";
const CARD_LINK: &str = "h3.uk-h5 a";
const NEXT_PAGE: &str = "ul.uk-pagination li:last-child:not(.uk-disabled) a";
const CHAPTER_ITEMS: &str = "#chapter-list .chapter-item";
const LOCK_ICON: &str = "span[uk-icon*='lock']";
const LOCKED_MARKER: &str = "Kilitli Bölüm";
const LOCK_PREFIX: &str = "🔒 ";

const STATUS_RULES: &[(&str, SeriesStatus)] = &[
    ("Devam", SeriesStatus::Ongoing),
    ("Güncel", SeriesStatus::Ongoing),
    ("Tamam", SeriesStatus::Completed),
];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TopRanking {
    posts: Vec<RankedPost>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RankedPost {
    html: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchHit {
    title: String,
    url: String,
    thumb: String,
}

/// MerlinToon source.
#[derive(Debug, Clone)]
pub struct MerlinToon {
    client: SourceClient,
}

impl MerlinToon {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self::with_options(http, Options::default())
    }

    pub fn with_options(http: Arc<dyn HttpClient>, opts: Options) -> Self {
        Self {
            client: SourceClient::new(http, BASE_URL, opts),
        }
    }

    /// A series card: title link, lazily loaded cover.
    fn card(doc: &HtmlDocument, card: &ElementRef<'_>, images: &str) -> Option<SeriesSummary> {
        let link = select_in(card, CARD_LINK).into_iter().next()?;
        let href = element_attr(&link, "href")?;
        let title = Some(element_text(&link))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string());
        let thumb = select_in(card, images)
            .iter()
            .find_map(|img| doc.image_url(img, &["data-src", "src"]));
        Some(SeriesSummary::new(&href, title, thumb))
    }

    fn chapter_from(&self, item: &ElementRef<'_>) -> Option<Chapter> {
        let link = select_in(item, "a.uk-link-toggle").into_iter().next()?;
        let href = element_attr(&link, "href")?;
        let label = clean_chapter_title(&text_in(item, "h3").unwrap_or_default());
        let locked = !select_in(item, LOCK_ICON).is_empty();
        let name = if locked {
            format!("{}{}", LOCK_PREFIX, label)
        } else {
            label.clone()
        };
        let date = text_in(item, "time")
            .or_else(|| text_in(item, ".uk-article-meta"))
            .unwrap_or_default();
        Some(
            Chapter::new(
                &href,
                name,
                parse_chapter_number(&label),
                resolve_date_millis(&date, &TURKISH, self.client.now()),
            )
            .locked(locked),
        )
    }
}

impl Source for MerlinToon {
    fn info(&self) -> SourceInfo {
        SourceInfo {
            id: "merlintoon".into(),
            name: "MerlinToon".into(),
            base_url: self.client.base_url().to_string(),
            lang: "tr".into(),
            supports_latest: true,
        }
    }

    /// All-time ranking; the endpoint returns every entry at once.
    fn popular(&self, _page: u32) -> Result<SeriesPage> {
        let url = self.client.url("/wp-json/initmanga/v1/top-ranking?range=all_time");
        let ranking: TopRanking = self.client.json(&url, "popular")?;
        let series = ranking
            .posts
            .iter()
            .filter_map(|post| {
                let fragment = HtmlDocument::fragment(&post.html, &url);
                let root = fragment.html().root_element();
                Self::card(&fragment, &root, "img")
            })
            .collect();
        Ok(SeriesPage::new(series, false))
    }

    fn latest(&self, page: u32) -> Result<SeriesPage> {
        let doc = self
            .client
            .document(&format!("/son-guncellenenler/page/{}/", page.max(1)), "latest")?;
        let series = doc
            .select(CARD)
            .iter()
            .filter_map(|card| Self::card(&doc, card, "div.uk-overflow-hidden img"))
            .collect();
        Ok(SeriesPage::new(series, doc.exists(NEXT_PAGE)))
    }

    fn search(&self, _page: u32, query: &str, _filters: &[Filter]) -> Result<SeriesPage> {
        let term = slug_query(query).unwrap_or(query).trim();
        let endpoint = self.client.url("/wp-json/initlise/v1/search");
        let url = Url::parse_with_params(&endpoint, &[("term", term)])
            .map_err(|e| SourceError::invalid_url(endpoint.clone(), "search", Some(e.into())))?;
        let hits: Vec<SearchHit> = self.client.json(url.as_str(), "search")?;
        let series = hits
            .into_iter()
            .filter(|hit| !hit.url.trim().is_empty())
            .map(|hit| {
                let thumb = (!hit.thumb.trim().is_empty()).then(|| self.client.url(&hit.thumb));
                SeriesSummary::new(&hit.url, strip_html(&hit.title), thumb)
            })
            .collect();
        Ok(SeriesPage::new(series, false))
    }

    fn series_detail(&self, url: &str) -> Result<SeriesDetail> {
        let doc = self.client.document(url, "detail")?;
        let title = doc
            .text("#manga-title")
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string());
        let author = Some(doc.texts("div.manga-info-details a[href*='/author/']").join(" "))
            .filter(|a| !a.is_empty());
        let description = Some(doc.texts("#manga-description p").join("\n\n")).filter(|d| !d.is_empty());
        let thumbnail = doc
            .abs_attr("div.story-cover-wrap img", "src")
            .map(|src| strip_resize_suffix(&src));
        let status = doc
            .text("#manga-status")
            .map(|s| SeriesStatus::from_keywords(&s, STATUS_RULES))
            .unwrap_or_default();
        Ok(SeriesDetail {
            summary: SeriesSummary::new(url, title, thumbnail),
            description,
            genres: ordered_genres(doc.texts("#genre-tags a")),
            artist: author.clone(),
            author,
            status,
        })
    }

    fn chapters(&self, url: &str) -> Result<Vec<Chapter>> {
        let doc = self.client.document(url, "chapters")?;
        Ok(doc
            .select(CHAPTER_ITEMS)
            .iter()
            .filter_map(|item| self.chapter_from(item))
            .collect())
    }

    fn pages(&self, url: &str) -> Result<Vec<Page>> {
        let doc = self.client.document(url, "pages")?;
        let locked = doc
            .texts("h3.uk-card-title")
            .iter()
            .any(|t| t.contains(LOCKED_MARKER));
        if locked {
            return Err(SourceError::locked(url, "pages"));
        }
        let candidates = doc
            .select("#chapter-content img")
            .iter()
            .filter_map(|img| {
                element_attr(img, "data-original-src").or_else(|| element_attr(img, "src"))
            })
            .map(PageCandidate::new)
            .collect();
        Ok(collect(candidates, doc.base()))
    }
}
