// ABOUTME: MerlinScans (merlinscans.com): PHP site with filtered listings, an AJAX search preview and DOM pages.
// ABOUTME: Chapter lists span numbered pages; legacy series.php links are rewritten to /series/<slug>.

use std::sync::Arc;

use scraper::ElementRef;
use serde::Deserialize;
use url::Url;

use scanlate_core::assemble::parse_chapter_number;
use scanlate_core::date::{resolve_date_millis, TURKISH};
use scanlate_core::document::{element_attr, element_text, select_in, text_in};
use scanlate_core::filter::query_pairs;
use scanlate_core::models::ordered_genres;
use scanlate_core::pages::{collect, PageCandidate};
use scanlate_core::paginate::paginate;
use scanlate_core::source::slug_query;
use scanlate_core::urls::relative_path;
use scanlate_core::{
    Chapter, ChapterAccumulator, ChapterBatch, Filter, HtmlDocument, HttpClient, Options, Page,
    Result, SeriesDetail, SeriesPage, SeriesStatus, SeriesSummary, Source, SourceClient,
    SourceError, SourceInfo,
};

pub const BASE_URL: &str = "https://merlinscans.com";

const POPULAR_CARDS: &str = "div.series-grid a.series-card";
const NEXT_PAGE: &str = "li:not(.disabled) a i.fa-chevron-right";
const LATEST_CARDS: &str = "div.latest-chapters-grid div.latest-series-horizontal-card";
const CHAPTER_ITEMS: &str = ".chapters-grid .chapter-item";
const PAGE_BUTTONS: &str = ".pagination-buttons .page-btn";
const READER_IMAGES: &str = "#chapter-images img, .chapter-content img, .reader-container img";
const DEFAULT_SORT: &str = "views";

const STATUS_RULES: &[(&str, SeriesStatus)] = &[
    ("Devam Ediyor", SeriesStatus::Ongoing),
    ("Tamamlandı", SeriesStatus::Completed),
    ("Ara Verildi", SeriesStatus::Hiatus),
    ("İptal", SeriesStatus::Cancelled),
];

const TYPES: &[(&str, &str)] = &[
    ("Tümü", ""),
    ("Anime", "anime"),
    ("Manga", "manga"),
    ("Novel", "novel"),
    ("Webtoon", "webtoon"),
];

const CATEGORIES: &[(&str, &str)] = &[
    ("Tümü", ""),
    ("Aksiyon", "aksiyon"),
    ("Bilim Kurgu", "bilim-kurgu"),
    ("Canavar", "canavar"),
    ("Dahi MC", "dahi-mc"),
    ("Doğaüstü", "dogaustu"),
    ("Dövüş Sanatları", "dovus-sanatlari"),
    ("Dram", "dram"),
    ("Fantastik", "fantastik"),
    ("Fantezi", "fantezi"),
    ("Gender Bender", "gender-bender"),
    ("Geri Dönüş", "geri-donus"),
    ("Gizem", "gizem"),
    ("Harem", "harem"),
    ("Hayattan Kesitler", "hayattan-kesitler"),
    ("İntikam", "intikam"),
    ("Josei", "josei"),
    ("Komedi", "komedi"),
    ("Korku", "korku"),
    ("Macera", "macera"),
    ("Murim", "murim"),
    ("Okul Yaşamı", "okul-yasami"),
    ("Psikolojik", "psikolojik"),
    ("Reenkarne", "reenkarne"),
    ("Romantik", "romantik"),
    ("Romantizm", "romantizm"),
    ("Seinen", "seinen"),
    ("Shoujo", "shoujo"),
    ("Shounen", "shounen"),
    ("Spor", "spor"),
    ("Tarihi", "tarihi"),
    ("Trajedi", "trajedi"),
];

const STATUSES: &[(&str, &str)] = &[
    ("Tümü", ""),
    ("Devam Ediyor", "ongoing"),
    ("Tamamlandı", "completed"),
    ("Ara Verildi", "hiatus"),
    ("İptal Edildi", "cancelled"),
];

const SORTS: &[(&str, &str)] = &[
    ("Varsayılan", ""),
    ("En Yeni", "latest"),
    ("En Eski", "oldest"),
    ("İsme Göre (A-Z)", "alphabetical"),
    ("Puana Göre", "rating"),
    ("Görüntülenmeye Göre", "views"),
];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchPreview {
    success: bool,
    results: Vec<PreviewHit>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PreviewHit {
    title: String,
    cover_image: String,
    url: String,
}

/// Rewrite `/series.php?slug=x` to `/series/x`; anything else is made origin-relative.
pub fn normalize_series_url(url: &str) -> String {
    if url.contains("series.php") {
        let base = Url::parse(BASE_URL).ok();
        let parsed = Url::options().base_url(base.as_ref()).parse(url.trim());
        if let Some(slug) = parsed
            .ok()
            .and_then(|u| u.query_pairs().find(|(k, _)| k == "slug").map(|(_, v)| v.into_owned()))
            .filter(|s| !s.is_empty())
        {
            return format!("/series/{}", slug);
        }
    }
    relative_path(url)
}

/// MerlinScans source.
#[derive(Debug, Clone)]
pub struct MerlinScans {
    client: SourceClient,
}

impl MerlinScans {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self::with_options(http, Options::default())
    }

    pub fn with_options(http: Arc<dyn HttpClient>, opts: Options) -> Self {
        Self {
            client: SourceClient::new(http, BASE_URL, opts),
        }
    }

    fn listing(&self, params: &[(String, String)], op: &str) -> Result<SeriesPage> {
        let endpoint = self.client.url("/all-series.php");
        let url = Url::parse_with_params(&endpoint, params)
            .map_err(|e| SourceError::invalid_url(endpoint.clone(), op, Some(e.into())))?;
        let doc = self.client.document(url.as_str(), op)?;
        let series = doc
            .select(POPULAR_CARDS)
            .iter()
            .filter_map(|card| {
                let href = element_attr(card, "href")?;
                let title = text_in(card, "div.series-title").unwrap_or_default();
                let thumb = select_in(card, "img")
                    .iter()
                    .find_map(|img| doc.image_url(img, &["src"]));
                Some(SeriesSummary::new(&normalize_series_url(&href), title, thumb))
            })
            .collect();
        Ok(SeriesPage::new(series, doc.exists(NEXT_PAGE)))
    }

    fn preview_search(&self, query: &str) -> Result<SeriesPage> {
        let endpoint = self.client.url("/ajax/search-preview.php");
        let url = Url::parse_with_params(&endpoint, &[("q", query)])
            .map_err(|e| SourceError::invalid_url(endpoint.clone(), "search", Some(e.into())))?;
        let preview: SearchPreview = self.client.json(url.as_str(), "search")?;
        if !preview.success {
            return Ok(SeriesPage::default());
        }
        let series = preview
            .results
            .into_iter()
            .filter(|hit| !hit.url.trim().is_empty())
            .map(|hit| {
                let thumb =
                    (!hit.cover_image.trim().is_empty()).then(|| self.client.url(&hit.cover_image));
                SeriesSummary::new(&normalize_series_url(&hit.url), hit.title.trim(), thumb)
            })
            .collect();
        Ok(SeriesPage::new(series, false))
    }

    /// `.metadata-value` of the metadata item whose label mentions `label`.
    fn metadata(doc: &HtmlDocument, label: &str) -> Option<String> {
        doc.select(".metadata-item")
            .into_iter()
            .find(|item| {
                text_in(item, ".metadata-icon-label").is_some_and(|l| l.contains(label))
            })
            .and_then(|item| text_in(&item, ".metadata-value"))
    }

    fn chapter_from(&self, item: &ElementRef<'_>) -> Option<Chapter> {
        let href = element_attr(item, "href")
            .or_else(|| select_in(item, "a").iter().find_map(|a| element_attr(a, "href")))?;
        let name = text_in(item, ".chapter-title").unwrap_or_else(|| element_text(item));
        let date = text_in(item, ".chapter-date").unwrap_or_default();
        Some(Chapter::new(
            &href,
            name.clone(),
            parse_chapter_number(&name),
            resolve_date_millis(&date, &TURKISH, self.client.now()),
        ))
    }

    fn page_chapters(&self, doc: &HtmlDocument) -> Vec<Chapter> {
        doc.select(CHAPTER_ITEMS)
            .iter()
            .filter_map(|item| self.chapter_from(item))
            .collect()
    }

    /// Highest numbered pagination button, 1 when there is none.
    fn last_page(doc: &HtmlDocument) -> u32 {
        doc.texts(PAGE_BUTTONS)
            .iter()
            .filter_map(|t| t.parse::<u32>().ok())
            .max()
            .unwrap_or(1)
    }
}

impl Source for MerlinScans {
    fn info(&self) -> SourceInfo {
        SourceInfo {
            id: "merlinscans".into(),
            name: "MerlinScans".into(),
            base_url: self.client.base_url().to_string(),
            lang: "tr".into(),
            supports_latest: true,
        }
    }

    fn popular(&self, page: u32) -> Result<SeriesPage> {
        let params = [
            ("sort".to_string(), DEFAULT_SORT.to_string()),
            ("page".to_string(), page.to_string()),
        ];
        self.listing(&params, "popular")
    }

    fn latest(&self, _page: u32) -> Result<SeriesPage> {
        let doc = self.client.document("/", "latest")?;
        let series = doc
            .select(LATEST_CARDS)
            .iter()
            .filter_map(|card| {
                let link = select_in(card, "h3.series-title a").into_iter().next()?;
                let href = element_attr(&link, "href")?;
                let thumb = select_in(card, "div.series-cover-thumbnail img")
                    .iter()
                    .find_map(|img| doc.image_url(img, &["src"]));
                Some(SeriesSummary::new(
                    &normalize_series_url(&href),
                    element_text(&link),
                    thumb,
                ))
            })
            .collect();
        Ok(SeriesPage::new(series, false))
    }

    fn search(&self, page: u32, query: &str, filters: &[Filter]) -> Result<SeriesPage> {
        if let Some(slug) = slug_query(query) {
            let detail = self.series_detail(&format!("/series/{}", slug))?;
            return Ok(SeriesPage::single(detail.summary));
        }
        let query = query.trim();
        if !query.is_empty() {
            return self.preview_search(query);
        }
        let mut params = vec![("page".to_string(), page.to_string())];
        params.extend(query_pairs(filters));
        if !params.iter().any(|(k, _)| k == "sort") {
            params.push(("sort".to_string(), DEFAULT_SORT.to_string()));
        }
        self.listing(&params, "search")
    }

    fn filters(&self) -> Vec<Filter> {
        vec![
            Filter::select("Tür", "type", TYPES),
            Filter::select("Kategori", "category", CATEGORIES),
            Filter::select("Durum", "status", STATUSES),
            Filter::select("Sırala", "sort", SORTS),
        ]
    }

    fn series_detail(&self, url: &str) -> Result<SeriesDetail> {
        let url = normalize_series_url(url);
        let doc = self.client.document(&url, "detail")?;
        let author = Self::metadata(&doc, "Yazar");
        let status = Self::metadata(&doc, "Durum")
            .map(|s| SeriesStatus::from_keywords(&s, STATUS_RULES))
            .unwrap_or_default();
        Ok(SeriesDetail {
            summary: SeriesSummary::new(
                &url,
                doc.text("h1.series-title").unwrap_or_default(),
                doc.abs_attr(".cover-image", "src"),
            ),
            description: doc.text(".description-text"),
            genres: ordered_genres(doc.texts(".category-badge")),
            artist: author.clone(),
            author,
            status,
        })
    }

    fn chapters(&self, url: &str) -> Result<Vec<Chapter>> {
        let url = normalize_series_url(url);
        let path = url.split('?').next().unwrap_or_default().to_string();
        let doc = self.client.document(&url, "chapters")?;

        let mut acc = ChapterAccumulator::new();
        acc.extend(self.page_chapters(&doc));
        let last = Self::last_page(&doc);
        if last <= 1 {
            return Ok(acc.into_chapters());
        }

        // The series page itself was page 1 of the cap.
        let remaining = self.client.options().max_chapter_pages.saturating_sub(1);
        Ok(paginate(acc, 2, (last - 1).min(remaining), |page| {
            let page_url = format!("{}?page={}&sort=desc", path, page);
            let doc = self.client.document(&page_url, "chapters")?;
            Ok(ChapterBatch {
                chapters: self.page_chapters(&doc),
                total_pages: Some(last),
                has_next: None,
            })
        }))
    }

    fn pages(&self, url: &str) -> Result<Vec<Page>> {
        let doc = self.client.document(url, "pages")?;
        let candidates = doc
            .select(READER_IMAGES)
            .iter()
            .filter_map(|img| {
                ["data-src", "src", "data-original"]
                    .iter()
                    .find_map(|a| element_attr(img, a))
            })
            .map(PageCandidate::new)
            .collect();
        Ok(collect(candidates, doc.base()))
    }
}
