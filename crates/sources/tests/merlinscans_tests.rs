// ABOUTME: Fixture-driven tests for the MerlinScans source: filtered listings, AJAX search preview,
// ABOUTME: labelled metadata, numbered chapter pagination with partial results, and reader images.

mod common;

use chrono::{TimeZone, Utc};
use common::{fixture, options, query_param, reference_time, FakeHttp};
use scanlate_core::{SeriesStatus, Source};
use scanlate_sources::MerlinScans;

const DETAIL_URL: &str = "https://merlinscans.com/series/kara-kilic";

mod listing_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn popular_normalizes_legacy_links_and_reads_next_arrow() {
        let http = FakeHttp::new()
            .page(
                "https://merlinscans.com/all-series.php?sort=views&page=1",
                fixture("merlinscans/all_series.html"),
            )
            .page(
                "https://merlinscans.com/all-series.php?sort=views&page=9",
                fixture("merlinscans/all_series_last.html"),
            )
            .shared();
        let source = MerlinScans::with_options(http, options());

        let first = source.popular(1).unwrap();
        let urls: Vec<_> = first.series.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(urls, vec!["/series/kara-kilic", "/series/ay-isigi"]);
        assert_eq!(
            first.series[0].thumbnail_url.as_deref(),
            Some("https://merlinscans.com/uploads/covers/kara.webp")
        );
        assert!(first.has_next);

        assert!(!source.popular(9).unwrap().has_next);
    }

    #[test]
    fn latest_reads_home_cards() {
        let http = FakeHttp::new()
            .page("https://merlinscans.com/", fixture("merlinscans/home.html"))
            .shared();
        let page = MerlinScans::with_options(http, options()).latest(1).unwrap();
        assert_eq!(page.series.len(), 1);
        assert_eq!(page.series[0].url, "/series/kara-kilic");
        assert_eq!(page.series[0].title, "Kara Kılıç");
    }

    #[test]
    fn text_query_uses_search_preview() {
        let http = FakeHttp::new()
            .when(|u| {
                (u.path() == "/ajax/search-preview.php"
                    && query_param(u, "q").as_deref() == Some("kara"))
                .then(|| (200, fixture("merlinscans/search_preview.json")))
            })
            .shared();
        let page = MerlinScans::with_options(http, options())
            .search(1, "kara", &[])
            .unwrap();
        assert_eq!(page.series.len(), 1);
        assert_eq!(page.series[0].url, "/series/kara-kilic");
        assert_eq!(
            page.series[0].thumbnail_url.as_deref(),
            Some("https://merlinscans.com/uploads/covers/kara.webp")
        );
    }

    #[test]
    fn empty_query_applies_filters_and_default_sort() {
        let http = FakeHttp::new()
            .page(
                "https://merlinscans.com/all-series.php?page=2&status=completed&sort=views",
                fixture("merlinscans/all_series_last.html"),
            )
            .page(
                "https://merlinscans.com/all-series.php?page=1&type=webtoon&sort=rating",
                fixture("merlinscans/all_series.html"),
            )
            .shared();
        let source = MerlinScans::with_options(http, options());
        let mut filters = source.filters();
        assert_eq!(filters.len(), 4);

        filters[2] = filters[2].clone().with_choice("completed").unwrap();
        let page = source.search(2, "", &filters).unwrap();
        assert_eq!(page.series[0].url, "/series/son");

        let filters: Vec<_> = source
            .filters()
            .into_iter()
            .map(|f| match f.param.as_str() {
                "type" => f.with_choice("Webtoon").unwrap(),
                "sort" => f.with_choice("rating").unwrap(),
                _ => f,
            })
            .collect();
        assert_eq!(source.search(1, "  ", &filters).unwrap().series.len(), 2);
    }

    #[test]
    fn slug_query_fetches_the_series_page() {
        let http = FakeHttp::new()
            .page(DETAIL_URL, fixture("merlinscans/detail.html"))
            .shared();
        let page = MerlinScans::with_options(http, options())
            .search(1, "slug:kara-kilic", &[])
            .unwrap();
        assert_eq!(page.series.len(), 1);
        assert_eq!(page.series[0].title, "Kara Kılıç");
    }
}

mod detail_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn labelled_metadata_rows() {
        let http = FakeHttp::new()
            .page(DETAIL_URL, fixture("merlinscans/detail.html"))
            .shared();
        let detail = MerlinScans::with_options(http.clone(), options())
            .series_detail("/series.php?slug=kara-kilic")
            .unwrap();

        assert_eq!(http.hit_urls(), vec![DETAIL_URL.to_string()]);
        assert_eq!(detail.summary.url, "/series/kara-kilic");
        assert_eq!(detail.author.as_deref(), Some("Jane Doe"));
        assert_eq!(detail.status, SeriesStatus::Hiatus);
        assert_eq!(detail.genres, vec!["Aksiyon".to_string(), "Dram".to_string()]);
        assert_eq!(
            detail.description.as_deref(),
            Some("Karanlık bir kılıç ve onu taşıyan savaşçı.")
        );
    }
}

mod chapter_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn follows_page_buttons_until_a_page_fails() {
        let http = FakeHttp::new()
            .page(DETAIL_URL, fixture("merlinscans/detail.html"))
            .page(
                "https://merlinscans.com/series/kara-kilic?page=2&sort=desc",
                fixture("merlinscans/chapters_page2.html"),
            )
            .status(
                "https://merlinscans.com/series/kara-kilic?page=3&sort=desc",
                503,
                "",
            )
            .shared();
        let chapters = MerlinScans::with_options(http.clone(), options())
            .chapters("/series/kara-kilic")
            .unwrap();

        let urls: Vec<_> = chapters.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["/chapter.php?id=103", "/chapter.php?id=102", "/chapter.php?id=101"]
        );
        assert_eq!(http.hit_urls().len(), 3);

        let three_hours_ago = reference_time() - chrono::TimeDelta::try_hours(3).unwrap();
        assert_eq!(chapters[0].uploaded_at, three_hours_ago.timestamp_millis());
        assert_eq!(
            chapters[1].uploaded_at,
            Utc.with_ymd_and_hms(2024, 5, 20, 0, 0, 0).unwrap().timestamp_millis()
        );
        assert_eq!(
            chapters[2].uploaded_at,
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap().timestamp_millis()
        );
        assert_eq!(chapters[2].number, 1.0);
    }

    fn capped(max_pages: u32) -> scanlate_core::Options {
        scanlate_core::Options::builder()
            .reference_time(reference_time())
            .max_chapter_pages(max_pages)
            .build()
    }

    #[test]
    fn page_cap_counts_the_series_page() {
        let http = FakeHttp::new()
            .page(DETAIL_URL, fixture("merlinscans/detail.html"))
            .page(
                "https://merlinscans.com/series/kara-kilic?page=2&sort=desc",
                fixture("merlinscans/chapters_page2.html"),
            )
            .shared();

        let chapters = MerlinScans::with_options(http.clone(), capped(2))
            .chapters("/series/kara-kilic")
            .unwrap();
        assert_eq!(chapters.len(), 3);
        assert_eq!(http.hit_urls().len(), 2);

        let chapters = MerlinScans::with_options(http.clone(), capped(1))
            .chapters("/series/kara-kilic")
            .unwrap();
        assert_eq!(chapters.len(), 2);
        assert_eq!(http.hit_urls().len(), 3);
    }
}

mod page_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reader_images_use_lazy_attributes() {
        let http = FakeHttp::new()
            .page(
                "https://merlinscans.com/chapter.php?id=101",
                fixture("merlinscans/reader.html"),
            )
            .shared();
        let pages = MerlinScans::with_options(http, options())
            .pages("/chapter.php?id=101")
            .unwrap();
        let urls: Vec<_> = pages.iter().map(|p| p.image_url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://cdn.merlinscans.com/kara/1/01.jpg",
                "https://cdn.merlinscans.com/kara/1/02.jpg",
                "https://cdn.merlinscans.com/kara/1/03.jpg",
            ]
        );
    }
}
