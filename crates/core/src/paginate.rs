// ABOUTME: Sequential chapter-list pagination that keeps partial results when a page fails.
// ABOUTME: Stops at the reported total, on a page with nothing new, on error, or at the page cap.

use std::collections::HashSet;

use crate::error::Result;
use crate::models::Chapter;

/// Chapters from one page plus what the source said about further pages.
#[derive(Debug, Clone, Default)]
pub struct ChapterBatch {
    pub chapters: Vec<Chapter>,
    /// Total page count reported by the source, if any.
    pub total_pages: Option<u32>,
    /// Explicit "there is a next page" signal, if any.
    pub has_next: Option<bool>,
}

/// Chapters in first-seen order, unique by url.
#[derive(Debug, Default)]
pub struct ChapterAccumulator {
    seen: HashSet<String>,
    chapters: Vec<Chapter>,
}

impl ChapterAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add chapters whose url is new. Returns how many were added.
    pub fn extend<I: IntoIterator<Item = Chapter>>(&mut self, chapters: I) -> usize {
        let before = self.chapters.len();
        for chapter in chapters {
            if self.seen.insert(chapter.url.clone()) {
                self.chapters.push(chapter);
            }
        }
        self.chapters.len() - before
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn into_chapters(self) -> Vec<Chapter> {
        self.chapters
    }
}

/// Fetch pages `start..` until the source runs out.
///
/// At most `max_pages` fetches are made. A fetch error ends the loop and the
/// chapters gathered so far are returned.
pub fn paginate<F>(
    mut acc: ChapterAccumulator,
    start: u32,
    max_pages: u32,
    mut fetch: F,
) -> Vec<Chapter>
where
    F: FnMut(u32) -> Result<ChapterBatch>,
{
    let mut page = start;
    for _ in 0..max_pages {
        let batch = match fetch(page) {
            Ok(batch) => batch,
            Err(err) => {
                log::warn!(
                    "chapter page {} failed, keeping {} chapters: {}",
                    page,
                    acc.len(),
                    err
                );
                break;
            }
        };
        let added = acc.extend(batch.chapters);
        if added == 0 {
            log::debug!("chapter page {} added nothing, stopping", page);
            break;
        }
        let more = match (batch.total_pages, batch.has_next) {
            (Some(total), _) => page < total,
            (None, Some(next)) => next,
            (None, None) => true,
        };
        if !more {
            break;
        }
        page += 1;
    }
    acc.into_chapters()
}
