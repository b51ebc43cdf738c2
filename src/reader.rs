//! Chapter ordering and next/previous navigation for the reader
//!
//! Loading a chapter takes four requests: the chapter's metadata (to learn
//! which manga it belongs to), that manga's full chapter feed, and finally the
//! page server for the chapter itself.

use std::cmp::Ordering;

use thiserror::Error;

use crate::data::{ApiError, Chapter, MangaClient};

/// Errors that can occur when opening a chapter
#[derive(Debug, Error)]
pub enum ReaderError {
    /// A catalog request failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The chapter metadata has no manga relationship
    #[error("Chapter {0} is not linked to a manga")]
    MissingManga(String),
}

/// Sorts chapters by numeric chapter number, ascending
///
/// The sort is stable. Chapters whose number is missing or not numeric keep
/// their relative order and go after every numbered chapter.
pub fn sort_chapters(chapters: &mut [Chapter]) {
    chapters.sort_by(|a, b| match (a.number(), b.number()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Position of the open chapter within its manga's sorted chapter feed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChapterNav {
    chapters: Vec<Chapter>,
    current: Option<usize>,
}

impl ChapterNav {
    /// Sorts `chapters` and locates `current_id` in the result
    pub fn new(mut chapters: Vec<Chapter>, current_id: &str) -> Self {
        sort_chapters(&mut chapters);
        let current = chapters.iter().position(|ch| ch.id == current_id);
        Self { chapters, current }
    }

    /// The sorted feed
    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    /// Index of the open chapter, if it was found in the feed
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// The open chapter, if it was found in the feed
    pub fn current(&self) -> Option<&Chapter> {
        self.chapters.get(self.current?)
    }

    /// The chapter after the open one; `None` on the last chapter
    pub fn next(&self) -> Option<&Chapter> {
        self.chapters.get(self.current? + 1)
    }

    /// The chapter before the open one; `None` on the first chapter
    pub fn previous(&self) -> Option<&Chapter> {
        let index = self.current?.checked_sub(1)?;
        self.chapters.get(index)
    }
}

/// Everything needed to display one chapter
#[derive(Debug, Clone, PartialEq)]
pub struct ReaderPage {
    pub chapter_id: String,
    pub manga_id: String,
    pub nav: ChapterNav,
    /// Page image URLs in reading order
    pub pages: Vec<String>,
}

impl ReaderPage {
    /// Header label, e.g. "Chapter 3"
    pub fn title(&self) -> String {
        self.nav
            .current()
            .map(Chapter::label)
            .unwrap_or_else(|| "Chapter ?".to_string())
    }
}

/// Loads a chapter's navigation context and page URLs
pub async fn load_chapter(client: &MangaClient, chapter_id: &str) -> Result<ReaderPage, ReaderError> {
    let info = client.chapter_info(chapter_id).await?;
    let manga_id = info
        .manga_id()
        .ok_or_else(|| ReaderError::MissingManga(chapter_id.to_string()))?
        .to_string();

    let feed = client.manga_chapters(&manga_id).await?;
    let nav = ChapterNav::new(feed, chapter_id);

    let server = client.chapter_pages(chapter_id).await?;
    tracing::info!(
        chapter_id,
        manga_id = %manga_id,
        pages = server.chapter.data.len(),
        "chapter loaded"
    );

    Ok(ReaderPage {
        chapter_id: chapter_id.to_string(),
        manga_id,
        nav,
        pages: server.page_urls(),
    })
}
