//! Core data models for mangaterm
//!
//! This module contains the catalog types returned by the MangaDex proxy and
//! the client used to fetch them.

pub mod client;

pub use client::{ApiError, MangaClient, DEFAULT_BASE_URL};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Host serving cover images
const COVER_BASE_URL: &str = "https://uploads.mangadex.org/covers";

/// Title languages tried in order before falling back to any title at all
const TITLE_LANGUAGES: [&str; 3] = ["en", "ja-ro", "ja"];

/// List envelope returned by collection endpoints (`{"data": [...]}`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// Single-entity envelope (`{"data": {...}}`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity<T> {
    pub data: T,
}

/// A manga title in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manga {
    pub id: String,
    #[serde(default)]
    pub attributes: MangaAttributes,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MangaAttributes {
    /// Titles keyed by language code
    #[serde(default)]
    pub title: HashMap<String, String>,
    /// Descriptions keyed by language code
    #[serde(default)]
    pub description: HashMap<String, String>,
    /// Publication status ("ongoing", "completed", ...)
    #[serde(default)]
    pub status: Option<String>,
}

/// A link from one catalog entity to another (cover art, author, manga, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub attributes: Option<RelationshipAttributes>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipAttributes {
    #[serde(rename = "fileName", default)]
    pub file_name: Option<String>,
}

/// A single chapter of a manga
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: String,
    #[serde(default)]
    pub attributes: ChapterAttributes,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChapterAttributes {
    /// Chapter number as published; may be missing or non-numeric
    #[serde(default)]
    pub chapter: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Page delivery information for a chapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtHomeServer {
    #[serde(rename = "baseUrl")]
    pub base_url: String,
    pub chapter: AtHomeChapter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtHomeChapter {
    pub hash: String,
    /// Page file names in reading order
    #[serde(default)]
    pub data: Vec<String>,
}

impl Manga {
    /// Best human-readable title: English, then romanized Japanese, then
    /// Japanese, then whatever else is present
    pub fn display_title(&self) -> String {
        let titles = &self.attributes.title;
        TITLE_LANGUAGES
            .iter()
            .filter_map(|lang| titles.get(*lang))
            .chain(titles.values())
            .find(|title| !title.is_empty())
            .cloned()
            .unwrap_or_else(|| "Unknown Title".to_string())
    }

    /// English description cut to at most `limit` characters
    pub fn description_en(&self, limit: usize) -> String {
        match self.attributes.description.get("en") {
            Some(text) if !text.trim().is_empty() => text.chars().take(limit).collect(),
            _ => "No description available.".to_string(),
        }
    }

    /// URL of the 512px cover thumbnail, if the response included cover art
    pub fn cover_url(&self) -> Option<String> {
        let file_name = self
            .relationships
            .iter()
            .find(|rel| rel.kind == "cover_art")?
            .attributes
            .as_ref()?
            .file_name
            .as_deref()?;
        Some(format!("{}/{}/{}.512.jpg", COVER_BASE_URL, self.id, file_name))
    }
}

impl Chapter {
    /// Label shown in chapter lists, e.g. "Chapter 12"
    pub fn label(&self) -> String {
        match self.attributes.chapter.as_deref() {
            Some(number) if !number.is_empty() => format!("Chapter {}", number),
            _ => "Chapter ?".to_string(),
        }
    }

    /// Chapter number parsed as a float, if it is numeric
    pub fn number(&self) -> Option<f64> {
        self.attributes.chapter.as_deref()?.trim().parse().ok()
    }

    /// ID of the manga this chapter belongs to
    pub fn manga_id(&self) -> Option<&str> {
        self.relationships
            .iter()
            .find(|rel| rel.kind == "manga")
            .map(|rel| rel.id.as_str())
    }
}

impl AtHomeServer {
    /// Full image URLs for every page, in reading order
    pub fn page_urls(&self) -> Vec<String> {
        self.chapter
            .data
            .iter()
            .map(|file| format!("{}/data/{}/{}", self.base_url, self.chapter.hash, file))
            .collect()
    }
}
