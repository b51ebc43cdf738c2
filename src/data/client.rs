//! MangaDex proxy API client
//!
//! This module fetches catalog data (search results, popular and latest
//! lists, manga details, chapter feeds, page servers) from the proxy and
//! decodes it into our data structures. Search and popular lists are kept in
//! a short-lived response cache.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use super::{AtHomeServer, Chapter, Collection, Entity, Manga};
use crate::cache::{CacheManager, DEFAULT_TTL};

/// Default base URL of the MangaDex proxy
pub const DEFAULT_BASE_URL: &str = "https://backend-rizr.onrender.com";

/// Cache key for the popular list (it takes no parameters)
const POPULAR_CACHE_KEY: &str = "popular-manga";

/// Tag ID MangaDex uses for "Long Strip" titles, used for the manhwa feed
const MANHWA_TAG_ID: &str = "0716debc-0b16-4b81-846c-479861d5b21b";

/// Query parameters shared by the search and latest listings
const LISTING_PARAMS: [(&str, &str); 4] = [
    ("limit", "24"),
    ("includes[]", "cover_art"),
    ("contentRating[]", "safe"),
    ("contentRating[]", "suggestive"),
];

/// Errors that can occur when talking to the catalog
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The proxy answered with a non-success status
    #[error("{context} (HTTP {status})")]
    Status {
        /// What the request was trying to do
        context: &'static str,
        /// HTTP status code
        status: u16,
    },

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Client for the MangaDex proxy
///
/// Clones share the same response cache.
#[derive(Debug, Clone)]
pub struct MangaClient {
    http_client: Client,
    base_url: String,
    cache: Arc<Mutex<CacheManager<Value>>>,
}

impl Default for MangaClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MangaClient {
    /// Creates a client for the default proxy with a five minute response cache
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a client for a custom proxy URL (a trailing slash is ignored)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http_client: Client::new(),
            base_url,
            cache: Arc::new(Mutex::new(CacheManager::new(DEFAULT_TTL))),
        }
    }

    /// Replaces the response cache with an empty one using the given TTL
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = Arc::new(Mutex::new(CacheManager::new(ttl)));
        self
    }

    /// Returns the proxy base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Searches the catalog by title
    ///
    /// Results are cached under `search-<query>`.
    pub async fn search_manga(&self, query: &str) -> Result<Vec<Manga>, ApiError> {
        let mut params = vec![("title", query)];
        params.extend_from_slice(&LISTING_PARAMS);

        let list: Collection<Manga> = self
            .fetch_cached(
                format!("search-{}", query),
                "/api/mangadex-proxy/manga",
                &params,
                "Failed to search manga",
            )
            .await?;
        Ok(list.data)
    }

    /// Fetches the popular list (cached under `popular-manga`)
    pub async fn popular_manga(&self) -> Result<Vec<Manga>, ApiError> {
        let list: Collection<Manga> = self
            .fetch_cached(
                POPULAR_CACHE_KEY.to_string(),
                "/api/mangadex-popular",
                &[],
                "Failed to fetch popular manga",
            )
            .await?;
        Ok(list.data)
    }

    /// Fetches the most recently updated titles
    pub async fn latest_manga(&self) -> Result<Vec<Manga>, ApiError> {
        let mut params = LISTING_PARAMS.to_vec();
        params.push(("order[updatedAt]", "desc"));

        let value = self
            .fetch(
                "/api/mangadex-proxy/manga",
                &params,
                "Failed to fetch latest manga",
            )
            .await?;
        Ok(decode::<Collection<Manga>>(value)?.data)
    }

    /// Fetches the most followed long-strip titles
    pub async fn manhwa_list(&self) -> Result<Vec<Manga>, ApiError> {
        let params = [
            ("limit", "20"),
            ("includedTags[]", MANHWA_TAG_ID),
            ("order[followedCount]", "desc"),
            ("includes[]", "cover_art"),
        ];

        let value = self
            .fetch("/api/mangadex-proxy/manga", &params, "Failed to fetch manhwa")
            .await?;
        Ok(decode::<Collection<Manga>>(value)?.data)
    }

    /// Fetches a single title with its cover, author and artist relationships
    pub async fn manga_details(&self, id: &str) -> Result<Manga, ApiError> {
        let params = [
            ("includes[]", "cover_art"),
            ("includes[]", "author"),
            ("includes[]", "artist"),
        ];

        let value = self
            .fetch(
                &format!("/api/mangadex-proxy/manga/{}", id),
                &params,
                "Failed to fetch details",
            )
            .await?;
        Ok(decode::<Entity<Manga>>(value)?.data)
    }

    /// Fetches the first ten English chapters of a title
    pub async fn chapters(&self, manga_id: &str) -> Result<Vec<Chapter>, ApiError> {
        let params = [
            ("manga", manga_id),
            ("translatedLanguage[]", "en"),
            ("order[chapter]", "asc"),
            ("limit", "10"),
        ];

        let value = self
            .fetch("/api/mangadex-proxy/chapter", &params, "Failed to fetch chapters")
            .await?;
        Ok(decode::<Collection<Chapter>>(value)?.data)
    }

    /// Fetches the page server and file list for a chapter
    pub async fn chapter_pages(&self, chapter_id: &str) -> Result<AtHomeServer, ApiError> {
        let value = self
            .fetch(
                &format!("/api/mangadex-proxy/at-home/server/{}", chapter_id),
                &[],
                "Failed to fetch chapter pages",
            )
            .await?;
        decode(value)
    }

    /// Fetches a chapter's metadata, including its manga relationship
    pub async fn chapter_info(&self, chapter_id: &str) -> Result<Chapter, ApiError> {
        let value = self
            .fetch(
                &format!("/api/mangadex-proxy/chapter/{}", chapter_id),
                &[],
                "Failed to fetch chapter info",
            )
            .await?;
        Ok(decode::<Entity<Chapter>>(value)?.data)
    }

    /// Fetches the full English chapter feed of a title (up to 500 chapters)
    pub async fn manga_chapters(&self, manga_id: &str) -> Result<Vec<Chapter>, ApiError> {
        let params = [
            ("translatedLanguage[]", "en"),
            ("order[chapter]", "asc"),
            ("limit", "500"),
        ];

        let value = self
            .fetch(
                &format!("/api/mangadex-proxy/manga/{}/feed", manga_id),
                &params,
                "Failed to fetch chapters",
            )
            .await?;
        Ok(decode::<Collection<Chapter>>(value)?.data)
    }

    /// Returns the cached body for `key` decoded as `T`, or fetches it
    ///
    /// Only a body that decodes as `T` is written to the cache. A failed
    /// fetch or a body of the wrong shape leaves the cache untouched; stale
    /// entries are never used as a fallback.
    async fn fetch_cached<T: DeserializeOwned>(
        &self,
        key: String,
        path: &str,
        query: &[(&str, &str)],
        context: &'static str,
    ) -> Result<T, ApiError> {
        let cached = self.lock_cache().get(&key);
        if let Some(value) = cached {
            return decode(value);
        }

        tracing::debug!(key = %key, "cache miss, fetching");
        let value = self.fetch(path, query, context).await?;
        let parsed = decode(value.clone()).inspect_err(
            |e| tracing::warn!(key = %key, error = %e, "response not cached: unexpected shape"),
        )?;
        self.lock_cache().set(key, value);
        Ok(parsed)
    }

    /// Performs a GET request and parses the body as JSON
    async fn fetch(
        &self,
        path: &str,
        query: &[(&str, &str)],
        context: &'static str,
    ) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(query)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .inspect_err(|e| tracing::warn!(url = %url, error = %e, "request failed"))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = status.as_u16(), "{}", context);
            return Err(ApiError::Status {
                context,
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    fn lock_cache(&self) -> MutexGuard<'_, CacheManager<Value>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Decodes a raw JSON body into a typed model
fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    Ok(serde_json::from_value(value)?)
}
