//! Integration tests for the catalog client and its response cache
//!
//! Runs a small axum server on an ephemeral port that mimics the MangaDex
//! proxy and records every request it receives.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde_json::{json, Value};

use mangaterm::app::{App, AppState};
use mangaterm::cli::{Feed, StartupConfig};
use mangaterm::data::{ApiError, MangaClient};
use mangaterm::reader::{self, ReaderError};

// == Mock Catalog ==

#[derive(Clone, Default)]
struct Catalog {
    /// Route names in the order they were requested
    hits: Arc<Mutex<Vec<&'static str>>>,
    /// Route names that currently answer with HTTP 500
    failing: Arc<Mutex<HashSet<&'static str>>>,
    /// Route names that currently answer 200 with a body of the wrong shape
    malformed: Arc<Mutex<HashSet<&'static str>>>,
}

impl Catalog {
    fn hits(&self, route: &str) -> usize {
        self.hits.lock().unwrap().iter().filter(|r| **r == route).count()
    }

    fn set_failing(&self, route: &'static str, failing: bool) {
        toggle(&self.failing, route, failing);
    }

    fn set_malformed(&self, route: &'static str, malformed: bool) {
        toggle(&self.malformed, route, malformed);
    }

    /// Records the hit and returns the body, a 500 if the route is failing,
    /// or a wrongly shaped body if it is malformed
    fn respond(&self, route: &'static str, body: Value) -> Response {
        self.hits.lock().unwrap().push(route);
        if self.failing.lock().unwrap().contains(route) {
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
        if self.malformed.lock().unwrap().contains(route) {
            return Json(json!({ "data": 5 })).into_response();
        }
        Json(body).into_response()
    }
}

fn toggle(set: &Mutex<HashSet<&'static str>>, route: &'static str, on: bool) {
    let mut set = set.lock().unwrap();
    if on {
        set.insert(route);
    } else {
        set.remove(route);
    }
}

fn manga_json(id: &str, title: &str) -> Value {
    json!({
        "id": id,
        "type": "manga",
        "attributes": { "title": { "en": title }, "description": {}, "status": "ongoing" },
        "relationships": [
            { "id": format!("cover-{}", id), "type": "cover_art", "attributes": { "fileName": "cover.jpg" } }
        ]
    })
}

fn chapter_json(id: &str, number: &str) -> Value {
    json!({
        "id": id,
        "type": "chapter",
        "attributes": { "chapter": number },
        "relationships": [ { "id": "m1", "type": "manga" } ]
    })
}

async fn popular(State(catalog): State<Catalog>) -> Response {
    catalog.respond(
        "popular",
        json!({ "data": [manga_json("p1", "Popular One"), manga_json("p2", "Popular Two")] }),
    )
}

async fn manga_list(
    State(catalog): State<Catalog>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let param = |name: &str| {
        params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    };

    if let Some(title) = param("title") {
        return catalog.respond(
            "search",
            json!({ "data": [manga_json(&format!("s-{}", title), &format!("Result for {}", title))] }),
        );
    }
    if param("order[updatedAt]").is_some() {
        return catalog.respond("latest", json!({ "data": [manga_json("l1", "Latest One")] }));
    }
    catalog.respond("manhwa", json!({ "data": [manga_json("w1", "Manhwa One")] }))
}

async fn manga_details(State(catalog): State<Catalog>, Path(id): Path<String>) -> Response {
    catalog.respond("details", json!({ "result": "ok", "data": manga_json(&id, "Detailed") }))
}

async fn manga_feed(State(catalog): State<Catalog>, Path(_id): Path<String>) -> Response {
    catalog.respond(
        "feed",
        json!({ "data": [chapter_json("c10", "10"), chapter_json("c2", "2"), chapter_json("c1", "1")] }),
    )
}

async fn chapter_list(State(catalog): State<Catalog>) -> Response {
    catalog.respond(
        "chapters",
        json!({ "data": [chapter_json("c1", "1"), chapter_json("c2", "2")] }),
    )
}

async fn chapter_info(State(catalog): State<Catalog>, Path(id): Path<String>) -> Response {
    let body = if id == "orphan" {
        json!({ "data": { "id": "orphan", "attributes": { "chapter": "1" }, "relationships": [] } })
    } else {
        json!({ "data": chapter_json(&id, "2") })
    };
    catalog.respond("chapter_info", body)
}

async fn at_home(State(catalog): State<Catalog>, Path(_id): Path<String>) -> Response {
    catalog.respond(
        "at_home",
        json!({
            "result": "ok",
            "baseUrl": "https://cdn.test",
            "chapter": { "hash": "abc", "data": ["1.png", "2.png", "3.png"] }
        }),
    )
}

/// Starts the mock catalog and returns its state and base URL
async fn spawn_catalog() -> (Catalog, String) {
    let catalog = Catalog::default();
    let router = Router::new()
        .route("/api/mangadex-popular", get(popular))
        .route("/api/mangadex-proxy/manga", get(manga_list))
        .route("/api/mangadex-proxy/manga/:id", get(manga_details))
        .route("/api/mangadex-proxy/manga/:id/feed", get(manga_feed))
        .route("/api/mangadex-proxy/chapter", get(chapter_list))
        .route("/api/mangadex-proxy/chapter/:id", get(chapter_info))
        .route("/api/mangadex-proxy/at-home/server/:id", get(at_home))
        .with_state(catalog.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (catalog, format!("http://{}", addr))
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

// == Cache Behaviour ==

#[tokio::test]
async fn test_popular_is_fetched_once_within_ttl() {
    let (catalog, base_url) = spawn_catalog().await;
    let client = MangaClient::with_base_url(base_url);

    let first = client.popular_manga().await.unwrap();
    let second = client.popular_manga().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].display_title(), "Popular One");
    assert_eq!(catalog.hits("popular"), 1);
}

#[tokio::test]
async fn test_search_is_cached_per_query() {
    let (catalog, base_url) = spawn_catalog().await;
    let client = MangaClient::with_base_url(base_url);

    let naruto = client.search_manga("naruto").await.unwrap();
    client.search_manga("naruto").await.unwrap();
    let bleach = client.search_manga("bleach").await.unwrap();

    assert_eq!(naruto[0].display_title(), "Result for naruto");
    assert_eq!(bleach[0].display_title(), "Result for bleach");
    assert_eq!(catalog.hits("search"), 2);
}

#[tokio::test]
async fn test_search_query_is_url_encoded() {
    let (_catalog, base_url) = spawn_catalog().await;
    let client = MangaClient::with_base_url(base_url);

    let results = client.search_manga("one piece & friends").await.unwrap();

    assert_eq!(results[0].display_title(), "Result for one piece & friends");
}

#[tokio::test]
async fn test_uncached_endpoints_hit_the_network_every_time() {
    let (catalog, base_url) = spawn_catalog().await;
    let client = MangaClient::with_base_url(base_url);

    client.latest_manga().await.unwrap();
    client.latest_manga().await.unwrap();
    client.manhwa_list().await.unwrap();
    client.manhwa_list().await.unwrap();

    assert_eq!(catalog.hits("latest"), 2);
    assert_eq!(catalog.hits("manhwa"), 2);
}

#[tokio::test]
async fn test_expired_entry_is_refetched() {
    let (catalog, base_url) = spawn_catalog().await;
    let client = MangaClient::with_base_url(base_url).with_cache_ttl(Duration::from_millis(50));

    client.popular_manga().await.unwrap();
    tokio::time::sleep(Duration::from_millis(120)).await;
    client.popular_manga().await.unwrap();

    assert_eq!(catalog.hits("popular"), 2);
}

#[tokio::test]
async fn test_failed_fetch_is_not_cached() {
    let (catalog, base_url) = spawn_catalog().await;
    let client = MangaClient::with_base_url(base_url);

    catalog.set_failing("search", true);
    let err = client.search_manga("berserk").await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 500, .. }));
    assert!(err.to_string().contains("Failed to search manga"));

    catalog.set_failing("search", false);
    let results = client.search_manga("berserk").await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(catalog.hits("search"), 2);
}

#[tokio::test]
async fn test_valid_cached_entry_survives_backend_failure() {
    let (catalog, base_url) = spawn_catalog().await;
    let client = MangaClient::with_base_url(base_url);

    let fresh = client.popular_manga().await.unwrap();
    catalog.set_failing("popular", true);

    let cached = client.popular_manga().await.unwrap();

    assert_eq!(fresh, cached);
    assert_eq!(catalog.hits("popular"), 1);
}

#[tokio::test]
async fn test_stale_entry_is_not_a_fallback_for_failures() {
    let (catalog, base_url) = spawn_catalog().await;
    let client = MangaClient::with_base_url(base_url).with_cache_ttl(Duration::from_millis(50));

    client.popular_manga().await.unwrap();
    tokio::time::sleep(Duration::from_millis(120)).await;
    catalog.set_failing("popular", true);

    assert!(client.popular_manga().await.is_err());

    catalog.set_failing("popular", false);
    assert!(client.popular_manga().await.is_ok());
    assert_eq!(catalog.hits("popular"), 3);
}

#[tokio::test]
async fn test_malformed_body_is_not_cached() {
    let (catalog, base_url) = spawn_catalog().await;
    let client = MangaClient::with_base_url(base_url);

    catalog.set_malformed("popular", true);
    let err = client.popular_manga().await.unwrap_err();
    assert!(matches!(err, ApiError::ParseError(_)));

    catalog.set_malformed("popular", false);
    let list = client.popular_manga().await.unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(catalog.hits("popular"), 2);

    // The valid body is cached
    client.popular_manga().await.unwrap();
    assert_eq!(catalog.hits("popular"), 2);
}

#[tokio::test]
async fn test_malformed_search_does_not_clobber_cached_entry() {
    let (catalog, base_url) = spawn_catalog().await;
    let client = MangaClient::with_base_url(base_url).with_cache_ttl(Duration::from_millis(50));

    client.search_manga("vinland").await.unwrap();
    tokio::time::sleep(Duration::from_millis(120)).await;
    catalog.set_malformed("search", true);
    assert!(client.search_manga("vinland").await.is_err());

    catalog.set_malformed("search", false);
    let results = client.search_manga("vinland").await.unwrap();
    assert_eq!(results[0].display_title(), "Result for vinland");
    assert_eq!(catalog.hits("search"), 3);
}

// == Reader ==

#[tokio::test]
async fn test_load_chapter_builds_navigation_and_pages() {
    let (catalog, base_url) = spawn_catalog().await;
    let client = MangaClient::with_base_url(base_url);

    let page = reader::load_chapter(&client, "c2").await.unwrap();

    assert_eq!(page.manga_id, "m1");
    assert_eq!(page.title(), "Chapter 2");
    assert_eq!(page.nav.previous().map(|c| c.id.as_str()), Some("c1"));
    assert_eq!(page.nav.next().map(|c| c.id.as_str()), Some("c10"));
    assert_eq!(
        page.pages,
        vec![
            "https://cdn.test/data/abc/1.png",
            "https://cdn.test/data/abc/2.png",
            "https://cdn.test/data/abc/3.png",
        ]
    );
    assert_eq!(catalog.hits("chapter_info"), 1);
    assert_eq!(catalog.hits("feed"), 1);
    assert_eq!(catalog.hits("at_home"), 1);
}

#[tokio::test]
async fn test_load_chapter_without_manga_relationship() {
    let (_catalog, base_url) = spawn_catalog().await;
    let client = MangaClient::with_base_url(base_url);

    let err = reader::load_chapter(&client, "orphan").await.unwrap_err();

    assert!(matches!(err, ReaderError::MissingManga(ref id) if id == "orphan"));
}

// == Application Flow ==

#[tokio::test]
async fn test_app_loads_popular_on_start() {
    let (_catalog, base_url) = spawn_catalog().await;
    let mut app = App::with_client(MangaClient::with_base_url(base_url));

    app.process_pending().await;

    assert_eq!(app.state, AppState::Home);
    assert_eq!(app.manga_list.len(), 2);
    assert!(app.last_refresh.is_some());
    assert!(!app.is_busy());
}

#[tokio::test]
async fn test_app_latest_falls_back_to_popular() {
    let (catalog, base_url) = spawn_catalog().await;
    let mut app = App::with_client(MangaClient::with_base_url(base_url));
    app.process_pending().await;

    catalog.set_failing("latest", true);
    app.handle_key(key(KeyCode::Char('2')));
    app.process_pending().await;

    assert_eq!(app.feed, Feed::Latest);
    assert_eq!(app.manga_list[0].display_title(), "Popular One");
    assert!(app.status_message.is_none());
    // The fallback is served from the cache
    assert_eq!(catalog.hits("popular"), 1);
}

#[tokio::test]
async fn test_app_reports_when_every_feed_fails() {
    let (catalog, base_url) = spawn_catalog().await;
    catalog.set_failing("popular", true);
    let mut app = App::with_client(MangaClient::with_base_url(base_url));

    app.process_pending().await;

    assert_eq!(app.state, AppState::Home);
    assert!(app.manga_list.is_empty());
    let message = app.status_message.as_deref().unwrap_or_default();
    assert!(message.contains("Failed to load manga"), "got {:?}", message);
}

#[tokio::test]
async fn test_app_failed_search_keeps_previous_list() {
    let (catalog, base_url) = spawn_catalog().await;
    let mut app = App::with_client(MangaClient::with_base_url(base_url));
    app.process_pending().await;

    catalog.set_failing("search", true);
    app.handle_key(key(KeyCode::Char('/')));
    for c in "gantz".chars() {
        app.handle_key(key(KeyCode::Char(c)));
    }
    app.handle_key(key(KeyCode::Enter));
    app.process_pending().await;

    assert_eq!(app.manga_list.len(), 2);
    assert!(app.active_search.is_none());
    assert!(app.status_message.is_some());
}

#[tokio::test]
async fn test_app_search_details_and_reader() {
    let (_catalog, base_url) = spawn_catalog().await;
    let mut app = App::with_client(MangaClient::with_base_url(base_url));
    app.process_pending().await;

    // Search
    app.handle_key(key(KeyCode::Char('/')));
    for c in "frieren".chars() {
        app.handle_key(key(KeyCode::Char(c)));
    }
    app.handle_key(key(KeyCode::Enter));
    app.process_pending().await;
    assert_eq!(app.active_search.as_deref(), Some("frieren"));
    assert_eq!(app.list_heading(), "Search Results for \"frieren\"");

    // Details
    app.handle_key(key(KeyCode::Enter));
    app.process_pending().await;
    assert_eq!(app.state, AppState::Details("s-frieren".to_string()));
    let details = app.details.as_ref().expect("details should be loaded");
    assert_eq!(details.chapters.len(), 2);

    // Reader, then next chapter
    app.handle_key(key(KeyCode::Down));
    app.handle_key(key(KeyCode::Enter));
    app.process_pending().await;
    assert_eq!(app.state, AppState::Reader("c2".to_string()));
    assert_eq!(app.reader.as_ref().map(|r| r.pages.len()), Some(3));

    app.handle_key(key(KeyCode::Right));
    app.process_pending().await;
    assert_eq!(app.state, AppState::Reader("c10".to_string()));

    // Last chapter: no further navigation
    app.handle_key(key(KeyCode::Right));
    assert!(!app.is_busy());
}

#[tokio::test]
async fn test_app_started_in_reader_loads_feed_when_going_home() {
    let (catalog, base_url) = spawn_catalog().await;
    let config = StartupConfig {
        read_chapter: Some("c2".to_string()),
        base_url,
        ..Default::default()
    };
    let mut app = App::with_startup_config(config);

    app.process_pending().await;
    assert_eq!(app.state, AppState::Reader("c2".to_string()));

    app.handle_key(key(KeyCode::Esc));
    app.process_pending().await;
    assert_eq!(app.state, AppState::Details("m1".to_string()));

    app.handle_key(key(KeyCode::Esc));
    app.process_pending().await;

    assert_eq!(app.state, AppState::Home);
    assert_eq!(app.manga_list.len(), 2);
    assert_eq!(catalog.hits("popular"), 1);
}
