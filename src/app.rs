//! Application state management for mangaterm
//!
//! This module contains the main application state, handling keyboard input,
//! data loading, and state transitions between the home, details and reader
//! views. Key handlers never block on the network: they queue a
//! `PendingAction` which the main loop runs through `App::process_pending`.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent};

use crate::cli::{Feed, StartupConfig};
use crate::data::{ApiError, Chapter, Manga, MangaClient};
use crate::reader::{self, ReaderPage};

/// Delay between the last keystroke in the search box and the search request
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Maximum characters of description shown on the details screen
pub const DESCRIPTION_LIMIT: usize = 600;

/// Application state enum representing the current view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// Initial loading state while fetching data
    Loading,
    /// Manga list (feed or search results)
    Home,
    /// Detail view for a manga
    Details(String),
    /// Reader for a chapter
    Reader(String),
}

/// Network work requested by a key handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    LoadFeed(Feed),
    Search(String),
    OpenDetails(String),
    OpenChapter(String),
}

/// A loaded details screen
#[derive(Debug, Clone)]
pub struct DetailsView {
    pub manga: Manga,
    /// First chapters of the title, in feed order
    pub chapters: Vec<Chapter>,
}

/// Main application struct managing state and data
pub struct App {
    /// Current application state/view
    pub state: AppState,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Feed shown on the home screen when no search is active
    pub feed: Feed,
    /// Text typed into the search box
    pub search_input: String,
    /// Whether keystrokes currently go to the search box
    pub search_focused: bool,
    /// Query whose results are on screen, if any
    pub active_search: Option<String>,
    /// Manga currently listed on the home screen
    pub manga_list: Vec<Manga>,
    /// Index of the selected manga in the home list
    pub selected_index: usize,
    /// Loaded details screen, if any
    pub details: Option<DetailsView>,
    /// Index of the selected chapter on the details screen
    pub chapter_index: usize,
    /// Loaded reader chapter, if any
    pub reader: Option<ReaderPage>,
    /// Scroll offset of the page list in the reader
    pub reader_scroll: u16,
    /// Last error shown to the user
    pub status_message: Option<String>,
    /// Timestamp of the last successful list load
    pub last_refresh: Option<DateTime<Local>>,
    /// When the debounced search fires, if a keystroke is waiting
    search_deadline: Option<Instant>,
    /// Work for the main loop to run
    pending: Option<PendingAction>,
    /// Catalog API client
    client: MangaClient,
}

impl App {
    /// Creates a new App instance with default state, showing the popular feed
    pub fn new() -> Self {
        Self::with_client(MangaClient::new())
    }

    /// Creates a new App instance with a custom client
    pub fn with_client(client: MangaClient) -> Self {
        Self {
            state: AppState::Loading,
            should_quit: false,
            show_help: false,
            feed: Feed::Popular,
            search_input: String::new(),
            search_focused: false,
            active_search: None,
            manga_list: Vec::new(),
            selected_index: 0,
            details: None,
            chapter_index: 0,
            reader: None,
            reader_scroll: 0,
            status_message: None,
            last_refresh: None,
            search_deadline: None,
            pending: Some(PendingAction::LoadFeed(Feed::Popular)),
            client,
        }
    }

    /// Creates a new App instance from the startup configuration.
    ///
    /// `--read` takes priority over `--search`, which takes priority over `--feed`.
    pub fn with_startup_config(config: StartupConfig) -> Self {
        let client = MangaClient::with_base_url(config.base_url).with_cache_ttl(config.cache_ttl);
        let mut app = Self::with_client(client);
        app.feed = config.feed;

        app.pending = Some(if let Some(chapter_id) = config.read_chapter {
            PendingAction::OpenChapter(chapter_id)
        } else if let Some(query) = config.search {
            app.search_input = query.clone();
            PendingAction::Search(query)
        } else {
            PendingAction::LoadFeed(config.feed)
        });

        app
    }

    /// Returns the queued network action, if any
    pub fn pending(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    /// Returns true while a network action is waiting to run
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns when the debounced search will fire, if one is scheduled
    pub fn search_deadline(&self) -> Option<Instant> {
        self.search_deadline
    }

    /// Returns the currently selected manga, if any
    pub fn selected_manga(&self) -> Option<&Manga> {
        self.manga_list.get(self.selected_index)
    }

    /// Heading for the home list
    pub fn list_heading(&self) -> String {
        match &self.active_search {
            Some(query) => format!("Search Results for \"{}\"", query),
            None => self.feed.heading().to_string(),
        }
    }

    /// Message shown when the home list is empty
    pub fn empty_list_message(&self) -> String {
        match &self.active_search {
            Some(query) => format!("No manga found for \"{}\"", query),
            None => "No manga available".to_string(),
        }
    }

    /// Advances time-based state; fires the debounced search once its
    /// deadline has passed
    pub fn tick(&mut self, now: Instant) {
        let Some(deadline) = self.search_deadline else {
            return;
        };
        if now < deadline {
            return;
        }
        self.search_deadline = None;
        self.submit_search();
    }

    /// Runs the queued network action, if any
    pub async fn process_pending(&mut self) {
        let Some(action) = self.pending.take() else {
            return;
        };
        tracing::debug!(?action, "processing");

        match action {
            PendingAction::LoadFeed(feed) => self.load_feed(feed).await,
            PendingAction::Search(query) => self.run_search(query).await,
            PendingAction::OpenDetails(id) => self.open_details(id).await,
            PendingAction::OpenChapter(id) => self.open_chapter(id).await,
        }
    }

    /// Loads a home feed. A failing latest feed falls back to the popular one.
    async fn load_feed(&mut self, feed: Feed) {
        let result = match feed {
            Feed::Popular => self.client.popular_manga().await,
            Feed::Manhwa => self.client.manhwa_list().await,
            Feed::Latest => match self.client.latest_manga().await {
                Ok(list) => Ok(list),
                Err(e) => {
                    tracing::warn!(error = %e, "latest feed failed, falling back to popular");
                    self.client.popular_manga().await
                }
            },
        };

        match result {
            Ok(list) => {
                self.status_message = None;
                self.last_refresh = Some(Local::now());
                self.set_list(list);
            }
            Err(e) => {
                self.report("Failed to load manga", &e);
                self.set_list(Vec::new());
            }
        }
        self.active_search = None;
        self.state = AppState::Home;
    }

    async fn run_search(&mut self, query: String) {
        match self.client.search_manga(&query).await {
            Ok(list) => {
                tracing::info!(query = %query, results = list.len(), "search");
                self.status_message = None;
                self.last_refresh = Some(Local::now());
                self.active_search = Some(query);
                self.set_list(list);
            }
            // The previous list stays on screen
            Err(e) => self.report("Search failed", &e),
        }
        self.state = AppState::Home;
    }

    async fn open_details(&mut self, id: String) {
        let (manga, chapters) = futures::join!(
            self.client.manga_details(&id),
            self.client.chapters(&id)
        );

        let manga = match manga {
            Ok(manga) => manga,
            Err(e) => {
                self.report("Failed to fetch details", &e);
                if self.state == AppState::Loading {
                    self.state = AppState::Home;
                }
                return;
            }
        };
        let chapters = chapters.unwrap_or_else(|e| {
            tracing::warn!(manga_id = %id, error = %e, "chapter list unavailable");
            Vec::new()
        });

        tracing::info!(manga_id = %id, chapters = chapters.len(), "details opened");
        self.status_message = None;
        self.details = Some(DetailsView { manga, chapters });
        self.chapter_index = 0;
        self.state = AppState::Details(id);
    }

    async fn open_chapter(&mut self, id: String) {
        match reader::load_chapter(&self.client, &id).await {
            Ok(page) => {
                self.status_message = None;
                self.reader = Some(page);
                self.reader_scroll = 0;
                self.state = AppState::Reader(id);
            }
            Err(e) => {
                tracing::warn!(chapter_id = %id, error = %e, "failed to open chapter");
                self.status_message = Some(format!("Failed to open chapter: {}", e));
                if self.state == AppState::Loading {
                    self.state = AppState::Home;
                    self.pending = Some(PendingAction::LoadFeed(self.feed));
                }
            }
        }
    }

    fn report(&mut self, what: &str, error: &ApiError) {
        tracing::warn!(error = %error, "{}", what);
        self.status_message = Some(format!("{}: {}", what, error));
    }

    fn set_list(&mut self, list: Vec<Manga>) {
        self.manga_list = list;
        self.selected_index = 0;
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `q`: Quit (`Esc` also quits from the home list)
    /// - `Up`/`k`, `Down`/`j`: Move selection / scroll
    /// - `Enter`: Open the selected manga or chapter
    /// - `/`: Focus the search box (home)
    /// - `1`/`2`/`3`: Popular / latest / manhwa feed (home)
    /// - `r`: Reload the list (home) or read the first chapter (details)
    /// - `Right`/`l`, `Left`/`h`: Next / previous chapter (reader)
    /// - `Esc`: Go back
    /// - `?`: Toggle help
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Handle help overlay - intercepts all keys when shown
        if self.show_help {
            if matches!(
                key_event.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                self.show_help = false;
            }
            return;
        }

        if self.search_focused {
            self.handle_search_key(key_event);
            return;
        }

        match self.state {
            AppState::Loading => {
                // Only quit is allowed during loading
                if key_event.code == KeyCode::Char('q') {
                    self.should_quit = true;
                }
            }
            AppState::Home => match key_event.code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.should_quit = true;
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.move_selection_up();
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.move_selection_down();
                }
                KeyCode::Enter => {
                    if let Some(manga) = self.selected_manga() {
                        self.pending = Some(PendingAction::OpenDetails(manga.id.clone()));
                    }
                }
                KeyCode::Char('/') => {
                    self.search_focused = true;
                }
                KeyCode::Char('1') => self.change_feed(Feed::Popular),
                KeyCode::Char('2') => self.change_feed(Feed::Latest),
                KeyCode::Char('3') => self.change_feed(Feed::Manhwa),
                KeyCode::Char('r') => {
                    self.pending = Some(match &self.active_search {
                        Some(query) => PendingAction::Search(query.clone()),
                        None => PendingAction::LoadFeed(self.feed),
                    });
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
            AppState::Details(_) => match key_event.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                }
                KeyCode::Esc => {
                    self.go_home();
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.chapter_index = self.chapter_index.saturating_sub(1);
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    let count = self.details.as_ref().map_or(0, |d| d.chapters.len());
                    if self.chapter_index + 1 < count {
                        self.chapter_index += 1;
                    }
                }
                KeyCode::Enter => {
                    self.open_chapter_at(self.chapter_index);
                }
                KeyCode::Char('r') => {
                    self.open_chapter_at(0);
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
            AppState::Reader(_) => match key_event.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                }
                KeyCode::Esc => {
                    self.leave_reader();
                }
                KeyCode::Right | KeyCode::Char('l') => {
                    self.go_to_next_chapter();
                }
                KeyCode::Left | KeyCode::Char('h') => {
                    self.go_to_previous_chapter();
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.scroll_down();
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.reader_scroll = self.reader_scroll.saturating_sub(1);
                }
                KeyCode::Char('g') => {
                    self.reader_scroll = 0;
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
        }
    }

    /// Keystrokes while the search box has focus
    fn handle_search_key(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Enter => {
                self.search_focused = false;
                self.search_deadline = None;
                self.submit_search();
            }
            KeyCode::Esc => {
                self.search_focused = false;
            }
            KeyCode::Backspace => {
                self.search_input.pop();
                self.search_deadline = Some(Instant::now() + SEARCH_DEBOUNCE);
            }
            KeyCode::Char(c) => {
                self.search_input.push(c);
                self.search_deadline = Some(Instant::now() + SEARCH_DEBOUNCE);
            }
            _ => {}
        }
    }

    /// Queues a search for the typed query, or the active feed if it is blank
    fn submit_search(&mut self) {
        let query = self.search_input.trim();
        self.pending = Some(if query.is_empty() {
            PendingAction::LoadFeed(self.feed)
        } else {
            PendingAction::Search(query.to_string())
        });
    }

    /// Switches the home feed and clears any search
    fn change_feed(&mut self, feed: Feed) {
        self.feed = feed;
        self.search_input.clear();
        self.search_deadline = None;
        self.pending = Some(PendingAction::LoadFeed(feed));
    }

    fn open_chapter_at(&mut self, index: usize) {
        let chapter_id = self
            .details
            .as_ref()
            .and_then(|d| d.chapters.get(index))
            .map(|ch| ch.id.clone());
        if let Some(id) = chapter_id {
            self.pending = Some(PendingAction::OpenChapter(id));
        }
    }

    /// Queues the next chapter; does nothing on the last one
    pub fn go_to_next_chapter(&mut self) {
        let next = self
            .reader
            .as_ref()
            .and_then(|r| r.nav.next())
            .map(|ch| ch.id.clone());
        if let Some(id) = next {
            self.pending = Some(PendingAction::OpenChapter(id));
        }
    }

    /// Queues the previous chapter; does nothing on the first one
    pub fn go_to_previous_chapter(&mut self) {
        let previous = self
            .reader
            .as_ref()
            .and_then(|r| r.nav.previous())
            .map(|ch| ch.id.clone());
        if let Some(id) = previous {
            self.pending = Some(PendingAction::OpenChapter(id));
        }
    }

    /// Returns to the chapter's details screen, loading it if needed
    fn leave_reader(&mut self) {
        let Some(manga_id) = self.reader.as_ref().map(|r| r.manga_id.clone()) else {
            self.go_home();
            return;
        };

        let details_loaded = self
            .details
            .as_ref()
            .is_some_and(|d| d.manga.id == manga_id);
        if details_loaded {
            self.state = AppState::Details(manga_id);
        } else {
            self.state = AppState::Home;
            self.pending = Some(PendingAction::OpenDetails(manga_id));
        }
    }

    /// Shows the home list, queueing the active feed if no list was ever
    /// loaded (e.g. after starting straight in the reader)
    fn go_home(&mut self) {
        self.state = AppState::Home;
        let never_loaded = self.last_refresh.is_none() && self.active_search.is_none();
        if never_loaded && self.pending.is_none() {
            self.pending = Some(PendingAction::LoadFeed(self.feed));
        }
    }

    fn scroll_down(&mut self) {
        let max = self
            .reader
            .as_ref()
            .map_or(0, |r| r.pages.len().saturating_sub(1));
        let max = u16::try_from(max).unwrap_or(u16::MAX);
        if self.reader_scroll < max {
            self.reader_scroll += 1;
        }
    }

    /// Moves the selection up in the list, wrapping to bottom if at top
    fn move_selection_up(&mut self) {
        let count = self.manga_list.len();
        if count == 0 {
            return;
        }
        if self.selected_index == 0 {
            self.selected_index = count - 1;
        } else {
            self.selected_index -= 1;
        }
    }

    /// Moves the selection down in the list, wrapping to top if at bottom
    fn move_selection_down(&mut self) {
        let count = self.manga_list.len();
        if count == 0 {
            return;
        }
        self.selected_index = (self.selected_index + 1) % count;
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
