//! Command-line interface parsing for mangaterm
//!
//! This module handles parsing of CLI arguments using clap and turns them
//! into a validated `StartupConfig`.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::data::DEFAULT_BASE_URL;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified feed name is not recognized
    #[error("Invalid feed: '{0}'. Valid feeds: popular, latest, manhwa")]
    InvalidFeed(String),

    /// A zero TTL would make the response cache useless
    #[error("Invalid cache TTL: must be at least 1 second")]
    InvalidTtl,

    /// Search query is blank
    #[error("Search query must not be empty")]
    EmptySearch,
}

/// Which list the home screen shows when no search is active
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Feed {
    #[default]
    Popular,
    Latest,
    Manhwa,
}

impl FromStr for Feed {
    type Err = CliError;

    /// Parses a feed name (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "popular" | "hot" => Ok(Feed::Popular),
            "latest" | "new" => Ok(Feed::Latest),
            "manhwa" => Ok(Feed::Manhwa),
            _ => Err(CliError::InvalidFeed(s.to_string())),
        }
    }
}

impl Feed {
    /// Heading shown above the list
    pub fn heading(&self) -> &'static str {
        match self {
            Feed::Popular => "Popular Today",
            Feed::Latest => "Latest Releases",
            Feed::Manhwa => "Top Manhwa",
        }
    }
}

/// mangaterm - Browse and read manga from the terminal
#[derive(Parser, Debug)]
#[command(name = "mangaterm")]
#[command(about = "Browse, search and read manga in the terminal")]
#[command(version)]
pub struct Cli {
    /// Start with a title search
    #[arg(long, value_name = "QUERY")]
    pub search: Option<String>,

    /// Home feed to show first: popular, latest or manhwa
    #[arg(long, value_name = "FEED", default_value = "popular")]
    pub feed: String,

    /// Open a chapter in the reader right away
    #[arg(long, value_name = "CHAPTER_ID")]
    pub read: Option<String>,

    /// Base URL of the MangaDex proxy
    #[arg(long, env = "MANGATERM_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Seconds to reuse search and popular responses
    #[arg(long, value_name = "SECONDS", default_value_t = 300)]
    pub cache_ttl: u64,

    /// Where to write the log (defaults to the user data directory)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, PartialEq)]
pub struct StartupConfig {
    pub feed: Feed,
    pub search: Option<String>,
    pub read_chapter: Option<String>,
    pub base_url: String,
    pub cache_ttl: Duration,
    pub log_file: Option<PathBuf>,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            feed: Feed::Popular,
            search: None,
            read_chapter: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_ttl: Duration::from_secs(300),
            log_file: None,
        }
    }
}

/// Parses a feed string argument into a Feed.
///
/// # Returns
/// * `Ok(Feed)` if the string matches a valid feed
/// * `Err(CliError::InvalidFeed)` if it doesn't
pub fn parse_feed_arg(s: &str) -> Result<Feed, CliError> {
    s.parse()
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with validated settings
    /// * `Err(CliError)` if the feed is unknown, the TTL is zero or the
    ///   search query is blank
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let feed = parse_feed_arg(&cli.feed)?;

        if cli.cache_ttl == 0 {
            return Err(CliError::InvalidTtl);
        }

        let search = match cli.search.as_deref().map(str::trim) {
            Some("") => return Err(CliError::EmptySearch),
            Some(query) => Some(query.to_string()),
            None => None,
        };

        Ok(StartupConfig {
            feed,
            search,
            read_chapter: cli.read.clone(),
            base_url: cli.base_url.clone(),
            cache_ttl: Duration::from_secs(cli.cache_ttl),
            log_file: cli.log_file.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_feed_arg_aliases() {
        assert_eq!(parse_feed_arg("popular").unwrap(), Feed::Popular);
        assert_eq!(parse_feed_arg("hot").unwrap(), Feed::Popular);
        assert_eq!(parse_feed_arg("Latest").unwrap(), Feed::Latest);
        assert_eq!(parse_feed_arg("new").unwrap(), Feed::Latest);
        assert_eq!(parse_feed_arg("manhwa").unwrap(), Feed::Manhwa);
    }

    #[test]
    fn test_feed_from_str() {
        assert_eq!(" MANHWA ".parse::<Feed>().unwrap(), Feed::Manhwa);
        assert!(matches!(
            "trending".parse::<Feed>(),
            Err(CliError::InvalidFeed(name)) if name == "trending"
        ));
    }

    #[test]
    fn test_parse_feed_arg_invalid() {
        let err = parse_feed_arg("trending").unwrap_err();
        assert!(err.to_string().contains("Invalid feed"));
        assert!(err.to_string().contains("trending"));
    }

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::parse_from(["mangaterm"]);
        assert!(cli.search.is_none());
        assert!(cli.read.is_none());
        assert_eq!(cli.feed, "popular");
        assert_eq!(cli.cache_ttl, 300);
    }

    #[test]
    fn test_startup_config_from_cli_defaults() {
        let cli = Cli::parse_from(["mangaterm", "--base-url", DEFAULT_BASE_URL]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config, StartupConfig::default());
    }

    #[test]
    fn test_startup_config_trims_search() {
        let cli = Cli::parse_from(["mangaterm", "--search", "  naruto "]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.search.as_deref(), Some("naruto"));
    }

    #[test]
    fn test_startup_config_rejects_blank_search() {
        let cli = Cli::parse_from(["mangaterm", "--search", "   "]);
        assert!(matches!(
            StartupConfig::from_cli(&cli),
            Err(CliError::EmptySearch)
        ));
    }

    #[test]
    fn test_startup_config_rejects_zero_ttl() {
        let cli = Cli::parse_from(["mangaterm", "--cache-ttl", "0"]);
        assert!(matches!(
            StartupConfig::from_cli(&cli),
            Err(CliError::InvalidTtl)
        ));
    }

    #[test]
    fn test_startup_config_custom_values() {
        let cli = Cli::parse_from([
            "mangaterm",
            "--feed",
            "latest",
            "--read",
            "ch-1",
            "--base-url",
            "http://localhost:8080",
            "--cache-ttl",
            "60",
            "--log-file",
            "/tmp/mangaterm.log",
        ]);
        let config = StartupConfig::from_cli(&cli).unwrap();

        assert_eq!(config.feed, Feed::Latest);
        assert_eq!(config.read_chapter.as_deref(), Some("ch-1"));
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/mangaterm.log")));
    }

    #[test]
    fn test_feed_headings() {
        assert_eq!(Feed::Popular.heading(), "Popular Today");
        assert_eq!(Feed::Latest.heading(), "Latest Releases");
    }
}
