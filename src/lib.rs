//! Mood Playlist Generator Library
//!
//! This library turns a mood, or a free-text description, into a Spotify
//! playlist. It reads the signed-in user's listening history, asks a hosted
//! text-generation model for song suggestions, resolves those suggestions to
//! catalog tracks and manages the playlist as a discardable preview until
//! the user saves it.
//!
//! # Modules
//!
//! - `ai` - Hosted text-generation client, prompt building and suggestion parsing
//! - `api` - HTTP API endpoints for the local callback server
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `error` - Crate error type
//! - `language` - Language selection and market mapping
//! - `management` - Local session and lifecycle caches
//! - `mood` - Mood labels and their target audio features
//! - `pipeline` - Recommendation cascade, track resolution and playlist lifecycle
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use moodlist::{config, cli};
//!
//! #[tokio::main]
//! async fn main() -> moodlist::Res<()> {
//!     config::load_env().await?;
//!     // Use CLI functions...
//!     Ok(())
//! }
//! ```

pub mod ai;
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod language;
pub mod management;
pub mod mood;
pub mod pipeline;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

pub use error::{AuthError, Error};

/// A convenient Result type alias for operations that may fail.
///
/// Every fallible operation in the crate returns this alias so callers can
/// match on [`Error`] kinds (authentication, upstream failures, exhausted
/// resolution) instead of inspecting strings.
///
/// # Example
///
/// ```
/// use moodlist::Res;
///
/// async fn fetch_data() -> Res<String> {
///     Ok("data".to_string())
/// }
/// ```
pub type Res<T> = std::result::Result<T, Error>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Starting authentication process...");
/// info!("Found {} tracks", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Playlist saved");
/// success!("Added {} tracks", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only the command-line layer uses this macro. Library code returns
/// [`Error`] values instead.
///
/// # Example
///
/// ```
/// error!("Failed to load configuration");
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable issues, e.g. a cascade stage that failed and was
/// skipped.
///
/// # Example
///
/// ```
/// warning!("Search for seed failed, continuing");
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a dimmed diagnostic line when `MOODLIST_DEBUG` is set.
///
/// # Example
///
/// ```
/// debug!("search query: {}", query);
/// ```
#[macro_export]
macro_rules! debug {
  ($($arg:tt)*) => ({
    if $crate::config::debug_enabled() {
      use colored::Colorize;
      println!("[{}] {}", "·".dimmed(), std::format!($($arg)*).dimmed());
    }
  })
}
