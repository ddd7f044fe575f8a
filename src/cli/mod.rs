//! # CLI Module
//!
//! This module provides the command-line interface layer for moodlist. It
//! implements all user-facing commands and coordinates between the Spotify
//! client, the optional text generator, the generation pipeline and the
//! local caches.
//!
//! ## Command Categories
//!
//! ### Authentication
//!
//! - [`auth`] - Runs the Spotify OAuth flow with PKCE
//! - [`logout`] - Forgets the cached session
//!
//! ### Generation
//!
//! - [`generate`] - Builds a playlist for a mood, with or without the text model
//!
//! ### Pending playlist
//!
//! - [`preview`] - Shows the playlist waiting to be saved or discarded
//! - [`save`] - Keeps it (creating it on Spotify first when it is a draft)
//! - [`discard`] - Throws it away and removes it from Spotify when possible
//!
//! ### Information
//!
//! - [`moods`] - Lists moods with their target audio features
//! - [`languages`] - Lists languages with their markets
//!
//! ## Architecture Design
//!
//! ```text
//! CLI Layer (User Interface)
//!     ↓
//! Pipeline (recommend, resolve, lifecycle)
//!     ↓
//! Management Layer (session and lifecycle caches)
//!     ↓
//! API Layer (Spotify, Hugging Face)
//! ```
//!
//! Commands print through the crate's logging macros and exit with a
//! non-zero status through [`crate::error!`] when they cannot continue.
//! Authentication failures that call for a fresh login start the login
//! flow right away.
//!
//! ## Usage Patterns
//!
//! ```bash
//! moodlist auth                                  # Authenticate with Spotify
//! moodlist generate --mood happy --language es   # Recommendation based playlist
//! moodlist generate --mood chill --ai            # Let the text model suggest songs
//! moodlist custom --prompt "rainy sunday jazz"   # Free-text description
//! moodlist preview                               # Inspect the pending playlist
//! moodlist save                                  # Keep it
//! moodlist discard                               # Or throw it away
//! ```

use std::{sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Mutex;

use crate::{
    Error, error,
    management::SessionManager,
    spotify::{self, MusicCatalog, SpotifyClient},
    warning,
};

mod auth;
mod info;
mod lifecycle;
mod playlist;

pub use auth::{auth, logout};
pub use info::{languages, moods};
pub use lifecycle::{discard, preview, save};
pub use playlist::generate;

pub(crate) fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}

/// Loads the cached session and makes sure it can authorize requests,
/// starting a login when the session is unusable.
pub(crate) async fn connect() -> Arc<dyn MusicCatalog> {
    let session = match SessionManager::load().await {
        Ok(session) => session,
        Err(e) => error!("Failed to load session: {}", e),
    };
    let client = SpotifyClient::new(session);

    let check = client.session().lock().await.auth_headers().await;
    if let Err(e) = check {
        match e.auth() {
            Some(reason) if reason.requires_login() => {
                warning!("{}", reason);
                relogin(&client).await;
            }
            Some(reason) => error!("{} Run `moodlist auth` first.", reason),
            None => error!("Failed to prepare Spotify session: {}", e),
        }
    }

    Arc::new(client)
}

async fn relogin(client: &SpotifyClient) {
    let shared_state = Arc::new(Mutex::new(None));
    match spotify::auth::login(shared_state).await {
        Ok(session) => client.session().lock().await.set(session),
        Err(e) => error!("Authentication failed: {}", e),
    }
}

/// Prints a failed command's error and exits. Credential problems that
/// need a fresh login start it before exiting.
pub(crate) async fn fail(e: Error) -> ! {
    if let Some(reason) = e.auth() {
        if reason.requires_login() {
            warning!("{}", reason);
            let shared_state = Arc::new(Mutex::new(None));
            if spotify::auth::login(shared_state).await.is_ok() {
                error!("Please run the command again.");
            }
        }
    }
    error!("{}", e)
}
