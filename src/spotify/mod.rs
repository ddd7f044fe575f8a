//! # Spotify Integration Module
//!
//! This module is the only place that talks to the Spotify Web API. It
//! exposes the catalog operations the playlist pipeline needs through the
//! [`MusicCatalog`] trait and implements them over `reqwest` in
//! [`SpotifyClient`].
//!
//! ## Architecture
//!
//! ```text
//! Pipeline (recommend, resolve, lifecycle)
//!          ↓
//! MusicCatalog trait
//!          ↓
//! SpotifyClient ──→ SessionManager (auth headers, lazy refresh)
//!     ├── tracks    (top, recent, saved, search, recommendations)
//!     ├── artists   (followed, top, artist top tracks)
//!     └── playlist  (current user, create, add, unfollow)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Authentication
//!
//! [`auth`] runs the interactive authorization-code login with PKCE: a
//! local callback server, a browser redirect, and the code exchange. After
//! that the [`crate::management::SessionManager`] is consulted before every
//! request and refreshes the token lazily.
//!
//! ## Error Handling
//!
//! - Non-success responses become [`crate::Error::Upstream`]
//! - `429 Too Many Requests` is waited out once when `Retry-After` is at
//!   most 120 seconds
//! - `502 Bad Gateway` is retried once after a short delay
//! - Everything else is propagated; the pipeline decides what to absorb
//!
//! ## API Coverage
//!
//! - `GET /me`, `GET /me/top/tracks`, `GET /me/top/artists`
//! - `GET /me/player/recently-played`, `GET /me/tracks`, `GET /me/following`
//! - `GET /tracks/{id}`, `GET /artists/{id}`, `GET /artists/{id}/top-tracks`
//! - `GET /search`, `GET /recommendations`
//! - `POST /users/{user_id}/playlists`, `POST /playlists/{id}/tracks`
//! - `DELETE /playlists/{id}/followers`

use async_trait::async_trait;

use crate::{
    Res,
    types::{Artist, Playlist, RecommendationQuery, Track, UserProfile},
};

pub mod artists;
pub mod auth;
pub mod client;
pub mod playlist;
pub mod tracks;

pub use client::SpotifyClient;

/// Genre seeds used since the seed-genre endpoint was retired.
pub const AVAILABLE_GENRES: [&str; 10] = [
    "pop",
    "rock",
    "hip-hop",
    "electronic",
    "dance",
    "r-n-b",
    "jazz",
    "classical",
    "indie",
    "alternative",
];

/// Catalog operations the playlist pipeline depends on.
#[async_trait]
pub trait MusicCatalog: Send + Sync {
    async fn current_user(&self) -> Res<UserProfile>;

    async fn top_tracks(&self, time_range: &str, limit: usize) -> Res<Vec<Track>>;

    async fn recently_played(&self, limit: usize) -> Res<Vec<Track>>;

    async fn saved_tracks(&self, limit: usize) -> Res<Vec<Track>>;

    async fn followed_artists(&self, limit: usize) -> Res<Vec<Artist>>;

    async fn top_artists(&self, limit: usize) -> Res<Vec<Artist>>;

    async fn track(&self, id: &str) -> Res<Track>;

    async fn artist_top_tracks(&self, artist_id: &str, market: Option<&str>) -> Res<Vec<Track>>;

    async fn search_tracks(
        &self,
        query: &str,
        limit: usize,
        market: Option<&str>,
    ) -> Res<Vec<Track>>;

    async fn recommendations(&self, query: &RecommendationQuery) -> Res<Vec<Track>>;

    /// Creates a playlist owned by the current user. The returned playlist
    /// has no tracks yet.
    async fn create_playlist(&self, name: &str, description: &str) -> Res<Playlist>;

    async fn add_tracks(&self, playlist_id: &str, uris: &[String]) -> Res<()>;

    /// Removes the playlist from the user's library.
    async fn unfollow_playlist(&self, playlist_id: &str) -> Res<()>;

    fn available_genres(&self) -> Vec<String> {
        AVAILABLE_GENRES.iter().map(|g| g.to_string()).collect()
    }
}
