use serde::{Deserialize, Serialize};
use tabled::Tabled;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Marker stored on a session whose refresh exchange failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionError {
    RefreshAccessTokenError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp (seconds) after which the access token is stale.
    pub expires_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<SessionError>,
}

#[derive(Debug, Clone)]
pub struct PkceToken {
    pub code_verifier: String,
    pub session: Option<Session>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

// ---------------------------------------------------------------------------
// Domain
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackArtist {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

/// A concrete catalog track. Identity is `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artists: Vec<TrackArtist>,
    pub album: String,
    #[serde(default)]
    pub artwork_url: Option<String>,
    pub uri: String,
}

impl Track {
    pub fn primary_artist(&self) -> Option<&str> {
        self.artists.first().map(|a| a.name.as_str())
    }

    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// An unvalidated `(artist, title)` pair produced by the text generator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SongSuggestion {
    pub artist: String,
    pub title: String,
}

impl SongSuggestion {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub description: String,
    pub external_url: String,
    pub tracks: Vec<Track>,
}

/// Local bookkeeping marking a playlist as provisional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempPlaylistHandle {
    pub id: String,
    pub track_ids: Vec<String>,
    /// `false` while the playlist exists only as a local draft.
    pub remote: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureTarget {
    pub energy: f32,
    pub danceability: f32,
    pub valence: f32,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    #[tabled(rename = "#")]
    pub position: usize,
    pub name: String,
    pub artists: String,
    pub album: String,
}

#[derive(Tabled)]
pub struct MoodTableRow {
    pub mood: String,
    pub energy: String,
    pub danceability: String,
    pub valence: String,
}

#[derive(Tabled)]
pub struct LanguageTableRow {
    pub code: String,
    pub language: String,
    pub markets: String,
}

// ---------------------------------------------------------------------------
// Spotify wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyImage {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyAlbum {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyArtistRef {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyTrack {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SpotifyArtistRef>,
    pub album: Option<SpotifyAlbum>,
    pub uri: String,
}

impl SpotifyTrack {
    /// Local files and unavailable items come back without an id.
    pub fn into_track(self) -> Option<Track> {
        let id = self.id?;
        let (album, artwork_url) = match self.album {
            Some(album) => (album.name, album.images.into_iter().next().map(|i| i.url)),
            None => (String::new(), None),
        };
        Some(Track {
            id,
            name: self.name,
            artists: self
                .artists
                .into_iter()
                .map(|a| TrackArtist {
                    id: a.id,
                    name: a.name,
                })
                .collect(),
            album,
            artwork_url,
            uri: self.uri,
        })
    }
}

pub fn into_tracks(items: Vec<SpotifyTrack>) -> Vec<Track> {
    items.into_iter().filter_map(SpotifyTrack::into_track).collect()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Paging<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// Item wrapper used by saved-tracks and recently-played.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackItem {
    pub track: SpotifyTrack,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub tracks: Paging<SpotifyTrack>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TracksResponse {
    pub tracks: Vec<SpotifyTrack>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FollowedArtistsResponse {
    pub artists: Paging<Artist>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlaylistResponse {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddTrackToPlaylistRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddTrackToPlaylistResponse {
    pub snapshot_id: String,
}

/// Parameters of the (mostly retired) recommendations endpoint.
#[derive(Debug, Clone, Default)]
pub struct RecommendationQuery {
    pub seed_tracks: Vec<String>,
    pub seed_artists: Vec<String>,
    pub seed_genres: Vec<String>,
    pub target: Option<FeatureTarget>,
    pub limit: usize,
    pub market: Option<String>,
}
