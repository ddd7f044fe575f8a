use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::{sync::Mutex, time::sleep};

use crate::{
    Error, Res, config, debug,
    management::SessionManager,
    spotify::MusicCatalog,
    types::{Artist, Playlist, RecommendationQuery, Track, UserProfile},
    warning,
};

const MAX_RETRY_AFTER_SECS: u64 = 120;
const BAD_GATEWAY_DELAY: Duration = Duration::from_secs(2);

/// `reqwest` implementation of [`MusicCatalog`].
///
/// The session is shared behind an async mutex so refreshed tokens are seen
/// by every clone of the client.
#[derive(Clone)]
pub struct SpotifyClient {
    pub(crate) http: Client,
    pub(crate) api_url: String,
    session: Arc<Mutex<SessionManager>>,
}

impl SpotifyClient {
    pub fn new(session: SessionManager) -> Self {
        Self {
            http: Client::new(),
            api_url: config::spotify_apiurl(),
            session: Arc::new(Mutex::new(session)),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn session(&self) -> Arc<Mutex<SessionManager>> {
        Arc::clone(&self.session)
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url.trim_end_matches('/'), path)
    }

    /// Sends one request with fresh auth headers.
    ///
    /// Retries once on `429` (when `Retry-After` is reasonable) and once on
    /// `502`; any other non-success status becomes [`Error::Upstream`].
    pub(crate) async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
    ) -> Res<Response> {
        let url = self.url(path);
        let mut retried = false;

        loop {
            let headers = self.session.lock().await.auth_headers().await?;
            let mut request = self
                .http
                .request(method.clone(), &url)
                .headers(headers)
                .query(query);
            if let Some(body) = &body {
                request = request.json(body);
            }

            debug!("{} {}", method, url);
            let response = request.send().await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response);
            }

            if !retried && status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(0);
                if retry_after <= MAX_RETRY_AFTER_SECS {
                    sleep(Duration::from_secs(retry_after)).await;
                    retried = true;
                    continue;
                }
                warning!(
                    "Spotify asked to retry after {} seconds, giving up on {}",
                    retry_after,
                    path
                );
            }

            if !retried && status == StatusCode::BAD_GATEWAY {
                sleep(BAD_GATEWAY_DELAY).await;
                retried = true;
                continue;
            }

            return Err(upstream_error(response).await);
        }
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Res<T> {
        let response = self.execute(Method::GET, path, query, None).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| Error::Parse(format!("{path}: {e}")))
    }
}

async fn upstream_error(response: Response) -> Error {
    let status = response.status();
    let message = match response.text().await {
        Ok(body) if !body.is_empty() => body,
        _ => status.canonical_reason().unwrap_or_default().to_string(),
    };
    Error::Upstream {
        service: "Spotify",
        status: status.as_u16(),
        message,
    }
}

/// Spotify accepts page sizes between 1 and 50.
pub(crate) fn page_limit(limit: usize) -> String {
    limit.clamp(1, 50).to_string()
}

#[async_trait]
impl MusicCatalog for SpotifyClient {
    async fn current_user(&self) -> Res<UserProfile> {
        self.get_current_user().await
    }

    async fn top_tracks(&self, time_range: &str, limit: usize) -> Res<Vec<Track>> {
        self.get_top_tracks(time_range, limit).await
    }

    async fn recently_played(&self, limit: usize) -> Res<Vec<Track>> {
        self.get_recently_played(limit).await
    }

    async fn saved_tracks(&self, limit: usize) -> Res<Vec<Track>> {
        self.get_saved_tracks(limit).await
    }

    async fn followed_artists(&self, limit: usize) -> Res<Vec<Artist>> {
        self.get_followed_artists(limit).await
    }

    async fn top_artists(&self, limit: usize) -> Res<Vec<Artist>> {
        self.get_top_artists(limit).await
    }

    async fn track(&self, id: &str) -> Res<Track> {
        self.get_track(id).await
    }

    async fn artist_top_tracks(&self, artist_id: &str, market: Option<&str>) -> Res<Vec<Track>> {
        self.get_artist_top_tracks(artist_id, market).await
    }

    async fn search_tracks(
        &self,
        query: &str,
        limit: usize,
        market: Option<&str>,
    ) -> Res<Vec<Track>> {
        self.search(query, limit, market).await
    }

    async fn recommendations(&self, query: &RecommendationQuery) -> Res<Vec<Track>> {
        self.get_recommendations(query).await
    }

    async fn create_playlist(&self, name: &str, description: &str) -> Res<Playlist> {
        self.create(name, description).await
    }

    async fn add_tracks(&self, playlist_id: &str, uris: &[String]) -> Res<()> {
        self.add_track_uris(playlist_id, uris).await
    }

    async fn unfollow_playlist(&self, playlist_id: &str) -> Res<()> {
        self.unfollow(playlist_id).await
    }
}
