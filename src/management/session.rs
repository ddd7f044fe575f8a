use std::path::PathBuf;

use chrono::Utc;
use reqwest::{
    Client,
    header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue},
};

use crate::{
    AuthError, Error, Res, config, debug,
    types::{Session, SessionError, TokenResponse},
    warning,
};

/// Owns the signed-in user's Spotify credential.
///
/// Every read goes through [`SessionManager::auth_headers`], which first
/// runs the refresh routine: a live token is reused, an expired one is
/// exchanged for a new pair at the token endpoint. A failed exchange does
/// not error; it marks the session with
/// [`SessionError::RefreshAccessTokenError`] so the caller can decide to
/// start a fresh interactive login.
pub struct SessionManager {
    session: Option<Session>,
    http: Client,
    token_url: String,
    client_id: Option<String>,
    client_secret: Option<String>,
    path: Option<PathBuf>,
}

impl SessionManager {
    pub fn new(session: Option<Session>) -> Self {
        Self {
            session,
            http: Client::new(),
            token_url: config::spotify_apitoken_url(),
            client_id: config::spotify_client_id().ok(),
            client_secret: config::spotify_client_secret().ok(),
            path: Some(Self::session_path()),
        }
    }

    /// Loads the cached session. A missing cache file means nobody is
    /// signed in and is not an error.
    pub async fn load() -> Res<Self> {
        let path = Self::session_path();
        if !path.is_file() {
            return Ok(Self::new(None));
        }
        let content = async_fs::read_to_string(&path).await?;
        let session: Session = serde_json::from_str(&content)?;
        Ok(Self::new(Some(session)))
    }

    /// Points refreshes at another token endpoint and client.
    pub fn with_token_endpoint(
        mut self,
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.token_url = token_url.into();
        self.client_id = Some(client_id.into());
        self.client_secret = Some(client_secret.into());
        self
    }

    /// Keeps the session in memory only.
    pub fn without_persistence(mut self) -> Self {
        self.path = None;
        self
    }

    pub async fn persist(&self) -> Res<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let Some(session) = &self.session else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(session)?;
        async_fs::write(path, json).await?;
        Ok(())
    }

    /// Replaces the session, e.g. right after an interactive login.
    pub fn set(&mut self, session: Session) {
        self.session = Some(session);
    }

    /// Signs out: forgets the session and removes the cache file.
    pub async fn clear(&mut self) -> Res<()> {
        self.session = None;
        if let Some(path) = &self.path {
            if path.is_file() {
                async_fs::remove_file(path).await?;
            }
        }
        Ok(())
    }

    pub fn current(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Returns `Authorization` and `Content-Type` headers for the catalog API.
    ///
    /// # Errors
    ///
    /// - [`AuthError::NoSession`] when nobody is signed in
    /// - [`AuthError::RefreshFailed`] when the session carries a refresh error
    /// - [`AuthError::MissingAccessToken`] when there is no access token
    pub async fn auth_headers(&mut self) -> Res<HeaderMap> {
        self.refresh().await;

        let session = self.session.as_ref().ok_or(AuthError::NoSession)?;
        if session.error.is_some() {
            return Err(AuthError::RefreshFailed.into());
        }
        if session.access_token.is_empty() {
            return Err(AuthError::MissingAccessToken.into());
        }

        let bearer = HeaderValue::from_str(&format!("Bearer {}", session.access_token))
            .map_err(|_| Error::from(AuthError::MissingAccessToken))?;
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Token refresh routine, run on every credential read.
    pub async fn refresh(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };

        let now = Utc::now().timestamp();
        if session.expires_at > now && session.error.is_none() {
            return;
        }
        if session.refresh_token.is_empty() {
            return;
        }

        let refresh_token = session.refresh_token.clone();
        let refreshed = match self.exchange_refresh_token(&refresh_token).await {
            Ok(t) => {
                debug!("access token refreshed, expires in {}s", t.expires_in);
                Session {
                    access_token: t.access_token,
                    refresh_token: t.refresh_token.unwrap_or(refresh_token),
                    expires_at: now + t.expires_in,
                    error: None,
                }
            }
            Err(e) => {
                warning!("Failed to refresh access token: {}", e);
                Session {
                    error: Some(SessionError::RefreshAccessTokenError),
                    ..session.clone()
                }
            }
        };

        self.session = Some(refreshed);
        if let Err(e) = self.persist().await {
            warning!("Failed to save session to cache: {}", e);
        }
    }

    async fn exchange_refresh_token(&self, refresh_token: &str) -> Res<TokenResponse> {
        let client_id = self
            .client_id
            .as_deref()
            .ok_or_else(|| Error::Config("SPOTIFY_API_AUTH_CLIENT_ID must be set".into()))?;
        let client_secret = self
            .client_secret
            .as_deref()
            .ok_or_else(|| Error::Config("SPOTIFY_API_AUTH_CLIENT_SECRET must be set".into()))?;

        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(client_id, Some(client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream {
                service: "Spotify accounts",
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        Ok(response.json::<TokenResponse>().await?)
    }

    fn session_path() -> PathBuf {
        let mut path = config::data_dir();
        path.push("cache/session.json");
        path
    }
}
