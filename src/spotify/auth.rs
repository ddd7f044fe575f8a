use std::{sync::Arc, time::Duration};

use chrono::Utc;
use reqwest::Client;
use tokio::sync::Mutex;

use crate::{
    Error, Res, config, info,
    management::SessionManager,
    server::start_api_server,
    success,
    types::{PkceToken, Session, TokenResponse},
    utils, warning,
};

/// How long the login waits for the browser to hit the callback.
const LOGIN_TIMEOUT: Duration = Duration::from_secs(60);

/// Runs the interactive authorization-code login with PKCE.
///
/// 1. Generates a PKCE code verifier and its SHA256 challenge
/// 2. Starts the local callback server
/// 3. Opens the Spotify authorization URL in the default browser
/// 4. Waits up to 60 seconds for the callback to exchange the code
/// 5. Persists the resulting session
///
/// # Arguments
///
/// * `shared_state` - Shared between this flow and the callback handler;
///   holds the verifier on the way out and the session on the way back.
///
/// # Errors
///
/// Fails when the client id is not configured, when the login times out,
/// or when the session cannot be written to the cache.
pub async fn login(shared_state: Arc<Mutex<Option<PkceToken>>>) -> Res<Session> {
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);
    let client_id = config::spotify_client_id()?;

    {
        let mut lock = shared_state.lock().await;
        *lock = Some(PkceToken {
            code_verifier,
            session: None,
        });
    }

    let server_state = Arc::clone(&shared_state);
    let server = tokio::spawn(async move {
        if let Err(e) = start_api_server(server_state).await {
            warning!("Callback server stopped: {}", e);
        }
    });

    let auth_url = reqwest::Url::parse_with_params(
        &config::spotify_apiauth_url(),
        &[
            ("client_id", client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", config::spotify_redirect_uri().as_str()),
            ("code_challenge", code_challenge.as_str()),
            ("code_challenge_method", "S256"),
            ("scope", config::spotify_scope().as_str()),
        ],
    )
    .map_err(|e| Error::Config(format!("invalid SPOTIFY_API_AUTH_URL: {e}")))?;

    if webbrowser::open(auth_url.as_str()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    } else {
        info!("Waiting for Spotify authorization in your browser...");
    }

    let session = wait_for_session(shared_state).await;
    server.abort();

    let session = session.ok_or_else(|| {
        Error::InvalidState("Authentication failed or timed out.".to_string())
    })?;

    let manager = SessionManager::new(Some(session.clone()));
    manager.persist().await?;
    success!("Authentication successful!");

    Ok(session)
}

/// Polls the shared state once per second until the callback stored a
/// session or the timeout is reached.
async fn wait_for_session(shared_state: Arc<Mutex<Option<PkceToken>>>) -> Option<Session> {
    use std::time::Instant;

    let start = Instant::now();

    while start.elapsed() < LOGIN_TIMEOUT {
        let lock = shared_state.lock().await;
        if let Some(session) = lock.as_ref().and_then(|p| p.session.as_ref()) {
            return Some(session.clone());
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}

/// Exchanges an authorization code for a session.
///
/// Authenticates the client with HTTP Basic auth and proves possession of
/// the PKCE verifier that produced the challenge.
pub async fn exchange_code(code: &str, verifier: &str) -> Res<Session> {
    let client_id = config::spotify_client_id()?;
    let client_secret = config::spotify_client_secret()?;
    let redirect_uri = config::spotify_redirect_uri();

    let response = Client::new()
        .post(config::spotify_apitoken_url())
        .basic_auth(&client_id, Some(&client_secret))
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", redirect_uri.as_str()),
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

    let token: TokenResponse = response.json().await?;
    Ok(Session {
        access_token: token.access_token,
        refresh_token: token.refresh_token.unwrap_or_default(),
        expires_at: Utc::now().timestamp() + token.expires_in,
        error: None,
    })
}
