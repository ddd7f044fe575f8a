//! Configuration management for moodlist.
//!
//! This module handles loading and accessing configuration values from
//! environment variables and `.env` files. It provides a centralized way to
//! manage Spotify API credentials, Hugging Face inference settings, the
//! local callback server address and other runtime parameters.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)
//!
//! Values without a sensible default (client id and secret) are returned as
//! `Res<String>` so the caller decides how to report them.

use std::{env, path::PathBuf};

use crate::{Error, Res};

const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";
const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_GENERATION_URL: &str = "https://api-inference.huggingface.co/models/gpt2";
const DEFAULT_EMOTION_URL: &str =
    "https://api-inference.huggingface.co/models/j-hartmann/emotion-english-distilroberta-base";

/// Scopes needed to read listening history and manage playlists.
pub const DEFAULT_SCOPE: &str = "user-read-email playlist-modify-public user-top-read user-read-recently-played user-library-read user-follow-read playlist-read-private playlist-read-collaborative";

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the directory structure if it doesn't exist and loads variables
/// from `moodlist/.env` below the platform-specific local data directory:
/// - Linux: `~/.local/share/moodlist/.env`
/// - macOS: `~/Library/Application Support/moodlist/.env`
/// - Windows: `%LOCALAPPDATA%/moodlist/.env`
///
/// A missing `.env` file is not an error; every value can also come from
/// the process environment.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created.
pub async fn load_env() -> Res<()> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| Error::Config(e.to_string()))?;
    }
    Ok(())
}

/// Root of everything moodlist stores locally.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("moodlist");
    path
}

/// Returns the server address for the local OAuth callback server.
///
/// Reads `SERVER_ADDRESS`, defaulting to `127.0.0.1:8888`.
pub fn server_addr() -> String {
    optional("SERVER_ADDRESS").unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.to_string())
}

/// Returns the Spotify API client ID from `SPOTIFY_API_AUTH_CLIENT_ID`.
pub fn spotify_client_id() -> Res<String> {
    required("SPOTIFY_API_AUTH_CLIENT_ID")
}

/// Returns the Spotify API client secret from `SPOTIFY_API_AUTH_CLIENT_SECRET`.
///
/// The client secret should be kept confidential and never exposed in logs.
pub fn spotify_client_secret() -> Res<String> {
    required("SPOTIFY_API_AUTH_CLIENT_SECRET")
}

/// Returns the Spotify OAuth redirect URI.
///
/// This must match the redirect URI registered in the Spotify application
/// settings and point at [`server_addr`].
pub fn spotify_redirect_uri() -> String {
    optional("SPOTIFY_API_REDIRECT_URI").unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string())
}

/// Returns the Spotify API scope permissions requested at login.
pub fn spotify_scope() -> String {
    optional("SPOTIFY_API_AUTH_SCOPE").unwrap_or_else(|| DEFAULT_SCOPE.to_string())
}

/// Returns the Spotify OAuth authorization URL.
pub fn spotify_apiauth_url() -> String {
    optional("SPOTIFY_API_AUTH_URL").unwrap_or_else(|| DEFAULT_AUTH_URL.to_string())
}

/// Returns the Spotify Web API base URL.
pub fn spotify_apiurl() -> String {
    optional("SPOTIFY_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

/// Returns the Spotify OAuth token exchange URL.
pub fn spotify_apitoken_url() -> String {
    optional("SPOTIFY_API_TOKEN_URL").unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string())
}

/// Returns the Hugging Face API key, if one is configured.
///
/// `None` switches AI generation to the listening-history fallback.
pub fn huggingface_api_key() -> Option<String> {
    optional("HUGGINGFACE_API_KEY")
}

/// Returns the text-generation inference endpoint.
pub fn huggingface_generation_url() -> String {
    optional("HUGGINGFACE_GENERATION_URL").unwrap_or_else(|| DEFAULT_GENERATION_URL.to_string())
}

/// Returns the emotion-classification inference endpoint.
pub fn huggingface_emotion_url() -> String {
    optional("HUGGINGFACE_EMOTION_URL").unwrap_or_else(|| DEFAULT_EMOTION_URL.to_string())
}

/// Whether `MOODLIST_DEBUG` is set to anything but `0`/`false`.
pub fn debug_enabled() -> bool {
    matches!(optional("MOODLIST_DEBUG").as_deref(), Some(v) if v != "0" && v != "false")
}

fn optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(key: &str) -> Res<String> {
    optional(key).ok_or_else(|| Error::Config(format!("{key} must be set")))
}
