//! # API Module
//!
//! HTTP endpoints served by the short-lived local server that receives the
//! Spotify OAuth redirect during `moodlist auth`.
//!
//! - [`callback`] - Completes the authorization-code + PKCE login by
//!   exchanging the code for a session and handing it to the waiting flow.
//! - [`health`] - Reports status and version, handy to check that the
//!   redirect URI points at the right port.
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use moodlist::api::{callback, health};
//!
//! let app = Router::new()
//!     .route("/callback", get(callback))
//!     .route("/health", get(health));
//! ```

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
