use std::{collections::HashSet, sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    Error, Res, debug, info,
    pipeline::resolve::TrackResolver,
    spotify::MusicCatalog,
    types::{Playlist, SongSuggestion, TempPlaylistHandle},
    warning,
};

/// Upper bound for the best-effort remote cleanup on discard.
pub const DISCARD_TIMEOUT: Duration = Duration::from_secs(10);

/// A generated playlist waiting for the user to save or discard it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preview {
    pub playlist: Playlist,
    pub handle: TempPlaylistHandle,
    /// Suggestions that found no track yet; matched again on a deferred save.
    #[serde(default)]
    pub pending: Vec<SongSuggestion>,
    #[serde(default)]
    pub market: Option<String>,
}

impl Preview {
    pub fn is_local(&self) -> bool {
        !self.handle.remote
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum LifecycleState {
    #[default]
    Idle,
    Generating,
    Previewing(Preview),
    Saved(Playlist),
}

impl LifecycleState {
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleState::Idle => "idle",
            LifecycleState::Generating => "generating",
            LifecycleState::Previewing(_) => "previewing",
            LifecycleState::Saved(_) => "saved",
        }
    }

    pub fn preview(&self) -> Option<&Preview> {
        match self {
            LifecycleState::Previewing(preview) => Some(preview),
            _ => None,
        }
    }

    pub fn handle(&self) -> Option<&TempPlaylistHandle> {
        self.preview().map(|p| &p.handle)
    }
}

/// Drives one playlist through generate, preview, save or discard.
///
/// ```text
/// Idle ──begin──▶ Generating ──complete(Ok)──▶ Previewing ──save──▶ Saved
///                     │                          │
///                     └──complete(Err)──▶ Idle ◀─┘ discard
/// ```
pub struct PlaylistLifecycle {
    catalog: Arc<dyn MusicCatalog>,
    state: LifecycleState,
    discard_timeout: Duration,
}

impl PlaylistLifecycle {
    pub fn new(catalog: Arc<dyn MusicCatalog>, state: LifecycleState) -> Self {
        Self {
            catalog,
            state,
            discard_timeout: DISCARD_TIMEOUT,
        }
    }

    pub fn with_discard_timeout(mut self, timeout: Duration) -> Self {
        self.discard_timeout = timeout;
        self
    }

    pub fn state(&self) -> &LifecycleState {
        &self.state
    }

    pub fn into_state(self) -> LifecycleState {
        self.state
    }

    /// Enters `Generating`. A pending preview is dropped without remote
    /// cleanup.
    pub fn begin(&mut self) {
        if let Some(preview) = self.state.preview() {
            warning!(
                "Replacing the pending preview '{}' without removing it from Spotify",
                preview.playlist.name
            );
        }
        self.state = LifecycleState::Generating;
    }

    /// Leaves `Generating` with the outcome of the pipeline.
    ///
    /// A preview without tracks is rejected with [`Error::InvalidState`];
    /// the pipeline reports empty results itself. On any failure the state
    /// returns to `Idle` and the error is handed back.
    pub fn complete(&mut self, outcome: Res<Preview>) -> Res<()> {
        if !matches!(self.state, LifecycleState::Generating) {
            return Err(Error::InvalidState(format!(
                "Cannot complete a generation while {}",
                self.state.name()
            )));
        }

        match outcome {
            Ok(preview) if preview.playlist.tracks.is_empty() => {
                self.state = LifecycleState::Idle;
                Err(Error::InvalidState(
                    "A playlist preview needs at least one track".to_string(),
                ))
            }
            Ok(preview) => {
                self.state = LifecycleState::Previewing(preview);
                Ok(())
            }
            Err(e) => {
                self.state = LifecycleState::Idle;
                Err(e)
            }
        }
    }

    /// Keeps the previewed playlist.
    ///
    /// A local preview is created on Spotify first: the playlist is
    /// created, pending suggestions are matched once more and all tracks are
    /// added. If that fails the preview stays in place, and a playlist
    /// created on the way is removed again.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] when nothing is being previewed, or the
    /// catalog error of the deferred creation.
    pub async fn save(&mut self) -> Res<Playlist> {
        let LifecycleState::Previewing(preview) = &self.state else {
            return Err(Error::InvalidState(format!(
                "There is no playlist preview to save (state: {})",
                self.state.name()
            )));
        };

        let playlist = if preview.is_local() {
            self.create_deferred(preview).await?
        } else {
            preview.playlist.clone()
        };

        self.state = LifecycleState::Saved(playlist.clone());
        Ok(playlist)
    }

    async fn create_deferred(&self, preview: &Preview) -> Res<Playlist> {
        info!("Creating playlist '{}' on Spotify...", preview.playlist.name);
        let mut playlist = self
            .catalog
            .create_playlist(&preview.playlist.name, &preview.playlist.description)
            .await?;

        let mut tracks = preview.playlist.tracks.clone();
        if !preview.pending.is_empty() {
            let matched = TrackResolver::new(Arc::clone(&self.catalog))
                .resolve(&preview.pending, preview.market.as_deref())
                .await;
            debug!("{} pending suggestions matched on save", matched.len());
            tracks.extend(matched);
        }
        let mut uris = HashSet::new();
        tracks.retain(|t| uris.insert(t.uri.clone()));

        let track_uris: Vec<String> = tracks.iter().map(|t| t.uri.clone()).collect();
        if let Err(e) = self.catalog.add_tracks(&playlist.id, &track_uris).await {
            if let Err(cleanup) = self.catalog.unfollow_playlist(&playlist.id).await {
                warning!("Could not remove playlist {}: {}", playlist.id, cleanup);
            }
            return Err(e);
        }

        playlist.tracks = tracks;
        Ok(playlist)
    }

    /// Throws the preview away and returns to `Idle`.
    ///
    /// A remote preview is unfollowed on a best-effort basis, bounded by the
    /// discard timeout. Failures are logged and never block the transition;
    /// the playlist may then remain on the account.
    pub async fn discard(&mut self) {
        if let LifecycleState::Previewing(preview) = &self.state {
            if preview.handle.remote {
                let id = preview.handle.id.clone();
                let cleanup =
                    tokio::time::timeout(self.discard_timeout, self.catalog.unfollow_playlist(&id))
                        .await;
                match cleanup {
                    Ok(Ok(())) => debug!("playlist {} removed", id),
                    Ok(Err(e)) => warning!("Could not remove playlist {}: {}", id, e),
                    Err(_) => warning!(
                        "Could not remove playlist {}: {}",
                        id,
                        Error::NetworkTimeout(self.discard_timeout)
                    ),
                }
            }
        }
        self.state = LifecycleState::Idle;
    }
}
