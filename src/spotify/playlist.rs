use reqwest::Method;

use crate::{
    Res,
    spotify::client::SpotifyClient,
    types::{
        AddTrackToPlaylistRequest, AddTrackToPlaylistResponse, CreatePlaylistRequest,
        CreatePlaylistResponse, Playlist, UserProfile,
    },
};

/// Spotify accepts at most 100 URIs per add request.
const ADD_TRACKS_CHUNK: usize = 100;

impl SpotifyClient {
    pub async fn get_current_user(&self) -> Res<UserProfile> {
        self.get_json("/me", &[]).await
    }

    /// Creates a public playlist for the current user.
    pub async fn create(&self, name: &str, description: &str) -> Res<Playlist> {
        let user = self.get_current_user().await?;

        let body = serde_json::to_value(CreatePlaylistRequest {
            name: name.to_string(),
            description: description.to_string(),
            public: true,
        })?;

        let response = self
            .execute(
                Method::POST,
                &format!("/users/{}/playlists", user.id),
                &[],
                Some(body),
            )
            .await?;
        let created: CreatePlaylistResponse = response.json().await?;

        Ok(Playlist {
            id: created.id,
            name: created.name,
            description: created
                .description
                .unwrap_or_else(|| description.to_string()),
            external_url: created.external_urls.spotify,
            tracks: Vec::new(),
        })
    }

    /// Adds tracks in chunks of 100, preserving order.
    pub async fn add_track_uris(&self, playlist_id: &str, uris: &[String]) -> Res<()> {
        for chunk in uris.chunks(ADD_TRACKS_CHUNK) {
            let body = serde_json::to_value(AddTrackToPlaylistRequest {
                uris: chunk.to_vec(),
            })?;
            let response = self
                .execute(
                    Method::POST,
                    &format!("/playlists/{playlist_id}/tracks"),
                    &[],
                    Some(body),
                )
                .await?;
            let _: AddTrackToPlaylistResponse = response.json().await?;
        }
        Ok(())
    }

    /// Unfollows the playlist, which is how Spotify "deletes" a playlist
    /// from the owner's library.
    pub async fn unfollow(&self, playlist_id: &str) -> Res<()> {
        self.execute(
            Method::DELETE,
            &format!("/playlists/{playlist_id}/followers"),
            &[],
            None,
        )
        .await?;
        Ok(())
    }
}
