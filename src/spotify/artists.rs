use crate::{
    Res,
    spotify::client::{SpotifyClient, page_limit},
    types::{Artist, FollowedArtistsResponse, Paging, Track, TracksResponse, into_tracks},
};

impl SpotifyClient {
    /// Retrieves the first page of artists the user follows.
    pub async fn get_followed_artists(&self, limit: usize) -> Res<Vec<Artist>> {
        let res: FollowedArtistsResponse = self
            .get_json(
                "/me/following",
                &[("type", "artist".to_string()), ("limit", page_limit(limit))],
            )
            .await?;
        Ok(res.artists.items)
    }

    pub async fn get_top_artists(&self, limit: usize) -> Res<Vec<Artist>> {
        let page: Paging<Artist> = self
            .get_json("/me/top/artists", &[("limit", page_limit(limit))])
            .await?;
        Ok(page.items)
    }

    /// Top tracks of an artist. Without a market the user's own market
    /// (`from_token`) is used.
    pub async fn get_artist_top_tracks(
        &self,
        artist_id: &str,
        market: Option<&str>,
    ) -> Res<Vec<Track>> {
        let market = market.unwrap_or("from_token").to_string();
        let res: TracksResponse = self
            .get_json(
                &format!("/artists/{artist_id}/top-tracks"),
                &[("market", market)],
            )
            .await?;
        Ok(into_tracks(res.tracks))
    }
}
