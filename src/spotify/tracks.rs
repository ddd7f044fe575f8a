use crate::{
    Error, Res,
    spotify::client::{SpotifyClient, page_limit},
    types::{
        Paging, RecommendationQuery, SearchResponse, SpotifyTrack, Track, TrackItem,
        TracksResponse, into_tracks,
    },
};

impl SpotifyClient {
    /// Retrieves the user's top tracks for a time range
    /// (`short_term`, `medium_term` or `long_term`).
    pub async fn get_top_tracks(&self, time_range: &str, limit: usize) -> Res<Vec<Track>> {
        let page: Paging<SpotifyTrack> = self
            .get_json(
                "/me/top/tracks",
                &[
                    ("time_range", time_range.to_string()),
                    ("limit", page_limit(limit)),
                ],
            )
            .await?;
        Ok(into_tracks(page.items))
    }

    pub async fn get_recently_played(&self, limit: usize) -> Res<Vec<Track>> {
        let page: Paging<TrackItem> = self
            .get_json("/me/player/recently-played", &[("limit", page_limit(limit))])
            .await?;
        Ok(into_tracks(page.items.into_iter().map(|i| i.track).collect()))
    }

    pub async fn get_saved_tracks(&self, limit: usize) -> Res<Vec<Track>> {
        let page: Paging<TrackItem> = self
            .get_json("/me/tracks", &[("limit", page_limit(limit))])
            .await?;
        Ok(into_tracks(page.items.into_iter().map(|i| i.track).collect()))
    }

    pub async fn get_track(&self, id: &str) -> Res<Track> {
        let track: SpotifyTrack = self.get_json(&format!("/tracks/{id}"), &[]).await?;
        track
            .into_track()
            .ok_or_else(|| Error::Parse(format!("track {id} has no catalog id")))
    }

    /// Free-text track search. `query` may use field filters such as
    /// `track:"…" artist:"…"` or `genre:"…"`.
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
        market: Option<&str>,
    ) -> Res<Vec<Track>> {
        let mut params = vec![
            ("q", query.to_string()),
            ("type", "track".to_string()),
            ("limit", page_limit(limit)),
        ];
        if let Some(market) = market {
            params.push(("market", market.to_string()));
        }

        let res: SearchResponse = self.get_json("/search", &params).await?;
        Ok(into_tracks(res.tracks.items))
    }

    /// Calls the parameterized recommendations endpoint.
    ///
    /// Spotify restricted this endpoint for most applications, so callers
    /// should treat any error as "no recommendations".
    pub async fn get_recommendations(&self, query: &RecommendationQuery) -> Res<Vec<Track>> {
        let mut params = vec![("limit", query.limit.clamp(1, 100).to_string())];
        if !query.seed_tracks.is_empty() {
            params.push(("seed_tracks", query.seed_tracks.join(",")));
        }
        if !query.seed_artists.is_empty() {
            params.push(("seed_artists", query.seed_artists.join(",")));
        }
        if !query.seed_genres.is_empty() {
            params.push(("seed_genres", query.seed_genres.join(",")));
        }
        if let Some(target) = query.target {
            params.push(("target_energy", target.energy.to_string()));
            params.push(("target_danceability", target.danceability.to_string()));
            params.push(("target_valence", target.valence.to_string()));
        }
        if let Some(market) = &query.market {
            params.push(("market", market.clone()));
        }

        let res: TracksResponse = self.get_json("/recommendations", &params).await?;
        Ok(into_tracks(res.tracks))
    }
}
