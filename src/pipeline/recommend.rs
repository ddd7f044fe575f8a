use std::{collections::HashSet, sync::Arc};

use rand::seq::IndexedRandom;

use crate::{
    Res, debug,
    mood::Mood,
    pipeline::shuffle::Shuffle,
    spotify::MusicCatalog,
    types::{FeatureTarget, RecommendationQuery, Track},
    utils, warning,
};

/// Below this many candidates the user's own top tracks are mixed in.
pub const MIN_CANDIDATES: usize = 5;

const TIME_RANGE: &str = "medium_term";
const SEARCH_LIMIT: usize = 20;
const MAX_SEEDS: usize = 5;

#[derive(Debug, Clone)]
pub struct RecommendationRequest {
    pub seed_tracks: Vec<String>,
    pub seed_artists: Vec<String>,
    pub seed_genres: Vec<String>,
    pub target: FeatureTarget,
    pub limit: usize,
    pub market: Option<String>,
}

impl RecommendationRequest {
    pub fn new(target: FeatureTarget, limit: usize) -> Self {
        Self {
            seed_tracks: Vec::new(),
            seed_artists: Vec::new(),
            seed_genres: Vec::new(),
            target,
            limit,
            market: None,
        }
    }

    fn has_seeds(&self) -> bool {
        !(self.seed_tracks.is_empty() && self.seed_artists.is_empty() && self.seed_genres.is_empty())
    }
}

/// Collects the output of successive stages.
///
/// A failed stage is logged and skipped, duplicates are dropped by id and
/// [`Cascade::is_full`] tells the caller to stop issuing further requests.
pub struct Cascade {
    limit: usize,
    seen: HashSet<String>,
    tracks: Vec<Track>,
}

impl Cascade {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            seen: HashSet::new(),
            tracks: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.tracks.len() >= self.limit
    }

    /// Adds the tracks of one stage and returns how many were new.
    pub fn absorb(&mut self, stage: &str, result: Res<Vec<Track>>) -> usize {
        match result {
            Ok(tracks) => {
                let before = self.tracks.len();
                for track in tracks {
                    if self.seen.insert(track.id.clone()) {
                        self.tracks.push(track);
                    }
                }
                let added = self.tracks.len() - before;
                debug!("{}: {} new candidates", stage, added);
                added
            }
            Err(e) => {
                warning!("{} failed, continuing: {}", stage, e);
                0
            }
        }
    }

    pub fn into_tracks(self) -> Vec<Track> {
        self.tracks
    }
}

/// Recommendation resolver: degrades through successively cruder signals
/// instead of retrying the parameterized endpoint.
#[derive(Clone)]
pub struct Recommender {
    catalog: Arc<dyn MusicCatalog>,
    shuffle: Arc<dyn Shuffle>,
}

impl Recommender {
    pub fn new(catalog: Arc<dyn MusicCatalog>, shuffle: Arc<dyn Shuffle>) -> Self {
        Self { catalog, shuffle }
    }

    /// Runs the cascade:
    ///
    /// 0. the recommendations endpoint with target features
    /// 1. per seed track, an "artist title" search minus its first hit
    /// 2. per seed artist, the artist's top tracks
    /// 3. per seed genre, a `genre:` scoped search
    /// 4. with fewer than five candidates, the user's top tracks
    ///
    /// then shuffles and truncates to `limit`.
    ///
    /// # Errors
    ///
    /// Only when nothing was collected and the top-tracks fallback failed.
    pub async fn recommend(&self, request: &RecommendationRequest) -> Res<Vec<Track>> {
        let market = request.market.as_deref();
        let mut cascade = Cascade::new(request.limit);

        if request.has_seeds() {
            let query = RecommendationQuery {
                seed_tracks: request.seed_tracks.iter().take(MAX_SEEDS).cloned().collect(),
                seed_artists: request.seed_artists.iter().take(MAX_SEEDS).cloned().collect(),
                seed_genres: request.seed_genres.iter().take(MAX_SEEDS).cloned().collect(),
                target: Some(request.target),
                limit: request.limit,
                market: request.market.clone(),
            };
            cascade.absorb("recommendations", self.catalog.recommendations(&query).await);
        }

        for id in &request.seed_tracks {
            if cascade.is_full() {
                break;
            }
            let similar = self.similar_to_track(id, market).await;
            cascade.absorb("seed track search", similar);
        }

        for id in &request.seed_artists {
            if cascade.is_full() {
                break;
            }
            let top = self.catalog.artist_top_tracks(id, market).await;
            cascade.absorb("seed artist top tracks", top);
        }

        for genre in &request.seed_genres {
            if cascade.is_full() {
                break;
            }
            let query = format!("genre:\"{genre}\"");
            let found = self.catalog.search_tracks(&query, SEARCH_LIMIT, market).await;
            cascade.absorb("genre search", found);
        }

        if cascade.len() < MIN_CANDIDATES {
            match self.catalog.top_tracks(TIME_RANGE, request.limit).await {
                Ok(top) => {
                    cascade.absorb("top tracks fallback", Ok(top));
                }
                Err(e) if cascade.is_empty() => return Err(e),
                Err(e) => warning!("Top tracks fallback failed: {}", e),
            }
        }

        let mut tracks = cascade.into_tracks();
        self.shuffle.shuffle(&mut tracks);
        tracks.truncate(request.limit);
        Ok(tracks)
    }

    /// Searches "artist title" for a seed and drops the first hit, which is
    /// usually the seed itself.
    async fn similar_to_track(&self, id: &str, market: Option<&str>) -> Res<Vec<Track>> {
        let seed = self.catalog.track(id).await?;
        let query = format!("{} {}", seed.primary_artist().unwrap_or_default(), seed.name);
        let found = self
            .catalog
            .search_tracks(query.trim(), SEARCH_LIMIT, market)
            .await?;
        Ok(found.into_iter().skip(1).collect())
    }

    /// Recommendations seeded from the user's library, used when no text
    /// generator is available.
    ///
    /// Fetches top tracks, saved tracks and followed artists concurrently,
    /// seeds the cascade with up to five artists and five genres at 70% of
    /// `limit` and mixes in the top tracks of two random artists. If top or
    /// saved tracks cannot be read, the user's top tracks are returned
    /// instead. Followed artists are optional.
    pub async fn recommend_from_library(
        &self,
        mood: Mood,
        limit: usize,
        market: Option<&str>,
    ) -> Res<Vec<Track>> {
        let (top, saved, followed) = tokio::join!(
            self.catalog.top_tracks(TIME_RANGE, SEARCH_LIMIT),
            self.catalog.saved_tracks(SEARCH_LIMIT),
            self.catalog.followed_artists(SEARCH_LIMIT),
        );

        let followed = followed.unwrap_or_else(|e| {
            warning!("Could not read your followed artists: {}", e);
            Vec::new()
        });

        let (top, saved) = match (top, saved) {
            (Ok(top), Ok(saved)) => (top, saved),
            (top, saved) => {
                let cause = [top.err(), saved.err()]
                    .into_iter()
                    .flatten()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; ");
                warning!("Could not read your library, using top tracks: {}", cause);
                let mut tracks = self.catalog.top_tracks(TIME_RANGE, limit).await?;
                self.shuffle.shuffle(&mut tracks);
                tracks.truncate(limit);
                return Ok(tracks);
            }
        };

        let library = utils::merge_tracks(top, saved);

        let mut artist_ids = Vec::new();
        let mut seen = HashSet::new();
        let candidates = followed.iter().map(|a| a.id.clone()).chain(
            library
                .iter()
                .filter_map(|t| t.artists.first().and_then(|a| a.id.clone())),
        );
        for id in candidates {
            if artist_ids.len() >= MAX_SEEDS {
                break;
            }
            if seen.insert(id.clone()) {
                artist_ids.push(id);
            }
        }

        let mut genres = Vec::new();
        match self.catalog.top_artists(10).await {
            Ok(artists) => {
                for genre in artists.into_iter().flat_map(|a| a.genres) {
                    if genres.len() >= MAX_SEEDS {
                        break;
                    }
                    if !genres.contains(&genre) {
                        genres.push(genre);
                    }
                }
            }
            Err(e) => warning!("Could not read your top artists: {}", e),
        }

        let picked: Vec<String> = artist_ids
            .choose_multiple(&mut rand::rng(), 2)
            .cloned()
            .collect();
        let mut artist_tracks = Vec::new();
        for id in &picked {
            match self.catalog.artist_top_tracks(id, market).await {
                Ok(tracks) => artist_tracks.extend(tracks),
                Err(e) => warning!("Top tracks for artist {} failed: {}", id, e),
            }
        }

        let request = RecommendationRequest {
            seed_tracks: Vec::new(),
            seed_artists: artist_ids,
            seed_genres: genres,
            target: mood.features(),
            limit: (limit * 7 / 10).max(1),
            market: market.map(str::to_string),
        };
        let recommended = match self.recommend(&request).await {
            Ok(tracks) => tracks,
            Err(e) => {
                warning!("Recommendations failed: {}", e);
                Vec::new()
            }
        };

        let mut tracks = utils::merge_tracks(recommended, artist_tracks);
        if tracks.is_empty() {
            tracks = library;
        }
        self.shuffle.shuffle(&mut tracks);
        tracks.truncate(limit);
        Ok(tracks)
    }
}
