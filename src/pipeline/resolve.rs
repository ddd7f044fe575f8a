use std::{collections::HashSet, sync::Arc};

use crate::{
    debug,
    spotify::MusicCatalog,
    types::{SongSuggestion, Track},
    utils::{artist_matches, title_similarity},
    warning,
};

const QUALIFIED_LIMIT: usize = 5;
const FREE_TEXT_LIMIT: usize = 10;

/// Maps free-text `(artist, title)` suggestions to catalog tracks.
#[derive(Clone)]
pub struct TrackResolver {
    catalog: Arc<dyn MusicCatalog>,
}

impl TrackResolver {
    pub fn new(catalog: Arc<dyn MusicCatalog>) -> Self {
        Self { catalog }
    }

    /// Resolves suggestions in order, silently dropping those without a
    /// match. The output never contains the same uri twice.
    pub async fn resolve(&self, suggestions: &[SongSuggestion], market: Option<&str>) -> Vec<Track> {
        self.resolve_partitioned(suggestions, market).await.0
    }

    /// Like [`TrackResolver::resolve`] but also returns the suggestions that
    /// found no track.
    pub async fn resolve_partitioned(
        &self,
        suggestions: &[SongSuggestion],
        market: Option<&str>,
    ) -> (Vec<Track>, Vec<SongSuggestion>) {
        let mut uris = HashSet::new();
        let mut resolved = Vec::new();
        let mut unmatched = Vec::new();

        for suggestion in suggestions {
            match self.resolve_one(suggestion, market).await {
                Some(track) => {
                    if uris.insert(track.uri.clone()) {
                        resolved.push(track);
                    }
                }
                None => {
                    debug!("no match for {} - {}", suggestion.artist, suggestion.title);
                    unmatched.push(suggestion.clone());
                }
            }
        }

        (resolved, unmatched)
    }

    /// Qualified `track:` / `artist:` search first, ranked free-text search
    /// second.
    pub async fn resolve_one(&self, suggestion: &SongSuggestion, market: Option<&str>) -> Option<Track> {
        let qualified = format!(
            "track:\"{}\" artist:\"{}\"",
            suggestion.title, suggestion.artist
        );
        match self
            .catalog
            .search_tracks(&qualified, QUALIFIED_LIMIT, market)
            .await
        {
            Ok(candidates) => {
                if let Some(track) = candidates
                    .into_iter()
                    .find(|t| has_artist(t, &suggestion.artist))
                {
                    return Some(track);
                }
            }
            Err(e) => warning!(
                "Search for \"{}\" by {} failed: {}",
                suggestion.title,
                suggestion.artist,
                e
            ),
        }

        let free_text = format!("{} {}", suggestion.title, suggestion.artist);
        let mut candidates = match self
            .catalog
            .search_tracks(&free_text, FREE_TEXT_LIMIT, market)
            .await
        {
            Ok(candidates) => candidates,
            Err(e) => {
                warning!("Search for \"{}\" failed: {}", free_text, e);
                return None;
            }
        };

        // stable: ties keep catalog order
        candidates.sort_by_key(|t| {
            std::cmp::Reverse((
                has_artist(t, &suggestion.artist),
                title_similarity(&t.name, &suggestion.title),
            ))
        });
        candidates.into_iter().next()
    }
}

fn has_artist(track: &Track, wanted: &str) -> bool {
    track.artists.iter().any(|a| artist_matches(&a.name, wanted))
}
