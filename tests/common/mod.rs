#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use moodlist::{
    Error, Res,
    ai::{EmotionScore, GenerationParams, TextGenerator},
    spotify::MusicCatalog,
    types::{Artist, Playlist, RecommendationQuery, Track, TrackArtist, UserProfile},
};

pub fn track(id: &str, name: &str, artist: &str) -> Track {
    Track {
        id: id.to_string(),
        name: name.to_string(),
        artists: vec![TrackArtist {
            id: Some(format!("{id}_artist")),
            name: artist.to_string(),
        }],
        album: format!("{name} (Album)"),
        artwork_url: None,
        uri: format!("spotify:track:{id}"),
    }
}

pub fn tracks(prefix: &str, count: usize) -> Vec<Track> {
    (1..=count)
        .map(|i| track(&format!("{prefix}{i}"), &format!("Song {prefix}{i}"), "Some Artist"))
        .collect()
}

pub fn artist(id: &str, name: &str, genres: &[&str]) -> Artist {
    Artist {
        id: id.to_string(),
        name: name.to_string(),
        genres: genres.iter().map(|g| g.to_string()).collect(),
    }
}

pub fn unavailable(endpoint: &str) -> Error {
    Error::Upstream {
        service: "Spotify",
        status: 503,
        message: format!("{endpoint} unavailable"),
    }
}

/// In-memory catalog. Unknown searches return no results, the
/// recommendations endpoint fails unless `recommendations` is set.
#[derive(Default)]
pub struct FakeCatalog {
    pub top: Vec<Track>,
    pub recent: Vec<Track>,
    pub saved: Vec<Track>,
    pub followed: Vec<Artist>,
    pub top_artists: Vec<Artist>,
    pub by_id: HashMap<String, Track>,
    pub artist_tracks: HashMap<String, Vec<Track>>,
    pub search_results: HashMap<String, Vec<Track>>,
    pub recommendations: Option<Vec<Track>>,

    pub fail_top: bool,
    pub fail_saved: bool,
    pub fail_search: bool,
    pub fail_followed: bool,
    pub fail_create: bool,
    pub fail_add: bool,
    pub fail_unfollow: bool,
    pub hang_unfollow: bool,

    pub searches: Mutex<Vec<String>>,
    pub created: Mutex<Vec<(String, String)>>,
    pub added: Mutex<Vec<(String, Vec<String>)>>,
    pub unfollowed: Mutex<Vec<String>>,
    pub top_called: AtomicBool,
}

impl FakeCatalog {
    pub fn with_search(mut self, query: &str, results: Vec<Track>) -> Self {
        self.search_results.insert(query.to_string(), results);
        self
    }

    pub fn searches(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<(String, String)> {
        self.created.lock().unwrap().clone()
    }

    pub fn added(&self) -> Vec<(String, Vec<String>)> {
        self.added.lock().unwrap().clone()
    }

    pub fn unfollowed(&self) -> Vec<String> {
        self.unfollowed.lock().unwrap().clone()
    }
}

#[async_trait]
impl MusicCatalog for FakeCatalog {
    async fn current_user(&self) -> Res<UserProfile> {
        Ok(UserProfile {
            id: "listener".to_string(),
            display_name: Some("Listener".to_string()),
        })
    }

    async fn top_tracks(&self, _time_range: &str, limit: usize) -> Res<Vec<Track>> {
        self.top_called.store(true, Ordering::SeqCst);
        if self.fail_top {
            return Err(unavailable("top tracks"));
        }
        Ok(self.top.iter().take(limit).cloned().collect())
    }

    async fn recently_played(&self, limit: usize) -> Res<Vec<Track>> {
        Ok(self.recent.iter().take(limit).cloned().collect())
    }

    async fn saved_tracks(&self, limit: usize) -> Res<Vec<Track>> {
        if self.fail_saved {
            return Err(unavailable("saved tracks"));
        }
        Ok(self.saved.iter().take(limit).cloned().collect())
    }

    async fn followed_artists(&self, limit: usize) -> Res<Vec<Artist>> {
        if self.fail_followed {
            return Err(unavailable("followed artists"));
        }
        Ok(self.followed.iter().take(limit).cloned().collect())
    }

    async fn top_artists(&self, limit: usize) -> Res<Vec<Artist>> {
        Ok(self.top_artists.iter().take(limit).cloned().collect())
    }

    async fn track(&self, id: &str) -> Res<Track> {
        self.by_id
            .get(id)
            .cloned()
            .or_else(|| self.top.iter().find(|t| t.id == id).cloned())
            .ok_or_else(|| unavailable("track"))
    }

    async fn artist_top_tracks(&self, artist_id: &str, _market: Option<&str>) -> Res<Vec<Track>> {
        Ok(self.artist_tracks.get(artist_id).cloned().unwrap_or_default())
    }

    async fn search_tracks(
        &self,
        query: &str,
        limit: usize,
        _market: Option<&str>,
    ) -> Res<Vec<Track>> {
        self.searches.lock().unwrap().push(query.to_string());
        if self.fail_search {
            return Err(unavailable("search"));
        }
        Ok(self
            .search_results
            .get(query)
            .map(|found| found.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn recommendations(&self, _query: &RecommendationQuery) -> Res<Vec<Track>> {
        self.recommendations
            .clone()
            .ok_or_else(|| unavailable("recommendations"))
    }

    async fn create_playlist(&self, name: &str, description: &str) -> Res<Playlist> {
        if self.fail_create {
            return Err(unavailable("create playlist"));
        }
        let mut created = self.created.lock().unwrap();
        created.push((name.to_string(), description.to_string()));
        let id = format!("playlist{}", created.len());
        Ok(Playlist {
            id: id.clone(),
            name: name.to_string(),
            description: description.to_string(),
            external_url: format!("https://open.spotify.com/playlist/{id}"),
            tracks: Vec::new(),
        })
    }

    async fn add_tracks(&self, playlist_id: &str, uris: &[String]) -> Res<()> {
        if self.fail_add {
            return Err(unavailable("add tracks"));
        }
        self.added
            .lock()
            .unwrap()
            .push((playlist_id.to_string(), uris.to_vec()));
        Ok(())
    }

    async fn unfollow_playlist(&self, playlist_id: &str) -> Res<()> {
        if self.hang_unfollow {
            std::future::pending::<()>().await;
        }
        if self.fail_unfollow {
            return Err(unavailable("unfollow"));
        }
        self.unfollowed.lock().unwrap().push(playlist_id.to_string());
        Ok(())
    }
}

/// Text model returning canned output. `None` answers like an overloaded
/// inference endpoint.
pub struct FakeGenerator {
    pub text: Option<String>,
    pub emotions: Vec<EmotionScore>,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeGenerator {
    pub fn replying(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            emotions: Vec::new(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            text: None,
            emotions: Vec::new(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, prompt: &str, _params: &GenerationParams) -> Res<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.text.clone().ok_or(Error::Upstream {
            service: "Hugging Face",
            status: 503,
            message: "model is overloaded".to_string(),
        })
    }

    async fn classify_emotion(&self, _text: &str) -> Res<Vec<EmotionScore>> {
        Ok(self.emotions.clone())
    }
}
