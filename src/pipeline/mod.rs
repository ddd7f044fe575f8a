//! # Generation Pipeline
//!
//! One parameterized pipeline turns a [`GenerationRequest`] into a
//! [`Preview`]. The three modes share their sub-steps:
//!
//! ```text
//!            ┌─ Basic ──▶ seed gathering ──▶ recommendation cascade ──────────┐
//! request ───┼─ Ai ─────▶ mood examples ─┐                                     ├──▶ playlist write ──▶ Preview
//!            └─ Custom ─▶ free-text ─────┴▶ suggestions ▶ resolution ▶ complement ┘
//! ```
//!
//! Without a text generator the `Ai` and `Custom` modes fall back to
//! recommendations seeded from the user's library.

use std::sync::Arc;

use crate::{
    Error, Res,
    ai::{self, GenerationParams, PromptContext, TextGenerator},
    debug, info,
    language::Language,
    mood::Mood,
    spotify::MusicCatalog,
    types::{Playlist, SongSuggestion, TempPlaylistHandle, Track},
    utils::{self, MAX_DESCRIPTION_LEN},
    warning,
};

pub mod lifecycle;
pub mod recommend;
pub mod resolve;
pub mod shuffle;

pub use lifecycle::{DISCARD_TIMEOUT, LifecycleState, PlaylistLifecycle, Preview};
pub use recommend::{Cascade, RecommendationRequest, Recommender};
pub use resolve::TrackResolver;
pub use shuffle::{KeepOrder, RandomShuffle, SeededShuffle, Shuffle};

pub const BASIC_TRACK_COUNT: usize = 25;
pub const AI_TRACK_COUNT: usize = 15;
pub const CUSTOM_TRACK_COUNT: usize = 20;

const SEED_TRACKS: usize = 5;
const EXAMPLE_FETCH: usize = 5;
const TIME_RANGE: &str = "medium_term";

const NO_TRACKS_FOR_MOOD: &str =
    "No tracks were found for your mood. Please try a different mood or language.";
const NO_TRACKS_FOR_DESCRIPTION: &str =
    "No tracks were found for your description. Please try a different description or language.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Basic,
    Ai,
    Custom,
}

impl Mode {
    pub fn default_count(&self) -> usize {
        match self {
            Mode::Basic => BASIC_TRACK_COUNT,
            Mode::Ai => AI_TRACK_COUNT,
            Mode::Custom => CUSTOM_TRACK_COUNT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub mode: Mode,
    /// `None` lets the pipeline guess the mood from the user's library.
    pub mood: Option<Mood>,
    pub language: Language,
    pub prompt: Option<String>,
    pub count: Option<usize>,
    pub name: Option<String>,
    /// Keep the playlist as a local draft until it is saved.
    pub defer: bool,
}

impl GenerationRequest {
    pub fn basic(mood: Mood, language: Language) -> Self {
        Self::new(Mode::Basic, Some(mood), language)
    }

    pub fn ai(mood: Option<Mood>, language: Language) -> Self {
        Self::new(Mode::Ai, mood, language)
    }

    pub fn custom(prompt: impl Into<String>, language: Language) -> Self {
        Self {
            prompt: Some(prompt.into()),
            ..Self::new(Mode::Custom, None, language)
        }
    }

    fn new(mode: Mode, mood: Option<Mood>, language: Language) -> Self {
        Self {
            mode,
            mood,
            language,
            prompt: None,
            count: None,
            name: None,
            defer: false,
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn deferred(mut self, defer: bool) -> Self {
        self.defer = defer;
        self
    }

    pub fn count(&self) -> usize {
        self.count
            .filter(|c| *c > 0)
            .unwrap_or_else(|| self.mode.default_count())
    }

    fn exhausted_message(&self) -> &'static str {
        match self.mode {
            Mode::Custom => NO_TRACKS_FOR_DESCRIPTION,
            _ => NO_TRACKS_FOR_MOOD,
        }
    }
}

/// Tracks plus the suggestions that could not be matched yet.
struct Selection {
    tracks: Vec<Track>,
    pending: Vec<SongSuggestion>,
}

impl Selection {
    fn tracks(tracks: Vec<Track>) -> Self {
        Self {
            tracks,
            pending: Vec::new(),
        }
    }
}

/// Runs generation requests against a catalog and an optional text model.
#[derive(Clone)]
pub struct Generator {
    catalog: Arc<dyn MusicCatalog>,
    generator: Option<Arc<dyn TextGenerator>>,
    shuffle: Arc<dyn Shuffle>,
}

impl Generator {
    pub fn new(catalog: Arc<dyn MusicCatalog>) -> Self {
        Self {
            catalog,
            generator: None,
            shuffle: Arc::new(RandomShuffle),
        }
    }

    pub fn with_generator(mut self, generator: Option<Arc<dyn TextGenerator>>) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_shuffle(mut self, shuffle: Arc<dyn Shuffle>) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn catalog(&self) -> Arc<dyn MusicCatalog> {
        Arc::clone(&self.catalog)
    }

    fn recommender(&self) -> Recommender {
        Recommender::new(Arc::clone(&self.catalog), Arc::clone(&self.shuffle))
    }

    fn resolver(&self) -> TrackResolver {
        TrackResolver::new(Arc::clone(&self.catalog))
    }

    /// Runs `request` inside the lifecycle: `Generating`, then `Previewing`
    /// on success or back to `Idle` with the error.
    pub async fn run(
        &self,
        lifecycle: &mut PlaylistLifecycle,
        request: &GenerationRequest,
    ) -> Res<()> {
        lifecycle.begin();
        let outcome = self.generate(request).await;
        lifecycle.complete(outcome)
    }

    /// Produces a preview for `request`.
    ///
    /// # Errors
    ///
    /// - [`Error::ResolutionExhausted`] when no track at all was found
    /// - [`Error::Upstream`] when the text model answers with an error
    /// - catalog errors while creating the playlist
    pub async fn generate(&self, request: &GenerationRequest) -> Res<Preview> {
        let count = request.count();
        let market = request.language.market();

        let mood = match (request.mood, request.mode) {
            (Some(mood), _) => mood,
            (None, Mode::Custom) => Mood::Chill,
            (None, _) => self.guess_mood().await,
        };

        let selection = match (request.mode, &self.generator) {
            (Mode::Basic, _) => Selection::tracks(self.basic(mood, count, market).await?),
            (_, None) => {
                warning!("No Hugging Face API key configured, using recommendations instead");
                let tracks = self
                    .recommender()
                    .recommend_from_library(mood, count, market)
                    .await?;
                Selection::tracks(tracks)
            }
            (Mode::Ai, Some(generator)) => {
                let examples = self.example_tracks().await;
                let context = PromptContext::Mood {
                    mood,
                    language: request.language,
                    examples,
                };
                self.suggest(generator.as_ref(), &context, mood, None, count, market)
                    .await?
            }
            (Mode::Custom, Some(generator)) => {
                let prompt = request
                    .prompt
                    .as_deref()
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .ok_or_else(|| {
                        Error::InvalidState("A playlist description is required".to_string())
                    })?;
                let context = PromptContext::Custom {
                    prompt: prompt.to_string(),
                    language: request.language,
                };
                self.suggest(generator.as_ref(), &context, mood, Some(prompt), count, market)
                    .await?
            }
        };

        if selection.tracks.is_empty() {
            return Err(Error::ResolutionExhausted(
                request.exhausted_message().to_string(),
            ));
        }

        let (name, description) = playlist_text(request, mood);
        self.write(name, description, selection, market, request.defer)
            .await
    }

    async fn guess_mood(&self) -> Mood {
        let Some(generator) = &self.generator else {
            return Mood::Chill;
        };
        let tracks = match self.catalog.top_tracks(TIME_RANGE, EXAMPLE_FETCH).await {
            Ok(tracks) => tracks,
            Err(e) => {
                warning!("Could not read your top tracks: {}", e);
                return Mood::Chill;
            }
        };
        let mood = ai::detect_mood(generator.as_ref(), &tracks).await;
        info!("Detected mood: {}", mood);
        mood
    }

    /// Seeds the cascade with the user's top tracks.
    async fn basic(&self, mood: Mood, count: usize, market: Option<&str>) -> Res<Vec<Track>> {
        let seeds = match self.catalog.top_tracks(TIME_RANGE, SEED_TRACKS).await {
            Ok(tracks) => tracks,
            Err(e) => {
                warning!("Could not read your top tracks: {}", e);
                Vec::new()
            }
        };

        let mut request = RecommendationRequest::new(mood.features(), count);
        request.seed_tracks = seeds.iter().map(|t| t.id.clone()).collect();
        if request.seed_tracks.is_empty() {
            request.seed_genres = self.catalog.available_genres().into_iter().take(2).collect();
        }
        request.market = market.map(str::to_string);

        self.recommender().recommend(&request).await
    }

    async fn example_tracks(&self) -> Vec<Track> {
        let (top, recent) = tokio::join!(
            self.catalog.top_tracks(TIME_RANGE, EXAMPLE_FETCH),
            self.catalog.recently_played(EXAMPLE_FETCH),
        );
        let top = top.unwrap_or_else(|e| {
            warning!("Could not read your top tracks: {}", e);
            Vec::new()
        });
        let recent = recent.unwrap_or_else(|e| {
            warning!("Could not read your recently played tracks: {}", e);
            Vec::new()
        });
        ai::example_tracks(&top, &recent)
    }

    /// Suggestion, resolution and complement steps.
    async fn suggest(
        &self,
        generator: &dyn TextGenerator,
        context: &PromptContext,
        mood: Mood,
        search_text: Option<&str>,
        count: usize,
        market: Option<&str>,
    ) -> Res<Selection> {
        let prompt = ai::build_prompt(context);
        debug!("prompt: {}", prompt);

        let text = generator
            .generate(&prompt, &GenerationParams::for_count(count))
            .await?;
        let suggestions = ai::parse_suggestions(&text, count);
        info!("The model suggested {} songs", suggestions.len());

        let (tracks, pending) = self
            .resolver()
            .resolve_partitioned(&suggestions, market)
            .await;
        info!("Matched {} of them on Spotify", tracks.len());

        let query = search_text.unwrap_or(mood.as_str());
        let mut tracks = self
            .complement(tracks, mood, query, count, market)
            .await;
        tracks.truncate(count);

        Ok(Selection { tracks, pending })
    }

    /// Tops up a short list with recommendations seeded by the resolved
    /// tracks and, if still short, a plain text search.
    async fn complement(
        &self,
        mut tracks: Vec<Track>,
        mood: Mood,
        query: &str,
        count: usize,
        market: Option<&str>,
    ) -> Vec<Track> {
        if tracks.len() >= count {
            return tracks;
        }

        if !tracks.is_empty() {
            let mut request = RecommendationRequest::new(mood.features(), count - tracks.len());
            request.seed_tracks = tracks
                .iter()
                .take(SEED_TRACKS)
                .map(|t| t.id.clone())
                .collect();
            request.market = market.map(str::to_string);
            match self.recommender().recommend(&request).await {
                Ok(more) => tracks = utils::merge_tracks(tracks, more),
                Err(e) => warning!("Could not complement with recommendations: {}", e),
            }
        }

        if tracks.len() < recommend::MIN_CANDIDATES {
            match self
                .catalog
                .search_tracks(query, count.saturating_sub(tracks.len()).max(1), market)
                .await
            {
                Ok(found) => tracks = utils::merge_tracks(tracks, found),
                Err(e) => warning!("Search for \"{}\" failed: {}", query, e),
            }
        }

        tracks
    }

    /// Creates and fills the playlist on Spotify, or keeps a local draft.
    async fn write(
        &self,
        name: String,
        description: String,
        selection: Selection,
        market: Option<&str>,
        defer: bool,
    ) -> Res<Preview> {
        let Selection { tracks, pending } = selection;
        let track_ids: Vec<String> = tracks.iter().map(|t| t.id.clone()).collect();

        let (playlist, handle) = if defer {
            let id = utils::generate_draft_id();
            let playlist = Playlist {
                id: id.clone(),
                name,
                description,
                external_url: String::new(),
                tracks,
            };
            let handle = TempPlaylistHandle {
                id,
                track_ids,
                remote: false,
            };
            (playlist, handle)
        } else {
            let mut playlist = self.catalog.create_playlist(&name, &description).await?;
            let uris: Vec<String> = tracks.iter().map(|t| t.uri.clone()).collect();
            self.catalog.add_tracks(&playlist.id, &uris).await?;
            playlist.tracks = tracks;
            let handle = TempPlaylistHandle {
                id: playlist.id.clone(),
                track_ids,
                remote: true,
            };
            (playlist, handle)
        };

        Ok(Preview {
            playlist,
            handle,
            pending: if defer { pending } else { Vec::new() },
            market: market.map(str::to_string),
        })
    }
}

/// Playlist name and description for a request.
pub fn playlist_text(request: &GenerationRequest, mood: Mood) -> (String, String) {
    let language = if request.language.is_any() {
        None
    } else {
        Some(request.language.code())
    };
    let suffix = language.map(|l| format!(" ({l})")).unwrap_or_default();
    let in_language = language.map(|l| format!(" in {l}")).unwrap_or_default();

    let (default_name, description) = match request.mode {
        Mode::Basic => (
            format!("My {} Playlist{}", mood.title(), suffix),
            format!(
                "A {mood} playlist generated based on your listening history{in_language}"
            ),
        ),
        Mode::Ai => (
            format!("My {} Vibes{}", mood.title(), suffix),
            format!(
                "AI-generated playlist for {mood} mood{in_language} based on your listening history"
            ),
        ),
        Mode::Custom => (
            "My Custom Playlist".to_string(),
            format!(
                "Custom playlist: {}",
                request.prompt.as_deref().unwrap_or_default().trim()
            ),
        ),
    };

    let name = request
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or(default_name);

    (name, utils::truncate_chars(&description, MAX_DESCRIPTION_LEN))
}
