//! # AI Suggestion Module
//!
//! Talks to a hosted text-generation model to turn a mood or a free-text
//! description into song suggestions.
//!
//! - [`prompt`] builds the instruction sent to the model
//! - [`parse`] extracts `(artist, title)` pairs from the generated text
//! - [`huggingface`] implements [`TextGenerator`] against the Hugging Face
//!   inference API
//!
//! The generator is optional: without an API key the pipeline uses the
//! listening-history recommendations instead.

use async_trait::async_trait;
use serde::Deserialize;

use crate::{
    Res, debug,
    mood::{Mood, emotion_to_mood},
    types::Track,
    warning,
};

pub mod huggingface;
pub mod parse;
pub mod prompt;

pub use huggingface::HuggingFaceClient;
pub use parse::parse_suggestions;
pub use prompt::{PromptContext, build_prompt, example_tracks};

/// Tokens requested per wanted song.
const TOKENS_PER_SONG: usize = 30;

/// Longest list a single request asks for.
const MAX_SONGS: usize = 100;

/// Sampling parameters for creative but list-shaped output.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub max_new_tokens: usize,
    pub temperature: f32,
    pub top_p: f32,
    pub repetition_penalty: f32,
}

impl GenerationParams {
    pub fn for_count(count: usize) -> Self {
        Self {
            max_new_tokens: count.clamp(1, MAX_SONGS) * TOKENS_PER_SONG,
            temperature: 0.8,
            top_p: 0.9,
            repetition_penalty: 1.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EmotionScore {
    pub label: String,
    pub score: f32,
}

/// A hosted text model.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the generated text for `prompt`.
    ///
    /// A non-success response is an [`crate::Error::Upstream`].
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Res<String>;

    /// Scores `text` against emotion labels (joy, sadness, ...).
    async fn classify_emotion(&self, text: &str) -> Res<Vec<EmotionScore>>;
}

/// Guesses a mood from the first five tracks of the user's library.
///
/// Classification failures degrade to a neutral emotion, i.e. chill.
pub async fn detect_mood(generator: &dyn TextGenerator, tracks: &[Track]) -> Mood {
    let sample = tracks
        .iter()
        .take(5)
        .map(|t| format!("{} by {}", t.name, t.primary_artist().unwrap_or("Unknown")))
        .collect::<Vec<_>>()
        .join(". ");

    if sample.is_empty() {
        return Mood::Chill;
    }

    let scores = match generator.classify_emotion(&sample).await {
        Ok(scores) => scores,
        Err(e) => {
            warning!("Mood analysis failed, assuming neutral: {}", e);
            Vec::new()
        }
    };

    let top = scores
        .iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .map(|s| s.label.as_str())
        .unwrap_or("neutral");

    let mood = emotion_to_mood(top);
    debug!("top emotion '{}' maps to mood '{}'", top, mood);
    mood
}
