use std::collections::HashSet;

use crate::{language::Language, mood::Mood, types::Track};

/// At most this many of the user's tracks are quoted to bias the tone.
pub const MAX_EXAMPLES: usize = 5;

#[derive(Debug, Clone)]
pub enum PromptContext {
    Mood {
        mood: Mood,
        language: Language,
        examples: Vec<Track>,
    },
    Custom {
        prompt: String,
        language: Language,
    },
}

/// Picks up to five example tracks from top and recent tracks, deduplicated
/// by id, top tracks first.
pub fn example_tracks(top: &[Track], recent: &[Track]) -> Vec<Track> {
    let mut seen = HashSet::new();
    top.iter()
        .chain(recent.iter())
        .filter(|t| seen.insert(t.id.clone()))
        .take(MAX_EXAMPLES)
        .cloned()
        .collect()
}

/// Builds the instruction for the text model.
///
/// Every prompt ends with `"\n1."` so a completion model continues a
/// numbered "Artist - Title" list.
pub fn build_prompt(context: &PromptContext) -> String {
    match context {
        PromptContext::Mood {
            mood,
            language,
            examples,
        } => mood_prompt(*mood, *language, examples),
        PromptContext::Custom { prompt, language } => custom_prompt(prompt, *language),
    }
}

fn mood_prompt(mood: Mood, language: Language, examples: &[Track]) -> String {
    let examples = examples
        .iter()
        .take(MAX_EXAMPLES)
        .map(|t| format!("{} - {}", t.primary_artist().unwrap_or("Unknown"), t.name))
        .collect::<Vec<_>>()
        .join(", ");

    match (examples.is_empty(), language_clause(language)) {
        (true, None) => format!("Here are some great songs that capture a {mood} mood:\n1."),
        (true, Some((name, only))) => format!(
            "Here are some great songs in the {name} language that capture a {mood} mood. {only}:\n1."
        ),
        (false, None) => format!(
            "Based on your enjoyment of songs like {examples}, here are some {mood} songs you might like:\n1."
        ),
        (false, Some((name, only))) => format!(
            "Based on your enjoyment of songs like {examples}, here are some {mood} songs in the {name} language. {only}:\n1."
        ),
    }
}

fn custom_prompt(prompt: &str, language: Language) -> String {
    let prompt = prompt.trim();
    match language_clause(language) {
        None => format!(
            "Here are some great songs that match this description: \"{prompt}\". Each line is Artist - Title:\n1."
        ),
        Some((name, only)) => format!(
            "Here are some great songs in the {name} language that match this description: \"{prompt}\". {only}. Each line is Artist - Title:\n1."
        ),
    }
}

fn language_clause(language: Language) -> Option<(&'static str, String)> {
    if language.is_any() {
        return None;
    }
    let name = language.display_name();
    Some((
        name,
        format!("Please only suggest songs that are specifically in {name}"),
    ))
}
