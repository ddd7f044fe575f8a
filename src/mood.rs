//! Mood labels and the audio features they stand for.
//!
//! Every mood maps to a [`FeatureTarget`] of energy, danceability and
//! valence, all in `[0, 1]`. Unknown labels fall back to [`Mood::Chill`] so
//! an unrecognized label never blocks a generation request.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::types::FeatureTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Energetic,
    Romantic,
    Focus,
    Chill,
    Party,
    Workout,
    Magical,
    Jazzy,
    Melancholic,
    Intense,
    Dark,
}

impl Mood {
    pub const ALL: [Mood; 12] = [
        Mood::Happy,
        Mood::Energetic,
        Mood::Romantic,
        Mood::Focus,
        Mood::Chill,
        Mood::Party,
        Mood::Workout,
        Mood::Magical,
        Mood::Jazzy,
        Mood::Melancholic,
        Mood::Intense,
        Mood::Dark,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Energetic => "energetic",
            Mood::Romantic => "romantic",
            Mood::Focus => "focus",
            Mood::Chill => "chill",
            Mood::Party => "party",
            Mood::Workout => "workout",
            Mood::Magical => "magical",
            Mood::Jazzy => "jazzy",
            Mood::Melancholic => "melancholic",
            Mood::Intense => "intense",
            Mood::Dark => "dark",
        }
    }

    /// Capitalized label used in playlist names.
    pub fn title(&self) -> String {
        let s = self.as_str();
        let mut chars = s.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn features(&self) -> FeatureTarget {
        let (energy, danceability, valence) = match self {
            Mood::Happy => (0.8, 0.7, 0.8),
            Mood::Energetic => (0.9, 0.8, 0.7),
            Mood::Romantic => (0.5, 0.5, 0.5),
            Mood::Focus => (0.4, 0.3, 0.5),
            Mood::Chill => (0.3, 0.4, 0.6),
            Mood::Party => (0.9, 0.9, 0.7),
            Mood::Workout => (0.9, 0.7, 0.6),
            Mood::Magical => (0.6, 0.5, 0.7),
            Mood::Jazzy => (0.5, 0.6, 0.6),
            Mood::Melancholic => (0.3, 0.3, 0.2),
            Mood::Intense => (0.8, 0.4, 0.3),
            Mood::Dark => (0.5, 0.3, 0.2),
        };
        FeatureTarget {
            energy,
            danceability,
            valence,
        }
    }

    /// Parses a label, falling back to [`Mood::Chill`].
    pub fn from_label(label: &str) -> Mood {
        label.parse().unwrap_or(Mood::Chill)
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Mood::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == needle)
            .ok_or_else(|| format!("unknown mood '{s}'"))
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target features for a free-form mood label.
pub fn mood_to_features(label: &str) -> FeatureTarget {
    Mood::from_label(label).features()
}

/// Maps a label from the emotion classifier onto a mood.
///
/// Unknown labels become [`Mood::Chill`], the same neutral default used for
/// unknown mood labels.
pub fn emotion_to_mood(label: &str) -> Mood {
    match label.trim().to_lowercase().as_str() {
        "joy" => Mood::Happy,
        "surprise" => Mood::Energetic,
        "neutral" => Mood::Chill,
        "sadness" => Mood::Melancholic,
        "fear" => Mood::Focus,
        "anger" => Mood::Intense,
        "disgust" => Mood::Dark,
        _ => Mood::Chill,
    }
}
