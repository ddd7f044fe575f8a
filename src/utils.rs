use std::collections::HashSet;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::types::{Track, TrackTableRow};

/// Spotify rejects playlist descriptions above this length.
pub const MAX_DESCRIPTION_LEN: usize = 300;

pub fn generate_code_verifier() -> String {
    random_alphanumeric(128)
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Identifier for a playlist that only exists as a local draft.
pub fn generate_draft_id() -> String {
    format!("draft-{}", random_alphanumeric(16).to_lowercase())
}

fn random_alphanumeric(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Removes later duplicates by track id, keeping first-seen order.
pub fn remove_duplicate_tracks(tracks: &mut Vec<Track>) {
    let mut seen_ids = HashSet::new();
    tracks.retain(|track| seen_ids.insert(track.id.clone()));
}

/// Concatenates two lists and removes duplicates by id.
pub fn merge_tracks(first: Vec<Track>, second: Vec<Track>) -> Vec<Track> {
    let mut merged = first;
    merged.extend(second);
    remove_duplicate_tracks(&mut merged);
    merged
}

/// Case-insensitive match where either name may contain the other.
pub fn artist_matches(candidate: &str, wanted: &str) -> bool {
    let candidate = normalize(candidate);
    let wanted = normalize(wanted);
    if candidate.is_empty() || wanted.is_empty() {
        return false;
    }
    candidate == wanted || candidate.contains(&wanted) || wanted.contains(&candidate)
}

/// Title similarity tier: 2 exact, 1 substring either way, 0 none.
pub fn title_similarity(candidate: &str, wanted: &str) -> u8 {
    let candidate = normalize(candidate);
    let wanted = normalize(wanted);
    if candidate.is_empty() || wanted.is_empty() {
        return 0;
    }
    if candidate == wanted {
        2
    } else if candidate.contains(&wanted) || wanted.contains(&candidate) {
        1
    } else {
        0
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Cuts `text` to at most `max` characters on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

pub fn track_table_rows(tracks: &[Track]) -> Vec<TrackTableRow> {
    tracks
        .iter()
        .enumerate()
        .map(|(i, t)| TrackTableRow {
            position: i + 1,
            name: t.name.clone(),
            artists: t.artist_names(),
            album: t.album.clone(),
        })
        .collect()
}
