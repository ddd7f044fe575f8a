use std::{collections::HashSet, sync::LazyLock};

use regex::Regex;

use crate::types::SongSuggestion;

static DASH_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\d+\.\s+(.+?)\s+[-–—]\s+(.+?)\s*$").expect("valid dash pattern")
});

static BY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*\d+\.\s+(.+?)\s+by\s+(.+?)\s*$").expect("valid by pattern")
});

static NUMBERED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+[.)]\s*(.*)$").expect("valid numbered pattern"));

/// Extracts up to `count` song suggestions from generated text.
///
/// The primary pass accepts numbered lines shaped `N. Artist - Title` (hyphen,
/// en or em dash) or `N. Title by Artist`. When that yields fewer than
/// `count` results, a looser pass splits any numbered line on its first
/// dash. Duplicates are dropped case-insensitively and the result keeps the
/// order of the text. Never fails; unusable text yields an empty list.
pub fn parse_suggestions(text: &str, count: usize) -> Vec<SongSuggestion> {
    if count == 0 {
        return Vec::new();
    }

    let mut collector = Collector::new(count);

    for line in text.lines() {
        if collector.is_full() {
            break;
        }
        if let Some(caps) = DASH_LINE.captures(line) {
            collector.push(&caps[1], &caps[2]);
        } else if let Some(caps) = BY_LINE.captures(line) {
            collector.push(&caps[2], &caps[1]);
        }
    }

    if !collector.is_full() {
        for line in text.lines() {
            if collector.is_full() {
                break;
            }
            if DASH_LINE.is_match(line) || BY_LINE.is_match(line) {
                continue;
            }
            let Some(caps) = NUMBERED_LINE.captures(line) else {
                continue;
            };
            let rest = caps.get(1).map_or("", |m| m.as_str());
            if let Some((artist, title)) = rest.split_once(['-', '–', '—']) {
                collector.push(artist, title);
            }
        }
    }

    collector.into_inner()
}

struct Collector {
    limit: usize,
    seen: HashSet<(String, String)>,
    items: Vec<SongSuggestion>,
}

impl Collector {
    fn new(limit: usize) -> Self {
        Self {
            limit,
            seen: HashSet::new(),
            items: Vec::new(),
        }
    }

    fn is_full(&self) -> bool {
        self.items.len() >= self.limit
    }

    fn push(&mut self, artist: &str, title: &str) {
        let artist = clean(artist);
        let title = clean(title);
        if artist.is_empty() || title.is_empty() {
            return;
        }
        let key = (artist.to_lowercase(), title.to_lowercase());
        if self.seen.insert(key) {
            self.items.push(SongSuggestion { artist, title });
        }
    }

    fn into_inner(self) -> Vec<SongSuggestion> {
        self.items
    }
}

fn clean(field: &str) -> String {
    field
        .trim()
        .trim_end_matches([',', ';'])
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '“' | '”' | '‘' | '’' | '*'))
        .trim()
        .to_string()
}
