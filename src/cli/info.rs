use tabled::Table;

use crate::{
    language::Language,
    mood::Mood,
    types::{LanguageTableRow, MoodTableRow},
};

pub fn moods() {
    let rows: Vec<MoodTableRow> = Mood::ALL
        .iter()
        .map(|mood| {
            let features = mood.features();
            MoodTableRow {
                mood: mood.to_string(),
                energy: format!("{:.1}", features.energy),
                danceability: format!("{:.1}", features.danceability),
                valence: format!("{:.1}", features.valence),
            }
        })
        .collect();

    println!("{}", Table::new(rows));
}

pub fn languages() {
    let rows: Vec<LanguageTableRow> = Language::ALL
        .iter()
        .map(|language| LanguageTableRow {
            code: language.code().to_string(),
            language: language.display_name().to_string(),
            markets: if language.is_any() {
                "-".to_string()
            } else {
                language.markets().join(", ")
            },
        })
        .collect();

    println!("{}", Table::new(rows));
}
