use moodlist::language::{Language, language_to_market};
use moodlist::mood::{Mood, emotion_to_mood, mood_to_features};

#[test]
fn test_every_mood_has_features_in_unit_range() {
    for mood in Mood::ALL {
        let f = mood.features();
        for value in [f.energy, f.danceability, f.valence] {
            assert!(
                (0.0..=1.0).contains(&value),
                "{mood} has out-of-range feature {value}"
            );
        }
    }
}

#[test]
fn test_mood_to_features_known_label() {
    let happy = mood_to_features("happy");
    assert_eq!(happy.energy, 0.8);
    assert_eq!(happy.danceability, 0.7);
    assert_eq!(happy.valence, 0.8);

    // labels are case-insensitive
    assert_eq!(mood_to_features("  HAPPY "), happy);
}

#[test]
fn test_unknown_mood_falls_back_to_chill() {
    assert_eq!(mood_to_features("grumpy"), Mood::Chill.features());
    assert_eq!(mood_to_features(""), Mood::Chill.features());
    assert_eq!(Mood::from_label("whatever"), Mood::Chill);
}

#[test]
fn test_mood_parse_and_display() {
    assert_eq!("melancholic".parse::<Mood>(), Ok(Mood::Melancholic));
    assert!("grumpy".parse::<Mood>().is_err());
    assert_eq!(Mood::Party.to_string(), "party");
    assert_eq!(Mood::Happy.title(), "Happy");
}

#[test]
fn test_emotion_to_mood() {
    assert_eq!(emotion_to_mood("joy"), Mood::Happy);
    assert_eq!(emotion_to_mood("sadness"), Mood::Melancholic);
    assert_eq!(emotion_to_mood("anger"), Mood::Intense);
    assert_eq!(emotion_to_mood("neutral"), Mood::Chill);
    assert_eq!(emotion_to_mood("confusion"), Mood::Chill);
}

#[test]
fn test_every_language_except_any_has_a_market() {
    for language in Language::ALL {
        let market = language_to_market(language.code());
        if language.is_any() {
            assert_eq!(market, None);
        } else {
            let market = market.unwrap_or_default();
            assert!(!market.is_empty(), "{language} has no market");
        }
    }
}

#[test]
fn test_language_to_market_uses_first_market() {
    assert_eq!(language_to_market("en"), Some("US"));
    assert_eq!(language_to_market("es"), Some("ES"));
    assert_eq!(language_to_market("pt"), Some("PT"));
    assert_eq!(language_to_market("hi"), Some("IN"));
    assert_eq!(language_to_market("ja"), Some("JP"));
}

#[test]
fn test_language_to_market_unknown_and_any() {
    assert_eq!(language_to_market("any"), None);
    assert_eq!(language_to_market("xx"), None);
    assert_eq!(language_to_market(""), None);
}

#[test]
fn test_language_display_name() {
    assert_eq!(Language::Es.display_name(), "Spanish");
    assert_eq!("de".parse::<Language>(), Ok(Language::De));
    assert_eq!(Language::default(), Language::Any);
}
