mod common;

use std::{
    collections::HashSet,
    sync::{Arc, atomic::Ordering},
};

use common::{FakeCatalog, artist, track, tracks, unavailable};
use moodlist::Error;
use moodlist::mood::Mood;
use moodlist::pipeline::{Cascade, KeepOrder, RecommendationRequest, Recommender, SeededShuffle};

fn recommender(catalog: FakeCatalog) -> (Arc<FakeCatalog>, Recommender) {
    let catalog = Arc::new(catalog);
    let recommender = Recommender::new(catalog.clone(), Arc::new(KeepOrder));
    (catalog, recommender)
}

fn ids(tracks: &[moodlist::types::Track]) -> Vec<String> {
    tracks.iter().map(|t| t.id.clone()).collect()
}

#[tokio::test]
async fn test_cascade_falls_back_to_top_tracks() {
    let top = tracks("top", 5);
    let (_, recommender) = recommender(FakeCatalog {
        top: top.clone(),
        ..Default::default()
    });

    let mut request = RecommendationRequest::new(Mood::Happy.features(), 10);
    request.seed_tracks = vec!["unknown".to_string()];
    request.seed_artists = vec!["silent".to_string()];
    request.seed_genres = vec!["polka".to_string()];

    let result = recommender.recommend(&request).await.unwrap();
    assert_eq!(result, top);
}

#[tokio::test]
async fn test_cascade_without_seeds_truncates_top_tracks() {
    let top = tracks("top", 8);
    let (_, recommender) = recommender(FakeCatalog {
        top: top.clone(),
        ..Default::default()
    });

    let request = RecommendationRequest::new(Mood::Chill.features(), 3);
    let result = recommender.recommend(&request).await.unwrap();
    assert_eq!(result, top[..3].to_vec());
}

#[tokio::test]
async fn test_seed_track_search_drops_first_hit() {
    let seed = track("seed", "Hello", "Adele");
    let mut found = vec![seed.clone()];
    found.extend(tracks("similar", 6));

    let mut catalog = FakeCatalog {
        top: tracks("top", 5),
        ..Default::default()
    }
    .with_search("Adele Hello", found);
    catalog.by_id.insert("seed".to_string(), seed);
    let (catalog, recommender) = recommender(catalog);

    let mut request = RecommendationRequest::new(Mood::Romantic.features(), 5);
    request.seed_tracks = vec!["seed".to_string()];

    let result = recommender.recommend(&request).await.unwrap();
    assert_eq!(
        ids(&result),
        vec!["similar1", "similar2", "similar3", "similar4", "similar5"]
    );
    assert!(!catalog.top_called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_genre_stage_uses_genre_filter() {
    let catalog = FakeCatalog::default().with_search("genre:\"jazz\"", tracks("jazz", 6));
    let (catalog, recommender) = recommender(catalog);

    let mut request = RecommendationRequest::new(Mood::Jazzy.features(), 6);
    request.seed_genres = vec!["jazz".to_string()];

    let result = recommender.recommend(&request).await.unwrap();
    assert_eq!(result.len(), 6);
    assert!(catalog.searches().contains(&"genre:\"jazz\"".to_string()));
}

#[tokio::test]
async fn test_stages_are_deduplicated_by_id() {
    let mut catalog = FakeCatalog {
        recommendations: Some(vec![track("a", "A", "One"), track("b", "B", "Two")]),
        top: vec![track("c", "C", "Three"), track("d", "D", "Four")],
        ..Default::default()
    };
    catalog.artist_tracks.insert(
        "artist".to_string(),
        vec![track("b", "B", "Two"), track("c", "C", "Three")],
    );
    let (_, recommender) = recommender(catalog);

    let mut request = RecommendationRequest::new(Mood::Party.features(), 10);
    request.seed_artists = vec!["artist".to_string()];

    let result = recommender.recommend(&request).await.unwrap();
    assert_eq!(ids(&result), vec!["a", "b", "c", "d"]);
}

#[tokio::test]
async fn test_total_exhaustion_propagates_fallback_error() {
    let (_, recommender) = recommender(FakeCatalog {
        fail_top: true,
        ..Default::default()
    });

    let request = RecommendationRequest::new(Mood::Dark.features(), 10);
    let result = recommender.recommend(&request).await;
    assert!(matches!(result, Err(Error::Upstream { status: 503, .. })));
}

#[tokio::test]
async fn test_fallback_error_is_absorbed_when_something_was_found() {
    let (_, recommender) = recommender(FakeCatalog {
        fail_top: true,
        recommendations: Some(tracks("rec", 2)),
        ..Default::default()
    });

    let mut request = RecommendationRequest::new(Mood::Focus.features(), 10);
    request.seed_genres = vec!["ambient".to_string()];

    let result = recommender.recommend(&request).await.unwrap();
    assert_eq!(ids(&result), vec!["rec1", "rec2"]);
}

#[tokio::test]
async fn test_seeded_shuffle_is_reproducible() {
    let top = tracks("top", 20);
    let catalog = Arc::new(FakeCatalog {
        top: top.clone(),
        ..Default::default()
    });
    let request = RecommendationRequest::new(Mood::Happy.features(), 20);

    let first = Recommender::new(catalog.clone(), Arc::new(SeededShuffle::new(7)))
        .recommend(&request)
        .await
        .unwrap();
    let second = Recommender::new(catalog.clone(), Arc::new(SeededShuffle::new(7)))
        .recommend(&request)
        .await
        .unwrap();

    assert_eq!(first, second);
    let expected: HashSet<String> = ids(&top).into_iter().collect();
    let actual: HashSet<String> = ids(&first).into_iter().collect();
    assert_eq!(actual, expected);
}

#[tokio::test]
async fn test_library_recommendations_fall_back_to_top_tracks() {
    let top = tracks("top", 5);
    let (_, recommender) = recommender(FakeCatalog {
        top: top.clone(),
        fail_saved: true,
        ..Default::default()
    });

    let result = recommender
        .recommend_from_library(Mood::Happy, 15, None)
        .await
        .unwrap();
    assert_eq!(result, top);
}

#[tokio::test]
async fn test_library_recommendations_survive_missing_followed_artists() {
    let top = tracks("top", 3);
    let saved = tracks("saved", 3);
    let mut catalog = FakeCatalog {
        top: top.clone(),
        saved: saved.clone(),
        fail_followed: true,
        ..Default::default()
    };
    for t in top.iter().chain(saved.iter()) {
        catalog.artist_tracks.insert(
            format!("{}_artist", t.id),
            tracks(&format!("{}_hit", t.id), 2),
        );
    }
    let (catalog, recommender) = recommender(catalog);

    let result = recommender
        .recommend_from_library(Mood::Chill, 10, None)
        .await
        .unwrap();

    assert!(result.len() <= 10);
    assert!(result.iter().any(|t| t.id.contains("_hit")));
    assert!(result.iter().any(|t| !t.id.starts_with("top")));
    assert!(catalog.top_called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_library_recommendations_mix_artist_tracks() {
    let mut catalog = FakeCatalog {
        top: tracks("top", 3),
        saved: tracks("saved", 3),
        followed: vec![artist("art1", "Artist One", &[]), artist("art2", "Artist Two", &[])],
        top_artists: vec![artist("art1", "Artist One", &["indie", "rock"])],
        ..Default::default()
    };
    catalog
        .artist_tracks
        .insert("art1".to_string(), tracks("one", 4));
    catalog
        .artist_tracks
        .insert("art2".to_string(), tracks("two", 4));
    let (_, recommender) = recommender(catalog);

    let result = recommender
        .recommend_from_library(Mood::Energetic, 10, Some("US"))
        .await
        .unwrap();

    assert!(!result.is_empty());
    assert!(result.len() <= 10);
    let unique: HashSet<&str> = result.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(unique.len(), result.len());
}

#[test]
fn test_cascade_absorb() {
    let mut cascade = Cascade::new(3);
    assert!(cascade.is_empty());

    assert_eq!(cascade.absorb("first", Ok(tracks("a", 2))), 2);
    assert!(!cascade.is_full());
    assert_eq!(cascade.absorb("broken", Err(unavailable("search"))), 0);
    assert_eq!(cascade.absorb("second", Ok(tracks("a", 3))), 1);
    assert!(cascade.is_full());
    assert_eq!(cascade.len(), 3);
    assert_eq!(ids(&cascade.into_tracks()), vec!["a1", "a2", "a3"]);
}
