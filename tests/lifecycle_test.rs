//! End-to-end generation scenarios against an in-memory catalog.

mod common;

use std::{sync::Arc, time::Duration};

use common::{FakeCatalog, FakeGenerator, track, tracks};
use moodlist::Error;
use moodlist::ai::{EmotionScore, TextGenerator};
use moodlist::language::Language;
use moodlist::management::LifecycleStore;
use moodlist::mood::Mood;
use moodlist::pipeline::{
    GenerationRequest, Generator, KeepOrder, LifecycleState, PlaylistLifecycle, Preview,
};
use moodlist::types::{Playlist, TempPlaylistHandle};

fn generator(catalog: &Arc<FakeCatalog>, text: Option<Arc<FakeGenerator>>) -> Generator {
    Generator::new(catalog.clone())
        .with_generator(text.map(|g| g as Arc<dyn TextGenerator>))
        .with_shuffle(Arc::new(KeepOrder))
}

fn lifecycle(catalog: &Arc<FakeCatalog>) -> PlaylistLifecycle {
    PlaylistLifecycle::new(catalog.clone(), LifecycleState::Idle)
}

fn with_top_tracks() -> FakeCatalog {
    FakeCatalog {
        top: tracks("top", 5),
        ..Default::default()
    }
}

mod generation {
    use super::*;

    #[tokio::test]
    async fn test_happy_mood_reaches_previewing() {
        let catalog = Arc::new(with_top_tracks());
        let mut lifecycle = lifecycle(&catalog);

        let request = GenerationRequest::basic(Mood::Happy, Language::Any);
        generator(&catalog, None)
            .run(&mut lifecycle, &request)
            .await
            .unwrap();

        let preview = lifecycle.state().preview().expect("previewing");
        assert!(!preview.playlist.tracks.is_empty());
        assert_eq!(preview.playlist.name, "My Happy Playlist");

        let handle = lifecycle.state().handle().expect("handle");
        assert!(handle.remote);
        assert_eq!(handle.id, preview.playlist.id);
        assert_eq!(handle.track_ids.len(), preview.playlist.tracks.len());

        let added = catalog.added();
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].1.len(), preview.playlist.tracks.len());
    }

    #[tokio::test]
    async fn test_language_is_part_of_the_name() {
        let catalog = Arc::new(with_top_tracks());
        let request = GenerationRequest::basic(Mood::Happy, Language::Es);

        let preview = generator(&catalog, None).generate(&request).await.unwrap();

        assert_eq!(preview.playlist.name, "My Happy Playlist (es)");
        assert_eq!(preview.market.as_deref(), Some("ES"));
        assert!(preview.playlist.description.ends_with("in es"));
    }

    #[tokio::test]
    async fn test_missing_text_generator_falls_back_to_recommendations() {
        let catalog = Arc::new(with_top_tracks());
        let mut lifecycle = lifecycle(&catalog);

        let request = GenerationRequest::ai(Some(Mood::Happy), Language::Any);
        generator(&catalog, None)
            .run(&mut lifecycle, &request)
            .await
            .unwrap();

        let preview = lifecycle.state().preview().expect("previewing");
        assert!(!preview.playlist.tracks.is_empty());
        assert_eq!(preview.playlist.name, "My Happy Vibes");
    }

    #[tokio::test]
    async fn test_ai_suggestions_are_resolved() {
        let catalog = Arc::new(
            with_top_tracks()
                .with_search(
                    "track:\"Hello\" artist:\"Adele\"",
                    vec![track("hello", "Hello", "Adele")],
                )
                .with_search(
                    "track:\"Bohemian Rhapsody\" artist:\"Queen\"",
                    vec![track("rhapsody", "Bohemian Rhapsody", "Queen")],
                ),
        );
        let text = Arc::new(FakeGenerator::replying(
            "1. Adele - Hello\n2. Queen - Bohemian Rhapsody\n3.",
        ));

        let request = GenerationRequest::ai(Some(Mood::Romantic), Language::En).with_count(2);
        let preview = generator(&catalog, Some(text.clone()))
            .generate(&request)
            .await
            .unwrap();

        let ids: Vec<&str> = preview.playlist.tracks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["hello", "rhapsody"]);
        assert_eq!(preview.playlist.name, "My Romantic Vibes (en)");

        let prompts = text.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("English"));
        assert!(prompts[0].ends_with("\n1."));
    }

    #[tokio::test]
    async fn test_mood_is_detected_from_listening_history() {
        let catalog = Arc::new(with_top_tracks().with_search(
            "track:\"Hello\" artist:\"Adele\"",
            vec![track("hello", "Hello", "Adele")],
        ));
        let mut text = FakeGenerator::replying("1. Adele - Hello\n2.");
        text.emotions = vec![
            EmotionScore {
                label: "sadness".to_string(),
                score: 0.1,
            },
            EmotionScore {
                label: "joy".to_string(),
                score: 0.8,
            },
        ];

        let request = GenerationRequest::ai(None, Language::Any).with_count(1);
        let preview = generator(&catalog, Some(Arc::new(text)))
            .generate(&request)
            .await
            .unwrap();

        assert_eq!(preview.playlist.name, "My Happy Vibes");
    }

    #[tokio::test]
    async fn test_inference_failure_is_surfaced_and_returns_to_idle() {
        let catalog = Arc::new(with_top_tracks());
        let mut lifecycle = lifecycle(&catalog);

        let request = GenerationRequest::ai(Some(Mood::Happy), Language::Any);
        let result = generator(&catalog, Some(Arc::new(FakeGenerator::failing())))
            .run(&mut lifecycle, &request)
            .await;

        assert!(matches!(
            result,
            Err(Error::Upstream {
                service: "Hugging Face",
                ..
            })
        ));
        assert_eq!(lifecycle.state(), &LifecycleState::Idle);
        assert!(catalog.created().is_empty());
    }

    #[tokio::test]
    async fn test_zero_tracks_is_resolution_exhausted() {
        let catalog = Arc::new(FakeCatalog::default());
        let mut lifecycle = lifecycle(&catalog);

        let request = GenerationRequest::basic(Mood::Dark, Language::Any);
        let result = generator(&catalog, None).run(&mut lifecycle, &request).await;

        match result {
            Err(Error::ResolutionExhausted(message)) => assert_eq!(
                message,
                "No tracks were found for your mood. Please try a different mood or language."
            ),
            other => panic!("expected ResolutionExhausted, got {other:?}"),
        }
        assert_eq!(lifecycle.state(), &LifecycleState::Idle);
    }

    #[tokio::test]
    async fn test_custom_prompt_uses_given_name() {
        let catalog = Arc::new(FakeCatalog::default().with_search(
            "track:\"So What\" artist:\"Miles Davis\"",
            vec![track("sowhat", "So What", "Miles Davis")],
        ));
        let text = Arc::new(FakeGenerator::replying("1. Miles Davis - So What"));

        let request = GenerationRequest::custom("rainy sunday jazz", Language::Any)
            .with_count(1)
            .with_name("Sunday");
        let preview = generator(&catalog, Some(text))
            .generate(&request)
            .await
            .unwrap();

        assert_eq!(preview.playlist.name, "Sunday");
        assert_eq!(preview.playlist.description, "Custom playlist: rainy sunday jazz");
        assert_eq!(preview.playlist.tracks.len(), 1);
    }

    #[tokio::test]
    async fn test_zero_tracks_for_a_description_mentions_the_description() {
        let catalog = Arc::new(FakeCatalog::default());
        let mut lifecycle = lifecycle(&catalog);
        let text = Arc::new(FakeGenerator::replying("nothing useful"));

        let request = GenerationRequest::custom("songs nobody wrote", Language::Any);
        let result = generator(&catalog, Some(text))
            .run(&mut lifecycle, &request)
            .await;

        match result {
            Err(Error::ResolutionExhausted(message)) => assert_eq!(
                message,
                "No tracks were found for your description. Please try a different description or language."
            ),
            other => panic!("expected ResolutionExhausted, got {other:?}"),
        }
        assert_eq!(lifecycle.state(), &LifecycleState::Idle);
    }

    #[tokio::test]
    async fn test_empty_preview_is_rejected() {
        let catalog = Arc::new(FakeCatalog::default());
        let mut lifecycle = lifecycle(&catalog);
        let preview = Preview {
            playlist: Playlist {
                id: "draft-empty".to_string(),
                name: "Empty".to_string(),
                description: String::new(),
                external_url: String::new(),
                tracks: Vec::new(),
            },
            handle: TempPlaylistHandle {
                id: "draft-empty".to_string(),
                track_ids: Vec::new(),
                remote: false,
            },
            pending: Vec::new(),
            market: None,
        };

        lifecycle.begin();
        let result = lifecycle.complete(Ok(preview));

        assert!(matches!(result, Err(Error::InvalidState(_))));
        assert_eq!(lifecycle.state(), &LifecycleState::Idle);
    }

    #[tokio::test]
    async fn test_custom_prompt_must_not_be_blank() {
        let catalog = Arc::new(with_top_tracks());
        let text = Arc::new(FakeGenerator::replying("1. Adele - Hello"));

        let request = GenerationRequest::custom("   ", Language::Any);
        let result = generator(&catalog, Some(text)).generate(&request).await;

        assert!(matches!(result, Err(Error::InvalidState(_))));
    }
}

mod transitions {
    use super::*;

    async fn previewing(catalog: &Arc<FakeCatalog>) -> PlaylistLifecycle {
        let mut lifecycle = lifecycle(catalog);
        let request = GenerationRequest::basic(Mood::Chill, Language::Any);
        generator(catalog, None)
            .run(&mut lifecycle, &request)
            .await
            .unwrap();
        lifecycle
    }

    #[tokio::test]
    async fn test_discard_unfollows_remote_playlist() {
        let catalog = Arc::new(with_top_tracks());
        let mut lifecycle = previewing(&catalog).await;
        let id = lifecycle.state().handle().unwrap().id.clone();

        lifecycle.discard().await;

        assert_eq!(lifecycle.state(), &LifecycleState::Idle);
        assert_eq!(catalog.unfollowed(), vec![id]);
    }

    #[tokio::test]
    async fn test_discard_failure_still_returns_to_idle() {
        let catalog = Arc::new(FakeCatalog {
            fail_unfollow: true,
            ..with_top_tracks()
        });
        let mut lifecycle = previewing(&catalog).await;

        lifecycle.discard().await;

        assert_eq!(lifecycle.state(), &LifecycleState::Idle);
        assert!(lifecycle.state().handle().is_none());
    }

    #[tokio::test]
    async fn test_discard_timeout_still_returns_to_idle() {
        let catalog = Arc::new(FakeCatalog {
            hang_unfollow: true,
            ..with_top_tracks()
        });
        let mut lifecycle = previewing(&catalog)
            .await
            .with_discard_timeout(Duration::from_millis(50));

        lifecycle.discard().await;

        assert_eq!(lifecycle.state(), &LifecycleState::Idle);
    }

    #[tokio::test]
    async fn test_discard_on_idle_is_a_no_op() {
        let catalog = Arc::new(with_top_tracks());
        let mut lifecycle = lifecycle(&catalog);

        lifecycle.discard().await;
        lifecycle.discard().await;

        assert_eq!(lifecycle.state(), &LifecycleState::Idle);
        assert!(catalog.unfollowed().is_empty());
    }

    #[tokio::test]
    async fn test_save_remote_preview() {
        let catalog = Arc::new(with_top_tracks());
        let mut lifecycle = previewing(&catalog).await;
        let expected = lifecycle.state().preview().unwrap().playlist.clone();

        let saved = lifecycle.save().await.unwrap();

        assert_eq!(saved, expected);
        assert_eq!(lifecycle.state(), &LifecycleState::Saved(expected));
        assert_eq!(catalog.created().len(), 1);
    }

    #[tokio::test]
    async fn test_save_without_preview_is_invalid() {
        let catalog = Arc::new(with_top_tracks());
        let mut lifecycle = lifecycle(&catalog);

        let result = lifecycle.save().await;

        assert!(matches!(result, Err(Error::InvalidState(_))));
        assert_eq!(lifecycle.state(), &LifecycleState::Idle);
    }

    #[tokio::test]
    async fn test_deferred_preview_is_created_on_save() {
        let catalog = Arc::new(FakeCatalog::default().with_search(
            "track:\"Hello\" artist:\"Adele\"",
            vec![track("hello", "Hello", "Adele")],
        ));
        let text = Arc::new(FakeGenerator::replying(
            "1. Adele - Hello\n2. Nobody - Missing Song",
        ));
        let mut lifecycle = lifecycle(&catalog);

        let request = GenerationRequest::ai(Some(Mood::Happy), Language::Any)
            .with_count(2)
            .deferred(true);
        generator(&catalog, Some(text))
            .run(&mut lifecycle, &request)
            .await
            .unwrap();

        let preview = lifecycle.state().preview().expect("previewing").clone();
        assert!(preview.is_local());
        assert!(preview.handle.id.starts_with("draft-"));
        assert_eq!(preview.pending.len(), 1);
        assert!(catalog.created().is_empty());

        let saved = lifecycle.save().await.unwrap();

        assert_eq!(catalog.created().len(), 1);
        assert_eq!(
            catalog.added(),
            vec![(saved.id.clone(), vec!["spotify:track:hello".to_string()])]
        );
        assert!(matches!(lifecycle.state(), LifecycleState::Saved(_)));
    }

    #[tokio::test]
    async fn test_failed_deferred_save_keeps_preview() {
        let catalog = Arc::new(FakeCatalog {
            fail_create: true,
            ..with_top_tracks()
        });
        let mut lifecycle = lifecycle(&catalog);

        let request = GenerationRequest::basic(Mood::Focus, Language::Any).deferred(true);
        generator(&catalog, None)
            .run(&mut lifecycle, &request)
            .await
            .unwrap();

        assert!(lifecycle.save().await.is_err());
        assert!(lifecycle.state().preview().is_some());
    }

    #[tokio::test]
    async fn test_failed_track_upload_removes_created_playlist() {
        let catalog = Arc::new(FakeCatalog {
            fail_add: true,
            ..with_top_tracks()
        });
        let mut lifecycle = lifecycle(&catalog);

        let request = GenerationRequest::basic(Mood::Focus, Language::Any).deferred(true);
        generator(&catalog, None)
            .run(&mut lifecycle, &request)
            .await
            .unwrap();

        assert!(lifecycle.save().await.is_err());
        assert!(lifecycle.save().await.is_err());

        let preview = lifecycle.state().preview().expect("previewing");
        assert!(preview.is_local());
        assert_eq!(catalog.created().len(), 2);
        assert_eq!(
            catalog.unfollowed(),
            vec!["playlist1".to_string(), "playlist2".to_string()]
        );
    }

    #[tokio::test]
    async fn test_new_generation_replaces_pending_preview() {
        let catalog = Arc::new(with_top_tracks());
        let mut lifecycle = previewing(&catalog).await;
        let first = lifecycle.state().handle().unwrap().id.clone();

        let request = GenerationRequest::basic(Mood::Party, Language::Any);
        generator(&catalog, None)
            .run(&mut lifecycle, &request)
            .await
            .unwrap();

        let second = lifecycle.state().handle().unwrap().id.clone();
        assert_ne!(first, second);
        assert!(catalog.unfollowed().is_empty());
    }
}

mod store {
    use super::*;

    fn temp_store(name: &str) -> LifecycleStore {
        let path = std::env::temp_dir()
            .join(format!("moodlist-test-{}-{}", std::process::id(), name))
            .join("lifecycle.json");
        LifecycleStore::at(path)
    }

    #[tokio::test]
    async fn test_missing_state_file_is_idle() {
        let store = temp_store("missing");
        assert_eq!(store.load().await.unwrap(), LifecycleState::Idle);
    }

    #[tokio::test]
    async fn test_preview_survives_restart() {
        let catalog = Arc::new(with_top_tracks());
        let request = GenerationRequest::basic(Mood::Happy, Language::Any).deferred(true);
        let mut lifecycle = lifecycle(&catalog);
        generator(&catalog, None)
            .run(&mut lifecycle, &request)
            .await
            .unwrap();

        let store = temp_store("restart");
        store.persist(lifecycle.state()).await.unwrap();
        let restored = store.load().await.unwrap();
        assert_eq!(&restored, lifecycle.state());

        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), LifecycleState::Idle);
    }
}
