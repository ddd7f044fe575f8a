use std::sync::Arc;

use crate::{
    ai::{HuggingFaceClient, TextGenerator},
    cli::{self, lifecycle::print_preview},
    info,
    management::LifecycleStore,
    pipeline::{
        GenerationRequest, Generator, LifecycleState, Mode, PlaylistLifecycle, RandomShuffle,
        SeededShuffle, Shuffle,
    },
    warning,
};

/// Generates a playlist and keeps it as the pending preview.
///
/// `seed` makes the shuffling of candidates reproducible.
pub async fn generate(request: GenerationRequest, seed: Option<u64>) {
    let catalog = cli::connect().await;

    let text_generator = HuggingFaceClient::from_config()
        .map(|client| Arc::new(client) as Arc<dyn TextGenerator>);
    if text_generator.is_none() && request.mode != Mode::Basic {
        info!("Set HUGGINGFACE_API_KEY to let the text model suggest songs.");
    }

    let shuffle: Arc<dyn Shuffle> = match seed {
        Some(seed) => Arc::new(SeededShuffle::new(seed)),
        None => Arc::new(RandomShuffle),
    };

    let generator = Generator::new(Arc::clone(&catalog))
        .with_generator(text_generator)
        .with_shuffle(shuffle);

    let store = LifecycleStore::new();
    let state = store.load().await.unwrap_or_else(|e| {
        warning!("Ignoring unreadable playlist state: {}", e);
        LifecycleState::Idle
    });
    let mut lifecycle = PlaylistLifecycle::new(catalog, state);

    let pb = cli::spinner(match request.mode {
        Mode::Basic => "Finding tracks for your mood...",
        Mode::Ai => "Asking the model for songs...",
        Mode::Custom => "Finding songs for your description...",
    });
    let outcome = generator.run(&mut lifecycle, &request).await;
    pb.finish_and_clear();

    if let Err(e) = store.persist(lifecycle.state()).await {
        warning!("Failed to save playlist state: {}", e);
    }

    match outcome {
        Ok(()) => {
            if let Some(preview) = lifecycle.state().preview() {
                print_preview(preview);
                info!("Run `moodlist save` to keep it or `moodlist discard` to throw it away.");
            }
        }
        Err(e) => cli::fail(e).await,
    }
}
