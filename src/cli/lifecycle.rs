use tabled::Table;

use crate::{
    cli, error, info,
    management::LifecycleStore,
    pipeline::{LifecycleState, PlaylistLifecycle, Preview},
    success, utils, warning,
};

pub(crate) fn print_preview(preview: &Preview) {
    let playlist = &preview.playlist;
    let table = Table::new(utils::track_table_rows(&playlist.tracks));
    println!("{}\n{}\n\n{}\n", playlist.name, playlist.description, table);

    if preview.is_local() {
        info!("Draft only, it will be created on Spotify when you save it.");
    } else {
        info!("Preview on Spotify: {}", playlist.external_url);
    }
    if !preview.pending.is_empty() {
        info!(
            "{} suggestions will be searched again on save.",
            preview.pending.len()
        );
    }
}

async fn load_state(store: &LifecycleStore) -> LifecycleState {
    match store.load().await {
        Ok(state) => state,
        Err(e) => error!("Failed to load playlist state: {}", e),
    }
}

pub async fn preview() {
    let store = LifecycleStore::new();
    match load_state(&store).await {
        LifecycleState::Idle => info!("No playlist pending. Run `moodlist generate` first."),
        LifecycleState::Generating => {
            warning!("The last generation did not finish. Run `moodlist generate` again.")
        }
        LifecycleState::Previewing(preview) => print_preview(&preview),
        LifecycleState::Saved(playlist) => success!(
            "Last playlist '{}' was saved: {}",
            playlist.name,
            playlist.external_url
        ),
    }
}

pub async fn save() {
    let store = LifecycleStore::new();
    let state = load_state(&store).await;
    if state.preview().is_none() {
        info!("No playlist pending. Run `moodlist generate` first.");
        return;
    }

    let catalog = cli::connect().await;
    let mut lifecycle = PlaylistLifecycle::new(catalog, state);

    let pb = cli::spinner("Saving playlist...");
    let outcome = lifecycle.save().await;
    pb.finish_and_clear();

    match outcome {
        Ok(playlist) => {
            if let Err(e) = store.persist(lifecycle.state()).await {
                warning!("Failed to save playlist state: {}", e);
            }
            success!(
                "Saved '{}' with {} tracks: {}",
                playlist.name,
                playlist.tracks.len(),
                playlist.external_url
            );
        }
        Err(e) => cli::fail(e).await,
    }
}

pub async fn discard() {
    let store = LifecycleStore::new();
    let state = load_state(&store).await;
    if state.preview().is_none() {
        info!("No playlist pending.");
        if let Err(e) = store.clear().await {
            warning!("Failed to clear playlist state: {}", e);
        }
        return;
    }

    let catalog = cli::connect().await;
    let mut lifecycle = PlaylistLifecycle::new(catalog, state);

    let pb = cli::spinner("Discarding playlist...");
    lifecycle.discard().await;
    pb.finish_and_clear();

    match store.persist(lifecycle.state()).await {
        Ok(()) => success!("Playlist discarded."),
        Err(e) => warning!("Failed to save playlist state: {}", e),
    }
}
