use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{error, info, management::SessionManager, spotify, success, types::PkceToken};

pub async fn auth(shared_state: Arc<Mutex<Option<PkceToken>>>) {
    if let Err(e) = spotify::auth::login(shared_state).await {
        error!("Authentication failed: {}", e);
    }
}

pub async fn logout() {
    let mut session = match SessionManager::load().await {
        Ok(session) => session,
        Err(e) => error!("Failed to load session: {}", e),
    };

    if session.current().is_none() {
        info!("You are not logged in.");
        return;
    }

    match session.clear().await {
        Ok(()) => success!("Logged out."),
        Err(e) => error!("Failed to remove session: {}", e),
    }
}
