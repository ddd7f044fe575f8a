use std::path::PathBuf;

use crate::{Res, config, pipeline::LifecycleState};

/// Persists the single pending-playlist record between CLI invocations.
///
/// Only one record exists; concurrent generations overwrite each other and
/// the last writer wins.
pub struct LifecycleStore {
    path: PathBuf,
}

impl LifecycleStore {
    pub fn new() -> Self {
        let mut path = config::data_dir();
        path.push("state/lifecycle.json");
        Self { path }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads the stored state; no file means [`LifecycleState::Idle`].
    pub async fn load(&self) -> Res<LifecycleState> {
        if !self.path.is_file() {
            return Ok(LifecycleState::Idle);
        }
        let json = async_fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&json)?)
    }

    pub async fn persist(&self, state: &LifecycleState) -> Res<()> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(state)?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }

    pub async fn clear(&self) -> Res<()> {
        if self.path.is_file() {
            async_fs::remove_file(&self.path).await?;
        }
        Ok(())
    }
}

impl Default for LifecycleStore {
    fn default() -> Self {
        Self::new()
    }
}
