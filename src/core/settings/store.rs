//! JSON-backed per-remote settings
//!
//! One document, `{"remotes": {<name>: RemoteOptions}}`, loaded once and
//! rewritten wholesale on every change. A single mutex covers the whole
//! load/mutate/save cycle.

use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::utils::types::errors::Result;
use crate::utils::types::settings::{AppConfig, RemoteOptions};

#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    state: Mutex<AppConfig>,
}

impl SettingsStore {
    /// Load from `path`. A missing or unparsable file yields empty settings.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let config = read_config(&path);
        debug!(
            "Loaded settings for {} remote(s) from {}",
            config.remotes.len(),
            path.display()
        );
        Self {
            path,
            state: Mutex::new(config),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, AppConfig> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Options for `remote`, or the zero-value options when none are stored.
    pub fn get(&self, remote: &str) -> RemoteOptions {
        self.lock().remotes.get(remote).cloned().unwrap_or_default()
    }

    pub fn snapshot(&self) -> AppConfig {
        self.lock().clone()
    }

    pub fn set(&self, remote: &str, options: RemoteOptions) -> Result<()> {
        self.update(|config| {
            config.remotes.insert(remote.to_string(), options);
            true
        })?;
        info!("💾 Saved options for {remote}");
        Ok(())
    }

    /// Drop a remote's entry. Returns whether one existed.
    pub fn remove(&self, remote: &str) -> Result<bool> {
        self.update(|config| config.remotes.remove(remote).is_some())
    }

    /// Move `old`'s entry to `new`. No-op when `old` has no entry.
    pub fn rename(&self, old: &str, new: &str) -> Result<()> {
        self.update(|config| match config.remotes.remove(old) {
            Some(options) => {
                config.remotes.insert(new.to_string(), options);
                true
            }
            None => false,
        })?;
        Ok(())
    }

    /// Apply `change` to a copy of the settings. When it reports a change,
    /// the copy is saved and only then replaces the in-memory state.
    fn update<F>(&self, change: F) -> Result<bool>
    where
        F: FnOnce(&mut AppConfig) -> bool,
    {
        let mut config = self.lock();
        let mut next = config.clone();
        if !change(&mut next) {
            return Ok(false);
        }
        self.save(&next)?;
        *config = next;
        Ok(true)
    }

    fn save(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

fn read_config(path: &Path) -> AppConfig {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(_) => return AppConfig::default(),
    };
    match serde_json::from_str(&data) {
        Ok(config) => config,
        Err(e) => {
            warn!("⚠️ Ignoring unreadable settings file {}: {e}", path.display());
            AppConfig::default()
        }
    }
}
