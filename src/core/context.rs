//! Application context
//!
//! Owns everything that lives as long as the application: resolved paths,
//! external tool names, the settings store, the quota cache, and the command
//! runner. Built once at startup and shared behind an `Arc`.

use std::sync::Arc;
use std::time::Duration;

use crate::core::paths::AppPaths;
use crate::core::settings::SettingsStore;
use crate::rclone::state::QuotaCache;
use crate::utils::process::{CommandRunner, SystemRunner};

/// Names (or absolute paths) of the external binaries CloudMount drives.
#[derive(Debug, Clone)]
pub struct Tools {
    pub rclone: String,
    pub fusermount: String,
    pub systemctl: String,
    pub mkdir: String,
    pub mega_cmd_server: String,
    pub mega_whoami: String,
    pub mega_login: String,
    pub mega_logout: String,
    pub mega_df: String,
    pub mega_webdav: String,
    pub opener: String,
    pub pkexec: String,
    pub shell: String,
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            rclone: "rclone".into(),
            fusermount: "fusermount".into(),
            systemctl: "systemctl".into(),
            mkdir: "/usr/bin/mkdir".into(),
            mega_cmd_server: "mega-cmd-server".into(),
            mega_whoami: "mega-whoami".into(),
            mega_login: "mega-login".into(),
            mega_logout: "mega-logout".into(),
            mega_df: "mega-df".into(),
            mega_webdav: "mega-webdav".into(),
            opener: "xdg-open".into(),
            pkexec: "pkexec".into(),
            shell: "sh".into(),
        }
    }
}

/// Fixed waits used in place of real readiness checks.
#[derive(Debug, Clone, Copy)]
pub struct Timings {
    /// Pause after lazily unmounting a manual mount before a unit takes over
    pub automount_settle: Duration,
    /// Pause after launching `mega-cmd-server`
    pub daemon_startup: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            automount_settle: Duration::from_secs(1),
            daemon_startup: Duration::from_secs(2),
        }
    }
}

impl Timings {
    pub fn immediate() -> Self {
        Self {
            automount_settle: Duration::ZERO,
            daemon_startup: Duration::ZERO,
        }
    }
}

pub struct AppContext {
    pub paths: AppPaths,
    pub tools: Tools,
    pub timings: Timings,
    pub settings: SettingsStore,
    pub quotas: QuotaCache,
    runner: Arc<dyn CommandRunner>,
}

impl AppContext {
    pub fn new(paths: AppPaths, tools: Tools, runner: Arc<dyn CommandRunner>) -> Self {
        let settings = SettingsStore::load(&paths.settings_file);
        Self {
            paths,
            tools,
            timings: Timings::default(),
            settings,
            quotas: QuotaCache::new(),
            runner,
        }
    }

    /// Context that runs real processes with the default tool names.
    pub fn system(paths: AppPaths) -> Self {
        Self::new(paths, Tools::default(), Arc::new(SystemRunner))
    }

    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    pub fn runner(&self) -> &dyn CommandRunner {
        self.runner.as_ref()
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("paths", &self.paths)
            .field("tools", &self.tools)
            .field("timings", &self.timings)
            .finish_non_exhaustive()
    }
}
