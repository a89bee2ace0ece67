//! Command-line arguments
//!
//! Every screen of the desktop front-end maps to a subcommand here.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::rclone::providers::Provider;
use crate::utils::logging::tail::DEFAULT_TAIL_LINES;

/// CloudMount - mount your cloud storage as local folders
#[derive(Parser, Debug, Clone)]
#[command(name = "cloudmount", version)]
#[command(about = "Mount rclone remotes as local folders", long_about = None)]
pub struct CliArgs {
    /// Enable debug logging
    #[arg(long, global = true, env = "CLOUDMOUNT_DEBUG")]
    pub debug: bool,

    /// Override CloudMount's config directory
    #[arg(long, global = true, env = "CLOUDMOUNT_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Override the directory remotes are mounted under (default ~/Clouds)
    #[arg(long, global = true, env = "CLOUDMOUNT_MOUNT_ROOT")]
    pub mount_root: Option<PathBuf>,

    /// Started from the session autostart entry
    #[arg(long, hide = true)]
    pub minimized: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show every remote with its mount, automount and quota state
    Status,

    /// List configured remote names
    List,

    /// Add a remote
    ///
    /// Browser providers (drive, dropbox, onedrive, pcloud, box, yandex)
    /// open the OAuth flow; others take `--param key=value` fields.
    Add {
        provider: Provider,
        name: String,
        #[arg(long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,
        /// Mount the remote once it is created
        #[arg(long)]
        mount: bool,
    },

    Mount {
        name: String,
    },

    Unmount {
        name: String,
    },

    Rename {
        old: String,
        new: String,
    },

    Delete {
        name: String,
    },

    /// Manage the systemd unit that mounts a remote at login
    Automount {
        #[command(subcommand)]
        action: AutomountAction,
    },

    /// Show or change a remote's mount options
    Options {
        name: String,
        #[arg(long)]
        read_only: Option<bool>,
        /// VFS cache limit, e.g. 10G; empty for unlimited
        #[arg(long)]
        cache_size: Option<String>,
        /// Bandwidth limit, e.g. 2M; empty for unlimited
        #[arg(long)]
        bw_limit: Option<String>,
    },

    /// Storage usage for one remote, or all of them
    Quota {
        name: Option<String>,
    },

    /// Show the rclone mount log
    Logs {
        #[arg(long, default_value_t = DEFAULT_TAIL_LINES)]
        lines: usize,
        /// Keep printing as the log changes
        #[arg(short, long)]
        follow: bool,
    },

    /// Check that the external tools are installed
    Check,

    Install {
        tool: InstallTarget,
    },

    Mega {
        #[command(subcommand)]
        action: MegaAction,
    },

    /// Start CloudMount with the desktop session
    Autostart {
        #[command(subcommand)]
        action: AutostartAction,
    },

    /// Open a remote's mount folder in the file manager
    Open {
        name: String,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum AutomountAction {
    Enable { name: String },
    Disable { name: String },
    Status { name: String },
}

#[derive(Subcommand, Debug, Clone)]
pub enum MegaAction {
    Login {
        user: String,
        #[arg(long, env = "CLOUDMOUNT_MEGA_PASSWORD", hide_env_values = true)]
        password: String,
        /// Two-factor code
        #[arg(long)]
        code: Option<String>,
    },
    Logout,
    Status,
    Space,
    /// Serve the account over WebDAV and print its URL
    Webdav,
}

#[derive(Subcommand, Debug, Clone)]
pub enum AutostartAction {
    On {
        #[arg(long)]
        minimized: bool,
    },
    Off,
    Status,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallTarget {
    Rclone,
    Megacmd,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
