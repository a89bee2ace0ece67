//! MEGAcmd client
//!
//! Mega accounts are driven through the `mega-*` command family, which
//! talks to a background `mega-cmd-server`.

pub mod client;

pub use client::{
    ensure_daemon, get_space, is_logged_in, login, logout, mount_path, parse_mega_df, space_summary,
    webdav_url,
};
