//! rclone controller: remotes, mounts, automount units and quotas.

pub mod commands;
pub mod config_file;
pub mod flags;
pub mod mount_table;
pub mod providers;
pub mod queries;
pub mod state;

pub use providers::Provider;
