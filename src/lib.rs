//! CloudMount - mount rclone remotes as local folders.
//!
//! The library holds everything the front-end needs: the settings store,
//! the rclone/MEGAcmd controllers, the systemd automount manager, system
//! checks and installers, and the dispatcher that hands background results
//! back to a single consumer.

pub mod core;
pub mod mega;
pub mod rclone;
pub mod system;
pub mod utils;

pub use crate::core::context::AppContext;
pub use crate::utils::types::errors::{CloudMountError, Result};
