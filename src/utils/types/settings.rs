use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-remote mount options chosen in the settings dialog.
///
/// Empty strings mean "unlimited".
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteOptions {
    #[serde(default)]
    pub read_only: bool,
    /// VFS cache limit, e.g. `10G`
    #[serde(default)]
    pub cache_size: String,
    /// Bandwidth limit, e.g. `2M`
    #[serde(default)]
    pub bw_limit: String,
}

impl RemoteOptions {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// The whole persisted settings document.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub remotes: BTreeMap<String, RemoteOptions>,
}
