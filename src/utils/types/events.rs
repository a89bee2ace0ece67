use serde::Serialize;

use super::quota::Quota;

/// Result of a background remote operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Outcome {
    Success { remote: String },
    Failure { message: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Messages produced by background tasks and applied by the single
/// consumer that owns the display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum UiEvent {
    /// A labelled operation (mount, rename, ...) finished
    Finished { operation: String, outcome: Outcome },
    /// Quota lookup for a remote finished; `None` means unknown
    QuotaLoaded { remote: String, quota: Option<Quota> },
    /// Remote list or state changed, redraw everything
    Refresh,
}
