pub mod errors;
pub mod events;
pub mod quota;
pub mod settings;

pub use errors::{CloudMountError, Result};
pub use events::{Outcome, UiEvent};
pub use quota::{Quota, QuotaSummary};
pub use settings::{AppConfig, RemoteOptions};
