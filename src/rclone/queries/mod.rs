pub mod quota;
pub mod remote;

pub use quota::{cached_quota, get_quota, refresh_quota};
pub use remote::{list_remotes, remote_exists};
