pub mod quota_cache;

pub use quota_cache::QuotaCache;
