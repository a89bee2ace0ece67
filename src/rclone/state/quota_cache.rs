use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::utils::types::quota::Quota;

/// Process-wide quota results keyed by remote name.
///
/// `Some(None)` from [`QuotaCache::get`] means the remote was queried and its
/// quota is unknown; `None` means it was never queried. Every operation
/// holds the lock across the whole map access, so readers never see a
/// half-applied rename.
#[derive(Debug, Default)]
pub struct QuotaCache {
    entries: RwLock<HashMap<String, Option<Quota>>>,
}

impl QuotaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, remote: &str) -> Option<Option<Quota>> {
        self.entries.read().await.get(remote).cloned()
    }

    pub async fn insert(&self, remote: &str, quota: Option<Quota>) {
        self.entries.write().await.insert(remote.to_string(), quota);
    }

    pub async fn remove(&self, remote: &str) {
        self.entries.write().await.remove(remote);
    }

    /// Move the entry for `old` to `new` in one write.
    pub async fn rename(&self, old: &str, new: &str) {
        let mut entries = self.entries.write().await;
        if let Some(value) = entries.remove(old) {
            entries.insert(new.to_string(), value);
        }
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn quota(used: i64, total: i64) -> Quota {
        Quota {
            used,
            total,
            free: total - used,
            trashed: 0,
        }
    }

    #[tokio::test]
    async fn test_insert_get_remove() {
        let cache = QuotaCache::new();
        assert_eq!(cache.get("gdrive").await, None);

        cache.insert("gdrive", Some(quota(1, 10))).await;
        cache.insert("webdav", None).await;
        assert_eq!(cache.get("gdrive").await, Some(Some(quota(1, 10))));
        assert_eq!(cache.get("webdav").await, Some(None));

        cache.remove("gdrive").await;
        assert_eq!(cache.get("gdrive").await, None);
        assert_eq!(cache.len().await, 1);

        cache.clear().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_rename_moves_entry() {
        let cache = QuotaCache::new();
        cache.insert("old", Some(quota(5, 50))).await;

        cache.rename("old", "new").await;
        assert_eq!(cache.get("old").await, None);
        assert_eq!(cache.get("new").await, Some(Some(quota(5, 50))));

        // Renaming a missing entry leaves the cache alone
        cache.rename("ghost", "other").await;
        assert_eq!(cache.get("other").await, None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_readers_never_see_partial_rename() {
        let cache = Arc::new(QuotaCache::new());
        cache.insert("a", Some(quota(1, 2))).await;

        let writer = {
            let cache = cache.clone();
            tokio::spawn(async move {
                for _ in 0..500 {
                    cache.rename("a", "b").await;
                    cache.rename("b", "a").await;
                }
            })
        };

        let mut readers = Vec::new();
        for _ in 0..4 {
            let cache = cache.clone();
            readers.push(tokio::spawn(async move {
                for _ in 0..500 {
                    // Exactly one of the two names exists at any observation
                    let entries = cache.entries.read().await;
                    let present = entries.contains_key("a") as u8 + entries.contains_key("b") as u8;
                    assert_eq!(present, 1);
                }
            }));
        }

        writer.await.unwrap();
        for reader in readers {
            reader.await.unwrap();
        }
    }
}
