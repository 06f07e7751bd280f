//! Time-bounded permission cache
//!
//! Maps a user id to their resolved permission set plus the instant it was
//! cached; entries older than the TTL are treated as absent. Stale entries
//! are dropped lazily on lookup rather than by a background sweeper.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use uuid::Uuid;

use reels_core::models::Permission;

pub struct PermissionCache {
    ttl: Duration,
    entries: Mutex<HashMap<Uuid, (HashSet<Permission>, Instant)>>,
}

impl PermissionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, user_id: Uuid) -> Option<HashSet<Permission>> {
        let mut entries = self.entries.lock().ok()?;
        match entries.get(&user_id) {
            Some((perms, cached_at)) if cached_at.elapsed() < self.ttl => Some(perms.clone()),
            Some(_) => {
                entries.remove(&user_id);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, user_id: Uuid, permissions: HashSet<Permission>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(user_id, (permissions, Instant::now()));
        }
    }

    pub fn invalidate(&self, user_id: Uuid) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(&user_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perms() -> HashSet<Permission> {
        let mut set = HashSet::new();
        set.insert(Permission::ViewContent);
        set
    }

    #[test]
    fn test_fresh_entry_is_returned() {
        let cache = PermissionCache::new(Duration::from_secs(60));
        let user_id = Uuid::new_v4();
        cache.insert(user_id, perms());
        assert_eq!(cache.get(user_id), Some(perms()));
    }

    #[test]
    fn test_expired_entry_is_absent() {
        let cache = PermissionCache::new(Duration::ZERO);
        let user_id = Uuid::new_v4();
        cache.insert(user_id, perms());
        assert_eq!(cache.get(user_id), None);
        // The stale entry is also dropped.
        assert_eq!(cache.get(user_id), None);
    }

    #[test]
    fn test_invalidate_removes_entry() {
        let cache = PermissionCache::new(Duration::from_secs(60));
        let user_id = Uuid::new_v4();
        cache.insert(user_id, perms());
        cache.invalidate(user_id);
        assert_eq!(cache.get(user_id), None);
    }

    #[test]
    fn test_unknown_user_is_absent() {
        let cache = PermissionCache::new(Duration::from_secs(60));
        assert_eq!(cache.get(Uuid::new_v4()), None);
    }
}
