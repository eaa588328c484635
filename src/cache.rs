//! Short-lived read-through cache for the member list.
//!
//! The member list is read on every authenticated request (token lookup,
//! aggregation, key resolution), so it is cached for 60 seconds behind an
//! explicit get/invalidate interface. Every write path that touches members
//! calls [`MemberCache::invalidate`] synchronously. The cache is
//! process-local; in a horizontally scaled deployment each instance has its
//! own staleness window, which is why call sites only ever see the interface
//! and a shared invalidation mechanism can be swapped in later.

use crate::core::member;
use crate::entities::member::Model as MemberModel;
use crate::errors::Result;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, trace};

/// Default time-to-live for a cached member list.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct CacheSlot {
    fetched_at: Instant,
    members: Vec<MemberModel>,
}

/// TTL read-through cache over the full member list.
#[derive(Debug, Clone)]
pub struct MemberCache {
    slot: Arc<RwLock<Option<CacheSlot>>>,
    ttl: Duration,
}

impl Default for MemberCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl MemberCache {
    /// Creates an empty cache with the given time-to-live.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: Arc::new(RwLock::new(None)),
            ttl,
        }
    }

    /// Returns the member list, refreshing from the database when the cached
    /// copy is missing or older than the TTL.
    pub async fn get(&self, db: &DatabaseConnection) -> Result<Vec<MemberModel>> {
        {
            let slot = self.slot.read().await;
            if let Some(cached) = slot.as_ref() {
                if cached.fetched_at.elapsed() < self.ttl {
                    trace!("Member cache hit ({} members)", cached.members.len());
                    return Ok(cached.members.clone());
                }
            }
        }

        let members = member::list_all_members(db).await?;
        debug!("Member cache refreshed with {} members", members.len());
        let mut slot = self.slot.write().await;
        *slot = Some(CacheSlot {
            fetched_at: Instant::now(),
            members: members.clone(),
        });
        Ok(members)
    }

    /// Drops the cached list. Called synchronously by every member write.
    pub async fn invalidate(&self) {
        let mut slot = self.slot.write().await;
        if slot.take().is_some() {
            debug!("Member cache invalidated");
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_get_populates_and_hits() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_member(&db, "M-01", "Arindam").await?;

        let cache = MemberCache::default();
        let first = cache.get(&db).await?;
        assert_eq!(first.len(), 1);

        // A write the cache has not been told about is invisible until
        // invalidation - that is the staleness contract
        create_test_member(&db, "M-02", "Sourav").await?;
        let stale = cache.get(&db).await?;
        assert_eq!(stale.len(), 1);

        cache.invalidate().await;
        let fresh = cache.get(&db).await?;
        assert_eq!(fresh.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_zero_ttl_always_refreshes() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_member(&db, "M-01", "Arindam").await?;

        let cache = MemberCache::new(Duration::ZERO);
        assert_eq!(cache.get(&db).await?.len(), 1);

        create_test_member(&db, "M-02", "Sourav").await?;
        assert_eq!(cache.get(&db).await?.len(), 2);

        Ok(())
    }
}
