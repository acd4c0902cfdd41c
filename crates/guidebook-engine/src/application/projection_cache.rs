//! Memoized builds of processed campaigns.
//!
//! A build is a pure function of the input log and the guide, and the input
//! log is a pure function of the event stream, so a build can be reused for
//! as long as the stream version and the guide hash are unchanged.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use uuid::Uuid;

use crate::domain::builder::ProcessedCampaign;

#[derive(Debug)]
struct Entry {
    version: i64,
    guide_hash: String,
    processed: Arc<ProcessedCampaign>,
}

/// Last build per campaign, keyed by stream version and guide hash.
#[derive(Debug, Default)]
pub struct ProjectionCache {
    entries: Mutex<HashMap<Uuid, Entry>>,
}

impl ProjectionCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached build, if it was made from the same stream version and
    /// guide.
    #[must_use]
    pub fn get(
        &self,
        campaign_id: Uuid,
        version: i64,
        guide_hash: &str,
    ) -> Option<Arc<ProcessedCampaign>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(&campaign_id)
            .filter(|entry| entry.version == version && entry.guide_hash == guide_hash)
            .map(|entry| Arc::clone(&entry.processed))
    }

    /// Stores a build, replacing any older one for the campaign.
    pub fn insert(
        &self,
        campaign_id: Uuid,
        version: i64,
        guide_hash: String,
        processed: Arc<ProcessedCampaign>,
    ) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            campaign_id,
            Entry {
                version,
                guide_hash,
                processed,
            },
        );
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::builder::build;
    use crate::domain::fixtures::new_log;
    use guidebook_test_support::sample_guide;

    fn processed() -> Arc<ProcessedCampaign> {
        Arc::new(build(&sample_guide(), &new_log()).unwrap())
    }

    #[test]
    fn test_hit_requires_same_version_and_guide_hash() {
        // Arrange
        let cache = ProjectionCache::new();
        let campaign_id = Uuid::new_v4();
        let built = processed();

        // Act
        cache.insert(campaign_id, 3, "abc".to_owned(), Arc::clone(&built));

        // Assert
        assert!(Arc::ptr_eq(&cache.get(campaign_id, 3, "abc").unwrap(), &built));
        assert!(cache.get(campaign_id, 4, "abc").is_none());
        assert!(cache.get(campaign_id, 3, "def").is_none());
        assert!(cache.get(Uuid::new_v4(), 3, "abc").is_none());
    }

    #[test]
    fn test_insert_replaces_older_build() {
        let cache = ProjectionCache::new();
        let campaign_id = Uuid::new_v4();

        cache.insert(campaign_id, 1, "abc".to_owned(), processed());
        cache.insert(campaign_id, 2, "abc".to_owned(), processed());

        assert_eq!(cache.len(), 1);
        assert!(cache.get(campaign_id, 1, "abc").is_none());
        assert!(cache.get(campaign_id, 2, "abc").is_some());
    }
}
