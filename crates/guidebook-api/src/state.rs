//! Shared application state.

use std::sync::Arc;

use guidebook_core::clock::Clock;
use guidebook_core::repository::EventRepository;
use guidebook_engine::application::projection_cache::ProjectionCache;
use guidebook_script::GuideLibrary;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Clock used to stamp records and events.
    pub clock: Arc<dyn Clock + Send + Sync>,
    /// Campaign event streams.
    pub event_repository: Arc<dyn EventRepository>,
    /// Loaded campaign guides.
    pub guides: Arc<GuideLibrary>,
    /// Memoized processed campaigns.
    pub projections: Arc<ProjectionCache>,
}

impl AppState {
    /// Create new application state with an empty projection cache.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock + Send + Sync>,
        event_repository: Arc<dyn EventRepository>,
        guides: Arc<GuideLibrary>,
    ) -> Self {
        Self {
            clock,
            event_repository,
            guides,
            projections: Arc::new(ProjectionCache::new()),
        }
    }
}

/// State over the sample guide, a fixed clock and `event_repository`.
#[cfg(test)]
pub(crate) fn test_state(event_repository: Arc<dyn EventRepository>) -> AppState {
    let mut guides = GuideLibrary::new();
    guides
        .insert(guidebook_test_support::sample_guide())
        .unwrap();
    AppState::new(
        Arc::new(guidebook_test_support::FixedClock::default_instant()),
        event_repository,
        Arc::new(guides),
    )
}
