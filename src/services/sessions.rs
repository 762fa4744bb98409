use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use crate::repository::FeedRepository;
use crate::services::engagement::EngagementStore;

/// One engagement store per mounted feed view.
///
/// Stores are created when a viewer's feed loads and discarded when the view
/// unmounts; unmounting invalidates the store first so in-flight remote
/// completions cannot write into a dead view.
pub struct SessionRegistry<R> {
    repo: Arc<R>,
    stores: DashMap<Uuid, Arc<EngagementStore<R>>>,
}

impl<R: FeedRepository> SessionRegistry<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            repo,
            stores: DashMap::new(),
        }
    }

    /// Store for `viewer`, creating it on first mount.
    pub fn mount(&self, viewer: Uuid) -> Arc<EngagementStore<R>> {
        let entry = self
            .stores
            .entry(viewer)
            .or_insert_with(|| Arc::new(EngagementStore::new(Arc::clone(&self.repo), viewer)));
        Arc::clone(&entry)
    }

    /// Store for `viewer`, if mounted.
    pub fn get(&self, viewer: Uuid) -> Option<Arc<EngagementStore<R>>> {
        self.stores.get(&viewer).map(|entry| Arc::clone(entry.value()))
    }

    /// Invalidate and discard the store for `viewer`. Returns false when no
    /// store was mounted.
    pub fn unmount(&self, viewer: Uuid) -> bool {
        match self.stores.remove(&viewer) {
            Some((_, store)) => {
                store.invalidate();
                debug!(%viewer, "Feed view unmounted");
                true
            }
            None => false,
        }
    }
}
