//! Screen tracking
//!
//! Explicit registry of live proxies, replacing reliance on collector
//! weak tables: the tracker holds weak edges so it never keeps a screen
//! alive, plus the optional scoped resource to release when the screen
//! goes away.

use std::sync::{Arc, Weak};

use dashmap::DashMap;
use tracing::debug;

use rudder_domain::ports::container::ScopedResource;
use rudder_domain::types::ScreenId;

use crate::proxy::screen_proxy::{ScreenProxy, SharedScreen};

struct TrackedScreen {
    screen: Weak<std::sync::Mutex<ScreenProxy>>,
    resource: Option<Box<dyn ScopedResource>>,
}

/// Weak registry of live screen proxies.
#[derive(Default)]
pub struct ScreenTracker {
    entries: DashMap<ScreenId, TrackedScreen>,
}

impl ScreenTracker {
    /// An empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a screen, taking custody of its scoped resource
    pub fn track(
        &self,
        id: ScreenId,
        screen: &SharedScreen,
        resource: Option<Box<dyn ScopedResource>>,
    ) {
        self.entries.insert(
            id,
            TrackedScreen {
                screen: Arc::downgrade(screen),
                resource,
            },
        );
        debug!(screen = %id, "Tracking screen");
    }

    /// The live screen for an id, if it is still around
    pub fn live(&self, id: ScreenId) -> Option<SharedScreen> {
        self.entries.get(&id).and_then(|entry| entry.screen.upgrade())
    }

    /// Whether the id is currently tracked
    pub fn contains(&self, id: ScreenId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Stop tracking and release the scoped resource.
    ///
    /// The entry is removed atomically, so concurrent callers release the
    /// resource at most once. Returns whether this call did the release.
    pub fn release(&self, id: ScreenId) -> bool {
        let Some((_, entry)) = self.entries.remove(&id) else {
            return false;
        };
        if let Some(resource) = entry.resource {
            resource.release();
        }
        debug!(screen = %id, "Released screen");
        true
    }

    /// Drop entries whose screen is gone, releasing their resources
    pub fn prune(&self) -> usize {
        let dead: Vec<ScreenId> = self
            .entries
            .iter()
            .filter(|entry| entry.screen.upgrade().is_none())
            .map(|entry| *entry.key())
            .collect();
        let mut pruned = 0;
        for id in dead {
            if self.release(id) {
                pruned += 1;
            }
        }
        pruned
    }

    /// Number of tracked entries, live or not
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is tracked
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for ScreenTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenTracker")
            .field("entries", &self.entries.len())
            .finish()
    }
}
