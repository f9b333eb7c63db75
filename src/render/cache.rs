//! Keyed overlay rebuilds

use crate::render::overlay::{OverlayKey, OverlaySet};
use tracing::trace;

/// Holds the last overlay set and rebuilds only when its key changes
#[derive(Debug, Default)]
pub struct OverlayCache {
    current: Option<OverlaySet>,
    rebuilds: u64,
}

impl OverlayCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&OverlaySet> {
        self.current.as_ref()
    }

    /// Number of rebuilds performed so far
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    /// Whether `key` differs from the cached set's key
    pub fn is_stale(&self, key: &OverlayKey) -> bool {
        self.current.as_ref().map(|set| &set.key) != Some(key)
    }

    /// Rebuild with `build` when the key changed. Returns the new set, or
    /// `None` when the cached one is still valid.
    pub fn refresh<F>(&mut self, key: OverlayKey, build: F) -> Option<&OverlaySet>
    where
        F: FnOnce(OverlayKey) -> OverlaySet,
    {
        if !self.is_stale(&key) {
            trace!("Overlay key unchanged, skipping rebuild");
            return None;
        }

        self.rebuilds += 1;
        self.current = Some(build(key));
        self.current.as_ref()
    }

    /// Forget the cached set so the next refresh always rebuilds
    pub fn invalidate(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{get_page_layout_dimensions, PageConfig};
    use crate::render::overlay::OverlayRenderer;

    fn key(page_count: usize) -> OverlayKey {
        OverlayKey {
            page_count,
            config: PageConfig::default(),
            gap: 40.0,
            measured_content_height: 500.0,
        }
    }

    fn build(key: OverlayKey) -> OverlaySet {
        OverlayRenderer::new(get_page_layout_dimensions(&key.config), key.gap).build(key)
    }

    #[test]
    fn test_rebuilds_only_on_key_change() {
        let mut cache = OverlayCache::new();
        assert!(cache.refresh(key(1), build).is_some());
        assert!(cache.refresh(key(1), build).is_none());
        assert_eq!(cache.rebuilds(), 1);

        let rebuilt = cache.refresh(key(2), build).map(|set| set.page_count());
        assert_eq!(rebuilt, Some(2));
        assert_eq!(cache.rebuilds(), 2);
    }

    #[test]
    fn test_invalidate_forces_rebuild() {
        let mut cache = OverlayCache::new();
        cache.refresh(key(1), build);
        cache.invalidate();
        assert!(cache.current().is_none());
        assert!(cache.refresh(key(1), build).is_some());
    }
}
