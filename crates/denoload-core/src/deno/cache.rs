//! Per-plugin memo of resolution outcomes.

use rustc_hash::{FxHashMap, FxHashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::compiler::MediaType;

/// Outcome memo for specifiers, plus in-flight gates for first lookups.
///
/// The std mutex is only held for map access, never across an `.await`.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    state: Mutex<CacheState>,
}

#[derive(Debug, Default)]
struct CacheState {
    /// Specifiers whose lookup has completed, successfully or not.
    processed: FxHashSet<String>,
    /// Specifier → resolved id. Missing for processed specifiers that defer.
    resolved: FxHashMap<String, String>,
    /// Media types reported for foreign modules, keyed by local path.
    media_types: FxHashMap<PathBuf, MediaType>,
    /// Gates serializing concurrent first lookups of one specifier.
    in_flight: FxHashMap<String, Arc<tokio::sync::Mutex<()>>>,
}

impl ResolutionCache {
    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// `Some(outcome)` if `specifier` was already processed, where
    /// `outcome` is `None` for a deferred specifier.
    pub fn lookup(&self, specifier: &str) -> Option<Option<String>> {
        let state = self.state();
        state
            .processed
            .contains(specifier)
            .then(|| state.resolved.get(specifier).cloned())
    }

    /// Record the final outcome for `specifier`. Write-once: a second call
    /// for the same specifier is ignored.
    pub fn finish(&self, specifier: &str, resolved: Option<String>) {
        let mut state = self.state();
        if !state.processed.insert(specifier.to_string()) {
            return;
        }
        if let Some(id) = resolved {
            state.resolved.insert(specifier.to_string(), id);
        }
    }

    /// Gate for the first lookup of `specifier`; holders of the same gate
    /// run one at a time.
    pub fn gate(&self, specifier: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.state()
            .in_flight
            .entry(specifier.to_string())
            .or_default()
            .clone()
    }

    /// Drop the gate for `specifier` if it is still `gate`.
    pub fn release(&self, specifier: &str, gate: &Arc<tokio::sync::Mutex<()>>) {
        let mut state = self.state();
        if state
            .in_flight
            .get(specifier)
            .is_some_and(|current| Arc::ptr_eq(current, gate))
        {
            state.in_flight.remove(specifier);
        }
    }

    /// Remember the media type Deno reported for a foreign module.
    pub fn set_media_type(&self, local: &Path, media_type: MediaType) {
        self.state().media_types.insert(local.to_path_buf(), media_type);
    }

    /// Media type reported for `local`, if any.
    pub fn media_type(&self, local: &Path) -> Option<MediaType> {
        self.state().media_types.get(local).copied()
    }

    /// Number of processed specifiers.
    pub fn len(&self) -> usize {
        self.state().processed.len()
    }

    /// Whether nothing has been processed yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unprocessed_is_a_miss() {
        let cache = ResolutionCache::default();
        assert_eq!(cache.lookup("jsr:@std/path"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_deferred_is_a_cached_none() {
        let cache = ResolutionCache::default();
        cache.finish("lodash", None);
        assert_eq!(cache.lookup("lodash"), Some(None));
    }

    #[test]
    fn test_finish_is_write_once() {
        let cache = ResolutionCache::default();
        cache.finish("./a.ts", Some("/proj/a.ts".to_string()));
        cache.finish("./a.ts", Some("/elsewhere/a.ts".to_string()));
        cache.finish("./a.ts", None);
        assert_eq!(cache.lookup("./a.ts"), Some(Some("/proj/a.ts".to_string())));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_gate_is_shared_until_released() {
        let cache = ResolutionCache::default();
        let a = cache.gate("x");
        let b = cache.gate("x");
        assert!(Arc::ptr_eq(&a, &b));

        cache.release("x", &a);
        let c = cache.gate("x");
        assert!(!Arc::ptr_eq(&a, &c));

        // a stale gate does not evict the current one
        cache.release("x", &a);
        assert!(Arc::ptr_eq(&c, &cache.gate("x")));
    }

    #[test]
    fn test_media_types() {
        let cache = ResolutionCache::default();
        let local = Path::new("/deno/remote/https/deno.land/1c9e");
        assert_eq!(cache.media_type(local), None);
        cache.set_media_type(local, MediaType::Tsx);
        assert_eq!(cache.media_type(local), Some(MediaType::Tsx));
    }
}
