//! Lazy, all-or-nothing cache of one full application enumeration.

use std::sync::{Arc, Mutex};

use log::debug;

/// Full enumeration pass supplied by the owning provider.
pub type AppLoader<T> = Box<dyn Fn() -> Vec<Arc<T>> + Send + Sync>;

/// Holds nothing until the first query, then the complete result of one
/// scan. Invalidation drops the whole list; it is never partially rescanned.
pub struct AppCache<T: ?Sized> {
    loader: AppLoader<T>,
    apps: Mutex<Option<Arc<Vec<Arc<T>>>>>,
}

/// Access to a descriptor's display name, used to key cache visits.
pub trait Named {
    fn display_name(&self) -> &str;
}

impl<T: Named + ?Sized> AppCache<T> {
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> Vec<Arc<T>> + Send + Sync + 'static,
    {
        Self {
            loader: Box::new(loader),
            apps: Mutex::new(None),
        }
    }

    /// Snapshot of the cached list, running the scan first if needed.
    /// Only one caller performs the scan; others wait for its result.
    pub fn apps(&self) -> Arc<Vec<Arc<T>>> {
        let mut guard = self.apps.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(apps) = guard.as_ref() {
            return apps.clone();
        }

        let apps = Arc::new((self.loader)());
        debug!("Enumerated {} applications", apps.len());
        *guard = Some(apps.clone());
        apps
    }

    /// Visit cached apps in enumeration order until `f` returns `true`.
    ///
    /// The lock is not held while visiting, so `f` may query the owning
    /// provider again.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&str, &Arc<T>) -> bool,
    {
        let apps = self.apps();
        for app in apps.iter() {
            if f(app.display_name(), app) {
                return;
            }
        }
    }

    /// Forget the cached list; the next query scans again.
    pub fn invalidate(&self) {
        let mut guard = self.apps.lock().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fake(String);

    impl Named for Fake {
        fn display_name(&self) -> &str {
            &self.0
        }
    }

    fn counting_cache(names: &'static [&'static str]) -> (AppCache<Fake>, Arc<AtomicUsize>) {
        let scans = Arc::new(AtomicUsize::new(0));
        let counter = scans.clone();
        let cache = AppCache::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            names.iter().map(|n| Arc::new(Fake(n.to_string()))).collect()
        });
        (cache, scans)
    }

    #[test]
    fn test_scans_lazily_and_once() {
        let (cache, scans) = counting_cache(&["a", "b"]);
        assert_eq!(scans.load(Ordering::SeqCst), 0);

        cache.for_each(|_, _| false);
        cache.for_each(|_, _| false);
        assert_eq!(scans.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_visits_in_order_and_stops() {
        let (cache, _) = counting_cache(&["a", "b", "c"]);
        let mut seen = Vec::new();
        cache.for_each(|name, _| {
            seen.push(name.to_string());
            name == "b"
        });
        assert_eq!(seen, vec!["a", "b"]);
    }

    #[test]
    fn test_invalidate_forces_rescan() {
        let (cache, scans) = counting_cache(&["a"]);
        cache.for_each(|_, _| false);
        cache.invalidate();
        assert_eq!(scans.load(Ordering::SeqCst), 1);

        cache.for_each(|_, _| false);
        assert_eq!(scans.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_concurrent_first_queries_scan_once() {
        let (cache, scans) = counting_cache(&["a", "b"]);
        let cache = Arc::new(cache);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                std::thread::spawn(move || cache.apps().len())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), 2);
        }
        assert_eq!(scans.load(Ordering::SeqCst), 1);
    }
}
