use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use music_core::CatalogSnapshot;
use music_logging::{music_debug, music_info};

use crate::scan::scan_catalog;

/// Process-wide catalog shared by every session.
///
/// Readers load the current snapshot without locking. A rescan builds a new
/// snapshot and publishes it with one atomic swap; the gate keeps concurrent
/// stale readers from rescanning in parallel.
pub struct CatalogStore {
    root: PathBuf,
    extensions: Vec<String>,
    refresh_interval: Duration,
    snapshot: ArcSwap<CatalogSnapshot>,
    rescan_gate: Mutex<()>,
}

impl CatalogStore {
    /// Creates the store and performs the initial scan.
    pub fn new(root: PathBuf, extensions: Vec<String>, refresh_interval: Duration) -> Self {
        let now = Instant::now();
        let initial = CatalogSnapshot::new(scan_catalog(&root, &extensions), now);
        music_debug!("initial catalog of {:?}: {} entries", root, initial.len());
        Self {
            root,
            extensions,
            refresh_interval,
            snapshot: ArcSwap::from_pointee(initial),
            rescan_gate: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    pub fn root_exists(&self) -> bool {
        self.root.is_dir()
    }

    /// Current snapshot, whatever its age.
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.snapshot.load_full()
    }

    /// Current snapshot, rescanned first when older than the refresh interval.
    pub fn refresh_if_stale(&self, now: Instant) -> Arc<CatalogSnapshot> {
        let current = self.snapshot.load_full();
        if !current.is_stale(now, self.refresh_interval) {
            return current;
        }
        // Someone else is rescanning; serve the snapshot we have.
        let Ok(_guard) = self.rescan_gate.try_lock() else {
            return current;
        };
        let current = self.snapshot.load_full();
        if !current.is_stale(now, self.refresh_interval) {
            return current;
        }
        self.rescan(now)
    }

    /// Unconditional rescan stamped with `now`.
    pub fn rescan(&self, now: Instant) -> Arc<CatalogSnapshot> {
        let fresh = Arc::new(CatalogSnapshot::new(
            scan_catalog(&self.root, &self.extensions),
            now,
        ));
        music_info!("refreshed catalog of {:?}: {} entries", self.root, fresh.len());
        self.snapshot.store(Arc::clone(&fresh));
        fresh
    }

    /// Refreshed snapshot, or `None` when the music root does not exist.
    pub fn available_snapshot(&self, now: Instant) -> Option<Arc<CatalogSnapshot>> {
        if !self.root_exists() {
            music_debug!("catalog unavailable: {:?} is not a directory", self.root);
            return None;
        }
        Some(self.refresh_if_stale(now))
    }
}
