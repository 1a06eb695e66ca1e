use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::similarity::similarity_ratio;

/// Scores at or below this value never count as a match.
pub const MATCH_THRESHOLD: f64 = 0.4;

/// Immutable listing of local audio files, relative to the music root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSnapshot {
    entries: Vec<PathBuf>,
    scanned_at: Instant,
}

impl CatalogSnapshot {
    pub fn new(entries: Vec<PathBuf>, scanned_at: Instant) -> Self {
        Self {
            entries,
            scanned_at,
        }
    }

    pub fn empty(scanned_at: Instant) -> Self {
        Self::new(Vec::new(), scanned_at)
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn scanned_at(&self) -> Instant {
        self.scanned_at
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True iff strictly more than `interval` has elapsed since the scan.
    pub fn is_stale(&self, now: Instant, interval: Duration) -> bool {
        now.saturating_duration_since(self.scanned_at) > interval
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub entry: PathBuf,
    pub score: f64,
}

/// Entry path with its final extension removed, as compared against hints.
pub fn base_name(entry: &Path) -> String {
    entry.with_extension("").to_string_lossy().into_owned()
}

/// Highest-scoring entry whose similarity to `hint` exceeds [`MATCH_THRESHOLD`].
/// The first entry wins among equal scores.
pub fn find_best_match(hint: &str, snapshot: &CatalogSnapshot) -> Option<MatchResult> {
    let mut best: Option<MatchResult> = None;
    for entry in snapshot.entries() {
        let score = similarity_ratio(hint, &base_name(entry));
        if score <= MATCH_THRESHOLD {
            continue;
        }
        let better = best.as_ref().map(|b| score > b.score).unwrap_or(true);
        if better {
            best = Some(MatchResult {
                entry: entry.clone(),
                score,
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(entries: &[&str]) -> CatalogSnapshot {
        CatalogSnapshot::new(entries.iter().map(PathBuf::from).collect(), Instant::now())
    }

    #[test]
    fn base_name_strips_only_the_last_extension() {
        assert_eq!(base_name(Path::new("晴天.mp3")), "晴天");
        assert_eq!(base_name(Path::new("live.2004.wav")), "live.2004");
    }

    #[test]
    fn staleness_is_strictly_greater_than_interval() {
        let start = Instant::now();
        let snap = CatalogSnapshot::empty(start);
        let interval = Duration::from_secs(60);
        assert!(!snap.is_stale(start + Duration::from_secs(60), interval));
        assert!(snap.is_stale(start + Duration::from_secs(61), interval));
    }

    #[test]
    fn first_entry_wins_on_equal_score() {
        let snap = snapshot(&["晴天.mp3", "晴天.wav"]);
        let found = find_best_match("晴天", &snap).unwrap();
        assert_eq!(found.entry, PathBuf::from("晴天.mp3"));
    }

    #[test]
    fn threshold_is_exclusive() {
        // "ab" vs "axyz": 2 * 1 / 6 = 0.333..., below threshold
        // "ab" vs "abcdefgh": 2 * 2 / 10 = 0.4, exactly at threshold
        let snap = snapshot(&["axyz.mp3", "abcdefgh.mp3"]);
        assert_eq!(find_best_match("ab", &snap), None);
    }
}
