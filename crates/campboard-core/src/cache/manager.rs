use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::models::BoardSnapshot;

/// Consider a cached snapshot stale after 15 minutes.
/// Assignments change quickly during check-in, so the window is short.
const CACHE_STALE_MINUTES: i64 = 15;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        let now = Utc::now();
        (now - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }

    pub fn is_stale(&self) -> bool {
        self.age_minutes() > CACHE_STALE_MINUTES
    }
}

pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)?;
        Ok(Self { cache_dir })
    }

    fn cache_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", name))
    }

    /// Event ids become file names; keep only characters that are safe there
    fn snapshot_name(event_id: &str) -> String {
        let safe: String = event_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        format!("snapshot_{}", safe)
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<CachedData<T>>> {
        let path = self.cache_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", name))?;

        let cached: CachedData<T> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", name))?;

        Ok(Some(cached))
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let cached = CachedData::new(data);
        let path = self.cache_path(name);
        let contents = serde_json::to_string_pretty(&cached)?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write cache file: {}", name))?;
        Ok(())
    }

    // ===== Board snapshots =====

    pub fn load_snapshot(&self, event_id: &str) -> Result<Option<CachedData<BoardSnapshot>>> {
        self.load(&Self::snapshot_name(event_id))
    }

    pub fn save_snapshot(&self, snapshot: &BoardSnapshot) -> Result<()> {
        self.save(&Self::snapshot_name(&snapshot.event_id), snapshot)
    }

    /// Missing or unreadable caches count as stale
    pub fn is_snapshot_stale(&self, event_id: &str) -> bool {
        match self.load_snapshot(event_id) {
            Ok(Some(cached)) => cached.is_stale(),
            Ok(None) => true,
            Err(e) => {
                debug!(event_id, error = %e, "Failed to load cache for staleness check");
                true
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn temp_cache(tag: &str) -> (CacheManager, PathBuf) {
        let dir = std::env::temp_dir().join(format!(
            "campboard-cache-test-{}-{}",
            tag,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        (CacheManager::new(dir.clone()).expect("cache dir"), dir)
    }

    #[test]
    fn test_cached_data_age_display_just_now() {
        let cached = CachedData::new(vec![1, 2, 3]);
        assert_eq!(cached.age_display(), "just now");
    }

    #[test]
    fn test_cached_data_age_display_rounding() {
        let mut cached = CachedData::new(());
        cached.cached_at = Utc::now() - Duration::minutes(95);
        assert_eq!(cached.age_display(), "2h ago");
        cached.cached_at = Utc::now() - Duration::minutes(70);
        assert_eq!(cached.age_display(), "1h ago");
        cached.cached_at = Utc::now() - Duration::minutes(5);
        assert_eq!(cached.age_display(), "5m ago");
    }

    #[test]
    fn test_cached_data_is_stale() {
        let fresh = CachedData::new(vec![1]);
        assert!(!fresh.is_stale());

        let mut old = CachedData::new(vec![1]);
        old.cached_at = Utc::now() - Duration::minutes(CACHE_STALE_MINUTES + 1);
        assert!(old.is_stale());
    }

    #[test]
    fn test_snapshot_save_and_load() {
        let (cache, dir) = temp_cache("roundtrip");
        assert!(cache.load_snapshot("summer-1").expect("load").is_none());
        assert!(cache.is_snapshot_stale("summer-1"));

        let snap = BoardSnapshot::empty("summer-1");
        cache.save_snapshot(&snap).expect("save");

        let loaded = cache.load_snapshot("summer-1").expect("load").expect("cached");
        assert_eq!(loaded.data, snap);
        assert!(!cache.is_snapshot_stale("summer-1"));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_snapshot_name_sanitized() {
        assert_eq!(CacheManager::snapshot_name("2026/summer"), "snapshot_2026_summer");
        assert_eq!(CacheManager::snapshot_name("e-1_a"), "snapshot_e-1_a");
    }
}
