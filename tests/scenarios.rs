//! End-to-end scenarios across the public library API

use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde_json::{json, Value};
use tempfile::TempDir;

use neuroease::cache::{ExpiringCache, FileStorage};
use neuroease::connectivity::ConnectivityMonitor;
use neuroease::error::ValidationError;
use neuroease::rating::{CommunityRatings, CommunityStats, CopingStats, EffectivenessTracker};

#[test]
fn test_community_scenario_strat_1() {
    let mut ratings = CommunityRatings::new();
    for (rater, value) in [("p1", 4), ("p2", 5), ("p3", 3)] {
        ratings
            .submit_community_rating("strat_1", rater, value)
            .expect("valid rating");
    }

    let stats = CommunityStats::from(&ratings.score("strat_1").unwrap());
    assert_eq!(stats.rating, 4.0);
    assert_eq!(stats.rating_count, 3);
}

#[test]
fn test_rejected_community_ratings_change_nothing() {
    let mut ratings = CommunityRatings::new();
    ratings.submit_community_rating("strat_1", "p1", 2).unwrap();

    for bad in [0, 6, -1, 100] {
        assert_eq!(
            ratings.submit_community_rating("strat_1", "p2", bad),
            Err(ValidationError::CommunityOutOfRange(bad))
        );
    }

    let score = ratings.score("strat_1").unwrap();
    assert_eq!(score.mean, 2.0);
    assert_eq!(score.count, 1);
}

#[test]
fn test_effectiveness_scenario_from_unused_strategy() {
    let mut tracker = EffectivenessTracker::new();
    tracker.seed("coping_1", 0.0, 0).unwrap();

    let first = CopingStats::from(&tracker.submit_effectiveness_rating("coping_1", 0.8).unwrap());
    assert!((first.success_rate - 0.8).abs() < 1e-9);
    assert_eq!(first.times_used, 1);

    let second = CopingStats::from(&tracker.submit_effectiveness_rating("coping_1", 0.6).unwrap());
    assert!((second.success_rate - 0.7).abs() < 1e-9);
    assert_eq!(second.times_used, 2);
}

#[test]
fn test_expired_key_is_removed_from_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("cache.json");
    let cache = ExpiringCache::new(FileStorage::at(path.clone()));

    cache.put("k", &json!({"a": 1}), Duration::from_millis(1));
    thread::sleep(Duration::from_millis(10));

    assert!(cache.get::<Value>("k").is_none());

    let persisted: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert!(persisted.get("k").is_none(), "stale key should be purged: {}", persisted);
}

#[test]
fn test_corrupt_cache_file_is_a_miss() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("cache.json");
    fs::write(&path, "not json at all").unwrap();
    let cache = ExpiringCache::new(FileStorage::at(path));

    assert!(cache.get::<Value>("k").is_none());
    assert_eq!(cache.len(), 0);
}

#[test]
fn test_offline_write_then_sync_on_reconnect() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let cache = Arc::new(ExpiringCache::new(FileStorage::at(
        temp_dir.path().join("cache.json"),
    )));
    let monitor = ConnectivityMonitor::new();
    monitor.set_online(false);

    cache.put("pending_mood_log", &json!({"mood": "calm"}), Duration::from_secs(60));

    let synced = Arc::new(AtomicUsize::new(0));
    {
        let cache = cache.clone();
        let synced = synced.clone();
        monitor.sync_when_online(move || {
            if cache.get::<Value>("pending_mood_log").is_some() {
                cache.remove("pending_mood_log");
                synced.fetch_add(1, Ordering::SeqCst);
            }
        });
    }

    assert!(!monitor.is_online());
    assert_eq!(synced.load(Ordering::SeqCst), 0);

    monitor.set_online(true);

    assert_eq!(synced.load(Ordering::SeqCst), 1);
    assert!(cache.get::<Value>("pending_mood_log").is_none());
}
