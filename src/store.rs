//! Local JSON store for rating state
//!
//! Stands in for the store of record when the aggregator is driven from the
//! command line: community rating logs and effectiveness aggregates are kept
//! in `ratings.json` under the data directory. Unlike the cache, this file is
//! authoritative, so I/O and parse errors propagate.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::debug;

use crate::atomic_file::write_atomically;
use crate::error::StoreError;
use crate::rating::{CommunityRatings, EffectivenessTracker};

/// File name of the store inside the data directory
const STORE_FILE: &str = "ratings.json";

/// Everything the aggregator needs to compute the next increment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RatingState {
    #[serde(default)]
    pub community: CommunityRatings,
    #[serde(default)]
    pub effectiveness: EffectivenessTracker,
}

/// Reads and writes `RatingState` in a data directory
#[derive(Debug, Clone)]
pub struct LocalStore {
    /// Directory holding the store file
    data_dir: PathBuf,
}

impl LocalStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Path to the store file
    pub fn path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE)
    }

    /// Loads the saved state; a missing file is an empty state.
    ///
    /// Every stored rating is re-validated, so a hand-edited file cannot skew
    /// the aggregates.
    pub fn load(&self) -> Result<RatingState, StoreError> {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no rating store yet");
                return Ok(RatingState::default());
            }
            Err(e) => return Err(e.into()),
        };
        let state: RatingState = serde_json::from_str(&content)?;
        state.community.validate()?;
        state.effectiveness.validate()?;
        Ok(state)
    }

    /// Writes the state, creating the data directory if needed
    pub fn save(&self, state: &RatingState) -> Result<(), StoreError> {
        fs::create_dir_all(&self.data_dir)?;
        let json = serde_json::to_string_pretty(state)?;
        write_atomically(&self.path(), &json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use tempfile::TempDir;

    fn create_test_store() -> (LocalStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = LocalStore::new(temp_dir.path().join("data"));
        (store, temp_dir)
    }

    #[test]
    fn test_load_missing_store_is_empty() {
        let (store, _temp_dir) = create_test_store();
        let state = store.load().expect("load should succeed");
        assert!(state.community.score("any").is_none());
        assert!(state.effectiveness.score("any").is_none());
    }

    #[test]
    fn test_state_survives_save_and_load() {
        let (store, _temp_dir) = create_test_store();
        let mut state = RatingState::default();
        state
            .community
            .submit_community_rating("strat_1", "rater", 4)
            .unwrap();
        state
            .effectiveness
            .submit_effectiveness_rating("coping_1", 0.8)
            .unwrap();

        store.save(&state).expect("save should succeed");
        let loaded = store.load().expect("load should succeed");

        assert_eq!(loaded.community.score("strat_1").unwrap().count, 1);
        assert_eq!(loaded.effectiveness.score("coping_1").unwrap().mean, 0.8);
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn test_out_of_range_stored_rating_is_an_error() {
        let (store, _temp_dir) = create_test_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(
            store.path(),
            r#"{"community":{"strat_1":[{"subject_id":"strat_1","rater_id":"a",
                "value":9,"created_at":"2026-01-01T00:00:00Z"}]}}"#,
        )
        .unwrap();

        assert!(matches!(
            store.load(),
            Err(StoreError::Invalid(ValidationError::CommunityOutOfRange(9)))
        ));
    }

    #[test]
    fn test_out_of_range_success_rate_is_an_error() {
        let (store, _temp_dir) = create_test_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(
            store.path(),
            r#"{"effectiveness":{"coping_1":{"mean":1.5,"count":2}}}"#,
        )
        .unwrap();

        assert!(matches!(
            store.load(),
            Err(StoreError::Invalid(ValidationError::EffectivenessOutOfRange(_)))
        ));
    }

    #[test]
    fn test_corrupt_store_is_an_error() {
        let (store, _temp_dir) = create_test_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{broken").unwrap();

        assert!(matches!(store.load(), Err(StoreError::Json(_))));
    }
}
