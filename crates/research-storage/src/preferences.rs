//! File-backed preference store.
//!
//! The store owns two JSON files:
//! - the state file, read wholesale on every load and rewritten wholesale on
//!   every update
//! - a read-only defaults file with the same shape, used to seed the state
//!   file the first time it is needed
//!
//! There is no locking. Two processes updating at once can lose an update;
//! the last writer wins.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use research_types::{FeedbackSignal, PreferenceState};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::StorageError;

const LENGTH_KEY: &str = "preferred_summary_length";

/// Preference store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    state_path: PathBuf,
    defaults_path: PathBuf,
}

impl PreferenceStore {
    /// Create a store for the given state and defaults files.
    ///
    /// Nothing is read or written until the first `load`.
    pub fn new(state_path: impl Into<PathBuf>, defaults_path: impl Into<PathBuf>) -> Self {
        Self {
            state_path: state_path.into(),
            defaults_path: defaults_path.into(),
        }
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    pub fn defaults_path(&self) -> &Path {
        &self.defaults_path
    }

    /// Load the current preference state.
    ///
    /// Falls back in order: state file -> defaults file -> built-in values.
    /// A missing or malformed file moves on to the next source. When the
    /// state file could not be used, the seeded state is persisted
    /// immediately. The returned length is always inside the allowed bound.
    pub fn load(&self) -> PreferenceState {
        if let Some(state) = read_record(&self.state_path, "state") {
            return state.clamped();
        }

        let seeded = read_record(&self.defaults_path, "defaults")
            .unwrap_or_else(|| {
                debug!("No usable defaults file, using built-in preferences");
                PreferenceState::default()
            })
            .clamped();

        match self.write(&seeded) {
            Ok(()) => info!(path = ?self.state_path, "Seeded preference state"),
            Err(e) => {
                warn!(path = ?self.state_path, error = %e, "Failed to persist seeded preferences")
            }
        }

        seeded
    }

    /// Set one key and rewrite the whole record.
    ///
    /// Unknown keys are stored as-is. A value that would make the record
    /// unreadable (e.g. a string for `preferred_summary_length`) is rejected
    /// without touching the file.
    pub fn update(&self, key: &str, value: Value) -> Result<PreferenceState, StorageError> {
        let current = self.load();

        let mut record = serde_json::to_value(&current)?;
        if let Value::Object(map) = &mut record {
            map.insert(key.to_string(), value);
        }

        let updated: PreferenceState =
            serde_json::from_value(record).map_err(|e| StorageError::InvalidValue {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        self.write(&updated)?;
        debug!(key, "Preference updated");
        Ok(updated)
    }

    /// Adjust the preferred summary length from user feedback.
    ///
    /// Reloads the current state on every call, so repeated signals compound
    /// toward the bound. `Good` does not write anything.
    pub fn apply_feedback(&self, signal: FeedbackSignal) -> Result<PreferenceState, StorageError> {
        let current = self.load();

        if signal == FeedbackSignal::Good {
            debug!("Good feedback, preference unchanged");
            return Ok(current);
        }

        let new_length = current.adjusted_length(signal);
        info!(
            signal = %signal,
            from = current.preferred_summary_length,
            to = new_length,
            "Applying summary length feedback"
        );
        self.update(LENGTH_KEY, Value::from(new_length))
    }

    /// Delete the persisted state so the next load reseeds it.
    pub fn reset(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.state_path) {
            Ok(()) => {
                info!(path = ?self.state_path, "Removed preference state");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write the full record, replacing the state file atomically.
    fn write(&self, state: &PreferenceState) -> Result<(), StorageError> {
        if let Some(parent) = self.state_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(state)?;
        let tmp_path = self.state_path.with_extension("json.tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.state_path)?;
        Ok(())
    }
}

/// Read and parse a preference record, returning `None` when it is missing
/// or unusable.
fn read_record(path: &Path, which: &str) -> Option<PreferenceState> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = ?path, which, "Preference file not found");
            return None;
        }
        Err(e) => {
            warn!(path = ?path, which, error = %e, "Failed to read preference file");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(state) => Some(state),
        Err(e) => {
            warn!(path = ?path, which, error = %e, "Malformed preference file, ignoring");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use research_types::{
        CredibilityPriority, DEFAULT_SUMMARY_LENGTH, MAX_SUMMARY_LENGTH, MIN_SUMMARY_LENGTH,
    };
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> PreferenceStore {
        PreferenceStore::new(
            dir.path().join("state").join("preferences.json"),
            dir.path().join("defaults.json"),
        )
    }

    fn persisted(store: &PreferenceStore) -> Value {
        let raw = fs::read_to_string(store.state_path()).unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn test_load_without_any_file_uses_builtin_and_persists() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let state = store.load();
        assert_eq!(state.preferred_summary_length, DEFAULT_SUMMARY_LENGTH);
        assert_eq!(state.credibility_priority, CredibilityPriority::Medium);

        let on_disk = persisted(&store);
        assert_eq!(on_disk["preferred_summary_length"], 150);
        assert_eq!(on_disk["credibility_priority"], "medium");
    }

    #[test]
    fn test_load_seeds_from_defaults_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(
            store.defaults_path(),
            r#"{"preferred_summary_length": 200, "credibility_priority": "high"}"#,
        )
        .unwrap();

        let state = store.load();
        assert_eq!(state.preferred_summary_length, 200);
        assert_eq!(state.credibility_priority, CredibilityPriority::High);
        assert_eq!(persisted(&store)["preferred_summary_length"], 200);
    }

    #[test]
    fn test_existing_state_wins_over_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.defaults_path(), r#"{"preferred_summary_length": 200}"#).unwrap();
        fs::create_dir_all(store.state_path().parent().unwrap()).unwrap();
        fs::write(store.state_path(), r#"{"preferred_summary_length": 310}"#).unwrap();

        assert_eq!(store.load().preferred_summary_length, 310);
    }

    #[test]
    fn test_malformed_files_always_yield_valid_state() {
        let cases = [
            "",
            "not json",
            "{\"preferred_summary_length\": ",
            "[1, 2, 3]",
            "null",
            "{\"preferred_summary_length\": \"long\"}",
            "{\"preferred_summary_length\": -5}",
            "{\"preferred_summary_length\": 5000}",
            "{\"preferred_summary_length\": 1}",
            "{}",
        ];

        for state_contents in cases {
            for defaults_contents in [None, Some("garbage"), Some(state_contents)] {
                let dir = TempDir::new().unwrap();
                let store = store_in(&dir);
                fs::create_dir_all(store.state_path().parent().unwrap()).unwrap();
                fs::write(store.state_path(), state_contents).unwrap();
                if let Some(defaults) = defaults_contents {
                    fs::write(store.defaults_path(), defaults).unwrap();
                }

                let state = store.load();
                assert!(
                    state.is_within_bounds(),
                    "state {:?} / defaults {:?} gave {}",
                    state_contents,
                    defaults_contents,
                    state.preferred_summary_length
                );

                let json = serde_json::to_value(&state).unwrap();
                assert!(json.get("preferred_summary_length").is_some());
                assert!(json.get("credibility_priority").is_some());
            }
        }
    }

    #[test]
    fn test_corrupt_state_is_reseeded() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.state_path().parent().unwrap()).unwrap();
        fs::write(store.state_path(), "{{{{").unwrap();

        let state = store.load();
        assert_eq!(state.preferred_summary_length, DEFAULT_SUMMARY_LENGTH);
        // File was rewritten with a readable record
        assert_eq!(persisted(&store)["preferred_summary_length"], 150);
    }

    #[test]
    fn test_update_rewrites_whole_record_and_keeps_unknown_keys() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.state_path().parent().unwrap()).unwrap();
        fs::write(
            store.state_path(),
            r#"{"preferred_summary_length": 150, "theme": "dark"}"#,
        )
        .unwrap();

        let updated = store
            .update("credibility_priority", Value::from("low"))
            .unwrap();
        assert_eq!(updated.credibility_priority, CredibilityPriority::Low);

        let on_disk = persisted(&store);
        assert_eq!(on_disk["credibility_priority"], "low");
        assert_eq!(on_disk["theme"], "dark");
        assert_eq!(on_disk["preferred_summary_length"], 150);
    }

    #[test]
    fn test_update_rejects_unreadable_value() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.load();

        let result = store.update("preferred_summary_length", Value::from("huge"));
        assert!(matches!(result, Err(StorageError::InvalidValue { .. })));
        assert_eq!(persisted(&store)["preferred_summary_length"], 150);
    }

    #[test]
    fn test_too_long_converges_to_floor() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let mut seen = Vec::new();
        for _ in 0..10 {
            seen.push(
                store
                    .apply_feedback(FeedbackSignal::TooLong)
                    .unwrap()
                    .preferred_summary_length,
            );
        }

        assert_eq!(&seen[..3], &[120, 90, 80]);
        assert!(seen[2..].iter().all(|&len| len == MIN_SUMMARY_LENGTH));
        assert_eq!(store.load().preferred_summary_length, MIN_SUMMARY_LENGTH);
    }

    #[test]
    fn test_too_short_converges_to_cap() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        for _ in 0..20 {
            store.apply_feedback(FeedbackSignal::TooShort).unwrap();
        }

        assert_eq!(store.load().preferred_summary_length, MAX_SUMMARY_LENGTH);
        let again = store.apply_feedback(FeedbackSignal::TooShort).unwrap();
        assert_eq!(again.preferred_summary_length, MAX_SUMMARY_LENGTH);
    }

    #[test]
    fn test_good_feedback_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let before = store.load();
        let raw_before = fs::read_to_string(store.state_path()).unwrap();

        for _ in 0..5 {
            let state = store.apply_feedback(FeedbackSignal::Good).unwrap();
            assert_eq!(state, before);
        }

        assert_eq!(fs::read_to_string(store.state_path()).unwrap(), raw_before);
    }

    #[test]
    fn test_reset_reseeds_on_next_load() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.apply_feedback(FeedbackSignal::TooShort).unwrap();
        assert_eq!(store.load().preferred_summary_length, 180);

        store.reset().unwrap();
        assert!(!store.state_path().exists());
        assert_eq!(store.load().preferred_summary_length, DEFAULT_SUMMARY_LENGTH);

        // Resetting twice is fine
        store.reset().unwrap();
        store.reset().unwrap();
    }
}
