//! Profile storage
//!
//! Features:
//! - `ProfileStore` seam for whatever backend the host provides
//! - In-memory store for tests and the headless runner
//! - One JSON file per user, written via temp file + rename

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::profile::{Profile, RunReport};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("profile I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("profile JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid user id {0:?}")]
    InvalidUserId(String),
}

/// Durable per-user profile storage
pub trait ProfileStore {
    /// Load a profile; unknown users get a fresh one
    fn fetch(&self, user_id: &str) -> Result<Profile, PersistenceError>;

    fn save(&mut self, user_id: &str, profile: &Profile) -> Result<(), PersistenceError>;

    /// Merge a finished run into the stored profile and return the result
    fn record_run(&mut self, user_id: &str, report: &RunReport) -> Result<Profile, PersistenceError> {
        let mut profile = self.fetch(user_id)?;
        if profile.apply_report(report) {
            self.save(user_id, &profile)?;
        }
        Ok(profile)
    }
}

fn check_user_id(user_id: &str) -> Result<(), PersistenceError> {
    let valid = !user_id.is_empty()
        && user_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(PersistenceError::InvalidUserId(user_id.to_string()))
    }
}

/// Process-local store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    profiles: HashMap<String, Profile>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for MemoryStore {
    fn fetch(&self, user_id: &str) -> Result<Profile, PersistenceError> {
        check_user_id(user_id)?;
        Ok(self.profiles.get(user_id).cloned().unwrap_or_default())
    }

    fn save(&mut self, user_id: &str, profile: &Profile) -> Result<(), PersistenceError> {
        check_user_id(user_id)?;
        self.profiles.insert(user_id.to_string(), profile.clone());
        Ok(())
    }
}

/// One `<user>.json` per user under a directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Use `dir` for profiles, creating it if needed
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, user_id: &str) -> Result<PathBuf, PersistenceError> {
        check_user_id(user_id)?;
        Ok(self.dir.join(format!("{user_id}.json")))
    }
}

impl ProfileStore for JsonFileStore {
    fn fetch(&self, user_id: &str) -> Result<Profile, PersistenceError> {
        let path = self.path_for(user_id)?;
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No profile for {user_id}, starting fresh");
                return Ok(Profile::default());
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&json)?)
    }

    fn save(&mut self, user_id: &str, profile: &Profile) -> Result<(), PersistenceError> {
        let path = self.path_for(user_id)?;
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(profile)?;
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        log::debug!(
            "Profile {user_id} saved (high score {:.0}, {} coins)",
            profile.high_score,
            profile.total_coins
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(run_id: u64, best_height: f32, coins: u32) -> RunReport {
        RunReport {
            run_id,
            best_height,
            coins,
        }
    }

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.fetch("alice").unwrap(), Profile::default());
        let profile = store.record_run("alice", &report(1, 640.0, 2)).unwrap();
        assert_eq!(profile.total_coins, 2);
        assert_eq!(store.fetch("alice").unwrap(), profile);
        assert_eq!(store.fetch("bob").unwrap(), Profile::default());
    }

    #[test]
    fn test_repeated_run_recorded_once() {
        let mut store = MemoryStore::new();
        store.record_run("u1", &report(5, 100.0, 3)).unwrap();
        let profile = store.record_run("u1", &report(5, 100.0, 3)).unwrap();
        assert_eq!(profile.total_coins, 3);
    }

    #[test]
    fn test_rejects_bad_user_ids() {
        let mut store = MemoryStore::new();
        for id in ["", "../etc", "a b", "x/y", "ü"] {
            assert!(matches!(
                store.save(id, &Profile::default()),
                Err(PersistenceError::InvalidUserId(_))
            ));
        }
        assert!(store.save("Player_1-b", &Profile::default()).is_ok());
    }

    #[test]
    fn test_file_store_missing_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        assert_eq!(store.fetch("nobody").unwrap(), Profile::default());
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = JsonFileStore::open(dir.path()).unwrap();
            store.record_run("alice", &report(7, 1500.0, 9)).unwrap();
        }
        let store = JsonFileStore::open(dir.path()).unwrap();
        let profile = store.fetch("alice").unwrap();
        assert_eq!(profile.high_score, 1500.0);
        assert_eq!(profile.total_coins, 9);
        assert_eq!(profile.recent_runs, vec![7]);
        assert!(!dir.path().join("alice.json.tmp").exists());
    }

    #[test]
    fn test_file_store_corrupt_json() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("alice.json"), "{not json").unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        assert!(matches!(store.fetch("alice"), Err(PersistenceError::Json(_))));
    }

    #[test]
    fn test_file_store_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("profiles").join("v1");
        let mut store = JsonFileStore::open(&nested).unwrap();
        store.save("alice", &Profile::default()).unwrap();
        assert!(nested.join("alice.json").exists());
    }
}
