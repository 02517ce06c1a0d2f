//! Timing metrics persistence
//!
//! Appends one (backend, processing_time) observation per pipeline run into a
//! JSON session store keyed backend name -> session key -> metrics. History
//! is append-only: existing sessions are never rewritten, only extended, and
//! unrelated backends' buckets survive every save.
//!
//! Recording is a read-modify-write over the whole file. Two recorders racing
//! on the same store can compute the same session key and one write silently
//! overwrites the other; callers must serialize recording calls.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Backends that get an empty bucket when a fresh store is created
pub const KNOWN_BACKENDS: [&str; 2] = ["rowwise", "columnar"];

/// Metrics recorded for one session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionMetrics {
    /// Pipeline wall-clock duration in seconds
    pub processing_time: f64,
}

/// Durable session store, one bucket of sessions per backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricsStore {
    backends: HashMap<String, BTreeMap<String, SessionMetrics>>,
}

impl MetricsStore {
    /// Load the store from `path`, or initialize one empty bucket per known
    /// backend when the file does not exist yet.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        if !path.exists() {
            debug!("metrics store {} missing, initializing", path.display());
            let backends = KNOWN_BACKENDS
                .iter()
                .map(|name| (name.to_string(), BTreeMap::new()))
                .collect();
            return Ok(Self { backends });
        }

        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Number of sessions recorded for `backend`
    pub fn session_count(&self, backend: &str) -> usize {
        self.backends.get(backend).map_or(0, BTreeMap::len)
    }

    /// Append one timing observation under the next session key and return
    /// that key.
    pub fn append(&mut self, backend: &str, processing_time: f64) -> String {
        let bucket = self.backends.entry(backend.to_string()).or_default();
        let session_key = format!("session_{}", bucket.len() + 1);
        bucket.insert(session_key.clone(), SessionMetrics { processing_time });
        session_key
    }

    /// Sessions for `backend` ordered by session index.
    pub fn sessions(&self, backend: &str) -> Vec<(String, SessionMetrics)> {
        let Some(bucket) = self.backends.get(backend) else {
            return Vec::new();
        };

        let mut sessions: Vec<(String, SessionMetrics)> = bucket
            .iter()
            .map(|(key, metrics)| (key.clone(), *metrics))
            .collect();
        sessions.sort_by_key(|(key, _)| session_index(key));
        sessions
    }

    /// All backend names present in the store, sorted
    pub fn backend_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.backends.keys().cloned().collect();
        names.sort();
        names
    }

    /// Rewrite the whole store to `path`.
    pub fn save(&self, path: &Path) -> Result<(), EngineError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| EngineError::StoreUnwritable {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Numeric suffix of a session key; keys without one sort first.
fn session_index(key: &str) -> u64 {
    key.rsplit('_')
        .next()
        .and_then(|suffix| suffix.parse().ok())
        .unwrap_or(0)
}

/// Record one pipeline timing: load the store, append under the next session
/// key for `backend`, rewrite the file. Returns the new session key.
pub fn record_session(
    path: &Path,
    backend: &str,
    elapsed_seconds: f64,
) -> Result<String, EngineError> {
    let mut store = MetricsStore::load(path)?;
    let session_key = store.append(backend, elapsed_seconds);
    store.save(path)?;
    debug!(
        "recorded {} = {:.3}s for backend {} in {}",
        session_key,
        elapsed_seconds,
        backend,
        path.display()
    );
    Ok(session_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fresh_store_has_known_backend_buckets() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metrics_history.json");

        let store = MetricsStore::load(&path).unwrap();
        for backend in KNOWN_BACKENDS {
            assert_eq!(store.session_count(backend), 0);
        }
        assert_eq!(store.session_count("unknown"), 0);
    }

    #[test]
    fn test_sequential_sessions_get_incrementing_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metrics_history.json");

        assert_eq!(record_session(&path, "x", 1.5).unwrap(), "session_1");
        assert_eq!(record_session(&path, "x", 2.5).unwrap(), "session_2");
        assert_eq!(record_session(&path, "x", 3.5).unwrap(), "session_3");

        let store = MetricsStore::load(&path).unwrap();
        let sessions = store.sessions("x");
        assert_eq!(sessions.len(), 3);
        assert_eq!(sessions[0].0, "session_1");
        assert_eq!(sessions[0].1.processing_time, 1.5);
        assert_eq!(sessions[1].0, "session_2");
        assert_eq!(sessions[1].1.processing_time, 2.5);
        assert_eq!(sessions[2].0, "session_3");
        assert_eq!(sessions[2].1.processing_time, 3.5);
    }

    #[test]
    fn test_unrelated_backend_history_is_preserved() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metrics_history.json");

        record_session(&path, "y", 9.0).unwrap();
        record_session(&path, "x", 1.0).unwrap();
        record_session(&path, "x", 2.0).unwrap();

        let store = MetricsStore::load(&path).unwrap();
        let y_sessions = store.sessions("y");
        assert_eq!(y_sessions.len(), 1);
        assert_eq!(y_sessions[0].0, "session_1");
        assert_eq!(y_sessions[0].1.processing_time, 9.0);
        assert_eq!(store.session_count("x"), 2);
    }

    #[test]
    fn test_session_ordering_is_numeric_not_lexical() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metrics_history.json");

        for i in 0..12 {
            record_session(&path, "x", i as f64).unwrap();
        }

        let store = MetricsStore::load(&path).unwrap();
        let sessions = store.sessions("x");
        // Lexical ordering would put session_10 before session_2.
        assert_eq!(sessions[1].0, "session_2");
        assert_eq!(sessions[9].0, "session_10");
        assert_eq!(sessions[11].0, "session_12");
    }

    #[test]
    fn test_store_roundtrips_through_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metrics_history.json");

        let mut store = MetricsStore::load(&path).unwrap();
        store.append("rowwise", 0.25);
        store.save(&path).unwrap();

        let loaded = MetricsStore::load(&path).unwrap();
        assert_eq!(loaded.session_count("rowwise"), 1);
        assert_eq!(loaded.sessions("rowwise")[0].1.processing_time, 0.25);
        // Known buckets created at init survive the roundtrip even when empty.
        assert!(loaded.backend_names().contains(&"columnar".to_string()));
    }

    #[test]
    fn test_unwritable_store_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("metrics_history.json");

        let store = MetricsStore::default();
        let err = store.save(&path).unwrap_err();
        assert!(matches!(err, EngineError::StoreUnwritable { .. }));
    }
}
