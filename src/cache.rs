//! Persistent legacy URL -> canonical URL cache.
//!
//! On disk this is a single JSON object. It is loaded once at process start
//! (an absent file is an empty cache, never an error) and written back
//! wholesale exactly once at process end, on success and failure paths
//! alike; the driver owns that discipline.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Failed to read cache file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cache file {path} is not a valid JSON object: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to write cache file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize cache: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// In-memory cache of resolved canonical URLs, tied to its on-disk path.
#[derive(Debug)]
pub struct CanonicalUrlCache {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl CanonicalUrlCache {
    /// Load the cache from `path`. A missing file yields an empty cache; a
    /// present but unreadable or malformed file is an error (silently
    /// dropping previously resolved URLs would re-fetch them all).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CacheError> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            debug!(path = %path.display(), "No cache file, starting empty");
            return Ok(Self {
                path,
                entries: HashMap::new(),
            });
        }

        let contents = std::fs::read_to_string(&path).map_err(|source| CacheError::Read {
            path: path.clone(),
            source,
        })?;
        let entries =
            serde_json::from_str(&contents).map_err(|source| CacheError::Parse {
                path: path.clone(),
                source,
            })?;

        let cache = Self { path, entries };
        debug!(path = %cache.path.display(), entries = cache.len(), "Loaded URL cache");
        Ok(cache)
    }

    /// Write the complete mapping back to disk.
    pub fn flush(&self) -> Result<(), CacheError> {
        let json = serde_json::to_string(&self.entries)?;
        std::fs::write(&self.path, json).map_err(|source| CacheError::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), entries = self.len(), "Flushed URL cache");
        Ok(())
    }

    pub fn get(&self, legacy_url: &str) -> Option<&str> {
        self.entries.get(legacy_url).map(String::as_str)
    }

    pub fn contains(&self, legacy_url: &str) -> bool {
        self.entries.contains_key(legacy_url)
    }

    /// Record a fully-resolved canonical URL. Only the fetcher's success
    /// path calls this; partial resolutions are never cached.
    pub fn insert(&mut self, legacy_url: String, canonical_url: String) {
        self.entries.insert(legacy_url, canonical_url);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
