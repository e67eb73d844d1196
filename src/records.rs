//! Committee meeting records and their persistence boundary.
//!
//! The live system keeps these in a relational store; here the boundary is
//! the [`RecordStore`] trait, with a JSON-file implementation for batch
//! runs. The migration driver only reads the full set and (under --commit)
//! writes the full set back.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One committee meeting report record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommitteeRecord {
    pub id: u64,
    #[serde(default)]
    pub committee: String,
    #[serde(default)]
    pub committee_url: String,
    #[serde(default)]
    pub meeting_date: Option<NaiveDate>,
    #[serde(default)]
    pub meeting_url: String,
    #[serde(default)]
    pub canonical_meeting_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Failed to read records from {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse records in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to write records to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Persistence seam for the record set.
pub trait RecordStore {
    fn load(&self) -> Result<Vec<CommitteeRecord>, RecordError>;

    /// Persist the (possibly rewritten) record set. Only called when the
    /// run was started with --commit.
    fn save(&self, records: &[CommitteeRecord]) -> Result<(), RecordError>;
}

/// Record store over a JSON array file.
#[derive(Debug)]
pub struct JsonRecordStore {
    path: PathBuf,
}

impl JsonRecordStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl RecordStore for JsonRecordStore {
    fn load(&self) -> Result<Vec<CommitteeRecord>, RecordError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|source| RecordError::Read {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| RecordError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, records: &[CommitteeRecord]) -> Result<(), RecordError> {
        let json = serde_json::to_string_pretty(records)?;
        std::fs::write(&self.path, json).map_err(|source| RecordError::Write {
            path: self.path.clone(),
            source,
        })
    }
}
