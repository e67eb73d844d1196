//! CSV audit trail for the URL migration.
//!
//! Exactly one row per processed record, whether or not anything was
//! rewritten; rows reach disk incrementally so a crash mid-batch still
//! leaves the trail for everything processed so far.

use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

/// One audit row. Field order is the CSV column order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditRow {
    pub committee: String,
    pub meeting_date: String,
    pub original_meeting_url: String,
    pub legacy_meeting_url: String,
    pub canonical_meeting_url: String,
    pub committee_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("Failed to create audit file {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write audit row: {0}")]
    Write(#[from] csv::Error),

    #[error("Failed to flush audit file: {0}")]
    Flush(#[from] std::io::Error),
}

/// Incremental CSV writer; the header goes out with the first row.
pub struct AuditWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl AuditWriter<std::fs::File> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, AuditError> {
        let file = std::fs::File::create(path.as_ref()).map_err(|source| AuditError::Create {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        Ok(Self::from_writer(file))
    }
}

impl<W: Write> AuditWriter<W> {
    pub fn from_writer(writer: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(writer),
        }
    }

    pub fn write_row(&mut self, row: &AuditRow) -> Result<(), AuditError> {
        self.writer.serialize(row)?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W, AuditError> {
        self.writer
            .into_inner()
            .map_err(|e| AuditError::Flush(e.into_error()))
    }
}
