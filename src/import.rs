//! Import of structured proceeding documents (speeches grouped under
//! hierarchical sections) from JSON files.
//!
//! The persistence side is the [`SectionSink`] collaborator; this module
//! owns parsing the document shape and shaping speeches (visibility,
//! display names, date fallbacks) before handing them over.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A proceeding document as found on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportDocument {
    #[serde(default)]
    pub parent_section_titles: Vec<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub public: Option<bool>,
    #[serde(default)]
    pub premium: bool,
    #[serde(default)]
    pub report_url: String,
    #[serde(default)]
    pub speeches: Vec<SpeechEntry>,
}

/// One speech as found in the document.
#[derive(Debug, Clone, Deserialize)]
pub struct SpeechEntry {
    pub personname: String,
    #[serde(default)]
    pub party: String,
    pub text: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A speech shaped for persistence.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SpeechRecord {
    pub speaker_name: String,
    pub speaker_display: String,
    pub party: String,
    pub text: String,
    pub public: bool,
    pub title: String,
    pub location: String,
    pub event: String,
    pub source_url: String,
    // Speeches do not span days
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub tags: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Failed to read document {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse document {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to persist section: {0}")]
    Sink(String),
}

/// Consumer of imported sections: an ordered path of section titles plus
/// the section's speeches, in document order.
pub trait SectionSink {
    fn persist_section(
        &mut self,
        titles: &[String],
        speeches: &[SpeechRecord],
    ) -> Result<(), ImportError>;
}

/// Sink that writes each persisted section as one JSON line.
pub struct JsonlSectionSink<W: Write> {
    writer: W,
}

#[derive(Debug, Serialize)]
struct SectionLine<'a> {
    section_path: &'a [String],
    speeches: &'a [SpeechRecord],
}

impl<W: Write> JsonlSectionSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> SectionSink for JsonlSectionSink<W> {
    fn persist_section(
        &mut self,
        titles: &[String],
        speeches: &[SpeechRecord],
    ) -> Result<(), ImportError> {
        let line = SectionLine {
            section_path: titles,
            speeches,
        };
        serde_json::to_writer(&mut self.writer, &line)
            .map_err(|e| ImportError::Sink(e.to_string()))?;
        self.writer
            .write_all(b"\n")
            .map_err(|e| ImportError::Sink(e.to_string()))?;
        Ok(())
    }
}

/// Importer options: `limit` caps speeches per section (0 = no cap),
/// `commit` gates whether the sink is invoked at all.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub commit: bool,
    pub limit: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            commit: true,
            limit: 0,
        }
    }
}

pub fn import_path<P: AsRef<Path>, S: SectionSink>(
    path: P,
    sink: &mut S,
    options: &ImportOptions,
) -> Result<Vec<String>, ImportError> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|source| ImportError::Read {
        path: path.as_ref().to_path_buf(),
        source,
    })?;
    let document: ImportDocument =
        serde_json::from_str(&contents).map_err(|source| ImportError::Parse {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
    import_document(&document, sink, options)
}

/// Import one document. Returns the full section title path.
pub fn import_document<S: SectionSink>(
    document: &ImportDocument,
    sink: &mut S,
    options: &ImportOptions,
) -> Result<Vec<String>, ImportError> {
    // Section title: the document title, falling back to the organization
    let section_title = if document.title.is_empty() {
        document.organization.clone()
    } else {
        document.title.clone()
    };

    let mut titles = document.parent_section_titles.clone();
    titles.push(section_title);

    // Premium documents default to private
    let public = document.public.unwrap_or(!document.premium);

    let mut speeches = Vec::new();
    for entry in &document.speeches {
        if options.limit > 0 && speeches.len() >= options.limit {
            debug!(limit = options.limit, "Speech limit reached");
            break;
        }

        let mut display_name = entry.personname.clone();
        if !entry.party.is_empty() {
            display_name = format!("{} ({})", display_name, entry.party);
        }

        let start_date = entry.date.or(document.date);

        speeches.push(SpeechRecord {
            speaker_name: entry.personname.clone(),
            speaker_display: display_name,
            party: entry.party.clone(),
            text: entry.text.clone(),
            public,
            title: entry.title.clone(),
            location: entry.location.clone(),
            event: entry.event.clone(),
            source_url: entry
                .source_url
                .clone()
                .unwrap_or_else(|| document.report_url.clone()),
            start_date,
            end_date: start_date,
            tags: entry.tags.clone(),
        });
    }

    if options.commit {
        sink.persist_section(&titles, &speeches)?;
        info!(
            section = %titles.join(" / "),
            speeches = speeches.len(),
            "Imported section"
        );
    } else {
        info!(
            section = %titles.join(" / "),
            speeches = speeches.len(),
            "Would import section if --commit was specified"
        );
    }

    Ok(titles)
}
