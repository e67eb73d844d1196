pub mod audit;
pub mod auth;
pub mod cache;
pub mod cli;
pub mod config;
pub mod fetcher;
pub mod import;
pub mod login_page;
pub mod logging;
pub mod migrate;
pub mod network;
pub mod records;

// Re-export main types for library usage
pub use audit::{AuditRow, AuditWriter};
pub use auth::{AuthError, Authenticator, Credentials};
pub use cache::{CacheError, CanonicalUrlCache};
pub use fetcher::{resolve_canonical, FetchError, FetchOptions, FetchOutcome};
pub use import::{ImportDocument, ImportOptions, JsonlSectionSink, SectionSink, SpeechRecord};
pub use migrate::{MigrateError, MigrationConfig, MigrationSummary};
pub use network::{HttpClient, PageResponse, Transport, TransportError};
pub use records::{CommitteeRecord, JsonRecordStore, RecordStore};
