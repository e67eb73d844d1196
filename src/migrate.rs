//! Migration driver: rewrite pre-cutoff meeting URLs to the legacy host and
//! resolve each legacy URL to its canonical form.
//!
//! Every record produces exactly one audit row. Per-URL fetch failures are
//! logged skips; only authentication failure and cache/record/audit file I/O
//! abort the run. The canonical-URL cache is loaded before the loop and
//! flushed exactly once afterwards, on success and error paths alike.

use chrono::NaiveDate;
use std::io::Write;
use std::path::PathBuf;
use tracing::{error, info, warn};
use url::Url;

use crate::audit::{AuditError, AuditRow, AuditWriter};
use crate::auth::{AuthError, Authenticator};
use crate::cache::{CacheError, CanonicalUrlCache};
use crate::config::Config;
use crate::fetcher::{resolve_canonical, FetchError, FetchOptions};
use crate::network::Transport;
use crate::records::{CommitteeRecord, RecordError, RecordStore};

#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Records(#[from] RecordError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Audit(#[from] AuditError),
}

#[derive(Debug, Clone)]
pub struct MigrationConfig {
    /// Actually persist rewritten records; otherwise only report.
    pub commit: bool,
    /// Meetings on or after this date are left untouched.
    pub cutoff: NaiveDate,
    pub csv_path: PathBuf,
    pub cache_path: PathBuf,
    pub fetch_options: FetchOptions,
}

impl MigrationConfig {
    pub fn cutoff_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(Config::CUTOFF_YEAR, Config::CUTOFF_MONTH, Config::CUTOFF_DAY)
            .expect("Invalid cutoff date constants")
    }
}

fn has_host(url: &str, host: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h == host))
        .unwrap_or(false)
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationSummary {
    pub processed: usize,
    pub rewritten: usize,
    pub resolved: usize,
    pub missing_date: usize,
    pub after_cutoff: usize,
    pub broken: usize,
}

/// Run the full migration: authenticate, load cache and records, process
/// every record, then flush the cache and (under --commit) save the records
/// - both of the latter run even when the loop failed partway.
pub async fn run<T, S>(
    config: &MigrationConfig,
    store: &S,
    transport: &T,
    authenticator: &Authenticator,
) -> Result<MigrationSummary, MigrateError>
where
    T: Transport + ?Sized,
    S: RecordStore,
{
    authenticator.authenticate(transport).await?;

    let mut records = store.load()?;
    let mut cache = CanonicalUrlCache::load(&config.cache_path)?;
    let mut audit = AuditWriter::create(&config.csv_path)?;

    let loop_result = process_records(
        config,
        &mut records,
        &mut cache,
        &mut audit,
        transport,
        authenticator,
    )
    .await;

    let flush_result = cache.flush();
    let save_result = if config.commit {
        store.save(&records)
    } else {
        Ok(())
    };

    if loop_result.is_err() {
        // The loop's error is the one we report; cleanup failures on this
        // path can only be logged.
        if let Err(e) = &flush_result {
            error!(error = %e, "Cache flush failed after aborted run");
        }
        if let Err(e) = &save_result {
            error!(error = %e, "Record save failed after aborted run");
        }
    }

    let summary = loop_result?;
    flush_result?;
    save_result?;

    info!(
        processed = summary.processed,
        rewritten = summary.rewritten,
        resolved = summary.resolved,
        broken = summary.broken,
        "Migration complete"
    );
    Ok(summary)
}

async fn process_records<T, W>(
    config: &MigrationConfig,
    records: &mut [CommitteeRecord],
    cache: &mut CanonicalUrlCache,
    audit: &mut AuditWriter<W>,
    transport: &T,
    authenticator: &Authenticator,
) -> Result<MigrationSummary, MigrateError>
where
    T: Transport + ?Sized,
    W: Write,
{
    let mut summary = MigrationSummary::default();

    for record in records.iter_mut() {
        summary.processed += 1;

        let mut row = AuditRow {
            committee: record.committee.clone(),
            committee_url: record.committee_url.clone(),
            meeting_date: record
                .meeting_date
                .map(|d| d.to_string())
                .unwrap_or_default(),
            original_meeting_url: record.meeting_url.clone(),
            ..AuditRow::default()
        };

        let Some(meeting_date) = record.meeting_date else {
            warn!(id = record.id, "No meeting_date found, skipping");
            summary.missing_date += 1;
            audit.write_row(&row)?;
            continue;
        };

        if meeting_date >= config.cutoff {
            summary.after_cutoff += 1;
            audit.write_row(&row)?;
            continue;
        }

        // Rewrite any old URLs to refer to the legacy site
        let mut effective_url = record.meeting_url.clone();
        if has_host(&record.meeting_url, Config::CURRENT_HOST) {
            let legacy_url = record
                .meeting_url
                .replace(Config::CURRENT_HOST, Config::LEGACY_HOST);
            row.legacy_meeting_url = legacy_url.clone();
            summary.rewritten += 1;
            if config.commit {
                info!(id = record.id, old = %record.meeting_url, new = %legacy_url, "Rewriting meeting URL");
                record.meeting_url = legacy_url.clone();
            } else {
                info!(id = record.id, to = %legacy_url, "Would rewrite meeting URL if --commit was specified");
            }
            effective_url = legacy_url;
        }

        // Resolve the legacy URL to its canonical form
        if has_host(&effective_url, Config::LEGACY_HOST) {
            match resolve_canonical(
                &effective_url,
                cache,
                transport,
                authenticator,
                &config.fetch_options,
            )
            .await
            {
                Ok(Some(canonical)) => {
                    info!(id = record.id, %canonical, "Maps to canonical URL");
                    row.canonical_meeting_url = canonical.clone();
                    summary.resolved += 1;
                    if canonical != record.canonical_meeting_url {
                        if config.commit {
                            record.canonical_meeting_url = canonical;
                        } else {
                            info!(
                                id = record.id,
                                "Would set canonical URL if --commit was specified"
                            );
                        }
                    }
                }
                Ok(None) => {
                    summary.broken += 1;
                }
                Err(FetchError::Auth(e)) => return Err(e.into()),
                Err(e @ FetchError::NoResponse { .. }) => {
                    // Keep the batch going; the row records the miss.
                    warn!(id = record.id, error = %e, "Skipping record");
                    summary.broken += 1;
                }
            }
        }

        audit.write_row(&row)?;
    }

    Ok(summary)
}
