use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

use hansard_relink::import::{self, ImportOptions, JsonlSectionSink};
use hansard_relink::migrate::{self, MigrationConfig};
use hansard_relink::records::{JsonRecordStore, RecordStore};
use hansard_relink::{
    Authenticator, CanonicalUrlCache, Credentials, FetchOptions, PageResponse, Transport,
    TransportError,
};

const LOGIN_URL: &str = "http://legacy.pmg.org.za/user/login";

/// A canned legacy site: a login form, a set of content pages, 404 for
/// everything else.
struct FakeLegacySite {
    pages: HashMap<String, PageResponse>,
    gets: Mutex<Vec<String>>,
}

impl FakeLegacySite {
    fn new() -> Self {
        Self {
            pages: HashMap::new(),
            gets: Mutex::new(Vec::new()),
        }
    }

    fn serve(&mut self, url: &str, final_url: &str, body: &str) {
        self.pages.insert(
            url.to_string(),
            PageResponse {
                status: 200,
                final_url: final_url.to_string(),
                body: body.to_string(),
            },
        );
    }

    fn content_gets(&self) -> Vec<String> {
        self.gets
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.as_str() != LOGIN_URL)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Transport for FakeLegacySite {
    async fn get(&self, url: &str) -> Result<PageResponse, TransportError> {
        self.gets.lock().unwrap().push(url.to_string());
        if url == LOGIN_URL {
            return Ok(PageResponse {
                status: 200,
                final_url: url.to_string(),
                body: r#"<form name="login_user_form">
                        <input name="email" value=""><input name="password" value="">
                    </form>"#
                    .to_string(),
            });
        }
        Ok(self.pages.get(url).cloned().unwrap_or(PageResponse {
            status: 404,
            final_url: url.to_string(),
            body: "Not found".to_string(),
        }))
    }

    async fn post_form(
        &self,
        url: &str,
        _fields: &[(String, String)],
    ) -> Result<PageResponse, TransportError> {
        Ok(PageResponse {
            status: 200,
            final_url: url.to_string(),
            body: "Welcome".to_string(),
        })
    }
}

fn authenticator() -> Authenticator {
    Authenticator::new(
        LOGIN_URL.to_string(),
        Credentials {
            email: "user@example.org".to_string(),
            password: "hunter2".to_string(),
        },
    )
}

#[tokio::test]
async fn test_migration_end_to_end() {
    let dir = TempDir::new().unwrap();

    let records_path = dir.path().join("records.json");
    std::fs::write(
        &records_path,
        r#"[
            {
                "id": 1,
                "committee": "Agriculture",
                "committee_url": "http://www.pmg.org.za/committees/Agriculture",
                "meeting_date": "2014-03-01",
                "meeting_url": "http://www.pmg.org.za/x"
            },
            {
                "id": 2,
                "committee": "Health",
                "committee_url": "http://www.pmg.org.za/committees/Health",
                "meeting_date": "2015-06-01",
                "meeting_url": "http://www.pmg.org.za/y"
            }
        ]"#,
    )
    .unwrap();

    let mut site = FakeLegacySite::new();
    site.serve(
        "http://legacy.pmg.org.za/x",
        "http://legacy.pmg.org.za/node/1234",
        "<h1>Committee Report</h1>",
    );

    let config = MigrationConfig {
        commit: true,
        cutoff: MigrationConfig::cutoff_date(),
        csv_path: dir.path().join("audit.csv"),
        cache_path: dir.path().join("cache.json"),
        fetch_options: FetchOptions {
            max_attempts: 3,
            courtesy_delay: Duration::ZERO,
        },
    };
    let store = JsonRecordStore::new(&records_path);

    let summary = migrate::run(&config, &store, &site, &authenticator())
        .await
        .unwrap();

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.rewritten, 1);
    assert_eq!(summary.resolved, 1);

    // The 2015-06-01 record was left untouched: no rewrite, no fetch
    assert_eq!(site.content_gets(), vec!["http://legacy.pmg.org.za/x"]);

    // The record set on disk carries the rewrite and the canonical URL
    let records = store.load().unwrap();
    assert_eq!(records[0].meeting_url, "http://legacy.pmg.org.za/x");
    assert_eq!(
        records[0].canonical_meeting_url,
        "http://legacy.pmg.org.za/node/1234"
    );
    assert_eq!(records[1].meeting_url, "http://www.pmg.org.za/y");
    assert_eq!(records[1].canonical_meeting_url, "");

    // Audit: header plus one row per record, with legacy and canonical URLs
    // populated for the rewritten one
    let csv = std::fs::read_to_string(dir.path().join("audit.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("Agriculture,2014-03-01,http://www.pmg.org.za/x,"));
    assert!(lines[1].contains(",http://legacy.pmg.org.za/x,http://legacy.pmg.org.za/node/1234,"));
    assert!(lines[2].starts_with("Health,2015-06-01,http://www.pmg.org.za/y,,,"));

    // The cache file holds the resolved mapping for the next run
    let cache = CanonicalUrlCache::load(dir.path().join("cache.json")).unwrap();
    assert_eq!(
        cache.get("http://legacy.pmg.org.za/x"),
        Some("http://legacy.pmg.org.za/node/1234")
    );
}

#[tokio::test]
async fn test_migration_survives_broken_urls() {
    let dir = TempDir::new().unwrap();

    let records_path = dir.path().join("records.json");
    std::fs::write(
        &records_path,
        r#"[
            {"id": 1, "meeting_date": "2014-03-01", "meeting_url": "http://www.pmg.org.za/gone"},
            {"id": 2, "meeting_date": "2014-04-01", "meeting_url": "http://www.pmg.org.za/x"}
        ]"#,
    )
    .unwrap();

    let mut site = FakeLegacySite::new();
    // Only the second record's legacy URL resolves; the first 404s
    site.serve(
        "http://legacy.pmg.org.za/x",
        "http://legacy.pmg.org.za/node/1",
        "<h1>Committee Report</h1>",
    );

    let config = MigrationConfig {
        commit: false,
        cutoff: MigrationConfig::cutoff_date(),
        csv_path: dir.path().join("audit.csv"),
        cache_path: dir.path().join("cache.json"),
        fetch_options: FetchOptions {
            max_attempts: 3,
            courtesy_delay: Duration::ZERO,
        },
    };
    let store = JsonRecordStore::new(&records_path);

    let summary = migrate::run(&config, &store, &site, &authenticator())
        .await
        .unwrap();

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.broken, 1);
    assert_eq!(summary.resolved, 1);

    // Both records got audit rows; only the resolvable one has a canonical URL
    let csv = std::fs::read_to_string(dir.path().join("audit.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(!lines[1].contains("node"));
    assert!(lines[2].contains("http://legacy.pmg.org.za/node/1"));

    // The 404 was never cached
    let cache = CanonicalUrlCache::load(dir.path().join("cache.json")).unwrap();
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_import_end_to_end() {
    let dir = TempDir::new().unwrap();
    let doc_path = dir.path().join("report.json");
    std::fs::write(
        &doc_path,
        r#"{
            "parent_section_titles": ["Committee Minutes", "2013"],
            "title": "Meat inspection services",
            "organization": "Agriculture, Forestry and Fisheries",
            "date": "2013-06-21",
            "public": true,
            "report_url": "http://www.pmg.org.za/report/20130621-meat-inspection",
            "speeches": [
                {"personname": "M Johnson", "party": "ANC", "text": "Chaired the meeting."},
                {"personname": "Ms K Smith", "text": "Noted."}
            ]
        }"#,
    )
    .unwrap();

    let mut sink = JsonlSectionSink::new(Vec::new());
    let titles = import::import_path(&doc_path, &mut sink, &ImportOptions::default()).unwrap();

    assert_eq!(
        titles,
        vec![
            "Committee Minutes".to_string(),
            "2013".to_string(),
            "Meat inspection services".to_string(),
        ]
    );

    let output = String::from_utf8(sink.into_inner()).unwrap();
    let line: serde_json::Value = serde_json::from_str(output.lines().next().unwrap()).unwrap();
    assert_eq!(line["speeches"][0]["speaker_display"], "M Johnson (ANC)");
    assert_eq!(line["speeches"][0]["start_date"], "2013-06-21");
    assert_eq!(
        line["speeches"][1]["source_url"],
        "http://www.pmg.org.za/report/20130621-meat-inspection"
    );
}
