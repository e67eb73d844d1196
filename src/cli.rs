use clap::{Parser, Subcommand};

use crate::config::Config;

/// CLI entry point for the committee URL migration and hansard import tool.
#[derive(Parser, Debug)]
#[command(name = "hansard-relink")]
#[command(about = "Committee meeting URL migration and hansard JSON import tool")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        long,
        global = true,
        default_value = "./logs",
        help = "Directory for log files"
    )]
    pub log_dir: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rewrite pre-2015 meeting URLs to the legacy host and resolve each
    /// one to its canonical (post-redirect) URL.
    Relink {
        #[arg(short, long, help = "JSON file holding the committee record set")]
        records: String,

        #[arg(long, help = "Actually persist changes to the record set")]
        commit: bool,

        #[arg(
            long,
            default_value = "committee-url-mapping.csv",
            help = "CSV audit trail, one row per record"
        )]
        csv_out: String,

        #[arg(
            long,
            default_value = ".canonical-url-cache",
            help = "Persistent legacy-to-canonical URL cache file"
        )]
        cache_file: String,

        #[arg(
            long,
            default_value = Config::LOGIN_URL,
            help = "Login endpoint on the legacy site"
        )]
        login_url: String,

        #[arg(
            short,
            long,
            default_value = Config::USER_AGENT,
            help = "User agent string for requests"
        )]
        user_agent: String,

        #[arg(
            short,
            long,
            default_value_t = Config::REQUEST_TIMEOUT_SECS,
            help = "Request timeout in seconds"
        )]
        timeout: u64,
    },

    /// Import proceeding documents (sections and speeches) from JSON files.
    Import {
        #[arg(required = true, help = "JSON document files to import")]
        files: Vec<String>,

        #[arg(long, help = "Actually persist imported sections")]
        commit: bool,

        #[arg(
            short,
            long,
            default_value = "sections.jsonl",
            help = "Destination for persisted sections (JSON lines)"
        )]
        out: String,

        #[arg(
            short,
            long,
            default_value_t = 0,
            help = "Cap on speeches per section (0 = no cap)"
        )]
        limit: usize,
    },
}
