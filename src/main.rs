use clap::Parser;
use std::io::Write;
use thiserror::Error;
use tracing::error;

use hansard_relink::cli::{Cli, Commands};
use hansard_relink::import::{self, ImportOptions, JsonlSectionSink};
use hansard_relink::logging;
use hansard_relink::migrate::{self, MigrationConfig};
use hansard_relink::records::JsonRecordStore;
use hansard_relink::{Authenticator, Credentials, FetchOptions, HttpClient};

#[derive(Error, Debug)]
pub enum MainError {
    #[error("Migration error: {0}")]
    Migrate(#[from] hansard_relink::MigrateError),

    #[error("Authentication error: {0}")]
    Auth(#[from] hansard_relink::AuthError),

    #[error("Network error: {0}")]
    Transport(#[from] hansard_relink::TransportError),

    #[error("Import error: {0}")]
    Import(#[from] hansard_relink::import::ImportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(&cli.log_dir) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(3);
    }

    let result = match cli.command {
        Commands::Relink {
            records,
            commit,
            csv_out,
            cache_file,
            login_url,
            user_agent,
            timeout,
        } => {
            run_relink(
                records, commit, csv_out, cache_file, login_url, user_agent, timeout,
            )
            .await
        }
        Commands::Import {
            files,
            commit,
            out,
            limit,
        } => run_import(files, commit, out, limit),
    };

    if let Err(e) = result {
        error!(error = %e, "Run failed");
        std::process::exit(1);
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_relink(
    records: String,
    commit: bool,
    csv_out: String,
    cache_file: String,
    login_url: String,
    user_agent: String,
    timeout: u64,
) -> Result<(), MainError> {
    let credentials = Credentials::from_env()?;
    let authenticator = Authenticator::new(login_url, credentials);
    let transport = HttpClient::new(&user_agent, timeout)?;
    let store = JsonRecordStore::new(&records);

    let config = MigrationConfig {
        commit,
        cutoff: MigrationConfig::cutoff_date(),
        csv_path: csv_out.into(),
        cache_path: cache_file.into(),
        fetch_options: FetchOptions::default(),
    };

    migrate::run(&config, &store, &transport, &authenticator).await?;
    Ok(())
}

fn run_import(files: Vec<String>, commit: bool, out: String, limit: usize) -> Result<(), MainError> {
    // In a dry run the sink is never reached, so don't create the file
    let writer: Box<dyn Write> = if commit {
        Box::new(std::fs::File::create(&out)?)
    } else {
        Box::new(std::io::sink())
    };
    let mut sink = JsonlSectionSink::new(writer);
    let options = ImportOptions { commit, limit };

    for file in &files {
        import::import_path(file, &mut sink, &options)?;
    }

    Ok(())
}
