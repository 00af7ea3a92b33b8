//! CLI entry point for the WeRateDogs wrangling run.
//!
//! Provides subcommands for gathering engagement counters from the Twitter
//! API, assessing the raw tables, cleaning and merging them into the master
//! table, and reporting on a previously written master table.

use std::ffi::OsStr;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use weratedogs_wrangle::{
    assess::{Assessment, assess_archive, assess_engagement, assess_images},
    cleaner::{RawTables, clean},
    infra::twitter::{DEFAULT_API_BASE, TwitterClient},
    loader::{
        load_archive, load_images, load_status_file, load_status_lines, tweet_ids_to_query,
        write_status_lines,
    },
    merger::merge,
    output::{gzip_copy, print_json, read_master_csv, write_master_csv},
    report::build_report,
    services::status_api::fetch_statuses,
};

const IMAGE_PREDICTIONS_URL: &str = "https://d17h27t6h515a5.cloudfront.net/topher/2017/August/599fd2ad_image-predictions/image-predictions.tsv";

#[derive(Parser)]
#[command(name = "weratedogs_wrangle")]
#[command(about = "Gather, clean, merge and analyze WeRateDogs tweet data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up engagement counters for every known tweet and save them as JSON lines
    Gather {
        /// Enhanced twitter archive CSV
        #[arg(short, long, default_value = "twitter-archive-enhanced.csv")]
        archive: String,

        /// Image predictions TSV, file path or URL
        #[arg(short, long, default_value = IMAGE_PREDICTIONS_URL)]
        images: String,

        /// JSON-lines file to write raw statuses to
        #[arg(short, long, default_value = "tweet_json.txt")]
        output: String,

        /// Bearer token for the status API
        #[arg(long, env = "TWITTER_BEARER_TOKEN", hide_env_values = true)]
        bearer_token: String,

        /// Base URL of the status API
        #[arg(long, env = "TWITTER_API_BASE", default_value = DEFAULT_API_BASE)]
        api_base: String,
    },
    /// Log data quality diagnostics for the raw tables
    Assess {
        #[arg(short, long, default_value = "twitter-archive-enhanced.csv")]
        archive: String,

        #[arg(short, long, default_value = IMAGE_PREDICTIONS_URL)]
        images: String,

        /// Optional JSON-lines status file to include
        #[arg(short, long)]
        engagement: Option<String>,
    },
    /// Clean and merge the three tables, write the master CSV and report on it
    Wrangle {
        #[arg(short, long, default_value = "twitter-archive-enhanced.csv")]
        archive: String,

        #[arg(short, long, default_value = IMAGE_PREDICTIONS_URL)]
        images: String,

        /// JSON-lines status file written by `gather`
        #[arg(short, long, default_value = "tweet_json.txt")]
        engagement: String,

        /// Master CSV to write
        #[arg(short, long, default_value = "twitter_archive_master.csv")]
        output: String,

        /// Also write a gzip-compressed copy of the master CSV
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Report on a previously written master CSV
    Report {
        #[arg(short, long, default_value = "twitter_archive_master.csv")]
        input: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/weratedogs_wrangle.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("weratedogs_wrangle.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Gather {
            archive,
            images,
            output,
            bearer_token,
            api_base,
        } => {
            gather(&archive, &images, &output, &bearer_token, &api_base).await?;
        }
        Commands::Assess {
            archive,
            images,
            engagement,
        } => {
            let assessment = Assessment {
                archive: assess_archive(&load_archive(&archive)?),
                images: assess_images(&load_images(&images).await?),
                engagement: match engagement {
                    Some(path) => Some(assess_engagement(&load_status_file(&path)?)),
                    None => None,
                },
            };
            print_json(&assessment)?;
        }
        Commands::Wrangle {
            archive,
            images,
            engagement,
            output,
            gzip,
        } => {
            let raw = RawTables {
                archive: load_archive(&archive)?,
                images: load_images(&images).await?,
                engagement: load_status_lines(&engagement)?,
            };

            let cleaned = clean(&raw)?;
            let merged = merge(&cleaned)?;
            if merged.is_empty() {
                warn!("No tweet survived cleaning in all three tables");
            }

            write_master_csv(&output, &merged)?;
            if gzip {
                gzip_copy(&output)?;
            }

            print_json(&build_report(&merged))?;
        }
        Commands::Report { input } => {
            let rows = read_master_csv(&input)?;
            print_json(&build_report(&rows))?;
        }
    }

    Ok(())
}

/// Looks up every archive and image identifier and saves the raw statuses.
#[tracing::instrument(skip(bearer_token))]
async fn gather(
    archive: &str,
    images: &str,
    output: &str,
    bearer_token: &str,
    api_base: &str,
) -> Result<()> {
    let archive = load_archive(archive)?;
    let images = load_images(images).await?;
    let ids = tweet_ids_to_query(&archive, &images);
    info!(ids = ids.len(), "Identifiers to look up");

    let client = TwitterClient::new(bearer_token, api_base)?;
    let outcome = fetch_statuses(&client, &ids).await;

    write_status_lines(BufWriter::new(File::create(output)?), &outcome.statuses)?;
    info!(
        output,
        written = outcome.statuses.len(),
        skipped = outcome.failures.len(),
        "Statuses saved"
    );
    Ok(())
}
