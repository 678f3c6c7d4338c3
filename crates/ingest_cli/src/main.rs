//! `ingest`: import web pages, feeds, read-later articles and e-books into a
//! directory-backed store.
mod terminal;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ingest_core::{BatchOutcome, Settings};
use ingest_engine::{
    load_settings, Collaborators, DirectoryStore, DocumentFetcher, EbookAdapter, FeedAdapter,
    FetchSettings, Fetcher, Importer, PocketClient, ReadLaterAdapter, ReqwestFetcher, Sanitizer,
    SourceLogStore, SETTINGS_FILENAME,
};
use ingest_logging::{ingest_debug, ingest_info, LogDestination};
use log::LevelFilter;

use crate::terminal::TerminalUi;

#[derive(Debug, Parser)]
#[command(name = "ingest", version, about = "Import web content as study documents")]
struct Cli {
    /// Store root; holds the decks, media and the source log.
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    /// Settings file (RON). Defaults to `<data-dir>/settings.ron`.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Also write the log to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Select every candidate and the first priority without prompting.
    #[arg(short, long)]
    yes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Import a single web page.
    Page {
        url: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        priority: Option<String>,
    },
    /// Import a local HTML file and its images.
    File {
        path: PathBuf,
        /// Citation text and tag.
        #[arg(long)]
        title: String,
        /// Document title; defaults to the page title.
        #[arg(long)]
        front: Option<String>,
        #[arg(long)]
        priority: Option<String>,
    },
    /// Import new entries from an RSS or Atom feed.
    Feed {
        url: String,
        #[arg(long)]
        priority: Option<String>,
    },
    /// Import unread articles from Pocket.
    Pocket {
        #[arg(long)]
        priority: Option<String>,
    },
    /// Import chapters from an EPUB file.
    Epub {
        path: PathBuf,
        #[arg(long)]
        priority: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let settings_path = cli
        .settings
        .clone()
        .unwrap_or_else(|| cli.data_dir.join(SETTINGS_FILENAME));
    let settings = load_settings(&settings_path)
        .with_context(|| format!("loading settings from {}", settings_path.display()))?;
    ingest_debug!("settings: {:?}", settings);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    runtime.block_on(run(cli, settings))
}

fn init_logging(cli: &Cli) {
    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let destination = match &cli.log_file {
        Some(path) => LogDestination::Both(path.clone()),
        None => LogDestination::Terminal,
    };
    ingest_logging::initialize(destination, level);
}

async fn run(cli: Cli, settings: Settings) -> Result<()> {
    let fetch_settings = FetchSettings::from_settings(&settings);
    let fetcher: Arc<dyn Fetcher> = Arc::new(ReqwestFetcher::new(fetch_settings.clone()));
    let documents = DocumentFetcher::new(fetcher.clone(), Sanitizer::new(&settings.bad_tags));
    let store = Arc::new(DirectoryStore::new(&cli.data_dir, &settings));
    let ui = Arc::new(TerminalUi::new(cli.yes));
    let collaborators = Collaborators {
        selector: ui.clone(),
        progress: ui.clone(),
        notifier: ui,
    };
    let importer = Importer::new(settings.clone(), documents, store, collaborators);

    match cli.command {
        Command::Page {
            url,
            title,
            priority,
        } => {
            importer.import_webpage(&url, priority, title).await?;
        }
        Command::File {
            path,
            title,
            front,
            priority,
        } => {
            let deck = importer.import_local_file(&path, priority, front, &title)?;
            println!("Added to deck: {deck}");
        }
        Command::Feed { url, priority } => {
            import_feed(&importer, &cli.data_dir, fetcher, &url, priority).await?;
        }
        Command::Pocket { priority } => {
            let Some(credentials) = settings.pocket.clone() else {
                bail!("no Pocket credentials in the settings file");
            };
            let client = PocketClient::new(credentials, &fetch_settings)?;
            let mut adapter = ReadLaterAdapter::new(Arc::new(client), settings.pocket_archive);
            report(importer.run_batch(&mut adapter, priority).await);
        }
        Command::Epub { path, priority } => {
            let mut adapter = EbookAdapter::open(&path)?;
            report(importer.run_batch(&mut adapter, priority).await);
        }
    }
    Ok(())
}

/// The feed's seen links and validators are saved after every batch that
/// reached the import loop.
async fn import_feed(
    importer: &Importer,
    data_dir: &Path,
    fetcher: Arc<dyn Fetcher>,
    url: &str,
    priority: Option<String>,
) -> Result<()> {
    let log_store = SourceLogStore::new(data_dir);
    let mut log = log_store.load();
    let mut adapter = FeedAdapter::open(url, fetcher, &mut log)?;

    let outcome = importer.run_batch(&mut adapter, priority).await;
    let completed = matches!(outcome, BatchOutcome::Completed(_));
    report(outcome);

    adapter.store_into(&mut log);
    if completed {
        let path = log_store
            .save(&log)
            .with_context(|| format!("saving source log in {}", data_dir.display()))?;
        ingest_info!("source log saved to {}", path.display());
    }
    Ok(())
}

fn report(outcome: BatchOutcome) {
    match outcome {
        BatchOutcome::Completed(summary) => {
            for (label, err) in &summary.failures {
                ingest_debug!("failed: {} ({})", label, err);
            }
            ingest_info!(
                "{} attempted, {} imported, {} skipped",
                summary.attempted,
                summary.imported,
                summary.skipped
            );
        }
        BatchOutcome::Cancelled => ingest_debug!("nothing selected"),
        BatchOutcome::NothingToImport(_) | BatchOutcome::SourceUnavailable(_) => {}
    }
}
