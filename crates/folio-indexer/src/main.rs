//! folio-indexer binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! host's SQLite database, and either serves the read API or prints index
//! documents.
//!
//! # Full reindex
//!
//! ```text
//! folio-indexer reindex --output views.ndjson
//! curl -H 'Content-Type: application/x-ndjson' \
//!   --data-binary @views.ndjson http://localhost:9200/_bulk
//! ```

use std::{
  fs::File,
  io::{self, BufWriter, Write},
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use chrono::Utc;
use clap::{Parser, Subcommand};
use folio_core::{
  mapping::view_mapping,
  pipeline::{index_document, view_detail},
  store::ViewStore,
  view::ViewId,
};
use folio_indexer::{IndexerConfig, ReindexOptions, reindex};
use folio_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Folio view indexer")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the JSON read API.
  Serve,
  /// Write bulk index entries for every view, or only the given ones.
  Reindex {
    /// Write to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Restrict to these view ids; repeatable.
    #[arg(long = "view")]
    views:  Vec<ViewId>,
  },
  /// Print one view's index document.
  Show {
    id:     ViewId,
    /// Print the enriched detail view instead.
    #[arg(long)]
    detail: bool,
  },
  /// Print the index mapping.
  Mapping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing on stderr; stdout carries documents.
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  match cli.command {
    Command::Mapping => print_json(&view_mapping()),
    Command::Serve => {
      let (cfg, store) = open(&cli.config).await?;
      serve(store, &cfg).await
    }
    Command::Reindex { output, views } => {
      let (cfg, store) = open(&cli.config).await?;
      run_reindex(store, &cfg, output, views).await
    }
    Command::Show { id, detail } => {
      let (_, store) = open(&cli.config).await?;
      if detail {
        let detail = view_detail(&store, id)
          .await?
          .with_context(|| format!("view {id} not found"))?;
        print_json(&detail)
      } else {
        let doc = index_document(&store, id, Utc::now())
          .await?
          .with_context(|| format!("view {id} not found"))?;
        print_json(&doc)
      }
    }
  }
}

/// Load configuration and open the SQLite store it names.
async fn open(config: &Path) -> anyhow::Result<(IndexerConfig, SqliteStore)> {
  let cfg = IndexerConfig::load(config)?;
  let store_path = cfg.resolved_store_path();
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  Ok((cfg, store))
}

async fn serve(store: SqliteStore, cfg: &IndexerConfig) -> anyhow::Result<()> {
  let app = folio_api::api_router(Arc::new(store)).layer(TraceLayer::new_for_http());
  let address = cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;
  Ok(())
}

async fn run_reindex(
  store: SqliteStore,
  cfg: &IndexerConfig,
  output: Option<PathBuf>,
  views: Vec<ViewId>,
) -> anyhow::Result<()> {
  let ids = if views.is_empty() {
    store.list_view_ids().await.context("failed to list views")?
  } else {
    views
  };

  let mut out: Box<dyn Write> = match &output {
    Some(path) => Box::new(BufWriter::new(
      File::create(path).with_context(|| format!("failed to create {path:?}"))?,
    )),
    None => Box::new(BufWriter::new(io::stdout().lock())),
  };

  let opts = ReindexOptions::from(cfg);
  let report = reindex(&store, ids, &opts, &mut out).await?;
  out.flush().context("failed to flush output")?;

  if !report.is_complete() {
    anyhow::bail!("{} view(s) could not be indexed", report.failed.len());
  }
  Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let mut stdout = io::stdout().lock();
  serde_json::to_writer_pretty(&mut stdout, value)?;
  writeln!(stdout)?;
  Ok(())
}
