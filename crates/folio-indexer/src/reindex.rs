//! Bulk reindexing: fetch views with bounded concurrency and write each
//! bulk entry as soon as its turn in view-id order comes up.
//!
//! At most `concurrency` documents are held at once, however many views the
//! run covers. A view whose fetch keeps failing is reported and left out; it
//! never stops the rest of the run.

use std::{io::Write, time::Duration};

use anyhow::Context as _;
use chrono::Utc;
use folio_core::{
  document::IndexDocument, pipeline::index_document, store::ViewStore,
  view::ViewId,
};
use futures::{StreamExt as _, stream};

use crate::{bulk, config::IndexerConfig};

/// Knobs for a single reindex run.
#[derive(Debug, Clone)]
pub struct ReindexOptions {
  pub index_name:   String,
  /// Upper bound on views fetched at once; `0` is treated as `1`.
  pub concurrency:  usize,
  /// Tries per view; `0` is treated as `1`.
  pub max_attempts: u32,
  /// Delay before retry `n` is `backoff * n`.
  pub backoff:      Duration,
}

impl From<&IndexerConfig> for ReindexOptions {
  fn from(cfg: &IndexerConfig) -> Self {
    Self {
      index_name:   cfg.index_name.clone(),
      concurrency:  cfg.concurrency,
      max_attempts: cfg.max_attempts,
      backoff:      Duration::from_millis(250),
    }
  }
}

/// Outcome of a reindex run.
#[derive(Debug, Default)]
pub struct ReindexReport {
  pub indexed: usize,
  /// Views that no longer existed when fetched.
  pub missing: Vec<ViewId>,
  /// Views whose fetch failed on every attempt, with the last error.
  pub failed:  Vec<(ViewId, String)>,
}

impl ReindexReport {
  pub fn is_complete(&self) -> bool { self.failed.is_empty() }
}

/// Index `ids` from `store`, writing bulk entries to `out` in id order.
///
/// Returns `Err` only when the output cannot be written; per-view fetch
/// failures are collected in the report.
pub async fn reindex<S, W>(
  store: &S,
  mut ids: Vec<ViewId>,
  opts: &ReindexOptions,
  out: &mut W,
) -> anyhow::Result<ReindexReport>
where
  S: ViewStore,
  W: Write,
{
  ids.sort_unstable();
  ids.dedup();
  let attempts = opts.max_attempts.max(1);
  let backoff = opts.backoff;

  let mut fetched = stream::iter(ids)
    .map(move |id| async move {
      (id, fetch_with_retry(store, id, attempts, backoff).await)
    })
    .buffered(opts.concurrency.max(1));

  let mut report = ReindexReport::default();
  while let Some((id, result)) = fetched.next().await {
    match result {
      Ok(Some(doc)) => {
        bulk::write_entry(out, &opts.index_name, &doc)
          .with_context(|| format!("failed to write document for view {id}"))?;
        report.indexed += 1;
      }
      Ok(None) => {
        tracing::warn!(view = id, "view disappeared before indexing");
        report.missing.push(id);
      }
      Err(e) => {
        tracing::error!(view = id, error = %e, "view not indexed");
        report.failed.push((id, e.to_string()));
      }
    }
  }

  tracing::info!(
    indexed = report.indexed,
    missing = report.missing.len(),
    failed = report.failed.len(),
    "reindex finished"
  );
  Ok(report)
}

async fn fetch_with_retry<S: ViewStore>(
  store: &S,
  id: ViewId,
  attempts: u32,
  backoff: Duration,
) -> folio_core::Result<Option<IndexDocument>> {
  let mut attempt = 1;
  loop {
    match index_document(store, id, Utc::now()).await {
      Err(e) if attempt < attempts => {
        tracing::warn!(view = id, attempt, error = %e, "fetch failed, retrying");
        tokio::time::sleep(backoff * attempt).await;
        attempt += 1;
      }
      result => return result,
    }
  }
}
