//! Error type for `folio-store-sqlite`.

use folio_core::view::ViewId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A `view_access` row whose columns do not describe a valid grant.
  #[error("malformed access grant on view {view}: {reason}")]
  MalformedGrant { view: ViewId, reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
