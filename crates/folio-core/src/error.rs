//! Error types for `folio-core`.

use thiserror::Error;

use crate::view::ViewId;

#[derive(Debug, Error)]
pub enum Error {
  /// A read against the backing store failed. The caller must not index the
  /// view with partial access data.
  #[error("failed to fetch {what} for view {view}: {source}")]
  Fetch {
    view:   ViewId,
    what:   &'static str,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  #[error("unknown access type: {0:?}")]
  UnknownAccessKind(String),

  #[error("unknown group role: {0:?}")]
  UnknownGroupRole(String),
}

impl Error {
  pub fn fetch<E>(view: ViewId, what: &'static str, source: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Fetch { view, what, source: Box::new(source) }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
