//! Bulk indexing for Folio views.
//!
//! Turns every view in a [`ViewStore`](folio_core::store::ViewStore) into a
//! search-engine bulk request body. The `folio-indexer` binary wires this to
//! configuration, the SQLite store and the read API.

pub mod bulk;
pub mod config;
pub mod reindex;

pub use config::IndexerConfig;
pub use reindex::{ReindexOptions, ReindexReport, reindex};
