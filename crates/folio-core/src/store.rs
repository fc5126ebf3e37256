//! The `ViewStore` trait: read access to the host application's views, tags,
//! users and access grants.
//!
//! Implemented by storage backends (e.g. `folio-store-sqlite`). The indexer
//! only ever reads through this trait; access grants are owned and written by
//! the host application.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  access::AccessGrant,
  view::{User, UserId, View, ViewId},
};

/// Read-only view of the host application's store.
///
/// All methods return `Send` futures so bulk indexing can fan out across
/// tokio tasks.
pub trait ViewStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Retrieve a view by id. Returns `None` if not found.
  fn get_view(
    &self,
    id: ViewId,
  ) -> impl Future<Output = Result<Option<View>, Self::Error>> + Send + '_;

  /// Ids of every view, for a full reindex.
  fn list_view_ids(
    &self,
  ) -> impl Future<Output = Result<Vec<ViewId>, Self::Error>> + Send + '_;

  /// Tags attached to a view; empty when it has none.
  fn view_tags(
    &self,
    id: ViewId,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// The grants of `view` that apply at `at`: no start or a start before
  /// `at`, and no end or an end after `at`. Order is unspecified. A malformed
  /// grant row is an error, never silently dropped.
  fn access_grants(
    &self,
    view: ViewId,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<AccessGrant>, Self::Error>> + Send + '_;

  /// Retrieve a user by id. Returns `None` if not found.
  fn get_user(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;
}
