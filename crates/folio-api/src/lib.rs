//! JSON read API over the Folio view indexer.
//!
//! Exposes an axum [`Router`] backed by any [`folio_core::store::ViewStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", folio_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod views;

use std::sync::Arc;

use axum::{Json, Router, routing::get};
use folio_core::{mapping::view_mapping, store::ViewStore};

pub use error::ApiError;

/// Build the API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ViewStore + 'static,
{
  Router::new()
    .route("/views/{id}", get(views::detail::<S>))
    .route("/views/{id}/document", get(views::document::<S>))
    .route("/views/{id}/access", get(views::access::<S>))
    .route("/mapping", get(|| async { Json(view_mapping()) }))
    .with_state(store)
}
