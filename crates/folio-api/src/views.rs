//! Handlers for `/views/{id}` and friends.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use chrono::Utc;
use folio_core::{
  Error,
  access::AccessDescriptor,
  document::{IndexDocument, ViewDetail},
  pipeline::{fetch_access, index_document, view_detail},
  store::ViewStore,
  view::ViewId,
};

use crate::error::ApiError;

fn not_found(id: ViewId) -> ApiError { ApiError::NotFound(format!("view {id}")) }

/// `GET /views/{id}`: the view with its tags and resolved owner.
pub async fn detail<S: ViewStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<ViewId>,
) -> Result<Json<ViewDetail>, ApiError> {
  view_detail(store.as_ref(), id)
    .await?
    .map(Json)
    .ok_or_else(|| not_found(id))
}

/// `GET /views/{id}/document`: the document as it would be indexed now.
pub async fn document<S: ViewStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<ViewId>,
) -> Result<Json<IndexDocument>, ApiError> {
  index_document(store.as_ref(), id, Utc::now())
    .await?
    .map(Json)
    .ok_or_else(|| not_found(id))
}

/// `GET /views/{id}/access`: the normalized access descriptor alone.
pub async fn access<S: ViewStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<ViewId>,
) -> Result<Json<AccessDescriptor>, ApiError> {
  let exists = store
    .get_view(id)
    .await
    .map_err(|e| Error::fetch(id, "view", e))?
    .is_some();
  if !exists {
    return Err(not_found(id));
  }

  Ok(Json(fetch_access(store.as_ref(), id, Utc::now()).await?))
}
