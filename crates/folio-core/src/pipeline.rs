//! Fetch-normalize-assemble for a single view.
//!
//! Each function reads what it needs through a [`ViewStore`] and hands the
//! rows to the pure normalizer and assembler. Store failures come back as
//! [`Error::Fetch`]; a view that does not exist comes back as `None`.

use chrono::{DateTime, Utc};

use crate::{
  Error, Result,
  access::{AccessDescriptor, normalize},
  document::{IndexDocument, ViewDetail, assemble, assemble_detail},
  store::ViewStore,
  view::ViewId,
};

/// Normalized access for `view` as of `at`.
pub async fn fetch_access<S: ViewStore>(
  store: &S,
  view: ViewId,
  at: DateTime<Utc>,
) -> Result<AccessDescriptor> {
  let grants = store
    .access_grants(view, at)
    .await
    .map_err(|e| Error::fetch(view, "access grants", e))?;
  Ok(normalize(&grants))
}

/// The lean index document for `id`, with access evaluated at `at`.
pub async fn index_document<S: ViewStore>(
  store: &S,
  id: ViewId,
  at: DateTime<Utc>,
) -> Result<Option<IndexDocument>> {
  let Some(view) = store
    .get_view(id)
    .await
    .map_err(|e| Error::fetch(id, "view", e))?
  else {
    return Ok(None);
  };

  let tags = store
    .view_tags(id)
    .await
    .map_err(|e| Error::fetch(id, "tags", e))?;
  let access = fetch_access(store, id, at).await?;

  Ok(Some(assemble(view, tags, access)))
}

/// The detail view for `id`. An owner id with no matching user is not an
/// error; the owner fields are simply left out.
pub async fn view_detail<S: ViewStore>(
  store: &S,
  id: ViewId,
) -> Result<Option<ViewDetail>> {
  let Some(view) = store
    .get_view(id)
    .await
    .map_err(|e| Error::fetch(id, "view", e))?
  else {
    return Ok(None);
  };

  let tags = store
    .view_tags(id)
    .await
    .map_err(|e| Error::fetch(id, "tags", e))?;

  let owner = match view.owner_id() {
    Some(user) => store
      .get_user(user)
      .await
      .map_err(|e| Error::fetch(id, "owner", e))?,
    None => None,
  };

  Ok(Some(assemble_detail(view, tags, owner)))
}
