//! [`SqliteStore`], the SQLite implementation of [`ViewStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;

use folio_core::{
  access::{AccessGrant, AccessScope},
  store::ViewStore,
  view::{User, UserId, View, ViewId},
};

use crate::{
  Error, Result,
  encode::{RawGrant, RawView, encode_dt, user_from_row},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A view store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Host-side writes ──────────────────────────────────────────────────────
  //
  // The indexer never calls these; they load the host tables for fixtures.

  pub async fn insert_user(&self, user: &User) -> Result<()> {
    let user = user.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (id, username, first_name, last_name, preferred_name)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            user.id,
            user.username,
            user.first_name,
            user.last_name,
            user.preferred_name,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn insert_view(&self, view: &View) -> Result<()> {
    let view = view.clone();
    let created_at = encode_dt(view.created_at);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO views (
             id, title, description, view_type, owner, group_id, institution,
             created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            view.id,
            view.title,
            view.description,
            view.view_type,
            view.owner,
            view.group,
            view.institution,
            created_at,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn insert_tag(&self, view: ViewId, tag: &str) -> Result<()> {
    let tag = tag.to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO view_tags (view_id, tag) VALUES (?1, ?2)",
          rusqlite::params![view, tag],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn insert_grant(&self, grant: &AccessGrant) -> Result<()> {
    let view = grant.view;
    let access_type: &'static str = grant.scope.kind().into();
    let (institution, group_id, role, user_id) = match &grant.scope {
      AccessScope::Public | AccessScope::LoggedIn => (None, None, None, None),
      AccessScope::Institution { institution } => {
        (Some(institution.clone()), None, None, None)
      }
      AccessScope::Group { group, role } => (
        None,
        Some(*group),
        role.map(|r| <&'static str>::from(r).to_owned()),
        None,
      ),
      AccessScope::User { user } => (None, None, None, Some(*user)),
    };
    let valid_from = grant.valid_from.map(encode_dt);
    let valid_until = grant.valid_until.map(encode_dt);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO view_access (
             view_id, access_type, institution, group_id, role, user_id,
             valid_from, valid_until
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            view,
            access_type,
            institution,
            group_id,
            role,
            user_id,
            valid_from,
            valid_until,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run raw SQL against the connection. Tests use this to plant rows the
  /// typed writers refuse to produce.
  #[cfg(test)]
  pub(crate) async fn execute_raw(&self, sql: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── ViewStore impl ──────────────────────────────────────────────────────────

impl ViewStore for SqliteStore {
  type Error = Error;

  async fn get_view(&self, id: ViewId) -> Result<Option<View>> {
    let raw: Option<RawView> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {} FROM views WHERE id = ?1", RawView::COLUMNS),
              rusqlite::params![id],
              RawView::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawView::into_view).transpose()
  }

  async fn list_view_ids(&self) -> Result<Vec<ViewId>> {
    let ids = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT id FROM views ORDER BY id")?;
        let ids = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<ViewId>>>()?;
        Ok(ids)
      })
      .await?;
    Ok(ids)
  }

  async fn view_tags(&self, id: ViewId) -> Result<Vec<String>> {
    let tags = self
      .conn
      .call(move |conn| {
        let mut stmt = conn
          .prepare("SELECT tag FROM view_tags WHERE view_id = ?1 ORDER BY tag")?;
        let tags = stmt
          .query_map(rusqlite::params![id], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(tags)
      })
      .await?;
    Ok(tags)
  }

  async fn access_grants(
    &self,
    view: ViewId,
    at: DateTime<Utc>,
  ) -> Result<Vec<AccessGrant>> {
    let raws: Vec<RawGrant> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM view_access WHERE view_id = ?1",
          RawGrant::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![view], RawGrant::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    // Host rows may carry any RFC 3339 offset; compare instants, not text.
    let mut grants = Vec::with_capacity(raws.len());
    for raw in raws {
      let grant = raw.into_grant()?;
      if grant.is_current_at(at) {
        grants.push(grant);
      }
    }
    Ok(grants)
  }

  async fn get_user(&self, id: UserId) -> Result<Option<User>> {
    let user = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, username, first_name, last_name, preferred_name
               FROM users WHERE id = ?1",
              rusqlite::params![id],
              user_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(user)
  }
}
