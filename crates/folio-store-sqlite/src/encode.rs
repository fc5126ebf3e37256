//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.

use chrono::{DateTime, SecondsFormat, Utc};
use folio_core::{
  access::{AccessGrant, AccessKind, AccessScope, GroupRole},
  view::{GroupId, User, UserId, View, ViewId},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// Microsecond precision, always `Z`.
pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column values read directly from a `view_access` row.
pub struct RawGrant {
  pub view_id:     ViewId,
  pub access_type: String,
  pub institution: Option<String>,
  pub group_id:    Option<GroupId>,
  pub role:        Option<String>,
  pub user_id:     Option<UserId>,
  pub valid_from:  Option<String>,
  pub valid_until: Option<String>,
}

impl RawGrant {
  pub const COLUMNS: &'static str = "view_id, access_type, institution, group_id, \
                             role, user_id, valid_from, valid_until";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      view_id:     row.get(0)?,
      access_type: row.get(1)?,
      institution: row.get(2)?,
      group_id:    row.get(3)?,
      role:        row.get(4)?,
      user_id:     row.get(5)?,
      valid_from:  row.get(6)?,
      valid_until: row.get(7)?,
    })
  }

  /// Validate the row's shape and build the typed grant.
  ///
  /// Public and logged-in grants carry no target; every other kind carries
  /// exactly its own target column. Only group grants may name a role.
  pub fn into_grant(self) -> Result<AccessGrant> {
    let view = self.view_id;
    let malformed = |reason: String| Error::MalformedGrant { view, reason };

    let kind = AccessKind::parse(&self.access_type)
      .map_err(|e| malformed(e.to_string()))?;

    let targets = [
      self.institution.is_some(),
      self.group_id.is_some(),
      self.user_id.is_some(),
    ]
    .into_iter()
    .filter(|set| *set)
    .count();
    let expected = match kind {
      AccessKind::Public | AccessKind::LoggedIn => 0,
      _ => 1,
    };
    if targets != expected {
      return Err(malformed(format!(
        "{kind} grant has {targets} target columns set"
      )));
    }
    if self.role.is_some() && kind != AccessKind::Group {
      return Err(malformed(format!("{kind} grant has a role")));
    }

    let missing = |column: &str| malformed(format!("{kind} grant without {column}"));
    let scope = match kind {
      AccessKind::Public => AccessScope::Public,
      AccessKind::LoggedIn => AccessScope::LoggedIn,
      AccessKind::Institution => AccessScope::Institution {
        institution: self.institution.ok_or_else(|| missing("institution"))?,
      },
      AccessKind::Group => AccessScope::Group {
        group: self.group_id.ok_or_else(|| missing("group_id"))?,
        role:  self
          .role
          .as_deref()
          .map(GroupRole::parse)
          .transpose()
          .map_err(|e| malformed(e.to_string()))?,
      },
      AccessKind::User => AccessScope::User {
        user: self.user_id.ok_or_else(|| missing("user_id"))?,
      },
    };

    Ok(AccessGrant {
      view,
      scope,
      valid_from: self.valid_from.as_deref().map(decode_dt).transpose()?,
      valid_until: self.valid_until.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Column values read directly from a `views` row.
pub struct RawView {
  pub id:          ViewId,
  pub title:       String,
  pub description: Option<String>,
  pub view_type:   String,
  pub owner:       Option<UserId>,
  pub group_id:    Option<GroupId>,
  pub institution: Option<String>,
  pub created_at:  String,
}

impl RawView {
  pub const COLUMNS: &'static str =
    "id, title, description, view_type, owner, group_id, institution, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      title:       row.get(1)?,
      description: row.get(2)?,
      view_type:   row.get(3)?,
      owner:       row.get(4)?,
      group_id:    row.get(5)?,
      institution: row.get(6)?,
      created_at:  row.get(7)?,
    })
  }

  pub fn into_view(self) -> Result<View> {
    Ok(View {
      id:          self.id,
      title:       self.title,
      description: self.description,
      view_type:   self.view_type,
      owner:       self.owner,
      group:       self.group_id,
      institution: self.institution,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

pub fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
  Ok(User {
    id:             row.get(0)?,
    username:       row.get(1)?,
    first_name:     row.get(2)?,
    last_name:      row.get(3)?,
    preferred_name: row.get(4)?,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn raw(access_type: &str) -> RawGrant {
    RawGrant {
      view_id:     1,
      access_type: access_type.to_string(),
      institution: None,
      group_id:    None,
      role:        None,
      user_id:     None,
      valid_from:  None,
      valid_until: None,
    }
  }

  #[test]
  fn encoded_timestamps_sort_as_text() {
    let early = "2024-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
    let late = early + chrono::Duration::milliseconds(500);
    assert!(encode_dt(early) < encode_dt(late));
    assert_eq!(encode_dt(early), "2024-01-01T00:00:00.000000Z");
    assert_eq!(decode_dt(&encode_dt(late)).unwrap(), late);
  }

  #[test]
  fn group_grant_with_role_decodes() {
    let mut row = raw("group");
    row.group_id = Some(7);
    row.role = Some("tutor".to_string());
    let grant = row.into_grant().unwrap();
    assert_eq!(grant.scope, AccessScope::Group {
      group: 7,
      role:  Some(GroupRole::Tutor),
    });
  }

  #[test]
  fn malformed_rows_are_rejected() {
    let cases = {
      let no_target = raw("user");

      let mut wrong_target = raw("user");
      wrong_target.group_id = Some(3);

      let mut public_with_target = raw("public");
      public_with_target.user_id = Some(3);

      let mut bad_role = raw("group");
      bad_role.group_id = Some(3);
      bad_role.role = Some("owner".to_string());

      let mut role_on_user = raw("user");
      role_on_user.user_id = Some(3);
      role_on_user.role = Some("admin".to_string());

      vec![
        raw("no-such-kind"),
        no_target,
        wrong_target,
        public_with_target,
        bad_role,
        role_on_user,
      ]
    };

    for row in cases {
      let access_type = row.access_type.clone();
      assert!(
        matches!(row.into_grant(), Err(Error::MalformedGrant { view: 1, .. })),
        "{access_type} row should be malformed"
      );
    }
  }
}
