//! Views (portfolio pages) and the users that own them, as read from the
//! host application's tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ViewId = i64;
pub type UserId = i64;
pub type GroupId = i64;

/// A portfolio page. A view is owned by exactly one of a user, a group or an
/// institution, but the indexer does not rely on that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
  pub id:          ViewId,
  /// May contain markup; the index keeps it for display.
  pub title:       String,
  pub description: Option<String>,
  /// Category of page, e.g. `portfolio`, `profile`, `dashboard`.
  pub view_type:   String,
  pub owner:       Option<UserId>,
  pub group:       Option<GroupId>,
  pub institution: Option<String>,
  pub created_at:  DateTime<Utc>,
}

impl View {
  /// The owning user id, if it can refer to a real account.
  pub fn owner_id(&self) -> Option<UserId> {
    self.owner.filter(|id| *id > 0)
  }
}

/// An account in the host application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:             UserId,
  pub username:       String,
  pub first_name:     String,
  pub last_name:      String,
  pub preferred_name: Option<String>,
}

impl User {
  /// Preferred name if set, else the full name, else the username.
  pub fn display_name(&self) -> String {
    if let Some(preferred) = self.preferred_name.as_deref().map(str::trim)
      && !preferred.is_empty()
    {
      return preferred.to_owned();
    }

    let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
    let full = full.trim();
    if full.is_empty() {
      self.username.clone()
    } else {
      full.to_owned()
    }
  }
}
