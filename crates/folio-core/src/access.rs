//! Access grants and their normalized summary.
//!
//! A view carries any number of grants, each opening it to the public, to
//! logged-in users, to an institution, to a group (optionally one role within
//! it) or to a single user. [`normalize`] collapses the currently valid grants
//! into one [`AccessDescriptor`] that is stored on the index document.

use std::{collections::BTreeSet, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::{
  Error, Result,
  view::{GroupId, UserId, ViewId},
};

// ─── Grants ──────────────────────────────────────────────────────────────────

/// The `access_type` discriminant of a stored grant.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum AccessKind {
  Public,
  LoggedIn,
  Institution,
  Group,
  User,
}

impl AccessKind {
  pub fn parse(s: &str) -> Result<Self> {
    Self::from_str(s).map_err(|_| Error::UnknownAccessKind(s.to_owned()))
  }
}

/// A role within a group. A group grant without a role covers every member.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GroupRole {
  Member,
  Tutor,
  Admin,
}

impl GroupRole {
  pub fn parse(s: &str) -> Result<Self> {
    Self::from_str(s).map_err(|_| Error::UnknownGroupRole(s.to_owned()))
  }
}

/// Who a grant opens the view to. Each variant carries exactly the target
/// its kind needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AccessScope {
  Public,
  LoggedIn,
  Institution { institution: String },
  Group { group: GroupId, role: Option<GroupRole> },
  User { user: UserId },
}

impl AccessScope {
  pub fn kind(&self) -> AccessKind {
    match self {
      Self::Public => AccessKind::Public,
      Self::LoggedIn => AccessKind::LoggedIn,
      Self::Institution { .. } => AccessKind::Institution,
      Self::Group { .. } => AccessKind::Group,
      Self::User { .. } => AccessKind::User,
    }
  }
}

/// One access-control row attached to a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrant {
  pub view:        ViewId,
  pub scope:       AccessScope,
  pub valid_from:  Option<DateTime<Utc>>,
  pub valid_until: Option<DateTime<Utc>>,
}

impl AccessGrant {
  /// An open-ended grant.
  pub fn new(view: ViewId, scope: AccessScope) -> Self {
    Self { view, scope, valid_from: None, valid_until: None }
  }

  /// Whether the grant applies at `at`. Both bounds are exclusive.
  pub fn is_current_at(&self, at: DateTime<Utc>) -> bool {
    self.valid_from.is_none_or(|from| from < at)
      && self.valid_until.is_none_or(|until| until > at)
  }
}

// ─── Descriptor ──────────────────────────────────────────────────────────────

/// The broadest audience a view is open to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneralAccess {
  Public,
  LoggedIn,
  /// Only the institutions, groups and users listed on the descriptor.
  Restricted,
}

/// Group ids that can see a view, bucketed by the role the grant names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupBuckets {
  #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
  pub all:    BTreeSet<GroupId>,
  #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
  pub admin:  BTreeSet<GroupId>,
  #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
  pub member: BTreeSet<GroupId>,
  #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
  pub tutor:  BTreeSet<GroupId>,
}

impl GroupBuckets {
  /// The bucket for `role`; `None` is the `all` bucket.
  pub fn bucket_mut(&mut self, role: Option<GroupRole>) -> &mut BTreeSet<GroupId> {
    match role {
      None => &mut self.all,
      Some(GroupRole::Admin) => &mut self.admin,
      Some(GroupRole::Member) => &mut self.member,
      Some(GroupRole::Tutor) => &mut self.tutor,
    }
  }

  pub fn is_empty(&self) -> bool {
    self.all.is_empty()
      && self.admin.is_empty()
      && self.member.is_empty()
      && self.tutor.is_empty()
  }

  /// Every group id in any bucket, once.
  pub fn union(&self) -> BTreeSet<GroupId> {
    self
      .all
      .iter()
      .chain(&self.admin)
      .chain(&self.member)
      .chain(&self.tutor)
      .copied()
      .collect()
  }
}

/// The normalized, deduplicated summary of a view's current grants.
///
/// When `general` is [`GeneralAccess::Public`] or [`GeneralAccess::LoggedIn`]
/// every collection is empty and left out of the serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDescriptor {
  pub general:      GeneralAccess,
  #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
  pub institutions: BTreeSet<String>,
  #[serde(default, skip_serializing_if = "GroupBuckets::is_empty")]
  pub groups:       GroupBuckets,
  #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
  pub users:        BTreeSet<UserId>,
}

impl AccessDescriptor {
  fn with_general(general: GeneralAccess) -> Self {
    Self {
      general,
      institutions: BTreeSet::new(),
      groups: GroupBuckets::default(),
      users: BTreeSet::new(),
    }
  }

  pub fn public() -> Self { Self::with_general(GeneralAccess::Public) }

  pub fn logged_in() -> Self { Self::with_general(GeneralAccess::LoggedIn) }

  /// Restricted with nobody listed: the view is visible to no one.
  pub fn restricted() -> Self { Self::with_general(GeneralAccess::Restricted) }
}

// ─── Normalizer ──────────────────────────────────────────────────────────────

/// Collapse `grants` into an [`AccessDescriptor`].
///
/// The most permissive audience wins outright: a public grant discards every
/// other grant, then a logged-in grant does. Otherwise each grant is folded
/// into its collection. Input order does not matter and an empty slice gives
/// [`AccessDescriptor::restricted`].
pub fn normalize(grants: &[AccessGrant]) -> AccessDescriptor {
  if grants.iter().any(|g| g.scope == AccessScope::Public) {
    return AccessDescriptor::public();
  }
  if grants.iter().any(|g| g.scope == AccessScope::LoggedIn) {
    return AccessDescriptor::logged_in();
  }

  let mut access = AccessDescriptor::restricted();
  for grant in grants {
    match &grant.scope {
      AccessScope::Institution { institution } => {
        access.institutions.insert(institution.clone());
      }
      AccessScope::Group { group, role } => {
        access.groups.bucket_mut(*role).insert(*group);
      }
      AccessScope::User { user } => {
        access.users.insert(*user);
      }
      AccessScope::Public | AccessScope::LoggedIn => {}
    }
  }
  access
}
