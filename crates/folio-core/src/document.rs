//! Index documents: the flattened form of a view handed to the search index.
//!
//! Two shapes are assembled from the same view: the lean [`IndexDocument`]
//! written to the index, and the richer [`ViewDetail`] shown when a single
//! result is opened. They are separate so neither path pays for the other.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  access::AccessDescriptor,
  view::{GroupId, User, UserId, View, ViewId},
};

/// Value of the `type` field on every view document.
pub const DOC_TYPE: &str = "view";
/// First-level facet every view is filed under.
pub const MAIN_FACET_TERM: &str = "Portfolio";
/// Second-level facet every view is filed under.
pub const SEC_FACET_TERM: &str = "Page";

// ─── IndexDocument ───────────────────────────────────────────────────────────

/// A view as stored in the search index.
///
/// `access` is kept as a structured object for inspection; the three
/// `access_*` bags repeat its members flat so a visibility check is a single
/// membership filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDocument {
  #[serde(rename = "type")]
  pub doc_type:           String,
  #[serde(rename = "mainfacetterm")]
  pub main_facet_term:    String,
  #[serde(rename = "secfacetterm")]
  pub sec_facet_term:     String,
  pub id:                 ViewId,
  pub title:              String,
  pub description:        Option<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub tags:               Vec<String>,
  pub owner:              Option<UserId>,
  pub group:              Option<GroupId>,
  pub institution:        Option<String>,
  pub access:             AccessDescriptor,
  #[serde(rename = "ctime", with = "ctime")]
  pub created_at:         DateTime<Utc>,
  /// Lowercased, markup-free title used for alphabetical sorting.
  pub sort:               String,
  pub access_institution: BTreeSet<String>,
  pub access_group:       BTreeSet<GroupId>,
  pub access_user:        BTreeSet<UserId>,
}

/// Build the index document for `view` from its tags and normalized access.
pub fn assemble(
  view: View,
  tags: Vec<String>,
  access: AccessDescriptor,
) -> IndexDocument {
  let mut access_institution = access.institutions.clone();
  if let Some(institution) = &view.institution {
    access_institution.insert(institution.clone());
  }
  let access_group = access.groups.union();
  let access_user = access.users.clone();

  IndexDocument {
    doc_type: DOC_TYPE.to_owned(),
    main_facet_term: MAIN_FACET_TERM.to_owned(),
    sec_facet_term: SEC_FACET_TERM.to_owned(),
    sort: sort_key(&view.title),
    id: view.id,
    title: view.title,
    description: view.description,
    tags,
    owner: view.owner,
    group: view.group,
    institution: view.institution,
    access,
    created_at: view.created_at,
    access_institution,
    access_group,
    access_user,
  }
}

// ─── ViewDetail ──────────────────────────────────────────────────────────────

/// A view enriched for display: tags plus the resolved owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewDetail {
  #[serde(flatten)]
  pub view:            View,
  pub tags:            Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_by:      Option<User>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_by_name: Option<String>,
}

/// Build the detail view. An owner that did not resolve just leaves the
/// `created_by*` fields unset.
pub fn assemble_detail(
  view: View,
  tags: Vec<String>,
  owner: Option<User>,
) -> ViewDetail {
  let created_by_name = owner.as_ref().map(User::display_name);
  ViewDetail { view, tags, created_by: owner, created_by_name }
}

// ─── Sort key ────────────────────────────────────────────────────────────────

/// The title with markup removed, lowercased.
pub fn sort_key(title: &str) -> String { strip_tags(title).to_lowercase() }

enum Scan {
  Text,
  Tag,
  Quoted(char),
}

/// Remove HTML/XML tags from `s`, keeping the text between them.
///
/// A `<` only opens a tag when followed by a letter, `/`, `!` or `?`, so
/// plain comparisons like `a < b` survive. Quoted attribute values may
/// contain `>`.
pub fn strip_tags(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  let mut state = Scan::Text;
  let mut chars = s.chars().peekable();

  while let Some(c) = chars.next() {
    state = match state {
      Scan::Text => {
        let opens_tag = c == '<'
          && chars
            .peek()
            .is_some_and(|n| n.is_alphabetic() || matches!(*n, '/' | '!' | '?'));
        if opens_tag {
          Scan::Tag
        } else {
          out.push(c);
          Scan::Text
        }
      }
      Scan::Tag => match c {
        '>' => Scan::Text,
        '"' | '\'' => Scan::Quoted(c),
        _ => Scan::Tag,
      },
      Scan::Quoted(q) if c == q => Scan::Tag,
      quoted @ Scan::Quoted(_) => quoted,
    };
  }
  out
}

// ─── ctime format ────────────────────────────────────────────────────────────

/// `yyyy-MM-dd HH:mm:ss`, the date format declared in the index mapping.
mod ctime {
  use chrono::{DateTime, NaiveDateTime, Utc};
  use serde::{Deserialize, Deserializer, Serializer};

  pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

  pub fn serialize<S>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    s.collect_str(&dt.format(FORMAT))
  }

  pub fn deserialize<'de, D>(d: D) -> Result<DateTime<Utc>, D::Error>
  where
    D: Deserializer<'de>,
  {
    let s = String::deserialize(d)?;
    NaiveDateTime::parse_from_str(&s, FORMAT)
      .map(|naive| naive.and_utc())
      .map_err(serde::de::Error::custom)
  }
}
