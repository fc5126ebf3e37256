//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, TimeZone, Utc};
use folio_core::{
  Error as CoreError,
  access::{AccessGrant, AccessScope, GeneralAccess, GroupRole},
  pipeline::{index_document, view_detail},
  store::ViewStore,
  view::{User, View},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn view(id: i64) -> View {
  View {
    id,
    title:       format!("<em>View</em> {id}"),
    description: Some("A page".to_string()),
    view_type:   "portfolio".to_string(),
    owner:       Some(1),
    group:       None,
    institution: Some("mahara".to_string()),
    created_at:  Utc.with_ymd_and_hms(2024, 3, 14, 15, 9, 26).unwrap(),
  }
}

fn ada() -> User {
  User {
    id:             1,
    username:       "ada".to_string(),
    first_name:     "Ada".to_string(),
    last_name:      "Lovelace".to_string(),
    preferred_name: None,
  }
}

// ─── Views, tags, users ──────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get_view() {
  let s = store().await;
  s.insert_view(&view(1)).await.unwrap();

  let fetched = s.get_view(1).await.unwrap().unwrap();
  assert_eq!(fetched, view(1));
}

#[tokio::test]
async fn get_view_missing_returns_none() {
  let s = store().await;
  assert!(s.get_view(99).await.unwrap().is_none());
}

#[tokio::test]
async fn list_view_ids_is_sorted() {
  let s = store().await;
  for id in [3, 1, 2] {
    s.insert_view(&view(id)).await.unwrap();
  }
  assert_eq!(s.list_view_ids().await.unwrap(), vec![1, 2, 3]);
}

#[tokio::test]
async fn tags_are_deduplicated_and_sorted() {
  let s = store().await;
  s.insert_view(&view(1)).await.unwrap();
  for tag in ["zeta", "alpha", "zeta"] {
    s.insert_tag(1, tag).await.unwrap();
  }
  assert_eq!(s.view_tags(1).await.unwrap(), vec!["alpha", "zeta"]);
  assert!(s.view_tags(2).await.unwrap().is_empty());
}

#[tokio::test]
async fn get_user_round_trip() {
  let s = store().await;
  s.insert_user(&ada()).await.unwrap();
  assert_eq!(s.get_user(1).await.unwrap(), Some(ada()));
  assert_eq!(s.get_user(2).await.unwrap(), None);
}

// ─── Access grants ───────────────────────────────────────────────────────────

#[tokio::test]
async fn grants_round_trip_every_scope() {
  let s = store().await;
  s.insert_view(&view(1)).await.unwrap();

  let scopes = vec![
    AccessScope::Public,
    AccessScope::LoggedIn,
    AccessScope::Institution { institution: "mahara".to_string() },
    AccessScope::Group { group: 4, role: None },
    AccessScope::Group { group: 5, role: Some(GroupRole::Admin) },
    AccessScope::User { user: 6 },
  ];
  for scope in &scopes {
    s.insert_grant(&AccessGrant::new(1, scope.clone())).await.unwrap();
  }

  let fetched: Vec<AccessScope> = s
    .access_grants(1, Utc::now())
    .await
    .unwrap()
    .into_iter()
    .map(|g| g.scope)
    .collect();
  assert_eq!(fetched.len(), scopes.len());
  for scope in &scopes {
    assert!(fetched.contains(scope), "missing {scope:?}");
  }
}

#[tokio::test]
async fn grants_outside_validity_window_are_excluded() {
  let s = store().await;
  s.insert_view(&view(1)).await.unwrap();
  let now = Utc::now();

  let mut expired = AccessGrant::new(1, AccessScope::User { user: 1 });
  expired.valid_until = Some(now - Duration::hours(1));

  let mut pending = AccessGrant::new(1, AccessScope::User { user: 2 });
  pending.valid_from = Some(now + Duration::hours(1));

  let mut current = AccessGrant::new(1, AccessScope::User { user: 3 });
  current.valid_from = Some(now - Duration::hours(1));
  current.valid_until = Some(now + Duration::hours(1));

  let open = AccessGrant::new(1, AccessScope::User { user: 4 });

  for grant in [&expired, &pending, &current, &open] {
    s.insert_grant(grant).await.unwrap();
  }

  let mut users: Vec<i64> = s
    .access_grants(1, now)
    .await
    .unwrap()
    .into_iter()
    .filter_map(|g| match g.scope {
      AccessScope::User { user } => Some(user),
      _ => None,
    })
    .collect();
  users.sort_unstable();
  assert_eq!(users, vec![3, 4]);

  let fetched = s.access_grants(1, now).await.unwrap();
  assert!(fetched.iter().all(|g| g.is_current_at(now)));
}

#[tokio::test]
async fn window_bounds_are_exclusive() {
  let s = store().await;
  s.insert_view(&view(1)).await.unwrap();
  let now = Utc::now();

  let mut starts_now = AccessGrant::new(1, AccessScope::Public);
  starts_now.valid_from = Some(now);
  let mut ends_now = AccessGrant::new(1, AccessScope::LoggedIn);
  ends_now.valid_until = Some(now);
  s.insert_grant(&starts_now).await.unwrap();
  s.insert_grant(&ends_now).await.unwrap();

  assert!(s.access_grants(1, now).await.unwrap().is_empty());
}

#[tokio::test]
async fn window_compares_instants_across_offsets() {
  let s = store().await;
  s.insert_view(&view(1)).await.unwrap();
  // 12:00+02:00 is 10:00Z, 12:30+02:00 is 10:30Z.
  s.execute_raw(
    "INSERT INTO view_access (view_id, access_type, valid_until)
       VALUES (1, 'public', '2024-06-01T12:00:00+02:00');
     INSERT INTO view_access (view_id, access_type, valid_from)
       VALUES (1, 'loggedin', '2024-06-01T12:30:00+02:00');",
  )
  .await
  .unwrap();
  let at = Utc.with_ymd_and_hms(2024, 6, 1, 11, 0, 0).unwrap();

  let scopes: Vec<AccessScope> = s
    .access_grants(1, at)
    .await
    .unwrap()
    .into_iter()
    .map(|g| g.scope)
    .collect();
  assert_eq!(scopes, vec![AccessScope::LoggedIn]);

  let doc = index_document(&s, 1, at).await.unwrap().unwrap();
  assert_eq!(doc.access.general, GeneralAccess::LoggedIn);
}

#[tokio::test]
async fn no_grants_is_empty_not_error() {
  let s = store().await;
  s.insert_view(&view(1)).await.unwrap();
  assert!(s.access_grants(1, Utc::now()).await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_grant_row_is_an_error() {
  let s = store().await;
  s.insert_view(&view(1)).await.unwrap();
  s.execute_raw(
    "INSERT INTO view_access (view_id, access_type, role) VALUES (1, 'group', 'tutor');",
  )
  .await
  .unwrap();

  let err = s.access_grants(1, Utc::now()).await.unwrap_err();
  assert!(matches!(err, Error::MalformedGrant { view: 1, .. }), "{err}");
}

// ─── Pipeline over SQLite ────────────────────────────────────────────────────

#[tokio::test]
async fn index_document_from_store() {
  let s = store().await;
  s.insert_view(&view(1)).await.unwrap();
  s.insert_tag(1, "cv").await.unwrap();
  s.insert_grant(&AccessGrant::new(1, AccessScope::Group {
    group: 7,
    role:  Some(GroupRole::Tutor),
  }))
  .await
  .unwrap();

  let doc = index_document(&s, 1, Utc::now()).await.unwrap().unwrap();
  assert_eq!(doc.access.general, GeneralAccess::Restricted);
  assert!(doc.access.groups.tutor.contains(&7));
  assert_eq!(doc.access_group.iter().copied().collect::<Vec<_>>(), vec![7]);
  assert_eq!(doc.sort, "view 1");
  assert_eq!(doc.tags, vec!["cv".to_string()]);
  assert!(doc.access_institution.contains("mahara"));
}

#[tokio::test]
async fn public_grant_wins_over_stored_targets() {
  let s = store().await;
  s.insert_view(&view(1)).await.unwrap();
  s.insert_grant(&AccessGrant::new(1, AccessScope::Public)).await.unwrap();
  s.insert_grant(&AccessGrant::new(1, AccessScope::User { user: 3 }))
    .await
    .unwrap();

  let doc = index_document(&s, 1, Utc::now()).await.unwrap().unwrap();
  assert_eq!(doc.access.general, GeneralAccess::Public);
  assert!(doc.access.users.is_empty());
  assert!(doc.access_user.is_empty());
}

#[tokio::test]
async fn malformed_grant_surfaces_as_fetch_failure() {
  let s = store().await;
  s.insert_view(&view(1)).await.unwrap();
  s.execute_raw(
    "INSERT INTO view_access (view_id, access_type) VALUES (1, 'no-such-kind');",
  )
  .await
  .unwrap();

  let err = index_document(&s, 1, Utc::now()).await.unwrap_err();
  assert!(matches!(err, CoreError::Fetch { view: 1, .. }), "{err}");
}

#[tokio::test]
async fn detail_with_and_without_owner() {
  let s = store().await;
  s.insert_view(&view(1)).await.unwrap();
  let mut orphan = view(2);
  orphan.owner = Some(404);
  s.insert_view(&orphan).await.unwrap();
  s.insert_user(&ada()).await.unwrap();

  let detail = view_detail(&s, 1).await.unwrap().unwrap();
  assert_eq!(detail.created_by_name.as_deref(), Some("Ada Lovelace"));

  let detail = view_detail(&s, 2).await.unwrap().unwrap();
  assert!(detail.created_by.is_none());
  assert!(detail.created_by_name.is_none());
}
