//! The search-index mapping for view documents.

use serde_json::{Value, json};

/// Date format of the `ctime` field, in the index engine's pattern syntax.
pub const CTIME_FORMAT: &str = "yyyy-MM-dd HH:mm:ss";

/// Field mapping for [`IndexDocument`](crate::document::IndexDocument).
///
/// Title, description and tags feed the `catch_all` full-text field. The
/// `access_*` bags are written pre-computed by the assembler, so they are
/// plain fields rather than `copy_to` targets.
pub fn view_mapping() -> Value {
  let group_bucket = json!({ "type": "long" });

  json!({
    "properties": {
      "type":          { "type": "keyword" },
      "mainfacetterm": { "type": "keyword" },
      "secfacetterm":  { "type": "keyword" },
      "id":            { "type": "long" },
      "title":         { "type": "text", "copy_to": "catch_all" },
      "description":   { "type": "text", "copy_to": "catch_all" },
      "tags":          { "type": "keyword", "copy_to": ["tag", "catch_all"] },
      "tag":           { "type": "keyword" },
      "catch_all":     { "type": "text" },
      "owner":         { "type": "long" },
      "group":         { "type": "long" },
      "institution":   { "type": "keyword" },
      "access": {
        "type": "object",
        "properties": {
          "general":      { "type": "keyword" },
          "institutions": { "type": "keyword" },
          "groups": {
            "type": "object",
            "properties": {
              "all":    group_bucket,
              "admin":  group_bucket,
              "member": group_bucket,
              "tutor":  group_bucket,
            }
          },
          "users": { "type": "long" },
        }
      },
      "ctime":              { "type": "date", "format": CTIME_FORMAT },
      "sort":               { "type": "keyword" },
      "access_institution": { "type": "keyword" },
      "access_group":       { "type": "long" },
      "access_user":        { "type": "long" },
    }
  })
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::{
    access::{AccessDescriptor, GroupRole},
    document::assemble,
    view::View,
  };

  /// Every key of `doc` must be declared in `mapping`, recursing into
  /// objects.
  fn assert_mapped(doc: &Value, mapping: &Value, path: &str) {
    let Some(fields) = doc.as_object() else { return };
    for (key, value) in fields {
      let declared = &mapping["properties"][key];
      assert!(!declared.is_null(), "{path}{key} is not in the mapping");
      if value.is_object() {
        assert_eq!(declared["type"], "object", "{path}{key} should be an object");
        assert_mapped(value, declared, &format!("{path}{key}."));
      }
    }
  }

  #[test]
  fn mapping_covers_a_fully_populated_document() {
    let mut access = AccessDescriptor::restricted();
    access.institutions.insert("mahara".to_string());
    for (id, role) in [
      (1, None),
      (2, Some(GroupRole::Admin)),
      (3, Some(GroupRole::Member)),
      (4, Some(GroupRole::Tutor)),
    ] {
      access.groups.bucket_mut(role).insert(id);
    }
    access.users.insert(9);

    let view = View {
      id:          1,
      title:       "Title".to_string(),
      description: Some("Description".to_string()),
      view_type:   "portfolio".to_string(),
      owner:       Some(9),
      group:       Some(2),
      institution: Some("mahara".to_string()),
      created_at:  Utc::now(),
    };
    let doc = serde_json::to_value(assemble(view, vec!["t".to_string()], access))
      .unwrap();

    assert_mapped(&doc, &view_mapping(), "");
  }

  #[test]
  fn ctime_is_a_formatted_date() {
    let mapping = view_mapping();
    assert_eq!(mapping["properties"]["ctime"]["type"], "date");
    assert_eq!(mapping["properties"]["ctime"]["format"], CTIME_FORMAT);
  }

  fn collect_types(mapping: &Value, types: &mut Vec<String>) {
    let Some(fields) = mapping["properties"].as_object() else { return };
    for field in fields.values() {
      if let Some(ty) = field["type"].as_str() {
        types.push(ty.to_string());
      }
      collect_types(field, types);
    }
  }

  #[test]
  fn field_types_are_the_documented_set() {
    let mut types = Vec::new();
    collect_types(&view_mapping(), &mut types);
    for ty in &types {
      assert!(
        ["keyword", "text", "long", "date", "object"].contains(&ty.as_str()),
        "unexpected field type {ty}"
      );
    }
    assert!(types.iter().any(|t| t == "long"));
  }
}
