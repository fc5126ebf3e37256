//! Search-engine bulk format: an action line followed by the document line.

use std::io::{self, Write};

use folio_core::document::IndexDocument;
use serde_json::json;

/// Append one `index` action for `doc` to `out`.
pub fn write_entry<W: Write>(
  out: &mut W,
  index: &str,
  doc: &IndexDocument,
) -> io::Result<()> {
  let action = json!({ "index": { "_index": index, "_id": doc.id.to_string() } });
  serde_json::to_writer(&mut *out, &action)?;
  out.write_all(b"\n")?;
  serde_json::to_writer(&mut *out, doc)?;
  out.write_all(b"\n")
}
