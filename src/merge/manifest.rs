//! Package-manifest reconciliation
//!
//! `package.json` files are merged key-wise over a fixed set of top-level
//! keys: `dependencies`, `devDependencies`, `peerDependencies` and
//! `scripts`. Within those objects the freshly generated value wins per key
//! (the generator owns version bumps); every other top-level field of the
//! existing manifest is preserved untouched, and any other top-level field
//! of the generated manifest is deliberately discarded - the generator only
//! ever speaks for the four merged keys.
//!
//! On any JSON parse failure the merge degrades to a full overwrite.

use serde_json::{Map, Value};

/// Top-level keys unioned during a manifest merge. Deliberately narrow.
const MERGED_KEYS: &[&str] = &["dependencies", "devDependencies", "peerDependencies", "scripts"];

/// Merge a freshly generated manifest into an existing one.
///
/// Returns `None` when either side fails to parse as a JSON object, which
/// the caller treats as "overwrite with the new content".
pub fn merge_manifests(existing: &str, new: &str) -> Option<String> {
    let mut base: Value = match serde_json::from_str(existing) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("existing manifest is not valid JSON ({e}); overwriting");
            return None;
        }
    };
    let incoming: Value = match serde_json::from_str(new) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("generated manifest is not valid JSON ({e}); overwriting");
            return None;
        }
    };

    let (Some(base_obj), Some(incoming_obj)) = (base.as_object_mut(), incoming.as_object()) else {
        tracing::warn!("manifest merge requires JSON objects on both sides; overwriting");
        return None;
    };

    for key in MERGED_KEYS {
        let Some(incoming_section) = incoming_obj.get(*key).and_then(Value::as_object) else {
            continue;
        };
        let section = base_obj
            .entry((*key).to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(section_obj) = section.as_object_mut() else {
            // existing field has a non-object shape we don't understand;
            // leave it alone rather than clobber it
            tracing::debug!("manifest key '{key}' is not an object in the existing file; skipped");
            continue;
        };
        for (name, value) in incoming_section {
            section_obj.insert(name.clone(), value.clone());
        }
    }

    // serde_json's preserve_order feature keeps the existing field order, so
    // a second run over this output is byte-stable
    let mut rendered = serde_json::to_string_pretty(&base).ok()?;
    rendered.push('\n');
    Some(rendered)
}
