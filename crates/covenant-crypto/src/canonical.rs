//! # Canonicalization (spec section 4.4)
//!
//! `document_data` turns a document's native field export into a
//! deterministic byte stream suitable as a signing/verification input:
//! map keys sort ascending by their UTF-8 bytes at every nesting level,
//! list elements keep their declared order, and `None` contributes
//! nothing. `issuer` and `signature` are always dropped — they are what
//! the signature protects and cannot be inputs to it — plus whatever
//! additional field names the caller excludes (e.g. `["header"]` when
//! signing an envelope before its header chain exists).

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use uuid::Uuid;

use covenant_types::document::Document;
use covenant_types::envelope::HeaderOp;
use covenant_types::field::{CanonicalValue, FieldValue};

/// Flatten a native field export into canonical signing bytes, dropping
/// any field named in `exclude`.
fn canonicalize(map: IndexMap<String, FieldValue>, exclude: &[&str]) -> Vec<u8> {
    let entries: Vec<(String, CanonicalValue)> = map
        .into_iter()
        .filter(|(k, _)| !exclude.contains(&k.as_str()))
        .map(|(k, v)| (k, v.to_canonical_bytes()))
        .collect();
    let mut out = Vec::new();
    write_map(&entries, &mut out);
    out
}

fn write_map(entries: &[(String, CanonicalValue)], out: &mut Vec<u8>) {
    let mut sorted: Vec<&(String, CanonicalValue)> = entries.iter().collect();
    sorted.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
    for (key, value) in sorted {
        out.extend_from_slice(key.as_bytes());
        write_value(value, out);
    }
}

fn write_value(value: &CanonicalValue, out: &mut Vec<u8>) {
    match value {
        CanonicalValue::Null => {}
        CanonicalValue::Bytes(bytes) => out.extend_from_slice(bytes),
        CanonicalValue::List(items) => {
            for item in items {
                write_value(item, out);
            }
        }
        CanonicalValue::Map(entries) => write_map(entries, out),
    }
}

/// The canonical signing bytes for a document, with `issuer`/`signature`
/// plus `exclude` dropped from the top level (spec section 4.4).
pub fn document_data(doc: &dyn Document, exclude: &[&str]) -> Vec<u8> {
    let mut drop: Vec<&str> = vec!["issuer", "signature"];
    drop.extend_from_slice(exclude);
    canonicalize(doc.native_export(), &drop)
}

/// The canonical signing bytes for one header-chain hop, excluding the
/// signature it is itself being computed for (spec section 4.8).
pub fn header_canonical_bytes(op: HeaderOp, node: Uuid, posted: DateTime<Utc>) -> Vec<u8> {
    let mut map = IndexMap::new();
    map.insert("op".into(), FieldValue::Str(op.as_str().to_string()));
    map.insert("node".into(), FieldValue::Uuid(node));
    map.insert("posted".into(), FieldValue::DateTime(posted));
    canonicalize(map, &[])
}
