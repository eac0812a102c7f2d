//! # Field System
//!
//! Every document field is declared once as a [`FieldSpec`] (name, kind,
//! cardinality, required-ness) and carries its value as a [`FieldValue`] —
//! a small closed value tree that every concrete document's `export()`
//! builds and that [`covenant_crypto::canonical`] walks to produce the
//! canonical signing bytes.
//!
//! This plays the role the Python source's per-field descriptor classes
//! play (`UuidField`, `DateField`, `IPField`, ...), but as a single value
//! enum plus free validation/conversion functions rather than one type per
//! field kind — idiomatic Rust prefers a closed sum type here over a family
//! of near-identical descriptor structs.

use std::net::IpAddr;

use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::error::FieldError;

/// Maximum length, in bytes, of any [`FieldValue::Bytes`] used as a raw
/// binary attachment payload field (distinct from the smaller signature
/// limit below). Callers that need a tighter limit (e.g. signatures) pass
/// their own `limit` to [`validate_bytes_limit`].
pub const DEFAULT_BINARY_LIMIT: usize = 131_072;

/// Maximum length, in bytes, of a signature value (spec section 3).
pub const SIGNATURE_LIMIT: usize = 1024;

/// The kind of value a field admits. Used by [`FieldSpec`] to describe a
/// document's schema and drive generic bytes/yaml conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// 128-bit identifier.
    Uuid,
    /// Calendar date, no time component.
    Date,
    /// An instant in time (UTC).
    DateTime,
    /// IPv4 or IPv6 address.
    Ip,
    /// Free-form UTF-8 string.
    String,
    /// Raw bytes with a declared size limit.
    Binary {
        /// Maximum admitted length in bytes.
        limit: usize,
    },
    /// Opaque signature bytes (limit fixed at [`SIGNATURE_LIMIT`]).
    Signature,
    /// Small integer type tag.
    TypeTag,
    /// String drawn from a fixed enumerated set.
    Choice {
        /// Admitted values.
        choices: &'static [&'static str],
    },
    /// String matching a configured regular expression.
    Regex {
        /// Regex source pattern.
        pattern: &'static str,
    },
    /// String that must additionally be a syntactically valid email address.
    Email,
    /// A nested document of a declared type.
    Document,
}

/// A declarative descriptor for one field of a document type.
///
/// Document types assemble an ordered `Vec<FieldSpec>` (their `schema()`)
/// by listing their own fields after their ancestors' — the Rust
/// replacement for the Python metaclass's field-accumulation walk (spec
/// section 9's design note).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name, stable across the document's lifetime.
    pub name: &'static str,
    /// The kind of value this field admits.
    pub kind: FieldKind,
    /// Whether the field must carry a value for the document to validate.
    pub required: bool,
    /// Whether the field holds a list of values rather than a scalar.
    pub multiple: bool,
}

impl FieldSpec {
    /// Construct a required, single-valued field descriptor.
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            multiple: false,
        }
    }

    /// Mark this descriptor as optional.
    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Mark this descriptor as admitting multiple values.
    pub const fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }
}

/// The native, typed value of a field. This is the "native" export shape
/// (spec section 4.2); [`FieldValue::to_canonical_bytes`] and
/// [`FieldValue::to_yaml`] derive the other two shapes (bytes, yaml) from
/// it. A `None`/absent field is never stored — absence is represented by
/// the field simply not appearing in a document's export map.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// An absent optional value. Contributes nothing when canonicalized,
    /// and is dropped (not emitted as `null`) when converted to YAML.
    Null,
    /// 128-bit identifier.
    Uuid(Uuid),
    /// Calendar date.
    Date(NaiveDate),
    /// UTC instant.
    DateTime(DateTime<Utc>),
    /// IPv4 or IPv6 address.
    Ip(IpAddr),
    /// UTF-8 string (used for String, Choice, Regex, Email kinds alike).
    Str(String),
    /// Raw bytes (used for Binary and Signature kinds alike).
    Bytes(Vec<u8>),
    /// Small integer (used for TypeTag).
    Int(i64),
    /// A list of values, in declared/insertion order.
    List(Vec<FieldValue>),
    /// A nested document's own native export.
    Document(IndexMap<String, FieldValue>),
}

impl FieldValue {
    /// Convert to the field's canonical byte form (spec section 4.1's
    /// "Bytes form" column). Lists recurse element-wise; nested documents
    /// recurse into their own field map.
    pub fn to_canonical_bytes(&self) -> CanonicalValue {
        match self {
            FieldValue::Null => CanonicalValue::Null,
            FieldValue::Uuid(u) => CanonicalValue::Bytes(u.as_bytes().to_vec()),
            FieldValue::Date(d) => CanonicalValue::Bytes(d.format("%Y-%m-%d").to_string().into_bytes()),
            FieldValue::DateTime(dt) => {
                CanonicalValue::Bytes(dt.to_rfc3339().into_bytes())
            }
            FieldValue::Ip(ip) => CanonicalValue::Bytes(ip_to_bytes(*ip)),
            FieldValue::Str(s) => CanonicalValue::Bytes(s.clone().into_bytes()),
            FieldValue::Bytes(b) => CanonicalValue::Bytes(b.clone()),
            FieldValue::Int(i) => CanonicalValue::Bytes((*i as i32).to_be_bytes().to_vec()),
            FieldValue::List(items) => {
                CanonicalValue::List(items.iter().map(FieldValue::to_canonical_bytes).collect())
            }
            FieldValue::Document(map) => CanonicalValue::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_canonical_bytes()))
                    .collect(),
            ),
        }
    }

    /// Convert to a YAML value for human inspection (spec section 6).
    /// Bytes are base64-encoded; this is never used as a signing surface.
    pub fn to_yaml(&self) -> serde_yaml::Value {
        use base64::{engine::general_purpose::STANDARD, Engine as _};
        match self {
            FieldValue::Null => serde_yaml::Value::Null,
            FieldValue::Uuid(u) => serde_yaml::Value::String(u.to_string()),
            FieldValue::Date(d) => serde_yaml::Value::String(d.format("%Y-%m-%d").to_string()),
            FieldValue::DateTime(dt) => serde_yaml::Value::String(dt.to_rfc3339()),
            FieldValue::Ip(ip) => serde_yaml::Value::String(ip.to_string()),
            FieldValue::Str(s) => serde_yaml::Value::String(s.clone()),
            FieldValue::Bytes(b) => serde_yaml::Value::String(STANDARD.encode(b)),
            FieldValue::Int(i) => serde_yaml::Value::Number((*i).into()),
            FieldValue::List(items) => {
                serde_yaml::Value::Sequence(items.iter().map(FieldValue::to_yaml).collect())
            }
            FieldValue::Document(map) => serde_yaml::Value::Mapping(
                map.iter()
                    .map(|(k, v)| (serde_yaml::Value::String(k.clone()), v.to_yaml()))
                    .collect(),
            ),
        }
    }
}

/// The canonical byte-tree form used purely for deterministic signing
/// input (spec section 4.4). Unlike [`FieldValue`] it carries no field-kind
/// information — every scalar has already been reduced to raw bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum CanonicalValue {
    /// An absent value contributes nothing when canonicalized.
    Null,
    /// A scalar field's canonical bytes.
    Bytes(Vec<u8>),
    /// A list of canonical values, recursed in **declared order**.
    List(Vec<CanonicalValue>),
    /// A nested document's canonical fields, insertion order preserved
    /// here — the canonicalizer is responsible for sorting keys.
    Map(Vec<(String, CanonicalValue)>),
}

/// 4 bytes for IPv4, 16 bytes for IPv6 (the two natural raw widths for an
/// IP address; see DESIGN.md for why this departs from the spec's literal
/// "4 or 8").
fn ip_to_bytes(ip: IpAddr) -> Vec<u8> {
    match ip {
        IpAddr::V4(v4) => v4.octets().to_vec(),
        IpAddr::V6(v6) => v6.octets().to_vec(),
    }
}

/// Validate a required field is present; `multiple` fields must be a
/// non-empty list, scalar fields must not be an empty list.
pub fn validate_required(field: &'static str, present: bool, required: bool) -> Result<(), FieldError> {
    if required && !present {
        return Err(FieldError::NotSet {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validate the cardinality of a field's value against its declared
/// `multiple` flag.
pub fn validate_cardinality(
    field: &'static str,
    is_list: bool,
    multiple: bool,
) -> Result<(), FieldError> {
    match (is_list, multiple) {
        (true, false) => Err(FieldError::IsMultiple {
            field: field.to_string(),
        }),
        (false, true) => Err(FieldError::NotMultiple {
            field: field.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Validate a byte-limited field does not exceed `limit`.
pub fn validate_bytes_limit(field: &'static str, bytes: &[u8], limit: usize) -> Result<(), FieldError> {
    if bytes.len() > limit {
        return Err(FieldError::BeyondLimit {
            field: field.to_string(),
            limit,
            actual: bytes.len(),
        });
    }
    Ok(())
}

/// Validate a choice field's value is one of the admitted choices.
pub fn validate_choice(
    field: &'static str,
    value: &str,
    choices: &[&str],
) -> Result<(), FieldError> {
    if !choices.contains(&value) {
        return Err(FieldError::InvalidChoice {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Validate a regex field's value matches `pattern`.
pub fn validate_regex(field: &'static str, value: &str, pattern: &Regex) -> Result<(), FieldError> {
    if !pattern.is_match(value) {
        return Err(FieldError::InvalidRegex {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// A deliberately permissive but structurally sound email pattern: one
/// `@`, a non-empty local part, a domain with at least one dot.
static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static email pattern is valid"));

/// Validate an email field's value looks like a valid email address.
pub fn validate_email(field: &'static str, value: &str) -> Result<(), FieldError> {
    if !EMAIL_PATTERN.is_match(value) {
        return Err(FieldError::InvalidEmail {
            field: field.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_canonical_bytes_are_sixteen_raw_bytes() {
        let id = Uuid::new_v4();
        let value = FieldValue::Uuid(id);
        match value.to_canonical_bytes() {
            CanonicalValue::Bytes(b) => assert_eq!(b, id.as_bytes().to_vec()),
            _ => panic!("expected bytes"),
        }
    }

    #[test]
    fn date_canonical_bytes_are_iso8601() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let value = FieldValue::Date(d);
        match value.to_canonical_bytes() {
            CanonicalValue::Bytes(b) => assert_eq!(b, b"2024-01-05".to_vec()),
            _ => panic!("expected bytes"),
        }
    }

    #[test]
    fn list_preserves_declared_order() {
        let value = FieldValue::List(vec![
            FieldValue::Str("b".into()),
            FieldValue::Str("a".into()),
        ]);
        match value.to_canonical_bytes() {
            CanonicalValue::List(items) => {
                assert_eq!(items[0], CanonicalValue::Bytes(b"b".to_vec()));
                assert_eq!(items[1], CanonicalValue::Bytes(b"a".to_vec()));
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn binary_limit_rejects_oversized_values() {
        let bytes = vec![0u8; DEFAULT_BINARY_LIMIT + 1];
        assert!(validate_bytes_limit("payload", &bytes, DEFAULT_BINARY_LIMIT).is_err());
    }

    #[test]
    fn choice_rejects_values_outside_the_set() {
        assert!(validate_choice("sex", "unknown", &["man", "woman", "undefined"]).is_err());
        assert!(validate_choice("sex", "man", &["man", "woman", "undefined"]).is_ok());
    }

    #[test]
    fn email_rejects_malformed_addresses() {
        assert!(validate_email("contact", "not-an-email").is_err());
        assert!(validate_email("contact", "a@b.co").is_ok());
    }
}
