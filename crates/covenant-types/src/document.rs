//! # Document Model
//!
//! The `Document` trait and the shared header fields every concrete
//! document embeds by composition (spec section 9's design note: mixins
//! become embedded structs, not multiple inheritance).

use serde::{Deserialize, Serialize};
use chrono::{Duration, Months, NaiveDate};
use indexmap::IndexMap;
use uuid::Uuid;

use crate::error::{DocumentError, FieldError};
use crate::field::{validate_bytes_limit, CanonicalValue, FieldValue, SIGNATURE_LIMIT};
use crate::type_tag::TypeTag;

/// A document's signature slot: either a single signature (most document
/// types) or an insertion-ordered list of signatures (Keys, which carries
/// both the old-key and new-key signatures across a rotation).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureField {
    values: Vec<Vec<u8>>,
    multiple: bool,
    redo: bool,
}

impl SignatureField {
    /// A signature slot that holds at most one signature.
    pub fn single() -> Self {
        Self {
            values: Vec::new(),
            multiple: false,
            redo: false,
        }
    }

    /// A signature slot that accumulates signatures in insertion order.
    pub fn multi() -> Self {
        Self {
            values: Vec::new(),
            multiple: true,
            redo: false,
        }
    }

    /// Whether this slot admits more than one signature.
    pub fn allows_multiple(&self) -> bool {
        self.multiple
    }

    /// Whether the slot currently carries at least one signature.
    pub fn is_set(&self) -> bool {
        !self.values.is_empty()
    }

    /// Whether the slot is mid-resign (required check relaxed).
    pub fn is_redo(&self) -> bool {
        self.redo
    }

    /// All signatures currently held, in insertion order.
    pub fn values(&self) -> &[Vec<u8>] {
        &self.values
    }

    /// The most recently appended signature, if any.
    pub fn latest(&self) -> Option<&[u8]> {
        self.values.last().map(Vec::as_slice)
    }

    /// Clear this slot and mark it as mid-resign: the required-field
    /// check is relaxed until the next `set`/`push` call.
    pub fn begin_redo(&mut self) {
        self.values.clear();
        self.redo = true;
    }

    /// Replace the slot's contents with a single signature. Used by
    /// single-signature document types.
    pub fn set(&mut self, signature: Vec<u8>) {
        self.values = vec![signature];
        self.redo = false;
    }

    /// Append a signature. Used by multi-signature document types (Keys).
    pub fn push(&mut self, signature: Vec<u8>) {
        self.values.push(signature);
        self.redo = false;
    }

    /// Validate cardinality and the per-signature byte limit.
    pub fn validate(&self, field: &'static str) -> Result<(), FieldError> {
        if self.values.is_empty() && !self.redo {
            return Err(FieldError::NotSet {
                field: field.to_string(),
            });
        }
        for v in &self.values {
            validate_bytes_limit(field, v, SIGNATURE_LIMIT)?;
        }
        Ok(())
    }
}

/// The header fields every document carries: a stable id, creation/expiry
/// dates, an optional update date, and a signature slot. `issuer` is
/// `None` only for documents that are never signed against an issuer field
/// directly (there are none in this model — every document has an issuer,
/// entities simply self-issue).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocHeader {
    /// Stable 128-bit identifier, assigned at creation.
    pub id: Uuid,
    /// Creation date.
    pub created: NaiveDate,
    /// Last-updated date, if this document type is mutable and has been
    /// renewed/changed.
    pub updated: Option<NaiveDate>,
    /// Expiry date.
    pub expires: NaiveDate,
    /// The issuing entity's id.
    pub issuer: Uuid,
    /// The signature slot.
    pub signature: SignatureField,
}

impl DocHeader {
    /// The date a signature/verification check should treat as this
    /// document's "touch" date: `updated` if set, else `created` (spec
    /// section 4.6; resolves the `_overlap` open question per spec
    /// section 9 by following the stated intent rather than the literal,
    /// broken `isinstance` guard).
    pub fn touched(&self) -> NaiveDate {
        self.updated.unwrap_or(self.created)
    }
}

/// Minimum validity-window class a document belongs to, used by
/// [`rule_expiry_window`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpiryClass {
    /// Identity-class documents: entities, keys, profiles, domain/node/
    /// network, statements. Minimum window: 13 months minus one day.
    Identity,
    /// Envelopes. Minimum window: 30 days.
    Envelope,
}

/// `expires - touched` must be at least the class's minimum window
/// (spec section 4.3).
pub fn rule_expiry_window(
    touched: NaiveDate,
    expires: NaiveDate,
    class: ExpiryClass,
) -> Result<(), DocumentError> {
    let minimum = match class {
        ExpiryClass::Identity => touched
            .checked_add_months(Months::new(13))
            .expect("13 months ahead of a calendar date does not overflow")
            - Duration::days(1),
        ExpiryClass::Envelope => touched + Duration::days(30),
    };
    if expires < minimum {
        return Err(DocumentError::ShortExpiry {
            minimum_days: (minimum - touched).num_days(),
            actual_days: (expires - touched).num_days(),
        });
    }
    Ok(())
}

/// `updated`, if set, must not predate `created` (spec section 4.3).
pub fn rule_updated_not_before_created(
    created: NaiveDate,
    updated: Option<NaiveDate>,
) -> Result<(), DocumentError> {
    if let Some(u) = updated {
        if u < created {
            return Err(DocumentError::UpdatedNotLatest {
                created: created.format("%Y-%m-%d").to_string(),
                updated: u.format("%Y-%m-%d").to_string(),
            });
        }
    }
    Ok(())
}

/// The document's declared type tag must equal the expected one for its
/// concrete Rust type (spec section 4.3).
pub fn rule_type_tag(actual: TypeTag, expected: TypeTag) -> Result<(), DocumentError> {
    if actual != expected {
        return Err(DocumentError::InvalidType {
            expected: expected.into(),
            actual: actual.into(),
        });
    }
    Ok(())
}

/// Default expiry for a freshly created identity-class document: ~13
/// months after `created` (spec section 3).
pub fn default_identity_expiry(created: NaiveDate) -> NaiveDate {
    created
        .checked_add_months(Months::new(13))
        .expect("13 months ahead of a calendar date does not overflow")
}

/// Default expiry for a freshly created envelope: +31 days (spec section 3).
pub fn default_envelope_expiry(posted: NaiveDate) -> NaiveDate {
    posted + Duration::days(31)
}

/// Default expiry for a freshly created message: +30 days (spec section 3).
pub fn default_message_expiry(posted: NaiveDate) -> NaiveDate {
    posted + Duration::days(30)
}

/// Shared behavior of every document type: identity, dates, signature
/// slot, and the three export shapes (native and canonical-bytes; the
/// yaml shape lives on [`FieldValue`] and is derived from `native_export`).
///
/// Object-safe by design (no generics, no `Self`-returning methods) so
/// that crypto/policy code can operate over `&dyn Document` /
/// `&mut dyn Document` without needing to know the concrete variant —
/// the concrete variant only matters for construction and for
/// `deserialize`, both handled by the closed `AnyDocument` enum (spec
/// section 9's design note on dynamic document references).
pub trait Document {
    /// This document's stable identifier.
    fn id(&self) -> Uuid;

    /// This document's stable type tag.
    fn type_tag(&self) -> TypeTag;

    /// The issuing entity's id.
    fn issuer(&self) -> Uuid;

    /// Creation date.
    fn created(&self) -> NaiveDate;

    /// Last-updated date, if any.
    fn updated(&self) -> Option<NaiveDate>;

    /// Expiry date.
    fn expires(&self) -> NaiveDate;

    /// The date signature verification should compare key validity
    /// windows against: `updated` if set, else `created`.
    fn touched(&self) -> NaiveDate {
        self.updated().unwrap_or_else(|| self.created())
    }

    /// Read-only access to the signature slot.
    fn signature(&self) -> &SignatureField;

    /// Mutable access to the signature slot (used by signing code).
    fn signature_mut(&mut self) -> &mut SignatureField;

    /// The document's full native field export, including `issuer` and
    /// `signature` — canonicalization and YAML export both derive from
    /// this and drop/convert fields as needed.
    fn native_export(&self) -> IndexMap<String, FieldValue>;

    /// Structural validation: field-level checks plus this type's
    /// `apply_rules` (spec section 4.2/4.3).
    fn validate(&self) -> Result<(), DocumentError>;

    /// The canonical byte-tree export (spec section 4.4 step 1), derived
    /// from [`Document::native_export`].
    fn export(&self) -> CanonicalValue {
        FieldValue::Document(self.native_export()).to_canonical_bytes()
    }

    /// A YAML value for human inspection (spec section 6), derived from
    /// [`Document::native_export`]. Never a signing surface.
    fn to_yaml(&self) -> serde_yaml::Value {
        FieldValue::Document(self.native_export()).to_yaml()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_redo_relaxes_required_check() {
        let mut sig = SignatureField::single();
        sig.set(vec![1, 2, 3]);
        assert!(sig.validate("signature").is_ok());

        sig.begin_redo();
        assert!(sig.validate("signature").is_ok(), "redo relaxes NotSet");

        sig.set(vec![4, 5, 6]);
        assert!(!sig.is_redo());
    }

    #[test]
    fn signature_without_redo_requires_a_value() {
        let sig = SignatureField::single();
        assert!(matches!(
            sig.validate("signature"),
            Err(FieldError::NotSet { .. })
        ));
    }

    #[test]
    fn multi_signature_preserves_insertion_order() {
        let mut sig = SignatureField::multi();
        sig.push(vec![1]);
        sig.push(vec![2]);
        assert_eq!(sig.values(), &[vec![1], vec![2]]);
        assert_eq!(sig.latest(), Some([2].as_slice()));
    }

    #[test]
    fn expiry_window_identity_minimum_is_13_months_minus_1_day() {
        let created = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let just_short = created.checked_add_months(Months::new(13)).unwrap() - Duration::days(2);
        assert!(rule_expiry_window(created, just_short, ExpiryClass::Identity).is_err());

        let ok = default_identity_expiry(created) - Duration::days(1);
        assert!(rule_expiry_window(created, ok, ExpiryClass::Identity).is_ok());
    }

    #[test]
    fn updated_before_created_is_rejected() {
        let created = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let updated = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        assert!(rule_updated_not_before_created(created, Some(updated)).is_err());
        assert!(rule_updated_not_before_created(created, Some(created)).is_ok());
    }
}
