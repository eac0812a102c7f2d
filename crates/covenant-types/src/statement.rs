//! # Statements (spec section 3)
//!
//! A statement is one entity's claim about another: "I have verified
//! you", "I trust you", or "I revoke my prior statement about you".
//! Statements are shared references — the same statement document lives
//! in both the issuer's `issuer_statements` and the owner's
//! `owner_statements` (spec section 5).

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use indexmap::IndexMap;
use uuid::Uuid;

use crate::document::{
    rule_expiry_window, rule_type_tag, rule_updated_not_before_created, DocHeader, Document,
    ExpiryClass, SignatureField,
};
use crate::entity::signature_field_value;
use crate::error::DocumentError;
use crate::field::FieldValue;
use crate::type_tag::TypeTag;

/// Shared shape of the three statement kinds: an issuer's claim about a
/// given owner entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementBody {
    /// Shared document header; `header.issuer` is the issuing entity.
    pub header: DocHeader,
    /// The entity this statement is about.
    pub owner: Uuid,
}

fn native_export(tag: TypeTag, body: &StatementBody) -> IndexMap<String, FieldValue> {
    let mut map = IndexMap::new();
    map.insert("type".into(), FieldValue::Int(tag.into()));
    map.insert("id".into(), FieldValue::Uuid(body.header.id));
    map.insert("created".into(), FieldValue::Date(body.header.created));
    map.insert(
        "updated".into(),
        body.header.updated.map(FieldValue::Date).unwrap_or(FieldValue::Null),
    );
    map.insert("expires".into(), FieldValue::Date(body.header.expires));
    map.insert("issuer".into(), FieldValue::Uuid(body.header.issuer));
    map.insert("signature".into(), signature_field_value(&body.header.signature));
    map.insert("owner".into(), FieldValue::Uuid(body.owner));
    map
}

fn validate(tag: TypeTag, body: &StatementBody) -> Result<(), DocumentError> {
    rule_type_tag(tag, tag)?;
    rule_updated_not_before_created(body.header.created, body.header.updated)?;
    rule_expiry_window(body.header.touched(), body.header.expires, ExpiryClass::Identity)?;
    body.header.signature.validate("signature")?;
    Ok(())
}

/// "I have verified this entity's identity."
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verified(pub StatementBody);

impl Document for Verified {
    fn id(&self) -> Uuid {
        self.0.header.id
    }
    fn type_tag(&self) -> TypeTag {
        TypeTag::StatVerified
    }
    fn issuer(&self) -> Uuid {
        self.0.header.issuer
    }
    fn created(&self) -> NaiveDate {
        self.0.header.created
    }
    fn updated(&self) -> Option<NaiveDate> {
        self.0.header.updated
    }
    fn expires(&self) -> NaiveDate {
        self.0.header.expires
    }
    fn signature(&self) -> &SignatureField {
        &self.0.header.signature
    }
    fn signature_mut(&mut self) -> &mut SignatureField {
        &mut self.0.header.signature
    }
    fn native_export(&self) -> IndexMap<String, FieldValue> {
        native_export(TypeTag::StatVerified, &self.0)
    }
    fn validate(&self) -> Result<(), DocumentError> {
        validate(TypeTag::StatVerified, &self.0)
    }
}

/// "I trust this entity's statements and communications."
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trusted(pub StatementBody);

impl Document for Trusted {
    fn id(&self) -> Uuid {
        self.0.header.id
    }
    fn type_tag(&self) -> TypeTag {
        TypeTag::StatTrusted
    }
    fn issuer(&self) -> Uuid {
        self.0.header.issuer
    }
    fn created(&self) -> NaiveDate {
        self.0.header.created
    }
    fn updated(&self) -> Option<NaiveDate> {
        self.0.header.updated
    }
    fn expires(&self) -> NaiveDate {
        self.0.header.expires
    }
    fn signature(&self) -> &SignatureField {
        &self.0.header.signature
    }
    fn signature_mut(&mut self) -> &mut SignatureField {
        &mut self.0.header.signature
    }
    fn native_export(&self) -> IndexMap<String, FieldValue> {
        native_export(TypeTag::StatTrusted, &self.0)
    }
    fn validate(&self) -> Result<(), DocumentError> {
        validate(TypeTag::StatTrusted, &self.0)
    }
}

/// "I withdraw a prior statement about this entity." Unlike [`Verified`]
/// and [`Trusted`], a revocation does not carry its own `owner` — it
/// points at the id of the statement it revokes (spec section 3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revoked {
    /// Shared document header; `header.issuer` is the revoking entity,
    /// which must match the revoked statement's own issuer.
    pub header: DocHeader,
    /// The id of the [`Verified`] or [`Trusted`] statement being revoked.
    pub issuance: Uuid,
}

impl Document for Revoked {
    fn id(&self) -> Uuid {
        self.header.id
    }
    fn type_tag(&self) -> TypeTag {
        TypeTag::StatRevoked
    }
    fn issuer(&self) -> Uuid {
        self.header.issuer
    }
    fn created(&self) -> NaiveDate {
        self.header.created
    }
    fn updated(&self) -> Option<NaiveDate> {
        self.header.updated
    }
    fn expires(&self) -> NaiveDate {
        self.header.expires
    }
    fn signature(&self) -> &SignatureField {
        &self.header.signature
    }
    fn signature_mut(&mut self) -> &mut SignatureField {
        &mut self.header.signature
    }
    fn native_export(&self) -> IndexMap<String, FieldValue> {
        let mut map = IndexMap::new();
        map.insert("type".into(), FieldValue::Int(TypeTag::StatRevoked.into()));
        map.insert("id".into(), FieldValue::Uuid(self.header.id));
        map.insert("created".into(), FieldValue::Date(self.header.created));
        map.insert(
            "updated".into(),
            self.header.updated.map(FieldValue::Date).unwrap_or(FieldValue::Null),
        );
        map.insert("expires".into(), FieldValue::Date(self.header.expires));
        map.insert("issuer".into(), FieldValue::Uuid(self.header.issuer));
        map.insert("signature".into(), signature_field_value(&self.header.signature));
        map.insert("issuance".into(), FieldValue::Uuid(self.issuance));
        map
    }
    fn validate(&self) -> Result<(), DocumentError> {
        rule_type_tag(TypeTag::StatRevoked, TypeTag::StatRevoked)?;
        rule_updated_not_before_created(self.header.created, self.header.updated)?;
        rule_expiry_window(self.header.touched(), self.header.expires, ExpiryClass::Identity)?;
        self.header.signature.validate("signature")?;
        Ok(())
    }
}

/// A closed union over the three statement kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// A verification claim.
    Verified(Verified),
    /// A trust claim.
    Trusted(Trusted),
    /// A revocation.
    Revoked(Revoked),
}

impl Statement {
    /// The entity this statement is about. `Revoked` has no owner of its
    /// own; returns `None` for that variant (spec section 3) — callers
    /// that need to know what a revocation affects should follow
    /// `issuance` back to the revoked statement.
    pub fn owner(&self) -> Option<Uuid> {
        match self {
            Statement::Verified(v) => Some(v.0.owner),
            Statement::Trusted(t) => Some(t.0.owner),
            Statement::Revoked(_) => None,
        }
    }

    /// The id of the statement this one revokes, if this is a [`Revoked`].
    pub fn issuance(&self) -> Option<Uuid> {
        match self {
            Statement::Revoked(r) => Some(r.issuance),
            _ => None,
        }
    }
}

impl Document for Statement {
    fn id(&self) -> Uuid {
        match self {
            Statement::Verified(v) => v.id(),
            Statement::Trusted(t) => t.id(),
            Statement::Revoked(r) => r.id(),
        }
    }
    fn type_tag(&self) -> TypeTag {
        match self {
            Statement::Verified(v) => v.type_tag(),
            Statement::Trusted(t) => t.type_tag(),
            Statement::Revoked(r) => r.type_tag(),
        }
    }
    fn issuer(&self) -> Uuid {
        match self {
            Statement::Verified(v) => v.issuer(),
            Statement::Trusted(t) => t.issuer(),
            Statement::Revoked(r) => r.issuer(),
        }
    }
    fn created(&self) -> NaiveDate {
        match self {
            Statement::Verified(v) => v.created(),
            Statement::Trusted(t) => t.created(),
            Statement::Revoked(r) => r.created(),
        }
    }
    fn updated(&self) -> Option<NaiveDate> {
        match self {
            Statement::Verified(v) => v.updated(),
            Statement::Trusted(t) => t.updated(),
            Statement::Revoked(r) => r.updated(),
        }
    }
    fn expires(&self) -> NaiveDate {
        match self {
            Statement::Verified(v) => v.expires(),
            Statement::Trusted(t) => t.expires(),
            Statement::Revoked(r) => r.expires(),
        }
    }
    fn signature(&self) -> &SignatureField {
        match self {
            Statement::Verified(v) => v.signature(),
            Statement::Trusted(t) => t.signature(),
            Statement::Revoked(r) => r.signature(),
        }
    }
    fn signature_mut(&mut self) -> &mut SignatureField {
        match self {
            Statement::Verified(v) => v.signature_mut(),
            Statement::Trusted(t) => t.signature_mut(),
            Statement::Revoked(r) => r.signature_mut(),
        }
    }
    fn native_export(&self) -> IndexMap<String, FieldValue> {
        match self {
            Statement::Verified(v) => v.native_export(),
            Statement::Trusted(t) => t.native_export(),
            Statement::Revoked(r) => r.native_export(),
        }
    }
    fn validate(&self) -> Result<(), DocumentError> {
        match self {
            Statement::Verified(v) => v.validate(),
            Statement::Trusted(t) => t.validate(),
            Statement::Revoked(r) => r.validate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::default_identity_expiry;

    #[test]
    fn revoked_statement_round_trips_issuance() {
        let created = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let issuance = Uuid::new_v4();
        let mut revoked = Revoked {
            header: DocHeader {
                id: Uuid::new_v4(),
                created,
                updated: None,
                expires: default_identity_expiry(created),
                issuer: Uuid::new_v4(),
                signature: SignatureField::single(),
            },
            issuance,
        };
        revoked.header.signature.set(vec![1; 64]);
        let statement = Statement::Revoked(revoked);
        assert_eq!(statement.issuance(), Some(issuance));
        assert_eq!(statement.owner(), None);
        assert!(statement.validate().is_ok());
    }
}
