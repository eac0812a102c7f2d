//! # Keys (spec section 3)
//!
//! A [`Keys`] document publishes an entity's current signing (Ed25519) and
//! exchange (X25519) public keys. [`PrivateKeys`] is the local-only
//! counterpart carrying the secret halves — it is never exported to a
//! portfolio and never signed by anyone.

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use indexmap::IndexMap;
use uuid::Uuid;

use crate::document::{
    rule_expiry_window, rule_type_tag, rule_updated_not_before_created, DocHeader, Document,
    ExpiryClass, SignatureField,
};
use crate::entity::signature_field_value;
use crate::error::{DocumentError, FieldError};
use crate::field::{validate_bytes_limit, FieldValue};
use crate::type_tag::TypeTag;

/// Expected length, in bytes, of an Ed25519 verifying key.
pub const VERIFY_KEY_LEN: usize = 32;
/// Expected length, in bytes, of an X25519 public key.
pub const EXCHANGE_KEY_LEN: usize = 32;

/// A published key-pair document. The signature slot is multi-valued: a
/// rotation carries both the outgoing key's resignature and the incoming
/// key's self-signature, in insertion order (spec section 4.9).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keys {
    /// Shared document header. `header.signature` is [`SignatureField::multi`].
    pub header: DocHeader,
    /// Ed25519 verifying (public signing) key.
    pub verify: Vec<u8>,
    /// X25519 public key used for conceal/reveal key agreement.
    pub exchange: Vec<u8>,
}

impl Keys {
    /// Construct a fresh Keys document for `issuer`, with an empty
    /// multi-signature slot.
    pub fn new(
        id: Uuid,
        issuer: Uuid,
        created: NaiveDate,
        expires: NaiveDate,
        verify: Vec<u8>,
        exchange: Vec<u8>,
    ) -> Self {
        Self {
            header: DocHeader {
                id,
                created,
                updated: None,
                expires,
                issuer,
                signature: SignatureField::multi(),
            },
            verify,
            exchange,
        }
    }
}

impl Document for Keys {
    fn id(&self) -> Uuid {
        self.header.id
    }
    fn type_tag(&self) -> TypeTag {
        TypeTag::Keys
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
        map.insert("type".into(), FieldValue::Int(TypeTag::Keys.into()));
        map.insert("id".into(), FieldValue::Uuid(self.header.id));
        map.insert("created".into(), FieldValue::Date(self.header.created));
        map.insert(
            "updated".into(),
            self.header.updated.map(FieldValue::Date).unwrap_or(FieldValue::Null),
        );
        map.insert("expires".into(), FieldValue::Date(self.header.expires));
        map.insert("issuer".into(), FieldValue::Uuid(self.header.issuer));
        map.insert(
            "signature".into(),
            signature_field_value(&self.header.signature),
        );
        map.insert("verify".into(), FieldValue::Bytes(self.verify.clone()));
        map.insert("exchange".into(), FieldValue::Bytes(self.exchange.clone()));
        map
    }

    fn validate(&self) -> Result<(), DocumentError> {
        rule_type_tag(TypeTag::Keys, TypeTag::Keys)?;
        rule_updated_not_before_created(self.header.created, self.header.updated)?;
        rule_expiry_window(self.touched(), self.header.expires, ExpiryClass::Identity)?;
        validate_bytes_limit("verify", &self.verify, VERIFY_KEY_LEN)?;
        validate_bytes_limit("exchange", &self.exchange, EXCHANGE_KEY_LEN)?;
        if self.verify.len() != VERIFY_KEY_LEN {
            return Err(FieldError::InvalidType {
                field: "verify".to_string(),
            }
            .into());
        }
        if self.exchange.len() != EXCHANGE_KEY_LEN {
            return Err(FieldError::InvalidType {
                field: "exchange".to_string(),
            }
            .into());
        }
        self.header.signature.validate("signature")?;
        Ok(())
    }
}

/// The local-only secret halves of a [`Keys`] document: the X25519
/// secret and the Ed25519 seed it was derived from. Unlike the teacher's
/// earlier draft of this type, a `PrivateKeys` document *is* signed: a
/// key rotation signs the new `PrivateKeys` with the old signing pair
/// (spec section 4.11), so it carries the same header shape as any other
/// single-signature document. It is still never exported to a portfolio
/// or shared with another entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrivateKeys {
    /// Shared document header. `header.signature` is [`SignatureField::single`].
    pub header: DocHeader,
    /// The id of the public [`Keys`] document these secrets back.
    pub keys_id: Uuid,
    /// Ed25519 signing key seed (32 bytes).
    pub seed: Vec<u8>,
    /// X25519 static secret (32 bytes).
    pub secret: Vec<u8>,
}

impl PrivateKeys {
    /// Construct a fresh PrivateKeys document for `issuer`, with an empty
    /// single-signature slot.
    pub fn new(
        id: Uuid,
        issuer: Uuid,
        created: NaiveDate,
        expires: NaiveDate,
        keys_id: Uuid,
        seed: Vec<u8>,
        secret: Vec<u8>,
    ) -> Self {
        Self {
            header: DocHeader {
                id,
                created,
                updated: None,
                expires,
                issuer,
                signature: SignatureField::single(),
            },
            keys_id,
            seed,
            secret,
        }
    }
}

impl Document for PrivateKeys {
    fn id(&self) -> Uuid {
        self.header.id
    }
    fn type_tag(&self) -> TypeTag {
        TypeTag::KeysPrivate
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
        map.insert("type".into(), FieldValue::Int(TypeTag::KeysPrivate.into()));
        map.insert("id".into(), FieldValue::Uuid(self.header.id));
        map.insert("created".into(), FieldValue::Date(self.header.created));
        map.insert(
            "updated".into(),
            self.header.updated.map(FieldValue::Date).unwrap_or(FieldValue::Null),
        );
        map.insert("expires".into(), FieldValue::Date(self.header.expires));
        map.insert("issuer".into(), FieldValue::Uuid(self.header.issuer));
        map.insert(
            "signature".into(),
            signature_field_value(&self.header.signature),
        );
        map.insert("keys_id".into(), FieldValue::Uuid(self.keys_id));
        map.insert("seed".into(), FieldValue::Bytes(self.seed.clone()));
        map.insert("secret".into(), FieldValue::Bytes(self.secret.clone()));
        map
    }

    fn validate(&self) -> Result<(), DocumentError> {
        rule_type_tag(TypeTag::KeysPrivate, TypeTag::KeysPrivate)?;
        rule_updated_not_before_created(self.header.created, self.header.updated)?;
        rule_expiry_window(self.touched(), self.header.expires, ExpiryClass::Identity)?;
        validate_bytes_limit("seed", &self.seed, VERIFY_KEY_LEN)?;
        validate_bytes_limit("secret", &self.secret, EXCHANGE_KEY_LEN)?;
        if self.seed.len() != VERIFY_KEY_LEN {
            return Err(FieldError::InvalidType {
                field: "seed".to_string(),
            }
            .into());
        }
        if self.secret.len() != EXCHANGE_KEY_LEN {
            return Err(FieldError::InvalidType {
                field: "secret".to_string(),
            }
            .into());
        }
        self.header.signature.validate("signature")?;
        Ok(())
    }
}
