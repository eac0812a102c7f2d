//! # Profiles (spec section 3)
//!
//! A profile carries an entity's public-facing, mutable contact details —
//! separate from the entity document itself so that contact information
//! can change without re-establishing identity.

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
use crate::field::{validate_email, FieldValue};
use crate::type_tag::TypeTag;

fn optional_email(field: &'static str, value: &Option<String>) -> Result<(), DocumentError> {
    if let Some(v) = value {
        validate_email(field, v)?;
    }
    Ok(())
}

/// A person's public profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfilePerson {
    /// Shared document header.
    pub header: DocHeader,
    /// Contact email, if published.
    pub email: Option<String>,
    /// Mobile phone number, if published.
    pub mobile: Option<String>,
    /// Freeform "about" text.
    pub about: Option<String>,
}

impl Document for ProfilePerson {
    fn id(&self) -> Uuid {
        self.header.id
    }
    fn type_tag(&self) -> TypeTag {
        TypeTag::ProfilePerson
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
        map.insert("type".into(), FieldValue::Int(TypeTag::ProfilePerson.into()));
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
        map.insert(
            "email".into(),
            self.email.clone().map(FieldValue::Str).unwrap_or(FieldValue::Null),
        );
        map.insert(
            "mobile".into(),
            self.mobile.clone().map(FieldValue::Str).unwrap_or(FieldValue::Null),
        );
        map.insert(
            "about".into(),
            self.about.clone().map(FieldValue::Str).unwrap_or(FieldValue::Null),
        );
        map
    }

    fn validate(&self) -> Result<(), DocumentError> {
        rule_type_tag(TypeTag::ProfilePerson, TypeTag::ProfilePerson)?;
        rule_updated_not_before_created(self.header.created, self.header.updated)?;
        rule_expiry_window(self.touched(), self.header.expires, ExpiryClass::Identity)?;
        optional_email("email", &self.email)?;
        self.header.signature.validate("signature")?;
        Ok(())
    }
}

/// A ministry's public profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileMinistry {
    /// Shared document header.
    pub header: DocHeader,
    /// Contact email, if published.
    pub email: Option<String>,
    /// Public website URL, if published.
    pub url: Option<String>,
    /// Freeform "about" text.
    pub about: Option<String>,
}

impl Document for ProfileMinistry {
    fn id(&self) -> Uuid {
        self.header.id
    }
    fn type_tag(&self) -> TypeTag {
        TypeTag::ProfileMinistry
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
        map.insert("type".into(), FieldValue::Int(TypeTag::ProfileMinistry.into()));
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
        map.insert(
            "email".into(),
            self.email.clone().map(FieldValue::Str).unwrap_or(FieldValue::Null),
        );
        map.insert(
            "url".into(),
            self.url.clone().map(FieldValue::Str).unwrap_or(FieldValue::Null),
        );
        map.insert(
            "about".into(),
            self.about.clone().map(FieldValue::Str).unwrap_or(FieldValue::Null),
        );
        map
    }

    fn validate(&self) -> Result<(), DocumentError> {
        rule_type_tag(TypeTag::ProfileMinistry, TypeTag::ProfileMinistry)?;
        rule_updated_not_before_created(self.header.created, self.header.updated)?;
        rule_expiry_window(self.touched(), self.header.expires, ExpiryClass::Identity)?;
        optional_email("email", &self.email)?;
        self.header.signature.validate("signature")?;
        Ok(())
    }
}

/// A church's public profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileChurch {
    /// Shared document header.
    pub header: DocHeader,
    /// Contact email, if published.
    pub email: Option<String>,
    /// Public website URL, if published.
    pub url: Option<String>,
    /// Service times, freeform.
    pub service_times: Option<String>,
}

impl Document for ProfileChurch {
    fn id(&self) -> Uuid {
        self.header.id
    }
    fn type_tag(&self) -> TypeTag {
        TypeTag::ProfileChurch
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
        map.insert("type".into(), FieldValue::Int(TypeTag::ProfileChurch.into()));
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
        map.insert(
            "email".into(),
            self.email.clone().map(FieldValue::Str).unwrap_or(FieldValue::Null),
        );
        map.insert(
            "url".into(),
            self.url.clone().map(FieldValue::Str).unwrap_or(FieldValue::Null),
        );
        map.insert(
            "service_times".into(),
            self.service_times
                .clone()
                .map(FieldValue::Str)
                .unwrap_or(FieldValue::Null),
        );
        map
    }

    fn validate(&self) -> Result<(), DocumentError> {
        rule_type_tag(TypeTag::ProfileChurch, TypeTag::ProfileChurch)?;
        rule_updated_not_before_created(self.header.created, self.header.updated)?;
        rule_expiry_window(self.touched(), self.header.expires, ExpiryClass::Identity)?;
        optional_email("email", &self.email)?;
        self.header.signature.validate("signature")?;
        Ok(())
    }
}

/// A closed union over the three profile variants, mirroring [`crate::entity::Entity`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Profile {
    /// A person's profile.
    Person(ProfilePerson),
    /// A ministry's profile.
    Ministry(ProfileMinistry),
    /// A church's profile.
    Church(ProfileChurch),
}

impl Document for Profile {
    fn id(&self) -> Uuid {
        match self {
            Profile::Person(p) => p.id(),
            Profile::Ministry(m) => m.id(),
            Profile::Church(c) => c.id(),
        }
    }
    fn type_tag(&self) -> TypeTag {
        match self {
            Profile::Person(p) => p.type_tag(),
            Profile::Ministry(m) => m.type_tag(),
            Profile::Church(c) => c.type_tag(),
        }
    }
    fn issuer(&self) -> Uuid {
        match self {
            Profile::Person(p) => p.issuer(),
            Profile::Ministry(m) => m.issuer(),
            Profile::Church(c) => c.issuer(),
        }
    }
    fn created(&self) -> NaiveDate {
        match self {
            Profile::Person(p) => p.created(),
            Profile::Ministry(m) => m.created(),
            Profile::Church(c) => c.created(),
        }
    }
    fn updated(&self) -> Option<NaiveDate> {
        match self {
            Profile::Person(p) => p.updated(),
            Profile::Ministry(m) => m.updated(),
            Profile::Church(c) => c.updated(),
        }
    }
    fn expires(&self) -> NaiveDate {
        match self {
            Profile::Person(p) => p.expires(),
            Profile::Ministry(m) => m.expires(),
            Profile::Church(c) => c.expires(),
        }
    }
    fn signature(&self) -> &SignatureField {
        match self {
            Profile::Person(p) => p.signature(),
            Profile::Ministry(m) => m.signature(),
            Profile::Church(c) => c.signature(),
        }
    }
    fn signature_mut(&mut self) -> &mut SignatureField {
        match self {
            Profile::Person(p) => p.signature_mut(),
            Profile::Ministry(m) => m.signature_mut(),
            Profile::Church(c) => c.signature_mut(),
        }
    }
    fn native_export(&self) -> IndexMap<String, FieldValue> {
        match self {
            Profile::Person(p) => p.native_export(),
            Profile::Ministry(m) => m.native_export(),
            Profile::Church(c) => c.native_export(),
        }
    }
    fn validate(&self) -> Result<(), DocumentError> {
        match self {
            Profile::Person(p) => p.validate(),
            Profile::Ministry(m) => m.validate(),
            Profile::Church(c) => c.validate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::default_identity_expiry;

    #[test]
    fn malformed_email_is_rejected() {
        let created = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut profile = ProfilePerson {
            header: DocHeader {
                id: Uuid::new_v4(),
                created,
                updated: None,
                expires: default_identity_expiry(created),
                issuer: Uuid::new_v4(),
                signature: SignatureField::single(),
            },
            email: Some("not-an-email".into()),
            mobile: None,
            about: None,
        };
        assert!(profile.validate().is_err());
        profile.email = Some("person@example.org".into());
        profile.header.signature.set(vec![9; 64]);
        assert!(profile.validate().is_ok());
    }
}
