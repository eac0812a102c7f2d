//! # Entities (spec section 3)
//!
//! Every actor on the platform — a person, a ministry, or a church — is a
//! self-issued entity document: `issuer == id`, established at generation
//! time (spec section 4.11) and never changed afterwards.

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use indexmap::IndexMap;
use uuid::Uuid;

use crate::document::{rule_expiry_window, rule_type_tag, rule_updated_not_before_created};
use crate::document::{Document, DocHeader, ExpiryClass, SignatureField};
use crate::error::DocumentError;
use crate::field::{validate_choice, FieldValue};
use crate::type_tag::TypeTag;

/// A person's declared sex (spec section 3). `Undefined` is a legitimate,
/// final answer, not a placeholder for "unknown".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    /// Man.
    Man,
    /// Woman.
    Woman,
    /// Declines to state, or does not identify with either.
    Undefined,
}

/// The admitted [`Sex`] choice strings, in the order spec section 3 lists
/// them.
pub const SEX_CHOICES: &[&str] = &["man", "woman", "undefined"];

impl Sex {
    /// The field's canonical string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Man => "man",
            Sex::Woman => "woman",
            Sex::Undefined => "undefined",
        }
    }

    /// Parse from the field's canonical string form.
    pub fn parse(s: &str) -> Result<Self, DocumentError> {
        validate_choice("sex", s, SEX_CHOICES)?;
        Ok(match s {
            "man" => Sex::Man,
            "woman" => Sex::Woman,
            _ => Sex::Undefined,
        })
    }
}

/// A natural person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    /// Shared document header (id/created/updated/expires/issuer/signature).
    pub header: DocHeader,
    /// Given (first) name. Invariant: must appear in `names`.
    pub given_name: String,
    /// Family (last) name.
    pub family_name: String,
    /// All names this person is known by, including `given_name`.
    pub names: Vec<String>,
    /// Declared sex.
    pub sex: Sex,
    /// Date of birth.
    pub born: NaiveDate,
}

impl Person {
    /// Construct a freshly self-issued Person. `header.issuer` must equal
    /// `header.id` — callers should use [`crate::document::DocHeader`]
    /// constructed with a freshly generated id and pass it here directly.
    pub fn new(
        header: DocHeader,
        given_name: String,
        family_name: String,
        names: Vec<String>,
        sex: Sex,
        born: NaiveDate,
    ) -> Self {
        Self {
            header,
            given_name,
            family_name,
            names,
            sex,
            born,
        }
    }
}

impl Document for Person {
    fn id(&self) -> Uuid {
        self.header.id
    }
    fn type_tag(&self) -> TypeTag {
        TypeTag::EntityPerson
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
        map.insert("type".into(), FieldValue::Int(TypeTag::EntityPerson.into()));
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
        map.insert("given_name".into(), FieldValue::Str(self.given_name.clone()));
        map.insert("family_name".into(), FieldValue::Str(self.family_name.clone()));
        map.insert(
            "names".into(),
            FieldValue::List(self.names.iter().cloned().map(FieldValue::Str).collect()),
        );
        map.insert("sex".into(), FieldValue::Str(self.sex.as_str().to_string()));
        map.insert("born".into(), FieldValue::Date(self.born));
        map
    }

    fn validate(&self) -> Result<(), DocumentError> {
        rule_type_tag(TypeTag::EntityPerson, TypeTag::EntityPerson)?;
        rule_updated_not_before_created(self.header.created, self.header.updated)?;
        rule_expiry_window(self.touched(), self.header.expires, ExpiryClass::Identity)?;
        if !self.names.iter().any(|n| n == &self.given_name) {
            return Err(DocumentError::PersonNames {
                given_name: self.given_name.clone(),
            });
        }
        self.header.signature.validate("signature")?;
        Ok(())
    }
}

/// A ministry (a non-person organizational actor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ministry {
    /// Shared document header.
    pub header: DocHeader,
    /// The ministry's name.
    pub ministry: String,
    /// An optional vision/mission statement.
    pub vision: Option<String>,
    /// Founding date.
    pub founded: NaiveDate,
}

impl Document for Ministry {
    fn id(&self) -> Uuid {
        self.header.id
    }
    fn type_tag(&self) -> TypeTag {
        TypeTag::EntityMinistry
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
        map.insert("type".into(), FieldValue::Int(TypeTag::EntityMinistry.into()));
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
        map.insert("ministry".into(), FieldValue::Str(self.ministry.clone()));
        map.insert(
            "vision".into(),
            self.vision.clone().map(FieldValue::Str).unwrap_or(FieldValue::Null),
        );
        map.insert("founded".into(), FieldValue::Date(self.founded));
        map
    }

    fn validate(&self) -> Result<(), DocumentError> {
        rule_type_tag(TypeTag::EntityMinistry, TypeTag::EntityMinistry)?;
        rule_updated_not_before_created(self.header.created, self.header.updated)?;
        rule_expiry_window(self.touched(), self.header.expires, ExpiryClass::Identity)?;
        self.header.signature.validate("signature")?;
        Ok(())
    }
}

/// A church (a congregation-level actor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Church {
    /// Shared document header.
    pub header: DocHeader,
    /// Founding date.
    pub founded: NaiveDate,
    /// City.
    pub city: String,
    /// Region/state, if applicable.
    pub region: Option<String>,
    /// Country, if applicable.
    pub country: Option<String>,
}

impl Document for Church {
    fn id(&self) -> Uuid {
        self.header.id
    }
    fn type_tag(&self) -> TypeTag {
        TypeTag::EntityChurch
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
        map.insert("type".into(), FieldValue::Int(TypeTag::EntityChurch.into()));
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
        map.insert("founded".into(), FieldValue::Date(self.founded));
        map.insert("city".into(), FieldValue::Str(self.city.clone()));
        map.insert(
            "region".into(),
            self.region.clone().map(FieldValue::Str).unwrap_or(FieldValue::Null),
        );
        map.insert(
            "country".into(),
            self.country.clone().map(FieldValue::Str).unwrap_or(FieldValue::Null),
        );
        map
    }

    fn validate(&self) -> Result<(), DocumentError> {
        rule_type_tag(TypeTag::EntityChurch, TypeTag::EntityChurch)?;
        rule_updated_not_before_created(self.header.created, self.header.updated)?;
        rule_expiry_window(self.touched(), self.header.expires, ExpiryClass::Identity)?;
        self.header.signature.validate("signature")?;
        Ok(())
    }
}

/// A closed union over the three entity variants (spec section 9's design
/// note: a sealed tagged union in place of dynamic dispatch for documents
/// referenced generically, e.g. by a portfolio).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Entity {
    /// A natural person.
    Person(Person),
    /// A ministry.
    Ministry(Ministry),
    /// A church.
    Church(Church),
}

impl Entity {
    /// The allow-listed fields an [`crate::policy`]-level update may
    /// change for this entity variant (spec section 4.10), beyond
    /// `signature` and `updated` which are always permitted to change.
    pub fn mutable_fields(&self) -> &'static [&'static str] {
        match self {
            Entity::Person(_) => &["family_name"],
            Entity::Ministry(_) => &["vision", "ministry"],
            Entity::Church(_) => &["region", "country"],
        }
    }
}

impl Document for Entity {
    fn id(&self) -> Uuid {
        match self {
            Entity::Person(p) => p.id(),
            Entity::Ministry(m) => m.id(),
            Entity::Church(c) => c.id(),
        }
    }
    fn type_tag(&self) -> TypeTag {
        match self {
            Entity::Person(p) => p.type_tag(),
            Entity::Ministry(m) => m.type_tag(),
            Entity::Church(c) => c.type_tag(),
        }
    }
    fn issuer(&self) -> Uuid {
        match self {
            Entity::Person(p) => p.issuer(),
            Entity::Ministry(m) => m.issuer(),
            Entity::Church(c) => c.issuer(),
        }
    }
    fn created(&self) -> NaiveDate {
        match self {
            Entity::Person(p) => p.created(),
            Entity::Ministry(m) => m.created(),
            Entity::Church(c) => c.created(),
        }
    }
    fn updated(&self) -> Option<NaiveDate> {
        match self {
            Entity::Person(p) => p.updated(),
            Entity::Ministry(m) => m.updated(),
            Entity::Church(c) => c.updated(),
        }
    }
    fn expires(&self) -> NaiveDate {
        match self {
            Entity::Person(p) => p.expires(),
            Entity::Ministry(m) => m.expires(),
            Entity::Church(c) => c.expires(),
        }
    }
    fn signature(&self) -> &SignatureField {
        match self {
            Entity::Person(p) => p.signature(),
            Entity::Ministry(m) => m.signature(),
            Entity::Church(c) => c.signature(),
        }
    }
    fn signature_mut(&mut self) -> &mut SignatureField {
        match self {
            Entity::Person(p) => p.signature_mut(),
            Entity::Ministry(m) => m.signature_mut(),
            Entity::Church(c) => c.signature_mut(),
        }
    }
    fn native_export(&self) -> IndexMap<String, FieldValue> {
        match self {
            Entity::Person(p) => p.native_export(),
            Entity::Ministry(m) => m.native_export(),
            Entity::Church(c) => c.native_export(),
        }
    }
    fn validate(&self) -> Result<(), DocumentError> {
        match self {
            Entity::Person(p) => p.validate(),
            Entity::Ministry(m) => m.validate(),
            Entity::Church(c) => c.validate(),
        }
    }
}

/// Render a signature slot as its native field value: the bytes of a
/// single signature, or a list for a multi-signature slot, or `Null` if
/// unset.
pub(crate) fn signature_field_value(sig: &SignatureField) -> FieldValue {
    if sig.values().is_empty() {
        return FieldValue::Null;
    }
    if sig.allows_multiple() {
        FieldValue::List(sig.values().iter().cloned().map(FieldValue::Bytes).collect())
    } else {
        FieldValue::Bytes(sig.values()[0].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::default_identity_expiry;

    fn header(id: Uuid, created: NaiveDate) -> DocHeader {
        DocHeader {
            id,
            created,
            updated: None,
            expires: default_identity_expiry(created),
            issuer: id,
            signature: SignatureField::single(),
        }
    }

    #[test]
    fn person_given_name_must_be_in_names() {
        let id = Uuid::new_v4();
        let created = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let person = Person::new(
            header(id, created),
            "Bob".into(),
            "Smith".into(),
            vec!["Alice".into()],
            Sex::Man,
            NaiveDate::from_ymd_opt(1980, 1, 1).unwrap(),
        );
        assert!(matches!(
            person.validate(),
            Err(DocumentError::PersonNames { .. })
        ));
    }

    #[test]
    fn person_with_given_name_in_names_validates_once_signed() {
        let id = Uuid::new_v4();
        let created = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut person = Person::new(
            header(id, created),
            "John".into(),
            "Smith".into(),
            vec!["John".into(), "Edward".into()],
            Sex::Man,
            NaiveDate::from_ymd_opt(1980, 1, 1).unwrap(),
        );
        person.header.signature.set(vec![0u8; 64]);
        assert!(person.validate().is_ok());
        assert_eq!(person.id(), person.issuer());
    }
}
