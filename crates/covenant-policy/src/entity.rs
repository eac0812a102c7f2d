//! # Entity generation policies (spec section 4.11)
//!
//! An entity is always the first document minted for a new identity: a
//! freshly generated key pair signs it, and the matching [`Keys`]/
//! [`PrivateKeys`] pair is self-signed once. `renew`/`change` cover the
//! two ways an existing entity can later be legally mutated.

use chrono::NaiveDate;
use uuid::Uuid;

use covenant_crypto::sign;
use covenant_types::document::{default_identity_expiry, DocHeader, Document, SignatureField};
use covenant_types::entity::{Church, Entity, Ministry, Person, Sex};
use covenant_types::error::PolicyError;
use covenant_types::keys::{Keys, PrivateKeys};
use covenant_types::portfolio::{Portfolio, PrivatePortfolio};

use crate::keygen::generate_key_material;

/// The data needed to mint a brand-new entity, one variant per kind.
pub enum NewEntity {
    /// A natural person.
    Person {
        /// Given (first) name. Must appear in `names`.
        given_name: String,
        /// Family (last) name.
        family_name: String,
        /// All names this person is known by.
        names: Vec<String>,
        /// Declared sex.
        sex: Sex,
        /// Date of birth.
        born: NaiveDate,
    },
    /// A ministry.
    Ministry {
        /// The ministry's name.
        ministry: String,
        /// An optional vision/mission statement.
        vision: Option<String>,
        /// Founding date.
        founded: NaiveDate,
    },
    /// A church.
    Church {
        /// Founding date.
        founded: NaiveDate,
        /// City.
        city: String,
        /// Region/state, if applicable.
        region: Option<String>,
        /// Country, if applicable.
        country: Option<String>,
    },
}

fn fresh_header(id: Uuid, today: NaiveDate) -> DocHeader {
    DocHeader {
        id,
        created: today,
        updated: None,
        expires: default_identity_expiry(today),
        issuer: id,
        signature: SignatureField::single(),
    }
}

/// Generate a brand-new self-issued entity plus its first key generation,
/// assembled into a [`PrivatePortfolio`] (spec section 4.11's "Entity
/// generate"). The entity self-signs; the Keys document carries a single
/// self-signature too, since nothing has rotated yet.
pub fn generate_entity(request: NewEntity, today: NaiveDate) -> Result<PrivatePortfolio, PolicyError> {
    let id = Uuid::new_v4();
    let header = fresh_header(id, today);

    let mut entity = match request {
        NewEntity::Person {
            given_name,
            family_name,
            names,
            sex,
            born,
        } => Entity::Person(Person::new(header, given_name, family_name, names, sex, born)),
        NewEntity::Ministry {
            ministry,
            vision,
            founded,
        } => Entity::Ministry(Ministry {
            header,
            ministry,
            vision,
            founded,
        }),
        NewEntity::Church {
            founded,
            city,
            region,
            country,
        } => Entity::Church(Church {
            header,
            founded,
            city,
            region,
            country,
        }),
    };
    entity.validate()?;

    let material = generate_key_material();
    let keys_id = Uuid::new_v4();
    let mut keys = Keys::new(
        keys_id,
        id,
        today,
        default_identity_expiry(today),
        material.verify.to_vec(),
        material.exchange.to_vec(),
    );
    let privkeys = PrivateKeys::new(
        Uuid::new_v4(),
        id,
        today,
        default_identity_expiry(today),
        keys_id,
        material.seed.to_vec(),
        material.secret.to_vec(),
    );

    let signer_snapshot = entity.clone();
    sign(
        &mut entity,
        &signer_snapshot,
        std::slice::from_ref(&keys),
        std::slice::from_ref(&privkeys),
        &[],
        false,
        today,
    )?;

    let keys_snapshot = keys.clone();
    sign(
        &mut keys,
        &signer_snapshot,
        std::slice::from_ref(&keys_snapshot),
        std::slice::from_ref(&privkeys),
        &[],
        true,
        today,
    )?;

    Ok(PrivatePortfolio {
        portfolio: Portfolio {
            entity: Some(entity),
            profile: None,
            keys: vec![keys],
            network: None,
            issuer_statements: Default::default(),
            owner_statements: Default::default(),
        },
        privkeys: vec![privkeys],
        domain: None,
        nodes: Vec::new(),
    })
}

fn touch(header: &mut DocHeader, today: NaiveDate) {
    header.updated = Some(today);
    header.expires = default_identity_expiry(today);
    header.signature.begin_redo();
}

/// Renew an entity nearing expiry: bump `updated`/`expires` and resign
/// with the current key (spec section 4.11's "Entity update/renew").
pub fn renew_entity(
    entity: &mut Entity,
    keys: &[Keys],
    privkeys: &[PrivateKeys],
    today: NaiveDate,
) -> Result<(), PolicyError> {
    let signer_snapshot = entity.clone();
    match entity {
        Entity::Person(p) => touch(&mut p.header, today),
        Entity::Ministry(m) => touch(&mut m.header, today),
        Entity::Church(c) => touch(&mut c.header, today),
    }
    sign(entity, &signer_snapshot, keys, privkeys, &[], false, today)
}

/// Change a person's mutable `family_name` (spec section 4.11's "Entity
/// change"; `family_name` is the only field [`Entity::mutable_fields`]
/// allow-lists for a [`Person`]).
pub fn change_person(
    person: &mut Person,
    family_name: String,
    keys: &[Keys],
    privkeys: &[PrivateKeys],
    today: NaiveDate,
) -> Result<(), PolicyError> {
    let signer_snapshot = Entity::Person(person.clone());
    person.family_name = family_name;
    person.header.signature.begin_redo();
    sign(person, &signer_snapshot, keys, privkeys, &[], false, today)
}

/// Change a ministry's mutable `ministry` name and/or `vision`.
pub fn change_ministry(
    ministry: &mut Ministry,
    new_ministry: Option<String>,
    new_vision: Option<Option<String>>,
    keys: &[Keys],
    privkeys: &[PrivateKeys],
    today: NaiveDate,
) -> Result<(), PolicyError> {
    let signer_snapshot = Entity::Ministry(ministry.clone());
    if let Some(name) = new_ministry {
        ministry.ministry = name;
    }
    if let Some(vision) = new_vision {
        ministry.vision = vision;
    }
    ministry.header.signature.begin_redo();
    sign(ministry, &signer_snapshot, keys, privkeys, &[], false, today)
}

/// Change a church's mutable `region` and/or `country`.
pub fn change_church(
    church: &mut Church,
    new_region: Option<Option<String>>,
    new_country: Option<Option<String>>,
    keys: &[Keys],
    privkeys: &[PrivateKeys],
    today: NaiveDate,
) -> Result<(), PolicyError> {
    let signer_snapshot = Entity::Church(church.clone());
    if let Some(region) = new_region {
        church.region = region;
    }
    if let Some(country) = new_country {
        church.country = country;
    }
    church.header.signature.begin_redo();
    sign(church, &signer_snapshot, keys, privkeys, &[], false, today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_crypto::verify;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn generate_entity_produces_a_self_verifying_portfolio() {
        let portfolio = generate_entity(
            NewEntity::Person {
                given_name: "Ada".into(),
                family_name: "Lovelace".into(),
                names: vec!["Ada".into()],
                sex: Sex::Woman,
                born: NaiveDate::from_ymd_opt(1980, 1, 1).unwrap(),
            },
            today(),
        )
        .unwrap();

        let entity = portfolio.portfolio.entity.as_ref().unwrap();
        assert!(entity.validate().is_ok());
        let keys = &portfolio.portfolio.keys[0];
        assert!(keys.validate().is_ok());
        assert!(verify(entity, entity, &portfolio.portfolio.keys, &[]));
        assert!(verify(keys, entity, &portfolio.portfolio.keys, &[]));
    }

    #[test]
    fn renew_extends_expiry_and_resigns() {
        let mut portfolio = generate_entity(
            NewEntity::Ministry {
                ministry: "Streetlight".into(),
                vision: None,
                founded: NaiveDate::from_ymd_opt(2010, 1, 1).unwrap(),
            },
            today(),
        )
        .unwrap();
        let later = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let entity = portfolio.portfolio.entity.as_mut().unwrap();
        let old_expires = entity.expires();
        renew_entity(entity, &portfolio.portfolio.keys, &portfolio.privkeys, later).unwrap();
        assert!(entity.expires() > old_expires);
        assert!(verify(entity, entity, &portfolio.portfolio.keys, &[]));
    }

    #[test]
    fn change_person_only_touches_family_name() {
        let mut portfolio = generate_entity(
            NewEntity::Person {
                given_name: "Grace".into(),
                family_name: "Hopper".into(),
                names: vec!["Grace".into()],
                sex: Sex::Woman,
                born: NaiveDate::from_ymd_opt(1906, 12, 9).unwrap(),
            },
            today(),
        )
        .unwrap();
        let entity = portfolio.portfolio.entity.as_mut().unwrap();
        let Entity::Person(person) = entity else {
            unreachable!()
        };
        change_person(
            person,
            "Murray".into(),
            &portfolio.portfolio.keys,
            &portfolio.privkeys,
            today(),
        )
        .unwrap();
        assert_eq!(person.family_name, "Murray");
        assert_eq!(person.given_name, "Grace");
    }
}
