//! Concrete end-to-end scenarios, S1-S6 (spec section 8).

use chrono::NaiveDate;

use covenant_policy::{rotate_keys, ImportUpdatePolicy};
use covenant_policy::{generate_entity, issue_revoked, issue_verified, route, validate_verified, wrap, NewEntity};
use covenant_types::document::Document;
use covenant_types::entity::Sex;
use covenant_types::error::{DocumentError, PolicyError};
use covenant_types::message::{Attachment, Mail};
use covenant_types::message::Message;
use covenant_types::portfolio::Statements;
use uuid::Uuid;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn s1_person_creation() {
    let today = day(2024, 1, 1);
    let portfolio = generate_entity(
        NewEntity::Person {
            given_name: "John".into(),
            family_name: "Smith".into(),
            names: vec!["John".into(), "Edward".into()],
            sex: Sex::Man,
            born: day(1980, 1, 1),
        },
        today,
    )
    .unwrap();

    let entity = portfolio.portfolio.entity.as_ref().unwrap();
    assert_eq!(entity.id(), entity.issuer());
    assert_eq!(portfolio.portfolio.keys.len(), 1);
    assert!(entity.validate().is_ok());
    assert!(covenant_crypto::verify(entity, entity, &portfolio.portfolio.keys, &[]));
}

#[test]
fn s2_person_without_given_name_in_names() {
    let today = day(2024, 1, 1);
    let result = generate_entity(
        NewEntity::Person {
            given_name: "Bob".into(),
            family_name: "Anybody".into(),
            names: vec!["Alice".into()],
            sex: Sex::Man,
            born: day(1980, 1, 1),
        },
        today,
    );
    assert!(matches!(
        result,
        Err(PolicyError::Document(DocumentError::PersonNames { .. }))
    ));
}

#[test]
fn s3_key_rotation() {
    let today = day(2024, 1, 1);
    let mut portfolio = generate_entity(
        NewEntity::Person {
            given_name: "Rosa".into(),
            family_name: "Parks".into(),
            names: vec!["Rosa".into()],
            sex: Sex::Woman,
            born: day(1913, 2, 4),
        },
        today,
    )
    .unwrap();
    let entity = portfolio.portfolio.entity.clone().unwrap();
    let old_keys = portfolio.portfolio.keys[0].clone();
    let old_privkeys = portfolio.privkeys[0].clone();

    let rotated = rotate_keys(&entity, &old_keys, &old_privkeys, today).unwrap();

    assert!(covenant_crypto::verify(
        &entity,
        &entity,
        std::slice::from_ref(&old_keys),
        &[]
    ));
    assert!(rotated.keys.signature().values().len() >= 2);
    assert_eq!(rotated.keys.issuer(), entity.id());

    portfolio.portfolio.keys.push(rotated.keys.clone());
    portfolio.privkeys.push(rotated.privkeys);

    let update_policy = ImportUpdatePolicy {
        entity: &entity,
        keys: std::slice::from_ref(&old_keys),
        today,
    };
    assert!(update_policy.keys(&rotated.keys));
}

fn mail_from(issuer: Uuid, owner: Uuid, today: NaiveDate) -> Mail {
    use covenant_types::document::{default_message_expiry, DocHeader, SignatureField};
    Mail {
        header: DocHeader {
            id: Uuid::new_v4(),
            created: today,
            updated: None,
            expires: default_message_expiry(today),
            issuer,
            signature: SignatureField::single(),
        },
        owner,
        reply: None,
        subject: "hi".into(),
        body: "world".into(),
        attachments: vec![Attachment {
            name: "a.txt".into(),
            mime: "text/plain".into(),
            data: b"payload".to_vec(),
        }],
    }
}

#[test]
fn s4_envelope_round_trip() {
    let today = day(2024, 1, 1);
    let sender = generate_entity(
        NewEntity::Person {
            given_name: "Sender".into(),
            family_name: "One".into(),
            names: vec!["Sender".into()],
            sex: Sex::Undefined,
            born: day(1990, 1, 1),
        },
        today,
    )
    .unwrap();
    let recipient = generate_entity(
        NewEntity::Person {
            given_name: "Recipient".into(),
            family_name: "Two".into(),
            names: vec!["Recipient".into()],
            sex: Sex::Undefined,
            born: day(1990, 1, 1),
        },
        today,
    )
    .unwrap();
    let sender_entity = sender.portfolio.entity.as_ref().unwrap();
    let recipient_entity = recipient.portfolio.entity.as_ref().unwrap();

    let mut mail = mail_from(sender_entity.id(), recipient_entity.id(), today);
    covenant_crypto::sign(
        &mut mail,
        sender_entity,
        &sender.portfolio.keys,
        &sender.privkeys,
        &[],
        false,
        today,
    )
    .unwrap();
    let message = Message::Mail(mail.clone());

    let node = Uuid::new_v4();
    let posted = chrono::DateTime::<chrono::Utc>::from_timestamp(1_700_000_000, 0).unwrap();
    let mut envelope = wrap(
        &message,
        sender_entity,
        &sender.portfolio.keys,
        &sender.privkeys,
        recipient_entity,
        &recipient.portfolio.keys,
        node,
        posted,
        today,
    )
    .unwrap();

    let opened = covenant_policy::open(
        &mut envelope,
        sender_entity,
        &sender.portfolio.keys,
        recipient_entity,
        &recipient.portfolio.keys,
        &recipient.privkeys,
        node,
        posted,
        today,
    )
    .unwrap();

    assert_eq!(opened, Some(Message::Mail(mail)));
}

#[test]
fn s5_envelope_reopen_is_forbidden() {
    let today = day(2024, 1, 1);
    let sender = generate_entity(
        NewEntity::Person {
            given_name: "Router".into(),
            family_name: "Sender".into(),
            names: vec!["Router".into()],
            sex: Sex::Undefined,
            born: day(1990, 1, 1),
        },
        today,
    )
    .unwrap();
    let recipient = generate_entity(
        NewEntity::Person {
            given_name: "Router".into(),
            family_name: "Recipient".into(),
            names: vec!["Router".into()],
            sex: Sex::Undefined,
            born: day(1990, 1, 1),
        },
        today,
    )
    .unwrap();
    let sender_entity = sender.portfolio.entity.as_ref().unwrap();
    let recipient_entity = recipient.portfolio.entity.as_ref().unwrap();

    let mut mail = mail_from(sender_entity.id(), recipient_entity.id(), today);
    covenant_crypto::sign(
        &mut mail,
        sender_entity,
        &sender.portfolio.keys,
        &sender.privkeys,
        &[],
        false,
        today,
    )
    .unwrap();
    let message = Message::Mail(mail);

    let node = Uuid::new_v4();
    let posted = chrono::DateTime::<chrono::Utc>::from_timestamp(1_700_000_000, 0).unwrap();
    let mut envelope = wrap(
        &message,
        sender_entity,
        &sender.portfolio.keys,
        &sender.privkeys,
        recipient_entity,
        &recipient.portfolio.keys,
        node,
        posted,
        today,
    )
    .unwrap();
    covenant_policy::open(
        &mut envelope,
        sender_entity,
        &sender.portfolio.keys,
        recipient_entity,
        &recipient.portfolio.keys,
        &recipient.privkeys,
        node,
        posted,
        today,
    )
    .unwrap();

    let router = recipient;
    let router_entity = router.portfolio.entity.as_ref().unwrap();
    let outcome = route(
        &mut envelope,
        router_entity,
        &router.portfolio.keys,
        &router.privkeys,
        node,
        posted,
        today,
    );
    assert!(matches!(outcome, Err(PolicyError::AlreadyReceived { .. })));
}

#[test]
fn s6_statement_revocation() {
    let today = day(2024, 1, 1);
    let issuer = generate_entity(
        NewEntity::Church {
            founded: day(1900, 1, 1),
            city: "Selma".into(),
            region: None,
            country: None,
        },
        today,
    )
    .unwrap();
    let owner = generate_entity(
        NewEntity::Person {
            given_name: "Owner".into(),
            family_name: "Person".into(),
            names: vec!["Owner".into()],
            sex: Sex::Undefined,
            born: day(1990, 1, 1),
        },
        today,
    )
    .unwrap();
    let issuer_entity = issuer.portfolio.entity.as_ref().unwrap();
    let owner_id = owner.portfolio.entity.as_ref().unwrap().id();

    let verified = issue_verified(issuer_entity, &issuer.portfolio.keys, &issuer.privkeys, owner_id, today).unwrap();
    let mut issuer_side = Statements::default();
    let mut owner_side = Statements::default();
    covenant_policy::record_statement(&mut issuer_side, &mut owner_side, &verified);

    let before_revocation = validate_verified(&issuer_side, issuer_entity, &issuer.portfolio.keys, owner_id);
    assert_eq!(before_revocation, Some(&verified));

    let revocation = issue_revoked(
        issuer_entity,
        &issuer.portfolio.keys,
        &issuer.privkeys,
        verified.id(),
        today,
    )
    .unwrap();
    covenant_policy::record_statement(&mut issuer_side, &mut owner_side, &revocation);

    assert!(issuer_side.revoked.iter().any(|r| r.issuance() == Some(verified.id())));
    assert!(validate_verified(&issuer_side, issuer_entity, &issuer.portfolio.keys, owner_id).is_none());
}
