//! Testable properties (spec section 8): round-trip, canonicalization,
//! sign/verify, conceal/reveal, envelope state machine, expiry, and
//! statement lifecycle laws, exercised across crate boundaries rather
//! than within a single module's unit tests.

use chrono::NaiveDate;

use covenant_crypto::{conceal, document_data, reveal, sign, verify};
use covenant_policy::{generate_entity, issue_trusted, record_statement, route, validate_trusted, wrap, NewEntity};
use covenant_types::document::{default_message_expiry, rule_expiry_window, DocHeader, Document, ExpiryClass, SignatureField};
use covenant_types::entity::Sex;
use covenant_types::error::{DocumentError, PolicyError};
use covenant_types::message::{Attachment, Message, Share};
use covenant_types::portfolio::Statements;
use covenant_types::serialize::AnyDocument;
use uuid::Uuid;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn person(given: &str, family: &str, today: NaiveDate) -> covenant_types::portfolio::PrivatePortfolio {
    generate_entity(
        NewEntity::Person {
            given_name: given.into(),
            family_name: family.into(),
            names: vec![given.into()],
            sex: Sex::Undefined,
            born: day(1990, 1, 1),
        },
        today,
    )
    .unwrap()
}

/// Law 1/2: a document surviving `validate()` round-trips through the
/// `AnyDocument` wire encoding field-for-field.
#[test]
fn entity_round_trips_through_any_document_bytes() {
    let today = day(2024, 1, 1);
    let portfolio = person("Ada", "Lovelace", today);
    let entity = portfolio.portfolio.entity.clone().unwrap();
    assert!(entity.validate().is_ok());

    let bytes = AnyDocument::from_entity(entity.clone()).to_bytes().unwrap();
    let rebuilt = AnyDocument::from_bytes(&bytes).unwrap();
    match rebuilt {
        AnyDocument::Person(p) => assert_eq!(covenant_types::entity::Entity::Person(p), entity),
        other => panic!("expected a Person variant, got {other:?}"),
    }
}

/// Law 5: canonicalization preserves list element order — two Share
/// messages differing only in attachment order produce different
/// signing bytes.
#[test]
fn canonical_bytes_preserve_attachment_order() {
    let today = day(2024, 1, 1);
    let owner = Uuid::new_v4();
    let a = Attachment {
        name: "a.txt".into(),
        mime: "text/plain".into(),
        data: b"a".to_vec(),
    };
    let b = Attachment {
        name: "b.txt".into(),
        mime: "text/plain".into(),
        data: b"b".to_vec(),
    };
    let header = DocHeader {
        id: Uuid::new_v4(),
        created: today,
        updated: None,
        expires: default_message_expiry(today),
        issuer: Uuid::new_v4(),
        signature: SignatureField::single(),
    };
    let forward = Share {
        header: header.clone(),
        owner,
        reply: None,
        attachments: vec![a.clone(), b.clone()],
    };
    let reversed = Share {
        header,
        owner,
        reply: None,
        attachments: vec![b, a],
    };
    assert_ne!(document_data(&forward, &[]), document_data(&reversed, &[]));
}

/// Law 6: every key in a freshly generated portfolio verifies both the
/// entity and itself.
#[test]
fn fresh_portfolio_self_verifies() {
    let today = day(2024, 1, 1);
    let portfolio = person("Grace", "Hopper", today);
    let entity = portfolio.portfolio.entity.as_ref().unwrap();
    assert!(verify(entity, entity, &portfolio.portfolio.keys, &[]));
    for key in &portfolio.portfolio.keys {
        assert!(verify(key, entity, &portfolio.portfolio.keys, &[]));
    }
}

/// Law 8: signing with a mismatched entity is rejected with
/// `IssuerMismatch`, not silently accepted.
#[test]
fn signing_with_a_mismatched_entity_is_rejected() {
    let today = day(2024, 1, 1);
    let alice = person("Alice", "A", today);
    let bob = person("Bob", "B", today);
    let bob_entity = bob.portfolio.entity.clone().unwrap();

    let mut forged = alice.portfolio.entity.clone().unwrap();
    let outcome = sign(&mut forged, &bob_entity, &bob.portfolio.keys, &bob.privkeys, &[], false, today);
    assert!(matches!(outcome, Err(PolicyError::IssuerMismatch { .. })));
}

/// Law 9/10: `reveal(conceal(m, s, r), r, s) == m`, and tampering any
/// ciphertext byte makes `reveal` fail closed.
#[test]
fn conceal_reveal_round_trips_and_fails_closed_on_tamper() {
    let today = day(2024, 1, 1);
    let sender = person("Sender", "S", today);
    let receiver = person("Receiver", "R", today);
    let sender_privkeys = &sender.privkeys[0];
    let sender_keys = &sender.portfolio.keys[0];
    let receiver_privkeys = &receiver.privkeys[0];
    let receiver_keys = &receiver.portfolio.keys[0];

    let plaintext = b"a private message".to_vec();
    let sealed = conceal(&sender_privkeys.secret, &receiver_keys.exchange, &plaintext).unwrap();
    let revealed = reveal(&receiver_privkeys.secret, &sender_keys.exchange, &sealed).unwrap();
    assert_eq!(revealed, plaintext);

    let mut tampered = sealed.clone();
    let last = tampered.len() - 1;
    tampered[last] ^= 0xFF;
    assert!(reveal(&receiver_privkeys.secret, &sender_keys.exchange, &tampered).is_none());
}

/// Law 13: the header chain's nth header's signed data binds the
/// (n-1)th header's signature — observable as `previous_signature`
/// carrying exactly that value once a second hop is appended.
#[test]
fn header_chain_links_each_hop_to_the_prior_signature() {
    let today = day(2024, 1, 1);
    let sender = person("Chain", "Sender", today);
    let router = person("Chain", "Router", today);
    let recipient = person("Chain", "Recipient", today);
    let sender_entity = sender.portfolio.entity.as_ref().unwrap();
    let router_entity = router.portfolio.entity.as_ref().unwrap();
    let recipient_entity = recipient.portfolio.entity.as_ref().unwrap();

    let mut note = covenant_types::message::Note {
        header: DocHeader {
            id: Uuid::new_v4(),
            created: today,
            updated: None,
            expires: default_message_expiry(today),
            issuer: sender_entity.id(),
            signature: SignatureField::single(),
        },
        owner: recipient_entity.id(),
        reply: None,
        body: "hop test".into(),
    };
    sign(&mut note, sender_entity, &sender.portfolio.keys, &sender.privkeys, &[], false, today).unwrap();
    let message = Message::Note(note);

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

    route(
        &mut envelope,
        router_entity,
        &router.portfolio.keys,
        &router.privkeys,
        node,
        posted,
        today,
    )
    .unwrap();

    assert_eq!(envelope.chain.len(), 2);
    assert_eq!(envelope.chain[1].previous_signature, Some(envelope.chain[0].signature.clone()));
}

/// Law 15: `expires - touched` shorter than the identity class's minimum
/// window fails validation with `ShortExpiry`.
#[test]
fn short_identity_expiry_window_is_rejected() {
    let created = day(2024, 1, 1);
    let too_soon = created + chrono::Duration::days(30);
    let outcome = rule_expiry_window(created, too_soon, ExpiryClass::Identity);
    assert!(matches!(outcome, Err(DocumentError::ShortExpiry { .. })));
}

/// Law 16/17: a freshly issued Trusted statement lands in both the
/// issuer's and owner's buckets, and `validate_trusted` returns it while
/// live.
#[test]
fn trusted_statement_is_mirrored_and_validates_on_both_sides() {
    let today = day(2024, 1, 1);
    let issuer = person("Trust", "Issuer", today);
    let owner = person("Trust", "Owner", today);
    let issuer_entity = issuer.portfolio.entity.as_ref().unwrap();
    let owner_id = owner.portfolio.entity.as_ref().unwrap().id();

    let trusted = issue_trusted(issuer_entity, &issuer.portfolio.keys, &issuer.privkeys, owner_id, today).unwrap();
    let mut issuer_side = Statements::default();
    let mut owner_side = Statements::default();
    record_statement(&mut issuer_side, &mut owner_side, &trusted);

    assert_eq!(issuer_side.trusted.len(), 1);
    assert_eq!(owner_side.trusted.len(), 1);
    assert_eq!(
        validate_trusted(&issuer_side, issuer_entity, &issuer.portfolio.keys, owner_id),
        Some(&trusted)
    );
}
