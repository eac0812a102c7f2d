//! # Document signing (spec section 4.5)

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use covenant_types::document::Document;
use covenant_types::entity::Entity;
use covenant_types::envelope::{Envelope, Header, HeaderOp};
use covenant_types::error::PolicyError;
use covenant_types::keys::{Keys, PrivateKeys};

use crate::canonical::{document_data, header_canonical_bytes};
use crate::signatures::Ed25519KeyPair;

/// Select the key a signing/verification operation should use first: the
/// one with the latest `created`, ties broken by ascending id (spec
/// section 4.9's ordering note).
fn latest_key(keys: &[Keys]) -> Option<&Keys> {
    keys.iter()
        .min_by(|a, b| b.created().cmp(&a.created()).then(a.id().cmp(&b.id())))
}

fn date_str(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

/// No live key exists to sign with — reuses [`PolicyError::KeysExpired`]
/// since the practical effect is identical (no usable key), with the
/// entity's own id standing in for a keys-document id.
fn no_usable_key(entity: Uuid, today: NaiveDate) -> PolicyError {
    PolicyError::KeysExpired {
        keys: entity,
        expires: date_str(today),
    }
}

fn seed_bytes(privkeys: &PrivateKeys) -> Result<[u8; 32], PolicyError> {
    privkeys
        .seed
        .clone()
        .try_into()
        .map_err(|_| no_usable_key(privkeys.issuer(), privkeys.created()))
}

/// Sign `doc` as `signer_entity`, using the latest of `signer_keys` and
/// its matching secret half from `signer_privkeys` (spec section 4.5).
///
/// `today` must be snapshotted by the caller, not read from the clock
/// here (spec section 9's "Randomness and time" design note).
pub fn sign(
    doc: &mut dyn Document,
    signer_entity: &Entity,
    signer_keys: &[Keys],
    signer_privkeys: &[PrivateKeys],
    exclude: &[&str],
    multiple: bool,
    today: NaiveDate,
) -> Result<(), PolicyError> {
    let key = latest_key(signer_keys).ok_or_else(|| no_usable_key(signer_entity.id(), today))?;

    if doc.issuer() != signer_entity.id() || key.issuer() != signer_entity.id() {
        return Err(PolicyError::IssuerMismatch {
            expected: signer_entity.id(),
            actual: doc.issuer(),
        });
    }
    if today > signer_entity.expires() {
        return Err(PolicyError::EntityExpired {
            entity: signer_entity.id(),
            expires: date_str(signer_entity.expires()),
        });
    }
    if today > key.expires() {
        return Err(PolicyError::KeysExpired {
            keys: key.id(),
            expires: date_str(key.expires()),
        });
    }

    if multiple {
        if !doc.signature().allows_multiple() {
            return Err(PolicyError::NotMultipleSignature { document: doc.id() });
        }
    } else if doc.signature().is_set() {
        return Err(PolicyError::AlreadySigned { document: doc.id() });
    }

    let privkeys = signer_privkeys
        .iter()
        .find(|pk| pk.keys_id == key.id())
        .ok_or_else(|| no_usable_key(signer_entity.id(), today))?;

    let mut data = signer_entity.id().as_bytes().to_vec();
    data.extend_from_slice(&document_data(doc, exclude));

    let keypair = Ed25519KeyPair::from_seed(seed_bytes(privkeys)?);
    let signature = keypair.sign(&data);

    if multiple {
        doc.signature_mut().push(signature.as_bytes().to_vec());
    } else {
        doc.signature_mut().set(signature.as_bytes().to_vec());
    }
    Ok(())
}

/// Sign the next header-chain hop for `envelope` (spec section 4.5/4.8).
/// The caller appends the returned [`Header`] to the envelope.
pub fn sign_header(
    envelope: &Envelope,
    op: HeaderOp,
    node: Uuid,
    posted: DateTime<Utc>,
    signer_entity: &Entity,
    signer_keys: &[Keys],
    signer_privkeys: &[PrivateKeys],
    today: NaiveDate,
) -> Result<Header, PolicyError> {
    let key = latest_key(signer_keys).ok_or_else(|| no_usable_key(signer_entity.id(), today))?;
    if today > signer_entity.expires() {
        return Err(PolicyError::EntityExpired {
            entity: signer_entity.id(),
            expires: date_str(signer_entity.expires()),
        });
    }
    if today > key.expires() {
        return Err(PolicyError::KeysExpired {
            keys: key.id(),
            expires: date_str(key.expires()),
        });
    }
    let privkeys = signer_privkeys
        .iter()
        .find(|pk| pk.keys_id == key.id())
        .ok_or_else(|| no_usable_key(signer_entity.id(), today))?;

    // The chain-stored `previous_signature` only ever links header to
    // header (`None` for the first, per `Header`'s own doc comment) —
    // but the *signed* payload still binds all the way back to the
    // envelope's own signature when the chain is empty, per spec
    // section 4.8's "prior_signature is the previous header's signature
    // if any, otherwise the envelope's signature".
    let chain_previous = envelope.chain.last().map(|h| h.signature.clone());
    let signed_prior = chain_previous
        .clone()
        .or_else(|| envelope.signature().latest().map(|s| s.to_vec()));

    let mut data = signed_prior.unwrap_or_default();
    data.extend_from_slice(signer_entity.id().as_bytes());
    data.extend_from_slice(&header_canonical_bytes(op, node, posted));

    let keypair = Ed25519KeyPair::from_seed(seed_bytes(privkeys)?);
    let signature = keypair.sign(&data);

    Ok(Header {
        op,
        node,
        posted,
        signature: signature.as_bytes().to_vec(),
        previous_signature: chain_previous,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_types::document::{default_identity_expiry, DocHeader, SignatureField};
    use covenant_types::entity::{Entity, Person, Sex};
    use ed25519_dalek::{Signer, SigningKey};
    use rand::rngs::OsRng;

    fn identity(today: NaiveDate) -> (Entity, Keys, PrivateKeys) {
        let signing_key = SigningKey::generate(&mut OsRng);
        let id = Uuid::new_v4();
        let header = DocHeader {
            id,
            created: today,
            updated: None,
            expires: default_identity_expiry(today),
            issuer: id,
            signature: SignatureField::single(),
        };
        let person = Entity::Person(Person::new(
            header,
            "John".into(),
            "Smith".into(),
            vec!["John".into()],
            Sex::Man,
            today,
        ));
        let keys_id = Uuid::new_v4();
        let keys = Keys::new(
            keys_id,
            id,
            today,
            default_identity_expiry(today),
            signing_key.verifying_key().to_bytes().to_vec(),
            vec![7u8; 32],
        );
        let privkeys = PrivateKeys::new(
            Uuid::new_v4(),
            id,
            today,
            default_identity_expiry(today),
            keys_id,
            signing_key.to_bytes().to_vec(),
            vec![9u8; 32],
        );
        (person, keys, privkeys)
    }

    #[test]
    fn self_sign_then_verify_round_trips() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let (mut person, keys, privkeys) = identity(today);
        let signer = person.clone();
        sign(
            &mut person,
            &signer,
            std::slice::from_ref(&keys),
            std::slice::from_ref(&privkeys),
            &[],
            false,
            today,
        )
        .unwrap();
        assert!(person.signature().is_set());
    }

    #[test]
    fn already_signed_single_slot_rejects_a_second_signature() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let (mut person, keys, privkeys) = identity(today);
        let signer = person.clone();
        sign(
            &mut person,
            &signer,
            std::slice::from_ref(&keys),
            std::slice::from_ref(&privkeys),
            &[],
            false,
            today,
        )
        .unwrap();
        let again = sign(
            &mut person,
            &signer,
            std::slice::from_ref(&keys),
            std::slice::from_ref(&privkeys),
            &[],
            false,
            today,
        );
        assert!(matches!(again, Err(PolicyError::AlreadySigned { .. })));
    }

    #[test]
    fn expired_entity_is_rejected() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let (mut person, keys, privkeys) = identity(today);
        let signer = person.clone();
        let far_future = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        let outcome = sign(
            &mut person,
            &signer,
            std::slice::from_ref(&keys),
            std::slice::from_ref(&privkeys),
            &[],
            false,
            far_future,
        );
        assert!(matches!(outcome, Err(PolicyError::EntityExpired { .. })));
    }
}
