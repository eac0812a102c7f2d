//! # Document verification (spec section 4.6)
//!
//! Unlike signing, a failed verification is a `bool`, never an error
//! (spec section 7): a forged or mismatched signature is an ordinary,
//! expected outcome of checking untrusted input, not a programmer error.

use covenant_types::document::Document;
use covenant_types::entity::Entity;
use covenant_types::keys::Keys;

use crate::canonical::document_data;
use crate::signatures::{Ed25519PublicKey, Ed25519Signature};

/// `verify(doc, signer, exclude)` — true iff some key in `signer_keys`
/// whose validity window covers `doc`'s touch date, issued by
/// `signer_entity`, validates one of `doc`'s signatures.
pub fn verify(doc: &dyn Document, signer_entity: &Entity, signer_keys: &[Keys], exclude: &[&str]) -> bool {
    if doc.issuer() != signer_entity.id() {
        return false;
    }
    let mut data = doc.issuer().as_bytes().to_vec();
    data.extend_from_slice(&document_data(doc, exclude));
    let touched = doc.touched();

    let mut ordered: Vec<&Keys> = signer_keys.iter().collect();
    ordered.sort_by(|a, b| b.created().cmp(&a.created()).then(a.id().cmp(&b.id())));

    for key in ordered {
        if key.issuer() != signer_entity.id() {
            continue;
        }
        if !(key.created() <= touched && touched <= key.expires()) {
            continue;
        }
        if verify_with_key(&data, &key.verify, doc.signature().values()) {
            return true;
        }
    }
    false
}

/// `verify_keys(new_key, signer)` — accept a rotated key only if it is
/// both self-signed and carries a signature that verifies under one of
/// the signer's existing keys (carry-over trust, spec section 4.6).
pub fn verify_keys(new_key: &Keys, signer_entity: &Entity, signer_keys: &[Keys]) -> bool {
    let mut data = new_key.issuer().as_bytes().to_vec();
    data.extend_from_slice(&document_data(new_key, &[]));
    let self_signed = verify_with_key(&data, &new_key.verify, new_key.signature().values());
    let carried_over = verify(new_key, signer_entity, signer_keys, &[]);
    self_signed && carried_over
}

fn verify_with_key(data: &[u8], verify_key: &[u8], signatures: &[Vec<u8>]) -> bool {
    let Ok(key_bytes): Result<[u8; 32], _> = verify_key.to_vec().try_into() else {
        return false;
    };
    let Ok(public_key) = Ed25519PublicKey::from_bytes(key_bytes) else {
        return false;
    };
    signatures.iter().any(|sig| {
        let Ok(sig_bytes): Result<[u8; 64], _> = sig.clone().try_into() else {
            return false;
        };
        public_key
            .verify(data, &Ed25519Signature::from_bytes(sig_bytes))
            .is_ok()
    })
}
