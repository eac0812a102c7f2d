//! # Key rotation policy (spec section 4.9)
//!
//! A rotation mints a fresh [`Keys`]/[`PrivateKeys`] pair, has the
//! outgoing key resign itself onto the new pair (`carried_over`), and has
//! the new pair self-sign (`self_signed`) — both checks [`verify_keys`]
//! performs on the consumer side.

use chrono::NaiveDate;
use uuid::Uuid;

use covenant_crypto::sign;
use covenant_types::document::default_identity_expiry;
use covenant_types::entity::Entity;
use covenant_types::error::PolicyError;
use covenant_types::keys::{Keys, PrivateKeys};

use crate::keygen::generate_key_material;

/// A freshly minted key generation plus the outgoing key's carry-over
/// signature, ready to append to a portfolio's `keys`/`privkeys` lists.
pub struct RotatedKeys {
    /// The new public Keys document, signed by both the outgoing and
    /// incoming key.
    pub keys: Keys,
    /// The new PrivateKeys document, carrying the outgoing key's
    /// signature over it.
    pub privkeys: PrivateKeys,
}

/// Rotate `entity`'s keys: generate a new pair, have `old_keys`/
/// `old_privkeys` sign the new `Keys` document (the carry-over), then
/// self-sign it with the new pair too (spec section 4.9).
pub fn rotate_keys(
    entity: &Entity,
    old_keys: &Keys,
    old_privkeys: &PrivateKeys,
    today: NaiveDate,
) -> Result<RotatedKeys, PolicyError> {
    let material = generate_key_material();
    let keys_id = Uuid::new_v4();
    let expires = default_identity_expiry(today);

    let mut keys = Keys::new(
        keys_id,
        entity.id(),
        today,
        expires,
        material.verify.to_vec(),
        material.exchange.to_vec(),
    );
    let mut privkeys = PrivateKeys::new(
        Uuid::new_v4(),
        entity.id(),
        today,
        expires,
        keys_id,
        material.seed.to_vec(),
        material.secret.to_vec(),
    );

    sign(
        &mut privkeys,
        entity,
        std::slice::from_ref(old_keys),
        std::slice::from_ref(old_privkeys),
        &[],
        false,
        today,
    )?;

    sign(
        &mut keys,
        entity,
        std::slice::from_ref(old_keys),
        std::slice::from_ref(old_privkeys),
        &[],
        true,
        today,
    )?;

    let new_keys_snapshot = keys.clone();
    let new_privkeys_snapshot = privkeys.clone();
    sign(
        &mut keys,
        entity,
        std::slice::from_ref(&new_keys_snapshot),
        std::slice::from_ref(&new_privkeys_snapshot),
        &[],
        true,
        today,
    )?;

    Ok(RotatedKeys { keys, privkeys })
}
