//! Fresh Ed25519/X25519 key material for entity generation and rotation.

use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use x25519_dalek::{PublicKey, StaticSecret};

/// A freshly generated signing/exchange key pair, in raw byte form ready
/// to embed in a [`covenant_types::keys::Keys`]/[`covenant_types::keys::PrivateKeys`] pair.
pub struct KeyMaterial {
    /// Ed25519 signing key seed.
    pub seed: [u8; 32],
    /// Ed25519 verifying (public) key.
    pub verify: [u8; 32],
    /// X25519 static secret.
    pub secret: [u8; 32],
    /// X25519 public key.
    pub exchange: [u8; 32],
}

/// Generate a fresh signing + exchange key pair from the system RNG.
pub fn generate_key_material() -> KeyMaterial {
    let signing_key = SigningKey::generate(&mut OsRng);
    let secret = StaticSecret::random_from_rng(OsRng);
    let exchange = PublicKey::from(&secret);
    KeyMaterial {
        seed: signing_key.to_bytes(),
        verify: signing_key.verifying_key().to_bytes(),
        secret: secret.to_bytes(),
        exchange: exchange.to_bytes(),
    }
}
