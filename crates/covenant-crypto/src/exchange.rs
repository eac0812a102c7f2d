//! # X25519 key agreement
//!
//! Derives the symmetric key behind envelope sealing (spec section 4.7)
//! from an X25519 Diffie-Hellman exchange. The spec describes this as "a
//! NaCl box", but nothing in the retrieval pack exposes `crypto_box`/
//! `xsalsa20poly1305` directly — `x25519-dalek` for the exchange, `hkdf`
//! to turn the shared point into a key, and the crate's own
//! [`crate::symmetric`] (XChaCha20-Poly1305, already in the teacher's
//! stack) for the AEAD stand in for it (see DESIGN.md).

use hkdf::Hkdf;
use sha2::Sha256;
use x25519_dalek::{PublicKey, StaticSecret};

use crate::errors::CryptoError;
use crate::symmetric::SecretKey;

/// Domain-separation label for the HKDF expand step, binding derived keys
/// to envelope sealing so they can't be confused with a key derived for
/// some other purpose from the same X25519 exchange.
const SEAL_INFO: &[u8] = b"covenant-envelope-seal-v1";

/// Perform an X25519 Diffie-Hellman exchange and derive a 256-bit
/// symmetric key from the shared point via HKDF-SHA256.
pub fn derive_shared_key(local_secret: &[u8], remote_public: &[u8]) -> Result<SecretKey, CryptoError> {
    let secret_bytes: [u8; 32] = local_secret
        .try_into()
        .map_err(|_| CryptoError::InvalidPrivateKey)?;
    let public_bytes: [u8; 32] = remote_public
        .try_into()
        .map_err(|_| CryptoError::InvalidPublicKey)?;

    let secret = StaticSecret::from(secret_bytes);
    let public = PublicKey::from(public_bytes);
    let shared = secret.diffie_hellman(&public);

    let hk = Hkdf::<Sha256>::new(None, shared.as_bytes());
    let mut okm = [0u8; 32];
    hk.expand(SEAL_INFO, &mut okm)
        .map_err(|_| CryptoError::KeyGenerationFailed("hkdf expand failed".into()))?;
    Ok(SecretKey::from_bytes(okm))
}
