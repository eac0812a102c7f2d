//! # Conceal / reveal — envelope body sealing (spec section 4.7)
//!
//! Pure sealing mechanics: given the two X25519 keys involved, encrypt
//! or decrypt a message body. The entity/key precondition checks spec
//! section 4.7 lists (issuer identities match, all four parties
//! non-expired) are a policy concern and live in `covenant-policy`'s
//! envelope wrap/open flow (spec section 4.8), which calls these two
//! functions for the actual cryptography.

use crate::errors::CryptoError;
use crate::exchange::derive_shared_key;
use crate::symmetric::{decrypt, encrypt, Nonce};

const NONCE_LEN: usize = 24;

/// Encrypt `plaintext` under the shared key derived from `sender_secret`
/// (X25519 static secret) and `receiver_public` (X25519 public key).
/// Returns `nonce || ciphertext`.
pub fn conceal(
    sender_secret: &[u8],
    receiver_public: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let key = derive_shared_key(sender_secret, receiver_public)?;
    let (ciphertext, nonce) = encrypt(&key, plaintext)?;
    let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    sealed.extend_from_slice(nonce.as_bytes());
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

/// Decrypt a body sealed by [`conceal`]. Returns `None` on any failure —
/// wrong keys, a malformed envelope, or a tampered ciphertext — rather
/// than an error, matching the non-throwing posture spec section 4.6
/// requires of signature verification.
pub fn reveal(receiver_secret: &[u8], sender_public: &[u8], sealed: &[u8]) -> Option<Vec<u8>> {
    if sealed.len() < NONCE_LEN {
        return None;
    }
    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
    let key = derive_shared_key(receiver_secret, sender_public).ok()?;
    let nonce = Nonce::from_bytes(nonce_bytes.try_into().ok()?);
    decrypt(&key, ciphertext, &nonce).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use x25519_dalek::{PublicKey, StaticSecret};

    #[test]
    fn conceal_then_reveal_round_trips() {
        let sender = StaticSecret::random_from_rng(rand::thread_rng());
        let receiver = StaticSecret::random_from_rng(rand::thread_rng());
        let sender_public = PublicKey::from(&sender);
        let receiver_public = PublicKey::from(&receiver);

        let sealed = conceal(
            &sender.to_bytes(),
            receiver_public.as_bytes(),
            b"the letter's contents",
        )
        .unwrap();

        let opened = reveal(&receiver.to_bytes(), sender_public.as_bytes(), &sealed).unwrap();
        assert_eq!(opened, b"the letter's contents");
    }

    #[test]
    fn reveal_with_wrong_key_fails_closed() {
        let sender = StaticSecret::random_from_rng(rand::thread_rng());
        let receiver = StaticSecret::random_from_rng(rand::thread_rng());
        let impostor = StaticSecret::random_from_rng(rand::thread_rng());
        let receiver_public = PublicKey::from(&receiver);
        let sender_public = PublicKey::from(&sender);

        let sealed = conceal(&sender.to_bytes(), receiver_public.as_bytes(), b"secret").unwrap();
        assert!(reveal(&impostor.to_bytes(), sender_public.as_bytes(), &sealed).is_none());
    }

    #[test]
    fn tampered_ciphertext_fails_closed() {
        let sender = StaticSecret::random_from_rng(rand::thread_rng());
        let receiver = StaticSecret::random_from_rng(rand::thread_rng());
        let receiver_public = PublicKey::from(&receiver);
        let sender_public = PublicKey::from(&sender);

        let mut sealed = conceal(&sender.to_bytes(), receiver_public.as_bytes(), b"secret").unwrap();
        let last = sealed.len() - 1;
        sealed[last] ^= 0xFF;
        assert!(reveal(&receiver.to_bytes(), sender_public.as_bytes(), &sealed).is_none());
    }
}
