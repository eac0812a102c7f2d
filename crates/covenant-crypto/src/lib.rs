//! # Covenant Crypto - Document Signing and Sealing
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `canonical` | — | Deterministic signing-input bytes for a document |
//! | `sign` / `verify` | Ed25519 | Document and header-chain signatures |
//! | `exchange` | X25519 + HKDF-SHA256 | Shared key derivation for sealing |
//! | `seal` | XChaCha20-Poly1305 | Envelope body conceal/reveal |
//! | `symmetric` | XChaCha20-Poly1305 | Encryption primitive used by `seal` |
//! | `signatures` | Ed25519 | Low-level keypair/signature wrapper |
//!
//! ## Security Properties
//!
//! - **XChaCha20-Poly1305**: 192-bit nonce, constant-time, side-channel immune
//! - **Ed25519**: Deterministic nonces, no RNG dependency
//! - **X25519 + HKDF-SHA256**: standard Diffie-Hellman key agreement, keys
//!   domain-separated by purpose before use

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod canonical;
pub mod errors;
pub mod exchange;
pub mod seal;
pub mod sign;
pub mod signatures;
pub mod symmetric;
pub mod verify;

// Re-exports
pub use canonical::{document_data, header_canonical_bytes};
pub use errors::CryptoError;
pub use seal::{conceal, reveal};
pub use sign::{sign, sign_header};
pub use signatures::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use symmetric::{decrypt, encrypt, Nonce, SecretKey};
pub use verify::{verify, verify_keys};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
