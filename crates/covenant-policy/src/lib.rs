//! # Covenant Policy - Generation, Acceptance, and Flow
//!
//! ## Components
//!
//! | Module | Covers |
//! |--------|--------|
//! | `keygen` | Raw Ed25519/X25519 key material generation |
//! | `entity` | Entity generate/renew/change (spec section 4.11) |
//! | `keys` | Key rotation (spec section 4.9) |
//! | `network` | Domain/Node/Network generation (spec section 4.3) |
//! | `statement` | Statement issuance and validation (spec section 4.11) |
//! | `accept` | Import/update acceptance policy (spec section 4.10) |
//! | `flow` | Envelope wrap/route/open (spec section 4.8) |
//! | `net` | Host introspection used by `network::generate_node` |
//!
//! None of these functions read the system clock: every caller snapshots
//! `today` once and threads it through, so a policy decision is always
//! reproducible from its inputs (spec section 9's "Randomness and time").

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod accept;
pub mod entity;
pub mod flow;
pub mod keygen;
pub mod keys;
pub mod net;
pub mod network;
pub mod statement;

pub use accept::{ImportPolicy, ImportUpdatePolicy};
pub use entity::{change_church, change_ministry, change_person, generate_entity, renew_entity, NewEntity};
pub use flow::{open, route, wrap};
pub use keygen::{generate_key_material, KeyMaterial};
pub use keys::{rotate_keys, RotatedKeys};
pub use net::{Net, SystemNet};
pub use network::{generate_domain, generate_network, generate_node};
pub use statement::{issue_revoked, issue_trusted, issue_verified, record_statement, validate_trusted, validate_verified};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
