//! Shared document types for the covenant identity and policy engine:
//! the field system, the document model, every concrete document kind,
//! and the portfolio/selection-group machinery that groups them.
//!
//! Cryptographic operations (canonicalization, signing, verification,
//! sealing) live in `covenant-crypto`; generation and acceptance
//! policies live in `covenant-policy`. This crate only knows how
//! documents are shaped and validated structurally.

pub mod document;
pub mod entity;
pub mod envelope;
pub mod error;
pub mod field;
pub mod groups;
pub mod keys;
pub mod message;
pub mod network;
pub mod portfolio;
pub mod profile;
pub mod serialize;
pub mod statement;
pub mod type_tag;

pub use document::Document;
pub use error::{DocumentError, FieldError, PolicyError};
pub use serialize::AnyDocument;
pub use type_tag::TypeTag;
