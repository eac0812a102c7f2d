//! Error taxonomy for the field system, document model, and policy layers.
//!
//! Mirrors the kinds (not the exact type names) enumerated in spec section 7:
//! field errors, document errors, and policy errors. Verification failure is
//! deliberately *not* part of this taxonomy — `verify` returns `bool`.

use thiserror::Error;
use uuid::Uuid;

/// Errors raised while validating or converting a single field's value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FieldError {
    /// A required field carried no value.
    #[error("field `{field}` is required but not set")]
    NotSet {
        /// Name of the offending field.
        field: String,
    },

    /// A single-valued field was given more than one value.
    #[error("field `{field}` does not admit multiple values")]
    IsMultiple {
        /// Name of the offending field.
        field: String,
    },

    /// A multi-valued field was given a bare scalar.
    #[error("field `{field}` requires multiple values")]
    NotMultiple {
        /// Name of the offending field.
        field: String,
    },

    /// The value's runtime type is outside the field's admitted type set.
    #[error("field `{field}` has an invalid type")]
    InvalidType {
        /// Name of the offending field.
        field: String,
    },

    /// A byte-limited field exceeded its declared limit.
    #[error("field `{field}` is {actual} bytes, limit is {limit}")]
    BeyondLimit {
        /// Name of the offending field.
        field: String,
        /// Declared limit in bytes.
        limit: usize,
        /// Actual size in bytes.
        actual: usize,
    },

    /// A choice field received a value outside its enumerated set.
    #[error("field `{field}` value `{value}` is not an admitted choice")]
    InvalidChoice {
        /// Name of the offending field.
        field: String,
        /// The rejected value.
        value: String,
    },

    /// A regex field's value did not match the configured pattern.
    #[error("field `{field}` value does not match the configured pattern")]
    InvalidRegex {
        /// Name of the offending field.
        field: String,
    },

    /// An email field's value is not a syntactically valid address.
    #[error("field `{field}` value is not a valid email address")]
    InvalidEmail {
        /// Name of the offending field.
        field: String,
    },
}

/// Errors raised while validating a whole document's structural invariants.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DocumentError {
    /// A field-level error surfaced while validating a document.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// The document's declared `type` tag does not match the expected one.
    #[error("document has type tag {actual:?}, expected {expected:?}")]
    InvalidType {
        /// Expected type tag.
        expected: u32,
        /// Actual type tag found on the document.
        actual: u32,
    },

    /// `expires - touched` is shorter than the type's minimum validity window.
    #[error("document expiry window is too short: {actual_days} days, minimum {minimum_days}")]
    ShortExpiry {
        /// Minimum number of days required.
        minimum_days: i64,
        /// Actual number of days between touch date and expiry.
        actual_days: i64,
    },

    /// `updated` is set but predates `created`.
    #[error("document `updated` ({updated}) predates `created` ({created})")]
    UpdatedNotLatest {
        /// The `created` date.
        created: String,
        /// The offending `updated` date.
        updated: String,
    },

    /// A Person's `given_name` is not a member of `names`.
    #[error("given_name `{given_name}` is not present in names list")]
    PersonNames {
        /// The offending given name.
        given_name: String,
    },

    /// A server-role Node carries no hostname or IP.
    #[error("server node `{node}` declares no hostname or IP")]
    NoLocation {
        /// The offending node id.
        node: Uuid,
    },

    /// A Network carries no host with a hostname or IP.
    #[error("network `{network}` has no host with a hostname or IP")]
    NoHost {
        /// The offending network id.
        network: Uuid,
    },

    /// A StoredLetter's id does not match its wrapped message's id.
    #[error("stored letter id {letter} does not match message id {message}")]
    WrongId {
        /// The StoredLetter's own id.
        letter: Uuid,
        /// The wrapped message's id.
        message: Uuid,
    },
}

/// Errors raised by the crypto-policy and portfolio-policy layers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PolicyError {
    /// A structural validation error surfaced while applying a policy.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// The document's issuer does not match the expected signer's entity id.
    #[error("issuer {actual} does not match expected signer {expected}")]
    IssuerMismatch {
        /// Expected issuer id.
        expected: Uuid,
        /// Actual issuer id found on the document.
        actual: Uuid,
    },

    /// The statement's owner does not match the expected owner's entity id.
    #[error("owner {actual} does not match expected owner {expected}")]
    OwnerMismatch {
        /// Expected owner id.
        expected: Uuid,
        /// Actual owner id found on the document.
        actual: Uuid,
    },

    /// The signer's entity has already expired as of the snapshot clock.
    #[error("entity {entity} expired on {expires}")]
    EntityExpired {
        /// The expired entity's id.
        entity: Uuid,
        /// The entity's expiry date (ISO-8601).
        expires: String,
    },

    /// The signer's keys have already expired as of the snapshot clock.
    #[error("keys {keys} expired on {expires}")]
    KeysExpired {
        /// The expired keys document's id.
        keys: Uuid,
        /// The keys' expiry date (ISO-8601).
        expires: String,
    },

    /// A non-multiple signature field already carried a signature.
    #[error("document {document} is already signed")]
    AlreadySigned {
        /// The already-signed document's id.
        document: Uuid,
    },

    /// A caller asked to append a signature to a field that does not allow it.
    #[error("document {document}'s signature field does not admit multiple signatures")]
    NotMultipleSignature {
        /// The offending document's id.
        document: Uuid,
    },

    /// A Node declared a role this engine does not recognize.
    #[error("unsupported node role `{role}`")]
    UnsupportedRole {
        /// The offending role string.
        role: String,
    },

    /// A Node's domain does not match the importing portfolio's domain.
    #[error("node domain {actual} does not match portfolio domain {expected}")]
    DomainIssuerMismatch {
        /// Expected domain id.
        expected: Uuid,
        /// Actual domain id found on the node.
        actual: Uuid,
    },

    /// A route was attempted on an envelope whose last header is RECEIVE.
    #[error("envelope {envelope} has already been received")]
    AlreadyReceived {
        /// The offending envelope's id.
        envelope: Uuid,
    },

    /// A header operation violates the envelope state machine.
    #[error("header operation {op:?} is not legal from state {from:?}")]
    IllegalHeaderOp {
        /// The header operation that was attempted.
        op: String,
        /// The chain's prior state.
        from: String,
    },

    /// A message/attachment declared a MIME type this engine will not carry.
    #[error("unsupported mime type `{mime}`")]
    UnsupportedMime {
        /// The offending MIME string.
        mime: String,
    },

    /// A numeric claim (e.g. a stake or limit) fell outside its legal range.
    #[error("value {value} is out of range [{min}, {max}]")]
    ClaimsOutOfRange {
        /// The offending value.
        value: i64,
        /// Minimum legal value.
        min: i64,
        /// Maximum legal value.
        max: i64,
    },
}
