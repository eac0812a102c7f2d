//! # Wire/storage serialization (spec section 6)
//!
//! Every document type implements `serde::{Serialize, Deserialize}`
//! directly; [`AnyDocument`] is the closed tagged union used wherever a
//! document must be stored or transmitted generically — a portfolio
//! file, a cached message, an envelope's sealed body once opened — so
//! that `deserialize` can dispatch on the wire without dynamic dispatch
//! or a type registry (spec section 9's design note).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::Document;
use crate::entity::{Church, Entity, Ministry, Person};
use crate::keys::{Keys, PrivateKeys};
use crate::message::{Instant, Mail, Message, Note, Report, Share, StoredLetter};
use crate::network::{Domain, Network, Node};
use crate::profile::{Profile, ProfileChurch, ProfileMinistry, ProfilePerson};
use crate::statement::{Revoked, Statement, Trusted, Verified};
use crate::type_tag::{file_extension, TypeTag, UnknownTypeTag};

/// Errors raised while encoding or decoding an [`AnyDocument`].
#[derive(Debug, Error)]
pub enum SerializeError {
    /// The type tag on the wire does not correspond to a known document kind.
    #[error(transparent)]
    UnknownType(#[from] UnknownTypeTag),

    /// bincode failed to encode or decode the payload.
    #[error("bincode failure: {0}")]
    Bincode(#[from] bincode::Error),
}

/// A closed union over every storable document kind, tagged by
/// [`TypeTag`] on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnyDocument {
    /// A PrivateKeys document.
    PrivateKeys(PrivateKeys),
    /// A Keys document.
    Keys(Keys),
    /// A Person entity.
    Person(Person),
    /// A Ministry entity.
    Ministry(Ministry),
    /// A Church entity.
    Church(Church),
    /// A Person profile.
    ProfilePerson(ProfilePerson),
    /// A Ministry profile.
    ProfileMinistry(ProfileMinistry),
    /// A Church profile.
    ProfileChurch(ProfileChurch),
    /// A Domain.
    Domain(Domain),
    /// A Node.
    Node(Node),
    /// A Network.
    Network(Network),
    /// A Verified statement.
    Verified(Verified),
    /// A Trusted statement.
    Trusted(Trusted),
    /// A Revoked statement.
    Revoked(Revoked),
    /// A Note message.
    Note(Note),
    /// An Instant message.
    Instant(Instant),
    /// A Mail message.
    Mail(Mail),
    /// A Share message.
    Share(Share),
    /// A Report message.
    Report(Report),
    /// A cached, at-rest wrapper around a received message.
    CachedMessage(StoredLetter),
}

impl AnyDocument {
    /// This variant's stable type tag.
    pub fn type_tag(&self) -> TypeTag {
        match self {
            AnyDocument::PrivateKeys(_) => TypeTag::KeysPrivate,
            AnyDocument::Keys(d) => d.type_tag(),
            AnyDocument::Person(_) => TypeTag::EntityPerson,
            AnyDocument::Ministry(_) => TypeTag::EntityMinistry,
            AnyDocument::Church(_) => TypeTag::EntityChurch,
            AnyDocument::ProfilePerson(d) => d.type_tag(),
            AnyDocument::ProfileMinistry(d) => d.type_tag(),
            AnyDocument::ProfileChurch(d) => d.type_tag(),
            AnyDocument::Domain(d) => d.type_tag(),
            AnyDocument::Node(d) => d.type_tag(),
            AnyDocument::Network(d) => d.type_tag(),
            AnyDocument::Verified(d) => d.type_tag(),
            AnyDocument::Trusted(d) => d.type_tag(),
            AnyDocument::Revoked(d) => d.type_tag(),
            AnyDocument::Note(d) => d.type_tag(),
            AnyDocument::Instant(d) => d.type_tag(),
            AnyDocument::Mail(d) => d.type_tag(),
            AnyDocument::Share(d) => d.type_tag(),
            AnyDocument::Report(d) => d.type_tag(),
            AnyDocument::CachedMessage(d) => d.type_tag(),
        }
    }

    /// The storage file-extension for this document (spec section 6).
    pub fn file_extension(&self) -> &'static str {
        file_extension(self.type_tag())
    }

    /// Encode to the at-rest/wire byte form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SerializeError> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode from the at-rest/wire byte form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SerializeError> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Convenience: wrap an [`Entity`] in its `AnyDocument` variant.
    pub fn from_entity(entity: Entity) -> Self {
        match entity {
            Entity::Person(p) => AnyDocument::Person(p),
            Entity::Ministry(m) => AnyDocument::Ministry(m),
            Entity::Church(c) => AnyDocument::Church(c),
        }
    }

    /// Convenience: wrap a [`Profile`] in its `AnyDocument` variant.
    pub fn from_profile(profile: Profile) -> Self {
        match profile {
            Profile::Person(p) => AnyDocument::ProfilePerson(p),
            Profile::Ministry(m) => AnyDocument::ProfileMinistry(m),
            Profile::Church(c) => AnyDocument::ProfileChurch(c),
        }
    }

    /// Convenience: wrap a [`Statement`] in its `AnyDocument` variant.
    pub fn from_statement(statement: Statement) -> Self {
        match statement {
            Statement::Verified(v) => AnyDocument::Verified(v),
            Statement::Trusted(t) => AnyDocument::Trusted(t),
            Statement::Revoked(r) => AnyDocument::Revoked(r),
        }
    }

    /// Convenience: wrap a [`Message`] in its `AnyDocument` variant.
    pub fn from_message(message: Message) -> Self {
        match message {
            Message::Note(n) => AnyDocument::Note(n),
            Message::Instant(i) => AnyDocument::Instant(i),
            Message::Mail(m) => AnyDocument::Mail(m),
            Message::Share(s) => AnyDocument::Share(s),
            Message::Report(r) => AnyDocument::Report(r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::default_identity_expiry;
    use chrono::NaiveDate;
    use uuid::Uuid;

    #[test]
    fn keys_round_trip_through_bincode() {
        let created = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let keys = Keys::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            created,
            default_identity_expiry(created),
            vec![7u8; 32],
            vec![8u8; 32],
        );
        let wrapped = AnyDocument::Keys(keys.clone());
        let bytes = wrapped.to_bytes().unwrap();
        let decoded = AnyDocument::from_bytes(&bytes).unwrap();
        match decoded {
            AnyDocument::Keys(d) => assert_eq!(d, keys),
            _ => panic!("expected Keys variant"),
        }
    }

    #[test]
    fn file_extension_matches_type_tag_table() {
        let keys = Keys::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            default_identity_expiry(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            vec![0u8; 32],
            vec![0u8; 32],
        );
        assert_eq!(AnyDocument::Keys(keys).file_extension(), ".key");
    }
}
