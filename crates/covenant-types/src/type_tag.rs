//! Stable document type tags (spec section 6).

use std::convert::TryFrom;

use serde::{Deserialize, Serialize};

/// A document's stable type tag, carried in every export and used by
/// [`crate::portfolio::serialize`]/`deserialize` to dispatch on the wire
/// representation without dynamic dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum TypeTag {
    /// No type (unused placeholder, kept for parity with the source's tag 0).
    None = 0,
    /// PrivateKeys document.
    KeysPrivate = 1,
    /// Keys (public) document.
    Keys = 10,
    /// Person entity.
    EntityPerson = 20,
    /// Ministry entity.
    EntityMinistry = 21,
    /// Church entity.
    EntityChurch = 22,
    /// Person profile.
    ProfilePerson = 30,
    /// Ministry profile.
    ProfileMinistry = 31,
    /// Church profile.
    ProfileChurch = 32,
    /// Domain (network root).
    NetDomain = 40,
    /// Node.
    NetNode = 41,
    /// Network.
    NetNetwork = 42,
    /// Verified statement.
    StatVerified = 50,
    /// Trusted statement.
    StatTrusted = 51,
    /// Revoked statement.
    StatRevoked = 52,
    /// Envelope.
    ComEnvelope = 60,
    /// Note message.
    ComNote = 70,
    /// Instant message.
    ComInstant = 71,
    /// Mail message.
    ComMail = 72,
    /// Share message.
    ComShare = 73,
    /// Report message.
    ComReport = 74,
    /// Cached (stored) message wrapper.
    CachedMsg = 700,
}

/// Error returned when an integer does not correspond to any [`TypeTag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{0} is not a recognized document type tag")]
pub struct UnknownTypeTag(pub u32);

impl TryFrom<u32> for TypeTag {
    type Error = UnknownTypeTag;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        use TypeTag::*;
        Ok(match value {
            0 => None,
            1 => KeysPrivate,
            10 => Keys,
            20 => EntityPerson,
            21 => EntityMinistry,
            22 => EntityChurch,
            30 => ProfilePerson,
            31 => ProfileMinistry,
            32 => ProfileChurch,
            40 => NetDomain,
            41 => NetNode,
            42 => NetNetwork,
            50 => StatVerified,
            51 => StatTrusted,
            52 => StatRevoked,
            60 => ComEnvelope,
            70 => ComNote,
            71 => ComInstant,
            72 => ComMail,
            73 => ComShare,
            74 => ComReport,
            700 => CachedMsg,
            other => return Err(UnknownTypeTag(other)),
        })
    }
}

impl From<TypeTag> for u32 {
    fn from(tag: TypeTag) -> u32 {
        tag as u32
    }
}

/// The storage file-identifier extension for a type tag (spec section 6).
/// Message variants collapse to the empty string, matching `doc2fileident`.
pub fn file_extension(tag: TypeTag) -> &'static str {
    match tag {
        TypeTag::None => "",
        TypeTag::KeysPrivate => ".pky",
        TypeTag::Keys => ".key",
        TypeTag::EntityPerson | TypeTag::EntityMinistry | TypeTag::EntityChurch => ".ent",
        TypeTag::ProfilePerson | TypeTag::ProfileMinistry | TypeTag::ProfileChurch => ".pfl",
        TypeTag::NetDomain => ".dmn",
        TypeTag::NetNode => ".nod",
        TypeTag::NetNetwork => ".net",
        TypeTag::StatVerified => ".ver",
        TypeTag::StatTrusted => ".rst",
        TypeTag::StatRevoked => ".rev",
        TypeTag::ComEnvelope => ".env",
        TypeTag::ComNote
        | TypeTag::ComInstant
        | TypeTag::ComMail
        | TypeTag::ComShare
        | TypeTag::ComReport => "",
        TypeTag::CachedMsg => ".cmsg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_u32() {
        for tag in [
            TypeTag::None,
            TypeTag::KeysPrivate,
            TypeTag::Keys,
            TypeTag::EntityPerson,
            TypeTag::StatRevoked,
            TypeTag::ComEnvelope,
            TypeTag::CachedMsg,
        ] {
            let raw: u32 = tag.into();
            assert_eq!(TypeTag::try_from(raw).unwrap(), tag);
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert!(TypeTag::try_from(999).is_err());
    }

    #[test]
    fn messages_collapse_to_empty_extension() {
        assert_eq!(file_extension(TypeTag::ComMail), "");
        assert_eq!(file_extension(TypeTag::Keys), ".key");
    }
}
