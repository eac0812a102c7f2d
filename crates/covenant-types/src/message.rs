//! # Messages (spec section 3)
//!
//! The payload an [`crate::envelope::Envelope`] carries once unsealed.
//! Five concrete kinds share one signed header; [`StoredLetter`] is the
//! at-rest wrapper a recipient keeps after receiving one.

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use indexmap::IndexMap;
use uuid::Uuid;

use crate::document::{
    default_message_expiry, rule_expiry_window, rule_type_tag, rule_updated_not_before_created,
    DocHeader, Document, ExpiryClass, SignatureField,
};
use crate::entity::signature_field_value;
use crate::error::{DocumentError, FieldError};
use crate::field::{validate_bytes_limit, FieldValue, DEFAULT_BINARY_LIMIT};
use crate::type_tag::TypeTag;

/// A binary attachment carried by a [`Mail`] or [`Share`] message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    /// The attachment's filename.
    pub name: String,
    /// The attachment's declared MIME type. Allow-listing which MIME
    /// types are accepted is a policy concern, not a structural one —
    /// see `covenant_policy::accept`.
    pub mime: String,
    /// The attachment's raw bytes.
    pub data: Vec<u8>,
}

impl Attachment {
    fn validate(&self) -> Result<(), FieldError> {
        validate_bytes_limit("data", &self.data, DEFAULT_BINARY_LIMIT)
    }
}

/// A short, ephemeral note (spec section 3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Shared document header.
    pub header: DocHeader,
    /// The recipient entity's id. Checked against the unwrapping
    /// recipient's own entity id by the envelope flow (spec section 4.8).
    pub owner: Uuid,
    /// The id of a message this one replies to, if any.
    pub reply: Option<Uuid>,
    /// The note's text.
    pub body: String,
}

/// A real-time, session-bound instant message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instant {
    /// Shared document header.
    pub header: DocHeader,
    /// The recipient entity's id.
    pub owner: Uuid,
    /// The id of a message this one replies to, if any.
    pub reply: Option<Uuid>,
    /// The message's text.
    pub body: String,
}

/// A store-and-forward mail message with optional attachments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mail {
    /// Shared document header.
    pub header: DocHeader,
    /// The recipient entity's id.
    pub owner: Uuid,
    /// The id of a message this one replies to, if any.
    pub reply: Option<Uuid>,
    /// Subject line.
    pub subject: String,
    /// Body text.
    pub body: String,
    /// Attached files, if any.
    pub attachments: Vec<Attachment>,
}

/// A document/portfolio share, addressed to a specific recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Share {
    /// Shared document header.
    pub header: DocHeader,
    /// The recipient entity's id.
    pub owner: Uuid,
    /// The id of a message this one replies to, if any.
    pub reply: Option<Uuid>,
    /// The shared payloads.
    pub attachments: Vec<Attachment>,
}

/// An abuse/moderation report about another entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Shared document header.
    pub header: DocHeader,
    /// The recipient entity's id (the moderator/authority this is filed
    /// with, not the entity being reported).
    pub owner: Uuid,
    /// The id of a message this one replies to, if any.
    pub reply: Option<Uuid>,
    /// The entity being reported.
    pub target: Uuid,
    /// The reporter's stated reason.
    pub reason: String,
}

macro_rules! impl_message_document {
    ($ty:ty, $tag:expr, $extra:expr) => {
        impl Document for $ty {
            fn id(&self) -> Uuid {
                self.header.id
            }
            fn type_tag(&self) -> TypeTag {
                $tag
            }
            fn issuer(&self) -> Uuid {
                self.header.issuer
            }
            fn created(&self) -> NaiveDate {
                self.header.created
            }
            fn updated(&self) -> Option<NaiveDate> {
                self.header.updated
            }
            fn expires(&self) -> NaiveDate {
                self.header.expires
            }
            fn signature(&self) -> &SignatureField {
                &self.header.signature
            }
            fn signature_mut(&mut self) -> &mut SignatureField {
                &mut self.header.signature
            }
            fn native_export(&self) -> IndexMap<String, FieldValue> {
                let mut map = IndexMap::new();
                map.insert("type".into(), FieldValue::Int($tag.into()));
                map.insert("id".into(), FieldValue::Uuid(self.header.id));
                map.insert("created".into(), FieldValue::Date(self.header.created));
                map.insert(
                    "updated".into(),
                    self.header.updated.map(FieldValue::Date).unwrap_or(FieldValue::Null),
                );
                map.insert("expires".into(), FieldValue::Date(self.header.expires));
                map.insert("issuer".into(), FieldValue::Uuid(self.header.issuer));
                map.insert(
                    "signature".into(),
                    signature_field_value(&self.header.signature),
                );
                map.insert("owner".into(), FieldValue::Uuid(self.owner));
                map.insert(
                    "reply".into(),
                    self.reply.map(FieldValue::Uuid).unwrap_or(FieldValue::Null),
                );
                $extra(self, &mut map);
                map
            }
            fn validate(&self) -> Result<(), DocumentError> {
                rule_type_tag($tag, $tag)?;
                rule_updated_not_before_created(self.header.created, self.header.updated)?;
                rule_expiry_window(self.touched(), self.header.expires, ExpiryClass::Envelope)?;
                self.header.signature.validate("signature")?;
                Ok(())
            }
        }
    };
}

fn attachments_to_field(attachments: &[Attachment]) -> FieldValue {
    FieldValue::List(
        attachments
            .iter()
            .map(|a| {
                let mut map = IndexMap::new();
                map.insert("name".into(), FieldValue::Str(a.name.clone()));
                map.insert("mime".into(), FieldValue::Str(a.mime.clone()));
                map.insert("data".into(), FieldValue::Bytes(a.data.clone()));
                FieldValue::Document(map)
            })
            .collect(),
    )
}

impl_message_document!(Note, TypeTag::ComNote, |s: &Note, map: &mut IndexMap<String, FieldValue>| {
    map.insert("body".into(), FieldValue::Str(s.body.clone()));
});

impl_message_document!(Instant, TypeTag::ComInstant, |s: &Instant, map: &mut IndexMap<String, FieldValue>| {
    map.insert("body".into(), FieldValue::Str(s.body.clone()));
});

impl_message_document!(Mail, TypeTag::ComMail, |s: &Mail, map: &mut IndexMap<String, FieldValue>| {
    map.insert("subject".into(), FieldValue::Str(s.subject.clone()));
    map.insert("body".into(), FieldValue::Str(s.body.clone()));
    map.insert("attachments".into(), attachments_to_field(&s.attachments));
});

impl_message_document!(Share, TypeTag::ComShare, |s: &Share, map: &mut IndexMap<String, FieldValue>| {
    map.insert("attachments".into(), attachments_to_field(&s.attachments));
});

impl_message_document!(Report, TypeTag::ComReport, |s: &Report, map: &mut IndexMap<String, FieldValue>| {
    map.insert("target".into(), FieldValue::Uuid(s.target));
    map.insert("reason".into(), FieldValue::Str(s.reason.clone()));
});

/// A closed union over the five message kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    /// A short, ephemeral note.
    Note(Note),
    /// A real-time instant message.
    Instant(Instant),
    /// Store-and-forward mail.
    Mail(Mail),
    /// A document/portfolio share.
    Share(Share),
    /// An abuse report.
    Report(Report),
}

impl Message {
    /// The message's attachments, if its variant carries any.
    pub fn attachments(&self) -> &[Attachment] {
        match self {
            Message::Mail(m) => &m.attachments,
            Message::Share(s) => &s.attachments,
            Message::Note(_) | Message::Instant(_) | Message::Report(_) => &[],
        }
    }

    /// The intended recipient entity's id (spec section 4.8: the envelope
    /// flow checks this against the unwrapping recipient's own id).
    pub fn owner(&self) -> Uuid {
        match self {
            Message::Note(n) => n.owner,
            Message::Instant(i) => i.owner,
            Message::Mail(m) => m.owner,
            Message::Share(s) => s.owner,
            Message::Report(r) => r.owner,
        }
    }
}

impl Document for Message {
    fn id(&self) -> Uuid {
        match self {
            Message::Note(n) => n.id(),
            Message::Instant(i) => i.id(),
            Message::Mail(m) => m.id(),
            Message::Share(s) => s.id(),
            Message::Report(r) => r.id(),
        }
    }
    fn type_tag(&self) -> TypeTag {
        match self {
            Message::Note(n) => n.type_tag(),
            Message::Instant(i) => i.type_tag(),
            Message::Mail(m) => m.type_tag(),
            Message::Share(s) => s.type_tag(),
            Message::Report(r) => r.type_tag(),
        }
    }
    fn issuer(&self) -> Uuid {
        match self {
            Message::Note(n) => n.issuer(),
            Message::Instant(i) => i.issuer(),
            Message::Mail(m) => m.issuer(),
            Message::Share(s) => s.issuer(),
            Message::Report(r) => r.issuer(),
        }
    }
    fn created(&self) -> NaiveDate {
        match self {
            Message::Note(n) => n.created(),
            Message::Instant(i) => i.created(),
            Message::Mail(m) => m.created(),
            Message::Share(s) => s.created(),
            Message::Report(r) => r.created(),
        }
    }
    fn updated(&self) -> Option<NaiveDate> {
        match self {
            Message::Note(n) => n.updated(),
            Message::Instant(i) => i.updated(),
            Message::Mail(m) => m.updated(),
            Message::Share(s) => s.updated(),
            Message::Report(r) => r.updated(),
        }
    }
    fn expires(&self) -> NaiveDate {
        match self {
            Message::Note(n) => n.expires(),
            Message::Instant(i) => i.expires(),
            Message::Mail(m) => m.expires(),
            Message::Share(s) => s.expires(),
            Message::Report(r) => r.expires(),
        }
    }
    fn signature(&self) -> &SignatureField {
        match self {
            Message::Note(n) => n.signature(),
            Message::Instant(i) => i.signature(),
            Message::Mail(m) => m.signature(),
            Message::Share(s) => s.signature(),
            Message::Report(r) => r.signature(),
        }
    }
    fn signature_mut(&mut self) -> &mut SignatureField {
        match self {
            Message::Note(n) => n.signature_mut(),
            Message::Instant(i) => i.signature_mut(),
            Message::Mail(m) => m.signature_mut(),
            Message::Share(s) => s.signature_mut(),
            Message::Report(r) => r.signature_mut(),
        }
    }
    fn native_export(&self) -> IndexMap<String, FieldValue> {
        match self {
            Message::Note(n) => n.native_export(),
            Message::Instant(i) => i.native_export(),
            Message::Mail(m) => m.native_export(),
            Message::Share(s) => s.native_export(),
            Message::Report(r) => r.native_export(),
        }
    }
    fn validate(&self) -> Result<(), DocumentError> {
        match self {
            Message::Note(n) => n.validate(),
            Message::Instant(i) => i.validate(),
            Message::Mail(m) => m.validate(),
            Message::Share(s) => s.validate(),
            Message::Report(r) => r.validate(),
        }?;
        for attachment in self.attachments() {
            attachment.validate()?;
        }
        Ok(())
    }
}

/// A recipient's at-rest wrapper around a received [`Message`] (spec
/// section 3; carries its own id distinct from, but required to match,
/// the wrapped message's id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredLetter {
    /// The letter's own id. Must equal `message.id()`.
    pub id: Uuid,
    /// The wrapped message.
    pub message: Message,
    /// The calendar date this letter was filed locally.
    pub received: NaiveDate,
}

impl StoredLetter {
    /// Construct a stored letter, deriving `id` from the wrapped message.
    pub fn new(message: Message, received: NaiveDate) -> Self {
        Self {
            id: message.id(),
            message,
            received,
        }
    }

    /// This document's type tag (always [`TypeTag::CachedMsg`]).
    pub fn type_tag(&self) -> TypeTag {
        TypeTag::CachedMsg
    }

    /// Validate the id-matching invariant plus the wrapped message.
    pub fn validate(&self) -> Result<(), DocumentError> {
        if self.id != self.message.id() {
            return Err(DocumentError::WrongId {
                letter: self.id,
                message: self.message.id(),
            });
        }
        self.message.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::default_identity_expiry;

    fn header(created: NaiveDate) -> DocHeader {
        DocHeader {
            id: Uuid::new_v4(),
            created,
            updated: None,
            expires: default_message_expiry(created),
            issuer: Uuid::new_v4(),
            signature: SignatureField::single(),
        }
    }

    #[test]
    fn stored_letter_requires_matching_id() {
        let created = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut note = Note {
            header: header(created),
            owner: Uuid::new_v4(),
            reply: None,
            body: "hi".into(),
        };
        note.header.signature.set(vec![1; 64]);
        note.header.expires = default_identity_expiry(created);
        let message = Message::Note(note);
        let mut letter = StoredLetter::new(message, created);
        assert!(letter.validate().is_ok());

        letter.id = Uuid::new_v4();
        assert!(matches!(letter.validate(), Err(DocumentError::WrongId { .. })));
    }

    #[test]
    fn oversized_attachment_is_rejected() {
        let created = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut mail = Mail {
            header: header(created),
            owner: Uuid::new_v4(),
            reply: None,
            subject: "hello".into(),
            body: "world".into(),
            attachments: vec![Attachment {
                name: "big.bin".into(),
                mime: "text/plain".into(),
                data: vec![0u8; DEFAULT_BINARY_LIMIT + 1],
            }],
        };
        mail.header.expires = default_identity_expiry(created);
        mail.header.signature.set(vec![1; 64]);
        let message = Message::Mail(mail);
        assert!(message.validate().is_err());
    }
}
