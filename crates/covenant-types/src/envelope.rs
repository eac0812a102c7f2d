//! # Envelopes (spec section 3)
//!
//! An envelope carries a sealed message body plus a hash-chained header
//! log recording how it moved: `Send` (origin), any number of `Route`
//! hops, and a single terminal `Receive` (spec section 4.8). Each
//! header's signed payload binds the previous header's signature, so the
//! chain cannot be reordered or truncated without detection.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use uuid::Uuid;

use crate::document::{
    default_envelope_expiry, rule_expiry_window, rule_type_tag, rule_updated_not_before_created,
    DocHeader, Document, ExpiryClass, SignatureField,
};
use crate::entity::signature_field_value;
use crate::error::{DocumentError, PolicyError};
use crate::field::FieldValue;
use crate::type_tag::TypeTag;

/// A step in an envelope's header chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeaderOp {
    /// Origin: the envelope enters the network.
    Send,
    /// An intermediate hop forwarded the envelope.
    Route,
    /// Terminal: the envelope reached its final recipient. No header may
    /// follow a `Receive`.
    Receive,
}

impl HeaderOp {
    /// The operation's canonical string form, used in error messages and
    /// the native export.
    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderOp::Send => "send",
            HeaderOp::Route => "route",
            HeaderOp::Receive => "receive",
        }
    }

    /// Whether `self` may legally follow `from` in a header chain (`from
    /// == None` means "the chain is currently empty").
    pub fn is_legal_after(&self, from: Option<HeaderOp>) -> bool {
        match (from, self) {
            (None, HeaderOp::Send) => true,
            (None, _) => false,
            (Some(HeaderOp::Receive), _) => false,
            (Some(_), HeaderOp::Send) => false,
            (Some(_), HeaderOp::Route) | (Some(_), HeaderOp::Receive) => true,
        }
    }
}

/// One entry in an envelope's header chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// This hop's operation.
    pub op: HeaderOp,
    /// The node performing this hop.
    pub node: Uuid,
    /// When this hop was recorded.
    pub posted: DateTime<Utc>,
    /// This hop's signature over its own payload plus the previous hop's
    /// signature (or, for `Send`, over its own payload alone).
    pub signature: Vec<u8>,
    /// The prior header's signature, bound into this header's signed
    /// payload. `None` only for the first (`Send`) header.
    pub previous_signature: Option<Vec<u8>>,
}

/// A sealed message in transit, with its header chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Shared document header. `header.issuer` is the originating node.
    pub header: DocHeader,
    /// The intended recipient entity.
    pub owner: Uuid,
    /// The sealed (concealed) message body.
    pub sealed: Vec<u8>,
    /// The header chain, in chronological order.
    pub chain: Vec<Header>,
}

impl Envelope {
    /// Construct a freshly sent envelope with an empty chain.
    pub fn new(id: Uuid, issuer: Uuid, owner: Uuid, posted: NaiveDate, sealed: Vec<u8>) -> Self {
        Self {
            header: DocHeader {
                id,
                created: posted,
                updated: None,
                expires: default_envelope_expiry(posted),
                issuer,
                signature: SignatureField::single(),
            },
            owner,
            sealed,
            chain: Vec::new(),
        }
    }

    /// The chain's current terminal operation, if any header has been
    /// appended yet.
    pub fn last_op(&self) -> Option<HeaderOp> {
        self.chain.last().map(|h| h.op)
    }

    /// Whether the chain has reached its terminal `Receive` header.
    pub fn is_received(&self) -> bool {
        self.last_op() == Some(HeaderOp::Receive)
    }

    /// Append a header, enforcing the `Send -> Route* -> Receive` state
    /// machine (spec section 4.8).
    pub fn append_header(&mut self, header: Header) -> Result<(), PolicyError> {
        if !header.op.is_legal_after(self.last_op()) {
            return Err(PolicyError::IllegalHeaderOp {
                op: header.op.as_str().to_string(),
                from: self
                    .last_op()
                    .map(|op| op.as_str().to_string())
                    .unwrap_or_else(|| "empty".to_string()),
            });
        }
        let expected_previous = self.chain.last().map(|h| h.signature.clone());
        if header.previous_signature != expected_previous {
            return Err(PolicyError::IllegalHeaderOp {
                op: header.op.as_str().to_string(),
                from: "mismatched previous_signature".to_string(),
            });
        }
        self.chain.push(header);
        Ok(())
    }
}

impl Document for Envelope {
    fn id(&self) -> Uuid {
        self.header.id
    }
    fn type_tag(&self) -> TypeTag {
        TypeTag::ComEnvelope
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
        map.insert("type".into(), FieldValue::Int(TypeTag::ComEnvelope.into()));
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
        map.insert("sealed".into(), FieldValue::Bytes(self.sealed.clone()));
        map.insert(
            "chain".into(),
            FieldValue::List(
                self.chain
                    .iter()
                    .map(|h| {
                        let mut hmap = IndexMap::new();
                        hmap.insert("op".into(), FieldValue::Str(h.op.as_str().to_string()));
                        hmap.insert("node".into(), FieldValue::Uuid(h.node));
                        hmap.insert("posted".into(), FieldValue::DateTime(h.posted));
                        hmap.insert("signature".into(), FieldValue::Bytes(h.signature.clone()));
                        hmap.insert(
                            "previous_signature".into(),
                            h.previous_signature
                                .clone()
                                .map(FieldValue::Bytes)
                                .unwrap_or(FieldValue::Null),
                        );
                        FieldValue::Document(hmap)
                    })
                    .collect(),
            ),
        );
        map
    }

    fn validate(&self) -> Result<(), DocumentError> {
        rule_type_tag(TypeTag::ComEnvelope, TypeTag::ComEnvelope)?;
        rule_updated_not_before_created(self.header.created, self.header.updated)?;
        rule_expiry_window(self.touched(), self.header.expires, ExpiryClass::Envelope)?;
        self.header.signature.validate("signature")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(op: HeaderOp, previous_signature: Option<Vec<u8>>, signature: Vec<u8>) -> Header {
        Header {
            op,
            node: Uuid::new_v4(),
            posted: Utc::now(),
            signature,
            previous_signature,
        }
    }

    #[test]
    fn chain_must_begin_with_send() {
        let mut env = Envelope::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            vec![1, 2, 3],
        );
        let route_first = header(HeaderOp::Route, None, vec![1]);
        assert!(env.append_header(route_first).is_err());

        let send = header(HeaderOp::Send, None, vec![1]);
        assert!(env.append_header(send).is_ok());
    }

    #[test]
    fn receive_is_terminal() {
        let mut env = Envelope::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            vec![1, 2, 3],
        );
        env.append_header(header(HeaderOp::Send, None, vec![1])).unwrap();
        env.append_header(header(HeaderOp::Receive, Some(vec![1]), vec![2]))
            .unwrap();
        assert!(env.is_received());

        let another = header(HeaderOp::Route, Some(vec![2]), vec![3]);
        assert!(env.append_header(another).is_err());
    }

    #[test]
    fn mismatched_previous_signature_is_rejected() {
        let mut env = Envelope::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            vec![1, 2, 3],
        );
        env.append_header(header(HeaderOp::Send, None, vec![1])).unwrap();
        let wrong = header(HeaderOp::Route, Some(vec![99]), vec![2]);
        assert!(env.append_header(wrong).is_err());
    }
}
