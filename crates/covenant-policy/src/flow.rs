//! # Envelope and message flow (spec section 4.8)
//!
//! `wrap` seals a clear message into a freshly `Send`-headed envelope;
//! `route` appends a forwarding hop; `open` verifies, unseals, and
//! terminates the chain with `Receive`. Every step that fails a
//! cryptographic or structural check returns `Ok(None)` rather than an
//! error — only a caller-side precondition violation (an envelope
//! already received) is an `Err` (spec section 4.13).

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use covenant_crypto::{conceal, reveal, sign, sign_header, verify};
use covenant_types::document::Document;
use covenant_types::entity::Entity;
use covenant_types::envelope::{Envelope, HeaderOp};
use covenant_types::error::{FieldError, PolicyError};
use covenant_types::keys::{Keys, PrivateKeys};
use covenant_types::message::Message;
use covenant_types::portfolio::order_keys;
use covenant_types::serialize::AnyDocument;

/// The newest non-expired key with a matching secret half (spec section
/// 4.7: conceal/reveal requires a live, not merely signature-overlapping,
/// key — unlike `sign`/`verify`'s own latest-key selection, which is
/// checked against document-touch windows instead).
fn latest_usable<'a>(
    keys: &'a [Keys],
    privkeys: &'a [PrivateKeys],
    today: NaiveDate,
) -> Option<(&'a Keys, &'a PrivateKeys)> {
    let mut ordered: Vec<&'a Keys> = keys.iter().filter(|k| today <= k.expires()).collect();
    ordered.sort_by(|a, b| b.created().cmp(&a.created()).then(a.id().cmp(&b.id())));
    ordered
        .into_iter()
        .find_map(|key| privkeys.iter().find(|pk| pk.keys_id == key.id()).map(|pk| (key, pk)))
}

/// The newest non-expired key (no secret half required) — used to pick
/// the far side's public exchange key.
fn latest_key(keys: &[Keys], today: NaiveDate) -> Option<Keys> {
    let mut ordered: Vec<Keys> = keys.iter().filter(|k| today <= k.expires()).cloned().collect();
    order_keys(&mut ordered);
    ordered.into_iter().next()
}

/// Encoding a message to its sealed-body plaintext failed. This can only
/// happen for a document whose native shape already failed to validate,
/// so it is folded into the same family as other document-shape errors
/// rather than growing the taxonomy.
fn encode_failed(field: &str) -> PolicyError {
    PolicyError::Document(FieldError::InvalidType { field: field.into() }.into())
}

/// No usable key/secret pairing exists for a conceal step (expired,
/// missing, or mismatched X25519 material). Reuses
/// [`PolicyError::KeysExpired`], same rationale as `covenant_crypto::sign`'s
/// internal `no_usable_key`.
fn no_usable_secret(keys: Uuid, today: NaiveDate) -> PolicyError {
    PolicyError::KeysExpired {
        keys,
        expires: today.format("%Y-%m-%d").to_string(),
    }
}

/// Seal `message` from `sender` to `recipient` into a freshly `Send`-ed
/// envelope (spec section 4.8).
#[allow(clippy::too_many_arguments)]
pub fn wrap(
    message: &Message,
    sender_entity: &Entity,
    sender_keys: &[Keys],
    sender_privkeys: &[PrivateKeys],
    recipient_entity: &Entity,
    recipient_keys: &[Keys],
    node: Uuid,
    posted: DateTime<Utc>,
    today: NaiveDate,
) -> Result<Envelope, PolicyError> {
    message.validate()?;
    if message.issuer() != sender_entity.id() || !verify(message, sender_entity, sender_keys, &[]) {
        return Err(PolicyError::IssuerMismatch {
            expected: sender_entity.id(),
            actual: message.issuer(),
        });
    }
    if message.owner() != recipient_entity.id() {
        return Err(PolicyError::OwnerMismatch {
            expected: recipient_entity.id(),
            actual: message.owner(),
        });
    }
    if today > sender_entity.expires() {
        return Err(PolicyError::EntityExpired {
            entity: sender_entity.id(),
            expires: sender_entity.expires().format("%Y-%m-%d").to_string(),
        });
    }
    if today > recipient_entity.expires() {
        return Err(PolicyError::EntityExpired {
            entity: recipient_entity.id(),
            expires: recipient_entity.expires().format("%Y-%m-%d").to_string(),
        });
    }

    let recipient_key =
        latest_key(recipient_keys, today).ok_or_else(|| no_usable_secret(recipient_entity.id(), today))?;
    let (sender_key, sender_privkey) = latest_usable(sender_keys, sender_privkeys, today)
        .ok_or_else(|| no_usable_secret(sender_entity.id(), today))?;

    let plaintext = AnyDocument::from_message(message.clone())
        .to_bytes()
        .map_err(|_| encode_failed("message"))?;
    let sealed = conceal(&sender_privkey.secret, &recipient_key.exchange, &plaintext)
        .map_err(|_| no_usable_secret(sender_key.id(), today))?;

    let mut envelope = Envelope::new(Uuid::new_v4(), sender_entity.id(), recipient_entity.id(), today, sealed);
    sign(&mut envelope, sender_entity, sender_keys, sender_privkeys, &["chain"], false, today)?;
    let header = sign_header(&envelope, HeaderOp::Send, node, posted, sender_entity, sender_keys, sender_privkeys, today)?;
    envelope.append_header(header)?;
    Ok(envelope)
}

/// Append a forwarding hop to `envelope` (spec section 4.8). `router` is
/// the entity operating `node`.
pub fn route(
    envelope: &mut Envelope,
    router_entity: &Entity,
    router_keys: &[Keys],
    router_privkeys: &[PrivateKeys],
    node: Uuid,
    posted: DateTime<Utc>,
    today: NaiveDate,
) -> Result<(), PolicyError> {
    if envelope.is_received() {
        return Err(PolicyError::AlreadyReceived { envelope: envelope.id() });
    }
    let header = sign_header(envelope, HeaderOp::Route, node, posted, router_entity, router_keys, router_privkeys, today)?;
    envelope.append_header(header)
}

/// Verify, unseal, and terminate `envelope` at the recipient (spec
/// section 4.8). Returns `Ok(None)` for any cryptographic or structural
/// failure; `Err` only for a caller precondition violation such as an
/// envelope already terminated.
#[allow(clippy::too_many_arguments)]
pub fn open(
    envelope: &mut Envelope,
    sender_entity: &Entity,
    sender_keys: &[Keys],
    recipient_entity: &Entity,
    recipient_keys: &[Keys],
    recipient_privkeys: &[PrivateKeys],
    node: Uuid,
    posted: DateTime<Utc>,
    today: NaiveDate,
) -> Result<Option<Message>, PolicyError> {
    if envelope.is_received() {
        return Err(PolicyError::AlreadyReceived { envelope: envelope.id() });
    }
    if envelope.owner != recipient_entity.id() || envelope.issuer() != sender_entity.id() {
        return Ok(None);
    }
    if today > envelope.expires() || today > sender_entity.expires() || today > recipient_entity.expires() {
        return Ok(None);
    }
    if !verify(envelope, sender_entity, sender_keys, &["chain"]) {
        return Ok(None);
    }

    let Some((_, recipient_privkey)) = latest_usable(recipient_keys, recipient_privkeys, today) else {
        return Ok(None);
    };
    let Some(sender_key) = latest_key(sender_keys, today) else {
        return Ok(None);
    };
    let Some(plaintext) = reveal(&recipient_privkey.secret, &sender_key.exchange, &envelope.sealed) else {
        return Ok(None);
    };
    let Ok(any) = AnyDocument::from_bytes(&plaintext) else {
        return Ok(None);
    };
    let Some(message) = message_from_any(any) else {
        return Ok(None);
    };
    if message.validate().is_err() || !verify(&message, sender_entity, sender_keys, &[]) {
        return Ok(None);
    }

    let header = sign_header(
        envelope,
        HeaderOp::Receive,
        node,
        posted,
        recipient_entity,
        recipient_keys,
        recipient_privkeys,
        today,
    )?;
    envelope.append_header(header)?;
    Ok(Some(message))
}

fn message_from_any(any: AnyDocument) -> Option<Message> {
    match any {
        AnyDocument::Note(n) => Some(Message::Note(n)),
        AnyDocument::Instant(i) => Some(Message::Instant(i)),
        AnyDocument::Mail(m) => Some(Message::Mail(m)),
        AnyDocument::Share(s) => Some(Message::Share(s)),
        AnyDocument::Report(r) => Some(Message::Report(r)),
        _ => None,
    }
}
