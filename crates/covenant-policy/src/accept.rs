//! # Acceptance policy (spec section 4.10)
//!
//! An [`ImportPolicy`] is bound to an owner portfolio and decides
//! whether an incoming document is safe to adopt into it: right issuer,
//! not expired, structurally valid, and cryptographically verified. An
//! [`ImportUpdatePolicy`] additionally governs the two legal ways an
//! already-adopted document may later be replaced: key rotation and
//! allow-listed entity field changes.
//!
//! Every check here is cheap and returns `bool`/`Option` rather than a
//! typed error — a document failing acceptance is an ordinary outcome,
//! not a bug, so callers branch on it rather than propagate it (spec
//! section 4.13).

use chrono::NaiveDate;

use covenant_crypto::{verify, verify_keys};
use covenant_types::document::Document;
use covenant_types::entity::Entity;
use covenant_types::envelope::Envelope;
use covenant_types::keys::Keys;
use covenant_types::message::Message;
use covenant_types::network::Node;
use covenant_types::portfolio::order_keys;
use covenant_types::statement::Statement;

/// Per-document acceptance checks for documents bound to an owner
/// portfolio's own entity (spec section 4.10).
pub struct ImportPolicy<'a> {
    /// The owner portfolio's entity.
    pub entity: &'a Entity,
    /// The owner portfolio's current key generations.
    pub keys: &'a [Keys],
    /// The owner's domain id, if it operates one (required by
    /// [`ImportPolicy::node_document`]).
    pub domain: Option<uuid::Uuid>,
    /// The clock snapshot this policy evaluates expiry against.
    pub today: NaiveDate,
}

impl<'a> ImportPolicy<'a> {
    /// Validate the portfolio's own entity against its own latest key:
    /// not expired, structurally valid, and self-verifying both ways.
    /// Returns `None` on any failure rather than indicating which check
    /// failed — self-acceptance is all-or-nothing.
    pub fn entity(&self) -> Option<(&'a Entity, &'a Keys)> {
        if self.today > self.entity.expires() {
            tracing::debug!(entity = %self.entity.id(), "self entity rejected: expired");
            return None;
        }
        if let Err(err) = self.entity.validate() {
            tracing::debug!(entity = %self.entity.id(), %err, "self entity rejected: invalid");
            return None;
        }
        let mut ordered: Vec<Keys> = self.keys.to_vec();
        order_keys(&mut ordered);
        let key = ordered.first()?;
        if !verify(self.entity, self.entity, self.keys, &[]) {
            tracing::debug!(entity = %self.entity.id(), "self entity rejected: signature does not verify");
            return None;
        }
        if !verify(key, self.entity, self.keys, &[]) {
            tracing::debug!(entity = %self.entity.id(), keys = %key.id(), "self entity rejected: keys signature does not verify");
            return None;
        }
        let key_ref = self.keys.iter().find(|k| k.id() == key.id())?;
        Some((self.entity, key_ref))
    }

    /// Accept a document issued by this portfolio's own entity: Statement
    /// variants, Profile, Domain, Network, Keys, or PrivateKeys.
    pub fn issued_document(&self, doc: &dyn Document) -> bool {
        let accepted = doc.issuer() == self.entity.id()
            && self.today <= doc.expires()
            && doc.validate().is_ok()
            && verify(doc, self.entity, self.keys, &[]);
        if !accepted {
            tracing::debug!(document = %doc.id(), issuer = %doc.issuer(), "issued document rejected");
        }
        accepted
    }

    /// Accept a [`Node`] document: additionally requires the node's
    /// domain to match this portfolio's own domain.
    pub fn node_document(&self, node: &Node) -> bool {
        if self.domain != Some(node.domain) {
            tracing::debug!(node = %node.id(), node_domain = %node.domain, "node document rejected: domain mismatch");
            return false;
        }
        self.issued_document(node)
    }

    /// Accept a [`Statement`] issued by `issuer` about this portfolio's
    /// own entity.
    pub fn owned_document(&self, issuer_entity: &Entity, issuer_keys: &[Keys], statement: &Statement) -> bool {
        let accepted = statement.owner() == Some(self.entity.id())
            && statement.issuer() == issuer_entity.id()
            && verify(statement, issuer_entity, issuer_keys, &[]);
        if !accepted {
            tracing::debug!(statement = %statement.id(), issuer = %issuer_entity.id(), "owned statement rejected");
        }
        accepted
    }

    /// Accept an [`Envelope`] addressed to this portfolio's own entity
    /// from `sender`. The header chain is excluded from the signature
    /// surface since it grows after the body is sealed and signed (spec
    /// section 4.5/4.8).
    pub fn envelope(&self, sender_entity: &Entity, sender_keys: &[Keys], envelope: &Envelope) -> bool {
        let accepted = envelope.owner == self.entity.id()
            && envelope.issuer() == sender_entity.id()
            && self.today <= envelope.expires()
            && verify(envelope, sender_entity, sender_keys, &["chain"]);
        if !accepted {
            tracing::debug!(envelope = %envelope.id(), sender = %sender_entity.id(), "envelope rejected");
        }
        accepted
    }

    /// Accept a [`Message`] from `sender`, checked against its full
    /// signature surface (no excluded fields, unlike an envelope).
    pub fn message(&self, sender_entity: &Entity, sender_keys: &[Keys], message: &Message) -> bool {
        let accepted = message.issuer() == sender_entity.id()
            && self.today <= message.expires()
            && message.validate().is_ok()
            && verify(message, sender_entity, sender_keys, &[]);
        if !accepted {
            tracing::debug!(message = %message.id(), sender = %sender_entity.id(), "message rejected");
        }
        accepted
    }
}

/// Checks governing whether an already-adopted document may be replaced
/// (spec section 4.10's `ImportUpdatePolicy`).
pub struct ImportUpdatePolicy<'a> {
    /// The owner portfolio's entity, as currently on file.
    pub entity: &'a Entity,
    /// The owner portfolio's current key generations, as currently on
    /// file (the "old" side of a rotation).
    pub keys: &'a [Keys],
    /// The clock snapshot this policy evaluates expiry against.
    pub today: NaiveDate,
}

impl<'a> ImportUpdatePolicy<'a> {
    /// Accept a rotated [`Keys`] document: right issuer, not expired,
    /// structurally valid, and both the carry-over signature (old key
    /// over new) and the self-signature (new key over itself) check out.
    pub fn keys(&self, new: &Keys) -> bool {
        let accepted = new.issuer() == self.entity.id()
            && self.today <= new.expires()
            && new.validate().is_ok()
            && verify_keys(new, self.entity, self.keys);
        if !accepted {
            tracing::debug!(keys = %new.id(), entity = %self.entity.id(), "key rotation rejected");
        }
        accepted
    }

    /// Accept an updated entity document: only the allow-listed mutable
    /// fields (per variant), plus `signature` and `updated`, may differ
    /// from the entity currently on file, and the new document must
    /// still verify against this portfolio's keys.
    pub fn entity(&self, updated: &Entity) -> bool {
        if !verify(updated, self.entity, self.keys, &[]) {
            tracing::debug!(entity = %self.entity.id(), "entity update rejected: signature does not verify");
            return false;
        }
        let allowed = self.entity.mutable_fields();
        let before = self.entity.native_export();
        let after = updated.native_export();
        let accepted = before.iter().all(|(field, old_value)| {
            let Some(new_value) = after.get(field) else {
                return false;
            };
            old_value == new_value || field == "signature" || field == "updated" || allowed.contains(&field.as_str())
        });
        if !accepted {
            tracing::debug!(entity = %self.entity.id(), "entity update rejected: field outside the mutable allow-list changed");
        }
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{change_person, generate_entity, renew_entity, NewEntity};
    use covenant_types::entity::Sex;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn person() -> covenant_types::portfolio::PrivatePortfolio {
        generate_entity(
            NewEntity::Person {
                given_name: "Harriet".into(),
                family_name: "Tubman".into(),
                names: vec!["Harriet".into()],
                sex: Sex::Woman,
                born: NaiveDate::from_ymd_opt(1822, 3, 10).unwrap(),
            },
            today(),
        )
        .unwrap()
    }

    #[test]
    fn self_entity_accepts_a_freshly_generated_portfolio() {
        let portfolio = person();
        let policy = ImportPolicy {
            entity: portfolio.portfolio.entity.as_ref().unwrap(),
            keys: &portfolio.portfolio.keys,
            domain: None,
            today: today(),
        };
        assert!(policy.entity().is_some());
    }

    #[test]
    fn entity_update_rejects_changes_outside_the_allow_list() {
        let mut portfolio = person();
        let before = portfolio.portfolio.entity.clone().unwrap();
        let update_policy = ImportUpdatePolicy {
            entity: &before,
            keys: &portfolio.portfolio.keys,
            today: today(),
        };

        let entity = portfolio.portfolio.entity.as_mut().unwrap();
        let Entity::Person(person) = entity else {
            unreachable!()
        };
        change_person(
            person,
            "Davis".into(),
            &portfolio.portfolio.keys,
            &portfolio.privkeys,
            today(),
        )
        .unwrap();
        assert!(update_policy.entity(entity));
    }

    #[test]
    fn renewed_entity_still_passes_update_acceptance() {
        let mut portfolio = person();
        let before = portfolio.portfolio.entity.clone().unwrap();
        let update_policy = ImportUpdatePolicy {
            entity: &before,
            keys: &portfolio.portfolio.keys,
            today: today(),
        };
        let entity = portfolio.portfolio.entity.as_mut().unwrap();
        let later = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        renew_entity(entity, &portfolio.portfolio.keys, &portfolio.privkeys, later).unwrap();
        assert!(update_policy.entity(entity));
    }
}
