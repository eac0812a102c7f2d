//! # Portfolios (spec section 5)
//!
//! A portfolio is the working set of documents one party holds about an
//! entity: its identity, profile, published keys, network, and the
//! statements others have issued about it (or it about others).
//! [`PrivatePortfolio`] additionally carries the secrets and local
//! network documents only the entity's own device needs.

use uuid::Uuid;

use crate::document::Document;
use crate::entity::Entity;
use crate::keys::{Keys, PrivateKeys};
use crate::network::{Domain, Node};
use crate::profile::Profile;
use crate::statement::Statement;

/// The three statement buckets a portfolio tracks (spec section 5):
/// verifications, trust claims, and revocations, each keyed by the
/// related entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statements {
    /// Verification statements.
    pub verified: Vec<Statement>,
    /// Trust statements.
    pub trusted: Vec<Statement>,
    /// Revocation statements.
    pub revoked: Vec<Statement>,
}

impl Statements {
    /// All statements across the three buckets, verified first.
    pub fn all(&self) -> impl Iterator<Item = &Statement> {
        self.verified.iter().chain(&self.trusted).chain(&self.revoked)
    }

    /// Whether a revocation on file points at `statement_id` (spec
    /// section 4.11/4.12: revocation is by id, not by owner).
    fn is_revoked(&self, statement_id: Uuid) -> bool {
        self.revoked.iter().any(|s| s.issuance() == Some(statement_id))
    }

    /// The latest live (not subsequently revoked) verification on file
    /// for `owner`, if any (spec section 4.11's `validate_verified`).
    pub fn latest_verified(&self, owner: Uuid) -> Option<&Statement> {
        self.verified
            .iter()
            .filter(|s| s.owner() == Some(owner) && !self.is_revoked(s.id()))
            .max_by_key(|s| s.created())
    }

    /// The latest live trust claim on file for `owner`, if any.
    pub fn latest_trusted(&self, owner: Uuid) -> Option<&Statement> {
        self.trusted
            .iter()
            .filter(|s| s.owner() == Some(owner) && !self.is_revoked(s.id()))
            .max_by_key(|s| s.created())
    }

    /// Whether `owner` has an active (i.e. not subsequently revoked)
    /// verification on file.
    pub fn is_verified(&self, owner: Uuid) -> bool {
        self.latest_verified(owner).is_some()
    }

    /// Whether `owner` has an active trust claim on file.
    pub fn is_trusted(&self, owner: Uuid) -> bool {
        self.latest_trusted(owner).is_some()
    }
}

/// Keys ordered `(created desc, id asc)` (spec section 4.9's tie-break),
/// the order verification walks them in when looking for a key whose
/// validity window covers a document's touch date.
pub fn order_keys(keys: &mut [Keys]) {
    keys.sort_by(|a, b| b.created().cmp(&a.created()).then(a.id().cmp(&b.id())));
}

/// Everything one party holds about a single entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Portfolio {
    /// The entity itself, if known.
    pub entity: Option<Entity>,
    /// Its public profile, if published.
    pub profile: Option<Profile>,
    /// Its published key generations, most recent relevant first once
    /// [`order_keys`] has been applied.
    pub keys: Vec<Keys>,
    /// Its network publication, if it participates in one.
    pub network: Option<crate::network::Network>,
    /// Statements this entity has issued about others.
    pub issuer_statements: Statements,
    /// Statements others have issued about this entity.
    pub owner_statements: Statements,
}

impl Portfolio {
    /// An empty portfolio with no documents yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// The entity's id, if the entity document is present.
    pub fn entity_id(&self) -> Option<Uuid> {
        use crate::document::Document;
        self.entity.as_ref().map(|e| e.id())
    }
}

/// The local-only extension of a [`Portfolio`] held by the entity's own
/// device: secret keys, the domain it answers to, and the nodes it runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrivatePortfolio {
    /// The shared, exportable portfolio.
    pub portfolio: Portfolio,
    /// Secret key material backing `portfolio.keys`.
    pub privkeys: Vec<PrivateKeys>,
    /// The domain this entity operates under, if any.
    pub domain: Option<Domain>,
    /// Nodes this entity operates, if any.
    pub nodes: Vec<Node>,
}

impl PrivatePortfolio {
    /// An empty private portfolio.
    pub fn new() -> Self {
        Self::default()
    }
}
