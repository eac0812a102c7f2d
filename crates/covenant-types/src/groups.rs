//! # Selection groups (spec section 5)
//!
//! A selection group names a canonical subset of a portfolio's documents
//! to export — e.g. "just enough to verify a signature" versus "my full
//! trust graph". Expressed as a closed enum plus a lookup table rather
//! than as ad hoc boolean flags, so new call sites can't drift from the
//! fifteen canonical definitions.

/// Which portfolio parts a [`SelectionGroup`] includes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    /// Include the entity document.
    pub entity: bool,
    /// Include the profile document.
    pub profile: bool,
    /// Include published keys.
    pub keys: bool,
    /// Include local private key material (`PrivatePortfolio` only).
    pub privkeys: bool,
    /// Include the network document.
    pub network: bool,
    /// Include the domain document (`PrivatePortfolio` only).
    pub domain: bool,
    /// Include locally operated nodes (`PrivatePortfolio` only).
    pub nodes: bool,
    /// Include statements this entity issued about others — verified.
    pub issuer_verified: bool,
    /// Include statements this entity issued about others — trusted.
    pub issuer_trusted: bool,
    /// Include statements this entity issued about others — revoked.
    pub issuer_revoked: bool,
    /// Include statements others issued about this entity — verified.
    pub owner_verified: bool,
    /// Include statements others issued about this entity — trusted.
    pub owner_trusted: bool,
    /// Include statements others issued about this entity — revoked.
    pub owner_revoked: bool,
}

impl Selection {
    /// Include the full issuer statement bucket (all three kinds).
    fn with_issuer_statements(mut self) -> Self {
        self.issuer_verified = true;
        self.issuer_trusted = true;
        self.issuer_revoked = true;
        self
    }

    /// Include the full owner statement bucket (all three kinds).
    fn with_owner_statements(mut self) -> Self {
        self.owner_verified = true;
        self.owner_trusted = true;
        self.owner_revoked = true;
        self
    }
}

/// The fifteen canonical portfolio subsets (spec section 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionGroup {
    /// Enough to verify a signature: entity + keys.
    Verifier,
    /// Verifier plus the revocations this entity has issued about others.
    VerifierRevoked,
    /// Enough to sign as this entity: entity + privkeys + keys.
    Signer,
    /// What a client needs to operate: entity + privkeys + keys + domain + nodes.
    Client,
    /// Client plus the network it participates in.
    Server,
    /// What's needed for a mutually authenticated connection: entity +
    /// keys + network + the trust this entity has received.
    ClientAuth,
    /// The full set of statements this entity has issued about others.
    Issuer,
    /// The full set of statements others have issued about this entity.
    Owner,
    /// Minimal share to an individual user: entity + keys.
    ShareMinUser,
    /// Minimal share to a community: entity + keys + network.
    ShareMinCommunity,
    /// Medium share to an individual user: + profile.
    ShareMedUser,
    /// Medium share to a community: + profile.
    ShareMedCommunity,
    /// Maximal share to an individual user: + the trust this entity has received.
    ShareMaxUser,
    /// Maximal share to a community: + the trust this entity has received.
    ShareMaxCommunity,
    /// Everything.
    All,
}

impl SelectionGroup {
    /// The portfolio parts this group includes.
    pub fn selection(&self) -> Selection {
        use SelectionGroup::*;
        match self {
            Verifier => Selection {
                entity: true,
                keys: true,
                ..Selection::default()
            },
            VerifierRevoked => Selection {
                entity: true,
                keys: true,
                issuer_revoked: true,
                ..Selection::default()
            },
            Signer => Selection {
                entity: true,
                privkeys: true,
                keys: true,
                ..Selection::default()
            },
            Client => Selection {
                entity: true,
                privkeys: true,
                keys: true,
                domain: true,
                nodes: true,
                ..Selection::default()
            },
            Server => Selection {
                entity: true,
                privkeys: true,
                keys: true,
                domain: true,
                nodes: true,
                network: true,
                ..Selection::default()
            },
            ClientAuth => Selection {
                entity: true,
                keys: true,
                network: true,
                owner_verified: true,
                owner_trusted: true,
                ..Selection::default()
            },
            Issuer => Selection::default().with_issuer_statements(),
            Owner => Selection::default().with_owner_statements(),
            ShareMinUser => Selection {
                entity: true,
                keys: true,
                ..Selection::default()
            },
            ShareMinCommunity => Selection {
                entity: true,
                keys: true,
                network: true,
                ..Selection::default()
            },
            ShareMedUser => Selection {
                entity: true,
                profile: true,
                keys: true,
                ..Selection::default()
            },
            ShareMedCommunity => Selection {
                entity: true,
                profile: true,
                keys: true,
                network: true,
                ..Selection::default()
            },
            ShareMaxUser => Selection {
                entity: true,
                profile: true,
                keys: true,
                owner_verified: true,
                owner_trusted: true,
                ..Selection::default()
            },
            ShareMaxCommunity => Selection {
                entity: true,
                profile: true,
                keys: true,
                network: true,
                owner_verified: true,
                owner_trusted: true,
                ..Selection::default()
            },
            All => Selection {
                entity: true,
                profile: true,
                keys: true,
                privkeys: true,
                network: true,
                domain: true,
                nodes: true,
                issuer_verified: true,
                issuer_trusted: true,
                issuer_revoked: true,
                owner_verified: true,
                owner_trusted: true,
                owner_revoked: true,
            },
        }
    }

    /// Apply this group to a shared portfolio, producing a filtered copy
    /// suitable for export (spec section 5). Unselected parts are
    /// dropped, not merely hidden. Selection flags that only apply to a
    /// [`crate::portfolio::PrivatePortfolio`] (`privkeys`, `domain`,
    /// `nodes`) have no effect here — use [`Self::apply_private`] for those.
    pub fn apply(&self, portfolio: &crate::portfolio::Portfolio) -> crate::portfolio::Portfolio {
        let selection = self.selection();
        crate::portfolio::Portfolio {
            entity: if selection.entity { portfolio.entity.clone() } else { None },
            profile: if selection.profile { portfolio.profile.clone() } else { None },
            keys: if selection.keys { portfolio.keys.clone() } else { Vec::new() },
            network: if selection.network { portfolio.network.clone() } else { None },
            issuer_statements: filter_statements(
                &portfolio.issuer_statements,
                selection.issuer_verified,
                selection.issuer_trusted,
                selection.issuer_revoked,
            ),
            owner_statements: filter_statements(
                &portfolio.owner_statements,
                selection.owner_verified,
                selection.owner_trusted,
                selection.owner_revoked,
            ),
        }
    }

    /// Apply this group to a private portfolio, producing a filtered copy
    /// that may also carry local-only secrets, domain, and node documents.
    pub fn apply_private(
        &self,
        portfolio: &crate::portfolio::PrivatePortfolio,
    ) -> crate::portfolio::PrivatePortfolio {
        let selection = self.selection();
        crate::portfolio::PrivatePortfolio {
            portfolio: self.apply(&portfolio.portfolio),
            privkeys: if selection.privkeys { portfolio.privkeys.clone() } else { Vec::new() },
            domain: if selection.domain { portfolio.domain.clone() } else { None },
            nodes: if selection.nodes { portfolio.nodes.clone() } else { Vec::new() },
        }
    }
}

fn filter_statements(
    statements: &crate::portfolio::Statements,
    verified: bool,
    trusted: bool,
    revoked: bool,
) -> crate::portfolio::Statements {
    crate::portfolio::Statements {
        verified: if verified { statements.verified.clone() } else { Vec::new() },
        trusted: if trusted { statements.trusted.clone() } else { Vec::new() },
        revoked: if revoked { statements.revoked.clone() } else { Vec::new() },
    }
}
