//! # Statement issuance policy (spec section 4.11's `StatementPolicy`)
//!
//! A statement is one of the few documents that lives in two places at
//! once: the issuer's `issuer.*` bucket and the owner's `owner.*` bucket
//! (spec section 3/5). Issuing constructs and signs the document;
//! recording inserts the shared reference into both sides.

use chrono::NaiveDate;
use uuid::Uuid;

use covenant_crypto::{sign, verify};
use covenant_types::document::{default_identity_expiry, DocHeader, Document, SignatureField};
use covenant_types::entity::Entity;
use covenant_types::error::PolicyError;
use covenant_types::keys::{Keys, PrivateKeys};
use covenant_types::portfolio::Statements;
use covenant_types::statement::{Revoked, Statement, StatementBody, Trusted, Verified};

fn fresh_header(issuer: Uuid, today: NaiveDate) -> DocHeader {
    DocHeader {
        id: Uuid::new_v4(),
        created: today,
        updated: None,
        expires: default_identity_expiry(today),
        issuer,
        signature: SignatureField::single(),
    }
}

/// Issue "I have verified this entity's identity" (spec section 4.11).
pub fn issue_verified(
    issuer_entity: &Entity,
    issuer_keys: &[Keys],
    issuer_privkeys: &[PrivateKeys],
    owner: Uuid,
    today: NaiveDate,
) -> Result<Statement, PolicyError> {
    let mut verified = Verified(StatementBody {
        header: fresh_header(issuer_entity.id(), today),
        owner,
    });
    sign(&mut verified, issuer_entity, issuer_keys, issuer_privkeys, &[], false, today)?;
    Ok(Statement::Verified(verified))
}

/// Issue "I trust this entity's statements and communications".
pub fn issue_trusted(
    issuer_entity: &Entity,
    issuer_keys: &[Keys],
    issuer_privkeys: &[PrivateKeys],
    owner: Uuid,
    today: NaiveDate,
) -> Result<Statement, PolicyError> {
    let mut trusted = Trusted(StatementBody {
        header: fresh_header(issuer_entity.id(), today),
        owner,
    });
    sign(&mut trusted, issuer_entity, issuer_keys, issuer_privkeys, &[], false, today)?;
    Ok(Statement::Trusted(trusted))
}

/// Issue a revocation of a prior statement, identified by its id.
pub fn issue_revoked(
    issuer_entity: &Entity,
    issuer_keys: &[Keys],
    issuer_privkeys: &[PrivateKeys],
    statement: Uuid,
    today: NaiveDate,
) -> Result<Statement, PolicyError> {
    let mut revoked = Revoked {
        header: fresh_header(issuer_entity.id(), today),
        issuance: statement,
    };
    sign(&mut revoked, issuer_entity, issuer_keys, issuer_privkeys, &[], false, today)?;
    Ok(Statement::Revoked(revoked))
}

/// Record a freshly issued Verified/Trusted statement as the shared
/// reference it is: into the issuer's `issuer.*` bucket and the owner's
/// `owner.*` bucket (spec section 4.11/5).
pub fn record_statement(issuer_side: &mut Statements, owner_side: &mut Statements, statement: &Statement) {
    match statement {
        Statement::Verified(_) => {
            issuer_side.verified.push(statement.clone());
            owner_side.verified.push(statement.clone());
        }
        Statement::Trusted(_) => {
            issuer_side.trusted.push(statement.clone());
            owner_side.trusted.push(statement.clone());
        }
        Statement::Revoked(_) => {
            // A revocation only ever lives in the revoking issuer's own
            // bucket (spec section 4.11: no owner side to mirror into).
            issuer_side.revoked.push(statement.clone());
        }
    }
}

fn latest_live<'a>(bucket: &'a [Statement], revoked: &[Statement], issuer: Uuid, owner: Uuid) -> Option<&'a Statement> {
    bucket
        .iter()
        .filter(|s| s.issuer() == issuer && s.owner() == Some(owner))
        .filter(|s| !revoked.iter().any(|r| r.issuance() == Some(s.id())))
        .max_by_key(|s| s.created())
}

/// The latest live Verified statement `issuer_entity` has issued about
/// `owner`, if its signature still checks out (spec section 4.11's
/// `validate_verified`).
pub fn validate_verified<'a>(
    statements: &'a Statements,
    issuer_entity: &Entity,
    issuer_keys: &[Keys],
    owner: Uuid,
) -> Option<&'a Statement> {
    let candidate = latest_live(&statements.verified, &statements.revoked, issuer_entity.id(), owner)?;
    verify(candidate, issuer_entity, issuer_keys, &[]).then_some(candidate)
}

/// The latest live Trusted statement `issuer_entity` has issued about
/// `owner`, if its signature still checks out.
pub fn validate_trusted<'a>(
    statements: &'a Statements,
    issuer_entity: &Entity,
    issuer_keys: &[Keys],
    owner: Uuid,
) -> Option<&'a Statement> {
    let candidate = latest_live(&statements.trusted, &statements.revoked, issuer_entity.id(), owner)?;
    verify(candidate, issuer_entity, issuer_keys, &[]).then_some(candidate)
}
