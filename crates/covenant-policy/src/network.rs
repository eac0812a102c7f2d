//! # Network generation policy (spec section 4.3)
//!
//! A domain is the root authority a node/network operates under; nodes
//! register themselves (client, server, or backup); a network document
//! publishes the currently reachable server/backup nodes to clients.

use chrono::NaiveDate;
use uuid::Uuid;

use covenant_crypto::sign;
use covenant_types::document::{default_identity_expiry, DocHeader, Document, SignatureField};
use covenant_types::entity::Entity;
use covenant_types::error::PolicyError;
use covenant_types::keys::{Keys, PrivateKeys};
use covenant_types::network::{Domain, Host, Location, Network, Node, NodeRole};

use crate::net::Net;

/// Mint a fresh, self-signed domain for `entity` (spec section 4.3).
pub fn generate_domain(
    entity: &Entity,
    name: String,
    keys: &[Keys],
    privkeys: &[PrivateKeys],
    today: NaiveDate,
) -> Result<Domain, PolicyError> {
    let mut domain = Domain {
        header: DocHeader {
            id: Uuid::new_v4(),
            created: today,
            updated: None,
            expires: default_identity_expiry(today),
            issuer: entity.id(),
            signature: SignatureField::single(),
        },
        name,
    };
    sign(&mut domain, entity, keys, privkeys, &[], false, today)?;
    Ok(domain)
}

/// Mint a [`Node`] for `entity` under `domain`, using `net` to discover a
/// reachable location when `role` is [`NodeRole::Server`] (spec section
/// 4.3; [`NodeRole::Backup`] carries no reachable-location requirement).
/// `domain.issuer` must equal `entity.issuer` (spec section 4.11's
/// "Node.current").
#[allow(clippy::too_many_arguments)]
pub fn generate_node(
    entity: &Entity,
    domain: &Domain,
    role: NodeRole,
    device: String,
    serial: String,
    net: &dyn Net,
    port: Option<u16>,
    keys: &[Keys],
    privkeys: &[PrivateKeys],
    today: NaiveDate,
) -> Result<Node, PolicyError> {
    if domain.issuer() != entity.issuer() {
        return Err(PolicyError::DomainIssuerMismatch {
            expected: entity.issuer(),
            actual: domain.issuer(),
        });
    }

    let location = if role == NodeRole::Client {
        Location::default()
    } else {
        Location {
            hostname: net.hostname().into_iter().collect(),
            ip: net.ip().into_iter().collect(),
            port,
        }
    };

    let mut node = Node {
        header: DocHeader {
            id: Uuid::new_v4(),
            created: today,
            updated: None,
            expires: default_identity_expiry(today),
            issuer: entity.id(),
            signature: SignatureField::single(),
        },
        domain: domain.id(),
        role,
        device,
        serial,
        location,
    };
    sign(&mut node, entity, keys, privkeys, &[], false, today)?;
    Ok(node)
}

/// Publish a [`Network`] document listing every reachable [`Node`] in
/// `nodes` (spec section 4.3: client-role and unreachable backup nodes
/// are left out, since [`Network::validate`] requires at least one
/// reachable host and there is nothing useful to publish about a node
/// with no location).
pub fn generate_network(
    entity: &Entity,
    domain: &Domain,
    nodes: &[Node],
    keys: &[Keys],
    privkeys: &[PrivateKeys],
    today: NaiveDate,
) -> Result<Network, PolicyError> {
    let hosts: Vec<Host> = nodes
        .iter()
        .filter(|n| n.location.is_reachable())
        .map(|n| Host {
            node: n.id(),
            location: n.location.clone(),
        })
        .collect();

    let mut network = Network {
        header: DocHeader {
            id: Uuid::new_v4(),
            created: today,
            updated: None,
            expires: default_identity_expiry(today),
            issuer: entity.id(),
            signature: SignatureField::single(),
        },
        domain: domain.id(),
        hosts,
    };
    sign(&mut network, entity, keys, privkeys, &[], false, today)?;
    Ok(network)
}
