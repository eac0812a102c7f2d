//! # Network (spec section 3)
//!
//! A [`Domain`] is the root authority a church/ministry network operates
//! under; [`Node`]s are individual machines within it; a [`Network`]
//! publishes the reachable hosts client software should try.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use chrono::NaiveDate;
use indexmap::IndexMap;
use uuid::Uuid;

use crate::document::{
    rule_expiry_window, rule_type_tag, rule_updated_not_before_created, DocHeader, Document,
    ExpiryClass, SignatureField,
};
use crate::entity::signature_field_value;
use crate::error::DocumentError;
use crate::field::FieldValue;
use crate::type_tag::TypeTag;

/// The root authority a node/network belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    /// Shared document header.
    pub header: DocHeader,
    /// A human-readable name for this domain.
    pub name: String,
}

impl Document for Domain {
    fn id(&self) -> Uuid {
        self.header.id
    }
    fn type_tag(&self) -> TypeTag {
        TypeTag::NetDomain
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
        map.insert("type".into(), FieldValue::Int(TypeTag::NetDomain.into()));
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
        map.insert("name".into(), FieldValue::Str(self.name.clone()));
        map
    }

    fn validate(&self) -> Result<(), DocumentError> {
        rule_type_tag(TypeTag::NetDomain, TypeTag::NetDomain)?;
        rule_updated_not_before_created(self.header.created, self.header.updated)?;
        rule_expiry_window(self.touched(), self.header.expires, ExpiryClass::Identity)?;
        self.header.signature.validate("signature")?;
        Ok(())
    }
}

/// Whether a [`Node`] serves other nodes or only connects as a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeRole {
    /// Connects outward only; carries no reachable location.
    Client,
    /// Reachable by other nodes; must declare a hostname or IP (spec
    /// section 4.3).
    Server,
    /// A standby server, held in reserve; not published to [`Network`]
    /// until promoted, so it carries no reachable-location requirement.
    Backup,
}

impl NodeRole {
    /// The role's canonical string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeRole::Client => "client",
            NodeRole::Server => "server",
            NodeRole::Backup => "backup",
        }
    }
}

/// A single network location: at least one hostname or IP, optionally a
/// port (spec section 3: `location {hostname[], ip[]}`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    /// DNS hostnames the node answers to.
    pub hostname: Vec<String>,
    /// Raw IP addresses the node answers to.
    pub ip: Vec<IpAddr>,
    /// TCP/UDP port, if the protocol uses a non-default one.
    pub port: Option<u16>,
}

impl Location {
    /// Whether this location carries enough information to be dialed.
    pub fn is_reachable(&self) -> bool {
        !self.hostname.is_empty() || !self.ip.is_empty()
    }
}

/// A machine participating in a [`Domain`]'s network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Shared document header.
    pub header: DocHeader,
    /// The owning domain's id.
    pub domain: Uuid,
    /// Client, server, or backup.
    pub role: NodeRole,
    /// The device type or model running this node.
    pub device: String,
    /// The device's serial number.
    pub serial: String,
    /// Reachable location, required when `role` is [`NodeRole::Server`].
    pub location: Location,
}

impl Document for Node {
    fn id(&self) -> Uuid {
        self.header.id
    }
    fn type_tag(&self) -> TypeTag {
        TypeTag::NetNode
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
        map.insert("type".into(), FieldValue::Int(TypeTag::NetNode.into()));
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
        map.insert("domain".into(), FieldValue::Uuid(self.domain));
        map.insert("role".into(), FieldValue::Str(self.role.as_str().to_string()));
        map.insert("device".into(), FieldValue::Str(self.device.clone()));
        map.insert("serial".into(), FieldValue::Str(self.serial.clone()));
        map.insert("hostname".into(), location_hostname_field(&self.location));
        map.insert("ip".into(), location_ip_field(&self.location));
        map.insert(
            "port".into(),
            self.location
                .port
                .map(|p| FieldValue::Int(p as i64))
                .unwrap_or(FieldValue::Null),
        );
        map
    }

    fn validate(&self) -> Result<(), DocumentError> {
        rule_type_tag(TypeTag::NetNode, TypeTag::NetNode)?;
        rule_updated_not_before_created(self.header.created, self.header.updated)?;
        rule_expiry_window(self.touched(), self.header.expires, ExpiryClass::Identity)?;
        if self.role == NodeRole::Server && !self.location.is_reachable() {
            return Err(DocumentError::NoLocation { node: self.header.id });
        }
        self.header.signature.validate("signature")?;
        Ok(())
    }
}

/// A [`Location`]'s hostnames as a declared-order canonical list (spec
/// section 4.1: an empty list exports as an empty `FieldValue::List`).
fn location_hostname_field(location: &Location) -> FieldValue {
    FieldValue::List(location.hostname.iter().cloned().map(FieldValue::Str).collect())
}

/// A [`Location`]'s IPs as a declared-order canonical list.
fn location_ip_field(location: &Location) -> FieldValue {
    FieldValue::List(location.ip.iter().copied().map(FieldValue::Ip).collect())
}

/// One published, reachable host belonging to a [`Network`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Host {
    /// The node this host entry corresponds to.
    pub node: Uuid,
    /// The host's location.
    pub location: Location,
}

/// A domain's published list of reachable hosts, distributed to clients
/// so they know where to connect (spec section 4.3: at least one host
/// must be reachable).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    /// Shared document header.
    pub header: DocHeader,
    /// The owning domain's id.
    pub domain: Uuid,
    /// Candidate hosts, in preference order.
    pub hosts: Vec<Host>,
}

impl Document for Network {
    fn id(&self) -> Uuid {
        self.header.id
    }
    fn type_tag(&self) -> TypeTag {
        TypeTag::NetNetwork
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
        map.insert("type".into(), FieldValue::Int(TypeTag::NetNetwork.into()));
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
        map.insert("domain".into(), FieldValue::Uuid(self.domain));
        map.insert(
            "hosts".into(),
            FieldValue::List(
                self.hosts
                    .iter()
                    .map(|h| {
                        let mut host_map = IndexMap::new();
                        host_map.insert("node".into(), FieldValue::Uuid(h.node));
                        host_map.insert("hostname".into(), location_hostname_field(&h.location));
                        host_map.insert("ip".into(), location_ip_field(&h.location));
                        host_map.insert(
                            "port".into(),
                            h.location
                                .port
                                .map(|p| FieldValue::Int(p as i64))
                                .unwrap_or(FieldValue::Null),
                        );
                        FieldValue::Document(host_map)
                    })
                    .collect(),
            ),
        );
        map
    }

    fn validate(&self) -> Result<(), DocumentError> {
        rule_type_tag(TypeTag::NetNetwork, TypeTag::NetNetwork)?;
        rule_updated_not_before_created(self.header.created, self.header.updated)?;
        rule_expiry_window(self.touched(), self.header.expires, ExpiryClass::Identity)?;
        if !self.hosts.iter().any(|h| h.location.is_reachable()) {
            return Err(DocumentError::NoHost { network: self.header.id });
        }
        self.header.signature.validate("signature")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::default_identity_expiry;

    fn header(issuer: Uuid, created: NaiveDate) -> DocHeader {
        DocHeader {
            id: Uuid::new_v4(),
            created,
            updated: None,
            expires: default_identity_expiry(created),
            issuer,
            signature: SignatureField::single(),
        }
    }

    #[test]
    fn server_node_without_location_is_rejected() {
        let created = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut node = Node {
            header: header(Uuid::new_v4(), created),
            domain: Uuid::new_v4(),
            role: NodeRole::Server,
            device: "raspberry-pi-4".into(),
            serial: "SN-0001".into(),
            location: Location::default(),
        };
        assert!(matches!(
            node.validate(),
            Err(DocumentError::NoLocation { .. })
        ));
        node.location.hostname = vec!["node1.example.org".into()];
        node.header.signature.set(vec![1; 64]);
        assert!(node.validate().is_ok());
    }

    #[test]
    fn network_with_no_reachable_host_is_rejected() {
        let created = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut network = Network {
            header: header(Uuid::new_v4(), created),
            domain: Uuid::new_v4(),
            hosts: vec![Host {
                node: Uuid::new_v4(),
                location: Location::default(),
            }],
        };
        assert!(matches!(network.validate(), Err(DocumentError::NoHost { .. })));
        network.hosts[0].location.ip = vec!["127.0.0.1".parse().unwrap()];
        network.header.signature.set(vec![1; 64]);
        assert!(network.validate().is_ok());
    }
}
