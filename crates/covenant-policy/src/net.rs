//! # Host introspection (spec section 6)
//!
//! `Node::current` generation needs to know the local machine's hostname
//! and reachable address when minting a server-role node. Wrapping that
//! behind a trait keeps `generate_node` testable without touching the
//! real network stack.

use std::net::{IpAddr, UdpSocket};

/// What a server-role [`crate::network::generate_node`] call needs to
/// know about the machine it runs on.
pub trait Net {
    /// The local machine's DNS hostname, if resolvable.
    fn hostname(&self) -> Option<String>;
    /// The local machine's outward-facing IP address, if determinable.
    fn ip(&self) -> Option<IpAddr>;
}

/// Production [`Net`]: asks the OS for the hostname, and discovers the
/// outward IP via a UDP "connect" — no packet is actually sent, it just
/// forces the kernel to pick an outbound route and bind a local address.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemNet;

impl Net for SystemNet {
    fn hostname(&self) -> Option<String> {
        hostname::get().ok()?.into_string().ok()
    }

    fn ip(&self) -> Option<IpAddr> {
        let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
        socket.connect("8.8.8.8:80").ok()?;
        socket.local_addr().ok().map(|addr| addr.ip())
    }
}
