// BgpSim: BGP Network Simulator written in Rust
// Copyright (C) 2022-2023 Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! Cluster-tree addressing.

use serde::{Deserialize, Serialize};

/// Sentinel `net_addr`/`node_addr` value used for broadcast destinations.
pub const BROADCAST_NET: u8 = 255;
/// Sentinel `net_addr`/`node_addr` value used for broadcast destinations.
pub const BROADCAST_NODE: u8 = 255;
/// `node_addr` reserved for a cluster head / root within its own subnet.
pub const CH_NODE_ADDR: u8 = 254;

/// A two-level address: `net_addr` identifies a cluster (subnet), `node_addr` identifies a node
/// within that cluster. The root always owns `Addr(0, 254)`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Addr {
    /// Cluster (subnet) identifier.
    pub net_addr: u8,
    /// Node identifier within the cluster.
    pub node_addr: u8,
}

impl Addr {
    /// Address of the root node.
    pub const ROOT: Addr = Addr { net_addr: 0, node_addr: CH_NODE_ADDR };

    /// The broadcast address `(255, 255)`.
    pub const BROADCAST: Addr = Addr { net_addr: BROADCAST_NET, node_addr: BROADCAST_NODE };

    /// Build a new address.
    pub const fn new(net_addr: u8, node_addr: u8) -> Self {
        Self { net_addr, node_addr }
    }

    /// Structural equality; kept as an explicit method to mirror the source protocol's
    /// `is_equal`, which is used at call sites where "compare both fields" needs to read as an
    /// intentional check rather than an incidental `==`.
    pub fn is_equal(&self, other: &Addr) -> bool {
        self == other
    }

    /// Whether this address is the broadcast sentinel.
    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }

    /// Whether this address belongs to a cluster head or root (`node_addr == 254`).
    pub fn is_ch_addr(&self) -> bool {
        self.node_addr == CH_NODE_ADDR
    }
}

impl std::fmt::Display for Addr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.net_addr, self.node_addr)
    }
}

/// Stable identifier of a simulated node, used for visualization and as a table key
/// (the protocol's "gui").
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(x: u32) -> Self {
        Self(x)
    }
}

impl From<usize> for NodeId {
    fn from(x: usize) -> Self {
        Self(x as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_addr_is_zero_254() {
        assert_eq!(Addr::ROOT, Addr::new(0, 254));
    }

    #[test]
    fn structural_equality() {
        assert!(Addr::new(1, 2).is_equal(&Addr::new(1, 2)));
        assert!(!Addr::new(1, 2).is_equal(&Addr::new(1, 3)));
    }

    #[test]
    fn broadcast_sentinel() {
        assert!(Addr::new(255, 255).is_broadcast());
        assert!(!Addr::new(1, 255).is_broadcast());
    }
}
