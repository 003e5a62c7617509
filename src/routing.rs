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

//! Hybrid tree/mesh/direct next-hop selection (ยง4.5).

use crate::node::Node;
use crate::types::{Addr, PathType, Role};

/// Whether a direct radio hop between a node in `a` and a node in `b` is legal (I5 / rule 4).
/// Registered<->Router and Router<->Router pairs are forbidden; everything else is allowed.
pub fn is_legal_direct_pair(a: Role, b: Role) -> bool {
    !matches!(
        (a, b),
        (Role::Registered, Role::Router)
            | (Role::Router, Role::Registered)
            | (Role::Router, Role::Router)
    )
}

/// Whether `parent_role` is a legal `parent_gui` for a node in `child_role` (I5). Stricter than
/// [`is_legal_direct_pair`]: a Router may relay a packet for an Unregistered/Registered neighbor
/// on the wire, but neither may adopt a Router as its tree parent.
pub fn is_legal_parent_role(child_role: Role, parent_role: Role) -> bool {
    if parent_role == Role::Router {
        return false;
    }
    is_legal_direct_pair(child_role, parent_role)
}

/// Select the next hop and path classification for a packet addressed to `dest`, per the
/// first-match-wins rules of ยง4.5. Returns `None` if no rule applies (packet should be dropped).
pub fn route_and_forward_package(node: &Node, dest: Addr) -> Option<(Addr, PathType)> {
    // Rule 1: tree-up default, unless I *am* the destination's cluster (rule 2/3 cover that).
    let same_net_as_me = node.role.is_ch_like() && dest.net_addr == node.ch_addr.net_addr;
    let downstream = node.downstream_hop_for(dest.net_addr);

    if !same_net_as_me && downstream.is_none() {
        if let Some(parent) = node.parent_entry() {
            let next = if parent.role == Role::Router { parent.addr } else { parent.ch_addr };
            return Some((next, PathType::Tree));
        }
    }

    // Rule 2: same-net direct - I own the subnet the destination lives in.
    if same_net_as_me {
        return Some((dest, PathType::Tree));
    }

    // Rule 3: downstream subnet - a known child (or, for Routers, a relayed subnet) owns it.
    if let Some(next) = downstream {
        return Some((next, PathType::Tree));
    }

    // Rule 4: direct / mesh neighbor match.
    if let Some(entry) = node.neighbors_table.values().find(|e| e.addr == dest) {
        if !is_legal_direct_pair(node.role, entry.role) {
            return None;
        }
        return if entry.neighbor_hop_count > 1 {
            entry.next_hop.map(|nh| (nh, PathType::Mesh))
        } else {
            Some((dest, PathType::Direct))
        };
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Addr, NodeId};

    #[test]
    fn legal_pairs() {
        assert!(is_legal_direct_pair(Role::Registered, Role::Registered));
        assert!(is_legal_direct_pair(Role::ClusterHead, Role::Router));
        assert!(is_legal_direct_pair(Role::Root, Role::Router));
        assert!(!is_legal_direct_pair(Role::Registered, Role::Router));
        assert!(!is_legal_direct_pair(Role::Router, Role::Registered));
        assert!(!is_legal_direct_pair(Role::Router, Role::Router));
    }

    #[test]
    fn legal_parent_roles_never_include_router() {
        assert!(!is_legal_parent_role(Role::Unregistered, Role::Router));
        assert!(!is_legal_parent_role(Role::Registered, Role::Router));
        assert!(!is_legal_parent_role(Role::Router, Role::Router));
        assert!(is_legal_parent_role(Role::Unregistered, Role::ClusterHead));
        assert!(is_legal_parent_role(Role::Unregistered, Role::Root));
    }

    #[test]
    fn falls_back_to_parent_when_no_better_rule_applies() {
        let cfg = crate::config::SimConfig::default();
        let mut node = Node::new(NodeId(1), (0.0, 0.0), &cfg);
        node.role = Role::Registered;
        node.addr = Addr::new(3, 5);
        node.ch_addr = Addr::new(3, 254);
        node.parent_gui = Some(NodeId(2));
        node.hop_count = 2;
        node.neighbors_table.insert(
            NodeId(2),
            crate::types::NeighborEntry {
                source: Addr::new(3, 254),
                gui: NodeId(2),
                role: Role::ClusterHead,
                addr: Addr::new(3, 254),
                ch_addr: Addr::new(3, 254),
                hop_count: 1,
                arrival_time: 0.0,
                distance: 10.0,
                neighbor_hop_count: 1,
                next_hop: None,
            },
        );
        let (next, path) = route_and_forward_package(&node, Addr::ROOT).unwrap();
        assert_eq!(next, Addr::new(3, 254));
        assert_eq!(path, PathType::Tree);
    }
}
