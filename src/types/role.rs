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

//! The role state machine driving each node's behavior.

use serde::{Deserialize, Serialize};

/// Behavioral identity of a node at a given point in the simulation.
///
/// Transitions are only ever performed through `Node::set_role`, which is the single place that
/// updates role counters, appends to the role-change log, and re-derives TX power.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Has not yet heard from any neighbor.
    Undiscovered,
    /// Knows of neighbors but has not joined a cluster.
    Unregistered,
    /// Joined a cluster as a plain member (leaf).
    Registered,
    /// Owns a subnet and accepts members.
    ClusterHead,
    /// Former cluster head, now only relays traffic; does not accept new members.
    Router,
    /// The single tree sink, immune to energy death.
    Root,
}

impl Role {
    /// Whether a node in this role owns a subnet identity (`ch_addr.node_addr == 254`, with
    /// members sharing its `net_addr`).
    pub fn is_ch_like(self) -> bool {
        matches!(self, Role::ClusterHead | Role::Root)
    }

    /// Whether a node in this role currently counts as "joined" the tree for convergence
    /// purposes (Registered, ClusterHead, Router or Root).
    pub fn is_joined(self) -> bool {
        !matches!(self, Role::Undiscovered | Role::Unregistered)
    }

    /// Whether a node in this role is an orphan (alive, but not part of the tree).
    pub fn is_orphan(self) -> bool {
        !self.is_joined()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Undiscovered => "Undiscovered",
            Role::Unregistered => "Unregistered",
            Role::Registered => "Registered",
            Role::ClusterHead => "ClusterHead",
            Role::Router => "Router",
            Role::Root => "Root",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joined_classification() {
        assert!(!Role::Undiscovered.is_joined());
        assert!(!Role::Unregistered.is_joined());
        assert!(Role::Registered.is_joined());
        assert!(Role::ClusterHead.is_joined());
        assert!(Role::Router.is_joined());
        assert!(Role::Root.is_joined());
    }

    #[test]
    fn ch_like_classification() {
        assert!(Role::ClusterHead.is_ch_like());
        assert!(Role::Root.is_ch_like());
        assert!(!Role::Router.is_ch_like());
        assert!(!Role::Registered.is_ch_like());
    }
}
