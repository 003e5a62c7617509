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

//! Packet envelope and neighbor-table entries exchanged between nodes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::addr::{Addr, NodeId};
use super::role::Role;

/// Sentinel `hop_count` meaning "no known path to the root".
pub const HOP_COUNT_UNREACHABLE: u32 = 99_999;

/// One entry of a node's `neighbors_table` (also used verbatim inside `candidate_parents_table`
/// snapshots and `TABLE_SHARE` payloads).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborEntry {
    /// Address the neighbor should be addressed at (its `ch_addr` if CH/Root, else its `addr`).
    pub source: Addr,
    /// Stable id of the neighbor.
    pub gui: NodeId,
    /// Role the neighbor last advertised.
    pub role: Role,
    /// The neighbor's own address.
    pub addr: Addr,
    /// The neighbor's cluster identity.
    pub ch_addr: Addr,
    /// The neighbor's hop count to the root at the time of the report.
    pub hop_count: u32,
    /// Simulated time this entry was last (re)learned.
    pub arrival_time: f64,
    /// Euclidean distance between this node and the neighbor.
    pub distance: f64,
    /// Number of logical hops by which this entry was learned: 1 for directly heard neighbors,
    /// incremented by one for every `TABLE_SHARE` relay (capped at `MESH_HOP_N + 1`).
    pub neighbor_hop_count: u32,
    /// For mesh-learned entries (`neighbor_hop_count > 1`), the address of the relay that
    /// reported it.
    pub next_hop: Option<Addr>,
}

/// The 12 message kinds of the data collection tree protocol, carrying only the fields each one
/// needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PacketKind {
    /// Broadcast by a newly-woken node looking for neighbors.
    Probe,
    /// Reply to a `Probe` (or periodic refresh), advertising the sender's tree position.
    HeartBeat {
        /// `ch_addr` if the sender is CH/Root, else its own `addr`.
        source: Addr,
        /// Sender's stable id.
        gui: NodeId,
        /// Sender's current role.
        role: Role,
        /// Sender's address.
        addr: Addr,
        /// Sender's cluster identity.
        ch_addr: Addr,
        /// Sender's hop count to the root.
        hop_count: u32,
    },
    /// Sent by an Unregistered node to a chosen candidate parent.
    JoinRequest {
        /// The joiner's stable id.
        gui: NodeId,
    },
    /// Sent by a CH/Root/Router in response to a `JoinRequest`, granting an address.
    JoinReply {
        /// Which joiner this reply is for.
        dest_gui: NodeId,
        /// Newly allocated address.
        addr: Addr,
        /// Root address (propagated so the joiner knows the tree sink).
        root_addr: Addr,
        /// TX power the joiner should adopt.
        tx_power: u8,
        /// Hop count the joiner will have (`sender.hop_count + 1`).
        hop_count: u32,
    },
    /// Sent by a newly-Registered node back to its new parent, acknowledging the join.
    JoinAck,
    /// Sent up the tree by a Registered node that received a `JoinRequest` it cannot serve.
    NetworkRequest,
    /// Sent by the Root in response to `NetworkRequest`, granting a `net_addr`.
    NetworkReply {
        /// Newly allocated cluster identity, `Addr(net_addr, 254)`.
        ch_addr: Addr,
    },
    /// Sent upstream by a freshly-promoted CH so ancestors learn its subnet.
    NetworkUpdate {
        /// The `net_addr` of the new subnet.
        net_addr: u8,
    },
    /// Periodic exchange of a node's 1-hop-and-closer neighbor knowledge.
    TableShare {
        /// Subset of the sender's `neighbors_table` with `neighbor_hop_count <= MESH_HOP_N`.
        neighbors: HashMap<NodeId, NeighborEntry>,
    },
    /// Sent by a CH to its farthest member, offering to hand off cluster ownership.
    ChNomination {
        /// The address pool the nominee should adopt verbatim.
        avail_dict: HashMap<u8, Option<NodeId>>,
    },
    /// Sent by the nominee back to the old CH, accepting the hand-off.
    ChNominationAck,
    /// Application traffic destined for the root.
    SensorData {
        /// Simulated sensor reading.
        sensor_value: f64,
    },
}

impl PacketKind {
    /// Short name used in CSV reports and log lines.
    pub fn name(&self) -> &'static str {
        match self {
            PacketKind::Probe => "PROBE",
            PacketKind::HeartBeat { .. } => "HEART_BEAT",
            PacketKind::JoinRequest { .. } => "JOIN_REQUEST",
            PacketKind::JoinReply { .. } => "JOIN_REPLY",
            PacketKind::JoinAck => "JOIN_ACK",
            PacketKind::NetworkRequest => "NETWORK_REQUEST",
            PacketKind::NetworkReply { .. } => "NETWORK_REPLY",
            PacketKind::NetworkUpdate { .. } => "NETWORK_UPDATE",
            PacketKind::TableShare { .. } => "TABLE_SHARE",
            PacketKind::ChNomination { .. } => "CH_NOMINATION",
            PacketKind::ChNominationAck => "CH_NOMINATION_ACK",
            PacketKind::SensorData { .. } => "SENSOR_DATA",
        }
    }

    /// Whether this message type is always broadcast rather than unicast. A `TableShare` is
    /// broadcast too: "every 1-hop neighbor" is exactly everyone within current `tx_range`.
    pub fn is_broadcast_kind(&self) -> bool {
        matches!(
            self,
            PacketKind::Probe
                | PacketKind::HeartBeat { .. }
                | PacketKind::JoinReply { .. }
                | PacketKind::TableShare { .. }
        )
    }
}

/// How a packet's next hop was determined, used for `packet_routes.csv`'s `routing_direction`
/// column and for the routing-rule tests in ยง8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathType {
    /// Delivered straight to a 1-hop neighbor matching the destination.
    Direct,
    /// Relayed via a `next_hop` learned through `TABLE_SHARE`.
    Mesh,
    /// Forwarded up or down the cluster tree.
    Tree,
    /// No rule matched; the packet was dropped.
    Unknown,
}

impl std::fmt::Display for PathType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PathType::Direct => "DIRECT",
            PathType::Mesh => "MESH",
            PathType::Tree => "TREE",
            PathType::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// A packet in flight: a `PacketKind` payload plus the envelope fields every message carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    /// Monotonically increasing id, unique per packet, used to correlate `packet_log.csv` rows.
    pub pkt_id: u64,
    /// Message payload.
    pub kind: PacketKind,
    /// Final destination address (may be `Addr::BROADCAST`).
    pub dest: Addr,
    /// Address of the immediate sender (not necessarily the origin, once relayed).
    pub source: Addr,
    /// Stable id of the immediate sender.
    pub source_gui: NodeId,
    /// Simulated time the packet was created.
    pub creation_time: f64,
    /// Hop path accumulated so far, used for `packet_log.csv`'s `path` column.
    pub path: Vec<NodeId>,
}

impl Packet {
    /// Build a new packet addressed to `dest`, stamping the envelope fields.
    pub fn new(pkt_id: u64, kind: PacketKind, dest: Addr, source: Addr, source_gui: NodeId, now: f64) -> Self {
        Self { pkt_id, kind, dest, source, source_gui, creation_time: now, path: vec![source_gui] }
    }

    /// Human-readable message type name.
    pub fn type_name(&self) -> &'static str {
        self.kind.name()
    }

    /// Build the [`PacketOrigin`] a relaying node should attach when forwarding this packet
    /// onward, so `Network` keeps the same `pkt_id` across every hop.
    pub fn relay_origin(&self, relayed_by: NodeId) -> PacketOrigin {
        let mut path = self.path.clone();
        path.push(relayed_by);
        PacketOrigin { pkt_id: self.pkt_id, creation_time: self.creation_time, path }
    }
}

/// Identity fields of a packet that must survive a relay hop unchanged, so `packet_log.csv` can
/// correlate every hop of a multi-hop delivery back to the same `pkt_id` (ยง6). A freshly
/// originated packet (not a relay of one just received) carries `None` and `Network` mints a new
/// `pkt_id`/`creation_time`/single-entry `path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketOrigin {
    /// The id of the packet being relayed.
    pub pkt_id: u64,
    /// The time the original packet was created, not the time of this hop.
    pub creation_time: f64,
    /// Hop path accumulated so far, including the relaying node's own id.
    pub path: Vec<NodeId>,
}
