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

//! # The per-node state machine
//!
//! [`Node`] holds everything ยง3 of the design notes assigns to a single sensor: role, addresses,
//! tables, energy, and CH hand-off bookkeeping. Every role transition goes through [`Node::set_role`],
//! which is the single writer of the role-change log and the TX-power re-derivation (ยง4.1).
//!
//! A `Node` never touches the event queue, the radio medium, or any other node directly - doing so
//! would require a mutable borrow of state `Network` also needs. Instead every handler returns a
//! `Vec<Effect>` describing what should happen (send a packet, arm a timer, ...); `Network` is the
//! only thing that knows how to discharge an `Effect` against the rest of the simulation.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::config::{SimConfig, JR_THRESHOLD, NUM_OF_CHILDREN, ROOT_ID, TH_PROBE};
use crate::energy;
use crate::event::TimerName;
use crate::routing::{self, route_and_forward_package};
use crate::types::{
    Addr, NeighborEntry, NodeId, PacketKind, PacketOrigin, PathType, Position, Role,
    HOP_COUNT_UNREACHABLE,
};

/// A side effect produced by a `Node` handler, to be discharged by `Network`.
#[derive(Debug, Clone)]
pub enum Effect {
    /// Transmit `kind`. `dest` is the packet's persistent, final logical destination (what
    /// survives across relay hops, e.g. `Addr::ROOT`); `next_hop` is the physical radio target for
    /// this specific transmission (`Addr::BROADCAST` for flooded kinds, otherwise the address
    /// `Network` should deliver to - which for single-hop kinds is simply `dest` itself).
    Send {
        /// Final logical destination, carried in the transmitted packet's `dest` field.
        dest: Addr,
        /// Physical next hop for this transmission.
        next_hop: Addr,
        /// The message to send.
        kind: PacketKind,
        /// How `next_hop` was chosen, used for `packet_routes.csv`.
        path_type: PathType,
        /// `Some` when this is a relay of a packet already in flight, so `Network` preserves its
        /// `pkt_id`/`creation_time`/`path` instead of minting a new one (`packet_log.csv`).
        carry: Option<PacketOrigin>,
    },
    /// Arm (or re-arm) a named timer.
    SetTimer {
        /// Which timer.
        name: TimerName,
        /// Delay, in seconds, from now.
        delay: f64,
    },
    /// Cancel a single named timer.
    KillTimer(TimerName),
    /// Cancel every timer belonging to this node.
    KillAllTimers,
    /// The role changed; `Network` logs the row and recolors the scene.
    RoleChanged {
        /// Role before the transition.
        old: Role,
        /// Role after the transition.
        new: Role,
    },
    /// First registration completed; `delta` is `registered_time - start_time` for
    /// `registration_log.csv` and the simulator's `join_times` list.
    FirstRegistered {
        /// Seconds between wake-up and registration.
        delta: f64,
    },
    /// `tx_power`/`tx_range` changed and the scene's range circle should be redrawn.
    TxPowerChanged {
        /// The newly adopted level.
        level: u8,
    },
    /// Energy depleted below `MIN_ENERGY_J`; `Network` must run `_reorganize_network_after_death`
    /// on this node's children and stop scheduling it further.
    Died,
}

/// Per-simulated-sensor state (ยง3).
#[derive(Debug, Clone)]
pub struct Node {
    /// Stable id, used for visualization and as the key into every table.
    pub id: NodeId,
    /// Fixed (x, y) position.
    pub pos: Position,
    /// Current behavioral identity.
    pub role: Role,
    /// This node's own address (meaningless until `role.is_joined()`).
    pub addr: Addr,
    /// Cluster identity: own `Addr` if CH/Root, else the parent CH's `Addr`.
    pub ch_addr: Addr,
    /// Id of the neighbor whose `JOIN_REPLY` was accepted.
    pub parent_gui: Option<NodeId>,
    /// Root's address, as propagated down the tree.
    pub root_addr: Addr,
    /// Distance, in tree hops, to the root. `HOP_COUNT_UNREACHABLE` while disconnected.
    pub hop_count: u32,
    /// Current TX power level index.
    pub tx_power: u8,
    /// TX range, in meters, derived from `tx_power`.
    pub tx_range: f64,
    /// TX current, in mA, derived from `tx_power`.
    pub tx_current_ma: f64,
    /// Remaining energy reserve, in joules.
    pub power: f64,
    /// Sticky death flag.
    pub failed: bool,

    /// `neighbor_id -> NeighborEntry`, covering every directly- or mesh-learned neighbor.
    pub neighbors_table: HashMap<NodeId, NeighborEntry>,
    /// Candidate parents considered by `select_and_join`; most recent report per `gui` wins.
    pub candidate_parents_table: HashMap<NodeId, NeighborEntry>,
    /// `child_gui -> net_addrs reachable downstream through that child`.
    pub child_networks_table: HashMap<NodeId, Vec<u8>>,
    /// Addresses that have ACKed joining this CH/Root.
    pub members_table: HashSet<Addr>,
    /// `node_addr in [1, NUM_OF_CHILDREN] -> owning child gui`, this cluster's address pool.
    pub node_available_dict: HashMap<u8, Option<NodeId>>,
    /// Root only: `net_addr in [1, NUM_OF_CHILDREN] -> owning CH source address`.
    pub net_id_available_dict: HashMap<u8, Option<Addr>>,

    /// `candidate_gui -> JOIN_REQUEST attempts`, capped at `JR_THRESHOLD`.
    pub join_req_attempts: HashMap<NodeId, u32>,
    /// Joiners seen while this node was Registered and could not yet serve them.
    pub received_jr_guis: Vec<NodeId>,
    /// The joiner whose request triggered this CH's pending `NETWORK_REQUEST`/nomination cycle.
    pub ch_transfer_target: Option<NodeId>,
    /// The member nominated to take over this cluster.
    pub ch_nominee: Option<NodeId>,
    /// Members already rejected as nomination targets (skipped on subsequent nominations).
    pub ch_nomination_blacklist: HashSet<NodeId>,
    /// Whether this CH is waiting for a `CH_NOMINATION_ACK`.
    pub awaiting_ack: bool,
    /// Whether a hand-off is already underway (guards against re-entrant nominations).
    pub transfer_engaged: bool,

    /// Cumulative joules spent transmitting.
    pub tx_energy_consumed: f64,
    /// Cumulative joules spent receiving.
    pub rx_energy_consumed: f64,
    /// Packets transmitted.
    pub tx_packet_count: u64,
    /// Packets received.
    pub rx_packet_count: u64,

    /// Sliding window of `JOIN_REQUEST` arrival times, for `record_join_request_and_maybe_expand`.
    pub join_request_times: VecDeque<f64>,
    /// Farthest pending joiner distance observed since the last TX-power assignment.
    pub max_pending_join_distance: f64,

    /// `PROBE` broadcasts sent so far while Undiscovered.
    pub probe_count: u32,
    /// Simulated time this node woke up.
    pub wake_time: f64,
    /// Simulated time this node first registered, if ever.
    pub registered_time: Option<f64>,
}

impl Node {
    /// Create a freshly-woken, `Undiscovered` node at `pos`.
    pub fn new(id: NodeId, pos: Position, cfg: &SimConfig) -> Self {
        let tx_power = cfg.node_default_tx_power;
        Self {
            id,
            pos,
            role: Role::Undiscovered,
            addr: Addr::default(),
            ch_addr: Addr::default(),
            parent_gui: None,
            root_addr: Addr::ROOT,
            hop_count: HOP_COUNT_UNREACHABLE,
            tx_power,
            tx_range: cfg.node_tx_ranges.get(&tx_power).copied().unwrap_or(0.0),
            tx_current_ma: energy::tx_current_for_level(cfg, tx_power),
            power: cfg.initial_energy_j,
            failed: false,
            neighbors_table: HashMap::new(),
            candidate_parents_table: HashMap::new(),
            child_networks_table: HashMap::new(),
            members_table: HashSet::new(),
            node_available_dict: HashMap::new(),
            net_id_available_dict: HashMap::new(),
            join_req_attempts: HashMap::new(),
            received_jr_guis: Vec::new(),
            ch_transfer_target: None,
            ch_nominee: None,
            ch_nomination_blacklist: HashSet::new(),
            awaiting_ack: false,
            transfer_engaged: false,
            tx_energy_consumed: 0.0,
            rx_energy_consumed: 0.0,
            tx_packet_count: 0,
            rx_packet_count: 0,
            join_request_times: VecDeque::new(),
            max_pending_join_distance: 0.0,
            probe_count: 0,
            wake_time: 0.0,
            registered_time: None,
        }
    }

    /// Whether this node is `id == ROOT_ID`, the only node permitted to self-elect as Root
    /// (ยง9 resolves the otherwise-ambiguous `is_root_eligible` guard this way).
    pub fn is_root_eligible(&self) -> bool {
        self.id.0 == ROOT_ID
    }

    /// Address this node should be addressed at by others (`ch_addr` once it owns a subnet).
    pub fn advertised_source(&self) -> Addr {
        if self.role.is_ch_like() {
            self.ch_addr
        } else {
            self.addr
        }
    }

    /// This node's own `NeighborEntry`, as advertised in a `HEART_BEAT`/`TABLE_SHARE`.
    fn self_entry(&self, now: f64) -> NeighborEntry {
        NeighborEntry {
            source: self.advertised_source(),
            gui: self.id,
            role: self.role,
            addr: self.addr,
            ch_addr: self.ch_addr,
            hop_count: self.hop_count,
            arrival_time: now,
            distance: 0.0,
            neighbor_hop_count: 1,
            next_hop: None,
        }
    }

    /// The parent's `NeighborEntry`, if this node has joined.
    pub fn parent_entry(&self) -> Option<&NeighborEntry> {
        self.parent_gui.and_then(|gui| self.neighbors_table.get(&gui))
    }

    /// Whether any known child's subnet (or, transitively, a grandchild's via `TABLE_SHARE`
    /// propagation) is `net_addr`; returns the immediate next hop if so (ยง4.5 rule 3).
    pub fn downstream_hop_for(&self, net_addr: u8) -> Option<Addr> {
        self.child_networks_table
            .iter()
            .find(|(_, nets)| nets.contains(&net_addr))
            .and_then(|(gui, _)| self.neighbors_table.get(gui))
            .map(|entry| entry.addr)
    }

    /// The central role-setter (ยง4.1): every transition is routed through here so the
    /// role-change log and TX-power re-derivation stay centralized.
    fn set_role(&mut self, new_role: Role, now: f64, cfg: &SimConfig, effects: &mut Vec<Effect>) {
        if self.role == new_role {
            return;
        }
        let old = self.role;
        self.role = new_role;
        effects.push(Effect::RoleChanged { old, new: new_role });
        if new_role.is_ch_like() || new_role == Role::Router {
            self.assign_tx_power(cfg, None, effects);
        }
        let _ = now;
    }

    /// Reset all local tables and restart discovery (ยง4.1, ยง5: "kill relevant timers").
    pub fn become_unregistered(&mut self, now: f64, cfg: &SimConfig) -> Vec<Effect> {
        let mut effects = Vec::new();
        effects.push(Effect::KillAllTimers);
        self.addr = Addr::default();
        self.ch_addr = Addr::default();
        self.parent_gui = None;
        self.hop_count = HOP_COUNT_UNREACHABLE;
        self.neighbors_table.clear();
        self.candidate_parents_table.clear();
        self.child_networks_table.clear();
        self.members_table.clear();
        self.node_available_dict.clear();
        self.net_id_available_dict.clear();
        self.join_req_attempts.clear();
        self.received_jr_guis.clear();
        self.ch_transfer_target = None;
        self.ch_nominee = None;
        self.awaiting_ack = false;
        self.transfer_engaged = false;
        self.set_role(Role::Unregistered, now, cfg, &mut effects);
        effects.push(Effect::Send { dest: Addr::BROADCAST, next_hop: Addr::BROADCAST, kind: PacketKind::Probe, path_type: PathType::Direct, carry: None });
        effects.push(Effect::SetTimer { name: TimerName::JoinRequest, delay: cfg.join_request_interval });
        effects
    }

    /// A CH hands cluster ownership to its former farthest member and steps down to Router
    /// (ยง4.1, ยง4.3).
    fn become_router(&mut self, now: f64, cfg: &SimConfig, effects: &mut Vec<Effect>) {
        self.node_available_dict.clear();
        self.members_table.clear();
        self.child_networks_table.clear();
        self.ch_transfer_target = None;
        self.ch_nominee = None;
        self.awaiting_ack = false;
        self.transfer_engaged = false;
        self.set_role(Role::Router, now, cfg, effects);
    }

    /// A CH/Router with no remaining dependents steps back down to a plain leaf (ยง4.8).
    fn demote_to_registered(&mut self, now: f64, cfg: &SimConfig, effects: &mut Vec<Effect>) {
        self.ch_addr = Addr::default();
        self.node_available_dict.clear();
        self.members_table.clear();
        self.child_networks_table.clear();
        self.tx_power = cfg.node_default_tx_power;
        self.tx_range = cfg.node_tx_ranges.get(&self.tx_power).copied().unwrap_or(0.0);
        self.tx_current_ma = energy::tx_current_for_level(cfg, self.tx_power);
        self.set_role(Role::Registered, now, cfg, effects);
        effects.push(Effect::Send { dest: Addr::BROADCAST, next_hop: Addr::BROADCAST, kind: self.heart_beat(), path_type: PathType::Direct, carry: None });
        effects.push(Effect::SetTimer { name: TimerName::HeartBeat, delay: cfg.heart_beat_interval });
    }

    /// First successful registration: becomes `Registered` and records the join-time delta.
    fn register(&mut self, now: f64, cfg: &SimConfig, effects: &mut Vec<Effect>) {
        self.set_role(Role::Registered, now, cfg, effects);
        if self.registered_time.is_none() {
            self.registered_time = Some(now);
            effects.push(Effect::FirstRegistered { delta: now - self.wake_time });
        }
    }

    fn heart_beat(&self) -> PacketKind {
        PacketKind::HeartBeat {
            source: self.advertised_source(),
            gui: self.id,
            role: self.role,
            addr: self.addr,
            ch_addr: self.ch_addr,
            hop_count: self.hop_count,
        }
    }

    /// Farthest distance this cluster's TX range must reach: the farthest pending joiner, the
    /// parent, or any same-net neighbor/member (ยง4.7).
    fn max_cluster_distance(&self) -> f64 {
        let parent_dist = self.parent_entry().map(|e| e.distance).unwrap_or(0.0);
        let same_net = self
            .neighbors_table
            .values()
            .filter(|e| e.addr.net_addr == self.ch_addr.net_addr)
            .map(|e| e.distance)
            .fold(0.0_f64, f64::max);
        self.max_pending_join_distance.max(parent_dist).max(same_net)
    }

    /// `assign_tx_power` (ยง4.7): picks an explicit level, or derives one from role and cluster
    /// geometry. Only pushes `Effect::TxPowerChanged` when the level actually changes.
    fn assign_tx_power(&mut self, cfg: &SimConfig, explicit: Option<u8>, effects: &mut Vec<Effect>) {
        let new_level = if let Some(level) = explicit {
            level
        } else if self.role == Role::Router {
            cfg.max_tx_power_level()
        } else if self.role.is_ch_like() {
            let required = self.max_cluster_distance();
            if required == 0.0 {
                cfg.node_default_tx_power
            } else {
                let mut levels: Vec<_> = cfg.node_tx_ranges.iter().collect();
                levels.sort_by_key(|(level, _)| **level);
                levels
                    .iter()
                    .find(|(_, range)| **range >= required)
                    .map(|(level, _)| **level)
                    .unwrap_or_else(|| cfg.max_tx_power_level())
            }
        } else {
            cfg.node_default_tx_power
        };
        if new_level != self.tx_power || explicit.is_some() {
            self.tx_power = new_level;
            self.tx_range = cfg.node_tx_ranges.get(&new_level).copied().unwrap_or(0.0);
            self.tx_current_ma = energy::tx_current_for_level(cfg, new_level);
            effects.push(Effect::TxPowerChanged { level: new_level });
        }
    }

    /// Move `tx_power` up by one level if not already at the maximum (`record_join_request_and_
    /// maybe_expand`, ยง4.2).
    fn bump_tx_power(&mut self, cfg: &SimConfig, effects: &mut Vec<Effect>) {
        let max = cfg.max_tx_power_level();
        if self.tx_power < max {
            let next = self.tx_power + 1;
            self.assign_tx_power(cfg, Some(next), effects);
        }
    }

    /// Charge this node for transmitting one packet, returning `true` if it died as a result.
    fn apply_tx_energy(&mut self, cfg: &SimConfig, effects: &mut Vec<Effect>) -> bool {
        let e = energy::tx_energy_joules(cfg, self.tx_current_ma);
        self.power -= e;
        self.tx_energy_consumed += e;
        self.tx_packet_count += 1;
        self.check_death(cfg, effects)
    }

    /// Charge TX energy for a packet about to be physically transmitted. `Network` calls this
    /// right before putting an `Effect::Send` on the radio medium, since only it knows whether the
    /// transmission actually happens (ยง5: account energy, check death, only then call the radio -
    /// a node that dies mid-send must not emit the packet).
    pub fn charge_tx_energy(&mut self, cfg: &SimConfig, effects: &mut Vec<Effect>) -> bool {
        self.apply_tx_energy(cfg, effects)
    }

    /// Charge this node for receiving one packet, returning `true` if it died as a result.
    fn apply_rx_energy(&mut self, cfg: &SimConfig, effects: &mut Vec<Effect>) -> bool {
        let e = energy::rx_energy_joules(cfg);
        self.power -= e;
        self.rx_energy_consumed += e;
        self.rx_packet_count += 1;
        self.check_death(cfg, effects)
    }

    fn check_death(&mut self, cfg: &SimConfig, effects: &mut Vec<Effect>) -> bool {
        if self.power > cfg.min_energy_j {
            return false;
        }
        if self.id.0 == ROOT_ID {
            self.power = cfg.min_energy_j;
            return false;
        }
        if self.failed {
            return false;
        }
        self.failed = true;
        effects.push(Effect::KillAllTimers);
        effects.push(Effect::Died);
        true
    }

    /// Allocate the smallest free `node_addr`, reusing an existing assignment to the same `gui`
    /// if present (ยง4.2).
    fn allocate_node_addr(&mut self, gui: NodeId) -> Option<u8> {
        if let Some((k, _)) = self.node_available_dict.iter().find(|(_, owner)| **owner == Some(gui)) {
            return Some(*k);
        }
        for k in 1..=NUM_OF_CHILDREN {
            if self.node_available_dict.get(&k).copied().flatten().is_none() {
                self.node_available_dict.insert(k, Some(gui));
                return Some(k);
            }
        }
        None
    }

    /// Allocate the smallest free `net_addr` from the Root's global pool.
    fn allocate_net_addr(&mut self, owner: Addr) -> Option<u8> {
        for k in 1..=NUM_OF_CHILDREN {
            if self.net_id_available_dict.get(&k).copied().flatten().is_none() {
                self.net_id_available_dict.insert(k, Some(owner));
                return Some(k);
            }
        }
        None
    }

    /// Whether `candidate` is a viable future parent: not already a downstream dependent, and
    /// legal under the parent-role rules (I5, ยง4.2's `update_neighbor`).
    fn is_eligible_parent_candidate(&self, candidate: &NeighborEntry) -> bool {
        if !candidate.role.is_joined() {
            return false;
        }
        if self.child_networks_table.contains_key(&candidate.gui) {
            return false;
        }
        if self.members_table.contains(&candidate.addr) {
            return false;
        }
        routing::is_legal_parent_role(self.role, candidate.role)
    }

    /// `update_neighbor(pkt)` (ยง4.2): stamp arrival time/distance, enforce I5, and maintain the
    /// candidate-parent table.
    fn update_neighbor(
        &mut self,
        now: f64,
        cfg: &SimConfig,
        distance: f64,
        mut entry: NeighborEntry,
        effects: &mut Vec<Effect>,
    ) {
        entry.arrival_time = now;
        entry.distance = distance;
        entry.neighbor_hop_count = entry.neighbor_hop_count.max(1);
        let gui = entry.gui;

        if self.parent_gui == Some(gui) && entry.role == Role::Router {
            self.neighbors_table.insert(gui, entry);
            effects.extend(self.become_unregistered(now, cfg));
            return;
        }

        if self.is_eligible_parent_candidate(&entry) {
            self.candidate_parents_table.insert(gui, entry.clone());
        } else {
            self.candidate_parents_table.remove(&gui);
        }
        self.neighbors_table.insert(gui, entry);
    }

    /// `select_and_join()` (ยง4.2): minimum `hop_count`, ties by smallest `gui`, attempts under
    /// threshold, role-pair legal.
    fn select_candidate(&self) -> Option<NeighborEntry> {
        self.candidate_parents_table
            .values()
            .filter(|c| self.join_req_attempts.get(&c.gui).copied().unwrap_or(0) < JR_THRESHOLD)
            .filter(|c| routing::is_legal_parent_role(self.role, c.role))
            .min_by(|a, b| a.hop_count.cmp(&b.hop_count).then(a.gui.cmp(&b.gui)))
            .cloned()
    }

    // ---- Timer handlers -------------------------------------------------------------------

    /// `TIMER_PROBE` fired.
    pub fn on_probe_timer(&mut self, now: f64, cfg: &SimConfig) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.probe_count += 1;
        if self.probe_count >= TH_PROBE && self.is_root_eligible() && self.role != Role::Root {
            self.bootstrap_as_root(now, cfg, &mut effects);
            return effects;
        }
        effects.push(Effect::Send { dest: Addr::BROADCAST, next_hop: Addr::BROADCAST, kind: PacketKind::Probe, path_type: PathType::Direct, carry: None });
        effects.push(Effect::SetTimer { name: TimerName::Probe, delay: 1.0 });
        effects
    }

    fn bootstrap_as_root(&mut self, now: f64, cfg: &SimConfig, effects: &mut Vec<Effect>) {
        self.addr = Addr::ROOT;
        self.ch_addr = Addr::ROOT;
        self.root_addr = Addr::ROOT;
        self.hop_count = 0;
        self.node_available_dict = (1..=NUM_OF_CHILDREN).map(|k| (k, None)).collect();
        self.net_id_available_dict = (1..=NUM_OF_CHILDREN).map(|k| (k, None)).collect();
        effects.push(Effect::KillTimer(TimerName::Probe));
        self.set_role(Role::Root, now, cfg, effects);
        self.registered_time = Some(now);
        effects.push(Effect::Send { dest: Addr::BROADCAST, next_hop: Addr::BROADCAST, kind: self.heart_beat(), path_type: PathType::Direct, carry: None });
        effects.push(Effect::SetTimer { name: TimerName::HeartBeat, delay: cfg.heart_beat_interval });
        effects.push(Effect::SetTimer { name: TimerName::TableShare, delay: cfg.table_share_interval });
        if cfg.enable_data_packets {
            effects.push(Effect::SetTimer { name: TimerName::Sensor, delay: cfg.data_interval });
        }
        effects.push(Effect::SetTimer { name: TimerName::RoleOptimize, delay: cfg.role_optimize_time });
    }

    /// `TIMER_JOIN_REQUEST` fired (ยง4.2).
    pub fn on_join_request_timer(&mut self, now: f64, cfg: &SimConfig) -> Vec<Effect> {
        let mut effects = Vec::new();
        match self.select_candidate() {
            None => {
                effects.extend(self.become_unregistered(now, cfg));
            }
            Some(candidate) => {
                *self.join_req_attempts.entry(candidate.gui).or_insert(0) += 1;
                effects.push(Effect::Send {
                    dest: candidate.source,
                    next_hop: candidate.source,
                    kind: PacketKind::JoinRequest { gui: self.id },
                    path_type: PathType::Direct,
                    carry: None,
                });
                effects.push(Effect::SetTimer { name: TimerName::JoinRequest, delay: cfg.join_request_interval });
            }
        }
        effects
    }

    /// `TIMER_HEART_BEAT` fired: re-derive TX power, then broadcast.
    pub fn on_heart_beat_timer(&mut self, cfg: &SimConfig) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.role.is_ch_like() {
            self.assign_tx_power(cfg, None, &mut effects);
        }
        effects.push(Effect::Send { dest: Addr::BROADCAST, next_hop: Addr::BROADCAST, kind: self.heart_beat(), path_type: PathType::Direct, carry: None });
        effects.push(Effect::SetTimer { name: TimerName::HeartBeat, delay: cfg.heart_beat_interval });
        effects
    }

    /// `TIMER_TABLE_SHARE` fired (ยง4.4).
    pub fn on_table_share_timer(&mut self, cfg: &SimConfig) -> Vec<Effect> {
        let subset: HashMap<NodeId, NeighborEntry> = self
            .neighbors_table
            .iter()
            .filter(|(_, e)| e.neighbor_hop_count <= cfg.neighbor_table_max_hops)
            .map(|(k, v)| (*k, v.clone()))
            .collect();
        vec![
            Effect::Send {
                dest: Addr::BROADCAST,
                next_hop: Addr::BROADCAST,
                kind: PacketKind::TableShare { neighbors: subset },
                path_type: PathType::Direct,
                carry: None,
            },
            Effect::SetTimer { name: TimerName::TableShare, delay: cfg.table_share_interval },
        ]
    }

    /// `TIMER_SENSOR` fired (ยง4.10): emit one `SENSOR_DATA` reading toward the root.
    pub fn on_sensor_timer(&mut self, cfg: &SimConfig, sensor_value: f64) -> Vec<Effect> {
        let mut effects = Vec::new();
        effects.extend(self.route_or_drop(Addr::ROOT, PacketKind::SensorData { sensor_value }, None));
        effects.push(Effect::SetTimer { name: TimerName::Sensor, delay: cfg.data_interval });
        effects
    }

    /// One-shot `TIMER_ROLE_OPTIMIZE` (ยง4.8): demote if this CH/Router has no dependents and a
    /// connected parent; otherwise nothing further is scheduled (it only ever fires once).
    pub fn on_role_optimize_timer(&mut self, now: f64, cfg: &SimConfig) -> Vec<Effect> {
        let mut effects = Vec::new();
        let is_ch_or_router = matches!(self.role, Role::ClusterHead | Role::Router);
        let no_dependents = self.node_available_dict.values().all(|v| v.is_none())
            && self.members_table.is_empty()
            && self.child_networks_table.is_empty();
        let parent_ok = self.parent_entry().map(|p| p.role.is_ch_like()).unwrap_or(false)
            || self.hop_count != HOP_COUNT_UNREACHABLE;
        if is_ch_or_router && no_dependents && parent_ok {
            self.demote_to_registered(now, cfg, &mut effects);
        }
        effects
    }

    // ---- Packet dispatch -------------------------------------------------------------------

    /// Route `kind` toward `dest`, or drop it if no rule applies (ยง4.5, ยง7 "missing neighbor
    /// info"). `carry` is `Some` when this is a relay of a packet already in flight.
    fn route_or_drop(&self, dest: Addr, kind: PacketKind, carry: Option<PacketOrigin>) -> Vec<Effect> {
        match route_and_forward_package(self, dest) {
            Some((next_hop, path_type)) => vec![Effect::Send { dest, next_hop, kind, path_type, carry }],
            None => Vec::new(),
        }
    }

    /// Handle one received packet. `link_dest` is the address `Network` resolved this specific
    /// delivery against (`Addr::BROADCAST` for flooded kinds, this node's own address for a
    /// resolved unicast hop); `distance` is the Euclidean distance to the immediate sender.
    pub fn handle_packet(
        &mut self,
        now: f64,
        cfg: &SimConfig,
        link_dest: Addr,
        distance: f64,
        packet: crate::types::Packet,
    ) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.failed {
            return effects;
        }
        if self.apply_rx_energy(cfg, &mut effects) {
            return effects;
        }
        let _ = link_dest;

        match packet.kind.clone() {
            PacketKind::Probe => self.on_probe(&mut effects),
            PacketKind::HeartBeat { source, gui, role, addr, ch_addr, hop_count } => {
                let entry = NeighborEntry {
                    source,
                    gui,
                    role,
                    addr,
                    ch_addr,
                    hop_count,
                    arrival_time: now,
                    distance,
                    neighbor_hop_count: 1,
                    next_hop: None,
                };
                let was_undiscovered = self.role == Role::Undiscovered;
                if was_undiscovered {
                    effects.push(Effect::KillTimer(TimerName::Probe));
                }
                self.update_neighbor(now, cfg, distance, entry, &mut effects);
                if was_undiscovered && self.role == Role::Undiscovered {
                    self.set_role(Role::Unregistered, now, cfg, &mut effects);
                    effects.push(Effect::SetTimer { name: TimerName::JoinRequest, delay: cfg.join_request_interval });
                }
            }
            PacketKind::JoinRequest { gui } => {
                self.on_join_request(now, cfg, gui, packet.source, distance, &mut effects);
            }
            PacketKind::JoinReply { dest_gui, addr, root_addr, tx_power, hop_count } => {
                if dest_gui == self.id {
                    self.on_join_reply(now, cfg, packet.source_gui, addr, root_addr, tx_power, hop_count, &mut effects);
                }
            }
            PacketKind::JoinAck => {
                self.on_join_ack(now, cfg, packet.source_gui, packet.source, &mut effects);
            }
            PacketKind::NetworkRequest => {
                let origin = packet.relay_origin(self.id);
                self.on_network_request(now, cfg, packet.dest, packet.source, packet.source_gui, distance, origin, &mut effects);
            }
            PacketKind::NetworkReply { ch_addr } => {
                if packet.dest == self.addr {
                    self.on_network_reply(now, cfg, ch_addr, &mut effects);
                } else {
                    let origin = packet.relay_origin(self.id);
                    effects.extend(self.route_or_drop(packet.dest, packet.kind, Some(origin)));
                }
            }
            PacketKind::NetworkUpdate { net_addr } => {
                let origin = packet.relay_origin(self.id);
                self.on_network_update(now, cfg, packet.source_gui, net_addr, packet.dest, origin, &mut effects);
            }
            PacketKind::TableShare { neighbors } => {
                self.on_table_share(now, cfg, neighbors, &mut effects);
            }
            PacketKind::ChNomination { avail_dict } => {
                self.on_ch_nomination(now, cfg, packet.source_gui, packet.source, avail_dict, &mut effects);
            }
            PacketKind::ChNominationAck => {
                self.on_ch_nomination_ack(now, cfg, packet.source_gui, &mut effects);
            }
            PacketKind::SensorData { .. } => {
                if packet.dest == self.addr || (self.role == Role::Root && packet.dest == Addr::ROOT) {
                    // Delivered: a real deployment would hand this to an application sink.
                } else {
                    let origin = packet.relay_origin(self.id);
                    effects.extend(self.route_or_drop(packet.dest, packet.kind, Some(origin)));
                }
            }
        }
        effects
    }

    fn on_probe(&mut self, effects: &mut Vec<Effect>) {
        if self.role.is_joined() {
            effects.push(Effect::Send { dest: Addr::BROADCAST, next_hop: Addr::BROADCAST, kind: self.heart_beat(), path_type: PathType::Direct, carry: None });
        }
    }

    /// CH/Root/Router receiving `JOIN_REQUEST{gui}` (ยง4.2).
    fn on_join_request(
        &mut self,
        now: f64,
        cfg: &SimConfig,
        gui: NodeId,
        requester_addr: Addr,
        distance: f64,
        effects: &mut Vec<Effect>,
    ) {
        match self.role {
            Role::ClusterHead | Role::Root => {
                self.record_join_request_and_maybe_expand(now, cfg, effects);
                if distance > self.tx_range {
                    self.max_pending_join_distance = self.max_pending_join_distance.max(distance);
                    let required = distance;
                    let mut levels: Vec<_> = cfg.node_tx_ranges.iter().collect();
                    levels.sort_by_key(|(level, _)| **level);
                    let needed = levels
                        .iter()
                        .find(|(_, range)| **range >= required)
                        .map(|(level, _)| **level);
                    if let Some(level) = needed {
                        self.assign_tx_power(cfg, Some(level), effects);
                    }
                }
                match self.allocate_node_addr(gui) {
                    Some(k) => {
                        let addr = Addr::new(self.ch_addr.net_addr, k);
                        effects.push(Effect::Send {
                            dest: Addr::BROADCAST,
                            next_hop: Addr::BROADCAST,
                            kind: PacketKind::JoinReply {
                                dest_gui: gui,
                                addr,
                                root_addr: self.root_addr,
                                tx_power: self.tx_power,
                                hop_count: self.hop_count + 1,
                            },
                            path_type: PathType::Direct,
                            carry: None,
                        });
                    }
                    None => {
                        // Address pool exhausted: silently refuse (ยง7); the joiner retries until
                        // `jr_threshold` and falls back to Unregistered.
                    }
                }
            }
            Role::Registered => {
                if !self.received_jr_guis.contains(&gui) {
                    self.received_jr_guis.push(gui);
                }
                if self.ch_transfer_target.is_none() {
                    self.ch_transfer_target = Some(gui);
                }
                if !self.transfer_engaged {
                    self.transfer_engaged = true;
                    effects.extend(self.route_or_drop(Addr::ROOT, PacketKind::NetworkRequest, None));
                }
            }
            // A Router never becomes a CH and is never a legal parent_gui for a Registered or
            // Unregistered node (I5), so it takes no action on a JOIN_REQUEST it still overhears.
            Role::Router | Role::Undiscovered | Role::Unregistered => {
                let _ = requester_addr;
            }
        }
    }

    /// `record_join_request_and_maybe_expand()` (ยง4.2).
    fn record_join_request_and_maybe_expand(&mut self, now: f64, cfg: &SimConfig, effects: &mut Vec<Effect>) {
        self.join_request_times.push_back(now);
        let window_start = now - cfg.join_req_expand_window;
        while let Some(&front) = self.join_request_times.front() {
            if front < window_start {
                self.join_request_times.pop_front();
            } else {
                break;
            }
        }
        if self.join_request_times.len() >= cfg.join_req_expand_threshold {
            self.bump_tx_power(cfg, effects);
            self.join_request_times.clear();
        }
    }

    /// Unregistered node receiving `JOIN_REPLY{dest_gui==self.id}` (ยง4.2).
    fn on_join_reply(
        &mut self,
        now: f64,
        cfg: &SimConfig,
        sender_gui: NodeId,
        addr: Addr,
        root_addr: Addr,
        tx_power: u8,
        hop_count: u32,
        effects: &mut Vec<Effect>,
    ) {
        if self.role != Role::Unregistered {
            return;
        }
        let Some(sender) = self.neighbors_table.get(&sender_gui).cloned() else { return };
        if sender.role == Role::Router {
            return;
        }
        self.addr = addr;
        self.parent_gui = Some(sender_gui);
        self.ch_addr = sender.source;
        self.root_addr = root_addr;
        self.hop_count = hop_count;
        self.assign_tx_power(cfg, Some(tx_power), effects);
        effects.push(Effect::KillTimer(TimerName::JoinRequest));
        effects.push(Effect::Send { dest: Addr::BROADCAST, next_hop: Addr::BROADCAST, kind: self.heart_beat(), path_type: PathType::Direct, carry: None });
        effects.push(Effect::SetTimer { name: TimerName::HeartBeat, delay: cfg.heart_beat_interval });
        effects.push(Effect::SetTimer { name: TimerName::TableShare, delay: cfg.table_share_interval });
        if cfg.enable_data_packets {
            effects.push(Effect::SetTimer { name: TimerName::Sensor, delay: cfg.data_interval });
        }
        effects.push(Effect::Send { dest: sender.source, next_hop: sender.source, kind: PacketKind::JoinAck, path_type: PathType::Direct, carry: None });
        self.register(now, cfg, effects);
    }

    /// Parent (CH/Root/Router) receiving `JOIN_ACK` from a newly-registered child, or a CH
    /// receiving it from its nominated successor (ยง4.3).
    fn on_join_ack(&mut self, now: f64, cfg: &SimConfig, sender_gui: NodeId, sender_addr: Addr, effects: &mut Vec<Effect>) {
        self.members_table.insert(sender_addr);

        if self.ch_nominee == Some(sender_gui) && self.awaiting_ack {
            self.awaiting_ack = false;
            self.become_router(now, cfg, effects);
            return;
        }

        if self.role == Role::ClusterHead && self.ch_transfer_target.is_some() && !self.awaiting_ack {
            self.maybe_nominate_successor(now, cfg, effects);
        }
    }

    /// CH selects its farthest non-blacklisted member and offers it cluster ownership
    /// (ยง4.3's "CH nomination (load transfer)").
    fn maybe_nominate_successor(&mut self, _now: f64, _cfg: &SimConfig, effects: &mut Vec<Effect>) {
        let nominee = self
            .neighbors_table
            .values()
            .filter(|e| self.members_table.contains(&e.addr))
            .filter(|e| !self.ch_nomination_blacklist.contains(&e.gui))
            .max_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal));
        if let Some(nominee) = nominee.cloned() {
            self.ch_nominee = Some(nominee.gui);
            self.awaiting_ack = true;
            effects.push(Effect::Send {
                dest: nominee.source,
                next_hop: nominee.source,
                kind: PacketKind::ChNomination { avail_dict: self.node_available_dict.clone() },
                path_type: PathType::Direct,
                carry: None,
            });
        }
    }

    /// Root receiving `NETWORK_REQUEST` (routed, so `dest == Addr::ROOT` once it arrives here);
    /// an intermediate Registered/CH/Router just forwards it (ยง4.3).
    fn on_network_request(
        &mut self,
        now: f64,
        cfg: &SimConfig,
        dest: Addr,
        requester_addr: Addr,
        requester_gui: NodeId,
        distance: f64,
        origin: PacketOrigin,
        effects: &mut Vec<Effect>,
    ) {
        if self.role != Role::Root {
            effects.extend(self.route_or_drop(dest, PacketKind::NetworkRequest, Some(origin)));
            return;
        }
        let _ = (now, distance, requester_gui);
        match self.allocate_net_addr(requester_addr) {
            Some(net_addr) => {
                let ch_addr = Addr::new(net_addr, crate::types::CH_NODE_ADDR);
                effects.extend(self.route_or_drop(
                    requester_addr,
                    PacketKind::NetworkReply { ch_addr },
                    None,
                ));
            }
            None => {
                // Net-id pool exhausted (ยง7): the requester stays Registered and will retry on
                // the next JOIN_REQUEST that reaches this point.
            }
        }
    }

    /// Requester receiving `NETWORK_REPLY`: becomes a CH and services pending joiners (ยง4.3).
    fn on_network_reply(&mut self, now: f64, cfg: &SimConfig, ch_addr: Addr, effects: &mut Vec<Effect>) {
        self.ch_addr = ch_addr;
        self.node_available_dict = (1..=NUM_OF_CHILDREN).map(|k| (k, None)).collect();
        self.set_role(Role::ClusterHead, now, cfg, effects);
        effects.extend(self.route_or_drop(Addr::ROOT, PacketKind::NetworkUpdate { net_addr: ch_addr.net_addr }, None));
        effects.push(Effect::Send { dest: Addr::BROADCAST, next_hop: Addr::BROADCAST, kind: self.heart_beat(), path_type: PathType::Direct, carry: None });

        let pending = std::mem::take(&mut self.received_jr_guis);
        for gui in pending {
            if let Some(k) = self.allocate_node_addr(gui) {
                let addr = Addr::new(self.ch_addr.net_addr, k);
                effects.push(Effect::Send {
                    dest: Addr::BROADCAST,
                    next_hop: Addr::BROADCAST,
                    kind: PacketKind::JoinReply {
                        dest_gui: gui,
                        addr,
                        root_addr: self.root_addr,
                        tx_power: self.tx_power,
                        hop_count: self.hop_count + 1,
                    },
                    path_type: PathType::Direct,
                    carry: None,
                });
            }
        }
    }

    /// Every hop along the way to the root records the new subnet, then relays onward unless it
    /// is the root (ยง4.3).
    fn on_network_update(
        &mut self,
        now: f64,
        cfg: &SimConfig,
        child_gui: NodeId,
        net_addr: u8,
        dest: Addr,
        origin: PacketOrigin,
        effects: &mut Vec<Effect>,
    ) {
        let _ = now;
        let nets = self.child_networks_table.entry(child_gui).or_default();
        if !nets.contains(&net_addr) {
            nets.push(net_addr);
        }
        if self.role != Role::Root {
            effects.extend(self.route_or_drop(dest, PacketKind::NetworkUpdate { net_addr }, Some(origin)));
        }
        let _ = cfg;
    }

    /// `TABLE_SHARE` receipt (ยง4.4): integrate unknown entries, bumping `neighbor_hop_count` and
    /// recording the relay as `next_hop`; reject anything that would exceed `MESH_HOP_N + 1`.
    fn on_table_share(
        &mut self,
        now: f64,
        cfg: &SimConfig,
        neighbors: HashMap<NodeId, NeighborEntry>,
        effects: &mut Vec<Effect>,
    ) {
        for (gui, mut entry) in neighbors {
            if gui == self.id {
                continue;
            }
            if self.neighbors_table.contains_key(&gui) {
                continue;
            }
            let relay_next_hop = entry.source;
            entry.neighbor_hop_count += 1;
            if entry.neighbor_hop_count > cfg.neighbor_table_max_hops + 1 {
                // Protocol violation (ยง7): a relay advertised a hop count beyond the cap. Drop
                // rather than corrupt the mesh table.
                continue;
            }
            entry.next_hop = Some(relay_next_hop);
            entry.arrival_time = now;
            if self.is_eligible_parent_candidate(&entry) {
                self.candidate_parents_table.insert(gui, entry.clone());
            }
            self.neighbors_table.insert(gui, entry);
        }
    }

    /// Unregistered node receiving `CH_NOMINATION`: becomes CH immediately, reusing the provided
    /// address pool (ยง4.1, ยง4.3).
    fn on_ch_nomination(
        &mut self,
        now: f64,
        cfg: &SimConfig,
        sender_gui: NodeId,
        sender_addr: Addr,
        avail_dict: HashMap<u8, Option<NodeId>>,
        effects: &mut Vec<Effect>,
    ) {
        if !matches!(self.role, Role::Unregistered | Role::Registered) {
            return;
        }
        self.ch_addr = Addr::new(self.addr.net_addr, crate::types::CH_NODE_ADDR);
        self.node_available_dict = avail_dict;
        self.set_role(Role::ClusterHead, now, cfg, effects);
        effects.push(Effect::Send { dest: sender_addr, next_hop: sender_addr, kind: PacketKind::ChNominationAck, path_type: PathType::Direct, carry: None });
        effects.push(Effect::Send { dest: Addr::BROADCAST, next_hop: Addr::BROADCAST, kind: self.heart_beat(), path_type: PathType::Direct, carry: None });
        let _ = sender_gui;
    }

    /// Old CH receiving `CH_NOMINATION_ACK` from its nominee: steps down to Router (ยง4.3).
    fn on_ch_nomination_ack(&mut self, now: f64, cfg: &SimConfig, sender_gui: NodeId, effects: &mut Vec<Effect>) {
        if self.ch_nominee == Some(sender_gui) && self.awaiting_ack {
            self.awaiting_ack = false;
            self.become_router(now, cfg, effects);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CH_NODE_ADDR;

    fn ch_with_pool(pool: HashMap<u8, Option<NodeId>>) -> Node {
        let cfg = SimConfig::default();
        let mut ch = Node::new(NodeId(1), (0.0, 0.0), &cfg);
        ch.role = Role::ClusterHead;
        ch.ch_addr = Addr::new(3, CH_NODE_ADDR);
        ch.tx_range = 1000.0;
        ch.node_available_dict = pool;
        ch
    }

    fn sent_join_reply(effects: &[Effect]) -> Option<(Addr, u32)> {
        effects.iter().find_map(|e| match e {
            Effect::Send { kind: PacketKind::JoinReply { addr, hop_count, .. }, .. } => Some((*addr, *hop_count)),
            _ => None,
        })
    }

    // Scenario S5: a 2-slot pool, 4 joiners, exactly 2 accepted.
    #[test]
    fn cluster_head_refuses_join_once_its_address_pool_is_full() {
        let mut ch = ch_with_pool(HashMap::from([(1, None), (2, None)]));
        let cfg = SimConfig::default();
        let mut granted = 0;
        for gui in 0..4u32 {
            let mut effects = Vec::new();
            ch.on_join_request(0.0, &cfg, NodeId(gui), Addr::default(), 0.0, &mut effects);
            if sent_join_reply(&effects).is_some() {
                granted += 1;
            }
        }
        assert_eq!(granted, 2);
    }

    // P3: node_available_dict never hands out the same node_addr to two distinct guis.
    #[test]
    fn address_pool_allocations_are_injective() {
        let mut ch = ch_with_pool((1..=NUM_OF_CHILDREN).map(|k| (k, None)).collect());
        let mut seen = HashSet::new();
        for gui in 0..NUM_OF_CHILDREN as u32 {
            let k = ch.allocate_node_addr(NodeId(gui)).expect("pool not yet exhausted");
            assert!(seen.insert(k), "node_addr {k} handed out twice");
        }
        assert!(ch.allocate_node_addr(NodeId(9999)).is_none());
    }

    // P7: JOIN_REPLY's hop_count is always sender.hop_count + 1.
    #[test]
    fn join_reply_carries_the_senders_hop_count_plus_one() {
        let mut ch = ch_with_pool((1..=NUM_OF_CHILDREN).map(|k| (k, None)).collect());
        ch.hop_count = 2;
        let cfg = SimConfig::default();
        let mut effects = Vec::new();
        ch.on_join_request(0.0, &cfg, NodeId(42), Addr::default(), 0.0, &mut effects);
        let (_, hop_count) = sent_join_reply(&effects).expect("join reply expected");
        assert_eq!(hop_count, 3);
    }

    // I5: a Router is never a legal parent for a Registered/Unregistered node, so it must never
    // answer a JOIN_REQUEST with a JOIN_REPLY.
    #[test]
    fn router_ignores_join_requests() {
        let cfg = SimConfig::default();
        let mut router = Node::new(NodeId(2), (0.0, 0.0), &cfg);
        router.role = Role::Router;
        router.addr = Addr::new(5, 1);
        router.tx_range = 1000.0;
        router.node_available_dict = (1..=NUM_OF_CHILDREN).map(|k| (k, None)).collect();
        let mut effects = Vec::new();
        router.on_join_request(0.0, &cfg, NodeId(7), Addr::default(), 0.0, &mut effects);
        assert!(sent_join_reply(&effects).is_none());
        assert!(router.node_available_dict.values().all(Option::is_none));
    }

    // P5 (root immunity half): the root clamps at min_energy_j instead of failing.
    #[test]
    fn root_is_immune_to_energy_depletion() {
        let cfg = SimConfig::default();
        let mut root = Node::new(NodeId(ROOT_ID), (0.0, 0.0), &cfg);
        root.power = cfg.min_energy_j - 0.1;
        let mut effects = Vec::new();
        let died = root.charge_tx_energy(&cfg, &mut effects);
        assert!(!died);
        assert!(!root.failed);
        assert_eq!(root.power, cfg.min_energy_j);
    }

    // P5 (non-root half): crossing the energy floor is sticky.
    #[test]
    fn non_root_node_dies_once_energy_drops_to_the_floor() {
        let mut cfg = SimConfig::default();
        cfg.min_energy_j = cfg.initial_energy_j - 1e-6;
        let mut n = Node::new(NodeId(5), (0.0, 0.0), &cfg);
        let mut effects = Vec::new();
        let died = n.charge_tx_energy(&cfg, &mut effects);
        assert!(died);
        assert!(n.failed);
        assert!(effects.iter().any(|e| matches!(e, Effect::Died)));

        // Sticky: a second charge must not re-emit Died or un-fail the node.
        let mut effects2 = Vec::new();
        let died_again = n.apply_tx_energy(&cfg, &mut effects2);
        assert!(!died_again);
        assert!(n.failed);
    }

    // P6 / S6: mesh entries beyond MESH_HOP_N + 1 are rejected outright.
    #[test]
    fn table_share_rejects_entries_beyond_the_mesh_hop_cap() {
        let cfg = SimConfig { neighbor_table_max_hops: 2, ..SimConfig::default() };
        let mut n = Node::new(NodeId(1), (0.0, 0.0), &cfg);
        n.role = Role::Registered;
        let mut incoming = HashMap::new();
        incoming.insert(
            NodeId(9),
            NeighborEntry {
                source: Addr::new(4, 1),
                gui: NodeId(9),
                role: Role::Registered,
                addr: Addr::new(4, 1),
                ch_addr: Addr::new(4, 254),
                hop_count: 3,
                arrival_time: 0.0,
                distance: 10.0,
                neighbor_hop_count: 3,
                next_hop: None,
            },
        );
        let mut effects = Vec::new();
        n.on_table_share(0.0, &cfg, incoming, &mut effects);
        assert!(!n.neighbors_table.contains_key(&NodeId(9)));
    }

    #[test]
    fn table_share_accepts_entries_at_the_mesh_hop_cap() {
        let cfg = SimConfig { neighbor_table_max_hops: 2, ..SimConfig::default() };
        let mut n = Node::new(NodeId(1), (0.0, 0.0), &cfg);
        n.role = Role::Registered;
        let mut incoming = HashMap::new();
        incoming.insert(
            NodeId(9),
            NeighborEntry {
                source: Addr::new(4, 1),
                gui: NodeId(9),
                role: Role::Registered,
                addr: Addr::new(4, 1),
                ch_addr: Addr::new(4, 254),
                hop_count: 3,
                arrival_time: 0.0,
                distance: 10.0,
                neighbor_hop_count: 2,
                next_hop: None,
            },
        );
        let mut effects = Vec::new();
        n.on_table_share(0.0, &cfg, incoming, &mut effects);
        let entry = n.neighbors_table.get(&NodeId(9)).expect("entry accepted");
        assert_eq!(entry.neighbor_hop_count, 3);
    }

    #[test]
    fn unregistered_node_becomes_cluster_head_on_nomination() {
        let cfg = SimConfig::default();
        let mut n = Node::new(NodeId(3), (0.0, 0.0), &cfg);
        n.role = Role::Unregistered;
        n.addr = Addr::new(6, 1);
        let mut effects = Vec::new();
        n.on_ch_nomination(
            0.0,
            &cfg,
            NodeId(1),
            Addr::new(6, 254),
            (1..=NUM_OF_CHILDREN).map(|k| (k, None)).collect(),
            &mut effects,
        );
        assert_eq!(n.role, Role::ClusterHead);
        assert_eq!(n.ch_addr, Addr::new(6, CH_NODE_ADDR));
        assert!(effects.iter().any(|e| matches!(e, Effect::Send { kind: PacketKind::ChNominationAck, .. })));
    }

    #[test]
    fn probe_timer_bootstraps_root_after_threshold_probes() {
        let cfg = SimConfig::default();
        let mut n = Node::new(NodeId(ROOT_ID), (0.0, 0.0), &cfg);
        let mut effects = Vec::new();
        for _ in 0..TH_PROBE {
            effects = n.on_probe_timer(0.0, &cfg);
        }
        assert_eq!(n.role, Role::Root);
        assert_eq!(n.addr, Addr::ROOT);
        assert!(effects.iter().any(|e| matches!(e, Effect::RoleChanged { new: Role::Root, .. })));
    }

    #[test]
    fn become_unregistered_clears_every_table() {
        let cfg = SimConfig::default();
        let mut n = Node::new(NodeId(4), (0.0, 0.0), &cfg);
        n.role = Role::Registered;
        n.addr = Addr::new(2, 1);
        n.neighbors_table.insert(NodeId(9), NeighborEntry {
            source: Addr::new(2, 254),
            gui: NodeId(9),
            role: Role::ClusterHead,
            addr: Addr::new(2, 254),
            ch_addr: Addr::new(2, 254),
            hop_count: 1,
            arrival_time: 0.0,
            distance: 5.0,
            neighbor_hop_count: 1,
            next_hop: None,
        });
        n.parent_gui = Some(NodeId(9));
        let effects = n.become_unregistered(0.0, &cfg);
        assert_eq!(n.role, Role::Unregistered);
        assert_eq!(n.addr, Addr::default());
        assert!(n.neighbors_table.is_empty());
        assert!(n.parent_gui.is_none());
        assert!(effects.iter().any(|e| matches!(e, Effect::KillAllTimers)));
    }
}
