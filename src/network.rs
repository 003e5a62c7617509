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

//! The simulation engine: owns every node, the event queue, the radio medium, and the reports.
//!
//! Execution is single-threaded cooperative discrete-event simulation (ยง5): `run` pops events in
//! `(time, sequence)` order and runs each to completion with no preemption, so no locking is
//! required anywhere in this module.
//!
//! A [`Node`] handler never touches the queue, the radio, or another node directly; it returns a
//! `Vec<Effect>` and [`Network::discharge`] is the only place that interprets one.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::SimConfig;
use crate::event::{CallbackKind, EventKind, EventQueue, TimerName};
use crate::export::{
    format_path, role_name, EnergyMetricsRow, PacketLogRow, PacketRouteRow, PowerSampleRow,
    RegistrationRow, ReportWriters, RoleChangeRow, TopologyRow,
};
use crate::failure::FailureOrchestrator;
use crate::node::{Effect, Node};
use crate::scene::{LineStyle, NullScene, Scene};
use crate::types::{distance, Addr, NodeId, Packet, PacketKind, PacketOrigin, PathType, Position, Role};

/// Process-wide state that would otherwise be free-floating globals (ยง5, ยง9): node positions, the
/// address index, the node roster, role counters, the PRNG, and the radio medium's counters.
/// Reset fresh by every `Network::new`.
pub struct SimContext {
    /// Fixed position of every node, written once at creation.
    pub node_pos: HashMap<NodeId, Position>,
    /// Which node currently owns a given advertised `Addr` (`ch_addr` for CH/Root, else `addr`).
    pub addr_to_node: HashMap<Addr, NodeId>,
    /// Every node id created this run, in creation order.
    pub all_nodes: Vec<NodeId>,
    /// Live count of nodes currently in each role.
    pub role_counts: HashMap<Role, usize>,
    /// `registered_time - wake_time` for every node's first registration, in completion order.
    pub join_times: Vec<f64>,
    /// The single PRNG every draw of randomness in a run comes from, in a fixed order (ยง9).
    pub rng: ChaCha8Rng,
    /// Total per-receiver delivery attempts made by the radio medium.
    pub total_tx_attempts: u64,
    /// Total per-receiver deliveries dropped by the loss-ratio draw.
    pub total_tx_dropped: u64,
    next_pkt_id: u64,
}

impl SimContext {
    fn new(seed: u64) -> Self {
        Self {
            node_pos: HashMap::new(),
            addr_to_node: HashMap::new(),
            all_nodes: Vec::new(),
            role_counts: HashMap::new(),
            join_times: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            total_tx_attempts: 0,
            total_tx_dropped: 0,
            next_pkt_id: 0,
        }
    }

    fn fresh_pkt_id(&mut self) -> u64 {
        let id = self.next_pkt_id;
        self.next_pkt_id += 1;
        id
    }

    /// Single writer of `role_counts` (ยง5): decrement `old`, increment `new`.
    fn record_role_change(&mut self, old: Role, new: Role) {
        if let Some(c) = self.role_counts.get_mut(&old) {
            *c = c.saturating_sub(1);
        }
        *self.role_counts.entry(new).or_insert(0) += 1;
    }

    /// First moment every created node is in a registered-ish role (ยง9's resolved off-by-one).
    pub fn all_registered(&self, nodes: &HashMap<NodeId, Node>) -> bool {
        !self.all_nodes.is_empty()
            && self.all_nodes.iter().all(|id| nodes.get(id).map(|n| n.role.is_joined()).unwrap_or(false))
    }
}

/// The simulation engine. Generic over `Scene` so a real front-end can be substituted for tests
/// or tooling; the `dct-sim` binary always uses [`NullScene`].
pub struct Network<S: Scene = NullScene> {
    /// Run configuration.
    pub cfg: SimConfig,
    /// Every simulated node, keyed by its stable id.
    pub nodes: HashMap<NodeId, Node>,
    /// The discrete-event scheduler.
    pub queue: EventQueue,
    /// Consolidated process-wide state.
    pub ctx: SimContext,
    /// Visualization observer.
    pub scene: S,
    /// Failure/recovery bookkeeping.
    pub failure: FailureOrchestrator,
    /// CSV report writers.
    pub writers: ReportWriters,
    now: f64,
}

impl Network<NullScene> {
    /// Build a headless simulation, placing `cfg.sim_node_count` nodes and scheduling the initial
    /// events (first probes, the failure orchestrator, power sampling).
    pub fn new(cfg: SimConfig, report_dir: impl AsRef<Path>) -> Self {
        Self::with_scene(cfg, NullScene, report_dir)
    }
}

impl<S: Scene> Network<S> {
    /// Build a simulation driving `scene` instead of the headless default.
    pub fn with_scene(cfg: SimConfig, scene: S, report_dir: impl AsRef<Path>) -> Self {
        let ctx = SimContext::new(cfg.seed);
        let mut net = Self {
            nodes: HashMap::new(),
            queue: EventQueue::new(),
            scene,
            failure: FailureOrchestrator::new(),
            writers: ReportWriters::new(report_dir.as_ref()),
            now: 0.0,
            ctx,
            cfg,
        };
        net.populate();
        net
    }

    fn populate(&mut self) {
        let positions = self.sample_positions();
        for pos in positions {
            self.add_node(pos);
        }
        FailureOrchestrator::schedule_initial_failure(&self.cfg, &mut self.queue);
        if self.cfg.power_sampling_interval > 0.0 {
            self.queue.push(self.cfg.power_sampling_interval, EventKind::Callback(CallbackKind::SamplePower));
        }
    }

    /// Place `cfg.sim_node_count` positions on a jittered grid of `sim_node_placing_cell_size`
    /// cells so nodes don't pile up on the same point (ยง6's `SIM_NODE_PLACING_CELL_SIZE`).
    fn sample_positions(&mut self) -> Vec<Position> {
        let (w, h) = self.cfg.sim_terrain_size;
        let cell = self.cfg.sim_node_placing_cell_size.max(1.0);
        let cols = ((w / cell).floor() as usize).max(1);
        let rows = ((h / cell).floor() as usize).max(1);
        let mut cells: Vec<(usize, usize)> =
            (0..rows).flat_map(|r| (0..cols).map(move |c| (r, c))).collect();
        cells.shuffle(&mut self.ctx.rng);

        let mut positions = Vec::with_capacity(self.cfg.sim_node_count);
        for i in 0..self.cfg.sim_node_count {
            let (r, c) = cells[i % cells.len()];
            let jx: f64 = self.ctx.rng.gen_range(0.0..cell);
            let jy: f64 = self.ctx.rng.gen_range(0.0..cell);
            positions.push(((c as f64 * cell + jx).min(w), (r as f64 * cell + jy).min(h)));
        }
        positions
    }

    /// Create one node at `pos`, draw its wake-up time, and arm its first `PROBE`.
    pub fn add_node(&mut self, pos: Position) -> NodeId {
        let id = NodeId(self.ctx.all_nodes.len() as u32);
        let mut node = Node::new(id, pos, &self.cfg);
        node.wake_time =
            if node.is_root_eligible() { 0.1 } else { self.ctx.rng.gen_range(0.0..=self.cfg.node_arrival_max) };

        self.ctx.node_pos.insert(id, pos);
        self.ctx.all_nodes.push(id);
        *self.ctx.role_counts.entry(Role::Undiscovered).or_insert(0) += 1;
        let wake = node.wake_time;
        self.nodes.insert(id, node);
        self.queue.push(wake, EventKind::Timer { node: id, name: TimerName::Probe });
        id
    }

    /// Run the simulation to `cfg.sim_duration`, then flush every report.
    pub fn run(&mut self) {
        while let Some(event) = self.queue.pop() {
            if event.time > self.cfg.sim_duration {
                break;
            }
            self.now = event.time;
            self.dispatch_event(event.kind);
        }
        self.finish();
    }

    /// Current virtual time.
    pub fn now(&self) -> f64 {
        self.now
    }

    fn dispatch_event(&mut self, kind: EventKind) {
        match kind {
            EventKind::Timer { node, name } => self.dispatch_timer(node, name),
            EventKind::Delivery { node, dest, packet } => self.dispatch_delivery(node, dest, packet),
            EventKind::Callback(cb) => self.dispatch_callback(cb),
        }
    }

    fn dispatch_timer(&mut self, node_id: NodeId, name: TimerName) {
        let now = self.now;
        let sensor_value: f64 = if name == TimerName::Sensor { self.ctx.rng.gen_range(0.0..100.0) } else { 0.0 };
        let Some(node) = self.nodes.get_mut(&node_id) else { return };
        if node.failed {
            return;
        }
        let effects = match name {
            TimerName::Probe => node.on_probe_timer(now, &self.cfg),
            TimerName::JoinRequest => node.on_join_request_timer(now, &self.cfg),
            TimerName::HeartBeat => node.on_heart_beat_timer(&self.cfg),
            TimerName::TableShare => node.on_table_share_timer(&self.cfg),
            TimerName::Sensor => node.on_sensor_timer(&self.cfg, sensor_value),
            TimerName::RoleOptimize => node.on_role_optimize_timer(now, &self.cfg),
        };
        self.discharge(node_id, effects);
    }

    fn dispatch_delivery(&mut self, node_id: NodeId, dest: Addr, packet: Packet) {
        let now = self.now;
        let sender_pos = self.ctx.node_pos.get(&packet.source_gui).copied();
        let Some(node) = self.nodes.get_mut(&node_id) else { return };
        if node.failed {
            return;
        }
        let dist = sender_pos.map(|p| distance(p, node.pos)).unwrap_or(0.0);
        let effects = node.handle_packet(now, &self.cfg, dest, dist, packet.clone());

        if is_packet_log_kind(&packet.kind) {
            let relayed_further = effects.iter().any(
                |e| matches!(e, Effect::Send { carry: Some(origin), .. } if origin.pkt_id == packet.pkt_id),
            );
            if !relayed_further {
                self.record_packet_log_row(node_id, &packet);
            }
        }

        self.discharge(node_id, effects);
    }

    fn dispatch_callback(&mut self, cb: CallbackKind) {
        match cb {
            CallbackKind::FailNodes => {
                let now = self.now;
                let cfg = self.cfg.clone();
                let killed =
                    self.failure.fail_nodes(now, &cfg, &mut self.nodes, &mut self.queue, &mut self.ctx.rng, &mut self.writers);
                for node_id in killed {
                    self.scene.nodecolor(node_id, 128, 128, 128);
                }
            }
            CallbackKind::Revive(node_id) => {
                let now = self.now;
                let cfg = self.cfg.clone();
                let effects = self.failure.revive(now, &cfg, node_id, &mut self.nodes, &mut self.writers);
                self.discharge(node_id, effects);
            }
            CallbackKind::SamplePower => {
                self.sample_power();
                self.queue.push(self.now + self.cfg.power_sampling_interval, EventKind::Callback(CallbackKind::SamplePower));
            }
        }
    }

    /// Interpret one side effect a node handler produced. This is the only place that touches the
    /// event queue, the radio medium, or another node on a handler's behalf.
    fn discharge(&mut self, node_id: NodeId, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Send { dest, next_hop, kind, path_type, carry } => {
                    self.send(node_id, dest, next_hop, kind, path_type, carry);
                }
                Effect::SetTimer { name, delay } => {
                    self.queue.push(self.now + delay, EventKind::Timer { node: node_id, name });
                }
                Effect::KillTimer(name) => {
                    self.queue.kill_timer(node_id, name);
                }
                Effect::KillAllTimers => {
                    self.queue.kill_all_timers(node_id);
                }
                Effect::RoleChanged { old, new } => {
                    self.ctx.record_role_change(old, new);
                    self.reindex_node(node_id);
                    self.record_role_change_row(node_id, old, new);
                    self.recolor(node_id, new);
                }
                Effect::FirstRegistered { delta } => {
                    self.ctx.join_times.push(delta);
                    self.record_registration_row(node_id, delta);
                }
                Effect::TxPowerChanged { level } => {
                    self.redraw_range(node_id, level);
                }
                Effect::Died => {
                    self.reorganize_after_death(node_id);
                }
            }
        }
    }

    /// Physically transmit `kind`: charge TX energy first (a node that dies mid-send never emits
    /// the packet, ยง5), log the routing decision, then resolve deliveries against the radio
    /// medium (broadcast to everyone in range, or a single range-and-loss-checked unicast hop).
    fn send(&mut self, sender_id: NodeId, dest: Addr, next_hop: Addr, kind: PacketKind, path_type: PathType, carry: Option<PacketOrigin>) {
        let mut tx_effects = Vec::new();
        let died = match self.nodes.get_mut(&sender_id) {
            Some(sender) => sender.charge_tx_energy(&self.cfg, &mut tx_effects),
            None => return,
        };
        self.discharge(sender_id, tx_effects);
        if died {
            return;
        }

        self.record_packet_route_row(sender_id, &kind, next_hop, dest, path_type);

        let Some(sender) = self.nodes.get(&sender_id) else { return };
        let sender_pos = sender.pos;
        let sender_range = sender.tx_range;
        let source_addr = sender.advertised_source();
        let is_broadcast = kind.is_broadcast_kind();

        let packet = match carry {
            Some(origin) => Packet {
                pkt_id: origin.pkt_id,
                kind,
                dest,
                source: source_addr,
                source_gui: sender_id,
                creation_time: origin.creation_time,
                path: origin.path,
            },
            None => Packet::new(self.ctx.fresh_pkt_id(), kind, dest, source_addr, sender_id, self.now),
        };

        if is_broadcast {
            let receivers: Vec<NodeId> = self
                .ctx
                .all_nodes
                .iter()
                .copied()
                .filter(|&id| id != sender_id)
                .collect();
            for rid in receivers {
                self.maybe_deliver(sender_pos, sender_range, rid, dest, packet.clone());
            }
        } else if let Some(&rid) = self.ctx.addr_to_node.get(&next_hop) {
            self.maybe_deliver(sender_pos, sender_range, rid, dest, packet);
        }
    }

    /// One candidate delivery: drop silently if out of range or already dead, else draw the
    /// independent loss decision and schedule the `Delivery` event if it survives (ยง6 radio
    /// contract).
    fn maybe_deliver(&mut self, sender_pos: Position, sender_range: f64, receiver: NodeId, dest: Addr, packet: Packet) {
        let Some(node) = self.nodes.get(&receiver) else { return };
        if node.failed || distance(sender_pos, node.pos) > sender_range {
            return;
        }
        self.ctx.total_tx_attempts += 1;
        if self.ctx.rng.gen::<f64>() < self.cfg.packet_loss_ratio {
            self.ctx.total_tx_dropped += 1;
            return;
        }
        self.queue.push(self.now, EventKind::Delivery { node: receiver, dest, packet });
    }

    /// Children of a node that just died lose their parent, restart discovery (ยง4.6).
    fn reorganize_after_death(&mut self, node_id: NodeId) {
        let now = self.now;
        let cfg = self.cfg.clone();

        if let Some(node) = self.nodes.get(&node_id) {
            let addr = node.addr;
            let ch_addr = node.ch_addr;
            self.ctx.addr_to_node.remove(&addr);
            self.ctx.addr_to_node.remove(&ch_addr);
        }
        self.scene.delshape(node_id);

        let children: Vec<NodeId> =
            self.nodes.values().filter(|n| !n.failed && n.parent_gui == Some(node_id)).map(|n| n.id).collect();
        for child_id in children {
            self.scene.delshape(child_id);
            let effects = match self.nodes.get_mut(&child_id) {
                Some(child) => child.become_unregistered(now, &cfg),
                None => continue,
            };
            self.discharge(child_id, effects);
        }
    }

    /// Re-derive `addr_to_node`'s entries for `node_id`: drop any stale mapping pointing at it,
    /// then re-add its current advertised address if it owns one (ยง5).
    fn reindex_node(&mut self, node_id: NodeId) {
        self.ctx.addr_to_node.retain(|_, owner| *owner != node_id);
        if let Some(node) = self.nodes.get(&node_id) {
            if node.role.is_joined() {
                self.ctx.addr_to_node.insert(node.advertised_source(), node_id);
            }
        }
    }

    fn sample_power(&mut self) {
        let samples: Vec<f64> = self.nodes.values().filter(|n| !n.failed).map(|n| n.power).collect();
        let dead_nodes = self.nodes.values().filter(|n| n.failed).count();
        let alive_nodes = samples.len();
        let (avg, min, max) = if samples.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            let sum: f64 = samples.iter().sum();
            (
                sum / samples.len() as f64,
                samples.iter().cloned().fold(f64::INFINITY, f64::min),
                samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            )
        };
        let row =
            PowerSampleRow { time: self.now, avg_power_j: avg, min_power_j: min, max_power_j: max, alive_nodes, dead_nodes };
        if let Err(e) = self.writers.record_power_sample(row) {
            log::warn!("failed to record power_over_time row: {e}");
        }
    }

    fn record_packet_route_row(&mut self, sender_id: NodeId, kind: &PacketKind, next_hop: Addr, dest: Addr, path_type: PathType) {
        let Some(node) = self.nodes.get(&sender_id) else { return };
        let row = PacketRouteRow {
            time: self.now,
            packet_type: kind.name().to_string(),
            source: node.advertised_source().to_string(),
            current_node: sender_id,
            next_hop: next_hop.to_string(),
            dest: dest.to_string(),
            hop_count: node.hop_count,
            routing_direction: path_type.to_string(),
        };
        if let Err(e) = self.writers.record_packet_route(row) {
            log::warn!("failed to record packet_routes row: {e}");
        }
    }

    fn record_packet_log_row(&mut self, node_id: NodeId, packet: &Packet) {
        let mut path = packet.path.clone();
        path.push(node_id);
        let row = PacketLogRow {
            packet_id: packet.pkt_id,
            packet_type: packet.kind.name().to_string(),
            source_gui: *packet.path.first().unwrap_or(&packet.source_gui),
            dest_gui: node_id.to_string(),
            created_at: packet.creation_time,
            received_at: self.now,
            delay: self.now - packet.creation_time,
            path: format_path(&path),
        };
        if let Err(e) = self.writers.record_packet_log(row) {
            log::warn!("failed to record packet_log row: {e}");
        }
    }

    fn record_role_change_row(&mut self, node_id: NodeId, old: Role, new: Role) {
        let row = RoleChangeRow { time: self.now, node_id, old_role: role_name(old), new_role: role_name(new) };
        if let Err(e) = self.writers.record_role_change(row) {
            log::warn!("failed to record role_changes row: {e}");
        }
    }

    fn record_registration_row(&mut self, node_id: NodeId, delta: f64) {
        let Some(node) = self.nodes.get(&node_id) else { return };
        let row = RegistrationRow {
            node_id,
            start_time: node.wake_time,
            registered_time: node.wake_time + delta,
            delta_time: delta,
        };
        if let Err(e) = self.writers.record_registration(row) {
            log::warn!("failed to record registration_log row: {e}");
        }
    }

    fn recolor(&mut self, node_id: NodeId, role: Role) {
        let (r, g, b) = match role {
            Role::Undiscovered => (128, 128, 128),
            Role::Unregistered => (255, 165, 0),
            Role::Registered => (0, 128, 255),
            Role::ClusterHead => (0, 180, 0),
            Role::Router => (180, 0, 180),
            Role::Root => (220, 0, 0),
        };
        self.scene.nodecolor(node_id, r, g, b);
    }

    fn redraw_range(&mut self, node_id: NodeId, level: u8) {
        let Some(node) = self.nodes.get(&node_id) else { return };
        let range = self.cfg.node_tx_ranges.get(&level).copied().unwrap_or(0.0);
        let style = if node.role == Role::Router { LineStyle::Dashed } else { LineStyle::Solid };
        let (x, y) = node.pos;
        self.scene.circle(node_id, x, y, range, style);
    }

    /// Write `topology.csv` and `energy_metrics.csv`, then flush every opened writer.
    fn finish(&mut self) {
        for node in self.nodes.values() {
            let (x, y) = node.pos;
            if let Err(e) = self.writers.record_topology(TopologyRow {
                node_id: node.id,
                position: format!("{x},{y}"),
                role: role_name(node.role),
            }) {
                log::warn!("failed to record topology row: {e}");
            }

            let total_energy = node.tx_energy_consumed + node.rx_energy_consumed;
            let total_packets = node.tx_packet_count + node.rx_packet_count;
            let row = EnergyMetricsRow {
                node_id: node.id,
                role: role_name(node.role),
                initial_energy_j: self.cfg.initial_energy_j,
                final_energy_j: node.power,
                total_energy_consumed_j: total_energy,
                tx_energy_consumed_j: node.tx_energy_consumed,
                rx_energy_consumed_j: node.rx_energy_consumed,
                tx_packet_count: node.tx_packet_count,
                rx_packet_count: node.rx_packet_count,
                total_packet_count: total_packets,
                avg_energy_per_tx_packet_j: if node.tx_packet_count > 0 {
                    node.tx_energy_consumed / node.tx_packet_count as f64
                } else {
                    0.0
                },
                avg_energy_per_rx_packet_j: if node.rx_packet_count > 0 {
                    node.rx_energy_consumed / node.rx_packet_count as f64
                } else {
                    0.0
                },
                energy_efficiency_j_per_packet: if total_packets > 0 { total_energy / total_packets as f64 } else { 0.0 },
            };
            if let Err(e) = self.writers.record_energy_metrics(row) {
                log::warn!("failed to record energy_metrics row: {e}");
            }
        }
        self.writers.finish();
    }
}

/// Whether `kind` is one of the multi-hop relay kinds `packet_log.csv` correlates end-to-end
/// (control chatter like `PROBE`/`HEART_BEAT` is local and not logged per-packet).
fn is_packet_log_kind(kind: &PacketKind) -> bool {
    matches!(
        kind,
        PacketKind::NetworkRequest
            | PacketKind::NetworkReply { .. }
            | PacketKind::NetworkUpdate { .. }
            | PacketKind::SensorData { .. }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cfg() -> SimConfig {
        SimConfig {
            sim_node_count: 6,
            sim_duration: 400.0,
            node_arrival_max: 5.0,
            packet_loss_ratio: 0.0,
            enable_data_packets: false,
            num_nodes_to_kill: 0,
            seed: 7,
            ..SimConfig::default()
        }
    }

    fn temp_dir(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!("dct_sim_test_{label}_{}", std::process::id()))
    }

    #[test]
    fn a_small_network_converges_to_a_single_root() {
        let dir = temp_dir("converge");
        let mut net = Network::new(test_cfg(), &dir);
        net.run();
        let roots = net.nodes.values().filter(|n| n.role == Role::Root).count();
        assert_eq!(roots, 1);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn every_node_eventually_leaves_undiscovered() {
        let dir = temp_dir("registers");
        let mut net = Network::new(test_cfg(), &dir);
        net.run();
        assert!(net.nodes.values().all(|n| n.role != Role::Undiscovered || n.failed));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn deterministic_seed_reproduces_identical_role_counts() {
        let dir_a = temp_dir("seed_a");
        let dir_b = temp_dir("seed_b");
        let mut a = Network::new(test_cfg(), &dir_a);
        let mut b = Network::new(test_cfg(), &dir_b);
        a.run();
        b.run();
        let mut roles_a: Vec<_> = a.nodes.values().map(|n| (n.id, n.role)).collect();
        let mut roles_b: Vec<_> = b.nodes.values().map(|n| (n.id, n.role)).collect();
        roles_a.sort();
        roles_b.sort();
        assert_eq!(roles_a, roles_b);
        let _ = std::fs::remove_dir_all(&dir_a);
        let _ = std::fs::remove_dir_all(&dir_b);
    }
}
