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

//! Module for defining the discrete-event scheduler's events.
//!
//! Every "wait" in the protocol is expressed as one of these events being scheduled for some
//! future `now + delay`; there is no other suspension surface (ยง5).

mod queue;
pub use queue::EventQueue;

use crate::types::{Addr, NodeId, Packet};

/// Name of a per-node timer. A node may only ever have one outstanding event per `TimerName`;
/// arming a timer cancels any previously scheduled one with the same name (ยง5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerName {
    /// Periodic `PROBE` broadcast while Undiscovered.
    Probe,
    /// Periodic candidate (re)selection while Unregistered.
    JoinRequest,
    /// Periodic `HEART_BEAT` broadcast once joined.
    HeartBeat,
    /// Periodic `TABLE_SHARE` broadcast once joined.
    TableShare,
    /// Periodic `SENSOR_DATA` emission once joined.
    Sensor,
    /// One-shot role-optimization check.
    RoleOptimize,
}

/// What should happen when a scheduled event fires.
#[derive(Debug, Clone)]
pub enum EventKind {
    /// A named timer on `node` has expired.
    Timer {
        /// The node the timer belongs to.
        node: NodeId,
        /// Which timer.
        name: TimerName,
    },
    /// `packet` arrives at `node` (one entry is scheduled per receiver within range of a
    /// broadcast; see the radio medium in `network.rs`).
    Delivery {
        /// The receiving node.
        node: NodeId,
        /// The address the receiver should consider the packet to target (used to detect
        /// broadcast vs. unicast deliveries uniformly).
        dest: Addr,
        /// The packet payload.
        packet: Packet,
    },
    /// A one-off callback not tied to any particular node: the failure orchestrator's kill/revive
    /// steps, and the periodic power sampler.
    Callback(CallbackKind),
}

/// The closed set of top-level scheduled callbacks (ยง2, component 7 and ยง4.11).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackKind {
    /// Kill `NUM_NODES_TO_KILL` random live non-Root nodes.
    FailNodes,
    /// Revive a single previously-killed node.
    Revive(NodeId),
    /// Sample power statistics into `power_over_time.csv`.
    SamplePower,
}

/// An event scheduled for a specific virtual time, in FIFO order among ties.
#[derive(Debug, Clone)]
pub struct ScheduledEvent {
    /// The virtual time at which this event fires.
    pub time: f64,
    /// Insertion sequence, used to break same-`time` ties in FIFO order (ยง5).
    pub sequence: u64,
    /// The event itself.
    pub kind: EventKind,
    /// Set when a timer is re-armed or explicitly killed before it fired; skipped on pop.
    pub cancelled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_name_is_copy_and_hashable() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(TimerName::Probe);
        set.insert(TimerName::HeartBeat);
        assert_eq!(set.len(), 2);
    }
}
