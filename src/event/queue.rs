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

//! A time-ordered event queue: a binary heap keyed by `(time, sequence)` so that popping always
//! yields the earliest-scheduled event, and same-`time` events come out in the order they were
//! pushed (ยง5's FIFO tie-break).

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use ordered_float::NotNan;

use super::{EventKind, ScheduledEvent, TimerName};
use crate::types::NodeId;

#[derive(Debug, Clone, PartialEq)]
struct HeapKey(NotNan<f64>, u64);

impl Eq for HeapKey {}

impl PartialOrd for HeapKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0).then(self.1.cmp(&other.1))
    }
}

/// The simulation's event queue.
///
/// `push` and `pop` are the only operations the scheduler uses directly; `cancel_timer` lets
/// `Node::set_timer`/`kill_timer` invalidate a previously scheduled timer without a linear scan of
/// the heap (the heap entry is marked `cancelled` and skipped lazily on pop).
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Reverse<(HeapKey, u64)>>,
    events: HashMap<u64, ScheduledEvent>,
    next_sequence: u64,
    next_id: u64,
    /// Maps `(node, timer)` to the id of its currently-armed event, if any.
    live_timers: HashMap<(NodeId, TimerName), u64>,
}

impl EventQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `kind` to fire at `time`. Returns the event's id.
    pub fn push(&mut self, time: f64, kind: EventKind) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        let id = self.next_id;
        self.next_id += 1;

        if let EventKind::Timer { node, name } = &kind {
            if let Some(old_id) = self.live_timers.insert((*node, *name), id) {
                self.cancel(old_id);
            }
        }

        let key = HeapKey(NotNan::new(time).expect("scheduled time must not be NaN"), sequence);
        self.heap.push(Reverse((key, id)));
        self.events.insert(
            id,
            ScheduledEvent { time, sequence, kind, cancelled: false },
        );
        id
    }

    /// Cancel a previously scheduled timer, if still pending. No-op if it already fired or was
    /// never armed.
    pub fn kill_timer(&mut self, node: NodeId, name: TimerName) {
        if let Some(id) = self.live_timers.remove(&(node, name)) {
            self.cancel(id);
        }
    }

    /// Cancel every pending timer belonging to `node` (used by `become_unregistered` and the
    /// energy-death path, ยง5).
    pub fn kill_all_timers(&mut self, node: NodeId) {
        let keys: Vec<_> = self
            .live_timers
            .keys()
            .filter(|(n, _)| *n == node)
            .copied()
            .collect();
        for key in keys {
            if let Some(id) = self.live_timers.remove(&key) {
                self.cancel(id);
            }
        }
    }

    fn cancel(&mut self, id: u64) {
        if let Some(ev) = self.events.get_mut(&id) {
            ev.cancelled = true;
        }
    }

    /// Pop the next non-cancelled event, in time/FIFO order.
    pub fn pop(&mut self) -> Option<ScheduledEvent> {
        while let Some(Reverse((_, id))) = self.heap.pop() {
            let ev = self.events.remove(&id)?;
            if ev.cancelled {
                continue;
            }
            if let EventKind::Timer { node, name } = &ev.kind {
                if self.live_timers.get(&(*node, *name)) == Some(&id) {
                    self.live_timers.remove(&(*node, *name));
                }
            }
            return Some(ev);
        }
        None
    }

    /// Time of the next event that would be returned by `pop`, if any.
    pub fn peek_time(&self) -> Option<f64> {
        self.heap.peek().map(|Reverse((key, _))| key.0.into_inner())
    }

    /// Number of events still pending (including lazily-cancelled ones not yet popped).
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the queue has no pending events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Interface implemented by [`EventQueue`]; kept as a trait (mirroring the teacher crate's
/// `EventQueue` trait) so an alternative scheduler (e.g. one replaying a recorded trace) can be
/// substituted in tests without touching `Network`.
pub trait EventSchedule {
    /// Schedule `kind` to fire at `time`.
    fn schedule(&mut self, time: f64, kind: EventKind) -> u64;
    /// Pop the next event in time order.
    fn next(&mut self) -> Option<ScheduledEvent>;
}

impl EventSchedule for EventQueue {
    fn schedule(&mut self, time: f64, kind: EventKind) -> u64 {
        self.push(time, kind)
    }

    fn next(&mut self) -> Option<ScheduledEvent> {
        self.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::CallbackKind;

    #[test]
    fn pops_in_time_order() {
        let mut q = EventQueue::new();
        q.push(5.0, EventKind::Callback(CallbackKind::SamplePower));
        q.push(1.0, EventKind::Callback(CallbackKind::SamplePower));
        q.push(3.0, EventKind::Callback(CallbackKind::SamplePower));
        let times: Vec<_> = std::iter::from_fn(|| q.pop()).map(|e| e.time).collect();
        assert_eq!(times, vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn same_time_events_are_fifo() {
        let mut q = EventQueue::new();
        q.push(1.0, EventKind::Callback(CallbackKind::SamplePower));
        q.push(1.0, EventKind::Callback(CallbackKind::Revive(NodeId(1))));
        q.push(1.0, EventKind::Callback(CallbackKind::Revive(NodeId(2))));
        let a = q.pop().unwrap();
        let b = q.pop().unwrap();
        let c = q.pop().unwrap();
        assert!(matches!(a.kind, EventKind::Callback(CallbackKind::SamplePower)));
        assert!(matches!(b.kind, EventKind::Callback(CallbackKind::Revive(id)) if id == NodeId(1)));
        assert!(matches!(c.kind, EventKind::Callback(CallbackKind::Revive(id)) if id == NodeId(2)));
    }

    #[test]
    fn rearming_a_timer_cancels_the_old_one() {
        let mut q = EventQueue::new();
        let node = NodeId(0);
        q.push(10.0, EventKind::Timer { node, name: TimerName::Probe });
        q.push(20.0, EventKind::Timer { node, name: TimerName::Probe });
        let only = q.pop().unwrap();
        assert_eq!(only.time, 20.0);
        assert!(q.pop().is_none());
    }

    #[test]
    fn kill_timer_prevents_it_from_firing() {
        let mut q = EventQueue::new();
        let node = NodeId(0);
        q.push(10.0, EventKind::Timer { node, name: TimerName::Probe });
        q.kill_timer(node, TimerName::Probe);
        assert!(q.pop().is_none());
    }

    #[test]
    fn kill_all_timers_only_affects_one_node() {
        let mut q = EventQueue::new();
        let a = NodeId(0);
        let b = NodeId(1);
        q.push(10.0, EventKind::Timer { node: a, name: TimerName::Probe });
        q.push(10.0, EventKind::Timer { node: b, name: TimerName::Probe });
        q.kill_all_timers(a);
        let remaining: Vec<_> = std::iter::from_fn(|| q.pop()).collect();
        assert_eq!(remaining.len(), 1);
        assert!(matches!(&remaining[0].kind, EventKind::Timer { node, .. } if *node == b));
    }
}
