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

//! # Simulation configuration
//!
//! [`SimConfig`] is the single collection of tunables read by every subsystem: terrain and node
//! counts, timer periods, the energy model's electrical constants, and the failure/recovery
//! schedule. It implements [`Default`] with the values documented below, and can be loaded from
//! JSON (`serde`) or overridden field-by-field from the `dct-sim` CLI.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Terrain size in meters, `(width, height)`.
pub type TerrainSize = (f64, f64);

/// All tunables of a simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Number of nodes to place. Default `100`.
    pub sim_node_count: usize,
    /// Length of the run, in simulated seconds. Default `5000`.
    pub sim_duration: f64,
    /// Wall-clock scaling factor for interactive playback; `0` means "run as fast as possible".
    /// Default `0`.
    pub sim_time_scale: f64,
    /// Terrain extent. Default `(1400.0, 1400.0)`.
    pub sim_terrain_size: TerrainSize,
    /// Whether a `Scene` should be driven (vs. the headless `NullScene`). Default `true`.
    pub sim_visualization: bool,
    /// Grid cell size used to place nodes without excessive overlap. Default `60.0`.
    pub sim_node_placing_cell_size: f64,

    /// Upper bound (inclusive) of the uniform wake-up delay, in seconds. Default `200.0`.
    pub node_arrival_max: f64,
    /// TX range in meters for each power level. Default `{0: 65, 1: 100, 2: 140}`.
    pub node_tx_ranges: HashMap<u8, f64>,
    /// TX power level newly-registered leaves adopt absent other guidance. Default `1`.
    pub node_default_tx_power: u8,
    /// Whether CH/Root nodes are allowed to adapt `tx_power` (ยง4.7). Default `true`.
    pub allow_tx_power_choice: bool,

    /// Probability that any single delivery is dropped by the radio medium. Default `0.05`.
    pub packet_loss_ratio: f64,

    /// Simulated time at which the failure orchestrator kills nodes. Default `500.0`.
    pub failure_time: f64,
    /// Simulated time at which killed nodes are revived. Default `550.0`.
    pub recovery_time: f64,
    /// Number of distinct non-Root nodes to kill at `failure_time`. Default `3`.
    pub num_nodes_to_kill: usize,

    /// Period between `HEART_BEAT` emissions, spelled the way the original config surface
    /// spells it. Default `101.0`.
    #[serde(rename = "HEART_BEAT_TIME_INTERVAL", alias = "HEARTH_BEAT_TIME_INTERVAL")]
    pub heart_beat_interval: f64,
    /// Period between `JOIN_REQUEST` retries while Unregistered. Default `20.0`.
    pub join_request_interval: f64,
    /// Period between `TABLE_SHARE` emissions; mirrors `heart_beat_interval` unless overridden.
    /// Default `101.0`.
    pub table_share_interval: f64,
    /// Number of `JOIN_REQUEST`s within the expand window that trigger `bump_tx_power`. Default
    /// `3`.
    pub join_req_expand_threshold: usize,
    /// Sliding window (seconds) over which `join_req_expand_threshold` is evaluated; defaults to
    /// `2 * heart_beat_interval`.
    pub join_req_expand_window: f64,
    /// Simulated time at which the one-shot role-optimization check fires. Default `2000.0`.
    pub role_optimize_time: f64,
    /// Maximum mesh hop count a `TABLE_SHARE` entry may carry (`MESH_HOP_N`). Default `2`.
    pub neighbor_table_max_hops: u32,

    /// Whether nodes generate periodic `SENSOR_DATA` traffic. Default `true`.
    pub enable_data_packets: bool,
    /// Period between `SENSOR_DATA` emissions. Default `50.0`.
    pub data_interval: f64,

    /// Starting energy reserve, in joules. Default `2.0`.
    pub initial_energy_j: f64,
    /// Energy floor; a non-Root node fails once `power <= min_energy_j`. Default `1.7`.
    pub min_energy_j: f64,
    /// PSDU size, in bytes, used by the CC2420 energy model. Default `50`.
    pub energy_psdu_bytes: u32,
    /// Fixed per-TX radio turnaround cost, in joules. Default `10e-6`.
    pub tx_turnaround_energy_j: f64,
    /// Fixed per-RX radio turnaround cost, in joules. Default `10e-6`.
    pub rx_turnaround_energy_j: f64,
    /// Supply voltage, in volts, used by the energy model. Default `3.0`.
    pub voltage: f64,
    /// Radio data rate, in bits per second. Default `250_000`.
    pub datarate: f64,
    /// RX current draw, in mA. Default `18.8`.
    pub rx_current_ma: f64,
    /// TX current draw, in mA, per power level. Default `{0: 9.9, 1: 11.0, 2: 17.4}`.
    pub tx_current_levels_ma: HashMap<u8, f64>,

    /// Fraction of dead (non-Root) nodes at which `NETWORK_DEATH_TIME` is recorded. Default
    /// `0.5`.
    pub network_death_threshold: f64,

    /// PRNG seed; all randomness in a run is drawn from a single stream seeded with this value,
    /// in a fixed order, so runs are reproducible. Default `22`.
    pub seed: u64,
    /// Period between `power_over_time.csv` samples. Default `50.0`.
    pub power_sampling_interval: f64,
}

/// Number of allocatable `node_addr` slots in a fresh cluster's `node_available_dict`
/// (`NUM_OF_CHILDREN`).
pub const NUM_OF_CHILDREN: u8 = 254;
/// Number of consecutive `PROBE` broadcasts a node sends before considering root eligibility
/// (`th_probe`).
pub const TH_PROBE: u32 = 10;
/// Maximum `JOIN_REQUEST` attempts against a single candidate before it is skipped
/// (`jr_threshold`).
pub const JR_THRESHOLD: u32 = 5;
/// Stable id reserved for the node that becomes Root.
pub const ROOT_ID: u32 = 0;

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            sim_node_count: 100,
            sim_duration: 5000.0,
            sim_time_scale: 0.0,
            sim_terrain_size: (1400.0, 1400.0),
            sim_visualization: true,
            sim_node_placing_cell_size: 60.0,

            node_arrival_max: 200.0,
            node_tx_ranges: HashMap::from([(0, 65.0), (1, 100.0), (2, 140.0)]),
            node_default_tx_power: 1,
            allow_tx_power_choice: true,

            packet_loss_ratio: 0.05,

            failure_time: 500.0,
            recovery_time: 550.0,
            num_nodes_to_kill: 3,

            heart_beat_interval: 101.0,
            join_request_interval: 20.0,
            table_share_interval: 101.0,
            join_req_expand_threshold: 3,
            join_req_expand_window: 2.0 * 101.0,
            role_optimize_time: 2000.0,
            neighbor_table_max_hops: 2,

            enable_data_packets: true,
            data_interval: 50.0,

            initial_energy_j: 2.0,
            min_energy_j: 1.7,
            energy_psdu_bytes: 50,
            tx_turnaround_energy_j: 10e-6,
            rx_turnaround_energy_j: 10e-6,
            voltage: 3.0,
            datarate: 250_000.0,
            rx_current_ma: 18.8,
            tx_current_levels_ma: HashMap::from([(0, 9.9), (1, 11.0), (2, 17.4)]),

            network_death_threshold: 0.5,

            seed: 22,
            power_sampling_interval: 50.0,
        }
    }
}

impl SimConfig {
    /// Highest TX power level configured (used by Routers, which always transmit at max power).
    pub fn max_tx_power_level(&self) -> u8 {
        self.node_tx_ranges.keys().copied().max().unwrap_or(0)
    }

    /// Validate the configuration, returning a human-readable message for the first problem
    /// found. Not a protocol-level check (ยง7); this only guards setup-time misuse.
    pub fn validate(&self) -> Result<(), String> {
        if self.sim_node_count == 0 {
            return Err("sim_node_count must be at least 1".into());
        }
        if self.node_tx_ranges.is_empty() {
            return Err("node_tx_ranges must have at least one power level".into());
        }
        if self.min_energy_j >= self.initial_energy_j {
            return Err("min_energy_j must be less than initial_energy_j".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let c = SimConfig::default();
        assert_eq!(c.sim_node_count, 100);
        assert_eq!(c.seed, 22);
        assert_eq!(c.heart_beat_interval, 101.0);
        assert_eq!(c.join_req_expand_window, 202.0);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn rejects_zero_nodes() {
        let mut c = SimConfig::default();
        c.sim_node_count = 0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn heart_beat_alias_accepts_legacy_spelling() {
        let json = r#"{"HEARTH_BEAT_TIME_INTERVAL": 100.0}"#;
        let c: SimConfig = serde_json::from_str(json).unwrap();
        assert_eq!(c.heart_beat_interval, 100.0);
    }
}
