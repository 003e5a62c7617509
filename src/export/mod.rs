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

//! CSV report writers (ยง6). One row struct and one `csv::Writer` per output file; a failure to
//! write is logged and swallowed (`ExportError` never propagates into the state machine, ยง7).

use std::path::Path;

use serde::Serialize;

use crate::types::{ExportError, NodeId, Role};

/// One row of `topology.csv`.
#[derive(Debug, Serialize)]
pub struct TopologyRow {
    pub node_id: NodeId,
    /// `"x,y"`, matching ยง6's single `Position` column.
    pub position: String,
    pub role: String,
}

/// One row of `registration_log.csv`.
#[derive(Debug, Serialize)]
pub struct RegistrationRow {
    pub node_id: NodeId,
    pub start_time: f64,
    pub registered_time: f64,
    pub delta_time: f64,
}

/// One row of `role_changes.csv`.
#[derive(Debug, Serialize)]
pub struct RoleChangeRow {
    pub time: f64,
    pub node_id: NodeId,
    pub old_role: String,
    pub new_role: String,
}

/// One row of `packet_routes.csv`.
#[derive(Debug, Serialize)]
pub struct PacketRouteRow {
    pub time: f64,
    pub packet_type: String,
    pub source: String,
    pub current_node: NodeId,
    pub next_hop: String,
    pub dest: String,
    pub hop_count: u32,
    pub routing_direction: String,
}

/// One row of `power_over_time.csv`.
#[derive(Debug, Serialize)]
pub struct PowerSampleRow {
    pub time: f64,
    pub avg_power_j: f64,
    pub min_power_j: f64,
    pub max_power_j: f64,
    pub alive_nodes: usize,
    pub dead_nodes: usize,
}

/// One row of `energy_metrics.csv`, emitted once per node at the end of a run.
#[derive(Debug, Serialize)]
pub struct EnergyMetricsRow {
    pub node_id: NodeId,
    pub role: String,
    pub initial_energy_j: f64,
    pub final_energy_j: f64,
    pub total_energy_consumed_j: f64,
    pub tx_energy_consumed_j: f64,
    pub rx_energy_consumed_j: f64,
    pub tx_packet_count: u64,
    pub rx_packet_count: u64,
    pub total_packet_count: u64,
    pub avg_energy_per_tx_packet_j: f64,
    pub avg_energy_per_rx_packet_j: f64,
    pub energy_efficiency_j_per_packet: f64,
}

/// One row of `failures.csv`.
#[derive(Debug, Serialize)]
pub struct FailureRow {
    pub time: f64,
    pub node_id: NodeId,
    pub event_type: String,
    pub orphan_count: usize,
}

/// One row of `packet_log.csv`.
#[derive(Debug, Serialize)]
pub struct PacketLogRow {
    pub packet_id: u64,
    pub packet_type: String,
    pub source_gui: NodeId,
    pub dest_gui: String,
    pub created_at: f64,
    pub received_at: f64,
    pub delay: f64,
    pub path: String,
}

/// Build a `NodeId` list into the pipe-separated string `packet_log.csv`'s `path` column uses.
pub fn format_path(path: &[NodeId]) -> String {
    path.iter().map(|n| n.0.to_string()).collect::<Vec<_>>().join("|")
}

/// Aggregates every `csv::Writer` the simulation produces, so `Network` has one handle to pass
/// around. A writer is only created (and its file opened) lazily, on first use of the
/// corresponding `record_*` method, via `open_if_needed`.
pub struct ReportWriters {
    dir: std::path::PathBuf,
    topology: Option<csv::Writer<std::fs::File>>,
    registration: Option<csv::Writer<std::fs::File>>,
    role_changes: Option<csv::Writer<std::fs::File>>,
    packet_routes: Option<csv::Writer<std::fs::File>>,
    power_over_time: Option<csv::Writer<std::fs::File>>,
    energy_metrics: Option<csv::Writer<std::fs::File>>,
    failures: Option<csv::Writer<std::fs::File>>,
    packet_log: Option<csv::Writer<std::fs::File>>,
}

impl ReportWriters {
    /// Point every writer at CSV files inside `dir` (created on demand).
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            topology: None,
            registration: None,
            role_changes: None,
            packet_routes: None,
            power_over_time: None,
            energy_metrics: None,
            failures: None,
            packet_log: None,
        }
    }

    fn open(&self, name: &str) -> Result<csv::Writer<std::fs::File>, ExportError> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(csv::Writer::from_path(self.dir.join(name))?)
    }

    pub fn record_topology(&mut self, row: TopologyRow) -> Result<(), ExportError> {
        if self.topology.is_none() {
            self.topology = Some(self.open("topology.csv")?);
        }
        self.topology.as_mut().unwrap().serialize(row)?;
        Ok(())
    }

    pub fn record_registration(&mut self, row: RegistrationRow) -> Result<(), ExportError> {
        if self.registration.is_none() {
            self.registration = Some(self.open("registration_log.csv")?);
        }
        self.registration.as_mut().unwrap().serialize(row)?;
        Ok(())
    }

    pub fn record_role_change(&mut self, row: RoleChangeRow) -> Result<(), ExportError> {
        if self.role_changes.is_none() {
            self.role_changes = Some(self.open("role_changes.csv")?);
        }
        self.role_changes.as_mut().unwrap().serialize(row)?;
        Ok(())
    }

    pub fn record_packet_route(&mut self, row: PacketRouteRow) -> Result<(), ExportError> {
        if self.packet_routes.is_none() {
            self.packet_routes = Some(self.open("packet_routes.csv")?);
        }
        self.packet_routes.as_mut().unwrap().serialize(row)?;
        Ok(())
    }

    pub fn record_power_sample(&mut self, row: PowerSampleRow) -> Result<(), ExportError> {
        if self.power_over_time.is_none() {
            self.power_over_time = Some(self.open("power_over_time.csv")?);
        }
        self.power_over_time.as_mut().unwrap().serialize(row)?;
        Ok(())
    }

    pub fn record_energy_metrics(&mut self, row: EnergyMetricsRow) -> Result<(), ExportError> {
        if self.energy_metrics.is_none() {
            self.energy_metrics = Some(self.open("energy_metrics.csv")?);
        }
        self.energy_metrics.as_mut().unwrap().serialize(row)?;
        Ok(())
    }

    pub fn record_failure(&mut self, row: FailureRow) -> Result<(), ExportError> {
        if self.failures.is_none() {
            self.failures = Some(self.open("failures.csv")?);
        }
        self.failures.as_mut().unwrap().serialize(row)?;
        Ok(())
    }

    pub fn record_packet_log(&mut self, row: PacketLogRow) -> Result<(), ExportError> {
        if self.packet_log.is_none() {
            self.packet_log = Some(self.open("packet_log.csv")?);
        }
        self.packet_log.as_mut().unwrap().serialize(row)?;
        Ok(())
    }

    /// Flush every writer that was actually opened. Errors from one writer don't prevent the
    /// others from flushing.
    pub fn finish(&mut self) {
        let writers: [&mut Option<csv::Writer<std::fs::File>>; 8] = [
            &mut self.topology,
            &mut self.registration,
            &mut self.role_changes,
            &mut self.packet_routes,
            &mut self.power_over_time,
            &mut self.energy_metrics,
            &mut self.failures,
            &mut self.packet_log,
        ];
        for w in writers {
            if let Some(w) = w.as_mut() {
                if let Err(e) = w.flush() {
                    log::warn!("failed to flush report writer: {e}");
                }
            }
        }
    }
}

impl Drop for ReportWriters {
    fn drop(&mut self) {
        self.finish();
    }
}

/// Human-readable role name, used in CSV rows where the derive-based `Display` would be ambiguous
/// about case conventions to downstream tooling (kept as a thin wrapper so the column values stay
/// stable if `Role`'s `Display` impl ever changes).
pub fn role_name(role: Role) -> String {
    role.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_path_joins_with_pipes() {
        assert_eq!(format_path(&[NodeId(1), NodeId(2), NodeId(3)]), "1|2|3");
    }

    #[test]
    fn writers_open_files_lazily_in_a_temp_dir() {
        let tmp = std::env::temp_dir().join(format!("dct_sim_test_{}", std::process::id()));
        let mut w = ReportWriters::new(&tmp);
        w.record_topology(TopologyRow { node_id: NodeId(0), position: "0,0".into(), role: "Root".into() })
            .unwrap();
        w.finish();
        assert!(tmp.join("topology.csv").exists());
        let _ = std::fs::remove_dir_all(&tmp);
    }
}
