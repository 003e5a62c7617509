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

//! Command-line surface of the `dct-sim` binary.
//!
//! A run is configured by loading an optional JSON file into a [`SimConfig`], then applying any
//! flags given here on top of it - so a saved config can be tweaked ad hoc without editing the
//! file.

use std::path::PathBuf;

use clap::Parser;

use crate::config::SimConfig;

/// Run the data collection tree simulation.
#[derive(Debug, Parser)]
#[command(name = "dct-sim", author, version, about)]
pub struct Cli {
    /// Path to a JSON `SimConfig`. Fields not present fall back to the built-in defaults.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory CSV reports are written to.
    #[arg(long, default_value = "reports")]
    pub report_dir: PathBuf,

    /// Override `sim_node_count`.
    #[arg(long)]
    pub nodes: Option<usize>,

    /// Override `sim_duration`.
    #[arg(long)]
    pub duration: Option<f64>,

    /// Override `seed`.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override `packet_loss_ratio`.
    #[arg(long)]
    pub packet_loss_ratio: Option<f64>,

    /// Override `num_nodes_to_kill`.
    #[arg(long)]
    pub num_nodes_to_kill: Option<usize>,

    /// Disable periodic `SENSOR_DATA` traffic regardless of what the config file says.
    #[arg(long)]
    pub no_data_packets: bool,
}

impl Cli {
    /// Build the effective [`SimConfig`] for this invocation: load `--config` if given, then
    /// apply every flag that was actually passed.
    pub fn resolve(&self) -> Result<SimConfig, crate::types::SimError> {
        let mut cfg = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(crate::types::ExportError::from)?;
                serde_json::from_str(&text)
                    .map_err(|e| crate::types::SimError::InvalidConfig(e.to_string()))?
            }
            None => SimConfig::default(),
        };

        if let Some(n) = self.nodes {
            cfg.sim_node_count = n;
        }
        if let Some(d) = self.duration {
            cfg.sim_duration = d;
        }
        if let Some(s) = self.seed {
            cfg.seed = s;
        }
        if let Some(p) = self.packet_loss_ratio {
            cfg.packet_loss_ratio = p;
        }
        if let Some(k) = self.num_nodes_to_kill {
            cfg.num_nodes_to_kill = k;
        }
        if self.no_data_packets {
            cfg.enable_data_packets = false;
        }

        cfg.validate().map_err(crate::types::SimError::InvalidConfig)?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli {
            config: None,
            report_dir: "reports".into(),
            nodes: Some(10),
            duration: Some(123.0),
            seed: Some(9),
            packet_loss_ratio: None,
            num_nodes_to_kill: None,
            no_data_packets: true,
        };
        let cfg = cli.resolve().unwrap();
        assert_eq!(cfg.sim_node_count, 10);
        assert_eq!(cfg.sim_duration, 123.0);
        assert_eq!(cfg.seed, 9);
        assert!(!cfg.enable_data_packets);
    }
}
