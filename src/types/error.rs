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

//! Error types. Only genuinely exceptional conditions are represented here; resource exhaustion
//! (full address pools, unresolvable destinations) is modeled with `Option`/enum returns instead,
//! per ยง7 of the design notes.

use thiserror::Error;

/// Errors raised while writing simulation reports. Never propagated into the state machine: the
/// network keeps running even if a report could not be written (see ยง7).
#[derive(Error, Debug)]
pub enum ExportError {
    /// Underlying file I/O failed.
    #[error("I/O error while writing report: {0}")]
    Io(#[from] std::io::Error),
    /// The `csv` writer failed to serialize or flush a row.
    #[error("CSV error while writing report: {0}")]
    Csv(#[from] csv::Error),
}

/// Top-level error type for the simulation engine.
#[derive(Error, Debug)]
pub enum SimError {
    /// Report writing failed.
    #[error("export error: {0}")]
    Export(#[from] ExportError),
    /// The configuration is internally inconsistent (e.g. zero nodes requested).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
