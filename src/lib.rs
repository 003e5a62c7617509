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

//! A discrete-event simulator of a wireless sensor network's self-organizing data collection
//! tree: nodes probe for neighbors, join clusters, elect cluster heads, relay sensor readings
//! toward a root, and fail/recover under a CC2420-style energy budget.
//!
//! [`network::Network`] drives the whole run; every other module is either state
//! ([`node::Node`], [`config::SimConfig`]) or a pure function over that state
//! ([`routing`], [`energy`]).

pub mod cli;
pub mod config;
pub mod energy;
pub mod event;
pub mod export;
pub mod failure;
pub mod network;
pub mod node;
pub mod routing;
pub mod scene;
pub mod types;
