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

//! Visualization as an observer the state machine writes to but never reads back from.
//!
//! [`Scene`] is a trait object so `Network` never special-cases "no visualization": a headless
//! run substitutes [`NullScene`], a real front-end would supply its own implementation.

use crate::types::NodeId;

/// Line style of a drawn circle, matching what the original front-end distinguished visually.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    /// A CH/Root's TX range.
    Solid,
    /// A Router's TX range.
    Dashed,
}

/// Observer of node state changes, purely write-only from the state machine's perspective.
pub trait Scene {
    /// Recolor `id`'s marker to `(r, g, b)`.
    fn nodecolor(&mut self, id: NodeId, r: u8, g: u8, b: u8);
    /// Draw (or redraw) a range circle centered at `(x, y)` with radius `r`.
    fn circle(&mut self, id: NodeId, x: f64, y: f64, r: f64, style: LineStyle);
    /// Remove a previously drawn shape for `id`, if any.
    fn delshape(&mut self, id: NodeId);
}

/// Headless no-op `Scene`, used whenever `sim_visualization` is disabled or no front-end is
/// attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullScene;

impl Scene for NullScene {
    fn nodecolor(&mut self, _id: NodeId, _r: u8, _g: u8, _b: u8) {}
    fn circle(&mut self, _id: NodeId, _x: f64, _y: f64, _r: f64, _style: LineStyle) {}
    fn delshape(&mut self, _id: NodeId) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_scene_accepts_every_call_without_panicking() {
        let mut scene = NullScene;
        scene.nodecolor(NodeId(1), 255, 0, 0);
        scene.circle(NodeId(1), 0.0, 0.0, 10.0, LineStyle::Solid);
        scene.delshape(NodeId(1));
    }
}
