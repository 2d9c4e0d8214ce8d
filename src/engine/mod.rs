//! Layout-and-render core of the knowledge map.
//!
//! Data flows one way: a [`Dataset`](crate::dataset::Dataset) is turned into a
//! [`MapTree`] by [`build_tree`], [`TreeState`] owns its expand/collapse and
//! selection state, [`layout`] places the visible part of it, [`route`] draws
//! structural edges between placed nodes, [`TransitionAnimator`] diffs one
//! layout against the next, and [`Camera`] maps the result to the screen.
//! [`MapEngine`] wires these together for a rendering surface.

mod animation;
mod camera;
mod config;
mod edges;
mod hierarchy;
mod layout;
mod map;
mod search;
mod state;

pub use animation::{AnimatedNode, Phase, TransitionAnimator, VisibilityDiff};
pub use camera::{Camera, CameraTransform, ZoomCommand};
pub use config::{CameraConfig, EngineConfig, Spacing};
pub use edges::{Polyline, input_port, node_rect, output_port, route, toggle_center};
pub use hierarchy::{BuiltTree, DataWarning, MapTree, NodeId, NodeKind, TreeNode, build_tree};
pub use layout::{Orientation, TreeLayout, TreePoint, layout};
pub use map::{
    EdgeVisual, Hit, MapEngine, NodeSelectedCallback, NodeVisual, RenderFrame, ToggleState,
    ZoomHandledCallback,
};
pub use search::SearchFilter;
pub use state::{ExpandScope, TreeState};
