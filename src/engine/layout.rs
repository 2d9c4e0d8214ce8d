use std::collections::HashMap;

use eframe::egui::{Pos2, pos2};
use tracing::trace;

use super::config::{EngineConfig, Spacing};
use super::hierarchy::NodeId;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Depth grows to the right.
    #[default]
    Horizontal,
    /// Depth grows downwards.
    Vertical,
}

impl Orientation {
    pub fn flipped(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
        }
    }

    /// Maps a tree-space point onto world axes.
    pub fn materialize(self, point: TreePoint, spacing: Spacing) -> Pos2 {
        let depth = point.depth as f32 * spacing.level_gap;
        let lateral = point.lateral * spacing.sibling_gap;
        match self {
            Self::Horizontal => pos2(depth, lateral),
            Self::Vertical => pos2(lateral, depth),
        }
    }
}

/// Orientation-agnostic coordinate: tier index and lateral offset in sibling units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreePoint {
    pub depth: usize,
    pub lateral: f32,
}

#[derive(Clone, Debug, Default)]
pub struct TreeLayout {
    orientation: Orientation,
    points: HashMap<NodeId, TreePoint>,
    positions: HashMap<NodeId, Pos2>,
    order: Vec<NodeId>,
}

impl TreeLayout {
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn position(&self, id: NodeId) -> Option<Pos2> {
        self.positions.get(&id).copied()
    }

    pub fn tree_point(&self, id: NodeId) -> Option<TreePoint> {
        self.points.get(&id).copied()
    }

    pub fn positions(&self) -> &HashMap<NodeId, Pos2> {
        &self.positions
    }

    /// Placed nodes in pre-order.
    pub fn order(&self) -> &[NodeId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Tiered placement of the tree reachable through `visible_children`.
///
/// Leaves take consecutive lateral slots in pre-order and every parent sits at
/// the midpoint of its first and last child, so each subtree occupies a lateral
/// range that encloses all of its descendants and never intersects a sibling's.
/// The root ends up at lateral 0. The result is computed in tree space and only
/// mapped to world axes at the end, so orientation never changes structure.
pub fn layout<'a, F>(
    root: NodeId,
    visible_children: F,
    orientation: Orientation,
    config: &EngineConfig,
) -> TreeLayout
where
    F: Fn(NodeId) -> &'a [NodeId],
{
    let mut placement = Placement {
        visible_children,
        next_slot: 0.0,
        points: HashMap::new(),
        order: Vec::new(),
    };
    let root_lateral = placement.place(root, 0);

    let spacing = config.spacing(orientation);
    let mut points = placement.points;
    for point in points.values_mut() {
        point.lateral -= root_lateral;
    }
    let positions = points
        .iter()
        .map(|(id, point)| (*id, orientation.materialize(*point, spacing)))
        .collect::<HashMap<_, _>>();

    trace!(
        nodes = placement.order.len(),
        slots = placement.next_slot,
        orientation = orientation.label(),
        "layout computed"
    );

    TreeLayout {
        orientation,
        points,
        positions,
        order: placement.order,
    }
}

struct Placement<F> {
    visible_children: F,
    next_slot: f32,
    points: HashMap<NodeId, TreePoint>,
    order: Vec<NodeId>,
}

impl<'a, F> Placement<F>
where
    F: Fn(NodeId) -> &'a [NodeId],
{
    fn place(&mut self, id: NodeId, depth: usize) -> f32 {
        self.order.push(id);

        let children = (self.visible_children)(id);
        let lateral = match children {
            [] => {
                let slot = self.next_slot;
                self.next_slot += 1.0;
                slot
            }
            [first, rest @ ..] => {
                let first_lateral = self.place(*first, depth + 1);
                let mut last_lateral = first_lateral;
                for child in rest {
                    last_lateral = self.place(*child, depth + 1);
                }
                (first_lateral + last_lateral) / 2.0
            }
        };

        self.points.insert(id, TreePoint { depth, lateral });
        lateral
    }
}
