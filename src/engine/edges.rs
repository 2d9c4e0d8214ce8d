use eframe::egui::{Pos2, Rect, Vec2, pos2, vec2};

use super::layout::Orientation;

/// Orthogonal three-segment path: port, two corners, port.
pub type Polyline = [Pos2; 4];

/// World-space box of a node placed at `position`.
///
/// Horizontal boxes hang off their left-center anchor, vertical boxes off their
/// top-center anchor.
pub fn node_rect(position: Pos2, orientation: Orientation, size: Vec2) -> Rect {
    let min = match orientation {
        Orientation::Horizontal => position - vec2(0.0, size.y / 2.0),
        Orientation::Vertical => position - vec2(size.x / 2.0, 0.0),
    };
    Rect::from_min_size(min, size)
}

/// Far edge of the box in the depth direction.
pub fn output_port(position: Pos2, orientation: Orientation, size: Vec2) -> Pos2 {
    match orientation {
        Orientation::Horizontal => position + vec2(size.x, 0.0),
        Orientation::Vertical => position + vec2(0.0, size.y),
    }
}

/// Near edge of the box in the depth direction, which is the anchor itself.
pub fn input_port(position: Pos2, _orientation: Orientation, _size: Vec2) -> Pos2 {
    position
}

/// Where the expand/collapse button sits.
pub fn toggle_center(position: Pos2, orientation: Orientation, size: Vec2) -> Pos2 {
    output_port(position, orientation, size)
}

/// Routes a structural edge from a parent box to a child box.
///
/// The bend is always at the mean of the two ports' depth coordinates, so
/// every edge of a sibling group shares the same vertical (or horizontal) run.
pub fn route(parent: Pos2, child: Pos2, orientation: Orientation, size: Vec2) -> Polyline {
    let source = output_port(parent, orientation, size);
    let target = input_port(child, orientation, size);

    match orientation {
        Orientation::Horizontal => {
            let mid_x = (source.x + target.x) / 2.0;
            [source, pos2(mid_x, source.y), pos2(mid_x, target.y), target]
        }
        Orientation::Vertical => {
            let mid_y = (source.y + target.y) / 2.0;
            [source, pos2(source.x, mid_y), pos2(target.x, mid_y), target]
        }
    }
}
